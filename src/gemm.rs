// Copyright 2025 tilegemm developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use core::cmp::min;

use crate::aligned_alloc::Alloc;
use crate::config::{GemmConfig, MR, NR};
use crate::errors::{GemmError, Result};
use crate::kernel;
use crate::matrix::{MatrixView, MatrixViewMut};
use crate::pack::{pack_a, pack_b};
use crate::util::{range_chunk, round_up_to};

/// Alignment of the packing scratch; covers AVX vector loads.
const PACK_ALIGN: usize = 32;

/// General matrix multiplication (f32), `C += A B`.
///
/// + A: m by k, B: k by n, C: m by n, all row-major views
/// + `num_threads`: worker threads for this call, at least 1
///
/// The output rows of C are split into `num_threads` near-equal
/// contiguous spans computed per call; each worker runs the full
/// blocked schedule over its span. C accumulates: callers wanting
/// `C = A B` zero C first.
///
/// Uses the default block configuration; see [`sgemm_with`] to tune it.
pub fn sgemm(
    a: MatrixView<'_>,
    b: MatrixView<'_>,
    c: MatrixViewMut<'_>,
    num_threads: usize,
) -> Result<()> {
    sgemm_with(&GemmConfig::default(), a, b, c, num_threads)
}

/// [`sgemm`] with explicit cache blocking parameters.
///
/// All precondition and configuration errors are reported before any
/// element of C is touched.
pub fn sgemm_with(
    config: &GemmConfig,
    a: MatrixView<'_>,
    b: MatrixView<'_>,
    c: MatrixViewMut<'_>,
    num_threads: usize,
) -> Result<()> {
    let (m, k) = (a.rows(), a.cols());
    let n = b.cols();

    if b.rows() != k || c.rows() != m || c.cols() != n {
        return Err(GemmError::DimensionMismatch {
            am: m,
            ak: k,
            bk: b.rows(),
            bn: n,
            cm: c.rows(),
            cn: c.cols(),
        });
    }
    if num_threads < 1 {
        return Err(GemmError::BadThreadCount);
    }
    config.validate()?;

    // nothing to accumulate; C += 0 is a no-op
    if m == 0 || n == 0 || k == 0 {
        return Ok(());
    }

    crate::threading::run_partitioned(config, a, b, c, num_threads)
}

/// Packing scratch for one worker: A~ and B~ in a single aligned
/// allocation, sized once from the configuration and the problem
/// extents, then overwritten every block iteration.
pub(crate) struct PackScratch {
    buf: Alloc<f32>,
    b_offset: usize,
}

impl PackScratch {
    /// + A~ needs KC x MC, B~ needs KC x NC
    /// but both shrink when the (span of the) matrix is smaller; round
    /// up to whole micro-panels.
    pub(crate) fn new(cfg: &GemmConfig, m: usize, k: usize, n: usize) -> Result<Self> {
        let m = min(m, cfg.mc);
        let k = min(k, cfg.kc);
        let n = min(n, cfg.nc);
        let apack_size = k * round_up_to(m, MR);
        let bpack_size = k * round_up_to(n, NR);
        let buf = Alloc::new(apack_size + bpack_size, PACK_ALIGN)?;
        Ok(PackScratch {
            buf,
            b_offset: apack_size,
        })
    }

    fn panels(&mut self) -> (*mut f32, *mut f32) {
        let app = self.buf.ptr_mut();
        (app, unsafe { app.add(self.b_offset) })
    }
}

/// Blocked schedule over one worker's row span.
///
/// `a` holds exactly the span's rows; `c` is the matching disjoint
/// span of the output. Loop order is fixed: K blocks outermost, then
/// M blocks (packing A~), then N blocks (packing B~), then MR x NR
/// micro-tiles. Each packed A panel is reused across the whole N sweep
/// before it is overwritten.
///
/// Safety: `scratch` must have been sized by `PackScratch::new` for
/// this config and these extents.
pub(crate) unsafe fn gemm_span(
    cfg: &GemmConfig,
    a: MatrixView<'_>,
    b: MatrixView<'_>,
    c: &mut MatrixViewMut<'_>,
    scratch: &mut PackScratch,
) {
    let m_span = a.rows();
    let k = a.cols();
    let n = b.cols();
    debug_assert!(m_span == 0 || (c.rows() == m_span && c.cols() == n));

    let (app, bpp) = scratch.panels();

    // LOOP K: split the reduction dimension into kc blocks (A, B)
    for (lk, kc_) in range_chunk(k, cfg.kc) {
        let k0 = lk * cfg.kc;

        // LOOP M: split the span's rows into mc blocks (A, C)
        for (lm, mc_) in range_chunk(m_span, cfg.mc) {
            let i0 = lm * cfg.mc;

            // Pack A -> A~
            pack_a(kc_, mc_, app, a.block_ptr(i0, k0), a.ld());

            // LOOP N: split the columns into nc blocks (B, C)
            for (ln, nc_) in range_chunk(n, cfg.nc) {
                let j0 = ln * cfg.nc;

                // Pack B -> B~
                pack_b(kc_, nc_, bpp, b.block_ptr(k0, j0), b.ld());

                block_packed(kc_, mc_, nc_, app, bpp, c, i0, j0);
            }
        }
    }
}

/// Micro-tile loops over one packed (mc x kc) A block and (kc x nc)
/// B block, accumulating into the C block at (i0, j0).
///
/// Any tile shorter than MR or narrower than NR goes to the edge
/// kernel, which bounds its own iteration by the true extents.
unsafe fn block_packed(
    kc_: usize,
    mc_: usize,
    nc_: usize,
    app: *const f32,
    bpp: *const f32,
    c: &mut MatrixViewMut<'_>,
    i0: usize,
    j0: usize,
) {
    let ldc = c.ld();

    // micro-panels of packed A (rows), then micro-panels of packed B
    for (lr, mr_) in range_chunk(mc_, MR) {
        let ap = app.add(lr * MR * kc_);

        for (lc, nr_) in range_chunk(nc_, NR) {
            let bp = bpp.add(lc * NR * kc_);
            let ctile = c.block_ptr_mut(i0 + lr * MR, j0 + lc * NR);

            if mr_ == MR && nr_ == NR {
                kernel::kernel(kc_, ap, bp, ctile, ldc);
            } else {
                kernel::edge_kernel(kc_, mr_, nr_, ap, bp, ctile, ldc);
            }
        }
    }
}
