// Copyright 2025 tilegemm developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Packing of A and B blocks into the kernel's streaming layouts.
//!
//! A~ holds MR-row micro-panels back to back; within a panel each row
//! is contiguous over the k extent, so the kernel broadcasts
//! `a[i * kc + k]`. B~ holds NR-column micro-panels; within a panel
//! the NR values for one k step are contiguous, so the kernel loads
//! them with a single vector load at `b[k * NR]`.
//!
//! Both functions handle under-sized trailing panels: the valid region
//! is copied and the rest of the nominal MR/NR extent is zero-filled.
//! Nothing downstream may assume even divisibility.

use core::ptr::copy_nonoverlapping;

use rawpointer::PointerExt;

use crate::config::{MR, NR};

/// Pack an `mc` x `kc` block of A (row-major, leading dimension `lda`)
/// into `pack` as ceil(mc/MR) micro-panels of MR rows each.
///
/// `pack` must hold `round_up_to(mc, MR) * kc` elements.
pub(crate) unsafe fn pack_a(kc: usize, mc: usize, pack: *mut f32, a: *const f32, lda: usize) {
    let mut p = pack;

    // whole micro-panels: copy one source row of length kc at a time
    for row in 0..mc / MR * MR {
        let src = a.stride_offset(lda as isize, row);
        copy_nonoverlapping(src, p, kc);
        p = p.add(kc);
    }

    // trailing panel: valid rows copied, the rest zero-filled
    let rest = mc % MR;
    if rest > 0 {
        let base = mc / MR * MR;
        for i in 0..MR {
            if i < rest {
                let src = a.stride_offset(lda as isize, base + i);
                copy_nonoverlapping(src, p, kc);
            } else {
                for k in 0..kc {
                    *p.add(k) = 0.;
                }
            }
            p = p.add(kc);
        }
    }
}

/// Pack a `kc` x `nc` block of B (row-major, leading dimension `ldb`)
/// into `pack` as ceil(nc/NR) micro-panels of NR columns each.
///
/// `pack` must hold `round_up_to(nc, NR) * kc` elements.
pub(crate) unsafe fn pack_b(kc: usize, nc: usize, pack: *mut f32, b: *const f32, ldb: usize) {
    let mut p = pack;

    for col in (0..nc / NR * NR).step_by(NR) {
        for k in 0..kc {
            let src = b.stride_offset(ldb as isize, k).add(col);
            copy_nonoverlapping(src, p, NR);
            p = p.add(NR);
        }
    }

    let rest = nc % NR;
    if rest > 0 {
        let base = nc / NR * NR;
        for k in 0..kc {
            let src = b.stride_offset(ldb as isize, k).add(base);
            for j in 0..NR {
                *p.add(j) = if j < rest { *src.add(j) } else { 0. };
            }
            p = p.add(NR);
        }
    }
}
