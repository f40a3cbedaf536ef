// Copyright 2025 tilegemm developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The MR x NR microkernel and the scalar edge kernel.
//!
//! Input panels are packed (see `pack`): `a[i * kc + k]` is row i of
//! the A micro-panel, `b[k * NR + j]` is the NR-wide row of the B
//! micro-panel for reduction step k. C is addressed through its row
//! stride and accumulated in place, `C += A B`.

#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

use crate::config::{MR, NR};

/// Accumulate one full MR x NR tile for one k block.
///
/// + `kc`: reduction extent of the packed panels (1..=KC)
/// + `a`: packed A micro-panel, MR rows of `kc` elements
/// + `b`: packed B micro-panel, `kc` rows of NR elements
/// + `c`: top-left element of the C tile, row stride `ldc`
///
/// Accumulation order is k-ascending per output row; the result can
/// differ from a naive triple loop in the last bits (reassociation).
#[inline(never)]
pub(crate) unsafe fn kernel(kc: usize, a: *const f32, b: *const f32, c: *mut f32, ldc: usize) {
    // dispatch to specific compiled versions
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        if is_x86_feature_detected!("fma") {
            return kernel_target_fma(kc, a, b, c, ldc);
        } else if is_x86_feature_detected!("avx") {
            return kernel_target_avx(kc, a, b, c, ldc);
        }
    }
    kernel_fallback_impl(kc, a, b, c, ldc);
}

#[inline]
#[target_feature(enable = "fma")]
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
unsafe fn kernel_target_fma(kc: usize, a: *const f32, b: *const f32, c: *mut f32, ldc: usize) {
    let mut ab = [_mm256_setzero_ps(); MR];

    for k in 0..kc {
        // one vector load covers all NR outputs' contribution at k
        let bv = _mm256_loadu_ps(b.add(k * NR));
        loop8!(i, {
            let av = _mm256_set1_ps(*a.add(i * kc + k));
            ab[i] = _mm256_fmadd_ps(av, bv, ab[i]);
        });
    }

    loop8!(i, {
        let cptr = c.add(i * ldc);
        let cv = _mm256_loadu_ps(cptr);
        _mm256_storeu_ps(cptr, _mm256_add_ps(cv, ab[i]));
    });
}

#[inline]
#[target_feature(enable = "avx")]
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
unsafe fn kernel_target_avx(kc: usize, a: *const f32, b: *const f32, c: *mut f32, ldc: usize) {
    let mut ab = [_mm256_setzero_ps(); MR];

    for k in 0..kc {
        let bv = _mm256_loadu_ps(b.add(k * NR));
        loop8!(i, {
            let av = _mm256_set1_ps(*a.add(i * kc + k));
            ab[i] = _mm256_add_ps(ab[i], _mm256_mul_ps(av, bv));
        });
    }

    loop8!(i, {
        let cptr = c.add(i * ldc);
        let cv = _mm256_loadu_ps(cptr);
        _mm256_storeu_ps(cptr, _mm256_add_ps(cv, ab[i]));
    });
}

#[inline]
unsafe fn kernel_fallback_impl(kc: usize, a: *const f32, b: *const f32, c: *mut f32, ldc: usize) {
    let mut ab = [[0.; NR]; MR];
    let mut b = b;
    let mut k = 0;

    unroll_by_4!(kc, {
        loop8!(i, loop8!(j, ab[i][j] += *a.add(i * kc + k) * *b.add(j)));
        b = b.add(NR);
        k += 1;
    });
    let _ = k;

    loop8!(i, loop8!(j, *c.add(i * ldc + j) += ab[i][j]));
}

/// Boundary tile fallback: same accumulation, bounded by the tile's
/// true extents instead of MR x NR. Never reads or writes past
/// `mr_` rows or `nr_` columns of C.
pub(crate) unsafe fn edge_kernel(
    kc: usize,
    mr_: usize,
    nr_: usize,
    a: *const f32,
    b: *const f32,
    c: *mut f32,
    ldc: usize,
) {
    debug_assert!(mr_ <= MR && nr_ <= NR);
    for i in 0..mr_ {
        for j in 0..nr_ {
            let mut sum = 0.;
            for k in 0..kc {
                sum += *a.add(i * kc + k) * *b.add(k * NR + j);
            }
            *c.add(i * ldc + j) += sum;
        }
    }
}
