// Copyright 2025 tilegemm developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
//!
//! Blocked, packed, multithreaded matrix multiplication for f32
//! matrices: `C += A B`.
//!
//! This crate uses the same packing/microkernel approach to matrix
//! multiplication as the [BLIS][bl] project: operands are copied
//! block by block into cache-sized, stride-1 packed panels, and an
//! 8x8 microkernel accumulates each output tile entirely in vector
//! registers. Output rows are partitioned into contiguous near-equal
//! spans, one per worker thread; workers are spawned per call and
//! joined before it returns.
//!
//! [bl]: https://github.com/flame/blis
//!
//! ## Matrix Representation
//!
//! Matrices are row-major and passed as views over caller-owned
//! buffers: a slice plus row count, column count and leading dimension
//! (the stride between rows, at least the column count — larger values
//! describe a sub-matrix of a wider allocation):
//!
//! ```
//! use tilegemm::{sgemm, MatrixView, MatrixViewMut};
//!
//! let a = [1., 2., 3., 4., 5., 6., 7., 8., 9.];
//! let b = [1., 0., 0., 0., 1., 0., 0., 0., 1.];
//! let mut c = [0.; 9];
//!
//! let av = MatrixView::contiguous(&a, 3, 3).unwrap();
//! let bv = MatrixView::contiguous(&b, 3, 3).unwrap();
//! let cv = MatrixViewMut::contiguous(&mut c, 3, 3).unwrap();
//! sgemm(av, bv, cv, 2).unwrap();
//! assert_eq!(c, a);
//! ```
//!
//! The engine accumulates (`C += A B`); zero C beforehand for a plain
//! product. Calls either run to completion or fail before touching C,
//! except for worker failures, after which C is undefined.
//!
//! ## Performance notes
//!
//! - AVX and FMA are detected at runtime on x86/x86-64; other targets
//!   use a portable unrolled kernel.
//! - 32-byte aligned input buffers get the fastest load paths;
//!   unaligned input is tolerated.
//! - Block sizes are tunable per call through [`GemmConfig`]; the
//!   defaults suit most current x86-64 cache hierarchies.

#![doc(html_root_url = "https://docs.rs/tilegemm/0.1/")]

#[macro_use]
mod loopmacros;

mod aligned_alloc;
mod config;
mod errors;
mod gemm;
mod kernel;
mod matrix;
mod pack;
mod threading;
mod util;

pub use config::{GemmConfig, MR, NR};
pub use errors::{GemmError, Result};
pub use gemm::{sgemm, sgemm_with};
pub use matrix::{MatrixView, MatrixViewMut};
pub use threading::default_num_threads;
