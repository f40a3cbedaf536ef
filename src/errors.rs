// Copyright 2025 tilegemm developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use thiserror::Error;

/// Errors reported by the gemm entry points.
///
/// Every variant is raised before or instead of computing; the only
/// exception is a worker failure, after which the contents of C are
/// undefined (possibly partially updated).
#[derive(Error, Debug)]
pub enum GemmError {
    #[error("dimension mismatch: A is {am}x{ak}, B is {bk}x{bn}, C is {cm}x{cn}")]
    DimensionMismatch {
        am: usize,
        ak: usize,
        bk: usize,
        bn: usize,
        cm: usize,
        cn: usize,
    },
    #[error("leading dimension {ld} is smaller than column count {cols}")]
    ShortStride { ld: usize, cols: usize },
    #[error("buffer holds {len} elements, matrix view needs {needed}")]
    ShortBuffer { len: usize, needed: usize },
    #[error("thread count must be at least 1")]
    BadThreadCount,
    #[error("invalid block configuration: {0}")]
    BadConfig(&'static str),
    #[error("failed to allocate {nelem} elements of packing scratch")]
    ScratchAlloc { nelem: usize },
    #[error("failed to spawn worker thread {index}: {source}")]
    ThreadSpawn {
        index: usize,
        source: std::io::Error,
    },
    #[error("worker thread {index} panicked")]
    WorkerPanicked { index: usize },
}

pub type Result<T> = std::result::Result<T, GemmError>;
