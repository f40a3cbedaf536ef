// Copyright 2025 tilegemm developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Row partitioning and worker thread lifecycle.
//!
//! One gemm call spawns its workers fresh and joins them all before
//! returning; there is no long-lived pool. Each worker owns a disjoint
//! contiguous row span of C (and the matching rows of A) plus its own
//! packing scratch, so no synchronization is needed anywhere.

use std::str::FromStr;
use std::thread;

use once_cell::sync::Lazy;

use crate::config::GemmConfig;
use crate::errors::{GemmError, Result};
use crate::gemm::{gemm_span, PackScratch};
use crate::matrix::{MatrixView, MatrixViewMut};

/// Contiguous range of output rows assigned to one worker.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct RowSpan {
    pub start: usize,
    pub len: usize,
}

/// Split `[0, m)` into `num_threads` contiguous spans.
///
/// Every span gets `m / num_threads` rows and the first
/// `m % num_threads` spans get one extra, so the spans cover `[0, m)`
/// exactly with a row-count imbalance of at most one. Trailing spans
/// are empty when `num_threads > m`.
pub(crate) fn partition_rows(m: usize, num_threads: usize) -> Vec<RowSpan> {
    debug_assert_ne!(num_threads, 0);
    let per_thread = m / num_threads;
    let extra = m % num_threads;
    (0..num_threads)
        .map(|i| {
            let start = i * per_thread + i.min(extra);
            let len = per_thread + usize::from(i < extra);
            RowSpan { start, len }
        })
        .collect()
}

/// Run the block scheduler over `num_threads` disjoint row spans of C.
///
/// Blocks until every worker has finished. A spawn failure or worker
/// panic is reported after all already-running workers have been
/// joined (the scope guarantees none is left running).
pub(crate) fn run_partitioned(
    cfg: &GemmConfig,
    a: MatrixView<'_>,
    b: MatrixView<'_>,
    c: MatrixViewMut<'_>,
    num_threads: usize,
) -> Result<()> {
    let k = a.cols();
    let n = b.cols();

    if num_threads == 1 {
        // run on the calling thread, same code path as a worker
        let mut c = c;
        let mut scratch = PackScratch::new(cfg, c.rows(), k, n)?;
        unsafe { gemm_span(cfg, a, b, &mut c, &mut scratch) };
        return Ok(());
    }

    let spans = partition_rows(c.rows(), num_threads);

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(num_threads);
        let mut rest = c;
        let mut consumed = 0;

        for (index, span) in spans.iter().enumerate() {
            if span.len == 0 {
                continue;
            }
            debug_assert_eq!(span.start, consumed);
            let (mut mine, tail) = rest.split_at_row(span.len);
            rest = tail;
            consumed += span.len;

            let a_span = a.row_span(span.start, span.len);
            let rows = span.len;
            let handle = thread::Builder::new()
                .name(format!("tilegemm-{}", index))
                .spawn_scoped(scope, move || -> Result<()> {
                    // packing scratch is strictly per worker
                    let mut scratch = PackScratch::new(cfg, rows, k, n)?;
                    unsafe { gemm_span(cfg, a_span, b, &mut mine, &mut scratch) };
                    Ok(())
                })
                .map_err(|source| GemmError::ThreadSpawn { index, source })?;
            handles.push((index, handle));
        }

        for (index, handle) in handles {
            match handle.join() {
                Ok(result) => result?,
                Err(_) => return Err(GemmError::WorkerPanicked { index }),
            }
        }
        Ok(())
    })
}

/// Thread count used by callers that do not want to choose one:
/// `TILEGEMM_NUM_THREADS` if set, otherwise the number of physical
/// cores. Never less than 1.
pub fn default_num_threads() -> usize {
    static REGISTRY: Lazy<usize> = Lazy::new(|| {
        let var = std::env::var("TILEGEMM_NUM_THREADS").ok();
        match var {
            Some(s) if !s.is_empty() => {
                if let Ok(nt) = usize::from_str(&s) {
                    1.max(nt)
                } else {
                    eprintln!("Failed to parse TILEGEMM_NUM_THREADS");
                    1
                }
            }
            _otherwise => 1.max(num_cpus::get_physical()),
        }
    });
    *REGISTRY
}
