// Copyright 2025 tilegemm developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Row-major matrix views over caller-owned buffers.
//!
//! A view is a base slice plus `rows`, `cols` and a leading dimension
//! `ld` (stride between consecutive rows, `ld >= cols`). Views never
//! own or allocate storage; gemm reads A and B through shared views
//! and accumulates into C through a mutable view.

use crate::errors::{GemmError, Result};

/// Read-only view of an `rows` x `cols` row-major matrix.
#[derive(Copy, Clone)]
pub struct MatrixView<'a> {
    data: &'a [f32],
    rows: usize,
    cols: usize,
    ld: usize,
}

/// Mutable view of an `rows` x `cols` row-major matrix.
pub struct MatrixViewMut<'a> {
    data: &'a mut [f32],
    rows: usize,
    cols: usize,
    ld: usize,
}

/// Number of elements a `rows` x `cols` view with leading dimension
/// `ld` spans in its backing buffer. The final row needs only `cols`
/// elements, not a full stride.
fn span_len(rows: usize, cols: usize, ld: usize) -> usize {
    if rows == 0 || cols == 0 {
        0
    } else {
        (rows - 1) * ld + cols
    }
}

fn check_extent(len: usize, rows: usize, cols: usize, ld: usize) -> Result<()> {
    if ld < cols {
        return Err(GemmError::ShortStride { ld, cols });
    }
    let needed = span_len(rows, cols, ld);
    if len < needed {
        return Err(GemmError::ShortBuffer { len, needed });
    }
    Ok(())
}

impl<'a> MatrixView<'a> {
    /// View `data` as a `rows` x `cols` matrix with leading dimension `ld`.
    pub fn new(data: &'a [f32], rows: usize, cols: usize, ld: usize) -> Result<Self> {
        check_extent(data.len(), rows, cols, ld)?;
        Ok(MatrixView { data, rows, cols, ld })
    }

    /// Contiguous view: leading dimension equals the column count.
    pub fn contiguous(data: &'a [f32], rows: usize, cols: usize) -> Result<Self> {
        Self::new(data, rows, cols, cols.max(1))
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn ld(&self) -> usize {
        self.ld
    }

    /// Pointer to element (i, j); the block must lie inside the view.
    #[inline]
    pub(crate) fn block_ptr(&self, i: usize, j: usize) -> *const f32 {
        debug_assert!(i < self.rows && j < self.cols);
        self.data[i * self.ld + j..].as_ptr()
    }

    /// Sub-view of `nrows` rows starting at `row`, same columns.
    pub(crate) fn row_span(&self, row: usize, nrows: usize) -> MatrixView<'a> {
        debug_assert!(row + nrows <= self.rows);
        let start = row * self.ld;
        let end = start + span_len(nrows, self.cols, self.ld);
        MatrixView {
            data: &self.data[start..end],
            rows: nrows,
            cols: self.cols,
            ld: self.ld,
        }
    }
}

impl<'a> MatrixViewMut<'a> {
    /// View `data` as a mutable `rows` x `cols` matrix with leading
    /// dimension `ld`. `ld == 0` (or any `ld < cols`) is rejected, so
    /// no two logical elements of a mutable view can alias.
    pub fn new(data: &'a mut [f32], rows: usize, cols: usize, ld: usize) -> Result<Self> {
        check_extent(data.len(), rows, cols, ld)?;
        Ok(MatrixViewMut { data, rows, cols, ld })
    }

    /// Contiguous mutable view: leading dimension equals the column count.
    pub fn contiguous(data: &'a mut [f32], rows: usize, cols: usize) -> Result<Self> {
        Self::new(data, rows, cols, cols.max(1))
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn ld(&self) -> usize {
        self.ld
    }

    #[inline]
    pub(crate) fn block_ptr_mut(&mut self, i: usize, j: usize) -> *mut f32 {
        debug_assert!(i < self.rows && j < self.cols);
        self.data[i * self.ld + j..].as_mut_ptr()
    }

    /// Split off the first `nrows` rows as an independent mutable view.
    ///
    /// The two halves cover disjoint element ranges, which is what lets
    /// worker threads accumulate into the same C without locking.
    pub(crate) fn split_at_row(self, nrows: usize) -> (MatrixViewMut<'a>, MatrixViewMut<'a>) {
        debug_assert!(nrows <= self.rows);
        let cols = self.cols;
        let ld = self.ld;
        let rest = self.rows - nrows;
        // Split on the row stride boundary; the upper view starts at
        // the first element of row `nrows`.
        let mid = if rest == 0 {
            self.data.len()
        } else {
            nrows * ld
        };
        let (lo, hi) = self.data.split_at_mut(mid);
        (
            MatrixViewMut {
                data: lo,
                rows: nrows,
                cols,
                ld,
            },
            MatrixViewMut {
                data: hi,
                rows: rest,
                cols,
                ld,
            },
        )
    }
}
