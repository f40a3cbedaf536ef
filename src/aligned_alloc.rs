// Copyright 2025 tilegemm developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::alloc::{alloc, dealloc, Layout};
#[cfg(test)]
use std::ops::{Deref, DerefMut};
#[cfg(test)]
use std::slice;
use std::{cmp, mem};

use crate::errors::{GemmError, Result};

/// Raw aligned allocation, used for the per-thread packing scratch.
///
/// The contents start uninitialized; the packing step writes every
/// element that a kernel later reads.
pub(crate) struct Alloc<T> {
    ptr: *mut T,
    len: usize,
    align: usize,
}

unsafe impl<T: Send> Send for Alloc<T> {}

impl<T> Alloc<T> {
    pub fn new(len: usize, align: usize) -> Result<Self> {
        let align = cmp::max(align, mem::align_of::<T>());
        let layout = Layout::from_size_align(mem::size_of::<T>() * len, align)
            .map_err(|_| GemmError::ScratchAlloc { nelem: len })?;
        let ptr = unsafe { alloc(layout) };
        if ptr.is_null() {
            return Err(GemmError::ScratchAlloc { nelem: len });
        }
        Ok(Alloc {
            ptr: ptr as *mut T,
            len,
            align,
        })
    }

    #[inline]
    pub fn ptr_mut(&mut self) -> *mut T {
        self.ptr
    }
}

impl<T> Drop for Alloc<T> {
    fn drop(&mut self) {
        unsafe {
            let layout =
                Layout::from_size_align_unchecked(mem::size_of::<T>() * self.len, self.align);
            dealloc(self.ptr as _, layout);
        }
    }
}

#[cfg(test)]
impl<T> Deref for Alloc<T> {
    type Target = [T];
    fn deref(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.ptr, self.len) }
    }
}

#[cfg(test)]
impl<T> DerefMut for Alloc<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        unsafe { slice::from_raw_parts_mut(self.ptr, self.len) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_honored() {
        for &align in &[16usize, 32, 64] {
            let a = Alloc::<f32>::new(37, align).unwrap();
            assert_eq!(a.ptr as usize % align, 0);
        }
    }

    #[test]
    fn test_round_trip() {
        let mut a = Alloc::<f32>::new(64, 32).unwrap();
        for (i, x) in a.iter_mut().enumerate() {
            *x = i as f32;
        }
        assert_eq!(a[63], 63.);
    }
}
