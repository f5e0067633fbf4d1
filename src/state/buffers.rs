//! Per-particle buffers with scoped access.
//!
//! A [`GlobalArray`] hands out guards for a fixed access mode that last for
//! a scope. Acquiring with [`AccessMode::Overwrite`] resets every element to
//! its default first, so a pass that promises to write the whole buffer can
//! never observe values left over from an earlier timestep.
//! [`AccessMode::ReadWrite`] keeps the current contents.

use std::ops::{Deref, DerefMut};

/// How a buffer is acquired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    ReadWrite,
    Overwrite,
}

/// Growable per-particle array
#[derive(Debug, Clone, Default)]
pub struct GlobalArray<T> {
    data: Vec<T>,
}

impl<T: Copy + Default> GlobalArray<T> {
    pub fn new(len: usize) -> Self {
        Self {
            data: vec![T::default(); len],
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Resize to `len` elements; new elements are defaulted
    pub fn resize(&mut self, len: usize) {
        self.data.resize(len, T::default());
    }

    /// Contents as last written
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Read-only access
    pub fn read(&self) -> ArrayHandle<'_, T> {
        ArrayHandle { data: &self.data }
    }

    /// Mutable access that preserves current contents
    pub fn read_write(&mut self) -> ArrayHandleMut<'_, T> {
        self.acquire(AccessMode::ReadWrite)
    }

    /// Mutable access to a freshly zeroed buffer
    pub fn overwrite(&mut self) -> ArrayHandleMut<'_, T> {
        self.acquire(AccessMode::Overwrite)
    }

    fn acquire(&mut self, mode: AccessMode) -> ArrayHandleMut<'_, T> {
        if mode == AccessMode::Overwrite {
            self.data.fill(T::default());
        }
        log::trace!("acquired {} elements for {:?}", self.data.len(), mode);
        ArrayHandleMut {
            data: &mut self.data,
            mode,
        }
    }
}

/// Read-only guard over a [`GlobalArray`]
pub struct ArrayHandle<'a, T> {
    data: &'a [T],
}

impl<T> Deref for ArrayHandle<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.data
    }
}

/// Mutable guard over a [`GlobalArray`]
pub struct ArrayHandleMut<'a, T> {
    data: &'a mut [T],
    mode: AccessMode,
}

impl<T> ArrayHandleMut<'_, T> {
    pub fn mode(&self) -> AccessMode {
        self.mode
    }
}

impl<T> Deref for ArrayHandleMut<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.data
    }
}

impl<T> DerefMut for ArrayHandleMut<'_, T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.data
    }
}

impl<T> Drop for ArrayHandleMut<'_, T> {
    fn drop(&mut self) {
        log::trace!("released {} elements from {:?}", self.data.len(), self.mode);
    }
}
