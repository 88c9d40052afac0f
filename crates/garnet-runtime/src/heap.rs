//! Per-state object heap
//!
//! Strings are the only heap objects. The heap is an append-only arena
//! indexed by `ObjRef`; objects live until the owning state closes. The
//! number of objects is capped by `max_heap_objects`.

use crate::value::{ObjRef, RuntimeError};
use std::collections::TryReserveError;

/// Mutable string object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RString {
    pub text: String,
    pub frozen: bool,
}

/// Arena of heap objects owned by one state
#[derive(Debug)]
pub struct Heap {
    owner: u64,
    objects: Vec<RString>,
    limit: usize,
}

impl Heap {
    /// Create a heap with `initial` slots reserved up front
    ///
    /// The reservation is fallible so an unsatisfiable size is reported to
    /// the caller instead of aborting the process.
    pub fn with_capacity(owner: u64, initial: usize, limit: usize) -> Result<Self, TryReserveError> {
        let mut objects = Vec::new();
        objects.try_reserve_exact(initial)?;
        Ok(Self {
            owner,
            objects,
            limit,
        })
    }

    /// Allocate a new string object
    pub fn alloc(&mut self, text: String) -> Result<ObjRef, RuntimeError> {
        if self.objects.len() >= self.limit || self.objects.len() >= u32::MAX as usize {
            return Err(RuntimeError::NoMemory { limit: self.limit });
        }
        self.objects
            .try_reserve(1)
            .map_err(|_| RuntimeError::NoMemory { limit: self.limit })?;
        let index = self.objects.len() as u32;
        self.objects.push(RString {
            text,
            frozen: false,
        });
        Ok(ObjRef {
            owner: self.owner,
            index,
        })
    }

    /// Borrow an object, rejecting references from other states
    pub fn get(&self, obj: ObjRef) -> Result<&RString, RuntimeError> {
        if obj.owner != self.owner {
            return Err(RuntimeError::ForeignValue);
        }
        self.objects
            .get(obj.index as usize)
            .ok_or(RuntimeError::ForeignValue)
    }

    /// Mutably borrow an object, rejecting references from other states
    pub fn get_mut(&mut self, obj: ObjRef) -> Result<&mut RString, RuntimeError> {
        if obj.owner != self.owner {
            return Err(RuntimeError::ForeignValue);
        }
        self.objects
            .get_mut(obj.index as usize)
            .ok_or(RuntimeError::ForeignValue)
    }

    /// Number of live objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.objects.capacity()
    }

    /// Drop every object, returning how many were released
    pub fn release_all(&mut self) -> usize {
        let released = self.objects.len();
        self.objects = Vec::new();
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_and_get() {
        let mut heap = Heap::with_capacity(7, 4, 10).unwrap();
        let obj = heap.alloc("hi".to_string()).unwrap();
        assert_eq!(heap.get(obj).unwrap().text, "hi");
        heap.get_mut(obj).unwrap().text.push('!');
        assert_eq!(heap.get(obj).unwrap().text, "hi!");
        assert!(heap.capacity() >= 4);
    }

    #[test]
    fn test_limit() {
        let mut heap = Heap::with_capacity(1, 0, 2).unwrap();
        heap.alloc(String::new()).unwrap();
        heap.alloc(String::new()).unwrap();
        assert_eq!(
            heap.alloc(String::new()),
            Err(RuntimeError::NoMemory { limit: 2 })
        );
    }

    #[test]
    fn test_foreign_reference() {
        let mut a = Heap::with_capacity(1, 0, 10).unwrap();
        let b = Heap::with_capacity(2, 0, 10).unwrap();
        let obj = a.alloc("a".to_string()).unwrap();
        assert_eq!(b.get(obj), Err(RuntimeError::ForeignValue));
    }

    #[test]
    fn test_release_all() {
        let mut heap = Heap::with_capacity(1, 0, 10).unwrap();
        let obj = heap.alloc("x".to_string()).unwrap();
        heap.alloc("y".to_string()).unwrap();
        assert_eq!(heap.release_all(), 2);
        assert!(heap.is_empty());
        assert_eq!(heap.get(obj), Err(RuntimeError::ForeignValue));
    }

    #[test]
    fn test_unsatisfiable_reservation() {
        assert!(Heap::with_capacity(1, usize::MAX, usize::MAX).is_err());
    }
}
