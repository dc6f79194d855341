//! # Handle Allocation
//!
//! Handles are minted from a per-session counter. The allocator is owned by
//! the boundary object that uses it; two hosts never share a counter unless
//! the caller hands them the same one.

use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use viewrpc::Handle;

/// Monotonic handle source. Starts at 0; never reuses a value.
#[derive(Debug, Default)]
pub struct HandleAllocator {
    next: AtomicU64,
}

impl HandleAllocator {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(first: u64) -> Self {
        Self { next: AtomicU64::new(first) }
    }

    pub fn allocate(&self) -> Handle {
        Handle(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Number of handles issued so far (for a zero-based allocator).
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

/// Identity of a proxy: the address of its shared core.
///
/// Two facades over the same core compare equal; two cores with equal
/// state do not.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectKey(usize);

impl ObjectKey {
    pub fn of<T>(core: &Arc<T>) -> Self {
        Self(Arc::as_ptr(core) as *const () as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocator_is_monotonic() {
        let alloc = HandleAllocator::new();
        assert_eq!(alloc.allocate(), Handle(0));
        assert_eq!(alloc.allocate(), Handle(1));
        assert_eq!(alloc.allocate(), Handle(2));
        assert_eq!(alloc.issued(), 3);
    }

    #[test]
    fn test_object_key_follows_the_arc() {
        let a = Arc::new(5u8);
        let b = Arc::new(5u8);
        assert_eq!(ObjectKey::of(&a), ObjectKey::of(&a.clone()));
        assert_ne!(ObjectKey::of(&a), ObjectKey::of(&b));
    }
}
