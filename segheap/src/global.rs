//! An optional `#[global_allocator]` adapter, behind the `global-alloc`
//! feature: not every consumer of the core algorithm wants to register a
//! process-wide allocator.
//!
//! A single-threaded `Locked<A>`-style wrapper: this allocator is not
//! thread-safe and never claims to be, so an `UnsafeCell` is enough —
//! adding a real spinlock here would misrepresent that as a guarantee
//! this allocator doesn't actually provide.

use core::alloc::{GlobalAlloc, Layout};
use core::cell::UnsafeCell;

use crate::heap::{Heap, HeapInitError};
use crate::provider::RegionProvider;

/// Wraps a [`Heap<P>`] in interior mutability so it can be registered as
/// `#[global_allocator]`.
///
/// # Safety
/// Every call through [`GlobalAlloc`] reaches the inner heap via an
/// `UnsafeCell` with no locking of its own. The embedding environment
/// must guarantee single-threaded, non-reentrant access — exactly what
/// this crate's core already assumes. A multi-threaded
/// consumer must serialize access itself (disable interrupts, wrap this
/// in its own spinlock, ...) before registering it.
pub struct LockedHeap<P: RegionProvider> {
    inner: UnsafeCell<Option<Heap<P>>>,
}

// SAFETY: `Sync` is required by `#[global_allocator]`. Actual exclusion
// is the caller's responsibility, per the struct's safety contract.
unsafe impl<P: RegionProvider> Sync for LockedHeap<P> {}

impl<P: RegionProvider> LockedHeap<P> {
    /// An allocator with no heap yet. Must be followed by [`Self::init`]
    /// before any allocation reaches it.
    #[must_use]
    pub const fn uninit() -> Self {
        Self {
            inner: UnsafeCell::new(None),
        }
    }

    /// Brings up the underlying heap. Must be called exactly once,
    /// before any allocation request reaches this allocator (typically
    /// very early in boot, before `alloc::vec::Vec` or similar are used).
    ///
    /// # Errors
    /// Propagates [`HeapInitError`] if the provider refuses the initial
    /// grant.
    pub fn init(&self, provider: P) -> Result<(), HeapInitError> {
        let heap = Heap::init(provider)?;
        unsafe { *self.inner.get() = Some(heap) };
        Ok(())
    }

    #[inline]
    unsafe fn with_heap<R>(&self, f: impl FnOnce(&mut Heap<P>) -> R) -> R {
        let heap = unsafe { (*self.inner.get()).as_mut() }
            .expect("LockedHeap used before init()");
        f(heap)
    }
}

unsafe impl<P: RegionProvider> GlobalAlloc for LockedHeap<P> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        debug_assert!(layout.align() <= 8, "segheap supports at most 8-byte alignment");
        unsafe { self.with_heap(|heap| heap.alloc(layout.size())) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        unsafe { self.with_heap(|heap| heap.dealloc(ptr)) }
    }

    unsafe fn realloc(&self, ptr: *mut u8, _layout: Layout, new_size: usize) -> *mut u8 {
        unsafe { self.with_heap(|heap| heap.realloc(ptr, new_size)) }
    }
}
