//! A segregated-free-list dynamic memory allocator over a host-supplied
//! byte region.
//!
//! The core — block layout, boundary-tag coalescing, segregated
//! free-list organization, fit search, and heap growth — never talks to
//! an OS or a test harness directly. It only ever calls out through
//! [`RegionProvider`], an `sbrk`-style growth primitive injected by
//! whoever embeds this crate: a `no_std` kernel's page allocator, or a
//! `std`-backed mock in this crate's own test suite.
//!
//! ```
//! use segheap::{GrowError, Heap, RegionProvider};
//!
//! struct FixedRegion {
//!     backing: Box<[u8]>,
//!     used: usize,
//! }
//!
//! impl RegionProvider for FixedRegion {
//!     fn grow(&mut self, n_bytes: usize) -> Result<usize, GrowError> {
//!         if self.used + n_bytes > self.backing.len() {
//!             return Err(GrowError::OutOfMemory);
//!         }
//!         let old_tail = self.backing.as_ptr() as usize + self.used;
//!         self.used += n_bytes;
//!         Ok(old_tail)
//!     }
//! }
//!
//! let region = FixedRegion { backing: vec![0u8; 64 * 1024].into_boxed_slice(), used: 0 };
//! let mut heap = Heap::init(region).expect("region provider should not refuse 4096 bytes");
//!
//! let p = heap.alloc(24);
//! assert!(!p.is_null());
//! heap.dealloc(p);
//! ```
//!
//! Single-threaded and non-reentrant by design — see
//! [`global::LockedHeap`] (behind the `global-alloc` feature) for a
//! `#[global_allocator]` adapter when a consumer needs to register one.
#![cfg_attr(not(any(test, doctest)), no_std)]

mod check;
mod fit;
pub mod heap;
pub mod list;
mod place;
pub mod provider;
pub mod tag;

#[cfg(feature = "global-alloc")]
pub mod global;

pub use heap::{Heap, HeapInitError};
pub use provider::{GrowError, RegionProvider};
pub use tag::Tag;

#[cfg(feature = "global-alloc")]
pub use global::LockedHeap;
