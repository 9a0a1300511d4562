//! The region-granularity collaborator the allocator grows against.
//!
//! The core algorithm never talks to an OS or a test harness directly —
//! it only ever calls [`RegionProvider::grow`]. A `no_std` kernel wires
//! this to its page allocator; a `std` test wires it to a pre-allocated
//! backing buffer (`tests/support`). This is the only `Result` anywhere
//! in the crate's public surface — every other operation reports failure
//! as a null pointer, never an exception.

/// An `sbrk`-style, monotonically growing byte region.
///
/// Implementations must never shrink the region (returning pages back to
/// the host is out of scope) and must hand back
/// contiguous, immediately-adjacent bytes on every successful call — the
/// allocator assumes the region it has already seen never moves and the
/// newly granted bytes start exactly where the old tail ended.
pub trait RegionProvider {
    /// Extends the region by `n_bytes`, returning the address of the old
    /// tail (where the newly granted bytes begin) on success.
    ///
    /// # Errors
    /// Returns [`GrowError`] if the provider cannot satisfy the request.
    /// On error, the region is left exactly as it was — the allocator
    /// never leaves partial state behind a failed grow.
    fn grow(&mut self, n_bytes: usize) -> Result<usize, GrowError>;
}

/// Failure modes for [`RegionProvider::grow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GrowError {
    /// The provider has no more bytes to hand out (page table exhausted,
    /// backing allocation full, artificial test cap reached, ...).
    #[error("region provider refused to grow by the requested amount")]
    OutOfMemory,
    /// The requested growth would carry an offset past `u32::MAX`, which
    /// this allocator's 32-bit offsets and size fields cannot address.
    /// Allocations beyond the 32-bit size field, and regions large enough
    /// to need one, are out of scope for this allocator.
    #[error("requested growth would overflow the allocator's 32-bit offset space")]
    Overflow,
}
