//! A `std`-only mock [`RegionProvider`] for integration tests: a single,
//! pre-allocated backing buffer that `grow()` carves into with a moving
//! high-water mark. The backing allocation never moves once created, so
//! addresses handed out to the heap stay stable for the life of the
//! test — recovering a fixed base address without this crate having to
//! hard-code one.

use segheap::{GrowError, RegionProvider};

pub struct MockProvider {
    backing: Box<[u8]>,
    used: usize,
    /// Total bytes this provider will ever hand out, independent of
    /// `backing`'s own length — lets a test simulate OOM well before the
    /// backing buffer is actually exhausted.
    cap_bytes: usize,
}

impl MockProvider {
    /// `capacity` bytes of backing storage, all of it available to grow
    /// into.
    pub fn new(capacity: usize) -> Self {
        Self {
            backing: vec![0u8; capacity].into_boxed_slice(),
            used: 0,
            cap_bytes: capacity,
        }
    }

    /// `capacity` bytes of backing storage, but `grow()` refuses once
    /// `cap_bytes` total have been handed out — for exercising the OOM
    /// path without needing a multi-gigabyte backing allocation.
    pub fn with_cap(capacity: usize, cap_bytes: usize) -> Self {
        Self {
            backing: vec![0u8; capacity].into_boxed_slice(),
            used: 0,
            cap_bytes,
        }
    }
}

impl RegionProvider for MockProvider {
    fn grow(&mut self, n_bytes: usize) -> Result<usize, GrowError> {
        let new_used = self.used.checked_add(n_bytes).ok_or(GrowError::Overflow)?;
        if new_used > self.cap_bytes || new_used > self.backing.len() {
            return Err(GrowError::OutOfMemory);
        }

        let old_tail = self.backing.as_ptr() as usize + self.used;
        self.used = new_used;
        Ok(old_tail)
    }
}
