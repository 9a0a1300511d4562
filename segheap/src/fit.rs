//! Fit search and heap extension: finding a free block for
//! an allocation request, or growing the region when nothing fits.
//!
//! These are `Heap<P>` methods rather than free functions — unlike
//! placement and coalescing, extension needs the provider and mutates
//! `end`, both of which only `Heap` owns.

use crate::heap::{Heap, EXTEND_SIZE};
use crate::list::{self, delete, MAX_CLASS_K, MIN_CLASS_K};
use crate::place;
use crate::provider::RegionProvider;
use crate::tag::{self, payload_offset, read_header, write_alloc_header};

impl<P: RegionProvider> Heap<P> {
    /// Finds a free block of at least `want` bytes, unlinks it, and
    /// splits it down to size via [`place::place`]. Searches size
    /// classes from the tightest that could possibly fit up through the
    /// large-size catch-all; extends the region if none fits.
    pub(crate) unsafe fn find_or_extend(&mut self, want: u32) -> Option<u32> {
        let start_k = want.leading_zeros().clamp(MIN_CLASS_K, MAX_CLASS_K);
        let start_class = (start_k - MIN_CLASS_K) as usize;

        for class in (0..=start_class).rev() {
            if let Some(header_offset) = unsafe { list::find_fit(self.mem(), class, want) } {
                unsafe {
                    let size = read_header(self.mem(), header_offset).size();
                    delete(self.mem(), payload_offset(header_offset));
                    place::place(self.mem(), header_offset, size, want);
                }
                return Some(header_offset);
            }
        }

        unsafe { self.extend_heap(want) }
    }

    /// Grows the region by `max(want, EXTEND_SIZE)` bytes. If the
    /// block preceding the current terminal is allocated, the new bytes
    /// become a fresh free block; if it's free, it is unlinked and
    /// extended to cover the new bytes instead, so the region never ends
    /// up with two adjacent free blocks. Either way, the terminal
    /// sentinel is relocated and placement runs on the result. Returns
    /// `None` on provider failure, leaving no partial state behind.
    unsafe fn extend_heap(&mut self, want: u32) -> Option<u32> {
        let old_terminal = self.end;
        let terminal = unsafe { read_header(self.mem(), old_terminal) };
        debug_assert!(terminal.size() == 0 && terminal.is_alloc());

        if terminal.is_prev_alloc() {
            let grow_by = (want as usize).max(EXTEND_SIZE);
            if self.provider.grow(grow_by).is_err() {
                return None;
            }

            let free_offset = old_terminal;
            let free_size = grow_by as u32;
            let new_terminal = free_offset + free_size;

            unsafe {
                tag::write_free(self.mem(), free_offset, free_size, true);
                write_alloc_header(self.mem(), new_terminal, 0, false);
            }
            self.end = new_terminal;

            unsafe { place::place(self.mem(), free_offset, free_size, want) };
            Some(free_offset)
        } else {
            let prev_offset = unsafe { place::prev_of(self.mem(), old_terminal) };
            let prev_size = unsafe { read_header(self.mem(), prev_offset).size() };
            let prev_prev_alloc = unsafe { read_header(self.mem(), prev_offset).is_prev_alloc() };

            let needed = want.saturating_sub(prev_size);
            let grow_by = (needed as usize).max(EXTEND_SIZE);
            if self.provider.grow(grow_by).is_err() {
                return None;
            }

            unsafe { delete(self.mem(), payload_offset(prev_offset)) };

            let new_size = prev_size + grow_by as u32;
            let new_terminal = prev_offset + new_size;

            unsafe {
                tag::write_free(self.mem(), prev_offset, new_size, prev_prev_alloc);
                write_alloc_header(self.mem(), new_terminal, 0, false);
            }
            self.end = new_terminal;

            unsafe { place::place(self.mem(), prev_offset, new_size, want) };
            Some(prev_offset)
        }
    }
}
