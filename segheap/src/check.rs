//! The debug-only heap consistency checker: walks the heap
//! linearly, then walks every segregated list, asserting the block-format
//! invariants (adjacency flags, footer/header agreement, list membership,
//! backlink consistency). A testing aid, never a production path — it
//! only ever reads, and callers decide whether a `false` return should
//! panic.

use core::panic::Location;

use crate::heap::{Heap, FIRST_BLOCK_OFFSET};
use crate::list::{self, class_of, NUM_CLASSES};
use crate::provider::RegionProvider;
use crate::tag::{self, header_offset, read_header};

impl<P: RegionProvider> Heap<P> {
    /// Walks the full heap and every free list, logging each violation
    /// found via [`log::error!`] with the caller's source location, and
    /// returning whether the heap is consistent. Never panics and never
    /// mutates state.
    #[track_caller]
    pub fn checkheap(&self) -> bool {
        let caller = Location::caller();
        let base = self.mem();
        let mut ok = true;

        let mut offset = FIRST_BLOCK_OFFSET;
        let mut prev_was_free = false;

        unsafe {
            while offset < self.end {
                let this = read_header(base, offset);
                let size = this.size();

                if size % 8 != 0 || size < tag::MIN_BLOCK_SIZE {
                    log::error!("{caller}: block at offset {offset} has invalid size {size}");
                    ok = false;
                }
                if tag::payload_offset(offset) % 8 != 0 {
                    log::error!("{caller}: block at offset {offset} has a misaligned payload");
                    ok = false;
                }

                if !this.is_alloc() {
                    let footer = read_header(base, offset + size - tag::FOOTER_SIZE);
                    if footer.size() != size {
                        log::error!(
                            "{caller}: free block at offset {offset} footer size {} disagrees with header size {size}",
                            footer.size()
                        );
                        ok = false;
                    }
                    if prev_was_free {
                        log::error!("{caller}: adjacent free blocks meeting at offset {offset}");
                        ok = false;
                    }
                }

                let next_offset = offset + size;
                if next_offset <= self.end {
                    let next = read_header(base, next_offset);
                    if next.is_prev_alloc() != this.is_alloc() {
                        log::error!(
                            "{caller}: block at offset {next_offset} prev_alloc disagrees with predecessor's alloc state"
                        );
                        ok = false;
                    }
                }

                prev_was_free = !this.is_alloc();
                offset = next_offset;
            }

            if offset != self.end {
                log::error!(
                    "{caller}: heap walk overshot the terminal sentinel (landed at {offset}, expected {})",
                    self.end
                );
                ok = false;
            }

            for class in 0..NUM_CLASSES {
                if !self.walk_class(class, caller) {
                    ok = false;
                }
            }
        }

        ok
    }

    unsafe fn walk_class(&self, class: usize, caller: &Location<'_>) -> bool {
        let base = self.mem();
        let sentinel = list::sentinel_offset(class);
        let mut ok = true;

        let mut node = unsafe { list::link_next(base, sentinel) };
        while node != sentinel {
            let ho = header_offset(node);
            let this = unsafe { read_header(base, ho) };

            if this.is_alloc() {
                log::error!(
                    "{caller}: allocated block at offset {ho} found in free list {class}"
                );
                ok = false;
            }

            let expected_class = class_of(this.size());
            if expected_class != class {
                log::error!(
                    "{caller}: block at offset {ho} (size {}) belongs in class {expected_class}, found in class {class}",
                    this.size()
                );
                ok = false;
            }

            let next = unsafe { list::link_next(base, node) };
            let back = unsafe { list::link_prev(base, next) };
            if back != node {
                log::error!("{caller}: broken backlink at offset {ho} in class {class}");
                ok = false;
            }

            node = next;
        }

        ok
    }
}
