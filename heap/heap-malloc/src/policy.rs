//! Allocation policies: search, split-or-consume, extend on miss.

use crate::{brk, stats};
use heap_freelist::block::{self, HEADER_SIZE};
use heap_freelist::FreeList;

/// How a free-list search picks its candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Policy {
    /// First block that fits, in address order.
    FirstFit,
    /// Smallest block that fits; exact matches end the search early.
    BestFit,
}

/// How the heap is extended when the search misses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Growth {
    /// The caller's lock already serialises break advances.
    Direct,
    /// No allocator lock is held; the break gets its own narrow lock.
    Serialized,
}

/// Serve a `size`-byte request from `list`, extending the heap on a miss.
///
/// A candidate whose payload exceeds the request by more than a header is
/// split, keeping the high end free; anything smaller is consumed whole (a
/// split there would leave a zero-byte residual).
pub(crate) fn allocate(list: &mut FreeList, size: usize, policy: Policy, growth: Growth) -> *mut u8 {
    let candidate = match policy {
        Policy::FirstFit => list.first_fit(size),
        Policy::BestFit => list.best_fit(size),
    };

    if candidate.is_null() {
        return match growth {
            Growth::Direct => brk::grow(size),
            Growth::Serialized => brk::grow_serialized(size),
        };
    }

    // Safety: `candidate` came off the list walk above, so it is a valid
    // free block on `list`.
    unsafe {
        if block::size(candidate) > HEADER_SIZE + size {
            stats::pool_shrunk(HEADER_SIZE + size);
            let carved = list.split(candidate, size);
            block::payload_of(carved)
        } else {
            stats::pool_shrunk(block::footprint(candidate));
            list.remove(candidate);
            block::payload_of(candidate)
        }
    }
}

/// Return the block behind `ptr` to `list`. Null is a no-op.
///
/// # Safety
/// `ptr` must be null or a payload pointer previously produced against the
/// same `list` root and not freed since.
pub(crate) unsafe fn release(list: &mut FreeList, ptr: *mut u8) {
    if ptr.is_null() {
        return;
    }
    // Safety: per this function's contract, `ptr` is one of our payloads,
    // so a valid header precedes it.
    unsafe {
        let header = block::header_of(ptr);
        stats::pool_grew(block::footprint(header));
        list.insert(header);
    }
}
