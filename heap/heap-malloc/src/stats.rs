//! Heap-wide statistics.
//!
//! Two process-wide counters with relaxed atomic updates: exact under the
//! lock façade (every update happens inside the allocator mutex), advisory
//! under the no-lock façade (threads update them concurrently without
//! further ordering).

use core::sync::atomic::{AtomicUsize, Ordering};

/// Total bytes ever acquired from the program break (headers included).
/// Never decreases; the heap is not returned to the operating system.
static DATA_SEGMENT_SIZE: AtomicUsize = AtomicUsize::new(0);

/// Bytes currently sitting on any free list (headers included).
static DATA_SEGMENT_FREE_SPACE: AtomicUsize = AtomicUsize::new(0);

pub(crate) fn segment_grew(bytes: usize) {
    DATA_SEGMENT_SIZE.fetch_add(bytes, Ordering::Relaxed);
}

pub(crate) fn pool_grew(bytes: usize) {
    DATA_SEGMENT_FREE_SPACE.fetch_add(bytes, Ordering::Relaxed);
}

pub(crate) fn pool_shrunk(bytes: usize) {
    DATA_SEGMENT_FREE_SPACE.fetch_sub(bytes, Ordering::Relaxed);
}

pub(crate) fn segment_size() -> usize {
    DATA_SEGMENT_SIZE.load(Ordering::Relaxed)
}

pub(crate) fn free_space() -> usize {
    DATA_SEGMENT_FREE_SPACE.load(Ordering::Relaxed)
}
