//! Shared plumbing for the integration tests.
//!
//! The heap is process-global and only ever grows, so tests within one
//! binary serialise on a guard mutex and assert on counter deltas rather
//! than absolute values. Scenarios that need an empty free-list root run on
//! the no-lock façade inside a freshly spawned thread.

#![allow(dead_code)]

use heap_freelist::HEADER_SIZE;
use std::sync::{Mutex, MutexGuard, PoisonError};

static HEAP_GUARD: Mutex<()> = Mutex::new(());

/// Serialise a test against the other tests of this binary.
pub fn heap_guard() -> MutexGuard<'static, ()> {
    let _ = env_logger::builder().is_test(true).try_init();
    HEAP_GUARD.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Footprint sum (header + payload) over the calling thread's free list.
pub fn thread_free_bytes() -> usize {
    heap_malloc::debug::with_thread_free_list(|list| {
        list.blocks().map(|b| HEADER_SIZE + b.size).sum()
    })
}

/// Payload sizes on the calling thread's free list, in address order.
pub fn thread_free_sizes() -> Vec<usize> {
    heap_malloc::debug::with_thread_free_list(|list| list.blocks().map(|b| b.size).collect())
}
