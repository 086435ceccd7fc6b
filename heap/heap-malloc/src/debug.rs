//! Free-list introspection for tests and diagnostics.
//!
//! Each hook hands a closure a shared view of one root under the proper
//! synchronisation: the global root with the allocator mutex held, the
//! calling thread's root through its thread-local. The views support the
//! invariant checks in the test suite ([`FreeList::blocks`],
//! [`FreeList::is_well_formed`]); they are not an allocation-introspection
//! API.

use crate::{lock_global, with_thread_list};
use heap_freelist::FreeList;

/// Run `f` against the global free list with the allocator mutex held.
///
/// Do not call allocator entry points from inside `f`; they would deadlock
/// on the mutex already held.
pub fn with_global_free_list<R>(f: impl FnOnce(&FreeList) -> R) -> R {
    f(&lock_global())
}

/// Run `f` against the calling thread's free list.
pub fn with_thread_free_list<R>(f: impl FnOnce(&FreeList) -> R) -> R {
    with_thread_list(|list| f(list))
}
