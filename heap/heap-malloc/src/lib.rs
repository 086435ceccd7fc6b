//! # User-Space Free-List Allocator
//!
//! A `malloc`/`free`-style allocator over the program break. All backing
//! storage comes from `sbrk`; freed blocks are recycled through an
//! address-ordered free list with immediate coalescing, and the heap never
//! shrinks.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 Concurrency façades                 │
//! │   ff_*/bf_*/ts_*_lock → global root, one mutex      │
//! │   ts_*_nolock         → per-thread roots, no lock   │
//! └─────────────────┬───────────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────────┐
//! │               Allocation policies                   │
//! │   first-fit / best-fit search, split or consume,    │
//! │   extend on miss                                    │
//! └───────┬─────────────────────────────────┬───────────┘
//!         │                                 │
//! ┌───────▼──────────────────┐  ┌───────────▼───────────┐
//! │ Free list (heap-freelist)│  │ Heap extender (sbrk)  │
//! │ address-ordered,         │  │ sole memory source,   │
//! │ coalesce on insert       │  │ narrow break lock     │
//! └──────────────────────────┘  └───────────────────────┘
//! ```
//!
//! ## Choosing an entry-point family
//!
//! * [`ff_malloc`]/[`ff_free`] and [`bf_malloc`]/[`bf_free`] - the
//!   single-threaded first-fit and best-fit variants.
//! * [`ts_malloc_lock`]/[`ts_free_lock`] - thread-safe; every operation runs
//!   under one process-wide allocator mutex, all threads share one free
//!   list.
//! * [`ts_malloc_nolock`]/[`ts_free_nolock`] - thread-safe without an
//!   allocator lock; each thread recycles through its own free list and only
//!   the break advance itself is serialised. A block must be freed by the
//!   thread that allocated it.
//!
//! The thread-safe façades allocate best-fit over an address-ordered list:
//! best-fit keeps external fragmentation down on variable-size workloads,
//! and address order makes merging O(1) once the insertion point is known.
//!
//! ## Statistics
//!
//! [`get_data_segment_size`] reports every byte ever acquired from the
//! break; [`get_data_segment_free_space_size`] reports the bytes currently
//! on free lists (headers included in both). Under the no-lock façade the
//! counters are advisory: they are updated with relaxed atomics and may
//! lag the lists observed by any single thread.
//!
//! ## Example
//!
//! ```
//! let p = heap_malloc::bf_malloc(100);
//! assert!(!p.is_null());
//! unsafe {
//!     p.write_bytes(0xA5, 100);
//!     heap_malloc::bf_free(p);
//! }
//! // The freed footprint (header + payload) is back in the pool.
//! assert!(heap_malloc::get_data_segment_free_space_size() >= 124);
//! ```

#![allow(unsafe_code)]

mod brk;
pub mod debug;
mod policy;
mod stats;

use heap_freelist::FreeList;
use policy::{Growth, Policy};
use std::cell::RefCell;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Free list shared by the single-threaded entry points and the lock façade.
static GLOBAL_FREE_LIST: Mutex<FreeList> = Mutex::new(FreeList::new());

thread_local! {
    /// Per-thread root for the no-lock façade; empty until the thread's
    /// first free.
    static THREAD_FREE_LIST: RefCell<FreeList> = const { RefCell::new(FreeList::new()) };
}

/// Poisoning is ignored: the allocator must keep serving after an unrelated
/// panic elsewhere.
pub(crate) fn lock_global() -> MutexGuard<'static, FreeList> {
    GLOBAL_FREE_LIST
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn with_thread_list<R>(f: impl FnOnce(&mut FreeList) -> R) -> R {
    THREAD_FREE_LIST.with(|list| f(&mut list.borrow_mut()))
}

/// Allocate `size` bytes with the first-fit policy: the lowest-addressed
/// free block that fits is reused (split if oversized), and the heap is
/// extended when nothing fits.
///
/// Payloads are aligned no stronger than the block header itself; callers
/// needing more must overallocate.
///
/// # Examples
///
/// ```
/// let p = heap_malloc::ff_malloc(64);
/// assert!(!p.is_null());
/// unsafe {
///     p.write_bytes(0x11, 64);
///     heap_malloc::ff_free(p);
/// }
/// ```
#[must_use]
pub fn ff_malloc(size: usize) -> *mut u8 {
    policy::allocate(&mut lock_global(), size, Policy::FirstFit, Growth::Direct)
}

/// Return a block obtained from [`ff_malloc`] (or any other global-root
/// entry point) to the global free list. Null is a no-op.
///
/// # Safety
/// `ptr` must be null or a pointer returned by a global-root allocation of
/// this crate that has not been freed since. Foreign pointers and double
/// frees are undefined behaviour and are not detected.
pub unsafe fn ff_free(ptr: *mut u8) {
    unsafe { policy::release(&mut lock_global(), ptr) }
}

/// Allocate `size` bytes with the best-fit policy: the smallest sufficient
/// free block is reused (the first such block by address on ties, stopping
/// early on an exact match), and the heap is extended when nothing fits.
#[must_use]
pub fn bf_malloc(size: usize) -> *mut u8 {
    policy::allocate(&mut lock_global(), size, Policy::BestFit, Growth::Direct)
}

/// Return a block obtained from [`bf_malloc`] (or any other global-root
/// entry point) to the global free list. Null is a no-op.
///
/// # Safety
/// Same contract as [`ff_free`].
pub unsafe fn bf_free(ptr: *mut u8) {
    unsafe { policy::release(&mut lock_global(), ptr) }
}

/// Thread-safe best-fit allocation; the whole operation runs under the
/// process-wide allocator mutex and all threads share one free list.
///
/// # Examples
///
/// ```
/// use std::thread;
///
/// let workers: Vec<_> = (0..4)
///     .map(|_| {
///         thread::spawn(|| {
///             let p = heap_malloc::ts_malloc_lock(256);
///             assert!(!p.is_null());
///             unsafe { heap_malloc::ts_free_lock(p) };
///         })
///     })
///     .collect();
/// for worker in workers {
///     worker.join().unwrap();
/// }
/// ```
#[must_use]
pub fn ts_malloc_lock(size: usize) -> *mut u8 {
    policy::allocate(&mut lock_global(), size, Policy::BestFit, Growth::Direct)
}

/// Thread-safe free for blocks allocated through the global root.
///
/// # Safety
/// Same contract as [`ff_free`]; any thread may free the block.
pub unsafe fn ts_free_lock(ptr: *mut u8) {
    unsafe { policy::release(&mut lock_global(), ptr) }
}

/// Thread-safe best-fit allocation without an allocator lock: the search
/// and split run against the calling thread's own free list, and only the
/// break advance itself takes a (narrow, dedicated) lock.
#[must_use]
pub fn ts_malloc_nolock(size: usize) -> *mut u8 {
    with_thread_list(|list| policy::allocate(list, size, Policy::BestFit, Growth::Serialized))
}

/// Free a block allocated by [`ts_malloc_nolock`] on this same thread.
/// Null is a no-op.
///
/// # Safety
/// `ptr` must be null or a pointer returned by [`ts_malloc_nolock`] *on the
/// calling thread* and not freed since. Freeing a block on a different
/// thread corrupts the owning thread's free list; there is no cross-thread
/// return path. Foreign pointers and double frees are undefined behaviour.
pub unsafe fn ts_free_nolock(ptr: *mut u8) {
    with_thread_list(|list| unsafe { policy::release(list, ptr) })
}

/// Total bytes ever acquired from the program break, headers included.
/// Monotonically non-decreasing.
#[must_use]
pub fn get_data_segment_size() -> usize {
    stats::segment_size()
}

/// Bytes currently on free lists, headers included. Grows on free, shrinks
/// on allocation from the pool; advisory under the no-lock façade.
#[must_use]
pub fn get_data_segment_free_space_size() -> usize {
    stats::free_space()
}
