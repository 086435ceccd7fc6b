//! Heap extension through the program break.
//!
//! `sbrk` is the sole source of backing storage: every block is born here,
//! handed to the caller as allocated, and never returned to the operating
//! system. The break is process-wide state; [`grow_serialized`] brackets the
//! `sbrk` call with a dedicated mutex for callers that hold no allocator
//! lock, while [`grow`] relies on the caller's lock already serialising the
//! advance.

use crate::stats;
use heap_freelist::block::{self, BlockHeader, HEADER_SIZE};
use log::{error, trace};
use std::process;
use std::sync::{Mutex, PoisonError};

/// Serialises concurrent break advances only; never held together with the
/// allocator mutex (the two are used by mutually exclusive façades).
static BRK_LOCK: Mutex<()> = Mutex::new(());

#[derive(Debug, thiserror::Error)]
pub(crate) enum BrkError {
    /// The kernel refused to move the program break.
    #[error("program break could not be advanced by {0} bytes")]
    Exhausted(usize),
}

/// Advance the break by `bytes` and return the start of the fresh region.
fn advance_break(bytes: usize) -> Result<*mut BlockHeader, BrkError> {
    let increment = libc::intptr_t::try_from(bytes).map_err(|_| BrkError::Exhausted(bytes))?;
    // Safety: `sbrk` has no memory-safety preconditions; it either moves the
    // break or reports failure.
    let raw = unsafe { libc::sbrk(increment) };
    if raw as isize == -1 {
        return Err(BrkError::Exhausted(bytes));
    }
    Ok(raw.cast::<BlockHeader>())
}

/// Create a fresh block with a `size`-byte payload straight from the break.
///
/// The caller's allocator lock (or single-threadedness) must already
/// serialise break advances.
pub(crate) fn grow(size: usize) -> *mut u8 {
    finish(advance_break(HEADER_SIZE + size), size)
}

/// Like [`grow`], but the `sbrk` call itself runs under [`BRK_LOCK`]. Used
/// when no allocator lock is held: the fresh region is exclusively ours the
/// moment `sbrk` returns, so only the advance needs serialising and the
/// header is initialised after the lock is dropped.
pub(crate) fn grow_serialized(size: usize) -> *mut u8 {
    let total = HEADER_SIZE + size;
    let result = {
        let _guard = BRK_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        advance_break(total)
    };
    finish(result, size)
}

/// Initialise the fresh block and account for it, or die trying.
///
/// Heap exhaustion is the one non-local error in the allocator and the
/// policy is fatal: log a diagnostic and abort.
fn finish(result: Result<*mut BlockHeader, BrkError>, size: usize) -> *mut u8 {
    let header = match result {
        Ok(header) => header,
        Err(err) => {
            error!("heap extension failed: {err}");
            process::abort();
        }
    };
    trace!("program break advanced by {} bytes", HEADER_SIZE + size);
    stats::segment_grew(HEADER_SIZE + size);
    // Safety: the region past the old break is ours alone and spans
    // `HEADER_SIZE + size` writable bytes.
    unsafe {
        block::write_new(header, size);
        block::payload_of(header)
    }
}
