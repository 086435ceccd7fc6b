//! Block header layout and pointer arithmetic.
//!
//! Headers are embedded in the heap at whatever address the previous block
//! ended on. Payload sizes are not rounded, so a header may start at any
//! byte address; forming a `&BlockHeader` would therefore be unsound. All
//! field access goes through the unaligned raw-pointer accessors below, and
//! no other module reads or writes header memory directly.

use core::ptr::null_mut;
use static_assertions::{const_assert, const_assert_eq};

/// Bookkeeping record at the start of every block, allocated or free.
///
/// `next` and `prev` are meaningful only while the block is on a free list;
/// an allocated block carries null links.
#[repr(C)]
pub struct BlockHeader {
    size: usize,
    next: *mut BlockHeader,
    prev: *mut BlockHeader,
}

/// Size of [`BlockHeader`] in bytes; the fixed distance between a header and
/// its payload.
pub const HEADER_SIZE: usize = size_of::<BlockHeader>();

// The header is three machine words; the payload offset follows from that.
const_assert_eq!(
    HEADER_SIZE,
    size_of::<usize>() + 2 * size_of::<*mut BlockHeader>()
);
const_assert!(align_of::<BlockHeader>() == align_of::<usize>());

/// Payload byte count of the block at `header`.
///
/// # Safety
/// `header` must point to an initialised block header.
#[inline]
#[must_use]
pub unsafe fn size(header: *mut BlockHeader) -> usize {
    unsafe { (&raw const (*header).size).read_unaligned() }
}

/// Overwrite the payload byte count of the block at `header`.
///
/// # Safety
/// `header` must point to an initialised block header, and the block must
/// actually extend `size` bytes past the header.
#[inline]
pub unsafe fn set_size(header: *mut BlockHeader, size: usize) {
    unsafe { (&raw mut (*header).size).write_unaligned(size) }
}

/// Successor link of the block at `header` (null when last or allocated).
///
/// # Safety
/// `header` must point to an initialised block header.
#[inline]
#[must_use]
pub unsafe fn next(header: *mut BlockHeader) -> *mut BlockHeader {
    unsafe { (&raw const (*header).next).read_unaligned() }
}

/// # Safety
/// `header` must point to an initialised block header.
#[inline]
pub unsafe fn set_next(header: *mut BlockHeader, next: *mut BlockHeader) {
    unsafe { (&raw mut (*header).next).write_unaligned(next) }
}

/// Predecessor link of the block at `header` (null when first or allocated).
///
/// # Safety
/// `header` must point to an initialised block header.
#[inline]
#[must_use]
pub unsafe fn prev(header: *mut BlockHeader) -> *mut BlockHeader {
    unsafe { (&raw const (*header).prev).read_unaligned() }
}

/// # Safety
/// `header` must point to an initialised block header.
#[inline]
pub unsafe fn set_prev(header: *mut BlockHeader, prev: *mut BlockHeader) {
    unsafe { (&raw mut (*header).prev).write_unaligned(prev) }
}

/// Initialise a fresh header: the given payload `size`, null links.
///
/// # Safety
/// `header` must point to `HEADER_SIZE` writable bytes exclusively owned by
/// the caller.
#[inline]
pub unsafe fn write_new(header: *mut BlockHeader, size: usize) {
    unsafe {
        header.write_unaligned(BlockHeader {
            size,
            next: null_mut(),
            prev: null_mut(),
        });
    }
}

/// The payload pointer belonging to `header`.
///
/// # Safety
/// `header` must point to a block header followed by its payload.
#[inline]
#[must_use]
pub unsafe fn payload_of(header: *mut BlockHeader) -> *mut u8 {
    unsafe { header.cast::<u8>().add(HEADER_SIZE) }
}

/// The header belonging to the payload pointer `payload`.
///
/// # Safety
/// `payload` must be a payload pointer previously derived from a block
/// header (the inverse of [`payload_of`]).
#[inline]
#[must_use]
pub unsafe fn header_of(payload: *mut u8) -> *mut BlockHeader {
    unsafe { payload.sub(HEADER_SIZE).cast::<BlockHeader>() }
}

/// Total bytes the block occupies on the heap: header plus payload.
///
/// # Safety
/// `header` must point to an initialised block header.
#[inline]
#[must_use]
pub unsafe fn footprint(header: *mut BlockHeader) -> usize {
    HEADER_SIZE + unsafe { size(header) }
}

/// One-past-the-end address of the block at `header`.
///
/// # Safety
/// `header` must point to an initialised block header.
#[inline]
#[must_use]
pub unsafe fn end_of(header: *mut BlockHeader) -> usize {
    header as usize + unsafe { footprint(header) }
}

/// Whether `upper` begins exactly where `lower` ends, i.e. the two blocks
/// are physically contiguous and may be merged.
///
/// # Safety
/// Both pointers must point to initialised block headers.
#[inline]
#[must_use]
pub unsafe fn are_adjacent(lower: *mut BlockHeader, upper: *mut BlockHeader) -> bool {
    unsafe { end_of(lower) == upper as usize }
}
