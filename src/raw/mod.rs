//! Control byte groups shared by the table and its iterators.

pub(crate) mod bitmask;
pub(crate) mod generic;

pub(crate) use generic as imp;

/// Control byte value for an empty bucket.
pub(crate) const EMPTY: u8 = 0b1111_1111;

/// Checks whether a control byte represents a full bucket (top bit is clear).
#[inline]
pub(crate) fn is_full(ctrl: u8) -> bool {
    ctrl & 0x80 == 0
}
