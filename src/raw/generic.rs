use super::bitmask::BitMask;
use std::mem;

pub type BitMaskWord = u64;
pub const BITMASK_STRIDE: usize = 8;
// We only care about the highest bit of each byte for the mask.
pub const BITMASK_MASK: BitMaskWord = 0x8080_8080_8080_8080;

/// Helper function to replicate a byte across a `GroupWord`.
#[inline]
fn repeat(byte: u8) -> BitMaskWord {
    BitMaskWord::from_ne_bytes([byte; Group::WIDTH])
}

/// Abstraction over a group of control bytes which can be scanned in
/// parallel.
///
/// This implementation uses a word-sized integer. The word is always read in
/// little-endian order so that the lowest bit of the mask belongs to the
/// lowest control byte.
#[derive(Copy, Clone)]
pub struct Group(BitMaskWord);

#[allow(clippy::use_self)]
impl Group {
    /// Number of bytes in the group.
    pub const WIDTH: usize = mem::size_of::<Self>();

    /// Loads a group of bytes starting at `pos` in the control byte array.
    ///
    /// `ctrl` must hold at least `pos + Group::WIDTH` bytes, which is always
    /// the case for positions within a table since the first group is
    /// replicated past the last bucket.
    #[inline]
    pub fn load(ctrl: &[u8], pos: usize) -> Self {
        let mut bytes = [0; Group::WIDTH];
        bytes.copy_from_slice(&ctrl[pos..pos + Group::WIDTH]);
        Group(BitMaskWord::from_le_bytes(bytes))
    }

    /// Returns a `BitMask` indicating all bytes in the group which *may*
    /// have the given value.
    ///
    /// This function may return a false positive in certain cases where
    /// the byte in the group differs from the searched value only in its
    /// lowest bit. Callers always compare the full key afterwards.
    #[inline]
    pub fn match_byte(self, byte: u8) -> BitMask {
        // This algorithm is derived from
        // https://graphics.stanford.edu/~seander/bithacks.html##ValueInWord
        let cmp = self.0 ^ repeat(byte);
        BitMask(cmp.wrapping_sub(repeat(0x01)) & !cmp & repeat(0x80))
    }

    /// Returns a `BitMask` indicating all bytes in the group which are
    /// `EMPTY`.
    #[inline]
    pub fn match_empty(self) -> BitMask {
        // Full buckets always have their top bit clear.
        BitMask(self.0 & repeat(0x80))
    }

    /// Returns a `BitMask` indicating all bytes in the group which are full.
    #[inline]
    pub fn match_full(self) -> BitMask {
        self.match_empty().invert()
    }
}
