//! Stream flag bitmask.
//!
//! Flags ride along with every partial transfer and status event. They are
//! advisory hints exchanged with the device -- burst boundaries, timestamp
//! validity, fragmentation -- not caller-visible lifecycle state. Multiple
//! bits may be set at once.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Bitmask of per-transfer stream flags.
///
/// The numeric bit values match the wire-level convention used by
/// vendor-neutral SDR streaming layers, so a raw status word from a device
/// can be wrapped directly with [`StreamFlags::from_bits`].
///
/// Formatting via [`Display`](fmt::Display) produces the space-separated
/// label set in a stable canonical order, e.g. `"END_BURST HAS_TIME"`.
/// An empty mask formats as the empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StreamFlags(u32);

impl StreamFlags {
    /// No flags set.
    pub const NONE: StreamFlags = StreamFlags(0);

    /// This transfer is the last chunk of a logical burst. The device should
    /// flush and report completion through the status channel.
    pub const END_BURST: StreamFlags = StreamFlags(1 << 1);

    /// The timestamp accompanying this transfer or event is meaningful.
    pub const HAS_TIME: StreamFlags = StreamFlags(1 << 2);

    /// The burst was forcibly ended before its natural boundary.
    pub const END_ABRUPT: StreamFlags = StreamFlags(1 << 3);

    /// More fragments of the same logical transfer unit follow.
    pub const MORE_FRAGMENTS: StreamFlags = StreamFlags(1 << 4);

    /// The transfer must fit in a single transport packet.
    pub const ONE_PACKET: StreamFlags = StreamFlags(1 << 5);

    /// Canonical decode order for [`Display`](fmt::Display).
    const LABELS: [(StreamFlags, &'static str); 5] = [
        (StreamFlags::END_BURST, "END_BURST"),
        (StreamFlags::HAS_TIME, "HAS_TIME"),
        (StreamFlags::END_ABRUPT, "END_ABRUPT"),
        (StreamFlags::MORE_FRAGMENTS, "MORE_FRAGMENTS"),
        (StreamFlags::ONE_PACKET, "ONE_PACKET"),
    ];

    /// Wrap a raw bitmask. Unknown bits are preserved but never decoded.
    pub fn from_bits(bits: u32) -> Self {
        StreamFlags(bits)
    }

    /// Return the raw bitmask.
    pub fn bits(&self) -> u32 {
        self.0
    }

    /// Check whether every bit in `other` is set in `self`.
    pub fn contains(&self, other: StreamFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set all bits in `other`.
    pub fn insert(&mut self, other: StreamFlags) {
        self.0 |= other.0;
    }

    /// Clear all bits in `other`.
    pub fn remove(&mut self, other: StreamFlags) {
        self.0 &= !other.0;
    }

    /// Check whether no bits are set.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl BitOr for StreamFlags {
    type Output = StreamFlags;

    fn bitor(self, rhs: StreamFlags) -> StreamFlags {
        StreamFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for StreamFlags {
    fn bitor_assign(&mut self, rhs: StreamFlags) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for StreamFlags {
    type Output = StreamFlags;

    fn bitand(self, rhs: StreamFlags) -> StreamFlags {
        StreamFlags(self.0 & rhs.0)
    }
}

impl fmt::Display for StreamFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (flag, label) in StreamFlags::LABELS {
            if self.contains(flag) {
                if !first {
                    write!(f, " ")?;
                }
                write!(f, "{label}")?;
                first = false;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_mask_decodes_to_empty_string() {
        assert_eq!(StreamFlags::NONE.to_string(), "");
        assert_eq!(StreamFlags::default().to_string(), "");
    }

    #[test]
    fn single_flag_decodes_to_label() {
        assert_eq!(StreamFlags::END_BURST.to_string(), "END_BURST");
        assert_eq!(StreamFlags::HAS_TIME.to_string(), "HAS_TIME");
        assert_eq!(StreamFlags::END_ABRUPT.to_string(), "END_ABRUPT");
        assert_eq!(StreamFlags::MORE_FRAGMENTS.to_string(), "MORE_FRAGMENTS");
        assert_eq!(StreamFlags::ONE_PACKET.to_string(), "ONE_PACKET");
    }

    #[test]
    fn combined_flags_decode_in_canonical_order() {
        let flags = StreamFlags::END_BURST | StreamFlags::HAS_TIME;
        assert_eq!(flags.to_string(), "END_BURST HAS_TIME");

        // Order is canonical regardless of construction order.
        let mut flags = StreamFlags::HAS_TIME;
        flags |= StreamFlags::END_BURST;
        assert_eq!(flags.to_string(), "END_BURST HAS_TIME");
    }

    #[test]
    fn all_flags_decode_space_separated() {
        let all = StreamFlags::END_BURST
            | StreamFlags::HAS_TIME
            | StreamFlags::END_ABRUPT
            | StreamFlags::MORE_FRAGMENTS
            | StreamFlags::ONE_PACKET;
        assert_eq!(
            all.to_string(),
            "END_BURST HAS_TIME END_ABRUPT MORE_FRAGMENTS ONE_PACKET"
        );
    }

    #[test]
    fn contains_and_insert_remove() {
        let mut flags = StreamFlags::NONE;
        assert!(flags.is_empty());

        flags.insert(StreamFlags::END_BURST);
        assert!(flags.contains(StreamFlags::END_BURST));
        assert!(!flags.contains(StreamFlags::HAS_TIME));

        flags.insert(StreamFlags::HAS_TIME);
        assert!(flags.contains(StreamFlags::END_BURST | StreamFlags::HAS_TIME));

        flags.remove(StreamFlags::END_BURST);
        assert!(!flags.contains(StreamFlags::END_BURST));
        assert!(flags.contains(StreamFlags::HAS_TIME));
    }

    #[test]
    fn bits_round_trip() {
        let flags = StreamFlags::END_BURST | StreamFlags::ONE_PACKET;
        assert_eq!(StreamFlags::from_bits(flags.bits()), flags);
    }

    #[test]
    fn unknown_bits_preserved_but_not_decoded() {
        let flags = StreamFlags::from_bits((1 << 30) | StreamFlags::END_BURST.bits());
        assert_eq!(flags.to_string(), "END_BURST");
        assert_eq!(flags.bits() & (1 << 30), 1 << 30);
    }

    #[test]
    fn bitand_masks() {
        let flags = StreamFlags::END_BURST | StreamFlags::HAS_TIME;
        assert_eq!(flags & StreamFlags::END_BURST, StreamFlags::END_BURST);
        assert_eq!(flags & StreamFlags::ONE_PACKET, StreamFlags::NONE);
    }
}
