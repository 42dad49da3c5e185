//! RED (RFC 2198) and RTP wire-format constants and bitmasks.
//!
//! Defines the header layout constants shared by the redundancy
//! demultiplexer and its tests. Decoder-specific constants live in the
//! `decoder` module.

// --- RED Header Structure (RFC 2198, Section 3) ---

/// Mask for the F (continuation) bit in a RED block header octet.
pub const RED_CONTINUATION_BIT_MASK: u8 = 0x80;
/// Mask for the 7-bit block payload type in a RED block header octet.
pub const RED_PAYLOAD_TYPE_MASK: u8 = 0x7F;
/// Length of the terminating (F = 0) RED block header in bytes.
pub const RED_PRIMARY_HEADER_LENGTH_BYTES: usize = 1;
/// Length of a non-terminating (F = 1) RED block header in bytes.
pub const RED_EXTENDED_HEADER_LENGTH_BYTES: usize = 4;
/// Combined header length when two blocks are present: one extended
/// header followed by one terminating single-byte header.
pub const RED_COMBINED_HEADER_LENGTH_BYTES: usize =
    RED_EXTENDED_HEADER_LENGTH_BYTES + RED_PRIMARY_HEADER_LENGTH_BYTES;
/// Mask for the two high bits of the 10-bit block length, found in the
/// low bits of the extended header's third octet.
pub const RED_BLOCK_LENGTH_HIGH_MASK: u8 = 0x03;
/// Right-shift applied to the first two extended-header octets to
/// extract the 14-bit timestamp offset.
pub const RED_TIMESTAMP_OFFSET_SHIFT: u32 = 2;
/// Maximum number of RED blocks this demultiplexer supports per packet.
pub const RED_MAX_BLOCKS: u8 = 2;

// --- RTP Header Fields (RFC 3550, Section 5.1) ---

/// Minimum RTP header length in bytes (no CSRC entries).
pub const RTP_MIN_HEADER_LENGTH_BYTES: usize = 12;
/// Byte offset of the SSRC field within an RTP header.
pub const RTP_SSRC_OFFSET_BYTES: usize = 8;
/// Byte offset of the marker/payload-type octet within an RTP header.
pub const RTP_PT_BYTE_OFFSET: usize = 1;
/// Mask for the marker bit in the RTP marker/payload-type octet.
pub const RTP_MARKER_BIT_MASK: u8 = 0x80;
