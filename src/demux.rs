//! RED (RFC 2198) redundancy demultiplexer.
//!
//! Strips the redundancy encapsulation from an incoming packet and
//! reconstructs the virtual media and FEC packets it carries. All parsing
//! is bounds-checked slice access over untrusted network bytes; malformed
//! input yields a [`RedParsingError`] and never desynchronizes state.
//!
//! RED block header layout (RFC 2198, Section 3):
//!
//! ```text
//!  0                   1                    2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3  4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |F|   block PT  |  timestamp offset         |   block length    |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! `F = 0` means the header is the single octet `F | block PT` and this is
//! the last block. At most two blocks are supported: one redundant block
//! with a 4-byte header followed by one primary block with a 1-byte header.

use bytes::{Bytes, BytesMut};

use crate::constants::{
    RED_BLOCK_LENGTH_HIGH_MASK, RED_COMBINED_HEADER_LENGTH_BYTES, RED_CONTINUATION_BIT_MASK,
    RED_EXTENDED_HEADER_LENGTH_BYTES, RED_MAX_BLOCKS, RED_PAYLOAD_TYPE_MASK,
    RED_PRIMARY_HEADER_LENGTH_BYTES, RED_TIMESTAMP_OFFSET_SHIFT, RTP_MARKER_BIT_MASK,
    RTP_MIN_HEADER_LENGTH_BYTES, RTP_PT_BYTE_OFFSET, RTP_SSRC_OFFSET_BYTES,
};
use crate::error::RedParsingError;
use crate::packet_defs::{DemuxedPackets, RtpHeaderInfo, VirtualPacket};
use crate::types::{PayloadType, Ssrc};

/// Demultiplexes one RED-encapsulated packet into its virtual packets.
///
/// Blocks whose 7-bit payload type equals `ulpfec_payload_type` are
/// classified as FEC; all others as media. Media virtual packets carry the
/// outer RTP header with the payload-type field rewritten to the block's
/// inner type; FEC virtual packets carry the raw FEC payload and, for
/// single-block FEC packets, the outer header's SSRC.
///
/// # Parameters
/// - `header`: Caller-parsed metadata for the outer RTP header.
/// - `packet`: The complete encapsulated packet as received.
/// - `ulpfec_payload_type`: Payload type that marks ULP-FEC blocks.
///
/// # Returns
/// One or two virtual packets in (media, FEC) order. An extended header
/// with a zero block length collapses to a single FEC packet. Any result
/// may have an empty buffer; callers drop empty results instead of
/// queueing them.
///
/// # Errors
/// - [`RedParsingError::TruncatedPacket`] - Packet too short for its headers
/// - [`RedParsingError::CorruptHeader`] - Non-zero timestamp offset
/// - [`RedParsingError::UnsupportedBlockCount`] - More than two blocks signaled
/// - [`RedParsingError::BlockLengthOverflow`] - Block length exceeds payload
pub fn demultiplex_red_packet(
    header: &RtpHeaderInfo,
    packet: &[u8],
    ulpfec_payload_type: PayloadType,
) -> Result<DemuxedPackets, RedParsingError> {
    if header.header_length < RTP_MIN_HEADER_LENGTH_BYTES || packet.len() < header.header_length {
        return Err(RedParsingError::TruncatedPacket {
            needed: header.header_length.max(RTP_MIN_HEADER_LENGTH_BYTES),
            got: packet.len(),
            context: "outer RTP header".to_string(),
        });
    }
    let header_length = header.header_length;
    let payload_length = packet.len() - header_length;
    if payload_length == 0 {
        return Err(RedParsingError::TruncatedPacket {
            needed: RED_PRIMARY_HEADER_LENGTH_BYTES,
            got: 0,
            context: "RED header".to_string(),
        });
    }

    let first_red_byte = packet[header_length];
    let block_pt = first_red_byte & RED_PAYLOAD_TYPE_MASK;
    let primary_is_fec = block_pt == ulpfec_payload_type.value();

    if first_red_byte & RED_CONTINUATION_BIT_MASK != 0 {
        // F bit set: 4-byte header plus at least the next block's header.
        let needed = RED_EXTENDED_HEADER_LENGTH_BYTES + RED_PRIMARY_HEADER_LENGTH_BYTES;
        if payload_length < needed {
            return Err(RedParsingError::TruncatedPacket {
                needed,
                got: payload_length,
                context: "extended RED header".to_string(),
            });
        }

        let timestamp_offset = (u16::from_be_bytes([
            packet[header_length + 1],
            packet[header_length + 2],
        ])) >> RED_TIMESTAMP_OFFSET_SHIFT;
        if timestamp_offset != 0 {
            // Redundancy is only produced at offset zero; anything else
            // indicates corruption rather than a legitimate layout.
            return Err(RedParsingError::CorruptHeader { timestamp_offset });
        }

        let block_length = usize::from(u16::from_be_bytes([
            packet[header_length + 2] & RED_BLOCK_LENGTH_HIGH_MASK,
            packet[header_length + 3],
        ]));

        if packet[header_length + RED_EXTENDED_HEADER_LENGTH_BYTES] & RED_CONTINUATION_BIT_MASK != 0
        {
            return Err(RedParsingError::UnsupportedBlockCount {
                max_supported: RED_MAX_BLOCKS,
            });
        }
        let available = payload_length - RED_COMBINED_HEADER_LENGTH_BYTES;
        if block_length > available {
            return Err(RedParsingError::BlockLengthOverflow {
                block_length,
                available,
            });
        }

        let data_offset = header_length + RED_COMBINED_HEADER_LENGTH_BYTES;
        let fec_packet = VirtualPacket {
            seq_num: header.sequence_number,
            is_fec: true,
            ssrc: None,
            data: Bytes::copy_from_slice(&packet[data_offset + block_length..]),
        };
        if block_length == 0 {
            // Degenerate split: the redundant media block is empty, so
            // only the FEC block remains.
            return Ok(DemuxedPackets {
                primary: fec_packet,
                secondary: None,
            });
        }

        // Two blocks: split into a media packet and an FEC packet.
        let primary = VirtualPacket {
            seq_num: header.sequence_number,
            is_fec: primary_is_fec,
            ssrc: None,
            data: rebuild_rtp_packet(
                &packet[..header_length],
                block_pt,
                &packet[data_offset..data_offset + block_length],
            ),
        };
        return Ok(DemuxedPackets {
            primary,
            secondary: Some(fec_packet),
        });
    }

    let data_offset = header_length + RED_PRIMARY_HEADER_LENGTH_BYTES;
    let primary = if primary_is_fec {
        // Pure FEC: raw payload only, tagged with the protected stream's
        // SSRC from the outer header.
        VirtualPacket {
            seq_num: header.sequence_number,
            is_fec: true,
            ssrc: Some(read_ssrc(packet)),
            data: Bytes::copy_from_slice(&packet[data_offset..]),
        }
    } else {
        VirtualPacket {
            seq_num: header.sequence_number,
            is_fec: false,
            ssrc: None,
            data: rebuild_rtp_packet(&packet[..header_length], block_pt, &packet[data_offset..]),
        }
    };
    Ok(DemuxedPackets {
        primary,
        secondary: None,
    })
}

/// Rebuilds a full virtual RTP packet: the outer header with the
/// payload-type field replaced by the block's inner type (marker bit
/// preserved), followed by the block payload.
fn rebuild_rtp_packet(rtp_header: &[u8], inner_payload_type: u8, payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(rtp_header.len() + payload.len());
    buf.extend_from_slice(rtp_header);
    buf[RTP_PT_BYTE_OFFSET] =
        (buf[RTP_PT_BYTE_OFFSET] & RTP_MARKER_BIT_MASK) | inner_payload_type;
    buf.extend_from_slice(payload);
    buf.freeze()
}

/// Reads the SSRC field from the outer RTP header.
///
/// The caller has already validated `packet` against the minimum RTP
/// header length.
fn read_ssrc(packet: &[u8]) -> Ssrc {
    Ssrc::new(u32::from_be_bytes([
        packet[RTP_SSRC_OFFSET_BYTES],
        packet[RTP_SSRC_OFFSET_BYTES + 1],
        packet[RTP_SSRC_OFFSET_BYTES + 2],
        packet[RTP_SSRC_OFFSET_BYTES + 3],
    ]))
}
