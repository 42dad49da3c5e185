//! Packet definitions shared across the receive pipeline.
//!
//! Defines the caller-supplied header metadata for an incoming
//! RED-encapsulated packet, the virtual packets the demultiplexer
//! reconstructs from it, and the fixed-capacity demultiplexer output.

use bytes::Bytes;

use crate::types::{SequenceNumber, Ssrc};

/// Parsed RTP header metadata for an incoming encapsulated packet.
///
/// The network layer parses the outer RTP header before handing the
/// packet to this pipeline; only the fields the demultiplexer needs are
/// carried here. The total packet length is implied by the byte slice
/// passed alongside this struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtpHeaderInfo {
    /// Sequence number of the outer packet; owning sequence number of
    /// every virtual packet reconstructed from it.
    pub sequence_number: SequenceNumber,
    /// Length in bytes of the outer RTP header, including CSRC entries
    /// and extensions.
    pub header_length: usize,
}

/// A logical packet reconstructed in memory from a RED-encapsulated
/// packet, not necessarily ever sent standalone on the wire.
///
/// Media-classified packets hold a full virtual RTP packet (original
/// outer header with the payload-type field corrected, followed by the
/// block payload). FEC-classified packets hold the raw FEC payload only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualPacket {
    /// Sequence number of the encapsulated packet this was carried in.
    pub seq_num: SequenceNumber,
    /// Whether this block was classified as FEC rather than media.
    pub is_fec: bool,
    /// Protected stream's SSRC, filled only for pure-FEC packets that
    /// carry their own SSRC field.
    pub ssrc: Option<Ssrc>,
    /// Owned packet bytes; refcounted so delivery can clone cheaply.
    pub data: Bytes,
}

/// A virtual packet reconstructed by the decode engine, annotated with
/// its delivery state.
///
/// The orchestrator marks `delivered` after the consumer accepts the
/// packet, guaranteeing at-most-once delivery even if the engine keeps
/// reporting the packet in its recovered set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredPacket {
    pub pkt: VirtualPacket,
    pub delivered: bool,
}

impl RecoveredPacket {
    /// Wraps a freshly reconstructed packet, not yet delivered.
    pub fn new(pkt: VirtualPacket) -> Self {
        RecoveredPacket {
            pkt,
            delivered: false,
        }
    }
}

/// Fixed-capacity demultiplexer output: one primary virtual packet and,
/// for two-block packets, a secondary FEC packet.
///
/// Every successful parse yields exactly one primary packet; the
/// secondary exists only when a valid redundant block was split out.
/// Modeled as a pair rather than a heap-allocated list to keep the hot
/// path allocation-free beyond the packet buffers themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemuxedPackets {
    pub primary: VirtualPacket,
    pub secondary: Option<VirtualPacket>,
}

impl DemuxedPackets {
    /// Number of virtual packets produced (1 or 2).
    pub fn len(&self) -> usize {
        1 + self.secondary.is_some() as usize
    }

    /// Always false; a successful parse produces at least one packet.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterates the packets in (primary, secondary) order.
    pub fn iter(&self) -> impl Iterator<Item = &VirtualPacket> {
        std::iter::once(&self.primary).chain(self.secondary.as_ref())
    }
}

impl IntoIterator for DemuxedPackets {
    type Item = VirtualPacket;
    type IntoIter =
        std::iter::Chain<std::iter::Once<VirtualPacket>, std::option::IntoIter<VirtualPacket>>;

    fn into_iter(self) -> Self::IntoIter {
        std::iter::once(self.primary).chain(self.secondary)
    }
}
