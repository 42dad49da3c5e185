//! Common test utilities for redfec integration tests.
//!
//! Provides shared helpers for building RED-encapsulated packets, the
//! virtual packets the demultiplexer should reconstruct from them, and a
//! collecting consumer sink.

#![allow(dead_code)] // Allow dead code for helpers unused by individual suites

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use redfec::packet_defs::RtpHeaderInfo;
use redfec::traits::RecoveredPacketSink;

/// Outer payload type carrying the RED encapsulation.
pub const RED_PT: u8 = 98;
/// Inner payload type of the protected media stream.
pub const MEDIA_PT: u8 = 96;
/// Inner payload type marking ULP-FEC blocks.
pub const ULPFEC_PT: u8 = 127;
/// SSRC used by all test packets.
pub const TEST_SSRC: u32 = 0x1234_5678;

/// Builds a minimal 12-byte RTP header.
pub fn rtp_header(seq: u16, ssrc: u32, payload_type: u8) -> Vec<u8> {
    let mut hdr = vec![0u8; 12];
    hdr[0] = 0x80; // version 2, no padding/extension/CSRC
    hdr[1] = payload_type;
    hdr[2..4].copy_from_slice(&seq.to_be_bytes());
    hdr[8..12].copy_from_slice(&ssrc.to_be_bytes());
    hdr
}

/// Caller-side header metadata matching the packets built here.
pub fn header_info(seq: u16) -> RtpHeaderInfo {
    RtpHeaderInfo {
        sequence_number: seq.into(),
        header_length: 12,
    }
}

/// RED packet with a single media block.
pub fn red_media_packet(seq: u16, payload: &[u8]) -> Vec<u8> {
    let mut pkt = rtp_header(seq, TEST_SSRC, RED_PT);
    pkt.push(MEDIA_PT);
    pkt.extend_from_slice(payload);
    pkt
}

/// RED packet with a single ULP-FEC block.
pub fn red_fec_packet(seq: u16, fec_payload: &[u8]) -> Vec<u8> {
    let mut pkt = rtp_header(seq, TEST_SSRC, RED_PT);
    pkt.push(ULPFEC_PT);
    pkt.extend_from_slice(fec_payload);
    pkt
}

/// RED packet with a redundant media block followed by an FEC block.
pub fn red_two_block_packet(seq: u16, media_payload: &[u8], fec_payload: &[u8]) -> Vec<u8> {
    let mut pkt = rtp_header(seq, TEST_SSRC, RED_PT);
    let block_length = media_payload.len() as u16;
    pkt.push(0x80 | MEDIA_PT); // F=1, media block
    pkt.push(0); // timestamp offset (zero) high bits
    pkt.push(((block_length >> 8) & 0x03) as u8);
    pkt.push(block_length as u8);
    pkt.push(ULPFEC_PT); // F=0, terminating FEC block
    pkt.extend_from_slice(media_payload);
    pkt.extend_from_slice(fec_payload);
    pkt
}

/// The virtual RTP packet the demultiplexer reconstructs for a media
/// block of `red_media_packet(seq, payload)`: the outer header with the
/// payload type rewritten, followed by the payload.
pub fn virtual_media_packet(seq: u16, payload: &[u8]) -> Vec<u8> {
    let mut pkt = rtp_header(seq, TEST_SSRC, MEDIA_PT);
    pkt.extend_from_slice(payload);
    pkt
}

/// Consumer sink recording every delivered packet.
///
/// Switch `set_accept(false)` to make the next delivery return `false`.
#[derive(Default)]
pub struct CollectingSink {
    packets: Mutex<Vec<Vec<u8>>>,
    accept: AtomicBool,
}

impl CollectingSink {
    pub fn new() -> Self {
        CollectingSink {
            packets: Mutex::new(Vec::new()),
            accept: AtomicBool::new(true),
        }
    }

    pub fn set_accept(&self, accept: bool) {
        self.accept.store(accept, Ordering::SeqCst);
    }

    pub fn packets(&self) -> Vec<Vec<u8>> {
        self.packets.lock().unwrap().clone()
    }

    pub fn delivery_count(&self) -> usize {
        self.packets.lock().unwrap().len()
    }
}

impl RecoveredPacketSink for CollectingSink {
    fn on_recovered_packet(&self, packet: &[u8]) -> bool {
        self.packets.lock().unwrap().push(packet.to_vec());
        self.accept.load(Ordering::SeqCst)
    }
}
