//! Fuzz testing harnesses for redfec components.
//!
//! This module contains fuzz targets for verifying the robustness of the
//! RED demultiplexer and the receive pipeline against malformed inputs.
//! Every harness must tolerate arbitrary bytes without panicking; parse
//! failures are expected outcomes, not defects.

use std::sync::Arc;

use crate::demux::demultiplex_red_packet;
use crate::packet_defs::RtpHeaderInfo;
use crate::receiver::UlpfecReceiver;
use crate::traits::RecoveredPacketSink;
use crate::types::{PayloadType, Ssrc};

const HARNESS_ULPFEC_PAYLOAD_TYPE: u8 = 127;

struct DiscardingSink;

impl RecoveredPacketSink for DiscardingSink {
    fn on_recovered_packet(&self, _packet: &[u8]) -> bool {
        true
    }
}

/// Fuzz tests the RED demultiplexer.
///
/// Treats `data` as a complete encapsulated packet and demultiplexes it
/// under several plausible outer-header lengths. Must never panic.
///
/// # Parameters
/// - `data`: Fuzzer-generated input treated as an encapsulated packet
pub fn red_demultiplexer_harness(data: &[u8]) {
    for header_length in [12usize, 16, 20, 32] {
        let header = RtpHeaderInfo {
            sequence_number: 100.into(),
            header_length,
        };
        let _ = demultiplex_red_packet(
            &header,
            data,
            PayloadType::new(HARNESS_ULPFEC_PAYLOAD_TYPE),
        );
    }
}

/// Fuzz tests the full receive pipeline.
///
/// Submits fuzzer-generated bytes through a receiver with the default
/// decode engine and drives one processing step. Must never panic and
/// must leave the receiver usable for further submissions.
///
/// # Parameters
/// - `data`: Fuzzer-generated input treated as an encapsulated packet
pub fn receive_pipeline_harness(data: &[u8]) {
    let receiver = UlpfecReceiver::new(Ssrc::new(0x1234), Arc::new(DiscardingSink));
    let header = RtpHeaderInfo {
        sequence_number: 1.into(),
        header_length: 12,
    };
    let _ = receiver.add_received_red_packet(
        &header,
        data,
        PayloadType::new(HARNESS_ULPFEC_PAYLOAD_TYPE),
    );
    let _ = receiver.process_received_fec();
}
