//! `redfec`: a memory-safe receive-side RED/ULP-FEC pipeline in Rust.
//!
//! This library demultiplexes RED-encapsulated (RFC 2198) media packets,
//! drives an erasure-recovery engine over the ULP-FEC (RFC 5109) payloads
//! they carry, and delivers both originally-received and recovered media
//! packets to a downstream consumer exactly once, in a thread-safe manner.
//! The primary entry point is the [`UlpfecReceiver`].
//!
//! ## Core Concepts
//!
//! - **[`UlpfecReceiver`]**: The recovery orchestrator. Feed it each
//!   arriving encapsulated packet, then drive a processing step to run
//!   recovery and deliver packets to the consumer.
//! - **Demultiplexer**: Bounds-checked parsing of the RED redundancy
//!   header, reconstructing the virtual media/FEC packets inside one
//!   encapsulated packet ([`demux::demultiplex_red_packet`]).
//! - **Decode engine**: The erasure-recovery collaborator behind the
//!   [`FecDecoder`] trait. A flat XOR parity engine ([`XorFecDecoder`])
//!   is built in; a full RFC 5109 engine can be supplied instead.
//! - **Consumer sink**: Your [`RecoveredPacketSink`] implementation,
//!   invoked with the receiver's lock released so it may safely re-enter.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use redfec::packet_defs::RtpHeaderInfo;
//! use redfec::traits::RecoveredPacketSink;
//! use redfec::types::{PayloadType, Ssrc};
//! use redfec::UlpfecReceiver;
//!
//! struct PrintSink;
//!
//! impl RecoveredPacketSink for PrintSink {
//!     fn on_recovered_packet(&self, packet: &[u8]) -> bool {
//!         println!("delivered {} bytes", packet.len());
//!         true // false tells the receiver to stop delivering
//!     }
//! }
//!
//! fn main() -> Result<(), redfec::FecError> {
//!     let receiver = UlpfecReceiver::new(Ssrc::new(0x1234_5678), Arc::new(PrintSink));
//!
//!     // One RED-encapsulated media packet: a 12-byte RTP header and a
//!     // single terminating RED block with inner payload type 96.
//!     let mut packet = vec![0u8; 12];
//!     packet[0] = 0x80; // RTP version 2
//!     packet[1] = 98; // outer RED payload type
//!     packet[2..4].copy_from_slice(&100u16.to_be_bytes());
//!     packet[8..12].copy_from_slice(&0x1234_5678u32.to_be_bytes());
//!     packet.push(96); // RED header: F=0, block PT 96
//!     packet.extend_from_slice(b"media payload");
//!
//!     let header = RtpHeaderInfo {
//!         sequence_number: 100.into(),
//!         header_length: 12,
//!     };
//!     receiver.add_received_red_packet(&header, &packet, PayloadType::new(127))?;
//!     receiver.process_received_fec()?;
//!
//!     assert_eq!(receiver.packet_counter().total_packets, 1);
//!     Ok(())
//! }
//! ```
//!
//! ## Threading
//!
//! The receiver spawns no threads. `add_received_red_packet` and
//! `process_received_fec` may be called concurrently from independent
//! worker threads; one internal lock protects all mutable state and is
//! never held across consumer callbacks.

pub mod constants;
pub mod decoder;
pub mod demux;
pub mod error;
pub mod fuzz_harnesses;
pub mod packet_defs;
pub mod receiver;
pub mod stats;
pub mod traits;
pub mod types;

pub use decoder::XorFecDecoder;
pub use error::{EngineError, FecError, RedParsingError};
pub use packet_defs::{DemuxedPackets, RecoveredPacket, RtpHeaderInfo, VirtualPacket};
pub use receiver::UlpfecReceiver;
pub use stats::PacketCounter;
pub use traits::{FecDecoder, RecoveredPacketSink};
