//! Error types for the RED/ULP-FEC receive pipeline.
//!
//! This module defines the error types used throughout the redfec library.
//! It distinguishes between RED demultiplexing (parse) errors, decode-engine
//! failures, and consumer-side delivery rejection. The `thiserror` crate is
//! used for ergonomic error definitions.
//!
//! All input reaching the demultiplexer is untrusted network data, so every
//! malformed-packet condition is a recoverable error value, never a panic.

use thiserror::Error;

/// Errors that can occur while demultiplexing a RED-encapsulated packet.
///
/// Each variant corresponds to a specific malformed-input condition in the
/// RFC 2198 redundancy header. A parse error means the offending packet
/// contributed nothing to the receiver's queues or counters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RedParsingError {
    /// Insufficient data to read a complete header or payload.
    #[error("Truncated RED packet: needed {needed} bytes, got {got} for {context}")]
    TruncatedPacket {
        needed: usize,
        got: usize,
        context: String,
    },

    /// The extended RED header carried a non-zero timestamp offset, which
    /// this pipeline treats as corruption (only offset-zero redundancy is
    /// produced by conforming senders).
    #[error("Corrupt RED header: non-zero timestamp offset {timestamp_offset}")]
    CorruptHeader { timestamp_offset: u16 },

    /// The packet signaled more RED blocks than the demultiplexer supports.
    #[error("Unsupported RED block count: more than {max_supported} blocks signaled")]
    UnsupportedBlockCount { max_supported: u8 },

    /// The declared block length exceeds the bytes remaining in the packet.
    #[error("RED block length {block_length} exceeds remaining payload of {available} bytes")]
    BlockLengthOverflow {
        block_length: usize,
        available: usize,
    },
}

/// Opaque failure reported by a [`FecDecoder`] implementation.
///
/// The decode engine's reconstruction algorithm is outside this crate's
/// contract; its failures are surfaced as a reason string.
///
/// [`FecDecoder`]: crate::traits::FecDecoder
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("FEC decode engine failure: {reason}")]
pub struct EngineError {
    pub reason: String,
}

impl EngineError {
    /// Creates an engine error from any displayable reason.
    pub fn new(reason: impl Into<String>) -> Self {
        EngineError {
            reason: reason.into(),
        }
    }
}

/// Main error type for receive-pipeline operations.
///
/// Consolidates demultiplexing errors, decode-engine failures, and
/// consumer delivery rejection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FecError {
    /// Error while parsing a RED-encapsulated packet.
    #[error("Parsing error: {0}")]
    Parsing(#[from] RedParsingError),

    /// The consumer callback returned `false`, rejecting delivery.
    /// The caller must stop feeding this receiver.
    #[error("Consumer rejected recovered packet delivery")]
    ConsumerRejected,

    /// The decode engine failed; the received queue has been discarded.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}
