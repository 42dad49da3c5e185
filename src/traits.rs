//! Core receive-pipeline traits.
//!
//! This module defines the seams between the recovery orchestrator and
//! its two collaborators: the downstream consumer that accepts delivered
//! packets, and the FEC decode engine that reconstructs lost ones.

use std::collections::VecDeque;
use std::fmt::Debug;

use crate::error::EngineError;
use crate::packet_defs::{RecoveredPacket, VirtualPacket};

/// Downstream consumer of originally-received and recovered media packets.
///
/// Implementations must be callable from any thread driving the receiver.
/// The orchestrator never holds its internal lock while calling into this
/// trait, so implementations may safely re-enter the receiver (e.g. to
/// submit further packets). They should still return promptly; the
/// callback sits on the real-time delivery path.
pub trait RecoveredPacketSink: Send + Sync {
    /// Delivers one full media packet (RTP header plus payload).
    ///
    /// # Returns
    /// `true` if the packet was accepted. `false` is a fatal signal: the
    /// orchestrator aborts the in-progress processing call and surfaces
    /// [`FecError::ConsumerRejected`] to its caller.
    ///
    /// [`FecError::ConsumerRejected`]: crate::error::FecError::ConsumerRejected
    fn on_recovered_packet(&self, packet: &[u8]) -> bool;
}

/// Contract for the FEC decode engine that performs erasure recovery.
///
/// The engine is free to retain internal state across calls (protection
/// group membership, held FEC payloads, a media packet window); the
/// reconstruction algorithm itself is outside this crate's scope.
pub trait FecDecoder: Send + Debug {
    /// Consumes the received queue and updates the recovered set.
    ///
    /// # Postconditions (on success)
    /// - `received` is empty; every packet has been ingested or discarded.
    /// - `recovered` contains every packet reconstructable from the
    ///   protection-group algebra over all packets seen so far that the
    ///   engine still retains. Entries are only appended, never removed
    ///   or reordered, so orchestrator delivery indices stay valid.
    ///
    /// On failure the engine must leave `recovered` untouched; the
    /// orchestrator discards whatever remains in `received`.
    fn decode_fec(
        &mut self,
        received: &mut VecDeque<VirtualPacket>,
        recovered: &mut Vec<RecoveredPacket>,
    ) -> Result<(), EngineError>;

    /// Flushes all retained engine state and releases held packets,
    /// clearing the recovered set. Called at receiver shutdown.
    fn reset_state(&mut self, recovered: &mut Vec<RecoveredPacket>);
}
