//! Running packet tallies for the receive pipeline.

use serde::{Deserialize, Serialize};

/// Snapshot of the receiver's monotonic packet counters.
///
/// Counters are mutated only inside the orchestrator's critical section;
/// [`UlpfecReceiver::packet_counter`] copies them out under the lock, so a
/// snapshot is always internally consistent.
///
/// [`UlpfecReceiver::packet_counter`]: crate::receiver::UlpfecReceiver::packet_counter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketCounter {
    /// Encapsulated packets successfully demultiplexed.
    pub total_packets: u64,
    /// Virtual packets classified as FEC, including zero-length results
    /// that were dropped before queueing.
    pub fec_packets: u64,
    /// Reconstructed packets successfully delivered to the consumer.
    pub recovered_packets: u64,
}
