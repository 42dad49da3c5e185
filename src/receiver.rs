//! Recovery orchestrator for the RED/ULP-FEC receive pipeline.
//!
//! The [`UlpfecReceiver`] owns the packet queues, drives the redundancy
//! demultiplexer and the decode engine, delivers packets to the consumer
//! sink, and maintains the loss/recovery counters. It is designed for
//! invocation from independent worker threads (typically a network
//! receive thread submitting packets, and the same or another thread
//! driving processing) and spawns no threads of its own.
//!
//! All mutable state sits behind one mutex. The lock is never held across
//! a [`RecoveredPacketSink`] callback: the packet bytes are cloned out
//! (refcounted `Bytes`), the guard is dropped for the duration of the
//! call, and state is reacquired afterwards. This keeps re-entrant
//! submission from the callback deadlock-free and bounds the time other
//! threads wait on the lock.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::decoder::XorFecDecoder;
use crate::demux::demultiplex_red_packet;
use crate::error::FecError;
use crate::packet_defs::{RecoveredPacket, RtpHeaderInfo, VirtualPacket};
use crate::stats::PacketCounter;
use crate::traits::{FecDecoder, RecoveredPacketSink};
use crate::types::{PayloadType, Ssrc};

/// Receive-side FEC pipeline for one protected media stream.
///
/// Construct with the stream's SSRC and a consumer sink, feed it each
/// arriving RED-encapsulated packet via [`add_received_red_packet`], and
/// call [`process_received_fec`] (typically once per arrival) to run
/// recovery and deliver packets. Counters are readable at any time via
/// [`packet_counter`].
///
/// On drop, the receiver drains its queues and resets the decode engine
/// so any packets the engine still holds are released.
///
/// [`add_received_red_packet`]: Self::add_received_red_packet
/// [`process_received_fec`]: Self::process_received_fec
/// [`packet_counter`]: Self::packet_counter
pub struct UlpfecReceiver {
    /// SSRC of the protected stream this receiver was created for.
    ssrc: Ssrc,
    /// Downstream consumer; invoked with the lock released.
    sink: Arc<dyn RecoveredPacketSink>,
    /// All mutable state, guarded by the instance lock.
    state: Mutex<ReceiverState>,
}

struct ReceiverState {
    decoder: Box<dyn FecDecoder>,
    received: VecDeque<VirtualPacket>,
    recovered: Vec<RecoveredPacket>,
    counter: PacketCounter,
}

impl fmt::Debug for UlpfecReceiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UlpfecReceiver")
            .field("ssrc", &self.ssrc)
            .finish_non_exhaustive()
    }
}

impl UlpfecReceiver {
    /// Creates a receiver backed by the default [`XorFecDecoder`].
    pub fn new(ssrc: Ssrc, sink: Arc<dyn RecoveredPacketSink>) -> Self {
        Self::with_decoder(ssrc, sink, Box::new(XorFecDecoder::new()))
    }

    /// Creates a receiver backed by a caller-supplied decode engine.
    pub fn with_decoder(
        ssrc: Ssrc,
        sink: Arc<dyn RecoveredPacketSink>,
        decoder: Box<dyn FecDecoder>,
    ) -> Self {
        UlpfecReceiver {
            ssrc,
            sink,
            state: Mutex::new(ReceiverState {
                decoder,
                received: VecDeque::new(),
                recovered: Vec::new(),
                counter: PacketCounter::default(),
            }),
        }
    }

    /// SSRC of the protected stream.
    pub fn ssrc(&self) -> Ssrc {
        self.ssrc
    }

    /// Snapshot of the packet counters, readable at any time.
    pub fn packet_counter(&self) -> PacketCounter {
        self.lock_state().counter
    }

    /// Demultiplexes one RED-encapsulated packet and enqueues its virtual
    /// packets for the next processing step.
    ///
    /// A parse failure is local to this call: the packet contributes
    /// nothing and no queue state or counter changes. Zero-length virtual
    /// packets are counted but silently dropped, not queued.
    ///
    /// # Parameters
    /// - `header`: Caller-parsed metadata for the outer RTP header.
    /// - `packet`: The complete encapsulated packet; copied internally,
    ///   not retained.
    /// - `ulpfec_payload_type`: Payload type marking ULP-FEC blocks.
    ///
    /// # Errors
    /// - [`FecError::Parsing`] - Malformed RED encapsulation
    pub fn add_received_red_packet(
        &self,
        header: &RtpHeaderInfo,
        packet: &[u8],
        ulpfec_payload_type: PayloadType,
    ) -> Result<(), FecError> {
        let demuxed = demultiplex_red_packet(header, packet, ulpfec_payload_type)?;

        let mut state = self.lock_state();
        state.counter.total_packets += 1;
        for pkt in demuxed {
            if pkt.is_fec {
                state.counter.fec_packets += 1;
            }
            if pkt.data.is_empty() {
                continue;
            }
            state.received.push_back(pkt);
        }
        Ok(())
    }

    /// Runs one recovery step: delivers the front original media packet,
    /// hands the received queue to the decode engine, and delivers every
    /// not-yet-delivered recovered packet.
    ///
    /// The received queue is empty when this returns, whether or not
    /// reconstruction succeeded. Packets delivered before an error remain
    /// marked delivered; a retry will not re-deliver them.
    ///
    /// # Errors
    /// - [`FecError::ConsumerRejected`] - The sink returned `false`; the
    ///   caller must stop feeding this receiver
    /// - [`FecError::Engine`] - Decode engine failure; the received queue
    ///   has been discarded and the recovered set left untouched
    pub fn process_received_fec(&self) -> Result<(), FecError> {
        let mut state = self.lock_state();

        if !state.received.is_empty() {
            // Deliver the original media packet at the front before
            // recovery, so playout never waits on the FEC math.
            let front_media = match state.received.front() {
                Some(front) if !front.is_fec => Some(front.data.clone()),
                _ => None,
            };
            if let Some(payload) = front_media {
                drop(state);
                if !self.sink.on_recovered_packet(&payload) {
                    return Err(FecError::ConsumerRejected);
                }
                state = self.lock_state();
            }

            let ReceiverState {
                decoder,
                received,
                recovered,
                ..
            } = &mut *state;
            if let Err(e) = decoder.decode_fec(received, recovered) {
                // The queue must end this step empty regardless of the
                // engine outcome.
                received.clear();
                return Err(e.into());
            }
            debug_assert!(
                state.received.is_empty(),
                "decode engine must drain the received queue"
            );
        }

        // Deliver recovered packets in engine order, at most once each.
        // Entries are append-only, so the scan index survives the lock
        // being released around each callback.
        let mut scan = 0usize;
        loop {
            while scan < state.recovered.len() && state.recovered[scan].delivered {
                scan += 1;
            }
            if scan >= state.recovered.len() {
                break;
            }
            let payload = state.recovered[scan].pkt.data.clone();
            drop(state);
            if !self.sink.on_recovered_packet(&payload) {
                return Err(FecError::ConsumerRejected);
            }
            state = self.lock_state();
            if let Some(entry) = state.recovered.get_mut(scan) {
                entry.delivered = true;
            }
            state.counter.recovered_packets += 1;
            scan += 1;
        }
        Ok(())
    }

    fn lock_state(&self) -> MutexGuard<'_, ReceiverState> {
        // A poisoned lock means a sink callback panicked in another
        // thread; counters and queues are still structurally valid.
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Drop for UlpfecReceiver {
    fn drop(&mut self) {
        let state = match self.state.get_mut() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.received.clear();
        let ReceiverState {
            decoder, recovered, ..
        } = state;
        decoder.reset_state(recovered);
    }
}
