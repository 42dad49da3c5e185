//! Thread-safety tests for the recovery orchestrator.
//!
//! Verifies that concurrent submission and processing never corrupt the
//! counters or deadlock, including re-entrant submission from inside the
//! consumer callback.

mod common;

use std::sync::Arc;
use std::thread;

use common::*;
use redfec::packet_defs::RtpHeaderInfo;
use redfec::traits::RecoveredPacketSink;
use redfec::types::{PayloadType, Ssrc};
use redfec::UlpfecReceiver;

const THREADS: usize = 4;
const PACKETS_PER_THREAD: usize = 250;

#[test]
fn concurrent_submits_never_corrupt_counters() {
    let sink = Arc::new(CollectingSink::new());
    let receiver = Arc::new(UlpfecReceiver::new(Ssrc::new(TEST_SSRC), sink));

    thread::scope(|scope| {
        for t in 0..THREADS {
            let receiver = Arc::clone(&receiver);
            scope.spawn(move || {
                for i in 0..PACKETS_PER_THREAD {
                    let seq = (t * PACKETS_PER_THREAD + i) as u16;
                    let payload: Vec<u8> = (0..32).map(|_| rand::random::<u8>()).collect();
                    // Each two-block packet produces exactly one media
                    // and one FEC virtual packet.
                    let pkt = red_two_block_packet(seq, &payload, &[0u8; 10]);
                    receiver
                        .add_received_red_packet(
                            &header_info(seq),
                            &pkt,
                            PayloadType::new(ULPFEC_PT),
                        )
                        .unwrap();
                }
            });
        }
    });

    let counter = receiver.packet_counter();
    let expected = (THREADS * PACKETS_PER_THREAD) as u64;
    assert_eq!(counter.total_packets, expected);
    assert_eq!(counter.fec_packets, expected);
}

#[test]
fn concurrent_submit_and_drive_make_progress() {
    let sink = Arc::new(CollectingSink::new());
    let receiver = Arc::new(UlpfecReceiver::new(Ssrc::new(TEST_SSRC), sink.clone()));

    thread::scope(|scope| {
        let submitter = Arc::clone(&receiver);
        scope.spawn(move || {
            for seq in 0..500u16 {
                let pkt = red_media_packet(seq, &[seq as u8; 20]);
                submitter
                    .add_received_red_packet(&header_info(seq), &pkt, PayloadType::new(ULPFEC_PT))
                    .unwrap();
            }
        });

        let driver = Arc::clone(&receiver);
        scope.spawn(move || {
            for _ in 0..500 {
                driver.process_received_fec().unwrap();
            }
        });
    });

    // Drain whatever the driver thread did not see.
    receiver.process_received_fec().unwrap();
    assert_eq!(receiver.packet_counter().total_packets, 500);
}

/// Sink that submits another packet from inside the delivery callback.
struct ReentrantSink {
    receiver: std::sync::OnceLock<Arc<UlpfecReceiver>>,
}

impl RecoveredPacketSink for ReentrantSink {
    fn on_recovered_packet(&self, _packet: &[u8]) -> bool {
        if let Some(receiver) = self.receiver.get() {
            let pkt = red_media_packet(9000, b"from callback");
            let header = RtpHeaderInfo {
                sequence_number: 9000.into(),
                header_length: 12,
            };
            // Must not deadlock: the receiver's lock is released around
            // this callback.
            let _ = receiver.add_received_red_packet(&header, &pkt, PayloadType::new(ULPFEC_PT));
        }
        true
    }
}

#[test]
fn reentrant_submission_from_callback_does_not_deadlock() {
    let sink = Arc::new(ReentrantSink {
        receiver: std::sync::OnceLock::new(),
    });
    let receiver = Arc::new(UlpfecReceiver::new(Ssrc::new(TEST_SSRC), sink.clone()));
    sink.receiver.set(Arc::clone(&receiver)).ok().unwrap();

    receiver
        .add_received_red_packet(
            &header_info(1),
            &red_media_packet(1, b"trigger"),
            PayloadType::new(ULPFEC_PT),
        )
        .unwrap();
    receiver.process_received_fec().unwrap();

    // The original packet plus the one submitted from the callback.
    assert_eq!(receiver.packet_counter().total_packets, 2);
}
