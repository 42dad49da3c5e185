//! Single-mask XOR parity decoder.
//!
//! A minimal, self-contained implementation of the [`FecDecoder`]
//! contract, used as the receiver's default engine and by the integration
//! tests. It performs flat XOR erasure recovery: each parity payload
//! protects a group of media packets and can reconstruct exactly one
//! missing member from the others. Multi-level ULP protection and the
//! full RFC 5109 header handling belong to a production engine behind the
//! same trait.
//!
//! Parity payload layout consumed by this decoder (and produced by
//! [`xor_parity_payload`]):
//!
//! ```text
//! bytes 0..2   base sequence number (big-endian)
//! bytes 2..4   protection mask; bit i protects sequence base + i
//! bytes 4..6   length recovery: XOR of protected packet lengths
//! bytes 6..    XOR of protected packet bytes, zero-padded to the longest
//! ```

use std::collections::{BTreeMap, VecDeque};

use bytes::Bytes;

use crate::error::EngineError;
use crate::packet_defs::{RecoveredPacket, VirtualPacket};
use crate::traits::FecDecoder;
use crate::types::SequenceNumber;

/// Length of the parity payload header in bytes.
const PARITY_HEADER_LENGTH_BYTES: usize = 6;
/// Media packets retained for recovery before the oldest are pruned.
const MEDIA_WINDOW_PACKETS: usize = 192;
/// Parity packets held while waiting for their protection group.
const MAX_HELD_PARITY_PACKETS: usize = 32;
/// Half the sequence space; distances beyond this are "in the future".
const SEQ_HALF_RANGE: u16 = 0x8000;

/// Flat XOR parity decode engine.
///
/// Retains a bounded window of media packets (original and reconstructed)
/// keyed by sequence number, plus parity packets whose protection group
/// is not yet recoverable. [`FecDecoder::reset_state`] flushes both.
#[derive(Debug, Default)]
pub struct XorFecDecoder {
    /// Full virtual media packets by sequence number, pruned to
    /// `MEDIA_WINDOW_PACKETS` behind the highest sequence seen.
    media: BTreeMap<u16, Bytes>,
    /// Parity payloads waiting for enough of their group to arrive.
    held_parity: Vec<ParityPacket>,
    /// Highest media sequence number seen, for window pruning.
    highest_seq: Option<SequenceNumber>,
}

#[derive(Debug)]
struct ParityPacket {
    payload: Bytes,
}

enum RecoveryAttempt {
    /// One missing group member was reconstructed.
    Recovered(VirtualPacket),
    /// The parity packet can never contribute again; discard it.
    Exhausted,
    /// More than one member still missing; keep holding.
    Waiting,
}

impl XorFecDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn ingest_media(&mut self, seq: SequenceNumber, data: Bytes) {
        match self.highest_seq {
            Some(highest) if seq.wrapping_sub(highest) >= SEQ_HALF_RANGE => {}
            _ => self.highest_seq = Some(seq),
        }
        self.media.insert(seq.value(), data);
    }

    fn prune_media_window(&mut self) {
        let Some(highest) = self.highest_seq else {
            return;
        };
        let stale: Vec<u16> = self
            .media
            .keys()
            .copied()
            .filter(|&seq| {
                let age = highest.wrapping_sub(SequenceNumber::new(seq));
                age < SEQ_HALF_RANGE && age as usize > MEDIA_WINDOW_PACKETS
            })
            .collect();
        for seq in stale {
            self.media.remove(&seq);
        }
    }

    fn try_recover(&self, parity: &ParityPacket) -> RecoveryAttempt {
        let payload = &parity.payload;
        if payload.len() < PARITY_HEADER_LENGTH_BYTES {
            return RecoveryAttempt::Exhausted;
        }
        let base = SequenceNumber::new(u16::from_be_bytes([payload[0], payload[1]]));
        let mask = u16::from_be_bytes([payload[2], payload[3]]);
        let length_recovery = u16::from_be_bytes([payload[4], payload[5]]);
        if mask == 0 {
            return RecoveryAttempt::Exhausted;
        }

        let mut missing: Option<SequenceNumber> = None;
        let mut present: Vec<&Bytes> = Vec::new();
        for bit in 0..16 {
            if mask & (1 << bit) == 0 {
                continue;
            }
            let seq = base.wrapping_add(bit);
            match self.media.get(&seq.value()) {
                Some(data) => present.push(data),
                None if missing.is_some() => return RecoveryAttempt::Waiting,
                None => missing = Some(seq),
            }
        }
        let Some(missing_seq) = missing else {
            // Whole group already present; nothing left to reconstruct.
            return RecoveryAttempt::Exhausted;
        };

        let mut buf = payload[PARITY_HEADER_LENGTH_BYTES..].to_vec();
        let mut length = length_recovery;
        for data in present {
            for (dst, src) in buf.iter_mut().zip(data.iter()) {
                *dst ^= src;
            }
            length ^= data.len() as u16;
        }
        let length = usize::from(length);
        if length == 0 || length > buf.len() {
            // Inconsistent group; the parity packet is unusable.
            return RecoveryAttempt::Exhausted;
        }
        buf.truncate(length);
        RecoveryAttempt::Recovered(VirtualPacket {
            seq_num: missing_seq,
            is_fec: false,
            ssrc: None,
            data: Bytes::from(buf),
        })
    }
}

impl FecDecoder for XorFecDecoder {
    fn decode_fec(
        &mut self,
        received: &mut VecDeque<VirtualPacket>,
        recovered: &mut Vec<RecoveredPacket>,
    ) -> Result<(), EngineError> {
        while let Some(pkt) = received.pop_front() {
            if pkt.is_fec {
                if self.held_parity.len() < MAX_HELD_PARITY_PACKETS {
                    self.held_parity.push(ParityPacket { payload: pkt.data });
                }
            } else {
                self.ingest_media(pkt.seq_num, pkt.data);
            }
        }

        // Recovered packets can complete other protection groups, so
        // iterate to a fixpoint.
        let mut progress = true;
        while progress {
            progress = false;
            let mut i = 0;
            while i < self.held_parity.len() {
                match self.try_recover(&self.held_parity[i]) {
                    RecoveryAttempt::Recovered(pkt) => {
                        self.ingest_media(pkt.seq_num, pkt.data.clone());
                        recovered.push(RecoveredPacket::new(pkt));
                        self.held_parity.swap_remove(i);
                        progress = true;
                    }
                    RecoveryAttempt::Exhausted => {
                        self.held_parity.swap_remove(i);
                    }
                    RecoveryAttempt::Waiting => {
                        i += 1;
                    }
                }
            }
        }

        self.prune_media_window();
        Ok(())
    }

    fn reset_state(&mut self, recovered: &mut Vec<RecoveredPacket>) {
        self.media.clear();
        self.held_parity.clear();
        self.highest_seq = None;
        recovered.clear();
    }
}

/// Builds a parity payload protecting the given packets.
///
/// `mask` bit `i` marks sequence `base + i` as protected; `packets` are
/// the full packet buffers of every protected group member, in any
/// order. Senders and tests use this to produce payloads the
/// [`XorFecDecoder`] can consume.
pub fn xor_parity_payload(base: SequenceNumber, mask: u16, packets: &[&[u8]]) -> Bytes {
    let longest = packets.iter().map(|p| p.len()).max().unwrap_or(0);
    let mut payload = vec![0u8; PARITY_HEADER_LENGTH_BYTES + longest];
    payload[0..2].copy_from_slice(&base.value().to_be_bytes());
    payload[2..4].copy_from_slice(&mask.to_be_bytes());
    let mut length_recovery = 0u16;
    for pkt in packets {
        length_recovery ^= pkt.len() as u16;
        for (dst, src) in payload[PARITY_HEADER_LENGTH_BYTES..].iter_mut().zip(pkt.iter()) {
            *dst ^= src;
        }
    }
    payload[4..6].copy_from_slice(&length_recovery.to_be_bytes());
    Bytes::from(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media(seq: u16, data: &[u8]) -> VirtualPacket {
        VirtualPacket {
            seq_num: seq.into(),
            is_fec: false,
            ssrc: None,
            data: Bytes::copy_from_slice(data),
        }
    }

    fn parity(base: u16, mask: u16, packets: &[&[u8]]) -> VirtualPacket {
        VirtualPacket {
            seq_num: base.into(),
            is_fec: true,
            ssrc: None,
            data: xor_parity_payload(base.into(), mask, packets),
        }
    }

    #[test]
    fn recovers_single_missing_group_member() {
        let pkt_a = [0x10, 0x20, 0x30];
        let pkt_b = [0x0F, 0xF0];
        let mut decoder = XorFecDecoder::new();
        let mut received = VecDeque::from([
            media(100, &pkt_a),
            parity(100, 0b11, &[&pkt_a, &pkt_b]),
        ]);
        let mut recovered = Vec::new();

        decoder.decode_fec(&mut received, &mut recovered).unwrap();

        assert!(received.is_empty());
        assert_eq!(recovered.len(), 1);
        let rec = &recovered[0].pkt;
        assert_eq!(rec.seq_num, 101u16);
        assert_eq!(&rec.data[..], &pkt_b);
        assert!(!recovered[0].delivered);
    }

    #[test]
    fn parity_with_full_group_present_is_discarded() {
        let pkt_a = [1u8, 2];
        let pkt_b = [3u8, 4];
        let mut decoder = XorFecDecoder::new();
        let mut received = VecDeque::from([
            media(10, &pkt_a),
            media(11, &pkt_b),
            parity(10, 0b11, &[&pkt_a, &pkt_b]),
        ]);
        let mut recovered = Vec::new();

        decoder.decode_fec(&mut received, &mut recovered).unwrap();
        assert!(recovered.is_empty());
        assert!(decoder.held_parity.is_empty());
    }

    #[test]
    fn parity_waits_until_group_becomes_recoverable() {
        let pkt_a = [5u8; 4];
        let pkt_b = [6u8; 4];
        let pkt_c = [7u8; 4];
        let mut decoder = XorFecDecoder::new();
        let mut recovered = Vec::new();

        let mut received =
            VecDeque::from([parity(20, 0b111, &[&pkt_a, &pkt_b, &pkt_c]), media(20, &pkt_a)]);
        decoder.decode_fec(&mut received, &mut recovered).unwrap();
        assert!(recovered.is_empty());
        assert_eq!(decoder.held_parity.len(), 1);

        let mut received = VecDeque::from([media(21, &pkt_b)]);
        decoder.decode_fec(&mut received, &mut recovered).unwrap();
        assert_eq!(recovered.len(), 1);
        assert_eq!(recovered[0].pkt.seq_num, 22u16);
        assert_eq!(&recovered[0].pkt.data[..], &pkt_c);
    }

    #[test]
    fn recovery_chains_across_protection_groups() {
        let pkt_a = [0xAAu8; 3];
        let pkt_b = [0xBBu8; 3];
        let pkt_c = [0xCCu8; 3];
        let mut decoder = XorFecDecoder::new();
        let mut recovered = Vec::new();

        // Group 1 recovers B from A; group 2 then recovers C from B.
        let mut received = VecDeque::from([
            media(30, &pkt_a),
            parity(30, 0b11, &[&pkt_a, &pkt_b]),
            parity(31, 0b11, &[&pkt_b, &pkt_c]),
        ]);
        decoder.decode_fec(&mut received, &mut recovered).unwrap();

        let seqs: Vec<u16> = recovered.iter().map(|r| r.pkt.seq_num.value()).collect();
        assert!(seqs.contains(&31));
        assert!(seqs.contains(&32));
        assert_eq!(recovered.len(), 2);
    }

    #[test]
    fn malformed_short_parity_is_dropped() {
        let mut decoder = XorFecDecoder::new();
        let mut received = VecDeque::from([VirtualPacket {
            seq_num: 5.into(),
            is_fec: true,
            ssrc: None,
            data: Bytes::from_static(&[1, 2, 3]),
        }]);
        let mut recovered = Vec::new();
        decoder.decode_fec(&mut received, &mut recovered).unwrap();
        assert!(recovered.is_empty());
        assert!(decoder.held_parity.is_empty());
    }

    #[test]
    fn media_window_prunes_old_sequences() {
        let mut decoder = XorFecDecoder::new();
        let mut recovered = Vec::new();
        let mut received = VecDeque::from([media(0, &[1])]);
        decoder.decode_fec(&mut received, &mut recovered).unwrap();

        let far_ahead = (MEDIA_WINDOW_PACKETS as u16) + 100;
        let mut received = VecDeque::from([media(far_ahead, &[2])]);
        decoder.decode_fec(&mut received, &mut recovered).unwrap();

        assert!(!decoder.media.contains_key(&0));
        assert!(decoder.media.contains_key(&far_ahead));
    }

    #[test]
    fn reset_state_flushes_engine_and_recovered_set() {
        let pkt_a = [1u8, 2];
        let pkt_b = [3u8, 4];
        let mut decoder = XorFecDecoder::new();
        let mut recovered = Vec::new();
        let mut received =
            VecDeque::from([media(40, &pkt_a), parity(40, 0b11, &[&pkt_a, &pkt_b])]);
        decoder.decode_fec(&mut received, &mut recovered).unwrap();
        assert_eq!(recovered.len(), 1);

        decoder.reset_state(&mut recovered);
        assert!(recovered.is_empty());
        assert!(decoder.media.is_empty());
        assert!(decoder.held_parity.is_empty());
    }
}
