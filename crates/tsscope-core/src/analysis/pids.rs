use std::collections::HashMap;

use crate::PidSummary;
use crate::ts::TransportPacket;
use crate::ts::layout::CONTINUITY_MASK;

#[derive(Debug)]
pub(crate) struct PidStats {
    pub summary: PidSummary,
    pub last_counter: Option<u8>,
}

/// Per-PID accumulators kept in first-seen order.
#[derive(Debug, Default)]
pub(crate) struct PidTable {
    order: Vec<PidStats>,
    index: HashMap<u16, usize>,
}

/// What one packet's continuity counter says about the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Continuity {
    InOrder,
    Duplicate,
    Gap,
    Unchecked,
}

impl PidTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Record one packet. `pcr_ticks` is the already-decoded PCR, if any.
    pub fn observe(&mut self, packet: &TransportPacket, pcr_ticks: Option<u64>) -> Continuity {
        let pid = packet.pid();
        let slot = match self.index.get(&pid) {
            Some(slot) => *slot,
            None => {
                self.order.push(PidStats {
                    summary: PidSummary::new(pid, packet.position()),
                    last_counter: None,
                });
                self.index.insert(pid, self.order.len() - 1);
                self.order.len() - 1
            }
        };
        let stats = &mut self.order[slot];
        let summary = &mut stats.summary;

        summary.packets += 1;
        summary.last_position = packet.position();
        if packet.payload_unit_start_indicator() {
            summary.payload_unit_starts += 1;
        }
        if packet.transport_scrambling_control() != 0 {
            summary.scrambled_packets += 1;
        }
        if packet.transport_error_indicator() {
            summary.transport_errors += 1;
        }

        let discontinuity = packet
            .adaptation_flags()
            .is_some_and(|flags| flags.discontinuity());
        if discontinuity {
            summary.discontinuities += 1;
        }

        if let Some(ticks) = pcr_ticks {
            summary.pcr_count += 1;
            summary.first_pcr.get_or_insert(ticks);
            summary.last_pcr = Some(ticks);
        }

        let continuity = check_continuity(packet, stats.last_counter, discontinuity);
        match continuity {
            Continuity::Duplicate => stats.summary.duplicates += 1,
            Continuity::Gap => stats.summary.continuity_errors += 1,
            Continuity::InOrder | Continuity::Unchecked => {}
        }
        if packet.has_payload() && !packet.is_null() {
            stats.last_counter = Some(packet.continuity_counter());
        }
        continuity
    }

    pub fn into_summaries(self) -> Vec<PidSummary> {
        self.order.into_iter().map(|stats| stats.summary).collect()
    }
}

/// The counter only advances on packets carrying payload; a repeat of the
/// previous value is a legal duplicate.
fn check_continuity(packet: &TransportPacket, last: Option<u8>, discontinuity: bool) -> Continuity {
    if packet.is_null() || !packet.has_payload() || discontinuity {
        return Continuity::Unchecked;
    }
    let Some(last) = last else {
        return Continuity::Unchecked;
    };
    let counter = packet.continuity_counter();
    if counter == (last + 1) & CONTINUITY_MASK {
        Continuity::InOrder
    } else if counter == last {
        Continuity::Duplicate
    } else {
        Continuity::Gap
    }
}
