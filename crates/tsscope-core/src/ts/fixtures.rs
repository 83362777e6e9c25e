//! Synthetic packets for unit tests.

use super::layout;
use super::packet::TransportPacket;

pub(crate) fn pack_clock(base: u64, extension: u16) -> [u8; 6] {
    [
        (base >> 25) as u8,
        (base >> 17) as u8,
        (base >> 9) as u8,
        (base >> 1) as u8,
        ((base & 0x01) as u8) << 7 | 0x7e | (extension >> 8) as u8,
        extension as u8,
    ]
}

pub(crate) struct PacketBuilder {
    pid: u16,
    header_bits: u8,
    control_bits: u8,
    adaptation: Option<Vec<u8>>,
    declared_length: Option<u8>,
    payload: Vec<u8>,
}

impl PacketBuilder {
    pub(crate) fn new(pid: u16) -> Self {
        Self {
            pid,
            header_bits: 0,
            control_bits: layout::HAS_PAYLOAD_BIT,
            adaptation: None,
            declared_length: None,
            payload: Vec::new(),
        }
    }

    pub(crate) fn payload_unit_start(mut self) -> Self {
        self.header_bits |= layout::PAYLOAD_UNIT_START_BIT;
        self
    }

    pub(crate) fn continuity(mut self, counter: u8) -> Self {
        self.control_bits = (self.control_bits & !layout::CONTINUITY_MASK)
            | (counter & layout::CONTINUITY_MASK);
        self
    }

    pub(crate) fn scrambling(mut self, control: u8) -> Self {
        self.control_bits = (self.control_bits & !layout::SCRAMBLING_MASK)
            | ((control << layout::SCRAMBLING_SHIFT) & layout::SCRAMBLING_MASK);
        self
    }

    pub(crate) fn without_payload(mut self) -> Self {
        self.control_bits &= !layout::HAS_PAYLOAD_BIT;
        self
    }

    /// Adaptation field with the given flag byte followed by `fields`.
    pub(crate) fn adaptation(mut self, flags: u8, fields: &[u8]) -> Self {
        let mut body = vec![flags];
        body.extend_from_slice(fields);
        self.adaptation = Some(body);
        self
    }

    /// Adaptation field whose declared length is zero.
    pub(crate) fn empty_adaptation(mut self) -> Self {
        self.adaptation = Some(Vec::new());
        self
    }

    pub(crate) fn stuffing(mut self, count: usize) -> Self {
        self.adaptation
            .get_or_insert_with(|| vec![0])
            .extend(std::iter::repeat_n(0xff, count));
        self
    }

    pub(crate) fn declared_length(mut self, length: u8) -> Self {
        self.declared_length = Some(length);
        self
    }

    pub(crate) fn payload(mut self, payload: &[u8]) -> Self {
        self.payload = payload.to_vec();
        self
    }

    pub(crate) fn bytes(self) -> [u8; layout::PACKET_LEN] {
        let mut data = [0xffu8; layout::PACKET_LEN];
        data[0] = layout::SYNC_BYTE;
        data[1] = self.header_bits | ((self.pid >> 8) as u8 & layout::PID_HIGH_MASK);
        data[2] = self.pid as u8;
        data[3] = self.control_bits;
        let mut pos = layout::HEADER_LEN;
        if let Some(body) = &self.adaptation {
            data[3] |= layout::HAS_ADAPTATION_BIT;
            data[pos] = self.declared_length.unwrap_or(body.len() as u8);
            data[pos + 1..pos + 1 + body.len()].copy_from_slice(body);
            pos += 1 + body.len();
        }
        data[pos..pos + self.payload.len()].copy_from_slice(&self.payload);
        data
    }

    pub(crate) fn build(self) -> TransportPacket {
        TransportPacket::from_array(self.bytes(), 0)
    }
}
