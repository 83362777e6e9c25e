use std::fmt::Write as _;

use crate::ts::{DecodeError, TransportPacket};
use crate::{AdaptationInfo, ExtensionInfo, PacketInfo};

/// Decode every field of one packet into a serializable view.
///
/// Header fields always decode. Optional adaptation fields that fail their
/// bounds checks are left out and the first failure is kept in
/// `AdaptationInfo::error`.
pub fn describe_packet(packet: &TransportPacket) -> PacketInfo {
    PacketInfo {
        position: packet.position(),
        pid: packet.pid(),
        transport_error: packet.transport_error_indicator(),
        payload_unit_start: packet.payload_unit_start_indicator(),
        transport_priority: packet.transport_priority(),
        scrambling_control: packet.transport_scrambling_control(),
        continuity_counter: packet.continuity_counter(),
        has_payload: packet.has_payload(),
        payload_size: packet.payload_size().ok(),
        adaptation: describe_adaptation(packet),
    }
}

fn describe_adaptation(packet: &TransportPacket) -> Option<AdaptationInfo> {
    let length = packet.adaptation_field_length()?;
    let mut info = AdaptationInfo {
        length,
        ..AdaptationInfo::default()
    };
    if let Some(flags) = packet.adaptation_flags() {
        info.discontinuity = flags.discontinuity();
        info.random_access = flags.random_access();
        info.es_priority = flags.es_priority();
    }

    let mut errors = FirstError::default();
    info.pcr = errors.keep(packet.pcr());
    info.opcr = errors.keep(packet.opcr());
    info.splice_countdown = errors.keep(packet.splice_countdown());
    info.private_data = errors.keep(packet.private_data()).map(hex);
    if packet.has_adaptation_extension() {
        info.extension = Some(ExtensionInfo {
            ltw: errors.keep(packet.ltw()),
            piecewise_rate: errors.keep(packet.piecewise_rate()),
            seamless_splice: errors.keep(packet.seamless_splice()),
            reserved_len: errors
                .keep(packet.extension_reserved_bytes())
                .map_or(0, <[u8]>::len),
        });
    }
    info.stuffing_len = errors.keep(packet.stuffing_bytes()).map(<[u8]>::len);

    info.error = errors.0.map(|err| err.to_string());
    Some(info)
}

#[derive(Default)]
struct FirstError(Option<DecodeError>);

impl FirstError {
    fn keep<T>(&mut self, result: Result<Option<T>, DecodeError>) -> Option<T> {
        result.unwrap_or_else(|err| {
            self.0.get_or_insert(err);
            None
        })
    }
}

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::describe_packet;
    use crate::ts::fixtures::{PacketBuilder, pack_clock};
    use crate::ts::layout::{AF_EXTENSION, AF_PCR, AF_PRIVATE_DATA, AF_RANDOM_ACCESS};

    #[test]
    fn plain_packet_has_no_adaptation() {
        let info = describe_packet(&PacketBuilder::new(0x44).payload_unit_start().build());
        assert_eq!(info.pid, 0x44);
        assert!(info.payload_unit_start);
        assert!(info.adaptation.is_none());
        assert_eq!(info.payload_size, Some(184));
    }

    #[test]
    fn pcr_and_private_data_are_described() {
        let mut fields = pack_clock(1_000, 5).to_vec();
        fields.extend_from_slice(&[2, 0xab, 0xcd]);
        let packet = PacketBuilder::new(0x20)
            .adaptation(AF_PCR | AF_PRIVATE_DATA | AF_RANDOM_ACCESS, &fields)
            .build();

        let info = describe_packet(&packet);
        let adaptation = info.adaptation.expect("adaptation");
        assert_eq!(adaptation.length, 10);
        assert!(adaptation.random_access);
        assert_eq!(adaptation.pcr.map(|pcr| pcr.ticks()), Some(300_005));
        assert!(adaptation.opcr.is_none());
        assert_eq!(adaptation.private_data.as_deref(), Some("abcd"));
        assert_eq!(adaptation.stuffing_len, Some(0));
        assert!(adaptation.extension.is_none());
        assert!(adaptation.error.is_none());
        assert_eq!(info.payload_size, Some(188 - (4 + 10)));
    }

    #[test]
    fn oversized_private_data_reports_error() {
        let packet = PacketBuilder::new(0x20)
            .adaptation(AF_PRIVATE_DATA | AF_EXTENSION, &[200, 0, 0])
            .build();

        let adaptation = describe_packet(&packet).adaptation.expect("adaptation");
        assert!(adaptation.private_data.is_none());
        let error = adaptation.error.expect("decode error");
        assert!(error.contains("out of bounds"), "{error}");
    }

    #[test]
    fn declared_length_past_packet_drops_payload_size() {
        let packet = PacketBuilder::new(0x20)
            .adaptation(0, &[])
            .declared_length(190)
            .build();
        let info = describe_packet(&packet);
        assert!(info.payload_size.is_none());
        assert!(info.adaptation.expect("adaptation").error.is_some());
    }
}
