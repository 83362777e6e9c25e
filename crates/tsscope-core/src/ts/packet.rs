use std::fmt;

use serde::{Deserialize, Serialize};

use super::clock::ClockReference;
use super::error::{DecodeError, PacketError};
use super::fields::{self, ADAPTATION_FIELDS, EXTENSION_FIELDS};
use super::layout;
use super::reader::PacketReader;

/// The flag byte of an adaptation field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdaptationFlags(u8);

impl AdaptationFlags {
    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    pub fn discontinuity(self) -> bool {
        self.contains(layout::AF_DISCONTINUITY)
    }

    pub fn random_access(self) -> bool {
        self.contains(layout::AF_RANDOM_ACCESS)
    }

    pub fn es_priority(self) -> bool {
        self.contains(layout::AF_ES_PRIORITY)
    }

    pub fn pcr(self) -> bool {
        self.contains(layout::AF_PCR)
    }

    pub fn opcr(self) -> bool {
        self.contains(layout::AF_OPCR)
    }

    pub fn splicing_point(self) -> bool {
        self.contains(layout::AF_SPLICING_POINT)
    }

    pub fn private_data(self) -> bool {
        self.contains(layout::AF_PRIVATE_DATA)
    }

    pub fn extension(self) -> bool {
        self.contains(layout::AF_EXTENSION)
    }
}

/// Legal time window field of the adaptation extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalTimeWindow {
    pub valid: bool,
    /// 15-bit offset.
    pub offset: u16,
}

/// Seamless splice field of the adaptation extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeamlessSplice {
    /// 4-bit splice type.
    pub splice_type: u8,
    /// 33-bit decoding time stamp of the next access unit.
    pub dts_next_au: u64,
}

/// One captured 188-byte transport stream packet and its position in the
/// source.
///
/// Nothing is parsed up front: each accessor recomputes the offsets it needs
/// from the raw bytes. Header accessors cannot fail. Adaptation field
/// accessors return `Ok(None)` when the field is absent (flag bit unset, or no
/// adaptation field at all) and `Err(DecodeError)` when a declared length
/// points outside the packet.
///
/// # Examples
/// ```
/// use tsscope_core::ts::TransportPacket;
///
/// let mut bytes = [0xffu8; 188];
/// bytes[..4].copy_from_slice(&[0x47, 0x40, 0x20, 0x17]);
/// let packet = TransportPacket::from_array(bytes, 376);
/// assert_eq!(packet.pid(), 0x0020);
/// assert!(packet.payload_unit_start_indicator());
/// assert_eq!(packet.continuity_counter(), 7);
/// assert_eq!(packet.pcr()?, None);
/// assert_eq!(packet.payload_size()?, 184);
/// # Ok::<(), tsscope_core::ts::DecodeError>(())
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct TransportPacket {
    data: [u8; layout::PACKET_LEN],
    position: u64,
}

impl TransportPacket {
    /// Wrap a captured buffer.
    ///
    /// # Errors
    /// Returns `PacketError::InvalidLength` unless `data` is exactly 188
    /// bytes. That is a caller bug, not a property of the stream.
    pub fn new(data: &[u8], position: u64) -> Result<Self, PacketError> {
        let data: [u8; layout::PACKET_LEN] = data
            .try_into()
            .map_err(|_| PacketError::InvalidLength { actual: data.len() })?;
        Ok(Self::from_array(data, position))
    }

    pub fn from_array(data: [u8; layout::PACKET_LEN], position: u64) -> Self {
        Self { data, position }
    }

    /// Absolute offset of the packet in its source.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn as_bytes(&self) -> &[u8; layout::PACKET_LEN] {
        &self.data
    }

    pub fn transport_error_indicator(&self) -> bool {
        self.data[1] & layout::TRANSPORT_ERROR_BIT != 0
    }

    pub fn payload_unit_start_indicator(&self) -> bool {
        self.data[1] & layout::PAYLOAD_UNIT_START_BIT != 0
    }

    pub fn transport_priority(&self) -> bool {
        self.data[1] & layout::TRANSPORT_PRIORITY_BIT != 0
    }

    /// 13-bit packet identifier.
    pub fn pid(&self) -> u16 {
        u16::from(self.data[layout::PID_HIGH_OFFSET] & layout::PID_HIGH_MASK) << 8
            | u16::from(self.data[layout::PID_LOW_OFFSET])
    }

    pub fn is_null(&self) -> bool {
        self.pid() == layout::PID_NULL
    }

    /// 2-bit scrambling control.
    pub fn transport_scrambling_control(&self) -> u8 {
        (self.data[layout::CONTROL_OFFSET] & layout::SCRAMBLING_MASK) >> layout::SCRAMBLING_SHIFT
    }

    pub fn has_adaptation(&self) -> bool {
        self.data[layout::CONTROL_OFFSET] & layout::HAS_ADAPTATION_BIT != 0
    }

    pub fn has_payload(&self) -> bool {
        self.data[layout::CONTROL_OFFSET] & layout::HAS_PAYLOAD_BIT != 0
    }

    /// 4-bit continuity counter.
    pub fn continuity_counter(&self) -> u8 {
        self.data[layout::CONTROL_OFFSET] & layout::CONTINUITY_MASK
    }

    /// Declared adaptation field length (bytes after the length byte).
    pub fn adaptation_field_length(&self) -> Option<u8> {
        self.has_adaptation()
            .then(|| self.data[layout::ADAPTATION_LENGTH_OFFSET])
    }

    /// Flag byte of the adaptation field; `None` without an adaptation field
    /// or when its declared length is zero.
    pub fn adaptation_flags(&self) -> Option<AdaptationFlags> {
        match self.adaptation_field_length()? {
            0 => None,
            _ => Some(AdaptationFlags(self.data[layout::ADAPTATION_FLAGS_OFFSET])),
        }
    }

    pub fn has_adaptation_extension(&self) -> bool {
        self.adaptation_flags().is_some_and(AdaptationFlags::extension)
    }

    pub fn pcr(&self) -> Result<Option<ClockReference>, DecodeError> {
        self.clock_reference(layout::AF_PCR, "PCR")
    }

    pub fn opcr(&self) -> Result<Option<ClockReference>, DecodeError> {
        self.clock_reference(layout::AF_OPCR, "OPCR")
    }

    /// Signed splice countdown.
    pub fn splice_countdown(&self) -> Result<Option<i8>, DecodeError> {
        let Some((reader, pos)) = self.adaptation_field_at(layout::AF_SPLICING_POINT)? else {
            return Ok(None);
        };
        Ok(Some(reader.read_u8(pos, "splice countdown")? as i8))
    }

    pub fn private_data(&self) -> Result<Option<&[u8]>, DecodeError> {
        let Some((reader, pos)) = self.adaptation_field_at(layout::AF_PRIVATE_DATA)? else {
            return Ok(None);
        };
        reader.read_length_prefixed(pos, "private data").map(Some)
    }

    /// Flag byte of the adaptation extension; `None` when the extension is
    /// absent or declared empty.
    pub fn adaptation_extension_flags(&self) -> Result<Option<u8>, DecodeError> {
        Ok(self
            .extension_bytes()?
            .and_then(|(bytes, pos)| extension_flags(bytes, pos)))
    }

    pub fn ltw(&self) -> Result<Option<LegalTimeWindow>, DecodeError> {
        let Some((reader, pos)) = self.extension_field_at(layout::EXT_LTW)? else {
            return Ok(None);
        };
        let [b0, b1]: [u8; layout::LTW_LEN] = reader.read_array(pos, "LTW")?;
        Ok(Some(LegalTimeWindow {
            valid: b0 & layout::LTW_VALID_BIT != 0,
            offset: u16::from(b0 & layout::LTW_OFFSET_HIGH_MASK) << 8 | u16::from(b1),
        }))
    }

    /// 22-bit piecewise rate.
    pub fn piecewise_rate(&self) -> Result<Option<u32>, DecodeError> {
        let Some((reader, pos)) = self.extension_field_at(layout::EXT_PIECEWISE_RATE)? else {
            return Ok(None);
        };
        let [b0, b1, b2]: [u8; layout::PIECEWISE_RATE_LEN] =
            reader.read_array(pos, "piecewise rate")?;
        Ok(Some(
            u32::from(b0 & layout::PIECEWISE_RATE_HIGH_MASK) << 16
                | u32::from(b1) << 8
                | u32::from(b2),
        ))
    }

    pub fn seamless_splice(&self) -> Result<Option<SeamlessSplice>, DecodeError> {
        let Some((reader, pos)) = self.extension_field_at(layout::EXT_SEAMLESS_SPLICE)? else {
            return Ok(None);
        };
        let [b0, b1, b2, b3, b4]: [u8; layout::SEAMLESS_SPLICE_LEN] =
            reader.read_array(pos, "seamless splice")?;
        // 3 + 15 + 15 bits, each group followed by a marker bit.
        let dts_next_au = u64::from((b0 >> 1) & 0x07) << 30
            | u64::from(b1) << 22
            | u64::from(b2 >> 1) << 15
            | u64::from(b3) << 7
            | u64::from(b4 >> 1);
        Ok(Some(SeamlessSplice {
            splice_type: b0 >> layout::SPLICE_TYPE_SHIFT,
            dts_next_au,
        }))
    }

    /// Bytes of the adaptation extension after its known sub-fields.
    pub fn extension_reserved_bytes(&self) -> Result<Option<&[u8]>, DecodeError> {
        let Some((bytes, pos)) = self.extension_bytes()? else {
            return Ok(None);
        };
        let Some(flags) = extension_flags(bytes, pos) else {
            return Ok(Some(&[][..]));
        };
        let start = fields::field_offset(
            bytes,
            pos + 2,
            &EXTENSION_FIELDS,
            flags,
            fields::full_mask(&EXTENSION_FIELDS),
        )?;
        PacketReader::new(bytes)
            .read_slice(start..bytes.len(), "adaptation extension")
            .map(Some)
    }

    /// Bytes of the adaptation field after every optional sub-field.
    pub fn stuffing_bytes(&self) -> Result<Option<&[u8]>, DecodeError> {
        let Some(bytes) = self.adaptation_bytes()? else {
            return Ok(None);
        };
        let Some(flags) = self.adaptation_flags() else {
            return Ok(Some(&[][..]));
        };
        let start = fields::field_offset(
            bytes,
            layout::ADAPTATION_FIELDS_OFFSET,
            &ADAPTATION_FIELDS,
            flags.bits(),
            fields::full_mask(&ADAPTATION_FIELDS),
        )?;
        PacketReader::new(bytes)
            .read_slice(start..bytes.len(), "stuffing")
            .map(Some)
    }

    /// Offset of the first payload byte within the packet: after the header,
    /// the adaptation length byte and the declared adaptation bytes.
    pub fn payload_offset(&self) -> Result<usize, DecodeError> {
        Ok(self
            .adaptation_bytes()?
            .map_or(layout::HEADER_LEN, <[u8]>::len))
    }

    /// `188 - (4 + adaptation_field_length)`, with a missing adaptation field
    /// counted as length 0.
    ///
    /// The adaptation length byte itself is not subtracted, so when an
    /// adaptation field is present this is one more than `payload().len()`.
    pub fn payload_size(&self) -> Result<usize, DecodeError> {
        self.adaptation_bytes()?;
        let declared = self.adaptation_field_length().map_or(0, usize::from);
        Ok(layout::PACKET_LEN - (layout::HEADER_LEN + declared))
    }

    pub fn payload(&self) -> Result<&[u8], DecodeError> {
        Ok(&self.data[self.payload_offset()?..])
    }

    /// Copy `length` payload bytes starting at `offset` into
    /// `dest[dest_offset..dest_offset + length]`, verbatim.
    pub fn payload_data(
        &self,
        offset: usize,
        dest: &mut [u8],
        dest_offset: usize,
        length: usize,
    ) -> Result<(), DecodeError> {
        let payload = self.payload()?;
        let src = offset
            .checked_add(length)
            .and_then(|end| payload.get(offset..end))
            .ok_or(DecodeError::PayloadRange {
                start: offset,
                end: offset.saturating_add(length),
                size: payload.len(),
            })?;
        let dest_len = dest.len();
        let dst = dest_offset
            .checked_add(length)
            .and_then(|end| dest.get_mut(dest_offset..end))
            .ok_or(DecodeError::DestinationRange {
                start: dest_offset,
                end: dest_offset.saturating_add(length),
                len: dest_len,
            })?;
        dst.copy_from_slice(src);
        Ok(())
    }

    /// Packet prefix ending where the adaptation field ends.
    fn adaptation_bytes(&self) -> Result<Option<&[u8]>, DecodeError> {
        let Some(length) = self.adaptation_field_length() else {
            return Ok(None);
        };
        let end = layout::ADAPTATION_FLAGS_OFFSET + length as usize;
        PacketReader::new(&self.data)
            .read_slice(0..end, "adaptation field")
            .map(Some)
    }

    fn adaptation_field_at(&self, flag: u8) -> Result<Option<(PacketReader<'_>, usize)>, DecodeError> {
        let Some(flags) = self.adaptation_flags() else {
            return Ok(None);
        };
        if !flags.contains(flag) {
            return Ok(None);
        }
        let Some(bytes) = self.adaptation_bytes()? else {
            return Ok(None);
        };
        let pos = fields::field_offset(
            bytes,
            layout::ADAPTATION_FIELDS_OFFSET,
            &ADAPTATION_FIELDS,
            flags.bits(),
            fields::preceding_mask(&ADAPTATION_FIELDS, flag),
        )?;
        Ok(Some((PacketReader::new(bytes), pos)))
    }

    /// Packet prefix ending where the adaptation extension ends, and the
    /// offset of the extension's length byte.
    fn extension_bytes(&self) -> Result<Option<(&[u8], usize)>, DecodeError> {
        let Some((reader, pos)) = self.adaptation_field_at(layout::AF_EXTENSION)? else {
            return Ok(None);
        };
        let body = reader.read_length_prefixed(pos, "adaptation extension")?;
        let end = pos + 1 + body.len();
        Ok(Some((&self.data[..end], pos)))
    }

    fn extension_field_at(&self, flag: u8) -> Result<Option<(PacketReader<'_>, usize)>, DecodeError> {
        let Some((bytes, pos)) = self.extension_bytes()? else {
            return Ok(None);
        };
        let Some(flags) = extension_flags(bytes, pos) else {
            return Ok(None);
        };
        if flags & flag == 0 {
            return Ok(None);
        }
        let offset = fields::field_offset(
            bytes,
            pos + 2,
            &EXTENSION_FIELDS,
            flags,
            fields::preceding_mask(&EXTENSION_FIELDS, flag),
        )?;
        Ok(Some((PacketReader::new(bytes), offset)))
    }

    fn clock_reference(
        &self,
        flag: u8,
        field: &'static str,
    ) -> Result<Option<ClockReference>, DecodeError> {
        let Some((reader, pos)) = self.adaptation_field_at(flag)? else {
            return Ok(None);
        };
        let bytes: [u8; layout::CLOCK_REFERENCE_LEN] = reader.read_array(pos, field)?;
        Ok(Some(ClockReference::from_bytes(bytes)))
    }
}

fn extension_flags(bytes: &[u8], length_pos: usize) -> Option<u8> {
    match bytes.get(length_pos) {
        Some(0) | None => None,
        Some(_) => bytes.get(length_pos + 1).copied(),
    }
}

impl fmt::Debug for TransportPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportPacket")
            .field("position", &self.position)
            .field("pid", &format_args!("{:#06x}", self.pid()))
            .field("continuity_counter", &self.continuity_counter())
            .field("has_adaptation", &self.has_adaptation())
            .field("has_payload", &self.has_payload())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{LegalTimeWindow, SeamlessSplice, TransportPacket};
    use crate::ts::error::{DecodeError, PacketError};
    use crate::ts::fixtures::{PacketBuilder, pack_clock};
    use crate::ts::layout;

    #[test]
    fn rejects_wrong_buffer_length() {
        let err = TransportPacket::new(&[0x47; 187], 0).unwrap_err();
        assert_eq!(err, PacketError::InvalidLength { actual: 187 });
        assert!(TransportPacket::new(&[0x47; 189], 0).is_err());
        assert!(TransportPacket::new(&[0x47; 188], 0).is_ok());
    }

    #[test]
    fn decodes_header_bits() {
        let mut bytes = [0u8; 188];
        bytes[..4].copy_from_slice(&[0x47, 0xe5, 0x34, 0xbd]);
        let packet = TransportPacket::new(&bytes, 188).unwrap();
        assert!(packet.transport_error_indicator());
        assert!(packet.payload_unit_start_indicator());
        assert!(packet.transport_priority());
        assert_eq!(packet.pid(), 0x0534);
        assert_eq!(packet.transport_scrambling_control(), 0b10);
        assert!(packet.has_adaptation());
        assert!(packet.has_payload());
        assert_eq!(packet.continuity_counter(), 0x0d);
        assert_eq!(packet.position(), 188);
    }

    #[test]
    fn pid_round_trips_every_value() {
        for pid in 0..=0x1fffu16 {
            let packet = PacketBuilder::new(pid).build();
            assert_eq!(packet.pid(), pid);
        }
        assert!(PacketBuilder::new(0x1fff).build().is_null());
    }

    #[test]
    fn absent_adaptation_yields_none() {
        let packet = PacketBuilder::new(0x100).build();
        assert_eq!(packet.adaptation_field_length(), None);
        assert_eq!(packet.adaptation_flags(), None);
        assert_eq!(packet.pcr().unwrap(), None);
        assert_eq!(packet.opcr().unwrap(), None);
        assert_eq!(packet.splice_countdown().unwrap(), None);
        assert_eq!(packet.private_data().unwrap(), None);
        assert_eq!(packet.adaptation_extension_flags().unwrap(), None);
        assert_eq!(packet.ltw().unwrap(), None);
        assert_eq!(packet.stuffing_bytes().unwrap(), None);
        assert_eq!(packet.payload_offset().unwrap(), 4);
        assert_eq!(packet.payload_size().unwrap(), 184);
    }

    #[test]
    fn zero_length_adaptation_has_no_flags() {
        let packet = PacketBuilder::new(0x100).empty_adaptation().build();
        assert_eq!(packet.adaptation_field_length(), Some(0));
        assert_eq!(packet.adaptation_flags(), None);
        assert_eq!(packet.pcr().unwrap(), None);
        assert_eq!(packet.stuffing_bytes().unwrap(), Some(&[][..]));
        assert_eq!(packet.payload_offset().unwrap(), 5);
        assert_eq!(packet.payload_size().unwrap(), 184);
        assert_eq!(packet.payload().unwrap().len(), 183);
    }

    #[test]
    fn pcr_flag_unset_yields_none_even_with_adaptation() {
        let packet = PacketBuilder::new(0x100)
            .adaptation(layout::AF_RANDOM_ACCESS, &[])
            .build();
        let flags = packet.adaptation_flags().unwrap();
        assert!(flags.random_access());
        assert!(!flags.pcr());
        assert_eq!(packet.pcr().unwrap(), None);
    }

    #[test]
    fn pcr_decodes_packed_layout() {
        let base = 0x1_2345_6789u64;
        let ext = 0x123u16;
        let packet = PacketBuilder::new(0x20)
            .adaptation(layout::AF_PCR, &pack_clock(base, ext))
            .build();
        let pcr = packet.pcr().unwrap().unwrap();
        assert_eq!(pcr.base, base);
        assert_eq!(pcr.extension, ext);
        assert_eq!(pcr.ticks(), base * 300 + ext as u64);
        assert_eq!(packet.adaptation_field_length(), Some(7));
        assert_eq!(packet.payload_size().unwrap(), 188 - (4 + 7));
    }

    #[test]
    fn offsets_follow_enabled_preceding_fields() {
        let opcr_bytes = pack_clock(7_000, 11);
        let pcr_bytes = pack_clock(5_000, 3);
        for mask in 0..8u8 {
            let with_pcr = mask & 1 != 0;
            let with_opcr = mask & 2 != 0;
            let with_splice = mask & 4 != 0;
            let mut flags = 0;
            let mut fields = Vec::new();
            if with_pcr {
                flags |= layout::AF_PCR;
                fields.extend_from_slice(&pcr_bytes);
            }
            if with_opcr {
                flags |= layout::AF_OPCR;
                fields.extend_from_slice(&opcr_bytes);
            }
            if with_splice {
                flags |= layout::AF_SPLICING_POINT;
                fields.push(0xfb);
            }
            let packet = PacketBuilder::new(0x30).adaptation(flags, &fields).build();
            let bytes = packet.as_bytes();

            let opcr_offset = 6 + if with_pcr { 6 } else { 0 };
            let splice_offset = opcr_offset + if with_opcr { 6 } else { 0 };

            assert_eq!(
                packet.pcr().unwrap().map(|c| c.ticks()),
                with_pcr.then(|| 5_000 * 300 + 3),
                "mask {mask}"
            );
            if with_opcr {
                assert_eq!(&bytes[opcr_offset..opcr_offset + 6], &opcr_bytes);
                assert_eq!(packet.opcr().unwrap().unwrap().ticks(), 7_000 * 300 + 11);
            } else {
                assert_eq!(packet.opcr().unwrap(), None);
            }
            if with_splice {
                assert_eq!(bytes[splice_offset], 0xfb);
                assert_eq!(packet.splice_countdown().unwrap(), Some(-5));
            } else {
                assert_eq!(packet.splice_countdown().unwrap(), None);
            }
        }
    }

    #[test]
    fn private_data_after_fixed_fields() {
        let mut fields = pack_clock(1, 1).to_vec();
        fields.push(0x02);
        fields.extend_from_slice(&[3, 0xaa, 0xbb, 0xcc]);
        let packet = PacketBuilder::new(0x40)
            .adaptation(
                layout::AF_PCR | layout::AF_SPLICING_POINT | layout::AF_PRIVATE_DATA,
                &fields,
            )
            .stuffing(5)
            .build();
        assert_eq!(packet.splice_countdown().unwrap(), Some(2));
        assert_eq!(packet.private_data().unwrap(), Some(&[0xaa, 0xbb, 0xcc][..]));
        assert_eq!(packet.stuffing_bytes().unwrap(), Some(&[0xff; 5][..]));
    }

    #[test]
    fn extension_sub_fields() {
        let extension = [
            12,   // extension length
            0xe0, // ltw | piecewise rate | seamless splice
            0x81,
            0x23, // ltw valid, offset 0x0123
            0xc1,
            0x23,
            0x45, // piecewise rate 0x012345 (reserved bits set)
            0x5f,
            0xff,
            0xff,
            0xff,
            0xff, // splice type 5, DTS 0x1_ffff_ffff
            0xde, // reserved
        ];
        let packet = PacketBuilder::new(0x50)
            .adaptation(layout::AF_EXTENSION, &extension)
            .stuffing(2)
            .build();
        assert!(packet.has_adaptation_extension());
        assert_eq!(packet.adaptation_extension_flags().unwrap(), Some(0xe0));
        assert_eq!(
            packet.ltw().unwrap(),
            Some(LegalTimeWindow {
                valid: true,
                offset: 0x0123
            })
        );
        assert_eq!(packet.piecewise_rate().unwrap(), Some(0x012345));
        assert_eq!(
            packet.seamless_splice().unwrap(),
            Some(SeamlessSplice {
                splice_type: 5,
                dts_next_au: (1u64 << 33) - 1
            })
        );
        assert_eq!(packet.extension_reserved_bytes().unwrap(), Some(&[0xde][..]));
        assert_eq!(packet.stuffing_bytes().unwrap(), Some(&[0xff, 0xff][..]));
    }

    #[test]
    fn seamless_splice_skips_only_present_extension_fields() {
        // Only seamless splice present: DTS = 1 << 30 | 1 << 15 | 1.
        let extension = [6, 0x20, 0x03, 0x00, 0x03, 0x00, 0x03];
        let packet = PacketBuilder::new(0x50)
            .adaptation(layout::AF_EXTENSION, &extension)
            .build();
        assert_eq!(packet.ltw().unwrap(), None);
        assert_eq!(packet.piecewise_rate().unwrap(), None);
        assert_eq!(
            packet.seamless_splice().unwrap(),
            Some(SeamlessSplice {
                splice_type: 0,
                dts_next_au: (1 << 30) | (1 << 15) | 1
            })
        );
        assert_eq!(packet.extension_reserved_bytes().unwrap(), Some(&[][..]));
    }

    #[test]
    fn declared_adaptation_length_past_packet_is_error() {
        let packet = PacketBuilder::new(0x60)
            .adaptation(layout::AF_PCR, &pack_clock(1, 1))
            .declared_length(200)
            .build();
        let err = packet.pcr().unwrap_err();
        assert_eq!(
            err,
            DecodeError::FieldOutOfBounds {
                field: "adaptation field",
                needed: 205,
                available: 188
            }
        );
        assert!(packet.payload_size().is_err());
    }

    #[test]
    fn private_data_length_past_adaptation_is_error() {
        let packet = PacketBuilder::new(0x60)
            .adaptation(layout::AF_PRIVATE_DATA, &[40, 1, 2])
            .build();
        let err = packet.private_data().unwrap_err();
        assert!(matches!(
            err,
            DecodeError::FieldOutOfBounds {
                field: "private data",
                ..
            }
        ));
    }

    #[test]
    fn field_flagged_but_truncated_is_error() {
        // PCR flag set, but the declared length only covers the flag byte.
        let packet = PacketBuilder::new(0x60)
            .adaptation(layout::AF_PCR, &[])
            .build();
        assert!(matches!(
            packet.pcr(),
            Err(DecodeError::FieldOutOfBounds { field: "PCR", .. })
        ));
    }

    #[test]
    fn payload_size_subtracts_header_and_declared_length() {
        let cases: [(Option<u8>, usize); 4] =
            [(None, 184), (Some(0), 184), (Some(7), 177), (Some(183), 1)];
        for (declared, expected) in cases {
            let builder = PacketBuilder::new(0x20);
            let packet = match declared {
                None => builder.build(),
                Some(0) => builder.empty_adaptation().build(),
                Some(length) => builder
                    .adaptation(0, &[])
                    .declared_length(length)
                    .build(),
            };
            assert_eq!(packet.payload_size().unwrap(), expected, "{declared:?}");
        }
    }

    #[test]
    fn payload_data_copies_verbatim() {
        let packet = PacketBuilder::new(0x70)
            .adaptation(layout::AF_PCR, &pack_clock(1, 1))
            .payload(&[1, 2, 3, 4, 5])
            .build();
        assert_eq!(packet.payload_offset().unwrap(), 12);
        assert_eq!(packet.payload_size().unwrap(), 177);
        let mut dest = [0u8; 6];
        packet.payload_data(1, &mut dest, 2, 3).unwrap();
        assert_eq!(dest, [0, 0, 2, 3, 4, 0]);
        assert_eq!(&packet.payload().unwrap()[..5], &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn payload_data_range_errors() {
        let packet = PacketBuilder::new(0x70).build();
        let mut dest = [0u8; 4];
        assert_eq!(
            packet.payload_data(183, &mut dest, 0, 2).unwrap_err(),
            DecodeError::PayloadRange {
                start: 183,
                end: 185,
                size: 184
            }
        );
        assert_eq!(
            packet.payload_data(0, &mut dest, 3, 2).unwrap_err(),
            DecodeError::DestinationRange {
                start: 3,
                end: 5,
                len: 4
            }
        );
    }
}
