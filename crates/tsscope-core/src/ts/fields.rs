//! Offset computation for the optional sub-fields of the adaptation field
//! and of the adaptation field extension.
//!
//! Both levels share one shape: a flag byte, then an ordered list of fields,
//! each present iff its flag bit is set. The offset of field X is found by
//! skipping every present field ordered before X.

use super::error::DecodeError;
use super::layout;
use super::reader::PacketReader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSize {
    Fixed(usize),
    /// One length byte followed by that many bytes.
    LengthPrefixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionalField {
    pub flag: u8,
    pub name: &'static str,
    pub size: FieldSize,
}

pub const ADAPTATION_FIELDS: [OptionalField; 5] = [
    OptionalField {
        flag: layout::AF_PCR,
        name: "PCR",
        size: FieldSize::Fixed(layout::CLOCK_REFERENCE_LEN),
    },
    OptionalField {
        flag: layout::AF_OPCR,
        name: "OPCR",
        size: FieldSize::Fixed(layout::CLOCK_REFERENCE_LEN),
    },
    OptionalField {
        flag: layout::AF_SPLICING_POINT,
        name: "splice countdown",
        size: FieldSize::Fixed(layout::SPLICE_COUNTDOWN_LEN),
    },
    OptionalField {
        flag: layout::AF_PRIVATE_DATA,
        name: "private data",
        size: FieldSize::LengthPrefixed,
    },
    OptionalField {
        flag: layout::AF_EXTENSION,
        name: "adaptation extension",
        size: FieldSize::LengthPrefixed,
    },
];

pub const EXTENSION_FIELDS: [OptionalField; 3] = [
    OptionalField {
        flag: layout::EXT_LTW,
        name: "LTW",
        size: FieldSize::Fixed(layout::LTW_LEN),
    },
    OptionalField {
        flag: layout::EXT_PIECEWISE_RATE,
        name: "piecewise rate",
        size: FieldSize::Fixed(layout::PIECEWISE_RATE_LEN),
    },
    OptionalField {
        flag: layout::EXT_SEAMLESS_SPLICE,
        name: "seamless splice",
        size: FieldSize::Fixed(layout::SEAMLESS_SPLICE_LEN),
    },
];

/// Flags of every field in `table` ordered before the field with `flag`.
///
/// Returns the mask of the whole table when `flag` is not in it, which
/// positions the cursor after the last field.
pub fn preceding_mask(table: &[OptionalField], flag: u8) -> u8 {
    table
        .iter()
        .take_while(|field| field.flag != flag)
        .fold(0, |mask, field| mask | field.flag)
}

/// Mask covering every field of `table`.
pub fn full_mask(table: &[OptionalField]) -> u8 {
    table.iter().fold(0, |mask, field| mask | field.flag)
}

/// Offset reached from `start` after skipping each field of `table` whose
/// flag is set in both `skip` and `present`.
///
/// Length-prefixed fields read their length byte from `data`; a length byte
/// outside `data` is a `DecodeError`. The returned offset itself is not
/// checked, callers bound-check the reads they make there.
pub fn field_offset(
    data: &[u8],
    start: usize,
    table: &[OptionalField],
    present: u8,
    skip: u8,
) -> Result<usize, DecodeError> {
    let reader = PacketReader::new(data);
    let mut pos = start;
    for field in table {
        if field.flag & skip & present == 0 {
            continue;
        }
        pos += match field.size {
            FieldSize::Fixed(size) => size,
            FieldSize::LengthPrefixed => 1 + reader.read_u8(pos, field.name)? as usize,
        };
    }
    Ok(pos)
}
