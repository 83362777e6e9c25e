pub const PACKET_LEN: usize = 188;
pub const SYNC_BYTE: u8 = 0x47;

pub const SYNC_OFFSET: usize = 0;
pub const HEADER_LEN: usize = 4;

pub const TRANSPORT_ERROR_BIT: u8 = 0x80;
pub const PAYLOAD_UNIT_START_BIT: u8 = 0x40;
pub const TRANSPORT_PRIORITY_BIT: u8 = 0x20;
pub const PID_HIGH_MASK: u8 = 0x1f;
pub const PID_HIGH_OFFSET: usize = 1;
pub const PID_LOW_OFFSET: usize = 2;
pub const PID_NULL: u16 = 0x1fff;

pub const CONTROL_OFFSET: usize = 3;
pub const SCRAMBLING_MASK: u8 = 0xc0;
pub const SCRAMBLING_SHIFT: u8 = 6;
pub const HAS_ADAPTATION_BIT: u8 = 0x20;
pub const HAS_PAYLOAD_BIT: u8 = 0x10;
pub const CONTINUITY_MASK: u8 = 0x0f;

pub const ADAPTATION_LENGTH_OFFSET: usize = HEADER_LEN;
pub const ADAPTATION_FLAGS_OFFSET: usize = HEADER_LEN + 1;
/// First optional adaptation sub-field, right after the flag byte.
pub const ADAPTATION_FIELDS_OFFSET: usize = HEADER_LEN + 2;

pub const AF_DISCONTINUITY: u8 = 0x80;
pub const AF_RANDOM_ACCESS: u8 = 0x40;
pub const AF_ES_PRIORITY: u8 = 0x20;
pub const AF_PCR: u8 = 0x10;
pub const AF_OPCR: u8 = 0x08;
pub const AF_SPLICING_POINT: u8 = 0x04;
pub const AF_PRIVATE_DATA: u8 = 0x02;
pub const AF_EXTENSION: u8 = 0x01;

pub const EXT_LTW: u8 = 0x80;
pub const EXT_PIECEWISE_RATE: u8 = 0x40;
pub const EXT_SEAMLESS_SPLICE: u8 = 0x20;

pub const CLOCK_REFERENCE_LEN: usize = 6;
pub const SPLICE_COUNTDOWN_LEN: usize = 1;
pub const LTW_LEN: usize = 2;
pub const PIECEWISE_RATE_LEN: usize = 3;
pub const SEAMLESS_SPLICE_LEN: usize = 5;

pub const LTW_VALID_BIT: u8 = 0x80;
pub const LTW_OFFSET_HIGH_MASK: u8 = 0x7f;
pub const PIECEWISE_RATE_HIGH_MASK: u8 = 0x3f;
pub const SPLICE_TYPE_SHIFT: u8 = 4;

/// 27 MHz ticks per 90 kHz base tick.
pub const CLOCK_EXTENSION_RATIO: u64 = 300;
pub const CLOCK_BASE_BITS: u32 = 33;
pub const CLOCK_EXTENSION_BITS: u32 = 9;

/// Sampled record index checked by the probe besides the first, second and
/// last records.
pub const PROBE_DEEP_RECORD: u64 = 20;
