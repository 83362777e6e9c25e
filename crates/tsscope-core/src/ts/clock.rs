use serde::{Deserialize, Serialize};

use super::layout;

/// A program (or original program) clock reference.
///
/// Packed in six bytes as `base (33 bits) | reserved (6) | extension (9)`,
/// most significant bit first. `ticks()` combines both parts into a single
/// 27 MHz count.
///
/// # Examples
/// ```
/// use tsscope_core::ts::ClockReference;
///
/// // base = 1, extension = 2
/// let pcr = ClockReference::from_bytes([0x00, 0x00, 0x00, 0x00, 0x80, 0x02]);
/// assert_eq!(pcr.base, 1);
/// assert_eq!(pcr.extension, 2);
/// assert_eq!(pcr.ticks(), 302);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockReference {
    /// 90 kHz base, 33 bits.
    pub base: u64,
    /// 27 MHz extension, 9 bits (0..300 in conformant streams).
    pub extension: u16,
}

impl ClockReference {
    pub fn from_bytes(bytes: [u8; layout::CLOCK_REFERENCE_LEN]) -> Self {
        let base = (bytes[0] as u64) << 25
            | (bytes[1] as u64) << 17
            | (bytes[2] as u64) << 9
            | (bytes[3] as u64) << 1
            | (bytes[4] as u64) >> 7;
        let extension = ((bytes[4] & 0x01) as u16) << 8 | bytes[5] as u16;
        Self { base, extension }
    }

    /// Combined value in 27 MHz ticks: `base * 300 + extension`.
    pub fn ticks(&self) -> u64 {
        self.base * layout::CLOCK_EXTENSION_RATIO + self.extension as u64
    }

    pub fn seconds(&self) -> f64 {
        self.ticks() as f64 / 27_000_000.0
    }
}
