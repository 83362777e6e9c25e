use log::{debug, trace};

use super::error::StreamError;
use super::layout;
use super::packet::TransportPacket;
use crate::source::{ByteSource, SourceError};

const PACKET_LEN_I64: i64 = layout::PACKET_LEN as i64;
const PACKET_LEN_U64: u64 = layout::PACKET_LEN as u64;

/// How `TransportStream::round` maps a byte position onto a packet start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundMode {
    /// Start of the packet containing the position.
    Down,
    /// Next packet start at or after the position.
    Up,
    /// Start of the packet after the one containing the position.
    Inc,
}

/// Check whether `source` looks like a transport stream.
///
/// The check samples sync bytes instead of scanning: the length must be a
/// non-zero multiple of 188, and the sync byte must be present at the first,
/// second, twenty-first and last packet starts (where the stream is long
/// enough to have them). Leaves the cursor at an unspecified position.
///
/// # Examples
/// ```
/// use tsscope_core::MemoryByteSource;
/// use tsscope_core::ts::probe;
///
/// let mut data = vec![0u8; 376];
/// data[0] = 0x47;
/// data[188] = 0x47;
/// assert!(probe(&mut MemoryByteSource::new(data))?);
/// assert!(!probe(&mut MemoryByteSource::new(vec![0x47; 200]))?);
/// # Ok::<(), tsscope_core::SourceError>(())
/// ```
pub fn probe<S: ByteSource + ?Sized>(source: &mut S) -> Result<bool, SourceError> {
    let length = source.length();
    if length < PACKET_LEN_U64 {
        debug!("probe: {} too short ({} bytes)", source.describe(), length);
        return Ok(false);
    }
    if length % PACKET_LEN_U64 != 0 {
        debug!(
            "probe: {} length {} is not a multiple of {}",
            source.describe(),
            length,
            layout::PACKET_LEN
        );
        return Ok(false);
    }

    let mut samples = vec![0];
    if length >= 2 * PACKET_LEN_U64 {
        samples.push(PACKET_LEN_U64);
    }
    if length >= (layout::PROBE_DEEP_RECORD + 1) * PACKET_LEN_U64 {
        samples.push(layout::PROBE_DEEP_RECORD * PACKET_LEN_U64);
    }
    samples.push(length - PACKET_LEN_U64);

    for offset in samples {
        if !sync_at(source, offset)? {
            debug!(
                "probe: {} has no sync byte at offset {}",
                source.describe(),
                offset
            );
            return Ok(false);
        }
    }
    Ok(true)
}

fn sync_at<S: ByteSource + ?Sized>(source: &mut S, offset: u64) -> Result<bool, SourceError> {
    source.seek(offset)?;
    match source.read_byte() {
        Ok(byte) => Ok(byte == layout::SYNC_BYTE),
        Err(SourceError::EndOfInput) => Ok(false),
        Err(err) => Err(err),
    }
}

/// A transport stream over an exclusively held `ByteSource`.
///
/// The stream owns its source (pass `&mut source` to keep ownership
/// elsewhere). Every fetch seeks and reads afresh; nothing is cached.
///
/// # Examples
/// ```
/// use tsscope_core::MemoryByteSource;
/// use tsscope_core::ts::{RoundMode, TransportStream};
///
/// let mut data = vec![0xffu8; 376];
/// data[..4].copy_from_slice(&[0x47, 0x00, 0x20, 0x10]);
/// data[188..192].copy_from_slice(&[0x47, 0x1f, 0xff, 0x10]);
///
/// let mut stream = TransportStream::open(MemoryByteSource::new(data))?;
/// assert_eq!(stream.round(200, RoundMode::Down), 188);
/// let packet = stream.packet_at(188)?.expect("packet");
/// assert_eq!(packet.pid(), 0x1fff);
/// assert!(stream.packet_at(376)?.is_none());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct TransportStream<S: ByteSource> {
    source: S,
}

impl<S: ByteSource> TransportStream<S> {
    pub fn probe(source: &mut S) -> Result<bool, SourceError> {
        probe(source)
    }

    /// Take `source` as a transport stream.
    ///
    /// # Errors
    /// `StreamError::UnsupportedFormat` when the probe rejects the source;
    /// `StreamError::Source` when probing fails with an I/O error.
    pub fn open(mut source: S) -> Result<Self, StreamError> {
        if !probe(&mut source)? {
            return Err(StreamError::UnsupportedFormat {
                source_name: source.describe(),
            });
        }
        let stream = Self { source };
        debug!(
            "opened transport stream {} ({} packets)",
            stream.source.describe(),
            stream.packet_count()
        );
        Ok(stream)
    }

    pub fn length(&self) -> u64 {
        self.source.length()
    }

    pub fn packet_count(&self) -> u64 {
        self.length() / PACKET_LEN_U64
    }

    /// Give the source back without closing it.
    pub fn into_inner(self) -> S {
        self.source
    }

    pub fn close(&mut self) -> Result<(), SourceError> {
        self.source.close()
    }

    /// Align `position` to a packet start.
    ///
    /// Results below zero become 0. A `Down` or `Up` result past the end of
    /// the stream becomes the start of the last packet; the end of the stream
    /// itself is kept, so `round(p, Up)` is the stream length for every `p`
    /// inside the last packet. `Inc` never goes beyond the last packet start.
    pub fn round(&self, position: i64, mode: RoundMode) -> i64 {
        let rounded = match mode {
            RoundMode::Down => position.div_euclid(PACKET_LEN_I64),
            RoundMode::Up => position
                .saturating_add(PACKET_LEN_I64 - 1)
                .div_euclid(PACKET_LEN_I64),
            RoundMode::Inc => position
                .saturating_add(PACKET_LEN_I64)
                .div_euclid(PACKET_LEN_I64),
        }
        .saturating_mul(PACKET_LEN_I64);

        let last = self.last_packet_start();
        let limit = match mode {
            RoundMode::Inc => last,
            RoundMode::Down | RoundMode::Up => {
                i64::try_from(self.length()).unwrap_or(i64::MAX)
            }
        };
        if rounded < 0 {
            0
        } else if rounded > limit {
            last
        } else {
            rounded
        }
    }

    /// Fetch the packet starting at `position`.
    ///
    /// Returns `Ok(None)` when the position is outside the stream or does not
    /// hold a sync byte; such misses are expected while probing arbitrary
    /// offsets and are not errors.
    pub fn packet_at(&mut self, position: i64) -> Result<Option<TransportPacket>, SourceError> {
        let Ok(start) = u64::try_from(position) else {
            trace!("packet_at({position}): negative position");
            return Ok(None);
        };
        match start.checked_add(PACKET_LEN_U64) {
            Some(end) if end <= self.length() => {}
            _ => {
                trace!("packet_at({position}): past end of stream");
                return Ok(None);
            }
        }

        self.source.seek(start)?;
        let mut data = [0u8; layout::PACKET_LEN];
        let read = self.source.read_block(&mut data)?;
        if read < layout::PACKET_LEN {
            trace!("packet_at({position}): short read of {read} bytes");
            return Ok(None);
        }
        if data[layout::SYNC_OFFSET] != layout::SYNC_BYTE {
            trace!("packet_at({position}): no sync byte");
            return Ok(None);
        }
        Ok(Some(TransportPacket::from_array(data, start)))
    }

    /// Iterate the packets between two byte positions, the way a viewer
    /// walks its visible range: from `round(start, Down)` to
    /// `round(end, Up)` inclusive, skipping positions without a packet. The
    /// upper bound never goes past the last packet start.
    pub fn window(&mut self, start: i64, end: i64) -> PacketWindow<'_, S> {
        let next = self.round(start, RoundMode::Down);
        let last = if end < start {
            next - PACKET_LEN_I64
        } else {
            self.round(end, RoundMode::Up).min(self.last_packet_start())
        };
        PacketWindow {
            stream: self,
            next,
            last,
        }
    }

    /// Iterate every packet of the stream.
    pub fn packets(&mut self) -> PacketWindow<'_, S> {
        let last = self.last_packet_start();
        self.window(0, last)
    }

    /// Start of the last whole packet.
    pub fn last_packet_start(&self) -> i64 {
        i64::try_from(self.length().saturating_sub(PACKET_LEN_U64)).unwrap_or(i64::MAX)
    }
}

/// Iterator returned by `TransportStream::window`.
///
/// Yields an error at most once, then stops.
pub struct PacketWindow<'a, S: ByteSource> {
    stream: &'a mut TransportStream<S>,
    next: i64,
    last: i64,
}

impl<S: ByteSource> Iterator for PacketWindow<'_, S> {
    type Item = Result<TransportPacket, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next <= self.last {
            let position = self.next;
            self.next += PACKET_LEN_I64;
            match self.stream.packet_at(position) {
                Ok(Some(packet)) => return Some(Ok(packet)),
                Ok(None) => continue,
                Err(err) => {
                    self.next = self.last.saturating_add(1);
                    return Some(Err(err));
                }
            }
        }
        None
    }
}
