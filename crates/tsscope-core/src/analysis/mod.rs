use std::path::Path;

use log::debug;
use thiserror::Error;

use crate::source::{ByteSource, FileByteSource, SourceError};
use crate::ts::layout::PACKET_LEN;
use crate::ts::{RoundMode, StreamError, TransportStream};
use crate::{RangeInfo, StreamReport, make_stub_report};

mod packets;
mod pids;

pub use packets::describe_packet;
use pids::PidTable;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),
}

/// Byte range to summarize. Bounds are rounded outward to packet starts;
/// `end: None` means the last packet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanRange {
    pub start: i64,
    pub end: Option<i64>,
}

impl ScanRange {
    pub fn new(start: i64, end: Option<i64>) -> Self {
        Self { start, end }
    }
}

pub fn summarize_file(path: &Path, range: ScanRange) -> Result<StreamReport, AnalysisError> {
    let source = FileByteSource::open(path)?;
    let mut stream = TransportStream::open(source)?;
    let report = summarize_stream(&path.display().to_string(), &mut stream, range);
    stream.close()?;
    report
}

/// Walk `range` of an opened stream and aggregate per-PID counters.
pub fn summarize_stream<S: ByteSource>(
    name: &str,
    stream: &mut TransportStream<S>,
    range: ScanRange,
) -> Result<StreamReport, AnalysisError> {
    let length = i64::try_from(stream.length()).unwrap_or(i64::MAX);
    let end = range.end.unwrap_or(length);
    let first = stream.round(range.start, RoundMode::Down);
    let final_start = stream
        .round(end, RoundMode::Up)
        .min(stream.last_packet_start());
    let slots = if end < range.start {
        0
    } else {
        (final_start - first).max(0) as u64 / PACKET_LEN as u64 + 1
    };

    let mut table = PidTable::new();
    let mut packets_total = 0u64;
    let mut decode_errors = 0u64;
    for packet in stream.window(range.start, end) {
        let packet = packet?;
        packets_total += 1;
        let pcr = match packet.pcr() {
            Ok(pcr) => pcr.map(|pcr| pcr.ticks()),
            Err(err) => {
                debug!("{name}@{}: {err}", packet.position());
                decode_errors += 1;
                None
            }
        };
        table.observe(&packet, pcr);
    }
    debug!(
        "{name}: {packets_total} packets, {} pids in {first}..={final_start}",
        table.len()
    );

    let mut report = make_stub_report(name, stream.length());
    report.range = RangeInfo {
        start: first as u64,
        end: final_start.max(first) as u64,
    };
    report.packets_total = packets_total;
    report.absent_positions = slots.saturating_sub(packets_total);
    report.decode_errors = decode_errors;
    report.pids = table.into_summaries();
    Ok(report)
}
