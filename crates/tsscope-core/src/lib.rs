//! tsscope core library for inspecting MPEG-2 transport stream files.
//!
//! The crate is layered the same way end to end: byte sources feed the
//! transport stream container, which hands out immutable packets; the packet
//! decoder reads header and adaptation fields on demand; the analysis layer
//! walks a byte range and aggregates per-PID summaries into a report.
//! All I/O lives in `source`; `ts` decoding is pure over captured bytes.
//!
//! Invariants:
//! - An opened stream's length is a whole number of 188-byte packets.
//! - A packet is exactly 188 bytes; misuse is rejected at construction.
//! - Optional fields that are absent decode to `None`, never to a default.
//! - Declared lengths are bounds-checked; inconsistent data yields a
//!   `DecodeError` instead of an out-of-bounds read.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use tsscope_core::{ScanRange, summarize_file};
//!
//! let report = summarize_file(Path::new("capture.ts"), ScanRange::default())?;
//! for pid in &report.pids {
//!     println!("{} {} packets", pid.label, pid.packets);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

mod analysis;
mod source;
pub mod ts;

pub use analysis::{AnalysisError, ScanRange, describe_packet, summarize_file, summarize_stream};
pub use source::{ByteSource, FileByteSource, MemoryByteSource, SourceError};

use ts::{ClockReference, LegalTimeWindow, SeamlessSplice};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;

/// Per-PID summary of a scanned range, in first-seen PID order.
///
/// # Examples
/// ```
/// use tsscope_core::make_stub_report;
///
/// let report = make_stub_report("capture.ts", 376);
/// assert_eq!(report.report_version, tsscope_core::REPORT_VERSION);
/// assert!(report.pids.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamReport {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    pub tool: ToolInfo,
    pub input: InputInfo,
    /// Scanned byte range, packet aligned.
    pub range: RangeInfo,
    /// Packets decoded in the range.
    pub packets_total: u64,
    /// Packet positions in the range that held no sync byte.
    pub absent_positions: u64,
    /// Packets whose adaptation field could not be decoded.
    pub decode_errors: u64,
    pub pids: Vec<PidSummary>,
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

/// Input metadata embedded in reports.
///
/// # Examples
/// ```
/// use tsscope_core::InputInfo;
///
/// let input = InputInfo {
///     path: "capture.ts".to_string(),
///     bytes: 188 * 10,
/// };
/// assert_eq!(input.bytes % 188, 0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path (or source name) as provided to the analyzer.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// First and last packet start of a scanned range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeInfo {
    pub start: u64,
    pub end: u64,
}

/// Aggregated counters for one PID.
///
/// # Examples
/// ```
/// use tsscope_core::PidSummary;
///
/// let summary = PidSummary::new(0x0020, 0);
/// assert_eq!(summary.label, "0x0020");
/// assert_eq!(summary.packets, 0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PidSummary {
    pub pid: u16,
    /// Hex label, `0x` plus four digits.
    pub label: String,
    pub packets: u64,
    pub first_position: u64,
    pub last_position: u64,
    pub payload_unit_starts: u64,
    pub scrambled_packets: u64,
    pub transport_errors: u64,
    pub discontinuities: u64,
    /// Duplicate packets (same continuity counter, with payload).
    pub duplicates: u64,
    /// Unexpected continuity counter jumps outside signalled discontinuities.
    pub continuity_errors: u64,
    pub pcr_count: u64,
    /// First PCR in 27 MHz ticks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_pcr: Option<u64>,
    /// Last PCR in 27 MHz ticks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_pcr: Option<u64>,
}

impl PidSummary {
    pub fn new(pid: u16, position: u64) -> Self {
        Self {
            pid,
            label: format!("0x{pid:04x}"),
            packets: 0,
            first_position: position,
            last_position: position,
            payload_unit_starts: 0,
            scrambled_packets: 0,
            transport_errors: 0,
            discontinuities: 0,
            duplicates: 0,
            continuity_errors: 0,
            pcr_count: 0,
            first_pcr: None,
            last_pcr: None,
        }
    }
}

/// Decoded view of a single packet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacketInfo {
    pub position: u64,
    pub pid: u16,
    pub transport_error: bool,
    pub payload_unit_start: bool,
    pub transport_priority: bool,
    pub scrambling_control: u8,
    pub continuity_counter: u8,
    pub has_payload: bool,
    /// `188 - (4 + adaptation length)`; absent when the adaptation length is invalid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adaptation: Option<AdaptationInfo>,
}

/// Decoded adaptation field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdaptationInfo {
    /// Declared length in bytes after the length byte.
    pub length: u8,
    pub discontinuity: bool,
    pub random_access: bool,
    pub es_priority: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pcr: Option<ClockReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opcr: Option<ClockReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub splice_countdown: Option<i8>,
    /// Transport private data as lowercase hex.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<ExtensionInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stuffing_len: Option<usize>,
    /// First decode error hit while reading optional fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Decoded adaptation field extension.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtensionInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ltw: Option<LegalTimeWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub piecewise_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seamless_splice: Option<SeamlessSplice>,
    pub reserved_len: usize,
}

/// Build a report with base fields filled and empty aggregates.
pub fn make_stub_report(input_path: &str, input_bytes: u64) -> StreamReport {
    StreamReport {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "tsscope".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        range: RangeInfo { start: 0, end: 0 },
        packets_total: 0,
        absent_positions: 0,
        decode_errors: 0,
        pids: vec![],
    }
}
