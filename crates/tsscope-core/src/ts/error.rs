use thiserror::Error;

/// Packet construction misuse: the buffer is not exactly one record long.
///
/// # Examples
/// ```
/// use tsscope_core::ts::PacketError;
///
/// let err = PacketError::InvalidLength { actual: 187 };
/// assert!(err.to_string().contains("187"));
/// ```
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PacketError {
    #[error("invalid packet length: need 188 bytes, got {actual}")]
    InvalidLength { actual: usize },
}

/// Errors raised while decoding optional packet fields.
///
/// Declared lengths inside the adaptation field are checked against the
/// record bounds; inconsistent data yields `FieldOutOfBounds` rather than a
/// read past the buffer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("{field} out of bounds: need {needed} bytes, packet has {available}")]
    FieldOutOfBounds {
        field: &'static str,
        needed: usize,
        available: usize,
    },
    #[error("payload range {start}..{end} exceeds payload of {size} bytes")]
    PayloadRange { start: usize, end: usize, size: usize },
    #[error("destination range {start}..{end} exceeds buffer of {len} bytes")]
    DestinationRange { start: usize, end: usize, len: usize },
}

/// Errors raised when opening a transport stream container.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("unsupported format: {source_name} is not an MPEG transport stream")]
    UnsupportedFormat { source_name: String },
    #[error("source error: {0}")]
    Source(#[from] crate::source::SourceError),
}
