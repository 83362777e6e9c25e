//! MPEG-2 transport stream container and packet decoding.
//!
//! Layout:
//! - `layout`: byte offsets, bit masks and field sizes (source of truth)
//! - `reader`: bounds-checked byte access
//! - `fields`: ordered optional-field tables and the offset scan over them
//! - `packet`: per-packet accessors (no I/O)
//! - `stream`: format probe, position rounding and packet fetch over a
//!   `ByteSource`
//! - `error`: misuse, decode and open errors
//!
//! Packets are 188 bytes and start with the sync byte 0x47. Only the packet
//! header and the adaptation field are decoded; payload bytes are handed out
//! verbatim.

pub mod clock;
pub mod error;
pub mod fields;
pub mod layout;
pub mod packet;
pub mod reader;
pub mod stream;

#[cfg(test)]
pub(crate) mod fixtures;

pub use clock::ClockReference;
pub use error::{DecodeError, PacketError, StreamError};
pub use packet::{AdaptationFlags, LegalTimeWindow, SeamlessSplice, TransportPacket};
pub use stream::{PacketWindow, RoundMode, TransportStream, probe};
