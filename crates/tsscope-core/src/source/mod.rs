//! Random-access byte sources.
//!
//! A `ByteSource` is a finite, seekable byte medium with exactly one mutable
//! cursor. Every call moves (or depends on) that cursor, so callers must hold
//! `&mut` access for the whole of a seek + read pair. Containers take the
//! source by value or as `&mut S` and keep it for their entire lifetime.

mod file;
mod memory;

pub use file::FileByteSource;
pub use memory::MemoryByteSource;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("end of input")]
    EndOfInput,
    #[error("byte source is closed")]
    Closed,
    #[error("destination range {start}..{end} exceeds buffer of {len} bytes")]
    InvalidRange { start: usize, end: usize, len: usize },
}

pub trait ByteSource {
    /// Read the byte under the cursor and advance by one.
    ///
    /// # Errors
    /// Returns `SourceError::EndOfInput` when the cursor is at or past the
    /// end of the medium.
    fn read_byte(&mut self) -> Result<u8, SourceError>;

    /// Fill `dest` from the cursor, returning how many bytes were read.
    ///
    /// Fewer bytes than `dest.len()` (possibly zero) are returned only when
    /// the end of the medium is reached.
    fn read_block(&mut self, dest: &mut [u8]) -> Result<usize, SourceError>;

    /// Read `length` bytes into `dest[dest_pos..dest_pos + length]`.
    fn read_block_into(
        &mut self,
        dest: &mut [u8],
        dest_pos: usize,
        length: usize,
    ) -> Result<usize, SourceError> {
        let len = dest.len();
        let end = dest_pos
            .checked_add(length)
            .filter(|end| *end <= len)
            .ok_or(SourceError::InvalidRange {
                start: dest_pos,
                end: dest_pos.saturating_add(length),
                len,
            })?;
        self.read_block(&mut dest[dest_pos..end])
    }

    /// Total length in bytes, fixed once the source is opened.
    fn length(&self) -> u64;

    /// Move the cursor to an absolute position.
    ///
    /// Seeking past `length()` is allowed; subsequent reads return no data.
    fn seek(&mut self, position: u64) -> Result<(), SourceError>;

    /// Release the medium. Calling it again is a no-op.
    fn close(&mut self) -> Result<(), SourceError>;

    /// Human-readable name used in diagnostics.
    fn describe(&self) -> String {
        "<byte source>".to_string()
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_byte(&mut self) -> Result<u8, SourceError> {
        (**self).read_byte()
    }

    fn read_block(&mut self, dest: &mut [u8]) -> Result<usize, SourceError> {
        (**self).read_block(dest)
    }

    fn length(&self) -> u64 {
        (**self).length()
    }

    fn seek(&mut self, position: u64) -> Result<(), SourceError> {
        (**self).seek(position)
    }

    fn close(&mut self) -> Result<(), SourceError> {
        (**self).close()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn read_byte(&mut self) -> Result<u8, SourceError> {
        (**self).read_byte()
    }

    fn read_block(&mut self, dest: &mut [u8]) -> Result<usize, SourceError> {
        (**self).read_block(dest)
    }

    fn length(&self) -> u64 {
        (**self).length()
    }

    fn seek(&mut self, position: u64) -> Result<(), SourceError> {
        (**self).seek(position)
    }

    fn close(&mut self) -> Result<(), SourceError> {
        (**self).close()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
