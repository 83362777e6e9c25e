use super::{ByteSource, SourceError};

/// An in-memory `ByteSource` over an owned byte vector.
///
/// # Examples
/// ```
/// use tsscope_core::{ByteSource, MemoryByteSource};
///
/// let mut source = MemoryByteSource::new(vec![0x47, 0x1f, 0xff]);
/// source.seek(1)?;
/// assert_eq!(source.read_byte()?, 0x1f);
/// # Ok::<(), tsscope_core::SourceError>(())
/// ```
#[derive(Debug, Clone)]
pub struct MemoryByteSource {
    data: Vec<u8>,
    cursor: u64,
    closed: bool,
    name: String,
}

impl MemoryByteSource {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            cursor: 0,
            closed: false,
            name: "<memory>".to_string(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    fn check_open(&self) -> Result<(), SourceError> {
        if self.closed {
            return Err(SourceError::Closed);
        }
        Ok(())
    }

    fn remaining(&self) -> &[u8] {
        usize::try_from(self.cursor)
            .ok()
            .and_then(|start| self.data.get(start..))
            .unwrap_or(&[])
    }
}

impl ByteSource for MemoryByteSource {
    fn read_byte(&mut self) -> Result<u8, SourceError> {
        self.check_open()?;
        let byte = *self.remaining().first().ok_or(SourceError::EndOfInput)?;
        self.cursor += 1;
        Ok(byte)
    }

    fn read_block(&mut self, dest: &mut [u8]) -> Result<usize, SourceError> {
        self.check_open()?;
        let remaining = self.remaining();
        let n = remaining.len().min(dest.len());
        dest[..n].copy_from_slice(&remaining[..n]);
        self.cursor += n as u64;
        Ok(n)
    }

    fn length(&self) -> u64 {
        self.data.len() as u64
    }

    fn seek(&mut self, position: u64) -> Result<(), SourceError> {
        self.check_open()?;
        self.cursor = position;
        Ok(())
    }

    fn close(&mut self) -> Result<(), SourceError> {
        self.closed = true;
        Ok(())
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}
