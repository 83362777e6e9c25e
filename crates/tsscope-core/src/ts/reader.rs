use super::error::DecodeError;

/// Bounds-checked byte access over a packet (or a prefix of it).
pub struct PacketReader<'a> {
    data: &'a [u8],
}

impl<'a> PacketReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn read_u8(&self, offset: usize, field: &'static str) -> Result<u8, DecodeError> {
        self.data
            .get(offset)
            .copied()
            .ok_or(DecodeError::FieldOutOfBounds {
                field,
                needed: offset + 1,
                available: self.data.len(),
            })
    }

    pub fn read_slice(
        &self,
        range: std::ops::Range<usize>,
        field: &'static str,
    ) -> Result<&'a [u8], DecodeError> {
        if range.start > range.end {
            return Err(DecodeError::FieldOutOfBounds {
                field,
                needed: range.start,
                available: self.data.len(),
            });
        }
        self.data
            .get(range.clone())
            .ok_or(DecodeError::FieldOutOfBounds {
                field,
                needed: range.end,
                available: self.data.len(),
            })
    }

    pub fn read_array<const N: usize>(
        &self,
        offset: usize,
        field: &'static str,
    ) -> Result<[u8; N], DecodeError> {
        let bytes = self.read_slice(offset..offset + N, field)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Read a one-byte length prefix at `offset` and the bytes it announces.
    pub fn read_length_prefixed(
        &self,
        offset: usize,
        field: &'static str,
    ) -> Result<&'a [u8], DecodeError> {
        let len = self.read_u8(offset, field)? as usize;
        self.read_slice(offset + 1..offset + 1 + len, field)
    }
}
