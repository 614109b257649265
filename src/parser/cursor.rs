//! Sequential reader over a decompressed trace section.
//!
//! Every read is bounds-checked and advances the offset; running off the end
//! of the buffer is reported as `DecodeError::TruncatedInput` rather than a panic.

use crate::utils::error::DecodeError;

/// Byte order established by the container magic probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

/// Forward-only reader with an explicit byte order
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    offset: usize,
    order: ByteOrder,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8], order: ByteOrder) -> Self {
        Self {
            data,
            offset: 0,
            order,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Take the next `len` bytes
    pub fn bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if len > self.remaining() {
            return Err(DecodeError::TruncatedInput {
                offset: self.offset,
                needed: len,
                available: self.remaining(),
            });
        }
        let start = self.offset;
        self.offset += len;
        Ok(&self.data[start..self.offset])
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N)?);
        Ok(out)
    }

    pub fn u16(&mut self) -> Result<u16, DecodeError> {
        let raw = self.array::<2>()?;
        Ok(match self.order {
            ByteOrder::Little => u16::from_le_bytes(raw),
            ByteOrder::Big => u16::from_be_bytes(raw),
        })
    }

    pub fn u32(&mut self) -> Result<u32, DecodeError> {
        let raw = self.array::<4>()?;
        Ok(match self.order {
            ByteOrder::Little => u32::from_le_bytes(raw),
            ByteOrder::Big => u32::from_be_bytes(raw),
        })
    }

    pub fn i32(&mut self) -> Result<i32, DecodeError> {
        let raw = self.array::<4>()?;
        Ok(match self.order {
            ByteOrder::Little => i32::from_le_bytes(raw),
            ByteOrder::Big => i32::from_be_bytes(raw),
        })
    }

    pub fn u64(&mut self) -> Result<u64, DecodeError> {
        let raw = self.array::<8>()?;
        Ok(match self.order {
            ByteOrder::Little => u64::from_le_bytes(raw),
            ByteOrder::Big => u64::from_be_bytes(raw),
        })
    }

    /// Read a u64 length or count that must fit the address space
    ///
    /// A value that cannot be represented can never be satisfied by the
    /// buffer, so it is reported as truncation at the field's offset.
    pub fn len_u64(&mut self) -> Result<usize, DecodeError> {
        let offset = self.offset;
        let value = self.u64()?;
        usize::try_from(value).map_err(|_| DecodeError::TruncatedInput {
            offset,
            needed: usize::MAX,
            available: self.remaining(),
        })
    }

    /// Read a zero-terminated string; the terminator is consumed but not returned
    pub fn cstr(&mut self) -> Result<String, DecodeError> {
        let rest = &self.data[self.offset..];
        let Some(end) = rest.iter().position(|&b| b == 0) else {
            return Err(DecodeError::TruncatedInput {
                offset: self.offset,
                needed: rest.len() + 1,
                available: rest.len(),
            });
        };
        let text = String::from_utf8_lossy(&rest[..end]).into_owned();
        self.offset += end + 1;
        Ok(text)
    }
}
