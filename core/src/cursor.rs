//! A single-pass byte cursor used by [`crate::types::Type::decode`].

use crate::error::DecodeError;

/// Reads from a borrowed byte slice, advancing an internal offset.
///
/// Mirrors a reader advanced by the number of bytes consumed, as required by
/// the type-descriptor contract: every `decode` call leaves the cursor
/// positioned exactly past the bytes it consumed.
pub struct Cursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub fn position(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Take exactly `n` bytes and advance the cursor past them.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .offset
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or(DecodeError::UnexpectedEnd {
                needed: n,
                available: self.remaining(),
            })?;
        let slice = &self.data[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    pub fn take_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let slice = self.take(N)?;
        slice
            .try_into()
            .map_err(|_| unreachable!("take() guarantees exactly N bytes"))
    }
}
