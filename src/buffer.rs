// -----------------------------------------------------------------------------
// Buffer helper
//
// Reads CCM fields in the byte order chosen by the version tag while keeping
// track of the absolute offset into the file. Offsets matter because glyph
// records in the indexed layout reference regions by absolute position, and
// because every error should say where the bad field was.
// -----------------------------------------------------------------------------

use bytes::Buf;

use crate::error::{CcmError, expect_constant};
use crate::types::Endian;

pub struct CcmBuffer<'a> {
    buffer: &'a [u8],
    offset: usize,
    endian: Endian,
}

impl Buf for CcmBuffer<'_> {
    fn remaining(&self) -> usize {
        self.buffer.len() - self.offset
    }

    fn chunk(&self) -> &[u8] {
        self.remaining_as_slice()
    }

    fn advance(&mut self, cnt: usize) {
        if cnt > self.remaining() {
            panic!("Tried to advance past the end of the buffer");
        }
        self.offset += cnt;
    }
}

impl<'a> CcmBuffer<'a> {
    /// A reader positioned at the start of `data`.
    ///
    /// The byte order starts out little-endian since the version tag is
    /// always stored that way.
    pub fn new(data: &'a [u8]) -> CcmBuffer<'a> {
        CcmBuffer {
            buffer: data,
            offset: 0,
            endian: Endian::Little,
        }
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
    }

    /// Attach the current offset to a failed read.
    fn eof(&self, err: bytes::TryGetError) -> CcmError {
        CcmError::UnexpectedEof {
            offset: self.offset,
            requested: err.requested,
            available: err.available,
        }
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, CcmError> {
        self.try_get_u8().map_err(|e| self.eof(e))
    }

    #[inline]
    pub fn read_i16(&mut self) -> Result<i16, CcmError> {
        let value = match self.endian {
            Endian::Big => self.try_get_i16(),
            Endian::Little => self.try_get_i16_le(),
        };
        value.map_err(|e| self.eof(e))
    }

    #[inline]
    pub fn read_u16(&mut self) -> Result<u16, CcmError> {
        let value = match self.endian {
            Endian::Big => self.try_get_u16(),
            Endian::Little => self.try_get_u16_le(),
        };
        value.map_err(|e| self.eof(e))
    }

    #[inline]
    pub fn read_i32(&mut self) -> Result<i32, CcmError> {
        let value = match self.endian {
            Endian::Big => self.try_get_i32(),
            Endian::Little => self.try_get_i32_le(),
        };
        value.map_err(|e| self.eof(e))
    }

    #[inline]
    pub fn read_u32(&mut self) -> Result<u32, CcmError> {
        let value = match self.endian {
            Endian::Big => self.try_get_u32(),
            Endian::Little => self.try_get_u32_le(),
        };
        value.map_err(|e| self.eof(e))
    }

    #[inline]
    pub fn read_f32(&mut self) -> Result<f32, CcmError> {
        let value = match self.endian {
            Endian::Big => self.try_get_f32(),
            Endian::Little => self.try_get_f32_le(),
        };
        value.map_err(|e| self.eof(e))
    }

    /// Read a 32 bit field that must hold `expected`.
    pub fn expect_i32(&mut self, field: &'static str, expected: i32) -> Result<(), CcmError> {
        let offset = self.offset;
        let actual = self.read_i32()?;
        expect_constant(field, offset, expected.into(), actual.into())
    }

    /// Read a 16 bit field that must hold `expected`.
    pub fn expect_i16(&mut self, field: &'static str, expected: i16) -> Result<(), CcmError> {
        let offset = self.offset;
        let actual = self.read_i16()?;
        expect_constant(field, offset, expected.into(), actual.into())
    }

    /// Read an 8 bit field that must hold `expected`.
    pub fn expect_u8(&mut self, field: &'static str, expected: u8) -> Result<(), CcmError> {
        let offset = self.offset;
        let actual = self.read_u8()?;
        expect_constant(field, offset, expected.into(), actual.into())
    }

    pub fn remaining_as_slice(&self) -> &[u8] {
        &self.buffer[self.offset..]
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_follow_byte_order() {
        let data = [0x01, 0x02, 0x01, 0x02];
        let mut buf = CcmBuffer::new(&data);
        assert_eq!(buf.read_i16().unwrap(), 0x0201);
        buf.set_endian(Endian::Big);
        assert_eq!(buf.read_i16().unwrap(), 0x0102);
        assert_eq!(buf.offset(), 4);
    }

    #[test]
    fn eof_reports_offset() {
        let data = [0u8; 6];
        let mut buf = CcmBuffer::new(&data);
        buf.read_i32().unwrap();
        match buf.read_i32() {
            Err(CcmError::UnexpectedEof {
                offset,
                requested,
                available,
            }) => {
                assert_eq!(offset, 4);
                assert_eq!(requested, 4);
                assert_eq!(available, 2);
            }
            other => panic!("expected eof, got {other:?}"),
        }
    }

    #[test]
    fn constant_mismatch_reports_field() {
        let data = 0x21i32.to_le_bytes();
        let mut buf = CcmBuffer::new(&data);
        match buf.expect_i32("header size", 0x20) {
            Err(CcmError::InvalidConstant {
                field,
                offset,
                expected,
                actual,
            }) => {
                assert_eq!(field, "header size");
                assert_eq!(offset, 0);
                assert_eq!(expected, 0x20);
                assert_eq!(actual, 0x21);
            }
            other => panic!("expected constant mismatch, got {other:?}"),
        }
    }
}
