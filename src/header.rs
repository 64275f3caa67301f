//! The fixed 0x20 byte preamble shared by every CCM generation.

use crate::buffer::CcmBuffer;
use crate::error::{CcmError, bail};
use crate::parse::Parse;
use crate::types::{CcmVersion, Endian};
use crate::writer::{PatchWriter, Slot};

/// Size of the header, also stored in the header as a sanity check.
pub const HEADER_SIZE: i32 = 0x20;

/// Header fields whose meaning depends on the body layout.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LayoutCounts {
    Grouped {
        /// Opaque.
        unk0e: i16,
        code_group_count: u16,
        glyph_count: u16,
    },
    Indexed {
        tex_region_count: u16,
        glyph_count: u16,
    },
}

impl LayoutCounts {
    pub fn glyph_count(&self) -> u16 {
        match *self {
            LayoutCounts::Grouped { glyph_count, .. } | LayoutCounts::Indexed { glyph_count, .. } => {
                glyph_count
            }
        }
    }
}

/// CCM header
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CcmHeader {
    pub version: CcmVersion,
    /// Total size of the file. Informational only when reading.
    pub file_size: i32,
    pub full_width: i16,
    pub tex_width: i16,
    pub tex_height: i16,
    pub counts: LayoutCounts,
    /// Offset of the first glyph record.
    pub glyph_offset: i32,
    /// Opaque.
    pub unk1c: u8,
    /// Opaque.
    pub unk1d: u8,
    pub tex_count: u8,
}

impl Parse for CcmHeader {
    /// Reads the version tag as little-endian, then switches `input` to the
    /// byte order that generation uses for the rest of the file.
    fn parse(input: &mut CcmBuffer<'_>) -> Result<Self, CcmError> {
        input.set_endian(Endian::Little);
        let version = CcmVersion::from_tag(input.read_u32()?)?;
        input.set_endian(version.endian());

        let file_size = input.read_i32()?;
        let full_width = input.read_i16()?;
        let tex_width = input.read_i16()?;
        let tex_height = input.read_i16()?;

        let counts = match version {
            CcmVersion::Gen1 | CcmVersion::Gen2 => LayoutCounts::Grouped {
                unk0e: input.read_i16()?,
                code_group_count: input.read_u16()?,
                glyph_count: input.read_u16()?,
            },
            CcmVersion::Gen3 => {
                let tex_region_count = input.read_u16()?;
                let glyph_count = input.read_u16()?;
                input.expect_i16("reserved (0x12)", 0)?;
                LayoutCounts::Indexed {
                    tex_region_count,
                    glyph_count,
                }
            }
        };

        input.expect_i32("header size", HEADER_SIZE)?;
        let glyph_offset = input.read_i32()?;
        let unk1c = input.read_u8()?;
        let unk1d = input.read_u8()?;
        let tex_count = input.read_u8()?;
        input.expect_u8("reserved (0x1F)", 0)?;

        Ok(CcmHeader {
            version,
            file_size,
            full_width,
            tex_width,
            tex_height,
            counts,
            glyph_offset,
            unk1c,
            unk1d,
            tex_count,
        })
    }
}

/// Placeholders left in the output by [`CcmHeader::write_into`].
pub struct HeaderSlots {
    pub file_size: Slot,
    pub glyph_offset: Slot,
}

impl CcmHeader {
    /// Write the header in the newest generation's layout.
    ///
    /// The file size and glyph offset are written as placeholders; the
    /// returned slots must be patched once those positions are known.
    pub fn write_into(&self, out: &mut PatchWriter) -> Result<HeaderSlots, CcmError> {
        let LayoutCounts::Indexed {
            tex_region_count,
            glyph_count,
        } = self.counts
        else {
            bail!(CcmError::UnsupportedEncode(self.version));
        };

        out.put_u32(CcmVersion::NEWEST.tag());
        let file_size = out.reserve_u32("file size")?;
        out.put_i16(self.full_width);
        out.put_i16(self.tex_width);
        out.put_i16(self.tex_height);
        out.put_u16(tex_region_count);
        out.put_u16(glyph_count);
        out.put_i16(0);
        out.put_i32(HEADER_SIZE);
        let glyph_offset = out.reserve_u32("glyph offset")?;
        out.put_u8(self.unk1c);
        out.put_u8(self.unk1d);
        out.put_u8(self.tex_count);
        out.put_u8(0);

        Ok(HeaderSlots {
            file_size,
            glyph_offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::test_helpers::TestBuffer;

    fn gen3_header(reserved: i16, size_check: i32, pad: u8) -> TestBuffer {
        let mut buf = TestBuffer::new(Endian::Little);
        buf.u32(0x20000)
            .i32(0x1234)
            .i16(24)
            .i16(512)
            .i16(256)
            .u16(3)
            .u16(3)
            .i16(reserved)
            .i32(size_check)
            .i32(0x38)
            .u8(5)
            .u8(6)
            .u8(2)
            .u8(pad);
        buf
    }

    #[test]
    fn parse_gen3() {
        let data = gen3_header(0, 0x20, 0);
        let mut input = CcmBuffer::new(&data);
        let header = CcmHeader::parse(&mut input).unwrap();
        assert_eq!(input.offset(), HEADER_SIZE as usize);
        assert_eq!(header.version, CcmVersion::Gen3);
        assert_eq!(header.file_size, 0x1234);
        assert_eq!(header.tex_width, 512);
        assert_eq!(header.tex_height, 256);
        assert_eq!(
            header.counts,
            LayoutCounts::Indexed {
                tex_region_count: 3,
                glyph_count: 3
            }
        );
        assert_eq!(header.glyph_offset, 0x38);
        assert_eq!((header.unk1c, header.unk1d, header.tex_count), (5, 6, 2));
    }

    #[test]
    fn parse_gen1_is_big_endian() {
        let mut data = TestBuffer::new(Endian::Big);
        data.tag(0x100)
            .i32(0x40)
            .i16(30)
            .i16(1024)
            .i16(512)
            .i16(-7)
            .u16(1)
            .u16(2)
            .i32(0x20)
            .i32(0x2C)
            .u8(1)
            .u8(2)
            .u8(1)
            .u8(0);
        let mut input = CcmBuffer::new(&data);
        let header = CcmHeader::parse(&mut input).unwrap();
        assert_eq!(input.endian(), Endian::Big);
        assert_eq!(header.version, CcmVersion::Gen1);
        assert_eq!(header.full_width, 30);
        assert_eq!(header.tex_width, 1024);
        assert_eq!(
            header.counts,
            LayoutCounts::Grouped {
                unk0e: -7,
                code_group_count: 1,
                glyph_count: 2
            }
        );
        assert_eq!(header.glyph_offset, 0x2C);
    }

    #[test]
    fn gen2_is_little_endian() {
        let mut data = TestBuffer::new(Endian::Little);
        data.u32(0x10001)
            .i32(0x20)
            .i16(16)
            .i16(256)
            .i16(256)
            .i16(0)
            .u16(0)
            .u16(0)
            .i32(0x20)
            .i32(0x20)
            .u8(0)
            .u8(0)
            .u8(1)
            .u8(0);
        let mut input = CcmBuffer::new(&data);
        let header = CcmHeader::parse(&mut input).unwrap();
        assert_eq!(input.endian(), Endian::Little);
        assert_eq!(header.tex_width, 256);
    }

    #[test]
    fn reserved_word_must_be_zero() {
        let data = gen3_header(1, 0x20, 0);
        let err = CcmHeader::parse(&mut CcmBuffer::new(&data)).unwrap_err();
        assert!(matches!(
            err,
            CcmError::InvalidConstant {
                offset: 0x12,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn header_size_must_match() {
        let data = gen3_header(0, 0x24, 0);
        let err = CcmHeader::parse(&mut CcmBuffer::new(&data)).unwrap_err();
        assert!(matches!(
            err,
            CcmError::InvalidConstant {
                field: "header size",
                offset: 0x14,
                expected: 0x20,
                actual: 0x24,
            }
        ));
    }

    #[test]
    fn trailing_pad_must_be_zero() {
        let data = gen3_header(0, 0x20, 9);
        let err = CcmHeader::parse(&mut CcmBuffer::new(&data)).unwrap_err();
        assert!(matches!(err, CcmError::InvalidConstant { offset: 0x1F, .. }));
    }

    #[test]
    fn unknown_version_tag() {
        let mut data = TestBuffer::new(Endian::Little);
        data.u32(0x30000).i32(0);
        let err = CcmHeader::parse(&mut CcmBuffer::new(&data)).unwrap_err();
        assert!(matches!(err, CcmError::UnknownVersion(0x30000)));
    }

    #[test]
    fn truncated_header() {
        let data = gen3_header(0, 0x20, 0);
        let err = CcmHeader::parse(&mut CcmBuffer::new(&data[..0x15])).unwrap_err();
        assert!(matches!(err, CcmError::UnexpectedEof { offset: 0x14, .. }));
    }

    #[test]
    fn write_leaves_two_placeholders() {
        let header = CcmHeader {
            version: CcmVersion::Gen3,
            file_size: 0,
            full_width: 24,
            tex_width: 512,
            tex_height: 256,
            counts: LayoutCounts::Indexed {
                tex_region_count: 3,
                glyph_count: 3,
            },
            glyph_offset: 0,
            unk1c: 5,
            unk1d: 6,
            tex_count: 2,
        };
        let mut out = PatchWriter::new();
        let slots = header.write_into(&mut out).unwrap();
        assert_eq!(out.position(), HEADER_SIZE as usize);
        assert_eq!(slots.file_size.pos(), 4);
        assert_eq!(slots.glyph_offset.pos(), 0x18);

        out.patch_u32(slots.file_size, 0x1234).unwrap();
        out.patch_u32(slots.glyph_offset, 0x38).unwrap();
        let bytes = out.finish().unwrap();
        assert_eq!(bytes, &*gen3_header(0, 0x20, 0));
    }
}
