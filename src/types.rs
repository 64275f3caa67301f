use std::collections::BTreeMap;

use crate::error::{CcmError, bail};

/// Byte order of every field after the version tag.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

/// The three known generations of the CCM format.
///
/// The generation decides both the byte order of the file and which glyph
/// layout follows the header.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CcmVersion {
    /// First generation, big-endian console titles. Grouped glyph layout.
    Gen1 = 0x100,
    /// Second generation, little-endian. Grouped glyph layout.
    Gen2 = 0x10001,
    /// Third generation, little-endian. Indexed region layout.
    Gen3 = 0x20000,
}

/// Which body layout follows the header.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BodyLayout {
    /// Code groups followed by a flat list of glyph records with float UVs.
    Grouped,
    /// Texture region table followed by glyph records referencing it by offset.
    Indexed,
}

impl CcmVersion {
    /// The generation every encoded file targets.
    pub const NEWEST: CcmVersion = CcmVersion::Gen3;

    pub fn from_tag(tag: u32) -> Result<Self, CcmError> {
        match tag {
            0x100 => Ok(CcmVersion::Gen1),
            0x10001 => Ok(CcmVersion::Gen2),
            0x20000 => Ok(CcmVersion::Gen3),
            _ => bail!(CcmError::UnknownVersion(tag)),
        }
    }

    pub fn tag(self) -> u32 {
        self as u32
    }

    pub fn endian(self) -> Endian {
        match self {
            CcmVersion::Gen1 => Endian::Big,
            CcmVersion::Gen2 | CcmVersion::Gen3 => Endian::Little,
        }
    }

    pub fn layout(self) -> BodyLayout {
        match self {
            CcmVersion::Gen1 | CcmVersion::Gen2 => BodyLayout::Grouped,
            CcmVersion::Gen3 => BodyLayout::Indexed,
        }
    }
}

/// A normalized texture coordinate, 0.0 to 1.0 across the atlas page.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct UvPoint {
    pub x: f32,
    pub y: f32,
}

impl UvPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Atlas placement and spacing of a single character.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Glyph {
    /// Top left corner of the glyph box.
    pub uv1: UvPoint,
    /// Bottom right corner of the glyph box.
    pub uv2: UvPoint,
    /// Horizontal bearing in pixels.
    pub pre_space: i16,
    /// Glyph box width in pixels.
    pub width: i16,
    /// Pen advance in pixels.
    pub advance: i16,
    /// Atlas page the UVs refer to.
    pub tex_index: i16,
}

/// A decoded CCM file.
#[derive(Clone, Debug, PartialEq)]
pub struct Ccm {
    pub version: CcmVersion,
    pub full_width: i16,
    pub tex_width: i16,
    pub tex_height: i16,
    /// Opaque, only present in grouped-layout generations.
    pub unk0e: i16,
    /// Opaque.
    pub unk1c: u8,
    /// Opaque.
    pub unk1d: u8,
    pub tex_count: u8,
    /// Glyphs keyed by code point. Iteration is in ascending code order.
    pub glyphs: BTreeMap<i32, Glyph>,
}

impl Ccm {
    /// An empty newest-generation document with the given atlas size.
    pub fn new(full_width: i16, tex_width: i16, tex_height: i16, tex_count: u8) -> Self {
        Self {
            version: CcmVersion::NEWEST,
            full_width,
            tex_width,
            tex_height,
            unk0e: 0,
            unk1c: 0,
            unk1d: 0,
            tex_count,
            glyphs: BTreeMap::new(),
        }
    }

    /// Copy every header field of `reference` while taking glyphs from elsewhere.
    pub fn with_header_of(reference: &Ccm, glyphs: BTreeMap<i32, Glyph>) -> Self {
        Self {
            glyphs,
            ..reference.clone_header()
        }
    }

    fn clone_header(&self) -> Self {
        Self {
            version: self.version,
            full_width: self.full_width,
            tex_width: self.tex_width,
            tex_height: self.tex_height,
            unk0e: self.unk0e,
            unk1c: self.unk1c,
            unk1d: self.unk1d,
            tex_count: self.tex_count,
            glyphs: BTreeMap::new(),
        }
    }

    /// Fails unless both atlas dimensions are positive.
    pub fn check_dimensions(&self) -> Result<(), CcmError> {
        if self.tex_width <= 0 || self.tex_height <= 0 {
            bail!(CcmError::DimensionMissing {
                tex_width: self.tex_width,
                tex_height: self.tex_height,
            });
        }
        Ok(())
    }
}

/// A contiguous run of codes mapped to a contiguous run of glyph records.
///
/// Only exists while decoding the grouped layout.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CodeGroup {
    pub start_code: i32,
    pub end_code: i32,
    pub glyph_index: i32,
}

/// An integer pixel rectangle in the region table of the indexed layout.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TexRegion {
    pub x1: i16,
    pub y1: i16,
    pub x2: i16,
    pub y2: i16,
}

impl TexRegion {
    /// Serialized size of one region.
    pub const RAW_BYTE_LEN: usize = 8;

    pub fn new(x1: i16, y1: i16, x2: i16, y2: i16) -> Self {
        Self { x1, y1, x2, y2 }
    }
}
