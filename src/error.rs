//! Errors that occur while reading or writing CCM data

use std::fmt;

use crate::types::CcmVersion;

#[derive(Debug)]
pub enum CcmError {
    /// The leading version tag is not one of the known generations.
    UnknownVersion(u32),
    /// A mandatory constant or reserved field held the wrong value.
    InvalidConstant {
        field: &'static str,
        offset: usize,
        expected: i64,
        actual: i64,
    },
    /// A glyph record points at a region table offset that holds no region.
    DanglingRegion { glyph_code: i32, region_offset: i32 },
    /// A code group maps past the end of the flat glyph records.
    GlyphIndexOutOfRange {
        start_code: i32,
        glyph_index: i32,
        glyph_count: usize,
    },
    /// A code group ends before it starts.
    InvalidCodeGroup { start_code: i32, end_code: i32 },
    /// The same code point appears twice in an indexed glyph table or descriptor.
    DuplicateCode(i32),
    /// UV conversion was attempted without a usable atlas size.
    DimensionMissing { tex_width: i16, tex_height: i16 },
    /// A count does not fit in its 16 bit header field.
    CountOverflow { field: &'static str, count: usize },
    /// The region table written for a document has a different length than its glyph list.
    RegionCountMismatch { regions: usize, glyphs: usize },
    /// A pixel coordinate does not fit in a 16 bit region field.
    CoordinateOutOfRange { code: i32, value: f64 },
    /// The input ended before a field could be read.
    UnexpectedEof {
        offset: usize,
        requested: usize,
        available: usize,
    },
    /// A forward reference placeholder was never patched.
    UnresolvedSlot(&'static str),
    /// Only the indexed layout has an encoder.
    UnsupportedEncode(CcmVersion),
    /// The text descriptor could not be understood.
    Descriptor { line: usize, reason: String },
    Io(std::io::Error),
}

impl fmt::Display for CcmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CcmError::UnknownVersion(tag) => write!(f, "Unknown CCM version 0x{tag:08X}"),
            CcmError::InvalidConstant {
                field,
                offset,
                expected,
                actual,
            } => write!(
                f,
                "Invalid '{field}' at offset 0x{offset:X}: expected {expected}, found {actual}"
            ),
            CcmError::DanglingRegion {
                glyph_code,
                region_offset,
            } => write!(
                f,
                "Glyph {glyph_code} references region offset 0x{region_offset:X} which is not in the region table"
            ),
            CcmError::GlyphIndexOutOfRange {
                start_code,
                glyph_index,
                glyph_count,
            } => write!(
                f,
                "Code group starting at {start_code} maps glyph index {glyph_index} past the {glyph_count} glyph records"
            ),
            CcmError::InvalidCodeGroup {
                start_code,
                end_code,
            } => write!(f, "Code group ends ({end_code}) before it starts ({start_code})"),
            CcmError::DuplicateCode(code) => write!(f, "Code {code} appears more than once"),
            CcmError::DimensionMissing {
                tex_width,
                tex_height,
            } => write!(
                f,
                "Atlas size {tex_width}x{tex_height} cannot be used for UV conversion"
            ),
            CcmError::CountOverflow { field, count } => {
                write!(f, "{count} does not fit in the 16 bit '{field}' field")
            }
            CcmError::RegionCountMismatch { regions, glyphs } => {
                write!(f, "{regions} region offsets given for {glyphs} glyphs")
            }
            CcmError::CoordinateOutOfRange { code, value } => {
                write!(f, "Glyph {code} has pixel coordinate {value} outside of the i16 range")
            }
            CcmError::UnexpectedEof {
                offset,
                requested,
                available,
            } => write!(
                f,
                "Unexpected end of data at offset 0x{offset:X}: needed {requested} bytes, {available} left"
            ),
            CcmError::UnresolvedSlot(name) => write!(f, "Placeholder '{name}' was never patched"),
            CcmError::UnsupportedEncode(version) => {
                write!(f, "Cannot encode the {version:?} body layout")
            }
            CcmError::Descriptor { line, reason } => write!(f, "Descriptor line {line}: {reason}"),
            CcmError::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for CcmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CcmError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<bytes::TryGetError> for CcmError {
    fn from(value: bytes::TryGetError) -> Self {
        // Position is unknown here, `CcmBuffer` maps its own reads with the offset attached.
        Self::UnexpectedEof {
            offset: 0,
            requested: value.requested,
            available: value.available,
        }
    }
}

impl From<std::io::Error> for CcmError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

#[cfg(not(feature = "debug"))]
mod regular {
    macro_rules! bail {
        ($err: expr) => {
            return Err($err)
        };
    }
    pub(crate) use bail;

    macro_rules! bail_if {
        ($cond: expr, $err: expr) => {
            if $cond {
                return Err($err);
            }
        };
    }
    pub(crate) use bail_if;

    macro_rules! bail_with_msg_if {
        ($cond: expr, $err: expr, $($msg:tt),*) => {
            if $cond {
                log::error!($($msg),*);
                return Err($err);
            }
        };
    }
    pub(crate) use bail_with_msg_if;
}
#[cfg(not(feature = "debug"))]
pub(crate) use regular::*;

#[cfg(feature = "debug")]
mod debug {
    macro_rules! bail {
        ($err: expr) => {
            panic!("{}", $err)
        };
    }
    pub(crate) use bail;

    macro_rules! bail_if {
        ($cond: expr, $err: expr) => {
            if $cond {
                panic!("{}: {}", stringify!($cond), $err)
            }
        };
    }
    pub(crate) use bail_if;

    macro_rules! bail_with_msg_if {
        ($cond: expr, $err: expr, $($msg:tt),*) => {
            if $cond {
                panic!($($msg),*);
            }
        };
    }
    pub(crate) use bail_with_msg_if;
}
#[cfg(feature = "debug")]
pub(crate) use debug::*;

/// Check a mandatory constant, reporting where it was read and what it held.
pub(crate) fn expect_constant(
    field: &'static str,
    offset: usize,
    expected: i64,
    actual: i64,
) -> Result<(), CcmError> {
    bail_if!(
        expected != actual,
        CcmError::InvalidConstant {
            field,
            offset,
            expected,
            actual,
        }
    );
    Ok(())
}
