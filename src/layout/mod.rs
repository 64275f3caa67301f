//! The two glyph layouts that can follow a CCM header.

pub(crate) mod grouped;
pub(crate) mod indexed;

pub use grouped::{decode_grouped_glyphs, expand_code_groups};
pub use indexed::{INDEXED_GLYPH_SIZE, decode_indexed_glyphs, encode_indexed_glyphs};
