//! Reader and writer for CCM glyph atlas files.
//!
//! A CCM file maps character codes to rectangles on one or more texture
//! pages. Three generations exist: the first two store glyphs in code groups
//! (big-endian and little-endian respectively), the third stores pixel
//! regions that glyph records point at by file offset. All of them decode to
//! the same [`Ccm`] document; encoding always targets the newest generation.
//!
//! The [`descriptor`] module converts documents to and from BMFont-style text
//! descriptors, so that glyph placement can be edited with ordinary font
//! tooling and imported back.
//!
//! ```no_run
//! # fn main() -> Result<(), ccm_font::CcmError> {
//! let ccm = ccm_font::read_ccm_file("font.ccm")?;
//! let text = ccm_font::ccm_to_descriptor_text(&ccm, &Default::default());
//! let edited = ccm_font::descriptor_text_to_ccm(&text, &ccm)?;
//! ccm_font::write_ccm_file("font_new.ccm", &edited)?;
//! # Ok(())
//! # }
//! ```

pub mod buffer;
mod decode;
pub mod descriptor;
mod encode;
mod error;
pub mod header;
pub mod layout;
mod parse;
pub mod region;
pub mod round;
mod types;
pub mod writer;


pub use decode::{decode_ccm, read_ccm_file};
pub use descriptor::{
    DescriptorOptions, FontDescriptor, ccm_to_descriptor_text, descriptor_text_to_ccm,
};
pub use encode::{encode_ccm, write_ccm_file};
pub use error::CcmError;
pub use parse::Parse;
pub use types::{BodyLayout, Ccm, CcmVersion, CodeGroup, Endian, Glyph, TexRegion, UvPoint};
