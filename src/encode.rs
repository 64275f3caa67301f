use std::io::Write;
use std::path::Path;

use crate::error::CcmError;
use crate::header::{CcmHeader, HEADER_SIZE, LayoutCounts};
use crate::layout::{INDEXED_GLYPH_SIZE, encode_indexed_glyphs};
use crate::region::RegionTable;
use crate::types::{Ccm, CcmVersion, TexRegion};
use crate::writer::PatchWriter;

/// Glyph and region counts are read back as signed 16 bit values by the games.
const MAX_GLYPHS: usize = i16::MAX as usize;

/// Encode a document in the newest generation's indexed layout.
///
/// Documents decoded from an older generation are re-targeted; their `unk0e`
/// has no slot in the newer header and is dropped.
pub fn encode_ccm(ccm: &Ccm) -> Result<Vec<u8>, CcmError> {
    if ccm.version != CcmVersion::NEWEST {
        log::warn!(
            "encoding a {:?} document as {:?}",
            ccm.version,
            CcmVersion::NEWEST
        );
    }
    ccm.check_dimensions()?;

    let glyph_count = ccm.glyphs.len();
    if glyph_count > MAX_GLYPHS {
        return Err(CcmError::CountOverflow {
            field: "glyph count",
            count: glyph_count,
        });
    }
    let glyph_count = glyph_count as u16;

    let header = CcmHeader {
        version: CcmVersion::NEWEST,
        file_size: 0,
        full_width: ccm.full_width,
        tex_width: ccm.tex_width,
        tex_height: ccm.tex_height,
        counts: LayoutCounts::Indexed {
            tex_region_count: glyph_count,
            glyph_count,
        },
        glyph_offset: 0,
        unk1c: ccm.unk1c,
        unk1d: ccm.unk1d,
        tex_count: ccm.tex_count,
    };

    let size_hint = HEADER_SIZE as usize
        + ccm.glyphs.len() * (TexRegion::RAW_BYTE_LEN + INDEXED_GLYPH_SIZE);
    let mut out = PatchWriter::with_capacity(size_hint);

    let slots = header.write_into(&mut out)?;
    let region_offsets = RegionTable::write_into(ccm, &mut out)?;
    let glyph_offset = out.patch_with_position(slots.glyph_offset)?;
    encode_indexed_glyphs(ccm, &region_offsets, &mut out)?;
    let file_size = out.patch_with_position(slots.file_size)?;

    log::debug!(
        "encoded {glyph_count} glyphs, glyph table at 0x{glyph_offset:X}, {file_size} bytes"
    );
    out.finish()
}

/// Encode `ccm` and write it to `path`.
///
/// The whole file is assembled in memory first, so an encoding error never
/// leaves a partially patched file behind. An I/O error while writing can
/// still leave a truncated file, which the caller should discard.
pub fn write_ccm_file(path: impl AsRef<Path>, ccm: &Ccm) -> Result<(), CcmError> {
    let path = path.as_ref();
    let data = encode_ccm(ccm)?;
    log::info!("writing {} ({} bytes)", path.display(), data.len());
    let mut file = std::fs::File::create(path)?;
    file.write_all(&data)?;
    file.flush()?;
    Ok(())
}
