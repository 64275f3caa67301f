use std::path::Path;

use crate::buffer::CcmBuffer;
use crate::error::CcmError;
use crate::header::{CcmHeader, LayoutCounts};
use crate::layout::{decode_grouped_glyphs, decode_indexed_glyphs};
use crate::parse::Parse;
use crate::region::RegionTable;
use crate::types::Ccm;

/// Decode a CCM file of any known generation.
pub fn decode_ccm(data: &[u8]) -> Result<Ccm, CcmError> {
    // `input` tracks the absolute offset, which the region table needs for its keys
    let mut input = CcmBuffer::new(data);
    let header = CcmHeader::parse(&mut input)?;
    log::debug!(
        "{:?} header: {}x{} atlas, {} page(s), {:?}",
        header.version,
        header.tex_width,
        header.tex_height,
        header.tex_count,
        header.counts
    );

    if header.file_size as i64 != data.len() as i64 {
        log::warn!(
            "header claims {} bytes but the file is {} bytes",
            header.file_size,
            data.len()
        );
    }

    let (unk0e, glyphs) = match header.counts {
        LayoutCounts::Grouped {
            unk0e,
            code_group_count,
            glyph_count,
        } => {
            let glyphs = decode_grouped_glyphs(&mut input, code_group_count, glyph_count)?;
            (unk0e, glyphs)
        }
        LayoutCounts::Indexed {
            tex_region_count,
            glyph_count,
        } => {
            let regions = RegionTable::parse(&mut input, tex_region_count)?;
            if input.offset() as i64 != header.glyph_offset as i64 {
                log::warn!(
                    "glyph offset field is 0x{:X} but glyph records start at 0x{:X}",
                    header.glyph_offset,
                    input.offset()
                );
            }
            let glyphs = decode_indexed_glyphs(
                &mut input,
                &regions,
                glyph_count,
                header.tex_width,
                header.tex_height,
            )?;
            (0, glyphs)
        }
    };

    for (code, glyph) in &glyphs {
        if glyph.tex_index < 0 || glyph.tex_index >= header.tex_count as i16 {
            log::warn!(
                "glyph {code} uses page {} but there are {} pages",
                glyph.tex_index,
                header.tex_count
            );
        }
    }
    log::debug!("decoded {} glyphs", glyphs.len());

    Ok(Ccm {
        version: header.version,
        full_width: header.full_width,
        tex_width: header.tex_width,
        tex_height: header.tex_height,
        unk0e,
        unk1c: header.unk1c,
        unk1d: header.unk1d,
        tex_count: header.tex_count,
        glyphs,
    })
}

/// Read and decode a CCM file from disk.
pub fn read_ccm_file(path: impl AsRef<Path>) -> Result<Ccm, CcmError> {
    let path = path.as_ref();
    log::info!("reading {}", path.display());
    let data = std::fs::read(path)?;
    decode_ccm(&data)
}
