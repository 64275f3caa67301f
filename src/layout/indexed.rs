use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::buffer::CcmBuffer;
use crate::error::{CcmError, bail, bail_if};
use crate::region::RegionTable;
use crate::round::pixel_to_uv;
use crate::types::{Ccm, Glyph, UvPoint};
use crate::writer::PatchWriter;

/// Serialized size of one glyph record in the indexed layout.
pub const INDEXED_GLYPH_SIZE: usize = 24;

/// Decode `glyph_count` glyph records, resolving each one's region in `regions`
/// and converting it back to UVs against the atlas size.
pub fn decode_indexed_glyphs(
    input: &mut CcmBuffer<'_>,
    regions: &RegionTable,
    glyph_count: u16,
    tex_width: i16,
    tex_height: i16,
) -> Result<BTreeMap<i32, Glyph>, CcmError> {
    bail_if!(
        glyph_count > 0 && (tex_width <= 0 || tex_height <= 0),
        CcmError::DimensionMissing {
            tex_width,
            tex_height,
        }
    );

    let mut glyphs = BTreeMap::new();
    for _ in 0..glyph_count {
        let code = input.read_i32()?;
        let region_offset = input.read_i32()?;
        let tex_index = input.read_i16()?;
        let pre_space = input.read_i16()?;
        let width = input.read_i16()?;
        let advance = input.read_i16()?;
        input.expect_i32("glyph reserved", 0)?;
        input.expect_i32("glyph reserved", 0)?;

        let region = regions.resolve(code, region_offset)?;
        let glyph = Glyph {
            uv1: UvPoint::new(
                pixel_to_uv(region.x1.into(), tex_width),
                pixel_to_uv(region.y1.into(), tex_height),
            ),
            uv2: UvPoint::new(
                pixel_to_uv(region.x2.into(), tex_width),
                pixel_to_uv(region.y2.into(), tex_height),
            ),
            pre_space,
            width,
            advance,
            tex_index,
        };
        log::trace!("glyph {code}: {region:?} {glyph:?}");

        match glyphs.entry(code) {
            Entry::Vacant(entry) => {
                entry.insert(glyph);
            }
            Entry::Occupied(_) => bail!(CcmError::DuplicateCode(code)),
        }
    }
    Ok(glyphs)
}

/// Write one glyph record per glyph in ascending code order.
///
/// `region_offsets` holds the region table offset for each glyph in the
/// same order, as returned by [`RegionTable::write_into`].
pub fn encode_indexed_glyphs(
    ccm: &Ccm,
    region_offsets: &[u32],
    out: &mut PatchWriter,
) -> Result<(), CcmError> {
    bail_if!(
        region_offsets.len() != ccm.glyphs.len(),
        CcmError::RegionCountMismatch {
            regions: region_offsets.len(),
            glyphs: ccm.glyphs.len(),
        }
    );

    for ((&code, glyph), &region_offset) in ccm.glyphs.iter().zip(region_offsets) {
        out.put_i32(code);
        out.put_u32(region_offset);
        out.put_i16(glyph.tex_index);
        out.put_i16(glyph.pre_space);
        out.put_i16(glyph.width);
        out.put_i16(glyph.advance);
        out.put_i32(0);
        out.put_i32(0);
    }
    Ok(())
}
