//! The texture region table of the indexed layout.
//!
//! Glyph records point into this table by absolute file offset rather than
//! by index, so the decoded table is keyed by the offset each region was
//! read from.

use std::collections::HashMap;

use crate::buffer::CcmBuffer;
use crate::error::{CcmError, bail_if};
use crate::round::{PixelRound, uv_to_pixel};
use crate::types::{Ccm, Glyph, TexRegion};
use crate::writer::PatchWriter;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegionTable {
    regions: HashMap<u32, TexRegion>,
}

impl RegionTable {
    pub fn parse(input: &mut CcmBuffer<'_>, count: u16) -> Result<Self, CcmError> {
        let mut regions = HashMap::with_capacity(count as usize);
        for _ in 0..count {
            let offset = input.offset() as u32;
            let region = TexRegion {
                x1: input.read_i16()?,
                y1: input.read_i16()?,
                x2: input.read_i16()?,
                y2: input.read_i16()?,
            };
            log::trace!("region at 0x{offset:X}: {region:?}");
            regions.insert(offset, region);
        }
        Ok(Self { regions })
    }

    /// Look up the region a glyph record points at.
    pub fn resolve(&self, glyph_code: i32, region_offset: i32) -> Result<TexRegion, CcmError> {
        let region = u32::try_from(region_offset)
            .ok()
            .and_then(|offset| self.regions.get(&offset));
        match region {
            Some(region) => Ok(*region),
            None => Err(CcmError::DanglingRegion {
                glyph_code,
                region_offset,
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Write one region per glyph, in ascending code order.
    ///
    /// Returns the offset each glyph's region was written at, in the same
    /// order, for the glyph records to refer to. Glyphs sharing a rectangle
    /// still get their own entry.
    pub fn write_into(ccm: &Ccm, out: &mut PatchWriter) -> Result<Vec<u32>, CcmError> {
        let mut offsets = Vec::with_capacity(ccm.glyphs.len());
        for (&code, glyph) in &ccm.glyphs {
            let region = region_for_glyph(ccm, code, glyph)?;
            offsets.push(out.position() as u32);
            out.put_i16(region.x1);
            out.put_i16(region.y1);
            out.put_i16(region.x2);
            out.put_i16(region.y2);
        }
        Ok(offsets)
    }
}

/// The pixel rectangle a glyph's UVs describe on its atlas page.
pub fn region_for_glyph(ccm: &Ccm, code: i32, glyph: &Glyph) -> Result<TexRegion, CcmError> {
    Ok(TexRegion {
        x1: pixel_coordinate(code, uv_to_pixel(glyph.uv1.x, ccm.tex_width))?,
        y1: pixel_coordinate(code, uv_to_pixel(glyph.uv1.y, ccm.tex_height))?,
        x2: pixel_coordinate(code, uv_to_pixel(glyph.uv2.x, ccm.tex_width))?,
        y2: pixel_coordinate(code, uv_to_pixel(glyph.uv2.y, ccm.tex_height))?,
    })
}

fn pixel_coordinate(code: i32, value: f64) -> Result<i16, CcmError> {
    let rounded: f64 = value.pixel_round();
    bail_if!(
        !(i16::MIN as f64..=i16::MAX as f64).contains(&rounded),
        CcmError::CoordinateOutOfRange { code, value }
    );
    Ok(rounded as i16)
}
