use std::collections::BTreeMap;

use crate::buffer::CcmBuffer;
use crate::error::{CcmError, bail_if};
use crate::types::{CodeGroup, Glyph, UvPoint};

fn parse_code_group(input: &mut CcmBuffer<'_>) -> Result<CodeGroup, CcmError> {
    Ok(CodeGroup {
        start_code: input.read_i32()?,
        end_code: input.read_i32()?,
        glyph_index: input.read_i32()?,
    })
}

fn parse_glyph_record(input: &mut CcmBuffer<'_>) -> Result<Glyph, CcmError> {
    Ok(Glyph {
        uv1: UvPoint::new(input.read_f32()?, input.read_f32()?),
        uv2: UvPoint::new(input.read_f32()?, input.read_f32()?),
        pre_space: input.read_i16()?,
        width: input.read_i16()?,
        advance: input.read_i16()?,
        tex_index: input.read_i16()?,
    })
}

/// Decode the grouped layout: all code groups, then the flat glyph records
/// they index into.
pub fn decode_grouped_glyphs(
    input: &mut CcmBuffer<'_>,
    code_group_count: u16,
    glyph_count: u16,
) -> Result<BTreeMap<i32, Glyph>, CcmError> {
    let mut groups = Vec::with_capacity(code_group_count as usize);
    for _ in 0..code_group_count {
        groups.push(parse_code_group(input)?);
    }

    log::debug!("glyph records start at 0x{:X}", input.offset());
    let mut records = Vec::with_capacity(glyph_count as usize);
    for _ in 0..glyph_count {
        records.push(parse_glyph_record(input)?);
    }

    expand_code_groups(&groups, &records)
}

/// Assign each code in every group (inclusive of both ends) the glyph record
/// at the matching position after the group's `glyph_index`.
///
/// A code covered by more than one group keeps the assignment of the last group.
pub fn expand_code_groups(
    groups: &[CodeGroup],
    records: &[Glyph],
) -> Result<BTreeMap<i32, Glyph>, CcmError> {
    let mut glyphs = BTreeMap::new();
    for group in groups {
        bail_if!(
            group.end_code < group.start_code,
            CcmError::InvalidCodeGroup {
                start_code: group.start_code,
                end_code: group.end_code,
            }
        );

        let span = group.end_code as i64 - group.start_code as i64;
        let last_index = group.glyph_index as i64 + span;
        bail_if!(
            group.glyph_index < 0 || last_index >= records.len() as i64,
            CcmError::GlyphIndexOutOfRange {
                start_code: group.start_code,
                glyph_index: group.glyph_index,
                glyph_count: records.len(),
            }
        );

        let first = group.glyph_index as usize;
        for (code, record) in (group.start_code..=group.end_code).zip(&records[first..]) {
            if glyphs.insert(code, *record).is_some() {
                log::warn!("code {code} is covered by more than one code group");
            }
        }
    }
    Ok(glyphs)
}
