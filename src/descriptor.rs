//! Conversion between CCM documents and BMFont-style text descriptors.
//!
//! A descriptor describes the same glyphs in pixel space:
//!
//! ```text
//! info face="Arial" size=32 ...
//! common lineHeight=24 base=19 scaleW=512 scaleH=512 pages=1 ...
//! page id=0 file="font_0.dds"
//! chars count=1
//! char id=65   x=0     y=0     width=12    height=20    xoffset=0     yoffset=6     xadvance=13    page=0 chnl=15
//! ```
//!
//! Only `char` records carry glyph data back into a CCM document. Everything a
//! descriptor cannot express (atlas size, opaque header fields) comes from a
//! reference document on import.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::str::FromStr;

use crate::error::{CcmError, bail};
use crate::round::{PixelRound, pixel_to_uv, uv_to_pixel, uv_to_pixel_rounded};
use crate::types::{Ccm, Glyph, UvPoint};

/// Cosmetic values written to a descriptor that have no counterpart in CCM.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DescriptorOptions {
    pub face: String,
    pub size: i32,
    /// Page files are named `{page_prefix}_{id}.dds`.
    pub page_prefix: String,
    /// Written as every glyph's `yoffset`.
    pub y_offset: i32,
}

impl Default for DescriptorOptions {
    fn default() -> Self {
        Self {
            face: "Arial".to_string(),
            size: 32,
            page_prefix: "font".to_string(),
            y_offset: 6,
        }
    }
}

impl DescriptorOptions {
    pub fn page_file(&self, id: u8) -> String {
        format!("{}_{}.dds", self.page_prefix, id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InfoRecord {
    pub face: String,
    pub size: i32,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CommonRecord {
    pub line_height: i32,
    pub base: i32,
    pub scale_w: i32,
    pub scale_h: i32,
    pub pages: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRecord {
    pub id: i32,
    pub file: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CharRecord {
    pub id: i32,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub x_offset: i16,
    pub y_offset: i32,
    pub x_advance: i16,
    pub page: i16,
}

/// A parsed or generated text descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontDescriptor {
    pub info: InfoRecord,
    pub common: CommonRecord,
    pub pages: Vec<PageRecord>,
    /// In ascending `id` order when generated from a document.
    pub chars: Vec<CharRecord>,
}

impl FontDescriptor {
    /// Describe every glyph of `ccm` in pixel space.
    pub fn from_ccm(ccm: &Ccm, options: &DescriptorOptions) -> Self {
        let line_height = ccm.full_width as i32;
        let common = CommonRecord {
            line_height,
            // no baseline in CCM, estimate it at 80% of the line
            base: (line_height as f64 * 0.8) as i32,
            scale_w: ccm.tex_width.into(),
            scale_h: ccm.tex_height.into(),
            pages: ccm.tex_count.into(),
        };

        let pages = (0..ccm.tex_count)
            .map(|id| PageRecord {
                id: id.into(),
                file: options.page_file(id),
            })
            .collect();

        let chars = ccm
            .glyphs
            .iter()
            .map(|(&code, glyph)| char_record(ccm, code, glyph, options.y_offset))
            .collect();

        FontDescriptor {
            info: InfoRecord {
                face: options.face.clone(),
                size: options.size,
            },
            common,
            pages,
            chars,
        }
    }

    /// Rebuild a document from this descriptor's glyphs.
    ///
    /// Atlas dimensions and every header field come from `reference`; the
    /// descriptor's own `common` values are only checked against it.
    pub fn into_ccm(&self, reference: &Ccm) -> Result<Ccm, CcmError> {
        reference.check_dimensions()?;
        if self.common.scale_w != reference.tex_width as i32
            || self.common.scale_h != reference.tex_height as i32
        {
            log::warn!(
                "descriptor atlas is {}x{} but the reference atlas is {}x{}; using the reference",
                self.common.scale_w,
                self.common.scale_h,
                reference.tex_width,
                reference.tex_height
            );
        }

        let mut glyphs = BTreeMap::new();
        for record in &self.chars {
            let glyph = glyph_from_record(reference, record)?;
            if glyph.tex_index < 0 || glyph.tex_index >= reference.tex_count as i16 {
                log::warn!(
                    "char {} uses page {} but the reference has {} pages",
                    record.id,
                    record.page,
                    reference.tex_count
                );
            }
            match glyphs.entry(record.id) {
                Entry::Vacant(entry) => {
                    entry.insert(glyph);
                }
                Entry::Occupied(_) => bail!(CcmError::DuplicateCode(record.id)),
            }
        }
        Ok(Ccm::with_header_of(reference, glyphs))
    }

    /// Parse descriptor text. Unknown record kinds and keys are ignored.
    pub fn parse(text: &str) -> Result<Self, CcmError> {
        let defaults = DescriptorOptions::default();
        let mut info = InfoRecord {
            face: defaults.face,
            size: defaults.size,
        };
        let mut common = CommonRecord::default();
        let mut pages = Vec::new();
        let mut chars = Vec::new();
        let mut declared_chars = None;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let Some(line) = Line::tokenize(raw, line_no)? else {
                continue;
            };
            match line.kind {
                "info" => {
                    if let Some(face) = line.get("face") {
                        info.face = face.to_string();
                    }
                    if line.get("size").is_some() {
                        info.size = line.field("size")?;
                    }
                }
                "common" => {
                    common = CommonRecord {
                        line_height: line.field("lineHeight")?,
                        base: line.field("base")?,
                        scale_w: line.field("scaleW")?,
                        scale_h: line.field("scaleH")?,
                        pages: line.field("pages")?,
                    }
                }
                "page" => pages.push(PageRecord {
                    id: line.field("id")?,
                    file: line.get("file").unwrap_or_default().to_string(),
                }),
                "chars" => declared_chars = Some(line.field::<usize>("count")?),
                "char" => chars.push(CharRecord {
                    id: line.field("id")?,
                    x: line.field("x")?,
                    y: line.field("y")?,
                    width: line.field("width")?,
                    height: line.field("height")?,
                    x_offset: line.field("xoffset")?,
                    y_offset: line.field("yoffset")?,
                    x_advance: line.field("xadvance")?,
                    page: line.field("page")?,
                }),
                other => log::debug!("line {line_no}: skipping '{other}' record"),
            }
        }

        if let Some(count) = declared_chars {
            if count != chars.len() {
                log::warn!("descriptor declares {count} chars but has {}", chars.len());
            }
        }

        Ok(FontDescriptor {
            info,
            common,
            pages,
            chars,
        })
    }

    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FontDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "info face=\"{}\" size={} bold=0 italic=0 charset=\"\" unicode=1 stretchH=100 smooth=1 aa=1 padding=0,0,0,0 spacing=1,1 outline=0",
            self.info.face, self.info.size
        )?;
        let c = &self.common;
        writeln!(
            f,
            "common lineHeight={} base={} scaleW={} scaleH={} pages={} packed=0 alphaChnl=1 redChnl=0 greenChnl=0 blueChnl=0",
            c.line_height, c.base, c.scale_w, c.scale_h, c.pages
        )?;
        for page in &self.pages {
            writeln!(f, "page id={} file=\"{}\"", page.id, page.file)?;
        }
        writeln!(f, "chars count={}", self.chars.len())?;
        for ch in &self.chars {
            writeln!(
                f,
                "char id={:<4} x={:<5} y={:<5} width={:<5} height={:<5} xoffset={:<5} yoffset={:<5} xadvance={:<5} page={} chnl=15",
                ch.id,
                ch.x,
                ch.y,
                ch.width,
                ch.height,
                ch.x_offset,
                ch.y_offset,
                ch.x_advance,
                ch.page
            )?;
        }
        Ok(())
    }
}

fn char_record(ccm: &Ccm, code: i32, glyph: &Glyph, y_offset: i32) -> CharRecord {
    let width = uv_to_pixel(glyph.uv2.x, ccm.tex_width) - uv_to_pixel(glyph.uv1.x, ccm.tex_width);
    let height =
        uv_to_pixel(glyph.uv2.y, ccm.tex_height) - uv_to_pixel(glyph.uv1.y, ccm.tex_height);
    CharRecord {
        id: code,
        x: uv_to_pixel_rounded(glyph.uv1.x, ccm.tex_width),
        y: uv_to_pixel_rounded(glyph.uv1.y, ccm.tex_height),
        width: width.pixel_round(),
        height: height.pixel_round(),
        x_offset: glyph.pre_space,
        y_offset,
        x_advance: glyph.advance,
        page: glyph.tex_index,
    }
}

fn glyph_from_record(reference: &Ccm, record: &CharRecord) -> Result<Glyph, CcmError> {
    let width = i16::try_from(record.width).map_err(|_| CcmError::CoordinateOutOfRange {
        code: record.id,
        value: record.width.into(),
    })?;
    let x2 = far_edge(record.id, record.x, record.width)?;
    let y2 = far_edge(record.id, record.y, record.height)?;
    let (w, h) = (reference.tex_width, reference.tex_height);
    Ok(Glyph {
        uv1: UvPoint::new(pixel_to_uv(record.x, w), pixel_to_uv(record.y, h)),
        uv2: UvPoint::new(pixel_to_uv(x2, w), pixel_to_uv(y2, h)),
        pre_space: record.x_offset,
        width,
        advance: record.x_advance,
        tex_index: record.page,
    })
}

/// `start + extent`, failing instead of wrapping on out-of-range text values.
fn far_edge(code: i32, start: i32, extent: i32) -> Result<i32, CcmError> {
    start
        .checked_add(extent)
        .ok_or(CcmError::CoordinateOutOfRange {
            code,
            value: start as f64 + extent as f64,
        })
}

/// One tokenized descriptor line: a record kind followed by `key=value` pairs.
struct Line<'a> {
    kind: &'a str,
    pairs: Vec<(&'a str, &'a str)>,
    line_no: usize,
}

impl<'a> Line<'a> {
    /// Split a line into its kind and pairs. Values may be double-quoted, in
    /// which case they may contain spaces. Blank lines yield `None`.
    fn tokenize(raw: &'a str, line_no: usize) -> Result<Option<Self>, CcmError> {
        let mut rest = raw.trim_start();
        let kind_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let kind = &rest[..kind_end];
        if kind.is_empty() {
            return Ok(None);
        }
        rest = &rest[kind_end..];

        let mut pairs = Vec::new();
        loop {
            rest = rest.trim_start();
            if rest.is_empty() {
                break;
            }
            let Some(eq) = rest.find('=') else {
                bail!(CcmError::Descriptor {
                    line: line_no,
                    reason: format!("expected key=value, found '{rest}'"),
                });
            };
            let key = &rest[..eq];
            if key.is_empty() || key.contains(char::is_whitespace) {
                bail!(CcmError::Descriptor {
                    line: line_no,
                    reason: format!("malformed key '{key}'"),
                });
            }
            rest = &rest[eq + 1..];

            let value;
            if let Some(quoted) = rest.strip_prefix('"') {
                let Some(close) = quoted.find('"') else {
                    bail!(CcmError::Descriptor {
                        line: line_no,
                        reason: format!("unterminated quote in '{key}'"),
                    });
                };
                value = &quoted[..close];
                rest = &quoted[close + 1..];
            } else {
                let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
                value = &rest[..end];
                rest = &rest[end..];
            }
            pairs.push((key, value));
        }

        Ok(Some(Line {
            kind,
            pairs,
            line_no,
        }))
    }

    fn get(&self, key: &str) -> Option<&'a str> {
        self.pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }

    /// A required field parsed as `T`.
    fn field<T: FromStr>(&self, key: &str) -> Result<T, CcmError> {
        let Some(raw) = self.get(key) else {
            bail!(CcmError::Descriptor {
                line: self.line_no,
                reason: format!("'{}' record is missing '{key}'", self.kind),
            });
        };
        match raw.parse() {
            Ok(value) => Ok(value),
            Err(_) => Err(CcmError::Descriptor {
                line: self.line_no,
                reason: format!("'{key}' has invalid value '{raw}'"),
            }),
        }
    }
}

/// Export a document as descriptor text.
pub fn ccm_to_descriptor_text(ccm: &Ccm, options: &DescriptorOptions) -> String {
    FontDescriptor::from_ccm(ccm, options).to_text()
}

/// Import descriptor text, taking everything the text cannot express from
/// `reference`.
pub fn descriptor_text_to_ccm(text: &str, reference: &Ccm) -> Result<Ccm, CcmError> {
    FontDescriptor::parse(text)?.into_ccm(reference)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::types::CcmVersion;

    fn reference() -> Ccm {
        let mut ccm = Ccm::new(24, 512, 256, 2);
        ccm.unk1c = 0x0A;
        ccm.unk1d = 0x0B;
        for (code, x, y, w, h, page) in [
            (32, 0, 0, 6, 20, 0),
            (65, 6, 0, 14, 20, 0),
            (0x3042, 100, 40, 22, 24, 1),
        ] {
            ccm.glyphs.insert(
                code,
                Glyph {
                    uv1: UvPoint::new(pixel_to_uv(x, 512), pixel_to_uv(y, 256)),
                    uv2: UvPoint::new(pixel_to_uv(x + w, 512), pixel_to_uv(y + h, 256)),
                    pre_space: -1,
                    width: w as i16,
                    advance: w as i16 + 1,
                    tex_index: page,
                },
            );
        }
        ccm
    }

    #[test]
    fn export_text() {
        let text = ccm_to_descriptor_text(&reference(), &DescriptorOptions::default());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2 + 2 + 1 + 3);
        assert!(lines[0].starts_with("info face=\"Arial\" size=32 "));
        assert_eq!(
            lines[1],
            "common lineHeight=24 base=19 scaleW=512 scaleH=256 pages=2 packed=0 alphaChnl=1 redChnl=0 greenChnl=0 blueChnl=0"
        );
        assert_eq!(lines[2], "page id=0 file=\"font_0.dds\"");
        assert_eq!(lines[3], "page id=1 file=\"font_1.dds\"");
        assert_eq!(lines[4], "chars count=3");
        assert_eq!(
            lines[6],
            "char id=65   x=6     y=0     width=14    height=20    xoffset=-1    yoffset=6     xadvance=15    page=0 chnl=15"
        );
        assert!(lines[7].starts_with("char id=12354 x=100   y=40    width=22 "));
    }

    #[test]
    fn negative_base_truncates_toward_zero() {
        let ccm = Ccm::new(-7, 16, 16, 0);
        let desc = FontDescriptor::from_ccm(&ccm, &DescriptorOptions::default());
        assert_eq!(desc.common.base, -5);
        assert!(desc.pages.is_empty());
    }

    #[test]
    fn export_then_import_keeps_glyphs() {
        let original = reference();
        let text = ccm_to_descriptor_text(&original, &DescriptorOptions::default());
        let imported = descriptor_text_to_ccm(&text, &original).unwrap();
        assert_eq!(imported, original);
    }

    #[test]
    fn import_takes_header_from_reference() {
        let text = "\
common lineHeight=99 base=80 scaleW=512 scaleH=256 pages=1
char id=66 x=10 y=20 width=8 height=16 xoffset=2 yoffset=6 xadvance=9 page=1 chnl=15
";
        let reference = reference();
        let ccm = descriptor_text_to_ccm(text, &reference).unwrap();
        assert_eq!(ccm.version, CcmVersion::Gen3);
        assert_eq!(ccm.full_width, 24);
        assert_eq!((ccm.unk1c, ccm.unk1d, ccm.tex_count), (0x0A, 0x0B, 2));
        assert_eq!(ccm.glyphs.len(), 1);
        assert_eq!(
            ccm.glyphs[&66],
            Glyph {
                uv1: UvPoint::new(pixel_to_uv(10, 512), pixel_to_uv(20, 256)),
                uv2: UvPoint::new(pixel_to_uv(18, 512), pixel_to_uv(36, 256)),
                pre_space: 2,
                width: 8,
                advance: 9,
                tex_index: 1,
            }
        );
    }

    #[test]
    fn import_needs_reference_dimensions() {
        let text = "char id=66 x=10 y=20 width=8 height=16 xoffset=2 yoffset=6 xadvance=9 page=0 chnl=15";
        let reference = Ccm::new(24, 0, 256, 1);
        assert!(matches!(
            descriptor_text_to_ccm(text, &reference),
            Err(CcmError::DimensionMissing { .. })
        ));
    }

    #[test]
    fn parse_quoted_values() {
        let desc = FontDescriptor::parse(
            "info face=\"Some Face\" size=18\npage id=0 file=\"a b.dds\"\n\n",
        )
        .unwrap();
        assert_eq!(desc.info.face, "Some Face");
        assert_eq!(desc.info.size, 18);
        assert_eq!(
            desc.pages,
            vec![PageRecord {
                id: 0,
                file: "a b.dds".to_string()
            }]
        );
    }

    #[test]
    fn parse_reports_missing_key() {
        let err = FontDescriptor::parse("info\nchar id=1 x=0 y=0 width=1 height=1").unwrap_err();
        match err {
            CcmError::Descriptor { line, reason } => {
                assert_eq!(line, 2);
                assert!(reason.contains("xoffset"), "{reason}");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parse_reports_bad_number() {
        let err = FontDescriptor::parse(
            "char id=A x=0 y=0 width=1 height=1 xoffset=0 yoffset=0 xadvance=1 page=0",
        )
        .unwrap_err();
        assert!(matches!(err, CcmError::Descriptor { line: 1, .. }));
    }

    #[test]
    fn import_rejects_overflowing_rectangle() {
        let text = "char id=1 x=2147483647 y=0 width=1 height=1 xoffset=0 yoffset=6 xadvance=1 page=0 chnl=15";
        let reference = Ccm::new(24, 512, 256, 1);
        match descriptor_text_to_ccm(text, &reference) {
            Err(CcmError::CoordinateOutOfRange { code, value }) => {
                assert_eq!(code, 1);
                assert_eq!(value, 2147483648.0);
            }
            other => panic!("expected out of range coordinate, got {other:?}"),
        }

        let text = "char id=2 x=0 y=-2147483648 width=1 height=-1 xoffset=0 yoffset=6 xadvance=1 page=0";
        assert!(matches!(
            descriptor_text_to_ccm(text, &reference),
            Err(CcmError::CoordinateOutOfRange { code: 2, .. })
        ));
    }

    #[test]
    fn parse_rejects_unterminated_quote() {
        let err = FontDescriptor::parse("page id=0 file=\"oops").unwrap_err();
        assert!(matches!(err, CcmError::Descriptor { line: 1, .. }));
    }

    #[test]
    fn duplicate_char_ids() {
        let text = "\
char id=66 x=0 y=0 width=8 height=16 xoffset=0 yoffset=6 xadvance=9 page=0
char id=66 x=8 y=0 width=8 height=16 xoffset=0 yoffset=6 xadvance=9 page=0
";
        assert!(matches!(
            descriptor_text_to_ccm(text, &reference()),
            Err(CcmError::DuplicateCode(66))
        ));
    }

    #[test]
    fn formatted_text_parses_back() {
        let desc = FontDescriptor::from_ccm(&reference(), &DescriptorOptions::default());
        assert_eq!(FontDescriptor::parse(&desc.to_text()).unwrap(), desc);
    }
}
