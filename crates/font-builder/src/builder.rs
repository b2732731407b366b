//! TrueType assembly.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use log::{debug, info};
use read_fonts::types::{FWord, Fixed, GlyphId, LongDateTime, NameId, Tag, UfWord, Version16Dot16};
use write_fonts::{
    FontBuilder,
    tables::{
        cmap::Cmap,
        glyf::{Bbox, GlyfLocaBuilder, Glyph, SimpleGlyph},
        head::{self, Head},
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        loca::LocaFormat,
        maxp::Maxp,
        name::{Name, NameRecord},
        os2::{self, Os2},
        post::Post,
    },
};

use crate::{
    error::{Error, Result},
    outline::{Outline, svg_outline},
};

pub const DEFAULT_UNITS_PER_EM: u16 = 1024;

/// Seconds between the OpenType epoch (1904-01-01) and the Unix epoch.
const MAC_EPOCH_OFFSET: i64 = 2_082_844_800;

/// Private Use Area bit in `ulUnicodeRange2` (bit 60 overall).
const PRIVATE_USE_RANGE_BIT: u32 = 1 << 28;

struct IconGlyph {
    name: String,
    codepoint: char,
    outline: Outline,
}

#[derive(Debug, Clone, Copy, Default)]
struct Bounds {
    x_min: i16,
    y_min: i16,
    x_max: i16,
    y_max: i16,
}

impl Bounds {
    fn of(bbox: &Bbox) -> Self {
        Self { x_min: bbox.x_min, y_min: bbox.y_min, x_max: bbox.x_max, y_max: bbox.y_max }
    }

    fn union(self, other: Self) -> Self {
        Self {
            x_min: self.x_min.min(other.x_min),
            y_min: self.y_min.min(other.y_min),
            x_max: self.x_max.max(other.x_max),
            y_max: self.y_max.max(other.y_max),
        }
    }
}

/// Collects SVG glyphs and writes them out as a TrueType font.
///
/// Glyph order follows insertion order, after a blank `.notdef`.
pub struct IconFontBuilder {
    family: String,
    version: String,
    description: Option<String>,
    units_per_em: u16,
    timestamp: DateTime<Utc>,
    glyphs: Vec<IconGlyph>,
    by_codepoint: BTreeMap<char, usize>,
}

impl IconFontBuilder {
    pub fn new(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            version: "1.0".to_string(),
            description: None,
            units_per_em: DEFAULT_UNITS_PER_EM,
            timestamp: Utc::now(),
            glyphs: Vec::new(),
            by_codepoint: BTreeMap::new(),
        }
    }

    /// Version string, e.g. `1.4.0`. Name ID 5 and `head.fontRevision` derive from it.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Free-form description stored as name ID 10.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn units_per_em(mut self, units_per_em: u16) -> Self {
        self.units_per_em = units_per_em;
        self
    }

    /// Creation and modification time written to `head`.
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Add a glyph drawn by `svg` and mapped to `codepoint`.
    pub fn add_glyph(&mut self, name: &str, codepoint: char, svg: &str) -> Result<()> {
        if let Some(&index) = self.by_codepoint.get(&codepoint) {
            return Err(Error::DuplicateCodepoint {
                codepoint: codepoint as u32,
                first: self.glyphs[index].name.clone(),
                second: name.to_string(),
            });
        }

        let outline = svg_outline(name, svg, self.units_per_em)?;
        debug!("glyph {name} U+{:04X}: advance {}", codepoint as u32, outline.advance);

        self.by_codepoint.insert(codepoint, self.glyphs.len());
        self.glyphs.push(IconGlyph { name: name.to_string(), codepoint, outline });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Assemble the font binary.
    pub fn build(&self) -> Result<Vec<u8>> {
        let num_glyphs = u16::try_from(self.glyphs.len() + 1)
            .map_err(|_| Error::TooManyGlyphs(self.glyphs.len()))?;

        let mut glyf_builder = GlyfLocaBuilder::new();
        let mut metrics = Vec::with_capacity(num_glyphs as usize);
        let mut extents: Vec<Option<Bounds>> = Vec::with_capacity(self.glyphs.len());
        let mut bounds: Option<Bounds> = None;
        let (mut max_points, mut max_contours) = (0u16, 0u16);

        // .notdef
        glyf_builder.add_glyph(&Glyph::Empty)?;
        metrics.push(LongMetric { advance: self.units_per_em, side_bearing: 0 });

        for glyph in &self.glyphs {
            if glyph.outline.is_empty() {
                glyf_builder.add_glyph(&Glyph::Empty)?;
                metrics.push(LongMetric { advance: glyph.outline.advance, side_bearing: 0 });
                extents.push(None);
                continue;
            }

            let simple = SimpleGlyph::from_bezpath(&glyph.outline.path).map_err(|e| {
                Error::Outline { glyph: glyph.name.clone(), message: format!("{e:?}") }
            })?;
            let bbox = Bounds::of(&simple.bbox);
            bounds = Some(bounds.map_or(bbox, |b| b.union(bbox)));
            extents.push(Some(bbox));

            let (contours, points) = glyph.outline.counts();
            max_contours = max_contours.max(contours);
            max_points = max_points.max(points);

            metrics.push(LongMetric { advance: glyph.outline.advance, side_bearing: bbox.x_min });
            glyf_builder.add_glyph(&Glyph::Simple(simple))?;
        }

        let (glyf, loca, loca_format) = glyf_builder.build();
        let bounds = bounds.unwrap_or_default();

        let mappings: Vec<(char, GlyphId)> = self
            .glyphs
            .iter()
            .enumerate()
            .map(|(index, glyph)| (glyph.codepoint, GlyphId::new(index as u32 + 1)))
            .collect();
        let cmap = Cmap::from_mappings(mappings).map_err(|e| Error::Cmap(format!("{e:?}")))?;

        let mut builder = FontBuilder::new();
        builder.add_table(&self.head(bounds, loca_format))?;
        builder.add_table(&self.hhea(&metrics, &extents, bounds))?;
        builder.add_table(&Hmtx { h_metrics: metrics.clone(), left_side_bearings: vec![] })?;
        builder.add_table(&maxp(num_glyphs, max_points, max_contours))?;
        builder.add_table(&self.os2(&metrics, bounds))?;
        builder.add_table(&cmap)?;
        builder.add_table(&self.name())?;
        builder.add_table(&post(num_glyphs))?;
        builder.add_table(&glyf)?;
        builder.add_table(&loca)?;

        let data = builder.build();
        info!("Built {} with {} glyphs ({} bytes)", self.family, self.glyphs.len(), data.len());
        Ok(data)
    }

    fn head(&self, bounds: Bounds, loca_format: LocaFormat) -> Head {
        let timestamp = LongDateTime::new(self.timestamp.timestamp() + MAC_EPOCH_OFFSET);
        Head {
            font_revision: Fixed::from_f64(font_revision(&self.version)),
            checksum_adjustment: 0,
            magic_number: 0x5F0F3CF5,
            flags: head::Flags::empty(),
            units_per_em: self.units_per_em,
            created: timestamp,
            modified: timestamp,
            x_min: bounds.x_min,
            y_min: bounds.y_min,
            x_max: bounds.x_max,
            y_max: bounds.y_max,
            mac_style: head::MacStyle::empty(),
            lowest_rec_ppem: 8,
            font_direction_hint: 2,
            index_to_loc_format: match loca_format {
                LocaFormat::Short => 0,
                LocaFormat::Long => 1,
            },
        }
    }

    fn hhea(&self, metrics: &[LongMetric], extents: &[Option<Bounds>], bounds: Bounds) -> Hhea {
        let advance_width_max = metrics.iter().map(|m| m.advance).max().unwrap_or(0);
        let mut min_lsb = 0i16;
        let mut min_rsb = 0i16;
        let mut x_max_extent = 0i16;
        // metrics[0] is .notdef
        for (extent, metric) in extents.iter().zip(&metrics[1..]) {
            let Some(extent) = extent else {
                continue;
            };
            min_lsb = min_lsb.min(extent.x_min);
            min_rsb = min_rsb.min(clamp_i16(i32::from(metric.advance) - i32::from(extent.x_max)));
            x_max_extent = x_max_extent.max(extent.x_max);
        }

        Hhea {
            ascender: FWord::new(self.ascender(bounds)),
            descender: FWord::new(self.descender(bounds)),
            line_gap: FWord::new(0),
            advance_width_max: UfWord::new(advance_width_max),
            min_left_side_bearing: FWord::new(min_lsb),
            min_right_side_bearing: FWord::new(min_rsb),
            x_max_extent: FWord::new(x_max_extent),
            caret_slope_rise: 1,
            caret_slope_run: 0,
            caret_offset: 0,
            number_of_h_metrics: metrics.len() as u16,
        }
    }

    fn os2(&self, metrics: &[LongMetric], bounds: Bounds) -> Os2 {
        let drawn: Vec<i32> =
            metrics.iter().map(|m| i32::from(m.advance)).filter(|&a| a > 0).collect();
        let x_avg_char_width = if drawn.is_empty() {
            0
        } else {
            clamp_i16(drawn.iter().sum::<i32>() / drawn.len() as i32)
        };

        let first = self.by_codepoint.keys().next().map_or(0, |c| *c as u32);
        let last = self.by_codepoint.keys().next_back().map_or(0, |c| *c as u32);
        let private_use = self
            .by_codepoint
            .keys()
            .any(|c| ('\u{E000}'..='\u{F8FF}').contains(c));

        let upem = i32::from(self.units_per_em);
        let ascender = self.ascender(bounds);
        let descender = self.descender(bounds);

        Os2 {
            x_avg_char_width,
            us_weight_class: 400,
            us_width_class: 5,
            fs_type: 0,
            y_subscript_x_size: clamp_i16(upem * 65 / 100),
            y_subscript_y_size: clamp_i16(upem * 60 / 100),
            y_subscript_x_offset: 0,
            y_subscript_y_offset: clamp_i16(upem * 75 / 1000),
            y_superscript_x_size: clamp_i16(upem * 65 / 100),
            y_superscript_y_size: clamp_i16(upem * 60 / 100),
            y_superscript_x_offset: 0,
            y_superscript_y_offset: clamp_i16(upem * 35 / 100),
            y_strikeout_size: clamp_i16(upem / 20),
            y_strikeout_position: clamp_i16(upem * 3 / 10),
            s_family_class: 0,
            panose_10: [0; 10],
            ul_unicode_range_1: 0,
            ul_unicode_range_2: if private_use { PRIVATE_USE_RANGE_BIT } else { 0 },
            ul_unicode_range_3: 0,
            ul_unicode_range_4: 0,
            ach_vend_id: Tag::new(b"NONE"),
            fs_selection: os2::SelectionFlags::REGULAR,
            us_first_char_index: first.min(0xFFFF) as u16,
            us_last_char_index: last.min(0xFFFF) as u16,
            s_typo_ascender: ascender,
            s_typo_descender: descender,
            s_typo_line_gap: 0,
            us_win_ascent: bounds.y_max.max(ascender).max(0) as u16,
            us_win_descent: (-i32::from(bounds.y_min.min(descender))).max(0) as u16,
            ul_code_page_range_1: Some(0),
            ul_code_page_range_2: Some(0),
            sx_height: Some(0),
            s_cap_height: Some(0),
            us_default_char: Some(0),
            us_break_char: Some(0x20),
            us_max_context: Some(0),
            us_lower_optical_point_size: None,
            us_upper_optical_point_size: None,
        }
    }

    fn ascender(&self, bounds: Bounds) -> i16 {
        clamp_i16(i32::from(self.units_per_em)).max(bounds.y_max)
    }

    fn descender(&self, bounds: Bounds) -> i16 {
        bounds.y_min.min(0)
    }

    fn name(&self) -> Name {
        let version = format!("Version {}", self.version);
        let postscript = postscript_name(&self.family);
        let mut entries = vec![
            (1, self.family.clone()),
            (2, "Regular".to_string()),
            (3, format!("{}:{}", self.family, self.version)),
            (4, self.family.clone()),
            (5, version),
            (6, postscript),
        ];
        if let Some(description) = &self.description {
            entries.push((10, description.clone()));
        }

        let mut records = Vec::with_capacity(entries.len() * 2);
        for (name_id, value) in entries {
            // Mac Roman records only for ASCII values
            if value.is_ascii() {
                records.push(NameRecord::new(1, 0, 0, NameId::new(name_id), value.clone().into()));
            }
            records.push(NameRecord::new(3, 1, 0x409, NameId::new(name_id), value.into()));
        }
        records.sort_by(|a, b| {
            (a.platform_id, a.encoding_id, a.language_id, a.name_id).cmp(&(
                b.platform_id,
                b.encoding_id,
                b.language_id,
                b.name_id,
            ))
        });

        Name::new(records)
    }
}

fn maxp(num_glyphs: u16, max_points: u16, max_contours: u16) -> Maxp {
    Maxp {
        num_glyphs,
        max_points: Some(max_points),
        max_contours: Some(max_contours),
        max_composite_points: Some(0),
        max_composite_contours: Some(0),
        max_zones: Some(1),
        max_twilight_points: Some(0),
        max_storage: Some(0),
        max_function_defs: Some(0),
        max_instruction_defs: Some(0),
        max_stack_elements: Some(0),
        max_size_of_instructions: Some(0),
        max_component_elements: Some(0),
        max_component_depth: Some(0),
    }
}

fn post(num_glyphs: u16) -> Post {
    Post {
        version: Version16Dot16::VERSION_3_0,
        italic_angle: Fixed::from_f64(0.0),
        underline_position: FWord::new(-100),
        underline_thickness: FWord::new(50),
        is_fixed_pitch: 0,
        min_mem_type42: 0,
        max_mem_type42: 0,
        min_mem_type1: 0,
        max_mem_type1: 0,
        num_glyphs: Some(num_glyphs),
        glyph_name_index: None,
        string_data: None,
    }
}

fn clamp_i16(value: i32) -> i16 {
    value.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

/// `major.minor` of a version string as a fixed-point revision.
fn font_revision(version: &str) -> f64 {
    let mut parts = version.trim_start_matches(['v', 'V']).split('.');
    let major: u32 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(1);
    let minor: u32 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    let digits = minor.checked_ilog10().map_or(1, |d| d + 1);
    f64::from(major) + f64::from(minor) / 10f64.powi(digits as i32)
}

/// PostScript names are limited to printable ASCII without delimiters.
fn postscript_name(family: &str) -> String {
    let name: String = family
        .chars()
        .filter(|c| c.is_ascii_graphic() && !"[](){}<>/%".contains(*c))
        .take(63)
        .collect();
    if name.is_empty() { "Icons".to_string() } else { name }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use read_fonts::{FontRef, TableProvider};

    use super::*;

    const SQUARE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><path d="M2 2h20v20H2z"/></svg>"#;
    const DOT: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><circle cx="12" cy="12" r="6"/></svg>"#;

    fn sample_font() -> Vec<u8> {
        let mut builder = IconFontBuilder::new("test-icons")
            .version("1.2.0")
            .description("© Test - 1.2.0 - DIRTY");
        builder.add_glyph("square", '\u{EA01}', SQUARE).unwrap();
        builder.add_glyph("dot", '\u{EA02}', DOT).unwrap();
        builder.build().unwrap()
    }

    fn name_string(font: &FontRef, name_id: u16) -> Option<String> {
        let name = font.name().ok()?;
        name.name_record()
            .iter()
            .find(|r| r.name_id().to_u16() == name_id && r.platform_id() == 3)
            .and_then(|r| r.string(name.string_data()).ok())
            .map(|s| s.to_string())
    }

    #[test]
    fn test_cmap_maps_codepoints_in_order() {
        let data = sample_font();
        let font = FontRef::new(&data).unwrap();
        let cmap = font.cmap().unwrap();
        assert_eq!(cmap.map_codepoint(0xEA01u32), Some(GlyphId::new(1)));
        assert_eq!(cmap.map_codepoint(0xEA02u32), Some(GlyphId::new(2)));
        assert_eq!(font.maxp().unwrap().num_glyphs(), 3);
    }

    #[test]
    fn test_metrics() {
        let data = sample_font();
        let font = FontRef::new(&data).unwrap();
        let head = font.head().unwrap();
        assert_eq!(head.units_per_em(), 1024);
        assert_eq!(head.y_max(), 939);
        let hmtx = font.hmtx().unwrap();
        assert_eq!(hmtx.advance(GlyphId::new(1)), Some(1024));
        assert_eq!(hmtx.side_bearing(GlyphId::new(1)), Some(85));
        assert_eq!(font.os2().unwrap().us_first_char_index(), 0xEA01);
    }

    #[test]
    fn test_names() {
        let data = sample_font();
        let font = FontRef::new(&data).unwrap();
        assert_eq!(name_string(&font, 1).as_deref(), Some("test-icons"));
        assert_eq!(name_string(&font, 5).as_deref(), Some("Version 1.2.0"));
        assert_eq!(name_string(&font, 10).as_deref(), Some("© Test - 1.2.0 - DIRTY"));
    }

    #[test]
    fn test_duplicate_codepoint() {
        let mut builder = IconFontBuilder::new("dupes");
        builder.add_glyph("a", '\u{EA01}', SQUARE).unwrap();
        let err = builder.add_glyph("b", '\u{EA01}', DOT).unwrap_err();
        assert!(matches!(err, Error::DuplicateCodepoint { first, second, .. } if first == "a" && second == "b"));
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn test_empty_font_builds() {
        let data = IconFontBuilder::new("empty").build().unwrap();
        let font = FontRef::new(&data).unwrap();
        assert_eq!(font.maxp().unwrap().num_glyphs(), 1);
    }

    #[test]
    fn test_font_revision() {
        assert_eq!(font_revision("1.2.0"), 1.2);
        assert_eq!(font_revision("v3.15"), 3.15);
        assert_eq!(font_revision("garbage"), 1.0);
    }

    #[test]
    fn test_postscript_name() {
        assert_eq!(postscript_name("element icons"), "elementicons");
        assert_eq!(postscript_name("(  )"), "Icons");
    }
}
