//! Glyph measurement backed by system fonts.
//!
//! Widths come from summed horizontal advances, heights from the face's
//! ascent/descent extents. Faces and per-glyph advances are cached behind a
//! process-wide measurer so repeated measurements of the same family stay
//! cheap.

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

use crate::engine::Surface;

static TEXT_MEASURER: Lazy<Mutex<TextMeasurer>> = Lazy::new(|| Mutex::new(TextMeasurer::new()));

/// Measure `text` at `font_size`, returning (width, height). `None` when no
/// face matching `font_family` can be resolved.
pub fn measure_text(text: &str, font_size: f32, font_family: &str) -> Option<(f32, f32)> {
    if font_size <= 0.0 {
        return None;
    }
    if text.is_empty() {
        return Some((0.0, 0.0));
    }
    let mut guard = TEXT_MEASURER.lock().ok()?;
    guard.measure(text, font_size, font_family)
}

/// Measure-only placement surface for vector output: glyph boxes come from
/// the font, nothing is drawn. Falls back to a width-per-character estimate
/// when no matching face exists (e.g. a fontless CI environment).
pub struct MeasureSurface {
    font_family: String,
}

impl MeasureSurface {
    pub fn new(font_family: impl Into<String>) -> Self {
        Self {
            font_family: font_family.into(),
        }
    }
}

impl Surface for MeasureSurface {
    fn measure(&mut self, word: &str, size: f32) -> (f32, f32) {
        measure_text(word, size, &self.font_family).unwrap_or_else(|| fallback_metrics(word, size))
    }
}

/// Width estimate used when font resolution fails entirely.
pub fn fallback_metrics(word: &str, size: f32) -> (f32, f32) {
    (word.chars().count() as f32 * size * 0.56, size * 1.2)
}

struct TextMeasurer {
    db: Database,
    loaded_system_fonts: bool,
    faces: HashMap<String, Option<CachedFace>>,
}

impl TextMeasurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            faces: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str) -> Option<(f32, f32)> {
        let key = normalize_family_key(font_family);
        if !self.faces.contains_key(&key) {
            let face = self.load_face(font_family);
            self.faces.insert(key.clone(), face);
        }
        let face = self.faces.get_mut(&key).and_then(|f| f.as_mut())?;
        Some(face.measure(text, font_size))
    }

    fn load_face(&mut self, font_family: &str) -> Option<CachedFace> {
        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let names: Vec<String> = font_family
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\'').to_string())
            .filter(|part| !part.is_empty())
            .collect();
        let mut families: Vec<Family<'_>> = names
            .iter()
            .map(|name| match name.to_ascii_lowercase().as_str() {
                "serif" => Family::Serif,
                "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => Family::SansSerif,
                "monospace" | "ui-monospace" => Family::Monospace,
                "cursive" => Family::Cursive,
                "fantasy" => Family::Fantasy,
                _ => Family::Name(name.as_str()),
            })
            .collect();
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        let mut loaded = None;
        self.db.with_face_data(id, |data, index| {
            loaded = CachedFace::load(data.to_vec(), index);
        });
        loaded
    }
}

struct CachedFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: u16,
    ascent: i16,
    descent: i16,
    ascii_advances: [u16; 128],
    advance_cache: HashMap<char, u16>,
}

impl CachedFace {
    fn load(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let units_per_em = face.units_per_em().max(1);
        let ascent = face.ascender();
        let descent = face.descender();
        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph) = face.glyph_index(byte as char) {
                ascii_advances[byte as usize] = face.glyph_hor_advance(glyph).unwrap_or(0);
            }
        }
        drop(face);
        Some(Self {
            data,
            index,
            units_per_em,
            ascent,
            descent,
            ascii_advances,
            advance_cache: HashMap::new(),
        })
    }

    fn measure(&mut self, text: &str, font_size: f32) -> (f32, f32) {
        let scale = font_size / self.units_per_em as f32;
        let height = (self.ascent as f32 - self.descent as f32) * scale;
        let fallback = font_size * 0.56;
        let mut width = 0.0f32;

        if text.is_ascii() {
            for byte in text.as_bytes() {
                let advance = self.ascii_advances[*byte as usize];
                if advance == 0 {
                    width += fallback;
                } else {
                    width += advance as f32 * scale;
                }
            }
            return (width.max(0.0), height);
        }

        // Non-ASCII path reparses the face once to fill in missing glyphs.
        let uncached: Vec<char> = text
            .chars()
            .filter(|ch| !ch.is_ascii() && !self.advance_cache.contains_key(ch))
            .collect();
        if !uncached.is_empty()
            && let Ok(face) = Face::parse(&self.data, self.index)
        {
            for ch in uncached {
                let advance = face
                    .glyph_index(ch)
                    .and_then(|glyph| face.glyph_hor_advance(glyph))
                    .unwrap_or(0);
                self.advance_cache.insert(ch, advance);
            }
        }
        for ch in text.chars() {
            let advance = if ch.is_ascii() {
                self.ascii_advances[ch as usize]
            } else {
                self.advance_cache.get(&ch).copied().unwrap_or(0)
            };
            if advance == 0 {
                width += fallback;
            } else {
                width += advance as f32 * scale;
            }
        }
        (width.max(0.0), height)
    }
}

fn normalize_family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_string()
    }
}
