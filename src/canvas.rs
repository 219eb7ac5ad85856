//! Incremental PNG canvas.
//!
//! Renders one word at a time onto a shared pixmap, so the pixel state is
//! always current when the engine asks for an ink scan. The scan compares
//! pixels against the background color and returns small padded rects
//! around every inked probe cell, which tightens the reserved area of tall
//! glyphs well below their coarse measured box.

use crate::engine::{Rect, Surface};
use crate::render::escape_xml;
use crate::text_metrics;
use crate::theme::Theme;
use anyhow::Result;
use resvg::tiny_skia::{Color, Pixmap, PremultipliedColorU8, Transform};
use std::path::Path;

/// Probe stride of the ink scan, in pixels.
const SCAN_STEP: i32 = 5;
/// Padding added around every inked probe cell.
const SCAN_PAD: f32 = 5.0;

pub struct PngCanvas {
    pixmap: Pixmap,
    background: PremultipliedColorU8,
    theme: Theme,
    options: usvg::Options<'static>,
}

impl PngCanvas {
    pub fn new(width: u32, height: u32, theme: &Theme) -> Result<Self> {
        let mut pixmap = Pixmap::new(width.max(1), height.max(1))
            .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;
        let (r, g, b) = parse_hex_color(&theme.background);
        pixmap.fill(Color::from_rgba8(r, g, b, 255));
        let background = PremultipliedColorU8::from_rgba(r, g, b, 255)
            .ok_or_else(|| anyhow::anyhow!("Invalid background color"))?;

        let mut options = usvg::Options::default();
        options.font_family = theme
            .font_family
            .split(',')
            .next()
            .unwrap_or("sans-serif")
            .trim()
            .to_string();
        options.fontdb_mut().load_system_fonts();

        Ok(Self {
            pixmap,
            background,
            theme: theme.clone(),
            options,
        })
    }

    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.pixmap.save_png(path)?;
        Ok(())
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    fn render_fragment(&mut self, svg: &str) -> Result<()> {
        let tree = usvg::Tree::from_str(svg, &self.options)?;
        let mut pixmap_mut = self.pixmap.as_mut();
        resvg::render(&tree, Transform::default(), &mut pixmap_mut);
        Ok(())
    }

    fn pixel_is_inked(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x >= self.pixmap.width() as i32 || y >= self.pixmap.height() as i32 {
            return false;
        }
        match self.pixmap.pixel(x as u32, y as u32) {
            Some(pixel) => pixel != self.background,
            None => false,
        }
    }
}

impl Surface for PngCanvas {
    fn measure(&mut self, word: &str, size: f32) -> (f32, f32) {
        text_metrics::measure_text(word, size, &self.theme.font_family)
            .unwrap_or_else(|| text_metrics::fallback_metrics(word, size))
    }

    fn draw_word(&mut self, word: &str, x: f32, y: f32, size: f32, color_index: u16) {
        // A full-canvas fragment keeps the text coordinates aligned with the
        // pixmap; no background rect, so it composites over earlier words.
        let svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\
             <text x=\"{x:.2}\" y=\"{y:.2}\" text-anchor=\"middle\" dominant-baseline=\"central\" \
             font-family=\"{family}\" font-size=\"{size:.2}\" fill=\"{fill}\">{text}</text></svg>",
            w = self.pixmap.width(),
            h = self.pixmap.height(),
            family = escape_xml(&self.theme.font_family),
            fill = self.theme.color(color_index),
            text = escape_xml(word),
        );
        // A malformed fragment leaves the word invisible but the run alive;
        // say so, since its rect stays reserved either way.
        if let Err(err) = self.render_fragment(&svg) {
            eprintln!("failed to rasterize {word:?}: {err}");
        }
    }

    fn scan_ink(&self, region: &Rect) -> Vec<Rect> {
        let mut rects = Vec::new();
        let step = SCAN_STEP;
        let mut i = region.left.floor() as i32;
        while (i as f32) < region.right {
            let mut j = region.bottom as i32;
            while (j as f32) < region.top {
                if self.pixel_is_inked(i, j) {
                    rects.push(Rect {
                        top: (j + step) as f32 + SCAN_PAD,
                        left: i as f32 - SCAN_PAD,
                        right: (i + step) as f32 + SCAN_PAD,
                        bottom: j as f32 - SCAN_PAD,
                    });
                }
                j += step;
            }
            i += step;
        }
        rects
    }
}

fn parse_hex_color(input: &str) -> (u8, u8, u8) {
    let hex = input.trim().trim_start_matches('#');
    let parse = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let component = |i: usize| {
                parse(&hex[i..i + 1]).map(|v| v * 16 + v)
            };
            match (component(0), component(1), component(2)) {
                (Some(r), Some(g), Some(b)) => (r, g, b),
                _ => (255, 255, 255),
            }
        }
        6 => match (parse(&hex[0..2]), parse(&hex[2..4]), parse(&hex[4..6])) {
            (Some(r), Some(g), Some(b)) => (r, g, b),
            _ => (255, 255, 255),
        },
        _ => (255, 255, 255),
    }
}
