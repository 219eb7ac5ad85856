use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Shape of the count -> size interpolation used by the sizing pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizingFunction {
    /// Proportional to the count ratio.
    Linear,
    /// Square root of the count ratio; flattens the tail so mid-frequency
    /// words stay legible.
    Sqrt,
}

impl SizingFunction {
    pub fn apply(self, t: f32) -> f32 {
        match self {
            SizingFunction::Linear => t,
            SizingFunction::Sqrt => t.max(0.0).sqrt(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub width: f32,
    pub height: f32,
    /// Radial distance between consecutive candidate rings.
    pub ring_step: f32,
    /// Candidate points per ring.
    pub points_per_ring: usize,
    /// Occupancy cell size is `height / cell_divisor`.
    pub cell_divisor: f32,
    pub font_min_size: f32,
    pub font_max_size: f32,
    pub sizing: SizingFunction,
    /// Glyph heights above this get their reserved rect tightened by the
    /// surface's ink scan instead of the coarse measured box.
    pub refine_threshold: f32,
    /// Uniform random sampling instead of the center-biased ring search.
    pub random_placement: bool,
    /// Seed for the fallback sampler; wall clock when absent.
    pub seed: Option<u64>,
    /// Stop the placement pass after this many consecutive misses. A
    /// heuristic, not a completeness guarantee: later, smaller words might
    /// still have fit.
    pub max_consecutive_misses: usize,
    /// Search worker threads; logical CPU count when absent.
    pub workers: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            ring_step: 5.0,
            points_per_ring: 512,
            cell_divisor: 10.0,
            font_min_size: 10.0,
            font_max_size: 96.0,
            sizing: SizingFunction::Sqrt,
            refine_threshold: 40.0,
            random_placement: false,
            seed: None,
            max_consecutive_misses: 10,
            workers: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Ignore tokens shorter than this when counting plain text.
    pub min_word_length: usize,
    /// Keep at most this many distinct words, highest counts first.
    pub max_words: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            min_word_length: 2,
            max_words: 200,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub engine: EngineConfig,
    pub input: InputConfig,
    pub theme: Theme,
    /// Stroke obstacle and placement boxes into the output.
    pub debug: bool,
}

/// On-disk config: every field optional, overlaid onto the defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    background: Option<String>,
    font_family: Option<String>,
    palette: Option<Vec<String>>,
    width: Option<f32>,
    height: Option<f32>,
    ring_step: Option<f32>,
    points_per_ring: Option<usize>,
    cell_divisor: Option<f32>,
    font_min_size: Option<f32>,
    font_max_size: Option<f32>,
    sizing: Option<SizingFunction>,
    refine_threshold: Option<f32>,
    random_placement: Option<bool>,
    seed: Option<u64>,
    max_consecutive_misses: Option<usize>,
    workers: Option<usize>,
    min_word_length: Option<usize>,
    max_words: Option<usize>,
    debug: Option<bool>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = serde_json::from_str(&contents)?;
    Ok(overlay(parsed))
}

fn overlay(parsed: ConfigFile) -> Config {
    let mut config = Config::default();

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "paper" {
            config.theme = Theme::paper();
        } else if theme_name == "modern" || theme_name == "default" {
            config.theme = Theme::modern();
        }
    }
    if let Some(v) = parsed.background {
        config.theme.background = v;
    }
    if let Some(v) = parsed.font_family {
        config.theme.font_family = v;
    }
    if let Some(v) = parsed.palette
        && !v.is_empty()
    {
        config.theme.palette = v;
    }
    if let Some(v) = parsed.width {
        config.engine.width = v;
    }
    if let Some(v) = parsed.height {
        config.engine.height = v;
    }
    if let Some(v) = parsed.ring_step {
        config.engine.ring_step = v;
    }
    if let Some(v) = parsed.points_per_ring {
        config.engine.points_per_ring = v;
    }
    if let Some(v) = parsed.cell_divisor {
        config.engine.cell_divisor = v;
    }
    if let Some(v) = parsed.font_min_size {
        config.engine.font_min_size = v;
    }
    if let Some(v) = parsed.font_max_size {
        config.engine.font_max_size = v;
    }
    if let Some(v) = parsed.sizing {
        config.engine.sizing = v;
    }
    if let Some(v) = parsed.refine_threshold {
        config.engine.refine_threshold = v;
    }
    if let Some(v) = parsed.random_placement {
        config.engine.random_placement = v;
    }
    if let Some(v) = parsed.seed {
        config.engine.seed = Some(v);
    }
    if let Some(v) = parsed.max_consecutive_misses {
        config.engine.max_consecutive_misses = v;
    }
    if let Some(v) = parsed.workers {
        config.engine.workers = Some(v);
    }
    if let Some(v) = parsed.min_word_length {
        config.input.min_word_length = v;
    }
    if let Some(v) = parsed.max_words {
        config.input.max_words = v;
    }
    if let Some(v) = parsed.debug {
        config.debug = v;
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizing_functions_interpolate() {
        assert_eq!(SizingFunction::Linear.apply(0.25), 0.25);
        assert_eq!(SizingFunction::Sqrt.apply(0.25), 0.5);
        assert_eq!(SizingFunction::Sqrt.apply(1.0), 1.0);
    }

    #[test]
    fn overlay_keeps_unmentioned_defaults() {
        let parsed: ConfigFile =
            serde_json::from_str(r#"{"width": 1024, "sizing": "linear", "seed": 7}"#).unwrap();
        let config = overlay(parsed);
        assert_eq!(config.engine.width, 1024.0);
        assert_eq!(config.engine.height, 600.0);
        assert_eq!(config.engine.sizing, SizingFunction::Linear);
        assert_eq!(config.engine.seed, Some(7));
        assert_eq!(config.engine.max_consecutive_misses, 10);
    }

    #[test]
    fn theme_name_selects_a_preset() {
        let parsed: ConfigFile =
            serde_json::from_str(r##"{"theme": "paper", "background": "#123456"}"##).unwrap();
        let config = overlay(parsed);
        assert_eq!(config.theme.font_family, Theme::paper().font_family);
        assert_eq!(config.theme.background, "#123456");
    }
}
