//! Columnar word storage.
//!
//! Words, counts, color indices, font sizes and placement records live in
//! parallel vectors indexed by one word index. The placement loop walks the
//! store in descending-count order and mutates each word's size once and its
//! placement at most once.

use crate::config::SizingFunction;
use crate::engine::EngineError;

/// Distinct rounded font sizes a single run may request. Exceeding it means
/// the sizing inputs are degenerate (caller contract breach), not a runtime
/// condition to recover from.
pub const MAX_DISTINCT_FONT_SIZES: usize = 100;

/// Final position of one placed word: `(x, y)` is the lower-left corner of
/// the unpadded word box in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Default)]
pub struct WordStore {
    words: Vec<String>,
    counts: Vec<u32>,
    color_indices: Vec<u16>,
    font_sizes: Vec<f32>,
    placements: Vec<Option<Placement>>,
}

impl WordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(est: usize) -> Self {
        Self {
            words: Vec::with_capacity(est),
            counts: Vec::with_capacity(est),
            color_indices: Vec::with_capacity(est),
            font_sizes: Vec::with_capacity(est),
            placements: Vec::with_capacity(est),
        }
    }

    pub fn push(&mut self, word: impl Into<String>, count: u32, color_index: u16) {
        self.words.push(word.into());
        self.counts.push(count);
        self.color_indices.push(color_index);
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn reset(&mut self) {
        self.words.clear();
        self.counts.clear();
        self.color_indices.clear();
        self.font_sizes.clear();
        self.placements.clear();
    }

    /// Stable co-sort of all ingested columns by descending count.
    pub fn sort_by_count(&mut self) {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by(|&a, &b| self.counts[b].cmp(&self.counts[a]));
        let words = order
            .iter()
            .map(|&i| std::mem::take(&mut self.words[i]))
            .collect();
        let counts = order.iter().map(|&i| self.counts[i]).collect();
        let color_indices = order.iter().map(|&i| self.color_indices[i]).collect();
        self.words = words;
        self.counts = counts;
        self.color_indices = color_indices;
    }

    /// Fold color indices into `[0, size)`.
    pub fn apply_palette_size(&mut self, size: u16) {
        let size = size.max(1);
        for index in &mut self.color_indices {
            *index %= size;
        }
    }

    /// One-time sizing pass: interpolates `sizing(count / max_count)` over
    /// `[0, max_size]`, clamped below by `min_size`, and resets every
    /// placement record.
    ///
    /// Fails fast when the store is not sorted by non-increasing count (the
    /// interpolation assumes a monotone sequence) or when the inputs would
    /// request more than [`MAX_DISTINCT_FONT_SIZES`] rounded sizes.
    pub fn assign_sizes(
        &mut self,
        sizing: SizingFunction,
        min_size: f32,
        max_size: f32,
    ) -> Result<(), EngineError> {
        if self.is_empty() {
            return Err(EngineError::EmptyWordList);
        }
        let max_count = self.counts[0] as f32;
        self.font_sizes.clear();
        self.font_sizes.reserve(self.len());
        self.placements.clear();
        self.placements.resize(self.len(), None);

        let mut previous = self.counts[0];
        let mut distinct = std::collections::BTreeSet::new();
        for (index, &count) in self.counts.iter().enumerate() {
            if count > previous {
                return Err(EngineError::NotSortedByCount {
                    index,
                    count,
                    previous,
                });
            }
            let mut size = sizing.apply(count as f32 / max_count.max(1.0)) * max_size;
            if size < min_size {
                size = min_size;
            }
            distinct.insert(size.round() as u32);
            if distinct.len() > MAX_DISTINCT_FONT_SIZES {
                return Err(EngineError::TooManyFontSizes {
                    max: MAX_DISTINCT_FONT_SIZES,
                });
            }
            self.font_sizes.push(size);
            previous = count;
        }
        Ok(())
    }

    pub fn word(&self, index: usize) -> &str {
        &self.words[index]
    }

    pub fn count(&self, index: usize) -> u32 {
        self.counts[index]
    }

    pub fn color_index(&self, index: usize) -> u16 {
        self.color_indices[index]
    }

    pub fn font_size(&self, index: usize) -> f32 {
        self.font_sizes[index]
    }

    pub fn placement(&self, index: usize) -> Option<Placement> {
        self.placements.get(index).copied().flatten()
    }

    pub(crate) fn record_placement(&mut self, index: usize, placement: Placement) {
        self.placements[index] = Some(placement);
    }

    pub fn placed_count(&self) -> usize {
        self.placements.iter().filter(|p| p.is_some()).count()
    }

    /// Indices of placed words, in store order.
    pub fn placed(&self) -> impl Iterator<Item = usize> + '_ {
        self.placements
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.is_some().then_some(i))
    }
}
