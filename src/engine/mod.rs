//! Word placement engine.
//!
//! Holds the precomputed candidate rings and the occupancy grid, and drives
//! one placement attempt per word: measure the glyph box through the
//! surface, search for the free position closest to the canvas center,
//! record the result and reserve the occupied area in the grid. Words are
//! placed strictly sequentially with respect to the grid; only the search
//! inside one placement is parallel.

mod geom;
mod grid;
mod rand;
mod rings;
mod search;

pub use geom::Rect;
pub use grid::SpatialGrid;
pub use rings::{POINTS_PER_RING, RING_STEP, Ring, RingTable};

use crate::config::EngineConfig;
use crate::words::{Placement, WordStore};
use rand::XorShift64;
use search::SearchParams;
use thiserror::Error;

/// Breathing room added around each measured glyph box before searching.
const WORD_PADDING: f32 = 5.0;
/// Attempt ceiling for the random-placement fallback.
const RANDOM_ATTEMPTS: usize = 5_000_000;

/// Caller contract breaches. Placement misses are not errors; they are
/// reported through the `bool`/count results of [`Engine::place`] and
/// [`Engine::run_all`].
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("word list not sorted by descending count at index {index}: {count} follows {previous}")]
    NotSortedByCount {
        index: usize,
        count: u32,
        previous: u32,
    },
    #[error("more than {max} distinct font sizes requested")]
    TooManyFontSizes { max: usize },
    #[error("word list is empty")]
    EmptyWordList,
}

/// Drawing/measuring collaborator seam.
///
/// The engine never touches pixels or fonts itself; it asks the surface for
/// glyph boxes, tells it what to draw where, and optionally asks it to
/// tighten a tall glyph's reserved area by scanning the rendered ink.
pub trait Surface {
    /// Glyph box (width, height) of `word` rendered at `size`.
    fn measure(&mut self, word: &str, size: f32) -> (f32, f32);

    /// Draw `word` centered on `(x, y)`. No-op for measure-only surfaces.
    fn draw_word(&mut self, _word: &str, _x: f32, _y: f32, _size: f32, _color_index: u16) {}

    /// Rects covering actual ink inside `region`. An empty result makes the
    /// engine fall back to the coarse measured box.
    fn scan_ink(&self, _region: &Rect) -> Vec<Rect> {
        Vec::new()
    }
}

/// Observer notified after each successful placement with
/// (word, x, y, width, height, color index, font size).
pub type PlacementHook = Box<dyn FnMut(&str, f32, f32, f32, f32, u16, f32)>;

pub struct Engine {
    config: EngineConfig,
    grid: SpatialGrid,
    rings: RingTable,
    rng: XorShift64,
    workers: usize,
    hook: Option<PlacementHook>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let cell_size = config.height / config.cell_divisor.max(1.0);
        let grid = SpatialGrid::new(config.width, config.height, cell_size);
        let rings = RingTable::generate_with(
            config.width,
            config.height,
            config.ring_step,
            config.points_per_ring,
        );
        let rng = match config.seed {
            Some(seed) => XorShift64::new(seed),
            None => XorShift64::from_entropy(),
        };
        let workers = config.workers.unwrap_or_else(num_cpus::get).max(1);
        Self {
            config,
            grid,
            rings,
            rng,
            workers,
            hook: None,
        }
    }

    pub fn set_hook(&mut self, hook: PlacementHook) {
        self.hook = Some(hook);
    }

    /// Reserve exclusion zones (e.g. a mask) before any word is placed.
    pub fn seed_obstacles(&mut self, rects: &[Rect]) {
        for rect in rects {
            self.grid.add(*rect);
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    pub fn rings(&self) -> &RingTable {
        &self.rings
    }

    /// Free position closest to the canvas center for a box of the given
    /// (already padded) dimensions, without reserving it.
    pub fn find_free_position(&mut self, width: f32, height: f32) -> Option<(f32, f32)> {
        if self.config.random_placement {
            return self.next_random(width, height);
        }
        search::find_nearest(
            &self.grid,
            self.rings.rings(),
            SearchParams {
                word_width: width,
                word_height: height,
                canvas_width: self.config.width,
                canvas_height: self.config.height,
            },
            self.workers,
        )
    }

    fn next_random(&mut self, width: f32, height: f32) -> Option<(f32, f32)> {
        for _ in 0..RANDOM_ATTEMPTS {
            let x = self.rng.next_below(self.config.width);
            let y = self.rng.next_below(self.config.height);
            let rect = Rect::centered(x, y, width, height);
            if !rect.fits(self.config.width, self.config.height) {
                continue;
            }
            if self.grid.collides(&rect).is_none() {
                return Some((x, y));
            }
        }
        None
    }

    /// Attempt to place word `index`. On success the placement is recorded
    /// in the store, the surface draws the word, the hook (if any) fires,
    /// and the occupied rect is reserved in the grid. A miss leaves both
    /// the store entry and the grid untouched.
    pub fn place(&mut self, words: &mut WordStore, index: usize, surface: &mut dyn Surface) -> bool {
        let word = words.word(index).to_owned();
        let size = words.font_size(index);
        let color_index = words.color_index(index);

        let (mut width, mut height) = surface.measure(&word, size);
        width += WORD_PADDING;
        height += WORD_PADDING;

        let Some((x, y)) = self.find_free_position(width, height) else {
            return false;
        };

        surface.draw_word(&word, x, y, size, color_index);

        let word_width = width - WORD_PADDING;
        let word_height = height - WORD_PADDING;
        words.record_placement(
            index,
            Placement {
                x: x - word_width / 2.0,
                y: y - word_height / 2.0,
                width: word_width,
                height: word_height,
            },
        );
        if let Some(hook) = self.hook.as_mut() {
            hook(
                &word,
                x - word_width / 2.0,
                y - word_height / 2.0,
                word_width,
                word_height,
                color_index,
                size,
            );
        }

        // Extra 0.3*height below the box reserves room for descenders.
        let coarse = Rect {
            top: y + height / 2.0 + 0.3 * height,
            left: x - width / 2.0,
            right: x + width / 2.0,
            bottom: (y - height / 2.0).max(0.0),
        };
        if height > self.config.refine_threshold {
            let refined = surface.scan_ink(&coarse);
            if refined.is_empty() {
                self.grid.add(coarse);
            } else {
                for rect in refined {
                    self.grid.add(rect);
                }
            }
        } else {
            self.grid.add(coarse);
        }
        true
    }

    /// Place every word in stored (descending-count) order, giving up after
    /// `max_consecutive_misses` sequential failures. Returns how many words
    /// ended up placed.
    pub fn run_all(&mut self, words: &mut WordStore, surface: &mut dyn Surface) -> usize {
        let mut misses = 0usize;
        for index in 0..words.len() {
            if self.place(words, index, surface) {
                misses = 0;
            } else {
                misses += 1;
                if misses > self.config.max_consecutive_misses {
                    break;
                }
            }
        }
        words.placed_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SizingFunction;

    /// Fixed-metrics surface: width scales with the character count.
    struct StubSurface;

    impl Surface for StubSurface {
        fn measure(&mut self, word: &str, size: f32) -> (f32, f32) {
            (word.chars().count() as f32 * size * 0.6, size)
        }
    }

    fn small_config() -> EngineConfig {
        EngineConfig {
            width: 400.0,
            height: 300.0,
            seed: Some(1),
            ..EngineConfig::default()
        }
    }

    fn sized_store(counts: &[u32]) -> WordStore {
        let mut words = WordStore::new();
        for (i, &c) in counts.iter().enumerate() {
            words.push(format!("word{i}"), c, i as u16);
        }
        words
            .assign_sizes(SizingFunction::Sqrt, 10.0, 40.0)
            .unwrap();
        words
    }

    #[test]
    fn first_word_lands_near_the_center() {
        let mut engine = Engine::new(small_config());
        let mut words = sized_store(&[10]);
        assert!(engine.place(&mut words, 0, &mut StubSurface));
        let p = words.placement(0).unwrap();
        let cx = p.x + p.width / 2.0;
        let cy = p.y + p.height / 2.0;
        assert!((cx - 200.0).abs() <= 2.0);
        assert!((cy - 150.0).abs() <= 2.0);
    }

    #[test]
    fn miss_leaves_store_and_grid_untouched() {
        let mut engine = Engine::new(small_config());
        engine.seed_obstacles(&[Rect::new(200.0, 100.0, 300.0, 100.0)]);
        let mut words = WordStore::new();
        words.push("gigantic", 10, 0);
        words.assign_sizes(SizingFunction::Linear, 500.0, 500.0).unwrap();
        // 8 chars at size 500 cannot fit a 400-wide canvas.
        assert!(!engine.place(&mut words, 0, &mut StubSurface));
        assert!(words.placement(0).is_none());
        // The only occupied area is still the seeded obstacle.
        assert!(
            engine
                .grid()
                .collides(&Rect::new(160.0, 150.0, 170.0, 140.0))
                .is_some()
        );
        assert!(
            engine
                .grid()
                .collides(&Rect::new(40.0, 10.0, 50.0, 30.0))
                .is_none()
        );
        assert!(engine.find_free_position(10.0, 10.0).is_some());
    }

    #[test]
    fn hook_fires_with_placement_geometry() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let seen: Rc<RefCell<Vec<(String, f32, f32)>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut engine = Engine::new(small_config());
        engine.set_hook(Box::new(move |word, x, y, _w, _h, _ci, _size| {
            sink.borrow_mut().push((word.to_owned(), x, y));
        }));
        let mut words = sized_store(&[10, 5]);
        let mut surface = StubSurface;
        engine.run_all(&mut words, &mut surface);

        let seen = seen.borrow();
        assert_eq!(seen.len(), words.placed_count());
        let p = words.placement(0).unwrap();
        assert_eq!(seen[0].0, "word0");
        assert_eq!((seen[0].1, seen[0].2), (p.x, p.y));
    }

    #[test]
    fn refinement_rects_replace_the_coarse_box() {
        struct RefiningSurface {
            scans: std::cell::Cell<usize>,
        }
        impl Surface for RefiningSurface {
            fn measure(&mut self, _word: &str, size: f32) -> (f32, f32) {
                (120.0, size)
            }
            fn scan_ink(&self, region: &Rect) -> Vec<Rect> {
                self.scans.set(self.scans.get() + 1);
                // Only the left half of the region carries ink.
                vec![Rect::new(
                    region.top,
                    region.left,
                    region.left + region.width() / 2.0,
                    region.bottom,
                )]
            }
        }

        let config = EngineConfig {
            refine_threshold: 40.0,
            ..small_config()
        };
        let mut engine = Engine::new(config);
        let mut words = WordStore::new();
        words.push("tall", 10, 0);
        words.assign_sizes(SizingFunction::Linear, 60.0, 60.0).unwrap();
        let surface = RefiningSurface {
            scans: std::cell::Cell::new(0),
        };
        let mut surface = surface;
        assert!(engine.place(&mut words, 0, &mut surface));
        assert_eq!(surface.scans.get(), 1);

        let p = words.placement(0).unwrap();
        // Right half of the word area was released by the refinement.
        let right_half = Rect::new(
            p.y + p.height / 2.0 + 1.0,
            p.x + p.width * 0.8,
            p.x + p.width,
            p.y + p.height / 2.0 - 1.0,
        );
        assert!(engine.grid().collides(&right_half).is_none());
        let left_half = Rect::new(
            p.y + p.height / 2.0 + 1.0,
            p.x + 1.0,
            p.x + 2.0,
            p.y + p.height / 2.0 - 1.0,
        );
        assert!(engine.grid().collides(&left_half).is_some());
    }

    #[test]
    fn random_fallback_is_deterministic_under_a_fixed_seed() {
        let config = EngineConfig {
            random_placement: true,
            seed: Some(99),
            ..small_config()
        };
        let a = Engine::new(config.clone()).find_free_position(30.0, 12.0);
        let b = Engine::new(config).find_free_position(30.0, 12.0);
        assert!(a.is_some());
        assert_eq!(a, b);
    }
}
