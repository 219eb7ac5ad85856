use super::geom::Rect;

/// Bucketed occupancy index over previously placed rects.
///
/// Rects are appended to every cell their bounding box spans, so a single
/// rect can be recorded in several buckets; queries tolerate the duplicates
/// in exchange for never missing a hit on a cell boundary. The structure is
/// append-only for the lifetime of a rendering pass: placements are never
/// removed, so there is no rebalancing and no tombstoning.
pub struct SpatialGrid {
    cell_size: f32,
    cols: usize,
    rows: usize,
    cells: Vec<Vec<Rect>>,
}

impl SpatialGrid {
    pub fn new(width: f32, height: f32, cell_size: f32) -> Self {
        let cell_size = cell_size.max(1.0);
        let cols = (width / cell_size).ceil() as usize + 1;
        let rows = (height / cell_size).ceil() as usize + 1;
        Self {
            cell_size,
            cols,
            rows,
            cells: vec![Vec::new(); cols * rows],
        }
    }

    fn span(&self, rect: &Rect) -> (usize, usize, usize, usize) {
        let col = |v: f32| (((v / self.cell_size).floor().max(0.0)) as usize).min(self.cols - 1);
        let row = |v: f32| (((v / self.cell_size).floor().max(0.0)) as usize).min(self.rows - 1);
        (col(rect.left), col(rect.right), row(rect.bottom), row(rect.top))
    }

    /// Record a rect in every cell it spans.
    pub fn add(&mut self, rect: Rect) {
        debug_assert!(rect.top >= rect.bottom && rect.right >= rect.left);
        let (c0, c1, r0, r1) = self.span(&rect);
        for row in r0..=r1 {
            for col in c0..=c1 {
                self.cells[row * self.cols + col].push(rect);
            }
        }
    }

    /// First recorded rect matching `pred` against `rect`, scanning only the
    /// cells `rect` spans. Which duplicate of a multi-cell rect gets
    /// reported is unspecified.
    pub fn test_collision<F>(&self, rect: &Rect, pred: F) -> Option<Rect>
    where
        F: Fn(&Rect, &Rect) -> bool,
    {
        let (c0, c1, r0, r1) = self.span(rect);
        for row in r0..=r1 {
            for col in c0..=c1 {
                for recorded in &self.cells[row * self.cols + col] {
                    if pred(rect, recorded) {
                        return Some(*recorded);
                    }
                }
            }
        }
        None
    }

    /// Standard overlap query.
    pub fn collides(&self, rect: &Rect) -> Option<Rect> {
        self.test_collision(rect, Rect::overlaps)
    }
}
