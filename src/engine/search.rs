//! Concurrent nearest-position search.
//!
//! Rings are handed to a fixed pool of worker threads in increasing-radius
//! order. Workers test the points of one ring each and report the first free
//! position on that ring, or a per-ring failure. Because workers run in
//! parallel, results arrive out of order; the aggregator only declares a
//! success final once every smaller radius has also reported, which makes
//! the returned position the true minimum-radius free placement rather than
//! the first one to complete.

use crossbeam::channel::bounded;
use crossbeam::select;

use super::geom::Rect;
use super::grid::SpatialGrid;
use super::rings::Ring;

/// Word box being placed and the canvas it must stay inside.
#[derive(Debug, Clone, Copy)]
pub(super) struct SearchParams {
    pub word_width: f32,
    pub word_height: f32,
    pub canvas_width: f32,
    pub canvas_height: f32,
}

struct RingOutcome {
    ring: usize,
    found: Option<(f32, f32)>,
}

/// Find the free position closest to the canvas center, or `None` when every
/// candidate point on every ring is blocked.
///
/// The grid is only read here; all threads are joined before returning, so
/// the caller may insert the winning rect immediately afterwards without any
/// worker still holding a reference.
pub(super) fn find_nearest(
    grid: &SpatialGrid,
    rings: &[Ring],
    params: SearchParams,
    workers: usize,
) -> Option<(f32, f32)> {
    if rings.is_empty() {
        return None;
    }
    let workers = workers.max(1);

    let (work_tx, work_rx) = bounded::<usize>(workers);
    // Sized to the ring count so result sends never block, which keeps the
    // join below free of drain bookkeeping.
    let (result_tx, result_rx) = bounded::<RingOutcome>(rings.len());
    let (stop_tx, stop_rx) = bounded::<()>(0);

    std::thread::scope(|scope| {
        for _ in 0..workers {
            let work_rx = work_rx.clone();
            let result_tx = result_tx.clone();
            let stop_rx = stop_rx.clone();
            scope.spawn(move || {
                loop {
                    select! {
                        recv(stop_rx) -> _ => return,
                        recv(work_rx) -> msg => {
                            let Ok(idx) = msg else { return };
                            let found = test_ring(grid, &rings[idx], params);
                            if result_tx.send(RingOutcome { ring: idx, found }).is_err() {
                                return;
                            }
                        }
                    }
                }
            });
        }

        // Feeder: dispatch ring indices in increasing-radius order until the
        // aggregator signals that an answer is final.
        {
            let stop_rx = stop_rx.clone();
            scope.spawn(move || {
                for idx in 0..rings.len() {
                    select! {
                        recv(stop_rx) -> _ => return,
                        send(work_tx, idx) -> sent => {
                            if sent.is_err() {
                                return;
                            }
                        }
                    }
                }
                // Dropping work_tx closes the queue once it drains.
            });
        }
        drop(work_rx);
        drop(result_tx);

        let mut done = vec![false; rings.len()];
        let mut found = vec![None; rings.len()];
        // Smallest radius that has not reported yet. A success at a larger
        // radius stays provisional until this index passes it.
        let mut next = 0usize;
        let mut winner = None;

        'aggregate: while next < rings.len() {
            let Ok(outcome) = result_rx.recv() else {
                break;
            };
            done[outcome.ring] = true;
            found[outcome.ring] = outcome.found;
            while next < rings.len() && done[next] {
                if let Some(pos) = found[next] {
                    winner = Some(pos);
                    break 'aggregate;
                }
                next += 1;
            }
        }

        // Closing the stop channel wakes the feeder and every idle worker;
        // leaving the scope joins them all before the grid can be mutated.
        drop(stop_tx);
        winner
    })
}

/// Test one ring's points in generation order; the first free one wins.
fn test_ring(grid: &SpatialGrid, ring: &Ring, params: SearchParams) -> Option<(f32, f32)> {
    for &(x, y) in &ring.points {
        let rect = Rect::centered(x, y, params.word_width, params.word_height);
        if !rect.fits(params.canvas_width, params.canvas_height) {
            continue;
        }
        if grid.collides(&rect).is_none() {
            return Some((x, y));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::rings::RingTable;

    fn params(w: f32, h: f32) -> SearchParams {
        SearchParams {
            word_width: w,
            word_height: h,
            canvas_width: 800.0,
            canvas_height: 600.0,
        }
    }

    #[test]
    fn empty_grid_wins_on_the_innermost_ring_at_angle_zero() {
        let grid = SpatialGrid::new(800.0, 600.0, 60.0);
        let table = RingTable::generate(800.0, 600.0);
        let (x, y) = find_nearest(&grid, table.rings(), params(50.0, 20.0), 4).unwrap();
        assert!((x - 401.0).abs() < 1e-4);
        assert!((y - 300.0).abs() < 1e-4);
    }

    #[test]
    fn concurrent_result_matches_a_serial_scan() {
        let mut grid = SpatialGrid::new(800.0, 600.0, 60.0);
        grid.add(Rect::new(350.0, 200.0, 600.0, 250.0));
        grid.add(Rect::new(500.0, 380.0, 520.0, 100.0));
        let table = RingTable::generate(800.0, 600.0);
        let p = params(50.0, 20.0);

        let serial = table
            .rings()
            .iter()
            .find_map(|ring| test_ring(&grid, ring, p))
            .unwrap();
        for _ in 0..16 {
            let concurrent = find_nearest(&grid, table.rings(), p, 8).unwrap();
            assert_eq!(concurrent, serial);
        }
    }

    #[test]
    fn oversized_word_fails_everywhere() {
        let grid = SpatialGrid::new(800.0, 600.0, 60.0);
        let table = RingTable::generate(800.0, 600.0);
        assert!(find_nearest(&grid, table.rings(), params(900.0, 20.0), 4).is_none());
    }

    #[test]
    fn single_worker_still_terminates() {
        let grid = SpatialGrid::new(800.0, 600.0, 60.0);
        let table = RingTable::generate(800.0, 600.0);
        assert!(find_nearest(&grid, table.rings(), params(50.0, 20.0), 1).is_some());
    }
}
