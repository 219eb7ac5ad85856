/// Default radial distance between consecutive candidate rings.
pub const RING_STEP: f32 = 5.0;
/// Default number of evenly spaced candidate points per ring.
pub const POINTS_PER_RING: usize = 512;

/// Candidate points on one circle around the canvas center.
pub struct Ring {
    pub radius: f32,
    pub points: Vec<(f32, f32)>,
}

impl Ring {
    fn new(cx: f32, cy: f32, radius: f32, count: usize) -> Self {
        let count = count.max(1);
        let points = (0..count)
            .map(|i| {
                let angle = i as f32 * std::f32::consts::TAU / count as f32;
                (cx + radius * angle.cos(), cy + radius * angle.sin())
            })
            .collect();
        Self { radius, points }
    }
}

/// Precomputed candidate rings in increasing-radius order.
///
/// Built once per engine for a fixed canvas and shared read-only by every
/// placement search; the candidate set does not depend on the word being
/// placed, only on the canvas geometry.
pub struct RingTable {
    rings: Vec<Ring>,
}

impl RingTable {
    pub fn generate(width: f32, height: f32) -> Self {
        Self::generate_with(width, height, RING_STEP, POINTS_PER_RING)
    }

    /// Rings at radii 1, 1+step, 1+2*step, ... up to the canvas diagonal.
    pub fn generate_with(width: f32, height: f32, step: f32, points_per_ring: usize) -> Self {
        let cx = width / 2.0;
        let cy = height / 2.0;
        let max_radius = (width * width + height * height).sqrt();
        let step = step.max(1.0);

        let mut rings = Vec::new();
        let mut radius = 1.0;
        while radius < max_radius {
            rings.push(Ring::new(cx, cy, radius, points_per_ring));
            radius += step;
        }
        Self { rings }
    }

    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    pub fn len(&self) -> usize {
        self.rings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radii_increase_by_the_step() {
        let table = RingTable::generate(800.0, 600.0);
        let rings = table.rings();
        assert_eq!(rings[0].radius, 1.0);
        assert_eq!(rings[1].radius, 6.0);
        assert_eq!(rings[2].radius, 11.0);
        let diagonal = (800.0f32 * 800.0 + 600.0 * 600.0).sqrt();
        assert!(rings.last().unwrap().radius < diagonal);
        assert!(rings.last().unwrap().radius + RING_STEP >= diagonal);
    }

    #[test]
    fn points_lie_on_their_circle() {
        let table = RingTable::generate_with(800.0, 600.0, 5.0, 64);
        let ring = &table.rings()[3];
        assert_eq!(ring.points.len(), 64);
        for &(x, y) in &ring.points {
            let dist = ((x - 400.0).powi(2) + (y - 300.0).powi(2)).sqrt();
            assert!((dist - ring.radius).abs() < 1e-3);
        }
    }

    #[test]
    fn first_point_sits_at_angle_zero() {
        let table = RingTable::generate(800.0, 600.0);
        let ring = &table.rings()[0];
        let (x, y) = ring.points[0];
        assert!((x - 401.0).abs() < 1e-4);
        assert!((y - 300.0).abs() < 1e-4);
    }
}
