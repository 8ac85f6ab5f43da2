//! `OvalCircuit`: a ring track with asphalt between two radii.
//!
//! The drivable ring sits between `inner_radius` and `outer_radius` around
//! the center; everything else is gravel verge. Checkpoints are the four
//! compass points on the centerline.

use slipstream_kernel::{GridVector, WorldPoint, GRID_SCALE};
use slipstream_search::contract::TerrainModelV1;

/// Terrain quality on the ring.
const ASPHALT_QUALITY: f64 = 0.95;
/// Terrain quality off the ring.
const VERGE_QUALITY: f64 = 0.25;

/// Ring track world.
pub struct OvalCircuit {
    center: WorldPoint,
    inner_radius: f64,
    outer_radius: f64,
}

impl OvalCircuit {
    /// A circuit with the given geometry. `outer_radius` must exceed
    /// `inner_radius`; callers pass literals, so this is a debug assertion.
    #[must_use]
    pub fn new(center: WorldPoint, inner_radius: f64, outer_radius: f64) -> Self {
        debug_assert!(outer_radius > inner_radius, "ring must have positive width");
        Self { center, inner_radius, outer_radius }
    }

    /// The default test circuit: center (10, 10), ring radii 4 and 8.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(WorldPoint::new(10.0, 10.0), 4.0, 8.0)
    }

    /// Inclusive grid bounds enclosing the whole world, verge included.
    #[must_use]
    pub fn bounds(&self) -> (GridVector, GridVector) {
        let pad = self.outer_radius + 2.0;
        let min = WorldPoint::new(self.center.x - pad, self.center.y - pad).to_grid();
        let max = WorldPoint::new(self.center.x + pad, self.center.y + pad).to_grid();
        (min, max)
    }

    /// Grid start position: the east compass point on the centerline.
    #[must_use]
    pub fn start_position(&self) -> GridVector {
        WorldPoint::new(self.center.x + self.centerline_radius(), self.center.y).to_grid()
    }

    /// The four compass checkpoints in lap order from the start: north,
    /// west, south, east.
    #[must_use]
    pub fn checkpoints(&self) -> Vec<WorldPoint> {
        let r = self.centerline_radius();
        vec![
            WorldPoint::new(self.center.x, self.center.y + r),
            WorldPoint::new(self.center.x - r, self.center.y),
            WorldPoint::new(self.center.x, self.center.y - r),
            WorldPoint::new(self.center.x + r, self.center.y),
        ]
    }

    fn centerline_radius(&self) -> f64 {
        (self.inner_radius + self.outer_radius) / 2.0
    }

    fn half_width(&self) -> f64 {
        (self.outer_radius - self.inner_radius) / 2.0
    }

    /// Normalized distance from the centerline; 1.0 at the ring edge,
    /// above 1.0 off the ring.
    fn edge_closeness(&self, p: WorldPoint) -> f64 {
        let r = p.distance(self.center);
        (r - self.centerline_radius()).abs() / self.half_width()
    }

    fn on_ring(&self, p: WorldPoint) -> bool {
        let r = p.distance(self.center);
        r >= self.inner_radius && r <= self.outer_radius
    }
}

impl TerrainModelV1 for OvalCircuit {
    fn quality_at(&self, p: WorldPoint) -> f64 {
        if self.on_ring(p) {
            ASPHALT_QUALITY
        } else {
            VERGE_QUALITY
        }
    }

    fn center_affinity_at(&self, p: WorldPoint) -> f64 {
        (1.0 - self.edge_closeness(p)).clamp(0.0, 1.0)
    }

    fn exit_risk(&self, p: WorldPoint, heading: GridVector) -> f64 {
        let step = heading.to_world();
        let next = WorldPoint::new(p.x + step.x, p.y + step.y);
        self.edge_closeness(next).clamp(0.0, 1.0)
    }

    fn lookahead_exit_risk(&self, p: WorldPoint, heading: GridVector, steps: u32) -> f64 {
        let step = heading.to_world();
        let mut worst: f64 = 0.0;
        for i in 1..=steps {
            let t = f64::from(i);
            let future = WorldPoint::new(p.x + step.x * t, p.y + step.y * t);
            worst = worst.max(self.edge_closeness(future).clamp(0.0, 1.0));
        }
        worst
    }

    fn nearest_good_terrain(&self, p: WorldPoint) -> WorldPoint {
        let r = p.distance(self.center);
        if r < f64::EPSILON {
            // Degenerate: at the exact center, pick the east centerline.
            return WorldPoint::new(self.center.x + self.centerline_radius(), self.center.y);
        }
        let scale = self.centerline_radius() / r;
        WorldPoint::new(
            self.center.x + (p.x - self.center.x) * scale,
            self.center.y + (p.y - self.center.y) * scale,
        )
    }

    fn turn_difficulty(&self, p: WorldPoint, heading: GridVector) -> f64 {
        if heading.is_zero() {
            return 0.5;
        }
        let r = p.distance(self.center);
        if r < f64::EPSILON {
            return 0.5;
        }
        // Tangent at p is perpendicular to the radial direction; the more
        // the heading deviates from it, the harder the turn.
        let radial = (p.x - self.center.x, p.y - self.center.y);
        let tangent = (-radial.1 / r, radial.0 / r);
        let speed = heading.len() / GRID_SCALE;
        let hx = f64::from(heading.x) / GRID_SCALE / speed;
        let hy = f64::from(heading.y) / GRID_SCALE / speed;
        let along = (hx * tangent.0 + hy * tangent.1).abs();
        (1.0 - along).clamp(0.0, 1.0)
    }
}
