//! `GravelTrap`: a straight strip of asphalt with a gravel patch across it.
//!
//! Exercises the recovery path: a racer entering the patch must clamp its
//! speed and steer back onto asphalt on the far side.

use slipstream_kernel::{GridVector, WorldPoint};
use slipstream_search::contract::TerrainModelV1;

const ASPHALT_QUALITY: f64 = 0.95;
const GRAVEL_QUALITY: f64 = 0.3;
const OFF_STRIP_QUALITY: f64 = 0.2;

/// Straight track world with a full-width gravel patch.
pub struct GravelTrap {
    /// Track length in world units, from x = 0.
    length: f64,
    /// Strip half-height around the y = 0 centerline.
    half_height: f64,
    /// Gravel patch extent along x, inclusive of both edges.
    patch: (f64, f64),
}

impl GravelTrap {
    #[must_use]
    pub fn new(length: f64, half_height: f64, patch: (f64, f64)) -> Self {
        debug_assert!(patch.0 < patch.1 && patch.1 < length, "patch must sit inside the track");
        Self { length, half_height, patch }
    }

    /// The default test trap: a 20-unit strip with gravel from x = 8 to 12.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(20.0, 2.0, (8.0, 12.0))
    }

    /// Inclusive grid bounds of the strip.
    #[must_use]
    pub fn bounds(&self) -> (GridVector, GridVector) {
        let min = WorldPoint::new(0.0, -self.half_height).to_grid();
        let max = WorldPoint::new(self.length, self.half_height).to_grid();
        (min, max)
    }

    /// Grid start position on the centerline before the patch.
    #[must_use]
    pub fn start_position(&self) -> GridVector {
        WorldPoint::new(1.0, 0.0).to_grid()
    }

    /// The finish point past the patch.
    #[must_use]
    pub fn finish(&self) -> WorldPoint {
        WorldPoint::new(self.length - 1.0, 0.0)
    }

    /// A point in the middle of the gravel patch (test entry state).
    #[must_use]
    pub fn patch_center(&self) -> GridVector {
        WorldPoint::new((self.patch.0 + self.patch.1) / 2.0, 0.0).to_grid()
    }

    fn in_patch(&self, p: WorldPoint) -> bool {
        p.x >= self.patch.0 && p.x <= self.patch.1
    }

    fn on_strip(&self, p: WorldPoint) -> bool {
        p.x >= 0.0 && p.x <= self.length && p.y.abs() <= self.half_height
    }

    /// Normalized distance from the centerline; 1.0 at the strip edge.
    fn edge_closeness(&self, p: WorldPoint) -> f64 {
        p.y.abs() / self.half_height
    }
}

impl TerrainModelV1 for GravelTrap {
    fn quality_at(&self, p: WorldPoint) -> f64 {
        if !self.on_strip(p) {
            OFF_STRIP_QUALITY
        } else if self.in_patch(p) {
            GRAVEL_QUALITY
        } else {
            ASPHALT_QUALITY
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
        if self.in_patch(p) {
            // Asphalt resumes just past the patch, toward the finish.
            WorldPoint::new(self.patch.1 + 0.5, p.y.clamp(-self.half_height, self.half_height))
        } else {
            WorldPoint::new(p.x.clamp(0.0, self.length), 0.0)
        }
    }

    fn turn_difficulty(&self, _p: WorldPoint, _heading: GridVector) -> f64 {
        // A straight strip has no corners.
        0.0
    }
}
