//! Tunable gameplay constants.
//!
//! Everything here is a static tunable. Nothing mutates `Tunables` at runtime;
//! systems read it through `Res<Tunables>`.
//!
//! Coordinates are Bevy-style (+Y up): boosting accelerates upward (positive),
//! gravity pulls downward (negative), and "falling" means `velocity.y < 0`.

use bevy::prelude::*;

/// Uniform draw band for relocating a recycled prop ahead of the camera:
/// `new_x ~ U[right_edge + min, right_edge + min + range]`.
#[derive(Debug, Clone, Copy)]
pub struct GapBand {
    pub min: f32,
    pub range: f32,
}

impl GapBand {
    pub const fn new(min: f32, range: f32) -> Self {
        Self { min, range }
    }
}

#[derive(Resource, Debug, Clone)]
pub struct Tunables {
    /// Forward x velocity while the player is in the Running state.
    pub run_speed: f32,
    /// Upward acceleration magnitude while boost is held.
    pub boost_accel: f32,
    /// Downward acceleration magnitude while boost is released.
    pub fall_accel: f32,
    /// Horizontal velocity applied at the moment of a fatal hazard hit.
    pub knockback_speed: f32,
    /// Multiplicative decay applied to knockback velocity once per fixed tick.
    pub knockback_damping: f32,
    /// Below this horizontal speed a killed player becomes Dead.
    pub dead_speed_threshold: f32,

    /// Logical viewport, used for scroll and recycling thresholds.
    pub viewport: Vec2,
    /// Vertical band the player body is clamped into.
    pub ground_y: f32,
    pub ceiling_y: f32,

    /// Recycle bands per prop group.
    pub hole_gap: GapBand,
    pub window_gap: GapBand,
    pub bookcase_gap: GapBand,
    pub hazard_gap: GapBand,
    /// Vertical redraw band for the hazard (top slice of the viewport).
    pub hazard_y: (f32, f32),

    /// Inclusive pickup count range per wave.
    pub pickup_count: (u32, u32),
    /// Horizontal spacing between pickups, as a factor of pickup width.
    pub pickup_spacing_factor: f32,
    /// Pickups never spawn within this margin of the ground or ceiling.
    pub pickup_margin: f32,
    /// First pickup of a wave lands this far past the right edge.
    pub pickup_lead: f32,

    /// Fixed seed for deterministic sessions; `None` seeds from entropy.
    pub rng_seed: Option<u64>,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            run_speed: 200.0,
            boost_accel: 1200.0,
            fall_accel: 600.0,
            knockback_speed: 1000.0,
            knockback_damping: 0.982,
            dead_speed_threshold: 5.0,
            viewport: Vec2::new(800.0, 640.0),
            ground_y: 30.0,
            ceiling_y: 610.0,
            hole_gap: GapBand::new(100.0, 900.0),
            window_gap: GapBand::new(256.0, 800.0),
            bookcase_gap: GapBand::new(320.0, 800.0),
            hazard_gap: GapBand::new(100.0, 1000.0),
            hazard_y: (340.0, 640.0),
            pickup_count: (1, 20),
            pickup_spacing_factor: 1.5,
            pickup_margin: 100.0,
            pickup_lead: 100.0,
            rng_seed: None,
        }
    }
}

impl Tunables {
    /// Fail fast on configuration defects. A bad constant is a programming
    /// error, not a runtime condition; nothing downstream checks ranges again.
    pub fn validate(&self) {
        assert!(self.run_speed > 0.0, "run_speed must be positive");
        assert!(self.boost_accel > 0.0, "boost_accel must be positive");
        assert!(self.fall_accel > 0.0, "fall_accel must be positive");
        assert!(self.knockback_speed > 0.0, "knockback_speed must be positive");
        assert!(
            self.knockback_damping > 0.0 && self.knockback_damping < 1.0,
            "knockback_damping must be in (0, 1) or knockback never decays"
        );
        assert!(
            self.dead_speed_threshold > 0.0,
            "dead_speed_threshold must be positive"
        );
        assert!(
            self.viewport.x > 0.0 && self.viewport.y > 0.0,
            "viewport must be non-degenerate"
        );
        assert!(
            self.ground_y < self.ceiling_y,
            "ground_y must lie below ceiling_y"
        );

        for (name, gap) in [
            ("hole_gap", self.hole_gap),
            ("window_gap", self.window_gap),
            ("bookcase_gap", self.bookcase_gap),
            ("hazard_gap", self.hazard_gap),
        ] {
            assert!(gap.min >= 0.0, "{name}.min must be non-negative");
            assert!(gap.range >= 0.0, "{name}.range must be non-negative");
        }

        assert!(self.hazard_y.0 < self.hazard_y.1, "hazard_y band inverted");

        let (lo, hi) = self.pickup_count;
        assert!(lo >= 1, "a pickup wave must spawn at least one pickup");
        assert!(lo <= hi, "pickup_count range is empty");
        assert!(
            self.pickup_spacing_factor > 0.0,
            "pickup_spacing_factor must be positive"
        );
        assert!(
            self.pickup_margin * 2.0 < self.viewport.y,
            "pickup_margin leaves no vertical safe band"
        );
    }
}
