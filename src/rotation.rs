//! Pointer-driven rotation with exponential smoothing.
//!
//! Each rendered frame the interpolator recomputes a target orientation from
//! the base facing plus bounded pointer offsets, then moves the current
//! orientation a fixed fraction of the remaining distance toward it. The
//! update runs once per frame regardless of how many pointer events arrived
//! in between, so the motion is decoupled from event cadence and settles
//! without overshoot.

use crate::orientation::Facing;
use crate::pointer::PointerSample;
use glam::{EulerRot, Quat};

/// A yaw/tilt pair in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Orientation {
    /// Rotation around the vertical axis.
    pub yaw: f32,
    /// Rotation around the lateral axis.
    pub tilt: f32,
}

/// How far pointer input can pull the avatar away from its base facing, and
/// how quickly it follows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sway {
    /// Maximum yaw offset at `pointer.x == ±1`.
    pub max_yaw: f32,
    /// Maximum tilt offset at `pointer.y == ±1`.
    pub max_tilt: f32,
    /// Fraction of the remaining distance covered per frame, in `(0, 1]`.
    pub smoothing: f32,
}

impl Default for Sway {
    fn default() -> Self {
        Self {
            max_yaw: std::f32::consts::FRAC_PI_6,
            max_tilt: std::f32::consts::PI / 12.0,
            smoothing: 0.1,
        }
    }
}

/// Current and target orientation of the avatar.
#[derive(Clone, Debug)]
pub struct RotationState {
    base: Orientation,
    roll: f32,
    target: Orientation,
    current: Orientation,
    sway: Sway,
}

impl RotationState {
    /// Starts at the base orientation with no pointer offset.
    pub fn new(facing: &Facing, sway: Sway) -> Self {
        let base = facing.base_orientation();
        Self {
            base,
            roll: facing.roll,
            target: base,
            current: base,
            sway,
        }
    }

    /// Recomputes the target from the latest pointer sample.
    ///
    /// For samples inside `[-1, 1]` the target never leaves the configured
    /// bounds around the base orientation.
    pub fn retarget(&mut self, pointer: PointerSample) {
        self.target = Orientation {
            yaw: self.base.yaw + pointer.x * self.sway.max_yaw,
            tilt: self.base.tilt + pointer.y * self.sway.max_tilt,
        };
    }

    /// Advances the current orientation one frame toward the target.
    ///
    /// Exponential decay per axis; a no-op once current equals target.
    pub fn advance(&mut self) {
        let s = self.sway.smoothing;
        self.current.yaw += (self.target.yaw - self.current.yaw) * s;
        self.current.tilt += (self.target.tilt - self.current.tilt) * s;
    }

    pub fn base(&self) -> Orientation {
        self.base
    }

    pub fn target(&self) -> Orientation {
        self.target
    }

    pub fn current(&self) -> Orientation {
        self.current
    }

    /// The rotation to apply to the model this frame. Yaw and tilt come from
    /// the smoothed state; roll stays at its initial value.
    pub fn quat(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.current.yaw, self.current.tilt, self.roll)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> RotationState {
        RotationState::new(&Facing::default(), Sway::default())
    }

    #[test]
    fn centered_pointer_targets_base_orientation() {
        let mut s = state();
        s.retarget(PointerSample { x: 0.0, y: 0.0 });
        assert_eq!(s.target(), s.base());
    }

    #[test]
    fn extreme_pointer_hits_bounds_exactly() {
        let mut s = state();
        let sway = Sway::default();

        s.retarget(PointerSample { x: 1.0, y: 1.0 });
        assert_eq!(s.target().yaw, s.base().yaw + sway.max_yaw);
        assert_eq!(s.target().tilt, s.base().tilt + sway.max_tilt);

        s.retarget(PointerSample { x: -1.0, y: -1.0 });
        assert_eq!(s.target().yaw, s.base().yaw - sway.max_yaw);
        assert_eq!(s.target().tilt, s.base().tilt - sway.max_tilt);
    }

    #[test]
    fn bounds_never_exceeded_for_unit_range_samples() {
        let mut s = state();
        let sway = Sway::default();
        for i in 0..=20 {
            let v = -1.0 + i as f32 * 0.1;
            s.retarget(PointerSample { x: v, y: v });
            assert!((s.target().yaw - s.base().yaw).abs() <= sway.max_yaw + 1e-6);
            assert!((s.target().tilt - s.base().tilt).abs() <= sway.max_tilt + 1e-6);
        }
    }

    #[test]
    fn advance_converges_geometrically_without_overshoot() {
        let mut s = state();
        s.retarget(PointerSample { x: 1.0, y: 1.0 });

        let mut previous = (s.target().yaw - s.current().yaw).abs();
        for _ in 0..200 {
            s.advance();
            let remaining = s.target().yaw - s.current().yaw;
            // Same sign as the initial gap: never overshoots.
            assert!(remaining >= -1e-6);
            // Geometric decay with ratio 0.9.
            assert!(remaining.abs() <= previous * 0.9 + 1e-7);
            previous = remaining.abs();
        }
        assert!(previous < 1e-6);
    }

    #[test]
    fn advance_at_fixed_point_is_noop() {
        let mut s = state();
        s.retarget(PointerSample { x: 0.0, y: 0.0 });
        let before = s.current();
        s.advance();
        assert_eq!(s.current(), before);
    }

    #[test]
    fn advance_is_independent_of_pointer_event_count() {
        // Many retargets to the same value between frames change nothing.
        let mut a = state();
        let mut b = state();
        let sample = PointerSample { x: 0.5, y: -0.25 };

        a.retarget(sample);
        a.advance();

        for _ in 0..10 {
            b.retarget(sample);
        }
        b.advance();

        assert_eq!(a.current(), b.current());
    }
}
