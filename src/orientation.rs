//! Base facing orientation derived from the fixed camera position.
//!
//! The avatar should appear to look at the camera before any pointer input
//! is applied. That base yaw is `atan2(cx, cz)` for a camera at `(cx, _, cz)`,
//! plus an empirical correction for the asset's authored front direction.
//! Assets are not guaranteed to face a canonical axis, so the correction is
//! a tunable constant rather than something derived from asset metadata.

use crate::rotation::Orientation;

/// Facing configuration: where the camera sits in the horizontal plane and
/// the fixed angles layered on top of the computed yaw.
///
/// Defaults reproduce the reference tuning for the bundled avatar; a
/// different asset may need a different `yaw_correction`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Facing {
    /// Camera X in world units.
    pub camera_x: f32,
    /// Camera Z in world units.
    pub camera_z: f32,
    /// Correction for the asset's authored front direction, added to the
    /// camera angle.
    pub yaw_correction: f32,
    /// Fixed forward tilt.
    pub tilt: f32,
    /// Fixed roll; set once at load and never animated.
    pub roll: f32,
}

impl Default for Facing {
    fn default() -> Self {
        Self {
            camera_x: 3.0,
            camera_z: 4.0,
            yaw_correction: std::f32::consts::FRAC_PI_4,
            tilt: std::f32::consts::PI / 33.0,
            roll: std::f32::consts::PI / 50.0,
        }
    }
}

impl Facing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Yaw that turns the model toward the camera, correction included.
    pub fn base_yaw(&self) -> f32 {
        self.camera_x.atan2(self.camera_z) + self.yaw_correction
    }

    /// The yaw/tilt pair the interpolator treats as its resting point.
    pub fn base_orientation(&self) -> Orientation {
        Orientation {
            yaw: self.base_yaw(),
            tilt: self.tilt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_4;

    #[test]
    fn base_yaw_is_camera_angle_plus_correction() {
        let facing = Facing::default();
        let expected = 3.0f32.atan2(4.0) + FRAC_PI_4;
        assert_eq!(facing.base_yaw(), expected);
    }

    #[test]
    fn base_orientation_is_deterministic() {
        let facing = Facing::default();
        assert_eq!(facing.base_orientation(), facing.base_orientation());
    }

    #[test]
    fn camera_straight_ahead_yields_only_the_correction() {
        let facing = Facing {
            camera_x: 0.0,
            camera_z: 5.0,
            ..Facing::default()
        };
        assert_eq!(facing.base_yaw(), facing.yaw_correction);
    }
}
