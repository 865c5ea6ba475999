//! Provides [`FollowCamSettings`], the per-camera configuration of the controller.

use bevy_log::prelude::*;
use bevy_reflect::prelude::*;

use super::rotation::OrbitAngles;

/// Vertical angles are limited to this magnitude, in degrees, to keep the camera away from the
/// poles where yaw becomes meaningless.
pub const VERTICAL_ANGLE_LIMIT: f32 = 89.0;
/// Slowest and fastest allowed rotation speeds, in degrees per second.
pub const ROTATION_SPEED_RANGE: (f32, f32) = (1.0, 360.0);
/// Largest allowed realignment smoothing range, in degrees.
pub const MAX_ALIGN_SMOOTH_RANGE: f32 = 90.0;

/// Configuration of a [`FollowCam`](super::component::FollowCam).
///
/// Settings are fixed when the camera is created with
/// [`FollowCam::new`](super::component::FollowCam::new), which runs [`Self::validated`] on them.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct FollowCamSettings {
    /// Distance from the focus point to the camera when nothing is in the way. A distance of zero
    /// turns the camera into a first-person view that is always free to look around.
    pub distance: f32,
    /// How quickly the focus point catches up with the target. Zero disables smoothing and snaps
    /// the focus point to the target every frame.
    ///
    /// The catch-up factor scales with the squared distance to the target, so large jumps are
    /// followed almost immediately while slow drift is damped.
    pub responsiveness: f32,
    /// Rotation speed in degrees per second, for both manual and automatic rotation.
    pub rotation_speed: f32,
    /// Lowest pitch, in degrees. Negative values look up at the focus from below.
    pub min_vertical_angle: f32,
    /// Highest pitch, in degrees. Never less than [`Self::min_vertical_angle`].
    pub max_vertical_angle: f32,
    /// Seconds after the last manual rotation before a held camera starts realigning behind the
    /// target.
    pub align_delay: f32,
    /// Angular range, in degrees, near the heading (and its opposite) where realignment slows
    /// down proportionally.
    pub align_smooth_range: f32,
    /// Bitmask of obstruction layers that can push the camera towards the focus.
    pub obstruction_mask: u32,
    /// Orbit angles used when the camera activates.
    pub initial_angles: OrbitAngles,
}

impl Default for FollowCamSettings {
    fn default() -> Self {
        Self {
            distance: 5.0,
            responsiveness: 0.0,
            rotation_speed: 90.0,
            min_vertical_angle: -30.0,
            max_vertical_angle: 60.0,
            align_delay: 5.0,
            align_smooth_range: 45.0,
            obstruction_mask: u32::MAX,
            initial_angles: OrbitAngles::new(45.0, 0.0),
        }
    }
}

impl FollowCamSettings {
    /// Returns a copy of these settings with every value inside its valid range.
    ///
    /// Non-finite values fall back to their defaults, and a maximum vertical angle below the
    /// minimum is raised to match it.
    #[must_use = "validated returns the corrected settings"]
    pub fn validated(self) -> Self {
        let defaults = Self::default();
        let finite_or = |value: f32, fallback: f32| {
            if value.is_finite() {
                value
            } else {
                fallback
            }
        };

        let mut corrected = Self {
            distance: finite_or(self.distance, defaults.distance).max(0.0),
            responsiveness: finite_or(self.responsiveness, defaults.responsiveness).max(0.0),
            rotation_speed: finite_or(self.rotation_speed, defaults.rotation_speed)
                .clamp(ROTATION_SPEED_RANGE.0, ROTATION_SPEED_RANGE.1),
            min_vertical_angle: finite_or(self.min_vertical_angle, defaults.min_vertical_angle)
                .clamp(-VERTICAL_ANGLE_LIMIT, VERTICAL_ANGLE_LIMIT),
            max_vertical_angle: finite_or(self.max_vertical_angle, defaults.max_vertical_angle)
                .clamp(-VERTICAL_ANGLE_LIMIT, VERTICAL_ANGLE_LIMIT),
            align_delay: finite_or(self.align_delay, defaults.align_delay).max(0.0),
            align_smooth_range: finite_or(self.align_smooth_range, defaults.align_smooth_range)
                .clamp(0.0, MAX_ALIGN_SMOOTH_RANGE),
            obstruction_mask: self.obstruction_mask,
            initial_angles: OrbitAngles::new(
                finite_or(self.initial_angles.pitch, defaults.initial_angles.pitch),
                finite_or(self.initial_angles.yaw, defaults.initial_angles.yaw),
            ),
        };
        if corrected.max_vertical_angle < corrected.min_vertical_angle {
            corrected.max_vertical_angle = corrected.min_vertical_angle;
        }

        if corrected != self {
            debug!("Corrected follow camera settings from {self:?} to {corrected:?}");
        }
        corrected
    }

    /// Is the camera pinned to the focus point, acting as a first-person view?
    pub fn is_first_person(&self) -> bool {
        self.distance == 0.0
    }

    /// Set the orbit distance.
    #[must_use = "with_distance returns modified settings"]
    pub fn with_distance(self, distance: f32) -> Self {
        Self { distance, ..self }
    }

    /// Set the focus responsiveness. Zero disables focus smoothing.
    #[must_use = "with_responsiveness returns modified settings"]
    pub fn with_responsiveness(self, responsiveness: f32) -> Self {
        Self {
            responsiveness,
            ..self
        }
    }

    /// Set the rotation speed in degrees per second.
    #[must_use = "with_rotation_speed returns modified settings"]
    pub fn with_rotation_speed(self, rotation_speed: f32) -> Self {
        Self {
            rotation_speed,
            ..self
        }
    }

    /// Set the pitch limits in degrees.
    #[must_use = "with_vertical_limits returns modified settings"]
    pub fn with_vertical_limits(self, min: f32, max: f32) -> Self {
        Self {
            min_vertical_angle: min,
            max_vertical_angle: max,
            ..self
        }
    }

    /// Set the realignment delay in seconds, and the smoothing range in degrees.
    #[must_use = "with_realignment returns modified settings"]
    pub fn with_realignment(self, delay: f32, smooth_range: f32) -> Self {
        Self {
            align_delay: delay,
            align_smooth_range: smooth_range,
            ..self
        }
    }

    /// Set the obstruction layers the camera avoids.
    #[must_use = "with_obstruction_mask returns modified settings"]
    pub fn with_obstruction_mask(self, obstruction_mask: u32) -> Self {
        Self {
            obstruction_mask,
            ..self
        }
    }

    /// Set the orbit angles the camera starts with.
    #[must_use = "with_initial_angles returns modified settings"]
    pub fn with_initial_angles(self, initial_angles: OrbitAngles) -> Self {
        Self {
            initial_angles,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_already_valid() {
        let settings = FollowCamSettings::default();
        assert_eq!(settings.validated(), settings);
    }

    #[test]
    fn max_vertical_angle_is_raised_to_min() {
        let settings = FollowCamSettings::default()
            .with_vertical_limits(20.0, -10.0)
            .validated();
        assert_eq!(settings.min_vertical_angle, 20.0);
        assert_eq!(settings.max_vertical_angle, 20.0);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let settings = FollowCamSettings {
            distance: -2.0,
            responsiveness: -1.0,
            rotation_speed: 1000.0,
            min_vertical_angle: -120.0,
            max_vertical_angle: 120.0,
            align_delay: -3.0,
            align_smooth_range: 200.0,
            ..Default::default()
        }
        .validated();

        assert_eq!(settings.distance, 0.0);
        assert_eq!(settings.responsiveness, 0.0);
        assert_eq!(settings.rotation_speed, 360.0);
        assert_eq!(settings.min_vertical_angle, -VERTICAL_ANGLE_LIMIT);
        assert_eq!(settings.max_vertical_angle, VERTICAL_ANGLE_LIMIT);
        assert_eq!(settings.align_delay, 0.0);
        assert_eq!(settings.align_smooth_range, MAX_ALIGN_SMOOTH_RANGE);
    }

    #[test]
    fn non_finite_values_fall_back_to_defaults() {
        let settings = FollowCamSettings::default()
            .with_distance(f32::NAN)
            .with_rotation_speed(f32::INFINITY)
            .with_initial_angles(OrbitAngles::new(f32::NAN, 10.0))
            .validated();
        let defaults = FollowCamSettings::default();

        assert_eq!(settings.distance, defaults.distance);
        assert_eq!(settings.rotation_speed, defaults.rotation_speed);
        assert_eq!(settings.initial_angles, OrbitAngles::new(45.0, 10.0));
    }

    #[test]
    fn zero_distance_is_first_person() {
        assert!(FollowCamSettings::default()
            .with_distance(0.0)
            .is_first_person());
        assert!(!FollowCamSettings::default().is_first_person());
    }
}
