//! Tracks the point the camera orbits around, see [`FocusState`].

use bevy_math::prelude::*;
use bevy_reflect::prelude::*;

/// The smoothed point the camera looks at, and where it was on the previous frame.
///
/// The previous point is kept so the controller can tell which way the target is travelling.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct FocusState {
    focus_point: Vec3,
    previous_focus_point: Vec3,
}

impl FocusState {
    /// Start tracking a target at `target_position`.
    pub fn new(target_position: Vec3) -> Self {
        Self {
            focus_point: target_position,
            previous_focus_point: target_position,
        }
    }

    /// Move the focus point towards the target's latest position.
    ///
    /// With a `responsiveness` of zero, the focus snaps to the target. Otherwise it is
    /// interpolated from the last focus point by a factor of
    /// `squared_distance * responsiveness * delta_secs`, saturating at one.
    pub fn update(&mut self, target_position: Vec3, responsiveness: f32, delta_secs: f32) {
        self.previous_focus_point = self.focus_point;
        self.focus_point = target_position;
        if responsiveness > 0.0 {
            let distance_squared = target_position.distance_squared(self.previous_focus_point);
            let t = (distance_squared * responsiveness * delta_secs).clamp(0.0, 1.0);
            self.focus_point = self.previous_focus_point.lerp(target_position, t);
        }
    }

    /// The current, smoothed focus point.
    pub fn focus_point(&self) -> Vec3 {
        self.focus_point
    }

    /// The focus point of the previous frame.
    pub fn previous_focus_point(&self) -> Vec3 {
        self.previous_focus_point
    }

    /// Movement of the focus point since the previous frame, projected onto the ground plane as
    /// `(x, z)`.
    pub fn planar_movement(&self) -> Vec2 {
        Vec2::new(
            self.focus_point.x - self.previous_focus_point.x,
            self.focus_point.z - self.previous_focus_point.z,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_responsiveness_snaps_to_target() {
        let mut focus = FocusState::new(Vec3::ZERO);
        let target = Vec3::new(3.0, -1.0, 7.5);
        focus.update(target, 0.0, 0.016);

        assert_eq!(focus.focus_point(), target);
        assert_eq!(focus.previous_focus_point(), Vec3::ZERO);
    }

    #[test]
    fn previous_point_is_last_frames_focus() {
        let mut focus = FocusState::new(Vec3::ZERO);
        focus.update(Vec3::X, 0.0, 0.016);
        focus.update(Vec3::new(2.0, 0.0, 0.0), 0.0, 0.016);

        assert_eq!(focus.previous_focus_point(), Vec3::X);
    }

    #[test]
    fn small_drift_is_damped() {
        let mut focus = FocusState::new(Vec3::ZERO);
        // Squared distance 0.01, factor 0.01 * 2.0 * 0.5 = 0.01
        focus.update(Vec3::new(0.1, 0.0, 0.0), 2.0, 0.5);

        assert!((focus.focus_point().x - 0.001).abs() < 1e-6);
    }

    #[test]
    fn large_jump_saturates() {
        let mut focus = FocusState::new(Vec3::ZERO);
        let target = Vec3::new(0.0, 0.0, 100.0);
        focus.update(target, 1.0, 0.016);

        assert_eq!(focus.focus_point(), target);
    }

    #[test]
    fn planar_movement_ignores_height() {
        let mut focus = FocusState::new(Vec3::ZERO);
        focus.update(Vec3::new(1.0, 5.0, -2.0), 0.0, 0.016);

        assert_eq!(focus.planar_movement(), Vec2::new(1.0, -2.0));
    }
}
