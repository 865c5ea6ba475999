//! Decides how the camera rotates each frame, see [`OrbitState`].
//!
//! Rotation is either driven manually by user input, or automatically by realigning the camera
//! behind the direction the focus is travelling in, once manual input has been idle long enough.

use bevy_math::prelude::*;
use bevy_reflect::prelude::*;

use super::{constraints, focus::FocusState, settings::FollowCamSettings};

/// Rotation input with every component inside this magnitude is treated as noise.
pub const ROTATION_DEAD_ZONE: f32 = 0.001;
/// Squared planar movement of the focus below which it is considered stationary.
pub const STATIONARY_THRESHOLD: f32 = 1e-6;

/// Pitch and yaw of the camera around its focus, in degrees.
///
/// A yaw of zero looks along +Z and a yaw of 90 looks along +X. Positive pitch looks down.
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub struct OrbitAngles {
    /// Vertical angle in degrees.
    pub pitch: f32,
    /// Horizontal angle in degrees.
    pub yaw: f32,
}

impl OrbitAngles {
    /// Create orbit angles from a pitch and yaw in degrees.
    pub const fn new(pitch: f32, yaw: f32) -> Self {
        Self { pitch, yaw }
    }

    /// The roll-free camera rotation for these angles. The camera's forward axis points along
    /// [`Self::look_direction`], with +Y up.
    pub fn rotation(self) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            (self.yaw + 180.0).to_radians(),
            (-self.pitch).to_radians(),
            0.0,
        )
    }

    /// The unit direction the camera looks in.
    pub fn look_direction(self) -> Vec3 {
        let (sin_pitch, cos_pitch) = self.pitch.to_radians().sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.to_radians().sin_cos();
        Vec3::new(sin_yaw * cos_pitch, -sin_pitch, cos_yaw * cos_pitch)
    }
}

/// What drove the camera's rotation this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum RotationOutcome {
    /// User input rotated the camera.
    Manual,
    /// The camera realigned towards the focus' direction of travel.
    Automatic,
    /// The orbit angles were left alone.
    Unchanged,
}

impl RotationOutcome {
    /// Were the orbit angles modified?
    pub fn changed(self) -> bool {
        !matches!(self, RotationOutcome::Unchanged)
    }
}

/// Orbit angles and the time of the last manual rotation.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct OrbitState {
    angles: OrbitAngles,
    /// Elapsed wall-clock seconds at the last manual rotation.
    last_manual_rotation: f64,
}

impl OrbitState {
    /// Start orbiting at the given angles.
    pub fn new(angles: OrbitAngles) -> Self {
        Self {
            angles,
            last_manual_rotation: 0.0,
        }
    }

    /// The current orbit angles.
    pub fn angles(&self) -> OrbitAngles {
        self.angles
    }

    /// Elapsed seconds at the last manual rotation.
    pub fn last_manual_rotation(&self) -> f64 {
        self.last_manual_rotation
    }

    /// Rotate the camera with `input`, or if there is none, realign it behind the moving focus.
    ///
    /// `input` holds pitch in `x` and yaw in `y`. `now` is the elapsed wall-clock time in seconds.
    /// Automatic rotation is never attempted on a frame with manual rotation.
    pub fn update(
        &mut self,
        focus: &FocusState,
        input: Vec2,
        delta_secs: f32,
        now: f64,
        settings: &FollowCamSettings,
    ) -> RotationOutcome {
        if self.manual_rotation(input, delta_secs, now, settings) {
            RotationOutcome::Manual
        } else if self.automatic_rotation(focus, delta_secs, now, settings) {
            RotationOutcome::Automatic
        } else {
            RotationOutcome::Unchanged
        }
    }

    /// Clamp pitch and wrap yaw into their valid ranges.
    pub fn constrain(&mut self, settings: &FollowCamSettings) {
        self.angles = constraints::constrain_angles(self.angles, settings);
    }

    fn manual_rotation(
        &mut self,
        input: Vec2,
        delta_secs: f32,
        now: f64,
        settings: &FollowCamSettings,
    ) -> bool {
        if input.abs().cmple(Vec2::splat(ROTATION_DEAD_ZONE)).all() {
            return false;
        }
        let change = settings.rotation_speed * delta_secs * input;
        self.angles.pitch += change.x;
        self.angles.yaw += change.y;
        self.last_manual_rotation = now;
        true
    }

    fn automatic_rotation(
        &mut self,
        focus: &FocusState,
        delta_secs: f32,
        now: f64,
        settings: &FollowCamSettings,
    ) -> bool {
        if now - self.last_manual_rotation < settings.align_delay as f64 {
            return false;
        }

        let movement = focus.planar_movement();
        let movement_squared = movement.length_squared();
        if movement_squared < STATIONARY_THRESHOLD {
            return false;
        }

        let heading = heading_angle(movement / movement_squared.sqrt());
        let delta_abs = delta_angle(self.angles.yaw, heading).abs();
        // Throttled by how far the focus actually moved, so a creeping target turns the camera
        // slowly even on long frames.
        let mut rotation_change = settings.rotation_speed * delta_secs.min(movement_squared);
        let smooth_range = settings.align_smooth_range;
        if delta_abs < smooth_range {
            rotation_change *= delta_abs / smooth_range;
        } else if 180.0 - delta_abs < smooth_range {
            rotation_change *= (180.0 - delta_abs) / smooth_range;
        }

        self.angles.yaw = move_towards_angle(self.angles.yaw, heading, rotation_change);
        true
    }
}

/// Heading in degrees, in `[0, 360]`, of a normalized ground-plane direction given as `(x, z)`.
///
/// Zero is +Z and 90 is +X, matching [`OrbitAngles::yaw`].
pub fn heading_angle(direction: Vec2) -> f32 {
    let angle = direction.y.clamp(-1.0, 1.0).acos().to_degrees();
    if direction.x < 0.0 {
        360.0 - angle
    } else {
        angle
    }
}

/// Shortest signed difference in degrees from `current` to `target`, in `(-180, 180]`.
pub fn delta_angle(current: f32, target: f32) -> f32 {
    let delta = (target - current).rem_euclid(360.0);
    if delta > 180.0 {
        delta - 360.0
    } else {
        delta
    }
}

/// Move `current` towards `target` along the shortest arc by at most `max_delta` degrees.
///
/// Returns `target` itself once it is within reach, so repeated calls settle exactly.
pub fn move_towards_angle(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = delta_angle(current, target);
    if -max_delta < delta && delta < max_delta {
        return target;
    }
    let target = current + delta;
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}
