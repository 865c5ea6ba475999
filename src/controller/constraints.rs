//! Keeps orbit angles inside their valid ranges after they have been rotated.

use super::{rotation::OrbitAngles, settings::FollowCamSettings};

/// Clamp pitch between the configured vertical limits, and wrap yaw into `[0, 360)`.
pub fn constrain_angles(angles: OrbitAngles, settings: &FollowCamSettings) -> OrbitAngles {
    OrbitAngles {
        pitch: angles
            .pitch
            .clamp(settings.min_vertical_angle, settings.max_vertical_angle),
        yaw: wrap_yaw(angles.yaw),
    }
}

/// Wrap a yaw in degrees into `[0, 360)`, for any number of revolutions.
pub fn wrap_yaw(yaw: f32) -> f32 {
    let wrapped = yaw.rem_euclid(360.0);
    // Tiny negative inputs round up to exactly 360.
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}
