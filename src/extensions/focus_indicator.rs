//! A `bevy_follow_cam` extension that draws the focus point of each camera, and when geometry
//! pulls the camera in, the probe that hit it. This makes it easier to see why the camera moved.

use bevy_app::prelude::*;
use bevy_color::prelude::*;
use bevy_ecs::prelude::*;
use bevy_gizmos::prelude::*;
use bevy_math::{prelude::*, Isometry3d};
use bevy_reflect::prelude::*;
use bevy_render::prelude::*;

use crate::prelude::*;

/// See the [module](self) docs.
pub struct FocusIndicatorPlugin;

impl Plugin for FocusIndicatorPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PostUpdate, draw_focus.after(FollowCamSystems))
            .register_type::<FocusIndicator>();
    }
}

/// Optional. Configures whether or not a [`FollowCam`] should show its focus indicator. The
/// indicator will be enabled if this component is not present.
#[derive(Debug, Component, Reflect)]
pub struct FocusIndicator {
    /// Should the indicator be visible on this camera?
    pub enabled: bool,
}

impl Default for FocusIndicator {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Use gizmos to draw the focus point, and any obstruction hit, in world space.
pub fn draw_focus(
    cameras: Query<(&FollowCam, &Projection, Option<&FocusIndicator>)>,
    mut gizmos: Gizmos,
) {
    for (follow_cam, projection, _) in cameras
        .iter()
        .filter(|(.., indicator)| indicator.map(|i| i.enabled).unwrap_or(true))
    {
        let (Some(focus), Some(pose)) = (follow_cam.focus_point(), follow_cam.last_pose()) else {
            continue;
        };
        let scale = pose.distance.max(1.0) * 0.01;
        gizmos.sphere(Isometry3d::from_translation(focus), scale, Color::WHITE);

        let Some(hit_distance) = pose.hit_distance else {
            continue;
        };
        let hit_color = Color::srgb(1.0, 0.4, 0.1);
        gizmos.line(focus, pose.position, hit_color);

        let Some(intrinsics) = CameraIntrinsics::from_projection(projection) else {
            continue;
        };
        let look_direction = pose.rotation * Vec3::NEG_Z;
        let half_extents = intrinsics.probe_half_extents();
        gizmos.rect(
            Isometry3d::new(focus - look_direction * hit_distance, pose.rotation),
            half_extents.truncate() * 2.0,
            hit_color,
        );
    }
}
