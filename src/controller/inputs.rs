//! Inputs sent to a [`FollowCam`], and a default mouse input plugin that sends them.

use bevy_app::prelude::*;
use bevy_ecs::prelude::*;
use bevy_input::{mouse::AccumulatedMouseMotion, prelude::*, InputSystem};
use bevy_math::prelude::*;
use bevy_reflect::prelude::*;

use super::component::FollowCam;

/// Input received by a camera since its last update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect)]
pub struct FollowCamInputs {
    /// Is the user holding the camera to look around?
    pub orbit_engaged: bool,
    /// Accumulated rotation input, pitch in `x` and yaw in `y`.
    pub rotation: Vec2,
}

/// See the [module](self) docs.
pub struct FollowCamInputPlugin;

impl Plugin for FollowCamInputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FollowCamInputSettings>()
            .add_systems(PreUpdate, default_camera_inputs.after(InputSystem))
            .register_type::<FollowCamInputSettings>();
    }
}

/// Mouse bindings used by [`default_camera_inputs`].
#[derive(Debug, Clone, Resource, Reflect)]
pub struct FollowCamInputSettings {
    /// Hold this button to look around.
    pub engage_button: MouseButton,
    /// Converts mouse motion in logical pixels to rotation input. `x` scales horizontal motion
    /// and `y` vertical motion.
    pub sensitivity: Vec2,
}

impl Default for FollowCamInputSettings {
    fn default() -> Self {
        Self {
            engage_button: MouseButton::Left,
            sensitivity: Vec2::splat(0.1),
        }
    }
}

/// Sends mouse inputs to every [`FollowCam`]. Moving the mouse down pitches the camera down,
/// moving it right turns the camera right.
pub fn default_camera_inputs(
    settings: Res<FollowCamInputSettings>,
    mouse: Res<ButtonInput<MouseButton>>,
    motion: Res<AccumulatedMouseMotion>,
    mut cameras: Query<&mut FollowCam>,
) {
    let engaged = mouse.pressed(settings.engage_button);
    let scaled = motion.delta * settings.sensitivity;
    let rotation = Vec2::new(scaled.y, scaled.x);

    for mut camera in &mut cameras {
        if camera.inputs().orbit_engaged != engaged {
            camera.set_orbit_engaged(engaged);
        }
        if rotation != Vec2::ZERO {
            camera.send_rotation_input(rotation);
        }
    }
}
