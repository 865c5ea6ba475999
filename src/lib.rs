//! A third-person follow camera controller for Bevy.
//!
//! The camera orbits a target entity at a fixed distance. While the user holds the camera, mouse
//! motion rotates it. If the user keeps holding the camera without moving the mouse, once a delay
//! has passed the camera gently swings back behind the direction the target is moving. A released
//! camera keeps its rotation and only follows the target, except in first-person mode (a distance
//! of zero), where the camera is always held. Whenever geometry comes between the target and the
//! camera, the camera moves in just far enough to keep the target in view.
//!
//! # Getting Started
//!
//! 1. Add [`DefaultFollowCamPlugins`] to your app.
//! 2. Add a [`FollowCam`](crate::prelude::FollowCam) component to a camera, pointing it at the
//!    entity it should follow.
//! 3. Add [`Obstruction`](crate::prelude::Obstruction)s to the geometry the camera should not see
//!    through, or use another [`ObstructionBackend`](crate::prelude::ObstructionBackend) such as
//!    the `rapier` feature's physics backend.
//!
//! ```rust,ignore
//! fn setup(mut commands: Commands) {
//!     let player = commands.spawn(Transform::default()).id();
//!     commands.spawn((
//!         Camera3d::default(),
//!         FollowCam::new(player, FollowCamSettings::default().with_distance(8.0)),
//!     ));
//! }
//! ```

pub mod controller;
pub mod extensions;

use bevy_app::{prelude::*, PluginGroupBuilder};
use controller::{
    inputs::FollowCamInputPlugin, obstructions::PrimitiveObstructions, FollowCamPlugin,
};

/// Common imports.
pub mod prelude {
    pub use crate::{
        controller::{
            component::{FollowCam, FrameInput},
            inputs::{FollowCamInputPlugin, FollowCamInputSettings},
            obstructions::{Obstruction, PrimitiveObstructions},
            occlusion::{BoxCast, CameraIntrinsics, CameraPose, ObstructionBackend},
            rotation::OrbitAngles,
            settings::FollowCamSettings,
            FollowCamPlugin, FollowCamSystems,
        },
        DefaultFollowCamPlugins,
    };
}

/// Adds the camera controller with [`PrimitiveObstructions`](crate::prelude::PrimitiveObstructions),
/// mouse inputs, and all enabled extensions.
///
/// To use another obstruction backend, add [`FollowCamPlugin`](crate::prelude::FollowCamPlugin)
/// and [`FollowCamInputPlugin`](crate::prelude::FollowCamInputPlugin) yourself.
pub struct DefaultFollowCamPlugins;

impl PluginGroup for DefaultFollowCamPlugins {
    #[allow(clippy::let_and_return)]
    fn build(self) -> PluginGroupBuilder {
        let group = PluginGroupBuilder::start::<Self>()
            .add(FollowCamInputPlugin)
            .add(FollowCamPlugin::<PrimitiveObstructions<'static, 'static>>::default());

        #[cfg(feature = "extension_focus_indicator")]
        let group = group.add(extensions::focus_indicator::FocusIndicatorPlugin);

        group
    }
}
