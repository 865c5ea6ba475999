//! Camera controller implementation.

use std::marker::PhantomData;

use bevy_app::prelude::*;
use bevy_ecs::prelude::*;
use bevy_transform::TransformSystem;
use bevy_window::RequestRedraw;

pub mod component;
pub mod constraints;
pub mod focus;
pub mod inputs;
pub mod obstructions;
pub mod occlusion;
pub mod rotation;
pub mod settings;

use obstructions::PrimitiveObstructions;
use occlusion::ObstructionBackend;

/// System set containing the system that moves every [`FollowCam`](component::FollowCam).
#[derive(Debug, Clone, PartialEq, Eq, Hash, SystemSet)]
pub struct FollowCamSystems;

/// Adds the camera controller. `B` chooses where obstruction geometry comes from, see
/// [`ObstructionBackend`]. Defaults to [`PrimitiveObstructions`].
pub struct FollowCamPlugin<B: ObstructionBackend = PrimitiveObstructions<'static, 'static>>(
    PhantomData<fn() -> B>,
);

impl<B: ObstructionBackend> Default for FollowCamPlugin<B> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<B: ObstructionBackend> Plugin for FollowCamPlugin<B> {
    fn build(&self, app: &mut App) {
        app.add_event::<RequestRedraw>()
            .add_systems(
                PostUpdate,
                component::FollowCam::update_camera_positions::<B>
                    .in_set(FollowCamSystems)
                    .after(TransformSystem::TransformPropagate),
            )
            .register_type::<component::FollowCam>()
            .register_type::<obstructions::Obstruction>();
    }
}
