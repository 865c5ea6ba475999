//! A `bevy_follow_cam` extension that finds obstructions with `bevy_rapier3d` shape casts.
//!
//! Obstruction layers map onto rapier [`Group`]s: a collider blocks the camera when its collision
//! group memberships share a bit with the camera's
//! [`obstruction_mask`](crate::prelude::FollowCamSettings::obstruction_mask).
//!
//! ```rust,ignore
//! app.add_plugins((
//!     RapierPhysicsPlugin::<NoUserData>::default(),
//!     FollowCamInputPlugin,
//!     FollowCamPlugin::<RapierObstructions>::default(),
//! ));
//! ```

use bevy_ecs::system::SystemParamItem;
use bevy_rapier3d::prelude::*;

use crate::prelude::{BoxCast, ObstructionBackend};

/// Reads obstructions from the default rapier context.
pub type RapierObstructions = ReadRapierContext<'static, 'static>;

impl ObstructionBackend for ReadRapierContext<'static, 'static> {
    fn cast_box(param: &SystemParamItem<'_, '_, Self>, cast: &BoxCast) -> Option<f32> {
        let context = param.single().ok()?;
        let probe = Collider::cuboid(
            cast.half_extents.x,
            cast.half_extents.y,
            cast.half_extents.z,
        );
        let mut filter = QueryFilter::new().groups(CollisionGroups::new(
            Group::ALL,
            Group::from_bits_truncate(cast.mask),
        ));
        if let Some(ignore) = cast.ignore {
            filter = filter.exclude_rigid_body(ignore).exclude_collider(ignore);
        }
        // Colliders the probe starts inside of are not obstructions.
        let options = ShapeCastOptions {
            max_time_of_impact: cast.max_distance,
            target_distance: 0.0,
            stop_at_penetration: false,
            compute_impact_geometry_on_penetration: false,
        };

        context
            .cast_shape(
                cast.origin,
                cast.rotation,
                cast.direction.as_vec3(),
                &probe,
                options,
                filter,
            )
            .map(|(_, hit)| hit.time_of_impact)
    }
}
