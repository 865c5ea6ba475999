//! A lightweight [`ObstructionBackend`] for scenes without a physics engine.
//!
//! Add an [`Obstruction`] to any entity with a [`GlobalTransform`] to block the camera.

use bevy_ecs::{
    prelude::*,
    system::{SystemParam, SystemParamItem},
};
use bevy_math::{
    bounding::{Aabb3d, AabbCast3d, Bounded3d, IntersectsVolume},
    prelude::*,
    Isometry3d,
};
use bevy_reflect::prelude::*;
use bevy_transform::prelude::*;

use super::{
    component::FollowCam,
    occlusion::{BoxCast, ObstructionBackend},
};

/// A box the camera cannot see through.
///
/// Obstructions on the followed target, or on any of its descendants, never block that target's
/// camera.
#[derive(Debug, Clone, Copy, PartialEq, Component, Reflect)]
pub struct Obstruction {
    /// Half of the box size in local space, before the entity's scale is applied.
    pub half_size: Vec3,
    /// Layers this obstruction is on. It blocks cameras whose obstruction mask shares a layer.
    pub layers: u32,
}

impl Obstruction {
    /// A box on the first layer.
    pub fn cuboid(half_size: Vec3) -> Self {
        Self {
            half_size,
            layers: 1,
        }
    }

    /// Move the obstruction to other layers.
    #[must_use = "with_layers returns a modified Obstruction"]
    pub fn with_layers(self, layers: u32) -> Self {
        Self { layers, ..self }
    }

    /// Where this box sits when placed with `transform`: its world space isometry, and its
    /// scaled bounds in that local frame.
    pub fn placement(&self, transform: &GlobalTransform) -> (Isometry3d, Aabb3d) {
        let (scale, rotation, translation) = transform.to_scale_rotation_translation();
        (
            Isometry3d::new(translation, rotation),
            Aabb3d::new(Vec3::ZERO, self.half_size * scale.abs()),
        )
    }
}

/// Casts camera probes against every [`Obstruction`] in the world. Cameras never obstruct
/// themselves or each other.
///
/// Each box is swept in its own frame, so rotated obstructions are exact. The probe rectangle is
/// swept as its bounding box in that frame, which is conservative when the camera is tilted
/// relative to the obstruction.
#[derive(SystemParam)]
pub struct PrimitiveObstructions<'w, 's> {
    obstructions: Query<
        'w,
        's,
        (Entity, &'static GlobalTransform, &'static Obstruction),
        Without<FollowCam>,
    >,
    parents: Query<'w, 's, &'static ChildOf>,
}

impl PrimitiveObstructions<'_, '_> {
    /// Distance to the first obstruction hit by `cast`.
    pub fn sweep(&self, cast: &BoxCast) -> Option<f32> {
        let candidates = self
            .obstructions
            .iter()
            .filter(|(entity, _, obstruction)| {
                obstruction.layers & cast.mask != 0 && !self.is_ignored(*entity, cast.ignore)
            })
            .map(|(_, transform, obstruction)| obstruction.placement(transform));
        first_hit(cast, candidates)
    }

    fn is_ignored(&self, entity: Entity, ignore: Option<Entity>) -> bool {
        let Some(ignore) = ignore else {
            return false;
        };
        let mut current = entity;
        loop {
            if current == ignore {
                return true;
            }
            match self.parents.get(current) {
                Ok(child_of) => current = child_of.parent(),
                Err(_) => return false,
            }
        }
    }
}

impl ObstructionBackend for PrimitiveObstructions<'static, 'static> {
    fn cast_box(param: &SystemParamItem<'_, '_, Self>, cast: &BoxCast) -> Option<f32> {
        param.sweep(cast)
    }
}

/// Sweep the probe of `cast` against placed boxes, returning the nearest hit distance.
///
/// Each item is a box's world space isometry and its bounds in that local frame, see
/// [`Obstruction::placement`]. Boxes the probe already overlaps at its origin are skipped, the
/// same way a physics shape cast ignores shapes it starts inside of.
pub fn first_hit(
    cast: &BoxCast,
    obstructions: impl IntoIterator<Item = (Isometry3d, Aabb3d)>,
) -> Option<f32> {
    obstructions
        .into_iter()
        .filter_map(|(placement, bounds)| sweep_local(cast, placement, bounds))
        .min_by(f32::total_cmp)
}

fn sweep_local(cast: &BoxCast, placement: Isometry3d, bounds: Aabb3d) -> Option<f32> {
    let to_local = placement.inverse();
    let origin = to_local.transform_point(cast.origin);
    let direction = to_local.rotation * cast.direction;
    let probe = Cuboid {
        half_size: cast.half_extents,
    }
    .aabb_3d(Isometry3d::from_rotation(to_local.rotation * cast.rotation));

    let probe_at_origin = Aabb3d {
        min: probe.min + origin,
        max: probe.max + origin,
    };
    if probe_at_origin.intersects(&bounds) {
        return None;
    }
    AabbCast3d::new(probe, Vec3::from(origin), direction, cast.max_distance)
        .aabb_collision_at(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cast_towards_negative_z() -> BoxCast {
        BoxCast {
            origin: Vec3::ZERO,
            half_extents: Vec3::new(0.1, 0.05, 0.0),
            rotation: Quat::IDENTITY,
            direction: Dir3::NEG_Z,
            max_distance: 4.9,
            mask: u32::MAX,
            ignore: None,
        }
    }

    fn wall_at(z: f32) -> (Isometry3d, Aabb3d) {
        (
            Isometry3d::from_translation(Vec3::new(0.0, 0.0, z)),
            Aabb3d::new(Vec3::ZERO, Vec3::new(2.0, 2.0, 0.5)),
        )
    }

    /// A thin wall running diagonally across the ground plane, through `center`.
    fn diagonal_wall(center: Vec3) -> (Isometry3d, Aabb3d) {
        let transform = GlobalTransform::from(
            Transform::from_translation(center)
                .with_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_4)),
        );
        Obstruction::cuboid(Vec3::new(2.12, 2.0, 0.05)).placement(&transform)
    }

    #[test]
    fn nearest_wall_is_hit() {
        let hit = first_hit(&cast_towards_negative_z(), [wall_at(-4.0), wall_at(-3.0)]);
        assert!((hit.unwrap() - 2.5).abs() < 1e-5);
    }

    #[test]
    fn walls_beyond_the_probe_are_missed() {
        assert_eq!(first_hit(&cast_towards_negative_z(), [wall_at(-6.0)]), None);
    }

    #[test]
    fn walls_behind_the_focus_are_missed() {
        assert_eq!(first_hit(&cast_towards_negative_z(), [wall_at(3.0)]), None);
    }

    #[test]
    fn walls_around_the_origin_are_skipped() {
        let hit = first_hit(&cast_towards_negative_z(), [wall_at(0.0), wall_at(-3.0)]);
        assert!((hit.unwrap() - 2.5).abs() < 1e-5);
    }

    #[test]
    fn probe_width_catches_walls_beside_the_ray() {
        // Starts 0.05 to the right of the probe center, inside its 0.1 half width.
        let wall = (
            Isometry3d::from_translation(Vec3::new(1.05, 0.0, -2.0)),
            Aabb3d::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.5)),
        );
        assert!(first_hit(&cast_towards_negative_z(), [wall]).is_some());
    }

    #[test]
    fn placement_keeps_rotation_and_scales_bounds() {
        let rotation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let transform = GlobalTransform::from(
            Transform::from_xyz(0.0, 0.0, -3.0)
                .with_rotation(rotation)
                .with_scale(Vec3::splat(2.0)),
        );
        let (isometry, bounds) =
            Obstruction::cuboid(Vec3::new(1.0, 0.5, 0.5)).placement(&transform);

        assert!(isometry.rotation.abs_diff_eq(rotation, 1e-5));
        assert!(Vec3::from(isometry.translation).abs_diff_eq(Vec3::new(0.0, 0.0, -3.0), 1e-5));
        assert!(Vec3::from(bounds.max).abs_diff_eq(Vec3::new(2.0, 1.0, 1.0), 1e-5));
        assert!(Vec3::from(bounds.min).abs_diff_eq(Vec3::new(-2.0, -1.0, -1.0), 1e-5));
    }

    #[test]
    fn rotated_box_is_hit_on_its_face() {
        // A quarter turn swings the long local x axis across the probe path
        let transform = GlobalTransform::from(
            Transform::from_xyz(0.0, 0.0, -3.0)
                .with_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)),
        );
        let wall = Obstruction::cuboid(Vec3::new(0.5, 2.0, 2.0)).placement(&transform);

        let hit = first_hit(&cast_towards_negative_z(), [wall]);
        assert!((hit.unwrap() - 2.5).abs() < 1e-4);
    }

    #[test]
    fn diagonal_wall_past_the_camera_is_missed() {
        // Its world bounds reach z = -4.47, but the wall itself only crosses the path at -5.5
        let wall = diagonal_wall(Vec3::new(0.5, 0.0, -6.0));
        assert_eq!(first_hit(&cast_towards_negative_z(), [wall]), None);
    }

    #[test]
    fn diagonal_wall_across_the_path_is_hit_where_it_lies() {
        // Crosses the path at z = -3, the probe's corner touches it a little earlier
        let wall = diagonal_wall(Vec3::new(0.5, 0.0, -3.5));
        let hit = first_hit(&cast_towards_negative_z(), [wall]).unwrap();
        assert!((hit - 2.8293).abs() < 1e-3, "{hit}");
    }
}
