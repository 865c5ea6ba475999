//! Keeps geometry from coming between the camera and its focus.
//!
//! A rectangle the size of the camera's near plane is swept from the focus point back towards
//! the camera. If it hits something, the camera is pulled in to sit just in front of the hit.

use bevy_ecs::{
    prelude::*,
    system::{SystemParam, SystemParamItem},
};
use bevy_math::prelude::*;
use bevy_reflect::prelude::*;
use bevy_render::prelude::*;

use super::settings::FollowCamSettings;

/// The parts of a camera's projection that decide the size of the occlusion probe.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct CameraIntrinsics {
    /// Distance to the near clipping plane.
    pub near: f32,
    /// Vertical field of view in radians.
    pub fov: f32,
    /// Width divided by height.
    pub aspect_ratio: f32,
}

impl CameraIntrinsics {
    /// Read the intrinsics of a [`Projection`].
    ///
    /// Orthographic projections have no field of view, and are probed with a point. Custom
    /// projections are not supported.
    pub fn from_projection(projection: &Projection) -> Option<Self> {
        match projection {
            Projection::Perspective(perspective) => Some(Self {
                near: perspective.near,
                fov: perspective.fov,
                aspect_ratio: perspective.aspect_ratio,
            }),
            Projection::Orthographic(ortho) => Some(Self {
                near: ortho.near.max(0.0),
                fov: 0.0,
                aspect_ratio: 1.0,
            }),
            Projection::Custom(_) => None,
        }
    }

    /// Half extents of the near plane in view space. Depth is always zero.
    pub fn probe_half_extents(&self) -> Vec3 {
        let half_height = self.near * (0.5 * self.fov).tan();
        Vec3::new(half_height * self.aspect_ratio, half_height, 0.0)
    }
}

/// A request to sweep a box through the world and report the distance to the first hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxCast {
    /// Center of the box at the start of the sweep.
    pub origin: Vec3,
    /// Half extents of the box, in its local space.
    pub half_extents: Vec3,
    /// Orientation of the box.
    pub rotation: Quat,
    /// Direction of the sweep.
    pub direction: Dir3,
    /// Furthest distance the box travels.
    pub max_distance: f32,
    /// Only obstructions on one of these layers are considered.
    pub mask: u32,
    /// An entity to never report, usually the target being followed.
    pub ignore: Option<Entity>,
}

/// A source of obstruction geometry that can answer [`BoxCast`]s.
///
/// This is the seam to the host's collision engine. The camera system is generic over it, see
/// [`FollowCamPlugin`](super::FollowCamPlugin).
pub trait ObstructionBackend: SystemParam + 'static {
    /// Distance along the sweep to the first obstruction, if any.
    fn cast_box(param: &SystemParamItem<'_, '_, Self>, cast: &BoxCast) -> Option<f32>;
}

/// No geometry, the camera is never obstructed.
impl ObstructionBackend for () {
    fn cast_box(_: &(), _: &BoxCast) -> Option<f32> {
        None
    }
}

/// Where the camera ended up this frame.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct CameraPose {
    /// World space camera position.
    pub position: Vec3,
    /// World space camera rotation.
    pub rotation: Quat,
    /// Distance from the focus point to the camera.
    pub distance: f32,
    /// Distance along the probe to the obstruction that pulled the camera in, if any.
    pub hit_distance: Option<f32>,
}

impl CameraPose {
    /// Was the camera pulled in by an obstruction?
    pub fn is_obstructed(&self) -> bool {
        self.hit_distance.is_some()
    }
}

/// Place the camera behind `focus_point`, looking along `look_rotation`, as far back as the
/// configured distance allows without geometry in between.
///
/// `cast` answers the probe. A missing, negative, or non-finite answer leaves the camera at the
/// full distance.
pub fn resolve_pose(
    focus_point: Vec3,
    look_rotation: Quat,
    settings: &FollowCamSettings,
    intrinsics: &CameraIntrinsics,
    ignore: Option<Entity>,
    cast: impl FnOnce(&BoxCast) -> Option<f32>,
) -> CameraPose {
    let look_direction = look_rotation * Vec3::NEG_Z;
    let probe_length = settings.distance - intrinsics.near;

    let hit_distance = Dir3::new(-look_direction)
        .ok()
        .filter(|_| probe_length > 0.0)
        .and_then(|direction| {
            cast(&BoxCast {
                origin: focus_point,
                half_extents: intrinsics.probe_half_extents(),
                rotation: look_rotation,
                direction,
                max_distance: probe_length,
                mask: settings.obstruction_mask,
                ignore,
            })
        })
        .filter(|hit| hit.is_finite() && *hit >= 0.0);

    let distance = hit_distance.map_or(settings.distance, |hit| {
        (hit + intrinsics.near).min(settings.distance)
    });

    CameraPose {
        position: focus_point - look_direction * distance,
        rotation: look_rotation,
        distance,
        hit_distance,
    }
}
