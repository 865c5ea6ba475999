//! The primary [`Component`] of the controller, [`FollowCam`].

use bevy_ecs::{prelude::*, system::StaticSystemParam};
use bevy_log::prelude::*;
use bevy_math::prelude::*;
use bevy_reflect::prelude::*;
use bevy_render::prelude::*;
use bevy_time::prelude::*;
use bevy_transform::prelude::*;
use bevy_window::RequestRedraw;

use super::{
    focus::FocusState,
    inputs::FollowCamInputs,
    occlusion::{resolve_pose, BoxCast, CameraIntrinsics, CameraPose, ObstructionBackend},
    rotation::{OrbitAngles, OrbitState},
    settings::FollowCamSettings,
};

/// Tracks all state of a follow camera, including its target, settings, and inputs.
///
/// Each frame the camera:
///
/// 1. Moves its focus point towards the target, see [`FocusState`].
/// 2. If active, rotates from user input, or realigns behind the moving target once rotation
///    input has been idle for [`FollowCamSettings::align_delay`], see [`OrbitState`].
/// 3. Clamps and wraps the orbit angles if they changed.
/// 4. Backs away from the focus along the look direction, stopping in front of any obstruction,
///    see [`resolve_pose`].
///
/// The camera is active while the user holds it to look around, or always when the distance is
/// zero. When inactive, the camera keeps its current rotation and only follows the target, so
/// realignment only happens while the camera is held without being turned.
///
/// # Moving the Camera
///
/// The [`FollowCamInputPlugin`](super::inputs::FollowCamInputPlugin) sends mouse inputs to every
/// camera. To drive the camera from other devices, call [`FollowCam::set_orbit_engaged`] and
/// [`FollowCam::send_rotation_input`] before [`PostUpdate`](bevy_app::PostUpdate).
///
/// The camera entity should not have a parent: its [`Transform`] and [`GlobalTransform`] are both
/// written in world space.
#[derive(Debug, Clone, Reflect, Component)]
#[require(Transform, Projection)]
pub struct FollowCam {
    target: Entity,
    settings: FollowCamSettings,
    orbit: OrbitState,
    /// `None` until the first update, when the camera activates.
    focus: Option<FocusState>,
    inputs: FollowCamInputs,
    last_pose: Option<CameraPose>,
}

/// Everything the camera needs from the host for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    /// World space position of the followed target.
    pub target_position: Vec3,
    /// The camera's current rotation, kept when the orbit angles do not change.
    pub held_rotation: Quat,
    /// Unscaled seconds since the last frame.
    pub delta_secs: f32,
    /// Unscaled seconds since startup.
    pub elapsed_secs: f64,
    /// Projection parameters of the camera.
    pub intrinsics: CameraIntrinsics,
}

impl FollowCam {
    /// Create a camera that follows `target`. The settings are validated, see
    /// [`FollowCamSettings::validated`].
    pub fn new(target: Entity, settings: FollowCamSettings) -> Self {
        let settings = settings.validated();
        Self {
            target,
            orbit: OrbitState::new(settings.initial_angles),
            settings,
            focus: None,
            inputs: FollowCamInputs::default(),
            last_pose: None,
        }
    }

    /// The entity being followed.
    pub fn target(&self) -> Entity {
        self.target
    }

    /// The camera's configuration.
    pub fn settings(&self) -> &FollowCamSettings {
        &self.settings
    }

    /// The current orbit angles.
    pub fn orbit_angles(&self) -> OrbitAngles {
        self.orbit.angles()
    }

    /// The smoothed point the camera orbits, once the camera has activated.
    pub fn focus_point(&self) -> Option<Vec3> {
        self.focus.map(|focus| focus.focus_point())
    }

    /// The focus point of the previous frame, once the camera has activated.
    pub fn previous_focus_point(&self) -> Option<Vec3> {
        self.focus.map(|focus| focus.previous_focus_point())
    }

    /// The pose computed by the most recent update.
    pub fn last_pose(&self) -> Option<&CameraPose> {
        self.last_pose.as_ref()
    }

    /// Inputs waiting for the next update.
    pub fn inputs(&self) -> &FollowCamInputs {
        &self.inputs
    }

    /// Set whether the user is holding the camera to look around.
    pub fn set_orbit_engaged(&mut self, engaged: bool) {
        self.inputs.orbit_engaged = engaged;
    }

    /// Add rotation input for the next update, pitch in `x` and yaw in `y`. Inputs sent in the
    /// same frame are summed.
    pub fn send_rotation_input(&mut self, rotation: Vec2) {
        self.inputs.rotation += rotation;
    }

    /// Is the camera held at zero distance, acting as a first-person view?
    pub fn is_first_person(&self) -> bool {
        self.settings.is_first_person()
    }

    /// Should rotation be evaluated this frame? Either the user is holding the camera, or it is
    /// a first-person camera, which is always free to look around.
    pub fn is_active(&self) -> bool {
        self.inputs.orbit_engaged || self.is_first_person()
    }

    /// Run one frame of the controller and return the resulting camera pose.
    ///
    /// `cast` answers the occlusion probe, see [`ObstructionBackend`]. Pending rotation input is
    /// consumed.
    pub fn update_pose(
        &mut self,
        frame: &FrameInput,
        cast: impl FnOnce(&BoxCast) -> Option<f32>,
    ) -> CameraPose {
        let (focus, held_rotation) = match self.focus.as_mut() {
            Some(focus) => {
                focus.update(
                    frame.target_position,
                    self.settings.responsiveness,
                    frame.delta_secs,
                );
                (*focus, frame.held_rotation)
            }
            None => {
                let focus = FocusState::new(frame.target_position);
                self.focus = Some(focus);
                self.orbit.constrain(&self.settings);
                (focus, self.orbit.angles().rotation())
            }
        };

        let rotation_input = std::mem::take(&mut self.inputs.rotation);
        let look_rotation = if self.is_active()
            && self
                .orbit
                .update(
                    &focus,
                    rotation_input,
                    frame.delta_secs,
                    frame.elapsed_secs,
                    &self.settings,
                )
                .changed()
        {
            self.orbit.constrain(&self.settings);
            self.orbit.angles().rotation()
        } else {
            held_rotation
        };

        let pose = resolve_pose(
            focus.focus_point(),
            look_rotation,
            &self.settings,
            &frame.intrinsics,
            Some(self.target),
            cast,
        );
        self.last_pose = Some(pose);
        pose
    }

    /// Update transforms for all follow cameras. Called once per frame.
    pub fn update_camera_positions<B: ObstructionBackend>(
        mut cameras: Query<(
            &mut FollowCam,
            &mut Transform,
            &mut GlobalTransform,
            &Projection,
        )>,
        targets: Query<&GlobalTransform, Without<FollowCam>>,
        backend: StaticSystemParam<B>,
        mut redraw: EventWriter<RequestRedraw>,
        time: Res<Time<Real>>,
    ) {
        for (mut controller, mut transform, mut global_transform, projection) in &mut cameras {
            let target = controller.target;
            let Ok(target_transform) = targets.get(target) else {
                warn_once!("FollowCam target {target} has no GlobalTransform, camera not updated");
                continue;
            };
            let Some(intrinsics) = CameraIntrinsics::from_projection(projection) else {
                error_once!("Custom projections are not supported.");
                continue;
            };

            let frame = FrameInput {
                target_position: target_transform.translation(),
                held_rotation: transform.rotation,
                delta_secs: time.delta_secs(),
                elapsed_secs: time.elapsed_secs_f64(),
                intrinsics,
            };
            let pose = controller.update_pose(&frame, |cast| B::cast_box(&*backend, cast));

            if transform.translation != pose.position || transform.rotation != pose.rotation {
                transform.translation = pose.position;
                transform.rotation = pose.rotation;
                *global_transform = GlobalTransform::from(*transform);
                redraw.write(RequestRedraw);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(target_position: Vec3, held_rotation: Quat, elapsed_secs: f64) -> FrameInput {
        FrameInput {
            target_position,
            held_rotation,
            delta_secs: 0.1,
            elapsed_secs,
            intrinsics: CameraIntrinsics {
                near: 0.1,
                fov: std::f32::consts::FRAC_PI_4,
                aspect_ratio: 1.0,
            },
        }
    }

    fn camera(settings: FollowCamSettings) -> FollowCam {
        FollowCam::new(Entity::PLACEHOLDER, settings)
    }

    #[test]
    fn activation_seeds_focus_and_rotation() {
        let mut cam = camera(FollowCamSettings::default());
        assert_eq!(cam.focus_point(), None);

        let target = Vec3::new(4.0, 1.0, -2.0);
        let pose = cam.update_pose(&frame(target, Quat::IDENTITY, 0.0), |_| None);

        let angles = OrbitAngles::new(45.0, 0.0);
        assert_eq!(cam.focus_point(), Some(target));
        assert!(pose.rotation.abs_diff_eq(angles.rotation(), 1e-6));
        let expected = target - angles.look_direction() * 5.0;
        assert!(pose.position.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn initial_angles_are_constrained_on_activation() {
        let settings =
            FollowCamSettings::default().with_initial_angles(OrbitAngles::new(80.0, -90.0));
        let mut cam = camera(settings);
        cam.update_pose(&frame(Vec3::ZERO, Quat::IDENTITY, 0.0), |_| None);

        assert_eq!(cam.orbit_angles(), OrbitAngles::new(60.0, 270.0));
    }

    #[test]
    fn inactive_camera_holds_rotation() {
        let mut cam = camera(FollowCamSettings::default());
        cam.update_pose(&frame(Vec3::ZERO, Quat::IDENTITY, 0.0), |_| None);

        let held = Quat::from_rotation_y(0.3);
        cam.send_rotation_input(Vec2::new(1.0, 1.0));
        let pose = cam.update_pose(&frame(Vec3::X, held, 0.1), |_| None);

        assert_eq!(pose.rotation, held);
        assert_eq!(cam.orbit_angles(), OrbitAngles::new(45.0, 0.0));
        assert_eq!(cam.inputs().rotation, Vec2::ZERO);
    }

    #[test]
    fn engaged_camera_rotates_from_input() {
        let mut cam = camera(FollowCamSettings::default());
        cam.update_pose(&frame(Vec3::ZERO, Quat::IDENTITY, 0.0), |_| None);

        cam.set_orbit_engaged(true);
        cam.send_rotation_input(Vec2::new(0.0, -1.0));
        let pose = cam.update_pose(&frame(Vec3::ZERO, Quat::IDENTITY, 0.1), |_| None);

        // 90 degrees per second for a tenth of a second, wrapped from -9
        let angles = cam.orbit_angles();
        assert!((angles.yaw - 351.0).abs() < 1e-4);
        assert!(pose.rotation.abs_diff_eq(angles.rotation(), 1e-6));
    }

    /// Walks the target along +X for ten seconds, feeding each pose back as the held rotation.
    fn walk_target_along_x(cam: &mut FollowCam) {
        let mut held = cam.orbit_angles().rotation();
        for step in 0..100 {
            let target = Vec3::X * step as f32 * 0.1;
            held = cam
                .update_pose(&frame(target, held, step as f64 * 0.1), |_| None)
                .rotation;
        }
    }

    fn realigning_settings() -> FollowCamSettings {
        FollowCamSettings::default()
            .with_realignment(0.0, 45.0)
            .with_initial_angles(OrbitAngles::new(0.0, 0.0))
    }

    #[test]
    fn released_camera_does_not_realign() {
        let mut cam = camera(realigning_settings());
        walk_target_along_x(&mut cam);

        assert_eq!(cam.orbit_angles().yaw, 0.0);
    }

    #[test]
    fn held_still_camera_realigns_behind_target() {
        let mut cam = camera(realigning_settings());
        cam.set_orbit_engaged(true);
        walk_target_along_x(&mut cam);

        // Turning from 0 towards the +X heading at 90
        let yaw = cam.orbit_angles().yaw;
        assert!(yaw > 10.0 && yaw <= 90.0, "{yaw}");
    }

    #[test]
    fn first_person_camera_is_always_active() {
        let mut cam = camera(FollowCamSettings::default().with_distance(0.0));
        assert!(cam.is_active());
        cam.update_pose(&frame(Vec3::ZERO, Quat::IDENTITY, 0.0), |_| None);

        cam.send_rotation_input(Vec2::new(-1.0, 0.0));
        let pose = cam.update_pose(&frame(Vec3::Y, Quat::IDENTITY, 0.1), |_| None);

        assert!((cam.orbit_angles().pitch - 36.0).abs() < 1e-4);
        assert_eq!(pose.position, Vec3::Y);
    }

    #[test]
    fn still_target_and_no_input_change_nothing() {
        let mut cam = camera(FollowCamSettings::default());
        cam.set_orbit_engaged(true);
        cam.update_pose(&frame(Vec3::ONE, Quat::IDENTITY, 0.0), |_| None);
        let before = cam.orbit_angles();

        let held = before.rotation();
        for step in 1..100 {
            cam.update_pose(&frame(Vec3::ONE, held, 10.0 + step as f64), |_| None);
        }
        assert_eq!(cam.orbit_angles(), before);
    }

    #[test]
    fn obstruction_ignores_the_target() {
        let mut cam = camera(FollowCamSettings::default());
        let mut ignored = None;
        let pose = cam.update_pose(&frame(Vec3::ZERO, Quat::IDENTITY, 0.0), |cast| {
            ignored = cast.ignore;
            Some(1.0)
        });

        assert_eq!(ignored, Some(Entity::PLACEHOLDER));
        assert!((pose.distance - 1.1).abs() < 1e-6);
        assert_eq!(cam.last_pose(), Some(&pose));
    }
}
