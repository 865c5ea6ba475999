//! A player you can walk around a ring of pillars, followed by the camera.

use bevy::prelude::*;
use bevy_follow_cam::prelude::*;

fn main() {
    App::new()
        .add_plugins((DefaultPlugins, DefaultFollowCamPlugins))
        .add_systems(Startup, (setup_player_and_camera, setup_scene))
        .add_systems(Update, move_player)
        .run();
}

#[derive(Component)]
struct Player;

fn setup_player_and_camera(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let player = commands
        .spawn((
            Player,
            Mesh3d(meshes.add(Cuboid::new(0.5, 1.0, 0.5))),
            MeshMaterial3d(materials.add(Color::srgb(0.8, 0.3, 0.2))),
            Transform::from_xyz(0.0, 0.5, 0.0),
        ))
        .id();

    commands.spawn((
        Camera3d::default(),
        FollowCam::new(
            player,
            FollowCamSettings::default()
                .with_distance(8.0)
                .with_responsiveness(4.0)
                .with_realignment(2.0, 45.0),
        ),
    ));
}

fn move_player(
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut player: Query<&mut Transform, With<Player>>,
) {
    let Ok(mut transform) = player.single_mut() else {
        return;
    };
    let mut direction = Vec3::ZERO;
    if keys.pressed(KeyCode::KeyW) {
        direction.z += 1.0;
    }
    if keys.pressed(KeyCode::KeyS) {
        direction.z -= 1.0;
    }
    if keys.pressed(KeyCode::KeyA) {
        direction.x -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) {
        direction.x += 1.0;
    }
    transform.translation += direction.normalize_or_zero() * 4.0 * time.delta_secs();
}

//
// --- The below code is not important for the example ---
//

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(50.0, 50.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.3, 0.5, 0.3))),
    ));

    let pillar_half_size = Vec3::new(0.5, 2.0, 0.5);
    let pillar_mesh = meshes.add(Cuboid::from_size(pillar_half_size * 2.0));
    let pillar_material = materials.add(Color::srgb(0.6, 0.6, 0.7));
    for i in 0..12 {
        let angle = i as f32 / 12.0 * std::f32::consts::TAU;
        let position = Vec3::new(angle.cos() * 10.0, pillar_half_size.y, angle.sin() * 10.0);
        commands.spawn((
            Mesh3d(pillar_mesh.clone()),
            MeshMaterial3d(pillar_material.clone()),
            Transform::from_translation(position),
            Obstruction::cuboid(pillar_half_size),
        ));
    }

    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let text = "WASD - Move\nLeft Mouse drag - Look around\nLeft Mouse held still - Realign";
    commands.spawn((
        Text::new(text),
        TextFont {
            font_size: 20.0,
            ..default()
        },
        Node {
            margin: UiRect::all(Val::Px(20.0)),
            ..Default::default()
        },
    ));
}
