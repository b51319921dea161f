//! Player plugin: the avatar that carries the vision cone and the leave-range
//! detector, moves on WASD, turns toward the cursor, and ends the round on
//! contact with the goal or an enemy.
//!
//! Pipeline:
//! - Update: sample input into `PlayerInput`, turn toward the cursor
//! - FixedUpdate: wall probe, then velocity on the kinematic body
//! - Update (after enemies move): goal / enemy contact -> `GameOutcome`
//!
//! Outside `Playing` the body is held still.

use std::f32::consts::FRAC_PI_2;

use avian2d::prelude::*;
use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;

use crate::common::layers::{Layer, enemy_mask, goal_mask, obstacle_mask};
use crate::common::spatial::{PhysicsProbe, SpatialProbe};
use crate::common::state::SessionState;
use crate::common::tunables::Tunables;
use crate::plugins::bus::{GameOutcome, NewGame};
use crate::plugins::camera::MainCamera;
use crate::plugins::enemies;
use crate::plugins::leave_range::LeaveRangeDetector;
use crate::plugins::session;
use crate::plugins::vision::{DetectionTracker, VisionCone};
use crate::plugins::world::PLAYER_START;

#[derive(Component)]
pub struct Player;

#[derive(Resource, Default, Debug)]
pub struct PlayerInput {
    pub move_axis: Vec2,
}

pub fn plugin(app: &mut App) {
    app.init_resource::<PlayerInput>()
        .add_systems(Startup, spawn)
        .add_systems(
            Update,
            (
                gather_input,
                reset_on_new_game.after(session::handle_session_requests),
                (
                    turn_toward_cursor,
                    report_player_contacts.after(enemies::drive_enemies),
                )
                    .run_if(in_state(SessionState::Playing)),
            ),
        )
        .add_systems(FixedUpdate, apply_movement);
}

fn spawn(mut commands: Commands, tunables: Res<Tunables>) {
    let layers = CollisionLayers::new(Layer::Player, [Layer::Obstacle, Layer::Enemy, Layer::Goal]);

    commands.spawn((
        (
            Name::new("Player"),
            Player,
            VisionCone::from_degrees(
                tunables.vision_range,
                tunables.vision_rays,
                tunables.vision_angle_deg,
            ),
            DetectionTracker::default(),
            LeaveRangeDetector::new(tunables.leave_range_radius),
        ),
        Sprite {
            color: Color::srgb(0.2, 0.75, 0.9),
            custom_size: Some(Vec2::splat(tunables.player_radius * 2.0)),
            ..default()
        },
        Transform::from_translation(PLAYER_START.extend(1.0)),
        RigidBody::Kinematic,
        Collider::circle(tunables.player_radius),
        layers,
        LinearVelocity::ZERO,
    ));
}

fn gather_input(keys: Option<Res<ButtonInput<KeyCode>>>, mut input: ResMut<PlayerInput>) {
    let Some(keys) = keys else {
        return;
    };
    let mut axis = Vec2::ZERO;

    if keys.pressed(KeyCode::KeyW) {
        axis.y += 1.0;
    }
    if keys.pressed(KeyCode::KeyS) {
        axis.y -= 1.0;
    }
    if keys.pressed(KeyCode::KeyA) {
        axis.x -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) {
        axis.x += 1.0;
    }

    input.move_axis = axis.normalize_or_zero();
}

/// Velocity for this fixed step: zero if an obstacle sits within `reach`
/// along the move direction.
pub fn movement_velocity<P: SpatialProbe>(
    probe: &P,
    pos: Vec2,
    axis: Vec2,
    speed: f32,
    reach: f32,
) -> Vec2 {
    let Ok(dir) = Dir2::new(axis) else {
        return Vec2::ZERO;
    };
    if probe.cast_ray(pos, dir, reach, obstacle_mask()).is_some() {
        return Vec2::ZERO;
    }
    dir * speed
}

fn apply_movement(
    probe: PhysicsProbe,
    state: Res<State<SessionState>>,
    tunables: Res<Tunables>,
    input: Res<PlayerInput>,
    mut q_player: Query<(&Transform, &mut LinearVelocity), With<Player>>,
) {
    let Ok((tf, mut vel)) = q_player.single_mut() else {
        return;
    };
    vel.0 = if state.get().is_simulating() {
        let reach = tunables.player_radius + tunables.player_wall_probe;
        let pos = tf.translation.truncate();
        movement_velocity(&probe, pos, input.move_axis, tunables.player_speed, reach)
    } else {
        Vec2::ZERO
    };
}

/// Rotation that points local +Y from `from` toward `to`.
pub fn facing(from: Vec2, to: Vec2) -> Option<Quat> {
    let d = to - from;
    if d.length_squared() < 1e-4 {
        return None;
    }
    Some(Quat::from_rotation_z(d.y.atan2(d.x) - FRAC_PI_2))
}

fn turn_toward_cursor(
    time: Res<Time>,
    tunables: Res<Tunables>,
    windows: Query<&Window>,
    q_camera: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mut q_player: Query<&mut Transform, With<Player>>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let Ok((camera, camera_tf)) = q_camera.single() else {
        return;
    };
    let world_cursor = match camera.viewport_to_world_2d(camera_tf, cursor) {
        Ok(p) => p,
        Err(e) => {
            debug!("viewport_to_world_2d failed: {e:?}");
            return;
        }
    };
    let Ok(mut tf) = q_player.single_mut() else {
        return;
    };
    let Some(target) = facing(tf.translation.truncate(), world_cursor) else {
        return;
    };

    let alpha = 1.0 - (-tunables.player_turn_rate * time.delta_secs()).exp();
    tf.rotation = tf.rotation.slerp(target, alpha);
}

/// Goal contact wins even if an enemy touches on the same frame.
pub fn contact_outcome<P: SpatialProbe>(probe: &P, pos: Vec2, radius: f32) -> Option<GameOutcome> {
    if probe.disc_overlaps(pos, radius, goal_mask()) {
        Some(GameOutcome { won: true })
    } else if probe.disc_overlaps(pos, radius, enemy_mask()) {
        Some(GameOutcome { won: false })
    } else {
        None
    }
}

pub fn report_player_contacts(
    probe: PhysicsProbe,
    tunables: Res<Tunables>,
    q_player: Query<&Transform, With<Player>>,
    mut writer: MessageWriter<GameOutcome>,
) {
    let Ok(tf) = q_player.single() else {
        return;
    };
    let pos = tf.translation.truncate();
    if let Some(outcome) = contact_outcome(&probe, pos, tunables.player_radius) {
        writer.write(outcome);
    }
}

fn reset_on_new_game(
    mut new_game: MessageReader<NewGame>,
    mut input: ResMut<PlayerInput>,
    mut q_player: Query<(&mut Transform, &mut LinearVelocity), With<Player>>,
) {
    if new_game.read().count() == 0 {
        return;
    }
    input.move_axis = Vec2::ZERO;
    for (mut tf, mut vel) in &mut q_player {
        tf.translation = PLAYER_START.extend(tf.translation.z);
        tf.rotation = Quat::IDENTITY;
        vel.0 = Vec2::ZERO;
    }
}
