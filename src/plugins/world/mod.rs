//! World plugin: the arena. Floor (spawn-valid area), boundary walls and
//! pillars (obstacles that block sight and movement), and the goal.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::layers::Layer;

const TILE: i32 = 64;
const HALF_W: i32 = TILE * 16;
const HALF_H: i32 = TILE * 9;
const WALL_THICKNESS: f32 = 30.0;

pub const PLAYER_START: Vec2 = Vec2::new(-(HALF_W as f32) + 120.0, -(HALF_H as f32) + 120.0);
pub const GOAL_POS: Vec2 = Vec2::new(HALF_W as f32 - 100.0, HALF_H as f32 - 100.0);
const GOAL_SIZE: Vec2 = Vec2::splat(64.0);

/// (center, radius)
const PILLARS: [(Vec2, f32); 8] = [
    (Vec2::new(-600.0, -150.0), 40.0),
    (Vec2::new(-350.0, 250.0), 55.0),
    (Vec2::new(-120.0, -300.0), 35.0),
    (Vec2::new(80.0, 60.0), 70.0),
    (Vec2::new(320.0, -220.0), 45.0),
    (Vec2::new(450.0, 300.0), 40.0),
    (Vec2::new(700.0, -40.0), 60.0),
    (Vec2::new(-800.0, 380.0), 35.0),
];

#[derive(Component)]
pub struct Floor;

#[derive(Component)]
pub struct Goal;

#[derive(Component, Debug, Clone, Copy)]
pub struct Pillar {
    pub radius: f32,
}

pub fn plugin(app: &mut App) {
    app.add_systems(Startup, (spawn_floor, spawn_arena, spawn_pillars, spawn_goal));
}

#[inline]
fn obstacle_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Obstacle, [Layer::Player, Layer::Enemy])
}

fn spawn_arena(mut commands: Commands) {
    let wall_color = Color::srgb(0.25, 0.27, 0.33);
    let (w, h, t) = (HALF_W as f32, HALF_H as f32, WALL_THICKNESS);

    let mut spawn_wall = |name: &str, pos: Vec2, size: Vec2| {
        commands.spawn((
            Name::new(name.to_owned()),
            Sprite::from_color(wall_color, size),
            Transform::from_translation(pos.extend(0.5)),
            RigidBody::Static,
            Collider::rectangle(size.x, size.y),
            obstacle_layers(),
        ));
    };

    spawn_wall("WallTop", Vec2::new(0.0, h + t * 0.5), Vec2::new(w * 2.0 + t * 2.0, t));
    spawn_wall("WallBottom", Vec2::new(0.0, -h - t * 0.5), Vec2::new(w * 2.0 + t * 2.0, t));
    spawn_wall("WallLeft", Vec2::new(-w - t * 0.5, 0.0), Vec2::new(t, h * 2.0));
    spawn_wall("WallRight", Vec2::new(w + t * 0.5, 0.0), Vec2::new(t, h * 2.0));
}

fn spawn_pillars(mut commands: Commands) {
    let color = Color::srgb(0.3, 0.3, 0.36);
    for (i, (center, radius)) in PILLARS.into_iter().enumerate() {
        commands.spawn((
            Name::new(format!("Pillar{i}")),
            Pillar { radius },
            Sprite::from_color(color, Vec2::splat(radius * 2.0)),
            Transform::from_translation(center.extend(0.5)),
            RigidBody::Static,
            Collider::circle(radius),
            obstacle_layers(),
        ));
    }
}

fn spawn_goal(mut commands: Commands) {
    commands.spawn((
        Name::new("Goal"),
        Goal,
        Sprite::from_color(Color::srgb(0.3, 0.85, 0.4), GOAL_SIZE),
        Transform::from_translation(GOAL_POS.extend(0.2)),
        RigidBody::Static,
        Sensor,
        Collider::rectangle(GOAL_SIZE.x, GOAL_SIZE.y),
        CollisionLayers::new(Layer::Goal, [Layer::Player]),
    ));
}

/// Checkerboard sprites plus one sensor covering the walkable area.
fn spawn_floor(mut commands: Commands) {
    let size = Vec2::new(HALF_W as f32 * 2.0, HALF_H as f32 * 2.0);
    commands.spawn((
        Name::new("Floor"),
        Floor,
        Transform::default(),
        RigidBody::Static,
        Sensor,
        Collider::rectangle(size.x, size.y),
        CollisionLayers::new(Layer::Floor, LayerMask::NONE),
    ));

    (-(HALF_H / TILE)..HALF_H / TILE)
        .flat_map(|y| (-(HALF_W / TILE)..HALF_W / TILE).map(move |x| (x, y)))
        .for_each(|(x, y)| {
            let center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) * TILE as f32;
            let color = if (x + y) % 2 == 0 {
                Color::srgb(0.14, 0.14, 0.16)
            } else {
                Color::srgb(0.12, 0.12, 0.14)
            };

            commands.spawn((
                Sprite::from_color(color, Vec2::splat(TILE as f32)),
                Transform::from_translation(center.extend(0.0)),
            ));
        });
}
