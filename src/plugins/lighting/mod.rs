//! Lighting plugin (Firefly) (render-only).
//!
//! The player's light reaches as far as the vision cone; pillars cast shadows.

use bevy::prelude::*;
use bevy_firefly::prelude::*;

use crate::common::tunables::Tunables;
use crate::plugins::player::Player;
use crate::plugins::world::Pillar;

#[derive(Component)]
pub struct PlayerLight;

pub fn plugin(app: &mut App) {
    if !app.is_plugin_added::<FireflyPlugin>() {
        app.add_plugins(FireflyPlugin);
    }

    app.add_systems(Startup, setup)
        .add_systems(Update, (follow_player_light, add_pillar_occluders));
}

fn setup(mut commands: Commands, tunables: Res<Tunables>) {
    commands.spawn((
        Name::new("PlayerLight"),
        PlayerLight,
        PointLight2d {
            color: Color::srgb(1.0, 0.9, 0.75),
            radius: tunables.vision_range * 1.5,
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, 10.0),
    ));
}

fn add_pillar_occluders(mut commands: Commands, q: Query<(Entity, &Pillar), Added<Pillar>>) {
    for (e, pillar) in &q {
        commands.entity(e).insert(Occluder2d::circle(pillar.radius));
    }
}

fn follow_player_light(
    q_player: Query<&Transform, (With<Player>, Without<PlayerLight>)>,
    mut q_light: Query<&mut Transform, (With<PlayerLight>, Without<Player>)>,
) {
    let Ok(tf_player) = q_player.single() else {
        return;
    };
    let Ok(mut tf_light) = q_light.single_mut() else {
        return;
    };

    tf_light.translation.x = tf_player.translation.x;
    tf_light.translation.y = tf_player.translation.y;
}
