//! Leave-range detector: a radius around the player. An active enemy that was
//! inside and is now outside produces one `EnemyLeftRange`.
//!
//! Membership is tracked by distance each frame rather than by physics
//! trigger events, so pooling an enemy (which teleports it to the neutral
//! position) just drops it from the set without an exit.

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::platform::collections::HashSet;
use bevy::prelude::*;

use crate::common::state::SessionState;
use crate::plugins::bus::{EnemyLeftRange, NewGame};
use crate::plugins::enemies::{self, Enemy, PoolSlot};
use crate::plugins::player::Player;


#[derive(Component, Debug, Clone)]
pub struct LeaveRangeDetector {
    pub radius: f32,
    inside: HashSet<Entity>,
}

impl LeaveRangeDetector {
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            inside: HashSet::default(),
        }
    }

    pub fn contains(&self, e: Entity) -> bool {
        self.inside.contains(&e)
    }

    pub fn clear(&mut self) {
        self.inside.clear();
    }

    /// Replace the membership with this frame's active enemies and report
    /// the ones that crossed out.
    pub fn update(
        &mut self,
        center: Vec2,
        active: impl IntoIterator<Item = (Entity, Vec2)>,
        mut exited: impl FnMut(Entity),
    ) {
        let r2 = self.radius * self.radius;
        let mut now_inside = HashSet::default();
        for (e, pos) in active {
            if pos.distance_squared(center) <= r2 {
                now_inside.insert(e);
            } else if self.inside.contains(&e) {
                exited(e);
            }
        }
        self.inside = now_inside;
    }
}

pub fn plugin(app: &mut App) {
    app.add_systems(
        Update,
        (
            clear_on_new_game,
            detect_enemies_leaving_range
                .after(clear_on_new_game)
                .after(enemies::drive_enemies)
                .run_if(in_state(SessionState::Playing)),
        ),
    );
}

pub fn detect_enemies_leaving_range(
    mut q_player: Query<(&Transform, &mut LeaveRangeDetector), With<Player>>,
    q_enemies: Query<(Entity, &Transform, &PoolSlot), (With<Enemy>, Without<Player>)>,
    mut writer: MessageWriter<EnemyLeftRange>,
) {
    let Ok((player_tf, mut detector)) = q_player.single_mut() else {
        return;
    };
    let active = q_enemies
        .iter()
        .filter(|(_, _, slot)| slot.is_active())
        .map(|(e, tf, _)| (e, tf.translation.truncate()));

    detector.update(player_tf.translation.truncate(), active, |enemy| {
        writer.write(EnemyLeftRange { enemy });
    });
}

fn clear_on_new_game(mut new_game: MessageReader<NewGame>, mut q: Query<&mut LeaveRangeDetector>) {
    if new_game.read().count() == 0 {
        return;
    }
    for mut detector in &mut q {
        detector.clear();
    }
}
