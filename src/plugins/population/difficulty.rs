//! Difficulty profiles: level -> (population cap, spawn interval).

use std::collections::BTreeMap;

use bevy::ecs::message::MessageReader;
use bevy::prelude::*;

use crate::plugins::bus::DifficultyChanged;

pub const DEFAULT_LEVEL: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyProfile {
    pub max_enemy_count: usize,
    pub spawn_interval_secs: f32,
}

#[derive(Resource, Debug, Clone)]
pub struct DifficultyTable {
    profiles: BTreeMap<i32, DifficultyProfile>,
}

impl Default for DifficultyTable {
    fn default() -> Self {
        let profile = |max_enemy_count, spawn_interval_secs| DifficultyProfile {
            max_enemy_count,
            spawn_interval_secs,
        };
        Self {
            profiles: BTreeMap::from([
                (0, profile(5, 6.0)),  // easy
                (1, profile(7, 5.0)),  // normal
                (2, profile(10, 4.0)), // hard
            ]),
        }
    }
}

impl DifficultyTable {
    pub fn get(&self, level: i32) -> Option<DifficultyProfile> {
        self.profiles.get(&level).copied()
    }
}

/// The one profile in force. Read at every spawn decision.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct ActiveDifficulty {
    pub level: i32,
    pub profile: DifficultyProfile,
}

impl Default for ActiveDifficulty {
    fn default() -> Self {
        let level = DEFAULT_LEVEL;
        let profile = DifficultyTable::default()
            .get(level)
            .expect("default difficulty level missing from the default table");
        Self { level, profile }
    }
}

/// Swap profiles on request. Unknown levels keep the current one.
///
/// Already-active enemies above a lowered cap are left alone; the cap only
/// blocks further spawns.
pub fn apply_difficulty_changes(
    mut changes: MessageReader<DifficultyChanged>,
    table: Res<DifficultyTable>,
    mut active: ResMut<ActiveDifficulty>,
) {
    for change in changes.read() {
        let Some(profile) = table.get(change.level) else {
            debug!("unknown difficulty level {}; keeping {}", change.level, active.level);
            continue;
        };
        active.level = change.level;
        active.profile = profile;
        info!(
            "difficulty {}: cap {}, every {}s",
            change.level, profile.max_enemy_count, profile.spawn_interval_secs
        );
    }
}
