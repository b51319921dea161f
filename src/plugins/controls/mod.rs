//! Keyboard shortcuts standing in for menu screens. They only emit intents;
//! the session driver decides what happens.

use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;

use crate::common::state::SessionState;
use crate::plugins::bus::{DifficultyChanged, SessionRequest};

const DIFFICULTY_KEYS: [(KeyCode, i32); 3] = [
    (KeyCode::Digit1, 0),
    (KeyCode::Digit2, 1),
    (KeyCode::Digit3, 2),
];

pub fn plugin(app: &mut App) {
    app.add_systems(Update, shortcut_requests);
}

/// Escape target for the current state, if any.
pub fn pause_toggle(current: SessionState) -> Option<SessionState> {
    match current {
        SessionState::Playing => Some(SessionState::PauseMenu),
        SessionState::PauseMenu => Some(SessionState::Playing),
        _ => None,
    }
}

fn shortcut_requests(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    state: Res<State<SessionState>>,
    mut requests: MessageWriter<SessionRequest>,
    mut difficulty: MessageWriter<DifficultyChanged>,
) {
    let Some(keys) = keys else {
        return;
    };

    if keys.just_pressed(KeyCode::Enter) {
        requests.write(SessionRequest::NewGame);
    }
    if keys.just_pressed(KeyCode::Escape) {
        if let Some(target) = pause_toggle(*state.get()) {
            requests.write(SessionRequest::Enter(target));
        }
    }
    for (key, level) in DIFFICULTY_KEYS {
        if keys.just_pressed(key) {
            difficulty.write(DifficultyChanged { level });
        }
    }
}
