//! Event bus: the typed channels every feature plugin talks through.
//!
//! Each channel is a Bevy `Message` type. Producers hold a `MessageWriter`,
//! consumers a `MessageReader`; neither side knows the other exists.
//!
//! ```text
//!   vision ──Detection──────────▶ enemies
//!   leave_range ──EnemyLeftRange▶ population
//!   player ──GameOutcome────────▶ session
//!   menus ──SessionRequest──────▶ session ──NewGame──▶ population, vision, player
//!   settings ──DifficultyChanged▶ population
//!   enemies ──ChaseAudioCue─────▶ (audio layer)
//! ```
//!
//! Delivery is ordered by the schedule: a reader that runs `.after` the writer
//! sees the message in the same frame. A reader can never touch the set of
//! readers while it is being served, so there is no re-entrancy to guard.

use bevy::prelude::*;

use crate::common::state::SessionState;

/// Result of a vision scan for one enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sighting {
    Seen,
    Lost,
}

/// "This enemy just became visible / just stopped being visible."
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Detection {
    pub enemy: Entity,
    pub sighting: Sighting,
}

/// An enemy crossed out of the playable radius around the player.
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnemyLeftRange {
    pub enemy: Entity,
}

/// Win (goal reached) or lose (caught by an enemy).
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameOutcome {
    pub won: bool,
}

/// Difficulty level picked in settings. Unknown levels are ignored downstream.
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct DifficultyChanged {
    pub level: i32,
}

/// Menu intent. Only the session driver acts on it.
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionRequest {
    Enter(SessionState),
    /// Start over: reset the run, then enter `Playing`.
    NewGame,
}

/// Broadcast once per new run, before the first `Playing` frame.
#[derive(Message, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NewGame;

/// Chase sound edge for the audio layer.
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChaseAudioCue {
    pub enemy: Entity,
    pub playing: bool,
}

pub fn plugin(app: &mut App) {
    app.add_message::<Detection>()
        .add_message::<EnemyLeftRange>()
        .add_message::<GameOutcome>()
        .add_message::<DifficultyChanged>()
        .add_message::<SessionRequest>()
        .add_message::<NewGame>()
        .add_message::<ChaseAudioCue>();
}
