//! Global session state machine.
//!
//! The session driver (`plugins::session`) is the only writer. Everything else
//! reads `State<SessionState>` or gates itself with `in_state(..)`.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, States, Default)]
pub enum SessionState {
    #[default]
    MainMenu,
    Settings,
    PauseMenu,
    Wait,
    Playing,
    Finish,
}

impl SessionState {
    /// Simulation systems (sensor, enemies, spawner) only run in this state.
    #[inline]
    pub fn is_simulating(self) -> bool {
        matches!(self, Self::Playing)
    }
}
