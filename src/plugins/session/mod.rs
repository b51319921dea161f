//! Session driver: the single writer of `SessionState`.
//!
//! Menus ask for transitions with `SessionRequest`; the player reports a win or a
//! loss with `GameOutcome`. Everything else observes the resulting
//! `State<SessionState>` and gates itself with `in_state(..)`.
//!
//! Requests for the state we are already in are dropped here, so re-broadcasting
//! a state never re-runs `OnEnter`/`OnExit` work downstream.

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;

use crate::common::state::SessionState;
use crate::plugins::bus::{GameOutcome, NewGame, SessionRequest};

/// Result of the last finished run, for the end-of-game screen.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LastOutcome(pub Option<bool>);

/// Seconds spent in `Playing` since the last new game.
///
/// Spawn scheduling and the chase ease-in read this instead of `Time`, so menus
/// and pauses do not eat into the run.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub struct SessionClock {
    pub elapsed: f32,
}

pub fn plugin(app: &mut App) {
    app.init_resource::<LastOutcome>()
        .init_resource::<SessionClock>();

    app.add_systems(
        Update,
        (
            handle_session_requests,
            reset_clock_on_new_game.after(handle_session_requests),
            tick_session_clock
                .after(reset_clock_on_new_game)
                .run_if(in_state(SessionState::Playing)),
            finish_on_outcome.run_if(in_state(SessionState::Playing)),
            log_session_state,
        ),
    );
}

pub fn tick_session_clock(time: Res<Time>, mut clock: ResMut<SessionClock>) {
    clock.elapsed += time.delta_secs();
}

pub fn reset_clock_on_new_game(
    mut new_game: MessageReader<NewGame>,
    mut clock: ResMut<SessionClock>,
) {
    if new_game.read().count() > 0 {
        clock.elapsed = 0.0;
    }
}

pub fn handle_session_requests(
    mut requests: MessageReader<SessionRequest>,
    state: Res<State<SessionState>>,
    mut next: ResMut<NextState<SessionState>>,
    mut new_game: MessageWriter<NewGame>,
    mut last: ResMut<LastOutcome>,
) {
    let mut current = *state.get();

    for request in requests.read() {
        let target = match *request {
            SessionRequest::Enter(target) => target,
            SessionRequest::NewGame => {
                last.0 = None;
                new_game.write(NewGame);
                SessionState::Playing
            }
        };

        if target == current {
            debug!("session already {target:?}; request dropped");
            continue;
        }

        next.set(target);
        current = target;
    }
}

/// First outcome of the frame wins; the rest are stale once we leave `Playing`.
pub fn finish_on_outcome(
    mut outcomes: MessageReader<GameOutcome>,
    mut next: ResMut<NextState<SessionState>>,
    mut last: ResMut<LastOutcome>,
) {
    let Some(outcome) = outcomes.read().next().copied() else {
        return;
    };
    // Drain so the remainder is not seen next frame.
    outcomes.clear();

    last.0 = Some(outcome.won);
    info!("run finished: {}", if outcome.won { "goal reached" } else { "caught" });
    next.set(SessionState::Finish);
}

fn log_session_state(state: Res<State<SessionState>>) {
    if state.is_changed() {
        info!("session state -> {:?}", state.get());
    }
}

#[cfg(test)]
mod tests;
