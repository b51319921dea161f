use bevy::prelude::*;

use crate::common::state::SessionState;
use crate::common::test_utils::{init_channels, read_messages, run_system_once};
use crate::plugins::bus::{GameOutcome, NewGame, SessionRequest};

use super::LastOutcome;

fn world_in(state: SessionState) -> World {
    let mut world = World::new();
    init_channels(&mut world);
    world.insert_resource(State::new(state));
    world.init_resource::<NextState<SessionState>>();
    world.init_resource::<LastOutcome>();
    world
}

fn pending(world: &World) -> Option<SessionState> {
    match world.resource::<NextState<SessionState>>() {
        NextState::Pending(s) => Some(*s),
        _ => None,
    }
}

#[test]
fn request_for_current_state_is_dropped() {
    let mut world = world_in(SessionState::Playing);
    world.write_message(SessionRequest::Enter(SessionState::Playing));

    run_system_once(&mut world, super::handle_session_requests);

    assert_eq!(pending(&world), None);
}

#[test]
fn request_for_other_state_is_queued() {
    let mut world = world_in(SessionState::Playing);
    world.write_message(SessionRequest::Enter(SessionState::PauseMenu));

    run_system_once(&mut world, super::handle_session_requests);

    assert_eq!(pending(&world), Some(SessionState::PauseMenu));
}

#[test]
fn new_game_broadcasts_and_enters_playing() {
    let mut world = world_in(SessionState::MainMenu);
    world.resource_mut::<LastOutcome>().0 = Some(false);
    world.write_message(SessionRequest::NewGame);

    run_system_once(&mut world, super::handle_session_requests);

    assert_eq!(pending(&world), Some(SessionState::Playing));
    assert_eq!(read_messages::<NewGame>(&mut world).len(), 1);
    assert_eq!(world.resource::<LastOutcome>().0, None);
}

#[test]
fn outcome_finishes_the_run_and_is_recorded() {
    let mut world = world_in(SessionState::Playing);
    world.write_message(GameOutcome { won: true });
    world.write_message(GameOutcome { won: false });

    run_system_once(&mut world, super::finish_on_outcome);

    assert_eq!(pending(&world), Some(SessionState::Finish));
    assert_eq!(world.resource::<LastOutcome>().0, Some(true));
}

#[test]
fn no_outcome_no_transition() {
    let mut world = world_in(SessionState::Playing);

    run_system_once(&mut world, super::finish_on_outcome);

    assert_eq!(pending(&world), None);
    assert_eq!(world.resource::<LastOutcome>().0, None);
}

#[test]
fn new_game_rewinds_session_clock() {
    let mut world = world_in(SessionState::Playing);
    world.insert_resource(super::SessionClock { elapsed: 42.0 });
    world.write_message(NewGame);

    run_system_once(&mut world, super::reset_clock_on_new_game);

    assert_eq!(world.resource::<super::SessionClock>().elapsed, 0.0);
}
