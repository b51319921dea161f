mod common;

use bevy::prelude::*;
use stealth_chase::common::state::SessionState;
use stealth_chase::plugins::bus::SessionRequest;
use stealth_chase::plugins::player::Player;
use stealth_chase::plugins::population::{ActiveDifficulty, ActiveRoster, SpawnSchedule};
use stealth_chase::plugins::session::{LastOutcome, SessionClock};
use stealth_chase::plugins::world::{GOAL_POS, PLAYER_START};

fn player_pos(app: &mut App) -> Vec2 {
    let world = app.world_mut();
    let mut q = world.query_filtered::<&Transform, With<Player>>();
    q.single(world).unwrap().translation.truncate()
}

fn move_player(app: &mut App, to: Vec2) {
    let world = app.world_mut();
    let mut q = world.query_filtered::<&mut Transform, With<Player>>();
    q.single_mut(world).unwrap().translation = to.extend(1.0);
}

#[test]
fn pause_and_resume() {
    let mut app = common::app_playing();

    common::request(&mut app, SessionRequest::Enter(SessionState::PauseMenu));
    app.update();
    app.update();
    assert_eq!(common::state(&app), SessionState::PauseMenu);

    let frozen = app.world().resource::<SessionClock>().elapsed;
    for _ in 0..5 {
        app.update();
    }
    assert_eq!(app.world().resource::<SessionClock>().elapsed, frozen);

    common::request(&mut app, SessionRequest::Enter(SessionState::Playing));
    app.update();
    app.update();
    assert_eq!(common::state(&app), SessionState::Playing);
}

#[test]
fn reaching_the_goal_wins() {
    let mut app = common::app_playing();

    move_player(&mut app, GOAL_POS);
    for _ in 0..4 {
        app.update();
        if common::state(&app) == SessionState::Finish {
            break;
        }
    }

    assert_eq!(common::state(&app), SessionState::Finish);
    assert_eq!(app.world().resource::<LastOutcome>().0, Some(true));
}

#[test]
fn new_game_after_finish_resets_the_run() {
    let mut app = common::app_playing();
    move_player(&mut app, GOAL_POS);
    for _ in 0..4 {
        app.update();
    }
    assert_eq!(common::state(&app), SessionState::Finish);

    common::request(&mut app, SessionRequest::NewGame);
    app.update();
    app.update();

    assert_eq!(common::state(&app), SessionState::Playing);
    assert_eq!(app.world().resource::<LastOutcome>().0, None);
    assert!(app.world().resource::<ActiveRoster>().is_empty());
    assert!(app.world().resource::<SessionClock>().elapsed < 0.1);
    let interval = app.world().resource::<ActiveDifficulty>().profile.spawn_interval_secs;
    assert_eq!(app.world().resource::<SpawnSchedule>().next_spawn_at, interval);
    assert!(player_pos(&mut app).distance(PLAYER_START) < 1.0);
}
