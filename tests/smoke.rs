mod common;

use bevy::prelude::*;
use stealth_chase::common::state::SessionState;
use stealth_chase::plugins::enemies::{Enemy, PoolSlot};
use stealth_chase::plugins::player::Player;
use stealth_chase::plugins::population::{ActiveRoster, EnemyPools};
use stealth_chase::plugins::session::{LastOutcome, SessionClock};

#[test]
fn boots_and_ticks() {
    let mut app = common::app_headless();

    for _ in 0..3 {
        app.update();
    }

    assert_eq!(common::state(&app), SessionState::MainMenu);
    let players = app
        .world_mut()
        .query_filtered::<(), With<Player>>()
        .iter(app.world())
        .count();
    assert_eq!(players, 1);

    let pooled = app
        .world_mut()
        .query::<(&Enemy, &PoolSlot)>()
        .iter(app.world())
        .filter(|(_, slot)| !slot.is_active())
        .count();
    assert_eq!(pooled, 20);
}

#[test]
fn clock_only_runs_while_playing() {
    let mut app = common::app_headless();
    for _ in 0..5 {
        app.update();
    }
    assert_eq!(app.world().resource::<SessionClock>().elapsed, 0.0);

    let mut app = common::app_playing();
    let before = app.world().resource::<SessionClock>().elapsed;
    app.update();
    assert!(app.world().resource::<SessionClock>().elapsed > before);
}

#[test]
fn enemies_spawn_once_the_interval_passes() {
    let mut app = common::app_playing();
    assert!(app.world().resource::<ActiveRoster>().is_empty());

    app.world_mut().resource_mut::<SessionClock>().elapsed = 5.0;
    let mut spawned = false;
    for _ in 0..120 {
        app.update();
        if !app.world().resource::<ActiveRoster>().is_empty() {
            spawned = true;
            break;
        }
    }
    assert!(spawned, "no enemy spawned after the first interval");
    assert_eq!(app.world().resource::<ActiveRoster>().len(), 1);
}

#[test]
fn finish_drains_the_roster() {
    use stealth_chase::plugins::bus::GameOutcome;

    let mut app = common::app_playing();
    app.world_mut().resource_mut::<SessionClock>().elapsed = 5.0;
    for _ in 0..120 {
        app.update();
        if !app.world().resource::<ActiveRoster>().is_empty() {
            break;
        }
    }

    app.world_mut().write_message(GameOutcome { won: false });
    for _ in 0..2 {
        app.update();
    }

    assert_eq!(common::state(&app), SessionState::Finish);
    assert_eq!(app.world().resource::<LastOutcome>().0, Some(false));
    assert!(app.world().resource::<ActiveRoster>().is_empty());

    let active = app
        .world_mut()
        .query::<&PoolSlot>()
        .iter(app.world())
        .filter(|slot| slot.is_active())
        .count();
    assert_eq!(active, 0);

    let pools = app.world().resource::<EnemyPools>();
    let parked: usize = stealth_chase::plugins::enemies::Archetype::ALL
        .into_iter()
        .map(|a| pools.get(a).free_count())
        .sum();
    assert_eq!(parked, 20);
}
