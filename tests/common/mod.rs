//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` provides the core ECS runtime.
//! - `stealth_chase::game::configure_headless` installs the gameplay plugins.
//! - Time advances by a fixed 1/60 s per `update()` so physics steps are
//!   predictable.

#![allow(dead_code)]

use std::time::Duration;

use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::scene::ScenePlugin;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

use stealth_chase::common::state::SessionState;
use stealth_chase::plugins::bus::SessionRequest;

pub const FRAME: Duration = Duration::from_micros(16_667);

pub fn app_headless() -> App {
    let mut app = App::new();

    // AssetPlugin + ScenePlugin so SceneSpawner exists for avian.
    app.add_plugins((
        MinimalPlugins,
        StatesPlugin,
        AssetPlugin::default(),
        ScenePlugin,
    ));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(FRAME));

    stealth_chase::game::configure_headless(&mut app);
    // `App::run` would do this; manual `update()` loops must finish plugins.
    app.finish();
    app.cleanup();
    app
}

pub fn state(app: &App) -> SessionState {
    *app.world().resource::<State<SessionState>>().get()
}

pub fn request(app: &mut App, request: SessionRequest) {
    app.world_mut().write_message(request);
}

/// Boot, let physics index the arena, then start a new game.
pub fn app_playing() -> App {
    let mut app = app_headless();
    for _ in 0..3 {
        app.update();
    }
    request(&mut app, SessionRequest::NewGame);
    for _ in 0..3 {
        app.update();
    }
    assert_eq!(state(&app), SessionState::Playing);
    app
}
