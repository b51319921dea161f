//! Feature plugins.

use bevy::prelude::*;

pub mod bus;
pub mod controls;
pub mod core;
pub mod enemies;
pub mod leave_range;
pub mod physics;
pub mod player;
pub mod population;
pub mod session;
pub mod vision;
pub mod world;

// Render-only
pub mod camera;
pub mod lighting;

/// Register gameplay plugins that work in headless tests.
pub fn register_gameplay(app: &mut App) {
    core::plugin(app);
    bus::plugin(app);
    physics::plugin(app);
    session::plugin(app);
    controls::plugin(app);
    world::plugin(app);
    player::plugin(app);
    vision::plugin(app);
    enemies::plugin(app);
    leave_range::plugin(app);
    population::plugin(app);
}

/// Register render-only plugins (requires DefaultPlugins / render infra).
pub fn register_render(app: &mut App) {
    lighting::plugin(app);
    camera::plugin(app);
}

