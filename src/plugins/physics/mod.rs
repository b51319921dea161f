//! Physics setup: top-down (no gravity), pixel length unit, and a physics
//! clock that only runs while a round is being played.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::state::SessionState;
use crate::common::tunables::Tunables;

pub fn plugin(app: &mut App) {
    let ppm = app.world().resource::<Tunables>().pixels_per_meter;
    app.add_plugins(PhysicsPlugins::default().with_length_unit(ppm));
    app.insert_resource(Gravity(Vec2::ZERO));

    app.add_systems(OnEnter(SessionState::Playing), resume_physics)
        .add_systems(OnExit(SessionState::Playing), pause_physics);
}

fn resume_physics(mut time: ResMut<Time<Physics>>) {
    time.unpause();
}

fn pause_physics(mut time: ResMut<Time<Physics>>) {
    time.pause();
}
