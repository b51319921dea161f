//! Vision sensor: a fan of rays from the player's facing.
//!
//! Each `Playing` frame the cone is swept once. Rays stop at the first
//! detectable collider (obstacles or enemies), so walls hide what is behind
//! them. The enemies struck this frame are compared with last frame's:
//!
//! ```text
//!   current \ previous  ──▶  Detection { Seen }
//!   previous \ current  ──▶  Detection { Lost }
//!   previous := current
//! ```
//!
//! An enemy that stays in view produces exactly one `Seen`, and one `Lost` on
//! the first frame it drops out. The sensor never owns enemies; it only stores
//! their entity ids.

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::platform::collections::HashSet;
use bevy::prelude::*;

use crate::common::layers::{detectable_mask, enemy_mask};
use crate::common::spatial::{PhysicsProbe, SpatialProbe};
use crate::common::state::SessionState;
use crate::plugins::bus::{Detection, NewGame, Sighting};

/// Cone geometry. Lives on the player.
#[derive(Component, Debug, Clone, Copy)]
pub struct VisionCone {
    pub range: f32,
    pub rays: u32,
    /// Full opening angle in radians, split evenly either side of forward.
    pub max_angle: f32,
}

impl VisionCone {
    pub fn from_degrees(range: f32, rays: u32, max_angle_deg: f32) -> Self {
        Self {
            range,
            rays,
            max_angle: max_angle_deg.to_radians(),
        }
    }
}

/// Which enemies were in view on the last completed sweep.
#[derive(Component, Debug, Default, Clone)]
pub struct DetectionTracker {
    previous: HashSet<Entity>,
    current: HashSet<Entity>,
}

impl DetectionTracker {
    fn begin_sweep(&mut self) {
        self.current.clear();
    }

    fn mark(&mut self, enemy: Entity) {
        self.current.insert(enemy);
    }

    /// Emit edges, then roll `current` into `previous`.
    fn finish_sweep(&mut self, mut emit: impl FnMut(Detection)) {
        for &enemy in self.current.difference(&self.previous) {
            emit(Detection { enemy, sighting: Sighting::Seen });
        }
        for &enemy in self.previous.difference(&self.current) {
            emit(Detection { enemy, sighting: Sighting::Lost });
        }
        std::mem::swap(&mut self.previous, &mut self.current);
        self.current.clear();
    }

    /// Drop all memory without emitting anything (new run).
    pub fn forget(&mut self) {
        self.previous.clear();
        self.current.clear();
    }

    pub fn in_view(&self, enemy: Entity) -> bool {
        self.previous.contains(&enemy)
    }
}

pub fn plugin(app: &mut App) {
    app.add_systems(
        Update,
        (
            forget_on_new_game,
            scan_vision_cone
                .after(forget_on_new_game)
                .run_if(in_state(SessionState::Playing)),
        ),
    );
}

/// Unit directions of the cone's rays, left edge to right edge.
///
/// Ray `i` sits at `-max_angle/2 + i * max_angle/(rays-1)`. A single ray points
/// straight ahead.
pub fn cone_directions(forward: Vec2, max_angle: f32, rays: u32) -> impl Iterator<Item = Dir2> {
    let (start, step) = if rays > 1 {
        (-max_angle * 0.5, max_angle / (rays - 1) as f32)
    } else {
        (0.0, 0.0)
    };

    (0..rays.max(1)).filter_map(move |i| {
        let offset = start + step * i as f32;
        Dir2::new(Vec2::from_angle(offset).rotate(forward)).ok()
    })
}

/// One full sweep: cast, mark, emit edges.
pub fn sweep<P: SpatialProbe>(
    probe: &P,
    origin: Vec2,
    forward: Vec2,
    cone: &VisionCone,
    tracker: &mut DetectionTracker,
    emit: impl FnMut(Detection),
) {
    tracker.begin_sweep();

    let detectable = detectable_mask();
    let enemies = enemy_mask();

    for dir in cone_directions(forward, cone.max_angle, cone.rays) {
        let Some(hit) = probe.cast_ray(origin, dir, cone.range, detectable) else {
            continue;
        };
        if hit.is_on(enemies) {
            tracker.mark(hit.entity);
        }
    }

    tracker.finish_sweep(emit);
}

pub fn scan_vision_cone(
    probe: PhysicsProbe,
    mut q: Query<(&Transform, &VisionCone, &mut DetectionTracker)>,
    mut writer: MessageWriter<Detection>,
) {
    for (tf, cone, mut tracker) in &mut q {
        let origin = tf.translation.truncate();
        let forward = (tf.rotation * Vec3::Y).truncate();

        sweep(&probe, origin, forward, cone, &mut tracker, |d| {
            writer.write(d);
        });
    }
}

fn forget_on_new_game(mut new_game: MessageReader<NewGame>, mut q: Query<&mut DetectionTracker>) {
    if new_game.read().count() == 0 {
        return;
    }
    for mut tracker in &mut q {
        tracker.forget();
    }
}
