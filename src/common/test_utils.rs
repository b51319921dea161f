//! Test helpers.
//!
//! Bevy provides `World::run_system_once` (via the `RunSystemOnce` trait) for quickly
//! executing a system in tests without building a full schedule. Systems that use
//! `Commands` enqueue structural changes, so we `flush()` after running to apply them
//! before assertions.
//!
//! [`FakeSpace`] answers [`SpatialProbe`] questions with closed-form geometry so tests
//! never need the physics step to have populated avian's spatial structures.

use avian2d::prelude::LayerMask;
use bevy::ecs::message::{MessageReader, Messages};
use bevy::ecs::system::{IntoSystem, RunSystemOnce};
use bevy::prelude::*;

use crate::common::layers::Layer;
use crate::common::spatial::{ProbeHit, SpatialProbe};
use crate::plugins::bus::{
    ChaseAudioCue, Detection, DifficultyChanged, EnemyLeftRange, GameOutcome, NewGame,
    SessionRequest,
};

/// Run a system once on the given world, then flush deferred commands.
/// Returns the system output.
pub fn run_system_once<T, Out, Marker>(world: &mut World, system: T) -> Out
where
    T: IntoSystem<(), Out, Marker>,
{
    let out = world.run_system_once(system).expect("system run failed");
    world.flush();
    out
}

/// Register every bus channel on a bare `World`.
pub fn init_channels(world: &mut World) {
    world.init_resource::<Messages<Detection>>();
    world.init_resource::<Messages<EnemyLeftRange>>();
    world.init_resource::<Messages<GameOutcome>>();
    world.init_resource::<Messages<DifficultyChanged>>();
    world.init_resource::<Messages<SessionRequest>>();
    world.init_resource::<Messages<NewGame>>();
    world.init_resource::<Messages<ChaseAudioCue>>();
}

/// Everything currently buffered on a channel (a fresh reader sees both buffers).
pub fn read_messages<M: Message + Clone>(world: &mut World) -> Vec<M> {
    run_system_once(world, |mut reader: MessageReader<M>| {
        reader.read().cloned().collect::<Vec<M>>()
    })
}

pub fn clear_messages<M: Message>(world: &mut World) {
    world.resource_mut::<Messages<M>>().clear();
}

/// Slack for closed-form surface hits computed with `f32`.
const FAKE_EPSILON: f32 = 1e-2;

#[derive(Clone, Copy, Debug)]
enum FakeShape {
    Circle { center: Vec2, radius: f32 },
    Rect { center: Vec2, half: Vec2 },
}

#[derive(Clone, Copy, Debug)]
struct FakeCollider {
    entity: Entity,
    layer: Layer,
    shape: FakeShape,
}

/// Analytic stand-in for the physics world.
#[derive(Default, Debug, Clone)]
pub struct FakeSpace {
    colliders: Vec<FakeCollider>,
}

impl FakeSpace {
    pub fn with_circle(mut self, entity: Entity, layer: Layer, center: Vec2, radius: f32) -> Self {
        self.colliders.push(FakeCollider {
            entity,
            layer,
            shape: FakeShape::Circle { center, radius },
        });
        self
    }

    pub fn with_rect(mut self, entity: Entity, layer: Layer, center: Vec2, size: Vec2) -> Self {
        self.colliders.push(FakeCollider {
            entity,
            layer,
            shape: FakeShape::Rect { center, half: size * 0.5 },
        });
        self
    }

    /// A huge floor so every candidate point is on terrain.
    pub fn with_open_floor(self) -> Self {
        self.with_rect(Entity::PLACEHOLDER, Layer::Floor, Vec2::ZERO, Vec2::splat(1.0e6))
    }

    pub fn move_circle(&mut self, entity: Entity, to: Vec2) {
        for c in &mut self.colliders {
            if c.entity == entity {
                if let FakeShape::Circle { center, .. } = &mut c.shape {
                    *center = to;
                }
            }
        }
    }

    pub fn remove(&mut self, entity: Entity) {
        self.colliders.retain(|c| c.entity != entity);
    }

    fn matching(&self, mask: LayerMask) -> impl Iterator<Item = &FakeCollider> {
        self.colliders
            .iter()
            .filter(move |c| mask.has_all(c.layer))
    }
}

fn ray_distance(shape: FakeShape, origin: Vec2, dir: Vec2) -> Option<f32> {
    match shape {
        FakeShape::Circle { center, radius } => {
            let oc = origin - center;
            let c = oc.length_squared() - radius * radius;
            if c <= 0.0 {
                return Some(0.0);
            }
            let b = oc.dot(dir);
            let disc = b * b - c;
            if disc < 0.0 {
                return None;
            }
            let t = -b - disc.sqrt();
            (t >= 0.0).then_some(t)
        }
        FakeShape::Rect { center, half } => {
            let min = center - half;
            let max = center + half;
            let mut t_near = f32::NEG_INFINITY;
            let mut t_far = f32::INFINITY;
            let axes = [(origin.x, dir.x, min.x, max.x), (origin.y, dir.y, min.y, max.y)];
            for (o, d, lo, hi) in axes {
                if d.abs() < f32::EPSILON {
                    if o < lo || o > hi {
                        return None;
                    }
                    continue;
                }
                let t1 = (lo - o) / d;
                let t2 = (hi - o) / d;
                t_near = t_near.max(t1.min(t2));
                t_far = t_far.min(t1.max(t2));
            }
            if t_near > t_far || t_far < 0.0 {
                return None;
            }
            Some(t_near.max(0.0))
        }
    }
}

impl SpatialProbe for FakeSpace {
    fn cast_ray(
        &self,
        origin: Vec2,
        direction: Dir2,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<ProbeHit> {
        self.matching(mask)
            .filter_map(|c| {
                let t = ray_distance(c.shape, origin, *direction)?;
                (t <= max_distance + FAKE_EPSILON).then_some(ProbeHit {
                    entity: c.entity,
                    distance: t,
                    memberships: c.layer.into(),
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn point_on(&self, point: Vec2, mask: LayerMask) -> bool {
        self.matching(mask).any(|c| match c.shape {
            FakeShape::Circle { center, radius } => point.distance(center) <= radius,
            FakeShape::Rect { center, half } => {
                let d = (point - center).abs();
                d.x <= half.x && d.y <= half.y
            }
        })
    }

    fn disc_overlaps(&self, center: Vec2, radius: f32, mask: LayerMask) -> bool {
        self.matching(mask).any(|c| match c.shape {
            FakeShape::Circle { center: cc, radius: cr } => center.distance(cc) <= radius + cr,
            FakeShape::Rect { center: rc, half } => {
                let closest = center.clamp(rc - half, rc + half);
                closest.distance(center) <= radius
            }
        })
    }
}
