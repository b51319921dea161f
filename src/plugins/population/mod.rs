//! Population manager: decides when and where enemies appear, and parks them
//! again when they wander off, the round ends, or a new game starts.
//!
//! ```text
//!   Update, Playing only
//!     spawn_enemies          clock >= next_spawn_at && roster < cap
//!                            -> sample annulus -> validate -> acquire
//!     release_out_of_range   EnemyLeftRange -> release
//!   Update, any state
//!     apply_difficulty_changes
//!     restart_on_new_game    NewGame -> release all, schedule = interval
//!   OnEnter(Finish)          release all
//!   Last                     AppExit -> despawn every pooled entity
//! ```
//!
//! All pool and roster mutation goes through [`Population`] so the roster and
//! the free lists can never disagree.

pub mod difficulty;
pub mod pool;


use std::f32::consts::TAU;

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::common::layers::{floor_mask, obstacle_mask};
use crate::common::spatial::{PhysicsProbe, SpatialProbe};
use crate::common::state::SessionState;
use crate::common::tunables::Tunables;
use crate::plugins::bus::{ChaseAudioCue, EnemyLeftRange, NewGame};
use crate::plugins::enemies::{Archetype, ChaseAudio, Enemy, activation, deactivation};
use crate::plugins::leave_range;
use crate::plugins::player::Player;
use crate::plugins::session::{self, SessionClock};

pub use difficulty::{
    ActiveDifficulty, DifficultyProfile, DifficultyTable, apply_difficulty_changes,
};
pub use pool::{ActiveRoster, EnemyPool, EnemyPools, init_enemy_pools};

/// Session time at which the next spawn attempt is allowed.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct SpawnSchedule {
    pub next_spawn_at: f32,
}

impl SpawnSchedule {
    /// First spawn one interval after the session clock starts.
    pub fn starting(profile: DifficultyProfile) -> Self {
        Self {
            next_spawn_at: profile.spawn_interval_secs,
        }
    }
}

#[derive(Resource, Debug)]
pub struct SpawnRng(pub StdRng);

impl SpawnRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

pub fn plugin(app: &mut App) {
    let (capacity, seed) = {
        let t = app.world().resource::<Tunables>();
        (t.pool_capacity, t.rng_seed)
    };
    let difficulty = ActiveDifficulty::default();

    app.init_resource::<DifficultyTable>()
        .insert_resource(difficulty)
        .insert_resource(SpawnSchedule::starting(difficulty.profile))
        .insert_resource(SpawnRng::seeded(seed))
        .insert_resource(EnemyPools::new(capacity))
        .init_resource::<ActiveRoster>();

    app.add_systems(Startup, init_enemy_pools);
    app.add_systems(
        Update,
        (
            apply_difficulty_changes,
            restart_on_new_game.after(session::reset_clock_on_new_game),
            (
                spawn_enemies.after(session::tick_session_clock),
                release_enemies_out_of_range.after(leave_range::detect_enemies_leaving_range),
            )
                .run_if(in_state(SessionState::Playing)),
        ),
    );
    app.add_systems(OnEnter(SessionState::Finish), drain_on_finish);
    app.add_systems(Last, teardown_enemy_pools);
}

// -----------------------------------------------------------------------------
// Population access
// -----------------------------------------------------------------------------

/// Uniform angle, uniform distance in `[inner, outer]` around `center`.
pub fn annulus_point(rng: &mut impl Rng, center: Vec2, inner: f32, outer: f32) -> Vec2 {
    let angle = rng.gen_range(0.0..TAU);
    let distance = rng.gen_range(inner..=outer);
    center + Vec2::from_angle(angle) * distance
}

/// `bias` is the chance of `ChasesWhenUnseen`.
pub fn pick_archetype(rng: &mut impl Rng, bias: f32) -> Archetype {
    if rng.gen_bool(f64::from(bias.clamp(0.0, 1.0))) {
        Archetype::ChasesWhenUnseen
    } else {
        Archetype::ChasesWhenSeen
    }
}

/// Walkable floor under the point and no obstacle within `clearance`.
pub fn is_valid_spawn_point<P: SpatialProbe>(probe: &P, point: Vec2, clearance: f32) -> bool {
    probe.point_on(point, floor_mask()) && !probe.disc_overlaps(point, clearance, obstacle_mask())
}

#[derive(SystemParam)]
pub struct Population<'w, 's> {
    commands: Commands<'w, 's>,
    pools: ResMut<'w, EnemyPools>,
    roster: ResMut<'w, ActiveRoster>,
    schedule: ResMut<'w, SpawnSchedule>,
    difficulty: Res<'w, ActiveDifficulty>,
    rng: ResMut<'w, SpawnRng>,
    tunables: Res<'w, Tunables>,
    audio: Query<'w, 's, &'static ChaseAudio, With<Enemy>>,
    cues: MessageWriter<'w, ChaseAudioCue>,
}

impl Population<'_, '_> {
    pub fn active_count(&self) -> usize {
        self.roster.len()
    }

    /// Take an instance of `archetype` from its pool and put it into play.
    pub fn acquire(&mut self, archetype: Archetype, pos: Vec2, now: f32) -> Entity {
        let e = self
            .pools
            .get_mut(archetype)
            .take(&mut self.commands, &self.tunables);
        self.commands.entity(e).insert(activation(pos, now, &self.tunables));
        self.roster.insert(e, archetype);
        debug!("spawned {archetype:?} {e} at {pos}");
        e
    }

    /// Park `enemy` again. Returns false if it was not active.
    pub fn release(&mut self, enemy: Entity) -> bool {
        let Some(archetype) = self.roster.remove(enemy) else {
            debug!("release of inactive enemy {enemy} ignored");
            return false;
        };
        if self.audio.get(enemy).is_ok_and(|a| a.playing) {
            self.cues.write(ChaseAudioCue { enemy, playing: false });
        }
        self.commands.entity(enemy).insert(deactivation());
        self.pools.get_mut(archetype).park(enemy);
        true
    }

    pub fn release_all(&mut self) -> usize {
        let active: Vec<Entity> = self.roster.iter().collect();
        active.into_iter().filter(|&e| self.release(e)).count()
    }

    /// Push the next spawn one full interval past session time zero.
    pub fn restart_schedule(&mut self) {
        *self.schedule = SpawnSchedule::starting(self.difficulty.profile);
    }

    /// One spawn decision. A rejected candidate leaves the schedule untouched
    /// so the next tick tries again.
    pub fn tick<P: SpatialProbe>(&mut self, probe: &P, player: Vec2, now: f32) -> Option<Entity> {
        if now < self.schedule.next_spawn_at {
            return None;
        }
        if self.roster.len() >= self.difficulty.profile.max_enemy_count {
            return None;
        }

        let (inner, outer) = (self.tunables.spawn_inner_radius, self.tunables.spawn_outer_radius);
        let candidate = annulus_point(&mut self.rng.0, player, inner, outer);
        if !is_valid_spawn_point(probe, candidate, self.tunables.spawn_clearance_radius) {
            debug!("spawn candidate {candidate} rejected");
            return None;
        }

        let archetype = pick_archetype(&mut self.rng.0, self.tunables.archetype_bias);
        let e = self.acquire(archetype, candidate, now);
        self.schedule.next_spawn_at = now + self.difficulty.profile.spawn_interval_secs;
        Some(e)
    }
}

// -----------------------------------------------------------------------------
// Systems
// -----------------------------------------------------------------------------

pub fn spawn_enemies(
    probe: PhysicsProbe,
    clock: Res<SessionClock>,
    q_player: Query<&Transform, With<Player>>,
    mut population: Population,
) {
    let Ok(player) = q_player.single() else {
        debug!("no player; skipping spawn tick");
        return;
    };
    population.tick(&probe, player.translation.truncate(), clock.elapsed);
}

pub fn release_enemies_out_of_range(
    mut left: MessageReader<EnemyLeftRange>,
    mut population: Population,
) {
    for msg in left.read() {
        if population.release(msg.enemy) {
            debug!("enemy {} left range", msg.enemy);
        }
    }
}

pub fn drain_on_finish(mut population: Population) {
    let n = population.release_all();
    info!("round over; {n} enemies returned to their pools");
}

pub fn restart_on_new_game(mut new_game: MessageReader<NewGame>, mut population: Population) {
    if new_game.read().count() == 0 {
        return;
    }
    population.release_all();
    population.restart_schedule();
}

/// Despawn every pooled instance once the app is shutting down.
pub fn teardown_enemy_pools(
    mut exit: MessageReader<AppExit>,
    mut commands: Commands,
    mut pools: ResMut<EnemyPools>,
    mut roster: ResMut<ActiveRoster>,
) {
    if exit.read().count() == 0 {
        return;
    }
    roster.clear();
    for e in pools.drain_members() {
        commands.entity(e).despawn();
    }
}
