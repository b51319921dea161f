//! Enemies: one entity type, two archetypes, a three-state behavior machine.
//!
//! ---------------------------
//! STATE MACHINE
//! ---------------------------
//! `EnemyState` moves only on `Detection` messages addressed to this entity,
//! plus two self-abandon rules inside the chase:
//!
//! ```text
//!             Detection{Seen}            Detection{Lost}
//!   NotSeen ───────────────▶ Seen ─────────────────────▶ Lost
//!      ▲                                                  │
//!      └──── chase abandoned (out of range / blocked) ────┘
//! ```
//!
//! Which state chases is the archetype's only difference
//! (`Archetype::chase_state`). In every other state the chase sound is off and
//! the enemy holds position. Facing the player happens every frame.
//!
//! ---------------------------
//! OWNERSHIP
//! ---------------------------
//! Enemy entities are pre-spawned and recycled by `plugins::population`. The
//! pool flips `PoolSlot` and writes the bundles returned by [`activation`] and
//! [`deactivation`]; this module never spawns or despawns.

use std::f32::consts::FRAC_PI_2;

use avian2d::prelude::*;
use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::math::curve::{Curve, EaseFunction, EasingCurve};
use bevy::prelude::*;

use crate::common::layers::{Layer, obstacle_mask};
use crate::common::spatial::{PhysicsProbe, SpatialProbe};
use crate::common::state::SessionState;
use crate::common::tunables::Tunables;
use crate::plugins::bus::{ChaseAudioCue, Detection, Sighting};
use crate::plugins::player::Player;
use crate::plugins::session::SessionClock;
use crate::plugins::vision;

/// Where pooled enemies wait.
pub const NEUTRAL_POSITION: Vec2 = Vec2::ZERO;
const ENEMY_Z: f32 = 1.0;

// -----------------------------------------------------------------------------
// Components
// -----------------------------------------------------------------------------

#[derive(Component, Debug, Clone, Copy)]
pub struct Enemy;

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Archetype {
    /// Rushes the player while being looked at.
    ChasesWhenSeen,
    /// Creeps up once the player looks away.
    ChasesWhenUnseen,
}

impl Archetype {
    pub const ALL: [Self; 2] = [Self::ChasesWhenSeen, Self::ChasesWhenUnseen];

    /// The one state in which this archetype chases.
    #[inline]
    pub fn chase_state(self) -> EnemyState {
        match self {
            Self::ChasesWhenSeen => EnemyState::Seen,
            Self::ChasesWhenUnseen => EnemyState::Lost,
        }
    }

    fn color(self) -> Color {
        match self {
            Self::ChasesWhenSeen => Color::srgb(0.9, 0.25, 0.25),
            Self::ChasesWhenUnseen => Color::srgb(0.6, 0.3, 0.9),
        }
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EnemyState {
    #[default]
    NotSeen,
    Seen,
    Lost,
}

impl From<Sighting> for EnemyState {
    fn from(s: Sighting) -> Self {
        match s {
            Sighting::Seen => Self::Seen,
            Sighting::Lost => Self::Lost,
        }
    }
}

/// Pool membership. Only `Active` enemies think, move or react to detections.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PoolSlot {
    #[default]
    Pooled,
    Active,
}

impl PoolSlot {
    #[inline]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Whether the chase sound is playing. Edges are published as `ChaseAudioCue`.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChaseAudio {
    pub playing: bool,
}

/// Ease-in multiplier on chase speed, sampled by seconds since activation.
#[derive(Debug, Clone, Copy)]
pub struct SpeedCurve {
    pub start: f32,
    pub ramp_secs: f32,
    pub ease: EaseFunction,
}

impl SpeedCurve {
    pub fn factor(&self, elapsed: f32) -> f32 {
        if self.ramp_secs <= 0.0 {
            return 1.0;
        }
        let t = (elapsed / self.ramp_secs).clamp(0.0, 1.0);
        EasingCurve::new(self.start, 1.0, self.ease).sample_clamped(t)
    }
}

/// Per-enemy movement parameters.
#[derive(Component, Debug, Clone, Copy)]
pub struct Mover {
    pub base_speed: f32,
    /// Beyond this distance a chasing enemy gives up.
    pub vision_range: f32,
    pub probe_ahead: f32,
    pub probe_length: f32,
    pub curve: SpeedCurve,
    /// Session time of the last activation.
    pub activated_at: f32,
}

impl Mover {
    pub fn from_tunables(t: &Tunables) -> Self {
        Self {
            base_speed: t.enemy_speed,
            vision_range: t.vision_range,
            probe_ahead: t.enemy_probe_ahead,
            probe_length: t.enemy_probe_length,
            curve: SpeedCurve {
                start: t.enemy_ramp_start,
                ramp_secs: t.enemy_ramp_secs,
                ease: EaseFunction::QuadraticIn,
            },
            activated_at: 0.0,
        }
    }
}

// -----------------------------------------------------------------------------
// Lifecycle bundles (written by the pool)
// -----------------------------------------------------------------------------

#[inline]
fn active_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Enemy, [Layer::Player, Layer::Obstacle])
}

/// Pooled enemies belong to no layer, so no ray or overlap test can find them.
#[inline]
pub fn dormant_layers() -> CollisionLayers {
    CollisionLayers::new(LayerMask::NONE, LayerMask::NONE)
}

/// Everything a freshly created, still pooled enemy carries.
pub fn dormant_enemy(archetype: Archetype, tunables: &Tunables) -> impl Bundle {
    (
        (
            Name::new(format!("Enemy({archetype:?})")),
            Enemy,
            archetype,
            EnemyState::NotSeen,
            PoolSlot::Pooled,
            ChaseAudio::default(),
            Mover::from_tunables(tunables),
        ),
        Sprite {
            color: archetype.color(),
            custom_size: Some(Vec2::splat(tunables.enemy_radius * 2.0)),
            ..default()
        },
        Transform::from_translation(NEUTRAL_POSITION.extend(ENEMY_Z)),
        Visibility::Hidden,
        RigidBody::Kinematic,
        Collider::circle(tunables.enemy_radius),
        dormant_layers(),
    )
}

/// Component writes that bring a pooled enemy into play at `pos`.
pub fn activation(pos: Vec2, now: f32, tunables: &Tunables) -> impl Bundle {
    let mut mover = Mover::from_tunables(tunables);
    mover.activated_at = now;
    (
        PoolSlot::Active,
        EnemyState::NotSeen,
        ChaseAudio::default(),
        mover,
        Transform::from_translation(pos.extend(ENEMY_Z)),
        Visibility::Visible,
        active_layers(),
    )
}

/// Component writes that park an enemy back in its pool.
pub fn deactivation() -> impl Bundle {
    (
        PoolSlot::Pooled,
        EnemyState::NotSeen,
        ChaseAudio::default(),
        Transform::from_translation(NEUTRAL_POSITION.extend(ENEMY_Z)),
        Visibility::Hidden,
        dormant_layers(),
    )
}

// -----------------------------------------------------------------------------
// Plugin wiring
// -----------------------------------------------------------------------------

pub fn plugin(app: &mut App) {
    app.add_systems(
        Update,
        (
            apply_detection_events.after(vision::scan_vision_cone),
            drive_enemies.after(apply_detection_events),
        )
            .run_if(in_state(SessionState::Playing)),
    );
}

// -----------------------------------------------------------------------------
// Rules
// -----------------------------------------------------------------------------

/// Route each detection to its enemy. Unknown or pooled targets are ignored.
pub fn apply_detection_events(
    mut detections: MessageReader<Detection>,
    mut q: Query<(&mut EnemyState, &PoolSlot), With<Enemy>>,
) {
    for d in detections.read() {
        let Ok((mut state, slot)) = q.get_mut(d.enemy) else {
            continue;
        };
        if !slot.is_active() {
            continue;
        }
        *state = d.sighting.into();
    }
}

/// Inputs shared by every enemy on one frame.
pub struct Frame<'a, P> {
    pub probe: &'a P,
    pub player: Vec2,
    /// Session seconds.
    pub now: f32,
    pub dt: f32,
}

/// One enemy, one frame: act on the current state, then face the player.
pub fn step_enemy<P: SpatialProbe>(
    frame: &Frame<'_, P>,
    archetype: Archetype,
    state: &mut EnemyState,
    tf: &mut Transform,
    audio: &mut ChaseAudio,
    mover: &Mover,
) {
    if *state == archetype.chase_state() {
        chase(frame, state, tf, audio, mover);
    } else {
        audio.playing = false;
    }
    face(tf, frame.player);
}

fn chase<P: SpatialProbe>(
    frame: &Frame<'_, P>,
    state: &mut EnemyState,
    tf: &mut Transform,
    audio: &mut ChaseAudio,
    mover: &Mover,
) {
    let pos = tf.translation.truncate();
    let to_player = frame.player - pos;

    if to_player.length() > mover.vision_range {
        *state = EnemyState::NotSeen;
        return;
    }

    audio.playing = true;

    // Already on top of the player: nowhere to go.
    let Ok(dir) = Dir2::new(to_player) else {
        return;
    };

    let probe_origin = pos + *dir * mover.probe_ahead;
    if frame
        .probe
        .cast_ray(probe_origin, dir, mover.probe_length, obstacle_mask())
        .is_some()
    {
        *state = EnemyState::NotSeen;
        return;
    }

    let speed = mover.base_speed * mover.curve.factor(frame.now - mover.activated_at);
    let step = *dir * speed * frame.dt;
    tf.translation.x += step.x;
    tf.translation.y += step.y;
}

/// Point local +Y at the player.
fn face(tf: &mut Transform, player: Vec2) {
    let d = player - tf.translation.truncate();
    if d.length_squared() < 1e-6 {
        return;
    }
    tf.rotation = Quat::from_rotation_z(d.y.atan2(d.x) - FRAC_PI_2);
}

pub fn drive_enemies(
    probe: PhysicsProbe,
    time: Res<Time>,
    clock: Res<SessionClock>,
    q_player: Query<&Transform, (With<Player>, Without<Enemy>)>,
    mut q: Query<
        (
            Entity,
            &Archetype,
            &mut EnemyState,
            &mut Transform,
            &mut ChaseAudio,
            &Mover,
            &PoolSlot,
        ),
        (With<Enemy>, Without<Player>),
    >,
    mut cues: MessageWriter<ChaseAudioCue>,
) {
    let Ok(player_tf) = q_player.single() else {
        debug!("drive_enemies: no single Player");
        return;
    };

    let frame = Frame {
        probe: &probe,
        player: player_tf.translation.truncate(),
        now: clock.elapsed,
        dt: time.delta_secs(),
    };

    for (e, archetype, mut state, mut tf, mut audio, mover, slot) in &mut q {
        if !slot.is_active() {
            continue;
        }

        let was_playing = audio.playing;
        step_enemy(&frame, *archetype, &mut state, &mut tf, &mut audio, mover);

        if audio.playing != was_playing {
            cues.write(ChaseAudioCue {
                enemy: e,
                playing: audio.playing,
            });
        }
    }
}
