//! Tunable gameplay constants.
//!
//! Distances are in world units (pixels); `pixels_per_meter` converts for physics.

use bevy::prelude::*;

#[derive(Resource, Debug, Clone)]
pub struct Tunables {
    pub pixels_per_meter: f32,

    pub player_speed: f32,
    pub player_radius: f32,
    /// Exponential smoothing rate for turning toward the cursor.
    pub player_turn_rate: f32,
    /// Movement is blocked if an obstacle is this close along the move direction.
    pub player_wall_probe: f32,

    pub vision_range: f32,
    pub vision_rays: u32,
    pub vision_angle_deg: f32,

    pub enemy_speed: f32,
    pub enemy_radius: f32,
    /// Seconds for the chase ease-in to reach full speed.
    pub enemy_ramp_secs: f32,
    /// Speed factor at the start of the ramp.
    pub enemy_ramp_start: f32,
    pub enemy_probe_ahead: f32,
    pub enemy_probe_length: f32,

    pub spawn_inner_radius: f32,
    pub spawn_outer_radius: f32,
    pub spawn_clearance_radius: f32,
    /// Probability that a spawn picks `Archetype::ChasesWhenUnseen`.
    pub archetype_bias: f32,
    pub leave_range_radius: f32,

    pub pool_prewarm: usize,
    pub pool_capacity: usize,

    pub rng_seed: u64,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            pixels_per_meter: 20.0,

            player_speed: 220.0,
            player_radius: 13.0,
            player_turn_rate: 10.0,
            player_wall_probe: 4.0,

            vision_range: 240.0,
            vision_rays: 15,
            vision_angle_deg: 30.0,

            enemy_speed: 160.0,
            enemy_radius: 14.0,
            enemy_ramp_secs: 2.0,
            enemy_ramp_start: 0.2,
            enemy_probe_ahead: 20.0,
            enemy_probe_length: 2.0,

            spawn_inner_radius: 280.0,
            spawn_outer_radius: 460.0,
            spawn_clearance_radius: 10.0,
            archetype_bias: 0.5,
            leave_range_radius: 560.0,

            pool_prewarm: 10,
            pool_capacity: 15,

            rng_seed: 0x5EED_CA7,
        }
    }
}
