//! Collision layers.

use avian2d::prelude::*;

#[derive(PhysicsLayer, Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    #[default]
    Default,
    Floor,
    Obstacle,
    Player,
    Enemy,
    Goal,
}

/// What the vision cone can hit. Obstacles are included so walls block sight.
#[inline]
pub fn detectable_mask() -> LayerMask {
    [Layer::Obstacle, Layer::Enemy].into()
}

/// Of the detectable hits, which ones count as a sighting.
#[inline]
pub fn enemy_mask() -> LayerMask {
    Layer::Enemy.into()
}

#[inline]
pub fn obstacle_mask() -> LayerMask {
    Layer::Obstacle.into()
}

#[inline]
pub fn floor_mask() -> LayerMask {
    Layer::Floor.into()
}

#[inline]
pub fn goal_mask() -> LayerMask {
    Layer::Goal.into()
}
