//! Spatial-query seam.
//!
//! Gameplay code asks geometric questions ("what does this ray hit first?",
//! "is this point on the floor?", "does anything overlap this disc?") through
//! [`SpatialProbe`]. In the running game the answers come from avian's
//! `SpatialQuery`; unit tests answer them analytically with a fake space, so the
//! decision logic never depends on the physics step having run.

use avian2d::prelude::*;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

/// First thing a ray struck.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProbeHit {
    pub entity: Entity,
    pub distance: f32,
    pub memberships: LayerMask,
}

impl ProbeHit {
    #[inline]
    pub fn is_on(&self, mask: LayerMask) -> bool {
        (self.memberships & mask) != LayerMask::NONE
    }
}

pub trait SpatialProbe {
    /// Closest hit among colliders whose memberships intersect `mask`,
    /// with `distance <= max_distance`.
    fn cast_ray(
        &self,
        origin: Vec2,
        direction: Dir2,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<ProbeHit>;

    /// Whether `point` lies inside any collider on `mask`.
    fn point_on(&self, point: Vec2, mask: LayerMask) -> bool;

    /// Whether any collider on `mask` overlaps the disc.
    fn disc_overlaps(&self, center: Vec2, radius: f32, mask: LayerMask) -> bool;
}

/// Physics-backed probe. Use it as a system parameter.
#[derive(SystemParam)]
pub struct PhysicsProbe<'w, 's> {
    spatial: SpatialQuery<'w, 's>,
    layers: Query<'w, 's, &'static CollisionLayers>,
}

impl SpatialProbe for PhysicsProbe<'_, '_> {
    fn cast_ray(
        &self,
        origin: Vec2,
        direction: Dir2,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<ProbeHit> {
        let filter = SpatialQueryFilter::from_mask(mask);
        let hit = self.spatial.cast_ray(origin, direction, max_distance, true, &filter)?;

        // Colliders without explicit layers live on the default layer only.
        let memberships = self
            .layers
            .get(hit.entity)
            .map(|l| l.memberships)
            .unwrap_or(LayerMask::DEFAULT);

        Some(ProbeHit {
            entity: hit.entity,
            distance: hit.distance,
            memberships,
        })
    }

    fn point_on(&self, point: Vec2, mask: LayerMask) -> bool {
        let filter = SpatialQueryFilter::from_mask(mask);
        !self.spatial.point_intersections(point, &filter).is_empty()
    }

    fn disc_overlaps(&self, center: Vec2, radius: f32, mask: LayerMask) -> bool {
        let filter = SpatialQueryFilter::from_mask(mask);
        let disc = Collider::circle(radius);
        !self
            .spatial
            .shape_intersections(&disc, center, 0.0, &filter)
            .is_empty()
    }
}
