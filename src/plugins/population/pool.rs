//! Enemy pools and the active roster.
//!
//! Each archetype owns a free list of parked enemy entities. Entities are
//! created up front (pre-warm) or on demand up to the pool's capacity and are
//! never despawned while the app runs; "release" just parks them again.
//!
//! # Fail-fast invariant
//! The population cap is always below the pool capacity, so running out of
//! instances is a bug. `take` asserts instead of returning an error.

use bevy::prelude::*;

use crate::common::tunables::Tunables;
use crate::plugins::enemies::{Archetype, dormant_enemy};

#[derive(Debug)]
pub struct EnemyPool {
    archetype: Archetype,
    free: Vec<Entity>,
    /// Every entity this pool ever created (for teardown).
    members: Vec<Entity>,
    capacity: usize,
}

impl EnemyPool {
    pub fn new(archetype: Archetype, capacity: usize) -> Self {
        Self {
            archetype,
            free: Vec::with_capacity(capacity),
            members: Vec::with_capacity(capacity),
            capacity,
        }
    }

    #[inline]
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    #[inline]
    pub fn created(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn is_parked(&self, e: Entity) -> bool {
        self.free.contains(&e)
    }

    fn create(&mut self, commands: &mut Commands, tunables: &Tunables) -> Entity {
        assert!(
            self.members.len() < self.capacity,
            "{:?} pool exhausted: all {} instances in use",
            self.archetype,
            self.capacity
        );
        let e = commands.spawn(dormant_enemy(self.archetype, tunables)).id();
        self.members.push(e);
        e
    }

    /// Pre-spawn up to `count` parked instances.
    pub fn prewarm(&mut self, commands: &mut Commands, tunables: &Tunables, count: usize) {
        let target = count.min(self.capacity);
        while self.members.len() < target {
            let e = self.create(commands, tunables);
            self.free.push(e);
        }
    }

    /// Pop a parked instance, creating one if none is parked.
    pub fn take(&mut self, commands: &mut Commands, tunables: &Tunables) -> Entity {
        match self.free.pop() {
            Some(e) => e,
            None => self.create(commands, tunables),
        }
    }

    pub fn park(&mut self, e: Entity) {
        debug_assert!(!self.free.contains(&e), "enemy parked twice");
        self.free.push(e);
    }

    /// Forget everything and hand back every entity ever created.
    fn drain_members(&mut self) -> Vec<Entity> {
        self.free.clear();
        std::mem::take(&mut self.members)
    }
}

#[derive(Resource, Debug)]
pub struct EnemyPools {
    chases_when_seen: EnemyPool,
    chases_when_unseen: EnemyPool,
}

impl EnemyPools {
    pub fn new(capacity: usize) -> Self {
        Self {
            chases_when_seen: EnemyPool::new(Archetype::ChasesWhenSeen, capacity),
            chases_when_unseen: EnemyPool::new(Archetype::ChasesWhenUnseen, capacity),
        }
    }

    pub fn get(&self, archetype: Archetype) -> &EnemyPool {
        match archetype {
            Archetype::ChasesWhenSeen => &self.chases_when_seen,
            Archetype::ChasesWhenUnseen => &self.chases_when_unseen,
        }
    }

    pub fn get_mut(&mut self, archetype: Archetype) -> &mut EnemyPool {
        match archetype {
            Archetype::ChasesWhenSeen => &mut self.chases_when_seen,
            Archetype::ChasesWhenUnseen => &mut self.chases_when_unseen,
        }
    }

    pub fn drain_members(&mut self) -> Vec<Entity> {
        let mut all = self.chases_when_seen.drain_members();
        all.extend(self.chases_when_unseen.drain_members());
        all
    }
}

/// Enemies currently in play, with their archetype so release knows which pool.
#[derive(Resource, Debug, Default)]
pub struct ActiveRoster {
    members: Vec<(Entity, Archetype)>,
}

impl ActiveRoster {
    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, e: Entity) -> bool {
        self.members.iter().any(|(m, _)| *m == e)
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.members.iter().map(|(e, _)| *e)
    }

    pub(super) fn insert(&mut self, e: Entity, archetype: Archetype) {
        self.members.push((e, archetype));
    }

    pub(super) fn remove(&mut self, e: Entity) -> Option<Archetype> {
        let i = self.members.iter().position(|(m, _)| *m == e)?;
        Some(self.members.swap_remove(i).1)
    }

    pub(super) fn clear(&mut self) {
        self.members.clear();
    }
}

/// Pre-spawn parked enemies for both archetypes.
pub fn init_enemy_pools(
    mut commands: Commands,
    mut pools: ResMut<EnemyPools>,
    tunables: Res<Tunables>,
) {
    for archetype in Archetype::ALL {
        pools
            .get_mut(archetype)
            .prewarm(&mut commands, &tunables, tunables.pool_prewarm);
    }
}
