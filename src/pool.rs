//! Actor pools: one per actor kind.
//!
//! Slots are recycled through a free list, so bullets and enemies churn
//! without growing the backing storage.  Each recycle bumps the slot
//! generation, making stale [`ActorId`]s resolve to nothing.

use crate::entities::{Actor, ActorId, ActorInit, ActorKind};
use crate::geometry::{Rect, SAFE_ZONE};

#[derive(Debug)]
struct Slot {
    generation: u32,
    actor: Option<Actor>,
}

#[derive(Debug)]
pub struct ActorPool {
    kind: ActorKind,
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl ActorPool {
    pub fn new(kind: ActorKind) -> Self {
        Self {
            kind,
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    pub fn kind(&self) -> ActorKind {
        self.kind
    }

    pub fn spawn(&mut self, init: ActorInit) -> ActorId {
        let slot = match self.free.pop() {
            Some(slot) => slot,
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    actor: None,
                });
                (self.slots.len() - 1) as u32
            }
        };
        let entry = &mut self.slots[slot as usize];
        let id = ActorId {
            slot,
            generation: entry.generation,
        };
        entry.actor = Some(Actor {
            id,
            kind: self.kind,
            position: init.position,
            velocity: init.velocity,
            radius: self.kind.hit_radius(),
            alive: true,
            payload: init.payload,
            visual: None,
        });
        self.live += 1;
        id
    }

    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.slots
            .get(id.slot as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.actor.as_ref())
    }

    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.slots
            .get_mut(id.slot as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.actor.as_mut())
    }

    pub fn is_alive(&self, id: ActorId) -> bool {
        self.get(id).is_some()
    }

    /// Remove an actor and return it (marked dead) so the caller can release
    /// its visual.  Stale or repeated ids return `None`.
    pub fn kill(&mut self, id: ActorId) -> Option<Actor> {
        let slot = self
            .slots
            .get_mut(id.slot as usize)
            .filter(|slot| slot.generation == id.generation)?;
        let mut actor = slot.actor.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.slot);
        self.live -= 1;
        actor.alive = false;
        Some(actor)
    }

    /// Advance every live actor by `velocity * dt` and remove those that left
    /// `bounds`.  The removed actors are returned.
    pub fn update_within(&mut self, dt: f32, bounds: &Rect) -> Vec<Actor> {
        let mut exited = Vec::new();
        for slot in &mut self.slots {
            let Some(actor) = slot.actor.as_mut() else {
                continue;
            };
            actor.position += actor.velocity * dt;
            if !bounds.contains(actor.position) {
                exited.push(actor.id);
            }
        }
        exited
            .into_iter()
            .filter_map(|id| self.kill(id))
            .collect()
    }

    /// [`ActorPool::update_within`] the safe-zone playfield.
    pub fn update(&mut self, dt: f32) -> Vec<Actor> {
        self.update_within(dt, &SAFE_ZONE)
    }

    /// Visit each live actor exactly once, in slot order.
    pub fn for_each_alive(&self, mut f: impl FnMut(&Actor)) {
        self.iter().for_each(|actor| f(actor));
    }

    pub fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.slots.iter().filter_map(|slot| slot.actor.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Actor> {
        self.slots.iter_mut().filter_map(|slot| slot.actor.as_mut())
    }

    pub fn ids(&self) -> Vec<ActorId> {
        self.iter().map(|actor| actor.id).collect()
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Slots allocated so far, live or free.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Kill everything, returning the removed actors.
    pub fn drain(&mut self) -> Vec<Actor> {
        self.ids()
            .into_iter()
            .filter_map(|id| self.kill(id))
            .collect()
    }
}

// ── World ─────────────────────────────────────────────────────────────────────

/// The four pools the play scene simulates.
#[derive(Debug)]
pub struct World {
    pub player_bullets: ActorPool,
    pub enemy_bullets: ActorPool,
    pub enemies: ActorPool,
    pub pickups: ActorPool,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self {
            player_bullets: ActorPool::new(ActorKind::PlayerBullet),
            enemy_bullets: ActorPool::new(ActorKind::EnemyBullet),
            enemies: ActorPool::new(ActorKind::Enemy),
            pickups: ActorPool::new(ActorKind::Pickup),
        }
    }

    pub fn pool(&self, kind: ActorKind) -> &ActorPool {
        match kind {
            ActorKind::PlayerBullet => &self.player_bullets,
            ActorKind::EnemyBullet => &self.enemy_bullets,
            ActorKind::Enemy => &self.enemies,
            ActorKind::Pickup => &self.pickups,
        }
    }

    pub fn pool_mut(&mut self, kind: ActorKind) -> &mut ActorPool {
        match kind {
            ActorKind::PlayerBullet => &mut self.player_bullets,
            ActorKind::EnemyBullet => &mut self.enemy_bullets,
            ActorKind::Enemy => &mut self.enemies,
            ActorKind::Pickup => &mut self.pickups,
        }
    }

    pub fn spawn(&mut self, kind: ActorKind, init: ActorInit) -> ActorId {
        self.pool_mut(kind).spawn(init)
    }

    /// Move every pool one step; returns the actors that left the playfield.
    pub fn update(&mut self, dt: f32) -> Vec<Actor> {
        let mut exited = self.player_bullets.update(dt);
        exited.extend(self.enemy_bullets.update(dt));
        exited.extend(self.enemies.update(dt));
        exited.extend(self.pickups.update(dt));
        exited
    }

    pub fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.player_bullets
            .iter()
            .chain(self.enemy_bullets.iter())
            .chain(self.enemies.iter())
            .chain(self.pickups.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Actor> {
        self.player_bullets
            .iter_mut()
            .chain(self.enemy_bullets.iter_mut())
            .chain(self.enemies.iter_mut())
            .chain(self.pickups.iter_mut())
    }

    pub fn drain(&mut self) -> Vec<Actor> {
        let mut all = self.player_bullets.drain();
        all.extend(self.enemy_bullets.drain());
        all.extend(self.enemies.drain());
        all.extend(self.pickups.drain());
        all
    }
}
