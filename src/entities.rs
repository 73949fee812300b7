//! Game entity types: pure data plus the small invariants that belong to
//! the data itself.

use crate::geometry::Vec2;
use crate::weapons::{WeaponId, WeaponSpec};

// ── Actors ────────────────────────────────────────────────────────────────────

/// Stable handle to a pooled actor.
///
/// The generation is bumped every time a slot is recycled, so an id held past
/// the actor's death never resolves to whatever reuses the slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId {
    pub slot: u32,
    pub generation: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActorKind {
    PlayerBullet,
    EnemyBullet,
    Enemy,
    Pickup,
}

// Hit radii are gameplay constants, independent of how the actor is drawn.
pub const PLAYER_HIT_RADIUS: f32 = 19.0;
pub const PLAYER_BULLET_HIT_RADIUS: f32 = 8.0;
pub const ENEMY_BULLET_HIT_RADIUS: f32 = 6.0;
pub const ENEMY_HIT_RADIUS: f32 = 22.0;
pub const PICKUP_HIT_RADIUS: f32 = 18.0;

impl ActorKind {
    pub fn hit_radius(self) -> f32 {
        match self {
            ActorKind::PlayerBullet => PLAYER_BULLET_HIT_RADIUS,
            ActorKind::EnemyBullet => ENEMY_BULLET_HIT_RADIUS,
            ActorKind::Enemy => ENEMY_HIT_RADIUS,
            ActorKind::Pickup => PICKUP_HIT_RADIUS,
        }
    }
}

/// Opaque handle into the rendering collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(pub u64);

#[derive(Clone, Debug, PartialEq)]
pub struct Actor {
    pub id: ActorId,
    pub kind: ActorKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub alive: bool,
    /// Weapon granted on collection; only pickups carry one.
    pub payload: Option<&'static WeaponSpec>,
    /// Visual drawn for this actor, once the owning scene has drawn it.
    pub visual: Option<Handle>,
}

/// Everything needed to place a new actor in a pool.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActorInit {
    pub position: Vec2,
    pub velocity: Vec2,
    pub payload: Option<&'static WeaponSpec>,
}

impl ActorInit {
    pub fn moving(position: Vec2, velocity: Vec2) -> Self {
        Self {
            position,
            velocity,
            payload: None,
        }
    }

    pub fn pickup(position: Vec2, velocity: Vec2, weapon: &'static WeaponSpec) -> Self {
        Self {
            position,
            velocity,
            payload: Some(weapon),
        }
    }
}

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct PlayerState {
    pub position: Vec2,
    pub current_weapon: &'static WeaponSpec,
    pub lives: u32,
    pub score: u32,
    /// Starts at 1 and never decreases within a session.
    pub level: u32,
    /// `None` until the first shot of the session.
    pub last_fire_ms: Option<u64>,
    /// Set while a pickup weapon is active.
    pub powerup_expiry_ms: Option<u64>,
}

impl PlayerState {
    pub fn new(position: Vec2, lives: u32) -> Self {
        Self {
            position,
            current_weapon: WeaponId::DEFAULT.spec(),
            lives,
            score: 0,
            level: 1,
            last_fire_ms: None,
            powerup_expiry_ms: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.lives > 0
    }

    /// Take one hit.  Returns the lives left; never goes below zero.
    pub fn lose_life(&mut self) -> u32 {
        self.lives = self.lives.saturating_sub(1);
        self.lives
    }

    /// Equip a pickup weapon until `now_ms + duration_ms`.  A second pickup
    /// replaces the first and restarts the countdown.
    pub fn equip_powerup(&mut self, weapon: &'static WeaponSpec, now_ms: u64, duration_ms: u64) {
        self.current_weapon = weapon;
        self.powerup_expiry_ms = Some(now_ms + duration_ms);
    }

    /// Revert to the default weapon once the power-up has run out.
    /// Returns `true` on the frame the revert happens.
    pub fn expire_powerup(&mut self, now_ms: u64) -> bool {
        match self.powerup_expiry_ms {
            Some(expiry) if now_ms >= expiry => {
                self.current_weapon = WeaponId::DEFAULT.spec();
                self.powerup_expiry_ms = None;
                true
            }
            _ => false,
        }
    }

    /// Whole seconds left on the active power-up, rounded up.
    pub fn powerup_seconds_left(&self, now_ms: u64) -> Option<u64> {
        self.powerup_expiry_ms
            .map(|expiry| expiry.saturating_sub(now_ms).div_ceil(1000))
    }
}
