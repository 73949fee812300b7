//! Weapon registry and cooldown-gated firing.
//!
//! Firing geometry is deterministic: the same spec and inputs always yield
//! the same projectile set.  Spread weapons fan their projectiles
//! symmetrically around the forward (upward) axis.

use crate::geometry::Vec2;
use crate::render::Rgb;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WeaponId {
    Plasma,
    Spread,
    Rapid,
    Wave,
}

#[derive(Debug, PartialEq)]
pub struct WeaponSpec {
    pub id: WeaponId,
    pub name: &'static str,
    pub fire_interval_ms: u64,
    /// Pixels per second.
    pub projectile_speed: f32,
    pub projectile_count: u32,
    /// Angle between neighbouring projectiles, in radians.
    pub spread_radians: f32,
    pub color: Rgb,
}

pub static WEAPON_REGISTRY: [WeaponSpec; 4] = [
    WeaponSpec {
        id: WeaponId::Plasma,
        name: "PLASMA",
        fire_interval_ms: 200,
        projectile_speed: 900.0,
        projectile_count: 1,
        spread_radians: 0.0,
        color: Rgb(0x00ffff),
    },
    WeaponSpec {
        id: WeaponId::Spread,
        name: "SPREAD",
        fire_interval_ms: 320,
        projectile_speed: 850.0,
        projectile_count: 3,
        spread_radians: 0.26,
        color: Rgb(0xffff00),
    },
    WeaponSpec {
        id: WeaponId::Rapid,
        name: "RAPID",
        fire_interval_ms: 90,
        projectile_speed: 1000.0,
        projectile_count: 1,
        spread_radians: 0.0,
        color: Rgb(0xff44ff),
    },
    WeaponSpec {
        id: WeaponId::Wave,
        name: "WAVE",
        fire_interval_ms: 450,
        projectile_speed: 780.0,
        projectile_count: 5,
        spread_radians: 0.18,
        color: Rgb(0x66ff66),
    },
];

impl WeaponId {
    /// The weapon every session starts with and power-ups revert to.
    pub const DEFAULT: WeaponId = WeaponId::Plasma;

    pub const ALL: [WeaponId; 4] = [
        WeaponId::Plasma,
        WeaponId::Spread,
        WeaponId::Rapid,
        WeaponId::Wave,
    ];

    pub fn spec(self) -> &'static WeaponSpec {
        match self {
            WeaponId::Plasma => &WEAPON_REGISTRY[0],
            WeaponId::Spread => &WEAPON_REGISTRY[1],
            WeaponId::Rapid => &WEAPON_REGISTRY[2],
            WeaponId::Wave => &WEAPON_REGISTRY[3],
        }
    }

    /// Weapons that can appear as pickups.
    pub fn pickups() -> impl Iterator<Item = WeaponId> {
        Self::ALL.into_iter().filter(|id| *id != Self::DEFAULT)
    }
}

// ── Firing ────────────────────────────────────────────────────────────────────

/// Spawn point offset from the ship's centre (the nose).
pub const MUZZLE_OFFSET: Vec2 = Vec2::new(0.0, -35.0);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSpawn {
    /// Offset from the firing ship's position.
    pub offset: Vec2,
    pub velocity: Vec2,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FireResult {
    pub fired_at_ms: u64,
    pub projectiles: Vec<ProjectileSpawn>,
}

/// Effective cooldown for a weapon on a given ship.
pub fn cooldown_ms(spec: &WeaponSpec, fire_rate_multiplier: f32) -> f32 {
    spec.fire_interval_ms as f32 * fire_rate_multiplier
}

/// Attempt to fire.  Returns `None` while the weapon is still cooling down;
/// otherwise one spawn descriptor per projectile, the i-th rotated by
/// `(i - (count-1)/2) * spread` from straight up.
pub fn fire(
    spec: &WeaponSpec,
    fire_rate_multiplier: f32,
    now_ms: u64,
    last_fire_ms: Option<u64>,
) -> Option<FireResult> {
    if let Some(last) = last_fire_ms {
        let elapsed = now_ms.saturating_sub(last) as f32;
        if elapsed < cooldown_ms(spec, fire_rate_multiplier) {
            return None;
        }
    }

    let count = spec.projectile_count.max(1);
    let centre = (count - 1) as f32 / 2.0;
    let projectiles = (0..count)
        .map(|i| {
            let angle = (i as f32 - centre) * spec.spread_radians;
            ProjectileSpawn {
                offset: MUZZLE_OFFSET,
                velocity: Vec2::new(
                    spec.projectile_speed * angle.sin(),
                    -spec.projectile_speed * angle.cos(),
                ),
            }
        })
        .collect();

    Some(FireResult {
        fired_at_ms: now_ms,
        projectiles,
    })
}
