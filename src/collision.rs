//! Collision and combat resolution.
//!
//! Runs once per frame after movement.  Pairs are tested with circle-circle
//! proximity using each kind's fixed hit radius.  Interactions resolve in a
//! fixed order, and an actor killed by an earlier interaction is skipped by
//! every later one, so no actor yields its outcome twice:
//!
//! 1. player bullet × enemy: both die, score, maybe drop a pickup
//! 2. enemy bullet × player: bullet dies, player loses a life
//! 3. enemy × player: enemy dies, player loses a life
//! 4. pickup × player: pickup dies, its weapon is equipped
//!
//! A pickup dropped in step 1 is already in its pool for step 4.

use rand::{Rng, RngCore};
use tracing::trace;

use crate::entities::{Actor, ActorId, ActorInit, PlayerState, PLAYER_HIT_RADIUS};
use crate::geometry::Vec2;
use crate::pool::{ActorPool, World};
use crate::weapons::{WeaponId, WeaponSpec};

/// Tunables the resolver needs; usually built from the game config.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CombatRules {
    pub score_per_enemy: u32,
    pub pickup_drop_chance: f64,
    pub pickup_fall_speed: f32,
    pub powerup_duration_ms: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CombatEvent {
    /// An enemy shot down by a player bullet.
    EnemyDestroyed { enemy: Actor, bullet: Actor },
    /// The player took a hit from `by` (an enemy bullet or a rammed enemy).
    PlayerHit { by: Actor, lives_left: u32 },
    PickupDropped { pickup: ActorId, weapon: &'static WeaponSpec },
    PickupCollected { pickup: Actor, weapon: &'static WeaponSpec },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CombatReport {
    pub score_delta: u32,
    pub events: Vec<CombatEvent>,
}

impl CombatReport {
    pub fn player_hits(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, CombatEvent::PlayerHit { .. }))
            .count()
    }

    /// Every actor removed this pass, for visual cleanup.
    pub fn removed(&self) -> impl Iterator<Item = &Actor> {
        self.events.iter().flat_map(|event| match event {
            CombatEvent::EnemyDestroyed { enemy, bullet } => vec![enemy, bullet],
            CombatEvent::PlayerHit { by, .. } => vec![by],
            CombatEvent::PickupCollected { pickup, .. } => vec![pickup],
            CombatEvent::PickupDropped { .. } => Vec::new(),
        })
    }
}

pub fn overlaps(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    a.distance(b) < a_radius + b_radius
}

/// Resolve one frame of combat.  Score is reported, not applied; feeding it
/// to the progression tracker is the caller's job.
pub fn resolve(
    world: &mut World,
    player: &mut PlayerState,
    now_ms: u64,
    rules: &CombatRules,
    rng: &mut dyn RngCore,
) -> CombatReport {
    let mut report = CombatReport::default();

    bullets_vs_enemies(world, rules, rng, &mut report);

    for by in hits_on_player(&mut world.enemy_bullets, player.position) {
        let lives_left = player.lose_life();
        report.events.push(CombatEvent::PlayerHit { by, lives_left });
    }
    for by in hits_on_player(&mut world.enemies, player.position) {
        let lives_left = player.lose_life();
        report.events.push(CombatEvent::PlayerHit { by, lives_left });
    }

    for pickup in hits_on_player(&mut world.pickups, player.position) {
        let Some(weapon) = pickup.payload else {
            continue;
        };
        player.equip_powerup(weapon, now_ms, rules.powerup_duration_ms);
        report
            .events
            .push(CombatEvent::PickupCollected { pickup, weapon });
    }

    if !report.events.is_empty() {
        trace!(
            score_delta = report.score_delta,
            events = report.events.len(),
            "combat resolved"
        );
    }
    report
}

fn bullets_vs_enemies(
    world: &mut World,
    rules: &CombatRules,
    rng: &mut dyn RngCore,
    report: &mut CombatReport,
) {
    for bullet_id in world.player_bullets.ids() {
        let Some(bullet) = world.player_bullets.get(bullet_id) else {
            continue;
        };
        let (bullet_pos, bullet_radius) = (bullet.position, bullet.radius);

        let target = world.enemies.iter().find(|enemy| {
            overlaps(bullet_pos, bullet_radius, enemy.position, enemy.radius)
        });
        let Some(enemy_id) = target.map(|enemy| enemy.id) else {
            continue;
        };

        let (Some(enemy), Some(bullet)) = (
            world.enemies.kill(enemy_id),
            world.player_bullets.kill(bullet_id),
        ) else {
            continue;
        };
        report.score_delta += rules.score_per_enemy;
        let drop_at = enemy.position;
        report
            .events
            .push(CombatEvent::EnemyDestroyed { enemy, bullet });

        if rng.gen_bool(rules.pickup_drop_chance) {
            let weapon = random_pickup_weapon(rng);
            let pickup = world.pickups.spawn(ActorInit::pickup(
                drop_at,
                Vec2::new(0.0, rules.pickup_fall_speed),
                weapon,
            ));
            report
                .events
                .push(CombatEvent::PickupDropped { pickup, weapon });
        }
    }
}

/// Kill and return every actor in `pool` touching the player.
fn hits_on_player(pool: &mut ActorPool, player_pos: Vec2) -> Vec<Actor> {
    let touching: Vec<ActorId> = pool
        .iter()
        .filter(|actor| overlaps(actor.position, actor.radius, player_pos, PLAYER_HIT_RADIUS))
        .map(|actor| actor.id)
        .collect();
    touching
        .into_iter()
        .filter_map(|id| pool.kill(id))
        .collect()
}

fn random_pickup_weapon(rng: &mut dyn RngCore) -> &'static WeaponSpec {
    let choices: Vec<WeaponId> = WeaponId::pickups().collect();
    choices[rng.gen_range(0..choices.len())].spec()
}
