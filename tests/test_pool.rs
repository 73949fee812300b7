use approx::assert_relative_eq;

use space_blaster::entities::{ActorInit, ActorKind};
use space_blaster::geometry::{Rect, Vec2, SAFE_ZONE};
use space_blaster::pool::{ActorPool, World};
use space_blaster::weapons::WeaponId;

fn moving(x: f32, y: f32, vx: f32, vy: f32) -> ActorInit {
    ActorInit::moving(Vec2::new(x, y), Vec2::new(vx, vy))
}

// ── Spawn / kill ──────────────────────────────────────────────────────────────

#[test]
fn spawn_uses_kind_hit_radius() {
    let mut pool = ActorPool::new(ActorKind::Enemy);
    let id = pool.spawn(moving(500.0, 500.0, 0.0, 100.0));
    let actor = pool.get(id).unwrap();
    assert!(actor.alive);
    assert_eq!(actor.kind, ActorKind::Enemy);
    assert_relative_eq!(actor.radius, ActorKind::Enemy.hit_radius());
    assert!(actor.visual.is_none());
}

#[test]
fn kill_returns_dead_actor_once() {
    let mut pool = ActorPool::new(ActorKind::PlayerBullet);
    let id = pool.spawn(moving(500.0, 500.0, 0.0, -900.0));
    let killed = pool.kill(id).unwrap();
    assert!(!killed.alive);
    assert!(pool.kill(id).is_none());
    assert!(pool.is_empty());
}

#[test]
fn slots_are_recycled_and_stale_ids_resolve_to_nothing() {
    let mut pool = ActorPool::new(ActorKind::EnemyBullet);
    let first = pool.spawn(moving(500.0, 500.0, 0.0, 0.0));
    pool.kill(first);
    let second = pool.spawn(moving(600.0, 600.0, 0.0, 0.0));

    assert_eq!(pool.capacity(), 1);
    assert_eq!(first.slot, second.slot);
    assert_ne!(first, second);
    assert!(pool.get(first).is_none());
    assert_relative_eq!(pool.get(second).unwrap().position.x, 600.0);
}

// ── Update ────────────────────────────────────────────────────────────────────

#[test]
fn update_advances_by_velocity_times_dt() {
    let mut pool = ActorPool::new(ActorKind::Enemy);
    let id = pool.spawn(moving(500.0, 200.0, 30.0, 240.0));
    let exited = pool.update(0.5);
    assert!(exited.is_empty());
    let actor = pool.get(id).unwrap();
    assert_relative_eq!(actor.position.x, 515.0);
    assert_relative_eq!(actor.position.y, 320.0);
}

#[test]
fn repeated_updates_do_not_drift() {
    let mut pool = ActorPool::new(ActorKind::Pickup);
    let id = pool.spawn(moving(400.0, 100.0, 12.5, 150.0));
    let dt = 1.0 / 60.0;
    for _ in 0..300 {
        assert!(pool.update(dt).is_empty());
    }
    let actor = pool.get(id).unwrap();
    assert_relative_eq!(actor.position.x, 400.0 + 12.5 * dt * 300.0, epsilon = 0.05);
    assert_relative_eq!(actor.position.y, 100.0 + 150.0 * dt * 300.0, epsilon = 0.05);
}

#[test]
fn leaving_the_safe_zone_kills_the_actor() {
    let mut pool = ActorPool::new(ActorKind::PlayerBullet);
    let leaving = pool.spawn(moving(500.0, SAFE_ZONE.top + 5.0, 0.0, -900.0));
    let staying = pool.spawn(moving(500.0, 500.0, 0.0, -900.0));

    let exited = pool.update(0.1);
    assert_eq!(exited.len(), 1);
    assert_eq!(exited[0].id, leaving);
    assert!(!exited[0].alive);
    assert!(pool.is_alive(staying));
    assert!(!pool.is_alive(leaving));
}

#[test]
fn boundary_is_inclusive() {
    let bounds = Rect {
        left: 0.0,
        top: 0.0,
        right: 100.0,
        bottom: 100.0,
    };
    let mut pool = ActorPool::new(ActorKind::Enemy);
    let id = pool.spawn(moving(50.0, 90.0, 0.0, 10.0));
    assert!(pool.update_within(1.0, &bounds).is_empty());
    assert!(pool.is_alive(id)); // exactly on the edge
    assert_eq!(pool.update_within(0.1, &bounds).len(), 1);
}

#[test]
fn for_each_alive_visits_each_live_actor_once() {
    let mut pool = ActorPool::new(ActorKind::Enemy);
    let ids: Vec<_> = (0..5)
        .map(|i| pool.spawn(moving(200.0 + i as f32 * 10.0, 500.0, 0.0, 0.0)))
        .collect();
    pool.kill(ids[1]);
    pool.kill(ids[3]);

    let mut seen = Vec::new();
    pool.for_each_alive(|actor| seen.push(actor.id));
    assert_eq!(seen, vec![ids[0], ids[2], ids[4]]);
}

// ── World ─────────────────────────────────────────────────────────────────────

#[test]
fn world_routes_spawns_by_kind() {
    let mut world = World::new();
    world.spawn(ActorKind::Enemy, moving(500.0, 500.0, 0.0, 0.0));
    world.spawn(
        ActorKind::Pickup,
        ActorInit::pickup(Vec2::new(500.0, 500.0), Vec2::ZERO, WeaponId::Spread.spec()),
    );
    assert_eq!(world.enemies.len(), 1);
    assert_eq!(world.pickups.len(), 1);
    assert!(world.player_bullets.is_empty());
    assert_eq!(world.pool(ActorKind::Pickup).kind(), ActorKind::Pickup);
    assert_eq!(world.iter().count(), 2);
}

#[test]
fn world_drain_empties_every_pool() {
    let mut world = World::new();
    for kind in [
        ActorKind::PlayerBullet,
        ActorKind::EnemyBullet,
        ActorKind::Enemy,
        ActorKind::Pickup,
    ] {
        world.spawn(kind, moving(500.0, 500.0, 0.0, 0.0));
    }
    assert_eq!(world.drain().len(), 4);
    assert_eq!(world.iter().count(), 0);
}
