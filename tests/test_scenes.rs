mod common;

use common::{machine_in_play, machine_with, press, quiet_config, RecordingRenderer, FRAME_MS};
use space_blaster::config::GameConfig;
use space_blaster::entities::{ActorInit, ActorKind};
use space_blaster::geometry::Vec2;
use space_blaster::input::LogicalKey;
use space_blaster::render::Rgb;
use space_blaster::scenes::*;
use space_blaster::ships::ShipId;
use space_blaster::weapons::WeaponId;

type Machine = SceneMachine<RecordingRenderer>;

fn run_for(machine: &mut Machine, ms: u64) {
    for _ in 0..ms.div_ceil(FRAME_MS) {
        machine.tick(FRAME_MS);
    }
}

fn in_menu() -> Machine {
    let mut machine = machine_with(quiet_config());
    machine.tick(FRAME_MS);
    machine
}

fn menu_index(machine: &Machine) -> Option<usize> {
    match machine.active() {
        ActiveScene::Menu(menu) => menu.navigator().index(),
        _ => None,
    }
}

/// Put an enemy bullet on the player and run one frame.
fn shoot_player(machine: &mut Machine) {
    let play = machine.play_mut().unwrap();
    let at = play.player().position;
    play.world_mut()
        .spawn(ActorKind::EnemyBullet, ActorInit::moving(at, Vec2::ZERO));
    machine.tick(FRAME_MS);
}

fn defeated(score: u32) -> Machine {
    let mut machine = machine_in_play(quiet_config());
    machine.play_mut().unwrap().player_mut().score = score;
    for _ in 0..3 {
        shoot_player(&mut machine);
    }
    machine
}

// ── Boot & menu ───────────────────────────────────────────────────────────────

#[test]
fn boot_hands_over_to_menu_on_first_frame() {
    let mut machine = machine_with(GameConfig::default());
    assert_eq!(machine.active_id(), SceneId::Boot);
    assert_eq!(machine.input().listener_count(), 0);
    machine.tick(FRAME_MS);
    assert_eq!(machine.active_id(), SceneId::Menu);
    assert!(machine.renderer().has_text("START GAME"));
}

#[test]
fn menu_cursor_wraps_in_both_directions() {
    let mut machine = in_menu();
    assert_eq!(menu_index(&machine), Some(0));
    press(&mut machine, LogicalKey::Up);
    assert_eq!(menu_index(&machine), Some(2));
    press(&mut machine, LogicalKey::Down);
    press(&mut machine, LogicalKey::Down);
    assert_eq!(menu_index(&machine), Some(1));
    let lit = machine.renderer().highlighted_texts();
    assert_eq!(lit.len(), 1);
    assert!(lit[0].contains("HOW TO PLAY"));
}

#[test]
fn how_to_play_overlay_parks_and_restores_the_menu() {
    let mut machine = in_menu();
    press(&mut machine, LogicalKey::Down);
    press(&mut machine, LogicalKey::Confirm);

    let ActiveScene::Menu(menu) = machine.active() else {
        panic!("left the menu");
    };
    assert!(menu.is_overlay_open());
    assert_eq!(menu.navigator().index(), None);
    assert!(machine.renderer().has_text("Press ENTER to go back"));

    // Navigation is ignored while the overlay is up.
    press(&mut machine, LogicalKey::Down);
    press(&mut machine, LogicalKey::Back);

    let ActiveScene::Menu(menu) = machine.active() else {
        panic!("left the menu");
    };
    assert!(!menu.is_overlay_open());
    assert_eq!(menu.navigator().index(), Some(0));
    assert!(!machine.renderer().has_text("Press ENTER to go back"));
}

#[test]
fn back_on_the_main_menu_does_nothing() {
    let mut machine = in_menu();
    press(&mut machine, LogicalKey::Back);
    assert_eq!(machine.active_id(), SceneId::Menu);
    assert!(!machine.is_finished());
}

#[test]
fn exit_finishes_the_machine() {
    let mut machine = in_menu();
    press(&mut machine, LogicalKey::Up);
    press(&mut machine, LogicalKey::Confirm);
    assert!(machine.is_finished());
    assert_eq!(machine.input().listener_count(), 0);

    let now = machine.now_ms();
    machine.tick(FRAME_MS);
    assert_eq!(machine.now_ms(), now, "finished machine no longer ticks");
}

// ── Ship select ───────────────────────────────────────────────────────────────

#[test]
fn ship_select_launches_the_highlighted_ship() {
    let mut machine = in_menu();
    press(&mut machine, LogicalKey::Confirm);
    assert_eq!(machine.active_id(), SceneId::ShipSelect);
    press(&mut machine, LogicalKey::Right);
    press(&mut machine, LogicalKey::Right);
    press(&mut machine, LogicalKey::Right); // wraps back to the first card
    press(&mut machine, LogicalKey::Left); // and back round to the last
    press(&mut machine, LogicalKey::Confirm);

    let play = machine.play().expect("in play");
    assert_eq!(play.setup().ship, ShipId::Titan);
}

#[test]
fn back_from_ship_select_returns_to_menu() {
    let mut machine = in_menu();
    press(&mut machine, LogicalKey::Confirm);
    press(&mut machine, LogicalKey::Back);
    assert_eq!(machine.active_id(), SceneId::Menu);
    assert_eq!(menu_index(&machine), Some(0));
}

// ── Play ──────────────────────────────────────────────────────────────────────

#[test]
fn play_starts_with_full_lives_and_default_weapon() {
    let machine = machine_in_play(quiet_config());
    let player = machine.play().unwrap().player();
    assert_eq!(player.lives, 3);
    assert_eq!(player.score, 0);
    assert_eq!(player.level, 1);
    assert_eq!(player.current_weapon.id, WeaponId::DEFAULT);
    assert!(machine.renderer().has_text("LIVES: 3"));
}

#[test]
fn confirm_held_from_ship_select_does_not_fire() {
    let mut machine = in_menu();
    press(&mut machine, LogicalKey::Confirm);
    machine.key_down(LogicalKey::Confirm);
    machine.tick(FRAME_MS);
    assert_eq!(machine.active_id(), SceneId::Play);
    machine.tick(FRAME_MS);
    assert!(machine.play().unwrap().world().player_bullets.is_empty());
}

#[test]
fn holding_fire_respects_the_weapon_cooldown() {
    let mut machine = machine_in_play(quiet_config());
    machine.key_down(LogicalKey::Confirm);
    machine.tick(FRAME_MS);
    assert_eq!(machine.play().unwrap().world().player_bullets.len(), 1);
    machine.tick(FRAME_MS);
    assert_eq!(machine.play().unwrap().world().player_bullets.len(), 1);
    // PLASMA on VIPER: 200 ms between shots
    run_for(&mut machine, 200);
    assert_eq!(machine.play().unwrap().world().player_bullets.len(), 2);
}

#[test]
fn held_direction_moves_the_ship_and_clamps_to_the_playfield() {
    let mut machine = machine_in_play(quiet_config());
    let start = machine.play().unwrap().player().position;
    machine.key_down(LogicalKey::Left);
    machine.tick(FRAME_MS);
    let moved = machine.play().unwrap().player().position;
    assert!(moved.x < start.x);
    assert_eq!(moved.y, start.y);

    run_for(&mut machine, 5000);
    let pinned = machine.play().unwrap().player().position;
    assert_eq!(pinned.x, 126.0); // safe zone left edge + hull margin
}

#[test]
fn shots_fired_from_the_top_edge_stay_in_play() {
    let mut machine = machine_in_play(quiet_config());
    machine.key_down(LogicalKey::Up);
    run_for(&mut machine, 5000);
    let top = machine.play().unwrap().player().position;
    assert_eq!(top.y, 149.0); // safe zone top + muzzle clearance + muzzle offset

    machine.key_down(LogicalKey::Confirm);
    machine.tick(FRAME_MS);
    assert_eq!(machine.play().unwrap().world().player_bullets.len(), 1);
    machine.key_up(LogicalKey::Confirm);
    machine.tick(FRAME_MS);
    assert_eq!(machine.play().unwrap().world().player_bullets.len(), 1);
}

#[test]
fn shooting_an_enemy_scores_and_updates_the_hud() {
    let mut machine = machine_in_play(quiet_config());
    let world = machine.play_mut().unwrap().world_mut();
    world.spawn(ActorKind::Enemy, ActorInit::moving(Vec2::new(700.0, 400.0), Vec2::ZERO));
    world.spawn(
        ActorKind::PlayerBullet,
        ActorInit::moving(Vec2::new(700.0, 410.0), Vec2::ZERO),
    );
    machine.tick(FRAME_MS);

    let play = machine.play().unwrap();
    assert_eq!(play.player().score, 100);
    assert!(play.world().enemies.is_empty());
    assert!(machine.renderer().has_text("SCORE: 100"));
}

#[test]
fn crossing_the_threshold_levels_up_and_announces_it() {
    let mut machine = machine_in_play(quiet_config());
    let play = machine.play_mut().unwrap();
    play.player_mut().score = 1450;
    play.world_mut()
        .spawn(ActorKind::Enemy, ActorInit::moving(Vec2::new(700.0, 400.0), Vec2::ZERO));
    play.world_mut().spawn(
        ActorKind::PlayerBullet,
        ActorInit::moving(Vec2::new(700.0, 400.0), Vec2::ZERO),
    );
    machine.tick(FRAME_MS);

    assert_eq!(machine.play().unwrap().player().level, 2);
    assert!(machine.renderer().has_text("LEVEL 2"));
}

#[test]
fn enemies_spawn_on_the_configured_interval() {
    let mut machine = machine_in_play(GameConfig {
        enemy_fire_rate: 0.0,
        ..GameConfig::default()
    });
    run_for(&mut machine, 1400);
    assert!(machine.play().unwrap().world().enemies.is_empty());
    run_for(&mut machine, 200);
    let play = machine.play().unwrap();
    assert_eq!(play.world().enemies.len(), 1);
    assert!(play.next_spawn_ms() > machine.now_ms());
}

#[test]
fn same_seed_same_inputs_same_game() {
    fn field_after(ms: u64) -> Vec<(ActorKind, Vec2)> {
        let mut machine = machine_in_play(GameConfig::default());
        run_for(&mut machine, ms);
        machine
            .play()
            .unwrap()
            .world()
            .iter()
            .map(|actor| (actor.kind, actor.position))
            .collect()
    }
    let first = field_after(6000);
    assert!(!first.is_empty());
    assert_eq!(first, field_after(6000));
}

#[test]
fn hit_flash_clears_after_its_delay() {
    let mut machine = machine_in_play(quiet_config());
    shoot_player(&mut machine);
    assert_eq!(machine.play().unwrap().player().lives, 2);
    let flashing = |machine: &Machine| {
        machine
            .renderer()
            .shapes
            .values()
            .any(|shape| shape.spec.color == Rgb::HIT)
    };
    assert!(flashing(&machine));
    run_for(&mut machine, 100);
    assert!(!flashing(&machine));
}

#[test]
fn pickup_swaps_weapon_until_it_expires() {
    let mut machine = machine_in_play(quiet_config());
    let play = machine.play_mut().unwrap();
    let at = play.player().position;
    play.world_mut().spawn(
        ActorKind::Pickup,
        ActorInit::pickup(at, Vec2::ZERO, WeaponId::Spread.spec()),
    );
    machine.tick(FRAME_MS);

    let player = machine.play().unwrap().player();
    assert_eq!(player.current_weapon.id, WeaponId::Spread);
    assert!(machine.renderer().has_text("SPREAD 8s"));

    run_for(&mut machine, 7900);
    assert_eq!(
        machine.play().unwrap().player().current_weapon.id,
        WeaponId::Spread
    );
    run_for(&mut machine, 150);
    assert_eq!(
        machine.play().unwrap().player().current_weapon.id,
        WeaponId::Plasma
    );
    assert!(machine.renderer().has_text("PLASMA"));
}

#[test]
fn spread_pickup_fires_three_projectiles() {
    let mut machine = machine_in_play(quiet_config());
    let play = machine.play_mut().unwrap();
    let at = play.player().position;
    play.world_mut().spawn(
        ActorKind::Pickup,
        ActorInit::pickup(at, Vec2::ZERO, WeaponId::Spread.spec()),
    );
    machine.tick(FRAME_MS);
    machine.key_down(LogicalKey::Confirm);
    machine.tick(FRAME_MS);
    assert_eq!(machine.play().unwrap().world().player_bullets.len(), 3);
}

#[test]
fn back_from_play_returns_to_menu_and_cleans_up() {
    let mut machine = in_menu();
    let menu_shapes = machine.renderer().live();
    press(&mut machine, LogicalKey::Confirm);
    press(&mut machine, LogicalKey::Confirm);
    machine.key_down(LogicalKey::Confirm);
    run_for(&mut machine, 500);
    machine.key_up(LogicalKey::Confirm);
    assert!(!machine.play().unwrap().world().player_bullets.is_empty());

    press(&mut machine, LogicalKey::Back);
    assert_eq!(machine.active_id(), SceneId::Menu);
    assert_eq!(machine.renderer().live(), menu_shapes);
    assert_eq!(machine.input().listener_count(), 1);
}

// ── Defeat & game over ────────────────────────────────────────────────────────

#[test]
fn three_hits_end_the_session_after_the_grace_delay() {
    let mut machine = defeated(700);
    let play = machine.play().unwrap();
    assert_eq!(play.player().lives, 0);
    assert!(play.is_defeated());
    assert!(machine.renderer().has_text("LIVES: 0"));

    // Frozen: nothing fires or moves during the grace period.
    machine.key_down(LogicalKey::Confirm);
    run_for(&mut machine, 900);
    assert_eq!(machine.active_id(), SceneId::Play);
    assert!(machine.play().unwrap().world().player_bullets.is_empty());

    run_for(&mut machine, 150);
    assert_eq!(machine.active_id(), SceneId::GameOver);
    let report = machine.game_over().unwrap().report();
    assert_eq!(
        report,
        GameOverReport {
            final_score: 700,
            level: 1,
            ship: ShipId::Viper,
        }
    );
    assert!(machine.renderer().has_text("FINAL SCORE: 700"));
}

#[test]
fn back_during_the_grace_delay_cancels_game_over() {
    let mut machine = defeated(0);
    press(&mut machine, LogicalKey::Back);
    assert_eq!(machine.active_id(), SceneId::Menu);
    run_for(&mut machine, 2000);
    assert_eq!(machine.active_id(), SceneId::Menu);
}

#[test]
fn play_again_preselects_the_last_ship() {
    let mut machine = in_menu();
    press(&mut machine, LogicalKey::Confirm);
    press(&mut machine, LogicalKey::Right);
    press(&mut machine, LogicalKey::Confirm);
    for _ in 0..3 {
        shoot_player(&mut machine);
    }
    run_for(&mut machine, 1100);
    assert_eq!(machine.active_id(), SceneId::GameOver);

    press(&mut machine, LogicalKey::Confirm);
    assert_eq!(machine.active_id(), SceneId::ShipSelect);
    let ActiveScene::ShipSelect(select) = machine.active() else {
        unreachable!();
    };
    assert_eq!(select.navigator().index(), Some(ShipId::Raptor.index()));
    assert!(machine.renderer().highlighted_texts().contains(&"RAPTOR".to_string()));
}

#[test]
fn main_menu_from_game_over() {
    let mut machine = defeated(0);
    run_for(&mut machine, 1100);
    press(&mut machine, LogicalKey::Down);
    press(&mut machine, LogicalKey::Confirm);
    assert_eq!(machine.active_id(), SceneId::Menu);
}

#[test]
fn back_from_game_over_goes_to_menu() {
    let mut machine = defeated(0);
    run_for(&mut machine, 1100);
    press(&mut machine, LogicalKey::Back);
    assert_eq!(machine.active_id(), SceneId::Menu);
}

// ── Transition table ──────────────────────────────────────────────────────────

#[test]
fn transition_table_rejects_shortcuts() {
    assert!(SceneId::Menu.check_transition(SceneId::Play).is_err());
    assert!(SceneId::GameOver.check_transition(SceneId::Play).is_err());
    assert!(SceneId::Play.check_transition(SceneId::ShipSelect).is_err());
    assert!(SceneId::Boot.check_transition(SceneId::Menu).is_ok());
    assert!(SceneId::Play.check_transition(SceneId::GameOver).is_ok());
}

#[test]
fn every_scene_holds_exactly_one_listener() {
    let mut machine = in_menu();
    assert_eq!(machine.input().listener_count(), 1);
    press(&mut machine, LogicalKey::Confirm);
    assert_eq!(machine.input().listener_count(), 1);
    press(&mut machine, LogicalKey::Confirm);
    assert_eq!(machine.input().listener_count(), 1);
    for _ in 0..3 {
        shoot_player(&mut machine);
    }
    run_for(&mut machine, 1100);
    assert_eq!(machine.active_id(), SceneId::GameOver);
    assert_eq!(machine.input().listener_count(), 1);
}
