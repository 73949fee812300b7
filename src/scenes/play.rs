//! The play scene.
//!
//! Each active frame runs, in order: timers, back key, player movement,
//! enemy spawning, pool movement, weapon fire (enemy then player), combat
//! resolution, progression, power-up expiry, then visual sync.  Once lives
//! reach zero the scene freezes (nothing spawns or moves) and the
//! GameOver transition fires from a scope timer after the grace delay.

use rand::Rng;
use tracing::{debug, info};

use super::backdrop::Starfield;
use super::ship_select::ship_outline;
use super::{GameOverReport, PlaySetup, Scene, SceneContext, SceneId, Transition};
use crate::collision::{self, CombatEvent, CombatReport, CombatRules};
use crate::config::GameConfig;
use crate::entities::{Actor, ActorInit, ActorKind, Handle, PlayerState};
use crate::geometry::{Rect, Vec2, SAFE_ZONE};
use crate::input::{InputSnapshot, ListenerToken, LogicalKey};
use crate::pool::World;
use crate::progression::{LevelUp, ProgressionTracker};
use crate::render::{Anchor, Renderer, Rgb, ShapeSpec, SoundEffect};
use crate::ships::ShipSpec;
use crate::timers::SceneScope;
use crate::weapons;

const PLAYER_START: Vec2 = Vec2::new(960.0, 900.0);
/// Keeps the hull fully inside the safe zone.
const PLAYER_EDGE_MARGIN: f32 = 30.0;
/// Distance a fresh shot keeps from the top of the safe zone when fired from
/// the highest reachable position.
const MUZZLE_CLEARANCE: f32 = 60.0;
/// Horizontal margin for enemy spawn columns.
const SPAWN_EDGE_MARGIN: f32 = 20.0;
const ENEMY_MUZZLE: Vec2 = Vec2::new(0.0, 30.0);

const ENEMY_COLOR: Rgb = Rgb(0xff4444);
const ENEMY_BULLET_COLOR: Rgb = Rgb(0xff6600);
const EXPLOSION_COLOR: Rgb = Rgb(0xff6600);

/// Deferred work owned by the play scene's scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayTimer {
    ClearHitFlash,
    RemoveEffect(Handle),
    HideLevelMessage(Handle),
    EndGame,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Active,
    /// Lives ran out; the score is frozen until the transition fires.
    Defeated { final_score: u32 },
}

struct Hud {
    score: Handle,
    lives: Handle,
    weapon: Handle,
    level: Handle,
    shown: (u32, u32, String, u32),
}

pub struct PlayScene {
    setup: PlaySetup,
    ship: &'static ShipSpec,
    scope: SceneScope<PlayTimer>,
    listener: Option<ListenerToken>,
    world: World,
    player: PlayerState,
    tracker: ProgressionTracker,
    rules: CombatRules,
    enemy_fire_rate: f64,
    enemy_bullet_speed: f32,
    next_spawn_ms: u64,
    phase: Phase,
    player_visual: Option<Handle>,
    hud: Option<Hud>,
    effects: Vec<Handle>,
    level_message: Option<Handle>,
    starfield: Starfield,
}

impl PlayScene {
    pub fn new(setup: PlaySetup, config: &GameConfig) -> Self {
        Self {
            setup,
            ship: setup.ship.spec(),
            scope: SceneScope::closed(),
            listener: None,
            world: World::new(),
            player: PlayerState::new(PLAYER_START, config.starting_lives),
            tracker: ProgressionTracker::from_config(config),
            rules: CombatRules {
                score_per_enemy: config.score_per_enemy,
                pickup_drop_chance: config.pickup_drop_chance,
                pickup_fall_speed: config.pickup_fall_speed,
                powerup_duration_ms: config.powerup_duration_ms,
            },
            enemy_fire_rate: config.enemy_fire_rate,
            enemy_bullet_speed: config.enemy_bullet_speed,
            next_spawn_ms: 0,
            phase: Phase::Active,
            player_visual: None,
            hud: None,
            effects: Vec::new(),
            level_message: None,
            starfield: Starfield::default(),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn setup(&self) -> PlaySetup {
        self.setup
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut PlayerState {
        &mut self.player
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn is_defeated(&self) -> bool {
        matches!(self.phase, Phase::Defeated { .. })
    }

    pub fn next_spawn_ms(&self) -> u64 {
        self.next_spawn_ms
    }

    pub fn pending_timers(&self) -> usize {
        self.scope.pending_timers()
    }

    fn movement_bounds() -> Rect {
        Rect {
            top: SAFE_ZONE.top + MUZZLE_CLEARANCE - weapons::MUZZLE_OFFSET.y,
            ..SAFE_ZONE.inset(PLAYER_EDGE_MARGIN)
        }
    }

    // ── Frame steps ───────────────────────────────────────────────────────────

    fn run_timers(&mut self, ctx: &mut SceneContext<'_>) -> Option<Transition> {
        for timer in self.scope.due(ctx.now_ms) {
            match timer {
                PlayTimer::ClearHitFlash => {
                    if let Some(visual) = self.player_visual {
                        ctx.renderer.set_color(visual, self.ship.color);
                    }
                }
                PlayTimer::RemoveEffect(handle) => {
                    self.effects.retain(|effect| *effect != handle);
                    ctx.renderer.destroy(handle);
                }
                PlayTimer::HideLevelMessage(handle) => {
                    if self.level_message == Some(handle) {
                        self.level_message = None;
                        ctx.renderer.destroy(handle);
                    }
                }
                PlayTimer::EndGame => {
                    if let Phase::Defeated { final_score } = self.phase {
                        return Some(Transition::GameOver(GameOverReport {
                            final_score,
                            level: self.player.level,
                            ship: self.setup.ship,
                        }));
                    }
                }
            }
        }
        None
    }

    fn move_player(&mut self, input: InputSnapshot, dt: f32) {
        let (x, y) = input.axis();
        let step = Vec2::new(x, y) * (self.ship.move_speed * dt);
        self.player.position = Self::movement_bounds().clamp(self.player.position + step);
    }

    fn spawn_enemies(&mut self, ctx: &mut SceneContext<'_>) {
        if ctx.now_ms < self.next_spawn_ms {
            return;
        }
        let (min_speed, max_speed) = self.tracker.enemy_speed_range(self.player.level);
        let x = ctx.rng.gen_range(
            SAFE_ZONE.left + SPAWN_EDGE_MARGIN..=SAFE_ZONE.right - SPAWN_EDGE_MARGIN,
        );
        let speed = ctx.rng.gen_range(min_speed..=max_speed);
        self.world.spawn(
            ActorKind::Enemy,
            ActorInit::moving(Vec2::new(x, SAFE_ZONE.top), Vec2::new(0.0, speed)),
        );
        self.next_spawn_ms = ctx.now_ms + self.tracker.spawn_interval_ms(self.player.level);
    }

    fn enemies_fire(&mut self, dt: f32, ctx: &mut SceneContext<'_>) {
        let chance = (self.enemy_fire_rate * f64::from(dt)).clamp(0.0, 1.0);
        let muzzles: Vec<Vec2> = self
            .world
            .enemies
            .iter()
            .map(|enemy| enemy.position + ENEMY_MUZZLE)
            .collect();
        for muzzle in muzzles {
            if ctx.rng.gen_bool(chance) {
                self.world.spawn(
                    ActorKind::EnemyBullet,
                    ActorInit::moving(muzzle, Vec2::new(0.0, self.enemy_bullet_speed)),
                );
            }
        }
    }

    fn player_fire(&mut self, input: InputSnapshot, ctx: &mut SceneContext<'_>) {
        if !input.fire {
            return;
        }
        let Some(shot) = weapons::fire(
            self.player.current_weapon,
            self.ship.fire_rate_multiplier,
            ctx.now_ms,
            self.player.last_fire_ms,
        ) else {
            return;
        };
        self.player.last_fire_ms = Some(shot.fired_at_ms);
        for projectile in shot.projectiles {
            self.world.spawn(
                ActorKind::PlayerBullet,
                ActorInit::moving(self.player.position + projectile.offset, projectile.velocity),
            );
        }
        ctx.audio.play_sound(SoundEffect::Laser);
    }

    fn apply_combat(&mut self, report: &CombatReport, ctx: &mut SceneContext<'_>) {
        for event in &report.events {
            match event {
                CombatEvent::EnemyDestroyed { enemy, .. } => {
                    ctx.audio.play_sound(SoundEffect::Explosion);
                    self.spawn_explosion(enemy.position, ctx);
                }
                CombatEvent::PlayerHit { lives_left, .. } => {
                    ctx.audio.play_sound(SoundEffect::Explosion);
                    if let Some(visual) = self.player_visual {
                        ctx.renderer.set_color(visual, Rgb::HIT);
                        self.scope
                            .schedule(ctx.now_ms + ctx.config.hit_flash_ms, PlayTimer::ClearHitFlash);
                    }
                    debug!(lives_left, "player hit");
                }
                CombatEvent::PickupCollected { weapon, .. } => {
                    ctx.audio.play_sound(SoundEffect::Powerup);
                    debug!(weapon = weapon.name, "power-up collected");
                }
                CombatEvent::PickupDropped { .. } => {}
            }
        }
        for actor in report.removed() {
            release_visual(actor, ctx.renderer);
        }
    }

    fn spawn_explosion(&mut self, at: Vec2, ctx: &mut SceneContext<'_>) {
        let burst: Vec<Vec2> = (0..8)
            .map(|i| {
                let angle = i as f32 / 8.0 * std::f32::consts::TAU;
                Vec2::new(angle.cos() * 15.0, angle.sin() * 15.0)
            })
            .collect();
        let handle = ctx
            .renderer
            .draw_shape(ShapeSpec::polygon(at, burst, EXPLOSION_COLOR));
        self.effects.push(handle);
        self.scope.schedule(
            ctx.now_ms + ctx.config.explosion_ms,
            PlayTimer::RemoveEffect(handle),
        );
    }

    fn announce_level(&mut self, level_up: LevelUp, ctx: &mut SceneContext<'_>) {
        // Pull the next wave in if it was scheduled on the slower curve.
        let interval = self.tracker.spawn_interval_ms(level_up.to);
        self.next_spawn_ms = self.next_spawn_ms.min(ctx.now_ms + interval);

        if let Some(previous) = self.level_message.take() {
            ctx.renderer.destroy(previous);
        }
        let message = ctx.renderer.draw_shape(ShapeSpec::text(
            SAFE_ZONE.center(),
            format!("LEVEL {}", level_up.to),
            72.0,
            Rgb(0x00ffff),
        ));
        self.level_message = Some(message);
        self.scope.schedule(
            ctx.now_ms + ctx.config.level_message_ms,
            PlayTimer::HideLevelMessage(message),
        );
    }

    fn begin_defeat(&mut self, ctx: &mut SceneContext<'_>) {
        let final_score = self.player.score;
        self.phase = Phase::Defeated { final_score };
        self.scope
            .schedule(ctx.now_ms + ctx.config.game_over_delay_ms, PlayTimer::EndGame);
        info!(final_score, level = self.player.level, "out of lives");
    }

    fn sync_visuals(&mut self, ctx: &mut SceneContext<'_>) {
        let bullet_color = self.player.current_weapon.color;
        for actor in self.world.iter_mut() {
            match actor.visual {
                Some(handle) => ctx.renderer.set_position(handle, actor.position),
                None => {
                    let shape = actor_shape(actor, bullet_color);
                    actor.visual = Some(ctx.renderer.draw_shape(shape));
                }
            }
        }
        if let Some(visual) = self.player_visual {
            ctx.renderer.set_position(visual, self.player.position);
        }
        self.refresh_hud(ctx);
    }

    fn refresh_hud(&mut self, ctx: &mut SceneContext<'_>) {
        let Some(hud) = self.hud.as_mut() else {
            return;
        };
        let weapon = match self.player.powerup_seconds_left(ctx.now_ms) {
            Some(secs) => format!("{} {secs}s", self.player.current_weapon.name),
            None => self.player.current_weapon.name.to_string(),
        };
        let (score, lives, shown_weapon, level) = &hud.shown;
        if *score != self.player.score {
            ctx.renderer
                .set_text(hud.score, &format!("SCORE: {}", self.player.score));
        }
        if *lives != self.player.lives {
            ctx.renderer
                .set_text(hud.lives, &format!("LIVES: {}", self.player.lives));
        }
        if *shown_weapon != weapon {
            ctx.renderer.set_text(hud.weapon, &weapon);
        }
        if *level != self.player.level {
            ctx.renderer
                .set_text(hud.level, &format!("LEVEL {}", self.player.level));
        }
        hud.shown = (self.player.score, self.player.lives, weapon, self.player.level);
    }

    fn draw_hud(&mut self, renderer: &mut dyn Renderer) {
        let top = SAFE_ZONE.top + 20.0;
        let score = renderer.draw_shape(
            ShapeSpec::text(Vec2::new(SAFE_ZONE.left + 20.0, top), "SCORE: 0", 36.0, Rgb(0x00ffff))
                .anchored(Anchor::TopLeft),
        );
        let lives = renderer.draw_shape(
            ShapeSpec::text(
                Vec2::new(SAFE_ZONE.right - 20.0, top),
                format!("LIVES: {}", self.player.lives),
                36.0,
                Rgb(0xff6666),
            )
            .anchored(Anchor::TopRight),
        );
        let weapon = renderer.draw_shape(
            ShapeSpec::text(
                Vec2::new(SAFE_ZONE.left + 20.0, top + 50.0),
                self.player.current_weapon.name,
                28.0,
                Rgb(0xffff00),
            )
            .anchored(Anchor::TopLeft),
        );
        let level = renderer.draw_shape(ShapeSpec::text(
            Vec2::new(SAFE_ZONE.center().x, top + 18.0),
            "LEVEL 1",
            28.0,
            Rgb(0xaaaaaa),
        ));
        self.hud = Some(Hud {
            score,
            lives,
            weapon,
            level,
            shown: (
                0,
                self.player.lives,
                self.player.current_weapon.name.to_string(),
                1,
            ),
        });
    }
}

impl Scene for PlayScene {
    fn id(&self) -> SceneId {
        SceneId::Play
    }

    fn enter(&mut self, ctx: &mut SceneContext<'_>) {
        self.scope = SceneScope::open(ctx.scope);
        self.starfield = Starfield::spawn(100, ctx.renderer, ctx.rng);
        self.player_visual = Some(ctx.renderer.draw_shape(ShapeSpec::polygon(
            self.player.position,
            ship_outline(),
            self.ship.color,
        )));
        self.draw_hud(ctx.renderer);
        self.next_spawn_ms = ctx.now_ms + self.tracker.spawn_interval_ms(self.player.level);
        self.listener = self.scope.listen(ctx.input);
        info!(ship = self.ship.name, lives = self.player.lives, "session started");
    }

    fn update(&mut self, dt: f32, ctx: &mut SceneContext<'_>) -> Option<Transition> {
        if !self.scope.is_live() {
            return None;
        }
        if let Some(transition) = self.run_timers(ctx) {
            return Some(transition);
        }
        if let Some(token) = self.listener {
            let back = ctx
                .input
                .drain(token)
                .iter()
                .any(|event| event.is_press(LogicalKey::Back));
            if back {
                return Some(Transition::Menu);
            }
        }
        if self.is_defeated() {
            return None;
        }

        let input = ctx.input.snapshot();
        self.move_player(input, dt);
        self.spawn_enemies(ctx);

        for actor in self.world.update(dt) {
            release_visual(&actor, ctx.renderer);
        }

        self.player.expire_powerup(ctx.now_ms);
        self.enemies_fire(dt, ctx);
        self.player_fire(input, ctx);

        let report = collision::resolve(
            &mut self.world,
            &mut self.player,
            ctx.now_ms,
            &self.rules,
            ctx.rng,
        );
        self.apply_combat(&report, ctx);

        if let Some(level_up) = self.tracker.on_score(&mut self.player, report.score_delta) {
            self.announce_level(level_up, ctx);
        }
        if !self.player.is_alive() {
            self.begin_defeat(ctx);
        }

        self.sync_visuals(ctx);
        self.starfield.scroll(dt, ctx.renderer, ctx.rng);
        None
    }

    fn exit(&mut self, ctx: &mut SceneContext<'_>) {
        self.scope.close(ctx.input);
        self.listener = None;
        for actor in self.world.drain() {
            release_visual(&actor, ctx.renderer);
        }
        let hud = self
            .hud
            .take()
            .map(|hud| vec![hud.score, hud.lives, hud.weapon, hud.level])
            .unwrap_or_default();
        let leftovers = self
            .effects
            .drain(..)
            .chain(self.level_message.take())
            .chain(self.player_visual.take())
            .chain(hud);
        for handle in leftovers {
            ctx.renderer.destroy(handle);
        }
        self.starfield.destroy(ctx.renderer);
    }
}

fn release_visual(actor: &Actor, renderer: &mut dyn Renderer) {
    if let Some(handle) = actor.visual {
        renderer.destroy(handle);
    }
}

fn actor_shape(actor: &Actor, bullet_color: Rgb) -> ShapeSpec {
    match actor.kind {
        ActorKind::PlayerBullet => ShapeSpec::rect(actor.position, 6.0, 20.0, bullet_color),
        ActorKind::EnemyBullet => ShapeSpec::circle(actor.position, 4.0, ENEMY_BULLET_COLOR),
        ActorKind::Enemy => ShapeSpec::polygon(
            actor.position,
            vec![
                Vec2::new(0.0, -25.0),
                Vec2::new(20.0, 0.0),
                Vec2::new(0.0, 25.0),
                Vec2::new(-20.0, 0.0),
            ],
            ENEMY_COLOR,
        ),
        ActorKind::Pickup => ShapeSpec::circle(
            actor.position,
            16.0,
            actor.payload.map_or(Rgb::WHITE, |weapon| weapon.color),
        ),
    }
}
