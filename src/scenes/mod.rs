//! Scene state machine.
//!
//! ## States
//!
//! | Scene        | Leaves to                      | Trigger                          |
//! |--------------|--------------------------------|----------------------------------|
//! | `Boot`       | `Menu`                         | automatic, first frame           |
//! | `Menu`       | `ShipSelect`, quit             | START GAME / EXIT                |
//! | `ShipSelect` | `Play`, `Menu`                 | confirm a ship / back            |
//! | `Play`       | `GameOver`, `Menu`             | lives reach 0 (+ grace) / back   |
//! | `GameOver`   | `ShipSelect`, `Menu`           | PLAY AGAIN / MAIN MENU or back   |
//!
//! Exactly one scene is active.  Data crosses a transition only as the
//! [`Transition`] payload handed to the next scene's constructor.  Every scene
//! activation gets a fresh [`ScopeId`]; on exit the machine closes the scene
//! and then releases anything still registered against that scope, so no
//! listener or timer outlives its scene.

mod backdrop;
mod boot;
mod game_over;
mod menu;
mod play;
mod ship_select;

pub use boot::BootScene;
pub use game_over::{GameOverChoice, GameOverScene};
pub use menu::{MenuChoice, MenuScene};
pub use play::{PlayScene, PlayTimer};
pub use ship_select::ShipSelectScene;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{info, warn};

use crate::config::GameConfig;
use crate::error::{GameError, GameResult};
use crate::input::{InputHub, LogicalKey};
use crate::render::{AudioContext, Renderer};
use crate::ships::ShipId;
use crate::timers::ScopeId;

// ── Scene ids & payloads ──────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SceneId {
    Boot,
    Menu,
    ShipSelect,
    Play,
    GameOver,
}

impl SceneId {
    /// Whether this scene owns a transition to `to`.
    pub fn check_transition(self, to: SceneId) -> GameResult<()> {
        use SceneId::*;
        let allowed = matches!(
            (self, to),
            (Boot, Menu)
                | (Menu, ShipSelect)
                | (ShipSelect, Play)
                | (ShipSelect, Menu)
                | (Play, GameOver)
                | (Play, Menu)
                | (GameOver, ShipSelect)
                | (GameOver, Menu)
        );
        if allowed {
            Ok(())
        } else {
            Err(GameError::IllegalTransition { from: self, to })
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShipSelectSetup {
    /// Ship to pre-highlight, e.g. the one just played.
    pub preferred: Option<ShipId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaySetup {
    pub ship: ShipId,
}

/// Result of a finished session, carried from Play to GameOver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameOverReport {
    pub final_score: u32,
    pub level: u32,
    pub ship: ShipId,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Transition {
    Menu,
    ShipSelect(ShipSelectSetup),
    Play(PlaySetup),
    GameOver(GameOverReport),
    /// Leave the program (main menu EXIT).
    Quit,
}

impl Transition {
    pub fn target(&self) -> Option<SceneId> {
        match self {
            Transition::Menu => Some(SceneId::Menu),
            Transition::ShipSelect(_) => Some(SceneId::ShipSelect),
            Transition::Play(_) => Some(SceneId::Play),
            Transition::GameOver(_) => Some(SceneId::GameOver),
            Transition::Quit => None,
        }
    }
}

// ── Scene trait ───────────────────────────────────────────────────────────────

/// Per-call view of the machine's collaborators.
pub struct SceneContext<'a> {
    pub now_ms: u64,
    /// Scope of the scene being called.
    pub scope: ScopeId,
    pub input: &'a mut InputHub,
    pub renderer: &'a mut dyn Renderer,
    pub audio: &'a mut AudioContext,
    pub config: &'a GameConfig,
    pub rng: &'a mut dyn RngCore,
}

pub trait Scene {
    fn id(&self) -> SceneId;

    /// Allocate visuals and register listeners/timers against `ctx.scope`.
    fn enter(&mut self, ctx: &mut SceneContext<'_>);

    /// One frame.  `dt` is in seconds.
    fn update(&mut self, dt: f32, ctx: &mut SceneContext<'_>) -> Option<Transition>;

    /// Release visuals, listeners and pending timers.
    fn exit(&mut self, ctx: &mut SceneContext<'_>);
}

/// The closed set of scenes.
pub enum ActiveScene {
    Boot(BootScene),
    Menu(MenuScene),
    ShipSelect(ShipSelectScene),
    Play(PlayScene),
    GameOver(GameOverScene),
}

impl ActiveScene {
    fn build(transition: Transition, config: &GameConfig) -> Option<Self> {
        let scene = match transition {
            Transition::Menu => ActiveScene::Menu(MenuScene::new()),
            Transition::ShipSelect(setup) => ActiveScene::ShipSelect(ShipSelectScene::new(setup)),
            Transition::Play(setup) => ActiveScene::Play(PlayScene::new(setup, config)),
            Transition::GameOver(report) => ActiveScene::GameOver(GameOverScene::new(report)),
            Transition::Quit => return None,
        };
        Some(scene)
    }

    pub fn scene(&self) -> &dyn Scene {
        match self {
            ActiveScene::Boot(scene) => scene,
            ActiveScene::Menu(scene) => scene,
            ActiveScene::ShipSelect(scene) => scene,
            ActiveScene::Play(scene) => scene,
            ActiveScene::GameOver(scene) => scene,
        }
    }

    pub fn scene_mut(&mut self) -> &mut dyn Scene {
        match self {
            ActiveScene::Boot(scene) => scene,
            ActiveScene::Menu(scene) => scene,
            ActiveScene::ShipSelect(scene) => scene,
            ActiveScene::Play(scene) => scene,
            ActiveScene::GameOver(scene) => scene,
        }
    }
}

// ── Machine ───────────────────────────────────────────────────────────────────

/// Owns the active scene and every collaborator, and runs one fixed-order
/// tick per frame: latch input, update the active scene, apply any
/// transition.
pub struct SceneMachine<R: Renderer> {
    active: ActiveScene,
    scope: ScopeId,
    next_scope: u64,
    input: InputHub,
    renderer: R,
    audio: AudioContext,
    config: GameConfig,
    rng: StdRng,
    now_ms: u64,
    finished: bool,
}

impl<R: Renderer> SceneMachine<R> {
    /// Build the machine and enter `Boot`.
    pub fn new(renderer: R, audio: AudioContext, config: GameConfig, seed: u64) -> Self {
        let mut machine = Self {
            active: ActiveScene::Boot(BootScene::new()),
            scope: ScopeId(0),
            next_scope: 1,
            input: InputHub::new(),
            renderer,
            audio,
            config,
            rng: StdRng::seed_from_u64(seed),
            now_ms: 0,
            finished: false,
        };
        machine.with_scene(|scene, ctx| scene.enter(ctx));
        info!(scene = ?SceneId::Boot, "entered scene");
        machine
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    /// A key went down.  The first one also wakes the audio context.
    pub fn key_down(&mut self, key: LogicalKey) {
        self.audio.resume();
        self.input.key_down(key);
    }

    pub fn key_up(&mut self, key: LogicalKey) {
        self.input.key_up(key);
    }

    // ── Frame ─────────────────────────────────────────────────────────────────

    /// Advance the clock by `dt_ms` and run one frame.
    pub fn tick(&mut self, dt_ms: u64) {
        if self.finished {
            return;
        }
        self.now_ms += dt_ms;
        self.input.refresh();
        let dt = dt_ms as f32 / 1000.0;
        if let Some(transition) = self.with_scene(|scene, ctx| scene.update(dt, ctx)) {
            self.apply(transition);
        }
    }

    fn apply(&mut self, transition: Transition) {
        let from = self.active_id();
        let Some(to) = transition.target() else {
            if from != SceneId::Menu {
                warn!(?from, "quit requested outside the main menu; ignored");
                return;
            }
            self.leave_active();
            self.finished = true;
            info!("quit requested");
            return;
        };
        if let Err(err) = from.check_transition(to) {
            warn!(%err, "transition rejected");
            return;
        }

        self.leave_active();
        let Some(next) = ActiveScene::build(transition, &self.config) else {
            return;
        };
        self.active = next;
        self.scope = ScopeId(self.next_scope);
        self.next_scope += 1;
        self.input.clear_held();
        self.with_scene(|scene, ctx| scene.enter(ctx));
        info!(?from, ?to, "scene transition");
    }

    fn leave_active(&mut self) {
        self.with_scene(|scene, ctx| scene.exit(ctx));
        let leaked = self.input.release_scope(self.scope);
        if leaked > 0 {
            warn!(scene = ?self.active_id(), leaked, "scene exited with live listeners");
        }
    }

    fn with_scene<T>(
        &mut self,
        f: impl FnOnce(&mut dyn Scene, &mut SceneContext<'_>) -> T,
    ) -> T {
        let Self {
            active,
            scope,
            input,
            renderer,
            audio,
            config,
            rng,
            now_ms,
            ..
        } = self;
        let mut ctx = SceneContext {
            now_ms: *now_ms,
            scope: *scope,
            input,
            renderer,
            audio,
            config,
            rng,
        };
        f(active.scene_mut(), &mut ctx)
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn active_id(&self) -> SceneId {
        self.active.scene().id()
    }

    pub fn active(&self) -> &ActiveScene {
        &self.active
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn input(&self) -> &InputHub {
        &self.input
    }

    pub fn audio(&self) -> &AudioContext {
        &self.audio
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn play(&self) -> Option<&PlayScene> {
        match &self.active {
            ActiveScene::Play(scene) => Some(scene),
            _ => None,
        }
    }

    pub fn play_mut(&mut self) -> Option<&mut PlayScene> {
        match &mut self.active {
            ActiveScene::Play(scene) => Some(scene),
            _ => None,
        }
    }

    pub fn game_over(&self) -> Option<&GameOverScene> {
        match &self.active {
            ActiveScene::GameOver(scene) => Some(scene),
            _ => None,
        }
    }
}
