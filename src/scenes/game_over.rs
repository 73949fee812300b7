//! Game over screen: final score plus PLAY AGAIN / MAIN MENU.

use super::{GameOverReport, Scene, SceneContext, SceneId, ShipSelectSetup, Transition};
use crate::cursor::{CursorNavigator, MenuEntry};
use crate::entities::Handle;
use crate::geometry::{Vec2, CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::input::{ListenerToken, LogicalKey};
use crate::render::{Rgb, ShapeSpec};
use crate::timers::SceneScope;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameOverChoice {
    PlayAgain,
    MainMenu,
}

const CHOICES: [(GameOverChoice, &str); 2] = [
    (GameOverChoice::PlayAgain, "▶ PLAY AGAIN"),
    (GameOverChoice::MainMenu, "◀ MAIN MENU"),
];

pub struct GameOverScene {
    report: GameOverReport,
    scope: SceneScope<()>,
    listener: Option<ListenerToken>,
    nav: CursorNavigator<MenuEntry, GameOverChoice>,
    decor: Vec<Handle>,
}

impl GameOverScene {
    pub fn new(report: GameOverReport) -> Self {
        Self {
            report,
            scope: SceneScope::closed(),
            listener: None,
            nav: CursorNavigator::new(),
            decor: Vec::new(),
        }
    }

    pub fn report(&self) -> GameOverReport {
        self.report
    }

    pub fn navigator(&self) -> &CursorNavigator<MenuEntry, GameOverChoice> {
        &self.nav
    }

    fn choose(&self, choice: GameOverChoice) -> Transition {
        match choice {
            GameOverChoice::PlayAgain => Transition::ShipSelect(ShipSelectSetup {
                preferred: Some(self.report.ship),
            }),
            GameOverChoice::MainMenu => Transition::Menu,
        }
    }
}

impl Scene for GameOverScene {
    fn id(&self) -> SceneId {
        SceneId::GameOver
    }

    fn enter(&mut self, ctx: &mut SceneContext<'_>) {
        self.scope = SceneScope::open(ctx.scope);
        let backdrop = ctx.renderer.draw_shape(ShapeSpec::rect(
            Vec2::new(CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0),
            CANVAS_WIDTH,
            CANVAS_HEIGHT,
            Rgb(0x1a0a0a),
        ));
        let title = ctx.renderer.draw_shape(ShapeSpec::text(
            Vec2::new(960.0, 300.0),
            "GAME OVER",
            96.0,
            Rgb(0xff4444),
        ));
        let score = ctx.renderer.draw_shape(ShapeSpec::text(
            Vec2::new(960.0, 450.0),
            format!("FINAL SCORE: {}", self.report.final_score),
            48.0,
            Rgb::WHITE,
        ));
        let level = ctx.renderer.draw_shape(ShapeSpec::text(
            Vec2::new(960.0, 510.0),
            format!("LEVEL REACHED: {}", self.report.level),
            32.0,
            Rgb(0xaaaaaa),
        ));
        self.decor = vec![backdrop, title, score, level];

        let entries = CHOICES
            .iter()
            .enumerate()
            .map(|(i, (_, label))| {
                MenuEntry::text(ctx.renderer.draw_shape(ShapeSpec::text(
                    Vec2::new(960.0, 600.0 + 80.0 * i as f32),
                    *label,
                    42.0,
                    Rgb::WHITE,
                )))
            })
            .collect();
        self.nav.set_entries(entries, |index, _| CHOICES[index].0, ctx.renderer);
        self.listener = self.scope.listen(ctx.input);
    }

    fn update(&mut self, _dt: f32, ctx: &mut SceneContext<'_>) -> Option<Transition> {
        let token = self.listener.filter(|_| self.scope.is_live())?;
        for event in ctx.input.drain(token) {
            if event.is_press(LogicalKey::Up) {
                self.nav.move_previous(ctx.renderer);
            } else if event.is_press(LogicalKey::Down) {
                self.nav.move_next(ctx.renderer);
            } else if event.is_press(LogicalKey::Confirm) {
                if let Some(choice) = self.nav.confirm() {
                    return Some(self.choose(choice));
                }
            } else if event.is_press(LogicalKey::Back) {
                return Some(Transition::Menu);
            }
        }
        None
    }

    fn exit(&mut self, ctx: &mut SceneContext<'_>) {
        self.scope.close(ctx.input);
        self.listener = None;
        for entry in self.nav.disable() {
            entry.handles().into_iter().for_each(|h| ctx.renderer.destroy(h));
        }
        for handle in self.decor.drain(..) {
            ctx.renderer.destroy(handle);
        }
    }
}
