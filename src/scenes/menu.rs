//! Main menu: START GAME, HOW TO PLAY, EXIT.

use super::backdrop::Starfield;
use super::{Scene, SceneContext, SceneId, ShipSelectSetup, Transition};
use crate::cursor::{CursorNavigator, MenuEntry};
use crate::entities::Handle;
use crate::geometry::{Vec2, SAFE_ZONE};
use crate::input::{KeyEvent, ListenerToken, LogicalKey};
use crate::render::{Renderer, Rgb, ShapeSpec};
use crate::timers::SceneScope;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuChoice {
    Start,
    HowToPlay,
    Exit,
}

const CHOICES: [(MenuChoice, &str); 3] = [
    (MenuChoice::Start, "▶ START GAME"),
    (MenuChoice::HowToPlay, "? HOW TO PLAY"),
    (MenuChoice::Exit, "✕ EXIT"),
];

const HOW_TO_PLAY: &str = "HOW TO PLAY\n\n\
    ← → ↑ ↓ : Move ship\n\
    ENTER : Fire\n\
    Destroy enemies to score points!\n\
    Catch falling pickups for new weapons.\n\
    Avoid enemy fire!\n\n\
    Press ENTER to go back";

pub struct MenuScene {
    scope: SceneScope<()>,
    listener: Option<ListenerToken>,
    nav: CursorNavigator<MenuEntry, MenuChoice>,
    starfield: Starfield,
    decor: Vec<Handle>,
    /// Overlay visuals plus the entries parked while it is open.
    overlay: Option<(Vec<Handle>, Vec<MenuEntry>)>,
}

impl MenuScene {
    pub fn new() -> Self {
        Self {
            scope: SceneScope::closed(),
            listener: None,
            nav: CursorNavigator::new(),
            starfield: Starfield::default(),
            decor: Vec::new(),
            overlay: None,
        }
    }

    pub fn navigator(&self) -> &CursorNavigator<MenuEntry, MenuChoice> {
        &self.nav
    }

    pub fn is_overlay_open(&self) -> bool {
        self.overlay.is_some()
    }

    fn arm(&mut self, entries: Vec<MenuEntry>, renderer: &mut dyn Renderer) {
        self.nav.set_entries(entries, |index, _| CHOICES[index].0, renderer);
    }

    fn open_overlay(&mut self, renderer: &mut dyn Renderer) {
        let parked = self.nav.disable();
        let shade = renderer.draw_shape(ShapeSpec::rect(
            SAFE_ZONE.center(),
            SAFE_ZONE.width(),
            SAFE_ZONE.height(),
            Rgb(0x000000),
        ));
        let text = renderer.draw_shape(ShapeSpec::text(
            Vec2::new(960.0, 400.0),
            HOW_TO_PLAY,
            36.0,
            Rgb::WHITE,
        ));
        self.overlay = Some((vec![shade, text], parked));
    }

    fn close_overlay(&mut self, renderer: &mut dyn Renderer) {
        if let Some((visuals, parked)) = self.overlay.take() {
            for handle in visuals {
                renderer.destroy(handle);
            }
            self.arm(parked, renderer);
        }
    }

    fn handle(&mut self, event: KeyEvent, ctx: &mut SceneContext<'_>) -> Option<Transition> {
        if self.overlay.is_some() {
            if event.is_press(LogicalKey::Confirm) || event.is_press(LogicalKey::Back) {
                self.close_overlay(ctx.renderer);
            }
            return None;
        }
        if event.is_press(LogicalKey::Up) {
            self.nav.move_previous(ctx.renderer);
        } else if event.is_press(LogicalKey::Down) {
            self.nav.move_next(ctx.renderer);
        } else if event.is_press(LogicalKey::Confirm) {
            match self.nav.confirm()? {
                MenuChoice::Start => {
                    return Some(Transition::ShipSelect(ShipSelectSetup::default()))
                }
                MenuChoice::HowToPlay => self.open_overlay(ctx.renderer),
                MenuChoice::Exit => return Some(Transition::Quit),
            }
        }
        None
    }
}

impl Default for MenuScene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for MenuScene {
    fn id(&self) -> SceneId {
        SceneId::Menu
    }

    fn enter(&mut self, ctx: &mut SceneContext<'_>) {
        self.scope = SceneScope::open(ctx.scope);
        self.starfield = Starfield::spawn(200, ctx.renderer, ctx.rng);

        let title = ctx.renderer.draw_shape(ShapeSpec::text(
            Vec2::new(960.0, SAFE_ZONE.top + 150.0),
            "SPACE BLASTER",
            72.0,
            Rgb(0x00ffff),
        ));
        let hint = ctx.renderer.draw_shape(ShapeSpec::text(
            Vec2::new(960.0, SAFE_ZONE.bottom - 80.0),
            "Use ↑↓ to navigate • ENTER to select",
            28.0,
            Rgb(0xaaaaaa),
        ));
        self.decor = vec![title, hint];

        let entries = CHOICES
            .iter()
            .enumerate()
            .map(|(i, (_, label))| {
                MenuEntry::text(ctx.renderer.draw_shape(ShapeSpec::text(
                    Vec2::new(960.0, 480.0 + 80.0 * i as f32),
                    *label,
                    48.0,
                    Rgb::WHITE,
                )))
            })
            .collect();
        self.arm(entries, ctx.renderer);

        self.listener = self.scope.listen(ctx.input);
        ctx.audio.start_music();
    }

    fn update(&mut self, _dt: f32, ctx: &mut SceneContext<'_>) -> Option<Transition> {
        let token = self.listener.filter(|_| self.scope.is_live())?;
        for event in ctx.input.drain(token) {
            if let Some(transition) = self.handle(event, ctx) {
                return Some(transition);
            }
        }
        None
    }

    fn exit(&mut self, ctx: &mut SceneContext<'_>) {
        self.scope.close(ctx.input);
        self.listener = None;
        self.close_overlay(ctx.renderer);
        for entry in self.nav.disable() {
            entry.handles().into_iter().for_each(|h| ctx.renderer.destroy(h));
        }
        for handle in self.decor.drain(..) {
            ctx.renderer.destroy(handle);
        }
        self.starfield.destroy(ctx.renderer);
    }
}
