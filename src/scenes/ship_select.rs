//! Ship selection: one card per registry ship, laid out left to right.

use super::{PlaySetup, Scene, SceneContext, SceneId, ShipSelectSetup, Transition};
use crate::cursor::{CursorNavigator, MenuEntry, ShipCardEntry};
use crate::entities::Handle;
use crate::geometry::{Vec2, SAFE_ZONE};
use crate::input::{ListenerToken, LogicalKey};
use crate::render::{Rgb, ShapeSpec};
use crate::ships::{ShipId, SHIP_REGISTRY};
use crate::timers::SceneScope;

const CARD_WIDTH: f32 = 360.0;
const CARD_HEIGHT: f32 = 420.0;
const CARD_GAP: f32 = 80.0;
const CARD_Y: f32 = 540.0;

pub struct ShipSelectScene {
    setup: ShipSelectSetup,
    scope: SceneScope<()>,
    listener: Option<ListenerToken>,
    nav: CursorNavigator<MenuEntry, ShipId>,
    /// Title, hint and per-card decorations not owned by an entry.
    decor: Vec<Handle>,
}

impl ShipSelectScene {
    pub fn new(setup: ShipSelectSetup) -> Self {
        Self {
            setup,
            scope: SceneScope::closed(),
            listener: None,
            nav: CursorNavigator::new(),
            decor: Vec::new(),
        }
    }

    pub fn navigator(&self) -> &CursorNavigator<MenuEntry, ShipId> {
        &self.nav
    }

    fn card_center(index: usize) -> Vec2 {
        let count = SHIP_REGISTRY.len() as f32;
        let row_width = count * CARD_WIDTH + (count - 1.0) * CARD_GAP;
        let left = SAFE_ZONE.center().x - row_width / 2.0 + CARD_WIDTH / 2.0;
        Vec2::new(left + index as f32 * (CARD_WIDTH + CARD_GAP), CARD_Y)
    }
}

impl Scene for ShipSelectScene {
    fn id(&self) -> SceneId {
        SceneId::ShipSelect
    }

    fn enter(&mut self, ctx: &mut SceneContext<'_>) {
        self.scope = SceneScope::open(ctx.scope);
        let title = ctx.renderer.draw_shape(ShapeSpec::text(
            Vec2::new(960.0, SAFE_ZONE.top + 120.0),
            "SELECT YOUR SHIP",
            64.0,
            Rgb(0x00ffff),
        ));
        let hint = ctx.renderer.draw_shape(ShapeSpec::text(
            Vec2::new(960.0, SAFE_ZONE.bottom - 80.0),
            "← → to choose • ENTER to launch • BACK for menu",
            28.0,
            Rgb(0xaaaaaa),
        ));
        self.decor = vec![title, hint];

        let mut entries = Vec::with_capacity(SHIP_REGISTRY.len());
        for (index, ship) in SHIP_REGISTRY.iter().enumerate() {
            let center = Self::card_center(index);
            let frame = ctx.renderer.draw_shape(ShapeSpec::rect(
                center,
                CARD_WIDTH,
                CARD_HEIGHT,
                Rgb(0x223344),
            ));
            let hull = ctx.renderer.draw_shape(ShapeSpec::polygon(
                center + Vec2::new(0.0, -60.0),
                ship_outline(),
                ship.color,
            ));
            let name = ctx.renderer.draw_shape(ShapeSpec::text(
                center + Vec2::new(0.0, 60.0),
                ship.name,
                42.0,
                Rgb::WHITE,
            ));
            let stats = ctx.renderer.draw_shape(ShapeSpec::text(
                center + Vec2::new(0.0, 130.0),
                ship.tagline,
                24.0,
                Rgb(0xaaaaaa),
            ));
            self.decor.extend([hull, stats]);
            entries.push(MenuEntry::ShipCard(ShipCardEntry {
                ship: ship.id,
                frame,
                name,
            }));
        }
        self.nav.set_entries(
            entries,
            |_, entry| match entry {
                MenuEntry::ShipCard(card) => card.ship,
                MenuEntry::Text(_) => ShipId::Viper,
            },
            ctx.renderer,
        );
        if let Some(preferred) = self.setup.preferred {
            self.nav.select(preferred.index(), ctx.renderer);
        }

        self.listener = self.scope.listen(ctx.input);
    }

    fn update(&mut self, _dt: f32, ctx: &mut SceneContext<'_>) -> Option<Transition> {
        let token = self.listener.filter(|_| self.scope.is_live())?;
        for event in ctx.input.drain(token) {
            if event.is_press(LogicalKey::Left) || event.is_press(LogicalKey::Up) {
                self.nav.move_previous(ctx.renderer);
            } else if event.is_press(LogicalKey::Right) || event.is_press(LogicalKey::Down) {
                self.nav.move_next(ctx.renderer);
            } else if event.is_press(LogicalKey::Confirm) {
                if let Some(ship) = self.nav.confirm() {
                    return Some(Transition::Play(PlaySetup { ship }));
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

/// Triangle hull with an engine block, relative to the ship centre.
pub(crate) fn ship_outline() -> Vec<Vec2> {
    vec![
        Vec2::new(0.0, -30.0),
        Vec2::new(25.0, 30.0),
        Vec2::new(10.0, 30.0),
        Vec2::new(10.0, 35.0),
        Vec2::new(-10.0, 35.0),
        Vec2::new(-10.0, 30.0),
        Vec2::new(-25.0, 30.0),
    ]
}
