//! Boot scene: opens the session and hands over to the main menu.

use tracing::debug;

use super::{Scene, SceneContext, SceneId, Transition};
use crate::timers::SceneScope;

/// First scene; hands over to the menu on its first frame.
pub struct BootScene {
    scope: SceneScope<()>,
}

impl BootScene {
    pub fn new() -> Self {
        Self {
            scope: SceneScope::closed(),
        }
    }
}

impl Default for BootScene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene for BootScene {
    fn id(&self) -> SceneId {
        SceneId::Boot
    }

    fn enter(&mut self, ctx: &mut SceneContext<'_>) {
        self.scope = SceneScope::open(ctx.scope);
        debug!(canvas = "1920x1080", "boot");
    }

    fn update(&mut self, _dt: f32, _ctx: &mut SceneContext<'_>) -> Option<Transition> {
        self.scope.is_live().then_some(Transition::Menu)
    }

    fn exit(&mut self, ctx: &mut SceneContext<'_>) {
        self.scope.close(ctx.input);
    }
}
