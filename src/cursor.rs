//! Selection cursor for D-pad driven menus.
//!
//! The navigator tracks an index into an ordered entry list and tells each
//! entry whether it is highlighted; drawing the highlight is the renderer's
//! job.  While disabled, or with no entries, every call is a no-op.

use crate::entities::Handle;
use crate::render::Renderer;
use crate::ships::ShipId;

// ── Entries ───────────────────────────────────────────────────────────────────

/// Anything the cursor can point at.
pub trait Highlight {
    fn set_highlighted(&self, renderer: &mut dyn Renderer, highlighted: bool);
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextEntry {
    pub label: Handle,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShipCardEntry {
    pub ship: ShipId,
    pub frame: Handle,
    pub name: Handle,
}

#[derive(Clone, Debug, PartialEq)]
pub enum MenuEntry {
    Text(TextEntry),
    ShipCard(ShipCardEntry),
}

impl MenuEntry {
    pub fn text(label: Handle) -> Self {
        MenuEntry::Text(TextEntry { label })
    }

    /// Every renderer handle this entry owns.
    pub fn handles(&self) -> Vec<Handle> {
        match self {
            MenuEntry::Text(entry) => vec![entry.label],
            MenuEntry::ShipCard(card) => vec![card.frame, card.name],
        }
    }
}

impl Highlight for MenuEntry {
    fn set_highlighted(&self, renderer: &mut dyn Renderer, highlighted: bool) {
        match self {
            MenuEntry::Text(entry) => renderer.set_highlight(entry.label, highlighted),
            MenuEntry::ShipCard(card) => {
                renderer.set_highlight(card.frame, highlighted);
                renderer.set_highlight(card.name, highlighted);
            }
        }
    }
}

// ── Navigator ─────────────────────────────────────────────────────────────────

pub type ConfirmFn<T, R> = Box<dyn FnMut(usize, &T) -> R>;

pub struct CursorNavigator<T, R> {
    entries: Vec<T>,
    index: usize,
    enabled: bool,
    on_confirm: Option<ConfirmFn<T, R>>,
}

impl<T, R> Default for CursorNavigator<T, R> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: 0,
            enabled: false,
            on_confirm: None,
        }
    }
}

impl<T: Highlight, R> CursorNavigator<T, R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entries, select the first one and enable navigation.
    pub fn set_entries(
        &mut self,
        entries: Vec<T>,
        on_confirm: impl FnMut(usize, &T) -> R + 'static,
        renderer: &mut dyn Renderer,
    ) {
        self.entries = entries;
        self.on_confirm = Some(Box::new(on_confirm));
        self.index = 0;
        self.enabled = true;
        self.refresh_highlight(renderer);
    }

    /// Clear the entries and ignore navigation until the next `set_entries`.
    /// The entries are handed back so the caller can tear down their visuals.
    pub fn disable(&mut self) -> Vec<T> {
        self.enabled = false;
        self.index = 0;
        self.on_confirm = None;
        std::mem::take(&mut self.entries)
    }

    pub fn is_active(&self) -> bool {
        self.enabled && !self.entries.is_empty()
    }

    /// Current index, or `None` while navigation is unavailable.
    pub fn index(&self) -> Option<usize> {
        self.is_active().then_some(self.index)
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub fn move_next(&mut self, renderer: &mut dyn Renderer) {
        if !self.is_active() {
            return;
        }
        self.index = (self.index + 1) % self.entries.len();
        self.refresh_highlight(renderer);
    }

    pub fn move_previous(&mut self, renderer: &mut dyn Renderer) {
        if !self.is_active() {
            return;
        }
        let len = self.entries.len();
        self.index = (self.index + len - 1) % len;
        self.refresh_highlight(renderer);
    }

    /// Jump straight to `index`; out-of-range requests are ignored.
    pub fn select(&mut self, index: usize, renderer: &mut dyn Renderer) {
        if !self.is_active() || index >= self.entries.len() {
            return;
        }
        self.index = index;
        self.refresh_highlight(renderer);
    }

    /// Invoke the confirm callback with the current entry.
    pub fn confirm(&mut self) -> Option<R> {
        if !self.is_active() {
            return None;
        }
        let entry = &self.entries[self.index];
        self.on_confirm
            .as_mut()
            .map(|on_confirm| on_confirm(self.index, entry))
    }

    fn refresh_highlight(&self, renderer: &mut dyn Renderer) {
        for (i, entry) in self.entries.iter().enumerate() {
            entry.set_highlighted(renderer, i == self.index);
        }
    }
}
