//! Input snapshot and listener registry.
//!
//! Raw key events arrive whenever the platform delivers them.  Gameplay reads
//! a per-frame [`InputSnapshot`] latched by [`InputHub::refresh`], so the held
//! state cannot change halfway through a frame.  Menus consume discrete
//! events through a listener queue obtained from [`InputHub::subscribe`]; the
//! returned token is the only way to unsubscribe, so removal is always exact.

use std::collections::{BTreeMap, VecDeque};

use crate::timers::ScopeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogicalKey {
    Up,
    Down,
    Left,
    Right,
    Confirm,
    Back,
}

impl LogicalKey {
    const COUNT: usize = 6;

    fn index(self) -> usize {
        match self {
            LogicalKey::Up => 0,
            LogicalKey::Down => 1,
            LogicalKey::Left => 2,
            LogicalKey::Right => 3,
            LogicalKey::Confirm => 4,
            LogicalKey::Back => 5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyPhase {
    Pressed,
    Released,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: LogicalKey,
    pub phase: KeyPhase,
}

impl KeyEvent {
    pub fn pressed(key: LogicalKey) -> Self {
        Self {
            key,
            phase: KeyPhase::Pressed,
        }
    }

    pub fn released(key: LogicalKey) -> Self {
        Self {
            key,
            phase: KeyPhase::Released,
        }
    }

    pub fn is_press(&self, key: LogicalKey) -> bool {
        self.key == key && self.phase == KeyPhase::Pressed
    }
}

// ── Snapshot ──────────────────────────────────────────────────────────────────

/// Held-key state for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Confirm doubles as the fire button during play.
    pub fire: bool,
}

impl InputSnapshot {
    /// Horizontal and vertical intent in `-1..=1`.
    pub fn axis(&self) -> (f32, f32) {
        let x = (self.right as i8 - self.left as i8) as f32;
        let y = (self.down as i8 - self.up as i8) as f32;
        (x, y)
    }
}

// ── Hub ───────────────────────────────────────────────────────────────────────

/// Proof of a listener registration, required to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerToken(u64);

struct Listener {
    scope: ScopeId,
    queue: VecDeque<KeyEvent>,
}

#[derive(Default)]
pub struct InputHub {
    held: [bool; LogicalKey::COUNT],
    /// Keys that went down since the last refresh, even if already released.
    tapped: [bool; LogicalKey::COUNT],
    snapshot: InputSnapshot,
    listeners: BTreeMap<ListenerToken, Listener>,
    next_token: u64,
}

impl InputHub {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Raw events ────────────────────────────────────────────────────────────

    pub fn key_down(&mut self, key: LogicalKey) {
        self.held[key.index()] = true;
        self.tapped[key.index()] = true;
        self.broadcast(KeyEvent::pressed(key));
    }

    pub fn key_up(&mut self, key: LogicalKey) {
        self.held[key.index()] = false;
        self.broadcast(KeyEvent::released(key));
    }

    pub fn is_held(&self, key: LogicalKey) -> bool {
        self.held[key.index()]
    }

    fn broadcast(&mut self, event: KeyEvent) {
        for listener in self.listeners.values_mut() {
            listener.queue.push_back(event);
        }
    }

    // ── Snapshot ──────────────────────────────────────────────────────────────

    /// Latch the held state for the coming frame.
    pub fn refresh(&mut self) -> InputSnapshot {
        let down = |key: LogicalKey| self.held[key.index()] || self.tapped[key.index()];
        let snapshot = InputSnapshot {
            left: down(LogicalKey::Left),
            right: down(LogicalKey::Right),
            up: down(LogicalKey::Up),
            down: down(LogicalKey::Down),
            fire: down(LogicalKey::Confirm),
        };
        self.snapshot = snapshot;
        self.tapped = [false; LogicalKey::COUNT];
        self.snapshot
    }

    pub fn snapshot(&self) -> InputSnapshot {
        self.snapshot
    }

    // ── Listeners ─────────────────────────────────────────────────────────────

    pub fn subscribe(&mut self, scope: ScopeId) -> ListenerToken {
        let token = ListenerToken(self.next_token);
        self.next_token += 1;
        self.listeners.insert(
            token,
            Listener {
                scope,
                queue: VecDeque::new(),
            },
        );
        token
    }

    /// Remove exactly the registration behind `token`.  Returns `false` if it
    /// was already gone.
    pub fn unsubscribe(&mut self, token: ListenerToken) -> bool {
        self.listeners.remove(&token).is_some()
    }

    /// Drop every registration still tied to `scope`; returns how many there
    /// were.
    pub fn release_scope(&mut self, scope: ScopeId) -> usize {
        let before = self.listeners.len();
        self.listeners.retain(|_, listener| listener.scope != scope);
        before - self.listeners.len()
    }

    /// Take the pending events for one listener.  Unknown tokens get nothing.
    pub fn drain(&mut self, token: ListenerToken) -> Vec<KeyEvent> {
        self.listeners
            .get_mut(&token)
            .map(|listener| listener.queue.drain(..).collect())
            .unwrap_or_default()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Forget held keys, e.g. after a scene change so a held Confirm from the
    /// menu does not fire the first shot.
    pub fn clear_held(&mut self) {
        self.held = [false; LogicalKey::COUNT];
        self.tapped = [false; LogicalKey::COUNT];
        self.snapshot = InputSnapshot::default();
    }
}
