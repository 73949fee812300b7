//! Deferred callbacks and per-scene cancellation scopes.
//!
//! Timers are plain data: an action value due at a timestamp.  A scene owns a
//! [`SceneScope`] holding its timers and listener registrations; closing the
//! scope on exit cancels both at once, after which nothing scheduled by that
//! scene can fire.

use crate::input::{InputHub, ListenerToken};

/// Identity of one scene activation.  Re-entering a scene gets a fresh id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Timer<A> {
    id: TimerId,
    due_ms: u64,
    action: A,
}

#[derive(Debug)]
pub struct TimerQueue<A> {
    timers: Vec<Timer<A>>,
    next_id: u64,
}

impl<A> Default for TimerQueue<A> {
    fn default() -> Self {
        Self {
            timers: Vec::new(),
            next_id: 0,
        }
    }
}

impl<A> TimerQueue<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_ms: u64, action: A) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer { id, due_ms, action });
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.id != id);
        before != self.timers.len()
    }

    /// Remove and return every action due at `now_ms`, earliest first; ties
    /// fire in scheduling order.
    pub fn drain_due(&mut self, now_ms: u64) -> Vec<A> {
        let (mut due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.timers)
            .into_iter()
            .partition(|timer| timer.due_ms <= now_ms);
        self.timers = pending;
        due.sort_by_key(|timer| (timer.due_ms, timer.id));
        due.into_iter().map(|timer| timer.action).collect()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

// ── Scene scope ───────────────────────────────────────────────────────────────

/// Everything a scene registers while active.
#[derive(Debug)]
pub struct SceneScope<A> {
    id: ScopeId,
    live: bool,
    listeners: Vec<ListenerToken>,
    timers: TimerQueue<A>,
}

impl<A> SceneScope<A> {
    pub fn open(id: ScopeId) -> Self {
        Self {
            id,
            live: true,
            listeners: Vec::new(),
            timers: TimerQueue::new(),
        }
    }

    /// A scope that was never entered; behaves like a closed one.
    pub fn closed() -> Self {
        Self {
            id: ScopeId(u64::MAX),
            live: false,
            listeners: Vec::new(),
            timers: TimerQueue::new(),
        }
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Register an input listener owned by this scope.
    pub fn listen(&mut self, hub: &mut InputHub) -> Option<ListenerToken> {
        if !self.live {
            return None;
        }
        let token = hub.subscribe(self.id);
        self.listeners.push(token);
        Some(token)
    }

    pub fn schedule(&mut self, due_ms: u64, action: A) -> Option<TimerId> {
        self.live.then(|| self.timers.schedule(due_ms, action))
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.timers.cancel(id)
    }

    /// Due actions; always empty once the scope is closed.
    pub fn due(&mut self, now_ms: u64) -> Vec<A> {
        if !self.live {
            return Vec::new();
        }
        self.timers.drain_due(now_ms)
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Cancel every timer and unsubscribe every listener.  Idempotent.
    pub fn close(&mut self, hub: &mut InputHub) {
        for token in self.listeners.drain(..) {
            hub.unsubscribe(token);
        }
        self.timers.clear();
        self.live = false;
    }
}
