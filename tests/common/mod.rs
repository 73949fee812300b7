//! Test doubles shared by the integration tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use space_blaster::config::GameConfig;
use space_blaster::error::{GameError, GameResult};
use space_blaster::geometry::Vec2;
use space_blaster::input::LogicalKey;
use space_blaster::render::{
    AudioBackend, AudioContext, Handle, Renderer, Rgb, ShapeKind, ShapeSpec, SoundEffect,
};
use space_blaster::scenes::{SceneId, SceneMachine};

// ── Renderer ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Recorded {
    pub spec: ShapeSpec,
    pub highlighted: bool,
}

/// Keeps every live shape so tests can inspect what a scene put on screen.
#[derive(Default)]
pub struct RecordingRenderer {
    pub shapes: BTreeMap<Handle, Recorded>,
    pub destroyed: Vec<Handle>,
    next: u64,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live(&self) -> usize {
        self.shapes.len()
    }

    pub fn get(&self, handle: Handle) -> Option<&Recorded> {
        self.shapes.get(&handle)
    }

    pub fn is_highlighted(&self, handle: Handle) -> bool {
        self.get(handle).is_some_and(|shape| shape.highlighted)
    }

    pub fn color_of(&self, handle: Handle) -> Option<Rgb> {
        self.get(handle).map(|shape| shape.spec.color)
    }

    pub fn texts(&self) -> Vec<String> {
        self.shapes
            .values()
            .filter_map(|shape| match &shape.spec.kind {
                ShapeKind::Text { content, .. } => Some(content.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn has_text(&self, needle: &str) -> bool {
        self.texts().iter().any(|text| text.contains(needle))
    }

    pub fn highlighted_texts(&self) -> Vec<String> {
        self.shapes
            .values()
            .filter(|shape| shape.highlighted)
            .filter_map(|shape| match &shape.spec.kind {
                ShapeKind::Text { content, .. } => Some(content.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn draw_shape(&mut self, spec: ShapeSpec) -> Handle {
        let handle = Handle(self.next);
        self.next += 1;
        self.shapes.insert(
            handle,
            Recorded {
                spec,
                highlighted: false,
            },
        );
        handle
    }

    fn set_text(&mut self, handle: Handle, text: &str) {
        if let Some(shape) = self.shapes.get_mut(&handle) {
            if let ShapeKind::Text { content, .. } = &mut shape.spec.kind {
                *content = text.to_string();
            }
        }
    }

    fn set_position(&mut self, handle: Handle, position: Vec2) {
        if let Some(shape) = self.shapes.get_mut(&handle) {
            shape.spec.position = position;
        }
    }

    fn set_color(&mut self, handle: Handle, color: Rgb) {
        if let Some(shape) = self.shapes.get_mut(&handle) {
            shape.spec.color = color;
        }
    }

    fn set_highlight(&mut self, handle: Handle, highlighted: bool) {
        if let Some(shape) = self.shapes.get_mut(&handle) {
            shape.highlighted = highlighted;
        }
    }

    fn destroy(&mut self, handle: Handle) {
        if self.shapes.remove(&handle).is_some() {
            self.destroyed.push(handle);
        }
    }
}

// ── Audio ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct AudioLog {
    pub inits: usize,
    pub played: Vec<SoundEffect>,
    pub music_starts: usize,
}

/// Backend that records every call; `fail` makes `init` report an error.
pub struct RecordingAudio {
    pub log: Rc<RefCell<AudioLog>>,
    pub fail: bool,
}

impl AudioBackend for RecordingAudio {
    fn init(&mut self) -> GameResult<()> {
        self.log.borrow_mut().inits += 1;
        if self.fail {
            return Err(GameError::AudioUnavailable("no output device".into()));
        }
        Ok(())
    }

    fn play(&mut self, effect: SoundEffect) {
        self.log.borrow_mut().played.push(effect);
    }

    fn start_music(&mut self) {
        self.log.borrow_mut().music_starts += 1;
    }
}

pub fn recording_audio(fail: bool) -> (AudioContext, Rc<RefCell<AudioLog>>) {
    let log = Rc::new(RefCell::new(AudioLog::default()));
    let backend = RecordingAudio {
        log: Rc::clone(&log),
        fail,
    };
    (AudioContext::new(Box::new(backend)), log)
}

// ── Machine helpers ───────────────────────────────────────────────────────────

pub const FRAME_MS: u64 = 33;

/// Config with spawning and enemy fire pushed far out, so a test controls
/// every actor on the field.
pub fn quiet_config() -> GameConfig {
    GameConfig {
        spawn_interval_ms: 600_000,
        min_spawn_interval_ms: 600_000,
        spawn_interval_step_ms: 0,
        enemy_fire_rate: 0.0,
        ..GameConfig::default()
    }
}

pub fn machine_with(config: GameConfig) -> SceneMachine<RecordingRenderer> {
    SceneMachine::new(RecordingRenderer::new(), AudioContext::silent(), config, 7)
}

pub fn press(machine: &mut SceneMachine<RecordingRenderer>, key: LogicalKey) {
    machine.key_down(key);
    machine.tick(FRAME_MS);
    machine.key_up(key);
}

/// Boot → Menu → ShipSelect → Play with the first ship.
pub fn machine_in_play(config: GameConfig) -> SceneMachine<RecordingRenderer> {
    let mut machine = machine_with(config);
    machine.tick(FRAME_MS);
    assert_eq!(machine.active_id(), SceneId::Menu);
    press(&mut machine, LogicalKey::Confirm);
    assert_eq!(machine.active_id(), SceneId::ShipSelect);
    press(&mut machine, LogicalKey::Confirm);
    assert_eq!(machine.active_id(), SceneId::Play);
    machine
}
