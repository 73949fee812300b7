//! Narrow interfaces to the rendering and audio collaborators.
//!
//! The core never owns pixels or samples.  It asks a [`Renderer`] for shapes
//! and gets back opaque [`Handle`]s it can later move, recolour, highlight or
//! destroy, and it names sound effects on an [`AudioContext`].

use tracing::{debug, warn};

pub use crate::entities::Handle;
use crate::error::GameResult;
use crate::geometry::Vec2;

// ── Shapes ────────────────────────────────────────────────────────────────────

/// 24-bit `0xRRGGBB` colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb(pub u32);

impl Rgb {
    pub const WHITE: Rgb = Rgb(0xffffff);
    pub const HIGHLIGHT: Rgb = Rgb(0xffff00);
    pub const HIT: Rgb = Rgb(0xff0000);

    pub fn channels(self) -> (u8, u8, u8) {
        (
            ((self.0 >> 16) & 0xff) as u8,
            ((self.0 >> 8) & 0xff) as u8,
            (self.0 & 0xff) as u8,
        )
    }
}

/// Where a shape's position sits relative to its extent (text only).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Anchor {
    #[default]
    Center,
    TopLeft,
    TopRight,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ShapeKind {
    Circle { radius: f32 },
    Rect { width: f32, height: f32 },
    /// Vertices relative to the shape's position.
    Polygon { points: Vec<Vec2> },
    Text { content: String, size: f32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShapeSpec {
    pub kind: ShapeKind,
    pub position: Vec2,
    pub color: Rgb,
    pub anchor: Anchor,
}

impl ShapeSpec {
    pub fn circle(position: Vec2, radius: f32, color: Rgb) -> Self {
        Self::new(ShapeKind::Circle { radius }, position, color)
    }

    pub fn rect(position: Vec2, width: f32, height: f32, color: Rgb) -> Self {
        Self::new(ShapeKind::Rect { width, height }, position, color)
    }

    pub fn polygon(position: Vec2, points: Vec<Vec2>, color: Rgb) -> Self {
        Self::new(ShapeKind::Polygon { points }, position, color)
    }

    pub fn text(position: Vec2, content: impl Into<String>, size: f32, color: Rgb) -> Self {
        Self::new(
            ShapeKind::Text {
                content: content.into(),
                size,
            },
            position,
            color,
        )
    }

    pub fn anchored(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    fn new(kind: ShapeKind, position: Vec2, color: Rgb) -> Self {
        Self {
            kind,
            position,
            color,
            anchor: Anchor::Center,
        }
    }
}

/// Retained-mode drawing surface.
///
/// Calls with a handle that was already destroyed must be ignored by
/// implementations rather than treated as errors.
pub trait Renderer {
    fn draw_shape(&mut self, spec: ShapeSpec) -> Handle;
    fn set_text(&mut self, handle: Handle, text: &str);
    fn set_position(&mut self, handle: Handle, position: Vec2);
    fn set_color(&mut self, handle: Handle, color: Rgb);
    fn set_highlight(&mut self, handle: Handle, highlighted: bool);
    fn destroy(&mut self, handle: Handle);
}

// ── Audio ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    Laser,
    Explosion,
    Powerup,
}

impl SoundEffect {
    pub fn name(self) -> &'static str {
        match self {
            SoundEffect::Laser => "laser",
            SoundEffect::Explosion => "explosion",
            SoundEffect::Powerup => "powerup",
        }
    }
}

pub trait AudioBackend {
    /// Bring the device up.  Called at most once per [`AudioContext`].
    fn init(&mut self) -> GameResult<()>;
    fn play(&mut self, effect: SoundEffect);
    fn start_music(&mut self);
}

/// Backend that accepts everything and makes no sound.
#[derive(Debug, Default)]
pub struct SilentAudio;

impl AudioBackend for SilentAudio {
    fn init(&mut self) -> GameResult<()> {
        Ok(())
    }

    fn play(&mut self, _effect: SoundEffect) {}

    fn start_music(&mut self) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioState {
    Suspended,
    Ready,
    Unavailable,
}

/// Lazily initialised audio.
///
/// Nothing reaches the backend until [`AudioContext::resume`] has run, which
/// the scene machine does on the first key event.  Resume is idempotent; if
/// the backend fails to start, every later call is a silent no-op.
pub struct AudioContext {
    backend: Box<dyn AudioBackend>,
    state: AudioState,
    music_requested: bool,
}

impl AudioContext {
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        Self {
            backend,
            state: AudioState::Suspended,
            music_requested: false,
        }
    }

    pub fn silent() -> Self {
        Self::new(Box::new(SilentAudio))
    }

    pub fn state(&self) -> AudioState {
        self.state
    }

    pub fn resume(&mut self) {
        if self.state != AudioState::Suspended {
            return;
        }
        match self.backend.init() {
            Ok(()) => {
                debug!("audio context resumed");
                self.state = AudioState::Ready;
                if self.music_requested {
                    self.backend.start_music();
                }
            }
            Err(err) => {
                warn!(%err, "audio disabled for this session");
                self.state = AudioState::Unavailable;
            }
        }
    }

    pub fn play_sound(&mut self, effect: SoundEffect) {
        if self.state == AudioState::Ready {
            self.backend.play(effect);
        }
    }

    /// Start the music loop now if audio is up, or as soon as it resumes.
    pub fn start_music(&mut self) {
        if self.music_requested {
            return;
        }
        self.music_requested = true;
        if self.state == AudioState::Ready {
            self.backend.start_music();
        }
    }
}
