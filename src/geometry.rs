//! Playfield geometry shared by the simulation and the front end.
//!
//! All coordinates live on a fixed 1920×1080 logical canvas.  The safe zone
//! (5% margin on every side) is the rectangle guaranteed to be visible on TV
//! panels with overscan; spawning, movement bounds and HUD anchors are all
//! expressed relative to it.

use std::ops::{Add, AddAssign, Mul, Sub};

// ── Canvas ────────────────────────────────────────────────────────────────────

pub const CANVAS_WIDTH: f32 = 1920.0;
pub const CANVAS_HEIGHT: f32 = 1080.0;

/// Fraction of each canvas edge reserved for overscan.
pub const SAFE_MARGIN: f32 = 0.05;

/// Guaranteed-visible playfield: the canvas inset by `SAFE_MARGIN`,
/// `[96,1824]×[54,1026]`.
pub const SAFE_ZONE: Rect = Rect {
    left: 96.0,
    top: 54.0,
    right: 1824.0,
    bottom: 1026.0,
};

// ── Vec2 ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (self - other).length()
    }

    /// Angle from the upward (forward) axis, positive clockwise on screen.
    pub fn angle_from_up(self) -> f32 {
        self.x.atan2(-self.y)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

// ── Rect ──────────────────────────────────────────────────────────────────────

/// Axis-aligned rectangle; edges are inclusive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new((self.left + self.right) / 2.0, (self.top + self.bottom) / 2.0)
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }

    /// Shrink every edge by `margin`.
    pub fn inset(&self, margin: f32) -> Rect {
        Rect {
            left: self.left + margin,
            top: self.top + margin,
            right: self.right - margin,
            bottom: self.bottom - margin,
        }
    }

    /// Clamp a point into the rectangle.
    pub fn clamp(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x.clamp(self.left, self.right),
            p.y.clamp(self.top, self.bottom),
        )
    }
}
