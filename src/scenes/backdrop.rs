//! Starfield background shared by the menu and play scenes.

use rand::{Rng, RngCore};

use crate::entities::Handle;
use crate::geometry::{Vec2, CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::render::{Renderer, Rgb, ShapeSpec};

const SKY: Rgb = Rgb(0x0a0a20);
const STAR: Rgb = Rgb(0xcccccc);

struct Star {
    handle: Handle,
    position: Vec2,
    /// Pixels per second while scrolling.
    speed: f32,
}

#[derive(Default)]
pub(crate) struct Starfield {
    sky: Option<Handle>,
    stars: Vec<Star>,
}

impl Starfield {
    pub(crate) fn spawn(count: usize, renderer: &mut dyn Renderer, rng: &mut dyn RngCore) -> Self {
        let sky = renderer.draw_shape(ShapeSpec::rect(
            Vec2::new(CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0),
            CANVAS_WIDTH,
            CANVAS_HEIGHT,
            SKY,
        ));
        let stars = (0..count)
            .map(|_| {
                let position = Vec2::new(
                    rng.gen_range(0.0..CANVAS_WIDTH),
                    rng.gen_range(0.0..CANVAS_HEIGHT),
                );
                let radius = rng.gen_range(1.0..3.0);
                Star {
                    handle: renderer.draw_shape(ShapeSpec::circle(position, radius, STAR)),
                    position,
                    speed: rng.gen_range(60.0..180.0),
                }
            })
            .collect();
        Self {
            sky: Some(sky),
            stars,
        }
    }

    /// Drift every star downward, wrapping to a fresh column at the top.
    pub(crate) fn scroll(&mut self, dt: f32, renderer: &mut dyn Renderer, rng: &mut dyn RngCore) {
        for star in &mut self.stars {
            star.position.y += star.speed * dt;
            if star.position.y > CANVAS_HEIGHT {
                star.position = Vec2::new(rng.gen_range(0.0..CANVAS_WIDTH), 0.0);
            }
            renderer.set_position(star.handle, star.position);
        }
    }

    pub(crate) fn destroy(&mut self, renderer: &mut dyn Renderer) {
        for star in self.stars.drain(..) {
            renderer.destroy(star.handle);
        }
        if let Some(sky) = self.sky.take() {
            renderer.destroy(sky);
        }
    }
}
