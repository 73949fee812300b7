//! Selectable ships.

use crate::render::Rgb;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShipId {
    Viper,
    Raptor,
    Titan,
}

#[derive(Debug, PartialEq)]
pub struct ShipSpec {
    pub id: ShipId,
    pub name: &'static str,
    pub tagline: &'static str,
    pub color: Rgb,
    /// Pixels per second.
    pub move_speed: f32,
    /// Scales every weapon's fire interval; below 1.0 fires faster.
    pub fire_rate_multiplier: f32,
}

pub static SHIP_REGISTRY: [ShipSpec; 3] = [
    ShipSpec {
        id: ShipId::Viper,
        name: "VIPER",
        tagline: "Balanced",
        color: Rgb(0x00ff00),
        move_speed: 720.0,
        fire_rate_multiplier: 1.0,
    },
    ShipSpec {
        id: ShipId::Raptor,
        name: "RAPTOR",
        tagline: "Fast, slower guns",
        color: Rgb(0x00ccff),
        move_speed: 900.0,
        fire_rate_multiplier: 1.25,
    },
    ShipSpec {
        id: ShipId::Titan,
        name: "TITAN",
        tagline: "Slow, heavy fire",
        color: Rgb(0xff8800),
        move_speed: 540.0,
        fire_rate_multiplier: 0.7,
    },
];

impl ShipId {
    pub fn spec(self) -> &'static ShipSpec {
        match self {
            ShipId::Viper => &SHIP_REGISTRY[0],
            ShipId::Raptor => &SHIP_REGISTRY[1],
            ShipId::Titan => &SHIP_REGISTRY[2],
        }
    }

    pub fn index(self) -> usize {
        SHIP_REGISTRY
            .iter()
            .position(|spec| spec.id == self)
            .unwrap_or(0)
    }
}
