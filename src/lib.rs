pub mod collision;
pub mod config;
pub mod cursor;
pub mod entities;
pub mod error;
pub mod geometry;
pub mod input;
pub mod pool;
pub mod progression;
pub mod render;
pub mod scenes;
pub mod ships;
pub mod timers;
pub mod weapons;
