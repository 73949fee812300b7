//! Runtime-tunable gameplay configuration loaded from a TOML file.
//!
//! Every field has a compiled default, and `#[serde(default)]` lets a file
//! override just the values it names.  A missing file is not an error; a
//! file that is present but unreadable or malformed is.

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::{GameError, GameResult};

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    // ── Session ──────────────────────────────────────────────────────────────
    pub starting_lives: u32,
    pub game_over_delay_ms: u64,

    // ── Scoring & progression ────────────────────────────────────────────────
    pub level_threshold: u32,
    pub score_per_enemy: u32,

    // ── Pickups ──────────────────────────────────────────────────────────────
    pub powerup_duration_ms: u64,
    pub pickup_drop_chance: f64,
    pub pickup_fall_speed: f32,

    // ── Enemy waves ──────────────────────────────────────────────────────────
    pub spawn_interval_ms: u64,
    pub spawn_interval_step_ms: u64,
    pub min_spawn_interval_ms: u64,
    pub enemy_speed_min: f32,
    pub enemy_speed_max: f32,
    /// Fractional speed increase per level above 1.
    pub enemy_speed_growth: f32,
    /// Expected shots per second for each live enemy.
    pub enemy_fire_rate: f64,
    pub enemy_bullet_speed: f32,

    // ── Feedback timings ─────────────────────────────────────────────────────
    pub hit_flash_ms: u64,
    pub explosion_ms: u64,
    pub level_message_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_lives: 3,
            game_over_delay_ms: 1000,
            level_threshold: 1500,
            score_per_enemy: 100,
            powerup_duration_ms: 8000,
            pickup_drop_chance: 0.15,
            pickup_fall_speed: 150.0,
            spawn_interval_ms: 1500,
            spawn_interval_step_ms: 150,
            min_spawn_interval_ms: 400,
            enemy_speed_min: 180.0,
            enemy_speed_max: 360.0,
            enemy_speed_growth: 0.1,
            enemy_fire_rate: 0.3,
            enemy_bullet_speed: 480.0,
            hit_flash_ms: 100,
            explosion_ms: 200,
            level_message_ms: 1500,
        }
    }
}

impl GameConfig {
    /// Load `path`, falling back to the defaults when the file does not exist.
    pub fn load(path: &Path) -> GameResult<Self> {
        if !path.exists() {
            info!(path = %path.display(), "no config file found; using compiled defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| GameError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&contents).map_err(|source| GameError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        info!(path = %path.display(), "loaded game config");
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn validate(&self) -> GameResult<()> {
        if self.starting_lives == 0 {
            return Err(invalid("starting_lives", "must be at least 1"));
        }
        if self.level_threshold == 0 {
            return Err(invalid("level_threshold", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.pickup_drop_chance) {
            return Err(invalid(
                "pickup_drop_chance",
                format!("{} is not a probability", self.pickup_drop_chance),
            ));
        }
        for (field, value) in [
            ("enemy_speed_min", f64::from(self.enemy_speed_min)),
            ("enemy_speed_max", f64::from(self.enemy_speed_max)),
            ("enemy_speed_growth", f64::from(self.enemy_speed_growth)),
            ("enemy_fire_rate", self.enemy_fire_rate),
            ("enemy_bullet_speed", f64::from(self.enemy_bullet_speed)),
            ("pickup_fall_speed", f64::from(self.pickup_fall_speed)),
        ] {
            if !value.is_finite() {
                return Err(invalid(field, format!("{value} is not a finite number")));
            }
        }
        if self.enemy_fire_rate < 0.0 {
            return Err(invalid("enemy_fire_rate", "must not be negative"));
        }
        if self.min_spawn_interval_ms > self.spawn_interval_ms {
            return Err(invalid(
                "min_spawn_interval_ms",
                format!(
                    "{} exceeds spawn_interval_ms {}",
                    self.min_spawn_interval_ms, self.spawn_interval_ms
                ),
            ));
        }
        if self.min_spawn_interval_ms == 0 {
            return Err(invalid("min_spawn_interval_ms", "must be positive"));
        }
        for (field, speed) in [
            ("enemy_speed_min", self.enemy_speed_min),
            ("enemy_speed_max", self.enemy_speed_max),
            ("enemy_bullet_speed", self.enemy_bullet_speed),
            ("pickup_fall_speed", self.pickup_fall_speed),
        ] {
            if speed <= 0.0 {
                return Err(invalid(field, format!("{speed} is not a positive speed")));
            }
        }
        if self.enemy_speed_min > self.enemy_speed_max {
            return Err(invalid("enemy_speed_min", "exceeds enemy_speed_max"));
        }
        if self.enemy_speed_growth < 0.0 {
            return Err(invalid("enemy_speed_growth", "must not be negative"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> GameError {
    GameError::InvalidConfig {
        field,
        reason: reason.into(),
    }
}
