//! Score, levels and difficulty scaling.

use tracing::info;

use crate::config::GameConfig;
use crate::entities::PlayerState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelUp {
    pub from: u32,
    pub to: u32,
}

/// Difficulty curve.  Spawn interval shrinks and enemy speed grows with
/// level; both are monotonic, and the interval never drops below its floor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressionTracker {
    pub level_threshold: u32,
    pub base_spawn_interval_ms: u64,
    pub spawn_interval_step_ms: u64,
    pub min_spawn_interval_ms: u64,
    pub enemy_speed_min: f32,
    pub enemy_speed_max: f32,
    pub enemy_speed_growth: f32,
}

impl ProgressionTracker {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            level_threshold: config.level_threshold.max(1),
            base_spawn_interval_ms: config.spawn_interval_ms,
            spawn_interval_step_ms: config.spawn_interval_step_ms,
            min_spawn_interval_ms: config.min_spawn_interval_ms,
            enemy_speed_min: config.enemy_speed_min,
            enemy_speed_max: config.enemy_speed_max,
            enemy_speed_growth: config.enemy_speed_growth,
        }
    }

    pub fn level_for(&self, score: u32) -> u32 {
        score / self.level_threshold + 1
    }

    /// Add `delta` to the score and recompute the level.  Returns the level-up
    /// when the new score crosses a threshold.
    pub fn on_score(&self, player: &mut PlayerState, delta: u32) -> Option<LevelUp> {
        player.score = player.score.saturating_add(delta);
        let level = self.level_for(player.score);
        if level <= player.level {
            return None;
        }
        let level_up = LevelUp {
            from: player.level,
            to: level,
        };
        player.level = level;
        info!(level, score = player.score, "level up");
        Some(level_up)
    }

    pub fn spawn_interval_ms(&self, level: u32) -> u64 {
        let steps = u64::from(level.saturating_sub(1));
        self.base_spawn_interval_ms
            .saturating_sub(steps.saturating_mul(self.spawn_interval_step_ms))
            .max(self.min_spawn_interval_ms)
    }

    /// Speed range for enemies spawned at `level`.
    pub fn enemy_speed_range(&self, level: u32) -> (f32, f32) {
        let factor = 1.0 + self.enemy_speed_growth * level.saturating_sub(1) as f32;
        (self.enemy_speed_min * factor, self.enemy_speed_max * factor)
    }
}

impl Default for ProgressionTracker {
    fn default() -> Self {
        Self::from_config(&GameConfig::default())
    }
}
