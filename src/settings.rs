//! Demo settings and tuning
//!
//! Loaded from an optional JSON file. Every field has a default, so a config
//! file only needs the values it wants to change.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::DEFAULT_ENTITY_CAP;
use crate::demos::bubbles;
use crate::sim::{Difficulty, EvictionPolicy};

/// Errors raised while loading or validating settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> SettingsError {
    SettingsError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Volume policy handed to the audio manager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

/// Paddle-and-falling-balls tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatchSettings {
    pub difficulty: Difficulty,
    pub paddle_width: f32,
    /// Width removed by each slow-down request
    pub paddle_shrink_step: f32,
    pub bullet_speed: f32,
    /// Frames between shots
    pub fire_cooldown: u32,
    /// Percent chance of a bonus ball
    pub bonus_chance: u32,
    /// Percent chance of a penalty ball
    pub penalty_chance: u32,
}

impl Default for CatchSettings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            paddle_width: 40.0,
            paddle_shrink_step: 10.0,
            bullet_speed: 6.0,
            fire_cooldown: 6,
            bonus_chance: 15,
            penalty_chance: 15,
        }
    }
}

/// Bouncing bubble tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BubbleSettings {
    pub count: usize,
    pub min_radius: f32,
    pub max_radius: f32,
    /// Velocity components are drawn from ±max_speed
    pub max_speed: f32,
    /// Children created when a bubble is clicked
    pub burst_pieces: u32,
}

impl Default for BubbleSettings {
    fn default() -> Self {
        Self {
            count: 50,
            min_radius: 3.0,
            max_radius: 10.0,
            max_speed: 1.8,
            burst_pieces: 11,
        }
    }
}

/// Grid snake tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnakeSettings {
    /// Moves per second
    pub fps: u32,
    pub start_length: usize,
}

impl Default for SnakeSettings {
    fn default() -> Self {
        Self {
            fps: 2,
            start_length: 1,
        }
    }
}

/// Shooter tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShooterSettings {
    pub player_health: i32,
    /// Kills needed before the boss appears
    pub boss_threshold: u32,
    pub boss_health: i32,
    /// Frames between player shots
    pub fire_cooldown: u32,
    /// One enemy kill in N drops a power-up
    pub powerup_odds: u32,
    pub particle_cap: usize,
}

impl Default for ShooterSettings {
    fn default() -> Self {
        Self {
            player_health: 100,
            boss_threshold: 10,
            boss_health: 50,
            fire_cooldown: 5,
            powerup_odds: 5,
            particle_cap: 300,
        }
    }
}

/// Sketch pad tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchSettings {
    /// Stamped circles kept before the oldest is dropped
    pub stamp_cap: usize,
    /// Committed lines kept before the oldest is dropped
    pub line_cap: usize,
}

impl Default for SketchSettings {
    fn default() -> Self {
        Self {
            stamp_cap: 64,
            line_cap: 64,
        }
    }
}

/// Lottery draw screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LotterySettings {
    pub names: Vec<String>,
    pub draw_seconds: f32,
}

impl Default for LotterySettings {
    fn default() -> Self {
        Self {
            names: ["Avery", "Blake", "Casey", "Devon", "Emery", "Finley", "Harper", "Jordan"]
                .into_iter()
                .map(String::from)
                .collect(),
            draw_seconds: 3.0,
        }
    }
}

/// All settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Fixed seed; a time-derived seed is used when absent
    pub seed: Option<u64>,
    /// Hard cap for every entity pool
    pub entity_cap: usize,
    pub eviction: EvictionPolicy,

    // === Accessibility ===
    /// Reduced motion (no camera shake, no blinking)
    pub reduced_motion: bool,

    pub audio: AudioSettings,
    pub catch: CatchSettings,
    pub bubbles: BubbleSettings,
    pub snake: SnakeSettings,
    pub shooter: ShooterSettings,
    pub sketch: SketchSettings,
    pub lottery: LotterySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,
            entity_cap: DEFAULT_ENTITY_CAP,
            eviction: EvictionPolicy::DropOldest,
            reduced_motion: false,
            audio: AudioSettings::default(),
            catch: CatchSettings::default(),
            bubbles: BubbleSettings::default(),
            snake: SnakeSettings::default(),
            shooter: ShooterSettings::default(),
            sketch: SketchSettings::default(),
            lottery: LotterySettings::default(),
        }
    }
}

impl Settings {
    /// Load and validate settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        fs::write(path, self.to_json()?).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Effective camera shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        !self.reduced_motion
    }

    /// Effective particle cap, never above the global entity cap
    pub fn max_particles(&self) -> usize {
        self.shooter.particle_cap.min(self.entity_cap)
    }

    /// Reject values the demos can't run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.entity_cap == 0 {
            return Err(invalid("entity_cap", "must be positive"));
        }
        for (field, volume) in [
            ("audio.master_volume", self.audio.master_volume),
            ("audio.sfx_volume", self.audio.sfx_volume),
        ] {
            if !(0.0..=1.0).contains(&volume) {
                return Err(invalid(field, format!("{volume} is outside 0.0..=1.0")));
            }
        }

        let c = &self.catch;
        let d = &c.difficulty;
        for (field, value) in [
            ("catch.difficulty.base_speed", d.base_speed),
            ("catch.paddle_width", c.paddle_width),
            ("catch.bullet_speed", c.bullet_speed),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(field, format!("{value} must be a positive number")));
            }
        }
        if !d.speed_step.is_finite() || d.speed_step < 0.0 {
            return Err(invalid("catch.difficulty.speed_step", "must be a non-negative number"));
        }
        if !c.paddle_shrink_step.is_finite() || c.paddle_shrink_step < 0.0 {
            return Err(invalid("catch.paddle_shrink_step", "must be a non-negative number"));
        }
        if d.miss_limit == 0 {
            return Err(invalid("catch.difficulty.miss_limit", "must be positive"));
        }
        if c.bonus_chance + c.penalty_chance > 100 {
            return Err(invalid(
                "catch.bonus_chance",
                "bonus and penalty chances add up to more than 100",
            ));
        }

        let b = &self.bubbles;
        if !b.max_speed.is_finite() || b.max_speed < 0.0 {
            return Err(invalid("bubbles.max_speed", "must be a non-negative number"));
        }
        if !(b.min_radius > 0.0 && b.min_radius <= b.max_radius && b.max_radius.is_finite()) {
            return Err(invalid("bubbles.min_radius", "need 0 < min_radius <= max_radius"));
        }
        let field = bubbles::WIDTH.min(bubbles::HEIGHT) as f32;
        if b.max_radius * 2.0 >= field {
            return Err(invalid(
                "bubbles.max_radius",
                format!("{} does not fit a {field}px field", b.max_radius),
            ));
        }
        if b.burst_pieces == 0 {
            return Err(invalid("bubbles.burst_pieces", "must be positive"));
        }

        if self.snake.fps == 0 {
            return Err(invalid("snake.fps", "must be positive"));
        }
        if self.snake.start_length == 0 {
            return Err(invalid("snake.start_length", "must be positive"));
        }

        let s = &self.shooter;
        if s.player_health <= 0 || s.boss_health <= 0 {
            return Err(invalid("shooter.player_health", "health values must be positive"));
        }
        if s.particle_cap == 0 {
            return Err(invalid("shooter.particle_cap", "must be positive"));
        }
        if s.powerup_odds == 0 {
            return Err(invalid("shooter.powerup_odds", "must be positive"));
        }

        if self.sketch.stamp_cap == 0 {
            return Err(invalid("sketch.stamp_cap", "must be positive"));
        }
        if self.sketch.line_cap == 0 {
            return Err(invalid("sketch.line_cap", "must be positive"));
        }

        if self.lottery.names.is_empty() {
            return Err(invalid("lottery.names", "needs at least one name"));
        }
        if !self.lottery.draw_seconds.is_finite() || self.lottery.draw_seconds <= 0.0 {
            return Err(invalid("lottery.draw_seconds", "must be a positive number"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = Settings::from_json(r#"{ "seed": 42, "catch": { "paddle_width": 30.0 } }"#).unwrap();
        assert_eq!(settings.seed, Some(42));
        assert_eq!(settings.catch.paddle_width, 30.0);
        assert_eq!(settings.catch.difficulty.level_step, 10);
        assert_eq!(settings.bubbles.count, 50);
    }

    #[test]
    fn test_eviction_policy_round_trips_as_snake_case() {
        let settings = Settings::from_json(r#"{ "eviction": "refuse_new" }"#).unwrap();
        assert_eq!(settings.eviction, EvictionPolicy::RefuseNew);
    }

    #[test]
    fn test_rejects_zero_cap() {
        let err = Settings::from_json(r#"{ "entity_cap": 0 }"#).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { field: "entity_cap", .. }));
    }

    #[test]
    fn test_rejects_bad_json() {
        assert!(matches!(Settings::from_json("{ nope"), Err(SettingsError::Parse(_))));
    }

    #[test]
    fn test_rejects_empty_names() {
        let err = Settings::from_json(r#"{ "lottery": { "names": [] } }"#).unwrap_err();
        assert!(err.to_string().contains("lottery.names"));
    }

    #[test]
    fn test_rejects_bubbles_wider_than_field() {
        let err = Settings::from_json(r#"{ "bubbles": { "min_radius": 150.0, "max_radius": 200.0, "count": 3 } }"#)
            .unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { field: "bubbles.max_radius", .. }));
        assert!(Settings::from_json(r#"{ "bubbles": { "max_radius": 127.0 } }"#).is_ok());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Settings::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
    }

    #[test]
    fn test_reduced_motion_disables_shake() {
        let mut settings = Settings::default();
        assert!(settings.effective_screen_shake());
        settings.reduced_motion = true;
        assert!(!settings.effective_screen_shake());
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("pixel-arcade-settings-{}.json", std::process::id()));
        let mut settings = Settings::default();
        settings.shooter.boss_health = 80;
        settings.save(&path).unwrap();
        let loaded = Settings::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, settings);
    }
}
