//! Run configuration
//!
//! Stored as JSON next to the score file. Every field has a default, so a
//! partial file only overrides what it names.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::{LevelConfig, Playfield, RuleSet, SpawnParams};

/// Default location of the settings file
pub const DEFAULT_SETTINGS_PATH: &str = "data/settings.json";
/// Default location of the score history
pub const DEFAULT_SCORE_PATH: &str = "data/scores.txt";

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Run structure ===
    /// Levels in a run
    pub max_levels: u32,
    /// Lives at the start of a run
    pub starting_lives: u8,
    /// Rules the first level is played under
    pub initial_rules: RuleSet,
    /// Run seed; random when absent
    pub seed: Option<u64>,

    // === Level ===
    pub playfield: Playfield,
    /// Collectibles per level number
    pub collectibles_per_level: u32,
    /// Chance of a booster per level (0.0 - 1.0)
    pub booster_chance: f64,
    /// Time budget per level in seconds
    pub level_time_limit_secs: u64,

    // === Presentation ===
    /// Pause on the welcome screen (seconds)
    pub intro_secs: u64,
    /// Countdown before the first level (seconds)
    pub countdown_secs: u64,
    /// Pause on the game-over screen (seconds)
    pub outro_secs: u64,

    // === Persistence ===
    pub score_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_levels: MAX_LEVELS,
            starting_lives: STARTING_LIVES,
            initial_rules: RuleSet::default(),
            seed: None,

            playfield: Playfield::default(),
            collectibles_per_level: COLLECTIBLES_PER_LEVEL,
            booster_chance: BOOSTER_CHANCE,
            level_time_limit_secs: LEVEL_TIME_LIMIT_TICKS / FRAMES_PER_SECOND,

            intro_secs: 2,
            countdown_secs: 3,
            outro_secs: 3,

            score_file: PathBuf::from(DEFAULT_SCORE_PATH),
        }
    }
}

impl Settings {
    /// Repair values the simulation cannot work with.
    ///
    /// Zero levels or zero lives are left alone: they make a degenerate run
    /// that ends immediately with score 0.
    pub fn sanitized(mut self) -> Self {
        let defaults = Playfield::default();
        let largest = AVATAR_SIZE.max(HAZARD_SIZE).max(COLLECTIBLE_SIZE);
        let field = &mut self.playfield;
        if !field.width.is_finite() || field.width < largest {
            log::warn!("Playfield width {} too small, using default", field.width);
            field.width = defaults.width;
        }
        if !field.status_band.is_finite() || field.status_band < 0.0 {
            field.status_band = 0.0;
        }
        if !field.height.is_finite() || field.height < field.status_band + largest {
            log::warn!("Playfield height {} too small, using default", field.height);
            field.height = defaults.height;
            field.status_band = defaults.status_band;
        }

        if self.collectibles_per_level == 0 {
            log::warn!("collectibles_per_level must be at least 1");
            self.collectibles_per_level = 1;
        }
        if !(0.0..=1.0).contains(&self.booster_chance) {
            log::warn!("booster_chance {} out of range", self.booster_chance);
            self.booster_chance = SpawnParams {
                booster_chance: self.booster_chance,
                ..Default::default()
            }
            .booster_probability();
        }
        if self.level_time_limit_secs == 0 {
            self.level_time_limit_secs = 1;
        }
        self
    }

    /// Per-level parameters for the simulation
    pub fn level_config(&self) -> LevelConfig {
        LevelConfig {
            field: self.playfield,
            spawn: SpawnParams {
                collectibles_per_level: self.collectibles_per_level,
                booster_chance: self.booster_chance,
            },
            time_limit_ticks: self.level_time_limit_secs.saturating_mul(FRAMES_PER_SECOND),
        }
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        let settings = match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<Settings>(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Invalid settings in {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        };
        settings.sanitized()
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: &Path) {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if let Err(e) = fs::create_dir_all(dir) {
                log::warn!("Could not create {}: {}", dir.display(), e);
                return;
            }
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => match fs::write(path, json) {
                Ok(()) => log::info!("Settings saved to {}", path.display()),
                Err(e) => log::warn!("Could not save settings: {}", e),
            },
            Err(e) => log::warn!("Could not serialize settings: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{ "max_levels": 2, "initial_rules": { "hazard_count": 7 } }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.max_levels, 2);
        assert_eq!(settings.initial_rules.hazard_count, 7);
        assert_eq!(settings.initial_rules.avatar_speed, 5);
        assert_eq!(settings.starting_lives, STARTING_LIVES);
        assert_eq!(settings.score_file, PathBuf::from(DEFAULT_SCORE_PATH));
    }

    #[test]
    fn test_sanitize_repairs_bad_values() {
        let settings = Settings {
            collectibles_per_level: 0,
            booster_chance: 4.0,
            level_time_limit_secs: 0,
            playfield: Playfield {
                width: 10.0,
                height: 600.0,
                status_band: 130.0,
            },
            ..Default::default()
        }
        .sanitized();

        assert_eq!(settings.collectibles_per_level, 1);
        assert_eq!(settings.booster_chance, 1.0);
        assert_eq!(settings.level_time_limit_secs, 1);
        assert_eq!(settings.playfield.width, PLAY_WIDTH);
    }

    #[test]
    fn test_sanitize_keeps_degenerate_run() {
        let settings = Settings {
            max_levels: 0,
            starting_lives: 0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(settings.max_levels, 0);
        assert_eq!(settings.starting_lives, 0);
    }

    #[test]
    fn test_level_config_converts_seconds() {
        let config = Settings::default().level_config();
        assert_eq!(config.time_limit_ticks, LEVEL_TIME_LIMIT_TICKS);
        assert_eq!(config.spawn.collectibles_per_level, COLLECTIBLES_PER_LEVEL);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("mutant-collector-no-such-settings.json");
        assert_eq!(Settings::load(&path), Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let name = format!("mutant-collector-settings-{}", std::process::id());
        let dir = std::env::temp_dir().join(name);
        let path = dir.join("settings.json");
        let settings = Settings {
            max_levels: 9,
            seed: Some(4),
            ..Default::default()
        };
        settings.save(&path);
        assert_eq!(Settings::load(&path), settings);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_save_under_a_file_is_skipped() {
        let name = format!("mutant-collector-blocked-{}", std::process::id());
        let blocker = std::env::temp_dir().join(name);
        fs::write(&blocker, "not a directory").unwrap();
        let path = blocker.join("settings.json");

        Settings::default().save(&path);
        assert!(!path.exists());
        assert_eq!(fs::read_to_string(&blocker).unwrap(), "not a directory");
        let _ = fs::remove_file(&blocker);
    }
}
