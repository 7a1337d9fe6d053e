//! Game configuration loaded from TOML.

use crate::games::laser::{BoardSetup, GameRules, OwnTargetRule, Reserve};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Configuration for new matches.
///
/// Every field has a default, so an empty file is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct GameConfig {
    /// Board columns.
    #[serde(default = "default_edge")]
    width: u8,

    /// Board rows.
    #[serde(default = "default_edge")]
    height: u8,

    /// Side B's opening is a half-turn of side A's.
    #[serde(default = "default_true")]
    mirror_layout: bool,

    /// Start with only emitters and targets.
    #[serde(default)]
    empty_start: bool,

    /// What a beam does at the firer's own target.
    #[serde(default)]
    own_target_rule: OwnTargetRule,

    /// Remove placeable pieces that absorb a beam.
    #[serde(default)]
    capture_on_absorb: bool,

    /// Draw after this many moves without a hit.
    #[serde(default)]
    max_moves: Option<u32>,

    /// Pieces each side may place.
    #[serde(default)]
    reserve: Reserve,
}

#[instrument]
fn default_edge() -> u8 {
    8
}

#[instrument]
fn default_true() -> bool {
    true
}

impl GameConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml_str(&content)?;
        info!(width = config.width, height = config.height, "Config loaded successfully");
        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations no board can be built from.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.board_setup()
            .check_dimensions()
            .map_err(|e| ConfigError::new(e.to_string()))?;
        if self.max_moves == Some(0) {
            return Err(ConfigError::new("max_moves must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Layout options for the starting board.
    pub fn board_setup(&self) -> BoardSetup {
        BoardSetup::new(self.width, self.height, self.mirror_layout, self.empty_start)
    }

    /// Runtime rules for the match.
    pub fn rules(&self) -> GameRules {
        GameRules {
            own_target: self.own_target_rule,
            capture_on_absorb: self.capture_on_absorb,
            max_moves: self.max_moves,
            reserve: self.reserve,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: default_edge(),
            height: default_edge(),
            mirror_layout: default_true(),
            empty_start: false,
            own_target_rule: OwnTargetRule::default(),
            capture_on_absorb: false,
            max_moves: None,
            reserve: Reserve::default(),
        }
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
