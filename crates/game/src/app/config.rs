use std::path::PathBuf;

use thiserror::Error;

const SEED_ENV_VAR: &str = "TILEQUEST_SEED";
const START_LEVEL_ENV_VAR: &str = "TILEQUEST_START_LEVEL";
const GOD_MODE_ENV_VAR: &str = "TILEQUEST_GOD_MODE";
const SPRITES_DIR_ENV_VAR: &str = "TILEQUEST_SPRITES_DIR";

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ConfigError {
    #[error("{var} must be an unsigned integer, got '{value}'")]
    InvalidSeed { var: &'static str, value: String },
    #[error("{var} must be a level number starting at 1, got '{value}'")]
    InvalidStartLevel { var: &'static str, value: String },
    #[error("{var} must be one of 1/0, true/false, yes/no, on/off, got '{value}'")]
    InvalidFlag { var: &'static str, value: String },
    #[error("start level {requested} is past the last level ({available})")]
    StartLevelOutOfRange { requested: usize, available: usize },
}

/// Launch options read from the environment. Every field has a default,
/// so an empty environment is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct GameConfig {
    /// Fixed RNG seed; entropy when absent.
    pub(crate) seed: Option<u64>,
    /// Zero-based level index to start runs at.
    pub(crate) start_level: usize,
    pub(crate) god_mode: bool,
    /// Directory of `<key>.png` files replacing built-in sprites.
    pub(crate) sprites_dir: Option<PathBuf>,
}

impl GameConfig {
    pub(crate) fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let seed = read(SEED_ENV_VAR)
            .map(|value| {
                value.parse::<u64>().map_err(|_| ConfigError::InvalidSeed {
                    var: SEED_ENV_VAR,
                    value,
                })
            })
            .transpose()?;

        let start_level = match read(START_LEVEL_ENV_VAR) {
            Some(value) => match value.parse::<usize>() {
                Ok(number) if number >= 1 => number - 1,
                _ => {
                    return Err(ConfigError::InvalidStartLevel {
                        var: START_LEVEL_ENV_VAR,
                        value,
                    })
                }
            },
            None => 0,
        };

        let god_mode = read(GOD_MODE_ENV_VAR)
            .map(|value| parse_flag(GOD_MODE_ENV_VAR, value))
            .transpose()?
            .unwrap_or(false);

        Ok(Self {
            seed,
            start_level,
            god_mode,
            sprites_dir: read(SPRITES_DIR_ENV_VAR).map(PathBuf::from),
        })
    }

    /// Rejects a start level the loaded catalog cannot satisfy.
    pub(crate) fn check_start_level(&self, level_count: usize) -> Result<(), ConfigError> {
        if self.start_level >= level_count {
            return Err(ConfigError::StartLevelOutOfRange {
                requested: self.start_level + 1,
                available: level_count,
            });
        }
        Ok(())
    }
}

fn parse_flag(var: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { var, value }),
    }
}
