//! User configuration for courtroom.
//!
//! Read once at startup from `$XDG_CONFIG_HOME/courtroom/config.toml`. Every key
//! is optional; a missing file or a parse error falls back to the defaults and
//! never prevents startup.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

/// Directory holding the database and log file, relative to the working directory.
pub const DATA_DIR: &str = ".courtroom";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Theme name, `dark` or `catppuccin-mocha`.
    pub theme: String,
    pub db_path: PathBuf,
    /// Simulated opponent latency in milliseconds.
    pub opponent_latency_ms: u64,
    /// Simulated coach latency in milliseconds.
    pub coach_latency_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "catppuccin-mocha".to_owned(),
            db_path: PathBuf::from(DATA_DIR).join("courtroom.db"),
            opponent_latency_ms: 1500,
            coach_latency_ms: 800,
        }
    }
}

impl Config {
    /// Loads the config file, falling back to defaults on any error.
    pub fn load() -> Self {
        let path = config_path();
        let raw = match std::fs::read_to_string(&path) {
            Ok(s) => s,
            Err(_) => return Self::default(),
        };
        Self::parse(&raw).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "config parse error, using defaults");
            Self::default()
        })
    }

    pub fn parse(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    pub fn opponent_latency(&self) -> Duration {
        Duration::from_millis(self.opponent_latency_ms)
    }

    pub fn coach_latency(&self) -> Duration {
        Duration::from_millis(self.coach_latency_ms)
    }
}

/// Returns the path to the courtroom config file.
///
/// Prefers `$XDG_CONFIG_HOME/courtroom/config.toml`; falls back to
/// `~/.config/courtroom/config.toml` when the env var is absent.
pub fn config_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".config"))
        })
        .unwrap_or_else(|| PathBuf::from(".config"));
    base.join("courtroom").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let config = Config::parse("theme = \"dark\"\nopponent_latency_ms = 0\n").unwrap();
        assert_eq!(config.theme, "dark");
        assert_eq!(config.opponent_latency(), Duration::ZERO);
        assert_eq!(config.coach_latency_ms, 800);
        assert_eq!(config.db_path, PathBuf::from(".courtroom/courtroom.db"));
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn wrong_types_are_errors() {
        assert!(Config::parse("coach_latency_ms = \"fast\"").is_err());
    }
}
