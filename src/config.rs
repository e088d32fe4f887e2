//! Demo configuration.
//!
//! Loaded from environment variables, every value has a default.

use std::{collections::HashMap, env, time::Duration};

use thiserror::Error;

/// Default latency of the simulated track layer, in milliseconds.
pub const DEFAULT_TRACK_LATENCY_MS: u64 = 500;

/// Default `tracing` filter directive.
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Time the simulated track layer takes to confirm a state change
    /// (`ROOM_MUTE_TRACK_LATENCY_MS`).
    pub track_latency: Duration,

    /// Whether a microphone track exists (`ROOM_MUTE_AUDIO_AVAILABLE`).
    pub audio_available: bool,

    /// Whether a camera track exists (`ROOM_MUTE_VIDEO_AVAILABLE`).
    pub video_available: bool,

    /// `tracing` filter used when `RUST_LOG` is unset (`ROOM_MUTE_LOG`).
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            track_latency: Duration::from_millis(DEFAULT_TRACK_LATENCY_MS),
            audio_available: true,
            video_available: true,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    pub fn from_vars(
        vars: &HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let track_latency_ms = parse_var(
            vars,
            "ROOM_MUTE_TRACK_LATENCY_MS",
            DEFAULT_TRACK_LATENCY_MS,
        )?;
        let audio_available =
            parse_var(vars, "ROOM_MUTE_AUDIO_AVAILABLE", true)?;
        let video_available =
            parse_var(vars, "ROOM_MUTE_VIDEO_AVAILABLE", true)?;
        let log_filter = vars
            .get("ROOM_MUTE_LOG")
            .cloned()
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Config {
            track_latency: Duration::from_millis(track_latency_ms),
            audio_available,
            video_available,
            log_filter,
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    vars: &HashMap<String, String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match vars.get(name) {
        None => Ok(default),
        Some(value) => {
            value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name,
                value: value.clone(),
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_from_vars_defaults() {
        let config = Config::from_vars(&HashMap::new())
            .expect("Config should load with defaults");
        assert_eq!(config, Config::default());
        assert_eq!(config.track_latency, Duration::from_millis(500));
    }

    #[test]
    fn test_from_vars_custom_values() {
        let config = Config::from_vars(&vars(&[
            ("ROOM_MUTE_TRACK_LATENCY_MS", "20"),
            ("ROOM_MUTE_VIDEO_AVAILABLE", "false"),
            ("ROOM_MUTE_LOG", "room_mute=debug"),
        ]))
        .unwrap();

        assert_eq!(config.track_latency, Duration::from_millis(20));
        assert!(config.audio_available);
        assert!(!config.video_available);
        assert_eq!(config.log_filter, "room_mute=debug");
    }

    #[test]
    fn test_from_vars_invalid_latency() {
        let err =
            Config::from_vars(&vars(&[("ROOM_MUTE_TRACK_LATENCY_MS", "soon")]))
                .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                name: "ROOM_MUTE_TRACK_LATENCY_MS",
                ..
            }
        ));
    }

    #[test]
    fn test_from_vars_invalid_flag() {
        let err =
            Config::from_vars(&vars(&[("ROOM_MUTE_AUDIO_AVAILABLE", "yes")]))
                .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration value for ROOM_MUTE_AUDIO_AVAILABLE: \"yes\""
        );
    }
}
