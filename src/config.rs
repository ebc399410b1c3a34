//! Physics, cue and rule tuning
//!
//! Every empirical constant of the simulation lives here so it can be tuned
//! from a JSON file without recompiling. Missing fields fall back to the
//! defaults in [`crate::consts`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Environment variable pointing at a JSON config file
pub const CONFIG_ENV_VAR: &str = "EIGHT_BALL_CONFIG";

/// Ball motion and collision response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub ball_radius: f32,
    /// Multiplicative velocity damping applied once per step
    pub friction: f32,
    /// Speed fraction kept after a cushion bounce
    pub restitution: f32,
    /// Speed (units/s) below which a ball is snapped to rest
    pub stop_threshold: f32,
    /// Push along the cushion normal after a bounce
    pub cushion_nudge: f32,
    /// Fraction of cue-ball spin turned into velocity on cushion contact
    pub spin_transfer: f32,
    /// Spin multiplier applied after each cushion contact
    pub spin_decay: f32,
    /// Endpoint slack for the segment sweep
    pub segment_end_tolerance: f32,
    /// Cue ball speed above which contacts are reported as hard hits
    pub hard_hit_speed: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            ball_radius: BALL_RADIUS,
            friction: BALL_FRICTION,
            restitution: BALL_RESTITUTION,
            stop_threshold: STOP_THRESHOLD,
            cushion_nudge: CUSHION_NUDGE,
            spin_transfer: SPIN_TRANSFER,
            spin_decay: SPIN_DECAY,
            segment_end_tolerance: SEGMENT_END_TOLERANCE,
            hard_hit_speed: HARD_HIT_SPEED,
        }
    }
}

/// Cue stick power and spin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CueConfig {
    pub initial_power: f32,
    pub min_power: f32,
    pub max_power: f32,
    /// Power change per wheel notch
    pub power_tick: f32,
    /// Hit point offset to spin scale
    pub spin_from_hit_point: f32,
    /// Seconds between the strike trigger and the shot landing
    pub strike_duration: f32,
    pub length: f32,
    /// Gap between the stick tip and the cue ball at zero power
    pub distance_from_target: f32,
}

impl Default for CueConfig {
    fn default() -> Self {
        Self {
            initial_power: CUE_INITIAL_POWER,
            min_power: CUE_MIN_POWER,
            max_power: CUE_MAX_POWER,
            power_tick: CUE_POWER_TICK,
            spin_from_hit_point: SPIN_FROM_HIT_POINT,
            strike_duration: CUE_STRIKE_DURATION,
            length: CUE_LENGTH,
            distance_from_target: BALL_RADIUS,
        }
    }
}

/// Rule engine knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Distinct balls that must touch a cushion for a break to count
    pub break_min_cushion_balls: usize,
    /// Shuffle the non-fixed rack slots
    pub shuffle_rack: bool,
    /// Allow dragging any ball (not just the cue ball in hand) while stopped
    pub free_ball_placement: bool,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            break_min_cushion_balls: BREAK_MIN_CUSHION_BALLS,
            shuffle_rack: true,
            free_ball_placement: false,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub physics: PhysicsConfig,
    pub cue: CueConfig,
    pub rules: RulesConfig,
    /// Rack shuffle seed (None = caller picks one)
    pub seed: Option<u64>,
}

impl Config {
    /// Parse a config from JSON; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Load from the file named by `EIGHT_BALL_CONFIG`, falling back to defaults
    pub fn load() -> Self {
        let Ok(path) = std::env::var(CONFIG_ENV_VAR) else {
            log::info!("Using default config");
            return Self::default();
        };

        match Self::from_file(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path);
                config
            }
            Err(e) => {
                log::warn!("Ignoring config {}: {} - using defaults", path, e);
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_consts() {
        let config = Config::default();
        assert_eq!(config.physics.friction, BALL_FRICTION);
        assert_eq!(config.physics.stop_threshold, 0.5);
        assert_eq!(config.cue.max_power, 1400.0);
        assert_eq!(config.rules.break_min_cushion_balls, 4);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json(r#"{ "physics": { "friction": 0.98 }, "seed": 7 }"#)
            .expect("valid json");
        assert_eq!(config.physics.friction, 0.98);
        assert_eq!(config.physics.restitution, BALL_RESTITUTION);
        assert_eq!(config.cue, CueConfig::default());
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = Config::from_json("{ physics: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Config::from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_json_roundtrip() {
        let mut config = Config::default();
        config.rules.shuffle_rack = false;
        let json = config.to_json().expect("serializable");
        assert_eq!(Config::from_json(&json).expect("parses"), config);
    }
}
