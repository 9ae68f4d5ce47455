//! Start-up tuning for a game session.
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::constants::{
    DEFAULT_BASE_ROWS, DEFAULT_PLOT_WIDTH, DEFAULT_ROSTER_SIZE, DEFAULT_ROWS_PER_LEVEL,
    DEFAULT_SHAKE_AMPLITUDE, DEFAULT_SHAKE_INTERVAL_MS, DEFAULT_SHAKE_STEPS,
    DEFAULT_TRANSITION_DELAY_MS,
};
use crate::graveyard::Graveyard;
use crate::traits::CatalogError;

/// Errors raised when a configuration cannot produce a playable game.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be at least {min} (got {value})")]
    MinViolation {
        field: &'static str,
        min: u64,
        value: u64,
    },
    #[error("shake amplitude must be finite and non-negative (got {value})")]
    ShakeAmplitude { value: f64 },
    #[error("a plot {plot_width} blocks wide with {rows} map rows holds no graves")]
    EmptyGraveyard { plot_width: u32, rows: u32 },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("invalid configuration JSON: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Visitors per level.
    #[serde(default = "GameConfig::default_roster_size")]
    pub roster_size: usize,
    /// Map rows before any level is added.
    #[serde(default = "GameConfig::default_base_rows")]
    pub base_rows: u32,
    /// Map rows added per level.
    #[serde(default = "GameConfig::default_rows_per_level")]
    pub rows_per_level: u32,
    /// Map width in tiles of one plot row.
    #[serde(default = "GameConfig::default_plot_width")]
    pub plot_width: u32,
    #[serde(default = "GameConfig::default_transition_delay_ms")]
    pub transition_delay_ms: u64,
    #[serde(default = "GameConfig::default_shake_steps")]
    pub shake_steps: u32,
    #[serde(default = "GameConfig::default_shake_interval_ms")]
    pub shake_interval_ms: u64,
    #[serde(default = "GameConfig::default_shake_amplitude")]
    pub shake_amplitude: f64,
}

impl GameConfig {
    #[must_use]
    pub const fn default_roster_size() -> usize {
        DEFAULT_ROSTER_SIZE
    }

    #[must_use]
    pub const fn default_base_rows() -> u32 {
        DEFAULT_BASE_ROWS
    }

    #[must_use]
    pub const fn default_rows_per_level() -> u32 {
        DEFAULT_ROWS_PER_LEVEL
    }

    #[must_use]
    pub const fn default_plot_width() -> u32 {
        DEFAULT_PLOT_WIDTH
    }

    #[must_use]
    pub const fn default_transition_delay_ms() -> u64 {
        DEFAULT_TRANSITION_DELAY_MS
    }

    #[must_use]
    pub const fn default_shake_steps() -> u32 {
        DEFAULT_SHAKE_STEPS
    }

    #[must_use]
    pub const fn default_shake_interval_ms() -> u64 {
        DEFAULT_SHAKE_INTERVAL_MS
    }

    #[must_use]
    pub const fn default_shake_amplitude() -> f64 {
        DEFAULT_SHAKE_AMPLITUDE
    }

    /// Parse a JSON override; missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed JSON and any validation
    /// error for values outside the documented bounds.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check the invariants a running game relies on.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when any field violates the documented bounds
    /// or the first level's map is too small to hold a grave.
    /// A zero transition delay is allowed and advances on the next frame.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_min("roster_size", self.roster_size as u64, 1)?;
        Self::require_min("base_rows", u64::from(self.base_rows), 1)?;
        Self::require_min("plot_width", u64::from(self.plot_width), 1)?;
        Self::require_min("shake_interval_ms", self.shake_interval_ms, 1)?;
        // Rows never shrink, so the first level is the smallest graveyard.
        let rows = self.rows_for_level(1);
        if Graveyard::capacity(self.plot_width, rows) == 0 {
            return Err(ConfigError::EmptyGraveyard {
                plot_width: self.plot_width,
                rows,
            });
        }
        if !self.shake_amplitude.is_finite() || self.shake_amplitude < 0.0 {
            return Err(ConfigError::ShakeAmplitude {
                value: self.shake_amplitude,
            });
        }
        Ok(())
    }

    fn require_min(field: &'static str, value: u64, min: u64) -> Result<(), ConfigError> {
        if value < min {
            return Err(ConfigError::MinViolation { field, min, value });
        }
        Ok(())
    }

    #[must_use]
    pub const fn transition_delay(&self) -> Duration {
        Duration::from_millis(self.transition_delay_ms)
    }

    #[must_use]
    pub const fn shake_interval(&self) -> Duration {
        Duration::from_millis(self.shake_interval_ms)
    }

    /// Map row count for `level`.
    #[must_use]
    pub const fn rows_for_level(&self, level: u32) -> u32 {
        self.base_rows
            .saturating_add(self.rows_per_level.saturating_mul(level))
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            roster_size: Self::default_roster_size(),
            base_rows: Self::default_base_rows(),
            rows_per_level: Self::default_rows_per_level(),
            plot_width: Self::default_plot_width(),
            transition_delay_ms: Self::default_transition_delay_ms(),
            shake_steps: Self::default_shake_steps(),
            shake_interval_ms: Self::default_shake_interval_ms(),
            shake_amplitude: Self::default_shake_amplitude(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_cartridge() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.roster_size, 5);
        assert_eq!(cfg.rows_for_level(1), 8);
        assert_eq!(cfg.rows_for_level(2), 12);
        assert_eq!(cfg.plot_width, 16);
        assert_eq!(cfg.transition_delay(), Duration::from_secs(6));
        assert_eq!(cfg.shake_interval(), Duration::from_millis(16));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn json_overrides_keep_missing_defaults() {
        let cfg = GameConfig::from_json(r#"{ "roster_size": 3, "transition_delay_ms": 0 }"#)
            .expect("valid override");
        assert_eq!(cfg.roster_size, 3);
        assert_eq!(cfg.transition_delay_ms, 0);
        assert_eq!(cfg.base_rows, 4);
        assert_eq!(cfg.shake_steps, 10);
    }

    #[test]
    fn rejects_empty_roster_and_bad_json() {
        let err = GameConfig::from_json(r#"{ "roster_size": 0 }"#).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MinViolation {
                field: "roster_size",
                min: 1,
                value: 0,
            }
        );
        assert!(matches!(
            GameConfig::from_json("{ roster_size"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn rejects_zero_geometry_and_bad_amplitude() {
        let cfg = GameConfig {
            base_rows: 0,
            ..GameConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::MinViolation {
                field: "base_rows",
                ..
            })
        ));

        let cfg = GameConfig {
            plot_width: 0,
            ..GameConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = GameConfig {
            shake_amplitude: f64::NAN,
            ..GameConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::ShakeAmplitude { .. })
        ));
    }

    #[test]
    fn rejects_layouts_without_graves() {
        let narrow = GameConfig {
            plot_width: 3,
            ..GameConfig::default()
        };
        assert_eq!(
            narrow.validate(),
            Err(ConfigError::EmptyGraveyard {
                plot_width: 3,
                rows: 8,
            })
        );

        let flat = GameConfig {
            base_rows: 1,
            rows_per_level: 0,
            ..GameConfig::default()
        };
        assert_eq!(
            flat.validate(),
            Err(ConfigError::EmptyGraveyard {
                plot_width: 16,
                rows: 1,
            })
        );

        let smallest = GameConfig {
            plot_width: 4,
            base_rows: 8,
            rows_per_level: 0,
            ..GameConfig::default()
        };
        assert!(smallest.validate().is_ok());
    }
}
