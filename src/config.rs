use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tolerances and sizes controlling selection and erase behavior.
///
/// All lengths are meters along the line except `click_tolerance`, which is
/// in the projector's planar units (pixels for [`crate::geometry::WebMercator`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageConfig {
    /// Intervals closer than this are treated as touching, and cut
    /// remainders shorter than this are dropped.
    pub epsilon_m: f64,
    /// Box footprints shorter than this are ignored as noise.
    pub min_selection_m: f64,
    /// Half-width of the span marked by a single click.
    pub click_half_width_m: f64,
    /// Maximum planar distance from a click to a line for it to count.
    pub click_tolerance: f64,
    /// Maximum number of undo steps retained.
    pub history_limit: usize,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            epsilon_m: 0.25,
            min_selection_m: 0.5,
            click_half_width_m: 2.5,
            click_tolerance: 12.0,
            history_limit: 100,
        }
    }
}

impl CoverageConfig {
    /// Parses a (possibly partial) JSON configuration over the defaults and
    /// validates it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed JSON and
    /// `ConfigError::Invalid` if validation fails.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let lengths = [
            ("min_selection_m", self.min_selection_m),
            ("click_half_width_m", self.click_half_width_m),
            ("click_tolerance", self.click_tolerance),
        ];
        for (name, value) in lengths {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        if !self.epsilon_m.is_finite() || self.epsilon_m <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "epsilon_m must be finite and positive, got {}",
                self.epsilon_m
            )));
        }
        if self.epsilon_m > self.min_selection_m {
            return Err(ConfigError::Invalid(format!(
                "epsilon_m ({}) must not exceed min_selection_m ({})",
                self.epsilon_m, self.min_selection_m
            )));
        }
        Ok(())
    }
}
