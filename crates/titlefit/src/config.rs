#![forbid(unsafe_code)]

//! Badge configuration as data.
//!
//! [`BadgeConfig`] selects a variant and its tunables. With the `config`
//! feature it can be loaded from TOML or JSON:
//!
//! ```toml
//! size = 160.0
//! variant = "diamond"
//! fit_factor = 0.8
//!
//! [spring]
//! stiffness = 40.0
//! damping = 13.0
//! ```
//!
//! ```rust,ignore
//! let config = BadgeConfig::from_toml_file("badge.toml")?;
//! let badge = Badge::new(config, "Hello")?;
//! ```
//!
//! # Defaults
//!
//! Unset fields fall back to the variant's own values, so a config that only
//! names a variant behaves exactly like that variant's preset.

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use titlefit_core::animation::SpringParams;

use crate::choreography::{Choreography, Variant};
use crate::error::{ConfigError, Result};

/// Accepted range for the vertical padding factor.
pub const FIT_FACTOR_RANGE: std::ops::RangeInclusive<f64> = 0.68..=0.9;

/// Spring tunables.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
pub struct SpringConfig {
    pub stiffness: f64,
    pub damping: f64,
}

impl From<SpringConfig> for SpringParams {
    fn from(c: SpringConfig) -> Self {
        SpringParams::new(c.stiffness, c.damping)
    }
}

impl From<SpringParams> for SpringConfig {
    fn from(p: SpringParams) -> Self {
        Self {
            stiffness: p.stiffness,
            damping: p.damping,
        }
    }
}

/// Everything needed to build one badge.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct BadgeConfig {
    /// Footprint size in layout units.
    pub size: f64,
    pub variant: Variant,
    /// Overrides the variant's fit factor.
    pub fit_factor: Option<f64>,
    /// Overrides the variant's spring (spring variants only).
    pub spring: Option<SpringConfig>,
    /// Position delta below which a spring counts as at rest.
    pub rest_threshold: f64,
}

impl Default for BadgeConfig {
    fn default() -> Self {
        Self {
            size: 100.0,
            variant: Variant::default(),
            fit_factor: None,
            spring: None,
            rest_threshold: 0.001,
        }
    }
}

impl BadgeConfig {
    /// Config for `variant` with every other field at its default.
    #[must_use]
    pub fn for_variant(variant: Variant) -> Self {
        Self {
            variant,
            ..Self::default()
        }
    }

    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Validate every field.
    ///
    /// Returns one message per problem. An empty list means the config is
    /// valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !(self.size.is_finite() && self.size > 0.0) {
            errors.push(format!("size must be > 0, got {}", self.size));
        }
        if let Some(fit) = self.fit_factor
            && !FIT_FACTOR_RANGE.contains(&fit)
        {
            errors.push(format!(
                "fit_factor must be in [{}, {}], got {fit}",
                FIT_FACTOR_RANGE.start(),
                FIT_FACTOR_RANGE.end()
            ));
        }
        if let Some(spring) = self.spring {
            if spring.stiffness.is_nan() || spring.stiffness <= 0.0 {
                errors.push(format!(
                    "spring.stiffness must be > 0, got {}",
                    spring.stiffness
                ));
            }
            if spring.damping.is_nan() || spring.damping < 0.0 {
                errors.push(format!(
                    "spring.damping must be >= 0, got {}",
                    spring.damping
                ));
            }
        }
        if self.rest_threshold.is_nan() || self.rest_threshold <= 0.0 {
            errors.push(format!(
                "rest_threshold must be > 0, got {}",
                self.rest_threshold
            ));
        }

        errors
    }

    /// `self` if valid, otherwise every validation message.
    pub fn validated(self) -> Result<Self> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Build the configured choreography.
    #[must_use]
    pub fn choreography(&self) -> Box<dyn Choreography> {
        self.variant
            .choreography(self.fit_factor, self.spring.map(SpringParams::from))
    }
}
