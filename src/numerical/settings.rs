//! Configuration values received from the surrounding layer.
//!
//! Settings can be built in code or read from a TOML document such as
//! ```toml
//! quadrature_method = "radau"
//! log_level = "debug"
//!
//! [scaling]
//! method = "bounds"
//! update_scaling = true
//! update_weight = 0.8
//! number_samples = 100
//! strict_bounds = false
//! ```
//! Missing keys take their defaults.
use crate::numerical::Quadrature::QuadratureMethod;
use crate::numerical::errors::{CollocationError, CollocationResult};
use serde::{Deserialize, Serialize};
use simplelog::LevelFilter;
use std::path::Path;
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString};

/// How the basis (OCP-level) variable scaling is derived
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, EnumIter, Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ScalingMethod {
    /// from the variable bounds
    #[default]
    #[strum(to_string = "bounds", serialize = "default")]
    #[serde(alias = "default")]
    Bounds,
    /// from the initial guess (declared, not available)
    Guess,
    /// user supplied (declared, not available)
    User,
    /// unit scale, zero shift
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalingSettings {
    pub method: ScalingMethod,
    /// blend with earlier mesh iterations from the second iteration on
    pub update_scaling: bool,
    /// decay α of the blending weights, in (0, 1)
    pub update_weight: f64,
    /// sample count for random-sample variable scaling
    pub number_samples: usize,
    /// turn zero-width bounds into an error instead of the unit fallback
    pub strict_bounds: bool,
}

impl Default for ScalingSettings {
    fn default() -> Self {
        ScalingSettings {
            method: ScalingMethod::Bounds,
            update_scaling: true,
            update_weight: 0.8,
            number_samples: 100,
            strict_bounds: false,
        }
    }
}

impl ScalingSettings {
    pub fn validate(&self) -> CollocationResult<()> {
        if !(self.update_weight > 0.0 && self.update_weight < 1.0) {
            return Err(CollocationError::InvalidSettings(format!(
                "update_weight must lie in (0, 1), got {}",
                self.update_weight
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollocationSettings {
    pub quadrature_method: QuadratureMethod,
    pub log_level: String,
    pub scaling: ScalingSettings,
}

impl Default for CollocationSettings {
    fn default() -> Self {
        CollocationSettings {
            quadrature_method: QuadratureMethod::Lobatto,
            log_level: "info".to_string(),
            scaling: ScalingSettings::default(),
        }
    }
}

impl CollocationSettings {
    pub fn from_toml_str(input: &str) -> CollocationResult<Self> {
        let settings: CollocationSettings = toml::from_str(input)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> CollocationResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> CollocationResult<()> {
        self.log_level_filter()?;
        self.scaling.validate()
    }

    pub fn log_level_filter(&self) -> CollocationResult<LevelFilter> {
        LevelFilter::from_str(&self.log_level).map_err(|_| {
            CollocationError::InvalidSettings(format!("unknown log level {}", self.log_level))
        })
    }
}
