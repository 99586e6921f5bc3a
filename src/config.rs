//! Engine configuration
//!
//! Everything the engine used to take from global constants lives here and is
//! handed to [`crate::core::Enhancer`] at construction. A config can be loaded
//! from YAML; missing keys fall back to the defaults.

use crate::error::{EnhanceError, EnhanceResult};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// What to do with a table that lacks one of the required columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MissingColumnPolicy {
    /// Leave the table untouched and carry on with the next one
    #[default]
    Skip,
    /// Fail the whole run
    Abort,
}

/// Header prefixes used to find the columns the engine reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub pay: String,
    pub distance: String,
    pub cargo: String,
    pub destination: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            pay: "Pay".to_string(),
            distance: "NM".to_string(),
            cargo: "Cargo".to_string(),
            destination: "Dest".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Notional mass of one passenger
    pub man_weight_kg: f64,
    pub default_rounding_digits: u32,
    /// Upper bound for the precision escalation below
    pub max_rounding_digits: u32,
    /// Keep adding decimals while the rounded metric is zero
    pub minimum_nonzero_precision: bool,
    /// Run the per-destination totals stage
    pub aggregate_destinations: bool,
    pub missing_column_policy: MissingColumnPolicy,
    /// Table classes that mark an assignment or hold table
    pub recognized_classes: Vec<String>,
    pub columns: ColumnNames,
    pub sort_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            man_weight_kg: 77.0,
            default_rounding_digits: 2,
            max_rounding_digits: 12,
            minimum_nonzero_precision: true,
            aggregate_destinations: false,
            missing_column_policy: MissingColumnPolicy::Skip,
            recognized_classes: vec![
                "assignmentTable".to_string(),
                "assigmentTable".to_string(),
                "holdTable".to_string(),
            ],
            columns: ColumnNames::default(),
            sort_timeout_ms: 10_000,
        }
    }
}

impl EngineConfig {
    /// Load a config from a YAML file and validate it
    pub fn load(path: &Path) -> EnhanceResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> EnhanceResult<Self> {
        let config: EngineConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn sort_timeout(&self) -> Duration {
        Duration::from_millis(self.sort_timeout_ms)
    }

    pub fn validate(&self) -> EnhanceResult<()> {
        if self.man_weight_kg.is_nan() || self.man_weight_kg <= 0.0 {
            return Err(EnhanceError::Config(format!(
                "man_weight_kg must be positive, got {}",
                self.man_weight_kg
            )));
        }
        if self.max_rounding_digits < self.default_rounding_digits {
            return Err(EnhanceError::Config(format!(
                "max_rounding_digits ({}) is below default_rounding_digits ({})",
                self.max_rounding_digits, self.default_rounding_digits
            )));
        }
        if self.recognized_classes.is_empty() {
            return Err(EnhanceError::Config(
                "recognized_classes must name at least one table class".to_string(),
            ));
        }
        Ok(())
    }
}
