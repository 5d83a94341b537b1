// Configuration loading and parsing (slate.toml) plus scoring weights.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Scoring weights
// ---------------------------------------------------------------------------

/// FanDuel-style linear scoring coefficients: points per assist, block,
/// point, rebound, steal, and turnover.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub ppa: f64,
    pub ppb: f64,
    pub ppp: f64,
    pub ppr: f64,
    pub pps: f64,
    pub ppt: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            ppa: 1.5,
            ppb: 3.0,
            ppp: 1.0,
            ppr: 1.2,
            pps: 3.0,
            ppt: -1.0,
        }
    }
}

impl ScoringWeights {
    /// Weighted fantasy-point total for one stat row.
    pub fn fan_points(
        &self,
        assists: f64,
        blocks: f64,
        points: f64,
        rebounds: f64,
        steals: f64,
        turnovers: f64,
    ) -> f64 {
        self.ppa * assists
            + self.ppb * blocks
            + self.ppp * points
            + self.ppr * rebounds
            + self.pps * steals
            + self.ppt * turnovers
    }
}

/// Cloneable handle to a weight set shared by every calculator constructed
/// from it. An explicit object stands in for mutable process-wide defaults:
/// updates through any clone are observed by all holders, existing and new.
#[derive(Debug, Clone, Default)]
pub struct SharedWeights(Arc<RwLock<ScoringWeights>>);

impl SharedWeights {
    pub fn new(weights: ScoringWeights) -> Self {
        Self(Arc::new(RwLock::new(weights)))
    }

    pub fn get(&self) -> ScoringWeights {
        // Critical sections only copy a Copy value; a poisoned lock still
        // holds a coherent weight set.
        *self.0.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set(&self, weights: ScoringWeights) {
        *self.0.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = weights;
    }
}

// ---------------------------------------------------------------------------
// slate.toml structs
// ---------------------------------------------------------------------------

/// Top-level slate.toml contents. Every field is defaulted, so an empty
/// file (or no `[weights]` table at all) is a valid configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub weights: ScoringWeights,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding the rotoguru-<YYYY-MM-DD>.csv game logs.
    pub data_dir: PathBuf,
    /// Reference game date, as a quoted "YYYY-MM-DD" string. Defaults to
    /// today when omitted.
    pub game_date: Option<NaiveDate>,
    /// How many prior calendar days feed the training frame.
    pub training_days: u32,
    /// Whether to load the reference date's log as a validation frame.
    pub validation: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            game_date: None,
            training_days: 20,
            validation: true,
        }
    }
}

impl DataConfig {
    /// The configured game date, falling back to today.
    pub fn resolved_date(&self) -> NaiveDate {
        self.game_date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from a slate.toml file.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.data.training_days == 0 {
        return Err(ConfigError::ValidationError {
            field: "data.training_days".into(),
            message: "must be greater than 0".into(),
        });
    }

    let w = &config.weights;
    let weight_fields: &[(&str, f64)] = &[
        ("weights.ppa", w.ppa),
        ("weights.ppb", w.ppb),
        ("weights.ppp", w.ppp),
        ("weights.ppr", w.ppr),
        ("weights.pps", w.pps),
        ("weights.ppt", w.ppt),
    ];
    for (name, val) in weight_fields {
        if !val.is_finite() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must be finite, got {val}"),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
