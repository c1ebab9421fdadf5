//! Configuration management.
//!
//! [`Config`] mirrors the TOML file layout section by section. Every field has
//! a default, so an empty file (or no file at all) is a valid configuration.
//! Call [`Config::validate`] after applying overrides; invalid settings are
//! rejected before any search work starts.

mod file_config;

pub use file_config::{find_config_file, load_config, load_config_from, save_config};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Allowed deviation of the weight sum from 1.0
const WEIGHT_SUM_TOLERANCE: f64 = 0.001;

pub const MAX_WORKERS: usize = 20;
pub const MAX_DELAY_MS: u64 = 5000;

/// Configuration errors; these are fatal and surface before any task runs
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Matching weights must sum to 1.0, got {0:.3}")]
    WeightSum(f64),

    #[error("Matching weight `{name}` must be between 0.0 and 1.0, got {value}")]
    WeightRange { name: &'static str, value: f64 },

    #[error("Threshold must be between 0 and 100, got {0}")]
    Threshold(u8),

    #[error("Worker count must be between 1 and {MAX_WORKERS}, got {0}")]
    Workers(usize),

    #[error("Request delay must be at most {MAX_DELAY_MS}ms, got {0}ms")]
    Delay(u64),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialize error: {0}")]
    Serialize(String),
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub matching: MatchingConfig,

    #[serde(default)]
    pub parallel: ParallelConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Check every range and invariant
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.matching.validate()?;
        self.parallel.validate()
    }
}

/// Reading list input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Goodreads library export
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,

    /// Shelf whose books are searched
    #[serde(default = "default_bookshelf")]
    pub bookshelf: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
            bookshelf: default_bookshelf(),
        }
    }
}

fn default_csv_path() -> PathBuf {
    PathBuf::from("goodreads_library_export.csv")
}

fn default_bookshelf() -> String {
    "to-read".to_string()
}

/// Report output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Report path; the format's extension is appended when missing
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            format: OutputFormat::default(),
        }
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from("output")
}

/// Weights of the four similarity measures; must sum to 1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchingWeights {
    #[serde(default = "default_ratio_weight")]
    pub ratio: f64,

    #[serde(default = "default_partial_ratio_weight")]
    pub partial_ratio: f64,

    #[serde(default = "default_token_sort_weight")]
    pub token_sort_ratio: f64,

    #[serde(default = "default_token_set_weight")]
    pub token_set_ratio: f64,
}

impl MatchingWeights {
    /// Weights used when either title is long; favours word-set overlap
    pub const LONG_TITLE: MatchingWeights = MatchingWeights {
        ratio: 0.10,
        partial_ratio: 0.10,
        token_sort_ratio: 0.20,
        token_set_ratio: 0.60,
    };

    /// Build a validated weight set
    pub fn new(
        ratio: f64,
        partial_ratio: f64,
        token_sort_ratio: f64,
        token_set_ratio: f64,
    ) -> Result<Self, ConfigError> {
        let weights = Self {
            ratio,
            partial_ratio,
            token_sort_ratio,
            token_set_ratio,
        };
        weights.validate()?;
        Ok(weights)
    }

    pub fn sum(&self) -> f64 {
        self.ratio + self.partial_ratio + self.token_sort_ratio + self.token_set_ratio
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("ratio", self.ratio),
            ("partial_ratio", self.partial_ratio),
            ("token_sort_ratio", self.token_sort_ratio),
            ("token_set_ratio", self.token_set_ratio),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::WeightRange { name, value });
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightSum(sum));
        }
        Ok(())
    }

    /// Weighted combination of the four measures
    pub fn combine(&self, ratio: f64, partial: f64, token_sort: f64, token_set: f64) -> f64 {
        self.ratio * ratio
            + self.partial_ratio * partial
            + self.token_sort_ratio * token_sort
            + self.token_set_ratio * token_set
    }
}

impl Default for MatchingWeights {
    fn default() -> Self {
        Self {
            ratio: default_ratio_weight(),
            partial_ratio: default_partial_ratio_weight(),
            token_sort_ratio: default_token_sort_weight(),
            token_set_ratio: default_token_set_weight(),
        }
    }
}

fn default_ratio_weight() -> f64 {
    0.15
}

fn default_partial_ratio_weight() -> f64 {
    0.20
}

fn default_token_sort_weight() -> f64 {
    0.25
}

fn default_token_set_weight() -> f64 {
    0.40
}

/// Matching algorithm settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Minimum score (0-100) for a match to count as found
    #[serde(default = "default_threshold")]
    pub threshold: u8,

    /// Use ISBNs for exact matches and the partial-ISBN bonus
    #[serde(default = "default_true")]
    pub use_isbn: bool,

    /// Reject fuzzy matches whose author similarity is below 50%
    #[serde(default)]
    pub require_author_match: bool,

    #[serde(default)]
    pub weights: MatchingWeights,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            use_isbn: true,
            require_author_match: false,
            weights: MatchingWeights::default(),
        }
    }
}

impl MatchingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threshold > 100 {
            return Err(ConfigError::Threshold(self.threshold));
        }
        self.weights.validate()
    }
}

fn default_threshold() -> u8 {
    90
}

fn default_true() -> bool {
    true
}

/// Concurrent search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParallelConfig {
    /// Search with several workers; one worker when disabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Minimum spacing between catalog requests, in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Allow only one catalog request in flight at a time
    #[serde(default)]
    pub single_flight: bool,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            workers: default_workers(),
            delay_ms: default_delay_ms(),
            single_flight: false,
        }
    }
}

impl ParallelConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_WORKERS).contains(&self.workers) {
            return Err(ConfigError::Workers(self.workers));
        }
        if self.delay_ms > MAX_DELAY_MS {
            return Err(ConfigError::Delay(self.delay_ms));
        }
        Ok(())
    }

    /// Worker count after applying the `enabled` switch
    pub fn effective_workers(&self) -> usize {
        if self.enabled {
            self.workers
        } else {
            1
        }
    }
}

fn default_workers() -> usize {
    5
}

fn default_delay_ms() -> u64 {
    100
}

/// Terminal display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_true")]
    pub show_progress: bool,

    #[serde(default = "default_true")]
    pub color: bool,

    #[serde(default)]
    pub verbose: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            color: true,
            verbose: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
