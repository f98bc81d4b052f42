//! Configuration loading and typed config structures for the step inspector.
//!
//! The canonical configuration lives in `steptrace-config.yaml` next to the
//! binary's working directory. This module defines strongly-typed structs
//! that mirror the YAML structure, and provides a loader that reads and
//! validates the file. Every field has a default, so an empty document is a
//! valid configuration.

use std::path::Path;

use serde::Deserialize;

use crate::bucket::Combine;
use crate::panel::Metric;

/// Environment variable that overrides `logging.level`.
pub const LOG_LEVEL_ENV: &str = "STEPTRACE_LOG";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The YAML parsed but a value is out of range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What was wrong and where.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level inspector configuration.
///
/// Mirrors the structure of `steptrace-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InspectorConfig {
    /// Session and navigation settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Which panels to derive per batch.
    #[serde(default)]
    pub panels: PanelsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl InspectorConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `STEPTRACE_LOG` overrides `logging.level` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value fails validation.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value fails validation.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.logging
            .override_level(std::env::var(LOG_LEVEL_ENV).ok());
    }

    /// Check value ranges that the type system cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending panel.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for panel in &self.panels.rates {
            if panel.name.trim().is_empty() {
                return Err(invalid("rate panel with an empty name".to_owned()));
            }
            if !(panel.bucket_width_ms.is_finite() && panel.bucket_width_ms > 0.0) {
                return Err(invalid(format!(
                    "panel `{}`: bucket_width_ms must be positive, got {}",
                    panel.name, panel.bucket_width_ms
                )));
            }
            if panel.smoothing_window == Some(0) {
                return Err(invalid(format!(
                    "panel `{}`: smoothing_window must be at least 1",
                    panel.name
                )));
            }
        }
        if self.session.batch_channel_capacity == 0 {
            return Err(invalid(
                "session.batch_channel_capacity must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}

fn invalid(reason: String) -> ConfigError {
    ConfigError::Invalid { reason }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Session and navigation settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    /// Bound of the channel between the feed reader and the session task.
    #[serde(default = "default_batch_channel_capacity")]
    pub batch_channel_capacity: usize,

    /// Number of axis tick labels per frame.
    #[serde(default = "default_tick_label_count")]
    pub tick_label_count: usize,

    /// Steps to request from the simulator once the cursor is caught up.
    #[serde(default = "default_request_more_steps")]
    pub request_more_steps: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            batch_channel_capacity: default_batch_channel_capacity(),
            tick_label_count: default_tick_label_count(),
            request_more_steps: default_request_more_steps(),
        }
    }
}

const fn default_batch_channel_capacity() -> usize {
    64
}

const fn default_tick_label_count() -> usize {
    5
}

const fn default_request_more_steps() -> u32 {
    100
}

// ---------------------------------------------------------------------------
// Panels
// ---------------------------------------------------------------------------

/// Panel selection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PanelsConfig {
    /// Rate panels, derived in order.
    #[serde(default = "default_rate_panels")]
    pub rates: Vec<RatePanelConfig>,

    /// Occupancy timeline panel.
    #[serde(default)]
    pub timeline: TimelineConfig,
}

impl Default for PanelsConfig {
    fn default() -> Self {
        Self {
            rates: default_rate_panels(),
            timeline: TimelineConfig::default(),
        }
    }
}

/// One rate panel: window, bucket, optionally smooth.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RatePanelConfig {
    /// Series name shown in the legend.
    pub name: String,

    /// Per-snapshot quantity to chart.
    pub metric: Metric,

    /// Trailing window in milliseconds.
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// Bucket width in milliseconds.
    #[serde(default = "default_bucket_width_ms")]
    pub bucket_width_ms: f64,

    /// Reduction applied within a bucket.
    #[serde(default)]
    pub combine: Combine,

    /// Rolling-average window in buckets. No smoothing when absent.
    #[serde(default)]
    pub smoothing_window: Option<usize>,

    /// Whether the panel reports its value range for a fixed y axis.
    #[serde(default)]
    pub absolute: bool,
}

impl RatePanelConfig {
    /// A panel with default window and width and no smoothing.
    pub fn new(name: impl Into<String>, metric: Metric) -> Self {
        Self {
            name: name.into(),
            metric,
            window_ms: default_window_ms(),
            bucket_width_ms: default_bucket_width_ms(),
            combine: Combine::default(),
            smoothing_window: None,
            absolute: false,
        }
    }
}

const fn default_window_ms() -> u64 {
    10_000
}

const fn default_bucket_width_ms() -> f64 {
    100.0
}

fn default_rate_panels() -> Vec<RatePanelConfig> {
    vec![
        RatePanelConfig {
            smoothing_window: Some(5),
            absolute: true,
            ..RatePanelConfig::new("faults", Metric::Faults)
        },
        RatePanelConfig {
            combine: Combine::Mean,
            ..RatePanelConfig::new("busy", Metric::Busy)
        },
        RatePanelConfig {
            combine: Combine::Mean,
            ..RatePanelConfig::new("occupied_slots", Metric::OccupiedSlots)
        },
    ]
}

/// Occupancy timeline settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimelineConfig {
    /// Whether frames carry the occupancy blocks.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

const fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter
    /// directive.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl LoggingConfig {
    /// Replace the level when an override is present and non-empty.
    pub fn override_level(&mut self, level: Option<String>) {
        if let Some(level) = level.filter(|l| !l.trim().is_empty()) {
            self.level = level;
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_owned()
}
