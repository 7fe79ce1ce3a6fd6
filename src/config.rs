//! Configuration types for the recorder
//!
//! This module contains the configuration structures loaded from YAML.
//! Every field has a default, so an empty file is a valid configuration.

use crate::error::{Error, Result};
use crate::exchange::CaptureFilter;
use crate::path::ParameterPolicy;
use crate::schema::SchemaInferrer;
use crate::store::DEFAULT_SAMPLE_CAP;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete recorder configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Document metadata
    #[serde(default)]
    pub info: InfoConfig,

    /// Sample retention
    #[serde(default)]
    pub samples: SamplesConfig,

    /// Path parameter handling
    #[serde(default)]
    pub parameters: ParametersConfig,

    /// Schema inference options
    #[serde(default)]
    pub inference: InferenceConfig,

    /// Which exchanges are recorded
    #[serde(default)]
    pub capture: CaptureConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerSettings,
}

impl RecorderConfig {
    /// Check values serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.samples.cap == 0 {
            return Err(Error::invalid_config(
                "samples.cap",
                "must keep at least one sample per endpoint",
            ));
        }
        if self.inference.max_depth == 0 {
            return Err(Error::invalid_config(
                "inference.max_depth",
                "must be at least 1",
            ));
        }
        if self.info.title.trim().is_empty() {
            return Err(Error::invalid_config("info.title", "must not be empty"));
        }
        Ok(())
    }

    /// Schema inferrer configured from `inference`
    pub fn inferrer(&self) -> SchemaInferrer {
        SchemaInferrer::new()
            .with_format_detection(self.inference.detect_formats)
            .with_max_depth(self.inference.max_depth)
    }

    /// Capture filter configured from `capture`
    pub fn capture_filter(&self) -> CaptureFilter {
        CaptureFilter {
            json_only: self.capture.json_only,
        }
    }
}

/// Load and validate a config file
pub fn load_config(path: impl AsRef<Path>) -> Result<RecorderConfig> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let contents = std::fs::read_to_string(path)?;
    load_config_from_str(&contents)
}

/// Parse and validate config YAML
pub fn load_config_from_str(yaml: &str) -> Result<RecorderConfig> {
    let config: RecorderConfig = if yaml.trim().is_empty() {
        RecorderConfig::default()
    } else {
        serde_yaml::from_str(yaml)?
    };
    config.validate()?;
    Ok(config)
}

// ============================================================================
// Info
// ============================================================================

/// OpenAPI `info` object settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfoConfig {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_api_version")]
    pub version: String,

    #[serde(default)]
    pub description: Option<String>,
}

impl Default for InfoConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            version: default_api_version(),
            description: None,
        }
    }
}

fn default_title() -> String {
    "Recorded API".to_string()
}

fn default_api_version() -> String {
    "1.0.0".to_string()
}

// ============================================================================
// Samples
// ============================================================================

/// Sample retention settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplesConfig {
    /// Samples kept per endpoint; the oldest is evicted first
    #[serde(default = "default_sample_cap")]
    pub cap: usize,
}

impl Default for SamplesConfig {
    fn default() -> Self {
        Self {
            cap: default_sample_cap(),
        }
    }
}

fn default_sample_cap() -> usize {
    DEFAULT_SAMPLE_CAP
}

// ============================================================================
// Parameters
// ============================================================================

/// Path parameter settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParametersConfig {
    #[serde(default)]
    pub policy: ParameterPolicy,
}

// ============================================================================
// Inference
// ============================================================================

/// Schema inference settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Detect string formats (date-time, uuid, ...)
    #[serde(default = "default_true")]
    pub detect_formats: bool,

    /// Nesting beyond this depth is left unconstrained
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            detect_formats: default_true(),
            max_depth: default_max_depth(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_depth() -> usize {
    32
}

// ============================================================================
// Capture
// ============================================================================

/// Capture filter settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Only record exchanges with JSON responses
    #[serde(default = "default_true")]
    pub json_only: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            json_only: default_true(),
        }
    }
}

// ============================================================================
// Server
// ============================================================================

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

fn default_port() -> u16 {
    8080
}
