//! Engine configuration.
//!
//! All fields default sensibly, so an empty TOML document is a valid
//! configuration. Typical file:
//!
//! ```toml
//! algorithm = "patience"
//! verbosity = "changes"
//! timeout_ms = 2000
//!
//! [limits]
//! max_bytes = 4194304
//! max_lines = 50000
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CompareError, Result};

/// Line-matching algorithm used for text comparison.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchAlgorithm {
    #[default]
    Myers,
    Patience,
    Lcs,
}

impl From<MatchAlgorithm> for similar::Algorithm {
    fn from(value: MatchAlgorithm) -> Self {
        match value {
            MatchAlgorithm::Myers => similar::Algorithm::Myers,
            MatchAlgorithm::Patience => similar::Algorithm::Patience,
            MatchAlgorithm::Lcs => similar::Algorithm::Lcs,
        }
    }
}

/// How much of a structural comparison is rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    /// Only changed, added and removed entries.
    Changes,
    /// Unchanged entries are rendered as context lines as well.
    #[default]
    Full,
}

/// Size ceilings applied to each input before any diffing happens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_bytes: usize,
    pub max_lines: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_bytes: 8 * 1024 * 1024,
            max_lines: 100_000,
        }
    }
}

/// Configuration for a [`Comparator`](crate::Comparator).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub limits: Limits,
    pub algorithm: MatchAlgorithm,
    /// Deadline for a single line or character diff. When it passes the
    /// matcher falls back to a coarser, still valid, edit script.
    pub timeout_ms: Option<u64>,
    /// Default verbosity for structural comparisons.
    pub verbosity: Verbosity,
}

impl EngineConfig {
    /// Parse a configuration from TOML text and validate it.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: EngineConfig =
            toml::from_str(text).map_err(|e| CompareError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| CompareError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Reject values that would make every comparison fail.
    pub fn validate(&self) -> Result<()> {
        if self.limits.max_bytes == 0 {
            return Err(CompareError::Config("limits.max_bytes must be positive".into()));
        }
        if self.limits.max_lines == 0 {
            return Err(CompareError::Config("limits.max_lines must be positive".into()));
        }
        if self.timeout_ms == Some(0) {
            return Err(CompareError::Config("timeout_ms must be positive".into()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}
