//! Comparison settings.
//!
//! The user-facing controls of a comparison run are explicit values here
//! rather than ambient UI state:
//!
//! | Control       | Range   | Default | Effect                                  |
//! |---------------|---------|---------|-----------------------------------------|
//! | Sensitivity   | 1-150   | 120     | `threshold = 151 - sensitivity`         |
//! | Max diff      | 0-100 % | 100     | hides results above this percentage     |
//! | Execution     | -       | Parallel| candidate fan-out strategy              |

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// User-facing inverse control of the diff threshold.
///
/// Higher sensitivity means a lower threshold, so more pixels are flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Sensitivity(u32);

impl Sensitivity {
    /// Lowest accepted sensitivity.
    pub const MIN: u32 = 1;
    /// Highest accepted sensitivity.
    pub const MAX: u32 = 150;
    /// Default sensitivity of a fresh session.
    pub const DEFAULT: u32 = 120;

    /// Validate a sensitivity value.
    pub fn new(value: u32) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::InvalidSensitivity(value))
        }
    }

    /// Raw sensitivity value.
    #[must_use]
    pub fn value(self) -> u32 {
        self.0
    }

    /// Per-pixel threshold derived as `151 - sensitivity`.
    #[must_use]
    pub fn threshold(self) -> Threshold {
        Threshold(Self::MAX + 1 - self.0)
    }
}

impl Default for Sensitivity {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<u32> for Sensitivity {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Sensitivity> for u32 {
    fn from(s: Sensitivity) -> Self {
        s.0
    }
}

impl std::fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Euclidean RGB distance above which a pixel counts as changed.
///
/// Any value is accepted: `0` flags every non-zero channel delta, and values
/// above ~441 (the largest possible RGB distance) flag nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Threshold(pub u32);

impl Threshold {
    /// Raw threshold value.
    #[must_use]
    pub fn value(self) -> u32 {
        self.0
    }

    /// Threshold squared, for comparing against squared distances.
    #[must_use]
    pub fn squared(self) -> u64 {
        u64::from(self.0) * u64::from(self.0)
    }
}

impl From<Sensitivity> for Threshold {
    fn from(s: Sensitivity) -> Self {
        s.threshold()
    }
}

impl std::fmt::Display for Threshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Visibility cutoff: results with a larger percentage are hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct MaxDiff(u32);

impl MaxDiff {
    /// Show everything.
    pub const ALL: Self = Self(100);

    /// Validate a max-diff percentage.
    pub fn new(percent: u32) -> Result<Self> {
        if percent <= 100 {
            Ok(Self(percent))
        } else {
            Err(Error::InvalidMaxDiff(percent))
        }
    }

    /// Cutoff as a percentage.
    #[must_use]
    pub fn percent(self) -> f64 {
        f64::from(self.0)
    }

    /// Raw cutoff value.
    #[must_use]
    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for MaxDiff {
    fn default() -> Self {
        Self::ALL
    }
}

impl TryFrom<u32> for MaxDiff {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<MaxDiff> for u32 {
    fn from(m: MaxDiff) -> Self {
        m.0
    }
}

/// How candidates of one batch are scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Execution {
    /// One candidate after another on the calling thread.
    Sequential,
    /// Candidates fanned out across the rayon pool.
    #[default]
    Parallel,
}

/// Configuration for a comparison run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// Sensitivity, from which the per-pixel threshold is derived.
    pub sensitivity: Sensitivity,

    /// Visibility cutoff applied by the reporter.
    pub max_diff: MaxDiff,

    /// Candidate scheduling.
    pub execution: Execution,
}

impl CompareConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> CompareConfigBuilder {
        CompareConfigBuilder::default()
    }

    /// Threshold derived from the configured sensitivity.
    #[must_use]
    pub fn threshold(&self) -> Threshold {
        self.sensitivity.threshold()
    }

    /// Load a configuration from a JSON file.
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Builder for [`CompareConfig`].
#[derive(Debug, Default)]
pub struct CompareConfigBuilder {
    base: Option<CompareConfig>,
    sensitivity: Option<u32>,
    max_diff: Option<u32>,
    execution: Option<Execution>,
}

impl CompareConfigBuilder {
    /// Start from an existing configuration instead of the defaults.
    #[must_use]
    pub fn base(mut self, config: CompareConfig) -> Self {
        self.base = Some(config);
        self
    }

    /// Set the sensitivity (1-150).
    #[must_use]
    pub fn sensitivity(mut self, value: u32) -> Self {
        self.sensitivity = Some(value);
        self
    }

    /// Set the max-diff cutoff (0-100).
    #[must_use]
    pub fn max_diff(mut self, percent: u32) -> Self {
        self.max_diff = Some(percent);
        self
    }

    /// Set the execution strategy.
    #[must_use]
    pub fn execution(mut self, execution: Execution) -> Self {
        self.execution = Some(execution);
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<CompareConfig> {
        let base = self.base.unwrap_or_default();
        Ok(CompareConfig {
            sensitivity: match self.sensitivity {
                Some(v) => Sensitivity::new(v)?,
                None => base.sensitivity,
            },
            max_diff: match self.max_diff {
                Some(v) => MaxDiff::new(v)?,
                None => base.max_diff,
            },
            execution: self.execution.unwrap_or(base.execution),
        })
    }
}
