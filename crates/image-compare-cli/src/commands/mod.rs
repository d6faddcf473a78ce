//! CLI command implementations.

pub mod compare;
pub mod config;
pub mod diff;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use image_compare::{CompareConfig, Execution};

/// Settings shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// JSON config file; flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Sensitivity 1-150 (higher flags more pixels)
    #[arg(short, long, env = "IMAGE_COMPARE_SENSITIVITY")]
    pub sensitivity: Option<u32>,

    /// Hide results whose difference exceeds this percentage (0-100)
    #[arg(short, long, env = "IMAGE_COMPARE_MAX_DIFF")]
    pub max_diff: Option<u32>,

    /// Compare candidates one at a time instead of in parallel
    #[arg(long)]
    pub sequential: bool,
}

impl SettingsArgs {
    /// Resolve into a validated configuration.
    pub fn resolve(&self) -> Result<CompareConfig> {
        let base = match &self.config {
            Some(path) => CompareConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => CompareConfig::default(),
        };

        let mut builder = CompareConfig::builder().base(base);
        if let Some(s) = self.sensitivity {
            builder = builder.sensitivity(s);
        }
        if let Some(m) = self.max_diff {
            builder = builder.max_diff(m);
        }
        if self.sequential {
            builder = builder.execution(Execution::Sequential);
        }

        builder.build().context("Invalid settings")
    }
}
