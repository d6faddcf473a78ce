//! Single-pair diff command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use image_compare::decode::load_path;
use image_compare::diff::diff;

use super::SettingsArgs;

#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Reference ("before") image
    pub reference: PathBuf,

    /// Candidate ("after") image
    pub candidate: PathBuf,

    /// Write the diff overlay as PNG to this path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub settings: SettingsArgs,
}

pub fn run(args: DiffArgs) -> Result<()> {
    let config = args.settings.resolve()?;

    let reference = load_path(&args.reference)
        .with_context(|| format!("Failed to load {}", args.reference.display()))?;
    let candidate = load_path(&args.candidate)
        .with_context(|| format!("Failed to load {}", args.candidate.display()))?;

    let out = diff(&reference.raster, &candidate.raster, config.threshold());
    println!(
        "{} vs {}: {:.2}% ({} of {} pixels, {}x{} canvas)",
        reference.name,
        candidate.name,
        out.percentage,
        out.changed_pixels,
        out.total_pixels,
        out.raster.width(),
        out.raster.height()
    );

    if let Some(path) = args.output {
        std::fs::write(&path, out.raster.to_png()?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Saved diff to: {}", path.display());
    }

    Ok(())
}
