//! Batch compare command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use image_compare::decode::{Payload, decode_in_background};
use image_compare::report::{self, Report};
use image_compare::{BatchComparator, BatchItem, BatchStatus, discover_candidates};

use super::SettingsArgs;

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Reference ("before") image
    #[arg(short, long)]
    pub reference: PathBuf,

    /// Directory of candidate images
    #[arg(short, long)]
    pub candidates: PathBuf,

    /// Directory for the CSV export and diff images
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also write a JSON report into the output directory
    #[arg(long, requires = "output")]
    pub json: bool,

    #[command(flatten)]
    pub settings: SettingsArgs,
}

pub fn run(args: CompareArgs, verbose: bool) -> Result<()> {
    let config = args.settings.resolve()?;

    // Decode the reference while the candidate folder is being listed.
    let pending = decode_in_background(
        Payload::from_path(&args.reference)
            .with_context(|| format!("Failed to read {}", args.reference.display()))?,
    );

    let candidates = discover_candidates(&args.candidates)
        .with_context(|| format!("Failed to list images in {}", args.candidates.display()))?;
    if verbose {
        eprintln!("Found {} candidate images in {}", candidates.len(), args.candidates.display());
    }

    let reference = pending
        .wait()
        .with_context(|| format!("Failed to decode reference {}", args.reference.display()))?;

    println!(
        "Reference: {} ({}x{})",
        reference.name,
        reference.raster.width(),
        reference.raster.height()
    );
    println!(
        "Sensitivity: {} (threshold {}), max diff: {}%\n",
        config.sensitivity,
        config.threshold(),
        config.max_diff.value()
    );

    let comparator = BatchComparator::new(config.execution);
    let progress = |_item: &BatchItem, done: usize, total: usize| {
        eprint!("\rCompared {}/{} images...", done, total);
    };

    let outcome = comparator.compare_all_observed(
        &reference.raster,
        candidates,
        config.threshold(),
        &progress,
    );
    eprintln!();

    let cutoff = config.max_diff.percent();
    println!("{:<40} {:>10}", "Candidate", "Difference");
    for item in outcome.results.items() {
        match item {
            BatchItem::Compared(r) if r.percentage <= cutoff => {
                println!("{:<40} {:>9}%", r.candidate, r.percentage_label());
            }
            BatchItem::Compared(r) if verbose => {
                println!("{:<40} {:>9}% (hidden)", r.candidate, r.percentage_label());
            }
            BatchItem::Compared(_) => {}
            BatchItem::Failed(f) => {
                println!("{:<40} {:>10}  {}", f.candidate, "FAILED", f.error);
            }
        }
    }

    let summary = outcome.results.summary(config.max_diff);
    println!(
        "\n{} shown, {} hidden by max diff, {} failed ({} in {:.2}s)",
        summary.visible,
        summary.hidden,
        summary.failed,
        outcome.status,
        outcome.elapsed.as_secs_f64()
    );
    if outcome.status == BatchStatus::Cancelled {
        println!("Batch was cancelled; results cover the first {} images only", outcome.results.len());
    }

    if let Some(dir) = &args.output {
        let shown = outcome.results.visible(config.max_diff);

        let csv_path = report::write_csv(dir, &reference.name, &shown, config.sensitivity)
            .with_context(|| format!("Failed to write CSV to {}", dir.display()))?;
        println!("Saved CSV to: {}", csv_path.display());

        let written = report::write_diff_images(dir, &shown)
            .with_context(|| format!("Failed to write diff images to {}", dir.display()))?;
        println!("Saved {} diff images to: {}", written.len(), dir.display());

        if args.json {
            let json_path = dir.join("report.json");
            Report::new(&reference.name, &outcome, &config)
                .write_json(&json_path)
                .with_context(|| format!("Failed to write {}", json_path.display()))?;
            println!("Saved report to: {}", json_path.display());
        }
    }

    Ok(())
}
