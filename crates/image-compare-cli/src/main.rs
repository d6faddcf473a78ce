//! image-compare CLI - batch visual diff against a reference image

use clap::{Parser, Subcommand};

mod commands;

/// Compare a folder of images against one reference image.
#[derive(Parser)]
#[command(name = "image-compare")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Diff every image in a directory against a reference
    Compare(commands::compare::CompareArgs),

    /// Diff a single candidate against a reference
    Diff(commands::diff::DiffArgs),

    /// Print the effective configuration as JSON
    Config(commands::config::ConfigArgs),
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Compare(args) => commands::compare::run(args, cli.verbose),
        Commands::Diff(args) => commands::diff::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
