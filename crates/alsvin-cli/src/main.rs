//! Alsvin Command-Line Interface
//!
//! The main entry point for the Alsvin CLI tool.
//!
//! ```text
//!                    A L S V I N
//!        Quantum Adversarial Generator Training
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{eval, synth, train};

/// Alsvin - quantum-circuit generator trained adversarially against a critic
#[derive(Parser)]
#[command(name = "alsvin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the generator against a real dataset
    Train {
        /// Training configuration (YAML)
        #[arg(short, long)]
        config: String,

        /// Dataset file (JSON array of equal-length vectors)
        #[arg(short, long)]
        dataset: String,

        /// Output directory for checkpoints and the metric history
        #[arg(short, long, default_value = "runs")]
        out: String,

        /// Base seed for the deterministic token stream
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },

    /// Estimate the KL divergence between two sample files
    Eval {
        /// Generated samples (JSON array of vectors)
        #[arg(short, long)]
        generated: String,

        /// Reference samples (JSON array of vectors)
        #[arg(short, long)]
        reference: String,
    },

    /// Write a toy two-cluster dataset for smoke runs
    Synth {
        /// Output file (JSON)
        #[arg(short, long)]
        out: String,

        /// Number of rows
        #[arg(long, default_value = "256")]
        rows: usize,

        /// Cluster separation along each axis
        #[arg(long, default_value = "2.0")]
        spread: f64,

        /// Seed for the synthetic draw
        #[arg(short, long, default_value = "7")]
        seed: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    match cli.command {
        Commands::Train {
            config,
            dataset,
            out,
            seed,
        } => train::execute(&config, &dataset, &out, seed),

        Commands::Eval {
            generated,
            reference,
        } => eval::execute(&generated, &reference),

        Commands::Synth {
            out,
            rows,
            spread,
            seed,
        } => synth::execute(&out, rows, spread, seed),
    }
}
