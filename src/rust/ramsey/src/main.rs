// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Run the Ramsey fringe measurement.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use ramsey::archive::default_save_path;
use ramsey::schedule::{RamseySchedule, SequenceTiming};
use ramsey::simulated::SimulatedLab;
use ramsey::{RamseyArchive, RamseyConfig, run};

#[derive(Parser, Debug)]
#[command(name = "ramsey")]
#[command(about = "Measure Ramsey fringes over a drive detuning sweep")]
struct Args {
    /// JSON configuration; missing fields take their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Result file [default: ramsey_lo_<unix time>.json]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Override the number of averages
    #[arg(long)]
    averages: Option<u32>,

    /// Override the pause after each source frequency change (s)
    #[arg(long)]
    settle_time: Option<f64>,

    /// Validate the configuration and print the sequence without measuring
    #[arg(long)]
    dry_run: bool,

    /// Increase log verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    vivace_log::init_logging(
        vivace_log::level_from_verbosity(args.verbose),
        args.verbose > 0,
    );

    let mut config = match &args.config {
        Some(path) => RamseyConfig::load(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => RamseyConfig::default(),
    };
    if let Some(averages) = args.averages {
        config.sequence.num_averages = averages;
    }
    if let Some(settle_time) = args.settle_time {
        config.sequence.settle_time = settle_time;
    }
    config.validate().context("Invalid configuration")?;

    let schedule = RamseySchedule::new(SequenceTiming::from_config(&config));
    if args.dry_run {
        print!("{}", schedule.summary(&config));
        return Ok(());
    }

    vivace_log::warn!("No instrument drivers are available, running on simulated instruments");
    let mut lab = SimulatedLab::from_config(&config);
    let result = run(&config, &mut lab.lo, &mut lab.source, &mut lab.controller)
        .context("Measurement aborted")?;

    let path = args.output.unwrap_or_else(|| default_save_path("."));
    RamseyArchive::new(&config, result)?.save(&path)?;
    vivace_log::info!("Saved {}", path.display());
    Ok(())
}
