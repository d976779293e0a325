// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Generate the Vivace Pulse Sequencer instrument descriptor.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use pulse_sequencer_ini::{
    DEFAULT_FILENAME, SequencerLimits, build_descriptor, driver_info, section_counts,
};

#[derive(Parser, Debug)]
#[command(name = "pulse-sequencer-ini")]
#[command(about = "Generate the Vivace Pulse Sequencer instrument descriptor")]
struct Args {
    /// Output file
    #[arg(short, long, default_value = DEFAULT_FILENAME)]
    output: PathBuf,

    /// Write the descriptor to stdout instead of a file
    #[arg(long, conflicts_with = "output")]
    stdout: bool,

    /// Number of envelope templates
    #[arg(long, default_value_t = SequencerLimits::default().max_templates)]
    max_templates: u32,

    /// Number of user-defined envelope templates
    #[arg(long, default_value_t = SequencerLimits::default().custom_templates)]
    custom_templates: u32,

    /// Number of pulse definitions per port
    #[arg(long, default_value_t = SequencerLimits::default().max_pulse_defs)]
    max_pulse_defs: u32,

    /// Number of output ports
    #[arg(long, default_value_t = SequencerLimits::default().ports)]
    ports: u32,

    /// Override the driver version string
    #[arg(long)]
    version_string: Option<String>,

    /// Override the author
    #[arg(long)]
    author: Option<String>,

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

    let limits = SequencerLimits {
        max_templates: args.max_templates,
        custom_templates: args.custom_templates,
        max_pulse_defs: args.max_pulse_defs,
        ports: args.ports,
    };
    let mut info = driver_info();
    if let Some(version) = args.version_string {
        info.version = version;
    }
    if let Some(author) = args.author {
        info.author = Some(author);
    }

    let descriptor =
        build_descriptor(&limits, info).context("Failed to build the pulse sequencer descriptor")?;
    for (section, count) in section_counts(&descriptor) {
        vivace_log::diagnostic!("Section '{}': {} quantities", section, count);
    }

    if args.stdout {
        std::io::stdout()
            .lock()
            .write_all(descriptor.render().as_bytes())
            .context("Failed to write descriptor to stdout")?;
    } else {
        descriptor.write(&args.output)?;
        vivace_log::info!(
            "Wrote {} quantities to {}",
            descriptor.len(),
            args.output.display()
        );
    }
    Ok(())
}
