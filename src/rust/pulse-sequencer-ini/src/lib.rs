// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Instrument descriptor for the Vivace Pulse Sequencer.
//!
//! The descriptor enumerates every quantity the pulse sequencer driver
//! exposes: envelope templates, per-port pulse definitions, sampling and
//! preview settings. The number of templates, pulse definitions and ports is
//! taken from [`SequencerLimits`].

mod limits;
pub mod sections;

use ini_descriptor::{Descriptor, DescriptorBuilder, DriverInfo};

pub use limits::{FIXED_SHAPES, SequencerLimits};

pub const NAME: &str = "Vivace Pulse Sequencer";
pub const VERSION: &str = "1.2";
pub const DRIVER_PATH: &str = "Vivace_Pulse_Sequencer";
pub const AUTHOR: &str = "Johan Blomberg and Gustav Grännsjö";
pub const INTERFACE: &str = "TCPIP";
pub const DEFAULT_FILENAME: &str = "Vivace_Pulse_Sequencer.ini";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid sequencer limits: {0}")]
    InvalidLimits(String),
    #[error(transparent)]
    Descriptor(#[from] ini_descriptor::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// General settings of the pulse sequencer driver.
pub fn driver_info() -> DriverInfo {
    DriverInfo::new(NAME, VERSION, DRIVER_PATH)
        .with_author(AUTHOR)
        .with_interface(INTERFACE)
}

/// Build the complete pulse sequencer descriptor.
pub fn build_descriptor(limits: &SequencerLimits, info: DriverInfo) -> Result<Descriptor> {
    limits.validate()?;
    let mut builder = DescriptorBuilder::new(info);

    builder.big_comment("TEMPLATES");
    sections::section_templates(&mut builder, limits);

    builder.big_comment("SWEEPABLE PULSE (and more...)");
    sections::section_general(&mut builder);

    for port in 1..=limits.ports {
        builder.big_comment(format!("Pulse definitions - Port {port}"));
        sections::section_port_sequence(&mut builder, limits, port);
    }

    builder.big_comment("SAMPLING");
    sections::section_sample(&mut builder, limits);

    builder.big_comment("PREVIEW");
    sections::section_preview(&mut builder, limits);

    vivace_log::debug!(
        "Collected {} quantities for {} ports",
        builder.num_quantities(),
        limits.ports
    );
    Ok(builder.build()?)
}

/// Number of quantities in each section, in file order.
pub fn section_counts(descriptor: &Descriptor) -> Vec<(&str, usize)> {
    descriptor
        .sections()
        .into_iter()
        .map(|section| (section, descriptor.section(section).count()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::{SECTION_GENERAL, SECTION_PREVIEW, SECTION_SAMPLING, SECTION_TEMPLATES};

    #[test]
    fn test_section_counts() {
        let descriptor = build_descriptor(&SequencerLimits::default(), driver_info()).unwrap();
        let counts = section_counts(&descriptor);
        assert_eq!(counts.len(), 2 + 8 + 2);
        assert_eq!(counts[0], (SECTION_TEMPLATES, 151));
        assert_eq!(counts[1], (SECTION_GENERAL, 5));
        for (port, (section, count)) in (1..=8).zip(&counts[2..10]) {
            assert_eq!(*section, sections::port_section_name(port));
            assert_eq!(*count, 232);
        }
        assert_eq!(counts[10], (SECTION_SAMPLING, 37));
        assert_eq!(counts[11], (SECTION_PREVIEW, 7));
        assert_eq!(
            counts.iter().map(|(_, count)| count).sum::<usize>(),
            descriptor.len()
        );
    }

    #[test]
    fn test_driver_version_is_not_the_crate_version() {
        assert_eq!(driver_info().version, "1.2");
        assert_ne!(VERSION, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_descriptor_error_passes_through() {
        let error = Error::from(ini_descriptor::Error::EmptyCombo("Shape".to_string()));
        assert!(matches!(
            &error,
            Error::Descriptor(ini_descriptor::Error::EmptyCombo(name)) if name == "Shape"
        ));
        assert_eq!(
            error.to_string(),
            ini_descriptor::Error::EmptyCombo("Shape".to_string()).to_string()
        );
    }
}
