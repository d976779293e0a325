// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use crate::{Error, Result};

/// Envelope shapes built into the sequencer, in the order the driver lists them.
pub const FIXED_SHAPES: [&str; 8] = [
    "Square",
    "Long drive",
    "Sin2",
    "SinP",
    "Sinc",
    "Triangle",
    "Gaussian",
    "Cool",
];

/// Sizes of the repeated blocks in the descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencerLimits {
    pub max_templates: u32,
    pub custom_templates: u32,
    pub max_pulse_defs: u32,
    pub ports: u32,
}

impl Default for SequencerLimits {
    fn default() -> Self {
        Self {
            max_templates: 15,
            custom_templates: 4,
            max_pulse_defs: 16,
            ports: 8,
        }
    }
}

impl SequencerLimits {
    /// Reject limits that would leave a selector without options.
    pub fn validate(&self) -> Result<()> {
        if self.max_templates == 0 {
            return Err(Error::InvalidLimits(
                "at least one envelope template is required".to_string(),
            ));
        }
        if self.max_pulse_defs == 0 {
            return Err(Error::InvalidLimits(
                "at least one pulse definition per port is required".to_string(),
            ));
        }
        if self.ports < 2 {
            return Err(Error::InvalidLimits(format!(
                "at least two ports are required to copy sequences, got {}",
                self.ports
            )));
        }
        Ok(())
    }

    /// Fixed shapes followed by `Custom 1..=custom_templates`.
    pub fn shapes(&self) -> Vec<String> {
        FIXED_SHAPES
            .iter()
            .map(|s| s.to_string())
            .chain((1..=self.custom_templates).map(|i| format!("Custom {i}")))
            .collect()
    }

    /// All ports except `port`, as combo options.
    pub fn other_ports(&self, port: u32) -> Vec<String> {
        (1..=self.ports)
            .filter(|&p| p != port)
            .map(|p| p.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_shapes() {
        let shapes = SequencerLimits::default().shapes();
        assert_eq!(shapes.len(), 12);
        assert_eq!(shapes[0], "Square");
        assert_eq!(shapes[7], "Cool");
        assert_eq!(shapes[8], "Custom 1");
        assert_eq!(shapes[11], "Custom 4");
    }

    #[test]
    fn test_no_custom_shapes() {
        let limits = SequencerLimits {
            custom_templates: 0,
            ..Default::default()
        };
        assert_eq!(limits.shapes().len(), FIXED_SHAPES.len());
        assert!(limits.validate().is_ok());
    }

    #[test]
    fn test_other_ports() {
        let limits = SequencerLimits::default();
        assert_eq!(limits.other_ports(3), vec!["1", "2", "4", "5", "6", "7", "8"]);
    }

    #[test]
    fn test_validate_rejects_zero() {
        for limits in [
            SequencerLimits {
                max_templates: 0,
                ..Default::default()
            },
            SequencerLimits {
                max_pulse_defs: 0,
                ..Default::default()
            },
            SequencerLimits {
                ports: 1,
                ..Default::default()
            },
        ] {
            assert!(matches!(limits.validate(), Err(Error::InvalidLimits(_))));
        }
    }
}
