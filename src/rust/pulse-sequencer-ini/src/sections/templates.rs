// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use ini_descriptor::{DataType, DescriptorBuilder};

use crate::SequencerLimits;

pub const SECTION_TEMPLATES: &str = "Envelopes";

/// Selector for how many envelope templates are in use.
pub const TEMPLATE_COUNT: &str = "Envelope template count";

const LONG_DRIVE: &str = "Long drive";

pub fn section_templates(b: &mut DescriptorBuilder, limits: &SequencerLimits) {
    let section = SECTION_TEMPLATES;
    let shapes = limits.shapes();
    let sampled_shapes: Vec<&String> = shapes.iter().filter(|s| *s != LONG_DRIVE).collect();

    b.quantity(
        TEMPLATE_COUNT,
        "No. of envelope templates",
        DataType::Combo,
        "General",
        section,
    )
    .combo_options((1..=limits.max_templates).map(|i| i.to_string()))
    .add();

    for i in 1..=limits.max_templates {
        let group = format!("Envelope template {i}");
        let shape = format!("Envelope template {i}: shape");
        let zero_padding = format!("Envelope template {i}: use zero-padding");
        let rise_and_fall = format!("Envelope template {i}: use gaussian rise and fall");

        b.quantity(&shape, "Envelope shape", DataType::Combo, &group, section)
            .combo_options(&shapes)
            .visibility(TEMPLATE_COUNT, i..=limits.max_templates)
            .add();

        b.quantity(
            format!("Envelope template {i}: sinP Value"),
            "P",
            DataType::Double,
            &group,
            section,
        )
        .low(0)
        .visibility(&shape, ["SinP"])
        .add();

        b.quantity(
            format!("Envelope template {i}: sinc cutoff"),
            "Cutoff",
            DataType::Double,
            &group,
            section,
        )
        .unit("PI")
        .default(4)
        .low(1e-9)
        .visibility(&shape, ["Sinc"])
        .tooltip("The sinc wave will be defined from -x*PI to +x*PI")
        .add();

        b.quantity(
            format!("Envelope template {i}: gaussian truncation"),
            "Truncate at x*sigma",
            DataType::Double,
            &group,
            section,
        )
        .default(2)
        .low(1e-9)
        .visibility(&shape, ["Gaussian"])
        .add();

        b.quantity(
            format!("Envelope template {i}: duration"),
            "Duration",
            DataType::Double,
            &group,
            section,
        )
        .unit("s")
        .visibility(&shape, sampled_shapes.iter().copied())
        .limits(1e-9, 10e-6)
        .default(1e-9)
        .add();

        b.quantity(&zero_padding, "Use zero-padding", DataType::Boolean, &group, section)
            .visibility(&shape, sampled_shapes.iter().copied())
            .tooltip(
                "Lets you \"shift\" the template's start time by adding up to 2ns of leading \
                 zeroes to it.",
            )
            .add();

        b.quantity(
            format!("Envelope template {i}: padding length"),
            "Padding length",
            DataType::Double,
            &group,
            section,
        )
        .unit("ns")
        .visibility(&zero_padding, [true])
        .limits(0, 2)
        .default(1)
        .set_cmd(["quarter_value"])
        .add();

        b.quantity(
            format!("Envelope template {i}: long drive duration"),
            "Duration",
            DataType::String,
            &group,
            section,
        )
        .unit("s")
        .set_cmd(["time_string", "single"])
        .tooltip("Example: 100E6 + 50E6*i")
        .default("0 + 0*i")
        .visibility(&shape, [LONG_DRIVE])
        .add();

        b.quantity(
            &rise_and_fall,
            "Use gaussian rise and fall",
            DataType::Boolean,
            &group,
            section,
        )
        .visibility(&shape, [LONG_DRIVE])
        .add();

        b.quantity(
            format!("Envelope template {i}: gaussian rise and fall duration"),
            "Rise and fall duration",
            DataType::Double,
            &group,
            section,
        )
        .tooltip(
            "Both the rise and the fall have this duration, and they are placed within the \
             total duration of the pulse.",
        )
        .low(1e-9)
        .default(10e-9)
        .visibility(&rise_and_fall, [true])
        .add();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver_info;

    fn build(limits: &SequencerLimits) -> ini_descriptor::Descriptor {
        let mut b = DescriptorBuilder::new(driver_info());
        section_templates(&mut b, limits);
        b.build().unwrap()
    }

    #[test]
    fn test_record_count() {
        let limits = SequencerLimits::default();
        let descriptor = build(&limits);
        assert_eq!(descriptor.len(), 1 + 10 * limits.max_templates as usize);
    }

    #[test]
    fn test_duration_hidden_for_long_drive() {
        let descriptor = build(&SequencerLimits::default());
        let duration = descriptor.get("Envelope template 3: duration").unwrap();
        let visibility = duration.visibility.as_ref().unwrap();
        assert_eq!(visibility.quantity, "Envelope template 3: shape");
        assert_eq!(visibility.values.len(), 11);
        assert!(visibility.values.iter().all(|v| v.to_string() != LONG_DRIVE));
    }

    #[test]
    fn test_padding_follows_checkbox() {
        let descriptor = build(&SequencerLimits::default());
        let padding = descriptor.get("Envelope template 1: padding length").unwrap();
        assert_eq!(padding.set_cmd, vec!["quarter_value"]);
        assert_eq!(
            padding.visibility.as_ref().unwrap().quantity,
            "Envelope template 1: use zero-padding"
        );
        assert_eq!(padding.low.as_ref().unwrap().to_string(), "0");
        assert_eq!(padding.high.as_ref().unwrap().to_string(), "2");
    }
}
