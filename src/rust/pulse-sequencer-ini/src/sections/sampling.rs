// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use ini_descriptor::{DataType, DescriptorBuilder, Permission};

use crate::SequencerLimits;

pub const SECTION_SAMPLING: &str = "Sampling";

/// Sampling windows, per-port result traces and template vectors.
pub fn section_sample(b: &mut DescriptorBuilder, limits: &SequencerLimits) {
    let section = SECTION_SAMPLING;
    let group = "Timing";

    b.quantity("Sampling - start times", "Start times", DataType::String, group, section)
        .set_cmd(["time_string"])
        .unit("s")
        .default("0 + 0*i")
        .tooltip("Example: 100E6 + 50E6*i, 700E6, ...")
        .add();

    b.quantity("Sampling - duration", "Duration", DataType::Double, group, section)
        .limits(0, 4096e-9)
        .unit("s")
        .add();

    let group = "Port selection";
    for port in 1..=limits.ports {
        b.quantity(
            format!("Sampling on port {port}"),
            format!("Port {port}"),
            DataType::Boolean,
            group,
            section,
        )
        .add();
    }

    // Results are read-only vectors and never shown in the settings dialog.
    for port in 1..=limits.ports {
        b.quantity(format!("Port {port}: Time trace"), "", DataType::Vector, group, section)
            .get_cmd("get_result")
            .add_line("x_unit: s")
            .visibility(format!("Sampling on port {port}"), [true])
            .show_in_measurement(true)
            .add();
    }

    for i in 1..=limits.custom_templates {
        b.quantity(format!("Custom template {i}"), "", DataType::Vector, group, section)
            .permission(Permission::Write)
            .add();
    }

    let shapes = limits.shapes();
    for template in 1..=limits.max_templates {
        b.quantity(
            format!("Template {template}: Preview"),
            "",
            DataType::Vector,
            group,
            section,
        )
        .get_cmd("template_preview")
        .add_line("x_unit: s")
        .visibility(format!("Envelope template {template}: shape"), &shapes)
        .add();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver_info;
    use crate::sections::section_templates;

    #[test]
    fn test_record_count() {
        let limits = SequencerLimits::default();
        let mut b = DescriptorBuilder::new(driver_info());
        section_templates(&mut b, &limits);
        section_sample(&mut b, &limits);
        let descriptor = b.build().unwrap();
        let expected = 2 + 2 * limits.ports + limits.custom_templates + limits.max_templates;
        assert_eq!(descriptor.section(SECTION_SAMPLING).count(), expected as usize);

        let trace = descriptor.get("Port 8: Time trace").unwrap();
        assert_eq!(trace.extra_lines, vec!["x_unit: s"]);
        assert_eq!(trace.get_cmd.as_deref(), Some("get_result"));
        assert!(trace.show_in_measurement);
    }

    #[test]
    fn test_preview_needs_templates() {
        let mut b = DescriptorBuilder::new(driver_info());
        section_sample(&mut b, &SequencerLimits::default());
        assert!(matches!(
            b.build(),
            Err(ini_descriptor::Error::UnknownVisibilityTarget { .. })
        ));
    }
}
