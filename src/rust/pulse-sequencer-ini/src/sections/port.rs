// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use ini_descriptor::{DataType, DescriptorBuilder};

use crate::SequencerLimits;

pub fn port_section_name(port: u32) -> String {
    format!("Port {port} sequence")
}

/// Sequence settings of one output port and its pulse definitions.
///
/// A port either defines its own pulses, copies the sequence of another port
/// or derives a DRAG sequence from a base port.
pub fn section_port_sequence(b: &mut DescriptorBuilder, limits: &SequencerLimits, port: u32) {
    let section = port_section_name(port);
    let section = section.as_str();
    let group = "General";
    let mode = format!("Port {port} - mode");
    let pulse_count = format!("Pulses for port {port}");

    b.quantity(&mode, "Mode", DataType::Combo, group, section)
        .combo_options(["Disabled", "Define", "Copy", "DRAG"])
        .add();

    b.quantity(
        format!("Port {port} - copy sequence from"),
        "Copy from port",
        DataType::Combo,
        group,
        section,
    )
    .combo_options(limits.other_ports(port))
    .visibility(&mode, ["Copy"])
    .add();

    b.quantity(
        format!("Port {port} - DRAG base"),
        "Base port",
        DataType::Combo,
        group,
        section,
    )
    .combo_options(limits.other_ports(port))
    .visibility(&mode, ["DRAG"])
    .add();

    b.quantity(
        format!("Port {port} - phase shift"),
        "Phase shift",
        DataType::Double,
        group,
        section,
    )
    .unit("PI rad")
    .limits(-2, 2)
    .visibility(&mode, ["Copy", "DRAG"])
    .add();

    b.quantity(
        format!("Port {port} - amplitude scale shift"),
        "Amplitude scale shift",
        DataType::Double,
        group,
        section,
    )
    .limits(-1, 1)
    .visibility(&mode, ["Copy"])
    .add();

    b.quantity(
        format!("Port {port} - DRAG scale"),
        "DRAG scale",
        DataType::Double,
        group,
        section,
    )
    .default(1e-9)
    .unit("s")
    .visibility(&mode, ["DRAG"])
    .add();

    b.quantity(
        format!("Port {port} - detuning frequency"),
        "DRAG detuning frequency",
        DataType::Double,
        group,
        section,
    )
    .unit("Hz")
    .low(0)
    .visibility(&mode, ["DRAG"])
    .add();

    b.small_comment(format!("Number of pulses for port {port}"));
    b.quantity(
        &pulse_count,
        "Number of unique pulses",
        DataType::Combo,
        group,
        section,
    )
    .combo_options((1..=limits.max_pulse_defs).map(|i| i.to_string()))
    .visibility(&mode, ["Define"])
    .add();

    for i in 1..=limits.max_pulse_defs {
        pulse_definition(b, limits, port, i, &pulse_count, section);
    }
}

fn pulse_definition(
    b: &mut DescriptorBuilder,
    limits: &SequencerLimits,
    port: u32,
    i: u32,
    pulse_count: &str,
    section: &str,
) {
    let group = format!("Pulse definition {i}");
    let group = group.as_str();
    let prefix = format!("Port {port} - def {i}");
    let defined_counts = i..=limits.max_pulse_defs;
    let sine_generator = format!("{prefix} - sine generator");
    let sweep_param = format!("{prefix} - Sweep param");
    let sweep_format = format!("{prefix} - Sweep format");

    b.quantity(format!("{prefix} - template"), "Envelope", DataType::Combo, group, section)
        .combo_options((1..=limits.max_templates).map(|j| j.to_string()))
        .visibility(pulse_count, defined_counts.clone())
        .add();

    b.quantity(
        format!("{prefix} - repeat count"),
        "Pulse repeat count",
        DataType::Double,
        group,
        section,
    )
    .set_cmd(["int"])
    .default(1)
    .low(1)
    .visibility(pulse_count, defined_counts.clone())
    .add();

    b.quantity(
        format!("{prefix} - start times"),
        "Start times",
        DataType::String,
        group,
        section,
    )
    .set_cmd(["time_string"])
    .unit("s")
    .default("0 + 0*i")
    .tooltip("Example: 100E6 + 50E6*i, 700E6, ...")
    .visibility(pulse_count, defined_counts.clone())
    .add();

    b.quantity(&sine_generator, "Sine generator", DataType::Combo, group, section)
        .combo_options(["1", "2", "None"])
        .visibility(pulse_count, defined_counts)
        .add();

    b.quantity(&sweep_param, "Sweepable parameter", DataType::Combo, group, section)
        .combo_options(["None", "Amplitude scale", "Carrier frequency", "Phase"])
        .visibility(&sine_generator, ["1", "2"])
        .add();

    b.quantity(format!("{prefix} - amp"), "Amplitude scale", DataType::Double, group, section)
        .limits(0, 1)
        .default(1)
        .visibility(&sweep_param, ["None", "Carrier frequency", "Phase"])
        .add();

    b.quantity(format!("{prefix} - freq"), "Carrier frequency", DataType::Double, group, section)
        .unit("Hz")
        .limits(0, 2e9)
        .visibility(&sweep_param, ["None", "Amplitude scale", "Phase"])
        .add();

    b.quantity(format!("{prefix} - phase"), "Phase", DataType::Double, group, section)
        .unit("PI rad")
        .limits(-2, 2)
        .visibility(&sweep_param, ["None", "Amplitude scale", "Carrier frequency"])
        .add();

    b.quantity(&sweep_format, "Sweep format", DataType::Combo, group, section)
        .combo_options(["Linear: Start-End", "Linear: Center-Span", "Custom"])
        .visibility(&sweep_param, ["Amplitude scale", "Carrier frequency", "Phase"])
        .add();

    for (suffix, label, format) in [
        ("Sweep linear start", "Start", "Linear: Start-End"),
        ("Sweep linear end", "End", "Linear: Start-End"),
        ("Sweep linear center", "Center", "Linear: Center-Span"),
        ("Sweep linear span", "Span", "Linear: Center-Span"),
    ] {
        b.quantity(format!("{prefix} - {suffix}"), label, DataType::Double, group, section)
            .visibility(&sweep_format, [format])
            .add();
    }

    b.quantity(
        format!("{prefix} - Sweep custom steps"),
        "Step values",
        DataType::String,
        group,
        section,
    )
    .tooltip("Separate with comma")
    .set_cmd(["double_list"])
    .visibility(&sweep_format, ["Custom"])
    .add();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver_info;
    use crate::sections::section_templates;

    fn build(limits: &SequencerLimits, port: u32) -> ini_descriptor::Descriptor {
        let mut b = DescriptorBuilder::new(driver_info());
        section_templates(&mut b, limits);
        section_port_sequence(&mut b, limits, port);
        b.build().unwrap()
    }

    #[test]
    fn test_record_count() {
        let limits = SequencerLimits::default();
        let descriptor = build(&limits, 2);
        let count = descriptor.section(&port_section_name(2)).count();
        assert_eq!(count, 8 + 14 * limits.max_pulse_defs as usize);
    }

    #[test]
    fn test_pulse_definition_visibility() {
        let limits = SequencerLimits::default();
        let descriptor = build(&limits, 5);
        let template = descriptor.get("Port 5 - def 10 - template").unwrap();
        let visibility = template.visibility.as_ref().unwrap();
        assert_eq!(visibility.quantity, "Pulses for port 5");
        let values: Vec<String> = visibility.values.iter().map(|v| v.to_string()).collect();
        assert_eq!(values, vec!["10", "11", "12", "13", "14", "15", "16"]);
        assert_eq!(template.combo_options.len(), limits.max_templates as usize);
    }

    #[test]
    fn test_linear_sweep_entries() {
        let descriptor = build(&SequencerLimits::default(), 1);
        let span = descriptor.get("Port 1 - def 1 - Sweep linear span").unwrap();
        assert_eq!(span.label, "Span");
        assert_eq!(
            span.visibility.as_ref().unwrap().values[0].to_string(),
            "Linear: Center-Span"
        );
        assert_eq!(span.group, "Pulse definition 1");
    }
}
