// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use ini_descriptor::{DataType, DescriptorBuilder};

pub const SECTION_GENERAL: &str = "General settings";

pub fn section_general(b: &mut DescriptorBuilder) {
    let section = SECTION_GENERAL;
    let group = "Settings";

    b.quantity("Average", "Number of averages", DataType::Double, group, section)
        .low(1)
        .default(1)
        .set_cmd(["int"])
        .show_in_measurement(true)
        .add();

    b.quantity("Trigger period", "Trigger period", DataType::Double, group, section)
        .low(0)
        .default(200e-6)
        .show_in_measurement(true)
        .add();

    b.quantity("Iterations", "Iterations", DataType::Double, group, section)
        .low(1)
        .default(1)
        .set_cmd(["int"])
        .show_in_measurement(true)
        .add();

    // Time trace output selection
    let group = "Time trace output selection";
    b.quantity(
        "Index of displayed time trace - iteration",
        "Iteration",
        DataType::Double,
        group,
        section,
    )
    .default(1)
    .low(1)
    .tooltip("Which measurement iteration to output a trace for.")
    .set_cmd(["int", "not_affecting_board"])
    .show_in_measurement(true)
    .add();

    b.quantity(
        "Index of displayed time trace - sample pulse",
        "Sampling pulse",
        DataType::Double,
        group,
        section,
    )
    .default(1)
    .low(1)
    .tooltip("Which sampling pulse in the given iteration to output a time trace for.")
    .set_cmd(["int", "not_affecting_board"])
    .show_in_measurement(true)
    .add();
}
