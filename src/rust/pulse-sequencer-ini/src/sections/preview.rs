// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use ini_descriptor::{DataType, DescriptorBuilder, Permission};

use crate::SequencerLimits;

pub const SECTION_PREVIEW: &str = "Preview";

pub fn section_preview(b: &mut DescriptorBuilder, limits: &SequencerLimits) {
    let section = SECTION_PREVIEW;
    let group = "Settings";

    b.quantity("Preview port", "Preview sequence on port", DataType::Combo, group, section)
        .combo_options((1..=limits.ports).map(|p| p.to_string()))
        .add();

    b.quantity("Preview iteration", "Preview iteration", DataType::Double, group, section)
        .default(1)
        .low(1)
        .set_cmd(["int"])
        .add();

    b.quantity(
        "Enable preview slicing",
        "Enable preview slicing",
        DataType::Boolean,
        group,
        section,
    )
    .tooltip("This will let you specify which segment of the pulse sequence to preview.")
    .add();

    b.quantity("Preview slice start", "Slice start", DataType::Double, group, section)
        .unit("s")
        .low(0)
        .visibility("Enable preview slicing", [true])
        .add();

    b.quantity("Preview slice end", "Slice end", DataType::Double, group, section)
        .unit("s")
        .low(1e-9)
        .default(1e-9)
        .visibility("Enable preview slicing", [true])
        .add();

    b.quantity(
        "Preview sample windows",
        "Preview sample windows",
        DataType::Boolean,
        group,
        section,
    )
    .tooltip(
        "This will display sample windows as flat lines at y=-0.1. Pulses that overlap with \
         these sample windows will be hidden.",
    )
    .add();

    b.quantity("Pulse sequence preview", "", DataType::Vector, group, section)
        .permission(Permission::Read)
        .add();
}
