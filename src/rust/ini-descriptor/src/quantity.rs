// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Write;

use crate::value::{DataType, Permission, Value};

/// Show a quantity only while another quantity holds one of `values`.
#[derive(Debug, Clone, PartialEq)]
pub struct Visibility {
    pub quantity: String,
    pub values: Vec<Value>,
}

/// A single parameter definition of the descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    pub name: String,
    pub label: String,
    pub datatype: DataType,
    pub group: String,
    pub section: String,
    pub combo_options: Vec<String>,
    pub low: Option<Value>,
    pub high: Option<Value>,
    pub default: Option<Value>,
    pub unit: Option<String>,
    pub tooltip: Option<String>,
    pub visibility: Option<Visibility>,
    pub set_cmd: Vec<String>,
    pub get_cmd: Option<String>,
    pub permission: Option<Permission>,
    pub show_in_measurement: bool,
    pub extra_lines: Vec<String>,
}

impl Quantity {
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        datatype: DataType,
        group: impl Into<String>,
        section: impl Into<String>,
    ) -> Self {
        Quantity {
            name: name.into(),
            label: label.into(),
            datatype,
            group: group.into(),
            section: section.into(),
            combo_options: Vec::new(),
            low: None,
            high: None,
            default: None,
            unit: None,
            tooltip: None,
            visibility: None,
            set_cmd: Vec::new(),
            get_cmd: None,
            permission: None,
            show_in_measurement: false,
            extra_lines: Vec::new(),
        }
    }

    /// Render the quantity block.
    ///
    /// Keys always appear in the same order, independent of the order in
    /// which the attributes were set.
    pub(crate) fn render(&self, out: &mut String) {
        // Writing into a `String` cannot fail.
        let _ = self.render_inner(out);
    }

    fn render_inner(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "[{}]", self.name)?;
        writeln!(out, "label: {}", self.label)?;
        writeln!(out, "datatype: {}", self.datatype)?;
        writeln!(out, "group: {}", self.group)?;
        writeln!(out, "section: {}", self.section)?;
        for (i, option) in self.combo_options.iter().enumerate() {
            writeln!(out, "combo_def_{}: {}", i + 1, option)?;
        }
        if let Some(low) = &self.low {
            writeln!(out, "low_lim: {low}")?;
        }
        if let Some(high) = &self.high {
            writeln!(out, "high_lim: {high}")?;
        }
        if let Some(default) = &self.default {
            writeln!(out, "def_value: {default}")?;
        }
        if let Some(unit) = &self.unit {
            writeln!(out, "unit: {unit}")?;
        }
        if let Some(tooltip) = &self.tooltip {
            writeln!(out, "tooltip: {tooltip}")?;
        }
        if let Some(visibility) = &self.visibility {
            writeln!(out, "state_quant: {}", visibility.quantity)?;
            for (i, value) in visibility.values.iter().enumerate() {
                writeln!(out, "state_value_{}: {}", i + 1, value)?;
            }
        }
        if !self.set_cmd.is_empty() {
            writeln!(out, "set_cmd: {}", self.set_cmd.join(", "))?;
        }
        if let Some(get_cmd) = &self.get_cmd {
            writeln!(out, "get_cmd: {get_cmd}")?;
        }
        if let Some(permission) = &self.permission {
            writeln!(out, "permission: {permission}")?;
        }
        if self.show_in_measurement {
            writeln!(out, "show_in_measurement_dlg: True")?;
        }
        for line in &self.extra_lines {
            writeln!(out, "{line}")?;
        }
        Ok(())
    }
}
