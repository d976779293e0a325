// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use indexmap::IndexMap;

use crate::descriptor::{Descriptor, DriverInfo, Entry};
use crate::quantity::{Quantity, Visibility};
use crate::value::{DataType, Permission, Value};
use crate::{Error, Result};

/// Collects descriptor entries in insertion order.
///
/// Nothing is checked while entries are added; [`DescriptorBuilder::build`]
/// validates the whole list at once and returns an immutable [`Descriptor`].
pub struct DescriptorBuilder {
    info: DriverInfo,
    entries: Vec<Entry>,
}

impl DescriptorBuilder {
    pub fn new(info: DriverInfo) -> Self {
        Self {
            info,
            entries: Vec::new(),
        }
    }

    /// Add a banner comment separating larger parts of the file.
    pub fn big_comment(&mut self, text: impl Into<String>) -> &mut Self {
        self.entries.push(Entry::BigComment(text.into()));
        self
    }

    pub fn small_comment(&mut self, text: impl Into<String>) -> &mut Self {
        self.entries.push(Entry::SmallComment(text.into()));
        self
    }

    /// Start a new quantity. The quantity is appended when
    /// [`QuantityBuilder::add`] is called.
    pub fn quantity(
        &mut self,
        name: impl Into<String>,
        label: impl Into<String>,
        datatype: DataType,
        group: impl Into<String>,
        section: impl Into<String>,
    ) -> QuantityBuilder<'_> {
        QuantityBuilder {
            descriptor: self,
            inner: Quantity::new(name, label, datatype, group, section),
        }
    }

    pub fn push(&mut self, quantity: Quantity) -> &mut Self {
        self.entries.push(Entry::Quantity(quantity));
        self
    }

    pub fn num_quantities(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, Entry::Quantity(_)))
            .count()
    }

    pub fn build(self) -> Result<Descriptor> {
        let mut index: IndexMap<String, usize> = IndexMap::new();
        for (position, entry) in self.entries.iter().enumerate() {
            let Entry::Quantity(quantity) = entry else {
                continue;
            };
            validate_quantity(quantity)?;
            if let Some(visibility) = &quantity.visibility {
                let target = index
                    .get(&visibility.quantity)
                    .and_then(|&i| self.entries[i].as_quantity())
                    .ok_or_else(|| Error::UnknownVisibilityTarget {
                        quantity: quantity.name.clone(),
                        target: visibility.quantity.clone(),
                    })?;
                validate_visibility(quantity, target, visibility)?;
            }
            if index.insert(quantity.name.clone(), position).is_some() {
                return Err(Error::DuplicateQuantity(quantity.name.clone()));
            }
        }
        Ok(Descriptor::new(self.info, self.entries, index))
    }
}

fn validate_quantity(quantity: &Quantity) -> Result<()> {
    if quantity.datatype == DataType::Combo && quantity.combo_options.is_empty() {
        return Err(Error::EmptyCombo(quantity.name.clone()));
    }
    let invalid = |reason: String| Error::InvalidLimits {
        quantity: quantity.name.clone(),
        reason,
    };
    let numeric = |limit: &Option<Value>, which: &str| {
        limit
            .as_ref()
            .map(|v| {
                v.as_f64()
                    .ok_or_else(|| invalid(format!("{which} limit '{v}' is not numeric")))
            })
            .transpose()
    };
    let low = numeric(&quantity.low, "low")?;
    let high = numeric(&quantity.high, "high")?;
    match (low, high) {
        (Some(low), Some(high)) if low > high => Err(invalid(format!(
            "low limit {low} exceeds high limit {high}"
        ))),
        _ => Ok(()),
    }
}

fn validate_visibility(
    quantity: &Quantity,
    target: &Quantity,
    visibility: &Visibility,
) -> Result<()> {
    for value in &visibility.values {
        let accepted = match target.datatype {
            DataType::Combo => {
                let rendered = value.to_string();
                target.combo_options.iter().any(|o| *o == rendered)
            }
            DataType::Boolean => matches!(value, Value::Bool(_)),
            DataType::Double | DataType::String | DataType::Vector => true,
        };
        if !accepted {
            return Err(Error::InvalidVisibilityValue {
                quantity: quantity.name.clone(),
                target: target.name.clone(),
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

/// Chained setters for a single quantity.
#[must_use = "the quantity is only added to the descriptor by calling `add`"]
pub struct QuantityBuilder<'a> {
    descriptor: &'a mut DescriptorBuilder,
    inner: Quantity,
}

impl QuantityBuilder<'_> {
    pub fn combo_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.combo_options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn limits(mut self, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        self.inner.low = Some(low.into());
        self.inner.high = Some(high.into());
        self
    }

    pub fn low(mut self, low: impl Into<Value>) -> Self {
        self.inner.low = Some(low.into());
        self
    }

    pub fn high(mut self, high: impl Into<Value>) -> Self {
        self.inner.high = Some(high.into());
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.inner.default = Some(value.into());
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.inner.unit = Some(unit.into());
        self
    }

    pub fn tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.inner.tooltip = Some(tooltip.into());
        self
    }

    /// Show this quantity only while `quantity` holds one of `values`.
    pub fn visibility<I, V>(mut self, quantity: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.inner.visibility = Some(Visibility {
            quantity: quantity.into(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn set_cmd<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.set_cmd = commands.into_iter().map(Into::into).collect();
        self
    }

    pub fn get_cmd(mut self, command: impl Into<String>) -> Self {
        self.inner.get_cmd = Some(command.into());
        self
    }

    pub fn permission(mut self, permission: Permission) -> Self {
        self.inner.permission = Some(permission);
        self
    }

    pub fn show_in_measurement(mut self, show: bool) -> Self {
        self.inner.show_in_measurement = show;
        self
    }

    /// Append a raw `key: value` line after the standard keys.
    pub fn add_line(mut self, line: impl Into<String>) -> Self {
        self.inner.extra_lines.push(line.into());
        self
    }

    pub fn add(self) {
        self.descriptor.push(self.inner);
    }
}
