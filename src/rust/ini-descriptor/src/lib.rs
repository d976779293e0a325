// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Model and writer for INI-style instrument driver descriptors.
//!
//! A descriptor is a flat, ordered list of quantity definitions grouped into
//! sections and groups, preceded by a `[General settings]` block. Quantities
//! are collected with a [`DescriptorBuilder`], validated once in
//! [`DescriptorBuilder::build`] and then rendered from the immutable
//! [`Descriptor`].

mod builder;
mod descriptor;
mod quantity;
mod value;

use std::path::PathBuf;

pub use builder::{DescriptorBuilder, QuantityBuilder};
pub use descriptor::{Descriptor, DriverInfo, Entry};
pub use quantity::{Quantity, Visibility};
pub use value::{DataType, Permission, Value};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Quantity '{0}' is defined more than once")]
    DuplicateQuantity(String),
    #[error("Visibility of '{quantity}' refers to '{target}', which is not defined before it")]
    UnknownVisibilityTarget { quantity: String, target: String },
    #[error(
        "Visibility of '{quantity}' requires '{target}' to be '{value}', which '{target}' can never take"
    )]
    InvalidVisibilityValue {
        quantity: String,
        target: String,
        value: String,
    },
    #[error("Combo quantity '{0}' has no options")]
    EmptyCombo(String),
    #[error("Quantity '{quantity}' has invalid limits: {reason}")]
    InvalidLimits { quantity: String, reason: String },
    #[error("Failed to write descriptor to '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
