// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! The descriptor sections of the pulse sequencer.
//!
//! Each function appends one section to a [`DescriptorBuilder`]. Sections
//! refer to quantities of earlier sections in their visibility rules, so they
//! must be added in the order used by [`crate::build_descriptor`].
//!
//! [`DescriptorBuilder`]: ini_descriptor::DescriptorBuilder

mod general;
mod port;
mod preview;
mod sampling;
mod templates;

pub use general::{SECTION_GENERAL, section_general};
pub use port::{port_section_name, section_port_sequence};
pub use preview::{SECTION_PREVIEW, section_preview};
pub use sampling::{SECTION_SAMPLING, section_sample};
pub use templates::{SECTION_TEMPLATES, TEMPLATE_COUNT, section_templates};
