// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Write;
use std::path::Path;

use indexmap::IndexMap;

use crate::quantity::Quantity;
use crate::{Error, Result};

const BANNER_WIDTH: usize = 60;

/// Contents of the `[General settings]` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverInfo {
    pub name: String,
    pub version: String,
    pub driver_path: String,
    pub author: Option<String>,
    pub interface: Option<String>,
}

impl DriverInfo {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        driver_path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            driver_path: driver_path.into(),
            author: None,
            interface: None,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interface = Some(interface.into());
        self
    }

    fn render(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "[General settings]")?;
        writeln!(out, "name: {}", self.name)?;
        writeln!(out, "version: {}", self.version)?;
        writeln!(out, "driver_path: {}", self.driver_path)?;
        if let Some(author) = &self.author {
            writeln!(out, "author: {author}")?;
        }
        if let Some(interface) = &self.interface {
            writeln!(out, "interface: {interface}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    BigComment(String),
    SmallComment(String),
    Quantity(Quantity),
}

impl Entry {
    pub fn as_quantity(&self) -> Option<&Quantity> {
        match self {
            Entry::Quantity(q) => Some(q),
            Entry::BigComment(_) | Entry::SmallComment(_) => None,
        }
    }
}

/// A validated, immutable descriptor.
#[derive(Debug, Clone)]
pub struct Descriptor {
    info: DriverInfo,
    entries: Vec<Entry>,
    index: IndexMap<String, usize>,
}

impl Descriptor {
    pub(crate) fn new(
        info: DriverInfo,
        entries: Vec<Entry>,
        index: IndexMap<String, usize>,
    ) -> Self {
        Self {
            info,
            entries,
            index,
        }
    }

    pub fn info(&self) -> &DriverInfo {
        &self.info
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Quantities in insertion order.
    pub fn quantities(&self) -> impl Iterator<Item = &Quantity> {
        self.entries.iter().filter_map(Entry::as_quantity)
    }

    pub fn get(&self, name: &str) -> Option<&Quantity> {
        self.index
            .get(name)
            .and_then(|&i| self.entries[i].as_quantity())
    }

    /// Number of quantities.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn section<'a>(&'a self, section: &'a str) -> impl Iterator<Item = &'a Quantity> {
        self.quantities().filter(move |q| q.section == section)
    }

    /// Section names in order of first appearance.
    pub fn sections(&self) -> Vec<&str> {
        let mut sections: Vec<&str> = Vec::new();
        for quantity in self.quantities() {
            if !sections.contains(&quantity.section.as_str()) {
                sections.push(&quantity.section);
            }
        }
        sections
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing into a `String` cannot fail.
        let _ = self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "# Instrument driver configuration file.")?;
        writeln!(out)?;
        self.info.render(out)?;
        for entry in &self.entries {
            writeln!(out)?;
            match entry {
                Entry::BigComment(text) => {
                    let banner = "#".repeat(BANNER_WIDTH);
                    writeln!(out, "{banner}")?;
                    writeln!(out, "# {text}")?;
                    writeln!(out, "{banner}")?;
                }
                Entry::SmallComment(text) => writeln!(out, "# {text}")?,
                Entry::Quantity(quantity) => quantity.render(out),
            }
        }
        Ok(())
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.render()).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
