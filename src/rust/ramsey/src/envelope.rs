// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::f64::consts::PI;
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Envelope of the control pulses.
///
/// Only these shapes can be configured; anything else fails when the
/// configuration is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeShape {
    Square,
    Sin2,
}

impl EnvelopeShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvelopeShape::Square => "square",
            EnvelopeShape::Sin2 => "sin2",
        }
    }

    /// Sample the envelope with `num_samples` points.
    pub fn samples(&self, num_samples: usize) -> Vec<f64> {
        match self {
            EnvelopeShape::Square => vec![1.0; num_samples],
            EnvelopeShape::Sin2 => sin2(num_samples),
        }
    }
}

impl Display for EnvelopeShape {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// sin²(πx) over `x` in [0, 1), end point excluded.
pub fn sin2(num_samples: usize) -> Vec<f64> {
    (0..num_samples)
        .map(|k| {
            let x = k as f64 / num_samples as f64;
            (PI * x).sin().powi(2)
        })
        .collect()
}
