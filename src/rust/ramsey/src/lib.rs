// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Ramsey fringe measurement with a two-pulse control sequence.
//!
//! The experiment sweeps the qubit drive frequency. For every sweep step a
//! pulse sequence with a growing delay between two π/2 pulses is played,
//! read out and averaged on the pulse controller. Pulse timing is computed by
//! [`schedule`] without touching any instrument, instruments are reached
//! through the traits in [`hardware`].

pub mod archive;
pub mod config;
pub mod envelope;
pub mod hardware;
pub mod result;
pub mod runner;
pub mod schedule;
pub mod simulated;

use std::path::PathBuf;

pub use archive::RamseyArchive;
pub use config::RamseyConfig;
pub use result::ResultArray;
pub use runner::{format_sec, run};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Result shape mismatch: expected {expected:?}, got {found:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        found: Vec<usize>,
    },
    #[error("Sweep index {index} is out of range for {len} sweep steps")]
    SweepIndexOutOfRange { index: usize, len: usize },
    #[error("Instrument '{instrument}' failed: {message}")]
    Instrument { instrument: String, message: String },
    #[error("I/O error on '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn instrument(instrument: &str, message: impl Into<String>) -> Self {
        Error::Instrument {
            instrument: instrument.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let error = Error::instrument("SG24000", "connection is closed");
        assert_eq!(
            error.to_string(),
            "Instrument 'SG24000' failed: connection is closed"
        );
        let error: Error = serde_json::from_str::<f64>("[").unwrap_err().into();
        assert!(matches!(error, Error::Json(_)));
    }
}
