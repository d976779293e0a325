// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Result file of a measurement.
//!
//! One JSON document holding the sweep parameters, the result array and a
//! snapshot of the configuration that produced it.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::config::RamseyConfig;
use crate::result::ResultArray;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultData {
    pub shape: [usize; 5],
    pub data: Vec<f64>,
}

/// What produced the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub program: String,
    pub version: String,
    /// Effective configuration, including defaults and overrides.
    pub config: String,
    pub config_sha1: String,
}

impl Provenance {
    pub fn new(config: &RamseyConfig) -> Result<Self> {
        let config = config.to_json_string()?;
        let mut hasher = Sha1::new();
        hasher.update(config.as_bytes());
        let hash = hasher.finalize();
        Ok(Self {
            program: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            config_sha1: format!("{hash:x}"),
            config,
        })
    }

    /// Parse the configuration snapshot back.
    pub fn config(&self) -> Result<RamseyConfig> {
        RamseyConfig::from_json_str(&self.config)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RamseyArchive {
    pub num_averages: u32,
    pub control_freq: f64,
    pub readout_freq: f64,
    pub readout_length: f64,
    pub readout_amp: f64,
    pub control_amp: f64,
    pub sample_length: f64,
    pub control_length: f64,
    pub control_shape: String,
    pub wait_decay: f64,
    pub nr_delays: usize,
    pub dt_delays: f64,
    pub readout_sample_delay: f64,
    pub brick_freq: f64,
    pub brick_pwr: f64,
    pub gen_freq: f64,
    pub detuning_array: Vec<f64>,
    pub gen_pwr: f64,
    pub result: ResultData,
    pub provenance: Provenance,
}

impl RamseyArchive {
    pub fn new(config: &RamseyConfig, result: ResultArray) -> Result<Self> {
        let detuning_array = config.sweep.detunings();
        let shape = result.shape();
        if shape[0] != detuning_array.len() || shape[1] != config.sequence.nr_delays {
            return Err(Error::ShapeMismatch {
                expected: vec![detuning_array.len(), config.sequence.nr_delays],
                found: shape[..2].to_vec(),
            });
        }
        Ok(Self {
            num_averages: config.sequence.num_averages,
            control_freq: config.control.frequency,
            readout_freq: config.readout.frequency,
            readout_length: config.readout.length,
            readout_amp: config.readout.amplitude,
            control_amp: config.control.amplitude,
            sample_length: config.sample.length,
            control_length: config.control.length,
            control_shape: config.control.shape.to_string(),
            wait_decay: config.sequence.wait_decay,
            nr_delays: config.sequence.nr_delays,
            dt_delays: config.sequence.dt_delays,
            readout_sample_delay: config.sequence.readout_sample_delay,
            brick_freq: config.readout.lo_frequency,
            brick_pwr: config.readout.lo_power,
            gen_freq: config.control.source_frequency,
            detuning_array,
            gen_pwr: config.control.source_power,
            result: ResultData {
                shape,
                data: result.into_data(),
            },
            provenance: Provenance::new(config)?,
        })
    }

    pub fn result(&self) -> Result<ResultArray> {
        ResultArray::from_parts(self.result.shape, self.result.data.clone())
    }

    /// Stream the archive to `path` without building the document in memory.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let io_error = |source| Error::Io {
            path: path.to_path_buf(),
            source,
        };
        let mut writer = BufWriter::new(File::create(path).map_err(io_error)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush().map_err(io_error)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

/// `ramsey_lo_<unix seconds>.json` in `dir`.
pub fn default_save_path(dir: impl AsRef<Path>) -> PathBuf {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    dir.as_ref().join(format!("ramsey_lo_{secs}.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> RamseyConfig {
        let mut config = RamseyConfig::default();
        config.sequence.nr_delays = 3;
        config.sweep.nr_freqs = 2;
        config
    }

    #[test]
    fn test_fields() {
        let config = small_config();
        let archive = RamseyArchive::new(&config, ResultArray::new(2, 3, 4)).unwrap();
        assert_eq!(archive.control_shape, "square");
        assert_eq!(archive.brick_freq, 5_629_496_000.0);
        assert_eq!(archive.gen_pwr, 19.0);
        assert_eq!(archive.detuning_array, vec![-250e3, 250e3]);
        assert_eq!(archive.result.shape, [2, 3, 2, 2, 4]);
        assert_eq!(archive.provenance.program, "ramsey");
        assert_eq!(archive.provenance.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(archive.provenance.config().unwrap(), config);
        assert_eq!(archive.provenance.config_sha1.len(), 40);
    }

    #[test]
    fn test_digest_follows_config() {
        let config = small_config();
        let a = Provenance::new(&config).unwrap();
        assert_eq!(a, Provenance::new(&config).unwrap());
        let mut other = config.clone();
        other.sequence.num_averages = 1;
        assert_ne!(a.config_sha1, Provenance::new(&other).unwrap().config_sha1);
    }

    #[test]
    fn test_rejects_foreign_result() {
        let config = small_config();
        assert!(matches!(
            RamseyArchive::new(&config, ResultArray::new(3, 3, 4)),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_save_streams_to_file() {
        let config = small_config();
        let mut result = ResultArray::new(2, 3, 4);
        let mut acquisition_data = vec![0.0; 3 * 2 * 2 * 4];
        acquisition_data[5] = 1.0 / 3.0;
        let acquisition = crate::hardware::Acquisition {
            time_axis: vec![0.0; 4],
            data: acquisition_data,
            num_windows: 6,
            num_ports: 2,
            samples_per_window: 4,
        };
        result.store_sweep_step(1, &acquisition).unwrap();
        let archive = RamseyArchive::new(&config, result).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archive.json");
        archive.save(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\"num_averages\":4000,"));
        assert_eq!(RamseyArchive::load(&path).unwrap(), archive);

        let missing = dir.path().join("missing").join("archive.json");
        assert!(matches!(archive.save(&missing), Err(Error::Io { .. })));
    }

    #[test]
    fn test_default_save_path() {
        let path = default_save_path("/data");
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("ramsey_lo_"));
        assert!(name.ends_with(".json"));
        assert_eq!(path.parent(), Some(Path::new("/data")));
    }
}
