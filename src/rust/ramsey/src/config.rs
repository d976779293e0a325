// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Experiment configuration.
//!
//! Every field has a default, so a configuration file only needs to list what
//! differs from the standard measurement. Unknown keys are rejected to catch
//! typos before any instrument is touched.

use std::f64::consts::FRAC_PI_2;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::envelope::EnvelopeShape;
use crate::hardware::Port;
use crate::{Error, Result};

/// Highest output/input port number of the pulse controller.
pub const MAX_PORT: Port = 8;

/// Longest acquisition window the pulse controller can store (s).
pub const MAX_STORE_DURATION: f64 = 4096e-9;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RamseyConfig {
    pub readout: ReadoutConfig,
    pub control: ControlConfig,
    pub sample: SampleConfig,
    pub sequence: SequenceConfig,
    pub sweep: SweepConfig,
    pub instruments: InstrumentsConfig,
}

/// Cavity drive used for readout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReadoutConfig {
    /// Local oscillator frequency (Hz).
    pub lo_frequency: f64,
    /// Local oscillator power (dBm).
    pub lo_power: f64,
    /// Intermediate frequency (Hz).
    pub frequency: f64,
    /// Amplitude as a fraction of full scale.
    pub amplitude: f64,
    pub phase_i: f64,
    /// High sideband.
    pub phase_q: f64,
    pub port_i: Port,
    pub port_q: Port,
    /// Readout pulse length (s).
    pub length: f64,
}

impl Default for ReadoutConfig {
    fn default() -> Self {
        Self {
            lo_frequency: 5_629_496_000.0,
            lo_power: 7.5,
            frequency: 400e6,
            amplitude: 4.0 * 0.03125,
            phase_i: 0.0,
            phase_q: FRAC_PI_2,
            port_i: 1,
            port_q: 2,
            length: 900e-9,
        }
    }
}

/// Qubit drive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControlConfig {
    /// Source frequency before detuning (Hz).
    pub source_frequency: f64,
    /// Source power (dBm).
    pub source_power: f64,
    /// Intermediate frequency (Hz); the detuning is applied on top of the source.
    pub frequency: f64,
    pub phase_i: f64,
    /// Low sideband.
    pub phase_q: f64,
    pub port_i: Port,
    pub port_q: Port,
    pub shape: EnvelopeShape,
    /// Length of the π/2 pulse (s).
    pub length: f64,
    /// Amplitude of the π/2 pulse as a fraction of full scale.
    pub amplitude: f64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            source_frequency: 4_049_390_300.0,
            source_power: 19.0,
            frequency: 300e6,
            phase_i: 0.0,
            phase_q: -FRAC_PI_2,
            port_i: 3,
            port_q: 4,
            shape: EnvelopeShape::Square,
            length: 60e-9,
            amplitude: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SampleConfig {
    pub port_i: Port,
    pub port_q: Port,
    /// Length of the acquisition window (s).
    pub length: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            port_i: 1,
            port_q: 2,
            length: 1024e-9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SequenceConfig {
    pub num_averages: u32,
    /// Number of delays between the two control pulses.
    pub nr_delays: usize,
    /// Delay increment (s).
    pub dt_delays: f64,
    /// Wait between repetitions (s).
    pub wait_decay: f64,
    /// Delay between the start of the readout pulse and the sample window (s).
    pub readout_sample_delay: f64,
    /// Time of the first control pulse (s).
    pub start_time: f64,
    /// Pause after changing the source frequency (s).
    pub settle_time: f64,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            num_averages: 4_000,
            nr_delays: 128,
            dt_delays: 0.2e-6,
            wait_decay: 500e-6,
            readout_sample_delay: 200e-9,
            start_time: 2e-6,
            settle_time: 1.0,
        }
    }
}

/// Detuning sweep of the control source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepConfig {
    pub detuning_start: f64,
    pub detuning_stop: f64,
    pub nr_freqs: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            detuning_start: -250e3,
            detuning_stop: 250e3,
            nr_freqs: 128,
        }
    }
}

impl SweepConfig {
    /// Evenly spaced detunings, both end points included.
    pub fn detunings(&self) -> Vec<f64> {
        linspace(self.detuning_start, self.detuning_stop, self.nr_freqs)
    }
}

pub(crate) fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            (0..num)
                .map(|i| if i == num - 1 { stop } else { start + step * i as f64 })
                .collect()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstrumentsConfig {
    pub lo: LoModel,
    pub source: SourceModel,
}

/// Local oscillator of the readout chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", deny_unknown_fields)]
pub enum LoModel {
    #[serde(rename = "vaunix_lab_brick")]
    VaunixLabBrick { serial: String },
}

impl Default for LoModel {
    fn default() -> Self {
        LoModel::VaunixLabBrick {
            serial: "0".to_string(),
        }
    }
}

impl LoModel {
    pub fn name(&self) -> &'static str {
        match self {
            LoModel::VaunixLabBrick { .. } => "Vaunix Lab Brick",
        }
    }
}

/// Microwave source of the qubit drive.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "model", deny_unknown_fields)]
pub enum SourceModel {
    #[default]
    #[serde(rename = "keysight_n5173b")]
    KeysightN5173B,
    #[serde(rename = "agilent_e8247c")]
    AgilentE8247C { address: String },
}

impl SourceModel {
    pub fn name(&self) -> &'static str {
        match self {
            SourceModel::KeysightN5173B => "Keysight N5173B",
            SourceModel::AgilentE8247C { .. } => "Agilent E8247C",
        }
    }

    /// Value sent to the instrument for a frequency given in Hz.
    ///
    /// The Agilent driver takes GHz.
    pub fn frequency_command(&self, frequency: f64) -> f64 {
        match self {
            SourceModel::KeysightN5173B => frequency,
            SourceModel::AgilentE8247C { .. } => frequency / 1e9,
        }
    }
}

impl RamseyConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: RamseyConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Number of samples in one acquisition window.
    pub fn samples_per_window(&self, sampling_freq: f64) -> usize {
        (self.sample.length * sampling_freq).round() as usize
    }

    pub fn validate(&self) -> Result<()> {
        let ports = [
            ("readout.port_i", self.readout.port_i),
            ("readout.port_q", self.readout.port_q),
            ("control.port_i", self.control.port_i),
            ("control.port_q", self.control.port_q),
            ("sample.port_i", self.sample.port_i),
            ("sample.port_q", self.sample.port_q),
        ];
        for (field, port) in ports {
            if !(1..=MAX_PORT).contains(&port) {
                return invalid(format!("{field} must be in 1..={MAX_PORT}, got {port}"));
            }
        }
        for (what, i, q) in [
            ("readout", self.readout.port_i, self.readout.port_q),
            ("control", self.control.port_i, self.control.port_q),
            ("sample", self.sample.port_i, self.sample.port_q),
        ] {
            if i == q {
                return invalid(format!("{what} I and Q must use different ports, both are {i}"));
            }
        }
        let readout_ports = [self.readout.port_i, self.readout.port_q];
        if readout_ports.contains(&self.control.port_i)
            || readout_ports.contains(&self.control.port_q)
        {
            return invalid("control and readout must not share output ports".to_string());
        }

        for (field, value) in [
            ("readout.lo_frequency", self.readout.lo_frequency),
            ("control.source_frequency", self.control.source_frequency),
            ("readout.length", self.readout.length),
            ("control.length", self.control.length),
            ("sample.length", self.sample.length),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return invalid(format!("{field} must be positive, got {value}"));
            }
        }
        if self.sample.length > MAX_STORE_DURATION {
            return invalid(format!(
                "sample.length must not exceed {MAX_STORE_DURATION} s, got {}",
                self.sample.length
            ));
        }
        for (field, value) in [
            ("readout.frequency", self.readout.frequency),
            ("control.frequency", self.control.frequency),
            ("sequence.dt_delays", self.sequence.dt_delays),
            ("sequence.wait_decay", self.sequence.wait_decay),
            ("sequence.readout_sample_delay", self.sequence.readout_sample_delay),
            ("sequence.start_time", self.sequence.start_time),
            ("sequence.settle_time", self.sequence.settle_time),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return invalid(format!("{field} must not be negative, got {value}"));
            }
        }
        for (field, value) in [
            ("readout.amplitude", self.readout.amplitude),
            ("control.amplitude", self.control.amplitude),
        ] {
            if !(value.is_finite() && (0.0..=1.0).contains(&value)) {
                return invalid(format!("{field} must be within full scale [0, 1], got {value}"));
            }
        }
        if self.sequence.num_averages == 0 {
            return invalid("sequence.num_averages must be at least 1".to_string());
        }
        if self.sequence.nr_delays == 0 {
            return invalid("sequence.nr_delays must be at least 1".to_string());
        }
        if self.sweep.nr_freqs == 0 {
            return invalid("sweep.nr_freqs must be at least 1".to_string());
        }
        if !(self.sweep.detuning_start.is_finite() && self.sweep.detuning_stop.is_finite()) {
            return invalid("sweep bounds must be finite".to_string());
        }
        Ok(())
    }
}

fn invalid(message: String) -> Result<()> {
    Err(Error::InvalidConfig(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = RamseyConfig::default();
        config.validate().unwrap();
        assert_eq!(config.readout.amplitude, 0.125);
        assert_eq!(config.samples_per_window(4e9), 4096);
    }

    #[test]
    fn test_empty_json_gives_defaults() {
        assert_eq!(
            RamseyConfig::from_json_str("{}").unwrap(),
            RamseyConfig::default()
        );
    }

    #[test]
    fn test_partial_json() {
        let config = RamseyConfig::from_json_str(
            r#"{
                "control": {"shape": "sin2", "length": 300e-9, "amplitude": 0.2},
                "sweep": {"nr_freqs": 3},
                "instruments": {"source": {"model": "agilent_e8247c", "address": "192.168.18.104"}}
            }"#,
        )
        .unwrap();
        assert_eq!(config.control.shape, EnvelopeShape::Sin2);
        assert_eq!(config.control.length, 300e-9);
        assert_eq!(config.control.port_i, 3);
        assert_eq!(config.sweep.detunings(), vec![-250e3, 0.0, 250e3]);
        assert_eq!(
            config.instruments.source,
            SourceModel::AgilentE8247C {
                address: "192.168.18.104".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_shape_is_rejected() {
        let err =
            RamseyConfig::from_json_str(r#"{"control": {"shape": "gaussian"}}"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(RamseyConfig::from_json_str(r#"{"sequence": {"averages": 10}}"#).is_err());
    }

    #[test]
    fn test_round_trip() {
        let config = RamseyConfig::default();
        let text = config.to_json_string().unwrap();
        assert_eq!(RamseyConfig::from_json_str(&text).unwrap(), config);
    }

    #[test]
    fn test_validate() {
        let mut config = RamseyConfig::default();
        config.control.port_i = 9;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));

        let mut config = RamseyConfig::default();
        config.sample.port_q = config.sample.port_i;
        assert!(config.validate().is_err());

        let mut config = RamseyConfig::default();
        config.control.port_q = config.readout.port_i;
        assert!(config.validate().is_err());

        let mut config = RamseyConfig::default();
        config.control.length = 0.0;
        assert!(config.validate().is_err());

        let mut config = RamseyConfig::default();
        config.readout.amplitude = 1.5;
        assert!(config.validate().is_err());

        let mut config = RamseyConfig::default();
        config.sequence.nr_delays = 0;
        assert!(config.validate().is_err());

        let mut config = RamseyConfig::default();
        config.sequence.wait_decay = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sample_length_is_bounded() {
        let mut config = RamseyConfig::default();
        config.sample.length = MAX_STORE_DURATION;
        config.validate().unwrap();
        assert_eq!(config.samples_per_window(4e9), 16384);

        config.sample.length = 1.0;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        let err = RamseyConfig::from_json_str(r#"{"sample": {"length": 8192e-9}}"#).unwrap_err();
        assert!(err.to_string().contains("sample.length"));
    }

    #[test]
    fn test_linspace() {
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(2.0, 5.0, 1), vec![2.0]);
        assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        let sweep = SweepConfig::default().detunings();
        assert_eq!(sweep.len(), 128);
        assert_eq!(sweep[0], -250e3);
        assert_eq!(sweep[127], 250e3);
    }

    #[test]
    fn test_frequency_command() {
        assert_eq!(SourceModel::KeysightN5173B.frequency_command(4e9), 4e9);
        let agilent = SourceModel::AgilentE8247C {
            address: String::new(),
        };
        assert_eq!(agilent.frequency_command(4e9), 4.0);
    }
}
