// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Interfaces of the instruments driven by the experiment.
//!
//! Frequencies are in Hz, times in seconds and powers in dBm on every method.
//! Implementations convert to whatever unit their instrument expects.

use crate::Result;

/// Output or input port of the pulse controller, starting at 1.
pub type Port = u8;

/// Opaque reference to a pulse registered in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PulseHandle(pub u32);

/// Continuous-wave microwave source.
pub trait FrequencySource {
    fn name(&self) -> &str;
    fn set_frequency(&mut self, frequency: f64) -> Result<()>;
    fn set_power(&mut self, power: f64) -> Result<()>;
    fn set_output(&mut self, enabled: bool) -> Result<()>;
    /// Lock to the external 10 MHz reference.
    fn set_external_reference(&mut self) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}

/// Pulse generation and acquisition board.
///
/// All programming happens inside a session. A session is released when it
/// goes out of scope, also when programming fails half way.
pub trait PulseController {
    type Session<'a>: PulseSession
    where
        Self: 'a;

    /// Sampling rate of outputs and inputs (Hz).
    fn sampling_freq(&self) -> f64;

    fn open_session(&mut self) -> Result<Self::Session<'_>>;
}

pub trait PulseSession {
    fn sampling_freq(&self) -> f64;

    /// Program the carrier lookup table of `port`.
    fn setup_freq_lut(
        &mut self,
        port: Port,
        frequency: f64,
        phase: f64,
        repeat_count: u32,
    ) -> Result<()>;

    /// Program the amplitude scale lookup table of `port`.
    fn setup_scale_lut(&mut self, port: Port, amplitude: f64, repeat_count: u32) -> Result<()>;

    /// Register a flat pulse of `length` seconds.
    fn setup_continuous_drive(&mut self, port: Port, length: f64) -> Result<PulseHandle>;

    /// Register a sampled waveform. With `envelope` set, the waveform
    /// modulates the carrier of the port instead of being played directly.
    fn setup_template(&mut self, port: Port, samples: &[f64], envelope: bool)
    -> Result<PulseHandle>;

    fn set_store_duration(&mut self, duration: f64) -> Result<()>;
    fn set_store_ports(&mut self, ports: &[Port]) -> Result<()>;

    /// Play `pulses` simultaneously at absolute `time`.
    fn output_pulse(&mut self, time: f64, pulses: &[PulseHandle]) -> Result<()>;

    /// Open a sample window at absolute `time`.
    fn store(&mut self, time: f64) -> Result<()>;

    /// Run the programmed sequence with period `total_time` and return the
    /// averaged sample windows.
    fn perform_measurement(
        &mut self,
        total_time: f64,
        repeat_count: u32,
        num_averages: u32,
    ) -> Result<Acquisition>;
}

/// Averaged traces of all sample windows.
///
/// `data` is laid out as [window, port, sample], ports in the order given to
/// [`PulseSession::set_store_ports`].
#[derive(Debug, Clone, PartialEq)]
pub struct Acquisition {
    pub time_axis: Vec<f64>,
    pub data: Vec<f64>,
    pub num_windows: usize,
    pub num_ports: usize,
    pub samples_per_window: usize,
}

impl Acquisition {
    pub fn shape(&self) -> [usize; 3] {
        [self.num_windows, self.num_ports, self.samples_per_window]
    }
}
