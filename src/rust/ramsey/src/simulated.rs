// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! In-process stand-ins for the lab instruments.
//!
//! The sources record every command they receive. The pulse controller checks
//! that a session is programmed consistently and answers with a noiseless
//! Ramsey fringe computed from the pulses it was given.

use std::cell::Cell;
use std::collections::HashMap;
use std::f64::consts::{FRAC_PI_3, PI};
use std::rc::Rc;

use num_complex::Complex64;

use crate::config::{LoModel, MAX_PORT, RamseyConfig, SourceModel};
use crate::hardware::{
    Acquisition, FrequencySource, Port, PulseController, PulseHandle, PulseSession,
};
use crate::{Error, Result};

/// Dephasing time used by [`SimulatedLab::from_config`] (s).
pub const DEFAULT_T2: f64 = 20e-6;

const SAMPLING_FREQ: f64 = 4e9;

#[derive(Debug, Clone, PartialEq)]
pub enum SourceCall {
    /// Value as sent to the instrument, in the unit of its driver.
    SetFrequency(f64),
    SetPower(f64),
    SetOutput(bool),
    ExternalReference,
    Close,
}

#[derive(Debug)]
pub struct SimulatedSource {
    name: String,
    model: Option<SourceModel>,
    calls: Vec<SourceCall>,
    frequency: Rc<Cell<f64>>,
    closed: bool,
}

impl SimulatedSource {
    /// A source commanded in Hz.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: None,
            calls: vec![],
            frequency: Rc::new(Cell::new(0.0)),
            closed: false,
        }
    }

    pub fn from_lo_model(model: &LoModel) -> Self {
        Self::new(model.name())
    }

    pub fn from_source_model(model: &SourceModel) -> Self {
        Self {
            model: Some(model.clone()),
            ..Self::new(model.name())
        }
    }

    pub fn calls(&self) -> &[SourceCall] {
        &self.calls
    }

    /// Last frequency set, in Hz.
    pub fn frequency(&self) -> f64 {
        self.frequency.get()
    }

    /// Shared view of the output frequency (Hz).
    pub fn shared_frequency(&self) -> Rc<Cell<f64>> {
        Rc::clone(&self.frequency)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn record(&mut self, call: SourceCall) -> Result<()> {
        if self.closed {
            return Err(Error::instrument(&self.name, "connection is closed"));
        }
        self.calls.push(call);
        Ok(())
    }
}

impl FrequencySource for SimulatedSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_frequency(&mut self, frequency: f64) -> Result<()> {
        if !(frequency.is_finite() && frequency > 0.0) {
            return Err(Error::instrument(
                &self.name,
                format!("invalid frequency {frequency} Hz"),
            ));
        }
        let command = match &self.model {
            Some(model) => model.frequency_command(frequency),
            None => frequency,
        };
        self.record(SourceCall::SetFrequency(command))?;
        self.frequency.set(frequency);
        Ok(())
    }

    fn set_power(&mut self, power: f64) -> Result<()> {
        self.record(SourceCall::SetPower(power))
    }

    fn set_output(&mut self, enabled: bool) -> Result<()> {
        self.record(SourceCall::SetOutput(enabled))
    }

    fn set_external_reference(&mut self) -> Result<()> {
        self.record(SourceCall::ExternalReference)
    }

    fn close(&mut self) -> Result<()> {
        self.record(SourceCall::Close)?;
        self.closed = true;
        Ok(())
    }
}

/// Qubit seen by the simulated controller.
#[derive(Debug, Clone)]
pub struct QubitModel {
    /// Transition frequency (Hz).
    pub frequency: f64,
    /// Intermediate frequency added to the source to form the drive (Hz).
    pub drive_if: f64,
    pub t2: f64,
    /// Output frequency of the control source (Hz).
    pub source: Rc<Cell<f64>>,
}

impl QubitModel {
    fn detuning(&self) -> f64 {
        self.source.get() + self.drive_if - self.frequency
    }

    /// Excited state population after two π/2 pulses `tau` apart.
    ///
    /// `sign` is the product of the signs of both pulses.
    pub fn excited_population(&self, tau: f64, sign: f64) -> f64 {
        let phase = 2.0 * PI * self.detuning() * tau;
        0.5 * (1.0 + sign * phase.cos() * (-tau / self.t2).exp())
    }
}

/// Programming steps seen by the controller, across all sessions.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCall {
    Open,
    FreqLut {
        port: Port,
        frequency: f64,
        phase: f64,
    },
    ScaleLut {
        port: Port,
        amplitude: f64,
    },
    ContinuousDrive {
        port: Port,
        length: f64,
    },
    Template {
        port: Port,
        samples: Vec<f64>,
        envelope: bool,
    },
    StoreDuration(f64),
    StorePorts(Vec<Port>),
    Output {
        time: f64,
        pulses: Vec<PulseHandle>,
    },
    Store(f64),
    Measure {
        total_time: f64,
        repeat_count: u32,
        num_averages: u32,
    },
    Close,
}

#[derive(Debug)]
pub struct SimulatedController {
    sampling_freq: f64,
    qubit: Option<QubitModel>,
    fail_on_session: Option<usize>,
    sessions_opened: usize,
    sessions_closed: usize,
    calls: Vec<SessionCall>,
}

impl Default for SimulatedController {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedController {
    pub fn new() -> Self {
        Self {
            sampling_freq: SAMPLING_FREQ,
            qubit: None,
            fail_on_session: None,
            sessions_opened: 0,
            sessions_closed: 0,
            calls: vec![],
        }
    }

    /// Without a qubit every window reads the ground state.
    pub fn with_qubit(mut self, qubit: QubitModel) -> Self {
        self.qubit = Some(qubit);
        self
    }

    /// Make the measurement of the `session`-th session (counting from 1) fail.
    pub fn fail_on_session(mut self, session: usize) -> Self {
        self.fail_on_session = Some(session);
        self
    }

    pub fn sessions_opened(&self) -> usize {
        self.sessions_opened
    }

    pub fn sessions_closed(&self) -> usize {
        self.sessions_closed
    }

    pub fn calls(&self) -> &[SessionCall] {
        &self.calls
    }
}

impl PulseController for SimulatedController {
    type Session<'a> = SimulatedSession<'a>;

    fn sampling_freq(&self) -> f64 {
        self.sampling_freq
    }

    fn open_session(&mut self) -> Result<SimulatedSession<'_>> {
        self.sessions_opened += 1;
        self.calls.push(SessionCall::Open);
        Ok(SimulatedSession {
            number: self.sessions_opened,
            controller: self,
            freq_luts: HashMap::new(),
            scale_luts: HashMap::new(),
            pulses: vec![],
            store_duration: None,
            store_ports: vec![],
            outputs: vec![],
            stores: vec![],
        })
    }
}

#[derive(Debug, Clone)]
enum Pulse {
    Drive { port: Port, length: f64 },
    Template { sign: f64, length: f64 },
}

/// Open connection to the simulated controller; closed on drop.
#[derive(Debug)]
pub struct SimulatedSession<'a> {
    controller: &'a mut SimulatedController,
    number: usize,
    freq_luts: HashMap<Port, f64>,
    scale_luts: HashMap<Port, f64>,
    pulses: Vec<Pulse>,
    store_duration: Option<f64>,
    store_ports: Vec<Port>,
    outputs: Vec<(f64, Vec<PulseHandle>)>,
    stores: Vec<f64>,
}

impl Drop for SimulatedSession<'_> {
    fn drop(&mut self) {
        self.controller.sessions_closed += 1;
        self.controller.calls.push(SessionCall::Close);
    }
}

fn check_port(port: Port) -> Result<()> {
    if (1..=MAX_PORT).contains(&port) {
        Ok(())
    } else {
        Err(Error::instrument(
            "pulse controller",
            format!("port {port} does not exist"),
        ))
    }
}

fn controller_error(message: impl Into<String>) -> Error {
    Error::instrument("pulse controller", message)
}

impl SimulatedSession<'_> {
    fn register(&mut self, pulse: Pulse) -> PulseHandle {
        self.pulses.push(pulse);
        PulseHandle(self.pulses.len() as u32 - 1)
    }

    fn pulse(&self, handle: PulseHandle) -> Result<&Pulse> {
        self.pulses
            .get(handle.0 as usize)
            .ok_or_else(|| controller_error(format!("unknown pulse {}", handle.0)))
    }

    /// Excited state population seen by every sample window, in time order.
    fn populations(&self) -> Result<Vec<f64>> {
        #[derive(Clone, Copy)]
        enum Event {
            Control { time: f64, sign: f64, length: f64 },
            Store(f64),
        }
        let mut events = vec![];
        for (time, handles) in &self.outputs {
            let template = handles.iter().find_map(|h| match self.pulse(*h) {
                Ok(Pulse::Template { sign, length }) => Some(Ok((*sign, *length))),
                Ok(Pulse::Drive { .. }) => None,
                Err(e) => Some(Err(e)),
            });
            if let Some(template) = template {
                let (sign, length) = template?;
                events.push(Event::Control {
                    time: *time,
                    sign,
                    length,
                });
            }
        }
        events.extend(self.stores.iter().map(|t| Event::Store(*t)));
        let time = |e: &Event| match e {
            Event::Control { time, .. } | Event::Store(time) => *time,
        };
        events.sort_by(|a, b| time(a).total_cmp(&time(b)));

        let mut controls: Vec<(f64, f64, f64)> = vec![];
        let mut populations = Vec::with_capacity(self.stores.len());
        for event in events {
            match event {
                Event::Control { time, sign, length } => controls.push((time, sign, length)),
                Event::Store(_) => {
                    let population = match (&self.controller.qubit, controls.as_slice()) {
                        (Some(qubit), [.., (t1, s1, l1), (t2, s2, _)]) => {
                            qubit.excited_population(t2 - (t1 + l1), s1 * s2)
                        }
                        _ => 0.0,
                    };
                    populations.push(population);
                    controls.clear();
                }
            }
        }
        Ok(populations)
    }

    /// Readout tone: the carrier and amplitude of the first continuous drive.
    fn readout_tone(&self) -> (f64, f64) {
        self.pulses
            .iter()
            .find_map(|p| match p {
                Pulse::Drive { port, .. } => Some((
                    self.freq_luts.get(port).copied().unwrap_or(0.0),
                    self.scale_luts.get(port).copied().unwrap_or(1.0),
                )),
                Pulse::Template { .. } => None,
            })
            .unwrap_or((0.0, 0.0))
    }
}

impl PulseSession for SimulatedSession<'_> {
    fn sampling_freq(&self) -> f64 {
        self.controller.sampling_freq
    }

    fn setup_freq_lut(
        &mut self,
        port: Port,
        frequency: f64,
        phase: f64,
        _repeat_count: u32,
    ) -> Result<()> {
        check_port(port)?;
        if !(0.0..=self.controller.sampling_freq / 2.0).contains(&frequency) {
            return Err(controller_error(format!(
                "frequency {frequency} Hz is above Nyquist"
            )));
        }
        self.freq_luts.insert(port, frequency);
        self.controller.calls.push(SessionCall::FreqLut {
            port,
            frequency,
            phase,
        });
        Ok(())
    }

    fn setup_scale_lut(&mut self, port: Port, amplitude: f64, _repeat_count: u32) -> Result<()> {
        check_port(port)?;
        if !(-1.0..=1.0).contains(&amplitude) {
            return Err(controller_error(format!(
                "amplitude {amplitude} exceeds full scale"
            )));
        }
        self.scale_luts.insert(port, amplitude);
        self.controller
            .calls
            .push(SessionCall::ScaleLut { port, amplitude });
        Ok(())
    }

    fn setup_continuous_drive(&mut self, port: Port, length: f64) -> Result<PulseHandle> {
        check_port(port)?;
        self.controller
            .calls
            .push(SessionCall::ContinuousDrive { port, length });
        Ok(self.register(Pulse::Drive { port, length }))
    }

    fn setup_template(
        &mut self,
        port: Port,
        samples: &[f64],
        envelope: bool,
    ) -> Result<PulseHandle> {
        check_port(port)?;
        if samples.is_empty() {
            return Err(controller_error(format!("empty template on port {port}")));
        }
        let sign = if samples.iter().sum::<f64>() < 0.0 {
            -1.0
        } else {
            1.0
        };
        let length = samples.len() as f64 / self.controller.sampling_freq;
        self.controller.calls.push(SessionCall::Template {
            port,
            samples: samples.to_vec(),
            envelope,
        });
        Ok(self.register(Pulse::Template { sign, length }))
    }

    fn set_store_duration(&mut self, duration: f64) -> Result<()> {
        if duration.is_nan() || duration <= 0.0 {
            return Err(controller_error("store duration must be positive"));
        }
        self.store_duration = Some(duration);
        self.controller.calls.push(SessionCall::StoreDuration(duration));
        Ok(())
    }

    fn set_store_ports(&mut self, ports: &[Port]) -> Result<()> {
        for port in ports {
            check_port(*port)?;
        }
        self.store_ports = ports.to_vec();
        self.controller
            .calls
            .push(SessionCall::StorePorts(ports.to_vec()));
        Ok(())
    }

    fn output_pulse(&mut self, time: f64, pulses: &[PulseHandle]) -> Result<()> {
        for handle in pulses {
            self.pulse(*handle)?;
        }
        self.outputs.push((time, pulses.to_vec()));
        self.controller.calls.push(SessionCall::Output {
            time,
            pulses: pulses.to_vec(),
        });
        Ok(())
    }

    fn store(&mut self, time: f64) -> Result<()> {
        self.stores.push(time);
        self.controller.calls.push(SessionCall::Store(time));
        Ok(())
    }

    fn perform_measurement(
        &mut self,
        total_time: f64,
        repeat_count: u32,
        num_averages: u32,
    ) -> Result<Acquisition> {
        self.controller.calls.push(SessionCall::Measure {
            total_time,
            repeat_count,
            num_averages,
        });
        if self.controller.fail_on_session == Some(self.number) {
            return Err(controller_error("measurement aborted"));
        }
        let Some(store_duration) = self.store_duration else {
            return Err(controller_error("store duration is not set"));
        };
        if self.store_ports.is_empty() {
            return Err(controller_error("no store ports"));
        }
        if repeat_count == 0 || num_averages == 0 {
            return Err(controller_error("nothing to measure"));
        }
        let last_output = self.outputs.iter().map(|(time, handles)| {
            let longest = handles
                .iter()
                .filter_map(|h| self.pulse(*h).ok())
                .map(|p| match p {
                    Pulse::Drive { length, .. } | Pulse::Template { length, .. } => *length,
                })
                .fold(0.0, f64::max);
            time + longest
        });
        let last_store = self.stores.iter().map(|t| t + store_duration);
        let end = last_output.chain(last_store).fold(0.0, f64::max);
        if total_time < end {
            return Err(controller_error(format!(
                "sequence ends at {end} s, after the period of {total_time} s"
            )));
        }

        let fs = self.controller.sampling_freq;
        let samples_per_window = (store_duration * fs).round() as usize;
        let time_axis: Vec<f64> = (0..samples_per_window).map(|n| n as f64 / fs).collect();
        let (readout_if, amplitude) = self.readout_tone();
        let ground = Complex64::from_polar(amplitude, 0.0);
        let excited = Complex64::from_polar(amplitude, FRAC_PI_3);
        let num_ports = self.store_ports.len();

        let populations = self.populations()?;
        let mut data = Vec::with_capacity(populations.len() * num_ports * samples_per_window);
        for population in &populations {
            let state = ground + (excited - ground) * *population;
            let trace: Vec<Complex64> = time_axis
                .iter()
                .map(|t| state * Complex64::from_polar(1.0, 2.0 * PI * readout_if * t))
                .collect();
            for port_index in 0..num_ports {
                data.extend(trace.iter().map(|z| match port_index {
                    0 => z.re,
                    1 => z.im,
                    _ => 0.0,
                }));
            }
        }
        Ok(Acquisition {
            time_axis,
            data,
            num_windows: populations.len(),
            num_ports,
            samples_per_window,
        })
    }
}

/// The instruments of one experiment setup.
#[derive(Debug)]
pub struct SimulatedLab {
    pub lo: SimulatedSource,
    pub source: SimulatedSource,
    pub controller: SimulatedController,
}

impl SimulatedLab {
    /// Instruments matching `config`, with a qubit resonant at the undetuned
    /// drive frequency.
    pub fn from_config(config: &RamseyConfig) -> Self {
        let lo = SimulatedSource::from_lo_model(&config.instruments.lo);
        let source = SimulatedSource::from_source_model(&config.instruments.source);
        let qubit = QubitModel {
            frequency: config.control.source_frequency + config.control.frequency,
            drive_if: config.control.frequency,
            t2: DEFAULT_T2,
            source: source.shared_frequency(),
        };
        Self {
            lo,
            source,
            controller: SimulatedController::new().with_qubit(qubit),
        }
    }
}
