// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Drive the instruments through the detuning sweep.

use std::thread;
use std::time::Duration;

use crate::config::RamseyConfig;
use crate::hardware::{Acquisition, FrequencySource, PulseController, PulseHandle, PulseSession};
use crate::result::ResultArray;
use crate::schedule::{PulseSet, RamseySchedule, ScheduledEvent, SequenceTiming, sweep_steps};
use crate::{Error, Result};

/// Pulses registered in one session.
struct Pulses {
    readout: [PulseHandle; 2],
    control_plus: [PulseHandle; 2],
    control_minus: [PulseHandle; 2],
}

impl Pulses {
    fn get(&self, set: PulseSet) -> &[PulseHandle] {
        match set {
            PulseSet::ControlPlus => &self.control_plus,
            PulseSet::ControlMinus => &self.control_minus,
            PulseSet::Readout => &self.readout,
        }
    }
}

/// Program carriers, amplitudes, pulses and sampling of a fresh session.
fn setup_session<S: PulseSession>(session: &mut S, config: &RamseyConfig) -> Result<Pulses> {
    let readout = &config.readout;
    let control = &config.control;

    session.setup_freq_lut(readout.port_i, readout.frequency, readout.phase_i, 1)?;
    session.setup_freq_lut(readout.port_q, readout.frequency, readout.phase_q, 1)?;
    session.setup_freq_lut(control.port_i, control.frequency, control.phase_i, 1)?;
    session.setup_freq_lut(control.port_q, control.frequency, control.phase_q, 1)?;
    session.setup_scale_lut(readout.port_i, readout.amplitude, 1)?;
    session.setup_scale_lut(readout.port_q, readout.amplitude, 1)?;
    session.setup_scale_lut(control.port_i, control.amplitude, 1)?;
    session.setup_scale_lut(control.port_q, control.amplitude, 1)?;

    let readout_pulses = [
        session.setup_continuous_drive(readout.port_i, readout.length)?,
        session.setup_continuous_drive(readout.port_q, readout.length)?,
    ];

    let control_ns = (control.length * session.sampling_freq()).round() as usize;
    if control_ns == 0 {
        return Err(Error::InvalidConfig(format!(
            "control pulse of {} s is shorter than one sample",
            control.length
        )));
    }
    let template = control.shape.samples(control_ns);
    let inverted: Vec<f64> = template.iter().map(|v| -v).collect();
    let control_plus = [
        session.setup_template(control.port_i, &template, true)?,
        session.setup_template(control.port_q, &template, true)?,
    ];
    let control_minus = [
        session.setup_template(control.port_i, &inverted, true)?,
        session.setup_template(control.port_q, &inverted, true)?,
    ];

    session.set_store_duration(config.sample.length)?;
    session.set_store_ports(&[config.sample.port_i, config.sample.port_q])?;

    Ok(Pulses {
        readout: readout_pulses,
        control_plus,
        control_minus,
    })
}

fn measure<S: PulseSession>(
    session: &mut S,
    config: &RamseyConfig,
    schedule: &RamseySchedule,
) -> Result<Acquisition> {
    let pulses = setup_session(session, config)?;
    for event in schedule.events() {
        match event {
            ScheduledEvent::Output { time, pulses: set } => {
                session.output_pulse(*time, pulses.get(*set))?
            }
            ScheduledEvent::Store { time } => session.store(*time)?,
        }
    }
    let num_averages = config.sequence.num_averages;
    vivace_log::info!(
        "Expected runtime: {}",
        format_sec(schedule.expected_runtime(num_averages))
    );
    session.perform_measurement(schedule.end_time(), 1, num_averages)
}

/// Run the complete detuning sweep.
///
/// The first failing instrument call aborts the run. The source frequency is
/// only restored after a complete sweep.
pub fn run<L, S, C>(
    config: &RamseyConfig,
    lo: &mut L,
    source: &mut S,
    controller: &mut C,
) -> Result<ResultArray>
where
    L: FrequencySource,
    S: FrequencySource,
    C: PulseController,
{
    config.validate()?;
    let settle = Duration::try_from_secs_f64(config.sequence.settle_time).map_err(|e| {
        Error::InvalidConfig(format!(
            "sequence.settle_time of {} s: {e}",
            config.sequence.settle_time
        ))
    })?;

    lo.set_output(true)?;
    lo.set_power(config.readout.lo_power)?;
    lo.set_external_reference()?;
    lo.set_frequency(config.readout.lo_frequency)?;
    source.set_frequency(config.control.source_frequency)?;
    source.set_power(config.control.source_power)?;
    source.set_output(true)?;

    let schedule = RamseySchedule::new(SequenceTiming::from_config(config));
    let steps = sweep_steps(config);
    let mut result = ResultArray::new(
        steps.len(),
        config.sequence.nr_delays,
        config.samples_per_window(controller.sampling_freq()),
    );

    for step in &steps {
        vivace_log::debug!(
            "Sweep step {}/{}: detuning {} Hz",
            step.index + 1,
            steps.len(),
            step.detuning
        );
        source.set_frequency(step.source_frequency)?;
        thread::sleep(settle);
        let acquisition = {
            let mut session = controller.open_session()?;
            measure(&mut session, config, &schedule)?
        };
        result.store_sweep_step(step.index, &acquisition)?;
    }

    source.set_frequency(config.control.source_frequency)?;
    source.close()?;
    vivace_log::info!(
        "Measured {} detunings with {} delays",
        steps.len(),
        config.sequence.nr_delays
    );
    Ok(result)
}

/// Human readable duration, e.g. `12.3 s`, `4 min 5 s` or `1 h 2 min 3 s`.
pub fn format_sec(seconds: f64) -> String {
    if seconds < 60.0 {
        return format!("{seconds:.1} s");
    }
    let total = seconds.round() as u64;
    let (hours, minutes, secs) = (total / 3600, total % 3600 / 60, total % 60);
    if hours == 0 {
        format!("{minutes} min {secs} s")
    } else {
        format!("{hours} h {minutes} min {secs} s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_sec() {
        assert_eq!(format_sec(0.0), "0.0 s");
        assert_eq!(format_sec(12.34), "12.3 s");
        assert_eq!(format_sec(59.9), "59.9 s");
        assert_eq!(format_sec(60.0), "1 min 0 s");
        assert_eq!(format_sec(245.4), "4 min 5 s");
        assert_eq!(format_sec(3723.0), "1 h 2 min 3 s");
        assert_eq!(format_sec(7200.2), "2 h 0 min 0 s");
    }
}
