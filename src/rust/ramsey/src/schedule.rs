// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Pulse timing of the Ramsey sequence.
//!
//! Each block plays two π/2 control pulses separated by a variable delay,
//! then the readout pulse, opens a sample window and waits for the qubit to
//! decay. There are two blocks per delay: in branch 0 both control pulses
//! have the same sign, in branch 1 the second pulse is inverted.
//!
//! Everything here is a pure function of the configuration.

use crate::config::RamseyConfig;
use crate::runner::format_sec;

/// Number of sign branches per delay.
pub const BRANCHES: usize = 2;

/// Which registered pulses are played together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PulseSet {
    ControlPlus,
    ControlMinus,
    Readout,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScheduledEvent {
    Output { time: f64, pulses: PulseSet },
    Store { time: f64 },
}

impl ScheduledEvent {
    pub fn time(&self) -> f64 {
        match self {
            ScheduledEvent::Output { time, .. } | ScheduledEvent::Store { time } => *time,
        }
    }
}

/// Timing parameters of the sequence, all in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequenceTiming {
    pub start_time: f64,
    pub control_length: f64,
    pub dt_delays: f64,
    pub wait_decay: f64,
    pub readout_sample_delay: f64,
    pub nr_delays: usize,
}

impl SequenceTiming {
    pub fn from_config(config: &RamseyConfig) -> Self {
        Self {
            start_time: config.sequence.start_time,
            control_length: config.control.length,
            dt_delays: config.sequence.dt_delays,
            wait_decay: config.sequence.wait_decay,
            readout_sample_delay: config.sequence.readout_sample_delay,
            nr_delays: config.sequence.nr_delays,
        }
    }

    /// Free evolution time between the two control pulses.
    pub fn delay(&self, delay_index: usize) -> f64 {
        delay_index as f64 * self.dt_delays
    }

    fn block_length(&self, delay_index: usize) -> f64 {
        2.0 * self.control_length + self.delay(delay_index) + self.wait_decay
    }
}

/// Absolute start time of the block for (`delay_index`, `branch`).
///
/// Blocks are laid out delay-major, branch-minor, back to back from
/// `start_time`.
pub fn block_start(timing: &SequenceTiming, delay_index: usize, branch: usize) -> f64 {
    let d = delay_index as f64;
    let fixed = 2.0 * timing.control_length + timing.wait_decay;
    // Both branches of every earlier delay, plus the earlier branches of this delay.
    let earlier_delays = BRANCHES as f64 * (d * fixed + timing.dt_delays * d * (d - 1.0) / 2.0);
    timing.start_time + earlier_delays + branch as f64 * timing.block_length(delay_index)
}

/// Events of a single block, in time order.
pub fn block_events(
    timing: &SequenceTiming,
    delay_index: usize,
    branch: usize,
) -> Vec<ScheduledEvent> {
    let start = block_start(timing, delay_index, branch);
    let second = start + timing.control_length + timing.delay(delay_index);
    let readout = second + timing.control_length;
    let second_pulses = if branch == 0 {
        PulseSet::ControlPlus
    } else {
        PulseSet::ControlMinus
    };
    vec![
        ScheduledEvent::Output {
            time: start,
            pulses: PulseSet::ControlPlus,
        },
        ScheduledEvent::Output {
            time: second,
            pulses: second_pulses,
        },
        ScheduledEvent::Output {
            time: readout,
            pulses: PulseSet::Readout,
        },
        ScheduledEvent::Store {
            time: readout + timing.readout_sample_delay,
        },
    ]
}

/// The complete sequence played for one sweep step.
#[derive(Debug, Clone, PartialEq)]
pub struct RamseySchedule {
    timing: SequenceTiming,
    events: Vec<ScheduledEvent>,
    end_time: f64,
}

impl RamseySchedule {
    pub fn new(timing: SequenceTiming) -> Self {
        let events = (0..timing.nr_delays)
            .flat_map(|delay| (0..BRANCHES).map(move |branch| (delay, branch)))
            .flat_map(|(delay, branch)| block_events(&timing, delay, branch))
            .collect();
        let end_time = block_start(&timing, timing.nr_delays, 0);
        Self {
            timing,
            events,
            end_time,
        }
    }

    pub fn timing(&self) -> &SequenceTiming {
        &self.timing
    }

    pub fn events(&self) -> &[ScheduledEvent] {
        &self.events
    }

    /// End of the last wait; the sequence period passed to the controller.
    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.timing.start_time
    }

    pub fn num_stores(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, ScheduledEvent::Store { .. }))
            .count()
    }

    /// Wall-clock time of the averaged measurement.
    pub fn expected_runtime(&self, num_averages: u32) -> f64 {
        self.duration() * num_averages as f64
    }

    /// Sequence overview printed instead of measuring.
    pub fn summary(&self, config: &RamseyConfig) -> String {
        let per_step = self.expected_runtime(config.sequence.num_averages);
        format!(
            "{} events per sweep step, {} sweep steps\n\
             Expected runtime per step: {}\n\
             Expected runtime total: {}\n",
            self.events.len(),
            config.sweep.nr_freqs,
            format_sec(per_step),
            format_sec(per_step * config.sweep.nr_freqs as f64),
        )
    }
}

/// One point of the detuning sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepStep {
    pub index: usize,
    pub detuning: f64,
    /// Frequency the control source is set to (Hz).
    pub source_frequency: f64,
}

pub fn sweep_steps(config: &RamseyConfig) -> Vec<SweepStep> {
    config
        .sweep
        .detunings()
        .into_iter()
        .enumerate()
        .map(|(index, detuning)| SweepStep {
            index,
            detuning,
            source_frequency: config.control.source_frequency + detuning,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing() -> SequenceTiming {
        SequenceTiming {
            start_time: 2e-6,
            control_length: 60e-9,
            dt_delays: 0.2e-6,
            wait_decay: 500e-6,
            readout_sample_delay: 200e-9,
            nr_delays: 4,
        }
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() <= 1e-15 + 1e-12 * b.abs(), "{a} != {b}");
    }

    /// Walk the blocks with a running time cursor, the way a hand-written loop would.
    fn accumulated_starts(timing: &SequenceTiming) -> Vec<f64> {
        let mut t = timing.start_time;
        let mut starts = vec![];
        for delay in 0..timing.nr_delays {
            for _ in 0..BRANCHES {
                starts.push(t);
                t += timing.control_length + timing.delay(delay);
                t += timing.control_length;
                t += timing.wait_decay;
            }
        }
        starts.push(t);
        starts
    }

    #[test]
    fn test_block_start_matches_running_time() {
        let timing = timing();
        let starts = accumulated_starts(&timing);
        for delay in 0..timing.nr_delays {
            for branch in 0..BRANCHES {
                let expected = starts[delay * BRANCHES + branch];
                assert_close(block_start(&timing, delay, branch), expected);
            }
        }
        let schedule = RamseySchedule::new(timing);
        assert_close(schedule.end_time(), *starts.last().unwrap());
    }

    #[test]
    fn test_first_block() {
        let events = block_events(&timing(), 0, 0);
        assert_eq!(
            events[0],
            ScheduledEvent::Output {
                time: 2e-6,
                pulses: PulseSet::ControlPlus
            }
        );
        assert_close(events[1].time(), 2e-6 + 60e-9);
        assert_close(events[2].time(), 2e-6 + 120e-9);
        assert_close(events[3].time(), 2e-6 + 320e-9);
        assert!(matches!(events[3], ScheduledEvent::Store { .. }));
    }

    #[test]
    fn test_branch_sign() {
        let timing = timing();
        let plus = block_events(&timing, 2, 0);
        let minus = block_events(&timing, 2, 1);
        assert!(matches!(
            plus[1],
            ScheduledEvent::Output {
                pulses: PulseSet::ControlPlus,
                ..
            }
        ));
        assert!(matches!(
            minus[1],
            ScheduledEvent::Output {
                pulses: PulseSet::ControlMinus,
                ..
            }
        ));
        // Second pulse follows the first after the pulse length plus the delay.
        assert_close(plus[1].time() - plus[0].time(), 60e-9 + 2.0 * 0.2e-6);
        assert_close(minus[1].time() - minus[0].time(), 60e-9 + 2.0 * 0.2e-6);
    }

    #[test]
    fn test_schedule_is_ordered() {
        let schedule = RamseySchedule::new(timing());
        assert_eq!(schedule.events().len(), 4 * BRANCHES * 4);
        assert_eq!(schedule.num_stores(), 4 * BRANCHES);
        for pair in schedule.events().windows(2) {
            assert!(pair[0].time() < pair[1].time());
        }
        assert!(schedule.events().last().unwrap().time() < schedule.end_time());
    }

    #[test]
    fn test_expected_runtime() {
        let config = RamseyConfig::default();
        let schedule = RamseySchedule::new(SequenceTiming::from_config(&config));
        let per_shot: f64 = (0..128)
            .map(|d| 2.0 * (120e-9 + d as f64 * 0.2e-6 + 500e-6))
            .sum();
        assert_close(schedule.duration(), per_shot);
        assert_close(schedule.expected_runtime(4000), per_shot * 4000.0);
    }

    #[test]
    fn test_summary() {
        let mut config = RamseyConfig::default();
        config.sequence.nr_delays = 2;
        config.sequence.num_averages = 10;
        config.sequence.wait_decay = 1.0;
        config.sweep.nr_freqs = 7;
        let schedule = RamseySchedule::new(SequenceTiming::from_config(&config));
        // Four blocks of one second wait each, averaged ten times.
        assert_eq!(
            schedule.summary(&config),
            "16 events per sweep step, 7 sweep steps\n\
             Expected runtime per step: 40.0 s\n\
             Expected runtime total: 4 min 40 s\n"
        );
    }

    #[test]
    fn test_sweep_steps() {
        let mut config = RamseyConfig::default();
        config.sweep.nr_freqs = 5;
        config.sweep.detuning_start = -2e3;
        config.sweep.detuning_stop = 2e3;
        let steps = sweep_steps(&config);
        assert_eq!(steps.len(), 5);
        assert_eq!(steps[0].index, 0);
        assert_eq!(steps[2].detuning, 0.0);
        assert_eq!(steps[4].source_frequency, config.control.source_frequency + 2e3);
    }
}
