// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use proptest::prelude::*;

use ramsey::schedule::{
    BRANCHES, PulseSet, RamseySchedule, ScheduledEvent, SequenceTiming, block_start,
};

fn timing_strategy() -> impl Strategy<Value = SequenceTiming> {
    (
        0.0..10e-6,
        1e-9..1e-6,
        0.0..1e-6,
        1e-6..1e-3,
        0.0..1e-6,
        1usize..64,
    )
        .prop_map(
            |(start_time, control_length, dt_delays, wait_decay, readout_sample_delay, nr_delays)| {
                SequenceTiming {
                    start_time,
                    control_length,
                    dt_delays,
                    wait_decay,
                    readout_sample_delay,
                    nr_delays,
                }
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn blocks_are_back_to_back(timing in timing_strategy()) {
        let schedule = RamseySchedule::new(timing);
        prop_assert_eq!(schedule.events().len(), timing.nr_delays * BRANCHES * 4);
        prop_assert_eq!(schedule.num_stores(), timing.nr_delays * BRANCHES);

        let mut cursor = timing.start_time;
        for (block, events) in schedule.events().chunks(4).enumerate() {
            let (delay, branch) = (block / BRANCHES, block % BRANCHES);
            let tolerance = 1e-12 * cursor.max(1e-6);
            prop_assert!((events[0].time() - cursor).abs() < tolerance);
            prop_assert!((block_start(&timing, delay, branch) - cursor).abs() < tolerance);

            let second = match events[1] {
                ScheduledEvent::Output { pulses, .. } => pulses,
                ScheduledEvent::Store { .. } => return Err(TestCaseError::fail("expected output")),
            };
            let expected = if branch == 0 { PulseSet::ControlPlus } else { PulseSet::ControlMinus };
            prop_assert_eq!(second, expected);
            let is_store = matches!(events[3], ScheduledEvent::Store { .. });
            prop_assert!(is_store);

            cursor += 2.0 * timing.control_length + timing.delay(delay) + timing.wait_decay;
        }
        prop_assert!((schedule.end_time() - cursor).abs() < 1e-12 * cursor.max(1e-6));
    }
}
