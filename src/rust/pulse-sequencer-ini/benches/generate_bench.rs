// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use pulse_sequencer_ini::{SequencerLimits, build_descriptor, driver_info};
use std::hint::black_box;

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_descriptor");
    for pulse_defs in [4, 16, 64] {
        let limits = SequencerLimits {
            max_pulse_defs: pulse_defs,
            ..Default::default()
        };
        group.bench_with_input(
            BenchmarkId::from_parameter(pulse_defs),
            &limits,
            |b, limits| {
                b.iter(|| black_box(build_descriptor(limits, driver_info())));
            },
        );
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let descriptor = match build_descriptor(&SequencerLimits::default(), driver_info()) {
        Ok(descriptor) => descriptor,
        Err(e) => panic!("default descriptor must build: {e}"),
    };
    c.bench_function("render_default", |b| {
        b.iter(|| black_box(descriptor.render()));
    });
}

criterion_group!(benches, bench_build, bench_render);
criterion_main!(benches);
