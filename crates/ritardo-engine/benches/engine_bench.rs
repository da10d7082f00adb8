//! Criterion benchmarks for the delay engine's per-block path
//!
//! Run with: cargo bench
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use ritardo_engine::{DelayEngine, TimeBasis};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512, 1024];

fn generate_test_signal(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5
        })
        .collect()
}

fn bench_process_block(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_block_stereo");

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);

        group.bench_with_input(
            BenchmarkId::from_parameter(block_size),
            &block_size,
            |b, _| {
                let mut engine = DelayEngine::new(2, SAMPLE_RATE, block_size);
                engine.params_mut().set_time_basis(TimeBasis::Milliseconds);
                engine.params_mut().set_delay_ms(375);
                engine.params_mut().set_feedback(0.5);
                engine.params_mut().set_mix(0.3);
                engine.reset();

                let mut left = input.clone();
                let mut right = input.clone();
                b.iter(|| {
                    left.copy_from_slice(black_box(&input));
                    right.copy_from_slice(&input);
                    engine.process_block(&mut [&mut left, &mut right], 120.0);
                    black_box(left[0])
                })
            },
        );
    }

    group.finish();
}

fn bench_crossfade_block(c: &mut Criterion) {
    // Worst case: the delay time jumps every block, so every block pays for
    // two wet reads instead of one.
    let mut group = c.benchmark_group("process_block_crossfade");

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);

        group.bench_with_input(
            BenchmarkId::from_parameter(block_size),
            &block_size,
            |b, _| {
                let mut engine = DelayEngine::new(2, SAMPLE_RATE, block_size);
                engine.params_mut().set_time_basis(TimeBasis::Milliseconds);
                engine.params_mut().set_feedback(0.5);
                engine.params_mut().set_mix(0.5);
                engine.reset();

                let mut left = input.clone();
                let mut right = input.clone();
                let mut delay_ms = 100;
                b.iter(|| {
                    delay_ms = if delay_ms == 100 { 200 } else { 100 };
                    engine.params_mut().set_delay_ms(delay_ms);
                    left.copy_from_slice(black_box(&input));
                    right.copy_from_slice(&input);
                    engine.process_block(&mut [&mut left, &mut right], 120.0);
                    black_box(left[0])
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_process_block, bench_crossfade_block);
criterion_main!(benches);
