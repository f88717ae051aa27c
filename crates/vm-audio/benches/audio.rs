//! Pitch detection and analyser graph benchmarks

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use vm_audio::buffers::SampleBuffers;
use vm_audio::features::{detect_pitch, spectral_centroid};
use vm_audio::graph::AnalyserGraph;
use vm_audio::metrics::calculate_metrics;
use vm_core::config::AnalyzerConfig;

fn voiced_frame(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| 0.4 * (2.0 * std::f32::consts::PI * 180.0 * i as f32 / 16_000.0).sin())
        .collect()
}

fn bench_detect_pitch(c: &mut Criterion) {
    let frame = voiced_frame(2048);
    c.bench_function("detect_pitch_2048", |b| {
        b.iter(|| detect_pitch(black_box(&frame), 16_000));
    });
}

fn bench_graph_tick(c: &mut Criterion) {
    let mut graph = AnalyserGraph::new(&AnalyzerConfig::default());
    let hop = voiced_frame(266);
    let mut time = vec![0.0f32; graph.fft_size()];
    let mut bins = vec![0u8; graph.frequency_bin_count()];

    c.bench_function("graph_tick_2048", |b| {
        b.iter(|| {
            graph.push(black_box(&hop));
            graph.get_float_time_domain_data(&mut time);
            graph.get_byte_frequency_data(&mut bins);
            spectral_centroid(black_box(&bins), 16_000)
        });
    });
}

fn bench_metrics(c: &mut Criterion) {
    let n = 60 * 60;
    let buffers = SampleBuffers::from_samples(
        (0..n).map(|i| 150.0 + (i % 40) as f32).collect(),
        (0..n).map(|i| 0.05 + (i % 13) as f32 * 0.01).collect(),
        (0..n).map(|i| 1800.0 + (i % 300) as f32).collect(),
    );
    c.bench_function("calculate_metrics_1min", |b| {
        b.iter(|| calculate_metrics(black_box(&buffers)));
    });
}

criterion_group!(benches, bench_detect_pitch, bench_graph_tick, bench_metrics);
criterion_main!(benches);
