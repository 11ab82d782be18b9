//! Evaluation throughput for the order gate.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use orderchain_core::cache::InMemoryCache;
use orderchain_core::config::{Collaborators, PipelineConfig};
use orderchain_core::events::RecordingSink;
use orderchain_core::{PipelineEvaluator, Record};

fn bench_order_gate(c: &mut Criterion) {
    let collaborators = Collaborators::new().with_cache(Arc::new(InMemoryCache::new()));
    let pipeline = PipelineConfig::order_gate()
        .build(&collaborators)
        .expect("order gate builds");
    let evaluator = PipelineEvaluator::new();

    c.bench_function("order_gate_rejected_early", |b| {
        b.iter(|| {
            let mut record = Record::order(false, true, true);
            black_box(evaluator.evaluate(&pipeline, &mut record))
        })
    });

    c.bench_function("order_gate_accepted", |b| {
        b.iter(|| {
            let mut record = Record::order(true, true, true);
            black_box(evaluator.evaluate(&pipeline, &mut record))
        })
    });

    let sink = Arc::new(RecordingSink::new());
    let recording = PipelineEvaluator::with_sink(sink.clone());
    c.bench_function("order_gate_recording_sink", |b| {
        b.iter(|| {
            sink.clear();
            let mut record = Record::order(true, true, true);
            black_box(recording.evaluate_detailed(&pipeline, &mut record))
        })
    });
}

criterion_group!(benches, bench_order_gate);
criterion_main!(benches);
