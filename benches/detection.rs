//! Benchmarks for blind game detection and per-packet decoding
//!
//! Measures:
//! - Unlocked detection cost as the registry grows (linear scan)
//! - Locked detection cost (must stay flat regardless of registry size)
//! - Full decode of a locked schema
//! - One complete dashboard step including gauge rendering

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use shiftlight::test_utils::{
    RecordingRenderer, dirt_rally_packet, dirt_rally_schema, explicit_redline_schema,
};
use shiftlight::types::{FieldFormat, FieldSpec, GameSchema};
use shiftlight::{Dashboard, GameDetector, GaugeConfig, RegistryHandle, SchemaRegistry, decoder};
use std::hint::black_box;
use tokio::time::Instant;

/// Registry with `decoys` schemas that never match a DiRT packet, then DiRT Rally last.
fn registry_with_decoys(decoys: usize) -> SchemaRegistry {
    let mut schemas: Vec<GameSchema> = (0..decoys)
        .map(|i| {
            GameSchema::new(
                format!("decoy_{i}"),
                FieldSpec::new(0, FieldFormat::I32Le, 1.0),
                FieldSpec::new(4, FieldFormat::F32Le, 1.0),
            )
        })
        .collect();
    schemas.push(dirt_rally_schema());
    SchemaRegistry::new(schemas).expect("valid registry")
}

fn bench_detection(c: &mut Criterion) {
    let packet = dirt_rally_packet(3.0, 450.0);
    let mut group = c.benchmark_group("detection");

    for decoys in [0usize, 4, 16, 64] {
        let registry = registry_with_decoys(decoys);

        group.bench_with_input(BenchmarkId::new("unlocked", decoys), &registry, |b, registry| {
            b.iter(|| {
                let mut detector = GameDetector::default();
                black_box(detector.detect(registry, black_box(&packet)))
            })
        });

        let mut locked = GameDetector::default();
        locked.detect(&registry, &packet).expect("DiRT packet detected");
        group.bench_with_input(BenchmarkId::new("locked", decoys), &registry, |b, registry| {
            b.iter(|| black_box(locked.detect(registry, black_box(&packet))))
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    let dirt = dirt_rally_schema();
    let dirt_packet = dirt_rally_packet(4.0, 612.5);
    group.bench_function("dirt_rally_f32_le", |b| {
        b.iter(|| black_box(decoder::decode(&dirt, black_box(&dirt_packet))))
    });

    let explicit = explicit_redline_schema();
    let explicit_packet = [3u8, 0, 0x18, 0x38, 0x1F, 0x40];
    group.bench_function("explicit_redline_u16_be", |b| {
        b.iter(|| black_box(decoder::decode(&explicit, black_box(&explicit_packet))))
    });

    group.finish();
}

fn bench_dashboard_step(c: &mut Criterion) {
    let mut dashboard = Dashboard::new(
        RegistryHandle::new(registry_with_decoys(8)),
        GaugeConfig::default(),
        RecordingRenderer::default(),
    );
    let packets = [dirt_rally_packet(3.0, 400.0), dirt_rally_packet(4.0, 520.0)];
    let now = Instant::now();

    c.bench_function("dashboard_handle_packet", |b| {
        let mut i = 0usize;
        b.iter(|| {
            i = i.wrapping_add(1);
            let outcome = dashboard.handle_packet(black_box(&packets[i % 2]), now);
            dashboard.renderer_mut().clear();
            black_box(outcome)
        })
    });
}

criterion_group!(benches, bench_detection, bench_decode, bench_dashboard_step);
criterion_main!(benches);
