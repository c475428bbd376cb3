// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Metadata reducer benchmarks
//!
//! Measures context merging and selection over a store holding several sessions.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use graphmeta_catalog::query::{decode_meta_records, encode_meta_records};
use graphmeta_catalog::{Invokable, MetaRecords};
use graphmeta_sync::{Context, MetadataState};

fn create_records(size: usize) -> MetaRecords {
    let functions = (0..size)
        .map(|i| Invokable::new(format!("fn.f{}", i), format!("fn.f{}() :: STRING?", i)))
        .collect();
    let procedures = (0..size)
        .map(|i| {
            Invokable::new(format!("db.p{}", i), format!("db.p{}() :: (x :: INTEGER?)", i))
                .with_description("benchmark procedure")
        })
        .collect();

    MetaRecords::new()
        .with_labels((0..size).map(|i| format!("Label{}", i)))
        .with_relationship_types((0..size).map(|i| format!("REL_{}", i)))
        .with_property_keys((0..size * 4).map(|i| format!("prop{}", i)))
        .with_functions(functions)
        .with_procedures(procedures)
}

fn create_state(contexts: usize, records: &MetaRecords) -> MetadataState {
    (0..contexts).fold(MetadataState::default(), |state, i| {
        state.apply_metadata_update(records, &Context::from(format!("tab-{}", i)))
    })
}

fn bench_apply_metadata_update(c: &mut Criterion) {
    let records = create_records(100);
    let state = create_state(8, &records);
    let context = Context::from("tab-3");

    c.bench_function("reducer/apply_metadata_update", |b| {
        b.iter(|| {
            let next = state.apply_metadata_update(black_box(&records), &context);
            black_box(next);
        });
    });
}

fn bench_meta_in_context(c: &mut Criterion) {
    let records = create_records(100);
    let state = create_state(8, &records);
    let context = Context::from("tab-5");

    c.bench_function("reducer/meta_in_context", |b| {
        b.iter(|| {
            let meta = state.meta_in_context(black_box(&context));
            black_box(meta);
        });
    });
}

fn bench_decode_meta_records(c: &mut Criterion) {
    let rows = encode_meta_records(&create_records(100));

    c.bench_function("reducer/decode_meta_records", |b| {
        b.iter(|| {
            let decoded = decode_meta_records(black_box(&rows));
            black_box(decoded.ok());
        });
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default().sample_size(20);
    targets = bench_apply_metadata_update, bench_meta_in_context, bench_decode_meta_records
);

criterion_main!(benches);
