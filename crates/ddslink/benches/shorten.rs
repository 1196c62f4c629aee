// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! JSON shortener benchmark
//!
//! Measures the cost of the per-sample log preview: nested documents at the
//! default budget and at budgets tight enough to force truncation.

#![allow(clippy::uninlined_format_args)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ddslink::text::DEFAULT_SHORTEN_LENGTH;
use ddslink::{shorten_json, FlexibleMsg, Message};
use serde_json::json;

fn nested_document(width: usize) -> String {
    let fields: serde_json::Map<String, serde_json::Value> = (0..width)
        .map(|i| {
            (
                format!("field{}", i),
                json!({ "id": i, "values": [i, i + 1, i + 2], "inner": { "name": "sensor" } }),
            )
        })
        .collect();
    serde_json::Value::Object(fields).to_string()
}

fn bench_shorten_budgets(c: &mut Criterion) {
    let doc = nested_document(8);
    let mut group = c.benchmark_group("shorten_json");
    for budget in [7usize, 32, DEFAULT_SHORTEN_LENGTH, 256] {
        group.bench_with_input(BenchmarkId::from_parameter(budget), &budget, |b, &budget| {
            b.iter(|| shorten_json(black_box(&doc), budget));
        });
    }
    group.finish();
}

fn bench_shorten_width(c: &mut Criterion) {
    let mut group = c.benchmark_group("shorten_json_width");
    for width in [1usize, 4, 16, 64] {
        let doc = nested_document(width);
        group.bench_with_input(BenchmarkId::from_parameter(width), &doc, |b, doc| {
            b.iter(|| shorten_json(black_box(doc), DEFAULT_SHORTEN_LENGTH));
        });
    }
    group.finish();
}

fn bench_message_preview(c: &mut Criterion) {
    let msg = FlexibleMsg::from_json(&json!({
        "id": "query-devices",
        "devices": (0..32).map(|i| json!({ "serial": format!("{:012}", i), "locked": false })).collect::<Vec<_>>(),
    }));
    c.bench_function("flexible_preview", |b| {
        b.iter(|| black_box(&msg).preview(DEFAULT_SHORTEN_LENGTH));
    });
}

criterion_group!(
    benches,
    bench_shorten_budgets,
    bench_shorten_width,
    bench_message_preview
);
criterion_main!(benches);
