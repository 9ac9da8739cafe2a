//! Benchmarks for merging namespace lists.
//!
//! Run with: `cargo bench --package xds-sync`

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use xds_core::{AnyResource, BoxResource};
use xds_sync::{sort_by_name, NamespaceMerge};

const UPSTREAM: &str = "type.googleapis.com/gloo.solo.io.Upstream";

fn upstreams(namespace: usize, count: usize) -> Vec<BoxResource> {
    (0..count)
        .rev()
        .map(|i| {
            let resource: BoxResource = Arc::new(AnyResource::new(
                format!("ns{namespace}-upstream-{i}"),
                prost_types::Any {
                    type_url: UPSTREAM.to_string(),
                    value: Vec::new(),
                },
            ));
            resource
        })
        .collect()
}

fn bench_merged(c: &mut Criterion) {
    let mut group = c.benchmark_group("merged");

    for namespaces in [1, 10, 100] {
        let mut merge = NamespaceMerge::default();
        for ns in 0..namespaces {
            merge.update(format!("ns{ns}"), upstreams(ns, 100));
        }
        group.throughput(Throughput::Elements(namespaces as u64 * 100));
        group.bench_with_input(BenchmarkId::from_parameter(namespaces), &merge, |b, m| {
            b.iter(|| black_box(m.merged(sort_by_name)));
        });
    }

    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_one_namespace");

    for namespaces in [10, 100] {
        group.bench_with_input(
            BenchmarkId::from_parameter(namespaces),
            &namespaces,
            |b, &namespaces| {
                let mut merge = NamespaceMerge::default();
                for ns in 0..namespaces {
                    merge.update(format!("ns{ns}"), upstreams(ns, 100));
                }
                let replacement = upstreams(0, 100);

                b.iter(|| {
                    merge.update("ns0", replacement.clone());
                    black_box(merge.merged(sort_by_name))
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_merged, bench_update);
criterion_main!(benches);
