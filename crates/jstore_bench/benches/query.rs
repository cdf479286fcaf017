//! Query compilation benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use jstore_core::{query, QueryOption};
use jstore_elastic::{compile_query, SortField};

fn options(filters: usize) -> Vec<QueryOption> {
    let mut options: Vec<QueryOption> = (0..filters)
        .map(|n| match n % 3 {
            0 => query::eq(format!("name{n}"), "Ford"),
            1 => query::gt(format!("age{n}"), 42),
            _ => query::lte(format!("speed{n}"), 1.5),
        })
        .collect();
    options.push(query::desc("age0"));
    options
}

/// Benchmark compiling option lists into search bodies.
fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile_query");

    for filters in [1, 4, 16].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(filters),
            filters,
            |b, &filters| {
                let options = options(filters);
                b.iter(|| {
                    let body =
                        compile_query(black_box(&options), 10, ".keyword", SortField::Plain)
                            .unwrap();
                    black_box(body.to_string());
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_compile);
criterion_main!(benches);
