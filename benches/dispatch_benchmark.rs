//! Dispatch benchmarks.
//!
//! Measures dispatcher overhead and end-to-end cost for:
//! - Column-scalar and column-column arithmetic
//! - Literal normalization
//! - Comparisons
//! - Reductions (sum, minmax)

use std::sync::Arc;

use arrow::array::{Float64Array, Int32Array, Int64Array};
use coldispatch::ops::normalize;
use coldispatch::{Argument, BinaryOperator, Column, Dispatcher, Scalar, TypeId};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn int32_column(rows: usize) -> Column {
    let values: Vec<i32> = (0..rows as i32).collect();
    Column::try_new(Arc::new(Int32Array::from(values))).expect("int32 column")
}

/// Benchmark column + scalar and column + column addition
fn bench_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch_add");
    let dispatcher = Dispatcher::default();

    for rows in &[1_000usize, 100_000] {
        let lhs = int32_column(*rows);
        let rhs = int32_column(*rows);
        let scalar = Scalar::from(10i32);

        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::new("scalar", rows), rows, |b, _| {
            b.iter(|| black_box(dispatcher.add(&lhs, &scalar, None).expect("add")));
        });
        group.bench_with_input(BenchmarkId::new("column", rows), rows, |b, _| {
            b.iter(|| black_box(dispatcher.add(&lhs, &rhs, None).expect("add")));
        });
        group.bench_with_input(BenchmarkId::new("literal", rows), rows, |b, _| {
            b.iter(|| black_box(dispatcher.add(&lhs, 10, None).expect("add")));
        });
    }

    group.finish();
}

/// Benchmark the per-call overhead on a single-row column
fn bench_dispatch_overhead(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch_overhead");
    let dispatcher = Dispatcher::default();
    let lhs = int32_column(1);

    group.bench_function("normalize_bigint", |b| {
        b.iter(|| {
            black_box(
                normalize(
                    Argument::BigInt(black_box(70_000)),
                    TypeId::Int32,
                    BinaryOperator::Add,
                )
                .expect("normalize"),
            )
        });
    });
    group.bench_function("lt_one_row", |b| {
        b.iter(|| black_box(dispatcher.lt(&lhs, 0.5, None).expect("lt")));
    });
    group.bench_function("shift_left_one_row", |b| {
        b.iter(|| black_box(dispatcher.shift_left(&lhs, 3, None).expect("shift")));
    });

    group.finish();
}

/// Benchmark reductions
fn bench_reductions(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch_reduce");
    let dispatcher = Dispatcher::default();
    let rows = 100_000usize;
    let ints = Column::try_new(Arc::new(Int64Array::from_iter_values(0..rows as i64)))
        .expect("int64 column");
    let floats = Column::try_new(Arc::new(Float64Array::from_iter_values(
        (0..rows).map(|i| i as f64 * 0.5),
    )))
    .expect("float64 column");

    group.throughput(Throughput::Elements(rows as u64));
    group.bench_function("sum_int64", |b| {
        b.iter(|| black_box(dispatcher.sum(&ints, None).expect("sum")));
    });
    group.bench_function("minmax_float64", |b| {
        b.iter(|| black_box(dispatcher.minmax(&floats).expect("minmax")));
    });

    group.finish();
}

criterion_group!(benches, bench_add, bench_dispatch_overhead, bench_reductions);
criterion_main!(benches);
