use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;
use tabula_columnar::{AggSpec, Column, Frame, SampleOptions};

fn bench_rows() -> usize {
    std::env::var("TABULA_FRAME_BENCH_ROWS")
        .ok()
        .and_then(|v| v.replace('_', "").parse::<usize>().ok())
        .filter(|&v| (10_000..=5_000_000).contains(&v))
        .unwrap_or(500_000)
}

fn build_frame(rows: usize) -> Frame {
    let depts = ["eng", "ops", "sales", "legal", "hr", "finance", "support", "design"];
    Frame::from_typed_columns(vec![
        ("id", Column::int32((0..rows as i32).collect())),
        (
            "dept",
            Column::text((0..rows).map(|i| depts[i % depts.len()]).collect()),
        ),
        (
            "salary",
            Column::float64((0..rows).map(|i| 40_000.0 + (i % 997) as f64 * 113.0).collect()),
        ),
    ])
    .unwrap()
}

fn bench_frame_ops(c: &mut Criterion) {
    let rows = bench_rows();
    let frame = build_frame(rows);

    let mut group = c.benchmark_group("frame_ops");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(5));
    group.throughput(Throughput::Elements(rows as u64));

    group.bench_with_input(BenchmarkId::new("where_gt", rows), &rows, |b, _| {
        b.iter(|| {
            let out = frame.filter_where("salary", ">", 90_000.0).unwrap();
            black_box(out);
        })
    });

    // Row predicates materialize every row, so this tracks the cost of the generic path.
    group.bench_with_input(BenchmarkId::new("filter_closure", rows), &rows, |b, _| {
        b.iter(|| {
            let out = frame.filter(|row| {
                row.get("dept")
                    .and_then(|v| v.as_text())
                    .is_some_and(|d| d.starts_with('s'))
            });
            black_box(out);
        })
    });

    group.bench_with_input(BenchmarkId::new("group_by_sum", rows), &rows, |b, _| {
        b.iter(|| {
            let out = frame
                .group_by(&["dept"])
                .unwrap()
                .aggregate(&[AggSpec::sum("salary"), AggSpec::count("id")])
                .unwrap();
            black_box(out);
        })
    });

    group.bench_with_input(BenchmarkId::new("sample_10pct", rows), &rows, |b, _| {
        b.iter(|| {
            let out = frame.sample(0.1, SampleOptions::seeded(7)).unwrap();
            black_box(out);
        })
    });

    group.finish();
}

criterion_group!(benches, bench_frame_ops);
criterion_main!(benches);
