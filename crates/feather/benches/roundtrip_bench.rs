use std::fs::File;
use std::path::Path;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use feather::{Datum, FeatherTable, FeatherWriter, PrimitiveWriter, StringWriter};
use tempfile::tempdir;

const N_ROWS: u64 = 10_000;

fn build_writer() -> FeatherWriter {
    let mut w = FeatherWriter::new();
    w.add_column(Box::new(PrimitiveWriter::new(
        "seq",
        (0..N_ROWS).map(|i| i as i64).collect::<Vec<_>>(),
    )));
    w.add_column(Box::new(PrimitiveWriter::new(
        "value",
        (0..N_ROWS).map(|i| i as f64 * 0.5).collect::<Vec<_>>(),
    )));
    w.add_column(Box::new(StringWriter::new(
        "label",
        false,
        (0..N_ROWS)
            .map(|i| Some(format!("row{}", i)))
            .collect::<Vec<_>>(),
    )));
    w
}

fn write_file(path: &Path, w: &FeatherWriter) {
    w.write(File::create(path).unwrap()).unwrap();
}

fn feather_write_benchmark(c: &mut Criterion) {
    c.bench_function("feather_write_10k_x3", |b| {
        b.iter_batched(
            || {
                let dir = tempdir().unwrap();
                let path = dir.path().join("bench.fea");
                (dir, path, build_writer())
            },
            |(_dir, path, w)| {
                write_file(&path, &w);
            },
            BatchSize::SmallInput,
        );
    });
}

fn feather_scan_numeric_benchmark(c: &mut Criterion) {
    c.bench_function("feather_scan_i64_10k", |b| {
        b.iter_batched(
            || {
                let dir = tempdir().unwrap();
                let path = dir.path().join("bench.fea");
                write_file(&path, &build_writer());
                let table = FeatherTable::from_file(&path).unwrap();
                (dir, table)
            },
            |(_dir, table)| {
                let reader = table.column(0).create_reader().unwrap();
                let mut sum = 0i64;
                for ir in 0..N_ROWS {
                    sum += reader.get_i64(ir);
                }
                assert_eq!(sum, (N_ROWS as i64 - 1) * N_ROWS as i64 / 2);
            },
            BatchSize::LargeInput,
        );
    });
}

fn feather_scan_strings_benchmark(c: &mut Criterion) {
    c.bench_function("feather_scan_utf8_10k", |b| {
        b.iter_batched(
            || {
                let dir = tempdir().unwrap();
                let path = dir.path().join("bench.fea");
                write_file(&path, &build_writer());
                let table = FeatherTable::from_file(&path).unwrap();
                (dir, table)
            },
            |(_dir, table)| {
                let reader = table.column(2).create_reader().unwrap();
                let mut total = 0usize;
                for ir in 0..N_ROWS {
                    if let Datum::Utf8(s) = reader.datum(ir) {
                        total += s.len();
                    }
                }
                assert!(total > 0);
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(
    benches,
    feather_write_benchmark,
    feather_scan_numeric_benchmark,
    feather_scan_strings_benchmark
);
criterion_main!(benches);
