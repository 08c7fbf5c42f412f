//! Benchmarks for Table row operations.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use tabula_core::schema::Column;
use tabula_core::Value;
use tabula_storage::Table;

fn create_table(rows: usize, columns: usize) -> Table {
    let mut table = Table::new("bench");
    table.add_column(Column::string("column1")).unwrap();
    table.add_column(Column::int64("column2")).unwrap();
    for c in 2..columns {
        table.add_column(Column::string(format!("column{}", c + 1))).unwrap();
    }
    for i in 0..rows {
        table.add_row(row_values(i, columns)).unwrap();
    }
    table
}

fn row_values(i: usize, columns: usize) -> Vec<Value> {
    let mut values = vec![Value::String(format!("rows{}", i)), Value::Int64(i as i64)];
    for c in 2..columns {
        values.push(Value::String(format!("column{}", c + 1)));
    }
    values
}

fn add_row_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_row");

    for (label, keyed) in [("no_primary_key", false), ("primary_key", true)] {
        group.bench_function(BenchmarkId::from_parameter(label), |b| {
            b.iter_batched(
                || {
                    let mut table = create_table(0, 30);
                    if keyed {
                        table.set_primary_key(&["column1"]).unwrap();
                    }
                    table
                },
                |mut table| {
                    for i in 0..1000 {
                        table.add_row(row_values(i, 30)).unwrap();
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn set_key_values_benchmark(c: &mut Criterion) {
    let mut table = create_table(10000, 30);
    table.set_primary_key(&["column1"]).unwrap();
    let mut seed = 0x2545_f491_4f6c_dd1du64;

    c.bench_function("set_primary_key_values", |b| {
        b.iter(|| {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            let row = (seed % 10000) as usize;
            let mut values = table.get_values(row).unwrap();
            values[0] = Value::String((seed % 1_000_000).to_string());
            // Collisions with existing keys are expected and ignored
            black_box(table.set_values(row, values).ok())
        });
    });
}

fn build_index_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_index");

    for size in [300usize, 10000].iter() {
        let mut table = create_table(*size, 3);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                table.set_primary_key(&[]).unwrap();
                table.set_primary_key(&["column1"]).unwrap();
            });
        });
    }

    group.finish();
}

fn find_benchmark(c: &mut Criterion) {
    let mut table = create_table(10000, 10);
    table.set_primary_key(&["column1", "column2"]).unwrap();
    let keys: Vec<Vec<Value>> = (0..100)
        .map(|i| vec![Value::String(format!("rows{}", i * 97)), Value::Int64(i * 97)])
        .collect();

    c.bench_function("find", |b| {
        b.iter(|| {
            for key in &keys {
                black_box(table.find(key));
            }
        });
    });
}

fn get_row_benchmark(c: &mut Criterion) {
    let mut table = create_table(100, 10);
    table.set_primary_key(&["column1", "column2"]).unwrap();

    c.bench_function("get_row", |b| {
        b.iter(|| {
            for row in 0..100 {
                black_box(table.get_row(row));
            }
        });
    });
}

criterion_group!(
    benches,
    add_row_benchmark,
    set_key_values_benchmark,
    build_index_benchmark,
    find_benchmark,
    get_row_benchmark,
);
criterion_main!(benches);
