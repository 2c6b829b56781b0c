use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use piece_tree::PieceTable;
use std::hint::black_box;

fn lines_of(size: usize) -> String {
    "abcdefghijklmnopqrstuvwxyz\n".repeat(size / 27 + 1)
}

fn bench_creation(c: &mut Criterion) {
    let mut group = c.benchmark_group("creation");

    for size in [100, 1_000, 10_000, 100_000].iter() {
        let text = lines_of(*size);

        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::new("piece_table", size), size, |b, _| {
            b.iter(|| {
                let table = PieceTable::new(black_box(text.as_str()));
                black_box(table);
            })
        });

        group.bench_with_input(BenchmarkId::new("ropey", size), size, |b, _| {
            b.iter(|| {
                let ropey = ropey::Rope::from_str(black_box(text.as_str()));
                black_box(ropey)
            });
        });
    }
    group.finish();
}

fn bench_insert_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");

    for size in [1_000, 10_000, 100_000].iter() {
        let text = lines_of(*size);
        let len = text.len();
        let insert_text = "INSERTED";

        group.throughput(Throughput::Elements(1));

        for (name, at) in [("beginning", 0), ("middle", len / 2), ("end", len)] {
            group.bench_with_input(
                BenchmarkId::new(format!("piece_table_{name}"), size),
                size,
                |b, _| {
                    b.iter_batched(
                        || PieceTable::new(text.as_str()),
                        |mut table| {
                            table.insert(black_box(at), black_box(insert_text));
                            black_box(table);
                        },
                        criterion::BatchSize::SmallInput,
                    )
                },
            );

            group.bench_with_input(BenchmarkId::new(format!("ropey_{name}"), size), size, |b, _| {
                b.iter_batched(
                    || ropey::Rope::from(text.as_str()),
                    |mut ropey| {
                        ropey.insert(black_box(at), black_box(insert_text));
                        black_box(ropey);
                    },
                    criterion::BatchSize::SmallInput,
                )
            });

            group.bench_with_input(BenchmarkId::new(format!("string_{name}"), size), size, |b, _| {
                b.iter_batched(
                    || text.clone(),
                    |mut string| {
                        string.insert_str(black_box(at), black_box(insert_text));
                        black_box(string);
                    },
                    criterion::BatchSize::SmallInput,
                )
            });
        }
    }
    group.finish();
}

fn bench_delete_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("delete");

    for size in [1_000, 10_000, 100_000].iter() {
        let text = lines_of(*size);
        let len = text.len();
        let delete_size = len / 10;
        let start = len / 2 - delete_size / 2;

        group.throughput(Throughput::Elements(delete_size as u64));

        group.bench_with_input(BenchmarkId::new("piece_table_middle", size), size, |b, _| {
            b.iter_batched(
                || PieceTable::new(text.as_str()),
                |mut table| {
                    table.remove(black_box(start), black_box(delete_size));
                    black_box(table);
                },
                criterion::BatchSize::SmallInput,
            )
        });

        group.bench_with_input(BenchmarkId::new("ropey_middle", size), size, |b, _| {
            b.iter_batched(
                || ropey::Rope::from(text.as_str()),
                |mut ropey| {
                    ropey.remove(black_box(start..start + delete_size));
                    black_box(ropey);
                },
                criterion::BatchSize::SmallInput,
            )
        });

        group.bench_with_input(BenchmarkId::new("string_middle", size), size, |b, _| {
            b.iter_batched(
                || text.clone(),
                |mut string| {
                    string.replace_range(black_box(start..start + delete_size), "");
                    black_box(string);
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

// A burst of single-char edits, the way typing drives the buffer.
fn bench_typing(c: &mut Criterion) {
    let mut group = c.benchmark_group("typing");

    for size in [1_000, 10_000].iter() {
        let text = lines_of(*size);
        let at = text.len() / 2;

        group.throughput(Throughput::Elements(100));
        group.bench_with_input(BenchmarkId::new("piece_table", size), size, |b, _| {
            b.iter_batched(
                || PieceTable::new(text.as_str()),
                |mut table| {
                    for i in 0..100 {
                        table.insert(black_box(at + i), "x");
                    }
                    for _ in 0..10 {
                        table.remove(black_box(at), 1);
                    }
                    black_box(table);
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_line_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("line_access");

    for size in [10_000, 100_000].iter() {
        let mut table = PieceTable::new(lines_of(*size));
        for i in 0..50 {
            table.insert(i * 97, "edit\n");
        }
        let middle = table.line_count() / 2;

        group.bench_with_input(BenchmarkId::new("line", size), &table, |b, table| {
            b.iter(|| black_box(table.line(black_box(middle))))
        });

        group.bench_with_input(BenchmarkId::new("text", size), &table, |b, table| {
            b.iter(|| black_box(table.text()))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_creation,
    bench_insert_operations,
    bench_delete_operations,
    bench_typing,
    bench_line_access
);
criterion_main!(benches);
