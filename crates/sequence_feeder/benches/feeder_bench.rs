use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sequence_feeder::{EncodedColumn, SequenceBatcher};

/// Benchmarks for lane-matrix construction and window iteration.
///
/// This measures:
/// 1. Construction: flatten + truncate + reshape cost per corpus size
/// 2. Iteration: the per-step cost of the lazy window traversal

/// All benchmarks sweep corpus sizes from 10K to 10M tokens.
const SIZES: [usize; 4] = [10_000, 100_000, 1_000_000, 10_000_000];

const BATCH_SIZE: usize = 32;
const SEQUENCE_LENGTH: usize = 64;

/// Helper function to build a column of the given token count.
fn make_column(total_tokens: usize) -> EncodedColumn {
    EncodedColumn::from_flat((0..total_tokens as i64).collect())
}

/// Measure lane-matrix construction cost.
fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("Lane Matrix Construction");

    for &size in &SIZES {
        let column = make_column(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &column, |b, column| {
            b.iter(|| SequenceBatcher::new(black_box(column), BATCH_SIZE).unwrap());
        });
    }
    group.finish();
}

/// Measure the cost of a full single-epoch window traversal.
fn bench_window_iteration(c: &mut Criterion) {
    let mut group = c.benchmark_group("Window Iteration");

    for &size in &SIZES {
        let column = make_column(size);
        let batcher = SequenceBatcher::new(&column, BATCH_SIZE).unwrap();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &batcher, |b, batcher| {
            b.iter(|| {
                let windows = batcher.produce(SEQUENCE_LENGTH, 1, true).unwrap();
                black_box(windows.count())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_construction, bench_window_iteration);
criterion_main!(benches);
