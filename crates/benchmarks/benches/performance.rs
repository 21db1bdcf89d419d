use std::sync::Arc;

use coinlist_compat::import_coins_from_path;
use coinlist_core::filter::{FilterEngine, FilterState, FilterToggle};
use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use tempfile::NamedTempFile;

use coinlist_benchmarks::{
    datasets::{generate_coins, write_jsonl_dataset},
    harness::{ephemeral_with, measure_filter, measure_save, measure_search, LocalStack},
};

const DATASET_SIZES: [usize; 3] = [1_000, 10_000, 50_000];

fn bench_filter(c: &mut Criterion) {
    let states = [
        ("none", FilterState::default()),
        ("active", FilterState::from_toggles([FilterToggle::ActiveCoins])),
        (
            "all_toggles",
            FilterState::from_toggles([
                FilterToggle::ActiveCoins,
                FilterToggle::InactiveCoins,
                FilterToggle::OnlyTokens,
                FilterToggle::NewCoins,
            ]),
        ),
    ];
    let mut group = c.benchmark_group("apply_filters");
    for &size in &DATASET_SIZES {
        let dataset = generate_coins(size, size as u64);
        group.throughput(Throughput::Elements(size as u64));
        for (label, state) in &states {
            let mut engine = FilterEngine::with_records(dataset.clone());
            group.bench_with_input(BenchmarkId::new(*label, size), state, |b, state| {
                b.iter(|| black_box(measure_filter(&mut engine, state)));
            });
        }
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let state = FilterState::from_toggles([FilterToggle::ActiveCoins]);
    let mut group = c.benchmark_group("search");
    for &size in &DATASET_SIZES {
        let dataset = generate_coins(size, (size as u64) + 11);
        group.throughput(Throughput::Elements(size as u64));
        let mut engine = FilterEngine::with_records(dataset);
        group.bench_with_input(BenchmarkId::from_parameter(size), &state, |b, state| {
            b.iter(|| black_box(measure_search(&mut engine, state, "coin 0")));
        });
    }
    group.finish();
}

fn bench_save(c: &mut Criterion) {
    let mut group = c.benchmark_group("save");
    for &size in &DATASET_SIZES {
        let dataset = Arc::new(generate_coins(size, (size as u64) + 1));
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("ephemeral", size), &dataset, |b, coins| {
            b.iter_batched(
                || ephemeral_with(&[]),
                |store| measure_save(&store, coins),
                BatchSize::LargeInput,
            );
        });
        group.bench_with_input(BenchmarkId::new("local", size), &dataset, |b, coins| {
            b.iter_batched(
                LocalStack::new,
                |stack| measure_save(&stack.storage, coins),
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_import(c: &mut Criterion) {
    let mut group = c.benchmark_group("import_local");
    for &size in &DATASET_SIZES {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(size),
            &size,
            |b, &input_size| {
                b.iter_batched(
                    || setup_import_case(input_size),
                    |(stack, dataset_file)| {
                        let imported =
                            import_coins_from_path(dataset_file.path()).expect("import dataset");
                        measure_save(&stack.storage, &imported);
                    },
                    BatchSize::LargeInput,
                );
            },
        );
    }
    group.finish();
}

fn setup_import_case(size: usize) -> (LocalStack, NamedTempFile) {
    let dataset = generate_coins(size, (size as u64) + 29);
    let stack = LocalStack::new();
    let file = write_jsonl_dataset(&dataset);
    (stack, file)
}

fn benches(c: &mut Criterion) {
    bench_filter(c);
    bench_search(c);
    bench_save(c);
    bench_import(c);
}

criterion_group!(coinlist_benches, benches);
criterion_main!(coinlist_benches);
