//! Criterion micro-benchmarks for the byte-level array and allocation
//! accounting overhead.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use vasa::{ArrayConfig, ByteArray, DynamicArray};
use vasa_test_utils::CountingAlloc;

/// Benchmark: append 4096 elements of varying size through `ByteArray`.
fn bench_byte_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("byte_append_4096");
    for size in [4usize, 16, 64] {
        let item = vec![0x5Au8; size];
        group.bench_with_input(BenchmarkId::from_parameter(size), &item, |b, item| {
            b.iter(|| {
                let mut arr = ByteArray::new(item.len()).unwrap();
                for _ in 0..4096 {
                    arr.append(item).unwrap();
                }
                black_box(arr.len());
            });
        });
    }
    group.finish();
}

/// Benchmark: copy every element out of a full 16-byte `ByteArray`.
fn bench_byte_copy_out(c: &mut Criterion) {
    let mut arr = ByteArray::new(16).unwrap();
    for i in 0..4096u32 {
        let mut item = [0u8; 16];
        item[..4].copy_from_slice(&i.to_ne_bytes());
        arr.append(&item).unwrap();
    }
    c.bench_function("byte_copy_out_4096", |b| {
        let mut out = [0u8; 16];
        b.iter(|| {
            for i in 0..arr.len() {
                arr.copy_into(i, &mut out).unwrap();
                black_box(&out);
            }
        });
    });
}

/// Benchmark: typed append through a counting allocator, to expose the
/// cost of a non-system strategy.
fn bench_counting_alloc(c: &mut Criterion) {
    let counting = CountingAlloc::new();
    c.bench_function("append_4096_counting_alloc", |b| {
        b.iter(|| {
            let mut arr =
                DynamicArray::<u64, _>::with_config_in(ArrayConfig::default(), &counting).unwrap();
            for v in 0..4096u64 {
                arr.append(v).unwrap();
            }
            black_box(arr.len());
        });
    });
}

criterion_group!(
    benches,
    bench_byte_append,
    bench_byte_copy_out,
    bench_counting_alloc
);
criterion_main!(benches);
