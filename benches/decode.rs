//! Benchmarks for in-place decoding and cache hits

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;
use resblob::{
    BlobImage, BlobWriter, FileId, LoadOptions, MemoryStore, RelArray, Resource, ResourceCache,
};
use std::sync::Arc;

struct Samples;

impl Resource for Samples {
    type Root<'a> = RelArray<'a, u64>;
}

fn array_blob(len: usize, checksum: bool) -> Vec<u8> {
    let mut writer = BlobWriter::new();
    let header = writer.reserve(8, 8);
    let base = writer.reserve(len * 8, 8);
    for i in 0..len {
        writer.put_u64(base + i * 8, i as u64 * 3).unwrap();
    }
    writer.put_array(header, base, len).unwrap();
    writer.set_root(header).unwrap();
    writer.finish(checksum).unwrap()
}

fn benchmark_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("blob_load");

    for size in [1_000, 100_000].iter() {
        let bytes = array_blob(*size, true);
        group.bench_with_input(BenchmarkId::new("checksum", size), &bytes, |b, bytes| {
            b.iter(|| BlobImage::load(black_box(bytes.as_slice())).unwrap());
        });

        let options = LoadOptions {
            verify_checksum: false,
            ..LoadOptions::default()
        };
        group.bench_with_input(BenchmarkId::new("header_only", size), &bytes, |b, bytes| {
            b.iter(|| BlobImage::load_with(black_box(bytes.as_slice()), &options).unwrap());
        });
    }

    group.finish();
}

fn benchmark_array_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("array_access");
    let image = BlobImage::load(array_blob(10_000, false)).unwrap();
    let array: RelArray<u64> = image.root().unwrap();

    group.bench_function("iterate", |b| {
        b.iter(|| {
            let sum: u64 = array.iter().map(|v| v.unwrap()).sum();
            black_box(sum)
        });
    });

    let mut rng = rand::thread_rng();
    let indices: Vec<usize> = (0..1_000).map(|_| rng.gen_range(0..array.len())).collect();
    group.bench_function("random_get", |b| {
        b.iter(|| {
            for &i in &indices {
                black_box(array.get(i).unwrap());
            }
        });
    });

    group.finish();
}

fn benchmark_cache_hit(c: &mut Criterion) {
    let store = Arc::new(MemoryStore::new());
    let id = FileId::new(0, 0);
    store.insert(id, array_blob(100, true));
    let cache = ResourceCache::new(store, LoadOptions::default());
    cache.resolve::<Samples>(id).unwrap();

    c.bench_function("cache_hit", |b| {
        b.iter(|| black_box(cache.resolve::<Samples>(black_box(id)).unwrap()));
    });
}

criterion_group!(
    benches,
    benchmark_load,
    benchmark_array_access,
    benchmark_cache_hit
);
criterion_main!(benches);
