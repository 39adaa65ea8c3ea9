use std::io::Cursor;

use assetbridge_core::{AssetMaterializer, ContentReader, resolve_extension};
use assetbridge_vfs::MemoryProvider;
use criterion::{Criterion, black_box, criterion_group, criterion_main};

// ---------------------------------------------------------------------------
// Stream draining
// ---------------------------------------------------------------------------

fn bench_drain_small(c: &mut Criterion) {
    let data = vec![0x5au8; 4 * 1024];
    let reader = ContentReader::default();
    c.bench_function("drain_4kib", |b| {
        b.iter(|| reader.drain(Cursor::new(black_box(data.as_slice()))));
    });
}

fn bench_drain_large(c: &mut Criterion) {
    let data = vec![0x5au8; 8 * 1024 * 1024];
    let reader = ContentReader::default();
    c.bench_function("drain_8mib", |b| {
        b.iter(|| reader.drain(Cursor::new(black_box(data.as_slice()))));
    });
}

fn bench_drain_large_small_chunks(c: &mut Criterion) {
    let data = vec![0x5au8; 8 * 1024 * 1024];
    let reader = ContentReader::new(512);
    c.bench_function("drain_8mib_512b_chunks", |b| {
        b.iter(|| reader.drain(Cursor::new(black_box(data.as_slice()))));
    });
}

// ---------------------------------------------------------------------------
// Extension resolution
// ---------------------------------------------------------------------------

fn bench_resolve_extension(c: &mut Criterion) {
    c.bench_function("resolve_extension_content_uri", |b| {
        b.iter(|| {
            resolve_extension(black_box(
                "content://com.android.providers.downloads.documents/document/My%20Scene.OBJ?x=1",
            ))
        });
    });
}

// ---------------------------------------------------------------------------
// Materialization
// ---------------------------------------------------------------------------

fn bench_materialize_tree(c: &mut Criterion) {
    let bundle = MemoryProvider::new();
    for dir in 0..8 {
        for file in 0..16 {
            bundle.insert(format!("models/set{dir}/mesh{file}.obj"), vec![b'v'; 2048]);
        }
    }
    c.bench_function("materialize_128_files", |b| {
        b.iter(|| {
            let storage = MemoryProvider::new();
            black_box(AssetMaterializer::new(&bundle, &storage).run_blocking())
        });
    });
}

criterion_group!(
    benches,
    bench_drain_small,
    bench_drain_large,
    bench_drain_large_small_chunks,
    bench_resolve_extension,
    bench_materialize_tree,
);
criterion_main!(benches);
