//! Performance benchmarks for catalog search
//!
//! Measures cold searches, cache hits and category filtering over
//! generated catalogs.
//! Run with: cargo bench

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use libris::models::{Book, Category};
use libris::search::{SearchEngine, SearchFilters};

const CATEGORIES: [&str; 5] = ["fiction", "science", "history", "biography", "children"];

/// Generate a catalog with repeating authors and categories
fn generate_books(count: usize) -> Arc<Vec<Book>> {
    let books = (0..count)
        .map(|i| Book {
            id: i as i64 + 1,
            title: format!("Volume {} of the Long Voyage", i),
            author: format!("Author {}", i % 37),
            category: CATEGORIES[i % CATEGORIES.len()].to_string(),
            description: "A journey across distant seas and quiet libraries.".to_string(),
            rating: (i % 50) as f64 / 10.0,
            pages: 100 + (i % 400) as u32,
            ..Book::default()
        })
        .collect();
    Arc::new(books)
}

/// Benchmark searches with the cache cleared before every query
fn bench_search_uncached(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_uncached");

    for size in [100, 1_000, 10_000].iter() {
        let mut engine = SearchEngine::new(100, 100);
        engine.set_books(generate_books(*size));
        let filters = SearchFilters::default();
        group.throughput(Throughput::Elements(*size as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                engine.clear_cache();
                let outcome = engine.search(black_box("voyage author 3"), &filters);
                black_box(outcome.results.len())
            });
        });
    }

    group.finish();
}

/// Benchmark repeated queries served from the cache
fn bench_search_cached(c: &mut Criterion) {
    let mut engine = SearchEngine::new(100, 100);
    engine.set_books(generate_books(10_000));
    let filters = SearchFilters::default();
    engine.search("long voyage", &filters);

    c.bench_function("search_cached_10000", |b| {
        b.iter(|| {
            let outcome = engine.search(black_box("long voyage"), &filters);
            black_box(outcome.from_cache)
        });
    });
}

/// Benchmark an empty query under a category filter
fn bench_category_filter(c: &mut Criterion) {
    let mut engine = SearchEngine::new(100, 100);
    engine.set_books(generate_books(10_000));
    let filters = SearchFilters::category(Category::Science).with_min_rating(2.5);

    c.bench_function("category_filter_10000", |b| {
        b.iter(|| {
            engine.clear_cache();
            let outcome = engine.search(black_box(""), &filters);
            black_box(outcome.results.len())
        });
    });
}

criterion_group!(
    benches,
    bench_search_uncached,
    bench_search_cached,
    bench_category_filter
);
criterion_main!(benches);
