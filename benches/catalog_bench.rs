//! Benchmarks for FolioDB catalog operations

use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use foliodb::{BookSpec, CatalogStore, Isbn};

/// A catalog of `n` books with varied ratings
fn populated_store(n: u64) -> CatalogStore {
    let store = CatalogStore::new();

    let specs: Vec<BookSpec> = (1..=n)
        .map(|isbn| BookSpec {
            isbn,
            title: format!("Book {}", isbn),
            author: format!("Author {}", isbn % 97),
            price: 9.99,
            num_copies: 100,
            editor_pick: isbn % 13 == 0,
        })
        .collect();
    store.add_books(&specs).unwrap();

    // Spread ratings so averages differ
    let ratings: HashMap<Isbn, i32> = (1..=n).map(|isbn| (isbn, (isbn % 6) as i32)).collect();
    store.rate_books(&ratings).unwrap();

    store
}

fn top_rated_benchmarks(c: &mut Criterion) {
    let store = populated_store(10_000);

    c.bench_function("top_rated_10_of_10k", |b| {
        b.iter(|| store.get_top_rated_books(black_box(10)).unwrap())
    });

    c.bench_function("top_rated_1k_of_10k", |b| {
        b.iter(|| store.get_top_rated_books(black_box(1000)).unwrap())
    });
}

fn batch_mutation_benchmarks(c: &mut Criterion) {
    let store = populated_store(10_000);

    let purchase: HashMap<Isbn, u32> = (1..=100u64).map(|isbn| (isbn, 1)).collect();
    let restock: HashMap<Isbn, u32> = purchase.clone();

    c.bench_function("buy_then_restock_100_of_10k", |b| {
        b.iter(|| {
            store.buy_books(black_box(&purchase)).unwrap();
            store.add_copies(black_box(&restock)).unwrap();
        })
    });

    let ratings: HashMap<Isbn, i32> = (1..=100u64).map(|isbn| (isbn, 4)).collect();
    c.bench_function("rate_100_of_10k", |b| {
        b.iter(|| store.rate_books(black_box(&ratings)).unwrap())
    });

    let specs: Vec<BookSpec> = (20_001..=20_100u64)
        .map(|isbn| BookSpec {
            isbn,
            title: format!("Book {}", isbn),
            author: "Author".to_string(),
            price: 9.99,
            num_copies: 1,
            editor_pick: false,
        })
        .collect();
    c.bench_function("add_100_books", |b| {
        b.iter_batched(
            || populated_store(1_000),
            |store| store.add_books(black_box(&specs)).unwrap(),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, top_rated_benchmarks, batch_mutation_benchmarks);
criterion_main!(benches);
