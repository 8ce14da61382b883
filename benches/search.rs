//! Performance benchmarks for recompute and suggest
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dirsearch::index::{Entity, Index};
use dirsearch::query::{facet_counts, recompute, FilterState, SortKey};
use dirsearch::suggest::AutocompleteEngine;

const CATEGORIES: [&str; 8] = [
    "Restaurants", "Pizza", "Italian", "Garden Centers", "Nurseries", "Museums", "Parks", "Hardware",
];
const CITIES: [&str; 6] = [
    "Springfield, IL", "Madison, WI", "Portland, OR", "Austin, TX", "Denver, CO", "Albany, NY",
];
const TYPES: [&str; 3] = ["business", "attraction", "place"];

/// Synthetic directory with `n` entities spread over the facet values
fn synthetic_index(n: usize) -> Index {
    let entities = (0..n)
        .map(|i| {
            let name = format!("Listing {} {}", i, CATEGORIES[i % CATEGORIES.len()]);
            let categories = vec![
                CATEGORIES[i % CATEGORIES.len()].to_string(),
                CATEGORIES[(i / 3) % CATEGORIES.len()].to_string(),
            ];
            let location = CITIES[i % CITIES.len()].to_string();
            let entity_type = TYPES[i % TYPES.len()].to_string();

            let mut search_terms = vec![name.to_lowercase(), location.to_lowercase(), entity_type.clone()];
            search_terms.extend(categories.iter().map(|c| c.to_lowercase()));

            Entity {
                id: format!("listing-{}", i),
                name,
                entity_type,
                categories,
                location: (i % 17 != 0).then_some(location),
                rating: (i % 5 != 0).then(|| (i % 50) as f64 / 10.0),
                price_range: None,
                url: format!("/directory/listing-{}/", i),
                search_terms,
            }
        })
        .collect();

    Index {
        entities,
        categories: CATEGORIES.iter().map(|s| s.to_string()).collect(),
        locations: CITIES.iter().map(|s| s.to_string()).collect(),
        entity_types: TYPES.iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    }
}

fn bench_recompute(c: &mut Criterion) {
    let index = synthetic_index(5_000);
    let mut group = c.benchmark_group("recompute");

    let mut by_query = FilterState::new();
    by_query.set_query("pizza");

    let mut faceted = FilterState::new();
    faceted.set_category("Italian");
    faceted.set_location("Madison, WI");
    faceted.set_min_rating(Some(2.5));

    for (name, filters) in [
        ("unconstrained", FilterState::new()),
        ("query", by_query),
        ("facets", faceted),
    ] {
        for sort in SortKey::ALL {
            group.bench_with_input(
                BenchmarkId::new(name, sort.as_str()),
                &filters,
                |b, filters| b.iter(|| recompute(black_box(&index), black_box(filters), sort)),
            );
        }
    }

    group.finish();
}

fn bench_suggest(c: &mut Criterion) {
    let index = synthetic_index(5_000);
    let engine = AutocompleteEngine::default();
    let mut group = c.benchmark_group("suggest");

    for query in ["pi", "pizza", "springfield", "nomatch"] {
        group.bench_with_input(BenchmarkId::from_parameter(query), &query, |b, query| {
            b.iter(|| engine.suggest(black_box(&index), black_box(query)))
        });
    }

    group.finish();
}

fn bench_facet_counts(c: &mut Criterion) {
    let index = synthetic_index(5_000);
    let all = recompute(&index, &FilterState::new(), SortKey::Name);

    c.bench_function("facet_counts", |b| {
        b.iter(|| facet_counts(black_box(&index), all.iter().copied()))
    });
}

criterion_group!(benches, bench_recompute, bench_suggest, bench_facet_counts);
criterion_main!(benches);
