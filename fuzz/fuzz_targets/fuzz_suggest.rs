#![no_main]

use arbitrary::Arbitrary;
use dirsearch::index::{Entity, Index};
use dirsearch::query::{recompute, FilterState, SortKey};
use dirsearch::suggest::AutocompleteEngine;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    query: &'a str,
    category: &'a str,
    min_rating: &'a str,
    sort: &'a str,
}

fn index() -> Index {
    let entity = |name: &str, location: &str, category: &str, rating: Option<f64>| Entity {
        id: name.to_lowercase(),
        name: name.to_string(),
        entity_type: "business".to_string(),
        categories: vec![category.to_string()],
        location: Some(location.to_string()),
        rating,
        price_range: None,
        url: "/".to_string(),
        search_terms: vec![name.to_lowercase(), category.to_lowercase()],
    };

    Index {
        entities: vec![
            entity("Joe's Pizza Palace", "Springfield, IL", "Pizza", Some(4.5)),
            entity("Ørsted Café", "Århus, DK", "Cafés", None),
            entity("İstanbul Kebap", "Köln, DE", "Restaurants", Some(3.0)),
        ],
        categories: vec!["Cafés".into(), "Pizza".into(), "Restaurants".into()],
        locations: vec!["Köln, DE".into(), "Springfield, IL".into(), "Århus, DK".into()],
        entity_types: vec!["business".into()],
        ..Default::default()
    }
}

fuzz_target!(|input: Input| {
    // Case folding can change byte lengths; nothing here may panic
    let index = index();
    let suggestions = AutocompleteEngine::default().suggest(&index, input.query);
    assert!(suggestions.len() <= 8);

    let mut filters = FilterState::new();
    filters.set_query(input.query);
    filters.set_category(input.category);
    filters.set_min_rating_input(input.min_rating);
    let results = recompute(&index, &filters, SortKey::from_input(input.sort));
    assert!(results.len() <= index.len());
});
