use crate::index::types::{Entity, Index};
use crate::query::filter::{FilterState, SortKey};
use rustc_hash::FxHashMap;
use std::cmp::Ordering;

/// Filters and orders the index for a set of facet selections.
///
/// Recompute is pure: it never mutates the index or the filters, and the
/// same inputs always give the same ordered output.
pub struct SearchEngine<'a> {
    index: &'a Index,
}

impl<'a> SearchEngine<'a> {
    pub fn new(index: &'a Index) -> Self {
        Self { index }
    }

    /// Filter in index order, then stable-sort by `sort`
    pub fn recompute(&self, filters: &FilterState, sort: SortKey) -> Vec<&'a Entity> {
        let matcher = EntityMatcher::new(filters);

        let mut results: Vec<&'a Entity> = self
            .index
            .entities
            .iter()
            .filter(|entity| matcher.matches(entity))
            .collect();

        sort_results(&mut results, sort);
        results
    }

    /// Per-value facet counts over a result set
    pub fn facet_counts(&self, results: &[&Entity]) -> FacetCounts {
        facet_counts(self.index, results.iter().copied())
    }
}

/// Convenience wrapper around [`SearchEngine::recompute`]
pub fn recompute<'a>(index: &'a Index, filters: &FilterState, sort: SortKey) -> Vec<&'a Entity> {
    SearchEngine::new(index).recompute(filters, sort)
}

/// Whether a single entity passes every active constraint
pub fn matches(entity: &Entity, filters: &FilterState) -> bool {
    EntityMatcher::new(filters).matches(entity)
}

/// Filters with the query lower-cased once up front
struct EntityMatcher<'f> {
    query: String,
    filters: &'f FilterState,
}

impl<'f> EntityMatcher<'f> {
    fn new(filters: &'f FilterState) -> Self {
        Self {
            query: filters.query.to_lowercase(),
            filters,
        }
    }

    fn matches(&self, entity: &Entity) -> bool {
        // Text: substring of any precomputed term
        if !self.query.is_empty()
            && !entity
                .search_terms
                .iter()
                .any(|term| term.contains(self.query.as_str()))
        {
            return false;
        }

        if !self.filters.category.is_empty() && !entity.has_category(&self.filters.category) {
            return false;
        }

        if !self.filters.location.is_empty()
            && entity.location.as_deref() != Some(self.filters.location.as_str())
        {
            return false;
        }

        if !self.filters.entity_type.is_empty() && entity.entity_type != self.filters.entity_type {
            return false;
        }

        if let Some(min) = self.filters.min_rating {
            if entity.effective_rating() < min {
                return false;
            }
        }

        true
    }
}

/// Stable sort; equal keys keep index order
fn sort_results(results: &mut [&Entity], sort: SortKey) {
    match sort {
        SortKey::Name => {
            results.sort_by(|a, b| collate(&a.name, &b.name));
        }
        SortKey::Rating => {
            results.sort_by(|a, b| b.effective_rating().total_cmp(&a.effective_rating()));
        }
        SortKey::Location => {
            results.sort_by(|a, b| collate(a.location_or_empty(), b.location_or_empty()));
        }
    }
}

/// Case-folded ordering, with the raw strings breaking case-only ties
pub fn collate(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| a.cmp(b))
}

/// Count of results carrying one facet value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetCount {
    pub value: String,
    pub count: usize,
}

/// Facet value counts for a result set, in index facet order.
/// Values with no matching result are left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetCounts {
    pub categories: Vec<FacetCount>,
    pub locations: Vec<FacetCount>,
    pub entity_types: Vec<FacetCount>,
}

pub fn facet_counts<'a>(index: &Index, results: impl IntoIterator<Item = &'a Entity>) -> FacetCounts {
    let mut categories: FxHashMap<&str, usize> = FxHashMap::default();
    let mut locations: FxHashMap<&str, usize> = FxHashMap::default();
    let mut types: FxHashMap<&str, usize> = FxHashMap::default();

    for entity in results {
        for category in &entity.categories {
            *categories.entry(category.as_str()).or_default() += 1;
        }
        if let Some(location) = entity.location.as_deref() {
            *locations.entry(location).or_default() += 1;
        }
        *types.entry(entity.entity_type.as_str()).or_default() += 1;
    }

    FacetCounts {
        categories: ordered_counts(&index.categories, &categories),
        locations: ordered_counts(&index.locations, &locations),
        entity_types: ordered_counts(&index.entity_types, &types),
    }
}

fn ordered_counts(order: &[String], counts: &FxHashMap<&str, usize>) -> Vec<FacetCount> {
    order
        .iter()
        .filter_map(|value| {
            counts.get(value.as_str()).map(|&count| FacetCount {
                value: value.clone(),
                count,
            })
        })
        .collect()
}
