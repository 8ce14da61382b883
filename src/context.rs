//! The directory session: one instance of each engine component, wired together.
//!
//! A `DirectoryContext` is built once at startup and handed to whatever drives
//! it (the CLI, the TUI, tests). Every user-facing event goes through one of
//! its methods; there is no global state.

use crate::error::{EngineError, LoadFailure, Result};
use crate::index::store::{IndexSource, IndexStore, LoadState};
use crate::index::types::{Entity, Index};
use crate::output::{ResultPresenter, ResultsView, SafeHtml, SuggestionRow};
use crate::query::executor::{facet_counts, FacetCounts, SearchEngine};
use crate::query::filter::{FilterState, SortKey};
use crate::storage::kv::KeyValueStore;
use crate::storage::saved::{SaveOutcome, SavedSearch, SavedSearchStore};
use crate::suggest::engine::{AutocompleteEngine, Commit, Suggestion};
use crate::suggest::nav::{NavEvent, SuggestionNav};
use crate::utils::app_data::EngineConfig;
use crate::utils::debouncer::CancellableTimer;
use std::time::Instant;
use tracing::debug;

/// Work deferred until typing goes quiet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    /// Recompute against whatever the filters are when the timer fires
    Recompute,
}

pub struct DirectoryContext<S: KeyValueStore> {
    config: EngineConfig,
    store: IndexStore,
    filters: FilterState,
    sort: SortKey,
    /// Owned copy of the last recompute, so the context never borrows itself
    results: Vec<Entity>,
    autocomplete: AutocompleteEngine,
    nav: SuggestionNav,
    debounce: CancellableTimer<Deferred>,
    saved: SavedSearchStore<S>,
    history: Vec<SavedSearch>,
}

impl<S: KeyValueStore> DirectoryContext<S> {
    /// Create a session. Saved searches are read here, once.
    pub fn new(config: EngineConfig, backend: S) -> Self {
        let autocomplete = AutocompleteEngine::new(
            config.suggestion_limit,
            config.min_suggestion_chars,
            config.dedupe_suggestions,
        );
        let saved = SavedSearchStore::with_limit(backend, config.saved_search_limit);
        let history = saved.load();

        Self {
            config,
            store: IndexStore::new(),
            filters: FilterState::new(),
            sort: SortKey::default(),
            results: Vec::new(),
            autocomplete,
            nav: SuggestionNav::new(),
            debounce: CancellableTimer::new(),
            saved,
            history,
        }
    }

    /// Create a session over an already-decoded index
    pub fn with_index(config: EngineConfig, backend: S, index: Index) -> Self {
        let mut ctx = Self::new(config, backend);
        ctx.store = IndexStore::with_index(index);
        // Cannot fail: the store is ready
        let _ = ctx.recompute();
        ctx
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ---- index lifecycle ----

    /// Fetch the index synchronously and show the unfiltered result set
    pub fn load_index(&mut self, source: &dyn IndexSource) -> Result<usize> {
        self.store.load(source)?;
        self.recompute()
    }

    /// Mark the load as started; the fetch itself may run elsewhere
    pub fn begin_index_load(&mut self) -> Result<()> {
        self.store.begin()
    }

    /// Hand over the fetched index (or the failure) and recompute
    pub fn finish_index_load(
        &mut self,
        result: std::result::Result<Index, LoadFailure>,
    ) -> Result<usize> {
        self.store.finish(result)?;
        self.recompute()
    }

    pub fn index(&self) -> Result<&Index> {
        self.store.get()
    }

    pub fn index_state(&self) -> &LoadState {
        self.store.state()
    }

    // ---- free-text input ----

    /// A keystroke in the query box.
    ///
    /// The query is stored immediately and a recompute is scheduled for the end
    /// of the quiet window. Suggestions are refreshed right away.
    pub fn type_query(&mut self, text: &str, now: Instant) {
        self.filters.set_query(text);
        self.debounce
            .schedule_at(now, self.config.debounce(), Deferred::Recompute);
        self.refresh_suggestions();
    }

    /// Replace the query and recompute now, superseding any pending recompute
    pub fn submit_query(&mut self, text: &str) -> Result<usize> {
        self.filters.set_query(text);
        self.debounce.cancel();
        self.nav.close();
        self.recompute()
    }

    /// Run deferred work that is due. Returns true if results were recomputed.
    ///
    /// A recompute that fires before the index is ready is dropped; finishing
    /// the load recomputes with the filters current at that point.
    pub fn poll(&mut self, now: Instant) -> Result<bool> {
        match self.debounce.poll_at(now) {
            Some(Deferred::Recompute) if self.store.is_ready() => {
                self.recompute()?;
                Ok(true)
            }
            Some(Deferred::Recompute) => {
                debug!("debounced recompute dropped, index not ready");
                Ok(false)
            }
            None => Ok(false),
        }
    }

    pub fn has_pending_recompute(&self) -> bool {
        self.debounce.is_pending()
    }

    pub fn time_until_recompute(&self, now: Instant) -> Option<std::time::Duration> {
        self.debounce.time_until_ready_at(now)
    }

    fn refresh_suggestions(&mut self) {
        let suggestions = match self.store.get() {
            Ok(index) => self.autocomplete.suggest(index, &self.filters.query),
            Err(_) => Vec::new(),
        };
        self.nav.replace(suggestions);
    }

    /// Suggestions for arbitrary input, without touching session state
    pub fn suggest(&self, raw_query: &str) -> Result<Vec<Suggestion>> {
        Ok(self.autocomplete.suggest(self.store.get()?, raw_query))
    }

    // ---- facet controls (synchronous) ----

    pub fn set_category(&mut self, category: &str) -> Result<usize> {
        self.filters.set_category(category);
        self.recompute()
    }

    pub fn set_location(&mut self, location: &str) -> Result<usize> {
        self.filters.set_location(location);
        self.recompute()
    }

    pub fn set_entity_type(&mut self, entity_type: &str) -> Result<usize> {
        self.filters.set_entity_type(entity_type);
        self.recompute()
    }

    pub fn set_min_rating(&mut self, min_rating: Option<f64>) -> Result<usize> {
        self.filters.set_min_rating(min_rating);
        self.recompute()
    }

    /// Rating control value as typed; unusable input means "no constraint"
    pub fn set_min_rating_input(&mut self, input: &str) -> Result<usize> {
        self.filters.set_min_rating_input(input);
        self.recompute()
    }

    pub fn set_sort(&mut self, sort: SortKey) -> Result<usize> {
        self.sort = sort;
        self.recompute()
    }

    /// Sort control value as typed; unknown keys fall back to name
    pub fn set_sort_input(&mut self, input: &str) -> Result<usize> {
        self.set_sort(SortKey::from_input(input))
    }

    /// Clear category, location, type and rating; the query stays
    pub fn clear_facets(&mut self) -> Result<usize> {
        self.filters.clear_facets();
        self.recompute()
    }

    // ---- suggestion dropdown ----

    /// Feed a dropdown event. A picked suggestion is committed immediately.
    pub fn handle_nav(&mut self, event: NavEvent) -> Result<Option<Commit>> {
        match self.nav.handle(event) {
            Some(picked) => {
                self.commit(&picked.commit)?;
                Ok(Some(picked.commit))
            }
            None => Ok(None),
        }
    }

    /// Apply a suggestion's state change and recompute synchronously
    pub fn commit(&mut self, commit: &Commit) -> Result<usize> {
        self.filters.apply(commit);
        // The synchronous recompute supersedes any pending one
        self.debounce.cancel();
        self.nav.close();
        self.recompute()
    }

    pub fn nav(&self) -> &SuggestionNav {
        &self.nav
    }

    pub fn suggestion_rows(&self) -> Vec<SuggestionRow> {
        SuggestionRow::from_nav(&self.nav)
    }

    // ---- results ----

    /// Recompute the result set from the current filters and sort
    pub fn recompute(&mut self) -> Result<usize> {
        let index = self.store.get()?;
        let matched = SearchEngine::new(index).recompute(&self.filters, self.sort);
        self.results = matched.into_iter().cloned().collect();
        debug!(
            "recomputed {} results (query {:?}, sort {})",
            self.results.len(),
            self.filters.query,
            self.sort
        );
        Ok(self.results.len())
    }

    pub fn results(&self) -> &[Entity] {
        &self.results
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn facet_counts(&self) -> Result<FacetCounts> {
        Ok(facet_counts(self.store.get()?, &self.results))
    }

    pub fn results_view(&self) -> ResultsView {
        ResultsView::from_entities(&self.results)
    }

    /// Push the current state to a presenter. A failed load is shown as an error.
    pub fn present(&self, presenter: &mut dyn ResultPresenter) {
        match self.store.get() {
            Ok(_) => {
                presenter.show_results(&self.results_view());
                presenter.show_suggestions(&self.suggestion_rows());
            }
            Err(EngineError::NotReady) => {}
            Err(e) => presenter.show_error(&SafeHtml::escape(&e.to_string())),
        }
    }

    // ---- saved searches ----

    /// Save the current query and filters
    pub fn save_search(&mut self) -> SaveOutcome {
        let outcome = self.saved.save(&self.filters.query, &self.filters);
        if matches!(outcome, SaveOutcome::Saved { .. }) {
            self.history = self.saved.load();
        }
        outcome
    }

    /// History as read at startup, refreshed after each successful save
    pub fn saved_searches(&self) -> &[SavedSearch] {
        &self.history
    }

    /// Restore a saved search's query and filters
    pub fn apply_saved(&mut self, saved: &SavedSearch) -> Result<usize> {
        self.filters = saved.filters.clone();
        self.filters.set_query(&saved.query);
        self.debounce.cancel();
        self.nav.close();
        self.recompute()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::store::MemorySource;
    use crate::storage::kv::MemoryStore;
    use crate::suggest::engine::SuggestionKind;
    use std::time::Duration;

    const INDEX: &str = r#"{
        "entities": [
            {"id": "joes-pizza-palace", "name": "Joe's Pizza Palace", "type": "business",
             "categories": ["Restaurants", "Pizza", "Italian"], "location": "Springfield, IL",
             "rating": 4.5, "url": "/directory/joes-pizza-palace/",
             "search_terms": ["joe's pizza palace", "restaurants", "pizza", "italian", "springfield, il"]},
            {"id": "green-thumb-garden-center", "name": "Green Thumb Garden Center", "type": "business",
             "categories": ["Garden Centers", "Nurseries", "Landscaping"], "location": "Springfield, IL",
             "rating": 4.8, "url": "/directory/green-thumb-garden-center/",
             "search_terms": ["green thumb garden center", "garden centers", "nurseries", "landscaping", "springfield, il"]}
        ],
        "categories": ["Garden Centers", "Italian", "Landscaping", "Nurseries", "Pizza", "Restaurants"],
        "locations": ["Springfield, IL"],
        "entity_types": ["business"]
    }"#;

    fn loaded() -> DirectoryContext<MemoryStore> {
        let mut ctx = DirectoryContext::new(EngineConfig::default(), MemoryStore::new());
        ctx.load_index(&MemorySource::new(INDEX)).unwrap();
        ctx
    }

    fn names<S: KeyValueStore>(ctx: &DirectoryContext<S>) -> Vec<&str> {
        ctx.results().iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_not_ready_before_load() {
        let mut ctx = DirectoryContext::new(EngineConfig::default(), MemoryStore::new());
        assert_eq!(ctx.recompute(), Err(EngineError::NotReady));
        assert_eq!(ctx.suggest("pizza").unwrap_err(), EngineError::NotReady);
        assert!(ctx.results().is_empty());
    }

    #[test]
    fn test_load_shows_everything_sorted_by_name() {
        let ctx = loaded();
        assert_eq!(names(&ctx), vec!["Green Thumb Garden Center", "Joe's Pizza Palace"]);
    }

    #[test]
    fn test_second_load_is_rejected() {
        let mut ctx = loaded();
        assert_eq!(
            ctx.load_index(&MemorySource::new(INDEX)),
            Err(EngineError::AlreadyLoaded)
        );
    }

    #[test]
    fn test_split_load() {
        let mut ctx = DirectoryContext::new(EngineConfig::default(), MemoryStore::new());
        ctx.begin_index_load().unwrap();
        assert!(matches!(ctx.index_state(), LoadState::Loading));
        let count = ctx
            .finish_index_load(Index::from_json(INDEX.as_bytes()))
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_typing_is_debounced() {
        let mut ctx = loaded();
        let start = Instant::now();

        ctx.type_query("gr", start);
        ctx.type_query("green", start + Duration::from_millis(100));
        assert_eq!(ctx.filters().query, "green");
        // Results unchanged until the window elapses
        assert_eq!(ctx.results().len(), 2);
        assert!(!ctx.poll(start + Duration::from_millis(399)).unwrap());

        assert!(ctx.poll(start + Duration::from_millis(400)).unwrap());
        assert_eq!(names(&ctx), vec!["Green Thumb Garden Center"]);
        assert!(!ctx.poll(start + Duration::from_millis(800)).unwrap());
    }

    #[test]
    fn test_submit_query_skips_debounce() {
        let mut ctx = loaded();
        ctx.type_query("gre", Instant::now());
        assert_eq!(ctx.submit_query("green").unwrap(), 1);
        assert!(!ctx.has_pending_recompute());
        assert!(!ctx.nav().is_open());
    }

    #[test]
    fn test_typing_refreshes_suggestions_immediately() {
        let mut ctx = loaded();
        ctx.type_query("spring", Instant::now());
        let items = ctx.nav().items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, SuggestionKind::Location);

        ctx.type_query("s", Instant::now());
        assert!(!ctx.nav().is_open());
    }

    #[test]
    fn test_facet_changes_recompute_synchronously() {
        let mut ctx = loaded();
        assert_eq!(ctx.set_category("Restaurants").unwrap(), 1);
        assert_eq!(names(&ctx), vec!["Joe's Pizza Palace"]);

        ctx.clear_facets().unwrap();
        assert_eq!(ctx.set_min_rating_input("4.6").unwrap(), 1);
        assert_eq!(names(&ctx), vec!["Green Thumb Garden Center"]);

        // Unusable rating input is no constraint
        assert_eq!(ctx.set_min_rating_input("abc").unwrap(), 2);
    }

    #[test]
    fn test_sort_input() {
        let mut ctx = loaded();
        ctx.set_sort_input("rating").unwrap();
        assert_eq!(ctx.sort(), SortKey::Rating);
        assert_eq!(names(&ctx), vec!["Green Thumb Garden Center", "Joe's Pizza Palace"]);

        ctx.set_sort_input("bogus").unwrap();
        assert_eq!(ctx.sort(), SortKey::Name);
    }

    #[test]
    fn test_commit_location_suggestion() {
        let mut ctx = loaded();
        let start = Instant::now();
        ctx.type_query("spring", start);
        ctx.handle_nav(NavEvent::ArrowDown).unwrap();

        let commit = ctx.handle_nav(NavEvent::Enter).unwrap();
        assert_eq!(commit, Some(Commit::Location("Springfield, IL".to_string())));
        assert_eq!(ctx.filters().location, "Springfield, IL");
        assert_eq!(ctx.filters().query, "");
        assert!(!ctx.nav().is_open());
        assert_eq!(ctx.results().len(), 2);

        // The debounced recompute from typing was superseded
        assert!(!ctx.has_pending_recompute());
        assert!(!ctx.poll(start + Duration::from_secs(1)).unwrap());
    }

    #[test]
    fn test_commit_entity_suggestion_keeps_facets() {
        let mut ctx = loaded();
        ctx.set_entity_type("business").unwrap();
        ctx.type_query("joe", Instant::now());
        ctx.handle_nav(NavEvent::Hover(0)).unwrap();
        ctx.handle_nav(NavEvent::Enter).unwrap();

        assert_eq!(ctx.filters().query, "Joe's Pizza Palace");
        assert_eq!(ctx.filters().entity_type, "business");
        assert_eq!(names(&ctx), vec!["Joe's Pizza Palace"]);
    }

    #[test]
    fn test_save_search_updates_history() {
        let mut ctx = loaded();
        assert_eq!(ctx.save_search(), SaveOutcome::SkippedEmptyQuery);

        ctx.type_query("pizza", Instant::now());
        ctx.set_category("Restaurants").unwrap();
        assert_eq!(ctx.save_search(), SaveOutcome::Saved { len: 1 });

        let saved = ctx.saved_searches()[0].clone();
        assert_eq!(saved.query, "pizza");
        assert_eq!(saved.filters.category, "Restaurants");

        ctx.clear_facets().unwrap();
        ctx.apply_saved(&saved).unwrap();
        assert_eq!(ctx.filters().category, "Restaurants");
        assert_eq!(names(&ctx), vec!["Joe's Pizza Palace"]);
    }

    #[test]
    fn test_history_read_at_startup() {
        let mut backend = MemoryStore::new();
        {
            let mut store = SavedSearchStore::new(&mut backend);
            store.save_at("garden", &FilterState::new(), 7);
        }
        let ctx = DirectoryContext::new(EngineConfig::default(), backend);
        assert_eq!(ctx.saved_searches().len(), 1);
        assert_eq!(ctx.saved_searches()[0].timestamp, 7);
    }

    #[test]
    fn test_present_failure_as_error() {
        let mut ctx = DirectoryContext::new(EngineConfig::default(), MemoryStore::new());
        let _ = ctx.load_index(&MemorySource::new("<html>"));

        let mut presenter = crate::output::HtmlPresenter::new();
        ctx.present(&mut presenter);
        assert!(presenter.html().contains("error-state"));
        assert!(!presenter.html().contains("<html>"));
    }

    #[test]
    fn test_present_results() {
        let ctx = loaded();
        let mut presenter = crate::output::HtmlPresenter::new();
        ctx.present(&mut presenter);
        assert!(presenter.html().contains("2 results"));
        assert!(presenter.html().contains("Joe&#39;s Pizza Palace"));
    }

    #[test]
    fn test_facet_counts_follow_results() {
        let mut ctx = loaded();
        ctx.set_category("Pizza").unwrap();
        let counts = ctx.facet_counts().unwrap();
        assert_eq!(counts.locations[0].value, "Springfield, IL");
        assert_eq!(counts.locations[0].count, 1);
    }
}
