use crate::context::DirectoryContext;
use crate::error::LoadFailure;
use crate::index::store::{fetch_index, source_for, LoadState};
use crate::index::types::{Entity, Index};
use crate::storage::kv::KeyValueStore;
use crate::storage::saved::SaveOutcome;
use crate::suggest::nav::NavEvent;
use anyhow::Result;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::warn;

/// Minimum-rating presets cycled with Ctrl+T
const RATING_STEPS: [Option<f64>; 4] = [None, Some(3.0), Some(4.0), Some(4.5)];

/// Application state
pub struct App<S: KeyValueStore> {
    ctx: DirectoryContext<S>,
    /// Text in the query box (mirrors the context's query)
    pub query: String,
    /// Highlighted row in the results list
    pub selected: usize,
    pub status_message: String,
    pub should_quit: bool,
    /// Background index fetch, until it reports back
    load_rx: Option<Receiver<Result<Index, LoadFailure>>>,
}

impl<S: KeyValueStore> App<S> {
    /// Create the app and start fetching the index in the background.
    /// The UI thread stays the only writer of the index store.
    pub fn new(mut ctx: DirectoryContext<S>, location: String) -> Result<Self> {
        ctx.begin_index_load()?;

        let (tx, rx) = mpsc::channel();
        let status = format!("Loading index from {}...", location);
        thread::spawn(move || {
            let source = source_for(&location);
            let _ = tx.send(fetch_index(source.as_ref()));
        });

        Ok(Self {
            ctx,
            query: String::new(),
            selected: 0,
            status_message: status,
            should_quit: false,
            load_rx: Some(rx),
        })
    }

    pub fn context(&self) -> &DirectoryContext<S> {
        &self.ctx
    }

    /// Check for background index load completion (call this in event loop)
    pub fn poll_index_load(&mut self) {
        let Some(rx) = &self.load_rx else {
            return;
        };

        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => {
                Err(LoadFailure::Network("index loader exited".to_string()))
            }
        };
        self.load_rx = None;

        match self.ctx.finish_index_load(result) {
            Ok(count) => {
                self.status_message = format!("Index ready: {} entities", count);
                // Suggestions for anything typed while loading
                if !self.query.is_empty() {
                    self.ctx.type_query(&self.query, Instant::now());
                }
            }
            Err(e) => {
                warn!("index load failed: {}", e);
                self.status_message = format!("Search unavailable: {}", e);
            }
        }
        self.clamp_selection();
    }

    /// Periodic work: index hand-over and debounced recompute
    pub fn tick(&mut self, now: Instant) {
        self.poll_index_load();
        match self.ctx.poll(now) {
            Ok(true) => {
                self.selected = 0;
                self.status_message = self.summary();
            }
            Ok(false) => {}
            Err(e) => self.status_message = e.to_string(),
        }
    }

    /// How long the event loop may block before the next tick is due
    pub fn poll_timeout(&self, now: Instant, tick: Duration) -> Duration {
        self.ctx
            .time_until_recompute(now)
            .map_or(tick, |remaining| remaining.min(tick))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.ctx.index_state(), LoadState::Loading)
    }

    // ---- query editing ----

    pub fn push_char(&mut self, c: char, now: Instant) {
        self.query.push(c);
        self.ctx.type_query(&self.query, now);
    }

    pub fn backspace(&mut self, now: Instant) {
        if self.query.pop().is_some() {
            self.ctx.type_query(&self.query, now);
        }
    }

    /// Delete the word before the cursor
    pub fn delete_word(&mut self, now: Instant) {
        let trimmed = self.query.trim_end();
        let cut = trimmed.rfind(' ').map(|i| i + 1).unwrap_or(0);
        self.query.truncate(cut);
        self.ctx.type_query(&self.query, now);
    }

    pub fn clear_query(&mut self, now: Instant) {
        self.query.clear();
        self.ctx.type_query("", now);
    }

    // ---- navigation ----

    pub fn dropdown_open(&self) -> bool {
        self.ctx.nav().is_open()
    }

    pub fn move_down(&mut self) {
        if self.dropdown_open() {
            self.nav(NavEvent::ArrowDown);
        } else if self.selected + 1 < self.ctx.results().len() {
            self.selected += 1;
        }
    }

    pub fn move_up(&mut self) {
        if self.dropdown_open() {
            self.nav(NavEvent::ArrowUp);
        } else {
            self.selected = self.selected.saturating_sub(1);
        }
    }

    /// Enter commits the highlighted suggestion, or runs the query right away
    pub fn enter(&mut self) {
        if self.dropdown_open() && self.ctx.nav().selected().is_some() {
            self.nav(NavEvent::Enter);
            return;
        }
        let query = self.query.clone();
        self.after_facet_change(|ctx| ctx.submit_query(&query));
    }

    /// Esc closes the dropdown, then clears the query, then quits
    pub fn escape(&mut self, now: Instant) {
        if self.dropdown_open() {
            self.nav(NavEvent::Escape);
        } else if !self.query.is_empty() {
            self.clear_query(now);
        } else {
            self.should_quit = true;
        }
    }

    fn nav(&mut self, event: NavEvent) {
        match self.ctx.handle_nav(event) {
            Ok(Some(_)) => {
                self.query = self.ctx.filters().query.clone();
                self.selected = 0;
                self.status_message = self.summary();
            }
            Ok(None) => {}
            Err(e) => self.status_message = e.to_string(),
        }
    }

    // ---- facets ----

    pub fn cycle_sort(&mut self) {
        let next = self.ctx.sort().next();
        self.after_facet_change(|ctx| ctx.set_sort(next));
    }

    pub fn cycle_min_rating(&mut self) {
        let current = self.ctx.filters().min_rating;
        let pos = RATING_STEPS.iter().position(|s| *s == current).unwrap_or(0);
        let next = RATING_STEPS[(pos + 1) % RATING_STEPS.len()];
        self.after_facet_change(|ctx| ctx.set_min_rating(next));
    }

    pub fn clear_facets(&mut self) {
        self.after_facet_change(|ctx| ctx.clear_facets());
    }

    fn after_facet_change(
        &mut self,
        change: impl FnOnce(&mut DirectoryContext<S>) -> crate::error::Result<usize>,
    ) {
        match change(&mut self.ctx) {
            Ok(_) => {
                self.selected = 0;
                self.status_message = self.summary();
            }
            Err(e) => self.status_message = e.to_string(),
        }
    }

    // ---- saved searches ----

    pub fn save_search(&mut self) {
        self.status_message = match self.ctx.save_search() {
            SaveOutcome::Saved { len } => format!("Search saved ({} in history)", len),
            SaveOutcome::SkippedEmptyQuery => "Type a query before saving".to_string(),
            SaveOutcome::Unavailable(reason) => format!("Could not save search: {}", reason),
        };
    }

    // ---- view helpers ----

    pub fn results(&self) -> &[Entity] {
        self.ctx.results()
    }

    pub fn selected_entity(&self) -> Option<&Entity> {
        self.ctx.results().get(self.selected)
    }

    fn clamp_selection(&mut self) {
        let len = self.ctx.results().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    /// Count, active facets and sort, for the status bar
    pub fn summary(&self) -> String {
        let filters = self.ctx.filters();
        let mut parts = vec![format!("{} results", self.ctx.results().len())];
        if !filters.category.is_empty() {
            parts.push(format!("category: {}", filters.category));
        }
        if !filters.location.is_empty() {
            parts.push(format!("location: {}", filters.location));
        }
        if !filters.entity_type.is_empty() {
            parts.push(format!("type: {}", filters.entity_type));
        }
        if let Some(min) = filters.min_rating {
            parts.push(format!("rating >= {}", min));
        }
        parts.push(format!("sort: {}", self.ctx.sort()));
        parts.join(" | ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::filter::SortKey;
    use crate::storage::kv::MemoryStore;
    use crate::utils::app_data::EngineConfig;
    use std::fs;
    use std::path::PathBuf;

    const INDEX: &str = r#"{
        "entities": [
            {"id": "a", "name": "Joe's Pizza Palace", "type": "business",
             "categories": ["Restaurants", "Pizza"], "location": "Springfield, IL",
             "rating": 4.5, "url": "/directory/a/", "search_terms": ["joe's pizza palace", "pizza"]},
            {"id": "b", "name": "Green Thumb Garden Center", "type": "business",
             "categories": ["Garden Centers"], "location": "Springfield, IL",
             "rating": 4.8, "url": "/directory/b/", "search_terms": ["green thumb garden center"]}
        ],
        "categories": ["Garden Centers", "Pizza", "Restaurants"],
        "locations": ["Springfield, IL"],
        "entity_types": ["business"]
    }"#;

    fn index_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir()
            .join(format!("dirsearch_tui_{}_{}.json", name, std::process::id()));
        fs::write(&path, content).unwrap();
        path
    }

    fn wait_loaded(app: &mut App<MemoryStore>) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while app.is_loading() && Instant::now() < deadline {
            app.tick(Instant::now());
            thread::sleep(Duration::from_millis(5));
        }
    }

    fn app_with(name: &str, content: &str) -> App<MemoryStore> {
        let path = index_file(name, content);
        let ctx = DirectoryContext::new(EngineConfig::default(), MemoryStore::new());
        let mut app = App::new(ctx, path.to_string_lossy().into_owned()).unwrap();
        wait_loaded(&mut app);
        let _ = fs::remove_file(path);
        app
    }

    #[test]
    fn test_background_load() {
        let app = app_with("load", INDEX);
        assert!(app.context().index().is_ok());
        assert_eq!(app.results().len(), 2);
        assert!(app.status_message.contains("2 entities"));
    }

    #[test]
    fn test_background_load_failure() {
        let app = app_with("fail", "not json");
        assert!(app.context().index().is_err());
        assert!(app.status_message.starts_with("Search unavailable"));
    }

    #[test]
    fn test_typing_then_tick_recomputes() {
        let mut app = app_with("typing", INDEX);
        let start = Instant::now();
        for c in "green".chars() {
            app.push_char(c, start);
        }
        assert_eq!(app.results().len(), 2);

        app.tick(start + Duration::from_millis(300));
        assert_eq!(app.results().len(), 1);
        assert_eq!(app.selected_entity().unwrap().name, "Green Thumb Garden Center");
    }

    #[test]
    fn test_poll_timeout_tracks_pending_recompute() {
        let mut app = app_with("timeout", INDEX);
        let tick = Duration::from_millis(50);
        let start = Instant::now();
        assert_eq!(app.poll_timeout(start, tick), tick);

        app.push_char('g', start);
        assert_eq!(app.poll_timeout(start + Duration::from_millis(280), tick), Duration::from_millis(20));
        assert_eq!(app.poll_timeout(start + Duration::from_millis(400), tick), Duration::ZERO);
    }

    #[test]
    fn test_dropdown_commit_syncs_query_box() {
        let mut app = app_with("commit", INDEX);
        let now = Instant::now();
        for c in "pizza".chars() {
            app.push_char(c, now);
        }
        assert!(app.dropdown_open());

        app.move_down();
        app.enter();
        assert!(!app.dropdown_open());
        assert_eq!(app.query, app.context().filters().query);
    }

    #[test]
    fn test_escape_sequence() {
        let mut app = app_with("escape", INDEX);
        let now = Instant::now();
        app.push_char('p', now);
        app.push_char('i', now);

        app.escape(now);
        assert!(!app.dropdown_open());
        assert_eq!(app.query, "pi");
        app.escape(now);
        assert_eq!(app.query, "");
        assert!(!app.should_quit);
        app.escape(now);
        assert!(app.should_quit);
    }

    #[test]
    fn test_cycle_sort_and_rating() {
        let mut app = app_with("cycle", INDEX);
        app.cycle_sort();
        assert_eq!(app.context().sort(), SortKey::Rating);

        app.cycle_min_rating();
        app.cycle_min_rating();
        app.cycle_min_rating();
        assert_eq!(app.context().filters().min_rating, Some(4.5));
        assert_eq!(app.results().len(), 2);
        app.cycle_min_rating();
        assert_eq!(app.context().filters().min_rating, None);
        assert!(app.status_message.contains("sort: rating"));
    }

    #[test]
    fn test_save_search_status() {
        let mut app = app_with("save", INDEX);
        app.save_search();
        assert_eq!(app.status_message, "Type a query before saving");

        app.push_char('j', Instant::now());
        app.save_search();
        assert!(app.status_message.starts_with("Search saved"));
    }

    #[test]
    fn test_delete_word() {
        let mut app = app_with("word", INDEX);
        let now = Instant::now();
        for c in "green thumb".chars() {
            app.push_char(c, now);
        }
        app.delete_word(now);
        assert_eq!(app.query, "green ");
        app.delete_word(now);
        assert_eq!(app.query, "");
    }
}
