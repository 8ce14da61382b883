#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must decode or fail cleanly, never panic
    if let Ok(index) = dirsearch::index::Index::from_json(data) {
        let _ = index.stats();
        let _ = dirsearch::query::recompute(
            &index,
            &dirsearch::query::FilterState::new(),
            dirsearch::query::SortKey::Rating,
        );
    }
});
