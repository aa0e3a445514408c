use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use super::LookupEntity;
use crate::support::Debouncer;

pub const DEFAULT_SUGGESTION_LIMIT: usize = 20;

/// Case-insensitive substring match of `input` against entity names,
/// excluding ids already in `selected`. Blank input suggests nothing.
pub fn filter_lookup(
    catalog: &[LookupEntity],
    input: &str,
    selected: &[String],
    limit: usize,
) -> Vec<LookupEntity> {
    let needle = input.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    catalog
        .iter()
        .filter(|entity| !selected.iter().any(|id| *id == entity.id))
        .filter(|entity| entity.name.to_lowercase().contains(&needle))
        .take(limit)
        .cloned()
        .collect()
}

/// A fetched catalog behind a debouncer. Each idle window yields one
/// filtering pass over the latest input, published on a watch channel.
pub struct DebouncedFilter {
    debouncer: Debouncer<String>,
    results: watch::Receiver<Vec<LookupEntity>>,
    passes: Arc<AtomicUsize>,
}

impl DebouncedFilter {
    pub fn new(
        catalog: Vec<LookupEntity>,
        selected: Vec<String>,
        window: Duration,
        limit: usize,
    ) -> Self {
        let (tx, results) = watch::channel(Vec::new());
        let passes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&passes);
        let debouncer = Debouncer::new(window, move |input: String| {
            counter.fetch_add(1, Ordering::SeqCst);
            let _ = tx.send(filter_lookup(&catalog, &input, &selected, limit));
        });
        Self {
            debouncer,
            results,
            passes,
        }
    }

    pub fn input(&self, raw: impl Into<String>) {
        self.debouncer.call(raw.into());
    }

    pub fn results(&self) -> watch::Receiver<Vec<LookupEntity>> {
        self.results.clone()
    }

    pub fn passes(&self) -> usize {
        self.passes.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::support::debounce::DEFAULT_WINDOW;

    fn entity(id: &str, name: &str) -> LookupEntity {
        LookupEntity {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    fn catalog() -> Vec<LookupEntity> {
        vec![
            entity("1", "Rust"),
            entity("2", "TypeScript"),
            entity("3", "Trust & Safety"),
            entity("4", "Go"),
        ]
    }

    #[test]
    fn test_substring_match_is_case_insensitive() {
        let hits = filter_lookup(&catalog(), "RUST", &[], 10);
        let names: Vec<_> = hits.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Rust", "Trust & Safety"]);
    }

    #[test]
    fn test_selected_entities_are_excluded() {
        let hits = filter_lookup(&catalog(), "rust", &["1".to_string()], 10);
        assert_eq!(hits, vec![entity("3", "Trust & Safety")]);
    }

    #[test]
    fn test_blank_input_suggests_nothing() {
        assert!(filter_lookup(&catalog(), "   ", &[], 10).is_empty());
    }

    #[test]
    fn test_input_is_trimmed() {
        assert_eq!(filter_lookup(&catalog(), "  go ", &[], 10), vec![entity("4", "Go")]);
    }

    #[test]
    fn test_limit_caps_results() {
        assert_eq!(filter_lookup(&catalog(), "t", &[], 2).len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_typing_runs_one_pass_with_last_input() {
        let filter = DebouncedFilter::new(catalog(), vec![], DEFAULT_WINDOW, 10);
        let mut results = filter.results();

        for input in ["t", "ty", "typ"] {
            filter.input(input);
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        results.changed().await.unwrap();

        assert_eq!(filter.passes(), 1);
        assert_eq!(*results.borrow(), vec![entity("2", "TypeScript")]);
    }
}
