use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use trackscope_core::CatalogCandidate;

use crate::error::{MatchError, Result};
use crate::sources::CatalogSource;

/// In-memory catalog answering from a fixed query table.
///
/// Queries are matched case-insensitively after trimming. Used offline by the
/// CLI (`--catalog-fixture`) and by tests, which also read back the lookups made.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    entries: HashMap<String, Vec<CatalogCandidate>>,
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

fn fixture_key(query: &str) -> String {
    query.trim().to_lowercase()
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, query: &str, candidates: Vec<CatalogCandidate>) -> Self {
        self.entries.insert(fixture_key(query), candidates);
        self
    }

    /// Parse a JSON object of `{ "<query>": [<candidate>, ...] }`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let table: HashMap<String, Vec<CatalogCandidate>> =
            serde_json::from_str(json).map_err(|e| MatchError::Parse(e.to_string()))?;
        Ok(table
            .into_iter()
            .fold(Self::new(), |catalog, (query, candidates)| {
                catalog.with_entry(&query, candidates)
            }))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            MatchError::SourceUnavailable(format!("{}: {e}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Queries received so far, in arrival order.
    pub fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .map(|queries| queries.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    fn name(&self) -> &str {
        "fixture"
    }

    async fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<CatalogCandidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.to_string());
        }

        Ok(self
            .entries
            .get(&fixture_key(query))
            .map(|candidates| candidates.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn answers_known_queries_only() {
        let catalog = StaticCatalog::new().with_entry(
            "Believer",
            vec![
                CatalogCandidate::new("Believer", vec!["Imagine Dragons".to_string()]),
                CatalogCandidate::new("Believer (Live)", vec!["Imagine Dragons".to_string()]),
            ],
        );

        let hits = catalog.search_tracks("  believer ", 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Believer");

        assert!(catalog.search_tracks("thunder", 5).await.unwrap().is_empty());
        assert_eq!(catalog.call_count(), 2);
        assert_eq!(catalog.queries(), vec!["  believer ", "thunder"]);
    }

    #[tokio::test]
    async fn loads_json_table() {
        let catalog = StaticCatalog::from_json_str(
            r#"{
                "artist:\"Flume\" track:\"Never Be Like You\"": [
                    {"title": "Never Be Like You", "artist_names": ["Flume", "Kai"],
                     "album_name": "Skin", "duration_seconds": 234, "release_year": 2016}
                ]
            }"#,
        )
        .unwrap();

        let hits = catalog
            .search_tracks("artist:\"Flume\" track:\"Never Be Like You\"", 5)
            .await
            .unwrap();
        assert_eq!(hits[0].duration_seconds, Some(234));
        assert_eq!(hits[0].artist_display(), "Flume, Kai");
    }

    #[test]
    fn rejects_malformed_json() {
        let err = StaticCatalog::from_json_str("[1, 2]").unwrap_err();
        assert!(matches!(err, MatchError::Parse(_)));
    }
}
