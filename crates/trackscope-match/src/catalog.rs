use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tracing::{debug, warn};
use trackscope_core::{CatalogCandidate, ClassifiedResult, LookupConfig};

use crate::error::{MatchError, Result};
use crate::normalize::{channel_artist_hint, compact, comparison_key, core_title, similarity};
use crate::sources::CatalogSource;

/// Query formulations tried against the catalog, most specific first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStrategy {
    /// `artist:"<artist>" track:"<title>"` from the extracted pair.
    FieldQualified,
    /// Field-qualified query with the channel, platform suffixes removed,
    /// standing in for the artist. Label and aggregator channels are tried
    /// too; a wrong artist simply finds nothing.
    ChannelArtist,
    /// Normalized title alone.
    TitleOnly,
}

impl LookupStrategy {
    pub const ALL: [LookupStrategy; 3] = [
        LookupStrategy::FieldQualified,
        LookupStrategy::ChannelArtist,
        LookupStrategy::TitleOnly,
    ];

    /// The query for this strategy, or `None` when the result lacks the inputs.
    pub fn build_query(self, result: &ClassifiedResult) -> Option<String> {
        let query = match self {
            LookupStrategy::FieldQualified => {
                let artist = strip_quotes(result.extracted_artist.as_deref()?);
                let title = strip_quotes(result.extracted_title.as_deref()?);
                if artist.is_empty() || title.is_empty() {
                    return None;
                }
                format!("artist:\"{artist}\" track:\"{title}\"")
            }
            LookupStrategy::ChannelArtist => {
                let artist = strip_quotes(&channel_artist_hint(result.channel_name())?);
                let title = strip_quotes(&result.normalized_title);
                if artist.is_empty() || title.is_empty() {
                    return None;
                }
                format!("artist:\"{artist}\" track:\"{title}\"")
            }
            LookupStrategy::TitleOnly => comparison_key(&result.normalized_title),
        };
        let query = query.trim().to_string();
        (!query.is_empty()).then_some(query)
    }
}

fn strip_quotes(value: &str) -> String {
    value.replace('"', "").trim().to_string()
}

/// Finds at most one catalog candidate per classified result.
#[derive(Clone)]
pub struct CatalogMatcher {
    source: Arc<dyn CatalogSource>,
    lookup: LookupConfig,
}

impl CatalogMatcher {
    pub fn new(source: Arc<dyn CatalogSource>, lookup: LookupConfig) -> Self {
        Self { source, lookup }
    }

    /// First strategy that yields any candidate wins; its best-titled
    /// candidate is returned. A failed lookup ends the search with `None`.
    pub async fn find_match(&self, result: &ClassifiedResult) -> Option<CatalogCandidate> {
        for strategy in LookupStrategy::ALL {
            let Some(query) = strategy.build_query(result) else {
                continue;
            };

            let candidates = match self.lookup_with_retry(&query).await {
                Ok(candidates) => candidates,
                Err(e) => {
                    warn!(
                        source = self.source.name(),
                        id = %result.raw.id,
                        ?strategy,
                        error = %e,
                        "catalog lookup failed"
                    );
                    return None;
                }
            };

            if let Some(best) = best_candidate(result, candidates) {
                debug!(id = %result.raw.id, ?strategy, title = %best.title, "catalog match");
                return Some(best);
            }
        }
        None
    }

    async fn lookup_with_retry(&self, query: &str) -> Result<Vec<CatalogCandidate>> {
        let mut attempt = 0u32;
        loop {
            let outcome = tokio::time::timeout(
                self.lookup.timeout(),
                self.source
                    .search_tracks(query, self.lookup.candidates_per_query),
            )
            .await
            .unwrap_or(Err(MatchError::Timeout(self.lookup.timeout_ms)));

            match outcome {
                Err(e) if e.is_transient() && attempt < self.lookup.max_retries => {
                    let delay = self.retry_delay(&e, attempt);
                    debug!(query, attempt, error = %e, ?delay, "retrying catalog lookup");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    /// Exponential backoff, stretched to the source's Retry-After when it is
    /// rate limiting us, but never longer than one lookup timeout.
    fn retry_delay(&self, error: &MatchError, attempt: u32) -> Duration {
        let backoff = self.lookup.backoff(attempt);
        match error {
            MatchError::RateLimit(_, secs) => backoff
                .max(Duration::from_secs(*secs))
                .min(self.lookup.timeout().max(backoff)),
            _ => backoff,
        }
    }

    /// Look up every result concurrently; slot `i` of the output belongs to
    /// `results[i]` whatever order lookups finish in.
    pub async fn match_all(&self, results: &[ClassifiedResult]) -> Vec<Option<CatalogCandidate>> {
        let mut slots: Vec<Option<CatalogCandidate>> = vec![None; results.len()];

        let mut stream = futures::stream::iter(results.iter().enumerate())
            .map(|(i, result)| async move { (i, self.find_match(result).await) })
            .buffer_unordered(self.lookup.concurrency.max(1));

        while let Some((i, found)) = stream.next().await {
            if let Some(slot) = slots.get_mut(i) {
                *slot = found;
            }
        }
        slots
    }
}

/// Highest title similarity wins; earlier candidates win ties.
fn best_candidate(
    result: &ClassifiedResult,
    candidates: Vec<CatalogCandidate>,
) -> Option<CatalogCandidate> {
    let mut best: Option<(f64, CatalogCandidate)> = None;
    for candidate in candidates {
        let score = title_similarity(result, &candidate.title);
        match &best {
            Some((best_score, _)) if score <= *best_score => {}
            _ => best = Some((score, candidate)),
        }
    }
    best.map(|(_, candidate)| candidate)
}

/// Whether any catalog artist agrees with what the result says about its artist.
///
/// Hints are the extracted artist, the channel name and the channel with
/// platform suffixes removed. A match is a case-insensitive substring in
/// either direction, with or without spaces and punctuation.
pub fn artist_matches(result: &ClassifiedResult, artist_names: &[String]) -> bool {
    let mut hints: Vec<String> = Vec::with_capacity(3);
    if let Some(artist) = &result.extracted_artist {
        hints.push(artist.clone());
    }
    hints.push(result.channel_name().to_string());
    if let Some(hint) = channel_artist_hint(result.channel_name()) {
        hints.push(hint);
    }

    artist_names.iter().any(|artist| {
        hints
            .iter()
            .any(|hint| names_overlap(artist, hint) || names_overlap(&compact(artist), &compact(hint)))
    })
}

fn names_overlap(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a)
}

/// Best similarity (0–100) between the result's title forms and a catalog title.
///
/// Compares the full normalized title, the extracted song title, and both with
/// featuring credits removed, so `"Flume - Never Be Like You (feat. Kai)"`
/// scores 100 against `"Never Be Like You"`.
pub fn title_similarity(result: &ClassifiedResult, catalog_title: &str) -> f64 {
    let mut ours: Vec<String> = vec![result.normalized_title.clone()];
    if let Some(title) = &result.extracted_title {
        ours.push(title.clone());
    }
    let cores: Vec<String> = ours.iter().map(|t| core_title(t)).collect();
    ours.extend(cores);

    let theirs = [catalog_title.to_string(), core_title(catalog_title)];

    ours.iter()
        .flat_map(|a| theirs.iter().map(move |b| similarity(a, b)))
        .fold(0.0, f64::max)
}
