use std::sync::Arc;

use tracing::{debug, info};
use trackscope_core::{MatchConfig, MatchedResult, RawResult, ScoredResult};

use crate::catalog::CatalogMatcher;
use crate::classify::ContentClassifier;
use crate::dedup::Deduplicator;
use crate::error::{MatchError, Result};
use crate::rank::rank;
use crate::scoring::ConfidenceScorer;
use crate::sources::CatalogSource;

/// Turns one platform search response into a short, ranked list of results.
///
/// classify → filter → deduplicate → catalog match → score → rank.
pub struct Resolver {
    config: MatchConfig,
    classifier: ContentClassifier,
    deduplicator: Deduplicator,
    matcher: CatalogMatcher,
    scorer: ConfidenceScorer,
}

impl Resolver {
    pub fn new(config: MatchConfig, source: Arc<dyn CatalogSource>) -> Result<Self> {
        config.validate()?;
        let classifier = ContentClassifier::new(&config.classifier)?;
        let deduplicator = Deduplicator::new(&config.dedup);
        let matcher = CatalogMatcher::new(source, config.lookup.clone());
        let scorer = ConfidenceScorer::new(&config.scoring);
        Ok(Self {
            config,
            classifier,
            deduplicator,
            matcher,
            scorer,
        })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Resolve with the configured result limit.
    pub async fn resolve_default(
        &self,
        query: &str,
        raw_results: Vec<RawResult>,
    ) -> Result<Vec<ScoredResult>> {
        self.resolve(query, raw_results, self.config.limit).await
    }

    pub async fn resolve(
        &self,
        query: &str,
        raw_results: Vec<RawResult>,
        limit: usize,
    ) -> Result<Vec<ScoredResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(MatchError::InvalidArgument("query must not be blank".to_string()));
        }
        if limit == 0 {
            return Err(MatchError::InvalidArgument(
                "limit must be at least 1".to_string(),
            ));
        }

        let received = raw_results.len();
        let classified: Vec<_> = raw_results
            .into_iter()
            .map(|raw| self.classifier.classify(raw))
            .collect();
        let kept: Vec<_> = classified
            .into_iter()
            .filter(|c| !c.content_tag.is_disqualified())
            .collect();
        debug!(received, kept = kept.len(), "classified platform results");

        let unique = self.deduplicator.deduplicate(kept);
        let unique = self.deduplicator.ensure_variety(unique, query);
        let matches = self.matcher.match_all(&unique).await;
        let catalog_hits = matches.iter().filter(|m| m.is_some()).count();
        debug!(unique = unique.len(), catalog_hits, "catalog matching done");

        let scored: Vec<ScoredResult> = unique
            .into_iter()
            .zip(matches)
            .map(|(result, catalog)| self.scorer.score(MatchedResult::new(result, catalog), query))
            .collect();

        let ranked = rank(scored, limit)?;
        info!(query, received, returned = ranked.len(), "resolved query");
        Ok(ranked)
    }
}
