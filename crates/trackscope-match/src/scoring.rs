use tracing::trace;
use trackscope_core::{
    CatalogCandidate, ClassifiedResult, MatchedResult, ScoreBreakdown, ScoredResult,
    ScoringConfig, Tier,
};

use crate::catalog::{artist_matches, title_similarity};
use crate::normalize::similarity;

#[derive(Debug, Clone)]
pub struct ConfidenceScorer {
    config: ScoringConfig,
}

impl Default for ConfidenceScorer {
    fn default() -> Self {
        Self::new(&ScoringConfig::default())
    }
}

impl ConfidenceScorer {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Score one matched result against the user's query.
    ///
    /// Catalog pairings below the medium threshold are dropped and the result
    /// falls back to query relevance, as if it had never been matched.
    pub fn score(&self, matched: MatchedResult, query: &str) -> ScoredResult {
        let MatchedResult {
            result,
            catalog_match,
        } = matched;

        let mut discarded_composite = None;
        if let Some(candidate) = catalog_match {
            let (composite, breakdown) = self.composite(&result, &candidate);
            let tier = if composite >= self.config.high_confidence_threshold {
                Some(Tier::HighConfidenceCatalog)
            } else if composite >= self.config.medium_confidence_threshold {
                Some(Tier::MediumConfidenceCatalog)
            } else {
                None
            };

            if let Some(tier) = tier {
                trace!(id = %result.raw.id, composite, %tier, "catalog-backed score");
                return ScoredResult {
                    matched: MatchedResult::new(result, Some(candidate)),
                    confidence_score: composite,
                    tier,
                    breakdown,
                };
            }
            discarded_composite = Some(composite);
        }

        let relevance = similarity(&result.normalized_title, query);
        let tier = if relevance >= self.config.platform_only_threshold {
            Tier::PlatformOnly
        } else {
            Tier::Rejected
        };
        trace!(id = %result.raw.id, relevance, %tier, "relevance score");

        ScoredResult {
            matched: MatchedResult::new(result, None),
            confidence_score: relevance,
            tier,
            breakdown: ScoreBreakdown::Relevance {
                relevance,
                discarded_composite,
            },
        }
    }

    fn composite(
        &self,
        result: &ClassifiedResult,
        candidate: &CatalogCandidate,
    ) -> (f64, ScoreBreakdown) {
        let title = title_similarity(result, &candidate.title);
        let duration = self.duration_score(result.duration_seconds(), candidate.duration_seconds);
        let artist = if artist_matches(result, &candidate.artist_names) {
            100.0
        } else {
            0.0
        };

        let composite = (title * self.config.title_weight
            + duration * self.config.duration_weight
            + artist * self.config.artist_weight)
            .clamp(0.0, 100.0);

        (
            composite,
            ScoreBreakdown::Composite {
                title,
                duration,
                artist,
            },
        )
    }

    /// All or nothing: 100 within tolerance, 0 otherwise or when unknown.
    fn duration_score(&self, ours: Option<u32>, theirs: Option<u32>) -> f64 {
        match (ours, theirs) {
            (Some(a), Some(b)) if a.abs_diff(b) <= self.config.duration_tolerance_secs => 100.0,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ContentClassifier;
    use trackscope_core::{ClassifierConfig, RawResult};

    fn classified(title: &str, channel: &str, duration: u32) -> ClassifiedResult {
        ContentClassifier::new(&ClassifierConfig::default())
            .unwrap()
            .classify(RawResult::new("vid", title, channel, Some(duration)))
    }

    fn candidate(title: &str, artist: &str, duration: Option<u32>) -> CatalogCandidate {
        CatalogCandidate {
            duration_seconds: duration,
            ..CatalogCandidate::new(title, vec![artist.to_string()])
        }
    }

    #[test]
    fn perfect_catalog_match_is_high_confidence() {
        let r = classified(
            "Flume - Never Be Like You (feat. Kai) [Official Video]",
            "FlumeVEVO",
            234,
        );
        let scored = ConfidenceScorer::default().score(
            MatchedResult::new(r, Some(candidate("Never Be Like You", "Flume", Some(234)))),
            "flume never be like you",
        );

        assert!((scored.confidence_score - 100.0).abs() < 1e-9);
        assert_eq!(scored.tier, Tier::HighConfidenceCatalog);
        assert!(scored.catalog_match().is_some());
    }

    #[test]
    fn duration_tolerance_is_inclusive() {
        let scorer = ConfidenceScorer::default();
        assert_eq!(scorer.duration_score(Some(234), Some(239)), 100.0);
        assert_eq!(scorer.duration_score(Some(234), Some(229)), 100.0);
        assert_eq!(scorer.duration_score(Some(234), Some(240)), 0.0);
        assert_eq!(scorer.duration_score(Some(234), None), 0.0);
    }

    #[test]
    fn six_second_gap_costs_the_duration_component() {
        let r = classified("Imagine Dragons - Believer", "ImagineDragonsVEVO", 210);
        let scored = ConfidenceScorer::default().score(
            MatchedResult::new(r, Some(candidate("Believer", "Imagine Dragons", Some(204)))),
            "believer",
        );

        let ScoreBreakdown::Composite { duration, title, artist } = scored.breakdown else {
            panic!("expected composite breakdown, got {:?}", scored.breakdown);
        };
        assert_eq!(duration, 0.0);
        assert_eq!(title, 100.0);
        assert_eq!(artist, 100.0);
        assert!((scored.confidence_score - 65.0).abs() < 1e-9);
        assert_eq!(scored.tier, Tier::MediumConfidenceCatalog);
    }

    #[test]
    fn weak_pairing_falls_back_to_relevance() {
        let r = classified("Imagine Dragons - Believer", "Uploader Person", 210);
        let scored = ConfidenceScorer::default().score(
            MatchedResult::new(r, Some(candidate("Thunder", "Someone Else", Some(187)))),
            "imagine dragons believer",
        );

        assert_eq!(scored.tier, Tier::PlatformOnly);
        assert!(scored.catalog_match().is_none());
        assert_eq!(scored.confidence_score, 100.0);
        match scored.breakdown {
            ScoreBreakdown::Relevance {
                discarded_composite: Some(c),
                ..
            } => assert!(c < 60.0),
            other => panic!("unexpected breakdown {other:?}"),
        }
    }

    #[test]
    fn remix_without_catalog_match_is_platform_only() {
        let r = classified(
            "Nirvana - Something In The Way (ILLENIUM Remix)",
            "ILLENIUM",
            258,
        );
        let scored = ConfidenceScorer::default().score(
            MatchedResult::new(r, None),
            "nirvana something in the way illenium remix",
        );

        assert_eq!(scored.tier, Tier::PlatformOnly);
        assert!(scored.confidence_score >= 75.0);
    }

    #[test]
    fn irrelevant_result_is_rejected() {
        let r = classified("Daft Punk - One More Time", "Daft Punk", 320);
        let scored =
            ConfidenceScorer::default().score(MatchedResult::new(r, None), "imagine dragons believer");

        assert_eq!(scored.tier, Tier::Rejected);
        assert!(scored.confidence_score < 75.0);
    }
}
