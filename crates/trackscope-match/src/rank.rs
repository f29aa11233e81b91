use std::cmp::Ordering;

use trackscope_core::{ScoredResult, Tier};

use crate::error::{MatchError, Result};

/// Drop rejected results, order by tier then score, keep the first `limit`.
///
/// The sort is stable: equal tier and score keep their incoming order.
pub fn rank(mut scored: Vec<ScoredResult>, limit: usize) -> Result<Vec<ScoredResult>> {
    if limit == 0 {
        return Err(MatchError::InvalidArgument(
            "limit must be at least 1".to_string(),
        ));
    }

    scored.retain(|s| s.tier != Tier::Rejected);
    scored.sort_by(compare);
    scored.truncate(limit);
    Ok(scored)
}

fn compare(a: &ScoredResult, b: &ScoredResult) -> Ordering {
    b.tier
        .priority()
        .cmp(&a.tier.priority())
        .then_with(|| b.confidence_score.total_cmp(&a.confidence_score))
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackscope_core::{
        ClassifiedResult, ContentTag, MatchedResult, RawResult, ScoreBreakdown,
    };

    fn scored(id: &str, tier: Tier, score: f64) -> ScoredResult {
        let result = ClassifiedResult {
            raw: RawResult::new(id, id, "Channel", Some(200)),
            display_title: id.to_string(),
            normalized_title: id.to_lowercase(),
            extracted_artist: None,
            extracted_title: None,
            content_tag: ContentTag::Studio,
        };
        ScoredResult {
            matched: MatchedResult::new(result, None),
            confidence_score: score,
            tier,
            breakdown: ScoreBreakdown::Relevance {
                relevance: score,
                discarded_composite: None,
            },
        }
    }

    fn ids(ranked: &[ScoredResult]) -> Vec<&str> {
        ranked.iter().map(|s| s.result().raw.id.as_str()).collect()
    }

    #[test]
    fn tier_outranks_score() {
        let ranked = rank(
            vec![
                scored("platform", Tier::PlatformOnly, 100.0),
                scored("medium", Tier::MediumConfidenceCatalog, 61.0),
                scored("high", Tier::HighConfidenceCatalog, 80.0),
            ],
            5,
        )
        .unwrap();
        assert_eq!(ids(&ranked), vec!["high", "medium", "platform"]);
    }

    #[test]
    fn score_orders_within_tier_and_ties_are_stable() {
        let ranked = rank(
            vec![
                scored("a", Tier::PlatformOnly, 80.0),
                scored("b", Tier::PlatformOnly, 95.0),
                scored("c", Tier::PlatformOnly, 80.0),
            ],
            5,
        )
        .unwrap();
        assert_eq!(ids(&ranked), vec!["b", "a", "c"]);
    }

    #[test]
    fn rejected_are_removed_and_limit_applies() {
        let ranked = rank(
            vec![
                scored("r", Tier::Rejected, 99.0),
                scored("p1", Tier::PlatformOnly, 90.0),
                scored("p2", Tier::PlatformOnly, 85.0),
                scored("p3", Tier::PlatformOnly, 80.0),
            ],
            2,
        )
        .unwrap();
        assert_eq!(ids(&ranked), vec!["p1", "p2"]);
    }

    #[test]
    fn empty_input_is_fine() {
        assert!(rank(Vec::new(), 3).unwrap().is_empty());
    }

    #[test]
    fn zero_limit_is_rejected() {
        let err = rank(vec![scored("a", Tier::PlatformOnly, 90.0)], 0).unwrap_err();
        assert!(matches!(err, MatchError::InvalidArgument(_)));
    }
}
