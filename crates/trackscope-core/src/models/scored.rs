use std::fmt;

use serde::{Deserialize, Serialize};

use super::catalog::CatalogCandidate;
use super::classified::ClassifiedResult;

/// A classified result paired with at most one catalog candidate.
///
/// With no catalog match the scorer must take the relevance-only path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedResult {
    pub result: ClassifiedResult,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_match: Option<CatalogCandidate>,
}

impl MatchedResult {
    pub fn new(result: ClassifiedResult, catalog_match: Option<CatalogCandidate>) -> Self {
        Self {
            result,
            catalog_match,
        }
    }
}

/// Coarse confidence bucket used for ranking and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    HighConfidenceCatalog,
    MediumConfidenceCatalog,
    PlatformOnly,
    Rejected,
}

impl Tier {
    /// Higher sorts first.
    pub fn priority(self) -> u8 {
        match self {
            Tier::HighConfidenceCatalog => 3,
            Tier::MediumConfidenceCatalog => 2,
            Tier::PlatformOnly => 1,
            Tier::Rejected => 0,
        }
    }

    pub fn is_catalog_backed(self) -> bool {
        matches!(
            self,
            Tier::HighConfidenceCatalog | Tier::MediumConfidenceCatalog
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::HighConfidenceCatalog => "high_confidence_catalog",
            Tier::MediumConfidenceCatalog => "medium_confidence_catalog",
            Tier::PlatformOnly => "platform_only",
            Tier::Rejected => "rejected",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a confidence score was produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreBreakdown {
    Composite {
        title: f64,
        duration: f64,
        artist: f64,
    },
    Relevance {
        relevance: f64,
        /// Composite of a catalog pairing that fell below the catalog tiers.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        discarded_composite: Option<f64>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    pub matched: MatchedResult,
    pub confidence_score: f64,
    pub tier: Tier,
    pub breakdown: ScoreBreakdown,
}

impl ScoredResult {
    pub fn result(&self) -> &ClassifiedResult {
        &self.matched.result
    }

    pub fn catalog_match(&self) -> Option<&CatalogCandidate> {
        self.matched.catalog_match.as_ref()
    }
}
