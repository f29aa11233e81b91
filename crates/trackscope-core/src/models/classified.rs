use serde::{Deserialize, Serialize};

use super::raw::RawResult;

/// Outcome of content classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentTag {
    Studio,
    Remix,
    Disqualified,
}

impl ContentTag {
    pub fn is_disqualified(self) -> bool {
        self == ContentTag::Disqualified
    }
}

/// A raw result annotated by the normalizer and classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedResult {
    pub raw: RawResult,

    /// Decorations stripped, original casing kept.
    pub display_title: String,

    /// Decorations stripped, lowercased, whitespace collapsed.
    pub normalized_title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_artist: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_title: Option<String>,

    pub content_tag: ContentTag,
}

impl ClassifiedResult {
    pub fn channel_name(&self) -> &str {
        &self.raw.channel_name
    }

    pub fn duration_seconds(&self) -> Option<u32> {
        self.raw.duration_seconds
    }
}
