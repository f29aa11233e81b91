use serde::{Deserialize, Serialize};

use super::catalog::CatalogCandidate;

/// Where the tags written for a downloaded track come from, best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum MetadataSource {
    /// Authoritative catalog record.
    Catalog(CatalogCandidate),
    /// Parsed from an `"Artist - Title"` / `"Title by Artist"` video title.
    Extracted { artist: String, title: String },
    /// Video title as-is; the channel name stands in for the artist only when
    /// it looks like an artist channel.
    Fallback {
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        artist: Option<String>,
    },
}

impl MetadataSource {
    pub fn title(&self) -> &str {
        match self {
            MetadataSource::Catalog(candidate) => &candidate.title,
            MetadataSource::Extracted { title, .. } => title,
            MetadataSource::Fallback { title, .. } => title,
        }
    }

    pub fn artist(&self) -> Option<String> {
        match self {
            MetadataSource::Catalog(candidate) if !candidate.artist_names.is_empty() => {
                Some(candidate.artist_display())
            }
            MetadataSource::Catalog(_) => None,
            MetadataSource::Extracted { artist, .. } => Some(artist.clone()),
            MetadataSource::Fallback { artist, .. } => artist.clone(),
        }
    }

    pub fn is_authoritative(&self) -> bool {
        matches!(self, MetadataSource::Catalog(_))
    }
}
