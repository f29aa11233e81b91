use serde::{Deserialize, Serialize};

/// An authoritative track record returned by a catalog lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogCandidate {
    pub title: String,

    /// Credited artists in catalog order.
    #[serde(default)]
    pub artist_names: Vec<String>,

    #[serde(default)]
    pub album_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_year: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_art_url: Option<String>,
}

impl CatalogCandidate {
    pub fn new(title: impl Into<String>, artist_names: Vec<String>) -> Self {
        Self {
            title: title.into(),
            artist_names,
            ..Default::default()
        }
    }

    pub fn with_duration(mut self, seconds: u32) -> Self {
        self.duration_seconds = Some(seconds);
        self
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album_name = album.into();
        self
    }

    /// Credited artists joined for display, e.g. `"Flume, Kai"`.
    pub fn artist_display(&self) -> String {
        self.artist_names.join(", ")
    }
}
