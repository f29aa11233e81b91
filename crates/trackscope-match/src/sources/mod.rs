use async_trait::async_trait;
use trackscope_core::CatalogCandidate;

use crate::error::Result;

/// A music catalog that can be searched for authoritative track records.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    fn name(&self) -> &str;

    /// Up to `limit` candidates for a free-text or field-qualified query,
    /// best first. An empty list means no match, not an error.
    async fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<CatalogCandidate>>;
}

pub mod fixture;
pub mod spotify;

pub use fixture::StaticCatalog;
pub use spotify::SpotifySource;
