//! trackscope match: classification, deduplication, catalog matching and
//! confidence scoring of video-platform search results.

pub mod catalog;
pub mod classify;
pub mod dedup;
pub mod error;
pub mod http;
pub mod metadata;
pub mod normalize;
pub mod pipeline;
pub mod rank;
pub mod scoring;
pub mod sources;

pub use catalog::{CatalogMatcher, LookupStrategy};
pub use classify::ContentClassifier;
pub use dedup::Deduplicator;
pub use error::{MatchError, Result};
pub use metadata::metadata_source;
pub use pipeline::Resolver;
pub use rank::rank;
pub use scoring::ConfidenceScorer;
pub use sources::{CatalogSource, SpotifySource, StaticCatalog};
