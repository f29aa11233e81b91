//! trackscope core: track models, configuration, errors.

pub mod config;
pub mod error;
pub mod models;

pub use config::{
    AppConfig, CatalogConfig, ClassifierConfig, DedupConfig, LookupConfig, MatchConfig,
    ScoringConfig,
};
pub use error::{Result, TrackscopeError};
pub use models::*;
