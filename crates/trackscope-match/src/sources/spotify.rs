use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::debug;
use trackscope_core::{CatalogCandidate, CatalogConfig, TrackscopeError};

use crate::error::{MatchError, Result};
use crate::http::{DiskCache, RateLimitedClient};
use crate::sources::CatalogSource;

const SOURCE_NAME: &str = "spotify";

/// Spotify Web API track search.
pub struct SpotifySource {
    client: RateLimitedClient,
    cache: DiskCache,
    base_url: String,
    token: String,
}

impl SpotifySource {
    /// Build from config; the bearer token comes from `config.token_env`.
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let token = config.token().ok_or_else(|| {
            MatchError::Config(TrackscopeError::ConfigError(format!(
                "catalog token not set (export {})",
                config.token_env
            )))
        })?;
        let cache = DiskCache::new(SOURCE_NAME, config.cache_ttl());
        Self::with_params(&config.base_url, config.min_request_interval(), token, cache)
    }

    pub fn with_params(
        base_url: &str,
        min_interval: Duration,
        token: String,
        cache: DiskCache,
    ) -> Result<Self> {
        // Retries belong to the catalog matcher; the client fails fast.
        let client = RateLimitedClient::new(SOURCE_NAME, min_interval, 0, "trackscope/0.1")?;
        Ok(Self {
            client,
            cache,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .map_err(|e| MatchError::InvalidArgument(format!("catalog token: {e}")))?;
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }
}

fn cache_key(query: &str, limit: usize) -> String {
    format!("{}|limit={limit}", query.trim().to_lowercase())
}

#[async_trait]
impl CatalogSource for SpotifySource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<CatalogCandidate>> {
        let key = cache_key(query, limit);
        if let Some(cached) = self.cache.get::<Vec<CatalogCandidate>>(&key).await {
            debug!(query, "catalog cache hit");
            return Ok(cached);
        }

        let url = format!(
            "{}/v1/search?q={}&type=track&limit={}",
            self.base_url,
            urlencoding::encode(query),
            limit
        );
        let val: Value = self
            .client
            .get_json_with_headers(&url, self.auth_headers()?)
            .await?;
        let candidates = parse_search_response(&val)?;
        self.cache.set(&key, &candidates).await;

        Ok(candidates)
    }
}

/// Map a `/v1/search?type=track` response into candidates.
pub fn parse_search_response(val: &Value) -> Result<Vec<CatalogCandidate>> {
    let items = val["tracks"]["items"]
        .as_array()
        .ok_or_else(|| MatchError::Parse("missing tracks.items in search response".to_string()))?;

    Ok(items.iter().filter_map(parse_track).collect())
}

fn parse_track(item: &Value) -> Option<CatalogCandidate> {
    let title = item["name"].as_str()?.trim().to_string();
    if title.is_empty() {
        return None;
    }

    let artist_names = item["artists"]
        .as_array()
        .map(|artists| {
            artists
                .iter()
                .filter_map(|a| a["name"].as_str())
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default();

    let album = &item["album"];
    let release_year = album["release_date"]
        .as_str()
        .and_then(|d| d.get(..4))
        .and_then(|y| y.parse::<i32>().ok());
    let cover_art_url = album["images"].as_array().and_then(|images| {
        images
            .iter()
            .filter_map(|img| Some((img["width"].as_u64().unwrap_or(0), img["url"].as_str()?)))
            .max_by_key(|(width, _)| *width)
            .map(|(_, url)| url.to_string())
    });
    let duration_seconds = item["duration_ms"]
        .as_u64()
        .and_then(|ms| u32::try_from(ms / 1000).ok());

    Some(CatalogCandidate {
        title,
        artist_names,
        album_name: album["name"].as_str().unwrap_or_default().to_string(),
        duration_seconds,
        release_year,
        cover_art_url,
    })
}
