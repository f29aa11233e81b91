use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackscopeError};

/// Root application configuration, loaded from `~/.config/trackscope/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub matching: MatchConfig,
    pub catalog: CatalogConfig,
}

/// Every threshold the resolution engine uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Maximum number of ranked results returned per query.
    pub limit: usize,
    pub classifier: ClassifierConfig,
    pub dedup: DedupConfig,
    pub scoring: ScoringConfig,
    pub lookup: LookupConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub min_duration_secs: u32,
    pub max_duration_secs: u32,
    /// Whole-word phrases that mark a result as not a single studio song.
    pub disqualifying_keywords: Vec<String>,
    /// Case-insensitive regular expressions for shapes a keyword can't
    /// express, such as numbered DJ mixes.
    pub disqualifying_patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Core-title similarity on a 0.0–1.0 scale.
    pub similarity_threshold: f64,
    /// When set, grouped entries must also agree on duration within this many seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_tolerance_secs: Option<u32>,
    /// For bare artist-name queries, also collapse uploads of the same song
    /// once the artist prefix and trailing brackets are ignored, so the list
    /// shows distinct songs.
    pub artist_variety: bool,
    /// Song-title similarity (0.0–1.0) used by `artist_variety`.
    pub variety_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub title_weight: f64,
    pub duration_weight: f64,
    pub artist_weight: f64,
    pub duration_tolerance_secs: u32,
    pub high_confidence_threshold: f64,
    pub medium_confidence_threshold: f64,
    pub platform_only_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Simultaneous catalog lookups.
    pub concurrency: usize,
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    /// Candidates requested from the catalog per query.
    pub candidates_per_query: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
    pub token_env: String,
    pub cache_ttl_secs: u64,
    pub min_request_interval_ms: u64,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            limit: 5,
            classifier: ClassifierConfig::default(),
            dedup: DedupConfig::default(),
            scoring: ScoringConfig::default(),
            lookup: LookupConfig::default(),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        let keywords = [
            "live",
            "full album",
            "cover",
            "concert",
            "full concert",
            "karaoke",
            "reaction",
            "interview",
            "documentary",
            "trailer",
            "teaser",
            "tutorial",
            "setlist",
            "playlist",
            "compilation",
            "mashup of",
        ];
        Self {
            min_duration_secs: 30,
            max_duration_secs: 600,
            disqualifying_keywords: keywords.iter().map(|k| k.to_string()).collect(),
            disqualifying_patterns: vec![r"\bmix\s*#?\d+\b".to_string()],
        }
    }
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.85,
            duration_tolerance_secs: None,
            artist_variety: false,
            variety_threshold: 0.70,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            title_weight: 0.40,
            duration_weight: 0.35,
            artist_weight: 0.25,
            duration_tolerance_secs: 5,
            high_confidence_threshold: 80.0,
            medium_confidence_threshold: 60.0,
            platform_only_threshold: 75.0,
        }
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            timeout_ms: 8_000,
            max_retries: 2,
            backoff_base_ms: 250,
            candidates_per_query: 5,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.spotify.com".to_string(),
            token_env: "TRACKSCOPE_SPOTIFY_TOKEN".to_string(),
            cache_ttl_secs: 3600,
            min_request_interval_ms: 100,
        }
    }
}

// ─── Validation ────────────────────────────────────────────

impl MatchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(invalid("matching.limit must be at least 1"));
        }

        let c = &self.classifier;
        if c.min_duration_secs >= c.max_duration_secs {
            return Err(invalid(
                "classifier.min_duration_secs must be below max_duration_secs",
            ));
        }
        if c.disqualifying_keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(invalid("classifier.disqualifying_keywords contains a blank entry"));
        }
        if c.disqualifying_patterns.iter().any(|p| p.trim().is_empty()) {
            return Err(invalid("classifier.disqualifying_patterns contains a blank entry"));
        }

        if !(0.0..=1.0).contains(&self.dedup.similarity_threshold) {
            return Err(invalid("dedup.similarity_threshold must be within 0.0..=1.0"));
        }
        if !(0.0..=1.0).contains(&self.dedup.variety_threshold) {
            return Err(invalid("dedup.variety_threshold must be within 0.0..=1.0"));
        }

        let s = &self.scoring;
        let weights = [s.title_weight, s.duration_weight, s.artist_weight];
        if weights.iter().any(|w| *w < 0.0) {
            return Err(invalid("scoring weights must not be negative"));
        }
        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(invalid(&format!(
                "scoring weights must sum to 1.0 (got {sum:.3})"
            )));
        }
        for (name, value) in [
            ("high_confidence_threshold", s.high_confidence_threshold),
            ("medium_confidence_threshold", s.medium_confidence_threshold),
            ("platform_only_threshold", s.platform_only_threshold),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(invalid(&format!("scoring.{name} must be within 0..=100")));
            }
        }
        if s.medium_confidence_threshold > s.high_confidence_threshold {
            return Err(invalid(
                "scoring.medium_confidence_threshold must not exceed high_confidence_threshold",
            ));
        }

        let l = &self.lookup;
        if l.concurrency == 0 {
            return Err(invalid("lookup.concurrency must be at least 1"));
        }
        if l.timeout_ms == 0 {
            return Err(invalid("lookup.timeout_ms must be positive"));
        }
        if l.candidates_per_query == 0 {
            return Err(invalid("lookup.candidates_per_query must be at least 1"));
        }

        Ok(())
    }
}

fn invalid(message: &str) -> TrackscopeError {
    TrackscopeError::ValidationError(message.to_string())
}

impl LookupConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Backoff before retry number `attempt` (0-based): base, 2×base, 4×base…
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        Duration::from_millis(self.backoff_base_ms.saturating_mul(factor))
    }
}

impl CatalogConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.min_request_interval_ms)
    }

    /// Bearer token read from the configured environment variable.
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl AppConfig {
    /// Standard config file path: `~/.config/trackscope/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("TRACKSCOPE_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("trackscope")
            .join("config.toml")
    }

    /// Load config from disk, falling back to defaults if file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        Self::load_from(&path)
    }

    /// Load and validate config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.matching.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = AppConfig::default();
        cfg.matching.validate().unwrap();
        assert_eq!(cfg.matching.limit, 5);
        assert_eq!(cfg.matching.classifier.min_duration_secs, 30);
        assert_eq!(cfg.matching.classifier.max_duration_secs, 600);
        assert_eq!(cfg.matching.dedup.similarity_threshold, 0.85);
        assert_eq!(cfg.matching.scoring.duration_tolerance_secs, 5);
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = AppConfig::default();
        cfg.matching.limit = 8;
        cfg.matching.dedup.duration_tolerance_secs = Some(10);
        cfg.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[matching.scoring]\nplatform_only_threshold = 70.0\n").unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.matching.scoring.platform_only_threshold, 70.0);
        assert_eq!(loaded.matching.scoring.high_confidence_threshold, 80.0);
        assert_eq!(loaded.matching.limit, 5);
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let cfg =
            AppConfig::load_from(Path::new("/tmp/nonexistent_trackscope_config.toml")).unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[matching]\nlimit = 0\n").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, TrackscopeError::ValidationError(_)));
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let mut cfg = MatchConfig::default();
        cfg.scoring.artist_weight = 0.5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_duration_bounds_must_be_ordered() {
        let mut cfg = MatchConfig::default();
        cfg.classifier.min_duration_secs = 600;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_blank_patterns_are_rejected() {
        let mut cfg = MatchConfig::default();
        cfg.classifier.disqualifying_patterns.push("  ".to_string());
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_artist_variety_is_opt_in() {
        let cfg = MatchConfig::default();
        assert!(!cfg.dedup.artist_variety);
        assert_eq!(cfg.dedup.variety_threshold, 0.70);

        let mut out_of_range = cfg.clone();
        out_of_range.dedup.variety_threshold = 1.5;
        assert!(out_of_range.validate().is_err());
    }

    #[test]
    fn test_backoff_doubles() {
        let lookup = LookupConfig {
            backoff_base_ms: 100,
            ..Default::default()
        };
        assert_eq!(lookup.backoff(0), Duration::from_millis(100));
        assert_eq!(lookup.backoff(1), Duration::from_millis(200));
        assert_eq!(lookup.backoff(2), Duration::from_millis(400));
    }
}
