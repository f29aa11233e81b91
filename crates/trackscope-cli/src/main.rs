use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use trackscope_core::{AppConfig, RawResult, ScoredResult, parse_clock_duration};
use trackscope_match::normalize::{channel_artist_hint, classify_channel_as_artist, core_title};
use trackscope_match::{
    CatalogSource, ContentClassifier, Resolver, SpotifySource, StaticCatalog, metadata_source,
};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "trackscope",
    about = "Pick the right song out of noisy video search results",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format (for scripts).
    /// Also enabled by setting TRACKSCOPE_JSON=1.
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging for trackscope crates (RUST_LOG still wins when set).
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank a file of raw search results for a query.
    Resolve {
        query: String,
        /// JSON array of raw results (or an object with a `results` array).
        #[arg(long)]
        results: PathBuf,
        /// Maximum results to return (defaults to matching.limit).
        #[arg(long)]
        limit: Option<usize>,
        /// Answer catalog lookups from a JSON table instead of the network.
        #[arg(long, conflicts_with = "no_catalog")]
        catalog_fixture: Option<PathBuf>,
        /// Skip catalog lookups entirely.
        #[arg(long)]
        no_catalog: bool,
    },

    /// Show how one title is cleaned, split and classified.
    Inspect {
        title: String,
        #[arg(long, default_value = "")]
        channel: String,
        /// Seconds or a clock value such as 3:45.
        #[arg(long)]
        duration: Option<String>,
    },

    /// Config management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

// ─── Config Actions ──────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration.
    Show,
    /// Print the config file location.
    Path,
    /// Write a default config file.
    Init {
        #[arg(long)]
        force: bool,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ResultsFile {
    List(Vec<RawResult>),
    Wrapped { results: Vec<RawResult> },
}

// ─── Main ────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let start = Instant::now();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let json_output = cli.json || std::env::var("TRACKSCOPE_JSON").as_deref() == Ok("1");

    match cli.command {
        Commands::Resolve {
            query,
            results,
            limit,
            catalog_fixture,
            no_catalog,
        } => {
            let config = AppConfig::load()?;
            let raw_results = load_results(&results)?;
            let source: Arc<dyn CatalogSource> = match (catalog_fixture, no_catalog) {
                (Some(path), _) => Arc::new(StaticCatalog::from_path(&path)?),
                (None, true) => Arc::new(StaticCatalog::new()),
                (None, false) => Arc::new(SpotifySource::new(&config.catalog)?),
            };
            debug!(source = source.name(), count = raw_results.len(), "loaded raw results");

            let resolver = Resolver::new(config.matching.clone(), source)?;
            let limit = limit.unwrap_or(config.matching.limit);
            let ranked = resolver.resolve(&query, raw_results, limit).await?;
            let dur = start.elapsed().as_millis();

            if json_output {
                let items: Vec<serde_json::Value> = ranked.iter().map(ranked_json).collect();
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "items": items, "total": items.len(), "query": query },
                    "meta": { "duration_ms": dur }
                }))?;
            } else if ranked.is_empty() {
                println!("No confident match for: {query}");
            } else {
                for (i, scored) in ranked.iter().enumerate() {
                    print_ranked(i + 1, scored);
                }
            }
        }

        Commands::Inspect {
            title,
            channel,
            duration,
        } => {
            let config = AppConfig::load()?;
            let duration_seconds = match duration.as_deref() {
                Some(text) => Some(
                    parse_clock_duration(text)
                        .with_context(|| format!("unrecognised duration: {text}"))?,
                ),
                None => None,
            };
            let classifier = ContentClassifier::new(&config.matching.classifier)?;
            let classified =
                classifier.classify(RawResult::new("inspect", &title, &channel, duration_seconds));

            let artist_channel = classify_channel_as_artist(&channel);
            let hint = channel_artist_hint(&channel);
            let core = core_title(&classified.normalized_title);

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": {
                        "classified": classified,
                        "core_title": core,
                        "channel_is_artist": artist_channel,
                        "channel_hint": hint,
                    },
                }))?;
            } else {
                println!("display:    {}", classified.display_title);
                println!("normalized: {}", classified.normalized_title);
                println!("core:       {core}");
                println!(
                    "artist:     {}",
                    classified.extracted_artist.as_deref().unwrap_or("-")
                );
                println!(
                    "title:      {}",
                    classified.extracted_title.as_deref().unwrap_or("-")
                );
                println!(
                    "channel:    {} ({})",
                    hint.as_deref().unwrap_or("-"),
                    if artist_channel { "artist" } else { "label/aggregator" }
                );
                println!("tag:        {:?}", classified.content_tag);
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let config = AppConfig::load()?;
                if json_output {
                    print_json(&serde_json::json!({"status":"ok","data":config}))?;
                } else {
                    print!("{}", toml::to_string_pretty(&config)?);
                }
            }
            ConfigAction::Path => {
                println!("{}", AppConfig::config_path().display());
            }
            ConfigAction::Init { force } => {
                let path = AppConfig::config_path();
                if path.exists() && !force {
                    bail!(
                        "{} already exists (use --force to overwrite)",
                        path.display()
                    );
                }
                AppConfig::default().save_to(&path)?;
                println!("✓ Config written: {}", path.display());
            }
        },
    }

    Ok(())
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn init_tracing(verbose: bool) {
    let fallback = if verbose {
        "trackscope_match=debug,trackscope_cli=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn load_results(path: &Path) -> Result<Vec<RawResult>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading results file {}", path.display()))?;
    let parsed: ResultsFile = serde_json::from_str(&text)
        .with_context(|| format!("parsing results file {}", path.display()))?;
    Ok(match parsed {
        ResultsFile::List(results) => results,
        ResultsFile::Wrapped { results } => results,
    })
}

fn ranked_json(scored: &ScoredResult) -> serde_json::Value {
    serde_json::json!({
        "id": scored.result().raw.id,
        "title": scored.result().display_title,
        "channel": scored.result().channel_name(),
        "tier": scored.tier,
        "confidence_score": scored.confidence_score,
        "breakdown": scored.breakdown,
        "catalog_match": scored.catalog_match(),
        "metadata": metadata_source(scored),
    })
}

fn print_ranked(position: usize, scored: &ScoredResult) {
    let result = scored.result();
    let metadata = metadata_source(scored);
    println!(
        "{position}. [{tier}] {score:>5.1}  {title}  ({channel}, {id})",
        tier = scored.tier,
        score = scored.confidence_score,
        title = result.display_title,
        channel = result.channel_name(),
        id = result.raw.id,
    );
    println!(
        "   tags: {} - {}{}",
        metadata.artist().unwrap_or_else(|| "?".to_string()),
        metadata.title(),
        if metadata.is_authoritative() { "  (catalog)" } else { "" }
    );
}

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}
