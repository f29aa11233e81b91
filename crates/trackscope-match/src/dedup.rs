use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use trackscope_core::{ClassifiedResult, DedupConfig};

use crate::normalize::{
    classify_channel_as_artist, compact, comparison_key, core_title, is_artist_query, similarity,
};

/// Channel-name markers of an official upload.
const OFFICIAL_CHANNEL_MARKERS: &[&str] = &["vevo", "official", "- topic"];

static TRAILING_SEGMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*[\(\[][^\)\]]*[\)\]]\s*$").expect("valid regex"));

#[derive(Debug, Clone)]
pub struct Deduplicator {
    similarity_threshold: f64,
    duration_tolerance_secs: Option<u32>,
    artist_variety: bool,
    variety_threshold: f64,
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new(&DedupConfig::default())
    }
}

impl Deduplicator {
    pub fn new(config: &DedupConfig) -> Self {
        Self {
            similarity_threshold: config.similarity_threshold.clamp(0.0, 1.0),
            duration_tolerance_secs: config.duration_tolerance_secs,
            artist_variety: config.artist_variety,
            variety_threshold: config.variety_threshold.clamp(0.0, 1.0),
        }
    }

    /// Collapse near-identical entries into one representative each.
    ///
    /// Disqualified entries are dropped. Representatives keep their relative
    /// input order.
    pub fn deduplicate(&self, results: Vec<ClassifiedResult>) -> Vec<ClassifiedResult> {
        let entries: Vec<ClassifiedResult> = results
            .into_iter()
            .filter(|r| !r.content_tag.is_disqualified())
            .collect();
        let cores: Vec<String> = entries
            .iter()
            .map(|r| core_title(&r.normalized_title))
            .collect();

        let input = entries.len();
        let kept = collapse(entries, |entries, i, j| {
            self.is_duplicate(&entries[i], &cores[i], &entries[j], &cores[j])
        });
        debug!(input, groups = kept.len(), "deduplicated candidates");
        kept
    }

    /// For a bare artist-name query, keep one upload per song.
    ///
    /// Titles are compared with the query's artist prefix and any trailing
    /// bracketed segment removed, at the looser variety threshold. Other
    /// queries, or a disabled `artist_variety`, pass through unchanged.
    pub fn ensure_variety(&self, results: Vec<ClassifiedResult>, query: &str) -> Vec<ClassifiedResult> {
        if !self.artist_variety || !is_artist_query(query) || results.len() < 2 {
            return results;
        }

        let query_words: Vec<String> = comparison_key(query)
            .split_whitespace()
            .map(str::to_string)
            .collect();
        let songs: Vec<String> = results
            .iter()
            .map(|r| song_part(&r.normalized_title, &query_words))
            .collect();

        let input = results.len();
        let kept = collapse(results, |_, i, j| {
            !songs[i].is_empty()
                && !songs[j].is_empty()
                && similarity(&songs[i], &songs[j]) / 100.0 >= self.variety_threshold
        });
        debug!(query, input, songs = kept.len(), "collapsed artist query to distinct songs");
        kept
    }

    fn is_duplicate(
        &self,
        left: &ClassifiedResult,
        left_core: &str,
        right: &ClassifiedResult,
        right_core: &str,
    ) -> bool {
        if left_core.is_empty() || right_core.is_empty() {
            return false;
        }
        if similarity(left_core, right_core) / 100.0 < self.similarity_threshold {
            return false;
        }
        match (
            self.duration_tolerance_secs,
            left.duration_seconds(),
            right.duration_seconds(),
        ) {
            (Some(tolerance), Some(a), Some(b)) => a.abs_diff(b) <= tolerance,
            _ => true,
        }
    }
}

/// Union every pair `same` accepts, then keep one representative per group,
/// in input order.
fn collapse<F>(entries: Vec<ClassifiedResult>, same: F) -> Vec<ClassifiedResult>
where
    F: Fn(&[ClassifiedResult], usize, usize) -> bool,
{
    let mut dsu = DisjointSet::new(entries.len());
    for i in 0..entries.len() {
        for j in (i + 1)..entries.len() {
            if same(&entries, i, j) {
                dsu.union(i, j);
            }
        }
    }

    let mut components: HashMap<usize, Vec<usize>> = HashMap::new();
    for idx in 0..entries.len() {
        components.entry(dsu.find(idx)).or_default().push(idx);
    }

    let mut keep = vec![false; entries.len()];
    for indexes in components.into_values() {
        keep[choose_representative(&indexes, &entries)] = true;
    }

    entries
        .into_iter()
        .zip(keep)
        .filter_map(|(entry, kept)| kept.then_some(entry))
        .collect()
}

/// The song named by a title once any trailing bracketed segment ("(Live)",
/// "[Remastered]") is gone and the query's leading artist words are dropped.
fn song_part(normalized_title: &str, query_words: &[String]) -> String {
    let title = comparison_key(&TRAILING_SEGMENT_RE.replace(normalized_title, ""));
    for n in (1..=query_words.len()).rev() {
        let phrase = query_words[..n].join(" ");
        if let Some(rest) = title.strip_prefix(phrase.as_str()) {
            if rest.starts_with(' ') {
                return rest.trim().to_string();
            }
        }
    }
    title
}

/// Whether a result was uploaded by an official or the artist's own channel.
pub fn is_authoritative_channel(result: &ClassifiedResult) -> bool {
    let channel = result.channel_name().to_lowercase();
    if OFFICIAL_CHANNEL_MARKERS
        .iter()
        .any(|marker| channel.contains(marker))
    {
        return true;
    }

    if !classify_channel_as_artist(&channel) {
        return false;
    }
    let channel_compact = compact(&channel);
    result
        .extracted_artist
        .as_deref()
        .map(compact)
        .is_some_and(|artist| {
            !artist.is_empty() && !channel_compact.is_empty() && channel_compact.contains(&artist)
        })
}

/// Authoritative channel first, then more views, then earliest position.
fn choose_representative(indexes: &[usize], entries: &[ClassifiedResult]) -> usize {
    let mut best_idx = indexes[0];
    let mut best_key = representative_key(&entries[best_idx]);

    for idx in indexes.iter().copied().skip(1) {
        let key = representative_key(&entries[idx]);
        if key > best_key {
            best_key = key;
            best_idx = idx;
        }
    }

    best_idx
}

fn representative_key(result: &ClassifiedResult) -> (bool, u64) {
    (
        is_authoritative_channel(result),
        result.raw.view_count.unwrap_or(0),
    )
}

#[derive(Debug, Clone)]
struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            let root = self.find(self.parent[x]);
            self.parent[x] = root;
        }
        self.parent[x]
    }

    fn union(&mut self, left: usize, right: usize) {
        let left_root = self.find(left);
        let right_root = self.find(right);

        if left_root == right_root {
            return;
        }

        match self.rank[left_root].cmp(&self.rank[right_root]) {
            std::cmp::Ordering::Less => self.parent[left_root] = right_root,
            std::cmp::Ordering::Greater => self.parent[right_root] = left_root,
            std::cmp::Ordering::Equal => {
                self.parent[right_root] = left_root;
                self.rank[left_root] += 1;
            }
        }
    }
}
