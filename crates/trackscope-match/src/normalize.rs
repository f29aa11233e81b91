//! Title cleanup, artist/title extraction and fuzzy text similarity.

use once_cell::sync::Lazy;
use regex::Regex;

static BRACKETED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\(\[\{]([^\(\)\[\]\{\}]*)[\)\]\}]").expect("valid regex"));
static TRAILING_DECORATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:\s*[-–—:|]\s*|\s+)(?:official(?:\s+(?:music|lyric))?(?:\s+(?:video|audio|visualizer))?|(?:music|lyric)\s+video|lyrics)\s*$",
    )
    .expect("valid regex")
});
static BRACKETED_FEAT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[\(\[]\s*(?:feat\.?|ft\.?|featuring|with)\s[^\)\]]*[\)\]]").expect("valid regex")
});
static INLINE_FEAT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s(?:feat\.?|ft\.?|featuring)\s+[^\(\[\|]*").expect("valid regex")
});
static BY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^(.+)\s+by\s+(.+)$").expect("valid regex"));
static CHANNEL_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*(?:-\s*topic|vevo|official(?:\s+channel)?)\s*$").expect("valid regex")
});
static ARTIST_QUERY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L}\s&]+$").expect("valid regex"));

/// Words that only ever appear in platform-added title decorations.
const DECORATION_WORDS: &[&str] = &[
    "official", "video", "audio", "music", "lyric", "lyrics", "with", "and", "hd", "hq", "4k",
    "8k", "uhd", "1080p", "720p", "60fps", "visualizer", "visualiser", "clip", "mv", "videoclip",
];

/// Channel-name tokens that mark a label or aggregator rather than an artist.
const LABEL_TOKENS: &[&str] = &["music", "official", "records", "entertainment"];

const ARTIST_TITLE_SEPARATORS: &[&str] = &[" - ", " – ", " — "];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTitle {
    /// Decorations stripped, original casing.
    pub display: String,
    /// Decorations stripped, lowercased, whitespace collapsed.
    pub normalized: String,
}

pub fn normalize(raw_title: &str) -> NormalizedTitle {
    let display = strip_decorations(raw_title);
    let normalized = display.to_lowercase();
    NormalizedTitle {
        display,
        normalized,
    }
}

fn strip_decorations(raw_title: &str) -> String {
    let without_brackets = BRACKETED_RE.replace_all(raw_title, |caps: &regex::Captures<'_>| {
        if is_decoration(&caps[1]) {
            " ".to_string()
        } else {
            caps[0].to_string()
        }
    });

    let kept_segments: Vec<&str> = without_brackets
        .split('|')
        .filter(|segment| !is_decoration(segment))
        .collect();
    let mut title = collapse_whitespace(&kept_segments.join(" | "));

    // "Song Official Music Video Lyrics" carries more than one trailing tag.
    for _ in 0..3 {
        let stripped = TRAILING_DECORATION_RE.replace(&title, "").into_owned();
        if stripped == title || stripped.trim().is_empty() {
            break;
        }
        title = stripped;
    }

    trim_separators(&collapse_whitespace(&title)).to_string()
}

fn is_decoration(segment: &str) -> bool {
    segment
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .all(|token| {
            let token = token.to_lowercase();
            DECORATION_WORDS.contains(&token.as_str())
        })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn trim_separators(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '–' | '—' | '|' | ':'))
}

/// Split a video title into `(artist, title)`.
///
/// `"<Artist> - <Title>"` is tried before `"<Title> by <Artist>"`.
pub fn extract_artist_title(raw_title: &str) -> Option<(String, String)> {
    let display = normalize(raw_title).display;

    for separator in ARTIST_TITLE_SEPARATORS {
        if let Some((artist, title)) = display.split_once(separator) {
            let artist = trim_separators(artist);
            let title = trim_separators(title);
            if !artist.is_empty() && !title.is_empty() {
                return Some((artist.to_string(), title.to_string()));
            }
        }
    }

    let caps = BY_RE.captures(&display)?;
    let title = trim_separators(caps.get(1)?.as_str());
    let artist = trim_separators(caps.get(2)?.as_str());
    if artist.is_empty() || title.is_empty() {
        return None;
    }
    Some((artist.to_string(), title.to_string()))
}

/// Heuristic: short channel names without label vocabulary are artist channels.
pub fn classify_channel_as_artist(channel_name: &str) -> bool {
    let lower = channel_name.to_lowercase();
    if LABEL_TOKENS.iter().any(|token| lower.contains(token)) {
        return false;
    }
    let words = lower.split_whitespace().count();
    words > 0 && words <= 3
}

/// Whether a search query reads like a bare artist name ("illenium",
/// "simon & garfunkel", "queen songs") rather than a specific song: letters,
/// spaces and `&` only, so no `" - "` separator, brackets or digits.
pub fn is_artist_query(query: &str) -> bool {
    let query = query.trim();
    !query.is_empty() && ARTIST_QUERY_RE.is_match(query)
}

/// Channel name with platform suffixes (`VEVO`, `- Topic`, `Official`) removed.
pub fn channel_artist_hint(channel_name: &str) -> Option<String> {
    let mut hint = channel_name.trim().to_string();
    loop {
        let stripped = CHANNEL_SUFFIX_RE.replace(&hint, "").trim().to_string();
        if stripped == hint {
            break;
        }
        hint = stripped;
    }
    let hint = trim_separators(&hint).to_string();
    (!hint.is_empty()).then_some(hint)
}

/// Title reduced to what identifies the song: no decorations, no featuring
/// credits, no punctuation. Used for duplicate detection.
pub fn core_title(title: &str) -> String {
    let stripped = normalize(title).normalized;
    let stripped = BRACKETED_FEAT_RE.replace_all(&stripped, " ");
    let parts: Vec<String> = stripped
        .split(" - ")
        .map(|part| INLINE_FEAT_RE.replace_all(part, " ").into_owned())
        .collect();
    comparison_key(&parts.join(" "))
}

/// Lowercase, punctuation-free, whitespace-collapsed form used for comparisons.
pub fn comparison_key(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '\'' | '’' | '`'))
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    collapse_whitespace(&cleaned)
}

/// Token-sequence edit-distance similarity on a 0–100 scale.
///
/// Takes the better of the plain normalized Levenshtein ratio and the ratio of
/// token-sorted keys, so reordered `"A - B"` / `"B - A"` titles still match.
pub fn similarity(a: &str, b: &str) -> f64 {
    let ka = comparison_key(a);
    let kb = comparison_key(b);
    if ka.is_empty() || kb.is_empty() {
        return 0.0;
    }
    if ka == kb {
        return 100.0;
    }

    let plain = strsim::normalized_levenshtein(&ka, &kb);
    let sorted = strsim::normalized_levenshtein(&token_sort(&ka), &token_sort(&kb));
    plain.max(sorted) * 100.0
}

fn token_sort(key: &str) -> String {
    let mut tokens: Vec<&str> = key.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Compact alphanumeric form: `"Imagine Dragons"` and `"ImagineDragons"` agree.
pub(crate) fn compact(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
