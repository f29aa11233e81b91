use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;
use trackscope_core::{ClassifiedResult, ClassifierConfig, ContentTag, RawResult};

use crate::error::Result;
use crate::normalize::{extract_artist_title, normalize};

/// "remix" inside a bracketed or parenthetical segment, e.g. `(ILLENIUM Remix)`.
static REMIX_SEGMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[\(\[][^\)\]]*\bremix\b[^\)\]]*[\)\]]").expect("valid regex"));

#[derive(Debug, Clone)]
pub struct ContentClassifier {
    min_duration_secs: u32,
    max_duration_secs: u32,
    disqualifying: Option<Regex>,
    patterns: Vec<Regex>,
}

impl ContentClassifier {
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let disqualifying = build_keyword_pattern(&config.disqualifying_keywords)?;
        let patterns = config
            .disqualifying_patterns
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(|p| Regex::new(&format!("(?i){p}")))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self {
            min_duration_secs: config.min_duration_secs,
            max_duration_secs: config.max_duration_secs,
            disqualifying,
            patterns,
        })
    }

    pub fn classify(&self, raw: RawResult) -> ClassifiedResult {
        let title = normalize(&raw.title);
        let (extracted_artist, extracted_title) = match extract_artist_title(&raw.title) {
            Some((artist, title)) => (Some(artist), Some(title)),
            None => (None, None),
        };
        let content_tag = self.content_tag(&raw, &title.normalized);
        trace!(id = %raw.id, title = %raw.title, tag = ?content_tag, "classified result");

        ClassifiedResult {
            raw,
            display_title: title.display,
            normalized_title: title.normalized,
            extracted_artist,
            extracted_title,
            content_tag,
        }
    }

    fn content_tag(&self, raw: &RawResult, normalized_title: &str) -> ContentTag {
        // Nothing left once decorations go: "[Official Video]" names no song.
        if raw.title.trim().is_empty() || normalized_title.is_empty() {
            return ContentTag::Disqualified;
        }

        let Some(duration) = raw.duration_seconds else {
            return ContentTag::Disqualified;
        };
        if duration < self.min_duration_secs || duration > self.max_duration_secs {
            return ContentTag::Disqualified;
        }

        // Remix allowance runs before the keyword gate: "(Live Remix)" stays.
        if REMIX_SEGMENT_RE.is_match(&raw.title) {
            return ContentTag::Remix;
        }

        if self
            .disqualifying
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(&raw.title))
            || self.patterns.iter().any(|pattern| pattern.is_match(&raw.title))
        {
            return ContentTag::Disqualified;
        }

        ContentTag::Studio
    }
}

/// One case-insensitive alternation of whole-word phrases; inner spaces match
/// any run of whitespace.
fn build_keyword_pattern(keywords: &[String]) -> Result<Option<Regex>> {
    let alternatives: Vec<String> = keywords
        .iter()
        .map(|k| k.split_whitespace().map(regex::escape).collect::<Vec<_>>().join(r"\s+"))
        .filter(|k| !k.is_empty())
        .collect();
    if alternatives.is_empty() {
        return Ok(None);
    }
    let pattern = format!(r"(?i)\b(?:{})\b", alternatives.join("|"));
    Ok(Some(Regex::new(&pattern)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> ContentClassifier {
        ContentClassifier::new(&ClassifierConfig::default()).unwrap()
    }

    fn raw(title: &str, duration: Option<u32>) -> RawResult {
        RawResult::new("id", title, "Channel", duration)
    }

    #[test]
    fn studio_track_passes() {
        let c = classifier().classify(raw("Imagine Dragons - Believer (Official Video)", Some(204)));
        assert_eq!(c.content_tag, ContentTag::Studio);
        assert_eq!(c.display_title, "Imagine Dragons - Believer");
        assert_eq!(c.extracted_artist.as_deref(), Some("Imagine Dragons"));
        assert_eq!(c.extracted_title.as_deref(), Some("Believer"));
    }

    #[test]
    fn live_performance_is_disqualified() {
        let c = classifier().classify(raw(
            "Queen - Bohemian Rhapsody (Live at Wembley 1986)",
            Some(360),
        ));
        assert_eq!(c.content_tag, ContentTag::Disqualified);
    }

    #[test]
    fn bracketed_remix_is_retained() {
        let c = classifier().classify(raw(
            "Nirvana - Something In The Way (ILLENIUM Remix)",
            Some(240),
        ));
        assert_eq!(c.content_tag, ContentTag::Remix);
    }

    #[test]
    fn remix_allowance_beats_keyword_gate() {
        let c = classifier().classify(raw("Artist - Song (Live Remix)", Some(200)));
        assert_eq!(c.content_tag, ContentTag::Remix);
    }

    #[test]
    fn unbracketed_remix_word_is_plain_studio() {
        let c = classifier().classify(raw("Something In The Way ILLENIUM Remix", Some(258)));
        assert_eq!(c.content_tag, ContentTag::Studio);
    }

    #[test]
    fn duration_bounds() {
        let c = classifier();
        assert_eq!(c.classify(raw("Song", Some(29))).content_tag, ContentTag::Disqualified);
        assert_eq!(c.classify(raw("Song", Some(30))).content_tag, ContentTag::Studio);
        assert_eq!(c.classify(raw("Song", Some(600))).content_tag, ContentTag::Studio);
        assert_eq!(c.classify(raw("Song", Some(601))).content_tag, ContentTag::Disqualified);
        assert_eq!(c.classify(raw("Song", None)).content_tag, ContentTag::Disqualified);
    }

    #[test]
    fn duration_gate_applies_to_remixes() {
        let c = classifier().classify(raw("Artist - Song (Extended Remix)", Some(3600)));
        assert_eq!(c.content_tag, ContentTag::Disqualified);
    }

    #[test]
    fn empty_title_is_disqualified() {
        let c = classifier().classify(raw("   ", Some(200)));
        assert_eq!(c.content_tag, ContentTag::Disqualified);
    }

    #[test]
    fn decoration_only_title_is_disqualified() {
        let c = classifier();
        let decorated = c.classify(raw("[Official Video]", Some(200)));
        assert_eq!(decorated.normalized_title, "");
        assert_eq!(decorated.content_tag, ContentTag::Disqualified);
        assert_eq!(
            c.classify(raw("(Official Audio) [HD]", Some(200))).content_tag,
            ContentTag::Disqualified
        );
    }

    #[test]
    fn compilations_and_mashups_are_disqualified() {
        let c = classifier();
        for title in [
            "Chill Vibes Playlist 2024",
            "Best of Queen (Compilation)",
            "Mashup of Imagine Dragons Songs",
        ] {
            assert_eq!(
                c.classify(raw(title, Some(500))).content_tag,
                ContentTag::Disqualified,
                "{title}"
            );
        }
        assert_eq!(
            c.classify(raw("Artist - Mashup", Some(200))).content_tag,
            ContentTag::Studio
        );
    }

    #[test]
    fn numbered_dj_mixes_are_disqualified() {
        let c = classifier();
        assert_eq!(
            c.classify(raw("Deep House Mix #12", Some(590))).content_tag,
            ContentTag::Disqualified
        );
        assert_eq!(
            c.classify(raw("Summer MIX 3", Some(590))).content_tag,
            ContentTag::Disqualified
        );
        assert_eq!(
            c.classify(raw("Artist - Song (Radio Mix)", Some(200))).content_tag,
            ContentTag::Studio
        );
        assert_eq!(
            c.classify(raw("Artist - Song (Remix 2)", Some(200))).content_tag,
            ContentTag::Remix
        );
    }

    #[test]
    fn invalid_pattern_is_a_config_error() {
        let config = ClassifierConfig {
            disqualifying_patterns: vec![r"mix(\d+".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            ContentClassifier::new(&config),
            Err(crate::error::MatchError::InvalidPattern(_))
        ));
    }

    #[test]
    fn cover_only_as_standalone_word() {
        let c = classifier();
        assert_eq!(
            c.classify(raw("Artist - Song (Cover)", Some(200))).content_tag,
            ContentTag::Disqualified
        );
        assert_eq!(
            c.classify(raw("Daft Punk - Discovery", Some(200))).content_tag,
            ContentTag::Studio
        );
        assert_eq!(
            c.classify(raw("Artist - Recovery", Some(200))).content_tag,
            ContentTag::Studio
        );
    }

    #[test]
    fn multi_word_keywords_tolerate_spacing() {
        let c = classifier().classify(raw("Artist - Record FULL   ALBUM", Some(500)));
        assert_eq!(c.content_tag, ContentTag::Disqualified);
    }

    #[test]
    fn empty_keyword_list_disables_gate() {
        let config = ClassifierConfig {
            disqualifying_keywords: Vec::new(),
            disqualifying_patterns: Vec::new(),
            ..Default::default()
        };
        let c = ContentClassifier::new(&config).unwrap();
        assert_eq!(
            c.classify(raw("Queen - Bohemian Rhapsody (Live)", Some(360))).content_tag,
            ContentTag::Studio
        );
    }
}
