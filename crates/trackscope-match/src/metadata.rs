use trackscope_core::{MetadataSource, ScoredResult};

use crate::normalize::{channel_artist_hint, classify_channel_as_artist};

/// Choose the tags to write for a resolved track.
///
/// Catalog record first, then an artist/title pair parsed from the video
/// title, then the cleaned title with the channel as artist when the channel
/// looks like an artist's own.
pub fn metadata_source(scored: &ScoredResult) -> MetadataSource {
    if let Some(candidate) = scored.catalog_match() {
        return MetadataSource::Catalog(candidate.clone());
    }

    let result = scored.result();
    if let (Some(artist), Some(title)) = (&result.extracted_artist, &result.extracted_title) {
        return MetadataSource::Extracted {
            artist: artist.clone(),
            title: title.clone(),
        };
    }

    let artist = if classify_channel_as_artist(result.channel_name()) {
        channel_artist_hint(result.channel_name())
    } else {
        None
    };
    MetadataSource::Fallback {
        title: result.display_title.clone(),
        artist,
    }
}
