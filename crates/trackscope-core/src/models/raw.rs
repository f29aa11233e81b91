use serde::{Deserialize, Deserializer, Serialize};

/// One entry returned by a video-platform search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawResult {
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default, alias = "channel")]
    pub channel_name: String,

    /// `None` when the provider reported no usable duration.
    #[serde(
        default,
        alias = "duration",
        deserialize_with = "deserialize_duration",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration_seconds: Option<u32>,

    #[serde(default, alias = "views", skip_serializing_if = "Option::is_none")]
    pub view_count: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RawResult {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        channel_name: impl Into<String>,
        duration_seconds: Option<u32>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            channel_name: channel_name.into(),
            duration_seconds,
            view_count: None,
            description: None,
        }
    }

    pub fn with_views(mut self, views: u64) -> Self {
        self.view_count = Some(views);
        self
    }
}

/// Parse a clock-style duration (`"3:45"`, `"1:02:03"`) or a bare number of
/// seconds.
pub fn parse_clock_duration(input: &str) -> Option<u32> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let mut total: u32 = 0;
    let parts: Vec<&str> = input.split(':').collect();
    if parts.len() > 3 {
        return None;
    }
    for (idx, part) in parts.iter().enumerate() {
        let value: u32 = part.trim().parse().ok()?;
        // Minutes and seconds after the leading field are base-60 digits.
        if idx > 0 && value >= 60 {
            return None;
        }
        total = total.checked_mul(60)?.checked_add(value)?;
    }
    Some(total)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DurationRepr {
    Seconds(u64),
    Float(f64),
    Clock(String),
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let repr: Option<DurationRepr> = Option::deserialize(deserializer)?;
    Ok(match repr {
        Some(DurationRepr::Seconds(secs)) => u32::try_from(secs).ok(),
        Some(DurationRepr::Float(secs)) if secs.is_finite() && secs >= 0.0 => {
            u32::try_from(secs.round() as u64).ok()
        }
        Some(DurationRepr::Float(_)) => None,
        Some(DurationRepr::Clock(text)) => parse_clock_duration(&text),
        None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_minutes_seconds() {
        assert_eq!(parse_clock_duration("3:45"), Some(225));
        assert_eq!(parse_clock_duration("1:02:03"), Some(3723));
        assert_eq!(parse_clock_duration("240"), Some(240));
    }

    #[test]
    fn clock_rejects_garbage() {
        assert_eq!(parse_clock_duration(""), None);
        assert_eq!(parse_clock_duration("abc"), None);
        assert_eq!(parse_clock_duration("3:75"), None);
        assert_eq!(parse_clock_duration("1:2:3:4"), None);
    }

    #[test]
    fn deserializes_provider_aliases() {
        let raw: RawResult = serde_json::from_str(
            r#"{"id":"abc","title":"Song","channel":"Chan","duration":"4:20","views":12}"#,
        )
        .unwrap();
        assert_eq!(raw.channel_name, "Chan");
        assert_eq!(raw.duration_seconds, Some(260));
        assert_eq!(raw.view_count, Some(12));
    }

    #[test]
    fn missing_or_bad_duration_is_none() {
        let raw: RawResult = serde_json::from_str(r#"{"id":"a","title":"t"}"#).unwrap();
        assert_eq!(raw.duration_seconds, None);

        let raw: RawResult =
            serde_json::from_str(r#"{"id":"a","title":"t","duration_seconds":"n/a"}"#).unwrap();
        assert_eq!(raw.duration_seconds, None);

        let raw: RawResult =
            serde_json::from_str(r#"{"id":"a","title":"t","duration_seconds":null}"#).unwrap();
        assert_eq!(raw.duration_seconds, None);
    }
}
