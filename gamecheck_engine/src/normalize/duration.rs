use std::sync::LazyLock;

use regex::Regex;

use crate::types::Playtime;

static HALF_GLYPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*(?:½|&#189;)").expect("valid half-glyph regex"));

static HOURS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?|\.\d+)\s*h(?:our(?:s)?)?").expect("valid hours regex")
});

static MINUTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?|\.\d+)\s*m(?:in(?:ute(?:s)?)?)?").expect("valid minutes regex")
});

/// Parses durations such as `12 Hours`, `10½ Hours`, `45 Mins` or `1h 30m`.
///
/// A fractional hour contributes its remainder as minutes, and a separate
/// minute token adds on top: `1.5 Hours 20 Mins` is 1h 50m. Minutes roll
/// over at 60.
pub fn parse_playtime(raw: &str) -> Option<Playtime> {
    let text = raw.trim();
    if text.is_empty() || text.trim_matches('-').is_empty() {
        return None;
    }
    let lower = text.to_lowercase();
    if lower.contains("n/a") || lower.contains("not available") {
        return None;
    }

    let text = HALF_GLYPH.replace_all(text, ".5");
    let hours = HOURS
        .captures(&text)
        .and_then(|cap| cap[1].parse::<f64>().ok());
    let minutes = MINUTES
        .captures(&text)
        .and_then(|cap| cap[1].parse::<f64>().ok());

    if hours.is_none() && minutes.is_none() {
        return None;
    }

    let mut whole_hours = 0u32;
    let mut total_minutes = 0u32;
    if let Some(h) = hours {
        whole_hours = h.trunc() as u32;
        total_minutes = total_minutes.saturating_add((h.fract() * 60.0).round() as u32);
    }
    if let Some(m) = minutes {
        total_minutes = total_minutes.saturating_add(m.round() as u32);
    }
    Some(Playtime::new(whole_hours, total_minutes))
}
