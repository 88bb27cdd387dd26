use crate::types::Score;

/// Accepts a bare integer in `0..=100` or the literal `tbd`.
pub fn parse_score(raw: &str) -> Option<Score> {
    let text = raw.trim();
    if text.eq_ignore_ascii_case("tbd") {
        return Some(Score::Pending);
    }
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse::<u8>()
        .ok()
        .filter(|score| *score <= 100)
        .map(Score::Critic)
}
