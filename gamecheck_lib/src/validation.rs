use crate::error::GameCheckError;
use crate::sources::Source;

pub const MAX_GAME_NAME_LENGTH: usize = 150;

/// Strips control characters and trims; rejects over-long or empty input.
pub fn sanitize_text(input: &str, max_len: usize) -> Result<String, GameCheckError> {
    if input.len() > max_len {
        return Err(GameCheckError::InvalidInput(format!(
            "input exceeds maximum length of {} bytes",
            max_len
        )));
    }
    let sanitized: String = input
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_string();
    if sanitized.is_empty() {
        return Err(GameCheckError::InvalidInput(
            "input is empty after sanitization".to_string(),
        ));
    }
    Ok(sanitized)
}

/// Validate a game name before it is sent to any source.
pub fn validate_game_name(input: &str) -> Result<String, GameCheckError> {
    sanitize_text(input, MAX_GAME_NAME_LENGTH)
}

/// Parse a comma-separated source list, e.g. `steam,ps`. Duplicates are
/// dropped, first mention wins.
pub fn validate_sources(input: &str) -> Result<Vec<Source>, GameCheckError> {
    let mut sources = Vec::new();
    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let source: Source = part.parse()?;
        if !sources.contains(&source) {
            sources.push(source);
        }
    }
    if sources.is_empty() {
        return Err(GameCheckError::InvalidInput(
            "no sources given".to_string(),
        ));
    }
    Ok(sources)
}
