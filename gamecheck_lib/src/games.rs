//! The games list: one name per line, `#` comments and blank lines skipped.

use std::path::{Path, PathBuf};

use crate::error::GameCheckError;
use crate::validation::validate_game_name;

/// Written when the list does not exist yet.
pub const SAMPLE_GAMES: &str = "# Example: Cyberpunk 2077\nElden Ring\nGod of War\nSpider-Man Remastered\n";

/// Result of [`load_or_create`].
#[derive(Debug, Clone, PartialEq)]
pub enum GamesList {
    Loaded(Vec<String>),
    /// The list was missing and a sample was written in its place.
    CreatedSample(PathBuf),
}

/// Game names in file order. Lines that fail validation are skipped with
/// a warning.
pub fn parse_games(contents: &str) -> Vec<String> {
    contents
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            match validate_game_name(line) {
                Ok(name) => Some(name),
                Err(e) => {
                    tracing::warn!("skipping line {}: {}", idx + 1, e);
                    None
                }
            }
        })
        .collect()
}

pub fn read_games(path: &Path) -> Result<Vec<String>, GameCheckError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(parse_games(&contents))
}

/// Reads the list, or writes [`SAMPLE_GAMES`] to `path` if it is missing.
pub fn load_or_create(path: &Path) -> Result<GamesList, GameCheckError> {
    if path.exists() {
        return Ok(GamesList::Loaded(read_games(path)?));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, SAMPLE_GAMES)?;
    tracing::info!("created sample games list at {}", path.display());
    Ok(GamesList::CreatedSample(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_and_blanks_skipped() {
        let games = parse_games("# header\n\nElden Ring\n   \n  Hades  \n#Celeste\n");
        assert_eq!(games, vec!["Elden Ring", "Hades"]);
    }

    #[test]
    fn sample_is_parseable() {
        assert_eq!(
            parse_games(SAMPLE_GAMES),
            vec!["Elden Ring", "God of War", "Spider-Man Remastered"]
        );
    }

    #[test]
    fn missing_list_creates_sample() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lists").join("games.txt");

        let first = load_or_create(&path).unwrap();
        assert_eq!(first, GamesList::CreatedSample(path.clone()));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), SAMPLE_GAMES);

        match load_or_create(&path).unwrap() {
            GamesList::Loaded(games) => assert_eq!(games.len(), 3),
            other => panic!("expected loaded list, got {:?}", other),
        }
    }
}
