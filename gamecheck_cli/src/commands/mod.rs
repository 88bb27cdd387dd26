//! CLI subcommand implementations.

pub mod lookup;
pub mod prices;
pub mod scores;
pub mod times;

use std::path::{Path, PathBuf};

use anyhow::Result;
use gamecheck_lib::games::{load_or_create, GamesList};
use indicatif::{ProgressBar, ProgressStyle};

/// Reads the games list, or creates a sample one and returns `None` so the
/// caller can stop and let the user edit it.
pub(crate) fn load_games(path: &Path) -> Result<Option<Vec<String>>> {
    match load_or_create(path)? {
        GamesList::CreatedSample(path) => {
            eprintln!(
                "Games list {} did not exist; a sample was created. Edit it and run again.",
                path.display()
            );
            Ok(None)
        }
        GamesList::Loaded(games) if games.is_empty() => {
            eprintln!("No games found in {}", path.display());
            Ok(None)
        }
        GamesList::Loaded(games) => Ok(Some(games)),
    }
}

/// `--games` when given, else the configured list.
pub(crate) fn games_path(arg: &Option<PathBuf>, configured: &Path) -> PathBuf {
    arg.clone().unwrap_or_else(|| configured.to_path_buf())
}

pub(crate) fn progress_bar(len: usize, message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template(
        "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} ({eta}) {msg}",
    ) {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_list_stops_after_sample() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("games.txt");
        assert!(load_games(&path).unwrap().is_none());
        assert_eq!(
            load_games(&path).unwrap().unwrap(),
            vec!["Elden Ring", "God of War", "Spider-Man Remastered"]
        );
    }

    #[test]
    fn comment_only_list_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("games.txt");
        std::fs::write(&path, "# nothing yet\n\n").unwrap();
        assert!(load_games(&path).unwrap().is_none());
    }

    #[test]
    fn games_flag_overrides_config() {
        let configured = Path::new("games.txt");
        assert_eq!(games_path(&None, configured), PathBuf::from("games.txt"));
        assert_eq!(
            games_path(&Some(PathBuf::from("other.txt")), configured),
            PathBuf::from("other.txt")
        );
    }
}
