//! HTML dumps of pages that yielded nothing, for fixing selectors later.

use std::path::{Path, PathBuf};

use crate::scrape::Page;
use crate::sources::Source;

const MAX_NAME_LEN: usize = 50;

/// Writes fetched pages to a directory, one file per source and game.
#[derive(Debug, Clone)]
pub struct DebugDumper {
    dir: PathBuf,
}

/// File-name-safe form of a game name: word characters, spaces and dashes
/// kept, whitespace runs become `_`, at most 50 characters.
pub fn clean_filename(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();
    kept.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .take(MAX_NAME_LEN)
        .collect()
}

impl DebugDumper {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, source: Source, game: &str) -> PathBuf {
        self.dir
            .join(format!("{}_debug_{}.html", source.key(), clean_filename(game)))
    }

    /// Writes `page` with a comment header naming the URL and the game.
    pub fn dump(&self, source: Source, game: &str, page: &Page) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(source, game);
        let contents = format!(
            "<!-- URL: {} -->\n<!-- Game: {} -->\n{}",
            page.url,
            game.replace("--", "- -"),
            page.body
        );
        std::fs::write(&path, contents)?;
        Ok(path)
    }
}
