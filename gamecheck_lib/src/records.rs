//! Flat result files kept between runs.
//!
//! Times: `name:Main=…;Extra=…;Completionist=…`, one game per line.
//! Scores: `name:score`, where score is a number, `tbd` or `N/A`. The
//! scores file is read back by the prices report.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use gamecheck_engine::ValueKind;
use serde::Serialize;

use crate::error::GameCheckError;
use crate::sources::{hltb, metacritic, Lookup};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimesRecord {
    pub name: String,
    pub main: String,
    pub extra: String,
    pub completionist: String,
}

impl TimesRecord {
    pub fn unavailable(name: &str) -> Self {
        let placeholder = ValueKind::Duration.placeholder().to_string();
        Self {
            name: name.to_string(),
            main: placeholder.clone(),
            extra: placeholder.clone(),
            completionist: placeholder,
        }
    }

    pub fn from_lookup(name: &str, lookup: &Lookup) -> Self {
        let render = |field: &str| {
            lookup
                .fields
                .render(field)
                .unwrap_or_else(|| ValueKind::Duration.placeholder().to_string())
        };
        Self {
            name: name.to_string(),
            main: render(hltb::MAIN),
            extra: render(hltb::EXTRA),
            completionist: render(hltb::COMPLETIONIST),
        }
    }

    pub fn is_empty(&self) -> bool {
        let placeholder = ValueKind::Duration.placeholder();
        [&self.main, &self.extra, &self.completionist]
            .iter()
            .all(|v| v.as_str() == placeholder)
    }

    pub fn to_line(&self) -> String {
        format!(
            "{}:Main={};Extra={};Completionist={}",
            self.name, self.main, self.extra, self.completionist
        )
    }

    /// Inverse of [`to_line`](Self::to_line). Names may contain `:`.
    pub fn parse_line(line: &str) -> Option<Self> {
        let idx = line.rfind(":Main=")?;
        let name = line[..idx].trim();
        if name.is_empty() {
            return None;
        }
        let mut record = Self::unavailable(name);
        for part in line[idx + 1..].split(';') {
            let (key, value) = part.split_once('=')?;
            let value = value.trim().to_string();
            match key.trim() {
                "Main" => record.main = value,
                "Extra" => record.extra = value,
                "Completionist" => record.completionist = value,
                _ => {}
            }
        }
        Some(record)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreRecord {
    pub name: String,
    pub score: String,
}

impl ScoreRecord {
    pub fn from_lookup(name: &str, lookup: &Lookup) -> Self {
        Self {
            name: name.to_string(),
            score: lookup
                .fields
                .render(metacritic::METASCORE)
                .unwrap_or_else(|| ValueKind::Score.placeholder().to_string()),
        }
    }

    pub fn to_line(&self) -> String {
        format!("{}:{}", self.name, self.score)
    }

    pub fn parse_line(line: &str) -> Option<Self> {
        let (name, score) = line.rsplit_once(':')?;
        let (name, score) = (name.trim(), score.trim());
        if name.is_empty() || score.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            score: score.to_string(),
        })
    }
}

fn write_lines<I>(path: &Path, lines: I) -> Result<(), GameCheckError>
where
    I: IntoIterator<Item = String>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    for line in lines {
        writeln!(file, "{}", line)?;
    }
    file.flush()?;
    Ok(())
}

pub fn write_times(path: &Path, records: &[TimesRecord]) -> Result<(), GameCheckError> {
    write_lines(path, records.iter().map(TimesRecord::to_line))
}

pub fn read_times(path: &Path) -> Result<Vec<TimesRecord>, GameCheckError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(contents.lines().filter_map(TimesRecord::parse_line).collect())
}

pub fn write_scores(path: &Path, records: &[ScoreRecord]) -> Result<(), GameCheckError> {
    write_lines(path, records.iter().map(ScoreRecord::to_line))
}

/// Saved Metacritic scores, looked up by game name ignoring case.
#[derive(Debug, Clone, Default)]
pub struct ScoreTable {
    scores: HashMap<String, String>,
}

impl ScoreTable {
    pub fn parse(contents: &str) -> Self {
        let scores = contents
            .lines()
            .filter_map(ScoreRecord::parse_line)
            .map(|r| (r.name.to_lowercase(), r.score))
            .collect();
        Self { scores }
    }

    /// Reads the scores file; a missing file gives an empty table.
    pub fn load(path: &Path) -> Result<Self, GameCheckError> {
        if !path.exists() {
            tracing::warn!(
                "scores file {} not found; run the scores command to create it",
                path.display()
            );
            return Ok(Self::default());
        }
        let table = Self::parse(&std::fs::read_to_string(path)?);
        tracing::info!("loaded {} Metacritic scores from {}", table.len(), path.display());
        Ok(table)
    }

    /// Score for `name`, or `N/A`.
    pub fn get(&self, name: &str) -> &str {
        self.scores
            .get(&name.trim().to_lowercase())
            .map(String::as_str)
            .unwrap_or_else(|| ValueKind::Score.placeholder())
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn times_line_format() {
        let record = TimesRecord {
            name: "Spider-Man: Miles Morales".to_string(),
            main: "7h 30m".to_string(),
            extra: "11h".to_string(),
            completionist: "--".to_string(),
        };
        let line = record.to_line();
        assert_eq!(
            line,
            "Spider-Man: Miles Morales:Main=7h 30m;Extra=11h;Completionist=--"
        );
        assert_eq!(TimesRecord::parse_line(&line), Some(record));
    }

    #[test]
    fn times_placeholder_record() {
        let record = TimesRecord::unavailable("Hades");
        assert!(record.is_empty());
        assert_eq!(record.to_line(), "Hades:Main=--;Extra=--;Completionist=--");
    }

    #[test]
    fn score_lines() {
        assert_eq!(
            ScoreRecord::parse_line("Hades: 93"),
            Some(ScoreRecord {
                name: "Hades".to_string(),
                score: "93".to_string()
            })
        );
        assert_eq!(ScoreRecord::parse_line("no separator"), None);
        assert_eq!(ScoreRecord::parse_line("Hades:"), None);
    }

    #[test]
    fn score_table_lookup() {
        let table = ScoreTable::parse("Elden Ring:96\nStarfield:tbd\n\ngarbage\n");
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("elden ring"), "96");
        assert_eq!(table.get("Starfield"), "tbd");
        assert_eq!(table.get("Celeste"), "N/A");
    }

    #[test]
    fn files_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let times = dir.path().join("times.txt");
        write_times(&times, &[TimesRecord::unavailable("Celeste")]).unwrap();
        assert_eq!(read_times(&times).unwrap()[0].name, "Celeste");

        let scores = dir.path().join("out").join("scores.txt");
        write_scores(
            &scores,
            &[ScoreRecord {
                name: "Celeste".to_string(),
                score: "92".to_string(),
            }],
        )
        .unwrap();
        assert_eq!(ScoreTable::load(&scores).unwrap().get("CELESTE"), "92");
        assert!(ScoreTable::load(&dir.path().join("missing.txt")).unwrap().is_empty());
    }
}
