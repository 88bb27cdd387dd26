//! Error types for the library layer.

use std::fmt;

use crate::scrape::ScrapeError;

/// Errors produced by the library layer, wrapping engine and scrape
/// errors and adding file, configuration and input validation failures.
#[derive(Debug)]
pub enum GameCheckError {
    /// Descriptor construction or candidate resolution failed.
    Engine(gamecheck_engine::Error),
    /// Fetching or decoding a page failed.
    Scrape(ScrapeError),
    /// Reading or writing a local file failed.
    Io(std::io::Error),
    /// The configuration file or an override could not be used.
    Config(String),
    /// User-provided input failed validation.
    InvalidInput(String),
}

impl fmt::Display for GameCheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Engine(e) => write!(f, "Extraction error: {}", e),
            Self::Scrape(e) => write!(f, "Scrape error: {}", e),
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::Config(msg) => write!(f, "Config error: {}", msg),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for GameCheckError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Engine(e) => Some(e),
            Self::Scrape(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<gamecheck_engine::Error> for GameCheckError {
    fn from(e: gamecheck_engine::Error) -> Self {
        Self::Engine(e)
    }
}

impl From<ScrapeError> for GameCheckError {
    fn from(e: ScrapeError) -> Self {
        Self::Scrape(e)
    }
}

impl From<std::io::Error> for GameCheckError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for GameCheckError {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}
