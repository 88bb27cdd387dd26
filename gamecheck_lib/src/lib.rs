//! Library layer for gamecheck: per-source lookups over the extraction
//! engine, with rate limiting, retries, caching and the local result files.
//!
//! Each site in [`sources`] turns a game name into a listing request,
//! resolves the listing to one entry with [`gamecheck_engine::resolve`],
//! then extracts normalized values from the detail page with the site's
//! descriptor table.

pub mod cache;
pub mod client;
pub mod config;
pub mod debug;
pub mod error;
pub mod games;
pub mod rate_limit;
pub mod records;
pub mod report;
pub mod scrape;
pub mod sources;
pub mod user_agent;
pub mod validation;

pub use gamecheck_engine as engine;

pub use client::GameClient;
pub use config::Settings;
pub use error::GameCheckError;
pub use games::GamesList;
pub use records::{ScoreRecord, ScoreTable, TimesRecord};
pub use report::PriceRow;
pub use scrape::{Page, ScrapeClient, ScrapeError};
pub use sources::{Lookup, Source};
