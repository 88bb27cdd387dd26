//! Search-result candidates and the resolver's verdict.

use serde::{Deserialize, Serialize};

/// A single entry scraped from a listing page.
///
/// The identifier is opaque to the engine: a detail-page path, a store app
/// id, or anything else the caller needs to fetch the entry later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate<I = String> {
    /// Display text of the entry, as shown on the listing page.
    pub label: String,
    /// Reference used to fetch the entry's detail page.
    pub identifier: I,
}

impl<I> Candidate<I> {
    pub fn new(label: impl Into<String>, identifier: I) -> Self {
        Self {
            label: label.into(),
            identifier,
        }
    }
}

/// Best candidate for a query, with its similarity score in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult<I = String> {
    pub identifier: I,
    pub label: String,
    pub score: f64,
}

impl<I> MatchResult<I> {
    /// True when the label equals the query after normalization.
    pub fn is_exact(&self) -> bool {
        self.score >= 1.0
    }
}
