//! Ranks listing candidates against a free-text query.
//!
//! Similarity is containment based, not edit distance:
//! 1. Exact match after lower-casing and trimming: 1.0, scanning stops.
//! 2. Query contained in label: `0.7 + 0.2 * len(query) / len(label)`.
//! 3. Label contained in query: `0.4 + 0.2 * len(label) / len(query)`.
//! 4. Anything else: 0.0.
//!
//! Accents and punctuation are kept as-is.

use crate::types::{Candidate, MatchResult};
use crate::Error;

/// A score at or above this ends the scan early.
pub const EARLY_ACCEPT: f64 = 0.95;

const CONTAINS_BASE: f64 = 0.7;
const CONTAINED_BASE: f64 = 0.4;
const LENGTH_WEIGHT: f64 = 0.2;

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Similarity of a candidate label to a query, in `[0, 1]`.
pub fn similarity(query: &str, label: &str) -> f64 {
    let query = normalize(query);
    let label = normalize(label);
    if query.is_empty() || label.is_empty() {
        return 0.0;
    }
    if query == label {
        return 1.0;
    }
    let query_len = query.chars().count() as f64;
    let label_len = label.chars().count() as f64;
    if label.contains(&query) {
        CONTAINS_BASE + LENGTH_WEIGHT * (query_len / label_len)
    } else if query.contains(&label) {
        CONTAINED_BASE + LENGTH_WEIGHT * (label_len / query_len)
    } else {
        0.0
    }
}

/// Picks the candidate most similar to `query`.
///
/// Ties keep the first candidate seen. Returns `None` only when no
/// candidate scores above zero, which includes an empty candidate list.
pub fn resolve<I: Clone>(query: &str, candidates: &[Candidate<I>]) -> Option<MatchResult<I>> {
    let mut best: Option<(f64, &Candidate<I>)> = None;

    for candidate in candidates {
        let score = similarity(query, &candidate.label);
        tracing::debug!("candidate '{}' scored {:.3} for '{}'", candidate.label, score, query);
        if score <= 0.0 {
            continue;
        }
        let better = match best {
            Some((best_score, _)) => score > best_score,
            None => true,
        };
        if better {
            best = Some((score, candidate));
            if score >= EARLY_ACCEPT {
                break;
            }
        }
    }

    best.map(|(score, candidate)| MatchResult {
        identifier: candidate.identifier.clone(),
        label: candidate.label.clone(),
        score,
    })
}

/// Like [`resolve`], but reports a miss as [`Error::NoCandidateMatch`].
pub fn resolve_or_err<I: Clone>(
    query: &str,
    candidates: &[Candidate<I>],
) -> Result<MatchResult<I>, Error> {
    resolve(query, candidates).ok_or(Error::NoCandidateMatch)
}
