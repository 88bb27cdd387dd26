//! Error types for the extraction engine.

/// Errors that can occur while resolving candidates or extracting fields.
///
/// Extraction itself never fails as a whole: [`crate::extract`] collapses
/// every per-field error into [`crate::NormalizedValue::Unavailable`]. These
/// variants surface only through the `*_or_err` and per-field entry points.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// No candidate shares any textual relationship with the query.
    #[error("no candidate matched the query")]
    NoCandidateMatch,
    /// No lookup strategy produced text for the field.
    #[error("field '{field}' not found")]
    FieldUnavailable { field: String },
    /// A strategy produced text, but the normalizer rejected it.
    #[error("field '{field}' has unparseable value '{raw}'")]
    UnparseableValue { field: String, raw: String },
    /// A CSS selector in a descriptor table failed to parse.
    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },
    /// A regular expression in a descriptor table failed to compile.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}
