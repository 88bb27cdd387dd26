//! Fuzzy extraction of labeled values from loosely structured HTML.
//!
//! Two halves:
//! - [`resolver`] picks the listing entry that best matches a free-text
//!   query using containment similarity.
//! - [`extractor`] pulls named fields out of a page by running each
//!   field's strategy cascade (structured, block scan, adjacent pair,
//!   text pattern) and normalizing the first acceptable text into a
//!   duration, critic score or price.
//!
//! Nothing here touches the network.

pub mod document;
mod errors;
pub mod extractor;
pub mod normalize;
pub mod resolver;
pub mod strategy;
pub mod types;

pub use self::document::Document;
pub use self::errors::Error;
pub use self::extractor::{extract, extract_field, Extraction, FieldDescriptor, FieldHit, FieldValue};
pub use self::resolver::{resolve, resolve_or_err, similarity};
pub use self::strategy::{LookupStrategy, Tier};
pub use self::types::{Candidate, MatchResult, Money, NormalizedValue, Playtime, Score, ValueKind};
