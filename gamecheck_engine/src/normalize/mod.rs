//! Normalizers turn raw extracted text into typed values.
//!
//! Every normalizer is total: unparseable input yields `None`, which the
//! extractor records as [`NormalizedValue::Unavailable`].

mod duration;
mod money;
mod score;

pub use self::duration::parse_playtime;
pub use self::money::parse_money;
pub use self::score::parse_score;

use crate::types::{NormalizedValue, ValueKind};

/// Converts raw text into a value, or `None` when the text is rejected.
pub type Normalizer = fn(&str) -> Option<NormalizedValue>;

pub fn duration(raw: &str) -> Option<NormalizedValue> {
    parse_playtime(raw).map(NormalizedValue::Duration)
}

pub fn score(raw: &str) -> Option<NormalizedValue> {
    parse_score(raw).map(NormalizedValue::Score)
}

pub fn money(raw: &str) -> Option<NormalizedValue> {
    parse_money(raw).map(NormalizedValue::Money)
}

/// Default normalizer for a value kind.
pub fn for_kind(kind: ValueKind) -> Normalizer {
    match kind {
        ValueKind::Duration => duration,
        ValueKind::Score => score,
        ValueKind::Money => money,
    }
}
