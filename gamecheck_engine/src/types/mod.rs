mod candidate;
pub use self::candidate::{Candidate, MatchResult};

mod value;
pub use self::value::{Money, NormalizedValue, Playtime, Score, ValueKind};
