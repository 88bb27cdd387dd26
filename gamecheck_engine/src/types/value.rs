//! Normalized field values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A play duration. Minutes are always below 60.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playtime {
    pub hours: u32,
    pub minutes: u32,
}

impl Playtime {
    /// Builds a duration from raw totals, rolling minutes over into hours.
    /// Saturates at `u32::MAX` hours.
    pub fn new(hours: u32, minutes: u32) -> Self {
        Self {
            hours: hours.saturating_add(minutes / 60),
            minutes: minutes % 60,
        }
    }

    pub fn total_minutes(&self) -> u32 {
        self.hours.saturating_mul(60).saturating_add(self.minutes)
    }
}

impl fmt::Display for Playtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.hours, self.minutes) {
            (0, m) => write!(f, "{}m", m),
            (h, 0) => write!(f, "{}h", h),
            (h, m) => write!(f, "{}h {}m", h, m),
        }
    }
}

/// A critic score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Score {
    /// Numeric score in `0..=100`.
    Critic(u8),
    /// Listed but not yet scored ("tbd").
    Pending,
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Critic(score) => write!(f, "{}", score),
            Self::Pending => f.write_str("tbd"),
        }
    }
}

/// A store price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Money {
    Priced {
        /// Amount in hundredths of the currency unit.
        cents: u64,
        /// ISO 4217 code, e.g. "USD".
        currency: String,
        /// Symbol found in the source text, if any.
        symbol: Option<String>,
    },
    Free,
}

impl Money {
    pub fn priced(cents: u64, currency: impl Into<String>) -> Self {
        Self::Priced {
            cents,
            currency: currency.into(),
            symbol: None,
        }
    }

    /// Decimal amount, `None` for free items.
    pub fn amount(&self) -> Option<f64> {
        match self {
            Self::Priced { cents, .. } => Some(*cents as f64 / 100.0),
            Self::Free => None,
        }
    }

    pub fn currency(&self) -> Option<&str> {
        match self {
            Self::Priced { currency, .. } => Some(currency),
            Self::Free => None,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Free => f.write_str("Free"),
            Self::Priced {
                cents,
                currency,
                symbol,
            } => match symbol {
                Some(symbol) => write!(f, "{}{}.{:02}", symbol, cents / 100, cents % 100),
                None => write!(f, "{}.{:02} {}", cents / 100, cents % 100, currency),
            },
        }
    }
}

/// The kind of value a field holds. Selects the normalizer and the
/// placeholder written when the field is unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Duration,
    Score,
    Money,
}

impl ValueKind {
    /// Text used for an unavailable value of this kind.
    pub fn placeholder(&self) -> &'static str {
        match self {
            Self::Duration => "--",
            Self::Score | Self::Money => "N/A",
        }
    }
}

/// Result of normalizing one field.
///
/// `Unavailable` means "not found", never "found and zero".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum NormalizedValue {
    Duration(Playtime),
    Score(Score),
    Money(Money),
    Unavailable,
}

impl NormalizedValue {
    pub fn is_available(&self) -> bool {
        !matches!(self, Self::Unavailable)
    }

    pub fn as_duration(&self) -> Option<Playtime> {
        match self {
            Self::Duration(p) => Some(*p),
            _ => None,
        }
    }

    pub fn as_score(&self) -> Option<Score> {
        match self {
            Self::Score(s) => Some(*s),
            _ => None,
        }
    }

    pub fn as_money(&self) -> Option<&Money> {
        match self {
            Self::Money(m) => Some(m),
            _ => None,
        }
    }

    /// Renders the value, using the kind's placeholder when unavailable.
    pub fn render(&self, kind: ValueKind) -> String {
        match self {
            Self::Unavailable => kind.placeholder().to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for NormalizedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duration(p) => p.fmt(f),
            Self::Score(s) => s.fmt(f),
            Self::Money(m) => m.fmt(f),
            Self::Unavailable => f.write_str("--"),
        }
    }
}
