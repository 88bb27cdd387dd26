//! Per-source lookups: listing parsers, detail-page descriptor tables and
//! the fetch flow that ties them to the engine.

pub mod amazon;
pub mod hltb;
pub mod metacritic;
pub mod playstation;
pub mod steam;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use gamecheck_engine::{Extraction, FieldDescriptor, MatchResult};
use serde::{Deserialize, Serialize};

use crate::error::GameCheckError;

/// A site gamecheck reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    HowLongToBeat,
    Metacritic,
    PlayStation,
    Amazon,
    Steam,
}

impl Source {
    pub const ALL: [Source; 5] = [
        Source::HowLongToBeat,
        Source::Metacritic,
        Source::PlayStation,
        Source::Amazon,
        Source::Steam,
    ];

    /// Price sources, in report column order.
    pub const STORES: [Source; 3] = [Source::Steam, Source::PlayStation, Source::Amazon];

    /// Lowercase key used in config sections, cache keys and file names.
    pub fn key(&self) -> &'static str {
        match self {
            Self::HowLongToBeat => "howlongtobeat",
            Self::Metacritic => "metacritic",
            Self::PlayStation => "playstation",
            Self::Amazon => "amazon",
            Self::Steam => "steam",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::HowLongToBeat => "HowLongToBeat",
            Self::Metacritic => "Metacritic",
            Self::PlayStation => "PlayStation Store",
            Self::Amazon => "Amazon",
            Self::Steam => "Steam",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::HowLongToBeat => "https://howlongtobeat.com",
            Self::Metacritic => "https://www.metacritic.com",
            Self::PlayStation => "https://store.playstation.com",
            Self::Amazon => "https://www.amazon.com",
            Self::Steam => "https://store.steampowered.com",
        }
    }

    /// Default spacing between two requests to this source.
    pub fn default_delay(&self) -> Duration {
        match self {
            Self::HowLongToBeat => Duration::from_secs(7),
            Self::Metacritic => Duration::from_secs(5),
            Self::PlayStation | Self::Amazon | Self::Steam => Duration::from_secs(1),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Source {
    type Err = GameCheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "howlongtobeat" | "hltb" => Ok(Self::HowLongToBeat),
            "metacritic" | "mc" => Ok(Self::Metacritic),
            "playstation" | "ps" | "psstore" => Ok(Self::PlayStation),
            "amazon" => Ok(Self::Amazon),
            "steam" => Ok(Self::Steam),
            _ => Err(GameCheckError::InvalidInput(format!(
                "unknown source '{}'; expected one of howlongtobeat, metacritic, playstation, amazon, steam",
                s
            ))),
        }
    }
}

/// Outcome of looking a game up on one source.
#[derive(Debug, Clone, Serialize)]
pub struct Lookup {
    pub source: Source,
    pub query: String,
    /// The listing entry the query resolved to, if a listing was used.
    pub matched: Option<MatchResult>,
    /// Page the fields were read from.
    pub url: Option<String>,
    pub fields: Extraction,
}

impl Lookup {
    /// Every field unavailable: the page was missing or nothing matched.
    pub fn not_found(source: Source, query: &str, fields: &[FieldDescriptor]) -> Self {
        Self {
            source,
            query: query.to_string(),
            matched: None,
            url: None,
            fields: Extraction::unavailable(fields),
        }
    }

    /// Rendered field value, with the placeholder when unavailable or
    /// unknown.
    pub fn render(&self, field: &str) -> String {
        self.fields
            .render(field)
            .unwrap_or_else(|| gamecheck_engine::ValueKind::Money.placeholder().to_string())
    }

    pub fn found_anything(&self) -> bool {
        !self.fields.all_unavailable()
    }
}

/// Descriptor tables for every source, built once per client.
pub struct Catalog {
    pub playtimes: Vec<FieldDescriptor>,
    pub metascore: Vec<FieldDescriptor>,
    pub playstation: Vec<FieldDescriptor>,
    pub amazon_card: Vec<FieldDescriptor>,
    pub amazon_page: Vec<FieldDescriptor>,
    pub steam: Vec<FieldDescriptor>,
}

impl Catalog {
    pub fn new() -> Result<Self, GameCheckError> {
        Ok(Self {
            playtimes: hltb::descriptors()?,
            metascore: metacritic::descriptors()?,
            playstation: playstation::descriptors()?,
            amazon_card: amazon::card_descriptors()?,
            amazon_page: amazon::page_descriptors()?,
            steam: steam::descriptors(),
        })
    }
}

/// Regex shared by the store sources for a dollar amount. Trailing decimal
/// digits stay in the match so the money normalizer can reject them.
pub(crate) const DOLLAR_AMOUNT: &str = r"\$\s*(?:\d{1,3}(?:,\d{3})+|\d+)\.\d{2,}";
