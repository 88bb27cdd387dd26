//! Lookup strategies: the individual steps of a field's fallback cascade.
//!
//! Strategies are data. A source declares, per field, an ordered list of
//! them; the extractor walks the list and keeps the first raw text its
//! normalizer accepts. Stricter tiers go first.

use regex::Regex;
use scraper::{ElementRef, Selector};

use crate::document::{element_text, Document};
use crate::Error;

/// Default number of characters a text pattern reads past its label.
pub const DEFAULT_PATTERN_WINDOW: usize = 40;

/// Default number of blocks a block scan inspects.
pub const DEFAULT_BLOCK_LIMIT: usize = 10;

/// Precision tier of a strategy, from most to least structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    /// A labeled container with a known value slot, or a direct selector.
    Structured = 1,
    /// Label matched against a bounded set of block elements.
    BlockScan = 2,
    /// Label element followed by its value sibling.
    AdjacentPair = 3,
    /// Regex over the whole document text.
    TextPattern = 4,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Structured => "structured",
            Self::BlockScan => "block-scan",
            Self::AdjacentPair => "adjacent-pair",
            Self::TextPattern => "text-pattern",
        };
        f.write_str(name)
    }
}

/// Case-insensitive label synonyms, e.g. "Main Story" / "Single-Player".
#[derive(Debug, Clone)]
pub struct Labels(Vec<String>);

impl Labels {
    pub fn new(labels: &[&str]) -> Self {
        Self(labels.iter().map(|l| l.to_lowercase()).collect())
    }

    /// True when `text` contains any synonym.
    pub fn matches(&self, text: &str) -> bool {
        if self.0.is_empty() {
            return false;
        }
        let lower = text.to_lowercase();
        self.0.iter().any(|label| lower.contains(label.as_str()))
    }

    fn alternation(&self) -> String {
        self.0
            .iter()
            .map(|l| regex::escape(l))
            .collect::<Vec<_>>()
            .join("|")
    }
}

/// One lookup technique. Each variant is a pure function of the document.
pub enum LookupStrategy {
    /// Text (or an attribute) of every element matching a selector.
    Selector {
        selector: Selector,
        attribute: Option<String>,
    },
    /// Tier 1: containers hold entries; an entry whose text or `title`
    /// mentions a label carries the value in a value-slot element.
    Labeled {
        containers: Selector,
        entries: Selector,
        value: Selector,
        labels: Labels,
    },
    /// Tier 2: the innermost of the first `limit` blocks that mentions a
    /// label; its shortest number-bearing sub-element is the value.
    BlockScan {
        blocks: Selector,
        value: Selector,
        limit: usize,
        labels: Labels,
    },
    /// Tier 3: an element mentioning a label, and the element right after
    /// it. `markers` are classes the value element must carry.
    AdjacentPair {
        items: Selector,
        labels: Labels,
        markers: Vec<String>,
    },
    /// Tier 4: `label [:/-]? value` in the full text, cut at the first stop
    /// token or after `window` characters.
    TextPattern {
        labels: Regex,
        stops: Option<Regex>,
        window: usize,
    },
    /// Tier 4 for unlabelled values: every match of `pattern` in the full
    /// text, skipping matches preceded by one of `excluded_prefixes`.
    DocumentPattern {
        pattern: Regex,
        excluded_prefixes: Vec<String>,
    },
    /// A hand-written structural lookup.
    Custom(fn(&Document) -> Option<String>),
}

pub(crate) fn parse_selector(css: &str) -> Result<Selector, Error> {
    Selector::parse(css).map_err(|e| Error::InvalidSelector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

fn compile(pattern: &str) -> Result<Regex, Error> {
    Regex::new(pattern).map_err(|e| Error::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

impl LookupStrategy {
    pub fn selector(css: &str) -> Result<Self, Error> {
        Ok(Self::Selector {
            selector: parse_selector(css)?,
            attribute: None,
        })
    }

    pub fn selector_attr(css: &str, attribute: &str) -> Result<Self, Error> {
        Ok(Self::Selector {
            selector: parse_selector(css)?,
            attribute: Some(attribute.to_string()),
        })
    }

    pub fn labeled(
        containers: &str,
        entries: &str,
        value: &str,
        labels: &[&str],
    ) -> Result<Self, Error> {
        Ok(Self::Labeled {
            containers: parse_selector(containers)?,
            entries: parse_selector(entries)?,
            value: parse_selector(value)?,
            labels: Labels::new(labels),
        })
    }

    pub fn block_scan(blocks: &str, value: &str, labels: &[&str]) -> Result<Self, Error> {
        Ok(Self::BlockScan {
            blocks: parse_selector(blocks)?,
            value: parse_selector(value)?,
            limit: DEFAULT_BLOCK_LIMIT,
            labels: Labels::new(labels),
        })
    }

    pub fn adjacent_pair(items: &str, labels: &[&str], markers: &[&str]) -> Result<Self, Error> {
        Ok(Self::AdjacentPair {
            items: parse_selector(items)?,
            labels: Labels::new(labels),
            markers: markers.iter().map(|m| m.to_string()).collect(),
        })
    }

    /// Text pattern with stop tokens (usually the other fields' labels).
    pub fn text_pattern(labels: &[&str], stops: &[&str]) -> Result<Self, Error> {
        let labels = Labels::new(labels);
        let stops = Labels::new(stops);
        if labels.0.is_empty() {
            return Err(Error::InvalidPattern {
                pattern: String::new(),
                reason: "text pattern needs at least one label".into(),
            });
        }
        let stops = if stops.0.is_empty() {
            None
        } else {
            Some(compile(&format!("(?i){}", stops.alternation()))?)
        };
        Ok(Self::TextPattern {
            labels: compile(&format!("(?i){}", labels.alternation()))?,
            stops,
            window: DEFAULT_PATTERN_WINDOW,
        })
    }

    pub fn document_pattern(pattern: &str, excluded_prefixes: &[&str]) -> Result<Self, Error> {
        Ok(Self::DocumentPattern {
            pattern: compile(pattern)?,
            excluded_prefixes: excluded_prefixes.iter().map(|p| p.to_string()).collect(),
        })
    }

    pub fn tier(&self) -> Tier {
        match self {
            Self::Selector { .. } | Self::Labeled { .. } | Self::Custom(_) => Tier::Structured,
            Self::BlockScan { .. } => Tier::BlockScan,
            Self::AdjacentPair { .. } => Tier::AdjacentPair,
            Self::TextPattern { .. } | Self::DocumentPattern { .. } => Tier::TextPattern,
        }
    }

    /// First raw text this strategy finds.
    pub fn lookup(&self, doc: &Document) -> Option<String> {
        self.candidates(doc).into_iter().next()
    }

    /// Every raw text this strategy finds, best first. Never contains
    /// empty strings.
    pub fn candidates(&self, doc: &Document) -> Vec<String> {
        let found: Vec<String> = match self {
            Self::Selector {
                selector,
                attribute,
            } => doc
                .select(selector)
                .filter_map(|el| match attribute {
                    Some(attr) => el.value().attr(attr).map(|v| v.trim().to_string()),
                    None => Some(element_text(el)),
                })
                .collect(),
            Self::Labeled {
                containers,
                entries,
                value,
                labels,
            } => labeled(doc, containers, entries, value, labels),
            Self::BlockScan {
                blocks,
                value,
                limit,
                labels,
            } => block_scan(doc, blocks, value, *limit, labels)
                .into_iter()
                .collect(),
            Self::AdjacentPair {
                items,
                labels,
                markers,
            } => adjacent_pair(doc, items, labels, markers),
            Self::TextPattern {
                labels,
                stops,
                window,
            } => text_pattern(&doc.text(), labels, stops.as_ref(), *window),
            Self::DocumentPattern {
                pattern,
                excluded_prefixes,
            } => document_pattern(&doc.text(), pattern, excluded_prefixes),
            Self::Custom(lookup) => lookup(doc).into_iter().collect(),
        };
        found
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

fn labeled(
    doc: &Document,
    containers: &Selector,
    entries: &Selector,
    value: &Selector,
    labels: &Labels,
) -> Vec<String> {
    let mut hits: Vec<(usize, String)> = Vec::new();
    for container in doc.select(containers) {
        for entry in container.select(entries) {
            let text = element_text(entry);
            let title = entry.value().attr("title").unwrap_or_default();
            if !labels.matches(&text) && !labels.matches(title) {
                continue;
            }
            let slot = entry
                .select(value)
                .map(element_text)
                .find(|t| !t.is_empty());
            if let Some(slot) = slot {
                hits.push((text.len(), slot));
            }
        }
    }
    // Innermost entries first; a wrapper mentioning every label is a poor
    // source for any single one of them.
    hits.sort_by_key(|(len, _)| *len);
    hits.into_iter().map(|(_, slot)| slot).collect()
}

fn block_scan(
    doc: &Document,
    blocks: &Selector,
    value: &Selector,
    limit: usize,
    labels: &Labels,
) -> Option<String> {
    let mut best: Option<(usize, ElementRef<'_>)> = None;
    for block in doc.select(blocks).take(limit) {
        let text = element_text(block);
        if !labels.matches(&text) {
            continue;
        }
        if best.map_or(true, |(len, _)| text.len() < len) {
            best = Some((text.len(), block));
        }
    }
    let (_, block) = best?;

    let subs: Vec<String> = block
        .select(value)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect();
    let numeric = subs
        .iter()
        .filter(|t| t.chars().any(|c| c.is_ascii_digit()) && !labels.matches(t))
        .min_by_key(|t| t.len());
    numeric
        .or(subs.last())
        .cloned()
        .or_else(|| Some(element_text(block)))
}

fn adjacent_pair(
    doc: &Document,
    items: &Selector,
    labels: &Labels,
    markers: &[String],
) -> Vec<String> {
    let mut found = Vec::new();
    for item in doc.select(items) {
        if !labels.matches(&element_text(item)) {
            continue;
        }
        let Some(next) = item.next_siblings().find_map(ElementRef::wrap) else {
            continue;
        };
        let carries_markers = markers
            .iter()
            .all(|marker| next.value().classes().any(|c| c == marker));
        if carries_markers {
            found.push(element_text(next));
        }
    }
    found
}

fn text_pattern(text: &str, labels: &Regex, stops: Option<&Regex>, window: usize) -> Vec<String> {
    let mut found = Vec::new();
    for label in labels.find_iter(text) {
        let rest = &text[label.end()..];
        let end = rest
            .char_indices()
            .nth(window)
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());
        let mut value = &rest[..end];
        if let Some(stop) = stops.and_then(|s| s.find(value)) {
            value = &value[..stop.start()];
        }
        let value = value
            .trim_start()
            .trim_start_matches([':', '/', '-'])
            .trim();
        if !value.is_empty() {
            found.push(value.to_string());
        }
    }
    found
}

fn document_pattern(text: &str, pattern: &Regex, excluded_prefixes: &[String]) -> Vec<String> {
    pattern
        .captures_iter(text)
        .filter_map(|cap| {
            let whole = cap.get(0)?;
            let before = &text[..whole.start()];
            if excluded_prefixes.iter().any(|p| before.ends_with(p.as_str())) {
                return None;
            }
            let value = cap.name("value").unwrap_or(whole);
            Some(value.as_str().to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATS: &str = r#"
        <html><body>
          <div class="GameStats_game_times__x1">
            <ul>
              <li class="time_70"><h4>Main Story</h4><h5>10½ Hours</h5></li>
              <li class="time_70"><h4>Main + Extras</h4><h5>15 Hours</h5></li>
              <li class="time_100"><h4>Completionist</h4><h5>25 Hours</h5></li>
            </ul>
          </div>
        </body></html>"#;

    #[test]
    fn labeled_reads_value_slot() {
        let doc = Document::parse(STATS);
        let strategy = LookupStrategy::labeled(
            r#"div[class*="GameStats_game_times"]"#,
            "li",
            "h5",
            &["Main + Extras"],
        )
        .unwrap();
        assert_eq!(strategy.lookup(&doc), Some("15 Hours".into()));
        assert_eq!(strategy.tier(), Tier::Structured);
    }

    #[test]
    fn labeled_matches_title_attribute() {
        let doc = Document::parse(
            r#"<div class="stats"><div title="Single-Player"><span class="value">8 Hours</span></div></div>"#,
        );
        let strategy =
            LookupStrategy::labeled("div.stats", "div", r#"[class*="value"]"#, &["Single-Player"])
                .unwrap();
        assert_eq!(strategy.lookup(&doc), Some("8 Hours".into()));
    }

    #[test]
    fn labeled_prefers_innermost_entry() {
        let doc = Document::parse(
            r#"<div class="c"><div><div><b>Solo</b><i>1 Hours</i></div><div><b>Main Story</b><i>4 Hours</i></div></div></div>"#,
        );
        let strategy = LookupStrategy::labeled("div.c", "div", "i", &["Main Story"]).unwrap();
        assert_eq!(strategy.lookup(&doc), Some("4 Hours".into()));
    }

    #[test]
    fn block_scan_takes_number_bearing_child() {
        let doc = Document::parse(
            r#"<div class="profile_details">
                 <div><span>Main Story</span><span>12 Hours</span></div>
                 <div><span>Completionist</span><span>40 Hours</span></div>
               </div>"#,
        );
        let strategy = LookupStrategy::block_scan(
            r#"div[class*="profile_details"] div"#,
            "span",
            &["Completionist"],
        )
        .unwrap();
        assert_eq!(strategy.lookup(&doc), Some("40 Hours".into()));
        assert_eq!(strategy.tier(), Tier::BlockScan);
    }

    #[test]
    fn block_scan_falls_back_to_last_child() {
        let doc = Document::parse(
            r#"<div class="b"><span>Metascore</span><span>tbd</span></div>"#,
        );
        let strategy = LookupStrategy::block_scan("div.b", "span", &["metascore"]).unwrap();
        assert_eq!(strategy.lookup(&doc), Some("tbd".into()));
    }

    #[test]
    fn block_scan_respects_limit() {
        let doc = Document::parse(
            r#"<p>a</p><p>b</p><p>c</p><p>Main Story <b>3 Hours</b></p>"#,
        );
        let LookupStrategy::BlockScan {
            blocks,
            value,
            labels,
            ..
        } = LookupStrategy::block_scan("p", "b", &["Main Story"]).unwrap()
        else {
            unreachable!()
        };
        let limited = LookupStrategy::BlockScan {
            blocks,
            value,
            limit: 3,
            labels,
        };
        assert_eq!(limited.lookup(&doc), None);
    }

    #[test]
    fn adjacent_pair_reads_next_sibling() {
        let doc = Document::parse(
            r#"<div class="tidbits">
                 <div class="GameCard_search_list_tidbit">Main Story</div>
                 <div class="GameCard_search_list_tidbit center time_100">9 Hours</div>
                 <div class="GameCard_search_list_tidbit">Completionist</div>
                 <div class="GameCard_search_list_tidbit">30 Hours</div>
               </div>"#,
        );
        let items = r#"div[class*="GameCard_search_list_tidbit"]"#;
        let main = LookupStrategy::adjacent_pair(items, &["Main Story"], &["center", "time_100"])
            .unwrap();
        assert_eq!(main.lookup(&doc), Some("9 Hours".into()));

        // The completionist value lacks the marker classes.
        let comp = LookupStrategy::adjacent_pair(items, &["Completionist"], &["center", "time_100"])
            .unwrap();
        assert_eq!(comp.lookup(&doc), None);

        let unmarked = LookupStrategy::adjacent_pair(items, &["Completionist"], &[]).unwrap();
        assert_eq!(unmarked.lookup(&doc), Some("30 Hours".into()));
        assert_eq!(unmarked.tier(), Tier::AdjacentPair);
    }

    #[test]
    fn text_pattern_stops_at_other_labels() {
        let doc = Document::parse(
            "<p>Main Story: 10 Hours Main + Extras 20 Hours Completionist 31 Hours</p>",
        );
        let main = LookupStrategy::text_pattern(
            &["Main Story", "Single-Player"],
            &["Main + Extras", "Completionist"],
        )
        .unwrap();
        assert_eq!(main.lookup(&doc), Some("10 Hours".into()));

        let comp = LookupStrategy::text_pattern(&["Completionist"], &["Main Story"]).unwrap();
        assert_eq!(comp.lookup(&doc), Some("31 Hours".into()));
        assert_eq!(comp.tier(), Tier::TextPattern);
    }

    #[test]
    fn text_pattern_is_bounded_by_window() {
        let filler = "x".repeat(200);
        let doc = Document::parse(&format!("<p>Solo {}</p>", filler));
        let strategy = LookupStrategy::text_pattern(&["Solo"], &[]).unwrap();
        let value = strategy.lookup(&doc).unwrap();
        assert_eq!(value.chars().count(), DEFAULT_PATTERN_WINDOW - 1);
    }

    #[test]
    fn text_pattern_requires_labels() {
        assert!(LookupStrategy::text_pattern(&[], &["x"]).is_err());
    }

    #[test]
    fn document_pattern_skips_excluded_prefixes() {
        let doc = Document::parse("<p>PS Plus $9.99</p><p>Save $5.00</p><p>$59.99</p>");
        let strategy = LookupStrategy::document_pattern(
            r"\$\s*\d{1,3}(?:,\d{3})*\.\d{2}",
            &["PS Plus ", "Save "],
        )
        .unwrap();
        assert_eq!(strategy.lookup(&doc), Some("$59.99".into()));
    }

    #[test]
    fn selector_reads_attribute() {
        let doc = Document::parse(r#"<meta-score-styled-pe scorevalue="91"></meta-score-styled-pe>"#);
        let strategy =
            LookupStrategy::selector_attr("meta-score-styled-pe[scorevalue]", "scorevalue").unwrap();
        assert_eq!(strategy.lookup(&doc), Some("91".into()));
    }

    #[test]
    fn invalid_selector_is_reported() {
        let err = LookupStrategy::selector("div[").err().unwrap();
        assert!(matches!(err, Error::InvalidSelector { .. }));
    }

    #[test]
    fn custom_lookup() {
        fn first_bold(doc: &Document) -> Option<String> {
            let sel = Selector::parse("b").ok()?;
            let text = doc.select(&sel).next().map(element_text);
            text
        }
        let doc = Document::parse("<p><b>Free</b></p>");
        assert_eq!(LookupStrategy::Custom(first_bold).lookup(&doc), Some("Free".into()));
    }

    #[test]
    fn labels_are_case_insensitive() {
        let labels = Labels::new(&["Main Story"]);
        assert!(labels.matches("MAIN STORY 10 hours"));
        assert!(!labels.matches("Main + Extras"));
        assert!(!Labels::new(&[]).matches("anything"));
    }
}
