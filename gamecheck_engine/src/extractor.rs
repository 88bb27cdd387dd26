//! Runs a field's strategy cascade against a document.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::document::Document;
use crate::normalize::{self, Normalizer};
use crate::strategy::{LookupStrategy, Tier};
use crate::types::{NormalizedValue, ValueKind};
use crate::Error;

/// A named field, the kind of value it holds and its ordered strategies.
pub struct FieldDescriptor {
    name: String,
    kind: ValueKind,
    normalizer: Normalizer,
    strategies: Vec<LookupStrategy>,
}

impl FieldDescriptor {
    /// New field using the default normalizer for `kind`.
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
            normalizer: normalize::for_kind(kind),
            strategies: Vec::new(),
        }
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Appends a strategy. Strategies run in insertion order, so add the
    /// strictest ones first.
    pub fn strategy(mut self, strategy: LookupStrategy) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn strategies<I>(mut self, strategies: I) -> Self
    where
        I: IntoIterator<Item = LookupStrategy>,
    {
        self.strategies.extend(strategies);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn strategy_count(&self) -> usize {
        self.strategies.len()
    }
}

/// The winning strategy's output for one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldHit {
    pub value: NormalizedValue,
    pub tier: Tier,
    /// Position of the winning strategy in the descriptor.
    pub strategy: usize,
    /// Raw text before normalization.
    pub raw: String,
}

/// Extracts one field.
///
/// Strategies are tried in order; within a strategy, its candidates are
/// tried best first. The first text the normalizer accepts wins. Text
/// that was found but never accepted is reported as
/// [`Error::UnparseableValue`], nothing found at all as
/// [`Error::FieldUnavailable`].
pub fn extract_field(doc: &Document, field: &FieldDescriptor) -> Result<FieldHit, Error> {
    let mut rejected: Option<String> = None;

    for (index, strategy) in field.strategies.iter().enumerate() {
        for raw in strategy.candidates(doc) {
            match (field.normalizer)(&raw) {
                Some(value) => {
                    tracing::debug!(
                        "{}: '{}' via {} strategy #{}",
                        field.name,
                        raw,
                        strategy.tier(),
                        index
                    );
                    return Ok(FieldHit {
                        value,
                        tier: strategy.tier(),
                        strategy: index,
                        raw,
                    });
                }
                None => {
                    tracing::trace!("{}: rejected '{}'", field.name, raw);
                    rejected.get_or_insert(raw);
                }
            }
        }
    }

    match rejected {
        Some(raw) => Err(Error::UnparseableValue {
            field: field.name.clone(),
            raw,
        }),
        None => Err(Error::FieldUnavailable {
            field: field.name.clone(),
        }),
    }
}

/// One extracted field, available or not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValue {
    pub name: String,
    pub kind: ValueKind,
    pub value: NormalizedValue,
}

impl FieldValue {
    /// Display form, with the kind's placeholder for missing values.
    pub fn render(&self) -> String {
        self.value.render(self.kind)
    }
}

/// Every requested field, in request order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Extraction(Vec<FieldValue>);

impl Extraction {
    /// A result with every field unavailable, used when the page itself
    /// could not be found or fetched.
    pub fn unavailable(fields: &[FieldDescriptor]) -> Self {
        Self(
            fields
                .iter()
                .map(|f| FieldValue {
                    name: f.name.clone(),
                    kind: f.kind,
                    value: NormalizedValue::Unavailable,
                })
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<&NormalizedValue> {
        self.0.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    /// Rendered value of `name`, or `None` if the field was not requested.
    pub fn render(&self, name: &str) -> Option<String> {
        self.0.iter().find(|f| f.name == name).map(FieldValue::render)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldValue> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn all_unavailable(&self) -> bool {
        self.0.iter().all(|f| !f.value.is_available())
    }

    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.0.iter().map(|f| (f.name.clone(), f.render())).collect()
    }
}

impl FromIterator<FieldValue> for Extraction {
    fn from_iter<T: IntoIterator<Item = FieldValue>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Extraction {
    type Item = FieldValue;
    type IntoIter = std::vec::IntoIter<FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Extracts every field; misses become [`NormalizedValue::Unavailable`].
pub fn extract(doc: &Document, fields: &[FieldDescriptor]) -> Extraction {
    Extraction(
        fields
            .iter()
            .map(|field| {
                let value = match extract_field(doc, field) {
                    Ok(hit) => hit.value,
                    Err(err) => {
                        tracing::debug!("{}", err);
                        NormalizedValue::Unavailable
                    }
                };
                FieldValue {
                    name: field.name.clone(),
                    kind: field.kind,
                    value,
                }
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Playtime, Score};

    fn score_field() -> FieldDescriptor {
        FieldDescriptor::new("metascore", ValueKind::Score)
            .strategy(LookupStrategy::selector("span.metascore").unwrap())
            .strategy(LookupStrategy::text_pattern(&["Metascore"], &[]).unwrap())
    }

    #[test]
    fn first_accepted_strategy_wins() {
        let doc = Document::parse(r#"<p>Metascore 50</p><span class="metascore">88</span>"#);
        let hit = extract_field(&doc, &score_field()).unwrap();
        assert_eq!(hit.value, NormalizedValue::Score(Score::Critic(88)));
        assert_eq!(hit.tier, Tier::Structured);
        assert_eq!(hit.strategy, 0);
        assert_eq!(hit.raw, "88");
    }

    #[test]
    fn rejected_text_falls_through() {
        let doc = Document::parse(r#"<span class="metascore">great</span><p>Metascore 73</p>"#);
        let hit = extract_field(&doc, &score_field()).unwrap();
        assert_eq!(hit.value, NormalizedValue::Score(Score::Critic(73)));
        assert_eq!(hit.tier, Tier::TextPattern);
    }

    #[test]
    fn unparseable_when_only_rejected_text() {
        let doc = Document::parse(r#"<span class="metascore">great</span>"#);
        let err = extract_field(&doc, &score_field()).unwrap_err();
        assert_eq!(
            err,
            Error::UnparseableValue {
                field: "metascore".into(),
                raw: "great".into()
            }
        );
    }

    #[test]
    fn unavailable_when_nothing_found() {
        let doc = Document::parse("<p>nothing here</p>");
        let err = extract_field(&doc, &score_field()).unwrap_err();
        assert_eq!(
            err,
            Error::FieldUnavailable {
                field: "metascore".into()
            }
        );
    }

    #[test]
    fn extract_keeps_request_order_and_placeholders() {
        let fields = vec![
            FieldDescriptor::new("Main", ValueKind::Duration)
                .strategy(LookupStrategy::text_pattern(&["Main Story"], &[]).unwrap()),
            score_field(),
        ];
        let doc = Document::parse("<p>Main Story 6 Hours</p>");
        let extraction = extract(&doc, &fields);

        let names: Vec<_> = extraction.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Main", "metascore"]);
        assert_eq!(
            extraction.get("Main"),
            Some(&NormalizedValue::Duration(Playtime::new(6, 0)))
        );
        assert_eq!(extraction.render("Main").as_deref(), Some("6h"));
        assert_eq!(extraction.render("metascore").as_deref(), Some("N/A"));
        assert_eq!(extraction.render("missing"), None);
        assert!(!extraction.all_unavailable());
    }

    #[test]
    fn unavailable_extraction() {
        let fields = vec![FieldDescriptor::new("Main", ValueKind::Duration)];
        let extraction = Extraction::unavailable(&fields);
        assert!(extraction.all_unavailable());
        assert_eq!(extraction.to_map().get("Main").map(String::as_str), Some("--"));
    }

    #[test]
    fn custom_normalizer() {
        fn always_free(_: &str) -> Option<NormalizedValue> {
            Some(NormalizedValue::Money(crate::types::Money::Free))
        }
        let field = FieldDescriptor::new("price", ValueKind::Money)
            .with_normalizer(always_free)
            .strategy(LookupStrategy::selector("b").unwrap());
        let doc = Document::parse("<b>whatever</b>");
        assert_eq!(
            extract_field(&doc, &field).unwrap().value.render(ValueKind::Money),
            "Free"
        );
    }
}
