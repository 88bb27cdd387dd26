//! Metacritic critic scores.

use std::collections::HashSet;
use std::sync::LazyLock;

use gamecheck_engine::document::element_text;
use gamecheck_engine::{
    extract, resolve, Candidate, Document, Extraction, FieldDescriptor, LookupStrategy, ValueKind,
};
use scraper::Selector;
use url::Url;

use super::{Lookup, Source};
use crate::client::GameClient;
use crate::error::GameCheckError;
use crate::scrape::push_segment;

pub const METASCORE: &str = "metascore";

/// Critic score slots, newest layout first.
const SCORE_SELECTORS: &[&str] = &[
    r#"div[class*="c-siteReviewScore"]:not([class*="user"]) span"#,
    r#"div[class*="c-productScoreDetails_sideScore"] div[class*="c-siteReviewScore"]:not([class*="user"]) span"#,
    r#"a[class*="c-productHero_score"] div[class*="c-siteReviewScore"] span"#,
    "div.metascore_w.game span",
    "div.game_details .metascore_wrap span.score_value",
    "span.metascore_w",
    r#"div[data-test-id="critic-score"]"#,
    r#"div[class*="criticScore"]"#,
];

static RESULT_LINKS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href^="/game/"]"#).expect("valid result selector"));

pub fn descriptors() -> Result<Vec<FieldDescriptor>, gamecheck_engine::Error> {
    let mut field = FieldDescriptor::new(METASCORE, ValueKind::Score)
        .strategy(LookupStrategy::selector_attr(
            "meta-score-styled-pe[scorevalue]",
            "scorevalue",
        )?);
    for css in SCORE_SELECTORS {
        field = field.strategy(LookupStrategy::selector(css)?);
    }
    field = field
        .strategy(LookupStrategy::block_scan(
            r#"div[class*="c-productScoreInfo"], div[class*="score_summary"]"#,
            "span, div",
            &["Metascore"],
        )?)
        .strategy(LookupStrategy::document_pattern(
            r"(?i)metascore\s*[:\-]?\s*(?P<value>tbd|\d{1,3})\b",
            &[],
        )?);
    Ok(vec![field])
}

pub fn search_url(base: &Url, name: &str) -> Result<Url, GameCheckError> {
    let search = push_segment(base, "search", false)?;
    Ok(push_segment(&search, name, true)?)
}

/// Game links on a search page, as `(title, absolute url)` candidates.
pub fn parse_listing(html: &str, base: &Url) -> Vec<Candidate> {
    let doc = Document::parse(html);
    let mut seen = HashSet::new();
    doc.select(&RESULT_LINKS)
        .filter_map(|link| {
            let href = link.value().attr("href")?;
            let url = base.join(href).ok()?;
            let title = element_text(link);
            let title = if title.is_empty() {
                link.value().attr("title")?.trim().to_string()
            } else {
                title
            };
            if !seen.insert(url.to_string()) {
                return None;
            }
            Some(Candidate::new(title, url.to_string()))
        })
        .collect()
}

pub fn extract_score(html: &str, fields: &[FieldDescriptor]) -> Extraction {
    extract(&Document::parse(html), fields)
}

pub async fn lookup(client: &GameClient, name: &str) -> Result<Lookup, GameCheckError> {
    let source = Source::Metacritic;
    let fields = &client.catalog().metascore;
    let search = search_url(client.base_url(source), name)?;

    let Some(listing) = client.fetch_page(source, &search, None).await? else {
        return Ok(Lookup::not_found(source, name, fields));
    };
    let candidates = parse_listing(&listing.body, client.base_url(source));
    let matched = resolve(name, &candidates);

    // Without a usable result list, the search page itself may carry the score.
    let (page, matched) = match matched {
        Some(m) => {
            let url = Url::parse(&m.identifier)
                .map_err(|e| GameCheckError::InvalidInput(format!("bad result url: {}", e)))?;
            match client.fetch_page(source, &url, None).await? {
                Some(page) => (page, Some(m)),
                None => (listing, None),
            }
        }
        None => (listing, None),
    };

    let fields_out = extract_score(&page.body, fields);
    if fields_out.all_unavailable() {
        tracing::warn!("Metacritic: no score for '{}'", name);
        client.dump_debug(source, name, &page);
    }

    Ok(Lookup {
        source,
        query: name.to_string(),
        matched,
        url: Some(page.url.to_string()),
        fields: fields_out,
    })
}
