//! PlayStation Store prices.

use std::sync::LazyLock;

use gamecheck_engine::document::element_text;
use gamecheck_engine::{
    extract, resolve, Candidate, Document, Extraction, FieldDescriptor, LookupStrategy, MatchResult,
    ValueKind,
};
use regex::Regex;
use scraper::Selector;
use url::Url;

use super::{Lookup, Source, DOLLAR_AMOUNT};
use crate::client::GameClient;
use crate::error::GameCheckError;
use crate::scrape::push_segment;

pub const PRICE: &str = "price";

const PRICE_SELECTORS: &[&str] = &[
    r#"span[data-qa$="display-price"]"#,
    r#"span[data-qa$="finalPrice"]"#,
    r#"div[data-qa*="price"] > span"#,
    r#"span[class*="price"][class*="sales"]"#,
    r#"span[class*="price"][class*="original"]"#,
    r#"span[class*="psw-t-title-m"][class*="psw-m-r-3"]"#,
    "span.psw-l-line-left",
    "div.psw-l-line-left > span.psw-t-title-m",
    "span.price",
    r#"div[class*="ProductPrice"]"#,
];

static TILES: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"[data-qa^="search#productTile"]"#).expect("valid tile selector")
});
static TILE_ROOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^search#productTile\d+$").expect("valid tile regex"));
static TILE_NAME: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r##"[data-qa$="#product-name"]"##).expect("valid tile name selector")
});

/// A store page offering a free game shows "Free" next to "Add to Cart".
fn free_with_cart(doc: &Document) -> Option<String> {
    let text = doc.text().to_lowercase();
    (text.contains("free") && text.contains("add to cart")).then(|| "Free".to_string())
}

pub fn descriptors() -> Result<Vec<FieldDescriptor>, gamecheck_engine::Error> {
    let mut field = FieldDescriptor::new(PRICE, ValueKind::Money);
    for css in PRICE_SELECTORS {
        field = field.strategy(LookupStrategy::selector(css)?);
    }
    field = field
        .strategy(LookupStrategy::document_pattern(
            DOLLAR_AMOUNT,
            &["PS Plus ", "Save "],
        )?)
        .strategy(LookupStrategy::Custom(free_with_cart));
    Ok(vec![field])
}

pub fn search_url(base: &Url, name: &str) -> Result<Url, GameCheckError> {
    let mut url = base.clone();
    for segment in ["en-us", "search"] {
        url = push_segment(&url, segment, false)?;
    }
    Ok(push_segment(&url, name, false)?)
}

/// A product tile on the search page.
#[derive(Debug, Clone)]
pub struct Tile {
    pub name: String,
    pub html: String,
}

pub fn parse_tiles(html: &str) -> Vec<Tile> {
    let doc = Document::parse(html);
    doc.select(&TILES)
        .filter(|el| {
            el.value()
                .attr("data-qa")
                .is_some_and(|qa| TILE_ROOT.is_match(qa))
        })
        .filter_map(|tile| {
            let name = tile.select(&TILE_NAME).map(element_text).next()?;
            Some(Tile {
                name,
                html: tile.html(),
            })
        })
        .collect()
}

/// Price from the best matching tile, else from the whole page.
pub fn extract_price(
    name: &str,
    html: &str,
    fields: &[FieldDescriptor],
) -> (Option<MatchResult>, Extraction) {
    let tiles = parse_tiles(html);
    let candidates: Vec<Candidate<usize>> = tiles
        .iter()
        .enumerate()
        .map(|(idx, tile)| Candidate::new(tile.name.clone(), idx))
        .collect();

    if let Some(matched) = resolve(name, &candidates) {
        if let Some(tile) = tiles.get(matched.identifier) {
            let price = extract(&Document::parse_fragment(&tile.html), fields);
            if !price.all_unavailable() {
                let matched = MatchResult {
                    identifier: matched.identifier.to_string(),
                    label: matched.label,
                    score: matched.score,
                };
                return (Some(matched), price);
            }
        }
    }
    (None, extract(&Document::parse(html), fields))
}

pub async fn lookup(client: &GameClient, name: &str) -> Result<Lookup, GameCheckError> {
    let source = Source::PlayStation;
    let fields = &client.catalog().playstation;
    let url = search_url(client.base_url(source), name)?;

    let Some(page) = client.fetch_page(source, &url, None).await? else {
        return Ok(Lookup::not_found(source, name, fields));
    };
    let (matched, price) = extract_price(name, &page.body, fields);
    if price.all_unavailable() {
        client.dump_debug(source, name, &page);
    }

    Ok(Lookup {
        source,
        query: name.to_string(),
        matched,
        url: Some(page.url.to_string()),
        fields: price,
    })
}
