//! Amazon prices for the PC edition of a game.

use std::sync::LazyLock;

use gamecheck_engine::document::element_text;
use gamecheck_engine::{
    extract, resolve, Candidate, Document, Extraction, FieldDescriptor, LookupStrategy, MatchResult,
    ValueKind,
};
use scraper::Selector;
use url::Url;

use super::{Lookup, Source, DOLLAR_AMOUNT};
use crate::client::GameClient;
use crate::error::GameCheckError;

pub const PRICE: &str = "price";

/// Keeps prices in dollars regardless of the caller's location.
pub const CURRENCY_COOKIE: &str = "i18n-prefs=USD";

static RESULTS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"div[data-component-type="s-search-result"]"#).expect("valid result selector")
});
static TITLE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h2 a span.a-text-normal, h2 span").expect("valid title selector")
});
static PRICE_WHOLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.a-price-whole").expect("valid whole selector"));
static PRICE_FRACTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.a-price-fraction").expect("valid fraction selector"));
static SPANS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span").expect("valid span selector"));

/// `span.a-price-whole` + `span.a-price-fraction`, as `$19.99`.
fn split_price(doc: &Document) -> Option<String> {
    let digits = |text: String| -> String { text.chars().filter(char::is_ascii_digit).collect() };
    // The whole part carries the decimal point, often in a nested span.
    let whole = digits(doc.select(&PRICE_WHOLE).next().map(element_text)?);
    if whole.is_empty() {
        return None;
    }
    let fraction = doc
        .select(&PRICE_FRACTION)
        .next()
        .map(|el| digits(element_text(el)))
        .filter(|f| f.len() == 2)
        .unwrap_or_else(|| "00".to_string());
    Some(format!("${}.{}", whole, fraction))
}

/// A span reading "Free" or "Free Download".
fn free_download(doc: &Document) -> Option<String> {
    doc.select(&SPANS)
        .map(element_text)
        .find(|text| {
            let lower = text.to_lowercase();
            lower == "free" || lower.contains("free download")
        })
}

/// Price fields read from one search result card.
pub fn card_descriptors() -> Result<Vec<FieldDescriptor>, gamecheck_engine::Error> {
    Ok(vec![FieldDescriptor::new(PRICE, ValueKind::Money)
        .strategy(LookupStrategy::selector("span.a-price span.a-offscreen")?)
        .strategy(LookupStrategy::Custom(split_price))
        .strategy(LookupStrategy::Custom(free_download))])
}

/// Last resort when no card matched: any dollar amount on the page.
pub fn page_descriptors() -> Result<Vec<FieldDescriptor>, gamecheck_engine::Error> {
    Ok(vec![FieldDescriptor::new(PRICE, ValueKind::Money)
        .strategy(LookupStrategy::document_pattern(DOLLAR_AMOUNT, &[])?)])
}

pub fn search_url(base: &Url, name: &str) -> Url {
    let mut url = base.join("/s").unwrap_or_else(|_| base.clone());
    url.query_pairs_mut()
        .append_pair("k", &format!("{} PC game", name));
    url
}

/// A search result card.
#[derive(Debug, Clone)]
pub struct ResultCard {
    pub title: String,
    pub html: String,
}

pub fn parse_results(html: &str) -> Vec<ResultCard> {
    let doc = Document::parse(html);
    doc.select(&RESULTS)
        .filter_map(|card| {
            let title = card
                .select(&TITLE)
                .map(element_text)
                .find(|t| !t.is_empty())?;
            Some(ResultCard {
                title,
                html: card.html(),
            })
        })
        .collect()
}

/// Price of the result card that best matches `name`, falling back to the
/// first dollar amount anywhere on the page.
pub fn extract_price(
    name: &str,
    html: &str,
    card_fields: &[FieldDescriptor],
    page_fields: &[FieldDescriptor],
) -> (Option<MatchResult>, Extraction) {
    let cards = parse_results(html);
    let candidates: Vec<Candidate<usize>> = cards
        .iter()
        .enumerate()
        .map(|(idx, card)| Candidate::new(card.title.clone(), idx))
        .collect();

    if let Some(matched) = resolve(name, &candidates) {
        if let Some(card) = cards.get(matched.identifier) {
            let price = extract(&Document::parse_fragment(&card.html), card_fields);
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
    (None, extract(&Document::parse(html), page_fields))
}

pub async fn lookup(client: &GameClient, name: &str) -> Result<Lookup, GameCheckError> {
    let source = Source::Amazon;
    let catalog = client.catalog();
    let url = search_url(client.base_url(source), name);

    let Some(page) = client
        .fetch_page(source, &url, Some(CURRENCY_COOKIE))
        .await?
    else {
        return Ok(Lookup::not_found(source, name, &catalog.amazon_card));
    };
    let (matched, price) = extract_price(name, &page.body, &catalog.amazon_card, &catalog.amazon_page);
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

#[cfg(test)]
mod tests {
    use super::*;

    fn price_of(name: &str, html: &str) -> (Option<MatchResult>, String) {
        let (matched, price) = extract_price(
            name,
            html,
            &card_descriptors().unwrap(),
            &page_descriptors().unwrap(),
        );
        (matched, price.render(PRICE).unwrap())
    }

    fn card(title: &str, price_html: &str) -> String {
        format!(
            r#"<div data-component-type="s-search-result">
                 <h2><a class="a-link-normal" href="/dp/X"><span class="a-text-normal">{}</span></a></h2>
                 {}
               </div>"#,
            title, price_html
        )
    }

    #[test]
    fn search_url_appends_platform() {
        let base = Url::parse("https://www.amazon.com").unwrap();
        assert_eq!(
            search_url(&base, "Hades").as_str(),
            "https://www.amazon.com/s?k=Hades+PC+game"
        );
    }

    #[test]
    fn offscreen_price_of_matching_card() {
        let html = format!(
            "{}{}",
            card(
                "Hades II - PC",
                r#"<span class="a-price"><span class="a-offscreen">$29.99</span></span>"#
            ),
            card(
                "Hades",
                r#"<span class="a-price"><span class="a-offscreen">$24.99</span></span>"#
            ),
        );
        let (matched, price) = price_of("Hades", &html);
        assert_eq!(matched.unwrap().label, "Hades");
        assert_eq!(price, "$24.99");
    }

    #[test]
    fn whole_and_fraction() {
        let html = card(
            "Stardew Valley [Online Game Code]",
            r#"<span class="a-price-whole">1,014.</span><span class="a-price-fraction">50</span>"#,
        );
        let (_, price) = price_of("Stardew Valley", &html);
        assert_eq!(price, "$1014.50");
    }

    #[test]
    fn free_download_card() {
        let html = card("Fortnite", "<span>Free Download</span>");
        let (_, price) = price_of("Fortnite", &html);
        assert_eq!(price, "Free");
    }

    #[test]
    fn page_fallback_without_cards() {
        let html = "<html><body><p>Sponsored $14.99</p></body></html>";
        let (matched, price) = price_of("Celeste", html);
        assert!(matched.is_none());
        assert_eq!(price, "$14.99");
    }

    #[test]
    fn no_price_anywhere() {
        let (_, price) = price_of("Celeste", "<html><body>nothing</body></html>");
        assert_eq!(price, "N/A");
    }
}
