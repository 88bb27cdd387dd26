//! HowLongToBeat completion times.

use std::sync::LazyLock;

use gamecheck_engine::document::element_text;
use gamecheck_engine::{
    extract, resolve, Candidate, Document, Extraction, FieldDescriptor, LookupStrategy, MatchResult,
    ValueKind,
};
use scraper::{ElementRef, Selector};
use url::Url;

use super::{Lookup, Source};
use crate::client::GameClient;
use crate::error::GameCheckError;

pub const MAIN: &str = "Main";
pub const EXTRA: &str = "Extra";
pub const COMPLETIONIST: &str = "Completionist";

const MAIN_LABELS: &[&str] = &["Main Story", "Single-Player", "Solo"];
const EXTRA_LABELS: &[&str] = &["Main + Extras", "Main + Sides", "Story + Sides", "Main + DLC"];
const COMPLETIONIST_LABELS: &[&str] = &["Completionist", "100%", "All Trophies/Achievements"];

const STATS_CONTAINERS: &str =
    r#"div[class*="GameProfile_profile_summary"], div[class*="GameStats_game_times"]"#;
const STATS_ENTRIES: &str = r#"li, div[title], div[class*="TimeEntry_"], div[class*="GameStats_game_times__box"]"#;
const STATS_VALUES: &str =
    r#"h5, [class*="value"], [class*="Value"], [class*="time_stat"], [class*="GameStats_Value"]"#;
const DETAIL_BLOCKS: &str = r#"div[class*="game_details"] li, div[class*="game_details"] div, div[class*="profile_details"] li, div[class*="profile_details"] div"#;
const TIDBITS: &str = r#"div[class*="GameCard_search_list_tidbit"]"#;

static CARDS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"div[class*="GameCard_search_list__"], li[class*="GameCard_search_list__"]"#)
        .expect("valid card selector")
});
static FALLBACK_CARDS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"li[class*="search_list_item"]"#).expect("valid fallback card selector")
});
static GAME_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href^="/game/"]"#).expect("valid link selector"));
static CARD_TITLE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"h2[class*="title"], h3[class*="title"], div[class*="title"], [class*="GameCard_title"]"#)
        .expect("valid title selector")
});

fn playtime_field(
    name: &str,
    labels: &[&str],
    others: &[&[&str]],
) -> Result<FieldDescriptor, gamecheck_engine::Error> {
    let stops: Vec<&str> = others.iter().flat_map(|set| set.iter().copied()).collect();
    Ok(FieldDescriptor::new(name, ValueKind::Duration)
        .strategy(LookupStrategy::labeled(
            STATS_CONTAINERS,
            STATS_ENTRIES,
            STATS_VALUES,
            labels,
        )?)
        .strategy(LookupStrategy::block_scan(DETAIL_BLOCKS, "h5, div, span", labels)?)
        .strategy(LookupStrategy::adjacent_pair(TIDBITS, labels, &[])?)
        .strategy(LookupStrategy::text_pattern(labels, &stops)?))
}

/// Main / Extra / Completionist, each with the full four-tier cascade.
pub fn descriptors() -> Result<Vec<FieldDescriptor>, gamecheck_engine::Error> {
    Ok(vec![
        playtime_field(MAIN, MAIN_LABELS, &[EXTRA_LABELS, COMPLETIONIST_LABELS])?,
        playtime_field(EXTRA, EXTRA_LABELS, &[MAIN_LABELS, COMPLETIONIST_LABELS])?,
        playtime_field(COMPLETIONIST, COMPLETIONIST_LABELS, &[MAIN_LABELS, EXTRA_LABELS])?,
    ])
}

pub fn search_url(base: &Url, name: &str) -> Url {
    let mut url = base.join("/").unwrap_or_else(|_| base.clone());
    url.query_pairs_mut().append_pair("q", name);
    url
}

/// One search result.
#[derive(Debug, Clone)]
pub struct Card {
    pub title: String,
    pub url: Url,
    /// Markup of the card, kept so its time tidbits can be read when the
    /// game page has none.
    pub html: String,
}

fn card_title(card: ElementRef<'_>, link: ElementRef<'_>) -> Option<String> {
    let titled = card
        .select(&CARD_TITLE)
        .map(element_text)
        .find(|t| !t.is_empty());
    if titled.is_some() {
        return titled;
    }
    let text = element_text(link);
    if !text.is_empty() {
        return Some(text);
    }
    link.value().attr("title").map(|t| t.trim().to_string())
}

/// Search result cards with a game link and a title.
pub fn parse_listing(html: &str, base: &Url) -> Vec<Card> {
    let doc = Document::parse(html);
    let mut cards: Vec<ElementRef<'_>> = doc.select(&CARDS).collect();
    if cards.is_empty() {
        cards = doc.select(&FALLBACK_CARDS).collect();
    }

    cards
        .into_iter()
        .filter_map(|card| {
            let link = card.select(&GAME_LINK).next()?;
            let href = link.value().attr("href")?;
            let url = base.join(href).ok()?;
            let title = card_title(card, link)?;
            Some(Card {
                title,
                url,
                html: card.html(),
            })
        })
        .collect()
}

/// Picks the card whose title best matches `name`.
pub fn choose_card(name: &str, cards: &[Card]) -> Option<(MatchResult<usize>, Card)> {
    let candidates: Vec<Candidate<usize>> = cards
        .iter()
        .enumerate()
        .map(|(idx, card)| Candidate::new(card.title.clone(), idx))
        .collect();
    let matched = resolve(name, &candidates)?;
    let card = cards.get(matched.identifier)?.clone();
    Some((matched, card))
}

/// Times from the game page, falling back to the search card's tidbits.
pub fn extract_times(page_html: &str, card_html: &str, fields: &[FieldDescriptor]) -> Extraction {
    let from_page = extract(&Document::parse(page_html), fields);
    if !from_page.all_unavailable() {
        return from_page;
    }
    tracing::debug!("no times on the game page, reading the search card");
    extract(&Document::parse_fragment(card_html), fields)
}

pub async fn lookup(client: &GameClient, name: &str) -> Result<Lookup, GameCheckError> {
    let source = Source::HowLongToBeat;
    let fields = &client.catalog().playtimes;
    let search = search_url(client.base_url(source), name);

    let Some(listing) = client.fetch_page(source, &search, None).await? else {
        return Ok(Lookup::not_found(source, name, fields));
    };
    let cards = parse_listing(&listing.body, client.base_url(source));
    let Some((matched, card)) = choose_card(name, &cards) else {
        tracing::warn!("HowLongToBeat: no result for '{}'", name);
        client.dump_debug(source, name, &listing);
        return Ok(Lookup::not_found(source, name, fields));
    };
    tracing::debug!(
        "HowLongToBeat: '{}' resolved to '{}' ({:.2})",
        name,
        matched.label,
        matched.score
    );

    let page = match client.fetch_page(source, &card.url, None).await {
        Ok(page) => page,
        Err(e) => {
            tracing::warn!("HowLongToBeat: game page for '{}' failed: {}", name, e);
            None
        }
    };
    let page_html = page.as_ref().map(|p| p.body.as_str()).unwrap_or_default();
    let times = extract_times(page_html, &card.html, fields);
    if times.all_unavailable() {
        if let Some(page) = &page {
            client.dump_debug(source, name, page);
        }
    }

    Ok(Lookup {
        source,
        query: name.to_string(),
        matched: Some(MatchResult {
            identifier: card.url.to_string(),
            label: matched.label,
            score: matched.score,
        }),
        url: Some(card.url.to_string()),
        fields: times,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://howlongtobeat.com").unwrap()
    }

    #[test]
    fn search_url_encodes_query() {
        let url = search_url(&base(), "Ori & the Blind Forest");
        assert_eq!(
            url.as_str(),
            "https://howlongtobeat.com/?q=Ori+%26+the+Blind+Forest"
        );
    }

    #[test]
    fn listing_reads_cards() {
        let html = r#"
            <ul>
              <li class="GameCard_search_list__IuMbi">
                <h2 class="GameCard_title__x"><a href="/game/1274">Celeste Classic</a></h2>
              </li>
              <li class="GameCard_search_list__IuMbi">
                <a href="/game/42818" title="Celeste"></a>
              </li>
              <li class="GameCard_search_list__IuMbi"><span>no link</span></li>
            </ul>"#;
        let cards = parse_listing(html, &base());
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].title, "Celeste Classic");
        assert_eq!(cards[0].url.as_str(), "https://howlongtobeat.com/game/1274");
        assert_eq!(cards[1].title, "Celeste");

        let (matched, card) = choose_card("celeste", &cards).unwrap();
        assert_eq!(matched.score, 1.0);
        assert_eq!(card.url.path(), "/game/42818");
    }

    #[test]
    fn listing_fallback_cards() {
        let html = r#"<ul><li class="search_list_item"><a href="/game/7">Hades</a></li></ul>"#;
        let cards = parse_listing(html, &base());
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].title, "Hades");
    }

    #[test]
    fn card_tidbits_back_up_an_empty_page() {
        let card = r#"<li class="GameCard_search_list__a">
            <div class="GameCard_search_list_tidbit__b">Main Story</div>
            <div class="GameCard_search_list_tidbit__b">6 Hours</div>
        </li>"#;
        let fields = descriptors().unwrap();
        let times = extract_times("<html><body></body></html>", card, &fields);
        assert_eq!(times.render(MAIN).as_deref(), Some("6h"));
        assert_eq!(times.render(EXTRA).as_deref(), Some("--"));
    }
}
