//! Steam prices from the public store JSON API.

use std::collections::HashMap;

use gamecheck_engine::{
    resolve, Candidate, FieldDescriptor, FieldValue, MatchResult, Money, NormalizedValue, ValueKind,
};
use serde::Deserialize;
use url::Url;

use super::{Lookup, Source};
use crate::client::GameClient;
use crate::error::GameCheckError;

pub const PRICE: &str = "price";

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
pub struct SearchItem {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AppDetails {
    #[serde(default)]
    pub success: bool,
    pub data: Option<AppData>,
}

#[derive(Debug, Deserialize)]
pub struct AppData {
    #[serde(default)]
    pub is_free: bool,
    pub price_overview: Option<PriceOverview>,
}

#[derive(Debug, Deserialize)]
pub struct PriceOverview {
    pub currency: String,
    /// Price after discounts, in cents.
    #[serde(rename = "final")]
    pub final_cents: u64,
}

/// Steam answers in JSON, so the field has no HTML strategies; the
/// descriptor only names the field and its kind.
pub fn descriptors() -> Vec<FieldDescriptor> {
    vec![FieldDescriptor::new(PRICE, ValueKind::Money)]
}

fn api_url(base: &Url, path: &str, params: &[(&str, &str)]) -> Url {
    let mut url = base.join(path).unwrap_or_else(|_| base.clone());
    url.query_pairs_mut().extend_pairs(params);
    url
}

pub fn search_url(base: &Url, name: &str) -> Url {
    api_url(
        base,
        "/api/storesearch/",
        &[("term", name), ("l", "english"), ("cc", "US")],
    )
}

pub fn details_url(base: &Url, app_id: u64) -> Url {
    let app_id = app_id.to_string();
    api_url(
        base,
        "/api/appdetails/",
        &[("appids", app_id.as_str()), ("cc", "US"), ("l", "english")],
    )
}

pub fn candidates(search: &SearchResponse) -> Vec<Candidate<u64>> {
    search
        .items
        .iter()
        .map(|item| Candidate::new(item.name.clone(), item.id))
        .collect()
}

/// Free, the final price, or unavailable when the app has no price.
pub fn price_of(details: &AppDetails) -> NormalizedValue {
    let Some(data) = details.data.as_ref().filter(|_| details.success) else {
        return NormalizedValue::Unavailable;
    };
    if data.is_free {
        return NormalizedValue::Money(Money::Free);
    }
    match &data.price_overview {
        Some(po) => NormalizedValue::Money(Money::priced(po.final_cents, po.currency.clone())),
        None => NormalizedValue::Unavailable,
    }
}

pub async fn lookup(client: &GameClient, name: &str) -> Result<Lookup, GameCheckError> {
    let source = Source::Steam;
    let fields = &client.catalog().steam;
    let base = client.base_url(source);

    let search: Option<SearchResponse> = client.fetch_json(source, &search_url(base, name)).await?;
    let Some(search) = search else {
        return Ok(Lookup::not_found(source, name, fields));
    };
    let Some(matched) = resolve(name, &candidates(&search)) else {
        tracing::warn!("Steam: no store result for '{}'", name);
        return Ok(Lookup::not_found(source, name, fields));
    };

    let url = details_url(base, matched.identifier);
    let details: Option<HashMap<String, AppDetails>> = client.fetch_json(source, &url).await?;
    let value = details
        .as_ref()
        .and_then(|d| d.get(&matched.identifier.to_string()))
        .map(price_of)
        .unwrap_or(NormalizedValue::Unavailable);

    Ok(Lookup {
        source,
        query: name.to_string(),
        matched: Some(MatchResult {
            identifier: matched.identifier.to_string(),
            label: matched.label,
            score: matched.score,
        }),
        url: Some(url.to_string()),
        fields: std::iter::once(FieldValue {
            name: PRICE.to_string(),
            kind: ValueKind::Money,
            value,
        })
        .collect(),
    })
}
