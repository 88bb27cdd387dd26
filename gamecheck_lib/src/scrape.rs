//! HTTP fetching for store and review pages.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, COOKIE, REFERER};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use crate::user_agent::get_user_agent;

/// Longest body excerpt written to the log for a failed request.
const ERROR_BODY_EXCERPT: usize = 300;

#[derive(thiserror::Error, Debug)]
pub enum ScrapeError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status}")]
    HttpStatus { status: StatusCode },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("parse error: {0}")]
    Parse(String),
}

impl ScrapeError {
    /// Network failures, 429 and 5xx are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::HttpStatus { status } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            _ => false,
        }
    }
}

/// A fetched HTML page and the URL it was served from after redirects.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: Url,
    pub body: String,
}

pub struct ScrapeClient {
    http: reqwest::Client,
}

impl ScrapeClient {
    pub fn new(timeout: Duration) -> Result<Self, ScrapeError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(REFERER, HeaderValue::from_static("https://www.google.com/"));
        headers.insert("upgrade-insecure-requests", HeaderValue::from_static("1"));

        let http = reqwest::Client::builder()
            .user_agent(get_user_agent())
            .default_headers(headers)
            .timeout(timeout)
            .build()?;
        Ok(Self { http })
    }

    /// Fetches an HTML page. A 404 means the page does not exist and is
    /// returned as `Ok(None)`.
    pub async fn fetch_html(&self, url: &Url, cookie: Option<&str>) -> Result<Option<Page>, ScrapeError> {
        let mut req = self
            .http
            .get(url.clone())
            .header("cache-control", "no-cache")
            .header("pragma", "no-cache");
        if let Some(cookie) = cookie {
            req = req.header(COOKIE, cookie);
        }
        let resp = req.send().await?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!("404 for {}", url);
            return Ok(None);
        }
        let final_url = resp.url().clone();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::error!("GET {} failed with {}: {}", url, status, excerpt(&body));
            return Err(ScrapeError::HttpStatus { status });
        }

        Ok(Some(Page {
            url: final_url,
            body: resp.text().await?,
        }))
    }

    /// Fetches and decodes a JSON document. A 404 is `Ok(None)`.
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &Url) -> Result<Option<T>, ScrapeError> {
        let resp = self
            .http
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = resp.text().await?;
        if !status.is_success() {
            tracing::error!("GET {} failed with {}: {}", url, status, excerpt(&body));
            return Err(ScrapeError::HttpStatus { status });
        }
        Ok(Some(serde_json::from_str(&body)?))
    }
}

fn excerpt(body: &str) -> &str {
    match body.char_indices().nth(ERROR_BODY_EXCERPT) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

/// Appends `segment` as a single percent-encoded path segment.
pub fn push_segment(base: &Url, segment: &str, trailing_slash: bool) -> Result<Url, ScrapeError> {
    let mut url = base.clone();
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| ScrapeError::Parse(format!("cannot append a path to {}", base)))?;
        segments.pop_if_empty().push(segment);
        if trailing_slash {
            segments.push("");
        }
    }
    Ok(url)
}

/// Parses a configured base URL.
pub fn parse_base(base: &str) -> Result<Url, ScrapeError> {
    Url::parse(base).map_err(|e| ScrapeError::Parse(format!("invalid base url '{}': {}", base, e)))
}
