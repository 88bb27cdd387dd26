//! Rate-limited, cached client over every source.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use url::Url;

use crate::cache::{cache_key, LookupCache};
use crate::config::Settings;
use crate::debug::DebugDumper;
use crate::error::GameCheckError;
use crate::rate_limit::{with_retry, RateLimiter, RetryPolicy, TrackerSummary};
use crate::records::ScoreTable;
use crate::report::PriceRow;
use crate::scrape::{Page, ScrapeClient, ScrapeError};
use crate::sources::{self, Catalog, Lookup, Source};
use crate::validation::validate_game_name;

struct SourceEndpoint {
    base_url: Url,
    limiter: RateLimiter,
}

/// Looks games up on the configured sources.
///
/// Each source has its own base URL and rate limiter, so a slow site
/// only paces its own requests. Results are cached per `source:query`
/// for `cache_ttl_secs`.
pub struct GameClient {
    scraper: ScrapeClient,
    endpoints: HashMap<Source, SourceEndpoint>,
    retry: RetryPolicy,
    cache: LookupCache<Lookup>,
    debug: Option<DebugDumper>,
    catalog: Catalog,
}

impl GameClient {
    pub fn new(settings: &Settings) -> Result<Self, GameCheckError> {
        let mut endpoints = HashMap::new();
        for source in Source::ALL {
            let endpoint = settings.endpoint(source)?;
            tracing::debug!(
                "{}: {} every {:?} (+{:?} jitter)",
                source,
                endpoint.base_url,
                endpoint.delay,
                endpoint.jitter
            );
            endpoints.insert(
                source,
                SourceEndpoint {
                    base_url: endpoint.base_url,
                    limiter: RateLimiter::new(endpoint.delay, endpoint.jitter),
                },
            );
        }

        Ok(Self {
            scraper: ScrapeClient::new(settings.timeout())?,
            endpoints,
            retry: settings.retry_policy(),
            cache: LookupCache::new(settings.cache_ttl()),
            debug: settings
                .debug_html
                .then(|| DebugDumper::new(&settings.debug_dir)),
            catalog: Catalog::new()?,
        })
    }

    fn endpoint(&self, source: Source) -> &SourceEndpoint {
        &self.endpoints[&source]
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn base_url(&self, source: Source) -> &Url {
        &self.endpoint(source).base_url
    }

    /// Looks `name` up on `source`, answering from the cache when possible.
    pub async fn lookup(&self, source: Source, name: &str) -> Result<Lookup, GameCheckError> {
        let name = validate_game_name(name)?;
        let key = cache_key(source.key(), &name);
        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!("{}: cache hit for '{}'", source, name);
            return Ok(cached);
        }

        let lookup = match source {
            Source::HowLongToBeat => sources::hltb::lookup(self, &name).await?,
            Source::Metacritic => sources::metacritic::lookup(self, &name).await?,
            Source::PlayStation => sources::playstation::lookup(self, &name).await?,
            Source::Amazon => sources::amazon::lookup(self, &name).await?,
            Source::Steam => sources::steam::lookup(self, &name).await?,
        };
        self.cache.set(key, lookup.clone());
        Ok(lookup)
    }

    /// Steam, PlayStation and Amazon prices for one game, fetched
    /// concurrently. A failing store is logged and shown as `N/A`.
    pub async fn price_row(&self, name: &str, scores: &ScoreTable) -> PriceRow {
        let (steam, playstation, amazon) = tokio::join!(
            self.lookup(Source::Steam, name),
            self.lookup(Source::PlayStation, name),
            self.lookup(Source::Amazon, name),
        );
        let render = |source: Source, result: Result<Lookup, GameCheckError>| match result {
            Ok(lookup) => lookup.render(sources::steam::PRICE),
            Err(e) => {
                tracing::warn!("{} failed for '{}': {}", source.display_name(), name, e);
                "N/A".to_string()
            }
        };
        PriceRow {
            name: name.to_string(),
            steam: render(Source::Steam, steam),
            playstation: render(Source::PlayStation, playstation),
            amazon: render(Source::Amazon, amazon),
            metacritic: scores.get(name).to_string(),
        }
    }

    /// GETs an HTML page from `source`, paced by its limiter and retried
    /// on transient failures.
    pub async fn fetch_page(
        &self,
        source: Source,
        url: &Url,
        cookie: Option<&str>,
    ) -> Result<Option<Page>, ScrapeError> {
        let endpoint = self.endpoint(source);
        tracing::debug!("{}: GET {}", source, url);
        with_retry(&endpoint.limiter, &self.retry, source.display_name(), || {
            self.scraper.fetch_html(url, cookie)
        })
        .await
    }

    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        source: Source,
        url: &Url,
    ) -> Result<Option<T>, ScrapeError> {
        let endpoint = self.endpoint(source);
        tracing::debug!("{}: GET {}", source, url);
        with_retry(&endpoint.limiter, &self.retry, source.display_name(), || {
            self.scraper.fetch_json(url)
        })
        .await
    }

    /// Saves `page` for later inspection when debug dumps are enabled.
    pub fn dump_debug(&self, source: Source, name: &str, page: &Page) {
        let Some(dumper) = &self.debug else {
            return;
        };
        match dumper.dump(source, name, page) {
            Ok(path) => tracing::info!("saved {} page for '{}' to {}", source, name, path.display()),
            Err(e) => tracing::warn!("could not save debug page for '{}': {}", name, e),
        }
    }

    pub fn request_summary(&self, source: Source) -> TrackerSummary {
        self.endpoint(source).limiter.tracker().summary()
    }

    pub fn cached_lookups(&self) -> usize {
        self.cache.len()
    }

    /// Removes all entries from the cache.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}
