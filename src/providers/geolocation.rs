// SPDX-License-Identifier: MIT

//! Geographic location signal provider
//!
//! Resolves a visitor's IP address to a country and, where the backing data
//! has it, a finer-grained region. Lookup failures, timeouts, and unmapped
//! addresses (private/reserved ranges, unknown IPs) are normal outcomes and
//! surface as `None`, never as errors — "could not be located" is a state
//! the criteria match on.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::error::Error;
use std::time::Duration;
use tokio::sync::RwLock;
use url::Url;

/// Default GeoJS-compatible lookup endpoint; `{ip}.json` is appended
const DEFAULT_BASE_URL: &str = "https://get.geojs.io/v1/ip/geo/";

/// Upper bound on a single lookup; a timed-out lookup resolves to `None`
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// A country resolved for an IP address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Country {
    /// ISO 3166-1 alpha-2 code, e.g. "US"
    pub code: String,
    pub name: String,
}

/// A region resolved for an IP address, finer-grained than a country
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// Country the region belongs to
    pub country_code: String,
    /// Every name variant the region is known by (administrative vs. common)
    pub names: Vec<String>,
}

impl Region {
    /// All name variants for this region
    pub fn all_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// Resolves geographic location from an IP address
#[async_trait]
pub trait GeoLocationProvider: Send + Sync {
    /// Country for the given IP, or `None` when the lookup fails or the
    /// address is unmapped
    async fn country_for_ip(&self, ip: &str) -> Option<Country>;

    /// Region for the given IP; `None` is normal when only country-level
    /// data exists
    async fn region_for_ip(&self, ip: &str) -> Option<Region>;
}

/// Response shape of a GeoJS-compatible geolocation service
#[derive(Debug, Clone, Deserialize)]
struct GeoResponse {
    country_code: Option<String>,
    country: Option<String>,
    region: Option<String>,
}

/// Geolocation provider backed by a GeoJS-compatible web service.
///
/// A read-through cache keyed by IP means the country and region lookups a
/// single evaluation makes share one request, and repeat visitors don't
/// re-query the service. Entries are keyed strictly by IP and never shared
/// across addresses.
pub struct WebGeoLocationProvider {
    client: Client,
    base_url: Url,
    cache: RwLock<HashMap<String, Option<GeoResponse>>>,
}

impl WebGeoLocationProvider {
    /// Create a provider against the default service.
    ///
    /// Optionally uses `GEOLOCATION_BASE_URL` for custom endpoints.
    pub fn new() -> Result<Self, Box<dyn Error + Send + Sync>> {
        let base_url =
            env::var("GEOLOCATION_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::with_base_url(&base_url)
    }

    /// Create a provider against a specific endpoint. The URL must end with
    /// a trailing slash so per-IP paths join onto it.
    pub fn with_base_url(base_url: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(Self {
            client: Client::builder().timeout(LOOKUP_TIMEOUT).build()?,
            base_url: Url::parse(base_url)?,
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// Resolve the raw geolocation record for an IP, consulting the cache
    /// first. A failed lookup is cached too so one bad address doesn't get
    /// retried on every evaluation.
    async fn lookup(&self, ip: &str) -> Option<GeoResponse> {
        if ip.is_empty() {
            return None;
        }

        if let Some(cached) = self.cache.read().await.get(ip) {
            return cached.clone();
        }

        let result = self.fetch(ip).await;
        self.cache
            .write()
            .await
            .insert(ip.to_string(), result.clone());
        result
    }

    async fn fetch(&self, ip: &str) -> Option<GeoResponse> {
        let url = match self.base_url.join(&format!("{}.json", ip)) {
            Ok(url) => url,
            Err(e) => {
                log::warn!("Could not build geolocation URL for {}: {}", ip, e);
                return None;
            }
        };

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                log::warn!("Geolocation lookup failed for {}: {}", ip, e);
                return None;
            }
        };

        if !response.status().is_success() {
            log::warn!(
                "Geolocation service returned {} for {}",
                response.status(),
                ip
            );
            return None;
        }

        match response.json::<GeoResponse>().await {
            Ok(geo) => Some(geo),
            Err(e) => {
                log::warn!("Could not parse geolocation response for {}: {}", ip, e);
                None
            }
        }
    }
}

#[async_trait]
impl GeoLocationProvider for WebGeoLocationProvider {
    async fn country_for_ip(&self, ip: &str) -> Option<Country> {
        let geo = self.lookup(ip).await?;
        let code = geo.country_code?;

        Some(Country {
            name: geo.country.unwrap_or_else(|| code.clone()),
            code,
        })
    }

    async fn region_for_ip(&self, ip: &str) -> Option<Region> {
        let geo = self.lookup(ip).await?;
        let country_code = geo.country_code?;
        let region = geo.region?;

        Some(Region {
            country_code,
            names: vec![region],
        })
    }
}
