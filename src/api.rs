//! Synchronous client for the **CEPALSTAT API (v1)**.
//!
//! Each indicator exposes three endpoints that the pipeline reads independently:
//! `indicator/{id}/data`, `indicator/{id}/dimensions` and `indicator/{id}/metadata`.
//! All of them take a `lang` code and a `format` selector.
//!
//! ### Notes
//! - Requests are plain blocking GETs: no timeout, no retry. A host that never
//!   answers stalls the caller.
//! - Components talk to the network only through [`IndicatorSource`], so tests
//!   can substitute an in-memory source.
//!
//! Typical usage:
//! ```no_run
//! # use cepalstat_rs::api::{Client, Endpoint, IndicatorSource};
//! let client = Client::new()?;
//! let body = client.get_json(Endpoint::Metadata, 2206, "en")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Context, Result};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api-cepalstat.cepal.org/cepalstat/api/v1";

/// The per-indicator endpoints the pipeline consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Data,
    Dimensions,
    Metadata,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Data => "data",
            Endpoint::Dimensions => "dimensions",
            Endpoint::Metadata => "metadata",
        }
    }

    /// Query parameters for this endpoint.
    pub fn query<'a>(&self, lang: &'a str) -> Vec<(&'static str, &'a str)> {
        let mut q = vec![("lang", lang), ("format", "json")];
        if let Endpoint::Dimensions = self {
            // members inline, flat (no hierarchy paths)
            q.push(("in", "1"));
            q.push(("path", "0"));
        }
        q
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("GET {url} failed with HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("GET {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("decode {endpoint} response for indicator {indicator_id}: {source}")]
    Decode {
        endpoint: &'static str,
        indicator_id: u32,
        #[source]
        source: serde_json::Error,
    },
}

/// Anything that can answer the three indicator endpoints with JSON.
pub trait IndicatorSource {
    fn get_json(&self, endpoint: Endpoint, indicator_id: u32, lang: &str)
    -> Result<Value, FetchError>;
}

impl<T: IndicatorSource + ?Sized> IndicatorSource for &T {
    fn get_json(
        &self,
        endpoint: Endpoint,
        indicator_id: u32,
        lang: &str,
    ) -> Result<Value, FetchError> {
        (**self).get_json(endpoint, indicator_id, lang)
    }
}

/// GET an endpoint and decode it into one of the `models` response records.
pub fn fetch_as<T, S>(
    source: &S,
    endpoint: Endpoint,
    indicator_id: u32,
    lang: &str,
) -> Result<T, FetchError>
where
    T: DeserializeOwned,
    S: IndicatorSource + ?Sized,
{
    let v = source.get_json(endpoint, indicator_id, lang)?;
    serde_json::from_value(v).map_err(|source| FetchError::Decode {
        endpoint: endpoint.path(),
        indicator_id,
        source,
    })
}

#[derive(Debug, Clone)]
pub struct Client {
    pub base_url: String,
    http: HttpClient,
}

impl Client {
    /// Client against the public CEPALSTAT API.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(None::<Duration>) // blocking reqwest defaults to 30s; requests here wait indefinitely
            .redirect(Policy::limited(5)) // cap redirects
            .user_agent(concat!("cepalstat_rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build http client")?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { base_url, http })
    }

    pub fn endpoint_url(&self, endpoint: Endpoint, indicator_id: u32) -> String {
        format!(
            "{}/indicator/{}/{}",
            self.base_url,
            indicator_id,
            endpoint.path()
        )
    }
}

impl IndicatorSource for Client {
    fn get_json(
        &self,
        endpoint: Endpoint,
        indicator_id: u32,
        lang: &str,
    ) -> Result<Value, FetchError> {
        let url = self.endpoint_url(endpoint, indicator_id);
        let transport = |source| FetchError::Transport {
            url: url.clone(),
            source,
        };
        let resp = self
            .http
            .get(&url)
            .query(&endpoint.query(lang))
            .send()
            .map_err(transport)?;
        if !resp.status().is_success() {
            return Err(FetchError::Status {
                url: url.clone(),
                status: resp.status().as_u16(),
            });
        }
        let text = resp.text().map_err(transport)?;
        serde_json::from_str(&text).map_err(|source| FetchError::Decode {
            endpoint: endpoint.path(),
            indicator_id,
            source,
        })
    }
}
