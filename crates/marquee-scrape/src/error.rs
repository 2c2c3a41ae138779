//! Error types for `marquee-scrape`.

use thiserror::Error;

/// A page fetch that could not produce text.
#[derive(Debug, Error)]
pub enum FetchError {
  #[error("not an absolute http(s) URL: {url}")]
  InvalidUrl { url: String },

  #[error("request to {url} failed: {source}")]
  Http {
    url:    String,
    #[source]
    source: reqwest::Error,
  },

  #[error("{url} returned HTTP {status}")]
  Status {
    url:    String,
    status: reqwest::StatusCode,
  },

  #[error("could not decode body of {url}: {source}")]
  Decode {
    url:    String,
    #[source]
    source: reqwest::Error,
  },
}

/// A geocoding call that failed outright. A no-match response is a normal
/// `Ok(None)` result, not one of these.
#[derive(Debug, Error)]
pub enum GeocodeError {
  #[error("geocode request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("geocode response was not the expected JSON shape: {0}")]
  Parse(#[from] serde_json::Error),
}
