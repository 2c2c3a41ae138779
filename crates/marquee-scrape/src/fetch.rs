//! Single-page HTTP fetch with a fixed identity header.

use reqwest::{Client, header};
use url::Url;

use crate::error::FetchError;

/// Identity string sent as `User-Agent` when none is configured.
pub const DEFAULT_USER_AGENT: &str = "MarqueeScraper/0.1";

/// Fetches theater pages. One GET per call, no internal retry — the batch
/// runner decides whether to skip or abort a failed theater, and owns the
/// politeness delays between calls.
#[derive(Clone)]
pub struct PageFetcher {
  client:     Client,
  user_agent: String,
}

impl PageFetcher {
  pub fn new(user_agent: impl Into<String>) -> Self {
    Self {
      client:     Client::new(),
      user_agent: user_agent.into(),
    }
  }

  /// GET `url` and decode the body as text. No assumptions are made about
  /// the content type beyond "is text".
  pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
    let parsed = Url::parse(url)
      .ok()
      .filter(|u| matches!(u.scheme(), "http" | "https"))
      .ok_or_else(|| FetchError::InvalidUrl { url: url.to_string() })?;

    let response = self
      .client
      .get(parsed)
      .header(header::USER_AGENT, &self.user_agent)
      .send()
      .await
      .map_err(|source| FetchError::Http { url: url.to_string(), source })?;

    let status = response.status();
    if !status.is_success() {
      return Err(FetchError::Status { url: url.to_string(), status });
    }

    response
      .text()
      .await
      .map_err(|source| FetchError::Decode { url: url.to_string(), source })
  }
}
