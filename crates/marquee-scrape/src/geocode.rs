//! Free-text address resolution via an address-search service.

use std::time::Duration;

use marquee_core::geo::GeoPoint;
use reqwest::Client;
use serde::Deserialize;

use crate::error::GeocodeError;

/// Default address-search endpoint (GSI, Japan).
pub const DEFAULT_ENDPOINT: &str =
  "https://msearch.gsi.go.jp/address-search/AddressSearch";

/// Minimum pause between successive calls in a batch; the upstream service
/// is a shared public resource with implicit rate limits.
pub const PACING: Duration = Duration::from_secs(1);

/// Resolves free-text addresses to coordinates.
#[derive(Clone)]
pub struct Geocoder {
  client:   Client,
  endpoint: String,
}

impl Geocoder {
  pub fn new(endpoint: impl Into<String>) -> Self {
    Self {
      client:   Client::new(),
      endpoint: endpoint.into(),
    }
  }

  /// Resolve `address` to its best-match coordinates.
  ///
  /// `Ok(None)` means the service had no match — an expected outcome, not a
  /// failure. Calling again for the same address is safe; callers upsert the
  /// result, so the last successful geocode wins.
  pub async fn geocode(&self, address: &str) -> Result<Option<GeoPoint>, GeocodeError> {
    let body = self
      .client
      .get(&self.endpoint)
      .query(&[("q", address)])
      .send()
      .await?
      .error_for_status()?
      .text()
      .await?;

    parse_response(&body)
  }
}

/// One entry of the search response. Matches without a geometry are treated
/// as misses.
#[derive(Debug, Deserialize)]
struct AddressMatch {
  geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
  /// GeoJSON order: `[longitude, latitude]`.
  coordinates: Vec<f64>,
}

/// Pull the first match's coordinates out of an address-search response.
fn parse_response(body: &str) -> Result<Option<GeoPoint>, GeocodeError> {
  let matches: Vec<AddressMatch> = serde_json::from_str(body)?;
  Ok(
    matches
      .first()
      .and_then(|m| m.geometry.as_ref())
      .and_then(|g| match g.coordinates.as_slice() {
        [lon, lat, ..] => Some(GeoPoint { lat: *lat, lon: *lon }),
        _ => None,
      }),
  )
}
