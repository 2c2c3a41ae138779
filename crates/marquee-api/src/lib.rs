//! HTTP layer for Marquee.
//!
//! Exposes an axum [`Router`] backed by any store implementing the core
//! traits: the proximity query, theater listing/onboarding, and the manual
//! scrape trigger. TLS and transport concerns are the caller's
//! responsibility.

pub mod error;
pub mod schedules;
pub mod scrape;
pub mod theaters;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use marquee_core::store::{ScheduleStore, TheaterStore};
use marquee_extract::ExtractionRules;
use marquee_scrape::{Geocoder, PageFetcher};
use serde::Deserialize;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` with
/// `MARQUEE_`-prefixed environment overrides. Every field has a default so
/// the server runs out of the box.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:             String,
  #[serde(default = "default_port")]
  pub port:             u16,
  #[serde(default = "default_db_path")]
  pub db_path:          PathBuf,
  /// Identity string sent as `User-Agent` on outbound page fetches.
  #[serde(default = "default_user_agent")]
  pub user_agent:       String,
  /// Address-search endpoint used when onboarding theaters.
  #[serde(default = "default_geocode_endpoint")]
  pub geocode_endpoint: String,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8700 }
fn default_db_path() -> PathBuf { PathBuf::from("marquee.sqlite") }
fn default_user_agent() -> String {
  marquee_scrape::fetch::DEFAULT_USER_AGENT.to_string()
}
fn default_geocode_endpoint() -> String {
  marquee_scrape::geocode::DEFAULT_ENDPOINT.to_string()
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:             default_host(),
      port:             default_port(),
      db_path:          default_db_path(),
      user_agent:       default_user_agent(),
      geocode_endpoint: default_geocode_endpoint(),
    }
  }
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store:    Arc<S>,
  pub fetcher:  PageFetcher,
  pub geocoder: Geocoder,
  pub rules:    ExtractionRules,
}

// Hand-written so `S` itself does not need `Clone`; the store is behind an
// `Arc`.
impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      fetcher:  self.fetcher.clone(),
      geocoder: self.geocoder.clone(),
      rules:    self.rules.clone(),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the query and admin API.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: TheaterStore + ScheduleStore<Error = <S as TheaterStore>::Error> + 'static,
{
  Router::new()
    .route("/schedules", get(schedules::list::<S>))
    .route("/theaters", get(theaters::list::<S>).post(theaters::create::<S>))
    .route("/scrape", post(scrape::trigger::<S>))
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use chrono::{Duration, Utc};
  use marquee_core::{
    geo::GeoPoint,
    schedule::NewSchedule,
    store::{ScheduleStore, TheaterStore},
    theater::{NewTheater, Theater},
  };
  use marquee_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  const SHINJUKU: GeoPoint = GeoPoint { lat: 35.6905, lon: 139.7005 };

  async fn make_state() -> AppState<SqliteStore> {
    AppState {
      store:    Arc::new(SqliteStore::open_in_memory().await.unwrap()),
      fetcher:  PageFetcher::new("MarqueeTest/0"),
      // Never reached by these tests; every request that would geocode
      // supplies coordinates or no address at all.
      geocoder: Geocoder::new("http://127.0.0.1:9/address-search"),
      rules:    ExtractionRules::default(),
    }
  }

  async fn seed_theater(state: &AppState<SqliteStore>, name: &str, url: &str) -> Theater {
    state
      .store
      .add_theater(NewTheater::new(name, url).with_location(SHINJUKU))
      .await
      .unwrap()
  }

  async fn seed_showing(
    state: &AppState<SqliteStore>,
    theater: &Theater,
    title: &str,
    hours_from_now: i64,
  ) {
    state
      .store
      .add_schedule(NewSchedule {
        theater_id:       theater.theater_id,
        movie_title:      title.to_string(),
        start_time:       Utc::now() + Duration::hours(hours_from_now),
        end_time:         None,
        duration_minutes: Some(120),
        booking_url:      theater.url.clone(),
      })
      .await
      .unwrap();
  }

  async fn send(
    state: AppState<SqliteStore>,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
  ) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(json) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(json.to_string())
      }
      None => Body::empty(),
    };
    let response = router(state)
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
      .await
      .unwrap();
    // Rejections from the typed extractors arrive as plain text; wrap them
    // so callers can still inspect the body.
    let json = serde_json::from_slice(&bytes).unwrap_or_else(|_| {
      serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
    });
    (status, json)
  }

  // ── GET /schedules ──────────────────────────────────────────────────────

  #[tokio::test]
  async fn empty_store_returns_empty_page() {
    let state = make_state().await;
    let (status, json) = send(state, "GET", "/schedules", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["schedules"].as_array().unwrap().len(), 0);
    assert_eq!(json["hasMore"], false);
  }

  #[tokio::test]
  async fn nearby_showing_is_served_with_theater_fields() {
    let state = make_state().await;
    let theater =
      seed_theater(&state, "Shinjuku Cinema", "https://example.com/shinjuku/").await;
    seed_showing(&state, &theater, "Perfect Days", 1).await;

    let (status, json) = send(
      state,
      "GET",
      "/schedules?lat=35.6890&lon=139.6910&radius=5",
      None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let rows = json["schedules"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["movie_title"], "Perfect Days");
    assert_eq!(rows[0]["theater_name"], "Shinjuku Cinema");
    assert_eq!(rows[0]["latitude"], SHINJUKU.lat);
    assert_eq!(rows[0]["longitude"], SHINJUKU.lon);
    assert_eq!(json["hasMore"], false);
  }

  #[tokio::test]
  async fn tiny_radius_returns_nothing() {
    let state = make_state().await;
    let theater =
      seed_theater(&state, "Shinjuku Cinema", "https://example.com/shinjuku/").await;
    seed_showing(&state, &theater, "Perfect Days", 1).await;

    let (status, json) = send(
      state,
      "GET",
      "/schedules?lat=35.6890&lon=139.6910&radius=0.001",
      None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["schedules"].as_array().unwrap().len(), 0);
    assert_eq!(json["hasMore"], false);
  }

  #[tokio::test]
  async fn pagination_is_exact_over_http() {
    let state = make_state().await;
    let first =
      seed_theater(&state, "Shinjuku Cinema", "https://example.com/shinjuku/").await;
    let second =
      seed_theater(&state, "Yoyogi Hall", "https://example.com/yoyogi/").await;

    seed_showing(&state, &first, "First", 1).await;
    seed_showing(&state, &second, "Second", 2).await;
    seed_showing(&state, &first, "Third", 3).await;

    let base = "/schedules?lat=35.6890&lon=139.6910&radius=5&limit=1";

    let (_, page1) = send(state.clone(), "GET", base, None).await;
    assert_eq!(page1["schedules"][0]["movie_title"], "First");
    assert_eq!(page1["hasMore"], true);

    let (_, page2) = send(state.clone(), "GET", &format!("{base}&offset=1"), None).await;
    assert_eq!(page2["schedules"][0]["movie_title"], "Second");
    assert_eq!(page2["hasMore"], true);

    let (_, page3) = send(state, "GET", &format!("{base}&offset=2"), None).await;
    assert_eq!(page3["schedules"][0]["movie_title"], "Third");
    assert_eq!(page3["hasMore"], false);
  }

  #[tokio::test]
  async fn malformed_numbers_are_rejected_not_coerced() {
    let state = make_state().await;
    let (status, _) = send(state, "GET", "/schedules?lat=abc&lon=139.0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn lat_without_lon_is_rejected() {
    let state = make_state().await;
    let (status, json) = send(state, "GET", "/schedules?lat=35.0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
      json["error"].as_str().unwrap().contains("together"),
      "unexpected error body: {json}"
    );
  }

  // ── /theaters ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn onboard_theater_with_explicit_coordinates() {
    let state = make_state().await;

    let body = serde_json::json!({
      "name": "Yoyogi Hall",
      "url": "https://example.com/yoyogi/",
      "latitude": 35.6890,
      "longitude": 139.6910,
    });
    let (status, json) = send(state.clone(), "POST", "/theaters", Some(body)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["name"], "Yoyogi Hall");
    assert_eq!(json["latitude"], 35.6890);

    let (_, listed) = send(state, "GET", "/theaters", None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn onboard_without_address_or_coordinates_stores_nulls() {
    let state = make_state().await;

    let body = serde_json::json!({
      "name": "Mystery Venue",
      "url": "https://example.com/mystery/",
    });
    let (status, json) = send(state, "POST", "/theaters", Some(body)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["latitude"], serde_json::Value::Null);
    assert_eq!(json["longitude"], serde_json::Value::Null);
  }

  #[tokio::test]
  async fn onboard_with_partial_coordinates_is_rejected() {
    let state = make_state().await;

    let body = serde_json::json!({
      "name": "Half",
      "url": "https://example.com/half/",
      "latitude": 35.0,
    });
    let (status, _) = send(state, "POST", "/theaters", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  // ── POST /scrape ────────────────────────────────────────────────────────

  #[tokio::test]
  async fn scrape_trigger_is_accepted() {
    let state = make_state().await;
    let (status, _) = send(state, "POST", "/scrape", None).await;
    assert_eq!(status, StatusCode::ACCEPTED);
  }
}
