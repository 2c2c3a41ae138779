//! The `TheaterStore` / `ScheduleStore` traits and supporting query types.
//!
//! The traits are implemented by storage backends (e.g.
//! `marquee-store-sqlite`). Higher layers (`marquee-api`, `marquee-scrape`)
//! depend on these abstractions, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
  geo::GeoPoint,
  schedule::{NewSchedule, Schedule, ScheduleWithTheater},
  theater::{NewTheater, Theater},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Default proximity radius, in kilometers.
pub const DEFAULT_RADIUS_KM: f64 = 5.0;

/// Default page size.
pub const DEFAULT_LIMIT: usize = 20;

/// Parameters for [`ScheduleStore::query_schedules`].
#[derive(Debug, Clone)]
pub struct ScheduleQuery {
  /// Center of the proximity filter. `None` means a global listing; the
  /// radius is then ignored.
  pub center:    Option<GeoPoint>,
  pub radius_km: f64,
  pub offset:    usize,
  pub limit:     usize,
  /// Only schedules starting strictly after this instant are returned.
  /// Defaults to now.
  pub as_of:     Option<DateTime<Utc>>,
}

impl Default for ScheduleQuery {
  fn default() -> Self {
    Self {
      center:    None,
      radius_km: DEFAULT_RADIUS_KM,
      offset:    0,
      limit:     DEFAULT_LIMIT,
      as_of:     None,
    }
  }
}

/// One page of query results.
///
/// `has_more` is exact: true iff at least one further future, in-radius
/// schedule exists beyond this page.
#[derive(Debug, Clone, Serialize)]
pub struct SchedulePage {
  pub schedules: Vec<ScheduleWithTheater>,
  #[serde(rename = "hasMore")]
  pub has_more:  bool,
}

// ─── Traits ──────────────────────────────────────────────────────────────────

/// Abstraction over theater persistence.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait TheaterStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Create and persist a new theater. Fails if the URL is already
  /// registered or if only one coordinate is supplied.
  fn add_theater(
    &self,
    input: NewTheater,
  ) -> impl Future<Output = Result<Theater, Self::Error>> + Send + '_;

  /// Insert-or-update keyed on the canonical URL: an existing record gets
  /// its name and coordinates overwritten. Re-geocoding the same theater is
  /// safe to repeat; the last write wins.
  fn upsert_theater(
    &self,
    input: NewTheater,
  ) -> impl Future<Output = Result<Theater, Self::Error>> + Send + '_;

  /// Retrieve a theater by id. Returns `None` if not found.
  fn get_theater(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Theater>, Self::Error>> + Send + '_;

  /// List all theaters.
  fn list_theaters(
    &self,
  ) -> impl Future<Output = Result<Vec<Theater>, Self::Error>> + Send + '_;
}

/// Abstraction over schedule persistence and the proximity query.
pub trait ScheduleStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Append a single schedule. The owning theater must exist and the movie
  /// title must be non-empty.
  fn add_schedule(
    &self,
    input: NewSchedule,
  ) -> impl Future<Output = Result<Schedule, Self::Error>> + Send + '_;

  /// Atomically replace a theater's future schedules with `batch`: within
  /// one transaction, future-dated rows for the theater are deleted and the
  /// batch inserted. Readers never observe a partially-written page. Past
  /// rows are retained as history.
  fn replace_schedules(
    &self,
    theater_id: Uuid,
    batch: Vec<NewSchedule>,
  ) -> impl Future<Output = Result<Vec<Schedule>, Self::Error>> + Send + '_;

  /// Proximity query: future schedules of theaters within the radius,
  /// ascending by start time, paginated with an exact `has_more` flag.
  /// Theaters without coordinates never match a centered query.
  fn query_schedules<'a>(
    &'a self,
    query: &'a ScheduleQuery,
  ) -> impl Future<Output = Result<SchedulePage, Self::Error>> + Send + 'a;
}
