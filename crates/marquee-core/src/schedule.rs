//! Schedule — one showing of one movie at one theater.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted showing. Never updated in place; staleness is handled by
/// time-filtering at query time, not by deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
  pub schedule_id:      Uuid,
  /// Owning theater; must reference an existing [`crate::theater::Theater`].
  pub theater_id:       Uuid,
  pub movie_title:      String,
  pub start_time:       DateTime<Utc>,
  pub end_time:         Option<DateTime<Utc>>,
  pub duration_minutes: Option<u32>,
  pub booking_url:      String,
}

/// Input to the schedule write operations.
/// `schedule_id` is always set by the store.
#[derive(Debug, Clone)]
pub struct NewSchedule {
  pub theater_id:       Uuid,
  pub movie_title:      String,
  pub start_time:       DateTime<Utc>,
  pub end_time:         Option<DateTime<Utc>>,
  pub duration_minutes: Option<u32>,
  pub booking_url:      String,
}

/// A schedule joined with its theater's name and coordinates, as served by
/// the query API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleWithTheater {
  #[serde(flatten)]
  pub schedule:     Schedule,
  pub theater_name: String,
  pub latitude:     Option<f64>,
  pub longitude:    Option<f64>,
}
