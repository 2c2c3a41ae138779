//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 UTC strings, which makes
//! lexicographic `ORDER BY`/comparison agree with chronological order.
//! UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use marquee_core::{
  schedule::{Schedule, ScheduleWithTheater},
  theater::Theater,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `theaters` row.
pub struct RawTheater {
  pub theater_id: String,
  pub created_at: String,
  pub name:       String,
  pub url:        String,
  pub latitude:   Option<f64>,
  pub longitude:  Option<f64>,
}

impl RawTheater {
  pub fn into_theater(self) -> Result<Theater> {
    Ok(Theater {
      theater_id: decode_uuid(&self.theater_id)?,
      created_at: decode_dt(&self.created_at)?,
      name:       self.name,
      url:        self.url,
      latitude:   self.latitude,
      longitude:  self.longitude,
    })
  }
}

/// Raw strings read directly from a `schedules` row.
pub struct RawSchedule {
  pub schedule_id:      String,
  pub theater_id:       String,
  pub movie_title:      String,
  pub start_time:       String,
  pub end_time:         Option<String>,
  pub duration_minutes: Option<i64>,
  pub booking_url:      String,
}

impl RawSchedule {
  pub fn into_schedule(self) -> Result<Schedule> {
    Ok(Schedule {
      schedule_id:      decode_uuid(&self.schedule_id)?,
      theater_id:       decode_uuid(&self.theater_id)?,
      movie_title:      self.movie_title,
      start_time:       decode_dt(&self.start_time)?,
      end_time:         self.end_time.as_deref().map(decode_dt).transpose()?,
      duration_minutes: self.duration_minutes.map(|m| m as u32),
      booking_url:      self.booking_url,
    })
  }
}

/// A `schedules` row joined with its theater's name and coordinates.
pub struct RawJoinedSchedule {
  pub schedule:     RawSchedule,
  pub theater_name: String,
  pub latitude:     Option<f64>,
  pub longitude:    Option<f64>,
}

impl RawJoinedSchedule {
  pub fn into_row(self) -> Result<ScheduleWithTheater> {
    Ok(ScheduleWithTheater {
      schedule:     self.schedule.into_schedule()?,
      theater_name: self.theater_name,
      latitude:     self.latitude,
      longitude:    self.longitude,
    })
  }
}
