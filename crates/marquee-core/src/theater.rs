//! Theater — a showtime source with an optional geocoded location.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::GeoPoint;

/// A theater whose schedule page is scraped.
///
/// `latitude` and `longitude` are both present or both absent; the store
/// rejects a record with exactly one of them. A theater is never deleted by
/// the core — removal is an operational concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theater {
  pub theater_id: Uuid,
  pub created_at: DateTime<Utc>,
  pub name:       String,
  /// Canonical source URL of the schedule page; unique across theaters.
  pub url:        String,
  pub latitude:   Option<f64>,
  pub longitude:  Option<f64>,
}

impl Theater {
  /// The theater's location, if it has been geocoded.
  pub fn location(&self) -> Option<GeoPoint> {
    match (self.latitude, self.longitude) {
      (Some(lat), Some(lon)) => Some(GeoPoint { lat, lon }),
      _ => None,
    }
  }
}

/// Input to [`crate::store::TheaterStore::add_theater`] and
/// [`crate::store::TheaterStore::upsert_theater`].
/// `theater_id` and `created_at` are always set by the store.
#[derive(Debug, Clone)]
pub struct NewTheater {
  pub name:      String,
  pub url:       String,
  pub latitude:  Option<f64>,
  pub longitude: Option<f64>,
}

impl NewTheater {
  /// Convenience constructor for a theater with no coordinates yet.
  pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      url: url.into(),
      latitude: None,
      longitude: None,
    }
  }

  pub fn with_location(mut self, point: GeoPoint) -> Self {
    self.latitude = Some(point.lat);
    self.longitude = Some(point.lon);
    self
  }
}
