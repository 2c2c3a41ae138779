//! Great-circle geometry.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
  pub lat: f64,
  pub lon: f64,
}

/// Haversine great-circle distance between two points, in kilometers.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
  let d_lat = (b.lat - a.lat).to_radians();
  let d_lon = (b.lon - a.lon).to_radians();

  let h = (d_lat / 2.0).sin().powi(2)
    + a.lat.to_radians().cos()
      * b.lat.to_radians().cos()
      * (d_lon / 2.0).sin().powi(2);

  2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}
