//! Handler for `GET /schedules` — the proximity query.

use axum::{
  Json,
  extract::{Query, State},
};
use marquee_core::{
  geo::GeoPoint,
  store::{DEFAULT_LIMIT, DEFAULT_RADIUS_KM, SchedulePage, ScheduleQuery, ScheduleStore, TheaterStore},
};
use serde::Deserialize;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize, Default)]
pub struct ScheduleParams {
  pub lat:    Option<f64>,
  pub lon:    Option<f64>,
  /// Kilometers. Defaults to 5.
  pub radius: Option<f64>,
  pub offset: Option<usize>,
  pub limit:  Option<usize>,
}

/// `GET /schedules[?lat&lon][&radius][&offset][&limit]`
///
/// `lat` and `lon` must be supplied together; with neither, the listing is
/// global and the radius is a no-op. Malformed numeric parameters are
/// rejected with a 400 by the typed `Query` extractor rather than silently
/// coerced into defaults.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ScheduleParams>,
) -> Result<Json<SchedulePage>, ApiError>
where
  S: TheaterStore + ScheduleStore<Error = <S as TheaterStore>::Error> + 'static,
{
  let center = match (params.lat, params.lon) {
    (Some(lat), Some(lon)) => Some(GeoPoint { lat, lon }),
    (None, None) => None,
    _ => {
      return Err(ApiError::BadRequest(
        "lat and lon must be provided together".to_string(),
      ));
    }
  };

  let query = ScheduleQuery {
    center,
    radius_km: params.radius.unwrap_or(DEFAULT_RADIUS_KM),
    offset:    params.offset.unwrap_or(0),
    limit:     params.limit.unwrap_or(DEFAULT_LIMIT),
    as_of:     None,
  };

  let page = state
    .store
    .query_schedules(&query)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(page))
}
