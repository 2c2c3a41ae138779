//! Handlers for `/theaters` — listing and onboarding.

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use marquee_core::{
  geo::GeoPoint,
  store::{ScheduleStore, TheaterStore},
  theater::{NewTheater, Theater},
};
use serde::Deserialize;
use tracing::warn;

use crate::{AppState, error::ApiError};

/// `GET /theaters`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Theater>>, ApiError>
where
  S: TheaterStore + ScheduleStore<Error = <S as TheaterStore>::Error> + 'static,
{
  let theaters = state
    .store
    .list_theaters()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(theaters))
}

/// JSON body accepted by `POST /theaters`.
#[derive(Debug, Deserialize)]
pub struct NewTheaterBody {
  pub name:      String,
  pub url:       String,
  /// Free-text address, geocoded server-side when no coordinates are given.
  pub address:   Option<String>,
  pub latitude:  Option<f64>,
  pub longitude: Option<f64>,
}

/// `POST /theaters` — onboard (or re-onboard) one theater.
///
/// Coordinates win over the address when both are present. A failed geocode
/// degrades to a record without coordinates; onboarding never fails on the
/// geocoding step alone.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<NewTheaterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TheaterStore + ScheduleStore<Error = <S as TheaterStore>::Error> + 'static,
{
  let mut input = NewTheater::new(body.name, body.url);

  match (body.latitude, body.longitude) {
    (Some(lat), Some(lon)) => {
      input = input.with_location(GeoPoint { lat, lon });
    }
    (None, None) => {
      if let Some(address) = &body.address {
        match state.geocoder.geocode(address).await {
          Ok(Some(point)) => input = input.with_location(point),
          Ok(None) => {}
          Err(err) => {
            warn!(theater = %input.name, error = %err, "geocode failed; storing without coordinates");
          }
        }
      }
    }
    _ => {
      return Err(ApiError::BadRequest(
        "latitude and longitude must be provided together".to_string(),
      ));
    }
  }

  let theater = state
    .store
    .upsert_theater(input)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok((StatusCode::CREATED, Json(theater)))
}
