//! Theater onboarding from a seed file.
//!
//! Each entry names a theater, its schedule-page URL, and a free-text
//! address. The address is geocoded and the record upserted by URL, so
//! re-running the same file is safe: the last successful geocode wins.

use marquee_core::{
  store::TheaterStore,
  theater::{NewTheater, Theater},
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::geocode::{Geocoder, PACING};

/// One seed-file entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TheaterSeed {
  pub name:    String,
  pub url:     String,
  /// Free-text address handed to the geocoder. Entries without one are
  /// stored with no coordinates.
  pub address: Option<String>,
}

/// Geocode and upsert every seed entry, sequentially and paced.
///
/// A geocode failure degrades that entry to a null-coordinate record rather
/// than aborting the run; only a store error aborts.
pub async fn onboard_theaters<S>(
  store: &S,
  geocoder: &Geocoder,
  seeds: Vec<TheaterSeed>,
) -> Result<Vec<Theater>, S::Error>
where
  S: TheaterStore,
{
  let mut stored = Vec::with_capacity(seeds.len());

  for (i, seed) in seeds.into_iter().enumerate() {
    if i > 0 {
      tokio::time::sleep(PACING).await;
    }

    let mut input = NewTheater::new(seed.name, seed.url);

    if let Some(address) = &seed.address {
      match geocoder.geocode(address).await {
        Ok(Some(point)) => input = input.with_location(point),
        Ok(None) => {
          info!(theater = %input.name, "no geocode match; storing without coordinates");
        }
        Err(err) => {
          warn!(
            theater = %input.name,
            error = %err,
            "geocode failed; storing without coordinates"
          );
        }
      }
    }

    stored.push(store.upsert_theater(input).await?);
  }

  Ok(stored)
}
