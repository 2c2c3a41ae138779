//! Handler for `POST /scrape` — the manual scrape trigger.

use axum::{extract::State, http::StatusCode};
use marquee_core::store::{ScheduleStore, TheaterStore};
use marquee_scrape::run::scrape_all;
use tracing::{error, info};

use crate::AppState;

/// `POST /scrape`
///
/// Kicks off one sequential scrape pass over every stored theater in the
/// background and returns immediately. Progress and per-theater failures
/// are reported through the log.
pub async fn trigger<S>(State(state): State<AppState<S>>) -> StatusCode
where
  S: TheaterStore + ScheduleStore<Error = <S as TheaterStore>::Error> + 'static,
{
  tokio::spawn(async move {
    let AppState {
      store,
      fetcher,
      rules,
      ..
    } = state;

    match scrape_all(store.as_ref(), &fetcher, &rules).await {
      Ok(summary) => info!(
        theaters = summary.theaters,
        succeeded = summary.succeeded,
        failed = summary.failed,
        schedules = summary.schedules,
        "scrape pass finished"
      ),
      Err(err) => error!(error = %err, "scrape pass aborted"),
    }
  });

  StatusCode::ACCEPTED
}
