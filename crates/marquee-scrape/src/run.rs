//! Sequential scrape runner.
//!
//! Theaters are processed one at a time — fetch, parse, extract, store —
//! with a randomized pause before each fetch. Sequencing is a politeness
//! constraint toward the source sites, not a performance limitation. A slow
//! target stalls the batch; that is the accepted tradeoff.

use std::time::Duration;

use chrono::Local;
use marquee_core::{
  schedule::NewSchedule,
  store::{ScheduleStore, TheaterStore},
  theater::Theater,
};
use marquee_extract::{
  ExtractionRules, MarkupTree, ScanContext, ScheduleCandidate, extract_schedules,
};
use rand::{Rng, rng};
use thiserror::Error;
use tracing::{info, warn};

use crate::{error::FetchError, fetch::PageFetcher};

/// Why one theater's scrape cycle failed. Caught at the batch-loop
/// boundary; never aborts the run.
#[derive(Debug, Error)]
pub enum ScrapeError<E: std::error::Error + Send + Sync + 'static> {
  #[error(transparent)]
  Fetch(#[from] FetchError),

  #[error("store write failed: {0}")]
  Store(E),
}

/// Counts for one scrape run.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScrapeSummary {
  pub theaters:  usize,
  pub succeeded: usize,
  pub failed:    usize,
  pub schedules: usize,
}

/// Pause 2–3 s so successive fetches never hammer a source site.
fn politeness_delay() -> Duration {
  Duration::from_millis(2_000 + rng().random_range(0..1_000))
}

/// Scrape every stored theater, strictly sequentially.
///
/// A failure on one theater is logged with its identity and skipped; the
/// batch always runs to completion. Each theater's schedules are stored
/// atomically before the next fetch begins. Only a failure to list the
/// theaters at all aborts the run.
pub async fn scrape_all<S>(
  store: &S,
  fetcher: &PageFetcher,
  rules: &ExtractionRules,
) -> Result<ScrapeSummary, <S as TheaterStore>::Error>
where
  S: TheaterStore + ScheduleStore<Error = <S as TheaterStore>::Error>,
{
  let theaters = TheaterStore::list_theaters(store).await?;
  let mut summary = ScrapeSummary {
    theaters: theaters.len(),
    ..ScrapeSummary::default()
  };

  for theater in &theaters {
    tokio::time::sleep(politeness_delay()).await;

    match scrape_one(store, fetcher, rules, theater).await {
      Ok(stored) => {
        info!(theater = %theater.name, schedules = stored, "scrape complete");
        summary.succeeded += 1;
        summary.schedules += stored;
      }
      Err(err) => {
        warn!(
          theater = %theater.name,
          url = %theater.url,
          error = %err,
          "scrape failed; continuing with next theater"
        );
        summary.failed += 1;
      }
    }
  }

  Ok(summary)
}

/// One fetch-parse-extract-store cycle.
async fn scrape_one<S>(
  store: &S,
  fetcher: &PageFetcher,
  rules: &ExtractionRules,
  theater: &Theater,
) -> Result<usize, ScrapeError<<S as TheaterStore>::Error>>
where
  S: TheaterStore + ScheduleStore<Error = <S as TheaterStore>::Error>,
{
  let html = fetcher.fetch(&theater.url).await?;

  let ctx = ScanContext {
    theater_id:  theater.theater_id,
    booking_url: theater.url.clone(),
    scrape_date: Local::now().date_naive(),
  };

  // The parsed tree is scoped: `scraper`'s document type is not `Send`, so
  // it must be gone before the store write is awaited.
  let batch: Vec<NewSchedule> = {
    let tree = MarkupTree::parse(&html);
    extract_schedules(&tree, rules, &ctx)
      .into_iter()
      .map(into_new_schedule)
      .collect()
  };

  let stored = ScheduleStore::replace_schedules(store, theater.theater_id, batch)
    .await
    .map_err(ScrapeError::Store)?;

  Ok(stored.len())
}

fn into_new_schedule(candidate: ScheduleCandidate) -> NewSchedule {
  NewSchedule {
    theater_id:       candidate.theater_id,
    movie_title:      candidate.movie_title,
    start_time:       candidate.start_time,
    end_time:         None,
    duration_minutes: Some(candidate.duration_minutes),
    booking_url:      candidate.booking_url,
  }
}
