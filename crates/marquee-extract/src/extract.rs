//! Single-pass heuristic showtime extraction.
//!
//! One left-to-right scan over every element in document order, carrying one
//! piece of state: the most recently seen title-like text. A time-like
//! element is attributed to that title. Titles seen later in the document
//! never affect earlier times.

use std::collections::HashSet;

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use uuid::Uuid;

use crate::{markup::MarkupTree, rules::ExtractionRules};

/// Title carried before any title-like element has been seen.
pub const UNKNOWN_TITLE: &str = "Unknown Movie";

/// Title of the sentinel candidate emitted when a page yields nothing.
/// Deliberately loud: a failed extraction shows up in the schedule list
/// instead of looking like a theater with no showings.
pub const FALLBACK_TITLE: &str = "Parse Failed";

/// Placeholder runtime used until a page supplies a real one.
pub const DEFAULT_DURATION_MINUTES: u32 = 120;

/// Per-scan context: which theater the page belongs to and which calendar
/// day the scrape ran. The caller resolves "today" once per scan, which
/// keeps extraction a pure function of its inputs.
#[derive(Debug, Clone)]
pub struct ScanContext {
  pub theater_id:  Uuid,
  pub booking_url: String,
  pub scrape_date: NaiveDate,
}

/// One extracted (movie, showtime) pair, not yet persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleCandidate {
  pub theater_id:       Uuid,
  pub movie_title:      String,
  pub start_time:       DateTime<Utc>,
  pub duration_minutes: u32,
  pub booking_url:      String,
}

/// Scan `tree` and reconstruct (title, start time) pairs.
///
/// Always yields at least one candidate: a page where the heuristics find
/// nothing produces a single [`FALLBACK_TITLE`] sentinel at noon.
pub fn extract_schedules(
  tree: &MarkupTree,
  rules: &ExtractionRules,
  ctx: &ScanContext,
) -> Vec<ScheduleCandidate> {
  let mut current_title = UNKNOWN_TITLE.to_string();
  let mut seen: HashSet<(String, String)> = HashSet::new();
  let mut out = Vec::new();

  for el in tree.elements() {
    if let Some(title) = rules.title_text(&el) {
      current_title = title;
    }

    // Not an `else`: an element may be both title-like and time-like.
    let Some(tm) = rules.match_time(&el) else {
      continue;
    };

    // Nested containers repeat the same time text under the same title;
    // only the first occurrence produces a record.
    if !seen.insert((current_title.clone(), tm.raw.clone())) {
      continue;
    }

    let Some(start) = start_instant(ctx.scrape_date, tm.hour, tm.minute) else {
      continue;
    };

    out.push(ScheduleCandidate {
      theater_id:       ctx.theater_id,
      movie_title:      current_title.clone(),
      start_time:       start,
      duration_minutes: DEFAULT_DURATION_MINUTES,
      booking_url:      ctx.booking_url.clone(),
    });
  }

  if out.is_empty() {
    out.push(fallback_candidate(ctx));
  }

  out
}

/// The sentinel emitted when a scan produces nothing.
pub fn fallback_candidate(ctx: &ScanContext) -> ScheduleCandidate {
  let start = start_instant(ctx.scrape_date, 12, 0).unwrap_or_else(Utc::now);
  ScheduleCandidate {
    theater_id:       ctx.theater_id,
    movie_title:      FALLBACK_TITLE.to_string(),
    start_time:       start,
    duration_minutes: DEFAULT_DURATION_MINUTES,
    booking_url:      ctx.booking_url.clone(),
  }
}

/// Combine the scrape date with an extracted hour/minute in the local zone.
/// Hours of 24 and up mean the following calendar day (a 25:15 showing is
/// 01:15 the next morning). Ambiguous local instants resolve to the
/// earliest mapping.
fn start_instant(date: NaiveDate, hour: u32, minute: u32) -> Option<DateTime<Utc>> {
  let (date, hour) = if hour >= 24 {
    (date.succ_opt()?, hour - 24)
  } else {
    (date, hour)
  };
  let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
  Local
    .from_local_datetime(&date.and_time(time))
    .earliest()
    .map(|dt| dt.with_timezone(&Utc))
}
