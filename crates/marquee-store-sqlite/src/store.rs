//! [`SqliteStore`] — the SQLite implementation of [`TheaterStore`] and
//! [`ScheduleStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use marquee_core::{
  geo::haversine_km,
  schedule::{NewSchedule, Schedule},
  store::{SchedulePage, ScheduleQuery, ScheduleStore, TheaterStore},
  theater::{NewTheater, Theater},
};

use crate::{
  Error, Result,
  encode::{RawJoinedSchedule, RawSchedule, RawTheater, encode_dt, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Marquee store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted, and all
/// calls are serialized onto its dedicated thread.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fetch a theater row by canonical URL.
  async fn theater_by_url(&self, url: String) -> Result<Option<Theater>> {
    let raw: Option<RawTheater> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT theater_id, created_at, name, url, latitude, longitude
               FROM theaters WHERE url = ?1",
              rusqlite::params![url],
              theater_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTheater::into_theater).transpose()
  }

  fn validate_coordinates(input: &NewTheater) -> Result<()> {
    if input.latitude.is_some() != input.longitude.is_some() {
      return Err(Error::Core(marquee_core::Error::PartialCoordinates));
    }
    Ok(())
  }
}

/// Row mapper for `SELECT theater_id, created_at, name, url, latitude,
/// longitude`.
fn theater_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawTheater> {
  Ok(RawTheater {
    theater_id: row.get(0)?,
    created_at: row.get(1)?,
    name:       row.get(2)?,
    url:        row.get(3)?,
    latitude:   row.get(4)?,
    longitude:  row.get(5)?,
  })
}

/// Row mapper for schedule rows joined with their theater.
fn joined_schedule_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawJoinedSchedule> {
  Ok(RawJoinedSchedule {
    schedule:     RawSchedule {
      schedule_id:      row.get(0)?,
      theater_id:       row.get(1)?,
      movie_title:      row.get(2)?,
      start_time:       row.get(3)?,
      end_time:         row.get(4)?,
      duration_minutes: row.get(5)?,
      booking_url:      row.get(6)?,
    },
    theater_name: row.get(7)?,
    latitude:     row.get(8)?,
    longitude:    row.get(9)?,
  })
}

const JOINED_SELECT: &str = "SELECT s.schedule_id, s.theater_id, s.movie_title, s.start_time,
        s.end_time, s.duration_minutes, s.booking_url,
        t.name, t.latitude, t.longitude
   FROM schedules s
   JOIN theaters t ON t.theater_id = s.theater_id";

// ─── TheaterStore impl ───────────────────────────────────────────────────────

impl TheaterStore for SqliteStore {
  type Error = Error;

  async fn add_theater(&self, input: NewTheater) -> Result<Theater> {
    Self::validate_coordinates(&input)?;
    if self.theater_by_url(input.url.clone()).await?.is_some() {
      return Err(Error::Core(marquee_core::Error::UrlTaken(input.url)));
    }

    let theater = Theater {
      theater_id: Uuid::new_v4(),
      created_at: Utc::now(),
      name:       input.name,
      url:        input.url,
      latitude:   input.latitude,
      longitude:  input.longitude,
    };

    let id_str = encode_uuid(theater.theater_id);
    let at_str = encode_dt(theater.created_at);
    let row    = theater.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO theaters (theater_id, created_at, name, url, latitude, longitude)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            id_str,
            at_str,
            row.name,
            row.url,
            row.latitude,
            row.longitude,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(theater)
  }

  async fn upsert_theater(&self, input: NewTheater) -> Result<Theater> {
    Self::validate_coordinates(&input)?;

    let id_str = encode_uuid(Uuid::new_v4());
    let at_str = encode_dt(Utc::now());
    let row    = input.clone();

    let raw: RawTheater = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO theaters (theater_id, created_at, name, url, latitude, longitude)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)
           ON CONFLICT(url) DO UPDATE SET
               name      = excluded.name,
               latitude  = excluded.latitude,
               longitude = excluded.longitude",
          rusqlite::params![
            id_str,
            at_str,
            row.name,
            row.url,
            row.latitude,
            row.longitude,
          ],
        )?;
        // Re-read: on conflict the original theater_id and created_at
        // survive, so the inserted values cannot be returned as-is.
        let raw = conn.query_row(
          "SELECT theater_id, created_at, name, url, latitude, longitude
           FROM theaters WHERE url = ?1",
          rusqlite::params![row.url],
          theater_row,
        )?;
        Ok(raw)
      })
      .await?;

    raw.into_theater()
  }

  async fn get_theater(&self, id: Uuid) -> Result<Option<Theater>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawTheater> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT theater_id, created_at, name, url, latitude, longitude
               FROM theaters WHERE theater_id = ?1",
              rusqlite::params![id_str],
              theater_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTheater::into_theater).transpose()
  }

  async fn list_theaters(&self) -> Result<Vec<Theater>> {
    let raws: Vec<RawTheater> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT theater_id, created_at, name, url, latitude, longitude
           FROM theaters ORDER BY created_at ASC",
        )?;
        let rows = stmt
          .query_map([], theater_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTheater::into_theater).collect()
  }
}

// ─── ScheduleStore impl ──────────────────────────────────────────────────────

impl ScheduleStore for SqliteStore {
  type Error = Error;

  async fn add_schedule(&self, input: NewSchedule) -> Result<Schedule> {
    if input.movie_title.trim().is_empty() {
      return Err(Error::Core(marquee_core::Error::EmptyTitle));
    }
    if self.get_theater(input.theater_id).await?.is_none() {
      return Err(Error::Core(marquee_core::Error::TheaterNotFound(
        input.theater_id,
      )));
    }

    let schedule = Schedule {
      schedule_id:      Uuid::new_v4(),
      theater_id:       input.theater_id,
      movie_title:      input.movie_title,
      start_time:       input.start_time,
      end_time:         input.end_time,
      duration_minutes: input.duration_minutes,
      booking_url:      input.booking_url,
    };

    let row = schedule.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO schedules (schedule_id, theater_id, movie_title, start_time,
                                  end_time, duration_minutes, booking_url)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            encode_uuid(row.schedule_id),
            encode_uuid(row.theater_id),
            row.movie_title,
            encode_dt(row.start_time),
            row.end_time.map(encode_dt),
            row.duration_minutes.map(i64::from),
            row.booking_url,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(schedule)
  }

  async fn replace_schedules(
    &self,
    theater_id: Uuid,
    batch: Vec<NewSchedule>,
  ) -> Result<Vec<Schedule>> {
    if self.get_theater(theater_id).await?.is_none() {
      return Err(Error::Core(marquee_core::Error::TheaterNotFound(theater_id)));
    }
    if batch.iter().any(|input| input.movie_title.trim().is_empty()) {
      return Err(Error::Core(marquee_core::Error::EmptyTitle));
    }

    // Rows are stored under `theater_id` regardless of the id on each
    // input; one call replaces exactly one theater's page.
    let schedules: Vec<Schedule> = batch
      .into_iter()
      .map(|input| Schedule {
        schedule_id: Uuid::new_v4(),
        theater_id,
        movie_title: input.movie_title,
        start_time: input.start_time,
        end_time: input.end_time,
        duration_minutes: input.duration_minutes,
        booking_url: input.booking_url,
      })
      .collect();

    let theater_id_str = encode_uuid(theater_id);
    let now_str        = encode_dt(Utc::now());
    let to_insert      = schedules.clone();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        // Future rows are superseded wholesale; past rows stay as history.
        tx.execute(
          "DELETE FROM schedules WHERE theater_id = ?1 AND start_time > ?2",
          rusqlite::params![theater_id_str, now_str],
        )?;
        for s in &to_insert {
          tx.execute(
            "INSERT INTO schedules (schedule_id, theater_id, movie_title, start_time,
                                    end_time, duration_minutes, booking_url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
              encode_uuid(s.schedule_id),
              encode_uuid(s.theater_id),
              s.movie_title,
              encode_dt(s.start_time),
              s.end_time.map(encode_dt),
              s.duration_minutes.map(i64::from),
              s.booking_url,
            ],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(schedules)
  }

  async fn query_schedules(&self, query: &ScheduleQuery) -> Result<SchedulePage> {
    let as_of = query.as_of.unwrap_or_else(Utc::now);

    // Resolve the theater set up front: the distance filter is Haversine
    // over every geocoded theater. Theaters without coordinates can never
    // match a centered query.
    let target_ids: Option<Vec<String>> = match query.center {
      Some(center) => {
        let theaters = self.list_theaters().await?;
        let ids: Vec<String> = theaters
          .iter()
          .filter_map(|t| t.location().map(|loc| (t, loc)))
          .filter(|(_, loc)| haversine_km(center, *loc) <= query.radius_km)
          .map(|(t, _)| encode_uuid(t.theater_id))
          .collect();
        if ids.is_empty() {
          return Ok(SchedulePage { schedules: Vec::new(), has_more: false });
        }
        Some(ids)
      }
      None => None,
    };

    let as_of_str = encode_dt(as_of);
    // Fetch one row beyond the page; a full overhang means another page
    // exists. This is the only "has more" mechanism.
    let fetch_limit = query.limit.saturating_add(1) as i64;
    let offset      = query.offset as i64;
    let limit       = query.limit;

    let raws: Vec<RawJoinedSchedule> = self
      .conn
      .call(move |conn| {
        let (sql, params): (String, Vec<Box<dyn rusqlite::types::ToSql>>) =
          match target_ids {
            Some(ids) => {
              let placeholders = vec!["?"; ids.len()].join(", ");
              let sql = format!(
                "{JOINED_SELECT}
                  WHERE s.theater_id IN ({placeholders})
                    AND s.start_time > ?
                  ORDER BY s.start_time ASC
                  LIMIT ? OFFSET ?"
              );
              let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = ids
                .into_iter()
                .map(|id| Box::new(id) as Box<dyn rusqlite::types::ToSql>)
                .collect();
              params.push(Box::new(as_of_str));
              params.push(Box::new(fetch_limit));
              params.push(Box::new(offset));
              (sql, params)
            }
            None => {
              let sql = format!(
                "{JOINED_SELECT}
                  WHERE s.start_time > ?
                  ORDER BY s.start_time ASC
                  LIMIT ? OFFSET ?"
              );
              (sql, vec![
                Box::new(as_of_str),
                Box::new(fetch_limit),
                Box::new(offset),
              ])
            }
          };

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params_from_iter(params.iter().map(|p| p.as_ref())),
            joined_schedule_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut schedules = raws
      .into_iter()
      .map(RawJoinedSchedule::into_row)
      .collect::<Result<Vec<_>>>()?;

    let has_more = schedules.len() > limit;
    if has_more {
      schedules.truncate(limit);
    }

    Ok(SchedulePage { schedules, has_more })
  }
}
