//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, Utc};
use marquee_core::{
  geo::GeoPoint,
  schedule::NewSchedule,
  store::{ScheduleQuery, ScheduleStore, TheaterStore},
  theater::NewTheater,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory().await.expect("in-memory store")
}

const SHINJUKU: GeoPoint = GeoPoint { lat: 35.6905, lon: 139.7005 };

fn shinjuku_theater() -> NewTheater {
  NewTheater::new("Shinjuku Cinema", "https://example.com/shinjuku/schedule/")
    .with_location(SHINJUKU)
}

fn showing(theater_id: Uuid, title: &str, hours_from_now: i64) -> NewSchedule {
  NewSchedule {
    theater_id,
    movie_title: title.to_string(),
    start_time: Utc::now() + Duration::hours(hours_from_now),
    end_time: None,
    duration_minutes: Some(120),
    booking_url: "https://example.com/shinjuku/schedule/".to_string(),
  }
}

// ─── Theaters ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_theater() {
  let s = store().await;

  let theater = s.add_theater(shinjuku_theater()).await.unwrap();
  assert_eq!(theater.name, "Shinjuku Cinema");
  assert_eq!(theater.location(), Some(SHINJUKU));

  let fetched = s.get_theater(theater.theater_id).await.unwrap().unwrap();
  assert_eq!(fetched.theater_id, theater.theater_id);
  assert_eq!(fetched.url, theater.url);
  assert_eq!(fetched.latitude, Some(SHINJUKU.lat));
  assert_eq!(fetched.longitude, Some(SHINJUKU.lon));
}

#[tokio::test]
async fn get_theater_missing_returns_none() {
  let s = store().await;
  assert!(s.get_theater(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_url_is_rejected() {
  let s = store().await;
  s.add_theater(shinjuku_theater()).await.unwrap();

  let err = s.add_theater(shinjuku_theater()).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(marquee_core::Error::UrlTaken(_))
  ));
}

#[tokio::test]
async fn partial_coordinates_are_rejected() {
  let s = store().await;

  let mut input = NewTheater::new("Half Geocoded", "https://example.com/half/");
  input.latitude = Some(35.0);

  let err = s.add_theater(input).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(marquee_core::Error::PartialCoordinates)
  ));
}

#[tokio::test]
async fn upsert_inserts_then_updates_in_place() {
  let s = store().await;

  let first = s.upsert_theater(shinjuku_theater()).await.unwrap();

  // Re-geocode with a corrected name and location: same row, new values.
  let corrected = NewTheater::new(
    "Shinjuku Cinema Annex",
    "https://example.com/shinjuku/schedule/",
  )
  .with_location(GeoPoint { lat: 35.6910, lon: 139.7010 });
  let second = s.upsert_theater(corrected).await.unwrap();

  assert_eq!(second.theater_id, first.theater_id);
  assert_eq!(second.created_at, first.created_at);
  assert_eq!(second.name, "Shinjuku Cinema Annex");
  assert_eq!(second.latitude, Some(35.6910));

  assert_eq!(s.list_theaters().await.unwrap().len(), 1);
}

#[tokio::test]
async fn upsert_without_coordinates_clears_them() {
  // A later onboarding run whose geocode found nothing overwrites with
  // nulls; the last run wins.
  let s = store().await;
  s.upsert_theater(shinjuku_theater()).await.unwrap();

  let ungeocodable =
    NewTheater::new("Shinjuku Cinema", "https://example.com/shinjuku/schedule/");
  let updated = s.upsert_theater(ungeocodable).await.unwrap();

  assert_eq!(updated.location(), None);
}

// ─── Schedule writes ─────────────────────────────────────────────────────────

#[tokio::test]
async fn add_schedule_requires_existing_theater() {
  let s = store().await;
  let err = s.add_schedule(showing(Uuid::new_v4(), "Ghost", 1)).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(marquee_core::Error::TheaterNotFound(_))
  ));
}

#[tokio::test]
async fn empty_movie_title_is_rejected() {
  let s = store().await;
  let theater = s.add_theater(shinjuku_theater()).await.unwrap();

  let err = s
    .add_schedule(showing(theater.theater_id, "   ", 1))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(marquee_core::Error::EmptyTitle)
  ));
}

#[tokio::test]
async fn replace_requires_existing_theater() {
  let s = store().await;
  let err = s
    .replace_schedules(Uuid::new_v4(), vec![showing(Uuid::new_v4(), "Ghost", 1)])
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(marquee_core::Error::TheaterNotFound(_))
  ));
}

#[tokio::test]
async fn repeated_replace_does_not_accumulate_duplicates() {
  let s = store().await;
  let theater = s.add_theater(shinjuku_theater()).await.unwrap();

  let batch = || {
    vec![
      showing(theater.theater_id, "Perfect Days", 2),
      showing(theater.theater_id, "Perfect Days", 5),
    ]
  };

  s.replace_schedules(theater.theater_id, batch()).await.unwrap();
  s.replace_schedules(theater.theater_id, batch()).await.unwrap();

  let page = s.query_schedules(&ScheduleQuery::default()).await.unwrap();
  assert_eq!(page.schedules.len(), 2);
}

#[tokio::test]
async fn replace_keeps_past_showings_as_history() {
  let s = store().await;
  let theater = s.add_theater(shinjuku_theater()).await.unwrap();

  s.add_schedule(showing(theater.theater_id, "Yesterday's Show", -26))
    .await
    .unwrap();
  s.replace_schedules(theater.theater_id, vec![showing(theater.theater_id, "Tomorrow", 20)])
    .await
    .unwrap();

  // The past row survives replacement; querying as of two days ago sees
  // both it and the new future row.
  let query = ScheduleQuery {
    as_of: Some(Utc::now() - Duration::hours(48)),
    ..ScheduleQuery::default()
  };
  let page = s.query_schedules(&query).await.unwrap();
  let titles: Vec<_> = page
    .schedules
    .iter()
    .map(|row| row.schedule.movie_title.as_str())
    .collect();
  assert_eq!(titles, ["Yesterday's Show", "Tomorrow"]);
}

// ─── Proximity query ─────────────────────────────────────────────────────────

/// Query point ~0.9 km from [`SHINJUKU`].
const NEARBY: GeoPoint = GeoPoint { lat: 35.6890, lon: 139.6910 };

#[tokio::test]
async fn nearby_future_showing_is_returned() {
  let s = store().await;
  let theater = s.add_theater(shinjuku_theater()).await.unwrap();
  s.add_schedule(showing(theater.theater_id, "Perfect Days", 1))
    .await
    .unwrap();

  let query = ScheduleQuery {
    center: Some(NEARBY),
    radius_km: 5.0,
    ..ScheduleQuery::default()
  };
  let page = s.query_schedules(&query).await.unwrap();

  assert_eq!(page.schedules.len(), 1);
  assert!(!page.has_more);
  let row = &page.schedules[0];
  assert_eq!(row.schedule.movie_title, "Perfect Days");
  assert_eq!(row.theater_name, "Shinjuku Cinema");
  assert_eq!(row.latitude, Some(SHINJUKU.lat));
  assert_eq!(row.longitude, Some(SHINJUKU.lon));
}

#[tokio::test]
async fn tiny_radius_excludes_everything() {
  let s = store().await;
  let theater = s.add_theater(shinjuku_theater()).await.unwrap();
  s.add_schedule(showing(theater.theater_id, "Perfect Days", 1))
    .await
    .unwrap();

  let query = ScheduleQuery {
    center: Some(NEARBY),
    radius_km: 0.001,
    ..ScheduleQuery::default()
  };
  let page = s.query_schedules(&query).await.unwrap();

  assert!(page.schedules.is_empty());
  assert!(!page.has_more);
}

#[tokio::test]
async fn zero_radius_still_matches_a_coincident_theater() {
  let s = store().await;
  let theater = s.add_theater(shinjuku_theater()).await.unwrap();
  s.add_schedule(showing(theater.theater_id, "Perfect Days", 1))
    .await
    .unwrap();

  let query = ScheduleQuery {
    center: Some(SHINJUKU),
    radius_km: 0.0,
    ..ScheduleQuery::default()
  };
  let page = s.query_schedules(&query).await.unwrap();
  assert_eq!(page.schedules.len(), 1);
}

#[tokio::test]
async fn theaters_without_coordinates_never_match_a_centered_query() {
  let s = store().await;
  let theater = s
    .add_theater(NewTheater::new("Unknown Location", "https://example.com/nowhere/"))
    .await
    .unwrap();
  s.add_schedule(showing(theater.theater_id, "Perfect Days", 1))
    .await
    .unwrap();

  let centered = ScheduleQuery {
    center: Some(NEARBY),
    ..ScheduleQuery::default()
  };
  assert!(s.query_schedules(&centered).await.unwrap().schedules.is_empty());

  // ...but a global query still lists their showings.
  let global = ScheduleQuery::default();
  assert_eq!(s.query_schedules(&global).await.unwrap().schedules.len(), 1);
}

#[tokio::test]
async fn past_showings_are_not_queryable() {
  let s = store().await;
  let theater = s.add_theater(shinjuku_theater()).await.unwrap();
  s.add_schedule(showing(theater.theater_id, "Already Started", -1))
    .await
    .unwrap();
  s.add_schedule(showing(theater.theater_id, "Coming Up", 1))
    .await
    .unwrap();

  let page = s.query_schedules(&ScheduleQuery::default()).await.unwrap();
  let titles: Vec<_> = page
    .schedules
    .iter()
    .map(|row| row.schedule.movie_title.as_str())
    .collect();
  assert_eq!(titles, ["Coming Up"]);
}

#[tokio::test]
async fn empty_store_yields_an_empty_page() {
  let s = store().await;
  let page = s.query_schedules(&ScheduleQuery::default()).await.unwrap();
  assert!(page.schedules.is_empty());
  assert!(!page.has_more);
}

#[tokio::test]
async fn pagination_walks_all_pages_with_exact_has_more() {
  let s = store().await;

  let first = s.add_theater(shinjuku_theater()).await.unwrap();
  let second = s
    .add_theater(
      NewTheater::new("Yoyogi Hall", "https://example.com/yoyogi/schedule/")
        .with_location(NEARBY),
    )
    .await
    .unwrap();

  s.add_schedule(showing(first.theater_id, "First", 1)).await.unwrap();
  s.add_schedule(showing(second.theater_id, "Second", 2)).await.unwrap();
  s.add_schedule(showing(first.theater_id, "Third", 3)).await.unwrap();

  let page_query = |offset: usize| ScheduleQuery {
    center: Some(NEARBY),
    radius_km: 5.0,
    offset,
    limit: 1,
    ..ScheduleQuery::default()
  };

  let page1 = s.query_schedules(&page_query(0)).await.unwrap();
  assert_eq!(page1.schedules.len(), 1);
  assert_eq!(page1.schedules[0].schedule.movie_title, "First");
  assert!(page1.has_more);

  let page2 = s.query_schedules(&page_query(1)).await.unwrap();
  assert_eq!(page2.schedules.len(), 1);
  assert_eq!(page2.schedules[0].schedule.movie_title, "Second");
  assert!(page2.has_more);

  let page3 = s.query_schedules(&page_query(2)).await.unwrap();
  assert_eq!(page3.schedules.len(), 1);
  assert_eq!(page3.schedules[0].schedule.movie_title, "Third");
  assert!(!page3.has_more);
}

#[tokio::test]
async fn limit_is_never_exceeded() {
  let s = store().await;
  let theater = s.add_theater(shinjuku_theater()).await.unwrap();
  for i in 1..=5 {
    s.add_schedule(showing(theater.theater_id, &format!("Movie {i}"), i))
      .await
      .unwrap();
  }

  let query = ScheduleQuery {
    limit: 2,
    ..ScheduleQuery::default()
  };
  let page = s.query_schedules(&query).await.unwrap();
  assert_eq!(page.schedules.len(), 2);
  assert!(page.has_more);
}

#[tokio::test]
async fn offset_past_the_end_is_an_empty_page() {
  let s = store().await;
  let theater = s.add_theater(shinjuku_theater()).await.unwrap();
  s.add_schedule(showing(theater.theater_id, "Only One", 1))
    .await
    .unwrap();

  let query = ScheduleQuery {
    offset: 10,
    ..ScheduleQuery::default()
  };
  let page = s.query_schedules(&query).await.unwrap();
  assert!(page.schedules.is_empty());
  assert!(!page.has_more);
}
