//! SQL schema for the Marquee SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS theaters (
    theater_id  TEXT PRIMARY KEY,
    created_at  TEXT NOT NULL,    -- RFC 3339 UTC; store-assigned
    name        TEXT NOT NULL,
    url         TEXT NOT NULL UNIQUE,
    latitude    REAL,
    longitude   REAL,
    -- both coordinates or neither; a half-geocoded row is invalid
    CHECK ((latitude IS NULL) = (longitude IS NULL))
);

-- Schedules are never updated in place. Staleness is handled by
-- time-filtering at query time; replacement happens wholesale per theater
-- inside one transaction.
CREATE TABLE IF NOT EXISTS schedules (
    schedule_id      TEXT PRIMARY KEY,
    theater_id       TEXT NOT NULL REFERENCES theaters(theater_id),
    movie_title      TEXT NOT NULL,
    start_time       TEXT NOT NULL,   -- RFC 3339 UTC; sorts lexicographically
    end_time         TEXT,
    duration_minutes INTEGER,
    booking_url      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS schedules_theater_idx ON schedules(theater_id);
CREATE INDEX IF NOT EXISTS schedules_start_idx   ON schedules(start_time);

PRAGMA user_version = 1;
";
