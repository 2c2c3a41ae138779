//! Error types for `marquee-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("theater not found: {0}")]
  TheaterNotFound(Uuid),

  #[error("theater URL already registered: {0}")]
  UrlTaken(String),

  #[error("movie title must not be empty")]
  EmptyTitle,

  #[error("latitude and longitude must be set together or not at all")]
  PartialCoordinates,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
