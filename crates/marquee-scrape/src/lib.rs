//! Page fetching, geocoding, and the sequential scrape and onboarding
//! pipelines.
//!
//! Everything here talks to third-party servers, so pacing is a first-class
//! concern: the scrape runner sleeps between page fetches and the
//! onboarding loop paces its geocoding calls.

pub mod error;
pub mod fetch;
pub mod geocode;
pub mod onboard;
pub mod run;

pub use error::{FetchError, GeocodeError};
pub use fetch::PageFetcher;
pub use geocode::Geocoder;
