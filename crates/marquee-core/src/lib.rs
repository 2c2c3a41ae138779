//! Core types and trait definitions for the Marquee showtime store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod error;
pub mod geo;
pub mod schedule;
pub mod store;
pub mod theater;

pub use error::{Error, Result};
