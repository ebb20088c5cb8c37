//! Remote data acquisition.

pub mod fred;

pub use fred::{FredClient, SeriesSource};
