//! `lagplot` library crate.
//!
//! The binary (`lagplot`) is a thin wrapper around this library so that:
//!
//! - the fetch/align/render pipeline is testable without spawning processes
//! - integration tests can swap the FRED client for an in-memory source
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod chart;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod plot;
pub mod report;
pub mod store;
pub mod transform;
