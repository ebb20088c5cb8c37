//! Output helpers for aligned pairs.
//!
//! - CSV export (`export`)
//! - JSON export/read-back (`pair`)

pub mod export;
pub mod pair;

pub use export::*;
pub use pair::*;
