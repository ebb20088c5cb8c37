//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - series identity and data (`SeriesId`, `Series`)
//! - shift/resample settings (`Offset`, `OffsetUnit`, `Granularity`, `AlignConfig`)
//! - per-invocation chart settings (`ChartConfig`)

pub mod types;

pub use types::*;
