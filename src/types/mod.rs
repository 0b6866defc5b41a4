//! Core type definitions using newtype patterns for type safety.
//!
//! These types keep invalid targets and status windows out of the pipeline
//! by validating at construction.

mod run_id;
mod status_range;
mod target;

pub use run_id::RunId;
pub use status_range::{StatusRange, StatusRangeError};
pub use target::{has_explicit_scheme, is_skippable_line, Target, TargetError, SCHEMES};
