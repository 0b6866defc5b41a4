//! Configuration management for liveprobe.
//!
//! `ProbeConfig` describes one run; `Settings` persists defaults in an
//! XDG-compliant location.

mod probe;
mod settings;

pub use probe::{ProbeConfig, BACKOFF_STEP};
pub use settings::{Paths, Settings};
