//! Centralized error handling for m3u-probe
//!
//! Errors are split by the layer that produces them:
//!
//! - **Source Errors**: acquiring the raw playlist text (HTTP or local file)
//! - **Probe Errors**: a single channel's reachability check
//! - **Application Errors**: configuration, validation, playback and everything
//!   that wraps the two above
//!
//! Most of these never escape the pipeline. A failed acquisition is turned into a
//! fallback channel by the loader and a failed probe only removes the channel from
//! the current run. They are still typed so the places that recover from them can
//! log something meaningful.
//!
//! # Usage
//!
//! ```rust
//! use m3u_probe::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Err(AppError::validation("no playlist source given"))
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for playlist acquisition Results
pub type SourceResult<T> = Result<T, SourceError>;

/// Convenience type alias for reachability check Results
pub type ProbeResult<T> = Result<T, ProbeError>;
