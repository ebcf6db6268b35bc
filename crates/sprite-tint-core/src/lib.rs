//! Core library for recoloring trees of sprite images.
//!
//! - Filter: `apply_hue_shift` rotates the HSV hue of every visible pixel, alpha untouched
//! - Walk: `TreeWalk` yields a stable, lazy sequence of directory entries
//! - Jobs: `run_tint` / `run_copy` mirror a source tree into a destination and return a `JobReport`
//! - Report is serde-serializable and renders as a plain-text log via `Display`.
//!
//! Quick example:
//! ```ignore
//! use sprite_tint_core::{JobConfig, run_tint};
//! # fn main() -> anyhow::Result<()> {
//! let cfg = JobConfig::builder("sprites/player", "sprites/speedster")
//!     .hue_shift(-90.0)
//!     .build();
//! let report = run_tint(&cfg)?;
//! println!("{report}");
//! # Ok(()) }
//! ```

pub mod config;
pub mod error;
pub mod hue;
pub mod job;
pub mod report;
pub mod walk;

pub use config::*;
pub use error::*;
pub use hue::*;
pub use job::*;
pub use report::*;
pub use walk::*;

/// Convenience prelude for common types and functions.
/// Importing `sprite_tint_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{JobConfig, JobConfigBuilder, JobMode, Rounding};
    pub use crate::hue::{apply_hue_shift, apply_hue_shift_with};
    pub use crate::job::{CopyAction, FileAction, NoProgress, Progress, TintAction};
    pub use crate::report::{JobReport, Verification};
    pub use crate::walk::{DirectoryEntry, FileMatcher, TreeWalk};
    pub use crate::{run_copy, run_job, run_tint};
}
