use crate::config::JobMode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Files written into one leaf directory, keyed by directory name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DirCount {
    pub dir: String,
    pub count: usize,
}

/// Which step of per-file work failed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Decode,
    Encode,
    Copy,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Decode => "decode",
            FailureKind::Encode => "encode",
            FailureKind::Copy => "copy",
        };
        f.write_str(s)
    }
}

/// A file that was skipped because its work failed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileFailure {
    /// Source file path.
    pub path: PathBuf,
    pub kind: FailureKind,
    pub message: String,
}

/// Outcome of re-counting the destination after all writes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verification {
    /// Not run (e.g. dry run).
    Skipped,
    Match { count: usize },
    /// Found a different number of matching files than were written.
    Mismatch { expected: usize, found: usize },
}

/// Summary of one job run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobReport {
    pub mode: JobMode,
    pub source_root: PathBuf,
    pub dest_root: PathBuf,
    /// Shift folded into `[0, 360)`; `None` for copy jobs.
    pub hue_shift_degrees: Option<f64>,
    /// Files successfully written.
    pub total: usize,
    /// Per leaf-directory counts in traversal order.
    pub per_dir: Vec<DirCount>,
    pub failures: Vec<FileFailure>,
    pub verification: Verification,
}

impl JobReport {
    pub(crate) fn new(
        mode: JobMode,
        source_root: PathBuf,
        dest_root: PathBuf,
        hue_shift_degrees: Option<f64>,
    ) -> Self {
        Self {
            mode,
            source_root,
            dest_root,
            hue_shift_degrees,
            total: 0,
            per_dir: Vec::new(),
            failures: Vec::new(),
            verification: Verification::Skipped,
        }
    }

    pub(crate) fn record_success(&mut self, dir: &str) {
        self.total += 1;
        match self.per_dir.iter_mut().find(|d| d.dir == dir) {
            Some(d) => d.count += 1,
            None => self.per_dir.push(DirCount {
                dir: dir.to_string(),
                count: 1,
            }),
        }
    }

    pub(crate) fn record_failure(&mut self, failure: FileFailure) {
        self.failures.push(failure);
    }

    /// Count recorded for directory name `dir` (0 if none).
    pub fn count_for(&self, dir: &str) -> usize {
        self.per_dir
            .iter()
            .find(|d| d.dir == dir)
            .map_or(0, |d| d.count)
    }

    /// Breakdown sorted by directory name, used for display.
    pub fn sorted_breakdown(&self) -> Vec<DirCount> {
        let mut v = self.per_dir.clone();
        v.sort_by(|a, b| a.dir.cmp(&b.dir));
        v
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn is_verified(&self) -> bool {
        matches!(self.verification, Verification::Match { .. })
    }
}

impl fmt::Display for JobReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.mode {
            JobMode::Tint => "recolored",
            JobMode::Copy => "copied",
        };
        writeln!(f, "Source: {}", self.source_root.display())?;
        writeln!(f, "Destination: {}", self.dest_root.display())?;
        if let Some(shift) = self.hue_shift_degrees {
            writeln!(f, "Hue shift: {shift} degrees")?;
        }
        writeln!(f)?;
        writeln!(f, "Total files {verb}: {}", self.total)?;
        writeln!(f)?;
        writeln!(f, "Detailed report:")?;
        for d in self.sorted_breakdown() {
            writeln!(f, "  - {} files {verb} to {}", d.count, d.dir)?;
        }
        if !self.failures.is_empty() {
            writeln!(f)?;
            writeln!(f, "Failures ({}):", self.failures.len())?;
            for fail in &self.failures {
                writeln!(f, "  - [{}] {}: {}", fail.kind, fail.path.display(), fail.message)?;
            }
        }
        writeln!(f)?;
        writeln!(f, "Verification:")?;
        match self.verification {
            Verification::Skipped => writeln!(f, "SKIPPED: destination was not checked"),
            Verification::Match { count } => {
                writeln!(f, "Files confirmed in destination: {count}")?;
                writeln!(f, "SUCCESS: all files {verb} correctly")
            }
            Verification::Mismatch { expected, found } => {
                writeln!(f, "Files confirmed in destination: {found}")?;
                writeln!(f, "WARNING: expected {expected} files but found {found}")
            }
        }
    }
}
