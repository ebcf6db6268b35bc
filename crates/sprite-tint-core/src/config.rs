use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Quantization rule used when scaling recolored channels back to `0..=255`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Rounding {
    /// Round half away from zero (exact for round-trips, default).
    #[default]
    Nearest,
    /// Integer cast toward zero; may land one unit below `Nearest`.
    Truncate,
}

impl FromStr for Rounding {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" | "round" => Ok(Self::Nearest),
            "truncate" | "trunc" => Ok(Self::Truncate),
            _ => Err(()),
        }
    }
}

/// What a job does with each matching file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobMode {
    /// Decode, rotate hue, encode as PNG.
    Tint,
    /// Copy bytes and timestamps unchanged.
    Copy,
}

impl FromStr for JobMode {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tint" => Ok(Self::Tint),
            "copy" => Ok(Self::Copy),
            _ => Err(()),
        }
    }
}

/// Parameters of one tint or copy run.
///
/// Both roots are required and have no default. Use [`JobConfig::builder`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Root of the tree to read. Must exist and be a directory.
    pub source_root: PathBuf,
    /// Root of the mirrored tree. Created when missing.
    pub dest_root: PathBuf,
    /// Hue rotation in degrees; any finite value, taken modulo 360.
    #[serde(default)]
    pub hue_shift_degrees: f64,
    #[serde(default)]
    pub rounding: Rounding,
    /// Glob patterns matched against `/`-separated paths relative to `source_root`.
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Copy job only: copy and count every file, not only PNGs.
    #[serde(default)]
    pub all_files: bool,
    /// Process files on the rayon pool when feature "parallel" is on.
    #[serde(default)]
    pub parallel: bool,
}

impl JobConfig {
    /// Create a fluent builder; both roots are mandatory.
    pub fn builder(source_root: impl Into<PathBuf>, dest_root: impl Into<PathBuf>) -> JobConfigBuilder {
        JobConfigBuilder::new(source_root, dest_root)
    }

    /// Validates the configuration before any filesystem writes.
    ///
    /// Returns an error if:
    /// - the source root is missing, unreadable or not a directory
    /// - the destination exists as a file, equals the source, or lies inside it
/// - the source lies inside the destination
    /// - the hue shift is NaN or infinite
    /// - an exclude pattern is not a valid glob
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::SpriteTintError;

        if !self.hue_shift_degrees.is_finite() {
            return Err(SpriteTintError::Config(format!(
                "hue shift must be a finite number of degrees, got {}",
                self.hue_shift_degrees
            )));
        }

        let meta = std::fs::metadata(&self.source_root).map_err(|e| {
            SpriteTintError::Config(format!(
                "source root {} is not accessible: {}",
                self.source_root.display(),
                e
            ))
        })?;
        if !meta.is_dir() {
            return Err(SpriteTintError::Config(format!(
                "source root {} is not a directory",
                self.source_root.display()
            )));
        }
        std::fs::read_dir(&self.source_root).map_err(|e| {
            SpriteTintError::Config(format!(
                "source root {} is not readable: {}",
                self.source_root.display(),
                e
            ))
        })?;

        if self.dest_root.is_file() {
            return Err(SpriteTintError::Config(format!(
                "destination root {} is a file",
                self.dest_root.display()
            )));
        }
        if is_within(&self.dest_root, &self.source_root) {
            return Err(SpriteTintError::Config(format!(
                "destination root {} must not be inside source root {}",
                self.dest_root.display(),
                self.source_root.display()
            )));
        }
        if is_within(&self.source_root, &self.dest_root) {
            return Err(SpriteTintError::Config(format!(
                "source root {} must not be inside destination root {}",
                self.source_root.display(),
                self.dest_root.display()
            )));
        }

        crate::walk::build_exclude_set(&self.exclude)?;
        Ok(())
    }

    /// Hue shift folded into `[0, 360)`.
    pub fn normalized_shift(&self) -> f64 {
        self.hue_shift_degrees.rem_euclid(360.0)
    }
}

/// True if `path` equals `root` or lies below it. Compares canonical forms
/// when available so `./a/../b` style inputs are handled.
fn is_within(path: &Path, root: &Path) -> bool {
    let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    let path = match path.canonicalize() {
        Ok(p) => p,
        // dest may not exist yet: canonicalize the deepest existing ancestor
        Err(_) => {
            let mut cursor = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
            let mut tail = Vec::new();
            loop {
                if let Ok(c) = cursor.canonicalize() {
                    let mut full = c;
                    for part in tail.iter().rev() {
                        full.push(part);
                    }
                    break full;
                }
                let name = cursor.file_name().map(|s| s.to_os_string());
                let parent = cursor.parent().map(Path::to_path_buf);
                match (name, parent) {
                    (Some(name), Some(parent)) => {
                        tail.push(name);
                        cursor = parent;
                    }
                    _ => break path.to_path_buf(),
                }
            }
        }
    };
    path.starts_with(&root)
}

/// Builder for `JobConfig` for ergonomic construction.
#[derive(Debug, Clone)]
pub struct JobConfigBuilder {
    cfg: JobConfig,
}

impl JobConfigBuilder {
    pub fn new(source_root: impl Into<PathBuf>, dest_root: impl Into<PathBuf>) -> Self {
        Self {
            cfg: JobConfig {
                source_root: source_root.into(),
                dest_root: dest_root.into(),
                hue_shift_degrees: 0.0,
                rounding: Rounding::default(),
                exclude: Vec::new(),
                all_files: false,
                parallel: false,
            },
        }
    }
    pub fn hue_shift(mut self, degrees: f64) -> Self {
        self.cfg.hue_shift_degrees = degrees;
        self
    }
    pub fn rounding(mut self, v: Rounding) -> Self {
        self.cfg.rounding = v;
        self
    }
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.cfg.exclude.push(pattern.into());
        self
    }
    pub fn all_files(mut self, v: bool) -> Self {
        self.cfg.all_files = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn build(self) -> JobConfig {
        self.cfg
    }
}
