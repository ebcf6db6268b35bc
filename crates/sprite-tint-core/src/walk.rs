use crate::error::{Result, SpriteTintError};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// The one raster extension jobs process (matched case-insensitively).
pub const RASTER_EXTENSION: &str = "png";

/// One record of a source tree walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Path relative to the walk root; empty for the root itself.
    pub relative_path: PathBuf,
    pub is_dir: bool,
    /// 0 for the root, 1 for its direct children, and so on.
    pub depth: usize,
}

/// Lazy depth-first walk over a directory tree.
///
/// Entries come out sorted by file name within each directory, so the order
/// is stable across runs. The root itself is the first entry. The walk is
/// finite and cannot be restarted; create a new `TreeWalk` to walk again.
pub struct TreeWalk {
    root: PathBuf,
    inner: walkdir::IntoIter,
}

impl TreeWalk {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let inner = WalkDir::new(&root).sort_by_file_name().into_iter();
        Self { root, inner }
    }
}

impl Iterator for TreeWalk {
    type Item = Result<DirectoryEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = match self.inner.next()? {
            Ok(e) => e,
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| self.root.clone());
                return Some(Err(SpriteTintError::Walk { path, source: e }));
            }
        };
        let relative_path = entry
            .path()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Some(Ok(DirectoryEntry {
            relative_path,
            is_dir: entry.file_type().is_dir(),
            depth: entry.depth(),
        }))
    }
}

/// Decides which files a job processes and counts.
#[derive(Debug, Clone, Default)]
pub struct FileMatcher {
    all_files: bool,
    exclude: Option<GlobSet>,
}

impl FileMatcher {
    /// Matches `.png` files (any case) not excluded by `exclude`.
    pub fn raster(exclude: &[String]) -> Result<Self> {
        Ok(Self {
            all_files: false,
            exclude: build_exclude_set(exclude)?,
        })
    }

    /// Matches every file not excluded by `exclude`.
    pub fn any_file(exclude: &[String]) -> Result<Self> {
        Ok(Self {
            all_files: true,
            exclude: build_exclude_set(exclude)?,
        })
    }

    /// `relative` is a file path relative to the walk root.
    pub fn matches(&self, relative: &Path) -> bool {
        if let Some(ex) = &self.exclude {
            let s = relative.to_string_lossy().replace('\\', "/");
            if ex.is_match(&s) {
                return false;
            }
        }
        self.all_files || is_raster(relative)
    }
}

/// True if the file name ends in `.png`, any case.
pub fn is_raster(p: &Path) -> bool {
    p.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(RASTER_EXTENSION))
}

/// Counts files under `root` accepted by `matcher`.
pub fn count_matching(root: &Path, matcher: &FileMatcher) -> Result<usize> {
    let mut n = 0;
    for entry in TreeWalk::new(root) {
        let entry = entry?;
        if !entry.is_dir && matcher.matches(&entry.relative_path) {
            n += 1;
        }
    }
    Ok(n)
}

pub(crate) fn build_exclude_set(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut b = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat)
            .map_err(|e| SpriteTintError::Config(format!("invalid exclude pattern {pat:?}: {e}")))?;
        b.add(glob);
    }
    let set = b
        .build()
        .map_err(|e| SpriteTintError::Config(format!("invalid exclude patterns: {e}")))?;
    Ok(Some(set))
}
