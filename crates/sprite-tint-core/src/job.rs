use crate::config::{JobConfig, JobMode, Rounding};
use crate::error::{Result, SpriteTintError};
use crate::hue::apply_hue_shift_with;
use crate::report::{FailureKind, FileFailure, JobReport, Verification};
use crate::walk::{FileMatcher, TreeWalk, count_matching};
use image::{ImageFormat, ImageReader, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Per-file work a job applies to every matching source file.
///
/// Implementations must not touch shared state: the job may call `process`
/// from several threads at once.
pub trait FileAction: Sync {
    fn mode(&self) -> JobMode;
    /// Reads `src` and writes `dst`. The parent of `dst` already exists.
    fn process(&self, src: &Path, dst: &Path) -> Result<()>;
}

/// Decode PNG, rotate hue, encode PNG.
#[derive(Debug, Clone, Copy)]
pub struct TintAction {
    pub shift_degrees: f64,
    pub rounding: Rounding,
}

impl TintAction {
    pub fn from_config(cfg: &JobConfig) -> Self {
        Self {
            shift_degrees: cfg.hue_shift_degrees,
            rounding: cfg.rounding,
        }
    }
}

impl FileAction for TintAction {
    fn mode(&self) -> JobMode {
        JobMode::Tint
    }

    fn process(&self, src: &Path, dst: &Path) -> Result<()> {
        let rgba = load_png(src)?;
        let out = apply_hue_shift_with(&rgba, self.shift_degrees, self.rounding);
        out.save_with_format(dst, ImageFormat::Png)
            .map_err(|source| SpriteTintError::Encode {
                path: dst.to_path_buf(),
                source,
            })
    }
}

/// Byte-for-byte copy that also carries over file times.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyAction;

impl FileAction for CopyAction {
    fn mode(&self) -> JobMode {
        JobMode::Copy
    }

    fn process(&self, src: &Path, dst: &Path) -> Result<()> {
        fs::copy(src, dst).map_err(|source| SpriteTintError::Copy {
            path: dst.to_path_buf(),
            source,
        })?;
        if let Err(e) = copy_file_times(src, dst) {
            debug!(?dst, error = %e, "could not preserve timestamps");
        }
        Ok(())
    }
}

/// Receives progress callbacks while files are processed.
pub trait Progress: Sync {
    fn start(&self, _files: usize) {}
    fn file_done(&self, _relative: &Path) {}
    fn finish(&self) {}
}

/// Progress sink that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {}

/// One source file scheduled for processing.
#[derive(Debug, Clone)]
pub struct FileTask {
    pub source: PathBuf,
    pub dest: PathBuf,
    /// Path relative to the source root.
    pub relative: PathBuf,
    /// Name of the directory the file sits in (report key).
    pub dir_name: String,
}

/// Everything a job will touch, computed from one walk of the source tree.
#[derive(Debug, Clone, Default)]
pub struct JobPlan {
    /// Source directories relative to the root, root (empty path) first.
    pub directories: Vec<PathBuf>,
    pub tasks: Vec<FileTask>,
    /// Files seen but not matched.
    pub skipped: usize,
}

/// Walks the source tree once and lists directories to mirror and files to process.
/// Performs no writes.
pub fn plan_job(cfg: &JobConfig, matcher: &FileMatcher) -> Result<JobPlan> {
    let root_name = root_dir_name(&cfg.source_root);
    let mut plan = JobPlan::default();
    for entry in TreeWalk::new(&cfg.source_root) {
        let entry = entry?;
        if entry.is_dir {
            plan.directories.push(entry.relative_path);
            continue;
        }
        if !matcher.matches(&entry.relative_path) {
            debug!(path = ?entry.relative_path, "skip non-matching file");
            plan.skipped += 1;
            continue;
        }
        let dir_name = match entry.relative_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| root_name.clone()),
            _ => root_name.clone(),
        };
        plan.tasks.push(FileTask {
            source: cfg.source_root.join(&entry.relative_path),
            dest: cfg.dest_root.join(&entry.relative_path),
            relative: entry.relative_path,
            dir_name,
        });
    }
    Ok(plan)
}

/// The matcher a job of `mode` uses for processing and verification.
pub fn matcher_for(cfg: &JobConfig, mode: JobMode) -> Result<FileMatcher> {
    match mode {
        JobMode::Copy if cfg.all_files => FileMatcher::any_file(&cfg.exclude),
        _ => FileMatcher::raster(&cfg.exclude),
    }
}

#[instrument(skip_all)]
/// Recolors every PNG under `cfg.source_root` into a mirrored tree at `cfg.dest_root`.
pub fn run_tint(cfg: &JobConfig) -> Result<JobReport> {
    run_job(cfg, &TintAction::from_config(cfg), &NoProgress)
}

#[instrument(skip_all)]
/// Mirrors `cfg.source_root` into `cfg.dest_root`, copying matching files unchanged.
pub fn run_copy(cfg: &JobConfig) -> Result<JobReport> {
    run_job(cfg, &CopyAction, &NoProgress)
}

#[instrument(skip_all, fields(mode = ?action.mode()))]
/// Runs `action` over the source tree and returns the report.
///
/// Notes:
/// - Fails only on setup errors (invalid config, unreadable source tree, directory creation).
/// - Every source directory is created under `dest_root` before any file is written.
/// - Per-file failures are logged and recorded in the report; the job carries on.
/// - The destination is re-counted after all writes; a mismatch is reported, not raised.
pub fn run_job<A: FileAction>(
    cfg: &JobConfig,
    action: &A,
    progress: &dyn Progress,
) -> Result<JobReport> {
    cfg.validate()?;
    let mode = action.mode();
    let matcher = matcher_for(cfg, mode)?;

    let plan = plan_job(cfg, &matcher)?;
    info!(
        directories = plan.directories.len(),
        files = plan.tasks.len(),
        skipped = plan.skipped,
        "planned job"
    );

    create_directories(&cfg.dest_root, &plan.directories)?;

    progress.start(plan.tasks.len());
    let results = execute(&plan.tasks, action, cfg.parallel, progress);
    progress.finish();

    let shift = match mode {
        JobMode::Tint => Some(cfg.normalized_shift()),
        JobMode::Copy => None,
    };
    let mut report = JobReport::new(mode, cfg.source_root.clone(), cfg.dest_root.clone(), shift);
    for (task, res) in plan.tasks.iter().zip(results) {
        match res {
            Ok(()) => {
                debug!(dest = ?task.dest, "wrote file");
                report.record_success(&task.dir_name);
            }
            Err(e) => {
                error!(path = ?task.source, error = %e, "skip file");
                report.record_failure(FileFailure {
                    path: task.source.clone(),
                    kind: failure_kind(&e),
                    message: e.to_string(),
                });
            }
        }
    }
    info!(
        total = report.total,
        failed = report.failures.len(),
        "processed files"
    );

    report.verification = verify_destination(&cfg.dest_root, &matcher, report.total)?;
    Ok(report)
}

/// Re-counts matching files under `dest_root` and compares with `expected`.
pub fn verify_destination(
    dest_root: &Path,
    matcher: &FileMatcher,
    expected: usize,
) -> Result<Verification> {
    let found = count_matching(dest_root, matcher)?;
    if found == expected {
        info!(count = found, "verification passed");
        Ok(Verification::Match { count: found })
    } else {
        warn!(expected, found, "verification mismatch");
        Ok(Verification::Mismatch { expected, found })
    }
}

/// Shape and count comparison of two trees.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TreeComparison {
    pub source_count: usize,
    pub dest_count: usize,
    /// Source directories (relative) with no counterpart in the destination.
    pub missing_dirs: Vec<PathBuf>,
}

impl TreeComparison {
    pub fn is_mirror(&self) -> bool {
        self.source_count == self.dest_count && self.missing_dirs.is_empty()
    }
}

/// Compares matching-file counts and directory shape of `source` and `dest`.
pub fn compare_trees(source: &Path, dest: &Path, matcher: &FileMatcher) -> Result<TreeComparison> {
    let mut source_count = 0;
    let mut missing_dirs = Vec::new();
    for entry in TreeWalk::new(source) {
        let entry = entry?;
        if entry.is_dir {
            if !dest.join(&entry.relative_path).is_dir() {
                missing_dirs.push(entry.relative_path);
            }
        } else if matcher.matches(&entry.relative_path) {
            source_count += 1;
        }
    }
    let dest_count = if dest.is_dir() {
        count_matching(dest, matcher)?
    } else {
        0
    };
    Ok(TreeComparison {
        source_count,
        dest_count,
        missing_dirs,
    })
}

fn create_directories(dest_root: &Path, dirs: &[PathBuf]) -> Result<()> {
    fs::create_dir_all(dest_root)?;
    for rel in dirs {
        fs::create_dir_all(dest_root.join(rel))?;
    }
    Ok(())
}

fn execute<A: FileAction>(
    tasks: &[FileTask],
    action: &A,
    parallel: bool,
    progress: &dyn Progress,
) -> Vec<Result<()>> {
    let run = |t: &FileTask| {
        let r = action.process(&t.source, &t.dest);
        progress.file_done(&t.relative);
        r
    };

    #[cfg(feature = "parallel")]
    {
        if parallel {
            return tasks.par_iter().map(run).collect();
        }
    }
    #[cfg(not(feature = "parallel"))]
    {
        if parallel {
            warn!("parallel requested but feature \"parallel\" is off; running sequentially");
        }
    }

    tasks.iter().map(run).collect()
}

fn load_png(p: &Path) -> Result<RgbaImage> {
    let decode_err = |source| SpriteTintError::Decode {
        path: p.to_path_buf(),
        source,
    };
    let mut reader = ImageReader::open(p).map_err(|e| decode_err(image::ImageError::IoError(e)))?;
    reader.set_format(ImageFormat::Png);
    let img = reader.decode().map_err(decode_err)?;
    Ok(img.to_rgba8())
}

fn copy_file_times(src: &Path, dst: &Path) -> std::io::Result<()> {
    let meta = fs::metadata(src)?;
    let mut times = fs::FileTimes::new().set_modified(meta.modified()?);
    if let Ok(accessed) = meta.accessed() {
        times = times.set_accessed(accessed);
    }
    fs::File::options().write(true).open(dst)?.set_times(times)
}

fn failure_kind(e: &SpriteTintError) -> FailureKind {
    match e {
        SpriteTintError::Decode { .. } => FailureKind::Decode,
        SpriteTintError::Copy { .. } => FailureKind::Copy,
        _ => FailureKind::Encode,
    }
}

fn root_dir_name(root: &Path) -> String {
    root.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .or_else(|| {
            root.canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|s| s.to_string_lossy().into_owned()))
        })
        .unwrap_or_else(|| ".".to_string())
}
