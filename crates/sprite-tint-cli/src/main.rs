use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use sprite_tint_core::{
    CopyAction, FileAction, JobConfig, JobMode, JobReport, NoProgress, Progress, Rounding,
    TintAction, compare_trees, matcher_for, plan_job, run_job,
};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "sprite-tint",
    about = "Recolor or mirror whole sprite folders",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rotate the hue of every PNG in a tree into a mirrored tree
    Tint(TintArgs),
    /// Mirror a tree, copying files unchanged (timestamps kept)
    Copy(CopyArgs),
    /// Run several tint variants of one source tree, one after another
    Batch(BatchArgs),
    /// Compare file counts and directory shape of two trees
    Verify(VerifyArgs),
}

#[derive(Args, Debug, Clone)]
struct TreeArgs {
    /// Source root directory
    #[arg(help_heading = "Input/Output")]
    source: PathBuf,
    /// Destination root directory (created when missing)
    #[arg(help_heading = "Input/Output")]
    dest: PathBuf,
    /// Exclude patterns (glob, relative to source). Matching files are ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct OutputArgs {
    /// Write the text report to this file
    #[arg(long, help_heading = "Export")]
    log_file: Option<PathBuf>,
    /// Write the report as JSON to this file
    #[arg(long, help_heading = "Export")]
    report_json: Option<PathBuf>,
    /// Print the merged configuration and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: walk the source and list the work, but write nothing
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
    /// Process files in parallel (requires core feature `parallel`)
    #[arg(long, default_value_t = false, help_heading = "Performance")]
    parallel: bool,
}

#[derive(Parser, Debug, Clone)]
struct TintArgs {
    #[command(flatten)]
    tree: TreeArgs,
    /// Hue shift in degrees (negative values allowed, taken modulo 360)
    #[arg(long, allow_hyphen_values = true, help_heading = "Color")]
    shift: f64,
    /// Channel rounding: nearest | truncate
    #[arg(long, value_parser = ["nearest", "truncate"], default_value = "nearest", help_heading = "Color")]
    rounding: String,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Parser, Debug, Clone)]
struct CopyArgs {
    #[command(flatten)]
    tree: TreeArgs,
    /// Copy every file, not only PNGs
    #[arg(long, default_value_t = false, help_heading = "Input/Output")]
    all_files: bool,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Parser, Debug, Clone)]
struct BatchArgs {
    /// YAML file listing the source tree and its variants
    #[arg(long)]
    config: PathBuf,
    /// Process files in parallel (requires core feature `parallel`)
    #[arg(long, default_value_t = false)]
    parallel: bool,
}

#[derive(Parser, Debug, Clone)]
struct VerifyArgs {
    #[command(flatten)]
    tree: TreeArgs,
    /// Count every file, not only PNGs
    #[arg(long, default_value_t = false)]
    all_files: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    let show_progress = cli.progress && !cli.quiet;
    match &cli.command {
        Commands::Tint(args) => run_tint_cmd(args, show_progress, cli.quiet),
        Commands::Copy(args) => run_copy_cmd(args, show_progress, cli.quiet),
        Commands::Batch(args) => run_batch(args, show_progress, cli.quiet),
        Commands::Verify(args) => run_verify(args),
    }
}

fn run_tint_cmd(args: &TintArgs, show_progress: bool, quiet: bool) -> anyhow::Result<()> {
    let cfg = JobConfig {
        source_root: args.tree.source.clone(),
        dest_root: args.tree.dest.clone(),
        hue_shift_degrees: args.shift,
        rounding: parse_rounding(&args.rounding)?,
        exclude: args.tree.exclude.clone(),
        all_files: false,
        parallel: args.output.parallel,
    };
    run_with_output(&cfg, &TintAction::from_config(&cfg), &args.output, show_progress, quiet)
}

fn run_copy_cmd(args: &CopyArgs, show_progress: bool, quiet: bool) -> anyhow::Result<()> {
    let cfg = JobConfig {
        source_root: args.tree.source.clone(),
        dest_root: args.tree.dest.clone(),
        hue_shift_degrees: 0.0,
        rounding: Rounding::default(),
        exclude: args.tree.exclude.clone(),
        all_files: args.all_files,
        parallel: args.output.parallel,
    };
    run_with_output(&cfg, &CopyAction, &args.output, show_progress, quiet)
}

fn run_with_output<A: FileAction>(
    cfg: &JobConfig,
    action: &A,
    output: &OutputArgs,
    show_progress: bool,
    quiet: bool,
) -> anyhow::Result<()> {
    if output.print_config {
        match output.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(cfg)?),
        }
        return Ok(());
    }

    if output.dry_run {
        return dry_run(cfg, action.mode());
    }

    let report = execute_job(cfg, action, show_progress)?;
    emit_report(&report, output.log_file.as_deref(), output.report_json.as_deref(), quiet)?;
    finish_status(&[&report])
}

fn execute_job<A: FileAction>(
    cfg: &JobConfig,
    action: &A,
    show_progress: bool,
) -> anyhow::Result<JobReport> {
    let start = Instant::now();
    let result = if show_progress {
        run_job(cfg, action, &BarProgress::new())
    } else {
        run_job(cfg, action, &NoProgress)
    };
    let report = result.with_context(|| {
        format!(
            "{:?} job {} -> {}",
            action.mode(),
            cfg.source_root.display(),
            cfg.dest_root.display()
        )
    })?;
    info!(
        total = report.total,
        failed = report.failures.len(),
        elapsed = format!("{:.1}ms", start.elapsed().as_secs_f64() * 1000.0),
        "job finished"
    );
    Ok(report)
}

fn dry_run(cfg: &JobConfig, mode: JobMode) -> anyhow::Result<()> {
    cfg.validate()?;
    let matcher = matcher_for(cfg, mode)?;
    let plan = plan_job(cfg, &matcher)?;
    for task in &plan.tasks {
        println!("{} -> {}", task.source.display(), task.dest.display());
    }
    println!(
        "{} directories, {} files to process, {} skipped",
        plan.directories.len(),
        plan.tasks.len(),
        plan.skipped
    );
    Ok(())
}

fn emit_report(
    report: &JobReport,
    log_file: Option<&Path>,
    report_json: Option<&Path>,
    quiet: bool,
) -> anyhow::Result<()> {
    if !quiet {
        println!("{report}");
    }
    if let Some(path) = log_file {
        fs::write(path, report.to_string()).with_context(|| format!("write {}", path.display()))?;
        info!(?path, "log written");
    }
    if let Some(path) = report_json {
        let json = serde_json::to_string_pretty(report)?;
        fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
        info!(?path, "report written");
    }
    Ok(())
}

/// Non-zero exit when any file failed; verification mismatches only warn.
fn finish_status(reports: &[&JobReport]) -> anyhow::Result<()> {
    let failed: usize = reports.iter().map(|r| r.failures.len()).sum();
    if failed > 0 {
        anyhow::bail!("{} file(s) failed", failed);
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct BatchConfig {
    source: PathBuf,
    #[serde(default)]
    rounding: Option<String>,
    #[serde(default)]
    exclude: Vec<String>,
    #[serde(default)]
    parallel: Option<bool>,
    variants: Vec<BatchVariant>,
}

#[derive(Debug, Deserialize)]
struct BatchVariant {
    name: String,
    dest: PathBuf,
    shift: f64,
    #[serde(default)]
    log_file: Option<PathBuf>,
    #[serde(default)]
    report_json: Option<PathBuf>,
}

impl BatchConfig {
    fn job_config(&self, variant: &BatchVariant, cli_parallel: bool) -> anyhow::Result<JobConfig> {
        let rounding = match &self.rounding {
            Some(s) => parse_rounding(s)?,
            None => Rounding::default(),
        };
        Ok(JobConfig {
            source_root: self.source.clone(),
            dest_root: variant.dest.clone(),
            hue_shift_degrees: variant.shift,
            rounding,
            exclude: self.exclude.clone(),
            all_files: false,
            parallel: self.parallel.unwrap_or(cli_parallel),
        })
    }
}

fn run_batch(args: &BatchArgs, show_progress: bool, quiet: bool) -> anyhow::Result<()> {
    let file = fs::read_to_string(&args.config)
        .with_context(|| format!("read {}", args.config.display()))?;
    let batch: BatchConfig = serde_yaml::from_str(&file)
        .with_context(|| format!("parse {}", args.config.display()))?;
    if batch.variants.is_empty() {
        anyhow::bail!("{} lists no variants", args.config.display());
    }

    // Validate every variant before the first one writes anything
    let mut jobs = Vec::with_capacity(batch.variants.len());
    for v in &batch.variants {
        let cfg = batch.job_config(v, args.parallel)?;
        cfg.validate()
            .with_context(|| format!("variant {}", v.name))?;
        jobs.push((v, cfg));
    }

    let mut reports = Vec::with_capacity(jobs.len());
    for (v, cfg) in &jobs {
        info!(variant = %v.name, shift = cfg.hue_shift_degrees, "processing variant");
        let report = execute_job(cfg, &TintAction::from_config(cfg), show_progress)?;
        if !quiet {
            println!("== {} ==", v.name);
        }
        emit_report(&report, v.log_file.as_deref(), v.report_json.as_deref(), quiet)?;
        reports.push(report);
    }
    let refs: Vec<&JobReport> = reports.iter().collect();
    finish_status(&refs)
}

fn run_verify(args: &VerifyArgs) -> anyhow::Result<()> {
    let cfg = JobConfig {
        source_root: args.tree.source.clone(),
        dest_root: args.tree.dest.clone(),
        hue_shift_degrees: 0.0,
        rounding: Rounding::default(),
        exclude: args.tree.exclude.clone(),
        all_files: args.all_files,
        parallel: false,
    };
    let matcher = matcher_for(&cfg, JobMode::Copy)?;
    let cmp = compare_trees(&cfg.source_root, &cfg.dest_root, &matcher)?;
    println!("Files in source: {}", cmp.source_count);
    println!("Files in destination: {}", cmp.dest_count);
    for dir in &cmp.missing_dirs {
        println!("Missing directory: {}", dir.display());
    }
    if cmp.is_mirror() {
        println!("SUCCESS: destination mirrors source");
        Ok(())
    } else {
        warn!(
            source = cmp.source_count,
            dest = cmp.dest_count,
            missing_dirs = cmp.missing_dirs.len(),
            "trees differ"
        );
        anyhow::bail!(
            "expected {} files but found {} ({} missing directories)",
            cmp.source_count,
            cmp.dest_count,
            cmp.missing_dirs.len()
        )
    }
}

/// Progress bar driven by job callbacks.
struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::with_template(
            "{spinner:.green} processing {pos}/{len} [{elapsed_precise}] {wide_msg}",
        ) {
            bar.set_style(style);
        }
        Self { bar }
    }
}

impl Progress for BarProgress {
    fn start(&self, files: usize) {
        self.bar.set_length(files as u64);
    }
    fn file_done(&self, relative: &Path) {
        self.bar.set_message(relative.to_string_lossy().into_owned());
        self.bar.inc(1);
    }
    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

fn parse_rounding(s: &str) -> anyhow::Result<Rounding> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown rounding: {}", s))
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}
