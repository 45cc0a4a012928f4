//! Grade command - grade a batch of answer sheets against a key.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use omr_adapters::{load_answer_key, FsSheetSource};
use omr_core::{BatchReport, BatchRunner, GradingContext, OmrConfig, ReportOutput, SheetSource};
use tracing::{debug, info, warn};

use super::ExitCode;
use crate::config::AppConfig;
use crate::output::{CsvOutput, JsonOutput, ProgressBar};

/// File name of the JSON report inside `--output`.
pub const REPORT_FILE: &str = "report.json";
/// File name of the CSV table inside `--output`.
pub const RESULTS_FILE: &str = "results.csv";

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Full batch report as a JSON document
    #[default]
    Json,
    /// One row per sheet
    Csv,
}

/// Parse and validate a fraction strictly between 0 and 1.
fn parse_fraction(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(format!("{value} is not strictly between 0.0 and 1.0"))
    }
}

/// Parse a worker count (at least 1).
fn parse_workers(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("worker count must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("'{s}' is not a valid worker count")),
    }
}

/// Shared arguments for grading.
#[derive(Args, Clone, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct GradeArgs {
    /// Answer-sheet images or directories to grade
    pub paths: Vec<PathBuf>,

    /// Answer key JSON file
    #[arg(short = 'k', long, value_name = "FILE")]
    pub answer_key: Option<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Worker threads (default: one per core)
    #[arg(short = 'j', long, value_parser = parse_workers)]
    pub workers: Option<usize>,

    /// Fill ratio above which a bubble counts as marked (0.0-1.0)
    #[arg(long, value_parser = parse_fraction)]
    pub mark_threshold: Option<f64>,

    /// Vertical distance in pixels that still counts as the same question row
    #[arg(long)]
    pub row_tolerance: Option<u32>,

    /// Minimum number of questions a sheet must show
    #[arg(long)]
    pub min_questions: Option<usize>,

    /// Minimum number of options per question
    #[arg(long)]
    pub min_options: Option<usize>,

    /// Apply the answer key's question weights to the score
    #[arg(long)]
    pub weighted: bool,

    /// Output format for stdout
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output (only affects --format json)
    #[arg(long)]
    pub pretty: bool,

    /// Also write report.json and results.csv into this directory
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress and summary output
    #[arg(short, long)]
    pub quiet: bool,

    /// Merged config (populated by `with_config`, not from CLI).
    #[arg(skip)]
    config: Option<AppConfig>,
}

impl GradeArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (`OmrConfig::default()` and accessor methods)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        if !args.recursive {
            args.recursive = config.general.recursive.unwrap_or(false);
        }
        args.workers = args.workers.or(config.general.workers);

        // Pipeline overrides: CLI > config
        args.mark_threshold = args.mark_threshold.or(config.marks.threshold);
        args.row_tolerance = args.row_tolerance.or(config.grid.row_tolerance);
        args.min_questions = args.min_questions.or(config.grid.min_questions);
        args.min_options = args.min_options.or(config.grid.min_options);
        if !args.weighted {
            args.weighted = config.scoring.weighted.unwrap_or(false);
        }

        // Output format: CLI > config (accessor provides fallback)
        if args.format.is_none() {
            args.format = config
                .output
                .format
                .as_ref()
                .and_then(|s| match s.as_str() {
                    "json" => Some(OutputFormat::Json),
                    "csv" => Some(OutputFormat::Csv),
                    _ => None,
                });
        }

        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        if !args.progress {
            args.progress = config.output.progress.unwrap_or(false);
        }
        if args.output.is_none() {
            args.output.clone_from(&config.output.dir);
        }

        // Store config for pipeline_config to read the remaining settings
        args.config = Some(config.clone());

        args
    }

    /// Get output format with fallback to JSON.
    fn format(&self) -> OutputFormat {
        self.format.unwrap_or_default()
    }

    /// Pipeline configuration: defaults, then config files, then CLI flags.
    pub fn pipeline_config(&self) -> OmrConfig {
        let base = self
            .config
            .as_ref()
            .map_or_else(OmrConfig::default, AppConfig::pipeline_config);

        OmrConfig {
            mark_threshold: self.mark_threshold.unwrap_or(base.mark_threshold),
            row_tolerance: self.row_tolerance.unwrap_or(base.row_tolerance),
            min_questions: self.min_questions.unwrap_or(base.min_questions),
            min_options: self.min_options.unwrap_or(base.min_options),
            weighted_scoring: self.weighted || base.weighted_scoring,
            ..base
        }
    }
}

/// Result of running the grade command.
#[allow(dead_code)] // Fields exposed for programmatic use
pub struct GradeResult {
    /// Sheets graded without errors.
    pub processed: usize,
    /// Sheets that recorded a processing error.
    pub failed: usize,
    /// Exit code.
    pub exit_code: ExitCode,
}

/// Run the grade command.
///
/// Expects `args` to have been processed through `with_config()` first
/// to apply configuration file settings.
pub fn run(args: &GradeArgs) -> Result<GradeResult> {
    info!("Running grade command on {} paths", args.paths.len());

    if args.paths.is_empty() {
        anyhow::bail!("No paths specified");
    }
    let Some(key_path) = args.answer_key.as_deref() else {
        anyhow::bail!("No answer key specified. Pass one with --answer-key <FILE>.");
    };

    // The key is batch-fatal: nothing is graded without it
    let key = load_answer_key(key_path)?;
    let ctx = GradingContext::new(args.pipeline_config(), key)
        .context("Invalid grading configuration")?;
    debug!(config = ?ctx.config(), "grading configuration");

    let source = FsSheetSource::new(args.paths.clone(), args.recursive);
    let total = source.sheet_names().len();
    if total == 0 {
        warn!("No answer sheets found");
        return Ok(GradeResult {
            processed: 0,
            failed: 0,
            exit_code: ExitCode::Success,
        });
    }

    let show_progress = !args.quiet && (args.progress || std::io::stderr().is_terminal());
    let progress_bar = ProgressBar::new(total as u64, args.quiet, show_progress);

    let mut runner = BatchRunner::new();
    if let Some(workers) = args.workers {
        runner = runner.with_workers(workers);
    }
    let outcome = runner.run(&source, &ctx, &progress_bar)?;
    let report = outcome.report()?;

    emit_stdout(&report, args)?;
    if let Some(dir) = &args.output {
        write_files(&report, dir)?;
    }
    if !args.quiet {
        print_summary(&report);
    }

    let exit_code = if outcome.failed() > 0 {
        ExitCode::SheetErrors
    } else {
        ExitCode::Success
    };

    Ok(GradeResult {
        processed: outcome.processed(),
        failed: outcome.failed(),
        exit_code,
    })
}

/// Writes the report to stdout in the selected format.
fn emit_stdout(report: &BatchReport, args: &GradeArgs) -> Result<()> {
    let output: Box<dyn ReportOutput> = match args.format() {
        OutputFormat::Json => Box::new(JsonOutput::stdout(args.pretty)),
        OutputFormat::Csv => Box::new(CsvOutput::stdout()),
    };
    emit(report, output.as_ref())
}

/// Writes and flushes one report sink.
fn emit(report: &BatchReport, output: &dyn ReportOutput) -> Result<()> {
    output.write(report)?;
    output.flush()
}

/// Persists `report.json` and `results.csv` under `dir`.
fn write_files(report: &BatchReport, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let report_path = dir.join(REPORT_FILE);
    let json = JsonOutput::create(&report_path)
        .with_context(|| format!("Failed to create {}", report_path.display()))?;
    emit(report, &json)?;

    let results_path = dir.join(RESULTS_FILE);
    let csv = CsvOutput::create(&results_path)
        .with_context(|| format!("Failed to create {}", results_path.display()))?;
    emit(report, &csv)?;

    info!("Wrote {} and {}", report_path.display(), results_path.display());
    Ok(())
}

/// Prints the headline statistics to stderr.
fn print_summary(report: &BatchReport) {
    let summary = &report.summary;
    eprintln!(
        "Graded {} sheet(s): average score {:.2}, success rate {:.2}%",
        summary.total_sheets_processed, summary.average_score, summary.success_rate
    );
    let bands: Vec<String> = report
        .score_distribution
        .buckets()
        .iter()
        .map(|(label, count)| format!("{label}: {count}"))
        .collect();
    eprintln!("Score distribution: {}", bands.join(", "));
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fraction() {
        assert_eq!(parse_fraction("0.4"), Ok(0.4));
        assert!(parse_fraction("0").is_err());
        assert!(parse_fraction("1.0").is_err());
        assert!(parse_fraction("abc").is_err());
    }

    #[test]
    fn test_emit_writes_then_flushes() {
        use omr_core::AnswerSheetResult;
        use omr_core::ReportAggregator;
        use omr_test_support::MockReportOutput;

        let report = ReportAggregator::aggregate(&[AnswerSheetResult::failed(4, "unreadable")])
            .unwrap();
        let output = MockReportOutput::new();
        emit(&report, &output).unwrap();

        let written = output.reports();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].summary.processing_errors, 1);
        assert_eq!(output.flush_count(), 1);
    }

    #[test]
    fn test_parse_workers() {
        assert_eq!(parse_workers("4"), Ok(4));
        assert!(parse_workers("0").is_err());
        assert!(parse_workers("-1").is_err());
    }

    #[test]
    fn test_cli_beats_config() {
        let config: AppConfig = toml::from_str(
            r"
[marks]
threshold = 0.4

[grid]
row_tolerance = 8
min_questions = 5

[output]
format = 'csv'
",
        )
        .unwrap();
        let cli = GradeArgs {
            mark_threshold: Some(0.6),
            ..GradeArgs::default()
        };

        let args = GradeArgs::with_config(cli, &config);
        let pipeline = args.pipeline_config();

        assert_eq!(pipeline.mark_threshold, 0.6);
        assert_eq!(pipeline.row_tolerance, 8);
        assert_eq!(pipeline.min_questions, 5);
        assert_eq!(args.format(), OutputFormat::Csv);
    }

    #[test]
    fn test_defaults_without_config() {
        let args = GradeArgs::default();
        assert_eq!(args.pipeline_config(), OmrConfig::default());
        assert_eq!(args.format(), OutputFormat::Json);
    }

    #[test]
    fn test_weighted_flag_from_either_layer() {
        let config: AppConfig = toml::from_str("[scoring]\nweighted = true\n").unwrap();
        let args = GradeArgs::with_config(GradeArgs::default(), &config);
        assert!(args.pipeline_config().weighted_scoring);

        let cli = GradeArgs {
            weighted: true,
            ..GradeArgs::default()
        };
        assert!(cli.pipeline_config().weighted_scoring);
    }
}
