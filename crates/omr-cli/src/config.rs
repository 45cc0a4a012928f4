//! Configuration file support for the OMR grader.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/omr/config.toml` (lowest priority)
//! - Project-local: `.omr.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)

use std::path::{Path, PathBuf};

use omr_core::OmrConfig;
use serde::Deserialize;
use tracing::{debug, info};

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General options.
    pub general: GeneralConfig,
    /// Image normalization settings.
    pub preprocess: PreprocessConfig,
    /// Grid discovery settings.
    pub grid: GridConfig,
    /// Mark classification settings.
    pub marks: MarksConfig,
    /// Scoring settings.
    pub scoring: ScoringConfig,
    /// Output formatting settings.
    pub output: OutputConfig,
}

/// General configuration options.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Recurse into subdirectories by default.
    pub recursive: Option<bool>,
    /// Worker threads for batch grading.
    pub workers: Option<usize>,
}

/// Image normalization configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Smoothing kernel side in pixels (odd).
    pub blur_kernel_size: Option<u32>,
    /// Local threshold neighbourhood side in pixels (odd, >= 3).
    pub threshold_block_size: Option<u32>,
    /// Bias subtracted from the local mean.
    pub threshold_c: Option<f32>,
}

/// Grid discovery configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Smallest bubble area in px².
    pub min_contour_area: Option<f64>,
    /// Largest bubble area in px².
    pub max_bubble_area: Option<f64>,
    /// Minimum questions per sheet.
    pub min_questions: Option<usize>,
    /// Minimum options per question.
    pub min_options: Option<usize>,
    /// Row clustering tolerance in pixels.
    pub row_tolerance: Option<u32>,
}

/// Mark classification configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct MarksConfig {
    /// Fill ratio above which a bubble is marked (0.0-1.0, exclusive).
    pub threshold: Option<f64>,
}

/// Scoring configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Partial-credit flag (recorded, not applied).
    pub partial_credit: Option<bool>,
    /// Apply answer-key question weights.
    pub weighted: Option<bool>,
}

/// Output formatting configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "json" or "csv".
    pub format: Option<String>,
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
    /// Show progress bar.
    pub progress: Option<bool>,
    /// Directory for `report.json` and `results.csv`.
    pub dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/omr/config.toml`
    /// 2. Project-local: `.omr.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Invalid values are logged as warnings.
    pub fn load() -> Self {
        let mut config = Self::default();

        // Load XDG config (lowest priority)
        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        // Load project-local config (higher priority, merged)
        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        if let Err(e) = config.validate() {
            eprintln!("warning: {e}");
        }

        config
    }

    /// Validate configuration values are within acceptable ranges.
    ///
    /// Only checks values that can be judged in isolation; the assembled
    /// pipeline configuration is validated again before grading.
    fn validate(&self) -> Result<(), String> {
        if let Some(t) = self.marks.threshold {
            if t.is_nan() || t <= 0.0 || t >= 1.0 {
                return Err(format!("marks.threshold must be between 0.0 and 1.0, got {t}"));
            }
        }
        for (field, value) in [
            ("preprocess.blur_kernel_size", self.preprocess.blur_kernel_size),
            (
                "preprocess.threshold_block_size",
                self.preprocess.threshold_block_size,
            ),
        ] {
            if let Some(v) = value {
                if v % 2 == 0 {
                    return Err(format!("{field} must be odd, got {v}"));
                }
            }
        }
        if let (Some(min), Some(max)) = (self.grid.min_contour_area, self.grid.max_bubble_area) {
            if min > max {
                return Err(format!(
                    "grid.min_contour_area ({min}) exceeds grid.max_bubble_area ({max})"
                ));
            }
        }
        if self.general.workers == Some(0) {
            return Err("general.workers must be at least 1".to_string());
        }

        if let Some(ref f) = self.output.format {
            if f != "json" && f != "csv" {
                return Err(format!("output.format must be 'json' or 'csv', got '{f}'"));
            }
        }

        Ok(())
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        // General
        self.general.recursive = other.general.recursive.or(self.general.recursive);
        self.general.workers = other.general.workers.or(self.general.workers);

        // Preprocess
        self.preprocess.blur_kernel_size = other
            .preprocess
            .blur_kernel_size
            .or(self.preprocess.blur_kernel_size);
        self.preprocess.threshold_block_size = other
            .preprocess
            .threshold_block_size
            .or(self.preprocess.threshold_block_size);
        self.preprocess.threshold_c = other.preprocess.threshold_c.or(self.preprocess.threshold_c);

        // Grid
        self.grid.min_contour_area = other.grid.min_contour_area.or(self.grid.min_contour_area);
        self.grid.max_bubble_area = other.grid.max_bubble_area.or(self.grid.max_bubble_area);
        self.grid.min_questions = other.grid.min_questions.or(self.grid.min_questions);
        self.grid.min_options = other.grid.min_options.or(self.grid.min_options);
        self.grid.row_tolerance = other.grid.row_tolerance.or(self.grid.row_tolerance);

        // Marks
        self.marks.threshold = other.marks.threshold.or(self.marks.threshold);

        // Scoring
        self.scoring.partial_credit = other
            .scoring
            .partial_credit
            .or(self.scoring.partial_credit);
        self.scoring.weighted = other.scoring.weighted.or(self.scoring.weighted);

        // Output
        self.output.format = other.output.format.or_else(|| self.output.format.take());
        self.output.pretty = other.output.pretty.or(self.output.pretty);
        self.output.progress = other.output.progress.or(self.output.progress);
        self.output.dir = other.output.dir.or_else(|| self.output.dir.take());
    }

    /// Pipeline configuration with file values applied over the defaults.
    ///
    /// Settings that also have CLI flags are applied by the command.
    pub fn pipeline_config(&self) -> OmrConfig {
        let defaults = OmrConfig::default();
        OmrConfig {
            blur_kernel_size: self
                .preprocess
                .blur_kernel_size
                .unwrap_or(defaults.blur_kernel_size),
            threshold_block_size: self
                .preprocess
                .threshold_block_size
                .unwrap_or(defaults.threshold_block_size),
            threshold_c: self.preprocess.threshold_c.unwrap_or(defaults.threshold_c),
            min_contour_area: self
                .grid
                .min_contour_area
                .unwrap_or(defaults.min_contour_area),
            max_bubble_area: self
                .grid
                .max_bubble_area
                .unwrap_or(defaults.max_bubble_area),
            min_questions: self.grid.min_questions.unwrap_or(defaults.min_questions),
            min_options: self.grid.min_options.unwrap_or(defaults.min_options),
            row_tolerance: self.grid.row_tolerance.unwrap_or(defaults.row_tolerance),
            mark_threshold: self.marks.threshold.unwrap_or(defaults.mark_threshold),
            partial_credit: self
                .scoring
                .partial_credit
                .unwrap_or(defaults.partial_credit),
            weighted_scoring: self.scoring.weighted.unwrap_or(defaults.weighted_scoring),
        }
    }
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("omr").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.omr.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let config_path = dir.join(".omr.toml");
        if config_path.exists() {
            return Some(config_path);
        }
        current = dir.parent();
    }

    None
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}
