//! Filesystem adapter for locating and decoding answer-sheet scans.

use anyhow::{Context, Result};
use omr_core::{OmrError, SheetImage, SheetSource};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Supported image extensions.
const SHEET_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tif", "tiff", "webp"];

/// Filesystem sheet source adapter.
///
/// Sheet names are file paths. Directory listings are sorted so a batch
/// always grades sheets in the same order.
pub struct FsSheetSource {
    paths: Vec<PathBuf>,
    recursive: bool,
}

impl FsSheetSource {
    /// Creates a new filesystem sheet source.
    ///
    /// # Arguments
    ///
    /// * `paths` - Files or directories to scan
    /// * `recursive` - Whether to recurse into subdirectories
    #[must_use]
    pub const fn new(paths: Vec<PathBuf>, recursive: bool) -> Self {
        Self { paths, recursive }
    }

    /// Collects all sheet files from the configured paths.
    fn collect_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for path in &self.paths {
            if path.is_file() {
                if is_supported_sheet(path) {
                    files.push(path.clone());
                } else {
                    warn!("Unsupported file type: {}", path.display());
                }
            } else if path.is_dir() {
                self.collect_from_dir(path, &mut files);
            } else {
                warn!("Path does not exist: {}", path.display());
            }
        }

        files
    }

    fn collect_from_dir(&self, dir: &Path, files: &mut Vec<PathBuf>) {
        let entries = match std::fs::read_dir(dir) {
            Ok(e) => e,
            Err(e) => {
                warn!("Failed to read directory {}: {e}", dir.display());
                return;
            }
        };

        let mut paths: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
        paths.sort();

        for path in paths {
            if path.is_file() && is_supported_sheet(&path) {
                files.push(path);
            } else if path.is_dir() && self.recursive {
                self.collect_from_dir(&path, files);
            }
        }
    }
}

impl SheetSource for FsSheetSource {
    fn sheet_names(&self) -> Vec<String> {
        let files = self.collect_files();
        debug!("Found {} sheet files", files.len());

        files
            .into_iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect()
    }

    fn load(&self, name: &str) -> Result<SheetImage, OmrError> {
        load_sheet(Path::new(name)).map_err(|e| OmrError::InvalidImage(format!("{e:#}")))
    }
}

/// Checks if a path has a supported sheet extension.
fn is_supported_sheet(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .is_some_and(|e| SHEET_EXTENSIONS.contains(&e.as_str()))
}

/// Decodes a sheet image from the filesystem.
fn load_sheet(path: &Path) -> Result<SheetImage> {
    let image =
        image::open(path).with_context(|| format!("Failed to open image: {}", path.display()))?;
    let sheet = SheetImage::new(path.to_string_lossy(), image);
    debug!(
        sheet = %sheet.name,
        width = sheet.width,
        height = sheet.height,
        "decoded sheet"
    );
    Ok(sheet)
}
