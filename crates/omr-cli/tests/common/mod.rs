//! Shared fixtures for CLI integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::new_without_default, deprecated)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use omr_test_support::SyntheticSheetBuilder;
use tempfile::TempDir;

/// Ten-question key matching `SyntheticSheetBuilder::standard()`.
pub const KEY: &str = "ABCDABCDAB";

/// Project config tuned for synthetic sheets.
pub const SHEET_CONFIG: &str = r"
[preprocess]
threshold_block_size = 61
threshold_c = 30.0

[marks]
threshold = 0.5
";

/// A scratch project: `key.json`, `.omr.toml`, and a `sheets/` directory.
pub struct Project {
    pub dir: TempDir,
}

impl Project {
    /// Creates a project with the standard key and sheet-tuned config.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sheets")).unwrap();
        fs::create_dir(dir.path().join("xdg")).unwrap();
        let project = Self { dir };
        project.write_key(&json_key(KEY));
        project.write_config(SHEET_CONFIG);
        project
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn sheets(&self) -> PathBuf {
        self.root().join("sheets")
    }

    pub fn key(&self) -> PathBuf {
        self.root().join("key.json")
    }

    pub fn write_key(&self, json: &str) {
        fs::write(self.key(), json).unwrap();
    }

    pub fn write_config(&self, toml: &str) {
        fs::write(self.root().join(".omr.toml"), toml).unwrap();
    }

    /// Writes `~/.config/omr/config.toml` for the isolated home.
    pub fn write_xdg_config(&self, toml: &str) {
        let dir = self.root().join("xdg").join("omr");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("config.toml"), toml).unwrap();
    }

    /// Renders a sheet answered with `letters` into `sheets/<name>`.
    pub fn add_sheet(&self, name: &str, letters: &str) -> PathBuf {
        let path = self.sheets().join(name);
        SyntheticSheetBuilder::standard()
            .answers(letters)
            .save(&path)
            .unwrap();
        path
    }

    /// Writes an image with no bubbles into `sheets/<name>`.
    pub fn add_blank_page(&self, name: &str) -> PathBuf {
        let path = self.sheets().join(name);
        image::GrayImage::from_pixel(300, 660, image::Luma([255]))
            .save(&path)
            .unwrap();
        path
    }

    /// `omr` running inside the project with an isolated config home.
    pub fn omr(&self) -> Command {
        let mut cmd = Command::cargo_bin("omr").unwrap();
        cmd.current_dir(self.root())
            .env("HOME", self.root())
            .env("XDG_CONFIG_HOME", self.root().join("xdg"))
            .env_remove("RUST_LOG");
        cmd
    }

    /// `omr --answer-key key.json --quiet sheets/`.
    pub fn grade(&self) -> Command {
        let mut cmd = self.omr();
        cmd.arg("--answer-key")
            .arg(self.key())
            .arg("--quiet")
            .arg(self.sheets());
        cmd
    }
}

/// JSON key document for one letter per question.
pub fn json_key(letters: &str) -> String {
    let answers: Vec<String> = letters.chars().map(|c| format!("\"{c}\"")).collect();
    format!("{{\"answers\": [{}]}}", answers.join(", "))
}
