//! CLI command definitions and handlers.

pub mod grade;
pub mod key;

use clap::{Parser, Subcommand};

/// OMR - Grade scanned multiple-choice answer sheets
#[derive(Parser)]
#[command(name = "omr")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Shared grade arguments (paths, answer key, overrides, output).
    #[command(flatten)]
    pub grade: grade::GradeArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Grade answer sheets against an answer key
    Grade(grade::GradeArgs),
    /// Validate an answer key and print its summary
    Key(key::KeyArgs),
}

/// Process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Every sheet was graded.
    Success = 0,
    /// The batch ran but at least one sheet failed to process.
    SheetErrors = 1,
    /// The batch could not run (bad arguments, answer key, configuration, I/O).
    Error = 2,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}
