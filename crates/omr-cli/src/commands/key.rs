//! Key command - validate an answer key document.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use omr_adapters::load_answer_key;

/// Arguments for the key command.
#[derive(Args, Clone)]
pub struct KeyArgs {
    /// Answer key JSON file
    pub path: PathBuf,
}

/// Run the key command.
pub fn run(args: &KeyArgs) -> Result<()> {
    let key = load_answer_key(&args.path)?;

    println!("{}: {} question(s)", args.path.display(), key.len());
    println!("Answers: {}", key.answers().iter().collect::<String>());

    if let Some(weights) = key.weights() {
        println!("Weights: total {}", weights.iter().sum::<f64>());
    }

    if let Some(exam) = key.exam_info() {
        if let Some(title) = &exam.title {
            println!("Title: {title}");
        }
        if let Some(date) = &exam.date {
            println!("Date: {date}");
        }
        if let Some(options) = exam.options_per_question {
            println!("Options per question: {options}");
        }
    }

    Ok(())
}
