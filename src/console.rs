//! User-facing console output
//!
//! Prompts, conflict listings and the run summary go to stdout so they can
//! be read (and answered) by scripts. Diagnostics go through `log`.

use crate::model::RunSummary;

pub fn header(text: &str) {
    println!("\n--- {} ---", text);
}

pub fn info(message: &str) {
    println!(">> {}", message);
}

pub fn success(message: &str) {
    println!("✔  {}", message);
}

pub fn warning(message: &str) {
    println!("⚠  {}", message);
}

pub fn error(message: &str) {
    println!("✖  {}", message);
}

pub fn item(index: impl std::fmt::Display, text: &str) {
    println!("  {}. {}", index, text);
}

/// Print the final counters and the completion marker
pub fn print_summary(summary: &RunSummary) {
    header("Summary");
    success(&format!("New downloads: {}", summary.new));
    info(&format!("Overwritten: {}", summary.overwritten));
    info(&format!("Renamed: {}", summary.renamed));
    warning(&format!("Skipped: {}", summary.skipped));
    error(&format!("Errors: {}", summary.errors));
    println!("\nWork complete.");
}
