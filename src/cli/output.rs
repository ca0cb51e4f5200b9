//! Shared CLI output helpers for consistent operator-facing text.

use std::fmt::Display;
use std::io::{self, Write};

use crate::domain::StockEntry;

const RULE_WIDTH: usize = 40;

/// Print a section header and separator.
pub fn section(title: &str) {
    println!();
    println!("{title}");
    println!("{}", "─".repeat(RULE_WIDTH));
}

/// Print a simple key/value line.
pub fn key_value(label: &str, value: impl Display) {
    println!("{label:<12} {value}");
}

/// Print a successful status line.
pub fn ok(message: &str) {
    println!("✓ {message}");
}

/// Print an error status line.
pub fn error(message: &str) {
    eprintln!("✗ {message}");
}

/// Start a progress line in the format `Label... `.
pub fn progress(label: &str) {
    print!("{label}... ");
    let _ = io::stdout().flush();
}

/// Finish a progress line.
pub fn progress_done(success: bool) {
    println!("{}", if success { "ok" } else { "failed" });
}

/// One-line rendering of a stock entry.
pub fn stock_line(entry: &StockEntry) -> String {
    match entry.updated_at {
        Some(at) => format!(
            "{}: {} (updated {})",
            entry.product_id,
            entry.quantity,
            at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        None => format!("{}: {}", entry.product_id, entry.quantity),
    }
}
