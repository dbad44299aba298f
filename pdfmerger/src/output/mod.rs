//! User-facing output for the command line.
//!
//! This module handles:
//! - Leveled status messages with quiet and verbose modes
//! - Progress indicators driven by session operations
//! - Collection listings and read/write summaries
//!
//! # Examples
//!
//! ```no_run
//! use pdfmerger::config::Config;
//! use pdfmerger::output::OutputFormatter;
//!
//! # fn example(config: Config) {
//! let formatter = OutputFormatter::from_config(&config);
//! formatter.info("Reading inputs");
//! formatter.success("Merge completed");
//! # }
//! ```

pub mod formatter;
pub mod progress;

pub use formatter::{MessageLevel, OutputFormatter};
pub use progress::{ProgressBar, ProgressStyle, TerminalProgress};

use crate::assembly::OutputFile;
use crate::io::{ReadStatistics, WriteStatistics};
use crate::model::Mode;
use crate::session::ItemSummary;
use crate::utils::format_file_size;

/// One listing line for `item`.
///
/// Documents show their page count, extracted pages their original page
/// number.
pub fn format_item(item: &ItemSummary) -> String {
    let pages = match (item.page_count, item.page_number) {
        (Some(1), _) => "1 page".to_string(),
        (Some(count), _) => format!("{count} pages"),
        (None, Some(number)) => format!("page {number}"),
        (None, None) => String::new(),
    };
    let preview = if item.preview { "" } else { ", no preview" };

    format!(
        "{:>3}. {} [{}] ({}, {}{})",
        item.position,
        item.name,
        item.id,
        format_file_size(item.size),
        pages,
        preview
    )
}

/// Print the current collection.
pub fn display_listing(formatter: &OutputFormatter, mode: Mode, items: &[ItemSummary]) {
    if !formatter.should_print() {
        return;
    }

    if items.is_empty() {
        formatter.info(&format!("The {mode} collection is empty"));
        return;
    }

    formatter.section(&format!("{} item(s) ({mode} mode):", items.len()));
    for item in items {
        println!("{}", format_item(item));
    }
}

/// Display read statistics to the user.
pub fn display_read_statistics(formatter: &OutputFormatter, stats: &ReadStatistics) {
    formatter.info(&format!(
        "Read {} file(s) in {:.2}s: {}",
        stats.file_count,
        stats.total_time.as_secs_f64(),
        stats.format_total_size()
    ));
}

/// Describe an assembled file that has not been written.
pub fn describe_output(output: &OutputFile) -> String {
    format!(
        "{}: {} page(s), {}",
        output.filename,
        output.page_count,
        format_file_size(output.size())
    )
}

/// Display where an output went.
pub fn display_write_statistics(formatter: &OutputFormatter, stats: &WriteStatistics) {
    formatter.success(&format!(
        "Saved {} ({})",
        stats.output_path.display(),
        stats.format_file_size()
    ));
    formatter.detail("Media type", &stats.media_type);
    formatter.detail(
        "Write time",
        &format!("{:.2}s", stats.write_time.as_secs_f64()),
    );
}
