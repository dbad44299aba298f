//! Configuration module for pdfmerger.
//!
//! This module turns CLI arguments into a validated configuration that
//! drives one run. It handles:
//! - Validation of argument combinations
//! - Parsing of reorder/remove edits
//! - Application of defaults

use anyhow::{Context, Result, bail};

use crate::MergerError;
use crate::model::Mode;
use std::{path::PathBuf, str::FromStr};

/// Compression level for output PDFs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    /// No compression - streams are written as they are.
    None,
    /// Compress uncompressed streams.
    #[default]
    Standard,
    /// Compress streams and drop empty ones.
    Maximum,
}

impl FromStr for CompressionLevel {
    type Err = MergerError;
    /// Parse compression level from string.
    ///
    /// # Arguments
    ///
    /// * `s` - String representation: "none", "standard", or "maximum"
    ///
    /// # Errors
    ///
    /// Returns an error if the string doesn't match a valid compression level.
    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "maximum" => Ok(Self::Maximum),
            _ => Err(MergerError::invalid_config(format!(
                "Invalid compression level: {s}. Must be one of: none, standard, maximum"
            ))),
        }
    }
}

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Prompt the user before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite without prompting.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}

/// One change applied to the collection before the primary action runs.
///
/// Items are named by their 1-based label, assigned in the order the inputs
/// were ingested (for the extractor, the original page number). Labels stay
/// attached to the same item however it moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    /// Drop item `source` onto the slot of item `target`.
    Move {
        /// Label of the item being moved.
        source: usize,
        /// Label of the item whose slot it takes.
        target: usize,
    },
    /// Remove an item.
    Remove(usize),
}

impl Edit {
    /// Parse a move argument of the form `SRC:DST`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdfmerger::config::Edit;
    ///
    /// let edit = Edit::parse_move("5:1").unwrap();
    /// assert_eq!(edit, Edit::Move { source: 5, target: 1 });
    /// ```
    pub fn parse_move(s: &str) -> Result<Self> {
        let Some((source, target)) = s.split_once(':') else {
            bail!("Invalid move: {s}. Expected format like '5:1'");
        };

        let source = parse_label(source)?;
        let target = parse_label(target)?;

        Ok(Self::Move { source, target })
    }

    /// Parse a removal argument (a single label).
    pub fn parse_remove(s: &str) -> Result<Self> {
        Ok(Self::Remove(parse_label(s)?))
    }

    /// Labels referenced by this edit.
    pub fn labels(&self) -> Vec<usize> {
        match self {
            Self::Move { source, target } => vec![*source, *target],
            Self::Remove(label) => vec![*label],
        }
    }
}

fn parse_label(s: &str) -> Result<usize> {
    let label: usize = s
        .trim()
        .parse()
        .with_context(|| format!("Invalid item number: {s}"))?;

    if label == 0 {
        bail!("Item numbers must be positive (1-indexed)");
    }

    Ok(label)
}

/// Complete configuration for one run.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Which collection the inputs go into.
    pub mode: Mode,

    /// Input files, in ingestion order.
    pub inputs: Vec<PathBuf>,

    /// Output file, or a directory to place the suggested file name in.
    /// Defaults to the current directory.
    pub output: Option<PathBuf>,

    /// Reorder/remove edits, applied in order.
    pub edits: Vec<Edit>,

    /// Dry run mode - build the collection and report, write nothing.
    pub dry_run: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,

    /// Compression level for output.
    pub compression: CompressionLevel,

    /// Number of files read concurrently (None = auto-detect).
    pub jobs: Option<usize>,

    /// Print a JSON report instead of text.
    pub json: bool,
}

impl Config {
    /// Returns a reference to inputs.
    pub fn inputs(&self) -> &[PathBuf] {
        self.inputs.as_ref()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No input files are specified
    /// - The extractor gets more than one input
    /// - Verbose and quiet modes are both enabled
    /// - Jobs count is zero
    /// - The output path equals an input path
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            bail!("No input files specified");
        }

        if self.mode == Mode::Extractor && self.inputs.len() != 1 {
            bail!(
                "The extractor works on exactly one PDF, got {}",
                self.inputs.len()
            );
        }

        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        if let Some(jobs) = self.jobs
            && jobs == 0
        {
            bail!("Number of jobs must be at least 1");
        }

        if let Some(ref output) = self.output {
            for input in &self.inputs {
                if input == output {
                    bail!(
                        "Output file cannot be the same as an input file: {}",
                        output.display()
                    );
                }
            }
        }

        Ok(())
    }

    /// Check that every edit label is within `1..=item_count`.
    pub fn validate_edits(&self, item_count: usize) -> crate::Result<()> {
        for edit in &self.edits {
            if let Some(label) = edit.labels().into_iter().find(|l| *l > item_count) {
                return Err(MergerError::invalid_config(format!(
                    "Item {label} does not exist (collection has {item_count} item(s))"
                )));
            }
        }
        Ok(())
    }

    /// Get the effective number of concurrent file reads.
    ///
    /// Returns the configured job count, or the number of CPU cores if auto-detect.
    pub fn effective_jobs(&self) -> usize {
        self.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    /// Check if text output should be displayed.
    pub fn should_print(&self) -> bool {
        (!self.quiet || self.dry_run) && !self.json
    }
}
