//! CLI argument parsing for pdfmerger.
//!
//! Three subcommands share one set of output flags: `merge` and `extract`
//! run once and exit, `shell` keeps a session open on stdin.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

use pdfmerger::config::{CompressionLevel, Config, Edit, OverwriteMode};
use pdfmerger::error::{MergerError, Result};
use pdfmerger::model::Mode;
use pdfmerger::utils::collect_paths_for_patterns;

/// Merge PDFs and images into one document, or split a PDF into pages.
#[derive(Parser, Debug)]
#[command(name = "pdfmerger")]
#[command(version)]
#[command(about = "Merge PDFs and images, or split and reorder the pages of a PDF", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Merge PDFs and JPEG/PNG images, in order, into one PDF
    ///
    /// Examples:
    ///   pdfmerger merge a.pdf scan.png -o out.pdf
    ///   pdfmerger merge 'chapters/*.pdf' --move 3:1
    Merge(MergeArgs),

    /// Split a PDF into pages, reorder or drop them, and save the result
    ///
    /// Example:
    ///   pdfmerger extract report.pdf --move 5:1 --remove 3
    Extract(ExtractArgs),

    /// Start an interactive session reading commands from stdin
    Shell(ShellArgs),
}

/// Arguments of `merge`.
#[derive(Args, Debug, Clone)]
pub struct MergeArgs {
    /// Input PDFs and images, merged in the order given
    ///
    /// Glob patterns are expanded; matches of one pattern are sorted.
    #[arg(required = true, value_name = "FILES")]
    pub inputs: Vec<String>,

    #[command(flatten)]
    pub edits: EditArgs,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Arguments of `extract`.
#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    /// The PDF to split
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    #[command(flatten)]
    pub edits: EditArgs,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Arguments of `shell`.
#[derive(Args, Debug, Clone)]
pub struct ShellArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

/// Reorder and removal flags.
///
/// Items are named by their 1-based position after ingestion. Moves are
/// applied first, in order, then removals.
#[derive(Args, Debug, Clone, Default)]
pub struct EditArgs {
    /// Move item SRC into the slot of item DST (repeatable)
    #[arg(long = "move", value_name = "SRC:DST")]
    pub moves: Vec<String>,

    /// Remove item N (repeatable)
    #[arg(long = "remove", value_name = "N")]
    pub removes: Vec<String>,
}

/// Flags shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Output file, or a directory for the default file name
    ///
    /// Defaults to merged-document.pdf or extracted-<name> in the current
    /// directory.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Dry run - build the result and report it without writing
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Verbose output - list the collection and show timings
    #[arg(short, long)]
    pub verbose: bool,

    /// Overwrite an existing output file without asking
    #[arg(short, long)]
    pub force: bool,

    /// Never overwrite an existing output file
    #[arg(long, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Compression level for the output PDF
    ///
    /// - none: streams are written as they are
    /// - standard: compress uncompressed streams (default)
    /// - maximum: also drop empty streams
    #[arg(short, long, value_name = "LEVEL", default_value = "standard")]
    #[arg(value_parser = ["none", "standard", "maximum"])]
    pub compression: String,

    /// Number of files read concurrently
    ///
    /// Default is number of CPU cores.
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Print a JSON report instead of text
    #[arg(long)]
    pub json: bool,
}

impl Default for CommonArgs {
    fn default() -> Self {
        Self {
            output: None,
            dry_run: false,
            verbose: false,
            force: false,
            no_clobber: false,
            quiet: false,
            compression: "standard".to_string(),
            jobs: None,
            json: false,
        }
    }
}

impl CommonArgs {
    fn overwrite_mode(&self) -> OverwriteMode {
        if self.force {
            OverwriteMode::Force
        } else if self.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Prompt
        }
    }

    /// Config skeleton without inputs or edits.
    fn base_config(&self, mode: Mode) -> Result<Config> {
        Ok(Config {
            mode,
            output: self.output.clone(),
            dry_run: self.dry_run,
            verbose: self.verbose,
            quiet: self.quiet,
            overwrite_mode: self.overwrite_mode(),
            compression: CompressionLevel::from_str(&self.compression)?,
            jobs: self.jobs,
            json: self.json,
            ..Config::default()
        })
    }
}

impl EditArgs {
    /// Parse the flags into edits, moves first.
    pub fn to_edits(&self) -> Result<Vec<Edit>> {
        let moves = self.moves.iter().map(|s| Edit::parse_move(s));
        let removes = self.removes.iter().map(|s| Edit::parse_remove(s));

        moves
            .chain(removes)
            .map(|edit| edit.map_err(|e| MergerError::invalid_config(e.to_string())))
            .collect()
    }
}

impl Command {
    /// Convert the arguments into a validated config.
    ///
    /// Glob patterns among the merge inputs are expanded here. For `shell`
    /// the config carries no inputs and is not validated against them.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An edit flag does not parse
    /// - A glob pattern is invalid or matches nothing
    /// - Configuration validation fails
    pub fn to_config(&self) -> Result<Config> {
        let config = match self {
            Command::Merge(args) => Config {
                inputs: collect_paths_for_patterns(&args.inputs)?,
                edits: args.edits.to_edits()?,
                ..args.common.base_config(Mode::Merger)?
            },
            Command::Extract(args) => Config {
                inputs: vec![args.input.clone()],
                edits: args.edits.to_edits()?,
                ..args.common.base_config(Mode::Extractor)?
            },
            Command::Shell(args) => return args.common.base_config(Mode::Merger),
        };

        config.validate().map_err(|e| {
            MergerError::invalid_config(format!("Configuration validation failed: {e}"))
        })?;

        Ok(config)
    }
}
