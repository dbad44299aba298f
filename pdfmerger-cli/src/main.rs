//! pdfmerger - Merge PDFs and images, or split and reorder a PDF.

mod cli;
mod shell;

use clap::Parser;
use std::path::Path;
use std::process;
use std::sync::Arc;

use crate::cli::{Cli, Command};
use crate::shell::Shell;
use pdfmerger::codec::PdfCodec;
use pdfmerger::config::{Config, OverwriteMode};
use pdfmerger::error::MergerError;
use pdfmerger::io::{DiskSaver, InputReader};
use pdfmerger::output::{
    OutputFormatter, ProgressBar, TerminalProgress, describe_output, display_listing,
    display_read_statistics, display_write_statistics,
};
use pdfmerger::session::Session;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

/// Main application logic.
async fn run(cli: Cli) -> Result<(), MergerError> {
    let config = cli.command.to_config()?;

    match cli.command {
        Command::Shell(_) => Shell::new(config).run().await,
        Command::Merge(_) | Command::Extract(_) => run_once(config).await,
    }
}

/// Build the collection from the inputs, apply the edits, and write the
/// result of the mode's primary action.
async fn run_once(config: Config) -> Result<(), MergerError> {
    let formatter = OutputFormatter::from_config(&config);

    if formatter.should_print() {
        formatter.section(&format!("{} v{}", pdfmerger::NAME, pdfmerger::VERSION));
        formatter.blank_line();
    }

    formatter.info(&format!("Reading {} file(s)...", config.inputs.len()));
    let (inputs, read_stats) = InputReader::new()
        .read_all(config.inputs(), config.effective_jobs())
        .await?;
    display_read_statistics(&formatter, &read_stats);

    let progress = Arc::new(if formatter.should_print() {
        TerminalProgress::new(ProgressBar::auto(0))
    } else {
        TerminalProgress::disabled()
    });
    let session = Session::with_progress(
        PdfCodec::with_compression(config.compression),
        progress.clone(),
    );
    session.set_mode(config.mode)?;

    progress.set_message("Ingesting");
    let added = session.add(inputs).await?;
    formatter.debug(&format!("{added} item(s) in the {} collection", config.mode));

    config.validate_edits(added)?;
    session.apply_edits(&config.edits)?;
    if formatter.is_verbose() {
        display_listing(&formatter, session.mode(), &session.list());
        formatter.blank_line();
    }

    progress.set_message(config.mode.primary_action());
    let output = session.assemble().await?;

    let saver = DiskSaver::new(config.output.clone());
    let target = saver.resolve(&output.filename).await;

    if config.dry_run {
        if config.json {
            print_report(&config, &session, &output, &target, None);
        } else {
            formatter.blank_line();
            formatter.success("Dry run completed successfully");
            formatter.info(&format!("  Would write: {}", describe_output(&output)));
            formatter.info(&format!("  To: {}", target.display()));
            formatter.info("  Run without --dry-run to write it");
        }
        return Ok(());
    }

    let overwrite = handle_output_overwrite(&config, &formatter, &target).await?;
    let write_stats = saver
        .overwrite(overwrite)
        .save_with_stats(&output.bytes, output.media_type, &output.filename)
        .await?;

    if config.json {
        print_report(&config, &session, &output, &target, Some(write_stats.file_size));
    } else if formatter.should_print() {
        formatter.blank_line();
        display_write_statistics(&formatter, &write_stats);
        formatter.detail("Pages", &output.page_count.to_string());
        formatter.detail("Input size", &read_stats.format_total_size());
    }

    Ok(())
}

fn print_report(
    config: &Config,
    session: &Session,
    output: &pdfmerger::OutputFile,
    target: &Path,
    written: Option<u64>,
) {
    let report = serde_json::json!({
        "mode": config.mode,
        "dry_run": config.dry_run,
        "items": session.list(),
        "output": output,
        "size": output.size(),
        "path": target,
        "written": written,
    });
    println!("{report:#}");
}

/// Decide how an existing output file is treated.
///
/// Returns the overwrite mode to save with; a confirmed prompt becomes
/// [`OverwriteMode::Force`].
async fn handle_output_overwrite(
    config: &Config,
    formatter: &OutputFormatter,
    target: &Path,
) -> Result<OverwriteMode, MergerError> {
    if tokio::fs::metadata(target).await.is_err() {
        return Ok(config.overwrite_mode);
    }

    match config.overwrite_mode {
        OverwriteMode::Force => Ok(OverwriteMode::Force),
        OverwriteMode::NoClobber => Err(MergerError::output_exists(target.to_path_buf())),
        OverwriteMode::Prompt => {
            // No one to ask.
            if formatter.is_quiet() {
                return Err(MergerError::output_exists(target.to_path_buf()));
            }

            formatter.warning(&format!("Output file already exists: {}", target.display()));

            use std::io::{self, Write};
            print!("Overwrite? [y/N]: ");
            io::stdout().flush().ok();

            let mut response = String::new();
            io::stdin()
                .read_line(&mut response)
                .map_err(|err| MergerError::other(format!("Failed to read input: {err}")))?;

            let response = response.trim().to_lowercase();
            if response == "y" || response == "yes" {
                Ok(OverwriteMode::Force)
            } else {
                Err(MergerError::Cancelled)
            }
        }
    }
}
