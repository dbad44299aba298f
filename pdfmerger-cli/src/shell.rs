//! Interactive session over stdin.
//!
//! Each line is one command. A failing command prints its error and the
//! shell keeps going, unless the error is fatal. End of input ends the
//! session like `quit`.

use anyhow::{Context, bail};
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use pdfmerger::assembly::OutputFile;
use pdfmerger::codec::PdfCodec;
use pdfmerger::config::{Config, OverwriteMode};
use pdfmerger::error::{MergerError, Result};
use pdfmerger::io::{DiskSaver, InputReader};
use pdfmerger::model::Mode;
use pdfmerger::output::{
    OutputFormatter, ProgressBar, TerminalProgress, describe_output, display_listing,
    display_write_statistics,
};
use pdfmerger::session::Session;
use pdfmerger::utils::collect_paths_for_patterns;

const PROMPT: &str = "pdfmerger> ";

const HELP: &str = "\
Commands:
  mode merger|extractor   switch mode (clears the collection)
  add <paths>...          add PDFs/images (merger) or split one PDF (extractor)
  extract <path>          switch to extractor mode and split a PDF
  list                    show the current collection
  move <from> <to>        move the item at position <from> to position <to>
  remove <pos>            remove the item at position <pos>
  clear                   empty the collection
  merge [path]            merge the documents into one PDF
  save [path]             run the primary action of the current mode
  help                    show this help
  quit                    leave the shell";

/// One parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Switch mode.
    Mode(Mode),
    /// Add inputs to the current collection.
    Add(Vec<String>),
    /// Split a PDF in extractor mode.
    Extract(PathBuf),
    /// Show the collection.
    List,
    /// Move by current 1-based positions.
    Move {
        /// Position of the item to move.
        from: usize,
        /// Position it should take.
        to: usize,
    },
    /// Remove by current 1-based position.
    Remove(usize),
    /// Empty the collection.
    Clear,
    /// Merge the documents.
    Merge(Option<PathBuf>),
    /// Primary action of the current mode.
    Save(Option<PathBuf>),
    /// Show help.
    Help,
    /// Leave the shell.
    Quit,
}

impl ShellCommand {
    /// Parse one input line; blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> anyhow::Result<Option<Self>> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(None);
        };
        if name.starts_with('#') {
            return Ok(None);
        }
        let args: Vec<&str> = words.collect();

        let command = match (name, args.as_slice()) {
            ("mode", [mode]) => Self::Mode(Mode::from_str(mode)?),
            ("add", []) => bail!("add needs at least one path"),
            ("add", paths) => Self::Add(paths.iter().map(|p| p.to_string()).collect()),
            ("extract", [path]) => Self::Extract(PathBuf::from(path)),
            ("list" | "ls", []) => Self::List,
            ("move" | "mv", [from, to]) => Self::Move {
                from: parse_position(from)?,
                to: parse_position(to)?,
            },
            ("remove" | "rm", [position]) => Self::Remove(parse_position(position)?),
            ("clear", []) => Self::Clear,
            ("merge", []) => Self::Merge(None),
            ("merge", [path]) => Self::Merge(Some(PathBuf::from(path))),
            ("save", []) => Self::Save(None),
            ("save", [path]) => Self::Save(Some(PathBuf::from(path))),
            ("help" | "?", _) => Self::Help,
            ("quit" | "exit", []) => Self::Quit,
            (
                "mode" | "extract" | "list" | "ls" | "move" | "mv" | "remove" | "rm" | "clear"
                | "merge" | "save" | "quit" | "exit",
                _,
            ) => bail!("Wrong number of arguments for '{name}' (try 'help')"),
            _ => bail!("Unknown command: {name} (try 'help')"),
        };

        Ok(Some(command))
    }
}

fn parse_position(s: &str) -> anyhow::Result<usize> {
    let position: usize = s
        .parse()
        .with_context(|| format!("Invalid position: {s}"))?;
    if position == 0 {
        bail!("Positions start at 1");
    }
    Ok(position)
}

/// Whether the shell keeps reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next command.
    Continue,
    /// Stop.
    Quit,
}

/// An interactive session.
pub struct Shell {
    config: Config,
    session: Session,
    progress: Arc<TerminalProgress>,
    formatter: OutputFormatter,
    reader: InputReader,
}

impl Shell {
    /// Create a shell in merger mode.
    pub fn new(config: Config) -> Self {
        let formatter = OutputFormatter::from_config(&config);
        let progress = Arc::new(if formatter.should_print() {
            TerminalProgress::new(ProgressBar::auto(0))
        } else {
            TerminalProgress::disabled()
        });
        let session = Session::with_progress(
            PdfCodec::with_compression(config.compression),
            progress.clone(),
        );

        Self {
            config,
            session,
            progress,
            formatter,
            reader: InputReader::new(),
        }
    }

    /// The underlying session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Read commands from stdin until `quit` or end of input.
    pub async fn run(&self) -> Result<()> {
        let interactive = std::io::stdin().is_terminal();
        if interactive && self.formatter.should_print() {
            self.formatter
                .info(&format!("{} v{}", pdfmerger::NAME, pdfmerger::VERSION));
            self.formatter.info("Type 'help' for a list of commands.");
        }

        self.run_lines(BufReader::new(tokio::io::stdin()), interactive)
            .await
    }

    /// Read commands from `input` until `quit` or end of input.
    pub async fn run_lines<R>(&self, input: R, show_prompt: bool) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();

        loop {
            if show_prompt {
                print!("{PROMPT}");
                std::io::stdout().flush().ok();
            }

            let Some(line) = lines.next_line().await? else {
                break;
            };

            let command = match ShellCommand::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(err) => {
                    self.formatter.error(&err.to_string());
                    continue;
                }
            };

            match self.execute(command).await {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) if err.is_user_error() => self.formatter.warning(&err.to_string()),
                Err(err) => self.formatter.error(&err.to_string()),
            }
        }

        Ok(())
    }

    /// Run one command against the session.
    pub async fn execute(&self, command: ShellCommand) -> Result<Flow> {
        match command {
            ShellCommand::Mode(mode) => {
                self.session.set_mode(mode)?;
                self.formatter.info(&format!("Mode: {mode}"));
            }
            ShellCommand::Add(patterns) => {
                let paths = collect_paths_for_patterns(&patterns)?;
                self.add(&paths).await?;
            }
            ShellCommand::Extract(path) => {
                self.session.set_mode(Mode::Extractor)?;
                self.add(&[path]).await?;
            }
            ShellCommand::List => {
                display_listing(&self.formatter, self.session.mode(), &self.session.list());
            }
            ShellCommand::Move { from, to } => {
                let source = self.id_at(from)?;
                let target = self.id_at(to)?;
                if self.session.reorder(&source, &target)? {
                    self.formatter.info(&format!("Moved item {from} to position {to}"));
                }
            }
            ShellCommand::Remove(position) => {
                let id = self.id_at(position)?;
                self.session.remove(&id)?;
                self.formatter.info(&format!("Removed item {position}"));
            }
            ShellCommand::Clear => {
                self.session.clear()?;
                self.formatter.info("Collection cleared");
            }
            ShellCommand::Merge(path) => {
                if self.session.mode() != Mode::Merger {
                    return Err(MergerError::invalid_config(
                        "merge is only available in merger mode; use 'save'",
                    ));
                }
                self.progress.set_message("Merging");
                let output = self.session.merge().await?;
                self.write(&output, path.as_deref()).await?;
            }
            ShellCommand::Save(path) => {
                self.progress
                    .set_message(self.session.mode().primary_action());
                let output = self.session.assemble().await?;
                self.write(&output, path.as_deref()).await?;
            }
            ShellCommand::Help => println!("{HELP}"),
            ShellCommand::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }

    async fn add(&self, paths: &[PathBuf]) -> Result<()> {
        let (inputs, _) = self
            .reader
            .read_all(paths, self.config.effective_jobs())
            .await?;

        self.progress.set_message("Adding");
        let added = self.session.add(inputs).await?;
        self.formatter.success(&format!(
            "Added {added} item(s); {} in the collection",
            self.session.len()
        ));
        Ok(())
    }

    fn id_at(&self, position: usize) -> Result<pdfmerger::model::EntityId> {
        self.session.id_at(position - 1).ok_or_else(|| {
            MergerError::invalid_config(format!(
                "No item at position {position} (collection has {} item(s))",
                self.session.len()
            ))
        })
    }

    /// Existing files are only replaced with `--force`; there is no prompt
    /// because stdin carries the commands.
    async fn write(&self, output: &OutputFile, path: Option<&Path>) -> Result<()> {
        let target = path.map(Path::to_path_buf).or_else(|| self.config.output.clone());
        let overwrite = match self.config.overwrite_mode {
            OverwriteMode::Force => OverwriteMode::Force,
            OverwriteMode::Prompt | OverwriteMode::NoClobber => OverwriteMode::NoClobber,
        };
        let saver = DiskSaver::new(target).overwrite(overwrite);

        if self.config.dry_run {
            let path = saver.resolve(&output.filename).await;
            self.formatter.info(&format!(
                "Would write {} to {}",
                describe_output(output),
                path.display()
            ));
            return Ok(());
        }

        let stats = saver
            .save_with_stats(&output.bytes, output.media_type, &output.filename)
            .await?;
        display_write_statistics(&self.formatter, &stats);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    #[case("mode extractor", ShellCommand::Mode(Mode::Extractor))]
    #[case("add a.pdf b.png", ShellCommand::Add(vec!["a.pdf".into(), "b.png".into()]))]
    #[case("extract  report.pdf", ShellCommand::Extract(PathBuf::from("report.pdf")))]
    #[case("list", ShellCommand::List)]
    #[case("move 5 1", ShellCommand::Move { from: 5, to: 1 })]
    #[case("rm 3", ShellCommand::Remove(3))]
    #[case("clear", ShellCommand::Clear)]
    #[case("merge", ShellCommand::Merge(None))]
    #[case("save out.pdf", ShellCommand::Save(Some(PathBuf::from("out.pdf"))))]
    #[case("help", ShellCommand::Help)]
    #[case("quit", ShellCommand::Quit)]
    fn test_parse_command(#[case] line: &str, #[case] expected: ShellCommand) {
        assert_eq!(ShellCommand::parse(line).unwrap(), Some(expected));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("# a comment")]
    fn test_parse_nothing(#[case] line: &str) {
        assert_eq!(ShellCommand::parse(line).unwrap(), None);
    }

    #[rstest]
    #[case("frobnicate")]
    #[case("add")]
    #[case("move 1")]
    #[case("move 0 1")]
    #[case("remove x")]
    #[case("mode sideways")]
    #[case("quit now")]
    fn test_parse_errors(#[case] line: &str) {
        assert!(ShellCommand::parse(line).is_err());
    }

    fn empty_pdf(dir: &Path, name: &str) -> PathBuf {
        let codec = PdfCodec::new();
        let mut doc = codec.create();
        let bytes = codec.save(&mut doc, name).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    fn quiet_shell(output: Option<PathBuf>) -> Shell {
        Shell::new(Config {
            quiet: true,
            output,
            ..Config::default()
        })
    }

    #[tokio::test]
    async fn test_script_builds_collection() {
        let dir = TempDir::new().unwrap();
        let a = empty_pdf(dir.path(), "a.pdf");
        let b = empty_pdf(dir.path(), "b.pdf");

        let script = format!(
            "add {} {}\nmove 2 1\nlist\nbogus\nremove 9\n",
            a.display(),
            b.display()
        );
        let shell = quiet_shell(None);
        shell.run_lines(script.as_bytes(), false).await.unwrap();

        let names: Vec<String> = shell
            .session()
            .documents()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["b.pdf", "a.pdf"]);
    }

    #[tokio::test]
    async fn test_quit_stops_reading() {
        let dir = TempDir::new().unwrap();
        let a = empty_pdf(dir.path(), "a.pdf");

        let script = format!("quit\nadd {}\n", a.display());
        let shell = quiet_shell(None);
        shell.run_lines(script.as_bytes(), false).await.unwrap();
        assert!(shell.session().is_empty());
    }

    #[tokio::test]
    async fn test_save_writes_into_output_directory() {
        let dir = TempDir::new().unwrap();
        let a = empty_pdf(dir.path(), "a.pdf");
        let out = dir.path().join("out");
        std::fs::create_dir(&out).unwrap();

        let shell = quiet_shell(Some(out.clone()));
        shell
            .execute(ShellCommand::Add(vec![a.display().to_string()]))
            .await
            .unwrap();
        shell.execute(ShellCommand::Save(None)).await.unwrap();
        assert!(out.join("merged-document.pdf").exists());

        // A second save refuses to replace the file without --force.
        assert!(matches!(
            shell.execute(ShellCommand::Save(None)).await,
            Err(MergerError::OutputExists { .. })
        ));
    }

    #[tokio::test]
    async fn test_merge_rejected_in_extractor_mode() {
        let shell = quiet_shell(None);
        shell
            .execute(ShellCommand::Mode(Mode::Extractor))
            .await
            .unwrap();
        assert!(matches!(
            shell.execute(ShellCommand::Merge(None)).await,
            Err(MergerError::InvalidConfig { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_collection_cannot_be_saved() {
        let shell = quiet_shell(None);
        assert!(matches!(
            shell.execute(ShellCommand::Save(None)).await,
            Err(MergerError::EmptyCollection { .. })
        ));
    }

    #[tokio::test]
    async fn test_positions_out_of_range() {
        let shell = quiet_shell(None);
        assert!(shell.execute(ShellCommand::Remove(1)).await.is_err());
        assert_eq!(
            shell.execute(ShellCommand::Quit).await.unwrap(),
            Flow::Quit
        );
    }
}
