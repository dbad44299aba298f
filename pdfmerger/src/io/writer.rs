//! Saving finished output to disk.
//!
//! This module provides the [`FileSaver`] seam and its disk implementation:
//! - Atomic writes (write to temp file, then rename)
//! - Overwrite protection
//! - Output directory creation
//! - Write statistics
//!
//! # Examples
//!
//! ```no_run
//! use pdfmerger::io::writer::{DiskSaver, FileSaver};
//!
//! # async fn example(bytes: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let saver = DiskSaver::new(None);
//! let path = saver.save(&bytes, "application/pdf", "merged-document.pdf").await?;
//! println!("Saved to {}", path.display());
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;

use crate::config::OverwriteMode;
use crate::error::{MergerError, Result};
use crate::utils::format_file_size;

/// Destination for finished output.
pub trait FileSaver: Send + Sync {
    /// Persist `bytes` and return where they went.
    ///
    /// `suggested_name` is the file name the application would choose.
    fn save(
        &self,
        bytes: &[u8],
        media_type: &str,
        suggested_name: &str,
    ) -> impl Future<Output = Result<PathBuf>> + Send;
}

/// Options for writing files.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Use atomic writes (write to temp file, then rename).
    pub atomic: bool,

    /// Create missing parent directories.
    pub create_dirs: bool,

    /// Buffer size for writing (in bytes).
    pub buffer_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            atomic: true,
            create_dirs: true,
            buffer_size: 8192,
        }
    }
}

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,

    /// Media type of the written content.
    pub media_type: String,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// Writes output files to the local filesystem.
#[derive(Debug, Clone)]
pub struct DiskSaver {
    /// Explicit output file, or a directory for the suggested name.
    output: Option<PathBuf>,
    overwrite: OverwriteMode,
    options: WriteOptions,
}

impl DiskSaver {
    /// Create a saver writing to `output`.
    ///
    /// `None` places the suggested file name in the current directory.
    /// Existing files are never replaced; see [`DiskSaver::overwrite`].
    pub fn new(output: Option<PathBuf>) -> Self {
        Self {
            output,
            overwrite: OverwriteMode::NoClobber,
            options: WriteOptions::default(),
        }
    }

    /// Set the overwrite behavior.
    ///
    /// [`OverwriteMode::Prompt`] is treated as a refusal here; callers that
    /// prompt must ask before saving and then pass [`OverwriteMode::Force`].
    pub fn overwrite(mut self, mode: OverwriteMode) -> Self {
        self.overwrite = mode;
        self
    }

    /// Replace the write options.
    pub fn with_options(mut self, options: WriteOptions) -> Self {
        self.options = options;
        self
    }

    /// Path a file with `suggested_name` would be written to.
    pub async fn resolve(&self, suggested_name: &str) -> PathBuf {
        match &self.output {
            None => PathBuf::from(suggested_name),
            Some(path) if is_directory_target(path).await => path.join(suggested_name),
            Some(path) => path.clone(),
        }
    }

    /// Check if output file exists.
    pub async fn exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path).await.is_ok()
    }

    /// Write `bytes` and report what happened.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The target exists and overwriting is not forced
    /// - The parent directory is missing and may not be created
    /// - The write or rename fails
    pub async fn save_with_stats(
        &self,
        bytes: &[u8],
        media_type: &str,
        suggested_name: &str,
    ) -> Result<WriteStatistics> {
        let path = self.resolve(suggested_name).await;

        if self.overwrite != OverwriteMode::Force && self.exists(&path).await {
            return Err(MergerError::output_exists(path));
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if self.options.create_dirs {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| MergerError::FailedToWrite {
                        path: parent.to_path_buf(),
                        source: e,
                    })?;
            } else if !self.exists(parent).await {
                return Err(MergerError::invalid_config(format!(
                    "Output directory does not exist: {}",
                    parent.display()
                )));
            }
        }

        let options = self.options.clone();
        let bytes = bytes.to_vec();
        let media_type = media_type.to_string();

        let stats = task::spawn_blocking(move || {
            let start = Instant::now();
            write_with(&path, &options, |writer| writer.write_all(&bytes))?;

            Ok::<_, MergerError>(WriteStatistics {
                write_time: start.elapsed(),
                file_size: bytes.len() as u64,
                output_path: path,
                media_type,
            })
        })
        .await??;

        Ok(stats)
    }
}

impl FileSaver for DiskSaver {
    async fn save(&self, bytes: &[u8], media_type: &str, suggested_name: &str) -> Result<PathBuf> {
        self.save_with_stats(bytes, media_type, suggested_name)
            .await
            .map(|stats| stats.output_path)
    }
}

async fn is_directory_target(path: &Path) -> bool {
    if path.as_os_str().to_string_lossy().ends_with(std::path::MAIN_SEPARATOR) {
        return true;
    }
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}


/// Write `path` through `fill`, via a temp file when `options.atomic` is set.
///
/// A failed write or rename leaves nothing behind at the temp path.
fn write_with<F>(path: &Path, options: &WriteOptions, fill: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> std::io::Result<()>,
{
    let write_path = if options.atomic {
        temp_path_for(path)
    } else {
        path.to_path_buf()
    };

    let file = std::fs::File::create(&write_path).map_err(|e| MergerError::FailedToWrite {
        path: write_path.clone(),
        source: e,
    })?;

    let mut writer = std::io::BufWriter::with_capacity(options.buffer_size, file);
    let written = fill(&mut writer).and_then(|()| writer.flush());
    drop(writer);

    if let Err(e) = written {
        let _ = std::fs::remove_file(&write_path);
        return Err(MergerError::FailedToWrite {
            path: write_path,
            source: e,
        });
    }

    if options.atomic {
        std::fs::rename(&write_path, path).map_err(|e| {
            let _ = std::fs::remove_file(&write_path);
            MergerError::FailedToWrite {
                path: path.to_path_buf(),
                source: e,
            }
        })?;
    }

    Ok(())
}
