//! Reading input files from disk.
//!
//! This module turns paths into [`InputFile`]s:
//! - Concurrent reads with a bounded number of files in flight
//! - Results in the same order as the paths
//! - Media type derived from the file extension
//!
//! # Examples
//!
//! ```no_run
//! use pdfmerger::io::reader::InputReader;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = InputReader::new();
//! let paths = vec![PathBuf::from("a.pdf"), PathBuf::from("b.png")];
//! let (inputs, stats) = reader.read_all(&paths, 4).await?;
//! println!("Read {} files ({})", inputs.len(), stats.format_total_size());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt, TryStreamExt};

use crate::error::{MergerError, Result};
use crate::model::{InputFile, PDF_MEDIA_TYPE};
use crate::utils::format_file_size;

/// Media type assumed for files with an unknown extension.
pub const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

/// Declared media type for a path, judged by its extension.
///
/// # Examples
///
/// ```
/// use pdfmerger::io::reader::media_type_for;
/// use std::path::Path;
///
/// assert_eq!(media_type_for(Path::new("scan.JPG")), "image/jpeg");
/// assert_eq!(media_type_for(Path::new("notes.txt")), "application/octet-stream");
/// ```
pub fn media_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("pdf") => PDF_MEDIA_TYPE,
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => UNKNOWN_MEDIA_TYPE,
    }
}

/// Statistics for a batch read.
#[derive(Debug, Clone, Default)]
pub struct ReadStatistics {
    /// Number of files read.
    pub file_count: usize,

    /// Total size of the files read.
    pub total_size: u64,

    /// Wall time for the whole batch.
    pub total_time: Duration,
}

impl ReadStatistics {
    /// Format total size as human-readable string.
    pub fn format_total_size(&self) -> String {
        format_file_size(self.total_size)
    }
}

/// Reads input files into memory.
#[derive(Debug, Clone, Default)]
pub struct InputReader;

impl InputReader {
    /// Create a new reader.
    pub fn new() -> Self {
        Self
    }

    /// Read a single file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path does not exist
    /// - The path is not a regular file
    /// - The file cannot be read
    pub async fn read(&self, path: &Path) -> Result<InputFile> {
        let metadata = tokio::fs::metadata(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MergerError::file_not_found(path.to_path_buf())
            } else {
                MergerError::FailedToRead {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        if !metadata.is_file() {
            return Err(MergerError::not_a_file(path.to_path_buf()));
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| MergerError::FailedToRead {
                path: path.to_path_buf(),
                source: e,
            })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(InputFile::new(name, media_type_for(path), bytes))
    }

    /// Read several files with at most `workers` in flight.
    ///
    /// The returned inputs are in the same order as `paths`. The first
    /// failure stops the batch.
    pub async fn read_all(
        &self,
        paths: &[PathBuf],
        workers: usize,
    ) -> Result<(Vec<InputFile>, ReadStatistics)> {
        let start = Instant::now();
        let workers = workers.max(1);

        let inputs: Vec<InputFile> = stream::iter(paths.iter().map(|path| self.read(path)))
            .buffered(workers)
            .try_collect()
            .await?;

        let stats = ReadStatistics {
            file_count: inputs.len(),
            total_size: inputs.iter().map(|i| i.size).sum(),
            total_time: start.elapsed(),
        };

        Ok((inputs, stats))
    }
}
