//! Error types for pdfmerger.
//!
//! Every top-level action (ingest a batch, extract pages, merge, save the
//! extracted pages) returns one [`Result`]. Errors carry enough context to
//! be shown to the user as a single message.
//!
//! # Error Categories
//!
//! - **Input Errors**: unsupported formats, missing files
//! - **Codec Errors**: malformed PDFs, images the embedder cannot read
//! - **State Errors**: empty collections, an operation already in flight
//! - **Output Errors**: existing output files, failed writes

use std::io;
use std::path::PathBuf;

/// Result type alias for pdfmerger operations.
pub type Result<T> = std::result::Result<T, MergerError>;

/// Main error type for pdfmerger operations.
#[derive(Debug, thiserror::Error)]
pub enum MergerError {
    /// The declared media type is not accepted in the current mode.
    #[error("Unsupported file format: {name} ({media_type})")]
    UnsupportedFormat {
        /// Name of the rejected input.
        name: String,
        /// Declared media type of the input.
        media_type: String,
    },

    /// The PDF engine failed to parse, copy, embed or serialize.
    #[error("Failed to process {subject}\n  Reason: {reason}")]
    Codec {
        /// What was being processed (file name or operation).
        subject: String,
        /// Description reported by the engine.
        reason: String,
    },

    /// Merge or save was requested with nothing in the collection.
    #[error("Please add at least one file before running '{action}'")]
    EmptyCollection {
        /// The rejected action.
        action: &'static str,
    },

    /// Another ingestion or assembly is still running.
    #[error("Another operation is already in progress")]
    Busy,

    /// Input file was not found.
    #[error("File not found: {}", path.display())]
    FileNotFound {
        /// Path to the file that was not found.
        path: PathBuf,
    },

    /// Input path is not a regular file.
    #[error("Not a file: {}", path.display())]
    NotAFile {
        /// Path that is not a file.
        path: PathBuf,
    },

    /// Input file could not be read.
    #[error("Cannot read file: {}\n  Reason: {source}", path.display())]
    FailedToRead {
        /// Path to the unreadable file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  Use --force to overwrite or choose a different output path",
        path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Failed to write the output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Invalid configuration or command arguments.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// User cancelled the operation.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<anyhow::Error> for MergerError {
    fn from(err: anyhow::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl From<tokio::task::JoinError> for MergerError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::other(format!("Background task failed: {err}"))
    }
}

impl MergerError {
    /// Create an UnsupportedFormat error.
    pub fn unsupported_format(name: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            name: name.into(),
            media_type: media_type.into(),
        }
    }

    /// Create a Codec error.
    pub fn codec(subject: impl Into<String>, reason: impl ToString) -> Self {
        Self::Codec {
            subject: subject.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a NotAFile error.
    pub fn not_a_file(path: PathBuf) -> Self {
        Self::NotAFile { path }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if this error was caused by what the user asked for rather than
    /// by the documents themselves.
    ///
    /// The interactive shell reports these as warnings.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFormat { .. }
                | Self::EmptyCollection { .. }
                | Self::Busy
                | Self::FileNotFound { .. }
                | Self::NotAFile { .. }
                | Self::InvalidConfig { .. }
                | Self::OutputExists { .. }
        )
    }

    /// Check if this error should stop all processing immediately.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::FailedToWrite { .. } | Self::Cancelled)
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::UnsupportedFormat { .. } => 1,
            Self::EmptyCollection { .. } => 1,
            Self::InvalidConfig { .. } => 1,
            Self::FileNotFound { .. } => 2,
            Self::NotAFile { .. } => 2,
            Self::FailedToRead { .. } => 2,
            Self::Codec { .. } => 3,
            Self::OutputExists { .. } => 4,
            Self::FailedToWrite { .. } => 5,
            Self::Io { .. } => 5,
            Self::Busy => 6,
            Self::Cancelled => 130, // Standard exit code for SIGINT
            Self::Other { .. } => 1,
        }
    }
}
