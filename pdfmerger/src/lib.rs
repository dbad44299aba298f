//! pdfmerger - Combine PDFs and images, or split a PDF into pages.
//!
//! The library works in two modes:
//!
//! - **Merger**: ingest PDFs and JPEG/PNG images into an ordered collection,
//!   reorder or drop entries, then merge them into one PDF.
//! - **Extractor**: split one PDF into single-page documents, reorder or
//!   drop pages, then save the modified PDF.
//!
//! Everything works on in-memory bytes; [`io`] reads and writes files for
//! the command line.
//!
//! # Examples
//!
//! ## Merge
//!
//! ```no_run
//! use pdfmerger::io::{DiskSaver, FileSaver, InputReader};
//! use pdfmerger::Session;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let paths = vec![PathBuf::from("a.pdf"), PathBuf::from("scan.png")];
//! let (inputs, _) = InputReader::new().read_all(&paths, 4).await?;
//!
//! let session = Session::default();
//! session.ingest(inputs).await?;
//!
//! let output = session.merge().await?;
//! DiskSaver::new(None)
//!     .save(&output.bytes, output.media_type, &output.filename)
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Extract and reorder
//!
//! ```no_run
//! use pdfmerger::model::{InputFile, Mode, PDF_MEDIA_TYPE};
//! use pdfmerger::Session;
//!
//! # async fn example(bytes: Vec<u8>) -> pdfmerger::Result<()> {
//! let session = Session::default();
//! session.set_mode(Mode::Extractor)?;
//! session.extract(InputFile::new("report.pdf", PDF_MEDIA_TYPE, bytes)).await?;
//!
//! let ids = session.ids();
//! session.reorder(&ids[ids.len() - 1], &ids[0])?;
//!
//! let output = session.save_extracted().await?;
//! assert_eq!(output.filename, "extracted-report.pdf");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod assembly;
pub mod codec;
pub mod config;
pub mod error;
pub mod ingest;
pub mod io;
pub mod model;
pub mod output;
pub mod progress;
pub mod session;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use assembly::{Assembler, OutputFile};
pub use codec::{PageSelection, PdfCodec};
pub use config::{CompressionLevel, Config, Edit, OverwriteMode};
pub use error::{MergerError, Result};
pub use ingest::Ingestor;
pub use model::{Document, EntityId, InputFile, Mode, PageExtract};
pub use progress::{Progress, ProgressSink};
pub use session::{ItemSummary, Session};
pub use store::OrderedStore;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
