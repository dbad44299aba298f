//! File input and output.
//!
//! [`reader`] reads inputs from disk; [`writer`] saves finished PDFs.

pub mod reader;
pub mod writer;

pub use reader::{InputReader, ReadStatistics, media_type_for};
pub use writer::{DiskSaver, FileSaver, WriteOptions, WriteStatistics};
