//! Entities held by a session.
//!
//! A [`Document`] is one ingested merge-mode input, normalized to a
//! self-contained PDF. A [`PageExtract`] is one page split out of a source
//! PDF in extractor mode. Both are immutable once built; the collections
//! that hold them only change membership and order.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Media type of a PDF document.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Working mode of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Combine PDFs and images into one document.
    #[default]
    Merger,
    /// Split one PDF into pages, reorder or drop them, save the result.
    Extractor,
}

impl Mode {
    /// Name of the primary action in this mode.
    pub fn primary_action(&self) -> &'static str {
        match self {
            Self::Merger => "Merge PDFs",
            Self::Extractor => "Save Modified PDF",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Merger => write!(f, "merger"),
            Self::Extractor => write!(f, "extractor"),
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = crate::MergerError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "merger" | "merge" => Ok(Self::Merger),
            "extractor" | "extract" | "split" => Ok(Self::Extractor),
            _ => Err(crate::MergerError::invalid_config(format!(
                "Invalid mode: {s}. Must be one of: merger, extractor"
            ))),
        }
    }
}

/// How an input is turned into PDF content, decided by its declared media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// An existing PDF document.
    Pdf,
    /// A JPEG image to be placed on its own page.
    Jpeg,
    /// A PNG image to be placed on its own page.
    Png,
}

impl InputKind {
    /// Classify a declared media type.
    ///
    /// Returns `None` for anything this application does not accept.
    pub fn classify(media_type: &str) -> Option<Self> {
        match media_type.trim().to_ascii_lowercase().as_str() {
            "application/pdf" => Some(Self::Pdf),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            _ => None,
        }
    }

    /// Whether inputs of this kind are accepted in the given mode.
    pub fn accepted_in(&self, mode: Mode) -> bool {
        match mode {
            Mode::Merger => true,
            Mode::Extractor => *self == Self::Pdf,
        }
    }
}

/// A raw input as handed to the ingestion pipeline.
#[derive(Debug, Clone)]
pub struct InputFile {
    /// Original file name.
    pub name: String,
    /// Size of the original input in bytes.
    pub size: u64,
    /// Declared media type.
    pub media_type: String,
    /// Raw bytes.
    pub bytes: Arc<[u8]>,
}

impl InputFile {
    /// Create an input from in-memory bytes.
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }
}

/// Identity of an entity within a session.
///
/// Built from the creation time in milliseconds and a sequence number that
/// never repeats within the generator that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    stamp_ms: u64,
    seq: u64,
}

impl EntityId {
    /// Sequence number component.
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.stamp_ms, self.seq)
    }
}

impl Serialize for EntityId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Source of unique [`EntityId`]s.
#[derive(Debug, Default)]
pub struct IdGenerator {
    next_seq: AtomicU64,
}

impl IdGenerator {
    /// Create a generator starting at sequence zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the next id.
    pub fn next_id(&self) -> EntityId {
        let stamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        EntityId {
            stamp_ms,
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
        }
    }
}

/// A single-page PDF used to display an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    bytes: Arc<[u8]>,
}

impl Preview {
    pub(crate) fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub(crate) fn shared(bytes: Arc<[u8]>) -> Self {
        Self { bytes }
    }

    /// Serialized single-page PDF.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Media type of the preview bytes.
    pub fn media_type(&self) -> &'static str {
        PDF_MEDIA_TYPE
    }
}

/// Why an entity has no preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewUnavailable {
    /// What went wrong while building the preview.
    pub reason: String,
}

impl fmt::Display for PreviewUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no preview available: {}", self.reason)
    }
}

/// Outcome of building a preview. Never propagated as an error.
pub type PreviewResult = std::result::Result<Preview, PreviewUnavailable>;

/// Common view over entities kept in an ordered collection.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Identity of this entity.
    fn id(&self) -> &EntityId;

    /// Display name.
    fn name(&self) -> &str;

    /// Serialized PDF content.
    fn content(&self) -> &Arc<[u8]>;

    /// Best-effort preview.
    fn preview(&self) -> &PreviewResult;
}

/// A normalized merge-mode input.
#[derive(Debug, Clone)]
pub struct Document {
    /// Identity within the session.
    pub id: EntityId,
    /// Original file name.
    pub name: String,
    /// Size of the original input in bytes.
    pub size: u64,
    /// Declared media type of the original input.
    pub media_type: String,
    /// Normalized, self-contained PDF.
    pub content: Arc<[u8]>,
    /// Number of pages in `content`.
    pub page_count: usize,
    /// First-page preview.
    pub preview: PreviewResult,
}

impl Entity for Document {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn content(&self) -> &Arc<[u8]> {
        &self.content
    }

    fn preview(&self) -> &PreviewResult {
        &self.preview
    }
}

/// One page split out of a source PDF.
#[derive(Debug, Clone)]
pub struct PageExtract {
    /// Identity within the session.
    pub id: EntityId,
    /// Display name, derived from the source file.
    pub name: String,
    /// Size of `content` in bytes.
    pub size: u64,
    /// Always [`PDF_MEDIA_TYPE`].
    pub media_type: String,
    /// Single-page PDF.
    pub content: Arc<[u8]>,
    /// 1-based page number in the source, fixed at extraction time.
    pub page_number: usize,
    /// Preview of the page.
    pub preview: PreviewResult,
}

impl Entity for PageExtract {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn content(&self) -> &Arc<[u8]> {
        &self.content
    }

    fn preview(&self) -> &PreviewResult {
        &self.preview
    }
}
