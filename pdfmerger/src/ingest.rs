//! Ingestion pipeline: raw inputs to normalized documents.
//!
//! Every input of a batch is processed concurrently. A PDF is parsed and
//! re-serialized; an image is placed on a fresh page. If any input fails,
//! the whole batch fails and nothing is returned.

use crate::codec::{ImageFormat, PdfCodec};
use crate::error::{MergerError, Result};
use crate::model::{
    Document, IdGenerator, InputFile, InputKind, Mode, Preview, PreviewResult, PreviewUnavailable,
};
use crate::progress::{ProgressSink, StepCounter};
use futures::future::try_join_all;
use tokio::task;

/// Classify an input for the given mode.
///
/// # Errors
///
/// Returns [`MergerError::UnsupportedFormat`] when the declared media type
/// is unknown or not accepted in `mode`.
pub fn classify(input: &InputFile, mode: Mode) -> Result<InputKind> {
    InputKind::classify(&input.media_type)
        .filter(|kind| kind.accepted_in(mode))
        .ok_or_else(|| MergerError::unsupported_format(&input.name, &input.media_type))
}

/// Build the first-page preview of a document.
///
/// Never fails; problems are recorded as [`PreviewUnavailable`].
pub(crate) fn first_page_preview(
    codec: &PdfCodec,
    doc: &lopdf::Document,
    subject: &str,
) -> PreviewResult {
    if codec.page_count(doc) == 0 {
        return Err(PreviewUnavailable {
            reason: "document has no pages".to_string(),
        });
    }
    codec
        .single_page(doc, 0, subject)
        .map(Preview::new)
        .map_err(|e| PreviewUnavailable {
            reason: e.to_string(),
        })
}

/// Result of normalizing one input, before it is given an identity.
struct Normalized {
    input: InputFile,
    content: Vec<u8>,
    page_count: usize,
    preview: PreviewResult,
}

impl Normalized {
    fn into_document(self, ids: &IdGenerator) -> Document {
        Document {
            id: ids.next_id(),
            name: self.input.name,
            size: self.input.size,
            media_type: self.input.media_type,
            content: self.content.into(),
            page_count: self.page_count,
            preview: self.preview,
        }
    }
}

fn normalize(codec: PdfCodec, input: InputFile, kind: InputKind) -> Result<Normalized> {
    let mut doc = match kind {
        InputKind::Pdf => codec.load(&input.bytes, &input.name)?,
        InputKind::Jpeg => codec.image_document(&input.bytes, ImageFormat::Jpeg, &input.name)?,
        InputKind::Png => codec.image_document(&input.bytes, ImageFormat::Png, &input.name)?,
    };

    let content = codec.save(&mut doc, &input.name)?;
    let page_count = codec.page_count(&doc);
    let preview = first_page_preview(&codec, &doc, &input.name);

    Ok(Normalized {
        input,
        content,
        page_count,
        preview,
    })
}

/// Turns batches of [`InputFile`]s into [`Document`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ingestor {
    codec: PdfCodec,
}

impl Ingestor {
    /// Create an ingestor using the given codec.
    pub fn new(codec: PdfCodec) -> Self {
        Self { codec }
    }

    /// Normalize a batch of merge-mode inputs.
    ///
    /// Returns one document per input, in input order, regardless of which
    /// input finished first. Every input reports two steps to `sink`: one
    /// when it starts and one when it finishes.
    ///
    /// # Errors
    ///
    /// Fails with the first error any input produces. No documents are
    /// returned in that case and no ids are consumed.
    pub async fn ingest(
        &self,
        inputs: Vec<InputFile>,
        ids: &IdGenerator,
        sink: &dyn ProgressSink,
    ) -> Result<Vec<Document>> {
        let counter = StepCounter::new(sink, inputs.len() * 2);
        let codec = self.codec;

        let normalized = try_join_all(inputs.into_iter().map(|input| {
            let counter = &counter;
            async move {
                counter.advance();
                let kind = classify(&input, Mode::Merger)?;
                let normalized =
                    task::spawn_blocking(move || normalize(codec, input, kind)).await??;
                counter.advance();
                Ok::<_, MergerError>(normalized)
            }
        }))
        .await?;

        Ok(normalized
            .into_iter()
            .map(|n| n.into_document(ids))
            .collect())
    }
}
