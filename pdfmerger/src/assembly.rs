//! Assembly engine: ordered entities to one output PDF.
//!
//! Merging and saving extracted pages share [`Assembler::concatenate`]:
//! a fresh output document is moved through one blocking step per entity,
//! each step re-parsing the entity's content and appending its pages.
//! Any failure abandons the output; nothing partial is returned.

use crate::codec::{PageSelection, PdfCodec};
use crate::error::{MergerError, Result};
use crate::ingest::classify;
use crate::model::{Entity, IdGenerator, InputFile, Mode, PDF_MEDIA_TYPE, PageExtract, Preview};
use crate::progress::{ProgressSink, StepCounter};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::task;

/// Suggested file name of a merge result.
pub const MERGED_FILENAME: &str = "merged-document.pdf";

/// Suggested file name for pages saved from `source_name`.
pub fn extracted_filename(source_name: &str) -> String {
    format!("extracted-{source_name}")
}

/// A finished PDF ready to be handed to a saver.
#[derive(Debug, Clone, Serialize)]
pub struct OutputFile {
    /// Serialized PDF.
    #[serde(skip)]
    pub bytes: Vec<u8>,
    /// Always [`PDF_MEDIA_TYPE`].
    pub media_type: &'static str,
    /// Suggested file name.
    pub filename: String,
    /// Number of pages written.
    pub page_count: usize,
}

impl OutputFile {
    /// Size of the serialized PDF in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

fn page_name(source_name: &str, page_number: usize) -> String {
    let stem = Path::new(source_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(source_name);
    format!("{stem}-page-{page_number}.pdf")
}

/// Drives the codec over ordered collections.
#[derive(Debug, Clone, Copy, Default)]
pub struct Assembler {
    codec: PdfCodec,
}

impl Assembler {
    /// Create an assembler using the given codec.
    pub fn new(codec: PdfCodec) -> Self {
        Self { codec }
    }

    /// Concatenate every page of every document, in collection order.
    ///
    /// # Errors
    ///
    /// - [`MergerError::EmptyCollection`] if `documents` is empty
    /// - [`MergerError::Codec`] if any document fails to parse or copy
    pub async fn merge<T: Entity>(
        &self,
        documents: &[T],
        sink: &dyn ProgressSink,
    ) -> Result<OutputFile> {
        let (bytes, page_count) = self
            .concatenate(documents, PageSelection::All, "merge", sink)
            .await?;

        Ok(OutputFile {
            bytes,
            media_type: PDF_MEDIA_TYPE,
            filename: MERGED_FILENAME.to_string(),
            page_count,
        })
    }

    /// Split a PDF into one single-page entity per page, in page order.
    ///
    /// Each page is its own preview. Progress advances once per page.
    ///
    /// # Errors
    ///
    /// - [`MergerError::UnsupportedFormat`] if `input` is not a PDF
    /// - [`MergerError::Codec`] if the PDF cannot be parsed or a page cannot
    ///   be written out
    pub async fn extract(
        &self,
        input: &InputFile,
        ids: &IdGenerator,
        sink: &dyn ProgressSink,
    ) -> Result<Vec<PageExtract>> {
        classify(input, Mode::Extractor)?;

        let codec = self.codec;
        let bytes = Arc::clone(&input.bytes);
        let name = input.name.clone();
        let source = Arc::new(task::spawn_blocking(move || codec.load(&bytes, &name)).await??);

        let total = codec.page_count(&source);
        let counter = StepCounter::new(sink, total);
        let mut pages = Vec::with_capacity(total);

        for index in 0..total {
            let doc = Arc::clone(&source);
            let name = input.name.clone();
            let content: Arc<[u8]> =
                task::spawn_blocking(move || codec.single_page(&doc, index, &name))
                    .await??
                    .into();

            pages.push((index + 1, content));
            counter.advance();
        }

        Ok(pages
            .into_iter()
            .map(|(page_number, content)| PageExtract {
                id: ids.next_id(),
                name: page_name(&input.name, page_number),
                size: content.len() as u64,
                media_type: PDF_MEDIA_TYPE.to_string(),
                preview: Ok(Preview::shared(Arc::clone(&content))),
                content,
                page_number,
            })
            .collect())
    }

    /// Write extracted pages out as one PDF, in collection order.
    ///
    /// # Errors
    ///
    /// - [`MergerError::EmptyCollection`] if `pages` is empty
    /// - [`MergerError::Codec`] if any page fails to parse or copy
    pub async fn save_extracted(
        &self,
        pages: &[PageExtract],
        source_name: &str,
        sink: &dyn ProgressSink,
    ) -> Result<OutputFile> {
        let (bytes, page_count) = self
            .concatenate(pages, PageSelection::First, "save", sink)
            .await?;

        Ok(OutputFile {
            bytes,
            media_type: PDF_MEDIA_TYPE,
            filename: extracted_filename(source_name),
            page_count,
        })
    }

    /// Copy the selected pages of each entity into a fresh document and
    /// serialize it.
    ///
    /// Returns the serialized bytes and the number of pages written.
    pub async fn concatenate<T: Entity>(
        &self,
        entities: &[T],
        selection: PageSelection,
        action: &'static str,
        sink: &dyn ProgressSink,
    ) -> Result<(Vec<u8>, usize)> {
        if entities.is_empty() {
            return Err(MergerError::EmptyCollection { action });
        }

        let codec = self.codec;
        let counter = StepCounter::new(sink, entities.len());
        let mut output = codec.create();
        let mut page_count = 0;

        for entity in entities {
            let content = Arc::clone(entity.content());
            let name = entity.name().to_string();

            let (next, copied) = task::spawn_blocking(move || {
                let source = codec.load(&content, &name)?;
                let copied = codec.copy_pages(&mut output, source, selection, &name)?;
                Ok::<_, MergerError>((output, copied))
            })
            .await??;

            output = next;
            page_count += copied;
            counter.advance();
        }

        let bytes = task::spawn_blocking(move || codec.save(&mut output, action)).await??;
        Ok((bytes, page_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::tests::{create_test_pdf, page_markers};
    use crate::ingest::Ingestor;
    use crate::model::Document;
    use crate::progress::{NoProgress, RecordedProgress};

    async fn documents(page_counts: &[usize]) -> Vec<Document> {
        let inputs = page_counts
            .iter()
            .enumerate()
            .map(|(i, &n)| {
                InputFile::new(format!("doc{i}.pdf"), PDF_MEDIA_TYPE, create_test_pdf(n))
            })
            .collect();
        Ingestor::default()
            .ingest(inputs, &IdGenerator::new(), &NoProgress)
            .await
            .unwrap()
    }

    fn markers(bytes: &[u8]) -> Vec<String> {
        let codec = PdfCodec::new();
        page_markers(&codec.load(bytes, "out").unwrap())
    }

    #[test]
    fn test_filenames() {
        assert_eq!(MERGED_FILENAME, "merged-document.pdf");
        assert_eq!(extracted_filename("report.pdf"), "extracted-report.pdf");
        assert_eq!(page_name("report.pdf", 3), "report-page-3.pdf");
    }

    #[tokio::test]
    async fn test_merge_page_count_is_sum() {
        let docs = documents(&[2, 3, 1]).await;
        let out = Assembler::default().merge(&docs, &NoProgress).await.unwrap();

        assert_eq!(out.page_count, 6);
        assert_eq!(out.filename, MERGED_FILENAME);
        assert_eq!(out.media_type, PDF_MEDIA_TYPE);
        assert_eq!(
            markers(&out.bytes),
            vec!["page 1", "page 2", "page 1", "page 2", "page 3", "page 1"]
        );
    }

    #[tokio::test]
    async fn test_merge_empty_is_rejected() {
        let sink = RecordedProgress::new();
        let err = Assembler::default()
            .merge::<Document>(&[], &sink)
            .await
            .unwrap_err();
        assert!(matches!(err, MergerError::EmptyCollection { action: "merge" }));
        assert!(sink.updates().is_empty());
    }

    #[tokio::test]
    async fn test_merge_reports_per_entity() {
        let docs = documents(&[1, 1, 1, 1]).await;
        let sink = RecordedProgress::new();
        Assembler::default().merge(&docs, &sink).await.unwrap();
        assert_eq!(sink.percents(), vec![25.0, 50.0, 75.0, 100.0]);
    }

    #[tokio::test]
    async fn test_merge_aborts_on_corrupt_entity() {
        let mut docs = documents(&[1, 1]).await;
        docs[1].content = b"garbage".to_vec().into();

        let err = Assembler::default()
            .merge(&docs, &NoProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, MergerError::Codec { .. }));
    }

    #[tokio::test]
    async fn test_extract_splits_in_page_order() {
        let input = InputFile::new("five.pdf", PDF_MEDIA_TYPE, create_test_pdf(5));
        let sink = RecordedProgress::new();
        let pages = Assembler::default()
            .extract(&input, &IdGenerator::new(), &sink)
            .await
            .unwrap();

        assert_eq!(
            pages.iter().map(|p| p.page_number).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5]
        );
        for page in &pages {
            assert_eq!(markers(&page.content), vec![format!("page {}", page.page_number)]);
            assert_eq!(page.preview.as_ref().unwrap().bytes(), &page.content[..]);
        }
        assert_eq!(sink.updates().len(), 5);
    }

    #[tokio::test]
    async fn test_extract_rejects_images() {
        let input = InputFile::new("b.png", "image/png", vec![0x89, b'P', b'N', b'G']);
        let err = Assembler::default()
            .extract(&input, &IdGenerator::new(), &NoProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, MergerError::UnsupportedFormat { .. }));
    }

    #[tokio::test]
    async fn test_extract_then_save_roundtrips() {
        let input = InputFile::new("three.pdf", PDF_MEDIA_TYPE, create_test_pdf(3));
        let assembler = Assembler::default();
        let pages = assembler
            .extract(&input, &IdGenerator::new(), &NoProgress)
            .await
            .unwrap();

        let out = assembler
            .save_extracted(&pages, &input.name, &NoProgress)
            .await
            .unwrap();
        assert_eq!(out.filename, "extracted-three.pdf");
        assert_eq!(markers(&out.bytes), vec!["page 1", "page 2", "page 3"]);
    }

    #[tokio::test]
    async fn test_save_extracted_follows_collection_order() {
        let input = InputFile::new("four.pdf", PDF_MEDIA_TYPE, create_test_pdf(4));
        let assembler = Assembler::default();
        let mut pages = assembler
            .extract(&input, &IdGenerator::new(), &NoProgress)
            .await
            .unwrap();
        pages.reverse();
        pages.remove(1);

        let out = assembler
            .save_extracted(&pages, &input.name, &NoProgress)
            .await
            .unwrap();
        assert_eq!(out.page_count, 3);
        assert_eq!(markers(&out.bytes), vec!["page 4", "page 2", "page 1"]);
    }

    #[tokio::test]
    async fn test_save_extracted_empty_is_rejected() {
        let err = Assembler::default()
            .save_extracted(&[], "a.pdf", &NoProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, MergerError::EmptyCollection { action: "save" }));
    }
}
