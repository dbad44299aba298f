//! PDF engine: parse, create, copy pages, embed images, serialize.
//!
//! Everything here is synchronous and CPU-bound. Callers on the async side
//! run it through `tokio::task::spawn_blocking`.

pub mod image;
pub mod pages;

use crate::config::CompressionLevel;
use crate::error::{MergerError, Result};
use lopdf::{Document, Object, dictionary};

pub use self::image::{IMAGE_PAGE_HEIGHT, IMAGE_PAGE_WIDTH, ImageFormat, Placement};

/// Which pages of a source document to copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSelection {
    /// Every page, in page-tree order.
    All,
    /// Only the first page.
    First,
    /// The page at this 0-based index.
    Only(usize),
}

impl PageSelection {
    /// 0-based indices selected out of `page_count` pages.
    pub fn indices(&self, page_count: usize) -> Vec<usize> {
        match *self {
            Self::All => (0..page_count).collect(),
            Self::First => (0..page_count.min(1)).collect(),
            Self::Only(index) if index < page_count => vec![index],
            Self::Only(_) => Vec::new(),
        }
    }
}

/// Attaches a subject to engine errors.
pub(crate) trait CodecContext<T> {
    fn codec_context(self, subject: &str) -> Result<T>;
}

impl<T> CodecContext<T> for lopdf::Result<T> {
    fn codec_context(self, subject: &str) -> Result<T> {
        self.map_err(|e| MergerError::codec(subject, e))
    }
}

/// Stateless PDF codec configured with an output compression level.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfCodec {
    compression: CompressionLevel,
}

impl PdfCodec {
    /// Create a codec with standard compression.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a codec with the given compression level.
    pub fn with_compression(compression: CompressionLevel) -> Self {
        Self { compression }
    }

    /// Compression level applied by [`PdfCodec::save`].
    pub fn compression(&self) -> CompressionLevel {
        self.compression
    }

    /// Parse PDF bytes.
    pub fn load(&self, bytes: &[u8], subject: &str) -> Result<Document> {
        let doc = Document::load_mem(bytes).codec_context(subject)?;
        pages::root_pages_id(&doc, subject)?;
        Ok(doc)
    }

    /// Create an empty document with a catalog and an empty page tree.
    pub fn create(&self) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => Vec::<Object>::new(),
                "Count" => 0,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    /// Serialize a document.
    ///
    /// Objects not reachable from the trailer are dropped and the rest are
    /// renumbered before writing.
    pub fn save(&self, doc: &mut Document, subject: &str) -> Result<Vec<u8>> {
        doc.prune_objects();
        match self.compression {
            CompressionLevel::None => {}
            CompressionLevel::Standard => {
                doc.compress();
            }
            CompressionLevel::Maximum => {
                doc.delete_zero_length_streams();
                doc.compress();
            }
        }
        doc.renumber_objects();

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| MergerError::codec(subject, e))?;
        Ok(buffer)
    }

    /// Number of pages in a document.
    pub fn page_count(&self, doc: &Document) -> usize {
        doc.get_pages().len()
    }

    /// Append the selected pages of `source` to the end of `target`.
    ///
    /// Returns the number of pages copied.
    pub fn copy_pages(
        &self,
        target: &mut Document,
        mut source: Document,
        selection: PageSelection,
        subject: &str,
    ) -> Result<usize> {
        let indices = selection.indices(self.page_count(&source));
        if indices.is_empty() {
            return Ok(0);
        }

        for page_id in pages::ids_at(&source, &indices) {
            pages::materialize_inherited(&mut source, page_id, subject)?;
        }

        source.renumber_objects_with(target.max_id + 1);
        let copied = pages::ids_at(&source, &indices);

        let target_pages = pages::root_pages_id(target, subject)?;
        for &page_id in &copied {
            pages::reparent(&mut source, page_id, target_pages, subject)?;
        }

        target.max_id = target.max_id.max(source.max_id);
        target.objects.extend(source.objects);
        pages::append_kids(target, target_pages, &copied, subject)?;

        Ok(copied.len())
    }

    /// Serialize one page of `source` as a standalone single-page PDF.
    pub fn single_page(&self, source: &Document, index: usize, subject: &str) -> Result<Vec<u8>> {
        let mut out = self.create();
        let copied =
            self.copy_pages(&mut out, source.clone(), PageSelection::Only(index), subject)?;
        if copied == 0 {
            return Err(MergerError::codec(
                subject,
                format!("page {} does not exist", index + 1),
            ));
        }
        self.save(&mut out, subject)
    }

    /// Build a single-page document showing an image.
    ///
    /// The page is [`IMAGE_PAGE_WIDTH`] by [`IMAGE_PAGE_HEIGHT`] points; the
    /// image is scaled to fit and centered.
    pub fn image_document(
        &self,
        bytes: &[u8],
        format: ImageFormat,
        subject: &str,
    ) -> Result<Document> {
        let mut doc = self.create();
        let embedded =
            image::embed(&mut doc, bytes, format).map_err(|e| MergerError::codec(subject, e))?;
        let page_id = image::add_page(&mut doc, IMAGE_PAGE_WIDTH, IMAGE_PAGE_HEIGHT, subject)?;
        let placement = Placement::fit_centered(
            embedded.width as f32,
            embedded.height as f32,
            IMAGE_PAGE_WIDTH,
            IMAGE_PAGE_HEIGHT,
        );
        image::draw(&mut doc, page_id, &embedded, placement, subject)?;
        Ok(doc)
    }
}
