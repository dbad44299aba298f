//! A working session: mode, collections, and the operation gate.
//!
//! The session owns both ordered collections and routes every action to
//! the one that belongs to the current mode. At most one ingestion or
//! assembly runs at a time; while one is in flight every other action is
//! rejected with [`MergerError::Busy`].
//!
//! # Examples
//!
//! ```no_run
//! use pdfmerger::model::{InputFile, PDF_MEDIA_TYPE};
//! use pdfmerger::session::Session;
//!
//! # async fn example(a: Vec<u8>, b: Vec<u8>) -> pdfmerger::Result<()> {
//! let session = Session::default();
//! session
//!     .ingest(vec![
//!         InputFile::new("a.pdf", PDF_MEDIA_TYPE, a),
//!         InputFile::new("b.png", "image/png", b),
//!     ])
//!     .await?;
//!
//! let ids = session.ids();
//! session.reorder(&ids[1], &ids[0])?;
//!
//! let output = session.merge().await?;
//! println!("{} pages -> {}", output.page_count, output.filename);
//! # Ok(())
//! # }
//! ```

use crate::assembly::{Assembler, OutputFile};
use crate::codec::PdfCodec;
use crate::config::Edit;
use crate::error::{MergerError, Result};
use crate::ingest::Ingestor;
use crate::model::{Document, Entity, EntityId, IdGenerator, InputFile, Mode, PageExtract};
use crate::progress::{NoProgress, ProgressSink};
use crate::store::OrderedStore;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One row of a collection listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemSummary {
    /// 1-based position in the collection.
    pub position: usize,
    /// Entity id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Page count (documents only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<usize>,
    /// Original page number (extracted pages only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<usize>,
    /// Whether a preview could be built.
    pub preview: bool,
}

#[derive(Debug, Default)]
struct State {
    mode: Mode,
    documents: OrderedStore<Document>,
    pages: OrderedStore<PageExtract>,
    source_name: Option<String>,
}

impl State {
    fn len(&self) -> usize {
        match self.mode {
            Mode::Merger => self.documents.len(),
            Mode::Extractor => self.pages.len(),
        }
    }

    fn ids(&self) -> Vec<EntityId> {
        match self.mode {
            Mode::Merger => self.documents.ids(),
            Mode::Extractor => self.pages.ids(),
        }
    }

    fn remove(&mut self, id: &EntityId) -> bool {
        match self.mode {
            Mode::Merger => self.documents.remove_by_id(id).is_some(),
            Mode::Extractor => self.pages.remove_by_id(id).is_some(),
        }
    }

    fn reorder(&mut self, source: &EntityId, target: &EntityId) -> bool {
        match self.mode {
            Mode::Merger => self.documents.reorder(source, target),
            Mode::Extractor => self.pages.reorder(source, target),
        }
    }

    fn clear(&mut self) {
        self.documents.clear();
        self.pages.clear();
        self.source_name = None;
    }
}

/// Releases the operation gate and resets progress when dropped.
struct OperationGuard<'a> {
    busy: &'a AtomicBool,
    sink: &'a dyn ProgressSink,
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        self.sink.reset();
        self.busy.store(false, Ordering::SeqCst);
    }
}

/// Ephemeral, in-memory working session.
pub struct Session {
    ingestor: Ingestor,
    assembler: Assembler,
    ids: IdGenerator,
    busy: AtomicBool,
    state: Mutex<State>,
    sink: Arc<dyn ProgressSink>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(PdfCodec::default())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("mode", &self.mode())
            .field("len", &self.len())
            .field("busy", &self.is_busy())
            .finish()
    }
}

impl Session {
    /// Create a merger-mode session that discards progress.
    pub fn new(codec: PdfCodec) -> Self {
        Self::with_progress(codec, Arc::new(NoProgress))
    }

    /// Create a merger-mode session reporting progress to `sink`.
    pub fn with_progress(codec: PdfCodec, sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            ingestor: Ingestor::new(codec),
            assembler: Assembler::new(codec),
            ids: IdGenerator::new(),
            busy: AtomicBool::new(false),
            state: Mutex::new(State::default()),
            sink,
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) -> Result<OperationGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| MergerError::Busy)?;
        Ok(OperationGuard {
            busy: &self.busy,
            sink: self.sink.as_ref(),
        })
    }

    /// Run a synchronous mutation while holding the gate.
    fn exclusive<R>(&self, f: impl FnOnce(&mut State) -> R) -> Result<R> {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| MergerError::Busy)?;
        let result = f(&mut self.state());
        self.busy.store(false, Ordering::SeqCst);
        Ok(result)
    }

    /// Whether an ingestion or assembly is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Current mode.
    pub fn mode(&self) -> Mode {
        self.state().mode
    }

    /// Switch modes.
    ///
    /// Changing the mode empties both collections and forgets the source
    /// file name. Setting the current mode again changes nothing.
    pub fn set_mode(&self, mode: Mode) -> Result<()> {
        self.exclusive(|state| {
            if state.mode != mode {
                state.clear();
                state.mode = mode;
            }
        })
    }

    /// Name of the PDF the current pages were extracted from.
    pub fn source_name(&self) -> Option<String> {
        self.state().source_name.clone()
    }

    /// Number of entities in the current collection.
    pub fn len(&self) -> usize {
        self.state().len()
    }

    /// Whether the current collection is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids of the current collection, in order.
    pub fn ids(&self) -> Vec<EntityId> {
        self.state().ids()
    }

    /// Id at a 0-based position of the current collection.
    pub fn id_at(&self, index: usize) -> Option<EntityId> {
        self.state().ids().into_iter().nth(index)
    }

    /// Snapshot of the merge-mode documents.
    pub fn documents(&self) -> Vec<Document> {
        self.state().documents.snapshot()
    }

    /// Snapshot of the extracted pages.
    pub fn pages(&self) -> Vec<PageExtract> {
        self.state().pages.snapshot()
    }

    /// Listing of the current collection.
    pub fn list(&self) -> Vec<ItemSummary> {
        let state = self.state();
        match state.mode {
            Mode::Merger => state
                .documents
                .iter()
                .enumerate()
                .map(|(i, doc)| ItemSummary {
                    position: i + 1,
                    id: doc.id().to_string(),
                    name: doc.name.clone(),
                    size: doc.size,
                    page_count: Some(doc.page_count),
                    page_number: None,
                    preview: doc.preview().is_ok(),
                })
                .collect(),
            Mode::Extractor => state
                .pages
                .iter()
                .enumerate()
                .map(|(i, page)| ItemSummary {
                    position: i + 1,
                    id: page.id().to_string(),
                    name: page.name.clone(),
                    size: page.size,
                    page_count: None,
                    page_number: Some(page.page_number),
                    preview: page.preview().is_ok(),
                })
                .collect(),
        }
    }

    /// Add inputs to the current collection.
    ///
    /// In merger mode this ingests the batch; in extractor mode it expects
    /// exactly one PDF and splits it. Returns the number of entities added.
    pub async fn add(&self, inputs: Vec<InputFile>) -> Result<usize> {
        match self.mode() {
            Mode::Merger => self.ingest(inputs).await,
            Mode::Extractor => {
                let mut inputs = inputs.into_iter();
                match (inputs.next(), inputs.next()) {
                    (Some(input), None) => self.extract(input).await,
                    _ => Err(MergerError::invalid_config(
                        "The extractor works on exactly one PDF at a time",
                    )),
                }
            }
        }
    }

    /// Ingest a batch of inputs and append it to the document collection.
    ///
    /// Nothing is appended unless every input succeeds.
    pub async fn ingest(&self, inputs: Vec<InputFile>) -> Result<usize> {
        let _guard = self.begin()?;
        if self.mode() != Mode::Merger {
            return Err(MergerError::invalid_config(
                "Switch to merger mode to add documents",
            ));
        }

        let documents = self
            .ingestor
            .ingest(inputs, &self.ids, self.sink.as_ref())
            .await?;

        let added = documents.len();
        self.state().documents.append(documents);
        Ok(added)
    }

    /// Split a PDF into pages, replacing the current extracted pages.
    pub async fn extract(&self, input: InputFile) -> Result<usize> {
        let _guard = self.begin()?;
        if self.mode() != Mode::Extractor {
            return Err(MergerError::invalid_config(
                "Switch to extractor mode to split a PDF",
            ));
        }

        let pages = self
            .assembler
            .extract(&input, &self.ids, self.sink.as_ref())
            .await?;

        let added = pages.len();
        let mut state = self.state();
        state.pages.clear();
        state.pages.append(pages);
        state.source_name = Some(input.name);
        Ok(added)
    }

    /// Remove an entity from the current collection.
    ///
    /// Returns `false` if the id was not present.
    pub fn remove(&self, id: &EntityId) -> Result<bool> {
        self.exclusive(|state| state.remove(id))
    }

    /// Move `source` into the slot of `target` in the current collection.
    ///
    /// Returns `false` if nothing moved.
    pub fn reorder(&self, source: &EntityId, target: &EntityId) -> Result<bool> {
        self.exclusive(|state| state.reorder(source, target))
    }

    /// Empty both collections and forget the source file name.
    pub fn clear(&self) -> Result<()> {
        self.exclusive(State::clear)
    }

    /// Apply label-based edits to the current collection.
    ///
    /// Labels are 1-based positions at the time of the call and follow
    /// their item through earlier edits in the list.
    pub fn apply_edits(&self, edits: &[Edit]) -> Result<()> {
        self.exclusive(|state| {
            let ids = state.ids();
            let id_for = |label: usize| {
                ids.get(label.wrapping_sub(1)).cloned().ok_or_else(|| {
                    MergerError::invalid_config(format!(
                        "Item {label} does not exist (collection has {} item(s))",
                        ids.len()
                    ))
                })
            };

            let resolved = edits
                .iter()
                .map(|edit| match *edit {
                    Edit::Move { source, target } => {
                        Ok((id_for(source)?, Some(id_for(target)?)))
                    }
                    Edit::Remove(label) => Ok((id_for(label)?, None)),
                })
                .collect::<Result<Vec<_>>>()?;

            for (id, target) in resolved {
                match target {
                    Some(target) => {
                        state.reorder(&id, &target);
                    }
                    None => {
                        state.remove(&id);
                    }
                }
            }
            Ok(())
        })?
    }

    /// Merge the document collection into one PDF.
    ///
    /// The collection is not modified.
    pub async fn merge(&self) -> Result<OutputFile> {
        let _guard = self.begin()?;
        let documents = self.documents();
        self.assembler.merge(&documents, self.sink.as_ref()).await
    }

    /// Save the extracted pages, in their current order, as one PDF.
    ///
    /// The collection is not modified.
    pub async fn save_extracted(&self) -> Result<OutputFile> {
        let _guard = self.begin()?;
        let (pages, source_name) = {
            let state = self.state();
            (state.pages.snapshot(), state.source_name.clone())
        };
        self.assembler
            .save_extracted(
                &pages,
                source_name.as_deref().unwrap_or("document.pdf"),
                self.sink.as_ref(),
            )
            .await
    }

    /// Run the primary action of the current mode.
    pub async fn assemble(&self) -> Result<OutputFile> {
        match self.mode() {
            Mode::Merger => self.merge().await,
            Mode::Extractor => self.save_extracted().await,
        }
    }
}
