//! Shared storage for open documents
//!
//! The [`DocumentStore`] is handed out by clone to the notification
//! dispatcher, which mutates it as the editor opens, edits and closes files,
//! and to every feature provider that needs to read editor-visible text.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::document::DocumentId;
use crate::document::TextDocument;

/// Open documents keyed by their identifier.
///
/// Every operation, read or write, takes the same exclusive lock for its
/// whole duration, so overlapping calls are totally ordered even across
/// different documents. The lock does not poison: a reader that panics on a
/// missing document or a bad line index releases it while unwinding and later
/// callers are unaffected.
///
/// Cloning is cheap and every clone sees the same documents.
#[derive(Clone, Debug, Default)]
pub struct DocumentStore {
    inner: Arc<Mutex<HashMap<DocumentId, TextDocument>>>,
}

impl DocumentStore {
    /// Create a new empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `text` as the content of `id`, replacing anything already there.
    pub fn open(&self, id: impl Into<DocumentId>, text: &str) {
        let document = TextDocument::new(text);
        self.inner.lock().insert(id.into(), document);
    }

    /// Replace the content of `id` with `text`.
    ///
    /// Whole-document replacement: the previous content is discarded, not
    /// merged. An `id` that was never opened is opened by this call.
    pub fn change(&self, id: impl Into<DocumentId>, text: &str) {
        self.open(id, text);
    }

    /// Forget `id`. Closing a document that is not open does nothing.
    pub fn close(&self, id: &DocumentId) {
        self.inner.lock().remove(id);
    }

    #[must_use]
    pub fn exists(&self, id: &DocumentId) -> bool {
        self.inner.lock().contains_key(id)
    }

    /// Text of zero-indexed line `line` of `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not open or `line >= self.count(id)`. Callers guard
    /// with [`exists`](Self::exists) and [`count`](Self::count).
    #[must_use]
    pub fn line(&self, id: &DocumentId, line: usize) -> String {
        let documents = self.inner.lock();
        let document = expect_open(&documents, id);
        match document.get_line(line) {
            Some(text) => text.to_string(),
            None => panic!(
                "line {line} out of range for {id} ({} lines)",
                document.line_count()
            ),
        }
    }

    /// Full text of `id`, lines joined with `\n`.
    ///
    /// `\r\n` endings seen on open are not restored.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not open.
    #[must_use]
    pub fn content(&self, id: &DocumentId) -> String {
        let documents = self.inner.lock();
        expect_open(&documents, id).content()
    }

    /// Number of lines in `id`, at least one.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not open.
    #[must_use]
    pub fn count(&self, id: &DocumentId) -> usize {
        let documents = self.inner.lock();
        expect_open(&documents, id).line_count()
    }

    /// Number of lines in `id`, or `None` if it is not open.
    #[must_use]
    pub fn line_count(&self, id: &DocumentId) -> Option<usize> {
        self.inner.lock().get(id).map(TextDocument::line_count)
    }

    /// Snapshot of `id` if it is open.
    #[must_use]
    pub fn get(&self, id: &DocumentId) -> Option<TextDocument> {
        self.inner.lock().get(id).cloned()
    }

    /// Identifiers of all open documents, in no particular order.
    #[must_use]
    pub fn ids(&self) -> Vec<DocumentId> {
        self.inner.lock().keys().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

fn expect_open<'a>(
    documents: &'a HashMap<DocumentId, TextDocument>,
    id: &DocumentId,
) -> &'a TextDocument {
    match documents.get(id) {
        Some(document) => document,
        None => panic!("document is not open: {id}"),
    }
}
