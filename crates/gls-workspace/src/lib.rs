//! In-memory state of the documents the editor has open.
//!
//! The [`DocumentStore`] is the single authority on "what the user currently
//! sees": the notification dispatcher writes into it on `didOpen`,
//! `didChange` and `didClose`, and feature providers read lines and content
//! back out of it.

mod document;
mod store;

pub use document::DocumentId;
pub use document::TextDocument;
pub use store::DocumentStore;
