//! Document identity and line-split content.

use std::fmt;

use tower_lsp_server::ls_types::Uri;

/// Client-supplied name of an open document, usually a URI.
///
/// Compared by exact string equality. No case folding, percent-decoding or
/// path resolution happens here, so `file:///A.txt` and `file:///a.txt` are
/// two different documents.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(String);

impl DocumentId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&Uri> for DocumentId {
    fn from(uri: &Uri) -> Self {
        Self(uri.as_str().to_string())
    }
}

impl From<Uri> for DocumentId {
    fn from(uri: Uri) -> Self {
        Self::from(&uri)
    }
}

/// Content of an open document, held as its lines.
///
/// `\r\n` is folded to `\n` before splitting and the split keeps empty
/// segments, so an empty text is a single empty line and a trailing newline
/// produces a trailing empty line. Joining the lines back with `\n` gives the
/// normalized text exactly.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextDocument {
    lines: Vec<String>,
}

impl TextDocument {
    #[must_use]
    pub fn new(text: &str) -> Self {
        let normalized = text.replace("\r\n", "\n");
        let lines = normalized.split('\n').map(str::to_string).collect();
        Self { lines }
    }

    /// Text of line `line`, or `None` past the last line.
    #[must_use]
    pub fn get_line(&self, line: usize) -> Option<&str> {
        self.lines.get(line).map(String::as_str)
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of lines, never less than one.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// The whole document, lines joined with `\n`.
    #[must_use]
    pub fn content(&self) -> String {
        self.lines.join("\n")
    }
}
