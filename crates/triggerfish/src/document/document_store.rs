use dashmap::DashMap;
use tower_lsp::lsp_types::{Position, TextDocumentContentChangeEvent, Url};

use super::Document;

/// Open documents keyed by URI, safe to share across handler tasks.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: DashMap<Url, Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(
        &self,
        uri: Url,
        text: String,
        version: i32,
    ) {
        self.documents.insert(uri.clone(), Document::new(uri, text, version));
    }

    /// Apply edits to a tracked document and return its new text.
    ///
    /// An untracked document is only recoverable from a full-content change.
    pub fn apply_changes(
        &self,
        uri: &Url,
        changes: Vec<TextDocumentContentChangeEvent>,
        version: i32,
    ) -> Option<String> {
        if let Some(mut doc) = self.documents.get_mut(uri) {
            doc.apply_changes(changes, version);
            return Some(doc.text.clone());
        }

        let text = changes.into_iter().rev().find(|change| change.range.is_none())?.text;
        self.open(uri.clone(), text.clone(), version);
        Some(text)
    }

    pub fn close(
        &self,
        uri: &Url,
    ) {
        self.documents.remove(uri);
    }

    pub fn get_content(
        &self,
        uri: &Url,
    ) -> Option<String> {
        self.documents.get(uri).map(|r| r.value().text.clone())
    }

    /// Line text and character offset for a completion request at `pos`.
    pub fn cursor_line(
        &self,
        uri: &Url,
        pos: Position,
    ) -> Option<(String, usize)> {
        let doc = self.documents.get(uri)?;
        doc.cursor_line(pos).map(|(line, character)| (line.to_string(), character))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/src/document/document_store_tests.rs"]
mod tests;
