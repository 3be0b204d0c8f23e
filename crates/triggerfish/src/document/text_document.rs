use tower_lsp::lsp_types::{Position, TextDocumentContentChangeEvent, Url};

use crate::completion::char_offset_from_utf16;

/// Snapshot of a single open text document.
#[derive(Debug, Clone)]
pub struct Document {
    pub uri: Url,
    /// Full source text, kept current through incremental edits.
    pub text: String,
    pub version: i32,
    /// Byte offset where each line starts.
    line_offsets: Vec<usize>,
}

impl Document {
    pub fn new(
        uri: Url,
        text: String,
        version: i32,
    ) -> Self {
        let line_offsets = compute_line_offsets(&text);
        Self {
            uri,
            text,
            version,
            line_offsets,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_offsets.len()
    }

    /// Text of a 0-based line without its line terminator.
    pub fn line_text(
        &self,
        line: usize,
    ) -> Option<&str> {
        let start = *self.line_offsets.get(line)?;
        let end = self.line_offsets.get(line + 1).copied().unwrap_or(self.text.len());
        let slice = &self.text[start..end];
        Some(slice.trim_end_matches('\n').trim_end_matches('\r'))
    }

    /// The line under `pos` and the cursor's character offset within it.
    pub fn cursor_line(
        &self,
        pos: Position,
    ) -> Option<(&str, usize)> {
        let line = self.line_text(pos.line as usize)?;
        Some((line, char_offset_from_utf16(line, pos.character)))
    }

    /// Byte offset of an LSP position (UTF-16 columns), clamped to its line.
    pub fn offset_of(
        &self,
        pos: Position,
    ) -> Option<usize> {
        let line = pos.line as usize;
        let line_start = *self.line_offsets.get(line)?;
        let line_end = self.line_offsets.get(line + 1).copied().unwrap_or(self.text.len());

        let mut utf16_offset: u32 = 0;
        let mut byte_offset = line_start;
        for ch in self.text[line_start..line_end].chars() {
            if utf16_offset >= pos.character || ch == '\n' {
                break;
            }
            utf16_offset += ch.len_utf16() as u32;
            byte_offset += ch.len_utf8();
        }
        Some(byte_offset)
    }

    /// Apply ranged edits in order; a change without a range replaces everything.
    pub fn apply_changes(
        &mut self,
        changes: Vec<TextDocumentContentChangeEvent>,
        version: i32,
    ) {
        for change in changes {
            match change.range {
                Some(range) => {
                    if let (Some(start), Some(end)) = (self.offset_of(range.start), self.offset_of(range.end))
                        && start <= end
                    {
                        self.text.replace_range(start..end, &change.text);
                    }
                },
                None => self.text = change.text,
            }
            self.line_offsets = compute_line_offsets(&self.text);
        }
        self.version = version;
    }
}

fn compute_line_offsets(text: &str) -> Vec<usize> {
    let mut offsets = vec![0usize];
    offsets.extend(text.bytes().enumerate().filter(|(_, byte)| *byte == b'\n').map(|(i, _)| i + 1));
    offsets
}

#[cfg(test)]
#[path = "../../tests/src/document/text_document_tests.rs"]
mod tests;
