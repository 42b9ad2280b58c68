//
// state.rs
//
// Shared server state: open documents, workspace folders and the current
// configuration snapshot
//

use std::collections::HashMap;
use std::sync::Arc;

use ropey::Rope;
use tower_lsp::lsp_types::TextDocumentContentChangeEvent;
use tower_lsp::lsp_types::Url;

use crate::config::Config;

/// An open document.
pub struct Document {
    pub contents: Rope,
    pub version: Option<i32>,
}

impl Document {
    pub fn new(text: &str, version: Option<i32>) -> Self {
        Self {
            contents: Rope::from_str(text),
            version,
        }
    }

    pub fn apply_change(&mut self, change: TextDocumentContentChangeEvent) {
        if let Some(range) = change.range {
            let start_line = range.start.line as usize;
            let end_line = range.end.line as usize;
            if start_line >= self.contents.len_lines() || end_line >= self.contents.len_lines() {
                log::warn!("Change range outside document, applying as full sync");
                self.contents = Rope::from_str(&change.text);
                return;
            }

            let start_line_text = self.contents.line(start_line).to_string();
            let end_line_text = self.contents.line(end_line).to_string();

            let start_char =
                utf16_offset_to_char_offset(&start_line_text, range.start.character as usize);
            let end_char =
                utf16_offset_to_char_offset(&end_line_text, range.end.character as usize);

            let start_idx = self.contents.line_to_char(start_line) + start_char;
            let end_idx = self.contents.line_to_char(end_line) + end_char;

            self.contents.remove(start_idx..end_idx);
            self.contents.insert(start_idx, &change.text);
        } else {
            // Full document sync
            self.contents = Rope::from_str(&change.text);
        }
    }

    /// The text of a single line without its line terminator.
    pub fn line_text(&self, line: usize) -> Option<String> {
        if line >= self.contents.len_lines() {
            return None;
        }
        let text = self.contents.line(line).to_string();
        Some(text.trim_end_matches(['\n', '\r']).to_string())
    }

    pub fn text(&self) -> String {
        self.contents.to_string()
    }
}

fn utf16_offset_to_char_offset(line_text: &str, utf16_offset: usize) -> usize {
    let mut utf16_count = 0;
    let mut char_count = 0;

    for ch in line_text.chars() {
        if utf16_count >= utf16_offset {
            return char_count;
        }
        utf16_count += ch.len_utf16();
        char_count += 1;
    }
    char_count
}

/// World state shared across LSP handlers. The configuration is swapped as a
/// whole Arc so requests keep a consistent snapshot after cloning it once.
pub struct WorldState {
    pub documents: HashMap<Url, Document>,
    pub workspace_folders: Vec<Url>,
    pub config: Arc<Config>,
}

impl WorldState {
    pub fn new() -> Self {
        Self {
            documents: HashMap::new(),
            workspace_folders: Vec::new(),
            config: Arc::new(Config::default()),
        }
    }

    /// The first workspace folder as a filesystem path, if any.
    pub fn workspace_root(&self) -> Option<std::path::PathBuf> {
        self.workspace_folders
            .first()
            .and_then(|uri| uri.to_file_path().ok())
    }
}

impl Default for WorldState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_lsp::lsp_types::{Position, Range};

    #[test]
    fn test_full_sync_replaces_contents() {
        let mut doc = Document::new("old text", Some(1));
        doc.apply_change(TextDocumentContentChangeEvent {
            range: None,
            range_length: None,
            text: String::from("new text"),
        });
        assert_eq!(doc.text(), "new text");
    }

    #[test]
    fn test_incremental_insert() {
        let mut doc = Document::new("import ''\n", Some(1));
        doc.apply_change(TextDocumentContentChangeEvent {
            range: Some(Range {
                start: Position { line: 0, character: 8 },
                end: Position { line: 0, character: 8 },
            }),
            range_length: None,
            text: String::from("./src/"),
        });
        assert_eq!(doc.line_text(0).unwrap(), "import './src/'");
    }

    #[test]
    fn test_incremental_delete_across_lines() {
        let mut doc = Document::new("abc\ndef\n", Some(1));
        doc.apply_change(TextDocumentContentChangeEvent {
            range: Some(Range {
                start: Position { line: 0, character: 2 },
                end: Position { line: 1, character: 1 },
            }),
            range_length: None,
            text: String::new(),
        });
        assert_eq!(doc.text(), "abef\n");
    }

    #[test]
    fn test_line_text_strips_terminator() {
        let doc = Document::new("one\r\ntwo\n", None);
        assert_eq!(doc.line_text(0).unwrap(), "one");
        assert_eq!(doc.line_text(1).unwrap(), "two");
        assert_eq!(doc.line_text(5), None);
    }
}
