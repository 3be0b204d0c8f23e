use tower_lsp::lsp_types::Range;

use super::*;

fn uri() -> Url {
    Url::parse("file:///workspace/main.py").unwrap()
}

#[test]
fn store_open_get_content_close() {
    let store = DocumentStore::new();
    store.open(uri(), "import utils".to_string(), 1);

    assert_eq!(store.get_content(&uri()), Some("import utils".to_string()));
    assert_eq!(store.len(), 1);

    store.close(&uri());
    assert!(store.get_content(&uri()).is_none());
    assert!(store.is_empty());
}

#[test]
fn apply_changes_returns_new_text() {
    let store = DocumentStore::new();
    store.open(uri(), "see @ut".to_string(), 1);

    let text = store.apply_changes(
        &uri(),
        vec![TextDocumentContentChangeEvent {
            range: Some(Range::new(Position::new(0, 7), Position::new(0, 7))),
            range_length: None,
            text: "ils".to_string(),
        }],
        2,
    );
    assert_eq!(text.as_deref(), Some("see @utils"));
}

#[test]
fn untracked_document_needs_full_content() {
    let store = DocumentStore::new();
    let ranged_only = vec![TextDocumentContentChangeEvent {
        range: Some(Range::new(Position::new(0, 0), Position::new(0, 0))),
        range_length: None,
        text: "x".to_string(),
    }];
    assert_eq!(store.apply_changes(&uri(), ranged_only, 1), None);
    assert!(store.is_empty());

    let full = vec![TextDocumentContentChangeEvent {
        range: None,
        range_length: None,
        text: "content".to_string(),
    }];
    assert_eq!(store.apply_changes(&uri(), full, 2).as_deref(), Some("content"));
    assert_eq!(store.get_content(&uri()).as_deref(), Some("content"));
}

#[test]
fn cursor_line_for_completion() {
    let store = DocumentStore::new();
    store.open(uri(), "import os\nopen @utils\n".to_string(), 1);

    assert_eq!(store.cursor_line(&uri(), Position::new(1, 11)), Some(("open @utils".to_string(), 11)));
    assert_eq!(store.cursor_line(&uri(), Position::new(7, 0)), None);
    assert_eq!(store.cursor_line(&Url::parse("file:///other.py").unwrap(), Position::new(0, 0)), None);
}
