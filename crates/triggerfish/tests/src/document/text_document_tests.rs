use tower_lsp::lsp_types::Range;

use super::*;

fn test_doc(text: &str) -> Document {
    Document::new(Url::parse("file:///workspace/main.py").unwrap(), text.to_string(), 1)
}

fn ranged(
    start: (u32, u32),
    end: (u32, u32),
    text: &str,
) -> TextDocumentContentChangeEvent {
    TextDocumentContentChangeEvent {
        range: Some(Range::new(Position::new(start.0, start.1), Position::new(end.0, end.1))),
        range_length: None,
        text: text.to_string(),
    }
}

#[test]
fn line_offsets_empty() {
    let doc = test_doc("");
    assert_eq!(doc.line_count(), 1);
    assert_eq!(doc.line_text(0), Some(""));
    assert_eq!(doc.line_text(1), None);
}

#[test]
fn line_text_strips_terminators() {
    let doc = test_doc("import os\r\nfrom utils import x\n");
    assert_eq!(doc.line_count(), 3);
    assert_eq!(doc.line_text(0), Some("import os"));
    assert_eq!(doc.line_text(1), Some("from utils import x"));
    assert_eq!(doc.line_text(2), Some(""));
}

#[test]
fn offset_of_second_line() {
    let doc = test_doc("def f():\n    pass\n");
    assert_eq!(doc.offset_of(Position::new(1, 0)), Some(9));
    assert_eq!(doc.offset_of(Position::new(1, 4)), Some(13));
    assert_eq!(doc.offset_of(Position::new(9, 0)), None);
}

#[test]
fn offset_of_clamps_to_line_end() {
    let doc = test_doc("ab\ncd");
    assert_eq!(doc.offset_of(Position::new(0, 50)), Some(2));
    assert_eq!(doc.offset_of(Position::new(1, 50)), Some(5));
}

#[test]
fn cursor_line_converts_utf16_columns() {
    let doc = test_doc("# \u{1F600} see @uti\n");
    let (line, character) = doc.cursor_line(Position::new(0, 13)).unwrap();
    assert_eq!(line, "# \u{1F600} see @uti");
    assert_eq!(character, 12);
}

#[test]
fn incremental_change() {
    let mut doc = test_doc("hello world");
    doc.apply_changes(vec![ranged((0, 6), (0, 11), "there")], 2);
    assert_eq!(doc.text, "hello there");
    assert_eq!(doc.version, 2);
}

#[test]
fn multiline_changes_apply_in_order() {
    let mut doc = test_doc("a\nb\nc\n");
    doc.apply_changes(vec![ranged((1, 0), (2, 0), ""), ranged((0, 1), (0, 1), "@utils")], 3);
    assert_eq!(doc.text, "a@utils\nc\n");
    assert_eq!(doc.line_count(), 3);
    assert_eq!(doc.line_text(1), Some("c"));
}

#[test]
fn full_change_replaces_text() {
    let mut doc = test_doc("old");
    doc.apply_changes(
        vec![TextDocumentContentChangeEvent {
            range: None,
            range_length: None,
            text: "new\ntext".to_string(),
        }],
        5,
    );
    assert_eq!(doc.text, "new\ntext");
    assert_eq!(doc.line_count(), 2);
}
