//! Trigger detection for `@` completions.
//!
//! Cursor positions here are character (Unicode scalar) offsets into the line.
//! Offsets past the end of the line are clamped to the line length.

pub const FILE_TRIGGER: char = '@';

/// `true` when a trigger character appears anywhere before the cursor.
pub fn should_trigger(
    line: &str,
    character: usize,
) -> bool {
    before_cursor(line, character).contains(FILE_TRIGGER)
}

/// Extract the query typed after the rightmost trigger before the cursor.
///
/// Returns `None` when there is no trigger or when the text between the
/// trigger and the cursor contains whitespace. `Some("")` means the cursor sits
/// right after the trigger and everything should match.
pub fn parse_query(
    line: &str,
    character: usize,
) -> Option<&str> {
    let prefix = before_cursor(line, character);
    let trigger_index = prefix.rfind(FILE_TRIGGER)?;
    let query = &prefix[trigger_index + FILE_TRIGGER.len_utf8()..];
    if query.chars().any(char::is_whitespace) {
        return None;
    }
    Some(query)
}

fn before_cursor(
    line: &str,
    character: usize,
) -> &str {
    match line.char_indices().nth(character) {
        Some((byte_index, _)) => &line[..byte_index],
        None => line,
    }
}

/// Convert an LSP UTF-16 column into a character offset within `line`.
pub fn char_offset_from_utf16(
    line: &str,
    utf16_column: u32,
) -> usize {
    let mut utf16_offset = 0u32;
    let mut char_offset = 0usize;
    for ch in line.chars() {
        if utf16_offset >= utf16_column {
            break;
        }
        utf16_offset += ch.len_utf16() as u32;
        char_offset += 1;
    }
    char_offset
}

#[cfg(test)]
#[path = "../../tests/src/completion/query_tests.rs"]
mod tests;
