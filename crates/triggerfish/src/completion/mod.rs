mod provider;
mod query;

pub use provider::CompletionProvider;
pub use query::{FILE_TRIGGER, char_offset_from_utf16, parse_query, should_trigger};
