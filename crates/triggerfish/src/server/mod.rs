pub(crate) mod handler;
pub(crate) mod indexing;
pub(crate) mod state;

pub use indexing::{discover_workspace_files, extract_file_symbols, index_file};
pub use state::TriggerfishLanguageServer;
