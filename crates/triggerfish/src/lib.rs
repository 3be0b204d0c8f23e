pub mod completion;
pub mod config;
pub mod ctags;
pub mod document;
pub mod helper;
pub mod progress;
pub mod server;
pub mod symbols;

pub use completion::CompletionProvider;
pub use config::ServerSettings;
pub use ctags::{CtagsError, CtagsRunner};
pub use helper::{HelperChannel, HelperProcess};
pub use server::TriggerfishLanguageServer;
pub use symbols::{ScoredSymbol, Symbol, SymbolIndex, SymbolKind, TagRecord};
