pub(crate) mod fuzzy;
mod index;
mod tags;
mod types;

pub use fuzzy::MAX_SCORE;
pub use index::{IndexStats, ScoredSymbol, SymbolIndex};
pub use tags::{TagRecord, file_display_name, symbols_from_tags};
pub use types::{Symbol, SymbolKind};
