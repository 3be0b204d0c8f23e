use std::sync::Arc;

use tower_lsp::lsp_types::{CompletionItem, CompletionItemKind};
use tracing::debug;

use crate::{
    completion::query::parse_query,
    config::CompletionSettings,
    symbols::{MAX_SCORE, ScoredSymbol, Symbol, SymbolIndex, SymbolKind},
};

/// Builds `@` file completions from the shared symbol index.
#[derive(Clone)]
pub struct CompletionProvider {
    index: Arc<SymbolIndex>,
}

impl CompletionProvider {
    pub fn new(index: Arc<SymbolIndex>) -> Self {
        Self {
            index,
        }
    }

    /// Completion items for the cursor at `character` (a character offset) in `line`.
    ///
    /// An empty query lists the first `max_items` file symbols in index order;
    /// a non-empty query is ranked with the fuzzy matcher.
    pub fn get_completions(
        &self,
        line: &str,
        character: usize,
        settings: &CompletionSettings,
    ) -> Vec<CompletionItem> {
        let Some(query) = parse_query(line, character) else {
            return Vec::new();
        };

        let matches = if query.is_empty() {
            self.index
                .get_symbols(Some(SymbolKind::File))
                .into_iter()
                .take(settings.max_items)
                .map(|symbol| ScoredSymbol {
                    symbol,
                    score: 0.0,
                })
                .collect::<Vec<_>>()
        } else {
            self.index.fuzzy_search(
                query,
                Some(SymbolKind::File),
                settings.max_items,
                f64::from(settings.min_fuzzy_score),
            )
        };

        debug!("completion query {query:?} -> {} item(s)", matches.len());
        matches.iter().map(|hit| completion_item(&hit.symbol, hit.score)).collect()
    }
}

fn completion_item(
    symbol: &Symbol,
    score: f64,
) -> CompletionItem {
    CompletionItem {
        label: symbol.name().to_string(),
        kind: Some(CompletionItemKind::FILE),
        detail: Some(format!("file at {}:{}", symbol.file_path().display(), symbol.line())),
        sort_text: Some(sort_text(score)),
        insert_text: Some(symbol.name().to_string()),
        ..Default::default()
    }
}

/// Zero-padded `100 - round(score)`, so better matches sort first lexicographically.
pub(crate) fn sort_text(score: f64) -> String {
    let rank = (MAX_SCORE - score.clamp(0.0, MAX_SCORE).round()) as u32;
    format!("{rank:03}")
}

#[cfg(test)]
#[path = "../../tests/src/completion/provider_tests.rs"]
mod tests;
