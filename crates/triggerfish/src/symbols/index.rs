use std::{
    collections::{BTreeMap, HashMap},
    fmt::{Display, Formatter},
    path::{Path, PathBuf},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::symbols::{
    fuzzy::FuzzyScorer,
    types::{Symbol, SymbolKind},
};

/// A search hit paired with its similarity score in `0.0..=100.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSymbol {
    pub symbol: Symbol,
    pub score: f64,
}

/// Aggregate counts reported by [`SymbolIndex::stats`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub total: usize,
    /// Only kinds with at least one symbol appear here.
    pub by_kind: BTreeMap<SymbolKind, usize>,
}

impl IndexStats {
    pub fn count(
        &self,
        kind: SymbolKind,
    ) -> usize {
        self.by_kind.get(&kind).copied().unwrap_or(0)
    }
}

impl Display for IndexStats {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "total={}", self.total)?;
        for (kind, count) in &self.by_kind {
            write!(f, " {kind}={count}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct IndexState {
    /// Every symbol, in insertion order.
    symbols: Vec<Arc<Symbol>>,
    by_file: HashMap<PathBuf, Vec<Arc<Symbol>>>,
    by_kind: BTreeMap<SymbolKind, Vec<Arc<Symbol>>>,
}

impl IndexState {
    fn add(
        &mut self,
        symbols: impl IntoIterator<Item = Symbol>,
    ) {
        for symbol in symbols {
            let symbol = Arc::new(symbol);
            self.by_file.entry(symbol.file_path().to_path_buf()).or_default().push(Arc::clone(&symbol));
            self.by_kind.entry(symbol.kind()).or_default().push(Arc::clone(&symbol));
            self.symbols.push(symbol);
        }
    }

    fn clear(
        &mut self,
        file_path: &Path,
    ) {
        let Some(removed) = self.by_file.remove(file_path) else {
            return;
        };
        if removed.is_empty() {
            return;
        }

        self.symbols.retain(|symbol| symbol.file_path() != file_path);
        self.by_kind.retain(|_, bucket| {
            bucket.retain(|symbol| symbol.file_path() != file_path);
            !bucket.is_empty()
        });
    }

    fn candidates(
        &self,
        kind: Option<SymbolKind>,
    ) -> Vec<Arc<Symbol>> {
        match kind {
            None => self.symbols.clone(),
            Some(kind) => self.by_kind.get(&kind).cloned().unwrap_or_default(),
        }
    }
}

/// In-memory symbol store with per-file replacement and fuzzy lookup.
///
/// The primary list and both derived buckets sit behind one lock, so every
/// mutation is observed either entirely or not at all.
#[derive(Debug, Default)]
pub struct SymbolIndex {
    state: RwLock<IndexState>,
}

impl SymbolIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_symbols(
        &self,
        symbols: impl IntoIterator<Item = Symbol>,
    ) {
        self.write().add(symbols);
    }

    /// Remove every symbol owned by `file_path`. Unknown files are a no-op.
    pub fn clear_file(
        &self,
        file_path: &Path,
    ) {
        self.write().clear(file_path);
    }

    /// Replace the symbols of one file in a single step.
    pub fn update_file(
        &self,
        file_path: &Path,
        symbols: impl IntoIterator<Item = Symbol>,
    ) {
        let mut state = self.write();
        state.clear(file_path);
        state.add(symbols);
    }

    /// Copy of all symbols, or of one kind, in insertion order.
    pub fn get_symbols(
        &self,
        kind: Option<SymbolKind>,
    ) -> Vec<Symbol> {
        self.read().candidates(kind).iter().map(|symbol| Symbol::clone(symbol)).collect()
    }

    pub fn symbols_in_file(
        &self,
        file_path: &Path,
    ) -> Vec<Symbol> {
        self.read()
            .by_file
            .get(file_path)
            .map(|bucket| bucket.iter().map(|symbol| Symbol::clone(symbol)).collect())
            .unwrap_or_default()
    }

    pub fn file_count(&self) -> usize {
        self.read().by_file.len()
    }

    /// Rank candidates by similarity of their display name to `query`.
    ///
    /// Keeps scores `>= min_score`, orders by descending score with ties in
    /// candidate order, and returns at most `limit` hits.
    pub fn fuzzy_search(
        &self,
        query: &str,
        kind: Option<SymbolKind>,
        limit: usize,
        min_score: f64,
    ) -> Vec<ScoredSymbol> {
        // Scoring runs outside the lock; the snapshot is a list of shared handles.
        let candidates = self.read().candidates(kind);
        if candidates.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut scorer = FuzzyScorer::new(query);
        let mut scored: Vec<(usize, f64)> = candidates
            .iter()
            .enumerate()
            .map(|(position, symbol)| (position, scorer.score(&symbol.display_name())))
            .filter(|(_, score)| *score >= min_score)
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(limit);

        scored
            .into_iter()
            .map(|(position, score)| ScoredSymbol {
                symbol: Symbol::clone(&candidates[position]),
                score,
            })
            .collect()
    }

    pub fn stats(&self) -> IndexStats {
        let state = self.read();
        IndexStats {
            total: state.symbols.len(),
            by_kind: state.by_kind.iter().map(|(kind, bucket)| (*kind, bucket.len())).collect(),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, IndexState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, IndexState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
#[path = "../../tests/src/symbols/index_tests.rs"]
mod tests;
