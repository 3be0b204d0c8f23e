use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use dashmap::{DashMap, mapref::entry::Entry};
use tower_lsp::Client;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::{
    config::{IndexingSettings, ServerSettings},
    ctags::CtagsRunner,
    helper::HelperProcess,
    progress::{ProgressToken, percentage},
    server::state::log_to_client,
    symbols::{Symbol, SymbolIndex, file_display_name, symbols_from_tags},
};

/// Files reported between two `$/progress` updates.
const PROGRESS_REPORT_EVERY: usize = 5;

static NEXT_INDEX_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Run ctags on `path` and build its symbols.
///
/// Extraction failures are logged and yield just the synthetic file symbol.
pub async fn extract_file_symbols(
    ctags: &CtagsRunner,
    workspace_root: Option<&Path>,
    path: &Path,
) -> Vec<Symbol> {
    let tags = match ctags.generate_tags(path, None).await {
        Ok(tags) => tags,
        Err(err) => {
            warn!("ctags failed for {}: {err}", path.display());
            Vec::new()
        },
    };
    symbols_from_tags(path, &file_display_name(workspace_root, path), &tags)
}

/// Re-index one file, replacing whatever the index held for it. Returns the
/// number of symbols stored.
pub async fn index_file(
    index: &SymbolIndex,
    ctags: &CtagsRunner,
    workspace_root: Option<&Path>,
    path: &Path,
) -> usize {
    let symbols = extract_file_symbols(ctags, workspace_root, path).await;
    let count = symbols.len();
    index.update_file(path, symbols);
    count
}

/// Files under `root` with one of the configured extensions, in a stable order.
///
/// Hidden directories, common build output directories and `excludePaths`
/// (absolute, or relative to `root`) are skipped.
pub fn discover_workspace_files(
    root: &Path,
    settings: &IndexingSettings,
) -> Vec<PathBuf> {
    let excluded_prefixes = build_exclude_prefixes(root, &settings.exclude_paths);
    let mut seen = HashSet::new();

    WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| should_descend_into_workspace_entry(entry, &excluded_prefixes))
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(DirEntry::into_path)
        .filter(|path| settings.matches_extension(path))
        .filter(|path| seen.insert(path.clone()))
        .collect()
}

fn should_descend_into_workspace_entry(
    entry: &DirEntry,
    excluded_prefixes: &[PathBuf],
) -> bool {
    if excluded_prefixes.iter().any(|prefix| entry.path().starts_with(prefix)) {
        return false;
    }

    // The root itself may be hidden (e.g. a temp dir); only prune below it.
    if !entry.file_type().is_dir() || entry.depth() == 0 {
        return true;
    }

    let Some(name) = entry.file_name().to_str() else {
        return false;
    };

    if name.starts_with('.') {
        return false;
    }

    !matches!(
        name,
        "target" | "build" | "dist" | "node_modules" | "__pycache__" | "venv" | "site-packages" | "out"
    )
}

fn build_exclude_prefixes(
    root: &Path,
    exclude_paths: &[String],
) -> Vec<PathBuf> {
    exclude_paths
        .iter()
        .map(PathBuf::from)
        .map(|path| if path.is_absolute() { path } else { root.join(path) })
        .collect()
}

/// Owned state for indexing work spawned off the LSP handlers.
pub(crate) struct IndexingHandle {
    pub(crate) client: Client,
    pub(crate) index: Arc<SymbolIndex>,
    pub(crate) ctags: Arc<CtagsRunner>,
    pub(crate) helper: Arc<HelperProcess>,
    pub(crate) workspace_root: Option<PathBuf>,
    pub(crate) index_generations: Arc<DashMap<PathBuf, u64>>,
    pub(crate) settings: ServerSettings,
}

impl IndexingHandle {
    /// Index every matching file under the workspace root, one file at a time.
    pub(crate) async fn index_workspace(&self) {
        let Some(root) = self.workspace_root.as_deref() else {
            info!("No workspace root; skipping workspace indexing");
            return;
        };

        let files = discover_workspace_files(root, &self.settings.indexing);
        let total = files.len();
        if total == 0 {
            info!("No indexable files found under {}", root.display());
            return;
        }

        info!("Indexing {total} file(s) under {}", root.display());
        let progress = ProgressToken::begin(&self.client, "Indexing", Some(format!("0 / {total} files"))).await;

        for (done, path) in files.iter().enumerate().map(|(i, path)| (i + 1, path)) {
            let generation = next_index_generation(&self.index_generations, path);
            let committed = index_file_at_generation(
                &self.index,
                &self.ctags,
                &self.index_generations,
                Some(root),
                path,
                generation,
            )
            .await;
            match committed {
                Some(count) => debug!("indexed {} ({count} symbol(s))", path.display()),
                None => debug!("skipped {}: a newer re-index owns it", path.display()),
            }
            if done % PROGRESS_REPORT_EVERY == 0 || done == total {
                progress.report(Some(format!("{done} / {total} files")), Some(percentage(done, total))).await;
            }
        }

        let stats = self.index.stats();
        info!("Indexed workspace: {stats}");
        if self.settings.logging.level.allows_info() {
            log_to_client(&self.client, format!("Indexed {total} file(s): {stats}")).await;
        }
        progress.end(Some(format!("{total} file(s) indexed"))).await;
    }

    /// Re-index one file after an editor event and forward `content` to the helper.
    ///
    /// `generation` must come from [`next_index_generation`]; a stale result is dropped.
    pub(crate) async fn reindex_file(
        &self,
        path: PathBuf,
        generation: u64,
        content: Option<String>,
    ) {
        let committed = index_file_at_generation(
            &self.index,
            &self.ctags,
            &self.index_generations,
            self.workspace_root.as_deref(),
            &path,
            generation,
        )
        .await;
        if committed.is_none() {
            debug!("dropping stale index result for {}", path.display());
        }

        if let Some(content) = content
            && self.helper.is_available()
        {
            self.helper.index_file(&path, &content).await;
        }
    }
}

/// Register a new index request for `path` and return its generation.
///
/// Generations come from one process-wide counter, so a value is never reused
/// for a path even after its entry has been pruned.
pub(crate) fn next_index_generation(
    generations: &DashMap<PathBuf, u64>,
    path: &Path,
) -> u64 {
    let generation = NEXT_INDEX_GENERATION.fetch_add(1, Ordering::Relaxed);
    generations
        .entry(path.to_path_buf())
        .and_modify(|current| *current = (*current).max(generation))
        .or_insert(generation);
    generation
}

/// Store `symbols` for `path` only if `generation` is still its newest request.
///
/// The map entry is held across the write and removed once committed, so the
/// map only tracks files with index work in flight.
pub(crate) fn commit_if_latest(
    index: &SymbolIndex,
    generations: &DashMap<PathBuf, u64>,
    path: &Path,
    generation: u64,
    symbols: Vec<Symbol>,
) -> bool {
    match generations.entry(path.to_path_buf()) {
        Entry::Occupied(entry) if *entry.get() == generation => {
            index.update_file(path, symbols);
            entry.remove();
            true
        },
        _ => false,
    }
}

/// Extract `path` and commit it under `generation`. `None` when a newer request won.
pub(crate) async fn index_file_at_generation(
    index: &SymbolIndex,
    ctags: &CtagsRunner,
    generations: &DashMap<PathBuf, u64>,
    workspace_root: Option<&Path>,
    path: &Path,
    generation: u64,
) -> Option<usize> {
    let symbols = extract_file_symbols(ctags, workspace_root, path).await;
    let count = symbols.len();
    commit_if_latest(index, generations, path, generation, symbols).then_some(count)
}

#[cfg(test)]
#[path = "../../tests/src/server/indexing_tests.rs"]
mod tests;
