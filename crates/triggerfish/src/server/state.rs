use std::{
    panic::AssertUnwindSafe,
    path::PathBuf,
    sync::{Arc, RwLock as StdRwLock},
};

use dashmap::DashMap;
use futures::FutureExt;
use tokio::sync::RwLock;
use tower_lsp::{Client, lsp_types::MessageType};
use tracing::warn;

use crate::{
    completion::CompletionProvider, config::ServerSettings, ctags::CtagsRunner, document::DocumentStore,
    helper::HelperProcess, server::indexing::IndexingHandle, symbols::SymbolIndex,
};

const CLIENT_NOTIFICATION_PREFIX: &str = "triggerfish:";

/// The triggerfish backend that implements the Language Server Protocol.
pub struct TriggerfishLanguageServer {
    pub(crate) client: Client,

    /// Symbols for every indexed file, shared with background indexing tasks.
    pub(crate) index: Arc<SymbolIndex>,

    pub(crate) completion_provider: CompletionProvider,

    pub(crate) document_store: Arc<DocumentStore>,

    /// Rebuilt whenever the ctags settings change.
    pub(crate) ctags: StdRwLock<Arc<CtagsRunner>>,

    pub(crate) helper: Arc<HelperProcess>,

    /// Populated during `initialize`.
    pub(crate) workspace_root: RwLock<Option<PathBuf>>,

    /// Per-file generation of single-file re-index requests.
    ///
    /// Only the newest extraction for a file may replace its symbols, so a slow
    /// ctags run cannot overwrite the result of a later one.
    pub(crate) index_generations: Arc<DashMap<PathBuf, u64>>,

    pub(crate) settings: Arc<RwLock<ServerSettings>>,
}

impl TriggerfishLanguageServer {
    pub fn new(
        client: Client,
        settings: ServerSettings,
    ) -> Self {
        let index = Arc::new(SymbolIndex::new());
        let completion_provider = CompletionProvider::new(Arc::clone(&index));
        let ctags = Arc::new(CtagsRunner::new(settings.ctags.executable.clone(), settings.ctags.timeout()));
        let helper = Arc::new(HelperProcess::new(settings.helper.clone()));

        Self {
            client,
            index,
            completion_provider,
            document_store: Arc::new(DocumentStore::new()),
            ctags: StdRwLock::new(ctags),
            helper,
            workspace_root: RwLock::new(None),
            index_generations: Arc::new(DashMap::new()),
            settings: Arc::new(RwLock::new(settings)),
        }
    }

    pub(crate) async fn settings_snapshot(&self) -> ServerSettings {
        self.settings.read().await.clone()
    }

    pub(crate) async fn apply_settings(
        &self,
        settings: ServerSettings,
    ) {
        let runner = CtagsRunner::new(settings.ctags.executable.clone(), settings.ctags.timeout());
        *self.ctags.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = Arc::new(runner);
        self.helper.set_settings(settings.helper.clone());

        *self.settings.write().await = settings;
    }

    pub(crate) fn ctags_runner(&self) -> Arc<CtagsRunner> {
        Arc::clone(&self.ctags.read().unwrap_or_else(|poisoned| poisoned.into_inner()))
    }

    pub(crate) async fn workspace_root(&self) -> Option<PathBuf> {
        self.workspace_root.read().await.clone()
    }

    /// Create a lightweight handle suitable for passing into `tokio::spawn`.
    pub(crate) async fn clone_for_background(&self) -> IndexingHandle {
        IndexingHandle {
            client: self.client.clone(),
            index: Arc::clone(&self.index),
            ctags: self.ctags_runner(),
            helper: Arc::clone(&self.helper),
            workspace_root: self.workspace_root().await,
            index_generations: Arc::clone(&self.index_generations),
            settings: self.settings_snapshot().await,
        }
    }

    /// Send an info-level `window/logMessage`, unless the configured level is quieter.
    pub(crate) async fn log_to_client(
        &self,
        message: impl AsRef<str>,
    ) {
        if !self.settings.read().await.logging.level.allows_info() {
            return;
        }
        log_to_client(&self.client, message).await;
    }
}

pub(crate) async fn log_to_client(
    client: &Client,
    message: impl AsRef<str>,
) {
    let result =
        AssertUnwindSafe(client.log_message(MessageType::INFO, prefixed_client_message(message))).catch_unwind().await;
    if result.is_err() {
        warn!("log_message panicked (client may have disconnected)");
    }
}

pub(crate) fn prefixed_client_message(message: impl AsRef<str>) -> String {
    format!("{CLIENT_NOTIFICATION_PREFIX} {}", message.as_ref())
}
