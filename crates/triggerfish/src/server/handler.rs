use std::{path::PathBuf, sync::Arc};

use tower_lsp::{LanguageServer, jsonrpc::Result, lsp_types::*};
use tracing::{debug, info};

use crate::{
    completion::FILE_TRIGGER,
    server::{indexing::next_index_generation, state::TriggerfishLanguageServer},
};

#[tower_lsp::async_trait]
impl LanguageServer for TriggerfishLanguageServer {
    async fn initialize(
        &self,
        params: InitializeParams,
    ) -> Result<InitializeResult> {
        info!("Initializing triggerfish...");

        if let Some(options) = params.initialization_options.as_ref() {
            let settings = self.settings_snapshot().await.merged_with_payload(options);
            self.apply_settings(settings).await;
        }

        let root = workspace_root_from(&params);
        match &root {
            Some(root) => info!("Workspace root: {}", root.display()),
            None => info!("No workspace root provided"),
        }
        self.helper.set_workspace_root(root.clone());
        *self.workspace_root.write().await = root;

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::INCREMENTAL)),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(vec![FILE_TRIGGER.to_string()]),
                    ..Default::default()
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "triggerfish".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(
        &self,
        _: InitializedParams,
    ) {
        info!("triggerfish initialized");

        let handle = self.clone_for_background().await;
        tokio::spawn(async move {
            handle.index_workspace().await;
        });

        let helper = Arc::clone(&self.helper);
        tokio::spawn(async move {
            helper.start().await;
        });
    }

    async fn did_change_configuration(
        &self,
        params: DidChangeConfigurationParams,
    ) {
        let current = self.settings_snapshot().await;
        let merged = current.merged_with_payload(&params.settings);
        if merged == current {
            return;
        }

        let reindex = merged.indexing != current.indexing || merged.ctags != current.ctags;
        let restart_helper = merged.helper != current.helper;
        self.apply_settings(merged).await;
        info!("Applied updated triggerfish settings");

        if reindex {
            let handle = self.clone_for_background().await;
            tokio::spawn(async move {
                handle.index_workspace().await;
            });
        }

        if restart_helper {
            let helper = Arc::clone(&self.helper);
            // `start` stops the running helper first, even when now disabled.
            tokio::spawn(async move {
                helper.start().await;
            });
        }
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Shutting down triggerfish");
        self.helper.stop().await;
        Ok(())
    }

    async fn did_open(
        &self,
        params: DidOpenTextDocumentParams,
    ) {
        let uri = params.text_document.uri;
        let text = params.text_document.text;
        let version = params.text_document.version;

        info!("Opened {} (v{version}, {} bytes)", short_name(&uri), text.len());
        self.log_to_client(format!("Opened {}", short_name(&uri))).await;

        self.document_store.open(uri.clone(), text.clone(), version);
        self.schedule_reindex(&uri, Some(text)).await;
    }

    async fn did_change(
        &self,
        params: DidChangeTextDocumentParams,
    ) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;

        let text = self.document_store.apply_changes(&uri, params.content_changes, version);
        self.schedule_reindex(&uri, text).await;
    }

    async fn did_save(
        &self,
        params: DidSaveTextDocumentParams,
    ) {
        let uri = params.text_document.uri;
        debug!("Saved {}", short_name(&uri));
        self.schedule_reindex(&uri, None).await;
    }

    async fn did_close(
        &self,
        params: DidCloseTextDocumentParams,
    ) {
        // Symbols stay indexed; only the in-memory text is dropped.
        self.document_store.close(&params.text_document.uri);
    }

    async fn completion(
        &self,
        params: CompletionParams,
    ) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        let (line, character) = self.document_store.cursor_line(&uri, position).unwrap_or_default();
        let settings = self.settings_snapshot().await;
        let items = self.completion_provider.get_completions(&line, character, &settings.completion);
        debug!("completion at {}:{} -> {} item(s)", short_name(&uri), position.line, items.len());

        Ok(Some(CompletionResponse::List(CompletionList {
            is_incomplete: false,
            items,
        })))
    }
}

impl TriggerfishLanguageServer {
    /// Re-index the file behind `uri` in the background. `content` is forwarded
    /// to the helper when it is running.
    async fn schedule_reindex(
        &self,
        uri: &Url,
        content: Option<String>,
    ) {
        let Ok(path) = uri.to_file_path() else {
            debug!("Skipping index for non-file URI {uri}");
            return;
        };

        let generation = next_index_generation(&self.index_generations, &path);
        let handle = self.clone_for_background().await;
        tokio::spawn(async move {
            handle.reindex_file(path, generation, content).await;
        });
    }
}

/// First workspace folder, else the deprecated root URI.
#[allow(deprecated)]
fn workspace_root_from(params: &InitializeParams) -> Option<PathBuf> {
    if let Some(folder) = params.workspace_folders.as_ref().and_then(|folders| folders.first()) {
        return folder.uri.to_file_path().ok();
    }
    params.root_uri.as_ref().and_then(|uri| uri.to_file_path().ok())
}

fn short_name(uri: &Url) -> String {
    uri.path().rsplit('/').next().unwrap_or(uri.path()).to_owned()
}

#[cfg(test)]
#[path = "../../tests/src/server/handler_tests.rs"]
mod tests;
