//! Layered server configuration.
//!
//! Settings are split into one file per category. [`ServerSettings`]
//! aggregates all categories, reads `TRIGGERFISH_*` environment overrides and
//! handles JSON deserialization from LSP initialization options and
//! `didChangeConfiguration` payloads.

pub(crate) mod completion;
pub(crate) mod ctags;
pub(crate) mod helper;
pub(crate) mod indexing;
pub(crate) mod logging;

use std::{collections::HashMap, str::FromStr};

use completion::CompletionSettingsPatch;
pub use completion::{
    CompletionSettings, DEFAULT_MAX_COMPLETION_ITEMS, DEFAULT_MIN_FUZZY_SCORE, ENV_MAX_COMPLETION_ITEMS,
    ENV_MIN_FUZZY_SCORE,
};
use ctags::CtagsSettingsPatch;
pub use ctags::{CtagsSettings, DEFAULT_CTAGS_EXECUTABLE, DEFAULT_CTAGS_TIMEOUT_SECS, ENV_CTAGS_EXECUTABLE, ENV_CTAGS_TIMEOUT};
use helper::HelperSettingsPatch;
pub use helper::{
    DEFAULT_HELPER_EXECUTABLE, ENV_HELPER_ENABLED, ENV_HELPER_EXECUTABLE, ENV_REQUEST_TIMEOUT, ENV_STARTUP_TIMEOUT,
    HelperSettings,
};
use indexing::IndexingSettingsPatch;
pub use indexing::IndexingSettings;
use logging::LoggingSettingsPatch;
pub use logging::{ENV_LOG_FILE, ENV_LOG_LEVEL, LogLevel, LoggingSettings, default_log_file};
use serde::Deserialize;
use serde_json::Value;

pub const SETTINGS_SECTION_KEY: &str = "triggerfish";

pub(crate) type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerSettings {
    pub logging: LoggingSettings,
    pub ctags: CtagsSettings,
    pub completion: CompletionSettings,
    pub helper: HelperSettings,
    pub indexing: IndexingSettings,
}

impl ServerSettings {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::from_env_source(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `TRIGGERFISH_*` key.
    ///
    /// Empty values and values that fail to parse are ignored.
    pub fn from_env_source(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut settings = Self::default();
        settings.logging.apply_env(&non_empty);
        settings.ctags.apply_env(&non_empty);
        settings.completion.apply_env(&non_empty);
        settings.helper.apply_env(&non_empty);
        settings.normalize();
        settings
    }

    pub fn from_lsp_payload(payload: Option<&Value>) -> Self {
        let mut settings = Self::default();
        if let Some(payload) = payload {
            settings = settings.merged_with_payload(payload);
        }
        settings
    }

    pub fn merged_with_payload(
        &self,
        payload: &Value,
    ) -> Self {
        let mut merged = self.clone();

        for candidate in payload_candidates(payload) {
            if let Ok(patch) = serde_json::from_value::<ServerSettingsPatch>(candidate.clone()) {
                merged.apply_patch(patch);
            }
        }

        merged.normalize();
        merged
    }

    fn apply_patch(
        &mut self,
        patch: ServerSettingsPatch,
    ) {
        if let Some(p) = patch.logging {
            self.logging.apply_patch(p);
        }
        if let Some(p) = patch.ctags {
            self.ctags.apply_patch(p);
        }
        if let Some(p) = patch.completion {
            self.completion.apply_patch(p);
        }
        if let Some(p) = patch.helper {
            self.helper.apply_patch(p);
        }
        if let Some(p) = patch.indexing {
            self.indexing.apply_patch(p);
        }
    }

    fn normalize(&mut self) {
        self.logging.normalize();
        self.ctags.normalize();
        self.completion.normalize();
        self.helper.normalize();
        self.indexing.normalize();
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct ServerSettingsPatch {
    logging: Option<LoggingSettingsPatch>,
    ctags: Option<CtagsSettingsPatch>,
    completion: Option<CompletionSettingsPatch>,
    #[serde(rename = "core")]
    helper: Option<HelperSettingsPatch>,
    indexing: Option<IndexingSettingsPatch>,
    #[serde(flatten)]
    _extra: HashMap<String, Value>,
}

fn payload_candidates(payload: &Value) -> Vec<Value> {
    let mut candidates = Vec::new();
    candidates.push(payload.clone());
    if let Some(scoped) = payload.get(SETTINGS_SECTION_KEY) {
        candidates.push(scoped.clone());
    }
    candidates
}

pub(crate) fn parse_env<T: FromStr>(
    lookup: EnvLookup<'_>,
    key: &str,
) -> Option<T> {
    lookup(key).and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
#[path = "../../tests/src/config/settings_tests.rs"]
mod tests;
