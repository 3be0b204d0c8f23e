use std::{collections::HashMap, time::Duration};

use serde::Deserialize;
use serde_json::Value;

use crate::config::{EnvLookup, parse_env};

pub const DEFAULT_CTAGS_EXECUTABLE: &str = "ctags";
pub const DEFAULT_CTAGS_TIMEOUT_SECS: u64 = 30;
pub const MIN_CTAGS_TIMEOUT_SECS: u64 = 1;

pub const ENV_CTAGS_EXECUTABLE: &str = "TRIGGERFISH_CTAGS_EXECUTABLE";
pub const ENV_CTAGS_TIMEOUT: &str = "TRIGGERFISH_CTAGS_TIMEOUT";

#[derive(Debug, Clone, PartialEq)]
pub struct CtagsSettings {
    pub executable: String,
    pub timeout_secs: u64,
}

impl Default for CtagsSettings {
    fn default() -> Self {
        Self {
            executable: DEFAULT_CTAGS_EXECUTABLE.to_string(),
            timeout_secs: DEFAULT_CTAGS_TIMEOUT_SECS,
        }
    }
}

impl CtagsSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub(crate) fn apply_env(
        &mut self,
        lookup: EnvLookup<'_>,
    ) {
        if let Some(executable) = lookup(ENV_CTAGS_EXECUTABLE) {
            self.executable = executable;
        }
        if let Some(timeout) = parse_env(lookup, ENV_CTAGS_TIMEOUT) {
            self.timeout_secs = timeout;
        }
    }

    pub(crate) fn apply_patch(
        &mut self,
        patch: CtagsSettingsPatch,
    ) {
        if let Some(v) = patch.executable {
            self.executable = v;
        }
        if let Some(v) = patch.timeout_secs {
            self.timeout_secs = v;
        }
    }

    pub(crate) fn normalize(&mut self) {
        self.executable = self.executable.trim().to_string();
        if self.executable.is_empty() {
            self.executable = DEFAULT_CTAGS_EXECUTABLE.to_string();
        }
        self.timeout_secs = self.timeout_secs.max(MIN_CTAGS_TIMEOUT_SECS);
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct CtagsSettingsPatch {
    pub(crate) executable: Option<String>,
    pub(crate) timeout_secs: Option<u64>,
    #[serde(flatten)]
    pub(crate) _extra: HashMap<String, Value>,
}
