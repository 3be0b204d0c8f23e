use std::{collections::HashMap, env, path::PathBuf, str::FromStr};

use serde::Deserialize;
use serde_json::Value;

use crate::config::EnvLookup;

pub const ENV_LOG_LEVEL: &str = "TRIGGERFISH_LOG_LEVEL";
pub const ENV_LOG_FILE: &str = "TRIGGERFISH_LOG_FILE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[serde(alias = "warn")]
    Warning,
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    pub fn allows_info(self) -> bool {
        self >= LogLevel::Info
    }

    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warning => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            other => Err(format!("unknown log level `{other}`")),
        }
    }
}

/// `$HOME/.triggerfish/logs/triggerfish.log`, or the temp dir when no home is set.
pub fn default_log_file() -> PathBuf {
    let base = env::var_os("HOME").map(PathBuf::from).unwrap_or_else(env::temp_dir);
    base.join(".triggerfish").join("logs").join("triggerfish.log")
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub level: LogLevel,
    pub file: PathBuf,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            file: default_log_file(),
        }
    }
}

impl LoggingSettings {
    pub(crate) fn apply_env(
        &mut self,
        lookup: EnvLookup<'_>,
    ) {
        if let Some(level) = lookup(ENV_LOG_LEVEL).and_then(|v| v.parse().ok()) {
            self.level = level;
        }
        if let Some(file) = lookup(ENV_LOG_FILE) {
            self.file = PathBuf::from(file);
        }
    }

    pub(crate) fn apply_patch(
        &mut self,
        patch: LoggingSettingsPatch,
    ) {
        if let Some(v) = patch.level {
            self.level = v;
        }
        if let Some(v) = patch.file {
            self.file = v;
        }
    }

    pub(crate) fn normalize(&mut self) {
        if self.file.as_os_str().is_empty() {
            self.file = default_log_file();
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct LoggingSettingsPatch {
    pub(crate) level: Option<LogLevel>,
    pub(crate) file: Option<PathBuf>,
    #[serde(flatten)]
    pub(crate) _extra: HashMap<String, Value>,
}
