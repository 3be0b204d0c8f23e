use std::{collections::HashMap, time::Duration};

use serde::Deserialize;
use serde_json::Value;

use crate::config::{EnvLookup, parse_env};

pub const DEFAULT_HELPER_EXECUTABLE: &str = "triggerfish-core";
pub const DEFAULT_STARTUP_TIMEOUT_SECS: f64 = 5.0;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: f64 = 10.0;
pub const MIN_TIMEOUT_SECS: f64 = 1.0;
/// One day; anything longer is treated as a misconfiguration.
pub const MAX_TIMEOUT_SECS: f64 = 86_400.0;

pub const ENV_HELPER_ENABLED: &str = "TRIGGERFISH_CORE_ENABLED";
pub const ENV_HELPER_EXECUTABLE: &str = "TRIGGERFISH_CORE_EXECUTABLE";
pub const ENV_STARTUP_TIMEOUT: &str = "TRIGGERFISH_CORE_STARTUP_TIMEOUT";
pub const ENV_REQUEST_TIMEOUT: &str = "TRIGGERFISH_CORE_REQUEST_TIMEOUT";

/// Settings for the optional out-of-process helper, exposed to clients under `core`.
#[derive(Debug, Clone, PartialEq)]
pub struct HelperSettings {
    pub enabled: bool,
    pub executable: String,
    pub startup_timeout_secs: f64,
    pub request_timeout_secs: f64,
}

impl Default for HelperSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            executable: DEFAULT_HELPER_EXECUTABLE.to_string(),
            startup_timeout_secs: DEFAULT_STARTUP_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl HelperSettings {
    /// Falls back to the default when the field holds an unrepresentable value.
    pub fn startup_timeout(&self) -> Duration {
        timeout_duration(self.startup_timeout_secs, DEFAULT_STARTUP_TIMEOUT_SECS)
    }

    pub fn request_timeout(&self) -> Duration {
        timeout_duration(self.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS)
    }

    pub(crate) fn apply_env(
        &mut self,
        lookup: EnvLookup<'_>,
    ) {
        if let Some(enabled) = lookup(ENV_HELPER_ENABLED).and_then(|v| parse_bool(&v)) {
            self.enabled = enabled;
        }
        if let Some(executable) = lookup(ENV_HELPER_EXECUTABLE) {
            self.executable = executable;
        }
        if let Some(timeout) = parse_env(lookup, ENV_STARTUP_TIMEOUT) {
            self.startup_timeout_secs = timeout;
        }
        if let Some(timeout) = parse_env(lookup, ENV_REQUEST_TIMEOUT) {
            self.request_timeout_secs = timeout;
        }
    }

    pub(crate) fn apply_patch(
        &mut self,
        patch: HelperSettingsPatch,
    ) {
        if let Some(v) = patch.enabled {
            self.enabled = v;
        }
        if let Some(v) = patch.executable {
            self.executable = v;
        }
        if let Some(v) = patch.startup_timeout_secs {
            self.startup_timeout_secs = v;
        }
        if let Some(v) = patch.request_timeout_secs {
            self.request_timeout_secs = v;
        }
    }

    pub(crate) fn normalize(&mut self) {
        self.executable = self.executable.trim().to_string();
        if self.executable.is_empty() {
            self.executable = DEFAULT_HELPER_EXECUTABLE.to_string();
        }
        self.startup_timeout_secs = normalize_timeout(self.startup_timeout_secs, DEFAULT_STARTUP_TIMEOUT_SECS);
        self.request_timeout_secs = normalize_timeout(self.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }
}

fn normalize_timeout(
    secs: f64,
    default: f64,
) -> f64 {
    if secs.is_finite() && secs <= MAX_TIMEOUT_SECS { secs.max(MIN_TIMEOUT_SECS) } else { default }
}

fn timeout_duration(
    secs: f64,
    default: f64,
) -> Duration {
    Duration::try_from_secs_f64(normalize_timeout(secs, default))
        .unwrap_or_else(|_| Duration::from_secs_f64(default))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct HelperSettingsPatch {
    pub(crate) enabled: Option<bool>,
    pub(crate) executable: Option<String>,
    pub(crate) startup_timeout_secs: Option<f64>,
    pub(crate) request_timeout_secs: Option<f64>,
    #[serde(flatten)]
    pub(crate) _extra: HashMap<String, Value>,
}
