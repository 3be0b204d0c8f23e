use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::config::{EnvLookup, parse_env};

pub const DEFAULT_MIN_FUZZY_SCORE: u8 = 60;
pub const MAX_MIN_FUZZY_SCORE: u8 = 100;
pub const DEFAULT_MAX_COMPLETION_ITEMS: usize = 50;
pub const MIN_MAX_COMPLETION_ITEMS: usize = 1;

pub const ENV_MIN_FUZZY_SCORE: &str = "TRIGGERFISH_MIN_FUZZY_SCORE";
pub const ENV_MAX_COMPLETION_ITEMS: &str = "TRIGGERFISH_MAX_COMPLETION_ITEMS";

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSettings {
    pub min_fuzzy_score: u8,
    pub max_items: usize,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            min_fuzzy_score: DEFAULT_MIN_FUZZY_SCORE,
            max_items: DEFAULT_MAX_COMPLETION_ITEMS,
        }
    }
}

impl CompletionSettings {
    pub(crate) fn apply_env(
        &mut self,
        lookup: EnvLookup<'_>,
    ) {
        if let Some(score) = parse_env::<i64>(lookup, ENV_MIN_FUZZY_SCORE) {
            self.min_fuzzy_score = clamp_score(score);
        }
        if let Some(items) = parse_env(lookup, ENV_MAX_COMPLETION_ITEMS) {
            self.max_items = items;
        }
    }

    pub(crate) fn apply_patch(
        &mut self,
        patch: CompletionSettingsPatch,
    ) {
        if let Some(v) = patch.min_fuzzy_score {
            self.min_fuzzy_score = clamp_score(v);
        }
        if let Some(v) = patch.max_items {
            self.max_items = v;
        }
    }

    pub(crate) fn normalize(&mut self) {
        self.min_fuzzy_score = self.min_fuzzy_score.min(MAX_MIN_FUZZY_SCORE);
        self.max_items = self.max_items.max(MIN_MAX_COMPLETION_ITEMS);
    }
}

fn clamp_score(score: i64) -> u8 {
    score.clamp(0, i64::from(MAX_MIN_FUZZY_SCORE)) as u8
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct CompletionSettingsPatch {
    pub(crate) min_fuzzy_score: Option<i64>,
    pub(crate) max_items: Option<usize>,
    #[serde(flatten)]
    pub(crate) _extra: HashMap<String, Value>,
}
