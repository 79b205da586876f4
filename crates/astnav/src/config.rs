//! Runtime session settings updated from editor-supplied JSON.
//!
//! Settings arrive as partial payloads; each section has a private `*Patch`
//! struct for tolerant deserialization and `apply_patch` glue into the
//! public struct, with `normalize()` clamping numeric limits.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

pub(crate) const SETTINGS_SECTION_KEY: &str = "astnav";
const MIN_EXTERNAL_FILE_ENTRIES: usize = 4;
const MAX_EXTERNAL_FILE_ENTRIES: usize = 1024;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionSettings {
    pub highlighting: HighlightingSettings,
    pub cache: CacheSettings,
    pub logging: LoggingSettings,
}

impl SessionSettings {
    pub fn from_payload(payload: Option<&Value>) -> Self {
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
            if let Ok(patch) = serde_json::from_value::<SessionSettingsPatch>(candidate.clone()) {
                merged.apply_patch(patch);
            }
        }

        merged.normalize();
        merged
    }

    fn apply_patch(
        &mut self,
        patch: SessionSettingsPatch,
    ) {
        if let Some(highlighting) = patch.highlighting {
            self.highlighting.apply_patch(highlighting);
        }
        if let Some(cache) = patch.cache {
            self.cache.apply_patch(cache);
        }
        if let Some(logging) = patch.logging {
            self.logging.apply_patch(logging);
        }
    }

    fn normalize(&mut self) {
        self.cache.normalize();
    }
}

/// The payload may be the section object itself or a wrapper keyed by the
/// section name.
fn payload_candidates(payload: &Value) -> Vec<&Value> {
    let mut candidates = vec![payload];
    if let Some(section) = payload.get(SETTINGS_SECTION_KEY) {
        candidates.push(section);
    }
    candidates
}

#[derive(Debug, Clone, PartialEq)]
pub struct HighlightingSettings {
    /// Insert operator glyph tokens derived from operator nodes.
    pub operator_tokens: bool,
    /// Insert matching `<`/`>` tokens around template arguments.
    pub angle_brackets: bool,
    /// Emphasize arguments passed by mutable reference.
    pub output_arguments: bool,
}

impl Default for HighlightingSettings {
    fn default() -> Self {
        Self {
            operator_tokens: true,
            angle_brackets: true,
            output_arguments: true,
        }
    }
}

impl HighlightingSettings {
    fn apply_patch(
        &mut self,
        patch: HighlightingSettingsPatch,
    ) {
        if let Some(v) = patch.operator_tokens {
            self.operator_tokens = v;
        }
        if let Some(v) = patch.angle_brackets {
            self.angle_brackets = v;
        }
        if let Some(v) = patch.output_arguments {
            self.output_arguments = v;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    /// Upper bound on cached ASTs for files not open in the editor.
    pub max_external_file_entries: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_external_file_entries: 64,
        }
    }
}

impl CacheSettings {
    fn apply_patch(
        &mut self,
        patch: CacheSettingsPatch,
    ) {
        if let Some(v) = patch.max_external_file_entries {
            self.max_external_file_entries = v;
        }
    }

    fn normalize(&mut self) {
        self.max_external_file_entries = self
            .max_external_file_entries
            .clamp(MIN_EXTERNAL_FILE_ENTRIES, MAX_EXTERNAL_FILE_ENTRIES);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoggingSettings {
    pub level: LogLevel,
}

impl LoggingSettings {
    fn apply_patch(
        &mut self,
        patch: LoggingSettingsPatch,
    ) {
        if let Some(v) = patch.level {
            self.level = v;
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct SessionSettingsPatch {
    highlighting: Option<HighlightingSettingsPatch>,
    cache: Option<CacheSettingsPatch>,
    logging: Option<LoggingSettingsPatch>,
    #[serde(flatten)]
    _extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct HighlightingSettingsPatch {
    operator_tokens: Option<bool>,
    angle_brackets: Option<bool>,
    output_arguments: Option<bool>,
    #[serde(flatten)]
    _extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct CacheSettingsPatch {
    max_external_file_entries: Option<usize>,
    #[serde(flatten)]
    _extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct LoggingSettingsPatch {
    level: Option<LogLevel>,
    #[serde(flatten)]
    _extra: HashMap<String, Value>,
}

#[cfg(test)]
#[path = "../tests/src/config_tests.rs"]
mod tests;
