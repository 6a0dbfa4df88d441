//! Settings persisted in an append-only JSON-lines session log.
//!
//! Each line is `{"tag": "...", "data": {...}}`. The latest line with a
//! settings tag wins; there is no merging across entries.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use super::options::{BackgroundSetting, MAX_CODE_INDENT, PersistedSettings};
use super::parse::{parse_background, parse_bool, parse_indent_width};

/// Tag written by this crate.
pub const SETTINGS_TAG: &str = "tidymark.settings";
/// Tag of the older extension, still read.
pub const LEGACY_SETTINGS_TAG: &str = "markdown-patch.settings";

#[derive(Debug, thiserror::Error)]
pub enum SessionLogError {
    #[error("session log io error at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode settings")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryTag {
    Current,
    Legacy,
}

#[derive(Serialize)]
struct Entry<'a> {
    tag: &'a str,
    data: SettingsRecord,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SettingsRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    unwrap_outer_fence: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hide_code_fences: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    show_language_label: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    strip_heading_prefixes: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    block_list_items: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code_background: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code_indent: Option<usize>,
}

impl From<&PersistedSettings> for SettingsRecord {
    fn from(settings: &PersistedSettings) -> Self {
        Self {
            unwrap_outer_fence: settings.unwrap_outer_fence,
            hide_code_fences: settings.hide_code_fences,
            show_language_label: settings.show_language_label,
            strip_heading_prefixes: settings.strip_heading_prefixes,
            block_list_items: settings.block_list_items,
            code_background: settings.code_background.as_ref().map(|bg| match bg {
                BackgroundSetting::Off => "off".to_string(),
                BackgroundSetting::Key(key) => key.clone(),
            }),
            code_indent: settings.code_indent,
        }
    }
}

/// Handle on a session log file.
#[derive(Debug, Clone)]
pub struct SessionLog {
    path: PathBuf,
}

impl SessionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Latest settings entry under either tag. A missing log is `None`.
    pub fn latest_settings(&self) -> Result<Option<PersistedSettings>, SessionLogError> {
        Ok(self.latest_entry()?.map(|(_, settings)| settings))
    }

    /// Append a settings snapshot under the current tag.
    pub fn append_settings(&self, settings: &PersistedSettings) -> Result<(), SessionLogError> {
        let entry = Entry {
            tag: SETTINGS_TAG,
            data: SettingsRecord::from(settings),
        };
        let line = serde_json::to_string(&entry)?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.io_error(source))?;
        writeln!(file, "{line}").map_err(|source| self.io_error(source))?;
        tracing::debug!(path = %self.path.display(), "settings persisted");
        Ok(())
    }

    /// Re-tag the latest entry under the current tag when it was written by
    /// the older extension. Returns whether anything was imported.
    pub fn import_legacy(&self) -> Result<bool, SessionLogError> {
        match self.latest_entry()? {
            Some((EntryTag::Legacy, settings)) => {
                self.append_settings(&settings)?;
                tracing::info!(path = %self.path.display(), "imported legacy settings");
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn latest_entry(&self) -> Result<Option<(EntryTag, PersistedSettings)>, SessionLogError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(self.io_error(source)),
        };
        Ok(content.lines().rev().find_map(parse_entry))
    }

    fn io_error(&self, source: std::io::Error) -> SessionLogError {
        SessionLogError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

fn parse_entry(line: &str) -> Option<(EntryTag, PersistedSettings)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let value: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!(%err, "skipping unreadable session log line");
            return None;
        }
    };
    let tag = match value.get("tag").and_then(Value::as_str) {
        Some(SETTINGS_TAG) => EntryTag::Current,
        Some(LEGACY_SETTINGS_TAG) => EntryTag::Legacy,
        _ => return None,
    };
    let data = value.get("data")?.as_object()?;

    let flag = |key: &str| match data.get(key)? {
        Value::Bool(value) => Some(*value),
        Value::String(value) => parse_bool(value),
        _ => None,
    };
    let code_background = match data.get("codeBackground") {
        Some(Value::String(value)) => Some(parse_background(value)),
        Some(Value::Null) => Some(BackgroundSetting::Off),
        _ => None,
    };
    let code_indent = match data.get("codeIndent") {
        Some(Value::Number(number)) => number
            .as_u64()
            .and_then(|width| usize::try_from(width).ok())
            .filter(|width| *width <= MAX_CODE_INDENT),
        Some(Value::String(value)) => parse_indent_width(value),
        _ => None,
    };

    Some((
        tag,
        PersistedSettings {
            unwrap_outer_fence: flag("unwrapOuterFence"),
            hide_code_fences: flag("hideCodeFences"),
            show_language_label: flag("showLanguageLabel"),
            strip_heading_prefixes: flag("stripHeadingPrefixes"),
            block_list_items: flag("blockListItems"),
            code_background,
            code_indent,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Options;

    fn log_with(lines: &[&str]) -> (tempfile::TempDir, SessionLog) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.jsonl");
        fs::write(&path, format!("{}\n", lines.join("\n"))).unwrap();
        (dir, SessionLog::new(path))
    }

    #[test]
    fn test_missing_log_has_no_settings() {
        let dir = tempfile::tempdir().unwrap();
        let log = SessionLog::new(dir.path().join("none.jsonl"));
        assert_eq!(log.latest_settings().unwrap(), None);
        assert!(!log.import_legacy().unwrap());
    }

    #[test]
    fn test_latest_entry_wins_without_merge() {
        let (_dir, log) = log_with(&[
            r#"{"tag":"tidymark.settings","data":{"hideCodeFences":false,"codeIndent":4}}"#,
            r#"{"tag":"other","data":{"hideCodeFences":true}}"#,
            r#"{"tag":"tidymark.settings","data":{"showLanguageLabel":false}}"#,
        ]);
        let settings = log.latest_settings().unwrap().unwrap();
        assert_eq!(settings.show_language_label, Some(false));
        assert_eq!(settings.hide_code_fences, None);
        assert_eq!(settings.code_indent, None);
    }

    #[test]
    fn test_legacy_tag_is_read() {
        let (_dir, log) = log_with(&[
            r#"{"tag":"markdown-patch.settings","data":{"unwrapOuterFence":"off"}}"#,
        ]);
        let settings = log.latest_settings().unwrap().unwrap();
        assert_eq!(settings.unwrap_outer_fence, Some(false));
    }

    #[test]
    fn test_lenient_values() {
        let (_dir, log) = log_with(&[
            r#"{"tag":"tidymark.settings","data":{"stripHeadingPrefixes":"YES","blockListItems":"maybe","codeBackground":"none","codeIndent":"6","extra":1}}"#,
        ]);
        let settings = log.latest_settings().unwrap().unwrap();
        assert_eq!(settings.strip_heading_prefixes, Some(true));
        assert_eq!(settings.block_list_items, None);
        assert_eq!(settings.code_background, Some(BackgroundSetting::Off));
        assert_eq!(settings.code_indent, Some(6));
    }

    #[test]
    fn test_out_of_range_indent_is_absent() {
        let (_dir, log) =
            log_with(&[r#"{"tag":"tidymark.settings","data":{"codeIndent":12}}"#]);
        assert_eq!(log.latest_settings().unwrap().unwrap().code_indent, None);
    }

    #[test]
    fn test_garbage_lines_are_skipped() {
        let (_dir, log) = log_with(&[
            r#"{"tag":"tidymark.settings","data":{"codeBackground":"codeBg"}}"#,
            "not json at all",
            "",
        ]);
        let settings = log.latest_settings().unwrap().unwrap();
        assert_eq!(
            settings.code_background,
            Some(BackgroundSetting::Key("codeBg".into()))
        );
    }

    #[test]
    fn test_append_writes_full_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let log = SessionLog::new(dir.path().join("nested").join("session.jsonl"));
        let snapshot = PersistedSettings::snapshot(&Options::default());
        log.append_settings(&snapshot).unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        let value: Value = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(value["tag"], SETTINGS_TAG);
        assert_eq!(value["data"]["codeBackground"], "off");
        assert_eq!(value["data"]["codeIndent"], 2);
        assert_eq!(value["data"]["hideCodeFences"], true);
        assert_eq!(log.latest_settings().unwrap(), Some(snapshot));
    }

    #[test]
    fn test_import_legacy_retags_latest() {
        let (_dir, log) = log_with(&[
            r#"{"tag":"markdown-patch.settings","data":{"codeIndent":5}}"#,
        ]);
        assert!(log.import_legacy().unwrap());
        assert!(!log.import_legacy().unwrap(), "second import is a no-op");

        let content = fs::read_to_string(log.path()).unwrap();
        let last: Value = serde_json::from_str(content.lines().last().unwrap()).unwrap();
        assert_eq!(last["tag"], SETTINGS_TAG);
        assert_eq!(last["data"]["codeIndent"], 5);
    }
}
