//! Handing parsed reports to a persistence service.
//!
//! The report store is an external collaborator; this module only defines the
//! seam ([`ReportSink`]), a local file-backed implementation and the mapping
//! from rejected submissions to [`Error`] values. Nothing here retries: every
//! failure is final for the attempt and the caller decides whether to submit
//! again.

#[cfg(feature = "http")]
pub mod http;

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::report::MatchReportPayload;

#[cfg(feature = "http")]
pub use http::HttpReportSink;

/// Identifiers assigned to an accepted report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    /// Identifier of the stored match
    pub match_id: String,
    /// Identifier of the owning account
    pub owner_id: String,
}

/// Destination for parsed reports.
pub trait ReportSink {
    /// Store one report.
    ///
    /// # Errors
    ///
    /// [`Error::Conflict`] when a report for the same match exists,
    /// [`Error::Validation`] when the payload is rejected and
    /// [`Error::Transport`] when the store cannot be reached.
    fn submit(&self, payload: &MatchReportPayload) -> Result<SubmissionReceipt>;
}

/// Stores each report as `<dir>/<match id>.json`.
///
/// The match id is derived from the date and team names, so a second report
/// for the same match is a conflict.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
    owner_id: String,
}

impl JsonFileSink {
    /// Sink writing into `dir`, which is created on first use.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            owner_id: "local".to_string(),
        }
    }

    /// Owner id reported in receipts.
    pub fn with_owner_id(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = owner_id.into();
        self
    }

    /// Path the payload would be stored at.
    pub fn path_for(&self, payload: &MatchReportPayload) -> PathBuf {
        self.dir.join(format!("{}.json", match_id_for(payload)))
    }
}

impl ReportSink for JsonFileSink {
    fn submit(&self, payload: &MatchReportPayload) -> Result<SubmissionReceipt> {
        std::fs::create_dir_all(&self.dir).map_err(|e| Error::Transport(e.to_string()))?;

        let match_id = match_id_for(payload);
        let path = self.path_for(payload);
        let json = payload.to_json_pretty()?;

        // A failed write must not leave a truncated report under the final name
        let staging = self.dir.join(format!(".{}.json.partial", match_id));
        let staged = write_staging_file(&staging, json.as_bytes())
            .and_then(|()| std::fs::hard_link(&staging, &path));
        let _ = std::fs::remove_file(&staging);

        match staged {
            Ok(()) => {},
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(Error::Conflict {
                    message: format!("{} already exists", path.display()),
                });
            },
            Err(e) => return Err(Error::Transport(e.to_string())),
        }

        log::info!("Stored report {} at {}", match_id, path.display());
        Ok(SubmissionReceipt {
            match_id,
            owner_id: self.owner_id.clone(),
        })
    }
}

fn write_staging_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

/// Stable identifier for a report: match date followed by the team names.
///
/// # Examples
///
/// ```
/// use volley_report::report::{MatchReportPayload, TeamReport};
/// use volley_report::submit::match_id_for;
///
/// let payload = MatchReportPayload {
///     generated_at: String::new(),
///     set_columns: 4,
///     column_labels: vec![],
///     match_date: Some("2024-03-15".into()),
///     match_time: None,
///     teams: vec![
///         TeamReport { team: "Team Alpha".into(), players: vec![] },
///         TeamReport { team: "São Bento".into(), players: vec![] },
///     ],
/// };
/// assert_eq!(match_id_for(&payload), "2024-03-15-team-alpha-são-bento");
/// ```
pub fn match_id_for(payload: &MatchReportPayload) -> String {
    let mut parts = vec![payload.match_date.clone().unwrap_or_else(|| "undated".to_string())];
    parts.extend(payload.teams.iter().map(|t| t.team.clone()));

    let mut id = String::new();
    for ch in parts.join(" ").chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            id.push(ch);
        } else if !id.is_empty() && !id.ends_with('-') {
            id.push('-');
        }
    }
    id.trim_end_matches('-').to_string()
}

/// Turn a rejected submission into an error.
///
/// HTTP 409 is a conflict. Any other status is a validation failure whose
/// messages are taken from the response body when it has one of the shapes
/// `{"errors": {"field": ["msg", ..]}}`, `{"errors": ["msg", ..]}`,
/// `{"message": "msg"}` or `{"detail": "msg"}`.
///
/// # Examples
///
/// ```
/// use volley_report::submit::classify_submission_failure;
/// use volley_report::Error;
///
/// let err = classify_submission_failure(422, r#"{"errors": {"matchDate": ["is required"]}}"#);
/// assert_eq!(err.user_message(), "matchDate: is required");
///
/// let err = classify_submission_failure(409, "");
/// assert!(matches!(err, Error::Conflict { .. }));
/// ```
pub fn classify_submission_failure(status: u16, body: &str) -> Error {
    let messages = serde_json::from_str::<Value>(body)
        .map(|value| body_messages(&value))
        .unwrap_or_default();

    if status == 409 {
        return Error::Conflict {
            message: messages
                .first()
                .cloned()
                .unwrap_or_else(|| "report already exists".to_string()),
        };
    }

    if messages.is_empty() {
        return Error::Validation {
            messages: vec![format!("HTTP {}", status)],
        };
    }
    Error::Validation { messages }
}

fn body_messages(value: &Value) -> Vec<String> {
    match value.get("errors") {
        Some(Value::Object(fields)) => {
            return fields
                .iter()
                .flat_map(|(field, msgs)| {
                    string_list(msgs)
                        .into_iter()
                        .map(move |msg| format!("{}: {}", field, msg))
                })
                .collect();
        },
        Some(errors @ Value::Array(_)) => return string_list(errors),
        _ => {},
    }

    ["message", "detail"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(|msg| vec![msg.to_string()])
        .unwrap_or_default()
}

fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Object(obj) => obj.get("message").and_then(Value::as_str).map(String::from),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}
