//! Error types for the match-report library.
//!
//! This module defines all error types that can occur while decoding a report,
//! rebuilding its table and handing the result to a persistence sink.

use crate::report::metadata::MatchMetadata;

/// Result type alias for match-report operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during report processing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The PDF decoder rejected the document
    #[error("PDF decoding error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Text extraction failed on a specific page
    #[error("Failed to extract text from page {page}: {reason}")]
    Extraction {
        /// 1-based page number
        page: usize,
        /// Reason for the failure
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration values that cannot be used
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Segmentation produced no player rows.
    ///
    /// Carries whatever date/time metadata was still detected on the document.
    #[error("No player rows found in report")]
    NoPlayersFound {
        /// Metadata detected before the failure
        metadata: MatchMetadata,
    },

    /// The sink already holds a report for the same match (HTTP 409)
    #[error("Report conflict: {message}")]
    Conflict {
        /// Message returned by the sink
        message: String,
    },

    /// The sink rejected the payload
    #[error("Report rejected: {}", .messages.join("; "))]
    Validation {
        /// Field-level messages, in the order returned
        messages: Vec<String>,
    },

    /// The sink could not be reached or answered with garbage
    #[error("Transport error: {0}")]
    Transport(String),
}

impl Error {
    /// Message suitable for showing to the person who uploaded the report.
    pub fn user_message(&self) -> String {
        match self {
            Error::Pdf(_) | Error::Extraction { .. } | Error::Io(_) => "Upload failed".to_string(),
            Error::NoPlayersFound { .. } => "No player could be found on this PDF".to_string(),
            Error::Conflict { .. } => "A report already exists for this date/teams".to_string(),
            Error::Validation { messages } if !messages.is_empty() => messages.join("; "),
            Error::Validation { .. } => "The report was rejected".to_string(),
            Error::Json(_) | Error::InvalidConfig(_) | Error::Transport(_) => self.to_string(),
        }
    }

    /// True for failures of the decode/extract stage, which abandon the whole parse.
    pub fn is_extraction_failure(&self) -> bool {
        matches!(self, Error::Pdf(_) | Error::Extraction { .. } | Error::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_error_message() {
        let err = Error::Extraction {
            page: 3,
            reason: "bad content stream".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("page 3"));
        assert!(msg.contains("bad content stream"));
        assert_eq!(err.user_message(), "Upload failed");
        assert!(err.is_extraction_failure());
    }

    #[test]
    fn test_no_players_user_message() {
        let err = Error::NoPlayersFound {
            metadata: MatchMetadata::default(),
        };
        assert_eq!(err.user_message(), "No player could be found on this PDF");
        assert!(!err.is_extraction_failure());
    }

    #[test]
    fn test_conflict_is_distinct_from_validation() {
        let conflict = Error::Conflict {
            message: "duplicate".to_string(),
        };
        let validation = Error::Validation {
            messages: vec!["teams: required".to_string(), "matchDate: invalid".to_string()],
        };
        assert_eq!(conflict.user_message(), "A report already exists for this date/teams");
        assert_eq!(validation.user_message(), "teams: required; matchDate: invalid");
        assert!(format!("{}", validation).contains("teams: required; matchDate: invalid"));
    }
}
