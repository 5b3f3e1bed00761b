//! Error handling for submission checking operations.
//!
//! This module defines the error type that covers every way a run can fail,
//! from a missing roster to a single portal probe going wrong.

use std::fmt;

/// Main error type for submission checking operations.
///
/// A not-submitted identifier without a roster name is deliberately *not*
/// an error; it is reported through `Aggregation::unresolved`.
#[derive(Debug, Clone)]
pub enum TaCheckError {
    /// The roster cache is missing and the remote download failed
    /// (network error or a payload that is not a roster at all).
    DataUnavailable {
        source: String,
        message: String,
    },

    /// A roster payload contained a malformed record.
    ParseError {
        message: String,
        record: Option<usize>,
    },

    /// A single status probe failed (timeout, connection, non-success HTTP status).
    ProbeError {
        identifier: String,
        message: String,
        status_code: Option<u16>,
    },

    /// Configuration errors (invalid settings, bad config files, etc.)
    ConfigError {
        message: String,
    },

    /// Invalid department or cohort code supplied by the caller
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// File I/O errors on the roster cache or config files
    FileError {
        path: String,
        message: String,
    },

    /// Generic internal errors that don't fit other categories
    Internal {
        message: String,
    },
}

impl TaCheckError {
    /// Create a new data-unavailable error.
    pub fn data_unavailable<S: Into<String>, M: Into<String>>(source: S, message: M) -> Self {
        Self::DataUnavailable {
            source: source.into(),
            message: message.into(),
        }
    }

    /// Create a new parse error that is not tied to a specific record.
    pub fn parse<M: Into<String>>(message: M) -> Self {
        Self::ParseError {
            message: message.into(),
            record: None,
        }
    }

    /// Create a new parse error pointing at the offending record index.
    pub fn parse_record<M: Into<String>>(record: usize, message: M) -> Self {
        Self::ParseError {
            message: message.into(),
            record: Some(record),
        }
    }

    /// Create a new probe error.
    pub fn probe<I: Into<String>, M: Into<String>>(identifier: I, message: M) -> Self {
        Self::ProbeError {
            identifier: identifier.into(),
            message: message.into(),
            status_code: None,
        }
    }

    /// Create a new probe error with the HTTP status code the portal returned.
    pub fn probe_with_status<I: Into<String>, M: Into<String>>(
        identifier: I,
        message: M,
        status_code: u16,
    ) -> Self {
        Self::ProbeError {
            identifier: identifier.into(),
            message: message.into(),
            status_code: Some(status_code),
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new invalid input error.
    pub fn invalid_input<F: Into<String>, V: Into<String>, R: Into<String>>(
        field: F,
        value: V,
        reason: R,
    ) -> Self {
        Self::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new internal error.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// The identifier a probe error belongs to, if this is one.
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Self::ProbeError { identifier, .. } => Some(identifier.as_str()),
            _ => None,
        }
    }

    /// Whether this error came from loading the roster.
    pub fn is_data_error(&self) -> bool {
        matches!(self, Self::DataUnavailable { .. } | Self::ParseError { .. })
    }
}

impl fmt::Display for TaCheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DataUnavailable { source, message } => {
                write!(f, "Roster data unavailable from '{}': {}", source, message)
            }
            Self::ParseError { message, record } => {
                if let Some(index) = record {
                    write!(f, "Parse error in roster record {}: {}", index, message)
                } else {
                    write!(f, "Parse error: {}", message)
                }
            }
            Self::ProbeError {
                identifier,
                message,
                status_code,
            } => {
                if let Some(code) = status_code {
                    write!(
                        f,
                        "Status probe failed for '{}' (HTTP {}): {}",
                        identifier, code, message
                    )
                } else {
                    write!(f, "Status probe failed for '{}': {}", identifier, message)
                }
            }
            Self::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            Self::InvalidInput {
                field,
                value,
                reason,
            } => {
                write!(f, "Invalid {} '{}': {}", field, value, reason)
            }
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for TaCheckError {}

impl From<serde_json::Error> for TaCheckError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(format!("JSON parsing failed: {}", err))
    }
}

impl From<std::io::Error> for TaCheckError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal {
            message: format!("I/O error: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_error_display_includes_status() {
        let err = TaCheckError::probe_with_status("13520001", "server error", 503);
        let msg = err.to_string();
        assert!(msg.contains("13520001"));
        assert!(msg.contains("HTTP 503"));
        assert_eq!(err.identifier(), Some("13520001"));
    }

    #[test]
    fn test_parse_record_display() {
        let err = TaCheckError::parse_record(4, "expected 2 or 3 fields, found 1");
        assert_eq!(
            err.to_string(),
            "Parse error in roster record 4: expected 2 or 3 fields, found 1"
        );
        assert!(err.is_data_error());
    }

    #[test]
    fn test_non_probe_error_has_no_identifier() {
        let err = TaCheckError::config("bad");
        assert!(err.identifier().is_none());
        assert!(!err.is_data_error());
    }
}
