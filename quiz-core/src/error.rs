//! Error types for quiz registry operations
//!
//! This module provides the error taxonomy used across the crate:
//! - Content defects found while building a registry (fatal at startup)
//! - Source loading failures (I/O, malformed JSON, bad configuration)
//! - Misuse of the process-wide registry (lookup before install, double install)
//!
//! Absence of a quiz for a topic is NOT an error. Lookups return `Option`.
//!
//! # Error Codes
//!
//! Each variant has a stable error code (e.g., `INVALID_CONTENT`) that build
//! tooling can switch on or aggregate in logs.
//!
//! # Example
//!
//! ```rust
//! use quiz_core::error::{ErrorCategory, QuizError};
//!
//! fn report(err: &QuizError) {
//!     match err.category() {
//!         ErrorCategory::Validation => eprintln!("fix the quiz content: {err}"),
//!         ErrorCategory::Misuse => eprintln!("caller bug: {err}"),
//!         _ => eprintln!("{err}"),
//!     }
//! }
//! # report(&QuizError::RegistryNotInstalled);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validator::ValidationReport;

/// Result type alias for quiz registry operations
pub type Result<T> = std::result::Result<T, QuizError>;

/// Error category for grouping related errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Explicitly requested resource does not exist
    NotFound,
    /// Quiz content is malformed
    Validation,
    /// Resource state conflict
    Conflict,
    /// The caller used the API out of order
    Misuse,
    /// External source (file system, JSON) failed
    External,
}

/// Errors that can occur while building or accessing a quiz registry
#[derive(Error, Debug)]
pub enum QuizError {
    // ═══════════════════════════════════════════════════════════════════════
    // Content errors (registry construction)
    // ═══════════════════════════════════════════════════════════════════════

    /// Source content failed validation; the report lists every defect
    #[error("Invalid quiz content: {}", .report.describe_errors())]
    InvalidContent { report: ValidationReport },

    /// Source document does not have the expected shape
    #[error("Malformed quiz source '{source_name}': {reason}")]
    MalformedSource { source_name: String, reason: String },

    /// Quiz requested through `require` does not exist
    #[error("Quiz not found: '{key}'. Keys are matched exactly and case-sensitively.")]
    QuizNotFound { key: String },

    // ═══════════════════════════════════════════════════════════════════════
    // Process-wide registry errors
    // ═══════════════════════════════════════════════════════════════════════

    /// Lookup through the global accessor before `install` was called
    #[error("Quiz registry not installed. Call quiz_core::shared::install() during startup.")]
    RegistryNotInstalled,

    /// `install` was called more than once
    #[error("Quiz registry already installed. Use SharedRegistry::replace() to swap content.")]
    RegistryAlreadyInstalled,

    // ═══════════════════════════════════════════════════════════════════════
    // Infrastructure errors (I/O, JSON, configuration)
    // ═══════════════════════════════════════════════════════════════════════

    /// Failed to read a source file or directory
    #[error("Failed to load quiz source from '{path}': {reason}")]
    SourceLoadError { path: String, reason: String },

    /// Failed to read or parse the registry configuration
    #[error("Invalid registry config '{path}': {reason}")]
    ConfigError { path: String, reason: String },

    /// JSON serialization or deserialization failed
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl QuizError {
    /// Returns true if this error was caused by authored content rather than
    /// by the environment or the caller
    pub fn is_content_defect(&self) -> bool {
        matches!(
            self,
            QuizError::InvalidContent { .. } | QuizError::MalformedSource { .. }
        )
    }

    /// Returns the error category for grouping
    pub fn category(&self) -> ErrorCategory {
        match self {
            QuizError::InvalidContent { .. } | QuizError::MalformedSource { .. } => {
                ErrorCategory::Validation
            }

            QuizError::QuizNotFound { .. } => ErrorCategory::NotFound,

            QuizError::RegistryAlreadyInstalled => ErrorCategory::Conflict,

            QuizError::RegistryNotInstalled => ErrorCategory::Misuse,

            QuizError::SourceLoadError { .. }
            | QuizError::ConfigError { .. }
            | QuizError::JsonError(_) => ErrorCategory::External,
        }
    }

    /// Returns the stable error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            QuizError::InvalidContent { .. } => "INVALID_CONTENT",
            QuizError::MalformedSource { .. } => "MALFORMED_SOURCE",
            QuizError::QuizNotFound { .. } => "QUIZ_NOT_FOUND",
            QuizError::RegistryNotInstalled => "REGISTRY_NOT_INSTALLED",
            QuizError::RegistryAlreadyInstalled => "REGISTRY_ALREADY_INSTALLED",
            QuizError::SourceLoadError { .. } => "SOURCE_LOAD_ERROR",
            QuizError::ConfigError { .. } => "CONFIG_ERROR",
            QuizError::JsonError(_) => "JSON_ERROR",
        }
    }

    /// Converts this error to a JSON-serializable response object
    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
                category: self.category(),
                content_defect: self.is_content_defect(),
            },
        }
    }
}

/// JSON-serializable error envelope, used by `quiz-check --json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error details
    pub error: ErrorDetail,
}

/// Error detail for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Stable error code (e.g., "INVALID_CONTENT")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Error category
    pub category: ErrorCategory,
    /// Whether the content author has to fix something
    pub content_defect: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::ValidationIssue;

    fn invalid_content() -> QuizError {
        let mut report = ValidationReport::valid();
        report.add_error(
            ValidationIssue::new("E004", "question needs at least two choices")
                .with_key("unit-testing")
                .with_path("questions[0].choices"),
        );
        QuizError::InvalidContent { report }
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(invalid_content().error_code(), "INVALID_CONTENT");
        assert_eq!(
            QuizError::RegistryNotInstalled.error_code(),
            "REGISTRY_NOT_INSTALLED"
        );
        assert_eq!(
            QuizError::QuizNotFound {
                key: "x".to_string()
            }
            .error_code(),
            "QUIZ_NOT_FOUND"
        );
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(invalid_content().category(), ErrorCategory::Validation);
        assert_eq!(
            QuizError::RegistryNotInstalled.category(),
            ErrorCategory::Misuse
        );
        assert_eq!(
            QuizError::RegistryAlreadyInstalled.category(),
            ErrorCategory::Conflict
        );
        assert_eq!(
            QuizError::SourceLoadError {
                path: "quizzes.json".to_string(),
                reason: "missing".to_string()
            }
            .category(),
            ErrorCategory::External
        );
    }

    #[test]
    fn test_content_defect_flag() {
        assert!(invalid_content().is_content_defect());
        assert!(QuizError::MalformedSource {
            source_name: "inline".to_string(),
            reason: "not an object".to_string()
        }
        .is_content_defect());
        assert!(!QuizError::RegistryNotInstalled.is_content_defect());
    }

    #[test]
    fn test_invalid_content_message_names_key() {
        let msg = invalid_content().to_string();
        assert!(msg.contains("unit-testing"));
        assert!(msg.contains("questions[0].choices"));
        assert!(msg.contains("E004"));
    }

    #[test]
    fn test_error_response_serialization() {
        let response = invalid_content().to_error_response();

        let json = serde_json::to_string_pretty(&response).unwrap();
        assert!(json.contains("INVALID_CONTENT"));
        assert!(json.contains("validation"));

        let parsed: ErrorResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.error.code, "INVALID_CONTENT");
        assert!(parsed.error.content_defect);
    }
}
