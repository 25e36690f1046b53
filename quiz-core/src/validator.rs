//! Quiz Validator
//!
//! Detects content-authoring defects before a registry is built:
//! - Structural checks (questions, choices, prompts)
//! - Answer checks (exactly one correct choice unless multi-select)
//! - Key format and text hygiene warnings

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::model::{Question, Quiz};

/// Kebab-case article slug, e.g. `schema-design` or `ci-cd-101`
static SLUG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("slug pattern is a valid regex")
});

/// Validation outcome with detailed findings
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    /// Whether validation passed
    pub is_valid: bool,

    /// Error-level issues that must be fixed
    pub errors: Vec<ValidationIssue>,

    /// Warning-level issues that should be addressed
    pub warnings: Vec<ValidationIssue>,

    /// Informational notes
    pub info: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Create a valid report
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: vec![],
            warnings: vec![],
            info: vec![],
        }
    }

    /// Add an error
    pub fn add_error(&mut self, issue: ValidationIssue) {
        self.is_valid = false;
        self.errors.push(issue);
    }

    /// Add a warning
    pub fn add_warning(&mut self, issue: ValidationIssue) {
        self.warnings.push(issue);
    }

    /// Add info
    pub fn add_info(&mut self, issue: ValidationIssue) {
        self.info.push(issue);
    }

    /// Merge another report into this one
    pub fn merge(&mut self, other: ValidationReport) {
        if !other.is_valid {
            self.is_valid = false;
        }
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.info.extend(other.info);
    }

    /// Turn every warning into an error (strict mode)
    pub fn promote_warnings(&mut self) {
        if self.warnings.is_empty() {
            return;
        }
        self.is_valid = false;
        self.errors.append(&mut self.warnings);
    }

    /// Topic keys that have at least one error, deduplicated, in report order
    pub fn offending_keys(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.errors
            .iter()
            .filter_map(|e| e.key.as_deref())
            .filter(|k| seen.insert(*k))
            .collect()
    }

    /// Get a summary string
    pub fn summary(&self) -> String {
        format!(
            "{}: {} errors, {} warnings, {} info",
            if self.is_valid { "VALID" } else { "INVALID" },
            self.errors.len(),
            self.warnings.len(),
            self.info.len()
        )
    }

    /// One line listing every error with its location
    pub fn describe_errors(&self) -> String {
        if self.errors.is_empty() {
            return "no errors".to_string();
        }
        self.errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// A single validation issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Issue code
    pub code: String,

    /// Human-readable message
    pub message: String,

    /// Topic key of the offending quiz
    pub key: Option<String>,

    /// Path inside the quiz (e.g., "questions[0].choices")
    pub path: Option<String>,

    /// Suggested fix
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    /// Create a new issue
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            key: None,
            path: None,
            suggestion: None,
        }
    }

    /// Set the topic key
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set the path
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(key) = &self.key {
            write!(f, "{key}: ")?;
        }
        if let Some(path) = &self.path {
            write!(f, "{path}: ")?;
        }
        write!(f, "{} ({})", self.message, self.code)
    }
}

/// Quiz validator
#[derive(Debug, Clone)]
pub struct QuizValidator {
    /// Whether to emit informational recommendations
    check_recommendations: bool,
}

impl QuizValidator {
    /// Create a new validator
    pub fn new() -> Self {
        Self {
            check_recommendations: false,
        }
    }

    /// Also report missing explanations and titles
    pub fn with_recommendations(mut self) -> Self {
        self.check_recommendations = true;
        self
    }

    /// Validate every quiz in a set of entries
    pub fn validate_all<'a, I>(&self, entries: I) -> ValidationReport
    where
        I: IntoIterator<Item = (&'a str, &'a Quiz)>,
    {
        let mut report = ValidationReport::valid();
        for (key, quiz) in entries {
            report.merge(self.validate(key, quiz));
        }
        report
    }

    /// Validate one quiz registered under `key`
    pub fn validate(&self, key: &str, quiz: &Quiz) -> ValidationReport {
        let mut report = ValidationReport::valid();

        self.validate_key(key, &mut report);

        if quiz.questions.is_empty() {
            report.add_error(
                ValidationIssue::new("E002", "quiz has no questions")
                    .with_key(key)
                    .with_path("questions")
                    .with_suggestion("Remove the entry or add at least one question"),
            );
        }

        for (i, question) in quiz.questions.iter().enumerate() {
            self.validate_question(key, &format!("questions[{}]", i), question, &mut report);
        }

        if self.check_recommendations && quiz.title.is_none() {
            report.add_info(
                ValidationIssue::new("I002", "quiz has no title")
                    .with_key(key)
                    .with_path("title"),
            );
        }

        report
    }

    fn validate_key(&self, key: &str, report: &mut ValidationReport) {
        if key.is_empty() {
            report.add_error(
                ValidationIssue::new("E001", "topic key cannot be empty").with_key(key),
            );
        } else if !SLUG_PATTERN.is_match(key) {
            report.add_warning(
                ValidationIssue::new(
                    "W001",
                    format!("topic key '{}' is not a kebab-case slug", key),
                )
                .with_key(key)
                .with_suggestion("Use the article slug, e.g. unit-testing"),
            );
        }
    }

    fn validate_question(
        &self,
        key: &str,
        path: &str,
        question: &Question,
        report: &mut ValidationReport,
    ) {
        if question.prompt.trim().is_empty() {
            report.add_error(
                ValidationIssue::new("E003", "question prompt cannot be empty")
                    .with_key(key)
                    .with_path(format!("{}.prompt", path)),
            );
        } else {
            check_whitespace(key, &format!("{}.prompt", path), &question.prompt, report);
        }

        if question.choices.len() < 2 {
            report.add_error(
                ValidationIssue::new(
                    "E004",
                    format!(
                        "question needs at least two choices, found {}",
                        question.choices.len()
                    ),
                )
                .with_key(key)
                .with_path(format!("{}.choices", path)),
            );
        }

        let mut seen_text = HashSet::new();
        for (j, choice) in question.choices.iter().enumerate() {
            let choice_path = format!("{}.choices[{}]", path, j);

            if choice.text.trim().is_empty() {
                report.add_error(
                    ValidationIssue::new("E005", "choice text cannot be empty")
                        .with_key(key)
                        .with_path(&choice_path),
                );
                continue;
            }

            check_whitespace(key, &choice_path, &choice.text, report);

            if !seen_text.insert(choice.text.trim()) {
                report.add_warning(
                    ValidationIssue::new(
                        "W002",
                        format!("duplicate choice text: {}", choice.text.trim()),
                    )
                    .with_key(key)
                    .with_path(&choice_path),
                );
            }
        }

        // Correctness
        let correct = question.choices.iter().filter(|c| c.correct).count();
        if correct == 0 && !question.choices.is_empty() {
            report.add_error(
                ValidationIssue::new("E006", "question has no correct choice")
                    .with_key(key)
                    .with_path(format!("{}.choices", path))
                    .with_suggestion("Set `correct` to the index of the right answer"),
            );
        } else if correct > 1 && !question.multi_select {
            report.add_error(
                ValidationIssue::new(
                    "E007",
                    format!("single-select question has {} correct choices", correct),
                )
                .with_key(key)
                .with_path(format!("{}.choices", path))
                .with_suggestion("Mark one choice correct or set `multiple: true`"),
            );
        }

        if self.check_recommendations && question.explanation.is_none() {
            report.add_info(
                ValidationIssue::new("I001", "question has no explanation")
                    .with_key(key)
                    .with_path(format!("{}.explanation", path)),
            );
        }
    }
}

impl Default for QuizValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn check_whitespace(key: &str, path: &str, text: &str, report: &mut ValidationReport) {
    if text.trim() != text {
        report.add_warning(
            ValidationIssue::new("W003", "text has leading or trailing whitespace")
                .with_key(key)
                .with_path(path),
        );
    }
}

/// True if `key` is a kebab-case slug
pub fn is_slug(key: &str) -> bool {
    SLUG_PATTERN.is_match(key)
}
