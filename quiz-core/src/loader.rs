//! Registry Loader
//!
//! Builds a [`QuizRegistry`] from the pipeline's source documents:
//! - In-memory JSON strings or values
//! - JSON files
//! - Directories of JSON fragments (`*.json`, merged in file name order)
//!
//! Construction is all-or-nothing. Every source is parsed, converted and
//! validated before the registry is assembled; any error-level issue fails
//! the whole load with [`QuizError::InvalidContent`].

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::RegistryConfig;
use crate::error::{QuizError, Result};
use crate::model::Quiz;
use crate::registry::{DuplicatePolicy, QuizRegistry};
use crate::source::{self, RawSource};
use crate::validator::{QuizValidator, ValidationIssue, ValidationReport};

/// Source name used for string and value input
const INLINE_SOURCE: &str = "<inline>";

/// A successful load together with the non-fatal findings
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub registry: QuizRegistry,
    pub report: ValidationReport,
}

/// A quiz after conversion, remembering which source it came from
struct SourcedQuiz {
    key: String,
    origin: String,
    quiz: Quiz,
}

/// Registry loader
#[derive(Debug, Clone)]
pub struct RegistryLoader {
    /// Whether to validate on load
    validate_on_load: bool,

    /// Whether warnings fail the load
    strict: bool,

    /// Whether to collect informational findings
    recommendations: bool,

    duplicate_policy: DuplicatePolicy,

    /// Configured source files and directories
    sources: Vec<PathBuf>,
}

impl RegistryLoader {
    /// Create a new loader with validation on and duplicate keys rejected
    pub fn new() -> Self {
        Self {
            validate_on_load: true,
            strict: false,
            recommendations: false,
            duplicate_policy: DuplicatePolicy::Reject,
            sources: vec![],
        }
    }

    /// Build a loader from configuration
    pub fn from_config(config: &RegistryConfig) -> Self {
        Self {
            validate_on_load: config.validate,
            strict: config.strict,
            recommendations: config.recommendations,
            duplicate_policy: config.duplicate_policy,
            sources: config.sources.clone(),
        }
    }

    /// Apply configuration on top of this loader, replacing its settings and
    /// appending the configured sources
    pub fn with_config(mut self, config: &RegistryConfig) -> Self {
        self.validate_on_load = config.validate;
        self.strict = config.strict;
        self.recommendations = config.recommendations;
        self.duplicate_policy = config.duplicate_policy;
        self.sources.extend(config.sources.iter().cloned());
        self
    }

    /// Disable content validation.
    ///
    /// Ingestion errors (unrepresentable answers) and duplicate keys under
    /// [`DuplicatePolicy::Reject`] still fail the load.
    pub fn skip_validation(mut self) -> Self {
        self.validate_on_load = false;
        self
    }

    /// Fail on validation warnings too
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Collect informational findings in the outcome report
    pub fn with_recommendations(mut self) -> Self {
        self.recommendations = true;
        self
    }

    /// Set the duplicate key policy
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Add a source file or directory for [`load_configured`](Self::load_configured)
    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(path.into());
        self
    }

    /// Load a registry from a JSON string
    pub fn load_str(&self, json: &str) -> Result<QuizRegistry> {
        let source = RawSource::from_json_str(INLINE_SOURCE, json)?;
        self.assemble(vec![(INLINE_SOURCE.to_string(), source)])
            .map(|outcome| outcome.registry)
    }

    /// Load a registry from a decoded JSON value.
    ///
    /// A `serde_json::Value` object cannot hold a key twice, so the duplicate
    /// policy never triggers here; use [`load_str`](Self::load_str) or the file
    /// loaders when duplicates must be detected.
    pub fn load_value(&self, value: serde_json::Value) -> Result<QuizRegistry> {
        let source = RawSource::from_value(INLINE_SOURCE, value)?;
        self.assemble(vec![(INLINE_SOURCE.to_string(), source)])
            .map(|outcome| outcome.registry)
    }

    /// Load a registry from one JSON file
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<QuizRegistry> {
        let fragment = read_file(path.as_ref())?;
        self.assemble(vec![fragment]).map(|outcome| outcome.registry)
    }

    /// Load a registry from every `*.json` file in a directory
    pub fn load_directory<P: AsRef<Path>>(&self, path: P) -> Result<QuizRegistry> {
        let fragments = read_directory(path.as_ref())?;
        self.assemble(fragments).map(|outcome| outcome.registry)
    }

    /// Load a registry from the configured sources
    pub fn load_configured(&self) -> Result<QuizRegistry> {
        self.load_paths(&self.sources).map(|outcome| outcome.registry)
    }

    /// Load files and directories in order into one registry, returning the
    /// findings that did not fail the load
    pub fn load_paths<P: AsRef<Path>>(&self, paths: &[P]) -> Result<LoadOutcome> {
        let mut fragments = Vec::new();
        for path in paths {
            let path = path.as_ref();
            if path.is_dir() {
                fragments.extend(read_directory(path)?);
            } else {
                fragments.push(read_file(path)?);
            }
        }

        if fragments.is_empty() {
            tracing::warn!("no quiz sources given; building an empty registry");
        }

        self.assemble(fragments)
    }

    /// Build a registry from typed quizzes, applying the same duplicate policy
    /// and validation as for parsed sources
    pub fn build<I>(&self, entries: I) -> Result<QuizRegistry>
    where
        I: IntoIterator<Item = (String, Quiz)>,
    {
        let quizzes = entries
            .into_iter()
            .map(|(key, quiz)| SourcedQuiz {
                key,
                origin: "<entries>".to_string(),
                quiz,
            })
            .collect();

        self.finish(quizzes, ValidationReport::valid())
            .map(|outcome| outcome.registry)
    }

    fn assemble(&self, fragments: Vec<(String, RawSource)>) -> Result<LoadOutcome> {
        let mut report = ValidationReport::valid();
        let mut quizzes = Vec::new();

        for (origin, raw) in fragments {
            tracing::debug!(source = %origin, entries = raw.len(), "converting quiz source");

            for (key, raw_quiz) in raw.entries {
                match source::convert(&key, raw_quiz) {
                    Ok(quiz) => quizzes.push(SourcedQuiz {
                        key,
                        origin: origin.clone(),
                        quiz,
                    }),
                    Err(issues) => {
                        for issue in issues {
                            report.add_error(issue);
                        }
                    }
                }
            }
        }

        self.finish(quizzes, report)
    }

    fn finish(
        &self,
        quizzes: Vec<SourcedQuiz>,
        mut report: ValidationReport,
    ) -> Result<LoadOutcome> {
        let entries = self.resolve_duplicates(quizzes, &mut report);

        if self.validate_on_load {
            let mut validator = QuizValidator::new();
            if self.recommendations {
                validator = validator.with_recommendations();
            }
            report.merge(validator.validate_all(entries.iter().map(|(k, q)| (k.as_str(), q))));
        }

        if self.strict {
            report.promote_warnings();
        }

        if !report.is_valid {
            return Err(QuizError::InvalidContent { report });
        }

        for issue in &report.warnings {
            tracing::warn!(code = %issue.code, "{}", issue);
        }

        let registry = QuizRegistry::from_validated(entries)?;
        tracing::info!(
            quizzes = registry.len(),
            fingerprint = %registry.fingerprint(),
            "built quiz registry"
        );

        Ok(LoadOutcome { registry, report })
    }

    fn resolve_duplicates(
        &self,
        quizzes: Vec<SourcedQuiz>,
        report: &mut ValidationReport,
    ) -> Vec<(String, Quiz)> {
        let mut entries: Vec<(String, Quiz)> = Vec::with_capacity(quizzes.len());
        // key -> (position in entries, origin)
        let mut seen: HashMap<String, (usize, String)> = HashMap::new();

        for SourcedQuiz { key, origin, quiz } in quizzes {
            match seen.get_mut(&key) {
                None => {
                    seen.insert(key.clone(), (entries.len(), origin));
                    entries.push((key, quiz));
                }
                Some((position, first_origin)) => match self.duplicate_policy {
                    DuplicatePolicy::Reject => {
                        report.add_error(
                            ValidationIssue::new(
                                "E008",
                                format!(
                                    "duplicate topic key (first in {}, again in {})",
                                    first_origin, origin
                                ),
                            )
                            .with_key(&key)
                            .with_suggestion("Each topic key may be defined once"),
                        );
                    }
                    DuplicatePolicy::LastWins => {
                        tracing::debug!(
                            key = %key,
                            replaced = %first_origin,
                            by = %origin,
                            "duplicate topic key, keeping last"
                        );
                        entries[*position].1 = quiz;
                        *first_origin = origin;
                    }
                },
            }
        }

        entries
    }
}

impl Default for RegistryLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn read_file(path: &Path) -> Result<(String, RawSource)> {
    let name = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|e| QuizError::SourceLoadError {
        path: name.clone(),
        reason: e.to_string(),
    })?;

    let source = RawSource::from_json_str(&name, &content)?;
    Ok((name, source))
}

fn read_directory(dir: &Path) -> Result<Vec<(String, RawSource)>> {
    if !dir.is_dir() {
        return Err(QuizError::SourceLoadError {
            path: dir.display().to_string(),
            reason: "Not a directory".to_string(),
        });
    }

    let dir_str = dir.to_str().ok_or_else(|| QuizError::SourceLoadError {
        path: dir.display().to_string(),
        reason: "Path is not valid UTF-8".to_string(),
    })?;
    let pattern = format!("{}/*.json", glob::Pattern::escape(dir_str));

    let entries = glob::glob(&pattern).map_err(|e| QuizError::SourceLoadError {
        path: dir.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| QuizError::SourceLoadError {
            path: e.path().display().to_string(),
            reason: e.error().to_string(),
        })?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    files.iter().map(|path| read_file(path)).collect()
}
