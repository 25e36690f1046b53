//! Configuration for registry construction

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{QuizError, Result};
use crate::registry::DuplicatePolicy;

/// How a registry is built and from where
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Run the content validator on load
    #[serde(default = "default_true")]
    pub validate: bool,

    /// Treat validation warnings as errors
    #[serde(default)]
    pub strict: bool,

    /// Report informational recommendations (missing explanations, titles)
    #[serde(default)]
    pub recommendations: bool,

    /// Duplicate topic key handling
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,

    /// Source files or directories, merged in order
    #[serde(default)]
    pub sources: Vec<PathBuf>,
}

fn default_true() -> bool { true }

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            validate: true,
            strict: false,
            recommendations: false,
            duplicate_policy: DuplicatePolicy::Reject,
            sources: vec![],
        }
    }
}

impl RegistryConfig {
    /// Load a JSON config file.
    ///
    /// Relative source paths are resolved against the config file's directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| QuizError::ConfigError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut config: RegistryConfig =
            serde_json::from_str(&content).map_err(|e| QuizError::ConfigError {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        if let Some(base) = path.parent() {
            config.sources = config
                .sources
                .into_iter()
                .map(|p| if p.is_relative() { base.join(p) } else { p })
                .collect();
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_object() {
        let config: RegistryConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, RegistryConfig::default());
        assert!(config.validate);
        assert_eq!(config.duplicate_policy, DuplicatePolicy::Reject);
    }

    #[test]
    fn test_parse_full() {
        let config: RegistryConfig = serde_json::from_str(
            r#"{
                "validate": false,
                "strict": true,
                "recommendations": true,
                "duplicate_policy": "last_wins",
                "sources": ["content/quizzes.json"]
            }"#,
        )
        .unwrap();

        assert!(!config.validate);
        assert!(config.strict);
        assert_eq!(config.duplicate_policy, DuplicatePolicy::LastWins);
        assert_eq!(config.sources, vec![PathBuf::from("content/quizzes.json")]);
    }

    #[test]
    fn test_from_file_resolves_relative_sources() {
        let dir = std::env::temp_dir().join("quiz-core-test-config");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("registry.json");
        fs::write(&path, r#"{"sources": ["quizzes.json", "/abs/other.json"]}"#).unwrap();

        let config = RegistryConfig::from_file(&path).unwrap();
        assert_eq!(config.sources[0], dir.join("quizzes.json"));
        assert_eq!(config.sources[1], PathBuf::from("/abs/other.json"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_from_missing_file() {
        let err = RegistryConfig::from_file("/nonexistent/quiz-registry.json").unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }
}
