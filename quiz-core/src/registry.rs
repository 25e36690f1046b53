//! Quiz Registry
//!
//! An immutable map from topic key to [`Quiz`]. A registry is only produced
//! by [`RegistryLoader`](crate::loader::RegistryLoader), which validates the
//! content first, so every registry in existence is complete and well formed.
//! There is no API that changes a registry after construction.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{QuizError, Result};
use crate::loader::RegistryLoader;
use crate::model::Quiz;

/// What to do when the same topic key appears more than once in the source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Fail construction (default)
    #[default]
    Reject,
    /// Keep the entry that appears last in source order.
    ///
    /// Every occurrence is still converted first, so an earlier entry with
    /// an ingestion error (`S001`-`S003`) fails the load even though a later
    /// entry would have replaced it.
    LastWins,
}

/// Counts describing a built registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    pub quizzes: usize,
    pub questions: usize,
    pub choices: usize,
    pub built_at: DateTime<Utc>,
    pub fingerprint: String,
}

/// The read-only topic → quiz registry
#[derive(Debug, Clone)]
pub struct QuizRegistry {
    quizzes: HashMap<String, Arc<Quiz>>,

    /// SHA-256 over the canonical content, hex encoded
    fingerprint: String,

    built_at: DateTime<Utc>,
}

impl QuizRegistry {
    /// Assemble a registry from already validated, de-duplicated entries
    pub(crate) fn from_validated(entries: Vec<(String, Quiz)>) -> Result<Self> {
        let quizzes: HashMap<String, Arc<Quiz>> = entries
            .into_iter()
            .map(|(key, quiz)| (key, Arc::new(quiz)))
            .collect();

        let fingerprint = compute_fingerprint(&quizzes)?;

        Ok(Self {
            quizzes,
            fingerprint,
            built_at: Utc::now(),
        })
    }

    /// Build a registry from a JSON source with default loader settings:
    /// validation on, duplicate keys rejected
    pub fn from_json_str(json: &str) -> Result<Self> {
        RegistryLoader::new().load_str(json)
    }

    /// Build a registry from typed entries with default loader settings
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, Quiz)>,
    {
        RegistryLoader::new().build(entries)
    }

    /// A registry with no quizzes
    pub fn empty() -> Self {
        Self {
            quizzes: HashMap::new(),
            fingerprint: hex::encode(Sha256::digest(b"")),
            built_at: Utc::now(),
        }
    }

    /// Look up the quiz for a topic.
    ///
    /// The key is matched exactly (case-sensitive, no trimming). `None` means
    /// no quiz was authored for the topic.
    pub fn get(&self, key: &str) -> Option<&Quiz> {
        self.quizzes.get(key).map(Arc::as_ref)
    }

    /// Like [`get`](Self::get) but returns shared ownership, for callers that
    /// outlive the registry borrow (e.g. across a hot swap)
    pub fn get_shared(&self, key: &str) -> Option<Arc<Quiz>> {
        self.quizzes.get(key).cloned()
    }

    /// Like [`get`](Self::get) but treats absence as an error
    pub fn require(&self, key: &str) -> Result<&Quiz> {
        self.get(key).ok_or_else(|| QuizError::QuizNotFound {
            key: key.to_string(),
        })
    }

    /// Check if a quiz is registered for a topic
    pub fn contains(&self, key: &str) -> bool {
        self.quizzes.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.quizzes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quizzes.is_empty()
    }

    /// All topic keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.quizzes.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// All entries, sorted by key
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Quiz)> {
        let mut entries: Vec<(&str, &Quiz)> = self
            .quizzes
            .iter()
            .map(|(k, q)| (k.as_str(), q.as_ref()))
            .collect();
        entries.sort_unstable_by_key(|(k, _)| *k);
        entries.into_iter()
    }

    /// Content digest; equal content gives an equal fingerprint
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// When this registry was constructed
    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn stats(&self) -> RegistryStats {
        let questions = self.quizzes.values().map(|q| q.questions.len()).sum();
        let choices = self
            .quizzes
            .values()
            .flat_map(|q| q.questions.iter())
            .map(|q| q.choices.len())
            .sum();

        RegistryStats {
            quizzes: self.quizzes.len(),
            questions,
            choices,
            built_at: self.built_at,
            fingerprint: self.fingerprint.clone(),
        }
    }
}

impl Default for QuizRegistry {
    fn default() -> Self {
        Self::empty()
    }
}

/// Hash keys and canonical JSON in sorted key order
fn compute_fingerprint(quizzes: &HashMap<String, Arc<Quiz>>) -> Result<String> {
    let mut keys: Vec<&String> = quizzes.keys().collect();
    keys.sort_unstable();

    let mut hasher = Sha256::new();
    for key in keys {
        hasher.update(key.as_bytes());
        hasher.update([0u8]);
        hasher.update(serde_json::to_vec(quizzes[key].as_ref())?);
        hasher.update([0u8]);
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Question;

    fn quiz(prompt: &str) -> Quiz {
        Quiz::builder()
            .question(Question::single(prompt, ["yes", "no"], 0))
            .build()
    }

    fn registry() -> QuizRegistry {
        QuizRegistry::from_validated(vec![
            ("unit-testing".to_string(), quiz("What is a stub?")),
            ("databases".to_string(), quiz("What is an index?")),
        ])
        .unwrap()
    }

    #[test]
    fn test_get_and_absence() {
        let registry = registry();

        assert_eq!(registry.get("unit-testing"), Some(&quiz("What is a stub?")));
        assert!(registry.get("unit-testin").is_none());
        assert!(registry.get("Unit-Testing").is_none());
        assert!(registry.get(" unit-testing").is_none());
    }

    #[test]
    fn test_require() {
        let registry = registry();
        assert!(registry.require("databases").is_ok());

        let err = registry.require("missing").unwrap_err();
        assert_eq!(err.error_code(), "QUIZ_NOT_FOUND");
    }

    #[test]
    fn test_keys_sorted() {
        let registry = registry();
        assert_eq!(registry.keys(), vec!["databases", "unit-testing"]);
        let iterated: Vec<&str> = registry.iter().map(|(k, _)| k).collect();
        assert_eq!(iterated, vec!["databases", "unit-testing"]);
    }

    #[test]
    fn test_get_shared_points_at_same_quiz() {
        let registry = registry();
        let a = registry.get_shared("databases").unwrap();
        let b = registry.get_shared("databases").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_fingerprint_depends_on_content_only() {
        let a = registry();
        let b = QuizRegistry::from_validated(vec![
            ("databases".to_string(), quiz("What is an index?")),
            ("unit-testing".to_string(), quiz("What is a stub?")),
        ])
        .unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());

        let c = QuizRegistry::from_validated(vec![(
            "databases".to_string(),
            quiz("What is a B-tree?"),
        )])
        .unwrap();
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn test_empty() {
        let registry = QuizRegistry::empty();
        assert!(registry.is_empty());
        assert!(registry.get("anything").is_none());
        assert_eq!(registry.stats().quizzes, 0);
    }

    #[test]
    fn test_from_json_str() {
        let registry = QuizRegistry::from_json_str(
            r#"{"unit-testing": {"questions": [
                {"prompt": "What is a stub?", "choices": ["A canned response", "A live call"], "correct": 0}
            ]}}"#,
        )
        .unwrap();
        assert_eq!(registry.keys(), vec!["unit-testing"]);

        let err =
            QuizRegistry::from_json_str(r#"{"unit-testing": {"questions": []}}"#).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONTENT");
    }

    #[test]
    fn test_from_entries() {
        let registry = QuizRegistry::from_entries(vec![
            ("databases".to_string(), quiz("What is an index?")),
            ("testing".to_string(), quiz("What is a mock?")),
        ])
        .unwrap();
        assert_eq!(registry.get("testing"), Some(&quiz("What is a mock?")));

        let err = QuizRegistry::from_entries(vec![
            ("databases".to_string(), quiz("One")),
            ("databases".to_string(), quiz("Two")),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("E008"));
    }

    #[test]
    fn test_stats() {
        let stats = registry().stats();
        assert_eq!(stats.quizzes, 2);
        assert_eq!(stats.questions, 2);
        assert_eq!(stats.choices, 4);
    }
}
