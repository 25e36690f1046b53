//! Untyped quiz source format
//!
//! The content pipeline emits a JSON object mapping topic keys to loosely
//! typed quiz records:
//!
//! ```json
//! {
//!   "unit-testing": {
//!     "title": "Unit Testing",
//!     "questions": [
//!       { "prompt": "What is a stub?",
//!         "choices": ["A canned response", "A live call"],
//!         "correct": 0 }
//!     ]
//!   }
//! }
//! ```
//!
//! A choice may also be an object (`{"text": "...", "correct": true}`) and
//! `correct` may be a list of indices, which makes the question multi-select.
//!
//! This module is the single conversion point from that shape into the typed
//! [`Quiz`] model. Duplicate keys are kept in document order so the registry
//! can apply its duplicate policy instead of serde silently dropping one.

use std::fmt;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;

use crate::error::{QuizError, Result};
use crate::model::{Choice, Question, Quiz};
use crate::validator::ValidationIssue;

/// One parsed source document, entries in document order
#[derive(Debug, Clone, Default)]
pub struct RawSource {
    pub entries: Vec<(String, RawQuiz)>,
}

impl RawSource {
    /// Parse a JSON document
    pub fn from_json_str(source_name: &str, json: &str) -> Result<Self> {
        let entries: RawEntries =
            serde_json::from_str(json).map_err(|e| QuizError::MalformedSource {
                source_name: source_name.to_string(),
                reason: e.to_string(),
            })?;
        Self::from_entries(source_name, entries)
    }

    /// Parse an already decoded JSON value.
    ///
    /// A `serde_json::Value` object cannot hold a key twice, so duplicates
    /// were already collapsed by the time the value was built.
    pub fn from_value(source_name: &str, value: serde_json::Value) -> Result<Self> {
        let entries: RawEntries =
            serde_json::from_value(value).map_err(|e| QuizError::MalformedSource {
                source_name: source_name.to_string(),
                reason: e.to_string(),
            })?;
        Self::from_entries(source_name, entries)
    }

    /// Decode each entry while its topic key is known, so shape errors name it
    fn from_entries(source_name: &str, raw: RawEntries) -> Result<Self> {
        let mut entries = Vec::with_capacity(raw.0.len());
        for (key, value) in raw.0 {
            let quiz: RawQuiz =
                serde_json::from_value(value).map_err(|e| QuizError::MalformedSource {
                    source_name: source_name.to_string(),
                    reason: format!("topic '{}': {}", key, e),
                })?;
            entries.push((key, quiz));
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Top-level entries as undecoded values, duplicates kept in document order
struct RawEntries(Vec<(String, serde_json::Value)>);

impl<'de> Deserialize<'de> for RawEntries {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = RawEntries;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping topic keys to quizzes")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, serde_json::Value>()? {
                    entries.push(entry);
                }
                Ok(RawEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Quiz record as authored
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawQuiz {
    #[serde(default)]
    pub title: Option<String>,

    /// Missing `questions` is reported by the validator, not by serde
    #[serde(default)]
    pub questions: Vec<RawQuestion>,
}

/// Question record as authored
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawQuestion {
    #[serde(default)]
    pub prompt: String,

    #[serde(default)]
    pub choices: Vec<RawChoice>,

    /// Index or indices of the correct choices
    #[serde(default)]
    pub correct: Option<RawCorrect>,

    /// Explicit multi-select marker; defaults to "correct is a list"
    #[serde(default)]
    pub multiple: Option<bool>,

    #[serde(default)]
    pub explanation: Option<String>,
}

/// A choice: bare text, or text with its own correctness flag
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawChoice {
    Text(String),
    Flagged {
        #[serde(default)]
        text: String,
        #[serde(default)]
        correct: Option<bool>,
    },
}

impl RawChoice {
    fn text(&self) -> &str {
        match self {
            RawChoice::Text(text) | RawChoice::Flagged { text, .. } => text,
        }
    }

    fn flag(&self) -> Option<bool> {
        match self {
            RawChoice::Text(_) => None,
            RawChoice::Flagged { correct, .. } => *correct,
        }
    }
}

/// The `correct` field: one index or a list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawCorrect {
    One(usize),
    Many(Vec<usize>),
}

/// Convert one authored quiz into the typed model.
///
/// Fails with ingestion issues (codes `S001`-`S003`) when the correctness
/// declaration cannot be represented unambiguously. Semantic checks such as
/// "at least two choices" belong to [`crate::validator::QuizValidator`].
pub fn convert(key: &str, raw: RawQuiz) -> std::result::Result<Quiz, Vec<ValidationIssue>> {
    let mut issues = Vec::new();
    let mut questions = Vec::with_capacity(raw.questions.len());

    for (i, question) in raw.questions.into_iter().enumerate() {
        let path = format!("questions[{}]", i);
        match convert_question(key, &path, question) {
            Ok(q) => questions.push(q),
            Err(mut errs) => issues.append(&mut errs),
        }
    }

    if !issues.is_empty() {
        return Err(issues);
    }

    Ok(Quiz {
        title: raw.title,
        questions,
    })
}

fn convert_question(
    key: &str,
    path: &str,
    raw: RawQuestion,
) -> std::result::Result<Question, Vec<ValidationIssue>> {
    let mut issues = Vec::new();
    let has_flags = raw.choices.iter().any(|c| c.flag().is_some());

    let indices: Vec<usize> = match &raw.correct {
        None => vec![],
        Some(RawCorrect::One(i)) => vec![*i],
        Some(RawCorrect::Many(list)) => list.clone(),
    };

    if raw.correct.is_some() && has_flags {
        issues.push(
            ValidationIssue::new(
                "S002",
                "correct answer is declared both by `correct` and by choice flags",
            )
            .with_key(key)
            .with_path(format!("{}.correct", path))
            .with_suggestion("Keep exactly one way of marking the right answer"),
        );
    }

    let mut seen = Vec::with_capacity(indices.len());
    for &index in &indices {
        if index >= raw.choices.len() {
            issues.push(
                ValidationIssue::new(
                    "S001",
                    format!(
                        "correct index {} is out of range for {} choices",
                        index,
                        raw.choices.len()
                    ),
                )
                .with_key(key)
                .with_path(format!("{}.correct", path)),
            );
        } else if seen.contains(&index) {
            issues.push(
                ValidationIssue::new("S003", format!("correct index {} listed twice", index))
                    .with_key(key)
                    .with_path(format!("{}.correct", path)),
            );
        }
        seen.push(index);
    }

    if !issues.is_empty() {
        return Err(issues);
    }

    let multi_select = raw
        .multiple
        .unwrap_or(matches!(raw.correct, Some(RawCorrect::Many(_))));

    let choices = raw
        .choices
        .iter()
        .enumerate()
        .map(|(i, choice)| Choice {
            text: choice.text().to_string(),
            correct: choice.flag().unwrap_or(false) || indices.contains(&i),
        })
        .collect();

    Ok(Question {
        prompt: raw.prompt,
        choices,
        explanation: raw.explanation,
        multi_select,
    })
}
