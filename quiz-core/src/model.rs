//! Quiz content types
//!
//! These are the typed records handed out by the registry. They are plain
//! values: a consumer that wants to modify a quiz clones it, and the copy in
//! the registry stays untouched.

use serde::{Deserialize, Serialize};

/// A set of assessment questions attached to one article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    /// Display title, if the content pipeline provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Questions in presentation order
    pub questions: Vec<Question>,
}

impl Quiz {
    /// Create a new quiz builder
    pub fn builder() -> QuizBuilder {
        QuizBuilder::default()
    }

    /// Number of questions
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Get a question by position
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Grade a full attempt, one selection per question in order.
    ///
    /// Missing selections count as wrong; extra selections are ignored.
    pub fn score(&self, selections: &[Vec<usize>]) -> Score {
        let correct = self
            .questions
            .iter()
            .zip(selections)
            .filter(|(question, selected)| question.is_correct(selected))
            .count();

        Score {
            correct,
            total: self.questions.len(),
        }
    }
}

/// Result of grading an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
}

impl Score {
    /// True when every question was answered correctly
    pub fn is_perfect(&self) -> bool {
        self.total > 0 && self.correct == self.total
    }
}

/// One assessment item within a quiz
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Prompt text
    pub prompt: String,

    /// Choices in presentation order
    pub choices: Vec<Choice>,

    /// Shown after answering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,

    /// Whether more than one choice may be selected
    #[serde(default)]
    pub multi_select: bool,
}

impl Question {
    /// Single-select question with the correct choice given by index.
    ///
    /// An out-of-range index yields a question without a correct choice,
    /// which the validator rejects.
    pub fn single<I, S>(prompt: impl Into<String>, choices: I, correct: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_correct(prompt, choices, &[correct], false)
    }

    /// Multi-select question with the correct choices given by index
    pub fn multiple<I, S>(prompt: impl Into<String>, choices: I, correct: &[usize]) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_correct(prompt, choices, correct, true)
    }

    fn with_correct<I, S>(
        prompt: impl Into<String>,
        choices: I,
        correct: &[usize],
        multi_select: bool,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let choices = choices
            .into_iter()
            .enumerate()
            .map(|(i, text)| Choice {
                text: text.into(),
                correct: correct.contains(&i),
            })
            .collect();

        Self {
            prompt: prompt.into(),
            choices,
            explanation: None,
            multi_select,
        }
    }

    /// Set the explanation
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// Indices of the correct choices, ascending
    pub fn correct_indices(&self) -> Vec<usize> {
        self.choices
            .iter()
            .enumerate()
            .filter(|(_, c)| c.correct)
            .map(|(i, _)| i)
            .collect()
    }

    /// The authoritative answer for this question
    pub fn correct_answer(&self) -> Answer {
        let indices = self.correct_indices();
        match (self.multi_select, indices.as_slice()) {
            (false, [only]) => Answer::Single(*only),
            _ => Answer::Multiple(indices),
        }
    }

    /// Check a learner's selection. Order and repeats in `selected` don't matter.
    pub fn is_correct(&self, selected: &[usize]) -> bool {
        let mut selected = selected.to_vec();
        selected.sort_unstable();
        selected.dedup();
        !selected.is_empty() && selected == self.correct_indices()
    }
}

/// One selectable answer option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Display text
    pub text: String,

    /// Whether selecting this choice is correct
    #[serde(default)]
    pub correct: bool,
}

/// Correct answer of a question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Single(usize),
    Multiple(Vec<usize>),
}

/// Builder for [`Quiz`]
#[derive(Debug, Default)]
pub struct QuizBuilder {
    title: Option<String>,
    questions: Vec<Question>,
}

impl QuizBuilder {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn question(mut self, question: Question) -> Self {
        self.questions.push(question);
        self
    }

    pub fn build(self) -> Quiz {
        Quiz {
            title: self.title,
            questions: self.questions,
        }
    }
}
