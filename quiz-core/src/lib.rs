//! # Quiz Core - Topic Quiz Registry
//!
//! Quiz Core holds the quizzes that accompany articles, keyed by the article's
//! topic slug:
//!
//! - **Source**: the generated JSON document the content pipeline emits
//! - **Loader**: parses, validates and assembles sources into a registry, all
//!   or nothing
//! - **Registry**: an immutable topic → quiz map with an exact-match accessor
//! - **Shared**: a process-wide handle that supports atomic content swaps
//!
//! ## Core Principle
//!
//! > A learner never sees a broken quiz.
//!
//! Defective content fails construction at startup. A topic without a quiz is
//! an ordinary `None`, not an error.
//!
//! ## Example
//!
//! ```rust
//! use quiz_core::{Answer, RegistryLoader};
//!
//! let registry = RegistryLoader::new()
//!     .load_str(r#"{
//!         "unit-testing": {
//!             "questions": [{
//!                 "prompt": "What is a stub?",
//!                 "choices": ["A canned response", "A live call"],
//!                 "correct": 0
//!             }]
//!         }
//!     }"#)
//!     .unwrap();
//!
//! let quiz = registry.get("unit-testing").unwrap();
//! assert_eq!(quiz.questions[0].correct_answer(), Answer::Single(0));
//!
//! // Exact keys only
//! assert!(registry.get("unit-testin").is_none());
//! ```

pub mod config;
pub mod error;
pub mod loader;
pub mod model;
pub mod registry;
pub mod shared;
pub mod source;
pub mod validator;

// Re-export main types
pub use config::RegistryConfig;
pub use error::{ErrorCategory, ErrorDetail, ErrorResponse, QuizError, Result};
pub use loader::{LoadOutcome, RegistryLoader};
pub use model::{Answer, Choice, Question, Quiz, QuizBuilder, Score};
pub use registry::{DuplicatePolicy, QuizRegistry, RegistryStats};
pub use shared::SharedRegistry;
pub use validator::{QuizValidator, ValidationIssue, ValidationReport};
