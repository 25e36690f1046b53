//! Process-wide registry with atomic replacement.
//!
//! Uses `arc-swap` for lock-free reads. Readers take a snapshot `Arc` and
//! keep seeing that registry even if content is swapped underneath them;
//! they never observe a half-built registry because a replacement is fully
//! constructed before it is published.
//!
//! ```text
//!   render 1 ──┐
//!   render 2 ──┼── lookup() ──▶ ArcSwap<QuizRegistry> ◀── replace() / reload_with()
//!   render N ──┘   (lock-free)                             (atomic store)
//! ```
//!
//! Most callers install once at startup and only read afterwards:
//!
//! ```rust
//! use quiz_core::{shared, RegistryLoader};
//!
//! let registry = RegistryLoader::new()
//!     .load_str(r#"{"unit-testing": {"questions": [
//!         {"prompt": "What is a stub?", "choices": ["A canned response", "A live call"], "correct": 0}
//!     ]}}"#)
//!     .expect("content is valid");
//! shared::install(registry).expect("installed once");
//!
//! assert!(shared::lookup("unit-testing").unwrap().is_some());
//! assert!(shared::lookup("no-such-topic").unwrap().is_none());
//! ```

use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use crate::error::{QuizError, Result};
use crate::model::Quiz;
use crate::registry::QuizRegistry;

/// A registry handle shared by all readers
#[derive(Debug)]
pub struct SharedRegistry {
    current: ArcSwap<QuizRegistry>,
}

impl SharedRegistry {
    pub fn new(registry: QuizRegistry) -> Self {
        Self {
            current: ArcSwap::from_pointee(registry),
        }
    }

    /// Current registry. Stays valid after a later swap.
    #[inline]
    pub fn snapshot(&self) -> Arc<QuizRegistry> {
        self.current.load_full()
    }

    /// Look up a quiz in the current registry
    #[inline]
    pub fn lookup(&self, key: &str) -> Option<Arc<Quiz>> {
        self.current.load().get_shared(key)
    }

    /// Publish a new registry, returning the previous one
    pub fn replace(&self, registry: QuizRegistry) -> Arc<QuizRegistry> {
        tracing::info!(
            quizzes = registry.len(),
            fingerprint = %registry.fingerprint(),
            "replacing quiz registry"
        );
        self.current.swap(Arc::new(registry))
    }

    /// Build a replacement with `build` and publish it if its content differs.
    ///
    /// Returns `Ok(false)` when the new content has the same fingerprint. On
    /// error the current registry keeps serving.
    pub fn reload_with<F>(&self, build: F) -> Result<bool>
    where
        F: FnOnce() -> Result<QuizRegistry>,
    {
        let next = match build() {
            Ok(next) => next,
            Err(e) => {
                tracing::warn!(error = %e, "quiz registry reload failed; keeping current content");
                return Err(e);
            }
        };

        if next.fingerprint() == self.current.load().fingerprint() {
            tracing::debug!("quiz content unchanged; skipping swap");
            return Ok(false);
        }

        self.replace(next);
        Ok(true)
    }
}

impl Default for SharedRegistry {
    fn default() -> Self {
        Self::new(QuizRegistry::empty())
    }
}

static GLOBAL: OnceLock<SharedRegistry> = OnceLock::new();

/// Install the process-wide registry. May be called once.
pub fn install(registry: QuizRegistry) -> Result<&'static SharedRegistry> {
    let mut slot = Some(registry);
    let shared = GLOBAL.get_or_init(|| {
        let registry = slot.take().unwrap_or_default();
        tracing::info!(quizzes = registry.len(), "installed quiz registry");
        SharedRegistry::new(registry)
    });

    if slot.is_some() {
        return Err(QuizError::RegistryAlreadyInstalled);
    }
    Ok(shared)
}

/// The process-wide registry handle
pub fn global() -> Result<&'static SharedRegistry> {
    GLOBAL.get().ok_or(QuizError::RegistryNotInstalled)
}

/// Look up a quiz in the process-wide registry.
///
/// `Ok(None)` means no quiz exists for the topic. An error means the caller
/// looked up before [`install`], which is a startup ordering bug.
pub fn lookup(key: &str) -> Result<Option<Arc<Quiz>>> {
    Ok(global()?.lookup(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::RegistryLoader;
    use crate::model::Question;

    fn registry_with(prompt: &str) -> QuizRegistry {
        let quiz = Quiz::builder()
            .question(Question::single(prompt, ["yes", "no"], 0))
            .build();
        RegistryLoader::new()
            .build(vec![("databases".to_string(), quiz)])
            .unwrap()
    }

    #[test]
    fn test_lookup_and_snapshot() {
        let shared = SharedRegistry::new(registry_with("Index?"));
        assert_eq!(shared.lookup("databases").unwrap().questions[0].prompt, "Index?");
        assert!(shared.lookup("testing").is_none());
        assert_eq!(shared.snapshot().len(), 1);
    }

    #[test]
    fn test_replace_keeps_old_snapshot_alive() {
        let shared = SharedRegistry::new(registry_with("Old"));
        let before = shared.snapshot();
        let held = shared.lookup("databases").unwrap();

        let previous = shared.replace(registry_with("New"));

        assert!(Arc::ptr_eq(&before, &previous));
        assert_eq!(held.questions[0].prompt, "Old");
        assert_eq!(before.get("databases").unwrap().questions[0].prompt, "Old");
        assert_eq!(shared.lookup("databases").unwrap().questions[0].prompt, "New");
    }

    #[test]
    fn test_reload_with_unchanged_content() {
        let shared = SharedRegistry::new(registry_with("Same"));
        let changed = shared.reload_with(|| Ok(registry_with("Same"))).unwrap();
        assert!(!changed);

        let changed = shared.reload_with(|| Ok(registry_with("Different"))).unwrap();
        assert!(changed);
        assert_eq!(shared.lookup("databases").unwrap().questions[0].prompt, "Different");
    }

    #[test]
    fn test_reload_failure_keeps_current() {
        let shared = SharedRegistry::new(registry_with("Current"));
        let result = shared.reload_with(|| RegistryLoader::new().load_str("{ broken"));

        assert!(result.is_err());
        assert_eq!(shared.lookup("databases").unwrap().questions[0].prompt, "Current");
    }

    #[test]
    fn test_default_is_empty() {
        let shared = SharedRegistry::default();
        assert!(shared.snapshot().is_empty());
        assert!(shared.lookup("anything").is_none());
    }
}
