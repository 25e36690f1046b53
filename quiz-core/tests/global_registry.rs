//! Process-wide registry lifecycle.
//!
//! Kept to a single test: the global can only be installed once per process.

use quiz_core::{shared, ErrorCategory, QuizError, RegistryLoader};

#[test]
fn global_registry_lifecycle() {
    // Lookup before install is a caller bug, not absence
    let err = shared::lookup("unit-testing").unwrap_err();
    assert!(matches!(err, QuizError::RegistryNotInstalled));
    assert_eq!(err.category(), ErrorCategory::Misuse);
    assert!(shared::global().is_err());

    let registry = RegistryLoader::new()
        .load_str(include_str!("../fixtures/quizzes.json"))
        .unwrap();
    let handle = shared::install(registry).unwrap();
    assert_eq!(handle.snapshot().len(), 4);

    assert!(shared::lookup("unit-testing").unwrap().is_some());
    assert!(shared::lookup("unit-testin").unwrap().is_none());

    // Second install is refused and the first registry keeps serving
    let err = shared::install(RegistryLoader::new().load_str("{}").unwrap()).unwrap_err();
    assert!(matches!(err, QuizError::RegistryAlreadyInstalled));
    assert_eq!(shared::global().unwrap().snapshot().len(), 4);

    // Content changes go through an atomic swap
    let changed = shared::global()
        .unwrap()
        .reload_with(|| RegistryLoader::new().load_str("{}"))
        .unwrap();
    assert!(changed);
    assert!(shared::lookup("unit-testing").unwrap().is_none());
}
