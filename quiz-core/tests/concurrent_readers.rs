//! Readers running alongside content swaps only ever see complete registries.

use std::sync::atomic::{AtomicBool, Ordering};

use quiz_core::{Question, Quiz, QuizRegistry, RegistryLoader, SharedRegistry};

const TOPICS: [&str; 4] = ["unit-testing", "schema-design", "observability", "ci-cd"];

/// Every topic's single question carries the generation number in its prompt
fn generation(n: usize) -> QuizRegistry {
    let entries = TOPICS.iter().map(|topic| {
        let quiz = Quiz::builder()
            .question(Question::single(format!("gen-{n}"), ["yes", "no"], 0))
            .build();
        (topic.to_string(), quiz)
    });
    RegistryLoader::new().build(entries).expect("generated content is valid")
}

#[test]
fn readers_see_consistent_snapshots_during_swaps() {
    let shared = SharedRegistry::new(generation(0));
    let done = AtomicBool::new(false);

    crossbeam::scope(|s| {
        for _ in 0..8 {
            s.spawn(|_| {
                while !done.load(Ordering::Acquire) {
                    let snapshot = shared.snapshot();
                    assert_eq!(snapshot.len(), TOPICS.len());

                    // All topics in one snapshot come from the same generation
                    let prompts: Vec<&str> = TOPICS
                        .iter()
                        .map(|t| snapshot.get(t).unwrap().questions[0].prompt.as_str())
                        .collect();
                    assert!(prompts.windows(2).all(|w| w[0] == w[1]), "{prompts:?}");

                    assert!(shared.lookup("unit-testing").is_some());
                    assert!(shared.lookup("not-a-topic").is_none());
                }
            });
        }

        s.spawn(|_| {
            for n in 1..=200 {
                shared.replace(generation(n));
            }
            done.store(true, Ordering::Release);
        });
    })
    .expect("reader or writer thread panicked");

    let last = shared.lookup("ci-cd").unwrap();
    assert_eq!(last.questions[0].prompt, "gen-200");
}

#[test]
fn failed_reload_leaves_readers_on_current_content() {
    let shared = SharedRegistry::new(generation(1));

    crossbeam::scope(|s| {
        for _ in 0..4 {
            s.spawn(|_| {
                for _ in 0..1_000 {
                    let quiz = shared.lookup("observability").unwrap();
                    assert_eq!(quiz.questions[0].prompt, "gen-1");
                }
            });
        }

        s.spawn(|_| {
            for _ in 0..50 {
                let result = shared.reload_with(|| {
                    RegistryLoader::new().load_str(r#"{"observability": {"questions": []}}"#)
                });
                assert!(result.is_err());
            }
        });
    })
    .expect("reader or writer thread panicked");
}
