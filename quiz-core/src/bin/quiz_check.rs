//! Quiz Check CLI - build-time gate for quiz content
//!
//! Builds the registry exactly as the application would and fails if the
//! content has defects, so broken quizzes are caught before deploy.
//!
//! Usage:
//!     quiz-check validate content/quizzes.json
//!     quiz-check --strict validate content/quizzes/
//!     quiz-check list content/quizzes.json
//!     quiz-check --json show unit-testing content/quizzes.json
//!     quiz-check --config quiz-registry.json stats

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use quiz_core::{
    DuplicatePolicy, LoadOutcome, QuizError, RegistryConfig, RegistryLoader, ValidationReport,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "quiz-check")]
#[command(about = "Validate and inspect topic quiz content")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Registry config file (JSON); its sources are used when no paths are given
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Treat validation warnings as errors
    #[arg(long, global = true)]
    strict: bool,

    /// Keep the last definition of a duplicated topic key instead of failing
    #[arg(long, global = true)]
    allow_duplicates: bool,

    /// Also report missing explanations and titles
    #[arg(long, global = true)]
    recommendations: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the registry and report every finding
    Validate {
        /// Source files or directories
        paths: Vec<PathBuf>,
    },
    /// List topic keys with their question counts
    List { paths: Vec<PathBuf> },
    /// Print one quiz
    Show {
        /// Topic key, matched exactly
        key: String,
        paths: Vec<PathBuf>,
    },
    /// Print registry counts and fingerprint
    Stats { paths: Vec<PathBuf> },
}

impl Command {
    fn paths(&self) -> &[PathBuf] {
        match self {
            Command::Validate { paths }
            | Command::List { paths }
            | Command::Show { paths, .. }
            | Command::Stats { paths } => paths,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let outcome = match load(&args) {
        Ok(outcome) => outcome,
        Err(e) => {
            print_error(&e, args.json);
            return ExitCode::FAILURE;
        }
    };

    match &args.command {
        Command::Validate { .. } => output_report(&outcome.report, args.json),
        Command::List { .. } => output_list(&outcome, args.json),
        Command::Stats { .. } => {
            let stats = outcome.registry.stats();
            if args.json {
                print_json(&stats);
            } else {
                println!("Quizzes:     {}", stats.quizzes);
                println!("Questions:   {}", stats.questions);
                println!("Choices:     {}", stats.choices);
                println!("Fingerprint: {}", stats.fingerprint);
            }
        }
        Command::Show { key, .. } => match outcome.registry.require(key) {
            Ok(quiz) => print_json(quiz),
            Err(e) => {
                print_error(&e, args.json);
                return ExitCode::FAILURE;
            }
        },
    }

    ExitCode::SUCCESS
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "quiz_core=debug" } else { "quiz_core=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load(args: &Args) -> Result<LoadOutcome, QuizError> {
    let mut config = match &args.config {
        Some(path) => RegistryConfig::from_file(path)?,
        None => RegistryConfig::default(),
    };

    if !args.command.paths().is_empty() {
        config.sources = args.command.paths().to_vec();
    }
    if args.strict {
        config.strict = true;
    }
    if args.allow_duplicates {
        config.duplicate_policy = DuplicatePolicy::LastWins;
    }
    if args.recommendations {
        config.recommendations = true;
    }

    if config.sources.is_empty() {
        return Err(QuizError::ConfigError {
            path: args
                .config
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<command line>".to_string()),
            reason: "no quiz sources given".to_string(),
        });
    }

    RegistryLoader::from_config(&config).load_paths(&config.sources)
}

fn output_report(report: &ValidationReport, json: bool) {
    if json {
        print_json(report);
        return;
    }

    for issue in &report.warnings {
        println!("warning: {}", issue);
    }
    for issue in &report.info {
        println!("info: {}", issue);
    }
    println!("{}", report.summary());
}

fn output_list(outcome: &LoadOutcome, json: bool) {
    if json {
        let keys: Vec<_> = outcome
            .registry
            .iter()
            .map(|(key, quiz)| serde_json::json!({ "key": key, "questions": quiz.question_count() }))
            .collect();
        print_json(&keys);
        return;
    }

    for (key, quiz) in outcome.registry.iter() {
        println!("  {} ({} questions)", key, quiz.question_count());
    }
    println!();
    println!("Total: {} quizzes", outcome.registry.len());
}

fn print_error(err: &QuizError, json: bool) {
    if json {
        print_json(&err.to_error_response());
        return;
    }

    match err {
        QuizError::InvalidContent { report } => {
            for issue in &report.errors {
                eprintln!("error: {}", issue);
                if let Some(suggestion) = &issue.suggestion {
                    eprintln!("  help: {}", suggestion);
                }
            }
            eprintln!("{}", report.summary());
        }
        other => eprintln!("error: {}", other),
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("error: failed to encode JSON: {}", e),
    }
}
