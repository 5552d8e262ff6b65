use std::fmt;
use std::io::{BufRead, Write};
use std::time::Duration;

use services::{AppServices, BootstrapConfig, Clock, QuizError, StudyTimer};
use storage::repository::Storage;
use storage::seed::seed_if_empty;
use study_core::model::AnswerChoice;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidTimeout { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidTimeout { raw } => write!(f, "invalid --timeout-secs value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- quiz [--db <sqlite_url>] [--no-db] [--timeout-secs <n>]");
    eprintln!("  cargo run -p app -- seed [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults for quiz:");
    eprintln!("  --db {DEFAULT_DB_URL}  (relative paths resolve against the working directory)");
    eprintln!("  --timeout-secs 5");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  STUDY_DB_URL");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Quiz,
    Seed,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "quiz" => Some(Self::Quiz),
            "seed" => Some(Self::Seed),
            _ => None,
        }
    }
}

const DEFAULT_DB_URL: &str = "sqlite:study.sqlite3";

#[derive(Debug)]
struct Args {
    db_url: Option<String>,
    init_timeout: Duration,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = Some(normalize_sqlite_url(
            std::env::var("STUDY_DB_URL")
                .ok()
                .unwrap_or_else(|| DEFAULT_DB_URL.into()),
        ));
        let mut init_timeout = Duration::from_secs(5);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = Some(normalize_sqlite_url(value));
                }
                "--no-db" => {
                    db_url = None;
                }
                "--timeout-secs" => {
                    let value = require_value(args, "--timeout-secs")?;
                    let secs: u64 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidTimeout { raw: value.clone() })?;
                    init_timeout = Duration::from_secs(secs);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            init_timeout,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") || raw.starts_with("sqlite:file:") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" || db_url.starts_with("sqlite:file:") {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: start a quiz when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Quiz,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Quiz,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    if let Some(db_url) = &parsed.db_url {
        prepare_sqlite_file(db_url)?;
    }

    match cmd {
        Command::Quiz => {
            let config = BootstrapConfig {
                database_url: parsed.db_url,
                init_timeout: parsed.init_timeout,
            };
            let app = AppServices::bootstrap(config, Clock::default_clock()).await?;
            if app.is_degraded() {
                eprintln!("note: database unavailable, progress on questions will not persist");
            }
            run_quiz(&app).await
        }
        Command::Seed => {
            let Some(db_url) = parsed.db_url else {
                return Err(ArgsError::MissingValue { flag: "--db" }.into());
            };
            let storage = Storage::sqlite(&db_url).await?;
            if seed_if_empty(&storage).await? {
                println!(
                    "seeded {} categories and {} questions",
                    storage::seed::SEED_CATEGORY_COUNT,
                    storage::seed::SEED_QUESTION_COUNT
                );
            } else {
                println!("database already has questions, nothing to do");
            }
            Ok(())
        }
    }
}

async fn run_quiz(app: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    let categories = app.question_store().list_categories().await;
    println!("Categories:");
    for (i, category) in categories.iter().enumerate() {
        match category.description() {
            Some(description) => println!("  {}. {} ({description})", i + 1, category.name()),
            None => println!("  {}. {}", i + 1, category.name()),
        }
    }

    let category = loop {
        print!("Pick a category (1-{}): ", categories.len());
        std::io::stdout().flush()?;
        let Some(line) = lines.next() else {
            return Ok(());
        };
        let line = line?;
        match line.trim().parse::<usize>() {
            Ok(n) if n >= 1 && n <= categories.len() => break &categories[n - 1],
            _ => println!("please enter a number between 1 and {}", categories.len()),
        }
    };

    let mut quiz = app.quiz_service();
    let mut timer = app.study_timer().await?;
    timer.start(app.clock().now());

    match quiz.start(category.id()).await {
        Ok(_) => {}
        Err(QuizError::NoQuestions) => {
            println!("No questions available for {} yet.", category.name());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }

    loop {
        let Some(view) = quiz.view() else {
            break;
        };
        println!();
        println!(
            "Question {}/{} (answered {}):",
            view.position, view.total, view.answered_count
        );
        println!("  {}", view.question_text);
        for (choice, option) in AnswerChoice::ALL.iter().zip(&view.options) {
            let marker = if view.selection == Some(*choice) {
                "*"
            } else {
                " "
            };
            println!(" {marker}{choice}) {option}");
        }
        print!("[A-D] answer, n(ext), p(revious), s(ubmit), q(uit): ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let input = line?.trim().to_lowercase();
        match input.as_str() {
            "n" => {
                quiz.go_to_next()?;
            }
            "p" => {
                quiz.go_to_previous()?;
            }
            "s" => {
                let score = quiz.submit().await?;
                println!();
                println!(
                    "Score: {}/{} correct ({}%)",
                    score.correct, score.total, score.percent
                );
                break;
            }
            "q" => {
                quiz.restart();
                println!("Quiz discarded.");
                break;
            }
            other => match other.parse::<AnswerChoice>() {
                Ok(choice) => {
                    quiz.select_answer(choice)?;
                }
                Err(_) => println!("unrecognized input: {other}"),
            },
        }
    }

    timer.pause(app.clock().now()).await?;
    print_progress(app, &timer).await;
    Ok(())
}

async fn print_progress(app: &AppServices, timer: &StudyTimer) {
    let Ok(stats) = app.progress().snapshot() else {
        return;
    };
    println!();
    println!("Overall progress:");
    println!("  exercises completed: {}", stats.exercises_completed());
    println!("  questions answered:  {}", stats.questions_answered());
    println!("  correct answers:     {}", stats.correct_answers());
    println!("  accuracy:            {}%", stats.accuracy_percent());
    println!(
        "  study time:          {}",
        StudyTimer::format_hms(timer.total_seconds(app.clock().now()))
    );
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_become_absolute_sqlite_urls() {
        let url = normalize_sqlite_url("study.sqlite3".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("study.sqlite3"));
    }

    #[test]
    fn default_db_url_normalizes_to_an_absolute_url() {
        let url = normalize_sqlite_url(DEFAULT_DB_URL.into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("study.sqlite3"));
    }

    #[test]
    fn db_flag_values_are_normalized_like_the_default() {
        let mut args = ["--db", "study.sqlite3"].into_iter().map(String::from);
        let parsed = Args::parse(&mut args).unwrap();
        let db_url = parsed.db_url.unwrap();
        assert!(db_url.starts_with("sqlite:///"));
        assert!(db_url.ends_with("study.sqlite3"));
    }

    #[test]
    fn memory_and_prefixed_urls_pass_through() {
        assert_eq!(
            normalize_sqlite_url("sqlite::memory:".into()),
            "sqlite::memory:"
        );
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/a.db".into()),
            "sqlite:///tmp/a.db"
        );
        assert_eq!(
            normalize_sqlite_url("sqlite:file:db?mode=memory".into()),
            "sqlite:file:db?mode=memory"
        );
    }

    #[test]
    fn parse_accepts_no_db_and_timeout() {
        let mut args = ["--no-db", "--timeout-secs", "9"]
            .into_iter()
            .map(String::from);
        let parsed = Args::parse(&mut args).unwrap();
        assert_eq!(parsed.db_url, None);
        assert_eq!(parsed.init_timeout, Duration::from_secs(9));
    }

    #[test]
    fn parse_rejects_unknown_flags() {
        let mut args = ["--what"].into_iter().map(String::from);
        assert!(matches!(
            Args::parse(&mut args).unwrap_err(),
            ArgsError::UnknownArg(_)
        ));
    }
}
