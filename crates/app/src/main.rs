use std::fmt;

use lesson_core::model::{GeneratedContent, QuizQuestion};
use services::{
    ActivityPhase, AppServices, Clock, LessonRunner, Navigation, ProgressOverview, RunnerState,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_DB_URL: &str = "sqlite:adventure.sqlite3";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingLessonId,
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingLessonId => write!(f, "lesson requires a lesson id"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
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
    eprintln!("  cargo run -p app -- [profile]     [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- lesson <id>   [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- reset         [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  ADVENTURE_DB_URL, ADVENTURE_AI_API_KEY, ADVENTURE_AI_BASE_URL, ADVENTURE_AI_MODEL");
    eprintln!("  RUST_LOG (default: info)");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Profile,
    Lesson(String),
    Reset,
}

struct Args {
    command: Command,
    db_url: String,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, ArgsError> {
        let mut args = args.into_iter().peekable();
        let has_subcommand = args.peek().is_some_and(|arg| !arg.starts_with('-'));
        let command = match args.next_if(|_| has_subcommand).as_deref() {
            None | Some("profile") => Command::Profile,
            Some("reset") => Command::Reset,
            Some("lesson") => {
                let id = args
                    .next()
                    .filter(|id| !id.starts_with('-') && !id.trim().is_empty())
                    .ok_or(ArgsError::MissingLessonId)?;
                Command::Lesson(id)
            }
            Some(other) => return Err(ArgsError::UnknownArg(other.to_owned())),
        };

        let mut db_url = std::env::var("ADVENTURE_DB_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DB_URL.to_owned());
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            command,
            db_url: normalize_sqlite_url(db_url),
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim();
    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = std::path::Path::new(path_str);
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
    if db_url == "sqlite::memory:" {
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

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn print_overview(overview: &ProgressOverview) {
    println!(
        "Progress: {}/{} items ({}%), {} points, {}/{} lessons complete",
        overview.completed_items,
        overview.total_items,
        overview.percent(),
        overview.total_score,
        overview.completed_lessons,
        overview.lesson_count,
    );
    for lesson in &overview.lessons {
        let marker = if lesson.is_complete() {
            "done"
        } else if lesson.unlocked {
            "open"
        } else {
            "locked"
        };
        println!(
            "  [{marker:>6}] {:<14} {:<28} {}/{} items, {} pts",
            lesson.lesson_id.as_str(),
            lesson.title,
            lesson.completed,
            lesson.total,
            lesson.score,
        );
    }
}

fn print_content(runner: &LessonRunner, content: &GeneratedContent) {
    let total = runner.lesson().item_count();
    println!();
    println!(
        "{} ({}/{})",
        runner.lesson().title(),
        runner.index() + 1,
        total
    );
    println!("    {}", content.display_script());
    let fields = [
        ("Sound", &content.pronunciation),
        ("Combined", &content.combined_sound),
        ("About", &content.description),
        ("Example", &content.example_word),
        ("Sentence", &content.sentence),
        ("Picture", &content.image_suggestion),
    ];
    for (label, value) in fields {
        if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
            println!("  {label}: {value}");
        }
    }
}

fn print_quiz(quiz: &QuizQuestion) {
    println!();
    println!("Quiz: {}", quiz.question);
    for (i, option) in quiz.options.iter().enumerate() {
        println!("  {}) {}", i + 1, option.text);
    }
}

async fn prompt(
    lines: &mut Lines<BufReader<Stdin>>,
    text: &str,
) -> Result<Option<String>, std::io::Error> {
    println!("{text}");
    Ok(lines.next_line().await?.map(|line| line.trim().to_lowercase()))
}

async fn run_lesson(services: &AppServices, lesson_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut runner = match services.open_lesson(lesson_id).await {
        Ok(runner) => runner,
        Err(err) => {
            warn!(lesson_id, error = %err, "cannot open lesson");
            println!("No lesson called {lesson_id}. Back home.");
            print_overview(&services.progress_store().overview().await);
            return Ok(());
        }
    };
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        match runner.state() {
            RunnerState::Loading(_) => {
                println!("Loading...");
                runner.load_current().await?;
            }
            RunnerState::Activity(ActivityPhase::Loading) => {
                println!("Preparing the quiz...");
                runner.load_quiz().await?;
            }
            RunnerState::Ready(_) => {
                if let Some(content) = runner.content() {
                    print_content(&runner, content);
                }
                let Some(input) = prompt(&mut lines, "[n]ext  [p]revious  [q]uit").await? else {
                    runner.abandon();
                    continue;
                };
                match input.as_str() {
                    "n" | "" => {
                        runner.next().await?;
                    }
                    "p" if runner.can_go_previous() => {
                        runner.previous()?;
                    }
                    "q" => {
                        runner.abandon();
                    }
                    _ => println!("?"),
                }
            }
            RunnerState::Error(_) => {
                println!(
                    "{}",
                    runner.error().unwrap_or("Something went wrong.")
                );
                let Some(input) = prompt(&mut lines, "[r]etry  [p]revious  [q]uit").await? else {
                    runner.abandon();
                    continue;
                };
                match input.as_str() {
                    "r" | "" => {
                        runner.retry()?;
                    }
                    "p" if runner.can_go_previous() => {
                        runner.previous()?;
                    }
                    "q" => {
                        runner.abandon();
                    }
                    _ => println!("?"),
                }
            }
            RunnerState::Activity(_) => {
                if let Some(answer) = runner.answer() {
                    if answer.correct {
                        println!("Correct! +{} points", answer.points_awarded);
                    } else {
                        println!("Not quite.");
                    }
                    if let Some(explanation) = &answer.explanation {
                        println!("  {explanation}");
                    }
                    prompt(&mut lines, "Press enter to close.").await?;
                    runner.close_activity().await?;
                    continue;
                }
                if let Some(quiz) = runner.quiz() {
                    print_quiz(quiz);
                }
                let Some(input) = prompt(&mut lines, "Answer with a number, or [c]lose").await?
                else {
                    runner.close_activity().await?;
                    continue;
                };
                if input == "c" {
                    runner.close_activity().await?;
                    continue;
                }
                match input.parse::<usize>() {
                    Ok(choice) if choice >= 1 => {
                        if runner.submit_answer(choice - 1).await.is_err() {
                            println!("?");
                        }
                    }
                    _ => println!("?"),
                }
            }
            RunnerState::Locked => {
                println!("Lesson {lesson_id} is locked. Finish the earlier lessons first.");
                return Ok(());
            }
            RunnerState::Done => {
                match runner.redirect() {
                    Some(Navigation::Lesson(next)) => {
                        println!("Next lesson unlocked: cargo run -p app -- lesson {next}");
                    }
                    _ => println!("Back home."),
                }
                return Ok(());
            }
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    if matches!(argv.first().map(String::as_str), Some("--help" | "-h")) {
        print_usage();
        return Ok(());
    }

    let args = Args::parse(argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup; the services crate never touches the filesystem.
    prepare_sqlite_file(&args.db_url)?;
    let services = AppServices::new_sqlite(&args.db_url, Clock::default_clock()).await?;
    info!(db_url = %args.db_url, "storage ready");

    match args.command {
        Command::Profile => {
            print_overview(&services.progress_store().overview().await);
            Ok(())
        }
        Command::Lesson(id) => run_lesson(&services, &id).await,
        Command::Reset => {
            services.progress_store().reset().await;
            println!("Progress reset.");
            print_overview(&services.progress_store().overview().await);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
