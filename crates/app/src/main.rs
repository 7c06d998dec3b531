use std::fmt;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use async_trait::async_trait;
use quiz_core::model::{Language, QuizLayout};
use quiz_core::share::ShareLink;
use services::{
    AppServices, Clock, FlowStep, PlatformError, QuizConfig, QuizFlow, Screen, SharePayload,
    SharePlatform,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidLayout { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidLayout { raw } => write!(f, "invalid --layout value: {raw}"),
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
    eprintln!("  cargo run -p app -- play   [--db <sqlite_url>] [--layout extended|classic]");
    eprintln!("  cargo run -p app -- status [--db <sqlite_url>] [--layout extended|classic]");
    eprintln!("  cargo run -p app -- link <share_url>");
    eprintln!();
    eprintln!("Commands inside play:");
    eprintln!("  1-4          answer the current question");
    eprintln!("  year <yyyy>  select a birth year (`year -` clears it)");
    eprintln!("  ok           confirm the birth year");
    eprintln!("  back         previous question (restarts on the first)");
    eprintln!("  retry        resubmit after a failure");
    eprintln!("  lang KOR|ENG switch language");
    eprintln!("  share        share the result");
    eprintln!("  reset        start over");
    eprintln!("  quit");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_LAYOUT, QUIZ_API_BASE, QUIZ_API_TIMEOUT_SECS,");
    eprintln!("  QUIZ_SHARE_ORIGIN, QUIZ_SHARE_TITLE, QUIZ_DEFAULT_LANG, QUIZ_FORCE_LANG, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Play,
    Status,
    Link(String),
}

struct Args {
    command: Command,
    db_url: Option<String>,
    layout: Option<QuizLayout>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let command = match args.next().as_deref() {
            None | Some("play") => Command::Play,
            Some("status") => Command::Status,
            Some("link") => Command::Link(require_value(&mut args, "link")?),
            Some("--help" | "-h") => {
                print_usage();
                std::process::exit(0);
            }
            Some(other) => return Err(ArgsError::UnknownArg(other.to_string())),
        };

        let mut db_url = None;
        let mut layout = None;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = Some(normalize_sqlite_url(value));
                }
                "--layout" => {
                    let value = require_value(&mut args, "--layout")?;
                    let parsed = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidLayout { raw: value.clone() })?;
                    layout = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            command,
            db_url,
            layout,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim();
    let path = std::path::Path::new(trimmed.strip_prefix("sqlite:").unwrap_or(trimmed));
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

    let invalid = || ArgsError::InvalidDbUrl {
        raw: db_url.to_string(),
    };
    let path = db_url.strip_prefix("sqlite://").ok_or_else(invalid)?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(invalid().into());
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

/// A terminal has no share sheet or clipboard; the link is printed instead.
struct TerminalSharePlatform;

#[async_trait]
impl SharePlatform for TerminalSharePlatform {
    fn user_agent(&self) -> &str {
        concat!("quiz-cli/", env!("CARGO_PKG_VERSION"))
    }

    fn has_native_share(&self) -> bool {
        false
    }

    fn can_share_files(&self) -> Result<bool, PlatformError> {
        Ok(false)
    }

    fn has_clipboard(&self) -> bool {
        false
    }

    async fn fetch_image(&self, _url: &str) -> Result<Vec<u8>, PlatformError> {
        Err(PlatformError::Unsupported)
    }

    async fn share(&self, _payload: &SharePayload) -> Result<(), PlatformError> {
        Err(PlatformError::Unsupported)
    }

    async fn write_clipboard(&self, _text: &str) -> Result<(), PlatformError> {
        Err(PlatformError::Unsupported)
    }

    fn prompt_manual(&self, text: &str) {
        println!("Copy this link to share your result:\n  {text}");
    }
}

fn print_status(flow: &QuizFlow) {
    let session = flow.store().session();
    println!("language: {}", session.language());
    match flow.screen() {
        Screen::Result => {
            if let Some(result) = session.result() {
                println!("result: type {}", result.display_code());
                println!("image: {}", result.image_ref());
                let metrics = result.metrics();
                if let Some(age) = metrics.skin_age {
                    println!("skin age: {age}");
                }
                if let Some(percentile) = metrics.percentile {
                    println!("percentile: {percentile}");
                }
            }
        }
        Screen::Question { index } => {
            let layout = session.layout();
            println!(
                "question {}/{} ({}%)",
                index + 1,
                layout.question_count(),
                session.progress_percent()
            );
            if session.on_birth_year_question() {
                let options = flow.birth_year_options();
                if let (Some(newest), Some(oldest)) = (options.first(), options.last()) {
                    println!("birth year ({oldest}-{newest}): {:?}", session.birth_year());
                }
            } else {
                println!("current answer: {:?}", session.current_answer());
            }
        }
    }
}

fn print_step(step: &FlowStep) {
    match step {
        FlowStep::Moved { index } => println!("-> question {}", index + 1),
        FlowStep::Completed(result) => println!("-> result type {}", result.display_code()),
        FlowStep::SubmissionFailed { message } => {
            println!("submission failed: {message}");
            println!("type `retry` to try again");
        }
        FlowStep::Restarted => println!("-> started over"),
    }
}

async fn play(app: &AppServices, mut flow: QuizFlow) -> Result<(), Box<dyn std::error::Error>> {
    let mut negotiator = app.share_negotiator(Arc::new(TerminalSharePlatform));
    print_status(&flow);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next().transpose()? else {
            return Ok(());
        };
        let mut words = line.split_whitespace();
        let Some(word) = words.next() else {
            continue;
        };

        match word {
            "quit" | "exit" => return Ok(()),
            "status" => print_status(&flow),
            "back" => print_step(&flow.back().await),
            "reset" => {
                flow.restart().await;
                print_status(&flow);
            }
            "retry" => match flow.submit().await {
                Ok(step) => print_step(&step),
                Err(err) => println!("{err}"),
            },
            "ok" => match flow.confirm_birth_year().await {
                Ok(step) => print_step(&step),
                Err(err) => println!("{err}"),
            },
            "year" => {
                let year = match words.next() {
                    None | Some("-") => None,
                    Some(raw) => match raw.parse() {
                        Ok(year) => Some(year),
                        Err(_) => {
                            println!("not a year: {raw}");
                            continue;
                        }
                    },
                };
                if let Err(err) = flow.select_birth_year(year).await {
                    println!("{err}");
                }
            }
            "lang" => match words.next().map(str::parse::<Language>) {
                Some(Ok(language)) => {
                    if !flow.set_language(language).await {
                        println!("language is fixed for this deployment");
                    }
                }
                Some(Err(err)) => println!("{err}"),
                None => println!("usage: lang KOR|ENG"),
            },
            "share" => match flow.share_artifact(&app.config().share) {
                Some(artifact) => {
                    let outcome = negotiator.share(&artifact).await;
                    tracing::debug!(?outcome, "share done");
                }
                None => println!("finish the quiz first"),
            },
            choice => match choice.parse::<u8>() {
                Ok(choice) => match flow.pick(choice).await {
                    Ok(step) => print_step(&step),
                    Err(err) => println!("{err}"),
                },
                Err(_) => println!("unknown command: {choice} (try --help)"),
            },
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    if let Command::Link(raw) = &args.command {
        let link = ShareLink::parse(raw)?;
        println!("result type {} ({})", link.code(), link.language());
        return Ok(());
    }

    let mut config = QuizConfig::from_env()?;
    config.db_url = args
        .db_url
        .unwrap_or_else(|| normalize_sqlite_url(config.db_url.clone()));
    if let Some(layout) = args.layout {
        config.layout = layout;
    }

    // Open + migrate SQLite here so services only ever see a ready store.
    prepare_sqlite_file(&config.db_url)?;
    let app = AppServices::new_sqlite(config, Clock::system()).await?;
    let flow = app.open_flow().await;

    match args.command {
        Command::Status => {
            print_status(&flow);
            Ok(())
        }
        Command::Play => play(&app, flow).await,
        Command::Link(_) => Ok(()),
    }
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
