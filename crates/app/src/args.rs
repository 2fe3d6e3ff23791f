use std::fmt;

use quiz_core::model::{Difficulty, ParseDifficultyError};

#[derive(Debug)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    MissingUsername,
    InvalidDifficulty(ParseDifficultyError),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::MissingUsername => write!(f, "register requires a username"),
            ArgsError::InvalidDifficulty(e) => write!(f, "invalid --difficulty value: {e}"),
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

/// Values taken from the environment before flags are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    pub db_url: String,
    pub user: Option<String>,
}

impl Defaults {
    pub fn from_env() -> Self {
        Self {
            db_url: normalize_sqlite_url(
                std::env::var("QUIZ_DB_URL")
                    .ok()
                    .filter(|v| !v.trim().is_empty())
                    .unwrap_or_else(|| "quiz.sqlite3".into()),
            ),
            user: std::env::var("QUIZ_USER")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Play {
        difficulty: Difficulty,
        user: Option<String>,
    },
    Leaderboard {
        all: bool,
        user: Option<String>,
    },
    Register {
        username: String,
    },
    Reset,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub db_url: String,
    pub command: Command,
}

impl Args {
    /// Parse `argv` without the program name. No subcommand means `play`.
    pub fn parse(
        argv: impl IntoIterator<Item = String>,
        defaults: Defaults,
    ) -> Result<Self, ArgsError> {
        let mut args = argv.into_iter().peekable();
        let explicit = args
            .peek()
            .is_some_and(|first| !first.starts_with('-') || first == "--help" || first == "-h");
        let sub = if explicit {
            args.next().unwrap_or_default()
        } else {
            "play".to_string()
        };

        let mut db_url = defaults.db_url;
        let mut user = defaults.user;
        let mut difficulty = Difficulty::default();
        let mut all = false;
        let mut username: Option<String> = None;

        if matches!(sub.as_str(), "--help" | "-h" | "help") {
            return Ok(Self {
                db_url,
                command: Command::Help,
            });
        }
        if !matches!(sub.as_str(), "play" | "leaderboard" | "register" | "reset") {
            return Err(ArgsError::UnknownCommand(sub));
        }

        while let Some(arg) = args.next() {
            match (sub.as_str(), arg.as_str()) {
                (_, "--db") => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                (_, "--help" | "-h") => {
                    return Ok(Self {
                        db_url,
                        command: Command::Help,
                    });
                }
                ("play" | "leaderboard", "--user") => {
                    user = Some(require_value(&mut args, "--user")?);
                }
                ("play", "--difficulty") => {
                    let value = require_value(&mut args, "--difficulty")?;
                    difficulty = value.parse().map_err(ArgsError::InvalidDifficulty)?;
                }
                ("leaderboard", "--all") => all = true,
                ("register", name) if !name.starts_with('-') && username.is_none() => {
                    username = Some(name.to_string());
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let command = match sub.as_str() {
            "play" => Command::Play { difficulty, user },
            "leaderboard" => Command::Leaderboard { all, user },
            "register" => Command::Register {
                username: username.ok_or(ArgsError::MissingUsername)?,
            },
            _ => Command::Reset,
        };
        Ok(Self { db_url, command })
    }
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  quiz play        [--difficulty easy|medium|hard] [--user <name>] [--db <sqlite_url>]");
    eprintln!("  quiz leaderboard [--all] [--user <name>] [--db <sqlite_url>]");
    eprintln!("  quiz register    <username> [--db <sqlite_url>]");
    eprintln!("  quiz reset       [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  subcommand play, --difficulty easy, --db sqlite://quiz.sqlite3");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_USER, RUST_LOG");
}

pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
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

/// Make sure the database file and its directory exist before connecting.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), ArgsError> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let invalid = || ArgsError::InvalidDbUrl {
        raw: db_url.to_string(),
    };
    let path = db_url.strip_prefix("sqlite://").ok_or_else(invalid)?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(invalid());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|_| invalid())?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .map_err(|_| invalid())?;
    }
    Ok(())
}
