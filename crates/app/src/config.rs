use std::fmt;
use std::path::{Path, PathBuf};

use permit_core::LocalCalendar;

use crate::logging::LogFormat;

pub const DEFAULT_DB_URL: &str = "sqlite://permit.sqlite3";

pub const ENV_DB_URL: &str = "PERMIT_DB_URL";
pub const ENV_UTC_OFFSET: &str = "PERMIT_UTC_OFFSET_MINUTES";
pub const ENV_LOG_FORMAT: &str = "PERMIT_LOG_FORMAT";

#[derive(Debug)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidDbUrl { raw: String },
    InvalidUtcOffset { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidUtcOffset { raw } => {
                write!(f, "invalid --utc-offset-minutes value: {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Command {
    #[default]
    Stats,
    Readiness,
    History,
    Missed,
    Bookmarks,
    Reset,
    Help,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "stats" => Some(Self::Stats),
            "readiness" => Some(Self::Readiness),
            "history" => Some(Self::History),
            "missed" => Some(Self::Missed),
            "bookmarks" => Some(Self::Bookmarks),
            "reset" => Some(Self::Reset),
            "help" => Some(Self::Help),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub command: Command,
    pub db_url: String,
    pub calendar: LocalCalendar,
    pub log_format: LogFormat,
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  permit [stats|readiness|history|missed|bookmarks|reset] [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>              default {DEFAULT_DB_URL}");
    eprintln!("  --utc-offset-minutes <n>       local day boundary; default host offset");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  {ENV_DB_URL}, {ENV_UTC_OFFSET}, {ENV_LOG_FORMAT}=json|pretty, RUST_LOG");
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_offset(raw: &str) -> Result<LocalCalendar, ArgsError> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .and_then(LocalCalendar::from_offset_minutes)
        .ok_or_else(|| ArgsError::InvalidUtcOffset {
            raw: raw.to_string(),
        })
}

impl Args {
    /// Parse command-line arguments, falling back to `env` for unset options.
    pub fn parse(
        args: impl IntoIterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut args = args.into_iter().peekable();

        let command = match args.peek().map(String::as_str) {
            None => Command::default(),
            Some("--help" | "-h") => Command::Help,
            Some(first) if first.starts_with("--") => Command::default(),
            Some(first) => Command::from_arg(first)
                .ok_or_else(|| ArgsError::UnknownCommand(first.to_string()))?,
        };
        if args.peek().is_some_and(|first| !first.starts_with('-')) {
            args.next();
        }

        let mut db_url = env(ENV_DB_URL)
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| DEFAULT_DB_URL.to_string(), normalize_sqlite_url);
        let mut calendar = match env(ENV_UTC_OFFSET) {
            Some(raw) => parse_offset(&raw)?,
            None => LocalCalendar::host(),
        };
        let log_format = LogFormat::from_env_value(env(ENV_LOG_FORMAT).as_deref());

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--utc-offset-minutes" => {
                    let value = require_value(&mut args, "--utc-offset-minutes")?;
                    calendar = parse_offset(&value)?;
                }
                "--help" | "-h" => {
                    return Ok(Self {
                        command: Command::Help,
                        db_url,
                        calendar,
                        log_format,
                    });
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            command,
            db_url,
            calendar,
            log_format,
        })
    }
}

/// Turn a bare or relative path into an absolute `sqlite://` URL.
pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Create the database file and its parent directory so `SQLite` can open it.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
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

    let path = Path::new(path);
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

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn defaults_to_stats_with_default_db() {
        let args = Args::parse(argv(&[]), no_env).unwrap();
        assert_eq!(args.command, Command::Stats);
        assert_eq!(args.db_url, DEFAULT_DB_URL);
        assert_eq!(args.log_format, LogFormat::Pretty);
    }

    #[test]
    fn flags_override_env() {
        let env = |key: &str| match key {
            ENV_DB_URL => Some("sqlite://from-env.sqlite3".to_string()),
            ENV_UTC_OFFSET => Some("60".to_string()),
            ENV_LOG_FORMAT => Some("json".to_string()),
            _ => None,
        };
        let args = Args::parse(
            argv(&["history", "--db", "sqlite:///tmp/p.sqlite3", "--utc-offset-minutes", "-300"]),
            env,
        )
        .unwrap();
        assert_eq!(args.command, Command::History);
        assert_eq!(args.db_url, "sqlite:///tmp/p.sqlite3");
        assert_eq!(args.calendar, LocalCalendar::from_offset_minutes(-300).unwrap());
        assert_eq!(args.log_format, LogFormat::Json);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            Args::parse(argv(&["teleport"]), no_env),
            Err(ArgsError::UnknownCommand(_))
        ));
        assert!(matches!(
            Args::parse(argv(&["--db"]), no_env),
            Err(ArgsError::MissingValue { flag: "--db" })
        ));
        assert!(matches!(
            Args::parse(argv(&["--utc-offset-minutes", "abc"]), no_env),
            Err(ArgsError::InvalidUtcOffset { .. })
        ));
        assert!(matches!(
            Args::parse(argv(&["stats", "--verbose"]), no_env),
            Err(ArgsError::UnknownArg(_))
        ));
    }

    #[test]
    fn relative_paths_become_absolute_urls() {
        let url = normalize_sqlite_url("data/permit.sqlite3".to_string());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/permit.sqlite3"));
        assert_eq!(
            normalize_sqlite_url("sqlite::memory:".to_string()),
            "sqlite::memory:"
        );
    }
}
