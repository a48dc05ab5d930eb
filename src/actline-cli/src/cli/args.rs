//! CLI argument structures and parsing.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Environment variable consulted when no verbosity flag is given.
pub const LOG_LEVEL_ENV: &str = "ACTLINE_LOG_LEVEL";

/// Log verbosity level for CLI output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    /// Only show errors
    Error,
    /// Show warnings and errors (default)
    #[default]
    Warn,
    /// Show informational messages, warnings, and errors
    Info,
    /// Show debug messages and above
    Debug,
    /// Show all messages including fuzzy scores
    Trace,
}

impl LogLevel {
    /// Convert to tracing filter string.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Parse from string (case-insensitive).
    pub fn from_str_loose(s: &str) -> Option<LogLevel> {
        match s.to_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }
}

/// Complete, validate and run input lines against a command tree.
#[derive(Debug, Parser)]
#[command(name = "actline")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Set log verbosity level (error, warn, info, debug, trace)
    #[arg(long = "log-level", short = 'L', value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// Shorthand for `--log-level debug`
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Resolves the effective level: `-v`, then `--log-level`, then
    /// `ACTLINE_LOG_LEVEL`, then the default.
    pub fn effective_log_level(&self, env_level: Option<&str>) -> LogLevel {
        if self.verbose {
            LogLevel::Debug
        } else if let Some(level) = self.log_level {
            level
        } else {
            env_level
                .and_then(LogLevel::from_str_loose)
                .unwrap_or_default()
        }
    }
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print completion candidates for a line, one per line
    /// (text, start, display and display meta separated by tabs)
    Complete(CompleteArgs),

    /// Validate a line, printing `ok` or the fault
    Validate(ValidateArgs),

    /// Validate a line and run its action, printing the result as JSON
    Run(RunArgs),

    /// Print the command tree as an indented outline
    Tree(TreeArgs),
}

/// Location of the TOML tree file.
#[derive(Debug, Clone, Args)]
pub struct TreeArgs {
    /// Path to the tree file
    #[arg(long = "tree", short = 't', value_name = "FILE")]
    pub tree: PathBuf,
}

#[derive(Debug, Clone, Args)]
pub struct CompleteArgs {
    #[command(flatten)]
    pub source: TreeArgs,

    /// Input line, as typed so far
    #[arg(allow_hyphen_values = true)]
    pub line: String,
}

#[derive(Debug, Clone, Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub source: TreeArgs,

    /// Input line to validate
    #[arg(allow_hyphen_values = true)]
    pub line: String,

    /// Cursor position reported with faults (defaults to the end of the line)
    #[arg(long)]
    pub cursor: Option<usize>,
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: TreeArgs,

    /// Input line to run
    #[arg(allow_hyphen_values = true)]
    pub line: String,

    /// Extra positional arguments appended after the parsed ones
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub extra: Vec<String>,
}
