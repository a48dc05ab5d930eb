//! Error types for tree construction, validation and call assembly.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for tree construction.
pub type TreeResult<T> = Result<T, TreeError>;

/// Result type for call assembly and invocation.
pub type CallResult<T> = Result<T, CallError>;

/// Result type for declarative tree loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Faults raised while building a command tree.
///
/// These abort tree setup; nothing is inserted when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A child name with no characters.
    #[error("{kind} names must contain characters, ''")]
    EmptyName { kind: &'static str },

    /// A child name containing whitespace.
    #[error("{kind}s can not use names including whitespace, '{name}'")]
    WhitespaceInName { kind: &'static str, name: String },

    /// A child name already used by a sibling.
    #[error("name '{name}' already registered")]
    DuplicateName { name: String },
}

/// A recoverable validation failure for a single input line.
///
/// The cursor position is always the one supplied by the caller of
/// [`validate`](crate::ActionValidator::validate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationFault {
    /// Human readable description of the failure.
    pub message: String,
    /// Position in the input buffer the fault should be rendered at.
    pub cursor_position: usize,
}

impl ValidationFault {
    /// Creates a fault with the given message and cursor position.
    pub fn new(message: impl Into<String>, cursor_position: usize) -> Self {
        Self {
            message: message.into(),
            cursor_position,
        }
    }

    /// Creates a fault whose cursor position will be replaced by the validator.
    ///
    /// Custom validators use this since the engine re-anchors every fault.
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(message, 0)
    }

    /// Returns the same fault anchored at `cursor_position`.
    pub fn at(self, cursor_position: usize) -> Self {
        Self {
            message: self.message,
            cursor_position,
        }
    }

    /// Prefixes the message with a 1-based parameter position.
    pub(crate) fn for_parameter(self, index: usize) -> Self {
        Self {
            message: format!("parameter {}: {}", index + 1, self.message),
            cursor_position: self.cursor_position,
        }
    }
}

/// Errors raised while assembling or invoking a partial call.
#[derive(Debug, Error)]
pub enum CallError {
    /// The input did not resolve to an action.
    #[error("no action discovered for '{input}', resolved {resolved}")]
    NoAction { input: String, resolved: String },

    /// A parameter cast rejected its decoded fragment.
    #[error("parameter {} could not cast '{value}': {message}", index + 1)]
    Cast {
        index: usize,
        value: String,
        message: String,
    },

    /// The bound handler failed.
    #[error("action handler failed: {0}")]
    Handler(#[source] anyhow::Error),
}

/// Errors that can occur while loading a declarative tree.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the tree file.
    #[error("Failed to read tree file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid TOML or does not match the expected shape.
    #[error("Failed to parse tree: {0}")]
    Parse(#[from] toml::de::Error),

    /// The described tree violates a construction rule.
    #[error("Invalid tree: {0}")]
    Tree(#[from] TreeError),

    /// A `cast` value that is not one of the built-in casts.
    #[error("Unknown cast '{cast}' at {path}")]
    UnknownCast { path: String, cast: String },

    /// A parameter naming more than one completion source.
    #[error("Parameter at {path} declares more than one source ({sources})")]
    AmbiguousSource { path: String, sources: String },

    /// A fuzzy tolerance outside 0..=100.
    #[error("Fuzzy tolerance must be between 0 and 100, got {0}")]
    InvalidTolerance(i64),

    /// A `matches` validator with a pattern that does not compile.
    #[error("Invalid validator pattern at {path}: {source}")]
    InvalidPattern {
        path: String,
        #[source]
        source: regex::Error,
    },

    /// An action bound to a handler name that was not supplied.
    #[error("Unknown handler '{handler}' for action {path}")]
    UnknownHandler { path: String, handler: String },

    /// A tree entry that is neither a group nor an action table.
    #[error("Invalid node at {path}: {message}")]
    InvalidNode { path: String, message: String },
}
