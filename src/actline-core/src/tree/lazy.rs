//! Lazy presentation values: literals with `{completion}` interpolation, or
//! functions of the owning node and the current completion text.

use std::fmt;
use std::sync::Arc;

use super::Completable;

/// Interpolation token replaced with the current completion text.
pub const COMPLETION_TOKEN: &str = "{completion}";

// ============================================================
// TEXT
// ============================================================

/// One styled run of a [`Text::Styled`] value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledFragment {
    /// Style string applied to this run.
    pub style: String,
    /// The run's text.
    pub text: String,
}

impl StyledFragment {
    pub fn new(style: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            style: style.into(),
            text: text.into(),
        }
    }
}

/// Display text: either plain or a sequence of styled runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Text {
    Plain(String),
    Styled(Vec<StyledFragment>),
}

impl Text {
    /// Returns true if the text renders to nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            Text::Plain(text) => text.is_empty(),
            Text::Styled(runs) => runs.iter().all(|run| run.text.is_empty()),
        }
    }

    /// Returns the text without any styling.
    pub fn plain(&self) -> String {
        match self {
            Text::Plain(text) => text.clone(),
            Text::Styled(runs) => runs.iter().map(|run| run.text.as_str()).collect(),
        }
    }
}

impl From<&str> for Text {
    fn from(text: &str) -> Self {
        Text::Plain(text.to_string())
    }
}

impl From<String> for Text {
    fn from(text: String) -> Self {
        Text::Plain(text)
    }
}

impl From<Vec<StyledFragment>> for Text {
    fn from(runs: Vec<StyledFragment>) -> Self {
        Text::Styled(runs)
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.plain())
    }
}

// ============================================================
// INTERPOLATION
// ============================================================

/// Values that can have the completion text substituted into them.
pub trait Interpolate {
    /// Returns a copy with every `{completion}` replaced by `completion`.
    fn interpolate(&self, completion: &str) -> Self;
}

impl Interpolate for String {
    fn interpolate(&self, completion: &str) -> Self {
        self.replace(COMPLETION_TOKEN, completion)
    }
}

impl Interpolate for Text {
    fn interpolate(&self, completion: &str) -> Self {
        match self {
            Text::Plain(text) => Text::Plain(text.interpolate(completion)),
            Text::Styled(runs) => Text::Styled(
                runs.iter()
                    .map(|run| StyledFragment {
                        style: run.style.clone(),
                        text: run.text.interpolate(completion),
                    })
                    .collect(),
            ),
        }
    }
}

// ============================================================
// LAZY
// ============================================================

/// Function computing a presentation value from the node and completion text.
pub type LazyFn<T> = Arc<dyn Fn(Completable<'_>, &str) -> Option<T> + Send + Sync>;

/// A presentation value resolved at completion time.
pub enum Lazy<T> {
    /// A literal, interpolated with the completion text on resolution.
    Value(T),
    /// A function of the owning node and the completion text.
    Computed(LazyFn<T>),
}

impl<T: Interpolate> Lazy<T> {
    /// Wraps a function as a computed value.
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(Completable<'_>, &str) -> Option<T> + Send + Sync + 'static,
    {
        Lazy::Computed(Arc::new(f))
    }

    /// Resolves the value for `owner` with the given completion text.
    ///
    /// Computed values returning `None` resolve to `None`.
    pub fn resolve(&self, owner: Completable<'_>, completion: &str) -> Option<T> {
        match self {
            Lazy::Value(value) => Some(value.interpolate(completion)),
            Lazy::Computed(f) => f(owner, completion),
        }
    }
}

impl<T: Clone> Clone for Lazy<T> {
    fn clone(&self) -> Self {
        match self {
            Lazy::Value(value) => Lazy::Value(value.clone()),
            Lazy::Computed(f) => Lazy::Computed(Arc::clone(f)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Lazy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lazy::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Lazy::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<&str> for Lazy<String> {
    fn from(value: &str) -> Self {
        Lazy::Value(value.to_string())
    }
}

impl From<String> for Lazy<String> {
    fn from(value: String) -> Self {
        Lazy::Value(value)
    }
}

impl From<&str> for Lazy<Text> {
    fn from(value: &str) -> Self {
        Lazy::Value(Text::from(value))
    }
}

impl From<String> for Lazy<Text> {
    fn from(value: String) -> Self {
        Lazy::Value(Text::from(value))
    }
}

impl From<Text> for Lazy<Text> {
    fn from(value: Text) -> Self {
        Lazy::Value(value)
    }
}
