//! Action parameters: completion source, cast, validators and presentation.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use super::{Action, Lazy, Presentation, Text};
use crate::error::ValidationFault;
use crate::nested::NestedCompleter;

// ============================================================
// SOURCE
// ============================================================

/// Arguments handed to a dynamic completion source.
///
/// During completion `param` and `text` are set; during validation the
/// provider is only given the owning action.
#[derive(Debug, Clone, Copy)]
pub struct ProviderRequest<'a> {
    pub action: &'a Action,
    pub param: Option<&'a Param>,
    pub text: Option<&'a str>,
}

/// Function producing candidate values for a parameter.
pub type DynamicSourceFn = Arc<dyn Fn(ProviderRequest<'_>) -> Vec<String> + Send + Sync>;

/// Where a parameter's completions come from.
#[derive(Clone, Default)]
pub enum ParamSource {
    /// A single fixed value.
    Literal(String),
    /// A fixed set of values.
    Choices(Vec<String>),
    /// An external completer queried with the current fragment.
    Nested(Arc<dyn NestedCompleter>),
    /// Values computed per request.
    Dynamic(DynamicSourceFn),
    /// Free text; only rendered when a display or display meta is set.
    #[default]
    None,
}

impl ParamSource {
    pub fn kind(&self) -> &'static str {
        match self {
            ParamSource::Literal(_) => "literal",
            ParamSource::Choices(_) => "choices",
            ParamSource::Nested(_) => "nested",
            ParamSource::Dynamic(_) => "dynamic",
            ParamSource::None => "none",
        }
    }
}

impl fmt::Debug for ParamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamSource::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            ParamSource::Choices(choices) => f.debug_tuple("Choices").field(choices).finish(),
            ParamSource::Nested(_) => f.write_str("Nested(..)"),
            ParamSource::Dynamic(_) => f.write_str("Dynamic(..)"),
            ParamSource::None => f.write_str("None"),
        }
    }
}

// ============================================================
// CAST
// ============================================================

/// Function converting a decoded fragment into a call argument.
pub type CastFn = Arc<dyn Fn(&str) -> Result<Value, String> + Send + Sync>;

/// Conversion applied to a decoded fragment when a call is assembled.
#[derive(Clone)]
pub enum Cast {
    Str,
    Int,
    Float,
    Bool,
    /// A filesystem path; a leading `~` is expanded to the home directory.
    Path,
    Custom(CastFn),
}

impl Cast {
    /// Wraps a function as a custom cast.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
    {
        Cast::Custom(Arc::new(f))
    }

    /// Looks up a built-in cast by name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" | "str" => Some(Cast::Str),
            "int" | "integer" => Some(Cast::Int),
            "float" => Some(Cast::Float),
            "bool" | "boolean" => Some(Cast::Bool),
            "path" => Some(Cast::Path),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Cast::Str => "string",
            Cast::Int => "int",
            Cast::Float => "float",
            Cast::Bool => "bool",
            Cast::Path => "path",
            Cast::Custom(_) => "custom",
        }
    }

    /// Applies the cast to a decoded value.
    pub fn apply(&self, value: &str) -> Result<Value, String> {
        match self {
            Cast::Str => Ok(Value::String(value.to_string())),
            Cast::Int => value
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|e| e.to_string()),
            Cast::Float => {
                let number = value.trim().parse::<f64>().map_err(|e| e.to_string())?;
                serde_json::Number::from_f64(number)
                    .map(Value::Number)
                    .ok_or_else(|| format!("{} is not a finite number", number))
            }
            Cast::Bool => match value.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "y" | "on" | "1" => Ok(Value::Bool(true)),
                "false" | "no" | "n" | "off" | "0" => Ok(Value::Bool(false)),
                other => Err(format!("'{}' is not a boolean", other)),
            },
            Cast::Path => Ok(Value::String(expand_user(value).display().to_string())),
            Cast::Custom(f) => f(value),
        }
    }
}

impl fmt::Debug for Cast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cast::Custom(_) => f.write_str("Custom(..)"),
            other => f.write_str(other.name()),
        }
    }
}

/// Expands a leading `~` to the current user's home directory.
pub(crate) fn expand_user(path: &str) -> PathBuf {
    let home = match dirs::home_dir() {
        Some(home) => home,
        None => return PathBuf::from(path),
    };
    if path == "~" {
        home
    } else if let Some(rest) = path.strip_prefix("~/") {
        home.join(rest)
    } else {
        PathBuf::from(path)
    }
}

// ============================================================
// VALIDATORS
// ============================================================

/// Function validating a decoded value given the fragments preceding it.
pub type CustomValidatorFn =
    Arc<dyn Fn(&Param, &str, &[String]) -> Result<(), ValidationFault> + Send + Sync>;

/// A structured check over a single decoded value.
#[derive(Debug, Clone)]
pub enum ValueValidator {
    NotEmpty,
    IsFile,
    IsDir,
    Exists,
    Matches(Regex),
}

impl ValueValidator {
    fn check(&self, value: &str) -> bool {
        match self {
            ValueValidator::NotEmpty => !value.trim().is_empty(),
            ValueValidator::IsFile => expand_user(value).is_file(),
            ValueValidator::IsDir => expand_user(value).is_dir(),
            ValueValidator::Exists => expand_user(value).exists(),
            ValueValidator::Matches(pattern) => pattern.is_match(value),
        }
    }

    fn default_message(&self, value: &str) -> String {
        match self {
            ValueValidator::NotEmpty => "value must not be empty".to_string(),
            ValueValidator::IsFile => format!("'{}' is not a file", value),
            ValueValidator::IsDir => format!("'{}' is not a directory", value),
            ValueValidator::Exists => format!("'{}' does not exist", value),
            ValueValidator::Matches(pattern) => {
                format!("'{}' does not match '{}'", value, pattern.as_str())
            }
        }
    }
}

/// One validator attached to a parameter.
#[derive(Clone)]
pub enum ParamValidator {
    /// A structured check with an optional message override.
    Value {
        validator: ValueValidator,
        message: Option<String>,
    },
    /// A function receiving the parameter, decoded value and prior fragments.
    Custom(CustomValidatorFn),
    /// A validator kind that cannot be enforced; skipped with a warning.
    Unsupported(String),
}

impl ParamValidator {
    pub fn value(validator: ValueValidator) -> Self {
        ParamValidator::Value {
            validator,
            message: None,
        }
    }

    pub fn value_with_message(validator: ValueValidator, message: impl Into<String>) -> Self {
        ParamValidator::Value {
            validator,
            message: Some(message.into()),
        }
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Param, &str, &[String]) -> Result<(), ValidationFault> + Send + Sync + 'static,
    {
        ParamValidator::Custom(Arc::new(f))
    }

    /// Runs the validator. The returned fault's cursor position is not
    /// meaningful; the validation engine re-anchors it.
    pub(crate) fn run(
        &self,
        param: &Param,
        value: &str,
        prior_fragments: &[String],
    ) -> Result<(), ValidationFault> {
        match self {
            ParamValidator::Value { validator, message } => {
                if validator.check(value) {
                    Ok(())
                } else {
                    let message = message
                        .as_ref()
                        .map(|m| m.replace("{value}", value))
                        .unwrap_or_else(|| validator.default_message(value));
                    Err(ValidationFault::message(message))
                }
            }
            ParamValidator::Custom(f) => f(param, value, prior_fragments),
            ParamValidator::Unsupported(kind) => {
                tracing::warn!(
                    kind = %kind,
                    "Unsure how to handle validator, no validation will be performed"
                );
                Ok(())
            }
        }
    }
}

impl fmt::Debug for ParamValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValidator::Value { validator, message } => f
                .debug_struct("Value")
                .field("validator", validator)
                .field("message", message)
                .finish(),
            ParamValidator::Custom(_) => f.write_str("Custom(..)"),
            ParamValidator::Unsupported(kind) => {
                f.debug_tuple("Unsupported").field(kind).finish()
            }
        }
    }
}

// ============================================================
// PARAM
// ============================================================

/// One positional argument of an action.
#[derive(Debug, Clone, Default)]
pub struct Param {
    /// Completion and default validation source.
    pub source: ParamSource,
    /// Conversion applied when a call is assembled; `None` passes the decoded string.
    pub cast: Option<Cast>,
    pub presentation: Presentation,
    /// Validators run in order; when non-empty they replace the default
    /// source-based validation.
    pub validators: Vec<ParamValidator>,
}

impl Param {
    pub fn new(source: ParamSource) -> Self {
        Self {
            source,
            ..Default::default()
        }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self::new(ParamSource::Literal(value.into()))
    }

    pub fn choices<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(ParamSource::Choices(
            choices.into_iter().map(Into::into).collect(),
        ))
    }

    pub fn nested(completer: impl NestedCompleter + 'static) -> Self {
        Self::new(ParamSource::Nested(Arc::new(completer)))
    }

    pub fn dynamic<F>(provider: F) -> Self
    where
        F: Fn(ProviderRequest<'_>) -> Vec<String> + Send + Sync + 'static,
    {
        Self::new(ParamSource::Dynamic(Arc::new(provider)))
    }

    /// A sourceless, free text parameter.
    pub fn none() -> Self {
        Self::new(ParamSource::None)
    }

    pub fn with_cast(mut self, cast: Cast) -> Self {
        self.cast = Some(cast);
        self
    }

    pub fn with_validator(mut self, validator: ParamValidator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn with_presentation(mut self, presentation: Presentation) -> Self {
        self.presentation = presentation;
        self
    }

    pub fn with_style(mut self, style: impl Into<Lazy<String>>) -> Self {
        self.presentation.style = Some(style.into());
        self
    }

    pub fn with_selected_style(mut self, style: impl Into<Lazy<String>>) -> Self {
        self.presentation.selected_style = Some(style.into());
        self
    }

    pub fn with_display(mut self, display: impl Into<Lazy<Text>>) -> Self {
        self.presentation.display = Some(display.into());
        self
    }

    pub fn with_display_meta(mut self, display_meta: impl Into<Lazy<Text>>) -> Self {
        self.presentation.display_meta = Some(display_meta.into());
        self
    }

    /// Applies the declared cast, or passes the decoded value through as a string.
    pub fn cast_value(&self, value: &str) -> Result<Value, String> {
        match &self.cast {
            Some(cast) => cast.apply(value),
            None => Ok(Value::String(value.to_string())),
        }
    }
}
