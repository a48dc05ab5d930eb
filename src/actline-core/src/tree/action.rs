//! Actions (tree leaves) and the staging builder used to declare them.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::{Lazy, Param, Predicate, Presentation, Text, evaluate_active};

// ============================================================
// HANDLER
// ============================================================

/// Arguments passed to a bound handler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    /// Assembled parameter values followed by any caller-supplied extras.
    pub positional: Vec<Value>,
    /// Caller-supplied keyword arguments.
    pub keyword: Map<String, Value>,
}

impl CallArgs {
    pub fn new(positional: Vec<Value>) -> Self {
        Self {
            positional,
            keyword: Map::new(),
        }
    }

    /// Returns the positional argument at `index`.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    /// Returns the positional argument at `index` as a string slice.
    pub fn str(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(Value::as_str)
    }
}

/// The callable bound to an action.
pub type Handler = Arc<dyn Fn(CallArgs) -> anyhow::Result<Value> + Send + Sync>;

// ============================================================
// ACTION
// ============================================================

/// A leaf of the command tree.
#[derive(Clone, Default)]
pub struct Action {
    handler: Option<Handler>,
    /// Parameters in positional order.
    pub params: Vec<Param>,
    pub presentation: Presentation,
    active: Option<Predicate>,
    /// Whether fragments beyond the declared parameters are accepted and
    /// forwarded as extra positional arguments.
    pub capture_all: bool,
}

impl Action {
    /// Creates an action without a handler; invoking it does nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an action bound to `handler`.
    pub fn from_fn<F>(handler: F) -> Self
    where
        F: Fn(CallArgs) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            handler: Some(Arc::new(handler)),
            ..Default::default()
        }
    }

    pub fn handler(&self) -> Option<&Handler> {
        self.handler.as_ref()
    }

    pub fn is_active(&self) -> bool {
        evaluate_active(self.active.as_ref())
    }

    pub fn with_param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_params(mut self, params: impl IntoIterator<Item = Param>) -> Self {
        self.params.extend(params);
        self
    }

    pub fn with_capture_all(mut self, capture_all: bool) -> Self {
        self.capture_all = capture_all;
        self
    }

    pub fn with_active(mut self, predicate: Predicate) -> Self {
        self.active = Some(predicate);
        self
    }

    pub fn with_presentation(mut self, presentation: Presentation) -> Self {
        self.presentation = presentation;
        self
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("handler", &self.handler.as_ref().map(|_| ".."))
            .field("params", &self.params)
            .field("presentation", &self.presentation)
            .field("active", &self.active)
            .field("capture_all", &self.capture_all)
            .finish()
    }
}

// ============================================================
// BUILDER
// ============================================================

/// Staging object accumulating an action's parameters and attributes.
///
/// Parameters are kept in declaration order. Once [`finish`](Self::finish)
/// has been called the builder is sealed: further parameters are reported
/// and dropped.
#[derive(Debug, Default)]
pub struct ActionBuilder {
    action: Action,
    finished: bool,
}

impl ActionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fn<F>(handler: F) -> Self
    where
        F: Fn(CallArgs) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            action: Action::from_fn(handler),
            finished: false,
        }
    }

    /// Adds a parameter, chained form.
    pub fn param(mut self, param: Param) -> Self {
        self.add_param(param);
        self
    }

    /// Adds a parameter.
    pub fn add_param(&mut self, param: Param) {
        if self.finished {
            tracing::warn!(
                source = param.source.kind(),
                "Action parameter could not be applied to the already registered action, \
                 declare parameters before registering the action"
            );
            return;
        }
        self.action.params.push(param);
    }

    pub fn capture_all(mut self, capture_all: bool) -> Self {
        self.action.capture_all = capture_all;
        self
    }

    pub fn active(mut self, predicate: Predicate) -> Self {
        self.action.active = Some(predicate);
        self
    }

    pub fn style(mut self, style: impl Into<Lazy<String>>) -> Self {
        self.action.presentation.style = Some(style.into());
        self
    }

    pub fn selected_style(mut self, style: impl Into<Lazy<String>>) -> Self {
        self.action.presentation.selected_style = Some(style.into());
        self
    }

    pub fn display(mut self, display: impl Into<Lazy<Text>>) -> Self {
        self.action.presentation.display = Some(display.into());
        self
    }

    pub fn display_meta(mut self, display_meta: impl Into<Lazy<Text>>) -> Self {
        self.action.presentation.display_meta = Some(display_meta.into());
        self
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Seals the builder and returns the staged action.
    pub fn finish(&mut self) -> Action {
        self.finished = true;
        self.action.clone()
    }
}
