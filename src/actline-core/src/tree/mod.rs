//! The command tree: groups of named children, actions with ordered
//! parameters, and the presentation values shared by all of them.
//!
//! The tree is built once (in code through [`Group`] / [`ActionBuilder`], or
//! from TOML through [`crate::config`]) and is read-only while completion,
//! validation and call assembly run against it.

mod action;
mod group;
mod lazy;
mod param;

use std::fmt;
use std::sync::Arc;

pub use action::{Action, ActionBuilder, CallArgs, Handler};
pub use group::Group;
pub use lazy::{COMPLETION_TOKEN, Interpolate, Lazy, LazyFn, StyledFragment, Text};
pub use param::{
    Cast, CastFn, CustomValidatorFn, DynamicSourceFn, Param, ParamSource, ParamValidator,
    ProviderRequest, ValueValidator,
};
pub(crate) use param::expand_user;

use crate::error::{TreeError, TreeResult};

// ============================================================
// NODE
// ============================================================

/// A child of a [`Group`].
#[derive(Debug, Clone)]
pub enum Node {
    Group(Group),
    Action(Action),
}

impl Node {
    /// Returns `"group"` or `"action"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Group(_) => "group",
            Node::Action(_) => "action",
        }
    }

    /// Returns true if the node currently participates in resolution.
    pub fn is_active(&self) -> bool {
        match self {
            Node::Group(group) => group.is_active(),
            Node::Action(action) => action.is_active(),
        }
    }

    pub fn presentation(&self) -> &Presentation {
        match self {
            Node::Group(group) => &group.presentation,
            Node::Action(action) => &action.presentation,
        }
    }

    pub fn as_completable(&self) -> Completable<'_> {
        match self {
            Node::Group(group) => Completable::Group(group),
            Node::Action(action) => Completable::Action(action),
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Node::Group(group) => Some(group),
            Node::Action(_) => None,
        }
    }

    pub fn as_action(&self) -> Option<&Action> {
        match self {
            Node::Action(action) => Some(action),
            Node::Group(_) => None,
        }
    }
}

impl From<Group> for Node {
    fn from(group: Group) -> Self {
        Node::Group(group)
    }
}

impl From<Action> for Node {
    fn from(action: Action) -> Self {
        Node::Action(action)
    }
}

/// Borrowed view of anything that produces completions.
///
/// Passed to computed presentation values so they can inspect their owner.
#[derive(Debug, Clone, Copy)]
pub enum Completable<'a> {
    Group(&'a Group),
    Action(&'a Action),
    Param(&'a Param),
}

impl<'a> Completable<'a> {
    pub fn presentation(&self) -> &'a Presentation {
        match self {
            Completable::Group(group) => &group.presentation,
            Completable::Action(action) => &action.presentation,
            Completable::Param(param) => &param.presentation,
        }
    }
}

// ============================================================
// PRESENTATION
// ============================================================

/// Style and display values attached to a group, action or parameter.
#[derive(Debug, Clone, Default)]
pub struct Presentation {
    /// Style applied to completion entries.
    pub style: Option<Lazy<String>>,
    /// Style applied to the selected completion entry.
    pub selected_style: Option<Lazy<String>>,
    /// Replacement for the completion text in the completion menu.
    pub display: Option<Lazy<Text>>,
    /// Description shown next to the completion entry.
    pub display_meta: Option<Lazy<Text>>,
}

impl Presentation {
    /// Returns true if no value is set.
    pub fn is_empty(&self) -> bool {
        self.style.is_none()
            && self.selected_style.is_none()
            && self.display.is_none()
            && self.display_meta.is_none()
    }

    pub fn with_style(mut self, style: impl Into<Lazy<String>>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn with_selected_style(mut self, style: impl Into<Lazy<String>>) -> Self {
        self.selected_style = Some(style.into());
        self
    }

    pub fn with_display(mut self, display: impl Into<Lazy<Text>>) -> Self {
        self.display = Some(display.into());
        self
    }

    pub fn with_display_meta(mut self, display_meta: impl Into<Lazy<Text>>) -> Self {
        self.display_meta = Some(display_meta.into());
        self
    }
}

// ============================================================
// ACTIVITY
// ============================================================

/// Zero-argument predicate gating whether a node is currently available.
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn() -> bool + Send + Sync>);

impl Predicate {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn evaluate(&self) -> bool {
        (self.0)()
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// Evaluates an optional activity predicate; absent means active.
pub(crate) fn evaluate_active(active: Option<&Predicate>) -> bool {
    active.is_none_or(Predicate::evaluate)
}

// ============================================================
// NAMES
// ============================================================

/// Checks a child name for a node of the given kind.
pub(crate) fn validate_name(kind: &'static str, name: &str) -> TreeResult<()> {
    if name.is_empty() {
        return Err(TreeError::EmptyName { kind });
    }
    if name.chars().any(char::is_whitespace) {
        return Err(TreeError::WhitespaceInName {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}
