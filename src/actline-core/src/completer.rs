//! The completer facade: a root group plus matching settings.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::call::{PartialCall, partial_call};
use crate::completion::{Completion, CompletionEngine};
use crate::error::{CallResult, TreeResult, ValidationFault};
use crate::fuzzy::DEFAULT_FUZZY_TOLERANCE;
use crate::tree::{Action, ActionBuilder, Group};
use crate::validation::ActionValidator;

/// Settings shared by completion and validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompleterConfig {
    /// Minimum fuzzy score (0 to 100) a candidate needs to be offered.
    pub fuzzy_tolerance: u8,
}

impl Default for CompleterConfig {
    fn default() -> Self {
        Self {
            fuzzy_tolerance: DEFAULT_FUZZY_TOLERANCE,
        }
    }
}

/// Completes, validates and executes input lines for one command tree.
#[derive(Debug, Clone, Default)]
pub struct ActionCompleter {
    root: Group,
    config: CompleterConfig,
}

impl ActionCompleter {
    pub fn new(root: Group) -> Self {
        Self::with_config(root, CompleterConfig::default())
    }

    pub fn with_config(root: Group, config: CompleterConfig) -> Self {
        if !root.presentation.is_empty() {
            tracing::warn!(
                "Display parameters (display, display_meta, style, selected_style) are never \
                 presented on the root group, remove them from the root group"
            );
        }
        Self { root, config }
    }

    pub fn root(&self) -> &Group {
        &self.root
    }

    /// Mutable access for extending the tree between calls.
    pub fn root_mut(&mut self) -> &mut Group {
        &mut self.root
    }

    pub fn config(&self) -> &CompleterConfig {
        &self.config
    }

    // ========================================================
    // REGISTRATION
    // ========================================================

    /// Adds a group under the root.
    pub fn group(&mut self, name: impl Into<String>, group: Group) -> TreeResult<&mut Group> {
        self.root.group(name, group)
    }

    /// Adds an action under the root.
    pub fn add_action(&mut self, name: impl Into<String>, action: Action) -> TreeResult<&mut Action> {
        self.root.add_action(name, action)
    }

    /// Finishes `builder` and adds the action under the root.
    pub fn action(
        &mut self,
        name: impl Into<String>,
        builder: &mut ActionBuilder,
    ) -> TreeResult<&mut Action> {
        self.root.action(name, builder)
    }

    // ========================================================
    // OPERATIONS
    // ========================================================

    pub fn completion_engine(&self) -> CompletionEngine<'_> {
        CompletionEngine::new(&self.root, self.config.fuzzy_tolerance)
    }

    /// A validator for the current state of the tree.
    pub fn validator(&self) -> ActionValidator<'_> {
        ActionValidator::new(&self.root)
    }

    pub fn complete(&self, line: &str) -> Vec<Completion> {
        self.completion_engine().complete(line)
    }

    pub fn validate(&self, line: &str, cursor_position: usize) -> Result<(), ValidationFault> {
        self.validator().validate(line, cursor_position)
    }

    pub fn partial_call(&self, line: &str) -> CallResult<PartialCall> {
        partial_call(&self.root, line)
    }

    /// Assembles and immediately invokes the call for `line`.
    pub fn run_action(
        &self,
        line: &str,
        extra: Vec<Value>,
        keyword: Map<String, Value>,
    ) -> CallResult<Value> {
        self.partial_call(line)?.call(extra, keyword)
    }
}
