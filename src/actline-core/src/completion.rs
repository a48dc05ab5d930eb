//! Completion of partial input lines.
//!
//! The line is split into fragments and resolved against the tree. A group
//! offers its active children ranked against the last fragment; an action
//! offers candidates for the parameter currently being typed, dispatched on
//! the parameter's source.

use crate::context::{Resolved, resolve};
use crate::fragment;
use crate::fuzzy;
use crate::nested::NestedCompletion;
use crate::tree::{
    Action, Completable, Group, Interpolate, Param, ParamSource, ProviderRequest, Text,
};

// ============================================================
// COMPLETION
// ============================================================

/// A single completion candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Escaped text to insert.
    pub text: String,
    /// Offset from the cursor where the insertion starts; zero or negative.
    pub start_position: isize,
    pub style: String,
    pub selected_style: String,
    pub display: Option<Text>,
    pub display_meta: Option<Text>,
}

impl Completion {
    /// Text shown in a completion menu: the display if set, else the text.
    pub fn display_text(&self) -> String {
        match &self.display {
            Some(display) => display.plain(),
            None => fragment::decode(&self.text),
        }
    }

    /// Plain description, empty when absent.
    pub fn display_meta_text(&self) -> String {
        self.display_meta
            .as_ref()
            .map(Text::plain)
            .unwrap_or_default()
    }
}

/// Presentation values that take precedence over the owner's own.
#[derive(Debug, Default)]
struct Overrides {
    style: Option<String>,
    selected_style: Option<String>,
    display: Option<Text>,
    display_meta: Option<Text>,
}

impl From<NestedCompletion> for Overrides {
    fn from(nested: NestedCompletion) -> Self {
        Self {
            style: nested.style.filter(|s| !s.is_empty()),
            selected_style: nested.selected_style.filter(|s| !s.is_empty()),
            display: nested.display.filter(|d| !d.is_empty()),
            display_meta: nested.display_meta.filter(|d| !d.is_empty()),
        }
    }
}

// ============================================================
// COMPLETION ENGINE
// ============================================================

/// Produces completions for a command tree.
#[derive(Debug, Clone, Copy)]
pub struct CompletionEngine<'a> {
    root: &'a Group,
    fuzzy_tolerance: u8,
}

impl<'a> CompletionEngine<'a> {
    pub fn new(root: &'a Group, fuzzy_tolerance: u8) -> Self {
        Self {
            root,
            fuzzy_tolerance,
        }
    }

    /// Returns the completions for `line`, best first.
    pub fn complete(&self, line: &str) -> Vec<Completion> {
        let fragments = fragment::split(line);
        let context = resolve(self.root, &fragments);
        if context.fragments.is_empty() {
            return Vec::new();
        }

        // Candidates replace the whole unresolved fragment cluster
        let start_position = -(fragment::join(context.fragments).chars().count() as isize);
        let mut completions = match context.node {
            Resolved::Group(group) => {
                self.group_completions(group, context.fragments, start_position)
            }
            Resolved::Action(action) => {
                self.action_completions(action, context.fragments, start_position)
            }
        };

        for completion in &mut completions {
            completion.text = fragment::encode(&completion.text);
        }
        tracing::debug!(line, count = completions.len(), "completions produced");
        completions
    }

    fn group_completions(
        &self,
        group: &Group,
        fragments: &[String],
        start_position: isize,
    ) -> Vec<Completion> {
        let Some(query) = fragments.last() else {
            return Vec::new();
        };
        // Inactive children are ranked too, then hidden
        let names: Vec<&str> = group.children().map(|(name, _)| name).collect();

        fuzzy::best_choices(&names, query, self.fuzzy_tolerance)
            .filter_map(|name| {
                let node = group.child(name).filter(|node| node.is_active())?;
                Some(build_completion(
                    node.as_completable(),
                    name,
                    start_position,
                    Overrides::default(),
                ))
            })
            .collect()
    }

    fn action_completions(
        &self,
        action: &Action,
        fragments: &[String],
        start_position: isize,
    ) -> Vec<Completion> {
        // Only the fragment being typed is completed
        let offset = fragments.len() - 1;
        let (Some(param), Some(value)) = (action.params.get(offset), fragments.get(offset)) else {
            return Vec::new();
        };
        let value = fragment::decode(value);
        self.param_completions(action, param, &value, start_position)
    }

    fn param_completions(
        &self,
        action: &Action,
        param: &Param,
        value: &str,
        start_position: isize,
    ) -> Vec<Completion> {
        let owner = Completable::Param(param);
        let ranked = |choices: &[String]| -> Vec<Completion> {
            fuzzy::best_choices(choices, value, self.fuzzy_tolerance)
                .map(|text| build_completion(owner, text, start_position, Overrides::default()))
                .collect()
        };

        match &param.source {
            ParamSource::Literal(literal) => {
                if literal.contains(value) {
                    vec![build_completion(
                        owner,
                        literal,
                        start_position,
                        Overrides::default(),
                    )]
                } else {
                    Vec::new()
                }
            }
            ParamSource::Choices(choices) => ranked(choices),
            ParamSource::Nested(completer) => completer
                .get_completions(value)
                .into_iter()
                .map(|nested| {
                    let text = nested.text.clone();
                    let start = nested.start_position;
                    build_completion(owner, &text, start, Overrides::from(nested))
                })
                .collect(),
            ParamSource::Dynamic(provider) => {
                let choices = provider(ProviderRequest {
                    action,
                    param: Some(param),
                    text: Some(value),
                });
                ranked(&choices)
            }
            ParamSource::None => {
                let presentation = &param.presentation;
                if presentation.display.is_some() || presentation.display_meta.is_some() {
                    vec![build_completion(
                        owner,
                        value,
                        start_position,
                        Overrides::default(),
                    )]
                } else {
                    Vec::new()
                }
            }
        }
    }
}

// ============================================================
// PRESENTATION RESOLUTION
// ============================================================

fn build_completion(
    owner: Completable<'_>,
    text: &str,
    start_position: isize,
    overrides: Overrides,
) -> Completion {
    let presentation = owner.presentation();

    let style = overrides
        .style
        .or_else(|| {
            presentation
                .style
                .as_ref()
                .and_then(|style| style.resolve(owner, text))
        })
        .unwrap_or_default();
    let selected_style = overrides
        .selected_style
        .or_else(|| {
            presentation
                .selected_style
                .as_ref()
                .and_then(|style| style.resolve(owner, text))
        })
        .unwrap_or_default();

    let display = match overrides.display {
        Some(display) => Some(display.interpolate(text)),
        None => presentation
            .display
            .as_ref()
            .and_then(|display| display.resolve(owner, text)),
    };

    let display_meta = match overrides.display_meta {
        Some(meta) => Some(meta.interpolate(text)),
        None => presentation
            .display_meta
            .as_ref()
            .and_then(|meta| meta.resolve(owner, text)),
    }
    .filter(|meta| !meta.is_empty());

    Completion {
        text: text.to_string(),
        start_position,
        style,
        selected_style,
        display,
        display_meta,
    }
}
