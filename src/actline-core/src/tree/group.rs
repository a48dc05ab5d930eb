//! Groups: named branches of the command tree.

use indexmap::IndexMap;
use indexmap::map::Entry;

use super::{
    Action, ActionBuilder, Lazy, Node, Predicate, Presentation, Text, evaluate_active,
    validate_name,
};
use crate::error::{TreeError, TreeResult};

/// A branch node mapping child names to groups or actions.
///
/// Children keep their insertion order, which is the order completions are
/// offered in when nothing has been typed yet.
#[derive(Debug, Clone, Default)]
pub struct Group {
    children: IndexMap<String, Node>,
    pub presentation: Presentation,
    active: Option<Predicate>,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================
    // CONSTRUCTION
    // ========================================================

    fn insert(&mut self, name: String, node: Node) -> TreeResult<&mut Node> {
        validate_name(node.kind(), &name)?;
        match self.children.entry(name) {
            Entry::Occupied(entry) => Err(TreeError::DuplicateName {
                name: entry.key().clone(),
            }),
            Entry::Vacant(entry) => Ok(entry.insert(node)),
        }
    }

    /// Adds a subgroup and returns it for further nesting.
    pub fn group(&mut self, name: impl Into<String>, group: Group) -> TreeResult<&mut Group> {
        match self.insert(name.into(), Node::Group(group))? {
            Node::Group(group) => Ok(group),
            Node::Action(_) => unreachable!("a group was just inserted"),
        }
    }

    /// Adds an action and returns it.
    pub fn add_action(&mut self, name: impl Into<String>, action: Action) -> TreeResult<&mut Action> {
        match self.insert(name.into(), Node::Action(action))? {
            Node::Action(action) => Ok(action),
            Node::Group(_) => unreachable!("an action was just inserted"),
        }
    }

    /// Finishes `builder` and adds the resulting action.
    pub fn action(
        &mut self,
        name: impl Into<String>,
        builder: &mut ActionBuilder,
    ) -> TreeResult<&mut Action> {
        let name = name.into();
        // Names are checked before the builder is sealed
        validate_name("action", &name)?;
        if self.children.contains_key(&name) {
            return Err(TreeError::DuplicateName { name });
        }
        self.add_action(name, builder.finish())
    }

    pub fn with_group(mut self, name: impl Into<String>, group: Group) -> TreeResult<Self> {
        self.group(name, group)?;
        Ok(self)
    }

    pub fn with_action(mut self, name: impl Into<String>, action: Action) -> TreeResult<Self> {
        self.add_action(name, action)?;
        Ok(self)
    }

    pub fn with_active(mut self, predicate: Predicate) -> Self {
        self.active = Some(predicate);
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

    // ========================================================
    // QUERIES
    // ========================================================

    pub fn is_active(&self) -> bool {
        evaluate_active(self.active.as_ref())
    }

    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.get(name)
    }

    /// Iterates children in insertion order.
    pub fn children(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.children.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Names of the children whose activity predicate currently holds.
    pub fn active_child_names(&self) -> Vec<&str> {
        self.children
            .iter()
            .filter(|(_, node)| node.is_active())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}
