//! Resolution of input fragments against the command tree.

use crate::tree::{Action, Group, Node};

/// The node an input line resolves to.
#[derive(Debug, Clone, Copy)]
pub enum Resolved<'t> {
    Group(&'t Group),
    Action(&'t Action),
}

impl<'t> Resolved<'t> {
    pub fn kind(&self) -> &'static str {
        match self {
            Resolved::Group(_) => "group",
            Resolved::Action(_) => "action",
        }
    }

    pub fn as_group(&self) -> Option<&'t Group> {
        match self {
            Resolved::Group(group) => Some(group),
            Resolved::Action(_) => None,
        }
    }

    pub fn as_action(&self) -> Option<&'t Action> {
        match self {
            Resolved::Action(action) => Some(action),
            Resolved::Group(_) => None,
        }
    }
}

/// Outcome of walking the tree along a fragment list.
///
/// `parent` and `name` describe the last matched child, `fragments` are the
/// ones left for the resolved node to interpret.
#[derive(Debug, Clone)]
pub struct Context<'t, 'f> {
    pub parent: Option<&'t Group>,
    pub name: Option<&'t str>,
    pub node: Resolved<'t>,
    pub fragments: &'f [String],
}

/// Walks `root` along `fragments` by exact child-name matches.
///
/// Descent stops at the first fragment that matches no child of the current
/// group. A matched active action ends the walk with the fragments after its
/// name. A matched inactive action steps back one level: the enclosing group
/// is resolved with the action's name left unconsumed, as if the action did
/// not exist.
pub fn resolve<'t, 'f>(root: &'t Group, fragments: &'f [String]) -> Context<'t, 'f> {
    let mut parent = None;
    let mut name = None;
    let mut current = root;
    let mut depth = 0;

    for fragment in fragments {
        let Some((child_name, child)) = current
            .children()
            .find(|(child_name, _)| *child_name == fragment.as_str())
        else {
            break;
        };

        match child {
            Node::Group(group) => {
                depth += 1;
                parent = Some(current);
                name = Some(child_name);
                current = group;
            }
            Node::Action(action) if action.is_active() => {
                depth += 1;
                tracing::debug!(
                    action = child_name,
                    depth,
                    remaining = fragments.len() - depth,
                    "resolved action"
                );
                return Context {
                    parent: Some(current),
                    name: Some(child_name),
                    node: Resolved::Action(action),
                    fragments: &fragments[depth..],
                };
            }
            Node::Action(_) => {
                // Inactive: resolve to the enclosing group, leaving the name unconsumed
                tracing::debug!(action = child_name, depth, "inactive action, backtracking");
                break;
            }
        }
    }

    tracing::debug!(
        group = name.unwrap_or("<root>"),
        depth,
        remaining = fragments.len() - depth,
        "resolved group"
    );
    Context {
        parent,
        name,
        node: Resolved::Group(current),
        fragments: &fragments[depth..],
    }
}
