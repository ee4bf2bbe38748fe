//! Operations a tree node exposes, derived from its state.
//!
//! A node's action set is a function of `is_added_to_map`, its descendants'
//! `is_added_to_map` and `is_root_element`:
//!
//! | State       | Actions                                   |
//! |-------------|-------------------------------------------|
//! | addable     | add                                       |
//! | added       | remove                                    |
//! | container   | add-all, remove-all (each maybe disabled) |
//! | any root    | + delete-source                           |
//!
//! After a leaf changes state, [`refresh_path`] re-derives the leaf and each
//! ancestor on its path; the rest of the tree is untouched.

use serde::Serialize;

use crate::tree;
use crate::TreeNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    AddToMap,
    AddAll,
    RemoveLayer,
    RemoveAll,
    DeleteSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Action {
    pub kind: ActionKind,
    pub disabled: bool,
}

impl Action {
    fn enabled(kind: ActionKind) -> Self {
        Self {
            kind,
            disabled: false,
        }
    }
}

/// Structural state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// No children, not on the live surface.
    Addable,
    /// No children, on the live surface.
    Added,
    /// Has children; never added itself.
    Container,
}

pub fn node_state(node: &TreeNode) -> NodeState {
    if !node.children.is_empty() {
        NodeState::Container
    } else if node.is_added_to_map {
        NodeState::Added
    } else {
        NodeState::Addable
    }
}

/// Count descendant leaves that are not on the live surface.
///
/// Containers contribute the sum of their descendants, never a unit each.
pub fn non_added_leaf_count(node: &TreeNode) -> usize {
    node.children
        .iter()
        .map(|child| {
            if child.is_leaf() {
                usize::from(!child.is_added_to_map)
            } else {
                non_added_leaf_count(child)
            }
        })
        .sum()
}

/// Count descendant leaves that are on the live surface.
pub fn added_leaf_count(node: &TreeNode) -> usize {
    node.children
        .iter()
        .map(|child| {
            if child.is_leaf() {
                usize::from(child.is_added_to_map)
            } else {
                added_leaf_count(child)
            }
        })
        .sum()
}

/// Compute the action set for a node from its current state.
pub fn derive_actions(node: &TreeNode) -> Vec<Action> {
    let mut actions = Vec::with_capacity(3);

    if node.is_root_element {
        actions.push(Action::enabled(ActionKind::DeleteSource));
    }

    match node_state(node) {
        NodeState::Addable => actions.push(Action::enabled(ActionKind::AddToMap)),
        NodeState::Added => actions.push(Action::enabled(ActionKind::RemoveLayer)),
        NodeState::Container => {
            actions.push(Action {
                kind: ActionKind::AddAll,
                disabled: non_added_leaf_count(node) == 0,
            });
            actions.push(Action {
                kind: ActionKind::RemoveAll,
                disabled: added_leaf_count(node) == 0,
            });
        }
    }

    actions
}

/// Re-derive the actions of a single node.
pub fn refresh(node: &mut TreeNode) {
    node.actions = derive_actions(node);
}

/// Re-derive actions for a whole subtree, children before parents.
pub fn refresh_subtree(node: &mut TreeNode) {
    for child in &mut node.children {
        refresh_subtree(child);
    }
    refresh(node);
}

/// Re-derive the node at `path` and every ancestor up to `root`, deepest first.
///
/// Returns `false` when the path does not resolve.
pub fn refresh_path(root: &mut TreeNode, path: &[usize]) -> bool {
    if tree::node_at(root, path).is_none() {
        return false;
    }
    for depth in (0..=path.len()).rev() {
        if let Some(node) = tree::node_at_mut(root, &path[..depth]) {
            refresh(node);
        }
    }
    true
}

/// Find an action of the given kind on a node.
pub fn find_action(node: &TreeNode, kind: ActionKind) -> Option<Action> {
    node.actions.iter().copied().find(|a| a.kind == kind)
}
