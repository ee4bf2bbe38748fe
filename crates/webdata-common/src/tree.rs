//! Generic traversal and lookup over source trees.
//!
//! Nodes are addressed by index paths relative to a root: `[]` is the root
//! itself, `[2, 0]` the first child of the root's third child.

use std::collections::VecDeque;

use crate::TreeNode;

/// Apply `f` to `item` and every descendant, parents before children.
pub fn apply_to_item_and_children<'a, F>(item: &'a TreeNode, f: &mut F)
where
    F: FnMut(&'a TreeNode),
{
    f(item);
    for child in &item.children {
        apply_to_item_and_children(child, f);
    }
}

/// Mutable variant of [`apply_to_item_and_children`].
pub fn apply_to_item_and_children_mut<F>(item: &mut TreeNode, f: &mut F)
where
    F: FnMut(&mut TreeNode),
{
    f(item);
    for child in &mut item.children {
        apply_to_item_and_children_mut(child, f);
    }
}

/// Keep the nodes matching `condition`, together with the ancestors leading to them.
///
/// A matching node is kept whole, subtree included. A non-matching node is
/// kept as a copy holding only its matching branches, or dropped if none.
pub fn filter_children<F>(items: &[TreeNode], condition: &F) -> Vec<TreeNode>
where
    F: Fn(&TreeNode) -> bool,
{
    let mut result = Vec::new();
    for item in items {
        if condition(item) {
            result.push(item.clone());
        } else if !item.children.is_empty() {
            let nodes = filter_children(&item.children, condition);
            if !nodes.is_empty() {
                let mut copy = item.clone();
                copy.children = nodes;
                result.push(copy);
            }
        }
    }
    result
}

pub fn node_at<'a>(root: &'a TreeNode, path: &[usize]) -> Option<&'a TreeNode> {
    path.iter()
        .try_fold(root, |node, &index| node.children.get(index))
}

pub fn node_at_mut<'a>(root: &'a mut TreeNode, path: &[usize]) -> Option<&'a mut TreeNode> {
    path.iter()
        .try_fold(root, |node, &index| node.children.get_mut(index))
}

/// Path of the parent, or `None` for the root.
pub fn parent_path(path: &[usize]) -> Option<&[usize]> {
    path.split_last().map(|(_, parent)| parent)
}

/// Find a node by name: the root itself, else breadth-first among descendants.
pub fn find_path_by_name(root: &TreeNode, name: &str) -> Option<Vec<usize>> {
    if root.name == name {
        return Some(Vec::new());
    }

    let mut queue: VecDeque<(Vec<usize>, &TreeNode)> = VecDeque::new();
    queue.push_back((Vec::new(), root));
    while let Some((path, node)) = queue.pop_front() {
        for (index, child) in node.children.iter().enumerate() {
            let mut child_path = path.clone();
            child_path.push(index);
            if child.name == name {
                return Some(child_path);
            }
            queue.push_back((child_path, child));
        }
    }
    None
}

/// The parent of the first node named `name` below `root`.
pub fn find_parent<'a>(root: &'a TreeNode, name: &str) -> Option<&'a TreeNode> {
    let path = find_path_by_name(root, name)?;
    parent_path(&path).and_then(|p| node_at(root, p))
}

/// Paths of all leaves at or below `path`, in depth-first order.
pub fn leaf_paths(root: &TreeNode, path: &[usize]) -> Vec<Vec<usize>> {
    fn collect(node: &TreeNode, path: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        if node.children.is_empty() {
            out.push(path.clone());
            return;
        }
        for (index, child) in node.children.iter().enumerate() {
            path.push(index);
            collect(child, path, out);
            path.pop();
        }
    }

    let mut out = Vec::new();
    if let Some(start) = node_at(root, path) {
        let mut current = path.to_vec();
        collect(start, &mut current, &mut out);
    }
    out
}
