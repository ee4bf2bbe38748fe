//! Adding leaves to and removing them from the live surface.
//!
//! Every operation keeps three things in step: the live surface, the
//! [`LifecycleMap`] and the nodes' `is_added_to_map` flags (with the actions
//! derived from them). On error none of the three has changed.

use tracing::debug;
use webdata_common::actions::refresh_path;
use webdata_common::tree::{self, node_at, node_at_mut};
use webdata_common::TreeNode;

use crate::error::{WebdataError, WebdataResult};
use crate::host::LiveSurface;
use crate::renderable::Renderable;
use crate::state::LifecycleMap;

fn not_found(root: &TreeNode, path: &[usize]) -> WebdataError {
    WebdataError::NodeNotFound {
        url: root.url.clone(),
        name: format!("{:?}", path),
    }
}

/// Materialize the leaf at `path` below `root`.
///
/// Fails with [`WebdataError::DuplicateName`] if the surface already has a
/// layer of that name, and with [`WebdataError::NotALeaf`] for containers.
/// If activation fails the layer is taken off the surface again.
pub fn add_leaf(
    root: &mut TreeNode,
    path: &[usize],
    surface: &mut dyn LiveSurface,
    state: &mut LifecycleMap,
) -> WebdataResult<()> {
    let node = node_at(root, path).ok_or_else(|| not_found(root, path))?;
    if surface.has(&node.name) {
        return Err(WebdataError::DuplicateName(node.name.clone()));
    }
    if !node.is_leaf() {
        return Err(WebdataError::NotALeaf(node.name.clone()));
    }

    let renderable = Renderable::from_node(node);
    surface.add(renderable.clone());
    if let Err(source) = surface.activate(&renderable) {
        surface.remove(&renderable.name);
        return Err(WebdataError::Activation {
            name: renderable.name,
            source,
        });
    }
    state.insert(&node.url, &node.name, node.source_type());

    if let Some(node) = node_at_mut(root, path) {
        node.is_added_to_map = true;
    }
    refresh_path(root, path);
    debug!(name = %renderable.name, url = %root.url, "Added layer");
    Ok(())
}

/// Take the leaf at `path` off the live surface.
pub fn remove_leaf(
    root: &mut TreeNode,
    path: &[usize],
    surface: &mut dyn LiveSurface,
    state: &mut LifecycleMap,
) -> WebdataResult<()> {
    let node = node_at(root, path).ok_or_else(|| not_found(root, path))?;
    if !node.is_added_to_map {
        return Err(WebdataError::NotAdded(node.name.clone()));
    }

    let name = node.name.clone();
    surface.remove(&name);
    state.remove(&node.url, &name);

    if let Some(node) = node_at_mut(root, path) {
        node.is_added_to_map = false;
    }
    refresh_path(root, path);
    debug!(name = %name, url = %root.url, "Removed layer");
    Ok(())
}

/// Outcome of [`add_all`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddAllReport {
    pub added: Vec<String>,
    pub failed: Vec<(String, WebdataError)>,
}

/// Add every not-yet-added leaf at or below `path`, depth-first.
///
/// A failing leaf does not stop the others.
pub fn add_all(
    root: &mut TreeNode,
    path: &[usize],
    surface: &mut dyn LiveSurface,
    state: &mut LifecycleMap,
) -> AddAllReport {
    let mut report = AddAllReport::default();
    for leaf in tree::leaf_paths(root, path) {
        let Some(node) = node_at(root, &leaf) else {
            continue;
        };
        if node.is_added_to_map {
            continue;
        }
        let name = node.name.clone();
        match add_leaf(root, &leaf, surface, state) {
            Ok(()) => report.added.push(name),
            Err(e) => report.failed.push((name, e)),
        }
    }
    report
}

/// Remove every added leaf at or below `path`, depth-first.
///
/// Returns the removed names.
pub fn remove_all(
    root: &mut TreeNode,
    path: &[usize],
    surface: &mut dyn LiveSurface,
    state: &mut LifecycleMap,
) -> WebdataResult<Vec<String>> {
    let mut removed = Vec::new();
    for leaf in tree::leaf_paths(root, path) {
        let added = node_at(root, &leaf).map_or(false, |n| n.is_added_to_map);
        if !added {
            continue;
        }
        remove_leaf(root, &leaf, surface, state)?;
        if let Some(node) = node_at(root, &leaf) {
            removed.push(node.name.clone());
        }
    }
    Ok(removed)
}

/// Record leaves that were created already live (same name on the surface).
///
/// A leaf whose name another source has recorded belongs to that source:
/// its flag is cleared instead. Returns how many leaves were recorded.
pub fn adopt_live_leaves(root: &mut TreeNode, state: &mut LifecycleMap) -> usize {
    let mut adopted = 0;
    for path in tree::leaf_paths(root, &[]) {
        let Some(node) = node_at(root, &path) else {
            continue;
        };
        if !node.is_added_to_map {
            continue;
        }
        let claimed = state.owner(&node.name).map_or(false, |url| url != node.url);
        if !claimed {
            if state.insert(&node.url, &node.name, node.source_type()) {
                adopted += 1;
            }
            continue;
        }

        debug!(name = %node.name, url = %node.url, "Live layer belongs to another source");
        if let Some(node) = node_at_mut(root, &path) {
            node.is_added_to_map = false;
        }
        refresh_path(root, &path);
    }
    adopted
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use webdata_common::actions::{find_action, ActionKind};
    use webdata_common::{NodeKind, SourceType};

    use crate::host::ActivationError;

    #[derive(Default)]
    struct Surface {
        live: HashSet<String>,
        removes: usize,
        refuse: Option<String>,
    }

    impl LiveSurface for Surface {
        fn has(&self, name: &str) -> bool {
            self.live.contains(name)
        }

        fn add(&mut self, renderable: Renderable) {
            self.live.insert(renderable.name);
        }

        fn remove(&mut self, name: &str) {
            self.removes += 1;
            self.live.remove(name);
        }

        fn activate(&mut self, renderable: &Renderable) -> Result<(), ActivationError> {
            match &self.refuse {
                Some(name) if *name == renderable.name => Err(ActivationError("no context".into())),
                _ => Ok(()),
            }
        }
    }

    const URL: &str = "https://example.com/wms";

    fn leaf(name: &str) -> TreeNode {
        TreeNode::new(name, None, URL, NodeKind::GeoJson)
    }

    fn source() -> TreeNode {
        TreeNode::new(URL, None, URL, NodeKind::GeoJson)
            .with_children(vec![
                leaf("a"),
                TreeNode::new("g", None, URL, NodeKind::GeoJson).with_children(vec![leaf("b"), leaf("c")]),
            ])
            .into_root()
    }

    #[test]
    fn test_add_leaf_updates_all_three() {
        let mut root = source();
        let mut surface = Surface::default();
        let mut state = LifecycleMap::new();

        add_leaf(&mut root, &[1, 0], &mut surface, &mut state).unwrap();

        assert!(surface.has("b"));
        assert!(state.contains(URL, "b"));
        let b = &root.children[1].children[0];
        assert!(b.is_added_to_map);
        assert_eq!(b.actions()[0].kind, ActionKind::RemoveLayer);
        assert!(!find_action(&root.children[1], ActionKind::RemoveAll).unwrap().disabled);
        assert!(!find_action(&root, ActionKind::RemoveAll).unwrap().disabled);
    }

    #[test]
    fn test_add_container_rejected() {
        let mut root = source();
        let mut surface = Surface::default();
        let mut state = LifecycleMap::new();
        assert_eq!(
            add_leaf(&mut root, &[1], &mut surface, &mut state),
            Err(WebdataError::NotALeaf("g".into()))
        );
        assert!(surface.live.is_empty());
        assert!(state.is_empty());
    }

    #[test]
    fn test_activation_failure_rolls_back() {
        let mut root = source();
        let mut surface = Surface {
            refuse: Some("a".into()),
            ..Surface::default()
        };
        let mut state = LifecycleMap::new();

        let err = add_leaf(&mut root, &[0], &mut surface, &mut state).unwrap_err();
        assert!(matches!(err, WebdataError::Activation { .. }));
        assert!(!surface.has("a"));
        assert!(state.is_empty());
        assert!(!root.children[0].is_added_to_map);
    }

    #[test]
    fn test_remove_not_added() {
        let mut root = source();
        let mut surface = Surface::default();
        let mut state = LifecycleMap::new();
        assert_eq!(
            remove_leaf(&mut root, &[0], &mut surface, &mut state),
            Err(WebdataError::NotAdded("a".into()))
        );
        assert_eq!(surface.removes, 0);
    }

    #[test]
    fn test_bad_path() {
        let mut root = source();
        let mut surface = Surface::default();
        let mut state = LifecycleMap::new();
        assert!(matches!(
            add_leaf(&mut root, &[7], &mut surface, &mut state),
            Err(WebdataError::NodeNotFound { .. })
        ));
    }

    #[test]
    fn test_add_all_then_remove_all() {
        let mut root = source();
        let mut surface = Surface::default();
        let mut state = LifecycleMap::new();

        let report = add_all(&mut root, &[], &mut surface, &mut state);
        assert_eq!(report.added, vec!["a", "b", "c"]);
        assert!(report.failed.is_empty());
        assert!(find_action(&root, ActionKind::AddAll).unwrap().disabled);

        let removed = remove_all(&mut root, &[1], &mut surface, &mut state).unwrap();
        assert_eq!(removed, vec!["b", "c"]);
        assert_eq!(state.get(URL).unwrap().names.len(), 1);
        assert!(!find_action(&root, ActionKind::AddAll).unwrap().disabled);
        assert!(!find_action(&root, ActionKind::RemoveAll).unwrap().disabled);
    }

    #[test]
    fn test_add_all_continues_past_duplicates() {
        let mut root = source();
        let mut surface = Surface::default();
        surface.live.insert("b".into());
        let mut state = LifecycleMap::new();

        let report = add_all(&mut root, &[], &mut surface, &mut state);
        assert_eq!(report.added, vec!["a", "c"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].1, WebdataError::DuplicateName("b".into()));
    }

    #[test]
    fn test_adopt_live_leaves() {
        let mut root = source();
        root.children[0].is_added_to_map = true;
        let mut state = LifecycleMap::new();
        assert_eq!(adopt_live_leaves(&mut root, &mut state), 1);
        assert!(state.contains(URL, "a"));
        assert_eq!(adopt_live_leaves(&mut root, &mut state), 0);
    }

    #[test]
    fn test_adopt_skips_names_of_other_sources() {
        let mut root = source();
        root.children[0].is_added_to_map = true;
        root.children[1].children[1].is_added_to_map = true;
        let mut state = LifecycleMap::new();
        state.insert("https://example.com/other", "c", SourceType::Wms);

        assert_eq!(adopt_live_leaves(&mut root, &mut state), 1);

        assert!(state.contains(URL, "a"));
        assert!(!state.contains(URL, "c"));
        assert_eq!(state.owner("c"), Some("https://example.com/other"));
        let group = &root.children[1];
        assert!(!group.children[1].is_added_to_map);
        assert!(find_action(group, ActionKind::RemoveAll).unwrap().disabled);
        assert_eq!(group.children[1].actions()[0].kind, ActionKind::AddToMap);
    }
}
