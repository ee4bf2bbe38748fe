//! The loaded sources.

use webdata_common::tree;
use webdata_common::TreeNode;

/// Address of a node: the root's URL plus an index path below it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodePath {
    pub url: String,
    pub indices: Vec<usize>,
}

impl NodePath {
    pub fn root(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            indices: Vec::new(),
        }
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.indices.clone();
        indices.push(index);
        Self {
            url: self.url.clone(),
            indices,
        }
    }

    pub fn parent(&self) -> Option<Self> {
        tree::parent_path(&self.indices).map(|p| Self {
            url: self.url.clone(),
            indices: p.to_vec(),
        })
    }
}

/// Root nodes in load order. Root URLs are unique.
#[derive(Debug, Clone, Default)]
pub struct SourceCollection {
    roots: Vec<TreeNode>,
}

impl SourceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn roots(&self) -> &[TreeNode] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn root(&self, url: &str) -> Option<&TreeNode> {
        self.roots.iter().find(|r| r.url == url)
    }

    pub fn root_mut(&mut self, url: &str) -> Option<&mut TreeNode> {
        self.roots.iter_mut().find(|r| r.url == url)
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.root(url).is_some()
    }

    /// Whether a root of that name is loaded.
    pub fn contains_name(&self, name: &str) -> bool {
        self.roots.iter().any(|r| r.name == name)
    }

    pub fn get(&self, path: &NodePath) -> Option<&TreeNode> {
        self.root(&path.url)
            .and_then(|root| tree::node_at(root, &path.indices))
    }

    pub fn parent(&self, path: &NodePath) -> Option<&TreeNode> {
        path.parent().and_then(|p| self.get(&p))
    }

    /// Find a node by root URL and name: the root itself, else breadth-first.
    pub fn find(&self, url: &str, name: &str) -> Option<NodePath> {
        let root = self.root(url)?;
        tree::find_path_by_name(root, name).map(|indices| NodePath {
            url: url.to_string(),
            indices,
        })
    }

    pub(crate) fn push(&mut self, root: TreeNode) -> NodePath {
        let path = NodePath::root(root.url.clone());
        self.roots.push(root);
        path
    }

    pub(crate) fn remove(&mut self, url: &str) -> Option<TreeNode> {
        let index = self.roots.iter().position(|r| r.url == url)?;
        Some(self.roots.remove(index))
    }
}
