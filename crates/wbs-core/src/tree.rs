//! Task tree
//!
//! Arena storage for [`TreeNode`]s addressed by [`NodeId`]. Children are
//! owned index lists in source order; the parent link is a plain index.
//!
//! Invariant: `level(child) == level(parent) + 1` and the root sits at
//! `root_level`. [`Tree::graft`] re-levels spliced subtrees to keep it.

use crate::record::{Schedule, TaskRecord};
use serde::Serialize;
use std::fmt;

/// Index of a node in its tree's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    /// Arena index
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Node of the task tree
///
/// `record` holds the canonical values. `ancestor_view` and `descendant_view`
/// are scratch copies of the schedule refined by percolation; both are seeded
/// from the record when the node is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub record: TaskRecord,
    pub ancestor_view: Schedule,
    pub descendant_view: Schedule,
    level: usize,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl TreeNode {
    fn new(record: TaskRecord, level: usize, parent: Option<NodeId>) -> Self {
        Self {
            ancestor_view: record.schedule.clone(),
            descendant_view: record.schedule.clone(),
            record,
            level,
            parent,
            children: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn level(&self) -> usize {
        self.level
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in source order
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Short label `<level>-<id>-<description>` for diagnostics
    #[must_use]
    pub fn label(&self) -> String {
        format!(
            "<{}>-<{}>-<{}>",
            self.level, self.record.id, self.record.description
        )
    }
}

/// Hierarchical task tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tree {
    nodes: Vec<TreeNode>,
    root: Option<NodeId>,
    root_level: usize,
}

impl Tree {
    /// Create empty tree rooted at level 0
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create empty tree whose root will sit at `root_level`
    #[inline]
    #[must_use]
    pub fn with_root_level(root_level: usize) -> Self {
        Self {
            root_level,
            ..Self::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    #[inline]
    #[must_use]
    pub fn root_level(&self) -> usize {
        self.root_level
    }

    /// Number of nodes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node by id
    ///
    /// # Panics
    /// If `id` was not issued by this tree.
    #[inline]
    #[must_use]
    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    /// Mutable node by id
    ///
    /// # Panics
    /// If `id` was not issued by this tree.
    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id.0]
    }

    /// Node by id, if it belongs to this tree
    #[inline]
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    /// First node in pre-order whose record id matches
    #[must_use]
    pub fn find(&self, record_id: &str) -> Option<NodeId> {
        self.pre_order()
            .into_iter()
            .find(|&id| self.node(id).record.id == record_id)
    }

    /// Parents of `id`, nearest first
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.node(id).parent, move |&p| self.node(p).parent)
    }

    /// Node ids in pre-order, children in source order
    #[must_use]
    pub fn pre_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        order
    }

    /// Check `level == parent.level + 1` everywhere and root at `root_level`
    #[must_use]
    pub fn levels_consistent(&self) -> bool {
        let Some(root) = self.root else {
            return true;
        };
        if self.node(root).level != self.root_level {
            return false;
        }
        self.pre_order().into_iter().all(|id| {
            let node = self.node(id);
            node.record.depth.level() == node.level
                && node
                    .parent
                    .map_or(true, |p| self.node(p).level + 1 == node.level)
        })
    }

    /// Install `record` as the root
    pub(crate) fn set_root(&mut self, mut record: TaskRecord) -> NodeId {
        debug_assert!(self.root.is_none(), "tree already has a root");
        record.depth.set_level(self.root_level);
        let id = self.push(TreeNode::new(record, self.root_level, None));
        self.root = Some(id);
        id
    }

    /// Append `record` as the last child of `parent`
    pub(crate) fn push_child(&mut self, parent: NodeId, mut record: TaskRecord) -> NodeId {
        let level = self.node(parent).level + 1;
        record.depth.set_level(level);
        let id = self.push(TreeNode::new(record, level, Some(parent)));
        self.node_mut(parent).children.push(id);
        id
    }

    /// Move every node of `subtree` into this arena under `parent`
    ///
    /// Without a parent the subtree root becomes this tree's root. The
    /// subtree's own root level is discarded; levels and depth codes are
    /// rewritten from the attachment point down. Returns the new id of the
    /// spliced root, or `None` for an empty subtree.
    pub(crate) fn graft(&mut self, parent: Option<NodeId>, subtree: Tree) -> Option<NodeId> {
        debug_assert!(parent.is_some() || self.root.is_none());
        let sub_root = subtree.root?;
        let offset = self.nodes.len();
        let shift = |id: NodeId| NodeId(id.0 + offset);

        for mut node in subtree.nodes {
            node.parent = node.parent.map(shift);
            for child in &mut node.children {
                *child = shift(*child);
            }
            self.nodes.push(node);
        }

        let new_root = shift(sub_root);
        let level = match parent {
            Some(p) => {
                self.node_mut(new_root).parent = Some(p);
                self.node_mut(p).children.push(new_root);
                self.node(p).level + 1
            }
            None => {
                self.root = Some(new_root);
                self.root_level
            }
        };
        self.relevel(new_root, level);
        Some(new_root)
    }

    /// Set `id` to `level` and every descendant one deeper than its parent
    fn relevel(&mut self, id: NodeId, level: usize) {
        let mut stack = vec![(id, level)];
        while let Some((id, level)) = stack.pop() {
            let node = self.node_mut(id);
            node.level = level;
            node.record.depth.set_level(level);
            tracing::trace!(node = %node.label(), "adjusted level");
            stack.extend(node.children.iter().map(|&c| (c, level + 1)));
        }
    }

    fn push(&mut self, node: TreeNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::DepthCode;

    fn record(id: &str) -> TaskRecord {
        TaskRecord::new(DepthCode::for_level('*', 0), id, id)
    }

    #[test]
    fn empty_tree() {
        let tree = Tree::new();
        assert!(tree.is_empty());
        assert!(tree.root().is_none());
        assert!(tree.pre_order().is_empty());
        assert!(tree.levels_consistent());
    }

    #[test]
    fn pre_order_follows_source_order() {
        let mut tree = Tree::new();
        let a = tree.set_root(record("A"));
        let b = tree.push_child(a, record("B"));
        let c = tree.push_child(a, record("C"));
        let d = tree.push_child(b, record("D"));

        assert_eq!(tree.pre_order(), vec![a, b, d, c]);
        assert_eq!(tree.ancestors(d).collect::<Vec<_>>(), vec![b, a]);
        assert_eq!(tree.node(d).level(), 2);
        assert_eq!(tree.node(d).record.depth.to_string(), "***");
        assert!(tree.levels_consistent());
    }

    #[test]
    fn views_seeded_from_record() {
        let mut tree = Tree::new();
        let a = tree.set_root(record("A").with_start("2024-01-01").with_status(20));
        let node = tree.node(a);
        assert_eq!(node.ancestor_view, node.record.schedule);
        assert_eq!(node.descendant_view, node.record.schedule);
    }

    #[test]
    fn graft_relevels_subtree() {
        let mut tree = Tree::new();
        let a = tree.set_root(record("A"));
        let b = tree.push_child(a, record("B"));

        let mut sub = Tree::new();
        let x = sub.set_root(record("X"));
        sub.push_child(x, record("Y"));

        let spliced = tree.graft(Some(b), sub).unwrap();
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.node(spliced).parent(), Some(b));
        assert_eq!(tree.node(spliced).level(), 2);

        let y = tree.find("Y").unwrap();
        assert_eq!(tree.node(y).level(), 3);
        assert_eq!(tree.node(y).parent(), Some(spliced));
        assert_eq!(tree.node(y).record.depth.to_string(), "****");
        assert!(tree.levels_consistent());
    }

    #[test]
    fn graft_into_empty_tree_becomes_root() {
        let mut tree = Tree::with_root_level(2);
        let mut sub = Tree::new();
        sub.set_root(record("X"));

        let root = tree.graft(None, sub).unwrap();
        assert_eq!(tree.root(), Some(root));
        assert_eq!(tree.node(root).level(), 2);
        assert!(tree.levels_consistent());
    }

    #[test]
    fn graft_empty_subtree_is_noop() {
        let mut tree = Tree::new();
        let a = tree.set_root(record("A"));
        assert!(tree.graft(Some(a), Tree::new()).is_none());
        assert_eq!(tree.len(), 1);
    }
}
