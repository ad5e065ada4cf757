//! Tree builder
//!
//! Turns a stream of depth-coded records into a [`Tree`]. A cursor tracks
//! the last attached node; each new record walks the cursor up to the
//! ancestor one level above its depth and attaches beneath it.

use crate::record::TaskRecord;
use crate::tree::{NodeId, Tree};

/// Depth sequence errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HierarchyError {
    /// Record asks to rise above the root
    #[error("level {requested} rises above the root (root level {root_level})")]
    RisesAboveRoot { requested: usize, root_level: usize },

    /// Record is more than one level deeper than the previous one
    #[error("level {requested} skips a level below level {cursor}")]
    SkipsLevel { requested: usize, cursor: usize },
}

/// Incremental tree builder
#[derive(Debug, Default)]
pub struct TreeBuilder {
    tree: Tree,
    cursor: Option<NodeId>,
}

impl TreeBuilder {
    /// Create builder for a tree rooted at level 0
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create builder for a tree rooted at `root_level`
    #[inline]
    #[must_use]
    pub fn with_root_level(root_level: usize) -> Self {
        Self {
            tree: Tree::with_root_level(root_level),
            cursor: None,
        }
    }

    /// Last attached node
    #[inline]
    #[must_use]
    pub fn cursor(&self) -> Option<NodeId> {
        self.cursor
    }

    /// Tree built so far
    #[inline]
    #[must_use]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Finish building
    #[inline]
    #[must_use]
    pub fn finish(self) -> Tree {
        self.tree
    }

    /// Attach a record at the level its depth code encodes
    ///
    /// The first record becomes the root at the tree's root level.
    pub fn add_node(&mut self, record: TaskRecord) -> Result<NodeId, HierarchyError> {
        let id = match self.cursor {
            None => {
                if record.depth.level() != self.tree.root_level() {
                    tracing::warn!(
                        id = %record.id,
                        depth = %record.depth,
                        root_level = self.tree.root_level(),
                        "root depth code does not match root level, rewriting"
                    );
                }
                self.tree.set_root(record)
            }
            Some(cursor) => {
                let parent = self.attach_point(cursor, record.depth.level())?;
                self.tree.push_child(parent, record)
            }
        };

        tracing::debug!(node = %self.tree.node(id).label(), "attached node");
        self.cursor = Some(id);
        Ok(id)
    }

    /// Splice an independently built tree at the level `record` encodes
    ///
    /// `record` is the inclusion row; only its depth code is used. The
    /// spliced root becomes the cursor. Returns `None` when `subtree` is
    /// empty.
    pub fn add_subtree(
        &mut self,
        record: &TaskRecord,
        subtree: Tree,
    ) -> Result<Option<NodeId>, HierarchyError> {
        let parent = match self.cursor {
            None => None,
            Some(cursor) => Some(self.attach_point(cursor, record.depth.level())?),
        };

        let spliced = self.tree.graft(parent, subtree);
        match spliced {
            Some(root) => {
                tracing::debug!(
                    node = %self.tree.node(root).label(),
                    splice = %record.id,
                    "spliced subtree"
                );
                self.cursor = Some(root);
            }
            None => {
                tracing::warn!(splice = %record.id, "included source is empty");
                if parent.is_some() {
                    self.cursor = parent;
                }
            }
        }
        Ok(spliced)
    }

    /// Ancestor of `cursor` that a node at `level` attaches beneath
    ///
    /// Walks `cursor.level - level + 1` steps up: one step past the sibling
    /// level, so the new node lands exactly one level below the result.
    fn attach_point(&self, cursor: NodeId, level: usize) -> Result<NodeId, HierarchyError> {
        let cursor_level = self.tree.node(cursor).level();
        if level > cursor_level + 1 {
            return Err(HierarchyError::SkipsLevel {
                requested: level,
                cursor: cursor_level,
            });
        }

        let steps = cursor_level + 1 - level;
        let mut current = cursor;
        for _ in 0..steps {
            current = self
                .tree
                .node(current)
                .parent()
                .ok_or(HierarchyError::RisesAboveRoot {
                    requested: level,
                    root_level: self.tree.root_level(),
                })?;
            tracing::trace!(node = %self.tree.node(current).label(), "cursor up");
        }
        Ok(current)
    }
}
