//! Testing utilities for WBS workspace
//!
//! Shared test helpers, fixtures, and source files.

#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};
use wbs_core::{DepthCode, TaskRecord, Tree, TreeBuilder, TreeNode};

/// Record with a `*`-coded depth and the id doubling as description
pub fn record(depth: &str, id: &str) -> TaskRecord {
    TaskRecord::new(DepthCode::parse(depth, '*').unwrap(), id, id)
}

/// Build a tree from well-formed records
pub fn tree_from_rows(rows: impl IntoIterator<Item = TaskRecord>) -> Tree {
    let mut builder = TreeBuilder::new();
    for row in rows {
        builder.add_node(row).unwrap();
    }
    builder.finish()
}

/// Node by record id
pub fn node<'t>(tree: &'t Tree, id: &str) -> &'t TreeNode {
    let node_id = tree
        .find(id)
        .unwrap_or_else(|| panic!("no node with id {id}"));
    tree.node(node_id)
}

/// Record ids in pre-order
pub fn ids_in_order(tree: &Tree) -> Vec<String> {
    tree.pre_order()
        .into_iter()
        .map(|id| tree.node(id).record.id.clone())
        .collect()
}

/// Write `lines` as a source file in `dir`
pub fn write_source(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut text = lines.join("\n");
    text.push('\n');
    fs::write(&path, text).unwrap();
    path
}

/// Temporary directory for source files
pub fn source_dir() -> tempfile::TempDir {
    tempfile::tempdir().unwrap()
}

/// Small project: a root, two phases, and a few tasks with mixed data
pub fn sample_plan() -> Vec<TaskRecord> {
    vec![
        record("*", "P")
            .with_start("2024-01-08")
            .with_end("2024-06-28")
            .with_status(0),
        record("**", "P1").with_start("2024-01-08").with_status(100),
        record("***", "P1.1")
            .with_start("2024-01-08")
            .with_end("2024-01-26")
            .with_status(100),
        record("***", "P1.2").with_end("2024-02-16").with_status(60),
        record("**<", "P2"),
        record("***", "P2.1")
            .with_start("2024-03-04")
            .with_end("2024-07-12")
            .with_status(0),
        record("***", "P2.2").with_status(-1),
    ]
}
