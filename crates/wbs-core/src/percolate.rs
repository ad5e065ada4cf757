//! Schedule percolation
//!
//! Reconciles start, end and status across the tree in one depth-first
//! pass, children in source order:
//! 1. seed the child's ancestor view from the parent (fill unset only)
//! 2. recurse into the child
//! 3. fold the child's descendant view into the parent (earliest start,
//!    latest end)
//!
//! Own statuses are corrected on the way: a done parent cannot have an
//! incomplete child, and an untouched parent cannot stay at 0 while a child
//! is progressing.
//!
//! The optional fix pass then collapses the three candidates (descendant,
//! own, ancestor) into the record's own start and end. See [`Dru`].

use crate::config::WbsConfig;
use crate::record::Status;
use crate::tree::{NodeId, Tree};
use std::fmt;

/// Counts of values changed by a percolation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PercolationReport {
    /// Ancestor-view fields filled from a parent
    pub ancestor_fills: usize,
    /// Descendant-view fields filled or widened from a child
    pub descendant_updates: usize,
    /// Done parents lowered to an incomplete child's status
    pub status_forced_down: usize,
    /// Untouched parents raised to an active child's status
    pub status_forced_up: usize,
    /// Own starts replaced by the fix pass
    pub starts_fixed: usize,
    /// Own ends replaced by the fix pass
    pub ends_fixed: usize,
}

impl PercolationReport {
    /// Nothing changed
    #[inline]
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        *self == Self::default()
    }

    /// Own statuses changed
    #[inline]
    #[must_use]
    pub fn status_corrections(&self) -> usize {
        self.status_forced_down + self.status_forced_up
    }

    /// Add another report's counts
    pub fn merge(&mut self, other: &Self) {
        self.ancestor_fills += other.ancestor_fills;
        self.descendant_updates += other.descendant_updates;
        self.status_forced_down += other.status_forced_down;
        self.status_forced_up += other.status_forced_up;
        self.starts_fixed += other.starts_fixed;
        self.ends_fixed += other.ends_fixed;
    }
}

impl fmt::Display for PercolationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ancestor fills, {} descendant updates, {} statuses lowered, {} statuses raised, \
             {} starts fixed, {} ends fixed",
            self.ancestor_fills,
            self.descendant_updates,
            self.status_forced_down,
            self.status_forced_up,
            self.starts_fixed,
            self.ends_fixed,
        )
    }
}

/// Runs propagation and, optionally, the fix pass
#[derive(Debug, Clone, Copy, Default)]
pub struct Percolator {
    fix: bool,
}

impl Percolator {
    /// Propagation only
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With fix pass toggle
    #[inline]
    #[must_use]
    pub fn with_fix(mut self, fix: bool) -> Self {
        self.fix = fix;
        self
    }

    /// From configuration
    #[inline]
    #[must_use]
    pub fn from_config(config: &WbsConfig) -> Self {
        Self::new().with_fix(config.fix)
    }

    /// Reconcile the whole tree; never fails
    pub fn run(&self, tree: &mut Tree) -> PercolationReport {
        let mut report = propagate(tree);
        if self.fix {
            report.merge(&fix(tree));
        }
        tracing::info!(fix = self.fix, %report, "percolation complete");
        report
    }
}

/// Top-down seed and bottom-up aggregation over the whole tree
pub fn propagate(tree: &mut Tree) -> PercolationReport {
    let mut report = PercolationReport::default();
    if let Some(root) = tree.root() {
        percolate(tree, root, &mut report);
    }
    report
}

/// Final-resolution pass, bottom-up
pub fn fix(tree: &mut Tree) -> PercolationReport {
    let mut report = PercolationReport::default();
    if let Some(root) = tree.root() {
        fix_node(tree, root, &mut report);
    }
    report
}

fn percolate(tree: &mut Tree, node: NodeId, report: &mut PercolationReport) {
    let children = tree.node(node).children().to_vec();
    for child in children {
        seed_from_parent(tree, node, child, report);
        percolate(tree, child, report);
        aggregate_into_parent(tree, node, child, report);
    }
}

fn seed_from_parent(tree: &mut Tree, parent: NodeId, child: NodeId, report: &mut PercolationReport) {
    let inherited = tree.node(parent).ancestor_view.clone();

    let child_node = tree.node_mut(child);
    let view = &mut child_node.ancestor_view;
    let mut fills = usize::from(fill(&mut view.start, &inherited.start));
    fills += usize::from(fill(&mut view.end, &inherited.end));
    if view.status.is_unset() && !inherited.status.is_unset() {
        view.status = inherited.status;
        fills += 1;
    }
    if fills > 0 {
        tracing::debug!(node = %child_node.label(), fills, "filled ancestor view");
    }
    report.ancestor_fills += fills;

    let child_status = child_node.record.status();
    let parent_status = tree.node(parent).record.status();
    if child_status.is_active() && parent_status.is_done() {
        force_status(tree, parent, child, child_status);
        report.status_forced_down += 1;
    }
}

fn aggregate_into_parent(
    tree: &mut Tree,
    parent: NodeId,
    child: NodeId,
    report: &mut PercolationReport,
) {
    let child_node = tree.node(child);
    let rolled_up = child_node.descendant_view.clone();
    let inherited_end = child_node.ancestor_view.end.clone();
    let child_status = child_node.record.status();

    let parent_node = tree.node_mut(parent);
    let view = &mut parent_node.descendant_view;
    let mut updates = usize::from(widen(&mut view.start, &rolled_up.start, Bound::Earliest));
    if !view.has_end() {
        updates += usize::from(fill(&mut view.end, &inherited_end));
    }
    updates += usize::from(widen(&mut view.end, &rolled_up.end, Bound::Latest));
    if view.status.is_unset() && view.status != rolled_up.status {
        view.status = rolled_up.status;
        updates += 1;
    }
    if updates > 0 {
        tracing::debug!(node = %parent_node.label(), updates, "aggregated descendant view");
    }
    report.descendant_updates += updates;

    let parent_status = parent_node.record.status();
    if !child_status.is_active() || parent_status == child_status {
        return;
    }
    if parent_status.is_unset() {
        force_status(tree, parent, child, child_status);
        report.status_forced_up += 1;
    } else if parent_status.is_done() {
        force_status(tree, parent, child, child_status);
        report.status_forced_down += 1;
    }
}

fn force_status(tree: &mut Tree, parent: NodeId, child: NodeId, status: Status) {
    let child_label = tree.node(child).label();
    let parent_node = tree.node_mut(parent);
    tracing::warn!(
        parent = %parent_node.label(),
        child = %child_label,
        from = %parent_node.record.status(),
        to = %status,
        "parent status inconsistent with child, forcing to child's value"
    );
    parent_node.record.schedule.status = status;
}

fn fix_node(tree: &mut Tree, node: NodeId, report: &mut PercolationReport) {
    let children = tree.node(node).children().to_vec();
    for child in children {
        fix_node(tree, child, report);
    }

    let current = tree.node_mut(node);
    let start = resolve_field(
        &current.descendant_view.start,
        &current.record.schedule.start,
        &current.ancestor_view.start,
        Bound::Earliest,
    );
    if let Some(value) = start {
        tracing::debug!(node = %current.label(), from = %current.record.schedule.start, to = %value, "fixed start");
        current.record.schedule.start = value;
        report.starts_fixed += 1;
    }

    let end = resolve_field(
        &current.descendant_view.end,
        &current.record.schedule.end,
        &current.ancestor_view.end,
        Bound::Latest,
    );
    if let Some(value) = end {
        tracing::debug!(node = %current.label(), from = %current.record.schedule.end, to = %value, "fixed end");
        current.record.schedule.end = value;
        report.ends_fixed += 1;
    }
}

/// Which way a date bound widens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Start dates: earlier is wider
    Earliest,
    /// End dates: later is wider
    Latest,
}

impl Bound {
    /// `candidate` lies strictly outside `current` in this direction
    #[inline]
    #[must_use]
    pub fn widens(self, candidate: &str, current: &str) -> bool {
        match self {
            Self::Earliest => candidate < current,
            Self::Latest => candidate > current,
        }
    }
}

/// Presence mask of the three candidates for one date field
///
/// Bit 2: descendant view set, bit 1: own value set, bit 0: ancestor view
/// set.
///
/// | dru | resolution |
/// |---|---|
/// | 0 | leave unset |
/// | 1 | ancestor |
/// | 2, 3 | own |
/// | 4, 5 | descendant |
/// | 6, 7 | descendant if it widens own, else own |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dru(u8);

impl Dru {
    /// Mask for three candidate values
    #[must_use]
    pub fn of(descendant: &str, own: &str, ancestor: &str) -> Self {
        let bit = |value: &str, shift: u8| u8::from(!value.is_empty()) << shift;
        Self(bit(descendant, 2) | bit(own, 1) | bit(ancestor, 0))
    }

    /// Mask value 0..=7
    #[inline]
    #[must_use]
    pub fn bits(self) -> u8 {
        self.0
    }
}

/// Resolved value for one field, or `None` to keep own
#[must_use]
pub fn resolve_field(descendant: &str, own: &str, ancestor: &str, bound: Bound) -> Option<String> {
    match Dru::of(descendant, own, ancestor).bits() {
        1 => Some(ancestor.to_string()),
        4 | 5 => Some(descendant.to_string()),
        6 | 7 if bound.widens(descendant, own) => Some(descendant.to_string()),
        _ => None,
    }
}

/// Fill an unset slot; reports whether it changed
fn fill(slot: &mut String, value: &str) -> bool {
    if slot.is_empty() && !value.is_empty() {
        value.clone_into(slot);
        true
    } else {
        false
    }
}

/// Move `slot` outward to `candidate`; unset candidates never win
fn widen(slot: &mut String, candidate: &str, bound: Bound) -> bool {
    if candidate.is_empty() {
        return false;
    }
    if slot.is_empty() || bound.widens(candidate, slot) {
        candidate.clone_into(slot);
        true
    } else {
        false
    }
}
