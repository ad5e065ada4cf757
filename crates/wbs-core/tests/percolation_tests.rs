//! Percolation properties
//!
//! Randomised well-formed trees checked against the reconciliation rules:
//! - ancestor views carry the nearest declared value down
//! - descendant views bound every declared value below
//! - propagation reaches a fixed point after one run
//! - the fix pass leaves no resolvable date unset

use proptest::prelude::*;
use wbs_core::percolate::{fix, propagate};
use wbs_core::{DepthCode, NodeId, Percolator, Status, TaskRecord, Tree, TreeBuilder};
use wbs_test_utils::{node, record, sample_plan, tree_from_rows};

#[derive(Debug, Clone)]
struct GenRow {
    step: u8,
    start: Option<String>,
    end: Option<String>,
    status: i32,
}

fn date() -> impl Strategy<Value = Option<String>> {
    prop::option::of("2024-0[1-9]-[12][0-9]")
}

fn status() -> impl Strategy<Value = i32> {
    prop_oneof![Just(-1), Just(0), 1..100i32, Just(100)]
}

fn rows() -> impl Strategy<Value = Vec<GenRow>> {
    prop::collection::vec(
        (any::<u8>(), date(), date(), status()).prop_map(|(step, start, end, status)| GenRow {
            step,
            start,
            end,
            status,
        }),
        1..40,
    )
}

/// First row is the root; each later row sits between level 1 and one
/// below the previous row
fn build(rows: &[GenRow]) -> Tree {
    let mut builder = TreeBuilder::new();
    let mut previous = 0usize;
    for (i, row) in rows.iter().enumerate() {
        let level = if i == 0 {
            0
        } else {
            1 + usize::from(row.step) % (previous + 1)
        };
        previous = level;

        let mut record = TaskRecord::new(DepthCode::for_level('*', level), format!("n{i}"), "")
            .with_status(row.status);
        if let Some(start) = &row.start {
            record = record.with_start(start.clone());
        }
        if let Some(end) = &row.end {
            record = record.with_end(end.clone());
        }
        builder.add_node(record).unwrap();
    }
    builder.finish()
}

fn subtree(tree: &Tree, id: NodeId) -> Vec<NodeId> {
    let mut out = vec![id];
    let mut i = 0;
    while i < out.len() {
        out.extend_from_slice(tree.node(out[i]).children());
        i += 1;
    }
    out
}

fn self_and_ancestors(tree: &Tree, id: NodeId) -> Vec<NodeId> {
    std::iter::once(id).chain(tree.ancestors(id)).collect()
}

proptest! {
    #[test]
    fn prop_ancestor_view_holds_nearest_declared(rows in rows()) {
        let declared = build(&rows);
        let mut tree = declared.clone();
        propagate(&mut tree);

        for id in tree.pre_order() {
            let chain = self_and_ancestors(&declared, id);
            let nearest_start = chain
                .iter()
                .map(|&a| declared.node(a).record.start())
                .find(|s| !s.is_empty())
                .unwrap_or("");
            let nearest_end = chain
                .iter()
                .map(|&a| declared.node(a).record.end())
                .find(|s| !s.is_empty())
                .unwrap_or("");
            let any_status = chain
                .iter()
                .any(|&a| !declared.node(a).record.status().is_unset());

            let view = &tree.node(id).ancestor_view;
            prop_assert_eq!(view.start.as_str(), nearest_start);
            prop_assert_eq!(view.end.as_str(), nearest_end);
            prop_assert_eq!(!view.status.is_unset(), any_status);
        }
    }

    #[test]
    fn prop_descendant_view_bounds_subtree(rows in rows()) {
        let declared = build(&rows);
        let mut tree = declared.clone();
        propagate(&mut tree);

        for id in tree.pre_order() {
            let below = subtree(&declared, id);
            let starts: Vec<&str> = below
                .iter()
                .map(|&d| declared.node(d).record.start())
                .filter(|s| !s.is_empty())
                .collect();
            let ends: Vec<&str> = below
                .iter()
                .map(|&d| declared.node(d).record.end())
                .filter(|s| !s.is_empty())
                .collect();

            let view = &tree.node(id).descendant_view;
            let min_start = starts.iter().min().copied().unwrap_or("");
            prop_assert_eq!(view.start.as_str(), min_start);

            if let Some(max_end) = ends.iter().max() {
                prop_assert!(view.end.as_str() >= *max_end);
            }
            if view.has_end() {
                let inherited = tree.node(id).ancestor_view.end.as_str();
                prop_assert!(ends.contains(&view.end.as_str()) || view.end == inherited);
            }
        }
    }

    #[test]
    fn prop_propagation_is_idempotent(rows in rows()) {
        let mut tree = build(&rows);
        propagate(&mut tree);
        let once = tree.clone();

        let report = propagate(&mut tree);
        prop_assert!(report.is_quiet(), "second run changed values: {}", report);
        prop_assert_eq!(tree, once);
    }

    #[test]
    fn prop_done_parent_has_no_incomplete_child(rows in rows()) {
        let mut tree = build(&rows);
        propagate(&mut tree);

        for id in tree.pre_order() {
            let parent = tree.node(id);
            if !parent.record.status().is_done() {
                continue;
            }
            for &child in parent.children() {
                prop_assert!(!tree.node(child).record.status().is_active());
            }
        }
    }

    #[test]
    fn prop_fix_resolves_every_known_date(rows in rows()) {
        let mut tree = build(&rows);
        Percolator::new().with_fix(true).run(&mut tree);

        for id in tree.pre_order() {
            let n = tree.node(id);
            if n.ancestor_view.has_start() || n.descendant_view.has_start() {
                prop_assert!(!n.record.start().is_empty());
            }
            if n.ancestor_view.has_end() || n.descendant_view.has_end() {
                prop_assert!(!n.record.end().is_empty());
            }
            if n.descendant_view.has_start() && !n.record.start().is_empty() {
                prop_assert!(n.record.start() <= n.descendant_view.start.as_str());
            }
        }
    }
}

#[test]
fn fix_keeps_own_over_ancestor() {
    let mut tree = tree_from_rows(vec![
        record("*", "A").with_start("2024-01-01"),
        record("**", "B").with_start("2024-02-01"),
    ]);
    Percolator::new().with_fix(true).run(&mut tree);
    assert_eq!(node(&tree, "B").record.start(), "2024-02-01");
}

#[test]
fn fix_widens_parent_to_children() {
    let mut tree = tree_from_rows(vec![
        record("*", "A").with_start("2024-06-01").with_end("2024-06-30"),
        record("**", "B").with_start("2024-05-01"),
        record("**", "C").with_end("2024-07-15"),
    ]);
    propagate(&mut tree);
    fix(&mut tree);

    let a = node(&tree, "A");
    assert_eq!(a.record.start(), "2024-05-01");
    assert_eq!(a.record.end(), "2024-07-15");
}

#[test]
fn fix_does_not_narrow() {
    let mut tree = tree_from_rows(vec![
        record("*", "A").with_start("2024-06-01"),
        record("**", "B").with_start("2024-07-01"),
    ]);
    Percolator::new().with_fix(true).run(&mut tree);
    assert_eq!(node(&tree, "A").record.start(), "2024-06-01");
}

#[test]
fn sample_plan_reconciles() {
    let mut tree = tree_from_rows(sample_plan());
    let report = Percolator::new().with_fix(true).run(&mut tree);

    // P1 is done but P1.2 is at 60%
    assert_eq!(node(&tree, "P1").record.status(), Status(60));
    // P was untouched while P1 progressed
    assert_eq!(node(&tree, "P").record.status(), Status(60));
    assert!(report.status_corrections() >= 2);

    // P1.2 had no start, it inherits P1's
    assert_eq!(node(&tree, "P1.2").record.start(), "2024-01-08");
    // P2 declares nothing and takes its span from P2.1
    let p2 = node(&tree, "P2");
    assert_eq!(p2.record.start(), "2024-03-04");
    assert_eq!(p2.record.end(), "2024-07-12");
    // P widens its declared end to cover P2.1
    assert_eq!(node(&tree, "P").record.end(), "2024-07-12");
    // neutral P2.2 keeps its status
    assert_eq!(node(&tree, "P2.2").record.status(), Status::NEUTRAL);
}
