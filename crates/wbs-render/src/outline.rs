//! Diagnostic outline of the three schedule candidates per node

use crate::{wrap, Renderer};
use wbs_core::{Schedule, Tree, TreeNode};

const HEAD: &str = "# candidates: descendant | own | ancestor\n";
const TAIL: &str = "# end";
const UNSET: &str = "-";

/// Indented table of descendant, own and ancestor values
#[derive(Debug, Clone, Copy, Default)]
pub struct OutlineRenderer;

fn date(value: &str) -> &str {
    if value.is_empty() {
        UNSET
    } else {
        value
    }
}

fn triple(node: &TreeNode, field: impl Fn(&Schedule) -> String) -> String {
    format!(
        "{} | {} | {}",
        field(&node.descendant_view),
        field(&node.record.schedule),
        field(&node.ancestor_view),
    )
}

impl OutlineRenderer {
    /// Outline line for one node
    #[must_use]
    pub fn line(node: &TreeNode) -> String {
        let record = &node.record;
        format!(
            "{indent}{id} {desc}  start {start}  end {end}  status {status}  [{bucket}]",
            indent = "  ".repeat(node.level()),
            id = record.id,
            desc = record.description,
            start = triple(node, |s| date(&s.start).to_string()),
            end = triple(node, |s| date(&s.end).to_string()),
            status = triple(node, |s| s.status.value().to_string()),
            bucket = record.status().bucket().label(),
        )
    }
}

impl Renderer for OutlineRenderer {
    fn name(&self) -> &'static str {
        "outline"
    }

    fn render(&self, tree: &Tree) -> String {
        let body = tree
            .pre_order()
            .into_iter()
            .map(|id| Self::line(tree.node(id)));
        wrap(HEAD, body, TAIL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wbs_core::percolate::propagate;
    use wbs_test_utils::{node, record, tree_from_rows};

    #[test]
    fn shows_candidates_after_propagation() {
        let mut tree = tree_from_rows(vec![
            record("*", "A").with_start("2024-01-01").with_status(0),
            record("**", "B").with_end("2024-02-01").with_status(40),
        ]);
        propagate(&mut tree);

        assert_eq!(
            OutlineRenderer::line(node(&tree, "B")),
            "  B B  start - | - | 2024-01-01  end 2024-02-01 | 2024-02-01 | 2024-02-01  \
             status 40 | 40 | 40  [RunningHalf1]"
        );
    }

    #[test]
    fn root_is_not_indented() {
        let tree = tree_from_rows(vec![record("*", "A")]);
        let out = OutlineRenderer.render(&tree);
        assert!(out.contains("\nA A  start - | - | -"));
        assert!(out.ends_with("# end\n"));
    }
}
