//! WBS Renderers
//!
//! Turns a reconciled [`Tree`] into text. Renderers are read-only: they
//! walk the tree in pre-order, children in source order, and use each
//! node's canonical record.
//!
//! - [`WbsRenderer`] PlantUML work breakdown diagram
//! - [`GanttRenderer`] PlantUML timeline with parent-relative lags
//! - [`OutlineRenderer`] descendant / own / ancestor candidates per node
//! - [`JsonRenderer`] JSON dump of the node arena (`nodes` and `root`)

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod gantt;
mod json;
mod outline;
mod wbs;

pub use gantt::GanttRenderer;
pub use json::JsonRenderer;
pub use outline::OutlineRenderer;
pub use wbs::WbsRenderer;

use wbs_core::{RenderSelection, Tree};

/// Produces diagram text from a finished tree
pub trait Renderer {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Render the whole tree
    fn render(&self, tree: &Tree) -> String;
}

/// Renderers enabled by `selection`, in output order
#[must_use]
pub fn selected(selection: &RenderSelection) -> Vec<Box<dyn Renderer>> {
    let mut renderers: Vec<Box<dyn Renderer>> = Vec::new();
    if selection.wbs {
        renderers.push(Box::new(WbsRenderer));
    }
    if selection.gantt {
        renderers.push(Box::new(GanttRenderer));
    }
    if selection.outline {
        renderers.push(Box::new(OutlineRenderer));
    }
    if selection.json {
        renderers.push(Box::new(JsonRenderer));
    }
    renderers
}

/// Join fragments under a header and footer, one per line
fn wrap(head: &str, body: impl IntoIterator<Item = String>, tail: &str) -> String {
    let mut out = String::from(head);
    for fragment in body {
        if fragment.is_empty() {
            continue;
        }
        out.push_str(&fragment);
        out.push('\n');
    }
    out.push_str(tail);
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_order() {
        let selection = RenderSelection {
            wbs: true,
            gantt: true,
            outline: false,
            json: true,
        };
        let names: Vec<_> = selected(&selection).iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["wbs", "gantt", "json"]);
    }

    #[test]
    fn nothing_selected() {
        assert!(selected(&RenderSelection::default()).is_empty());
    }

    #[test]
    fn wrap_skips_empty_fragments() {
        let out = wrap("head\n", vec!["a".to_string(), String::new(), "b".to_string()], "tail");
        assert_eq!(out, "head\na\nb\ntail\n");
    }
}
