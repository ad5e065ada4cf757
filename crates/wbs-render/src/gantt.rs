//! PlantUML Gantt timeline
//!
//! Children are anchored to their parent's start by a day lag so the chart
//! follows the breakdown when dates move.

use chrono::NaiveDate;
use tracing::debug;

use crate::{wrap, Renderer};
use wbs_core::{NodeId, Tree};

const HEAD: &str = "@startuml
<style>
wbsDiagram {
  .group {
      RoundCorner 40
  }
  .backlog {
      BackgroundColor silver
  }
  .backlogLate {
      BackgroundColor red
  }
  .runningLate {
      BackgroundColor red
  }
  .done {
      BackgroundColor green
  }
  .critical {
    BackgroundColor orange
    LineColor red
    LineThickness 5.0
  }
  .neutral {
      BackgroundColor white
  }
}
</style>
saturday are closed
sunday are closed
";

const TAIL: &str = "@enduml";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Timeline with one task per node
#[derive(Debug, Clone, Copy, Default)]
pub struct GanttRenderer;

impl GanttRenderer {
    /// Link style for a child whose parent sits at `level`
    #[must_use]
    pub fn arrow(level: usize) -> &'static str {
        match level {
            0 => "bold black",
            1 => "dashed blue",
            2 => "dotted yellow",
            3 => "dotted grey",
            _ => "grey",
        }
    }

    /// Days from `parent` to `child`, when both parse as dates
    fn lag(parent: &str, child: &str) -> Option<i64> {
        let parent = NaiveDate::parse_from_str(parent, DATE_FORMAT).ok()?;
        let child = NaiveDate::parse_from_str(child, DATE_FORMAT).ok()?;
        Some((child - parent).num_days())
    }

    fn node_lines(tree: &Tree, id: NodeId) -> String {
        let node = tree.node(id);
        let record = &node.record;
        let task = format!("[{}]", record.description);
        let mut lines = Vec::new();

        let anchored = node.parent().and_then(|parent| {
            let parent = tree.node(parent);
            // PlantUML only accepts non-negative lags
            Self::lag(parent.record.start(), record.start())
                .filter(|days| *days >= 0)
                .map(|days| {
                    format!(
                        "{task} starts {days} day after [{}]'s start with {} link",
                        parent.record.description,
                        Self::arrow(parent.level()),
                    )
                })
        });

        match anchored {
            Some(line) => lines.push(line),
            None => {
                if node.parent().is_some() && record.schedule.has_start() {
                    debug!(node = %node.label(), "start not anchored to parent");
                }
                if record.schedule.has_start() {
                    lines.push(format!("{task} starts {}", record.start()));
                }
            }
        }
        if record.schedule.has_end() {
            lines.push(format!("{task} ends {}", record.end()));
        }
        lines.join("\n")
    }
}

impl Renderer for GanttRenderer {
    fn name(&self) -> &'static str {
        "gantt"
    }

    fn render(&self, tree: &Tree) -> String {
        let mut head = String::from(HEAD);
        if let Some(root) = tree.root() {
            let start = tree.node(root).record.start();
            if !start.is_empty() {
                head.push_str(&format!("project starts {start}\n"));
            }
        }
        let body = tree
            .pre_order()
            .into_iter()
            .map(|id| Self::node_lines(tree, id));
        wrap(&head, body, TAIL)
    }
}
