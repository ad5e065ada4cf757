//! PlantUML work breakdown diagram

use crate::{wrap, Renderer};
use wbs_core::{TaskRecord, Tree};

const HEAD: &str = "@startwbs
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
  .runningHalf1 {
      BackgroundColor GreenYellow
  }
  .runningHalf2 {
      BackgroundColor SpringGreen
  }
  .late {
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
";

const TAIL: &str = "@endwbs";

/// One box per node, styled by status bucket
#[derive(Debug, Clone, Copy, Default)]
pub struct WbsRenderer;

impl WbsRenderer {
    /// Diagram line for one record
    ///
    /// `\n` in the output is PlantUML's literal line break, not a newline.
    #[must_use]
    pub fn line(record: &TaskRecord) -> String {
        let status = record.status();
        let percent = if status.value() >= 0 {
            format!("{:>3}", status.value())
        } else {
            String::new()
        };
        format!(
            "{} <b>{}</b>\\n{}\\n{}\\n{}%<<{}>>",
            record.depth,
            record.description,
            record.start(),
            record.end(),
            percent,
            status.bucket().style_class(),
        )
    }
}

impl Renderer for WbsRenderer {
    fn name(&self) -> &'static str {
        "wbs"
    }

    fn render(&self, tree: &Tree) -> String {
        let body = tree
            .pre_order()
            .into_iter()
            .map(|id| Self::line(&tree.node(id).record));
        wrap(HEAD, body, TAIL)
    }
}
