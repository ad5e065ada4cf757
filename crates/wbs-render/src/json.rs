//! JSON dump of the tree arena

use tracing::error;

use crate::Renderer;
use wbs_core::Tree;

/// Pretty-printed `serde_json` rendering of [`Tree`]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn name(&self) -> &'static str {
        "json"
    }

    fn render(&self, tree: &Tree) -> String {
        match serde_json::to_string_pretty(tree) {
            Ok(mut out) => {
                out.push('\n');
                out
            }
            Err(err) => {
                error!(error = %err, "failed to serialise tree");
                String::new()
            }
        }
    }
}
