//! WBS Core - work breakdown trees
//!
//! Builds a task tree from a flat, depth-coded source and reconciles its
//! schedule so that parents bound their children:
//! - Parses delimited rows, splicing in included sources
//! - Arranges them into an arena-backed [`Tree`]
//! - Percolates start, end and status up and down the tree
//! - Optionally collapses the candidates into final values
//!
//! # Example
//!
//! ```rust
//! use wbs_core::{parse_str, Percolator, Status, WbsConfig};
//!
//! let config = WbsConfig::new().with_fix(true);
//! let mut tree = parse_str(
//!     "*,A,Root,2024-01-01,2024-03-01,,0\n**,B,Child,,,,50\n",
//!     &config,
//! )?;
//! Percolator::from_config(&config).run(&mut tree);
//!
//! let b = tree.node(tree.find("B").unwrap());
//! assert_eq!(b.record.start(), "2024-01-01");
//! assert_eq!(tree.node(tree.root().unwrap()).record.status(), Status(50));
//! # Ok::<(), wbs_core::WbsError>(())
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod builder;
pub mod config;
pub mod error;
pub mod percolate;
pub mod record;
pub mod source;
pub mod tree;

// Re-exports for convenience
pub use builder::{HierarchyError, TreeBuilder};
pub use config::{RenderSelection, WbsConfig};
pub use error::{ConfigError, InclusionError, RowLocation, WbsError};
pub use percolate::{PercolationReport, Percolator};
pub use record::{DepthCode, Schedule, Status, StatusBucket, TaskRecord};
pub use source::{load_tree, parse_str, SourceLoader};
pub use tree::{NodeId, Tree, TreeNode};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with WBS Core
    pub use crate::{
        load_tree, NodeId, Percolator, Status, TaskRecord, Tree, TreeBuilder, WbsConfig, WbsError,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
