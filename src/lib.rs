//! # `taskforest`
//!
//! A hierarchical task-tree engine. Work items form nested trees inside
//! documents partitioned by calendar date or by project; the engine
//! reconstructs the display forest from a flat record list, rolls leaf time
//! metrics up to every ancestor, performs structural edits (reparent,
//! reorder, cascading delete), and copies or moves whole subtrees into
//! other partitions with fresh identifiers.

pub mod config;
pub mod engine;
pub mod error;
pub mod id;
pub mod op_logging;
pub mod partition;
pub mod paths;
pub mod store;
pub mod testing;
pub mod tree;

pub use engine::{DocumentSummary, TaskTreeEngine, TransferMode};
pub use error::{Error, Result};
pub use partition::PartitionKey;
pub use store::{
    DocumentStore, ProjectRecord, ProjectStatus, ProjectStore, ProjectUpdate, SqliteStore,
};
pub use tree::builder::TreeNode;
pub use tree::metrics::NodeMetrics;
pub use tree::models::{Placement, TaskNode, TimeField};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }
}
