//! Record types for task-tree documents.

use serde::{Deserialize, Serialize};

/// A single task record within a partition's document.
///
/// Documents store an unordered flat list of these records; the nested
/// forest view is reconstructed from `parent_id` links by
/// [`crate::tree::builder::build`]. Field names are the persisted wire
/// names and must round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskNode {
    /// Unique identifier, assigned once at creation and never reused.
    pub id: String,
    /// Parent node id within the same document. `None` marks a root.
    pub parent_id: Option<String>,
    /// Task title. May be empty while an edit is in flight, but an empty
    /// title is never persisted; renaming to an empty string is refused.
    pub title: String,
    /// 0-based order among siblings.
    pub position: usize,
    /// Whether the task has been completed.
    pub is_completed: bool,
    /// Whether the node is shown collapsed. Display-only.
    pub is_collapsed: bool,
    /// Estimated minutes. Authoritative only while the node is a leaf.
    pub time_estimated_minutes: Option<u32>,
    /// Minutes actually taken. Authoritative only while the node is a leaf.
    pub time_taken_minutes: Option<u32>,
}

impl TaskNode {
    /// Create a blank node under `parent_id` at sibling `position`.
    ///
    /// New nodes start with an empty title, no metrics, not completed and
    /// not collapsed.
    #[must_use]
    pub const fn blank(id: String, parent_id: Option<String>, position: usize) -> Self {
        Self {
            id,
            parent_id,
            title: String::new(),
            position,
            is_completed: false,
            is_collapsed: false,
            time_estimated_minutes: None,
            time_taken_minutes: None,
        }
    }

    /// Check if the node is a root (has no parent reference).
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Where a moved node lands relative to the drop target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    /// The moved node becomes the target's first child.
    Into,
    /// The moved node becomes the target's immediate previous sibling.
    Before,
    /// The moved node becomes the target's immediate next sibling.
    After,
}

impl Placement {
    /// Get the string representation of the placement.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Into => "into",
            Self::Before => "before",
            Self::After => "after",
        }
    }
}

impl std::fmt::Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The two leaf time fields a metric edit can address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeField {
    /// `time_estimated_minutes`.
    Estimated,
    /// `time_taken_minutes`.
    Taken,
}
