//! Error types for `taskforest`.

/// Errors that can occur in the task-tree engine and its stores.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON serialization error occurred.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML parsing error occurred.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A `SQLite` database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A node id was not present in the document.
    #[error("no such node: {0}")]
    NodeNotFound(String),

    /// A project id was not present in the store.
    #[error("no such project: {0}")]
    ProjectNotFound(String),

    /// An empty title was rejected; the previous title stays in place.
    #[error("title must not be empty")]
    EmptyTitle,

    /// Parent references in a document form a cycle.
    #[error("parent references form a cycle")]
    CyclicParents,

    /// A reparent targeted the moved node itself or one of its own
    /// descendants.
    #[error("cannot move '{node}' relative to '{target}': the target is inside the moved subtree")]
    InvalidReparent {
        /// The node being moved.
        node: String,
        /// The rejected drop target.
        target: String,
    },
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
