//! The task-tree engine: one partition's in-memory document and every
//! node-level operation the presentation layer drives.
//!
//! The engine owns the flat node list for exactly one partition and a dirty
//! flag. Derived views (forest, metrics) are recomputed deterministically
//! from that owned state on demand — there is no hidden shared state.
//! Persistence is a collaborator passed into the operations that need it;
//! a failed round trip aborts the operation and leaves the in-memory
//! document exactly as it was before the step that needed the round trip.

use crate::error::{Error, Result};
use crate::id::mint_node_id;
use crate::op_logging;
use crate::partition::PartitionKey;
use crate::store::DocumentStore;
use crate::tree::builder::{self, TreeNode};
use crate::tree::edit;
use crate::tree::metrics::{self, NodeMetrics};
use crate::tree::models::{Placement, TaskNode, TimeField};
use crate::tree::subtree;
use std::collections::{HashMap, HashSet};

/// Whether a cross-partition transfer leaves the source subtree in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    /// Source document unchanged; destination gains the duplicate.
    Copy,
    /// Copy into the destination, then delete the original subtree from
    /// the source document.
    Move,
}

impl TransferMode {
    /// Get the string representation of the mode.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Copy => "copy",
            Self::Move => "move",
        }
    }
}

/// Totals for a whole document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DocumentSummary {
    /// Number of nodes in the document.
    pub node_count: usize,
    /// Sum of aggregated estimated minutes over all roots.
    pub total_estimated: u32,
    /// Sum of aggregated taken minutes over all roots.
    pub total_taken: u32,
}

/// One partition's document plus the operations that edit it.
#[derive(Debug, Clone)]
pub struct TaskTreeEngine {
    partition: PartitionKey,
    nodes: Vec<TaskNode>,
    dirty: bool,
}

impl TaskTreeEngine {
    /// Create an engine over an empty document.
    #[must_use]
    pub const fn new(partition: PartitionKey) -> Self {
        Self {
            partition,
            nodes: Vec::new(),
            dirty: false,
        }
    }

    /// Create an engine over an already-loaded node list.
    #[must_use]
    pub const fn with_nodes(partition: PartitionKey, nodes: Vec<TaskNode>) -> Self {
        Self {
            partition,
            nodes,
            dirty: false,
        }
    }

    /// Load the document for `partition` from the store.
    ///
    /// An absent document is an empty one, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch round trip fails.
    pub fn load(store: &dyn DocumentStore, partition: PartitionKey) -> Result<Self> {
        let nodes = store.fetch_document(&partition)?.unwrap_or_default();
        Ok(Self::with_nodes(partition, nodes))
    }

    /// Save the document to the store, replacing it wholesale.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert round trip fails; the in-memory
    /// document (and its dirty flag) are unchanged in that case.
    pub fn save(&mut self, store: &dyn DocumentStore) -> Result<()> {
        store.upsert_document(&self.partition, &self.nodes)?;
        self.dirty = false;
        Ok(())
    }

    /// The partition this engine's document belongs to.
    #[must_use]
    pub const fn partition(&self) -> &PartitionKey {
        &self.partition
    }

    /// The flat node list.
    #[must_use]
    pub fn nodes(&self) -> &[TaskNode] {
        &self.nodes
    }

    /// Whether the document has unsaved edits.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Look up a node by id.
    #[must_use]
    pub fn node(&self, node_id: &str) -> Option<&TaskNode> {
        self.nodes.iter().find(|n| n.id == node_id)
    }

    /// The nested forest view of the document.
    #[must_use]
    pub fn forest(&self) -> Vec<TreeNode> {
        builder::build(&self.nodes)
    }

    /// Aggregated time metrics for every node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CyclicParents`] on corrupted cyclic input.
    pub fn metrics(&self) -> Result<HashMap<String, NodeMetrics>> {
        metrics::aggregate(&self.nodes)
    }

    /// Node count and total estimated/taken minutes across all roots.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CyclicParents`] on corrupted cyclic input.
    pub fn summary(&self) -> Result<DocumentSummary> {
        let metrics = self.metrics()?;
        let mut summary = DocumentSummary {
            node_count: self.nodes.len(),
            ..DocumentSummary::default()
        };
        for root in self.nodes.iter().filter(|n| n.is_root()) {
            if let Some(m) = metrics.get(&root.id) {
                summary.total_estimated = summary.total_estimated.saturating_add(m.estimated);
                summary.total_taken = summary.total_taken.saturating_add(m.taken);
            }
        }
        Ok(summary)
    }

    /// Add a new root node after the existing roots. Returns its id.
    pub fn add_root(&mut self) -> String {
        let position = self.nodes.iter().filter(|n| n.is_root()).count();
        let node = TaskNode::blank(mint_node_id(), None, position);
        let id = node.id.clone();
        self.nodes.push(node);
        self.touch("add_root", Some(&id));
        id
    }

    /// Add a new child under `parent_id`, after its existing children.
    /// Returns the new node's id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] if the parent id is unknown.
    pub fn add_child(&mut self, parent_id: &str) -> Result<String> {
        if self.node(parent_id).is_none() {
            return Err(Error::NodeNotFound(parent_id.to_string()));
        }
        let position = self
            .nodes
            .iter()
            .filter(|n| n.parent_id.as_deref() == Some(parent_id))
            .count();
        let node = TaskNode::blank(mint_node_id(), Some(parent_id.to_string()), position);
        let id = node.id.clone();
        self.nodes.push(node);
        self.touch("add_child", Some(&id));
        Ok(id)
    }

    /// Add a new sibling after the last node in `node_id`'s sibling group.
    /// Returns the new node's id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] if the node id is unknown.
    pub fn add_sibling(&mut self, node_id: &str) -> Result<String> {
        let target = self
            .node(node_id)
            .ok_or_else(|| Error::NodeNotFound(node_id.to_string()))?;
        let parent_id = target.parent_id.clone();
        let position = self
            .nodes
            .iter()
            .filter(|n| n.parent_id == parent_id)
            .count();
        let node = TaskNode::blank(mint_node_id(), parent_id, position);
        let id = node.id.clone();
        self.nodes.push(node);
        self.touch("add_sibling", Some(&id));
        Ok(id)
    }

    /// Rename a node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyTitle`] when the new title is empty or
    /// whitespace (the previous title stays in place), and
    /// [`Error::NodeNotFound`] if the id is unknown.
    pub fn rename(&mut self, node_id: &str, title: &str) -> Result<()> {
        if title.trim().is_empty() {
            return Err(Error::EmptyTitle);
        }
        let node = self.node_mut(node_id)?;
        node.title = title.to_string();
        self.touch("rename", Some(node_id));
        Ok(())
    }

    /// Set one of a node's leaf time fields. `None` clears the field.
    ///
    /// The value is stored regardless of whether the node currently has
    /// children; aggregation simply ignores it until the node is a leaf
    /// again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] if the id is unknown.
    pub fn set_metric(&mut self, node_id: &str, field: TimeField, value: Option<u32>) -> Result<()> {
        let node = self.node_mut(node_id)?;
        match field {
            TimeField::Estimated => node.time_estimated_minutes = value,
            TimeField::Taken => node.time_taken_minutes = value,
        }
        self.touch("set_metric", Some(node_id));
        Ok(())
    }

    /// Replace the document's completion state: nodes whose ids appear in
    /// `completed_ids` become completed, every other node becomes
    /// incomplete.
    pub fn set_completed(&mut self, completed_ids: &[String]) {
        let completed: HashSet<&str> = completed_ids.iter().map(String::as_str).collect();
        for node in &mut self.nodes {
            node.is_completed = completed.contains(node.id.as_str());
        }
        self.touch("set_completed", None);
    }

    /// Set a node's collapsed display state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] if the id is unknown.
    pub fn set_collapsed(&mut self, node_id: &str, collapsed: bool) -> Result<()> {
        let node = self.node_mut(node_id)?;
        node.is_collapsed = collapsed;
        self.touch("set_collapsed", Some(node_id));
        Ok(())
    }

    /// Move a node (with its subtree) relative to a drop target.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidReparent`] when the target is the moved node
    /// or one of its descendants, [`Error::NodeNotFound`] for unknown ids,
    /// and [`Error::CyclicParents`] on corrupted input. The document is
    /// unchanged on any error.
    pub fn reparent(
        &mut self,
        node_id: &str,
        target_id: &str,
        placement: Placement,
    ) -> Result<()> {
        self.nodes = edit::reparent(&self.nodes, node_id, target_id, placement)?;
        self.touch("reparent", Some(node_id));
        Ok(())
    }

    /// Delete a node and every transitive descendant.
    ///
    /// Sibling positions of the remaining nodes are not renumbered; the
    /// next structural edit normalizes them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] if the id is unknown.
    pub fn delete_subtree(&mut self, node_id: &str) -> Result<()> {
        if self.node(node_id).is_none() {
            return Err(Error::NodeNotFound(node_id.to_string()));
        }
        self.nodes = edit::delete_subtree(&self.nodes, node_id);
        self.touch("delete_subtree", Some(node_id));
        Ok(())
    }

    /// Copy or move the subtree rooted at `node_id` into another partition.
    ///
    /// Three phases: extract the subtree, duplicate it with freshly minted
    /// ids (`reset_completion` clears completion state on the copies), and
    /// place it after the destination document's existing roots. The
    /// destination is fetched and upserted through `store`; an absent
    /// destination document starts empty.
    ///
    /// On [`TransferMode::Move`] the source subtree is deleted from the
    /// in-memory document only after the destination upsert succeeds, and
    /// the document is marked dirty — the source's own persistence happens
    /// at the next [`save`](Self::save). The two partitions share no
    /// transaction: a destination written before a failed source save
    /// leaves a duplicate, which is accepted rather than silently resolved.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] if `node_id` is unknown, or the
    /// store's error if a round trip fails — in which case the in-memory
    /// document is exactly as it was.
    pub fn copy_or_move_subtree(
        &mut self,
        store: &dyn DocumentStore,
        node_id: &str,
        destination: &PartitionKey,
        mode: TransferMode,
        reset_completion: bool,
    ) -> Result<()> {
        let extracted = subtree::extract_subtree(node_id, &self.nodes);
        if extracted.is_empty() {
            return Err(Error::NodeNotFound(node_id.to_string()));
        }
        let duplicate = subtree::duplicate_with_new_ids(&extracted, reset_completion);

        let mut destination_nodes = store.fetch_document(destination)?.unwrap_or_default();
        subtree::place_in_destination(&mut destination_nodes, duplicate);
        store.upsert_document(destination, &destination_nodes)?;

        if mode == TransferMode::Move {
            self.nodes = edit::delete_subtree(&self.nodes, node_id);
            self.touch("move_subtree", Some(node_id));
        } else {
            op_logging::log_operation(&self.partition, "copy_subtree", Some(node_id));
        }
        Ok(())
    }

    /// Mutable lookup shared by the field-level edits.
    fn node_mut(&mut self, node_id: &str) -> Result<&mut TaskNode> {
        self.nodes
            .iter_mut()
            .find(|n| n.id == node_id)
            .ok_or_else(|| Error::NodeNotFound(node_id.to_string()))
    }

    /// Mark the document dirty and record the operation.
    fn touch(&mut self, operation: &str, node_id: Option<&str>) {
        self.dirty = true;
        op_logging::log_operation(&self.partition, operation, node_id);
    }
}
