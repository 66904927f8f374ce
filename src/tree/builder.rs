//! Flat record list to nested forest reconstruction.

use crate::tree::models::TaskNode;
use std::collections::{HashMap, HashSet};

/// A node in the nested forest view: the record plus its ordered children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    /// The underlying record.
    pub node: TaskNode,
    /// Children ordered by `position`.
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// The identity key of this node.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.node.id
    }

    /// Check if the node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Build the nested forest for a document's flat node list.
///
/// Nodes whose `parent_id` refers to a present node become that parent's
/// children; all others (no parent, or a parent that no longer exists) are
/// promoted to roots. Sibling groups and the root list are sorted by
/// `position` ascending; the sort is stable, so records carrying duplicate
/// positions from external data keep their input order. Records caught on a
/// corrupted parent cycle are unreachable from every root and are omitted
/// rather than looping the traversal.
///
/// Runs in O(n log n). Never fails; malformed input degrades, it does not
/// error.
#[must_use]
pub fn build(nodes: &[TaskNode]) -> Vec<TreeNode> {
    let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();

    let mut roots: Vec<usize> = Vec::new();
    let mut child_indices: HashMap<&str, Vec<usize>> = HashMap::new();
    for (index, node) in nodes.iter().enumerate() {
        match node.parent_id.as_deref().filter(|p| ids.contains(p)) {
            Some(parent) => child_indices.entry(parent).or_default().push(index),
            None => roots.push(index),
        }
    }

    roots.sort_by_key(|&i| nodes[i].position);
    for children in child_indices.values_mut() {
        children.sort_by_key(|&i| nodes[i].position);
    }

    // Pre-order walk with an explicit stack; deep trees stay off the call
    // stack. Every node has exactly one parent, so no index repeats.
    let mut order: Vec<usize> = Vec::new();
    let mut stack: Vec<usize> = roots.iter().rev().copied().collect();
    while let Some(index) = stack.pop() {
        order.push(index);
        if let Some(children) = child_indices.get(nodes[index].id.as_str()) {
            stack.extend(children.iter().rev());
        }
    }

    // Reverse pre-order guarantees children are assembled before their
    // parent takes ownership of them.
    let mut built: HashMap<usize, TreeNode> = HashMap::with_capacity(order.len());
    for &index in order.iter().rev() {
        let children = child_indices
            .get(nodes[index].id.as_str())
            .map(|c| c.iter().filter_map(|i| built.remove(i)).collect())
            .unwrap_or_default();
        built.insert(
            index,
            TreeNode {
                node: nodes[index].clone(),
                children,
            },
        );
    }

    roots.iter().filter_map(|i| built.remove(i)).collect()
}
