//! Subtree extraction, duplication with fresh identities, and placement
//! into another partition's document.

use crate::id::mint_node_id;
use crate::tree::models::TaskNode;
use std::collections::{HashMap, HashSet};

/// Deep-copy the subtree rooted at `root_id`.
///
/// Collects the root and every transitive descendant into an independent
/// list; the source is never aliased or mutated. The traversal is iterative
/// with an explicit visited set, so corrupted cyclic links cannot loop it.
/// Returns an empty list when `root_id` is not present.
#[must_use]
pub fn extract_subtree(root_id: &str, nodes: &[TaskNode]) -> Vec<TaskNode> {
    let index: HashMap<&str, &TaskNode> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    for node in nodes {
        if let Some(parent) = node.parent_id.as_deref() {
            children.entry(parent).or_default().push(node.id.as_str());
        }
    }

    let mut subtree = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = vec![root_id];
    while let Some(current) = stack.pop() {
        if !visited.insert(current) {
            continue;
        }
        let Some(&node) = index.get(current) else {
            continue;
        };
        subtree.push(node.clone());
        if let Some(kids) = children.get(current) {
            stack.extend(kids);
        }
    }

    subtree
}

/// Re-identify an extracted subtree for placement in another partition.
///
/// Every node receives a freshly minted id and `parent_id` is rewritten
/// through the old-to-new map. A parent absent from the map — the extracted
/// root's external parent — becomes `None`, so the relocated root always
/// arrives as a root of the destination.
///
/// `reset_completion` must be chosen by the caller: copies into a new date
/// usually start fresh while moves keep their completion state, and the two
/// flows disagree, so there is no implicit default.
#[must_use]
pub fn duplicate_with_new_ids(subtree: &[TaskNode], reset_completion: bool) -> Vec<TaskNode> {
    let mapping: HashMap<&str, String> = subtree
        .iter()
        .map(|n| (n.id.as_str(), mint_node_id()))
        .collect();

    subtree
        .iter()
        .map(|node| {
            let mut copy = node.clone();
            copy.id = mapping[node.id.as_str()].clone();
            copy.parent_id = node
                .parent_id
                .as_deref()
                .and_then(|p| mapping.get(p).cloned());
            if reset_completion {
                copy.is_completed = false;
            }
            copy
        })
        .collect()
}

/// Append a re-identified subtree to a destination document.
///
/// The relocated root's `position` becomes the count of roots already in
/// the destination (it lands after them); descendants keep the relative
/// positions computed at extraction time, which stay valid because they
/// only order the subtree's own sibling groups.
pub fn place_in_destination(destination: &mut Vec<TaskNode>, mut subtree: Vec<TaskNode>) {
    let root_position = destination.iter().filter(|n| n.is_root()).count();
    if let Some(root) = subtree.iter_mut().find(|n| n.is_root()) {
        root.position = root_position;
    }
    destination.append(&mut subtree);
}
