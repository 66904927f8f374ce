//! Structural edits: reparent-and-reorder, cascading delete, and the
//! forest-to-flat-list flatten.

use crate::error::{Error, Result};
use crate::tree::builder::{build, TreeNode};
use crate::tree::models::{Placement, TaskNode};
use std::collections::{HashMap, HashSet};

/// Move a node (with its whole subtree) relative to a drop target.
///
/// The moved subtree is detached from its current sibling array and spliced
/// back in at the resolved destination: [`Placement::Into`] makes it the
/// target's first child, [`Placement::Before`]/[`Placement::After`] its
/// adjacent sibling. The mutated forest is then flattened, which renumbers
/// every sibling group to contiguous `0..k-1` positions. The returned list
/// fully replaces the document's flat list; nothing is persisted here.
///
/// # Errors
///
/// Returns [`Error::NodeNotFound`] when either id is unknown,
/// [`Error::InvalidReparent`] when the target is the moved node itself or
/// lies inside its subtree (detaching would orphan the drop reference), and
/// [`Error::CyclicParents`] when the moved node or target sits on corrupted
/// cyclic links. All rejections happen before any mutation.
pub fn reparent(
    nodes: &[TaskNode],
    node_id: &str,
    target_id: &str,
    placement: Placement,
) -> Result<Vec<TaskNode>> {
    if !nodes.iter().any(|n| n.id == node_id) {
        return Err(Error::NodeNotFound(node_id.to_string()));
    }
    if !nodes.iter().any(|n| n.id == target_id) {
        return Err(Error::NodeNotFound(target_id.to_string()));
    }
    if node_id == target_id || subtree_ids(nodes, node_id).contains(target_id) {
        return Err(Error::InvalidReparent {
            node: node_id.to_string(),
            target: target_id.to_string(),
        });
    }

    let mut forest = build(nodes);
    let Some(moved) = detach(&mut forest, node_id) else {
        return Err(Error::CyclicParents);
    };
    if splice(&mut forest, target_id, moved, placement).is_some() {
        return Err(Error::CyclicParents);
    }

    Ok(flatten(&forest))
}

/// Remove a node and every transitive descendant from the flat list.
///
/// Positions of the surviving nodes are left untouched; ordering only
/// depends on relative values and the next structural edit renumbers them.
/// An unknown id removes nothing.
#[must_use]
pub fn delete_subtree(nodes: &[TaskNode], node_id: &str) -> Vec<TaskNode> {
    let doomed = subtree_ids(nodes, node_id);
    nodes
        .iter()
        .filter(|n| !doomed.contains(n.id.as_str()))
        .cloned()
        .collect()
}

/// Flatten a forest back into the flat record list.
///
/// Depth-first pre-order walk. Every record's `parent_id` is rewritten from
/// its forest parent (`None` for roots) and `position` from its index in
/// the sibling array at the moment of the walk, so each sibling group comes
/// out numbered `0..k-1`.
#[must_use]
pub fn flatten(forest: &[TreeNode]) -> Vec<TaskNode> {
    let mut flat = Vec::new();
    let mut stack: Vec<(&TreeNode, Option<String>, usize)> = Vec::new();
    for (position, tree) in forest.iter().enumerate().rev() {
        stack.push((tree, None, position));
    }

    while let Some((tree, parent_id, position)) = stack.pop() {
        let mut node = tree.node.clone();
        node.parent_id = parent_id;
        node.position = position;
        flat.push(node);

        for (child_position, child) in tree.children.iter().enumerate().rev() {
            stack.push((child, Some(tree.node.id.clone()), child_position));
        }
    }

    flat
}

/// Ids of `node_id` and all of its transitive descendants.
///
/// Frontier expansion over a parent-to-children index: O(n), and the
/// collected set doubles as the cycle guard. Empty when the id is unknown.
pub(crate) fn subtree_ids<'a>(nodes: &'a [TaskNode], node_id: &str) -> HashSet<&'a str> {
    let mut children: HashMap<&str, Vec<&'a str>> = HashMap::new();
    for node in nodes {
        if let Some(parent) = node.parent_id.as_deref() {
            children.entry(parent).or_default().push(node.id.as_str());
        }
    }

    let mut collected: HashSet<&'a str> = HashSet::new();
    let Some(root) = nodes.iter().find(|n| n.id == node_id) else {
        return collected;
    };
    collected.insert(root.id.as_str());

    let mut frontier: Vec<&str> = vec![root.id.as_str()];
    while let Some(current) = frontier.pop() {
        if let Some(kids) = children.get(current) {
            for &kid in kids {
                if collected.insert(kid) {
                    frontier.push(kid);
                }
            }
        }
    }

    collected
}

/// Remove the subtree rooted at `id` from the forest, returning it.
fn detach(forest: &mut Vec<TreeNode>, id: &str) -> Option<TreeNode> {
    if let Some(index) = forest.iter().position(|t| t.node.id == id) {
        return Some(forest.remove(index));
    }
    for tree in forest {
        if let Some(found) = detach(&mut tree.children, id) {
            return Some(found);
        }
    }
    None
}

/// Insert `moved` relative to `target_id`, searching the forest depth-first.
///
/// Returns the subtree back to the caller when the target was not found at
/// any level, so ownership survives the failed attempt.
fn splice(
    forest: &mut Vec<TreeNode>,
    target_id: &str,
    moved: TreeNode,
    placement: Placement,
) -> Option<TreeNode> {
    if let Some(index) = forest.iter().position(|t| t.node.id == target_id) {
        match placement {
            Placement::Into => forest[index].children.insert(0, moved),
            Placement::Before => forest.insert(index, moved),
            Placement::After => forest.insert(index + 1, moved),
        }
        return None;
    }

    let mut carried = moved;
    for tree in forest {
        match splice(&mut tree.children, target_id, carried, placement) {
            None => return None,
            Some(back) => carried = back,
        }
    }
    Some(carried)
}
