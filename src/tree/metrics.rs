//! Bottom-up aggregation of leaf time metrics.

use crate::error::{Error, Result};
use crate::tree::models::TaskNode;
use std::collections::{HashMap, HashSet};

/// Aggregated time metrics for one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeMetrics {
    /// Estimated minutes: the node's own value for leaves (`None` coerced
    /// to 0), the sum over all leaf descendants otherwise.
    pub estimated: u32,
    /// Minutes taken, attributed the same way as `estimated`.
    pub taken: u32,
    /// Whether the node has no children.
    pub is_leaf: bool,
}

/// Compute aggregated metrics for every node in a document.
///
/// Leaves report their own time fields; once a node has children its own
/// fields are never read and its metrics are the sum of its children's.
/// Nodes with a dangling `parent_id` count as roots, matching the builder's
/// orphan promotion.
///
/// The traversal is iterative with an explicit visited set, and each node is
/// visited exactly once, so the whole map costs O(n) per recomputation.
///
/// # Errors
///
/// Returns [`Error::CyclicParents`] when some nodes cannot be reached from
/// any root, which only happens when parent references form a cycle.
pub fn aggregate(nodes: &[TaskNode]) -> Result<HashMap<String, NodeMetrics>> {
    let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();

    let mut roots: Vec<&TaskNode> = Vec::new();
    let mut children: HashMap<&str, Vec<&TaskNode>> = HashMap::new();
    for node in nodes {
        match node.parent_id.as_deref().filter(|p| ids.contains(p)) {
            Some(parent) => children.entry(parent).or_default().push(node),
            None => roots.push(node),
        }
    }

    let mut metrics: HashMap<String, NodeMetrics> = HashMap::with_capacity(nodes.len());
    let mut visited: HashSet<&str> = HashSet::with_capacity(nodes.len());

    // Post-order via a two-phase stack: the first pass expands a node's
    // children, the second folds their finished metrics into the parent.
    let mut stack: Vec<(&TaskNode, bool)> = roots.iter().map(|n| (*n, false)).collect();
    while let Some((node, fold)) = stack.pop() {
        if fold {
            let mut total = NodeMetrics {
                estimated: 0,
                taken: 0,
                is_leaf: false,
            };
            if let Some(kids) = children.get(node.id.as_str()) {
                for kid in kids {
                    if let Some(m) = metrics.get(kid.id.as_str()) {
                        total.estimated = total.estimated.saturating_add(m.estimated);
                        total.taken = total.taken.saturating_add(m.taken);
                    }
                }
            }
            metrics.insert(node.id.clone(), total);
            continue;
        }

        if !visited.insert(node.id.as_str()) {
            continue;
        }

        if let Some(kids) = children.get(node.id.as_str()) {
            stack.push((node, true));
            for &kid in kids {
                stack.push((kid, false));
            }
        } else {
            metrics.insert(
                node.id.clone(),
                NodeMetrics {
                    estimated: node.time_estimated_minutes.unwrap_or(0),
                    taken: node.time_taken_minutes.unwrap_or(0),
                    is_leaf: true,
                },
            );
        }
    }

    if visited.len() != nodes.len() {
        return Err(Error::CyclicParents);
    }

    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(
        id: &str,
        parent: Option<&str>,
        estimated: Option<u32>,
        taken: Option<u32>,
    ) -> TaskNode {
        let mut node = TaskNode::blank(id.to_string(), parent.map(String::from), 0);
        node.time_estimated_minutes = estimated;
        node.time_taken_minutes = taken;
        node
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(aggregate(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_leaf_reports_own_values() {
        let metrics = aggregate(&[node("a", None, Some(30), Some(20))]).unwrap();
        assert_eq!(
            metrics["a"],
            NodeMetrics {
                estimated: 30,
                taken: 20,
                is_leaf: true
            }
        );
    }

    #[test]
    fn test_leaf_nulls_coerced_to_zero() {
        let metrics = aggregate(&[node("a", None, None, None)]).unwrap();
        assert_eq!(
            metrics["a"],
            NodeMetrics {
                estimated: 0,
                taken: 0,
                is_leaf: true
            }
        );
    }

    #[test]
    fn test_parent_sums_children() {
        // The concrete scenario: A(root), B(est 30/taken 20), C(est 10/taken 5).
        let nodes = vec![
            node("a", None, None, None),
            node("b", Some("a"), Some(30), Some(20)),
            node("c", Some("a"), Some(10), Some(5)),
        ];
        let metrics = aggregate(&nodes).unwrap();
        assert_eq!(
            metrics["a"],
            NodeMetrics {
                estimated: 40,
                taken: 25,
                is_leaf: false
            }
        );
        assert_eq!(
            metrics["b"],
            NodeMetrics {
                estimated: 30,
                taken: 20,
                is_leaf: true
            }
        );
        assert_eq!(
            metrics["c"],
            NodeMetrics {
                estimated: 10,
                taken: 5,
                is_leaf: true
            }
        );
    }

    #[test]
    fn test_parent_own_fields_ignored() {
        // Once a node has children its stale leaf fields stop counting.
        let nodes = vec![
            node("a", None, Some(999), Some(999)),
            node("b", Some("a"), Some(15), None),
        ];
        let metrics = aggregate(&nodes).unwrap();
        assert_eq!(metrics["a"].estimated, 15);
        assert_eq!(metrics["a"].taken, 0);
        assert!(!metrics["a"].is_leaf);
    }

    #[test]
    fn test_multi_level_rollup() {
        let nodes = vec![
            node("root", None, None, None),
            node("mid", Some("root"), None, None),
            node("leaf1", Some("mid"), Some(10), Some(1)),
            node("leaf2", Some("mid"), Some(20), Some(2)),
            node("leaf3", Some("root"), Some(5), Some(3)),
        ];
        let metrics = aggregate(&nodes).unwrap();
        assert_eq!(metrics["mid"].estimated, 30);
        assert_eq!(metrics["mid"].taken, 3);
        assert_eq!(metrics["root"].estimated, 35);
        assert_eq!(metrics["root"].taken, 6);
    }

    #[test]
    fn test_orphan_counts_as_root() {
        let nodes = vec![node("lost", Some("gone"), Some(7), None)];
        let metrics = aggregate(&nodes).unwrap();
        assert_eq!(metrics["lost"].estimated, 7);
        assert!(metrics["lost"].is_leaf);
    }

    #[test]
    fn test_cycle_fails_fast() {
        let nodes = vec![
            node("a", None, None, None),
            node("b", Some("c"), Some(1), None),
            node("c", Some("b"), Some(2), None),
        ];
        assert!(matches!(aggregate(&nodes), Err(Error::CyclicParents)));
    }

    #[test]
    fn test_self_parent_fails_fast() {
        let nodes = vec![node("a", Some("a"), None, None)];
        assert!(matches!(aggregate(&nodes), Err(Error::CyclicParents)));
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let mut nodes = vec![node("n0", None, None, None)];
        for i in 1..10_000 {
            nodes.push(node(
                &format!("n{i}"),
                Some(&format!("n{}", i - 1)),
                Some(1),
                None,
            ));
        }
        let metrics = aggregate(&nodes).unwrap();
        assert_eq!(metrics["n0"].estimated, 9_999);
    }

    mod properties {
        #![allow(clippy::cast_possible_truncation)] // seed bits, truncation is fine

        use super::*;
        use proptest::prelude::*;

        /// Derive an arbitrary acyclic document from per-node seeds: node i
        /// may only pick a parent among nodes 0..i.
        fn document_from_seeds(seeds: &[u64]) -> Vec<TaskNode> {
            seeds
                .iter()
                .enumerate()
                .map(|(i, seed)| {
                    let parent = if i == 0 || seed % 3 == 0 {
                        None
                    } else {
                        Some(format!("n{}", (seed / 3) as usize % i))
                    };
                    let mut node =
                        TaskNode::blank(format!("n{i}"), parent, (seed >> 8) as usize % 10);
                    node.time_estimated_minutes = Some((seed >> 16) as u32 % 100);
                    node.time_taken_minutes = Some((seed >> 24) as u32 % 100);
                    node
                })
                .collect()
        }

        proptest! {
            #[test]
            fn root_totals_equal_leaf_sums(seeds in prop::collection::vec(any::<u64>(), 0..40)) {
                let nodes = document_from_seeds(&seeds);
                let metrics = aggregate(&nodes).unwrap();

                let has_children: std::collections::HashSet<&str> = nodes
                    .iter()
                    .filter_map(|n| n.parent_id.as_deref())
                    .collect();
                let leaf_estimated: u32 = nodes
                    .iter()
                    .filter(|n| !has_children.contains(n.id.as_str()))
                    .map(|n| n.time_estimated_minutes.unwrap_or(0))
                    .sum();
                let root_estimated: u32 = nodes
                    .iter()
                    .filter(|n| n.is_root())
                    .map(|n| metrics[&n.id].estimated)
                    .sum();

                prop_assert_eq!(root_estimated, leaf_estimated);
                for node in &nodes {
                    prop_assert_eq!(
                        metrics[&node.id].is_leaf,
                        !has_children.contains(node.id.as_str())
                    );
                }
            }
        }
    }
}
