//! Flat-to-tree conversion for parent-referencing records.
//!
//! Menu rows and threaded comments arrive as flat lists where each row names
//! its parent. [`TreeBuilder::build_forest`] rebuilds the hierarchy and sorts
//! every sibling list by priority.

use std::cmp::Ordering;
use std::collections::HashMap;

use viewkit_model::{Record, TreeNode, TreeProfile};

/// Rebuilds forests from flat records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeBuilder {
    id_field: String,
    parent_field: String,
    priority_field: String,
}

impl TreeBuilder {
    pub fn new(
        id_field: impl Into<String>,
        parent_field: impl Into<String>,
        priority_field: impl Into<String>,
    ) -> Self {
        Self {
            id_field: id_field.into(),
            parent_field: parent_field.into(),
            priority_field: priority_field.into(),
        }
    }

    pub fn from_profile(profile: &TreeProfile) -> Self {
        Self::new(
            profile.id_field.clone(),
            profile.parent_field.clone(),
            profile.priority_field.clone(),
        )
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// Convert flat nodes into an ordered forest.
    ///
    /// - A parent reference that resolves to no node (or to the node itself)
    ///   makes the node a root; nothing is dropped.
    /// - Duplicate ids: the first occurrence owns the id for child lookup.
    /// - Roots and every children list are sorted ascending by priority
    ///   (missing = 0), ties kept in input order.
    /// - Parent cycles are broken by promoting the cycle member that appears
    ///   first in the input to a root.
    pub fn build_forest(&self, flat: Vec<Record>) -> Vec<TreeNode> {
        let count = flat.len();

        let mut by_id: HashMap<String, usize> = HashMap::with_capacity(count);
        for (idx, record) in flat.iter().enumerate() {
            if let Some(id) = record.scalar_string(&self.id_field) {
                by_id.entry(id).or_insert(idx);
            }
        }

        let mut parent_of: Vec<Option<usize>> = flat
            .iter()
            .enumerate()
            .map(|(idx, record)| {
                record
                    .scalar_string(&self.parent_field)
                    .and_then(|parent| by_id.get(&parent).copied())
                    .filter(|&parent| parent != idx)
            })
            .collect();

        break_cycles(&mut parent_of);

        let priorities: Vec<f64> = flat
            .iter()
            .map(|record| record.lenient_f64(&self.priority_field).unwrap_or(0.0))
            .collect();

        let mut roots: Vec<usize> = Vec::new();
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); count];
        for (idx, parent) in parent_of.iter().enumerate() {
            match parent {
                Some(parent) => children[*parent].push(idx),
                None => roots.push(idx),
            }
        }

        let by_priority =
            |a: &usize, b: &usize| -> Ordering { priorities[*a].total_cmp(&priorities[*b]) };
        roots.sort_by(by_priority);
        for list in &mut children {
            list.sort_by(by_priority);
        }

        tracing::debug!(nodes = count, roots = roots.len(), "Built forest");

        // Pre-order from the roots; walked in reverse, every node comes
        // after all of its descendants.
        let mut order: Vec<usize> = Vec::with_capacity(count);
        let mut stack: Vec<usize> = roots.clone();
        while let Some(idx) = stack.pop() {
            order.push(idx);
            stack.extend(&children[idx]);
        }

        let mut slots: Vec<Option<Record>> = flat.into_iter().map(Some).collect();
        let mut built: Vec<Option<TreeNode>> = (0..count).map(|_| None).collect();
        for &idx in order.iter().rev() {
            let kids = children[idx]
                .iter()
                .filter_map(|&child| built[child].take())
                .collect();
            built[idx] = Some(TreeNode {
                record: slots[idx].take().unwrap_or_default(),
                priority: priorities[idx],
                children: kids,
            });
        }
        roots
            .iter()
            .filter_map(|&root| built[root].take())
            .collect()
    }
}

/// Detect parent cycles and cut each one at its earliest member.
fn break_cycles(parent_of: &mut [Option<usize>]) {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark {
        Unvisited,
        OnPath,
        Done,
    }

    let mut marks = vec![Mark::Unvisited; parent_of.len()];
    for start in 0..parent_of.len() {
        let mut path: Vec<usize> = Vec::new();
        let mut current = Some(start);
        while let Some(node) = current {
            match marks[node] {
                Mark::Done => break,
                Mark::OnPath => {
                    let cycle_start = path.iter().position(|&n| n == node).unwrap_or(0);
                    let cut = path[cycle_start..].iter().copied().min().unwrap_or(node);
                    tracing::warn!(
                        node = cut,
                        length = path.len() - cycle_start,
                        "Parent cycle detected, promoting node to root"
                    );
                    parent_of[cut] = None;
                    break;
                }
                Mark::Unvisited => {
                    marks[node] = Mark::OnPath;
                    path.push(node);
                    current = parent_of[node];
                }
            }
        }
        for node in path {
            marks[node] = Mark::Done;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewkit_model::record;

    fn builder() -> TreeBuilder {
        TreeBuilder::new("id", "parent", "priority")
    }

    fn ids(nodes: &[TreeNode]) -> Vec<i64> {
        nodes
            .iter()
            .map(|n| n.record.number("id").and_then(serde_json::Number::as_i64).unwrap())
            .collect()
    }

    #[test]
    fn orders_children_and_promotes_dangling_parents() {
        let forest = builder().build_forest(vec![
            record!({"id": 1, "parent": null, "priority": 2}),
            record!({"id": 2, "parent": 1, "priority": 1}),
            record!({"id": 3, "parent": 1, "priority": 0}),
            record!({"id": 4, "parent": 99, "priority": 0}),
        ]);
        // id 4 has priority 0 and sorts ahead of id 1 (priority 2)
        assert_eq!(ids(&forest), vec![4, 1]);
        let root = &forest[1];
        assert_eq!(ids(std::slice::from_ref(root)), vec![1]);
        assert_eq!(ids(&root.children), vec![3, 2]);
        assert!(forest[0].children.is_empty());
    }

    #[test]
    fn missing_priority_defaults_to_zero_and_ties_are_stable() {
        let forest = builder().build_forest(vec![
            record!({"id": 1, "priority": 1}),
            record!({"id": 2}),
            record!({"id": 3, "priority": "0"}),
            record!({"id": 4, "priority": -1}),
        ]);
        assert_eq!(ids(&forest), vec![4, 2, 3, 1]);
        assert_eq!(forest[1].priority, 0.0);
    }

    #[test]
    fn sorts_at_every_depth() {
        let forest = builder().build_forest(vec![
            record!({"id": 1}),
            record!({"id": 2, "parent": 1}),
            record!({"id": 5, "parent": 2, "priority": 9}),
            record!({"id": 6, "parent": 2, "priority": 3}),
        ]);
        assert_eq!(ids(&forest[0].children[0].children), vec![6, 5]);
    }

    #[test]
    fn string_ids_match_numeric_parent_refs() {
        let forest = TreeBuilder::new("uuid", "parent_uuid", "priority").build_forest(vec![
            record!({"uuid": "10", "menu_name": "Top"}),
            record!({"uuid": "m-2", "parent_uuid": 10}),
        ]);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].children.len(), 1);
    }

    #[test]
    fn cycles_terminate_and_keep_every_node() {
        let forest = builder().build_forest(vec![
            record!({"id": 1, "parent": 2}),
            record!({"id": 2, "parent": 1}),
            record!({"id": 3, "parent": 3}),
            record!({"id": 4, "parent": 2}),
        ]);
        let total: usize = forest.iter().map(TreeNode::size).sum();
        assert_eq!(total, 4);
        // id 1 is the earliest member of the 1 <-> 2 cycle
        assert_eq!(ids(&forest), vec![1, 3]);
        assert_eq!(ids(&forest[0].children), vec![2]);
        assert_eq!(ids(&forest[0].children[0].children), vec![4]);
    }

    #[test]
    fn duplicate_ids_attach_children_to_first_occurrence() {
        let forest = builder().build_forest(vec![
            record!({"id": 1, "priority": 0}),
            record!({"id": 1, "priority": 1}),
            record!({"id": 2, "parent": 1}),
        ]);
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].children.len(), 1);
        assert!(forest[1].children.is_empty());
    }

    #[test]
    fn deep_chains_build_without_recursion() {
        let depth = 100_000;
        let flat = (0..depth)
            .map(|id| {
                if id == 0 {
                    record!({"id": 0})
                } else {
                    record!({"id": id, "parent": id - 1})
                }
            })
            .collect();
        let forest = builder().build_forest(flat);

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].size(), depth);
        let deepest = viewkit_model::flatten_forest(&forest)
            .into_iter()
            .map(|(level, _)| level)
            .max();
        assert_eq!(deepest, Some(depth - 1));
    }
}
