//! Hierarchical nodes rebuilt from parent-referencing records.

use serde::{Deserialize, Serialize};

use crate::Record;

/// A record placed in a forest.
///
/// `children` is always sorted ascending by `priority` (stable on ties).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub record: Record,
    /// Sort key among siblings; 0 when the record carries none.
    pub priority: f64,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn leaf(record: Record, priority: f64) -> Self {
        Self {
            record,
            priority,
            children: Vec::new(),
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn size(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(&node.children);
        }
        count
    }
}

// Deep chains would otherwise overflow the stack in the derived drop glue.
impl Drop for TreeNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Visit a forest depth-first, yielding each node with its depth (roots = 0).
pub fn flatten_forest(forest: &[TreeNode]) -> Vec<(usize, &TreeNode)> {
    let mut out = Vec::new();
    let mut stack: Vec<(usize, &TreeNode)> = forest.iter().rev().map(|n| (0, n)).collect();
    while let Some((depth, node)) = stack.pop() {
        out.push((depth, node));
        stack.extend(node.children.iter().rev().map(|c| (depth + 1, c)));
    }
    out
}
