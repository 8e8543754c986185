//! Hover-intent menu interaction.
//!
//! Each node is `Closed`, `OpenHover` or `OpenPinned`. Leaving a hover-open
//! node schedules a close after a short delay so the pointer can cross the
//! gap between a trigger and its submenu. The caller supplies the clock:
//! every timed operation takes `now`, and [`MenuState::advance`] fires the
//! timers that are due.
//!
//! A node has at most one pending close at any time. Scheduling replaces the
//! previous deadline, and every transition out of the waiting state clears it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use viewkit_model::TreeNode;

/// Open/closed state of one menu node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MenuNodeState {
    #[default]
    Closed,
    /// Opened by pointer hover; closes after the pointer leaves.
    OpenHover,
    /// Opened by click; stays open until clicked again or dismissed.
    OpenPinned,
}

impl MenuNodeState {
    pub fn is_open(self) -> bool {
        !matches!(self, Self::Closed)
    }
}

#[derive(Debug, Clone)]
struct MenuEntry {
    id: String,
    parent: Option<usize>,
    children: Vec<usize>,
    state: MenuNodeState,
    close_at: Option<Instant>,
}

/// Interaction state for one rendered menu.
#[derive(Debug, Clone)]
pub struct MenuState {
    entries: Vec<MenuEntry>,
    by_id: HashMap<String, usize>,
    roots: Vec<usize>,
    close_delay: Duration,
}

impl MenuState {
    /// Register every node of a menu forest, all closed.
    ///
    /// Nodes without a usable id are skipped; their children attach to the
    /// nearest registered ancestor. A repeated id keeps its first node.
    pub fn from_forest(forest: &[TreeNode], id_field: &str, close_delay: Duration) -> Self {
        let mut state = Self {
            entries: Vec::new(),
            by_id: HashMap::new(),
            roots: Vec::new(),
            close_delay,
        };
        for node in forest {
            state.register(node, None, id_field);
        }
        tracing::debug!(nodes = state.entries.len(), roots = state.roots.len(), "Registered menu");
        state
    }

    fn register(&mut self, node: &TreeNode, parent: Option<usize>, id_field: &str) {
        let own = match node.record.scalar_string(id_field) {
            Some(id) if !self.by_id.contains_key(&id) => {
                let idx = self.entries.len();
                self.entries.push(MenuEntry {
                    id: id.clone(),
                    parent,
                    children: Vec::new(),
                    state: MenuNodeState::Closed,
                    close_at: None,
                });
                self.by_id.insert(id, idx);
                match parent {
                    Some(parent) => self.entries[parent].children.push(idx),
                    None => self.roots.push(idx),
                }
                Some(idx)
            }
            _ => parent,
        };
        for child in &node.children {
            self.register(child, own, id_field);
        }
    }

    pub fn close_delay(&self) -> Duration {
        self.close_delay
    }

    /// State of node `id`; `None` if the id is not registered.
    pub fn state(&self, id: &str) -> Option<MenuNodeState> {
        self.by_id.get(id).map(|&idx| self.entries[idx].state)
    }

    pub fn is_open(&self, id: &str) -> bool {
        self.state(id).is_some_and(MenuNodeState::is_open)
    }

    /// Deadline of the pending close for `id`, if one is scheduled.
    pub fn pending_close(&self, id: &str) -> Option<Instant> {
        self.by_id.get(id).and_then(|&idx| self.entries[idx].close_at)
    }

    /// Number of nodes with a scheduled close.
    pub fn pending_count(&self) -> usize {
        self.entries.iter().filter(|e| e.close_at.is_some()).count()
    }

    /// Ids of all open nodes, in menu order.
    pub fn open_ids(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.state.is_open())
            .map(|e| e.id.as_str())
            .collect()
    }

    /// Pointer entered `id`: cancel pending closes on the node and its
    /// ancestors, and open it if it was closed.
    pub fn pointer_enter(&mut self, id: &str) {
        let Some(&idx) = self.by_id.get(id) else {
            return;
        };
        let mut current = Some(idx);
        while let Some(node) = current {
            self.entries[node].close_at = None;
            current = self.entries[node].parent;
        }
        if self.entries[idx].state == MenuNodeState::Closed {
            self.entries[idx].state = MenuNodeState::OpenHover;
        }
    }

    /// Pointer left `id`: schedule a close at `now + close_delay`,
    /// replacing any earlier schedule. Pinned and closed nodes are left alone.
    pub fn pointer_leave(&mut self, id: &str, now: Instant) {
        let Some(&idx) = self.by_id.get(id) else {
            return;
        };
        let entry = &mut self.entries[idx];
        if entry.state == MenuNodeState::OpenHover {
            entry.close_at = Some(now + self.close_delay);
        }
    }

    /// Click on `id`.
    ///
    /// A pinned node closes. A closed or hover-open node becomes pinned, and
    /// every root outside its branch closes with all descendants.
    pub fn click(&mut self, id: &str) {
        let Some(&idx) = self.by_id.get(id) else {
            return;
        };
        if self.entries[idx].state == MenuNodeState::OpenPinned {
            self.close_subtree(idx);
            return;
        }

        let own_root = self.root_of(idx);
        let others: Vec<usize> = self.roots.iter().copied().filter(|&r| r != own_root).collect();
        for root in others {
            self.close_subtree(root);
        }

        let mut current = Some(idx);
        while let Some(node) = current {
            let entry = &mut self.entries[node];
            entry.close_at = None;
            if entry.state == MenuNodeState::Closed {
                entry.state = MenuNodeState::OpenHover;
            }
            current = entry.parent;
        }
        self.entries[idx].state = MenuNodeState::OpenPinned;
    }

    /// Click outside the menu: close everything and cancel every timer.
    pub fn outside_click(&mut self) {
        for entry in &mut self.entries {
            entry.state = MenuNodeState::Closed;
            entry.close_at = None;
        }
    }

    /// Fire every close due at or before `now`.
    ///
    /// Returns the ids that transitioned to closed, in menu order.
    pub fn advance(&mut self, now: Instant) -> Vec<String> {
        let due: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.close_at.is_some_and(|at| at <= now))
            .map(|(idx, _)| idx)
            .collect();
        let mut closed = vec![false; self.entries.len()];
        for idx in due {
            for node in self.subtree(idx) {
                let entry = &mut self.entries[node];
                if entry.state.is_open() {
                    closed[node] = true;
                }
                entry.state = MenuNodeState::Closed;
                entry.close_at = None;
            }
        }
        closed
            .iter()
            .enumerate()
            .filter(|&(_, &was_closed)| was_closed)
            .map(|(idx, _)| self.entries[idx].id.clone())
            .collect()
    }

    fn root_of(&self, mut idx: usize) -> usize {
        while let Some(parent) = self.entries[idx].parent {
            idx = parent;
        }
        idx
    }

    fn subtree(&self, idx: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack = vec![idx];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.entries[node].children.iter().copied());
        }
        out
    }

    fn close_subtree(&mut self, idx: usize) {
        for node in self.subtree(idx) {
            let entry = &mut self.entries[node];
            entry.state = MenuNodeState::Closed;
            entry.close_at = None;
        }
    }
}
