//! Opaque node handles and the UI-tree query primitive.
//!
//! The host owns the real accessibility tree. The engine only ever holds
//! `NodeId` handles and goes through [`UiTreeProvider`] for every read or
//! action, so a node that the OS recycles under us degrades to "not
//! usable" instead of a dangling reference.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

/// Opaque handle to a UI node owned by the host.
///
/// Holding a `NodeId` implies nothing about validity; callers must pass
/// it through [`UiTreeProvider::refresh`] (or accept the provider's
/// stale-node defaults) before trusting any property read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

/// Action kinds the engine can ask the host to perform on a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeAction {
    /// Replace the node's text wholesale.
    SetText(String),
    /// Move the selection to [anchor, focus).
    SetSelection { anchor: usize, focus: usize },
    /// Paste the system clipboard into the node.
    Paste,
}

impl NodeAction {
    /// Short name for logs and error payloads.
    pub fn name(&self) -> &'static str {
        match self {
            NodeAction::SetText(_) => "set_text",
            NodeAction::SetSelection { .. } => "set_selection",
            NodeAction::Paste => "paste",
        }
    }
}

/// Query and action primitive over the host's UI node tree.
///
/// Reads on a stale or unknown node return the inert value (`false`,
/// `None`, `0`) rather than failing; `perform` returns whether the host
/// accepted the action.
pub trait UiTreeProvider: Send + Sync {
    /// Re-validate a handle against the live tree. `false` means the
    /// node is gone and every other call on it will return inert values.
    fn refresh(&self, node: NodeId) -> bool;

    /// Whether the node can receive text input.
    fn is_editable(&self, node: NodeId) -> bool;

    /// Whether the node currently holds input focus.
    fn is_focused(&self, node: NodeId) -> bool;

    /// The node's current text, if it exposes any.
    fn text(&self, node: NodeId) -> Option<String>;

    /// Current selection as `(start, end)`; a collapsed selection
    /// (`start == end`) is a caret. `None` when the node has neither.
    fn selection(&self, node: NodeId) -> Option<(usize, usize)>;

    fn child_count(&self, node: NodeId) -> usize;

    fn child_at(&self, node: NodeId, index: usize) -> Option<NodeId>;

    /// Ask the host to perform an action. `false` means the OS declined.
    fn perform(&self, node: NodeId, action: &NodeAction) -> bool;
}

/// Provider with no tree at all: every read is inert, every action is
/// declined. Stand-in for hosts without accessibility access.
pub struct NullTreeProvider;

impl UiTreeProvider for NullTreeProvider {
    fn refresh(&self, _node: NodeId) -> bool {
        false
    }

    fn is_editable(&self, _node: NodeId) -> bool {
        false
    }

    fn is_focused(&self, _node: NodeId) -> bool {
        false
    }

    fn text(&self, _node: NodeId) -> Option<String> {
        None
    }

    fn selection(&self, _node: NodeId) -> Option<(usize, usize)> {
        None
    }

    fn child_count(&self, _node: NodeId) -> usize {
        0
    }

    fn child_at(&self, _node: NodeId, _index: usize) -> Option<NodeId> {
        None
    }

    fn perform(&self, _node: NodeId, _action: &NodeAction) -> bool {
        false
    }
}

/// Starting description of a node added to [`InMemoryTree`].
#[derive(Debug, Clone, Default)]
pub struct NodeSpec {
    pub editable: bool,
    pub focused: bool,
    pub text: Option<String>,
    pub selection: Option<(usize, usize)>,
    pub children: Vec<NodeId>,
}

struct StoredNode {
    spec: NodeSpec,
    alive: bool,
    reject_actions: bool,
    performed: Vec<NodeAction>,
}

/// Scriptable in-memory tree for tests and headless development.
///
/// Captures performed actions for later inspection; nodes can be killed
/// (`set_alive`) to simulate the OS recycling controls mid-walk, and
/// told to decline actions (`set_reject_actions`).
#[derive(Default)]
pub struct InMemoryTree {
    nodes: Mutex<HashMap<NodeId, StoredNode>>,
    next_id: Mutex<u64>,
}

impl InMemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and get its handle.
    pub fn add_node(&self, spec: NodeSpec) -> NodeId {
        let mut next = self.next_id.lock().unwrap();
        let id = NodeId(*next);
        *next += 1;
        self.nodes.lock().unwrap().insert(
            id,
            StoredNode {
                spec,
                alive: true,
                reject_actions: false,
                performed: Vec::new(),
            },
        );
        id
    }

    /// Attach an existing node as the last child of `parent`.
    pub fn attach_child(&self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.nodes.lock().unwrap().get_mut(&parent) {
            node.spec.children.push(child);
        }
    }

    /// Mark a node dead (refresh fails, reads go inert) or revive it.
    pub fn set_alive(&self, node: NodeId, alive: bool) {
        if let Some(stored) = self.nodes.lock().unwrap().get_mut(&node) {
            stored.alive = alive;
        }
    }

    /// Make the node decline every future action.
    pub fn set_reject_actions(&self, node: NodeId, reject: bool) {
        if let Some(stored) = self.nodes.lock().unwrap().get_mut(&node) {
            stored.reject_actions = reject;
        }
    }

    pub fn set_focused(&self, node: NodeId, focused: bool) {
        if let Some(stored) = self.nodes.lock().unwrap().get_mut(&node) {
            stored.spec.focused = focused;
        }
    }

    /// Actions performed on a node, in order.
    pub fn performed(&self, node: NodeId) -> Vec<NodeAction> {
        self.nodes
            .lock()
            .unwrap()
            .get(&node)
            .map(|stored| stored.performed.clone())
            .unwrap_or_default()
    }

    fn read<T>(&self, node: NodeId, f: impl FnOnce(&StoredNode) -> T, dead: T) -> T {
        match self.nodes.lock().unwrap().get(&node) {
            Some(stored) if stored.alive => f(stored),
            _ => dead,
        }
    }
}

impl UiTreeProvider for InMemoryTree {
    fn refresh(&self, node: NodeId) -> bool {
        self.read(node, |_| true, false)
    }

    fn is_editable(&self, node: NodeId) -> bool {
        self.read(node, |stored| stored.spec.editable, false)
    }

    fn is_focused(&self, node: NodeId) -> bool {
        self.read(node, |stored| stored.spec.focused, false)
    }

    fn text(&self, node: NodeId) -> Option<String> {
        self.read(node, |stored| stored.spec.text.clone(), None)
    }

    fn selection(&self, node: NodeId) -> Option<(usize, usize)> {
        self.read(node, |stored| stored.spec.selection, None)
    }

    fn child_count(&self, node: NodeId) -> usize {
        self.read(node, |stored| stored.spec.children.len(), 0)
    }

    fn child_at(&self, node: NodeId, index: usize) -> Option<NodeId> {
        self.read(node, |stored| stored.spec.children.get(index).copied(), None)
    }

    fn perform(&self, node: NodeId, action: &NodeAction) -> bool {
        match self.nodes.lock().unwrap().get_mut(&node) {
            Some(stored) if stored.alive && !stored.reject_actions => {
                stored.performed.push(action.clone());
                // SetText and SetSelection mutate the stored state so a
                // following read sees what the host would see.
                match action {
                    NodeAction::SetText(text) => {
                        stored.spec.text = Some(text.clone());
                    }
                    NodeAction::SetSelection { anchor, focus } => {
                        stored.spec.selection = Some((*anchor, *focus));
                    }
                    NodeAction::Paste => {}
                }
                true
            }
            _ => false,
        }
    }
}
