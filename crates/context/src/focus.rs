//! Focus tracking and insertion-target resolution.
//!
//! Every accessibility event that carries a source node flows through
//! [`FocusTracker::observe`], which remembers the best editable target
//! seen so far. [`FocusTracker::resolve`] is the pure lookup: prefer the
//! remembered node while it stays live, otherwise descend into the
//! event's own subtree.
//!
//! The node delivered with an event is not always the control the user
//! is typing into (toolbars and list rows fire events too), which is why
//! the remembered node takes priority whenever it still passes the
//! liveness check.

use crate::node::{NodeId, UiTreeProvider};

/// What the tracker remembers between events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusState {
    /// Most recent node that resolved to something editable.
    pub editable_node: Option<NodeId>,
    /// Most recent node observed at all, editable or not.
    pub last_node: Option<NodeId>,
    /// Package of the application the user is interacting with.
    pub current_package: Option<String>,
}

/// Text and caret position of an observed node, for the suggestion
/// channel. Only produced when the node has text and no active selection
/// range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaretContext {
    pub text: String,
    /// Collapsed caret position; `None` when the node reports no
    /// selection at all.
    pub caret: Option<usize>,
}

/// Outcome of observing one event's source node.
#[derive(Debug, Clone)]
pub struct NodeObservation {
    /// The node the tracker settled on (remembered, descendant, or the
    /// source itself).
    pub node: NodeId,
    pub editable: bool,
    pub caret_context: Option<CaretContext>,
}

/// Tracks the editable control a future insertion should land in.
#[derive(Default)]
pub struct FocusTracker {
    state: FocusState,
}

impl FocusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FocusState {
        &self.state
    }

    /// Record the package an event came from, ignoring our own.
    pub fn note_package(&mut self, own_package: &str, package: Option<&str>) {
        if let Some(pkg) = package {
            if pkg != own_package {
                self.state.current_package = Some(pkg.to_string());
            }
        }
    }

    pub fn current_package(&self) -> Option<String> {
        self.state.current_package.clone()
    }

    /// Best node for a text insertion right now: the remembered editable
    /// node, else the last node seen at all.
    pub fn insertion_target(&self) -> Option<NodeId> {
        self.state.editable_node.or(self.state.last_node)
    }

    /// Resolve the best editable target reachable from `source`.
    ///
    /// A live remembered node (still editable, still focused, refresh
    /// succeeds) wins over both the source and any descendant. Without
    /// one, the source wins if editable, else the first editable
    /// descendant in depth-first order, else the remembered node as a
    /// last resort, else none.
    pub fn resolve(&self, tree: &dyn UiTreeProvider, source: NodeId) -> Option<NodeId> {
        let candidate = if tree.is_editable(source) {
            Some(source)
        } else {
            first_editable_descendant(tree, source)
        };

        match self.remembered_if_live(tree) {
            Some(remembered) => Some(remembered),
            None => candidate,
        }
    }

    /// Per-event mutation: resolve, remember, and report what the
    /// suggestion channel needs.
    pub fn observe(&mut self, tree: &dyn UiTreeProvider, source: NodeId) -> NodeObservation {
        let node = self.resolve(tree, source).unwrap_or(source);
        let editable = tree.is_editable(node);

        self.state.editable_node = if editable { Some(node) } else { None };
        self.state.last_node = Some(node);

        let caret_context = caret_context(tree, node);
        if editable {
            tracing::trace!(node = node.0, "remembered editable node");
        }

        NodeObservation {
            node,
            editable,
            caret_context,
        }
    }

    /// Drop the remembered handles (e.g. when the host tears down).
    pub fn clear(&mut self) {
        self.state.editable_node = None;
        self.state.last_node = None;
    }

    fn remembered_if_live(&self, tree: &dyn UiTreeProvider) -> Option<NodeId> {
        let node = self.state.editable_node?;
        if tree.is_editable(node) && tree.is_focused(node) && tree.refresh(node) {
            Some(node)
        } else {
            None
        }
    }
}

/// First editable node under `root` in depth-first order, excluding
/// `root` itself. Nodes going invalid mid-walk read as non-editable and
/// childless, so the walk simply passes them by.
fn first_editable_descendant(tree: &dyn UiTreeProvider, root: NodeId) -> Option<NodeId> {
    let mut stack: Vec<NodeId> = Vec::new();
    push_children(tree, root, &mut stack);

    while let Some(node) = stack.pop() {
        if tree.is_editable(node) {
            return Some(node);
        }
        push_children(tree, node, &mut stack);
    }

    None
}

fn push_children(tree: &dyn UiTreeProvider, node: NodeId, stack: &mut Vec<NodeId>) {
    // Reverse order so the first child is popped first.
    for index in (0..tree.child_count(node)).rev() {
        if let Some(child) = tree.child_at(node, index) {
            stack.push(child);
        }
    }
}

fn caret_context(tree: &dyn UiTreeProvider, node: NodeId) -> Option<CaretContext> {
    let text = tree.text(node)?;
    match tree.selection(node) {
        Some((start, end)) if start == end => Some(CaretContext {
            text,
            caret: Some(end),
        }),
        Some(_) => None,
        None => Some(CaretContext { text, caret: None }),
    }
}
