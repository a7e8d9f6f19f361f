//! Text insertion via clipboard swap, paste, and restore.

use std::sync::Arc;

use clipcue_context::{NodeAction, NodeId, UiTreeProvider};

use crate::clipboard::Clipboard;
use crate::error::InsertError;

/// One insertion, consumed synchronously.
#[derive(Debug, Clone)]
pub struct InsertRequest {
    pub payload: String,
    pub target: NodeId,
    /// Characters immediately before the caret to replace with the
    /// payload. Zero inserts at the caret.
    pub replace_len: usize,
}

impl InsertRequest {
    pub fn new(payload: &str, target: NodeId) -> Self {
        Self {
            payload: payload.to_string(),
            target,
            replace_len: 0,
        }
    }

    pub fn replacing(mut self, replace_len: usize) -> Self {
        self.replace_len = replace_len;
        self
    }
}

/// What an insertion actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertReport {
    /// False when the payload went in via a direct set-text, with no
    /// clipboard involvement.
    pub used_paste: bool,
    /// Characters replaced ahead of the caret.
    pub replaced: usize,
}

/// Performs the clipboard-swap-paste-restore sequence against a resolved
/// target node.
///
/// The fast path, an editable target with no text and no selection, is a
/// single set-text action. Everything else goes through the clipboard:
/// save the current value, write the payload suppressed, optionally move
/// the selection backwards to cover a partially typed word, paste, and
/// put the saved value back suppressed. The restore runs however the
/// paste sequence ends.
pub struct InsertionEngine {
    tree: Arc<dyn UiTreeProvider>,
    clipboard: Arc<dyn Clipboard>,
}

impl InsertionEngine {
    pub fn new(tree: Arc<dyn UiTreeProvider>, clipboard: Arc<dyn Clipboard>) -> Self {
        Self { tree, clipboard }
    }

    pub fn insert(&self, request: &InsertRequest) -> Result<InsertReport, InsertError> {
        let node = request.target;
        if !self.tree.refresh(node) {
            return Err(InsertError::StaleTarget);
        }

        let editable = self.tree.is_editable(node);
        let text = self.tree.text(node);
        let selection = self.tree.selection(node);

        let empty = text.as_deref().map_or(true, |t| t.is_empty());
        if editable && empty && selection.is_none() {
            let action = NodeAction::SetText(request.payload.clone());
            if !self.tree.perform(node, &action) {
                return Err(InsertError::ActionRejected {
                    action: action.name(),
                });
            }
            tracing::debug!(chars = request.payload.chars().count(), "inserted via set-text");
            return Ok(InsertReport {
                used_paste: false,
                replaced: 0,
            });
        }

        let saved = self.clipboard.current_text();
        self.clipboard.set_text(&request.payload, true)?;

        let outcome = self.paste_sequence(node, editable, selection, request);

        // Restore runs regardless of how the paste sequence ended.
        let restore = match &saved {
            Some(original) => self.clipboard.set_text(original, true),
            None => self.clipboard.clear(true),
        };
        if let Err(err) = restore {
            tracing::warn!(error = %err, "clipboard restore after paste failed");
        }

        if outcome.is_ok() {
            tracing::debug!(
                chars = request.payload.chars().count(),
                replaced = request.replace_len,
                "inserted via paste with clipboard restore"
            );
        }
        outcome
    }

    fn paste_sequence(
        &self,
        node: NodeId,
        editable: bool,
        selection: Option<(usize, usize)>,
        request: &InsertRequest,
    ) -> Result<InsertReport, InsertError> {
        let mut replaced = 0;
        if request.replace_len > 0 && editable {
            // Only a collapsed selection is a caret; a range selection is
            // pasted over as-is, with no extra move.
            if let Some((anchor, focus)) = selection {
                if anchor == focus {
                    let Some(start) = focus.checked_sub(request.replace_len) else {
                        return Err(InsertError::ReplaceOutOfRange {
                            requested: request.replace_len,
                            caret: focus,
                        });
                    };
                    let action = NodeAction::SetSelection {
                        anchor: start,
                        focus,
                    };
                    if !self.tree.perform(node, &action) {
                        return Err(InsertError::ActionRejected {
                            action: action.name(),
                        });
                    }
                    replaced = request.replace_len;
                }
            }
        }

        let action = NodeAction::Paste;
        if !self.tree.perform(node, &action) {
            return Err(InsertError::ActionRejected {
                action: action.name(),
            });
        }
        Ok(InsertReport {
            used_paste: true,
            replaced,
        })
    }
}
