use std::sync::Arc;

use tracing::{debug, trace};

/// Result of a layout mutator.
///
/// `Unchanged` means the gesture did nothing (e.g. a drag over empty space).
/// It is distinct from `Changed` carrying a value equal to the input.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit<L> {
    Changed(L),
    Unchanged,
}

impl<L> Edit<L> {
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed(_))
    }
}

/// What an [`EditHistory::apply_edit`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The mutator reported no change; any transient layout was dropped.
    Unchanged,
    /// The result was stored as the transient layout.
    Speculative,
    /// The result was committed and recorded in the undo history.
    Committed,
}

/// Commit/undo/redo history over immutable layout versions.
///
/// Every committed version is held behind an `Arc` and never mutated, so
/// cloning the history shares all stored layouts. A transient layout holds
/// the in-progress result of a gesture until the gesture ends.
///
/// ```text
///   undo_stack (oldest first)   committed   redo_stack (most recently undone last)
///   [v0, v1, v2]          <-     v3     ->   [v5, v4]
///                             transient: v3' (while dragging)
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EditHistory<L> {
    committed: Arc<L>,
    transient: Option<Arc<L>>,
    undo_stack: Vec<Arc<L>>,
    redo_stack: Vec<Arc<L>>,
}

impl<L> EditHistory<L> {
    /// Start with `initial` committed and both stacks empty.
    pub fn new(initial: L) -> Self {
        Self {
            committed: Arc::new(initial),
            transient: None,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    /// The currently authoritative layout.
    pub fn committed(&self) -> &L {
        &self.committed
    }

    /// The speculative layout of an in-progress gesture, if any.
    pub fn transient(&self) -> Option<&L> {
        self.transient.as_deref()
    }

    /// The layout a renderer should draw: the transient one while a gesture
    /// is in progress, the committed one otherwise.
    pub fn effective(&self) -> &L {
        self.transient.as_deref().unwrap_or(self.committed.as_ref())
    }

    /// Apply `mutator` to the effective layout.
    ///
    /// With `end == false` the result only replaces the transient layout, so
    /// any number of intermediate updates leave the stacks untouched. With
    /// `end == true` the result becomes the committed layout, the previous
    /// committed layout is pushed to the undo stack and the redo stack is
    /// cleared. An [`Edit::Unchanged`] result only drops the transient layout.
    pub fn apply_edit<F>(&mut self, end: bool, mutator: F) -> EditOutcome
    where
        F: FnOnce(&L) -> Edit<L>,
    {
        let changed = match mutator(self.effective()) {
            Edit::Changed(layout) => layout,
            Edit::Unchanged => {
                trace!(had_transient = self.transient.is_some(), "edit reported no change");
                self.transient = None;
                return EditOutcome::Unchanged;
            }
        };

        if !end {
            trace!("speculative edit");
            self.transient = Some(Arc::new(changed));
            return EditOutcome::Speculative;
        }

        let previous = std::mem::replace(&mut self.committed, Arc::new(changed));
        self.undo_stack.push(previous);
        self.redo_stack.clear();
        self.transient = None;
        debug!(undo_depth = self.undo_stack.len(), "committed edit");
        EditOutcome::Committed
    }

    /// Step back to the previous committed layout. Returns `false` (and
    /// leaves everything untouched) when there is nothing to undo.
    ///
    /// The transient layout is not touched.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.undo_stack.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.committed, previous);
        self.redo_stack.push(current);
        debug!(
            undo_depth = self.undo_stack.len(),
            redo_depth = self.redo_stack.len(),
            "undo"
        );
        true
    }

    /// Re-apply the most recently undone layout. Returns `false` when there
    /// is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.committed, next);
        self.undo_stack.push(current);
        debug!(
            undo_depth = self.undo_stack.len(),
            redo_depth = self.redo_stack.len(),
            "redo"
        );
        true
    }

    /// Whether [`undo`](Self::undo) would change anything.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether [`redo`](Self::redo) would change anything.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of committed layouts older than the current one.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of undone layouts available to redo.
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Whether a gesture is in progress.
    pub fn is_editing(&self) -> bool {
        self.transient.is_some()
    }
}
