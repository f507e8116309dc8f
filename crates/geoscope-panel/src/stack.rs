//! Generic branching history stack with browser-style truncation semantics.
//!
//! One reusable type backs every panel surface in the wider system (the
//! facade orchestrator instantiates a primary and a secondary stack).
//! Navigation operations are synchronous and have no suspension point, so
//! they never race each other on the UI event loop.
//!
//! # Cursor model
//!
//! `cursor` is `Option<usize>`: `None` is the closed state, `Some(i)` points
//! at the visible entry and satisfies `i < entries.len()`. "Open" is therefore
//! structural — the stack is open exactly when a cursor exists.

use tracing::debug;

use geoscope_core::tracing_config::TARGET_PREFIX;

/// Contract an entry type implements to participate in history semantics.
pub trait PanelEntry {
    /// Partial update type accepted by [`PanelHistoryStack::patch_top`].
    type Patch;

    /// Whether `other` shows the same view (same type tag, structurally equal
    /// data). Display-only fields such as titles and timestamps are excluded:
    /// re-opening the same item must be recognizable as a no-op even when the
    /// open time differs.
    fn same_view(&self, other: &Self) -> bool;

    /// Shallow-merge a partial update into this entry's data.
    fn apply_patch(&mut self, patch: Self::Patch);
}

/// Ordered, branchable sequence of panel views with a navigation cursor.
///
/// Entries are owned exclusively by the stack; consumers read through
/// [`current`](Self::current).
#[derive(Debug, Clone, PartialEq)]
pub struct PanelHistoryStack<V: PanelEntry> {
    entries: Vec<V>,
    cursor: Option<usize>,
}

impl<V: PanelEntry> PanelHistoryStack<V> {
    /// An empty, closed stack.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            cursor: None,
        }
    }

    /// Open `view`, discarding any forward history past the cursor.
    ///
    /// Idempotent re-open guard: when the stack is open and the cursor entry
    /// already shows the same view, this is a no-op — repeated clicks on the
    /// same item must not pollute history. Otherwise forward entries are
    /// truncated (classic browser-history branching), the view is appended,
    /// and the cursor moves to it.
    pub fn push(&mut self, view: V) {
        if let Some(cursor) = self.cursor {
            if self.entries[cursor].same_view(&view) {
                return;
            }
            let discarded = self.entries.len() - (cursor + 1);
            if discarded > 0 {
                debug!(
                    target: TARGET_PREFIX,
                    discarded,
                    cursor,
                    "truncating forward history on branch"
                );
            }
            self.entries.truncate(cursor + 1);
        }
        self.entries.push(view);
        self.cursor = Some(self.entries.len() - 1);
    }

    /// Overwrite the cursor entry in place, leaving history before and after
    /// it untouched. No-op when closed.
    pub fn replace_top(&mut self, view: V) {
        if let Some(cursor) = self.cursor {
            self.entries[cursor] = view;
        }
    }

    /// Shallow-merge a partial update into the cursor entry's data. No-op
    /// when closed.
    pub fn patch_top(&mut self, patch: V::Patch) {
        if let Some(cursor) = self.cursor {
            self.entries[cursor].apply_patch(patch);
        }
    }

    /// Move the cursor one entry back. No-op at the start of history.
    pub fn back(&mut self) {
        if let Some(cursor) = self.cursor {
            self.cursor = Some(cursor.saturating_sub(1));
        }
    }

    /// Move the cursor one entry forward. No-op at the end of history.
    pub fn forward(&mut self) {
        if let Some(cursor) = self.cursor {
            if cursor + 1 < self.entries.len() {
                self.cursor = Some(cursor + 1);
            }
        }
    }

    /// Close the stack and drop all history.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }

    /// The entry under the cursor, if the stack is open.
    #[must_use]
    pub fn current(&self) -> Option<&V> {
        self.cursor.map(|cursor| &self.entries[cursor])
    }

    /// Whether `back` would move the cursor.
    #[must_use]
    pub fn can_go_back(&self) -> bool {
        self.cursor.is_some_and(|cursor| cursor > 0)
    }

    /// Whether `forward` would move the cursor.
    #[must_use]
    pub fn can_go_forward(&self) -> bool {
        self.cursor
            .is_some_and(|cursor| cursor + 1 < self.entries.len())
    }

    /// Whether a view is visible.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.cursor.is_some()
    }

    /// Number of entries in history (including forward entries).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the stack holds no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The cursor position, if open.
    #[must_use]
    pub const fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// All entries in order, oldest first. Read-only; entries stay owned by
    /// the stack.
    #[must_use]
    pub fn entries(&self) -> &[V] {
        &self.entries
    }
}

impl<V: PanelEntry> Default for PanelHistoryStack<V> {
    fn default() -> Self {
        Self::new()
    }
}
