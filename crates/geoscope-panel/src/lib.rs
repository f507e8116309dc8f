//! Branching panel navigation history for the geoscope search state engine.
//!
//! A UI-agnostic history controller: users drill into details (open a
//! point-of-interest card, then a sub-detail, then navigate back/forward) with
//! correct truncation-on-branch and idempotent re-open semantics.
//!
//! The stack is one generic type ([`PanelHistoryStack`]) instantiated per UI
//! surface — never hand-copied per surface, since equivalence bugs between two
//! copies of history logic are a known defect class. [`PanelView`] is the
//! concrete entry type used by the orchestrator.

pub mod stack;
pub mod view;

pub use stack::{PanelEntry, PanelHistoryStack};
pub use view::{PanelKind, PanelPatch, PanelView};
