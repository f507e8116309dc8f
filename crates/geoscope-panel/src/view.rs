//! Concrete panel views over detail payloads.
//!
//! [`PanelView`] is what the orchestrator pushes when a result is selected:
//! a kind tag (derived from the detail kind), a display title, the typed
//! detail payload, and an extensible metadata map for display-layer
//! annotations. [`PanelPatch`] carries shallow-merge updates for
//! `patch_top`.

use std::collections::HashMap;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use geoscope_core::types::{DetailKind, DetailPayload, DetailRecord};

use crate::stack::PanelEntry;

// ─── Panel Kind ─────────────────────────────────────────────────────────────

/// Which card a panel view renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelKind {
    /// Point-of-interest card.
    PoiCard,
    /// Address card.
    AddressCard,
    /// Area card.
    AreaCard,
}

impl PanelKind {
    /// Stable identifier for serialization and diagnostics.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::PoiCard => "poi_card",
            Self::AddressCard => "address_card",
            Self::AreaCard => "area_card",
        }
    }
}

impl From<DetailKind> for PanelKind {
    fn from(kind: DetailKind) -> Self {
        match kind {
            DetailKind::Poi => Self::PoiCard,
            DetailKind::Address => Self::AddressCard,
            DetailKind::Area => Self::AreaCard,
        }
    }
}

// ─── Panel View ─────────────────────────────────────────────────────────────

/// One entry in a panel history stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelView {
    /// Card kind, derived from the payload's detail kind.
    pub kind: PanelKind,
    /// Display title.
    pub title: String,
    /// The typed detail payload backing the card.
    pub payload: DetailPayload,
    /// Display-layer annotations (badge text, highlight state, ...).
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    /// When the view was opened.
    pub opened_at: SystemTime,
}

impl PanelView {
    /// Build a view from a resolved detail record.
    #[must_use]
    pub fn from_record(record: &DetailRecord, title: impl Into<String>) -> Self {
        Self {
            kind: PanelKind::from(record.detail.kind),
            title: title.into(),
            payload: record.payload.clone(),
            metadata: HashMap::new(),
            opened_at: SystemTime::now(),
        }
    }

    /// Adds a metadata key-value pair.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Shallow-merge update for the cursor entry of a panel stack.
///
/// `None` fields leave the current value untouched; metadata entries are
/// merged key-by-key with incoming values winning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PanelPatch {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement payload (a re-fetched, fresher record).
    pub payload: Option<DetailPayload>,
    /// Metadata entries to merge in.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl PanelPatch {
    /// A patch that only replaces the title.
    #[must_use]
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// A patch that only replaces the payload.
    #[must_use]
    pub fn payload(payload: DetailPayload) -> Self {
        Self {
            payload: Some(payload),
            ..Self::default()
        }
    }

    /// Adds a metadata entry to merge.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl PanelEntry for PanelView {
    type Patch = PanelPatch;

    // Identity is the kind tag plus structurally-equal data; title and open
    // time are display-only and excluded, so re-clicking the same item is
    // recognized as a re-open even seconds later.
    fn same_view(&self, other: &Self) -> bool {
        self.kind == other.kind && self.payload == other.payload && self.metadata == other.metadata
    }

    fn apply_patch(&mut self, patch: PanelPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(payload) = patch.payload {
            self.payload = payload;
        }
        self.metadata.extend(patch.metadata);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::PanelHistoryStack;
    use geoscope_core::types::{DetailRef, PoiDetail};

    fn record(id: &str, name: &str) -> DetailRecord {
        DetailRecord {
            detail: DetailRef::new(DetailKind::Poi, id),
            payload: DetailPayload::Poi(PoiDetail {
                name: name.to_string(),
                lat: 47.37,
                lon: 8.54,
                category_id: Some(12),
                attributes: HashMap::new(),
            }),
            fetched_at: SystemTime::now(),
        }
    }

    #[test]
    fn view_kind_follows_detail_kind() {
        let view = PanelView::from_record(&record("p1", "Fountain"), "Fountain");
        assert_eq!(view.kind, PanelKind::PoiCard);
        assert_eq!(PanelKind::from(DetailKind::Area), PanelKind::AreaCard);
    }

    #[test]
    fn same_view_ignores_title_and_open_time() {
        let rec = record("p1", "Fountain");
        let a = PanelView::from_record(&rec, "Fountain");
        let b = PanelView::from_record(&rec, "Fountain (reopened)");
        assert!(a.same_view(&b));
    }

    #[test]
    fn same_view_distinguishes_payloads() {
        let a = PanelView::from_record(&record("p1", "Fountain"), "t");
        let b = PanelView::from_record(&record("p2", "Statue"), "t");
        assert!(!a.same_view(&b));
    }

    #[test]
    fn patch_shallow_merges_fields() {
        let mut view = PanelView::from_record(&record("p1", "Fountain"), "Fountain")
            .with_metadata("pinned", "false");

        view.apply_patch(
            PanelPatch::title("Fountain (updated)").with_metadata("pinned", "true"),
        );
        assert_eq!(view.title, "Fountain (updated)");
        assert_eq!(view.metadata.get("pinned").map(String::as_str), Some("true"));

        // Untouched fields survive a partial patch.
        let before = view.payload.clone();
        view.apply_patch(PanelPatch::default().with_metadata("badge", "new"));
        assert_eq!(view.payload, before);
        assert_eq!(view.metadata.len(), 2);
    }

    #[test]
    fn stack_of_panel_views_deduplicates_reopen() {
        let mut stack = PanelHistoryStack::new();
        let rec = record("p1", "Fountain");
        stack.push(PanelView::from_record(&rec, "Fountain"));
        stack.push(PanelView::from_record(&rec, "Fountain"));
        assert_eq!(stack.len(), 1);

        stack.push(PanelView::from_record(&record("p2", "Statue"), "Statue"));
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn panel_view_serializes_round_trip() {
        let view = PanelView::from_record(&record("p1", "Fountain"), "Fountain");
        let json = serde_json::to_string(&view).expect("serialize view");
        let back: PanelView = serde_json::from_str(&json).expect("deserialize view");
        assert!(view.same_view(&back));
        assert_eq!(view.title, back.title);
    }
}
