//! # geoscope
//!
//! Client-side state-management engine for map-centric search UIs: keeps a
//! viewport-scoped, paginated result set consistent while responses arrive
//! asynchronously, out of order, and incrementally from a remote service.
//!
//! Three subsystems, one staleness discipline (stamp at request time, compare
//! at write time, drop what is superseded):
//!
//! 1. **Result consolidation** — paged, bounding-box-filtered responses merge
//!    into a single de-duplicated, append-only set per query signature; a
//!    keyword or category change resets, a pan/zoom extends.
//! 2. **Detail resolution** — per-item detail records, cached by `(kind, id)`
//!    with at most one in-flight fetch per reference.
//! 3. **Panel navigation** — branchable history stacks with browser-style
//!    truncation and idempotent re-open.
//!
//! geoscope is a library consumed by an application shell. It defines no wire
//! format and owns no I/O: the shell supplies a
//! [`PageFetcher`] and a [`DetailSource`], and renders from the read surface.
//!
//! # Quick Start
//!
//! Drive a search against the in-memory backend (tests and demos use the same
//! path; a real shell substitutes its HTTP adapters):
//!
//! ```rust
//! use std::sync::Arc;
//! use geoscope::prelude::*;
//! use geoscope::{SearchFilter, SearchOrchestrator, StaticDetailSource, StaticPageFetcher};
//!
//! futures::executor::block_on(async {
//!     let fetcher = Arc::new(StaticPageFetcher::new(vec![
//!         ResultItem::new("p1", "Cafe Adrian", 47.2, 8.2).with_category(12),
//!     ]));
//!     let source = Arc::new(StaticDetailSource::default());
//!     let mut app =
//!         SearchOrchestrator::new(fetcher, source, ConsolidatorConfig::default());
//!
//!     app.viewport_changed(BoundingBox::new(47.0, 48.0, 8.0, 9.0), None)
//!         .await
//!         .expect("viewport");
//!     app.filter_changed(SearchFilter::Keyword("cafe".into()))
//!         .await
//!         .expect("search");
//!
//!     assert_eq!(app.results().len(), 1);
//! });
//! ```
//!
//! # Architecture
//!
//! ```text
//!  viewport / filter ──► SearchOrchestrator ──► ResultConsolidator ──► ResultSet
//!                              │    (plan → fetch → apply, staleness guard)
//!  item click ─────────────────┼──► DetailResolver ──► DetailRecord cache
//!                              │        (coalesced, silent-capable)
//!  back / forward ─────────────┴──► PanelHistoryStack × 2 (primary, secondary)
//! ```

pub mod orchestrator;

pub use orchestrator::{SearchFilter, SearchOrchestrator};

pub use geoscope_core::{
    BoundingBox, DetailKind, DetailPayload, DetailRecord, DetailRef, EngineError, EngineResult,
    DetailSource, FetchFuture, PageFetcher, QueryMode, QuerySignature, ResultItem, ResultPage,
    ResultSet,
};
pub use geoscope_panel::{PanelEntry, PanelHistoryStack, PanelKind, PanelPatch, PanelView};
pub use geoscope_results::{
    ConsolidatorConfig, DetailFetchOptions, DetailResolver, FetchState, PageOutcome, PageRequest,
    ResultConsolidator, StaticDetailSource, StaticPageFetcher, SuggestConfig, SuggestEngine,
    SuggestPlan, Suggestion,
};

/// Convenience imports for consumers.
pub mod prelude {
    pub use geoscope_core::{
        BoundingBox, DetailKind, DetailRef, EngineResult, QuerySignature, ResultItem,
    };
    pub use geoscope_panel::PanelView;
    pub use geoscope_results::{ConsolidatorConfig, FetchState, PageOutcome};
}
