//! Wires user actions to the consolidator, resolver, and panel stacks.
//!
//! [`SearchOrchestrator`] is the single entry point an application shell talks
//! to: viewport changes, filter changes, and result selections come in; the
//! orchestrator decides when to reset versus extend state and drives the
//! plan → fetch → apply cycle against the configured [`PageFetcher`].
//!
//! # Error policy
//!
//! Fetch errors are captured in component state (the consolidator's error
//! flag, [`last_detail_error`](SearchOrchestrator::last_detail_error)) and
//! never propagate across the orchestration boundary, so a failing detail
//! fetch can never corrupt an already-displayed result list. The only `Err`
//! these methods return is the defensive
//! [`InvalidSignatureTransition`](geoscope_core::EngineError::InvalidSignatureTransition),
//! unreachable through this entry point.
//!
//! # Independence of search and panel state
//!
//! A new search, viewport pan, or category switch never touches the panels;
//! only the explicit [`clear_all`](SearchOrchestrator::clear_all) resets both.

use std::sync::Arc;

use tracing::warn;

use geoscope_core::tracing_config::TARGET_PREFIX;
use geoscope_core::{
    BoundingBox, DetailRecord, DetailRef, DetailSource, EngineError, EngineResult, PageFetcher,
    QuerySignature, ResultSet,
};
use geoscope_panel::{PanelHistoryStack, PanelView};
use geoscope_results::{
    ConsolidatorConfig, DetailFetchOptions, DetailResolver, FetchState, PageOutcome, PageRequest,
    ResultConsolidator,
};

// ─── Filters ────────────────────────────────────────────────────────────────

/// The user-facing filter the current search runs under.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchFilter {
    /// Free-text keyword search.
    Keyword(String),
    /// Category-id filter.
    Category(u32),
}

impl SearchFilter {
    fn signature(&self, bounding_box: BoundingBox, scale: Option<f64>) -> QuerySignature {
        let signature = match self {
            Self::Keyword(keyword) => QuerySignature::keyword(keyword.clone(), bounding_box),
            Self::Category(category_id) => QuerySignature::category(*category_id, bounding_box),
        };
        match scale {
            Some(scale) => signature.with_scale(scale),
            None => signature,
        }
    }
}

// ─── Orchestrator ───────────────────────────────────────────────────────────

/// Drives the state engine from UI events.
///
/// Holds two independent panel stacks: the primary surface (detail cards
/// opened from the result list) and a secondary surface for child drill-ins.
/// Both share the same stack type and contract.
pub struct SearchOrchestrator {
    fetcher: Arc<dyn PageFetcher>,
    consolidator: ResultConsolidator,
    resolver: DetailResolver,
    primary_panel: PanelHistoryStack<PanelView>,
    secondary_panel: PanelHistoryStack<PanelView>,
    filter: Option<SearchFilter>,
    viewport: Option<(BoundingBox, Option<f64>)>,
    last_detail_error: Option<EngineError>,
}

impl SearchOrchestrator {
    /// Create an orchestrator over the given I/O seams.
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        source: Arc<dyn DetailSource>,
        config: ConsolidatorConfig,
    ) -> Self {
        Self {
            fetcher,
            consolidator: ResultConsolidator::new(config),
            resolver: DetailResolver::new(source),
            primary_panel: PanelHistoryStack::new(),
            secondary_panel: PanelHistoryStack::new(),
            filter: None,
            viewport: None,
            last_detail_error: None,
        }
    }

    /// The map viewport moved or zoomed.
    ///
    /// Re-requests the current page under the refined signature; a viewport
    /// change alone never resets the consolidated set. Returns `Ok(None)`
    /// when no filter is active yet — the viewport is recorded and the first
    /// `filter_changed` uses it.
    ///
    /// # Errors
    ///
    /// Only the defensive `InvalidSignatureTransition`; fetch failures are
    /// captured in the consolidator.
    pub async fn viewport_changed(
        &mut self,
        bounding_box: BoundingBox,
        scale: Option<f64>,
    ) -> EngineResult<Option<PageOutcome>> {
        self.viewport = Some((bounding_box, scale));
        let Some(signature) = self.live_signature() else {
            return Ok(None);
        };
        let page_number = self.consolidator.current_set().page_number;
        let request = self.consolidator.begin_page(signature, page_number);
        self.run_page(request).await.map(Some)
    }

    /// The user entered a keyword or picked a category.
    ///
    /// Starts a fresh query at page 1; the consolidator discards the previous
    /// set because the identity changed. Panel state is untouched.
    ///
    /// # Errors
    ///
    /// Only the defensive `InvalidSignatureTransition`.
    pub async fn filter_changed(
        &mut self,
        filter: SearchFilter,
    ) -> EngineResult<Option<PageOutcome>> {
        self.filter = Some(filter);
        let Some(signature) = self.live_signature() else {
            return Ok(None);
        };
        let request = self.consolidator.begin_page(signature, 1);
        self.run_page(request).await.map(Some)
    }

    /// Fetch the next page under the live signature.
    ///
    /// Returns `Ok(None)` when no query is active or the server reported no
    /// next page.
    ///
    /// # Errors
    ///
    /// Only the defensive `InvalidSignatureTransition`.
    pub async fn request_next_page(&mut self) -> EngineResult<Option<PageOutcome>> {
        let Some(request) = self.consolidator.begin_next_page() else {
            return Ok(None);
        };
        self.run_page(request).await.map(Some)
    }

    /// The user clicked a result: resolve its detail and open a card on the
    /// primary panel.
    ///
    /// Returns whether a card was opened. On failure the error is captured in
    /// [`last_detail_error`](Self::last_detail_error) and the result list is
    /// unaffected.
    pub async fn select_result(&mut self, detail: DetailRef, title: &str) -> bool {
        match self.resolve(&detail).await {
            Some(record) => {
                self.primary_panel.push(PanelView::from_record(&record, title));
                true
            }
            None => false,
        }
    }

    /// The user drilled into a sub-detail from an open card: open it on the
    /// secondary panel, leaving the primary surface where it is.
    pub async fn select_child_result(&mut self, detail: DetailRef, title: &str) -> bool {
        match self.resolve(&detail).await {
            Some(record) => {
                self.secondary_panel
                    .push(PanelView::from_record(&record, title));
                true
            }
            None => false,
        }
    }

    /// Speculative detail fetch (hover preview): silent, no panel change, no
    /// error surfaced. `None` means no detail available.
    pub async fn preview_result(&mut self, detail: DetailRef) -> Option<DetailRecord> {
        self.resolver
            .fetch(&detail, DetailFetchOptions::silent())
            .await
            .ok()
            .flatten()
    }

    /// Explicit "clear all": resets search state AND both panels.
    ///
    /// This is the only coupling point between the two; individual searches,
    /// pans, and filter switches leave the panels alone.
    pub fn clear_all(&mut self) {
        self.consolidator.reset();
        self.primary_panel.reset();
        self.secondary_panel.reset();
        self.filter = None;
        self.last_detail_error = None;
    }

    // ─── Read surface ───────────────────────────────────────────────────────

    /// Read-only snapshot of the consolidated results.
    #[must_use]
    pub fn results(&self) -> &ResultSet {
        self.consolidator.current_set()
    }

    /// Lifecycle state of the current query.
    #[must_use]
    pub fn search_state(&self) -> FetchState {
        self.consolidator.state()
    }

    /// The error from the most recent failed page fetch, if any.
    #[must_use]
    pub fn last_search_error(&self) -> Option<&EngineError> {
        self.consolidator.last_error()
    }

    /// The error from the most recent failed non-silent detail fetch, if any.
    #[must_use]
    pub fn last_detail_error(&self) -> Option<&EngineError> {
        self.last_detail_error.as_ref()
    }

    /// The primary panel surface (detail cards).
    #[must_use]
    pub fn primary_panel(&self) -> &PanelHistoryStack<PanelView> {
        &self.primary_panel
    }

    /// Mutable primary panel for direct navigation (`back`, `forward`, ...).
    pub fn primary_panel_mut(&mut self) -> &mut PanelHistoryStack<PanelView> {
        &mut self.primary_panel
    }

    /// The secondary (child) panel surface.
    #[must_use]
    pub fn secondary_panel(&self) -> &PanelHistoryStack<PanelView> {
        &self.secondary_panel
    }

    /// Mutable secondary panel for direct navigation.
    pub fn secondary_panel_mut(&mut self) -> &mut PanelHistoryStack<PanelView> {
        &mut self.secondary_panel
    }

    /// The detail resolver, for cache inspection and invalidation.
    #[must_use]
    pub fn resolver(&self) -> &DetailResolver {
        &self.resolver
    }

    // ─── Internals ──────────────────────────────────────────────────────────

    fn live_signature(&self) -> Option<QuerySignature> {
        let filter = self.filter.as_ref()?;
        let (bounding_box, scale) = self.viewport?;
        Some(filter.signature(bounding_box, scale))
    }

    async fn run_page(&mut self, request: PageRequest) -> EngineResult<PageOutcome> {
        let fetched = self
            .fetcher
            .fetch_page(&request.signature, request.page_number, request.page_size)
            .await;
        match fetched {
            Ok(page) => self.consolidator.apply_page(&request, page),
            Err(error) => Ok(self.consolidator.apply_failure(&request, error)),
        }
    }

    async fn resolve(&mut self, detail: &DetailRef) -> Option<DetailRecord> {
        match self
            .resolver
            .fetch(detail, DetailFetchOptions::default())
            .await
        {
            Ok(record) => {
                self.last_detail_error = None;
                record
            }
            Err(error) => {
                warn!(
                    target: TARGET_PREFIX,
                    detail_ref = %detail,
                    error = %error,
                    "detail fetch failed, result list unaffected"
                );
                self.last_detail_error = Some(error);
                None
            }
        }
    }
}

impl std::fmt::Debug for SearchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchOrchestrator")
            .field("results", &self.consolidator.current_set().len())
            .field("state", &self.consolidator.state())
            .field("primary_panel", &self.primary_panel.len())
            .field("secondary_panel", &self.secondary_panel.len())
            .finish_non_exhaustive()
    }
}
