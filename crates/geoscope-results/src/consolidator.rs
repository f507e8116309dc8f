//! Viewport-scoped paginated result consolidation.
//!
//! [`ResultConsolidator`] is a synchronous state machine that owns the
//! accumulated result set for one active query. It does NOT execute fetches
//! directly. Instead, the consumer:
//!
//! 1. Calls [`ResultConsolidator::begin_page`] (or
//!    [`begin_next_page`](ResultConsolidator::begin_next_page)) and receives a
//!    [`PageRequest`] stamped with the signature and a monotonic ticket
//! 2. Executes the fetch using a [`PageFetcher`](geoscope_core::PageFetcher)
//! 3. Calls [`ResultConsolidator::apply_page`] or
//!    [`apply_failure`](ResultConsolidator::apply_failure) with the stamped
//!    request and the outcome
//!
//! This keeps the consolidation logic synchronous, runtime-agnostic, and
//! testable without any async infrastructure, while still handling responses
//! that complete out of order: the signature stamped at request time is
//! compared against the live signature at write time, and responses for a
//! superseded query are dropped rather than applied.
//!
//! # State machine
//!
//! `Idle → Loading` on `begin_page`; `Loading → Ready` on a successful apply;
//! `Loading → Error` on a failed apply. The `Error` state preserves the
//! previously consolidated items (stale-while-revalidate) and clears on the
//! next successful apply.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use geoscope_core::tracing_config::TARGET_PREFIX;
use geoscope_core::{EngineError, EngineResult, QuerySignature, ResultPage, ResultSet};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tuning knobs for the consolidator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidatorConfig {
    /// Items requested per page. Default: 20.
    pub page_size: u32,
}

impl Default for ConsolidatorConfig {
    fn default() -> Self {
        Self { page_size: 20 }
    }
}

// ---------------------------------------------------------------------------
// Fetch state
// ---------------------------------------------------------------------------

/// Lifecycle state of the consolidator's current query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchState {
    /// No query active yet.
    Idle,
    /// A page request is outstanding.
    Loading,
    /// The last applied response succeeded.
    Ready,
    /// The last applied response failed; prior items remain visible.
    Error,
}

// ---------------------------------------------------------------------------
// Page requests and outcomes
// ---------------------------------------------------------------------------

/// A planned page fetch, stamped at issue time.
///
/// The stamp is what makes late responses harmless: `apply_page` compares the
/// stamped signature against the live one and drops the response when the
/// query has moved on. Tickets are monotonic per consolidator and exist for
/// log correlation.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    /// Signature the request was issued under.
    pub signature: QuerySignature,
    /// 1-based page number to fetch.
    pub page_number: u32,
    /// Page size to fetch with.
    pub page_size: u32,
    /// Monotonic issue counter for log correlation.
    pub ticket: u64,
}

/// What `apply_page` did with a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// The response was merged into the consolidated set.
    Applied {
        /// Items newly appended to the set.
        appended: usize,
        /// Items whose id was already present and were overwritten in place.
        updated_in_place: usize,
    },
    /// The response belonged to a superseded query and was dropped.
    Stale,
    /// The failure was recorded; items were left untouched.
    Failed,
}

// ---------------------------------------------------------------------------
// Consolidator
// ---------------------------------------------------------------------------

/// Owns the consolidated result set for one active query signature.
///
/// See [module-level docs](self) for the plan/apply contract.
#[derive(Debug)]
pub struct ResultConsolidator {
    config: ConsolidatorConfig,
    set: ResultSet,
    signature: Option<QuerySignature>,
    state: FetchState,
    last_error: Option<EngineError>,
    next_ticket: u64,
}

impl ResultConsolidator {
    /// Create an idle consolidator.
    #[must_use]
    pub fn new(config: ConsolidatorConfig) -> Self {
        Self {
            config,
            set: ResultSet::empty(),
            signature: None,
            state: FetchState::Idle,
            last_error: None,
            next_ticket: 0,
        }
    }

    /// Read-only snapshot of the consolidated set.
    #[must_use]
    pub fn current_set(&self) -> &ResultSet {
        &self.set
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> FetchState {
        self.state
    }

    /// The error recorded by the most recent failed apply, if any.
    ///
    /// Cleared by the next successful apply and by a query-identity reset.
    #[must_use]
    pub fn last_error(&self) -> Option<&EngineError> {
        self.last_error.as_ref()
    }

    /// The live query signature, if a query is active.
    #[must_use]
    pub fn signature(&self) -> Option<&QuerySignature> {
        self.signature.as_ref()
    }

    /// Plan a page fetch for `signature`.
    ///
    /// When `signature` no longer identifies the same result set as the live
    /// one (mode switch, keyword text change, category change), the
    /// accumulated items are discarded and the page number is forced to 1
    /// regardless of `page_number` — this guards against a stale "next page"
    /// request racing a filter change. A bounding-box or scale change alone
    /// keeps the set and adopts the refined signature for subsequent pages.
    pub fn begin_page(&mut self, signature: QuerySignature, page_number: u32) -> PageRequest {
        let identity_changed = self
            .signature
            .as_ref()
            .is_none_or(|live| !live.same_results(&signature));

        let page_number = if identity_changed {
            if self.signature.is_some() {
                info!(
                    target: TARGET_PREFIX,
                    signature = %signature,
                    discarded = self.set.len(),
                    "query identity changed, discarding consolidated set"
                );
            }
            self.set = ResultSet::empty();
            self.last_error = None;
            1
        } else {
            page_number.max(1)
        };

        self.signature = Some(signature.clone());
        self.state = FetchState::Loading;
        self.next_ticket += 1;

        PageRequest {
            signature,
            page_number,
            page_size: self.config.page_size,
            ticket: self.next_ticket,
        }
    }

    /// Plan a fetch of the page after the current one, under the live
    /// signature.
    ///
    /// Returns `None` when no query is active or the server reported no next
    /// page.
    pub fn begin_next_page(&mut self) -> Option<PageRequest> {
        let signature = self.signature.clone()?;
        if !self.set.has_next_page {
            return None;
        }
        let page_number = self.set.page_number + 1;
        Some(self.begin_page(signature, page_number))
    }

    /// Apply a successful page response.
    ///
    /// Staleness guard: a response whose stamped signature no longer matches
    /// the live identity is dropped ([`PageOutcome::Stale`]). Page 1 replaces
    /// the set wholesale — including the empty case, which yields an empty set
    /// rather than leaving prior results visible. Later pages overwrite
    /// duplicate ids in place (later write wins, position preserved) and
    /// append new items in arrival order. Pagination metadata is always
    /// overwritten with the latest server values. The page cursor advances
    /// only when the response contained at least one item, so a defensively
    /// retried empty page can never loop the cursor forward.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSignatureTransition`] when no query is
    /// active at all, which means the caller bypassed [`begin_page`](Self::begin_page).
    pub fn apply_page(
        &mut self,
        request: &PageRequest,
        page: ResultPage,
    ) -> EngineResult<PageOutcome> {
        let Some(live) = self.signature.as_ref() else {
            return Err(EngineError::InvalidSignatureTransition {
                page_number: request.page_number,
            });
        };

        if !live.same_results(&request.signature) {
            debug!(
                target: TARGET_PREFIX,
                ticket = request.ticket,
                page_number = request.page_number,
                stale = %request.signature,
                live = %live,
                "dropping page response for superseded query"
            );
            return Ok(PageOutcome::Stale);
        }

        let page_is_empty = page.items.is_empty();
        let mut appended = 0usize;
        let mut updated_in_place = 0usize;

        if request.page_number == 1 {
            self.set.items.clear();
            self.set.page_number = 1;
        }
        for item in page.items {
            match self.set.position(&item.id) {
                Some(pos) => {
                    self.set.items[pos] = item;
                    updated_in_place += 1;
                }
                None => {
                    self.set.items.push(item);
                    appended += 1;
                }
            }
        }

        self.set.has_next_page = page.has_next_page;
        self.set.has_previous_page = page.has_previous_page;
        self.set.total_count = page.total_count;
        self.set.total_pages = page.total_pages;
        self.set.is_first_page = request.page_number == 1;

        // Empty pages never advance the cursor, so a retry re-requests the
        // same page instead of walking past it.
        if !page_is_empty {
            self.set.page_number = request.page_number;
        }

        self.state = FetchState::Ready;
        self.last_error = None;

        debug!(
            target: TARGET_PREFIX,
            ticket = request.ticket,
            page_number = request.page_number,
            appended,
            updated_in_place,
            item_count = self.set.len(),
            "page applied"
        );

        Ok(PageOutcome::Applied {
            appended,
            updated_in_place,
        })
    }

    /// Record a failed page fetch.
    ///
    /// Items are left untouched (stale-but-valid data stays visible); only the
    /// error state is set and `is_first_page` cleared. Failures for a
    /// superseded signature are dropped entirely, symmetric with stale
    /// successes.
    pub fn apply_failure(&mut self, request: &PageRequest, error: EngineError) -> PageOutcome {
        let is_live = self
            .signature
            .as_ref()
            .is_some_and(|live| live.same_results(&request.signature));
        if !is_live {
            debug!(
                target: TARGET_PREFIX,
                ticket = request.ticket,
                page_number = request.page_number,
                "dropping page failure for superseded query"
            );
            return PageOutcome::Stale;
        }

        debug!(
            target: TARGET_PREFIX,
            ticket = request.ticket,
            page_number = request.page_number,
            error = %error,
            "page fetch failed, preserving consolidated set"
        );
        self.state = FetchState::Error;
        self.last_error = Some(error);
        self.set.is_first_page = false;
        PageOutcome::Failed
    }

    /// Drop all state back to idle, as if freshly constructed.
    pub fn reset(&mut self) {
        self.set = ResultSet::empty();
        self.signature = None;
        self.state = FetchState::Idle;
        self.last_error = None;
    }
}

impl Default for ResultConsolidator {
    fn default() -> Self {
        Self::new(ConsolidatorConfig::default())
    }
}
