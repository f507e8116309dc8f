//! In-memory implementations of the fetch seams.
//!
//! [`StaticPageFetcher`] serves viewport-filtered, paginated results from an
//! in-memory item list, and [`StaticDetailSource`] serves detail payloads from
//! a map. They are:
//!
//! - The test doubles for consolidator and orchestrator tests
//! - The offline/demo backend when no remote service is configured
//!
//! Filtering semantics match the remote contract: keyword mode matches the
//! item name case-insensitively as a substring, category mode matches the
//! item's category id, and both are scoped to the signature's bounding box.

use std::collections::HashMap;

use geoscope_core::{
    DetailPayload, DetailRef, DetailSource, EngineError, FetchFuture, PageFetcher, QueryMode,
    QuerySignature, ResultItem, ResultPage,
};

// ─── Page Fetcher ───────────────────────────────────────────────────────────

/// Serves pages from a fixed item list.
#[derive(Debug, Clone, Default)]
pub struct StaticPageFetcher {
    items: Vec<ResultItem>,
}

impl StaticPageFetcher {
    /// Create a fetcher over the given items.
    #[must_use]
    pub fn new(items: Vec<ResultItem>) -> Self {
        Self { items }
    }

    fn matches(signature: &QuerySignature, item: &ResultItem) -> bool {
        if !signature.bounding_box.contains(item.lat, item.lon) {
            return false;
        }
        match signature.mode {
            QueryMode::Keyword => signature.keyword.as_deref().is_some_and(|keyword| {
                item.name.to_lowercase().contains(&keyword.to_lowercase())
            }),
            QueryMode::Category => {
                signature.category_id.is_some() && signature.category_id == item.category_id
            }
        }
    }

    fn page_for(&self, signature: &QuerySignature, page_number: u32, page_size: u32) -> ResultPage {
        let matching: Vec<&ResultItem> = self
            .items
            .iter()
            .filter(|item| Self::matches(signature, item))
            .collect();

        let total_count = matching.len() as u64;
        let page_size = page_size.max(1) as usize;
        let total_pages = matching.len().div_ceil(page_size) as u32;
        let page_number = page_number.max(1);
        let start = (page_number as usize - 1) * page_size;

        let items: Vec<ResultItem> = matching
            .into_iter()
            .skip(start)
            .take(page_size)
            .cloned()
            .collect();

        ResultPage {
            items,
            has_next_page: page_number < total_pages,
            has_previous_page: page_number > 1 && page_number <= total_pages,
            total_count,
            total_pages,
        }
    }
}

impl PageFetcher for StaticPageFetcher {
    fn fetch_page<'a>(
        &'a self,
        signature: &'a QuerySignature,
        page_number: u32,
        page_size: u32,
    ) -> FetchFuture<'a, ResultPage> {
        Box::pin(async move { Ok(self.page_for(signature, page_number, page_size)) })
    }
}

// ─── Detail Source ──────────────────────────────────────────────────────────

/// Serves detail payloads from a fixed map; unknown refs fail.
#[derive(Debug, Clone, Default)]
pub struct StaticDetailSource {
    records: HashMap<DetailRef, DetailPayload>,
}

impl StaticDetailSource {
    /// Create a source over the given records.
    #[must_use]
    pub fn new(records: HashMap<DetailRef, DetailPayload>) -> Self {
        Self { records }
    }

    /// Add one record.
    #[must_use]
    pub fn with_record(mut self, detail: DetailRef, payload: DetailPayload) -> Self {
        self.records.insert(detail, payload);
        self
    }
}

impl DetailSource for StaticDetailSource {
    fn fetch_detail<'a>(&'a self, detail: &'a DetailRef) -> FetchFuture<'a, DetailPayload> {
        Box::pin(async move {
            self.records
                .get(detail)
                .cloned()
                .ok_or_else(|| EngineError::DetailFetchFailed {
                    detail: detail.clone(),
                    reason: "no such record".to_string(),
                })
        })
    }
}
