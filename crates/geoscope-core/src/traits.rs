//! Async trait seams between the state engine and the I/O adapters that feed it.
//!
//! The engine never talks to the network itself: an application shell supplies
//! a [`PageFetcher`] (paged, viewport-scoped search) and a [`DetailSource`]
//! (single-record lookup), both returning boxed futures so the engine stays
//! runtime-agnostic. Implementations are thin wrappers around whatever
//! transport the shell uses; the in-memory implementations in
//! `geoscope-results` cover tests and offline demos.

use std::future::Future;
use std::pin::Pin;

use crate::error::EngineResult;
use crate::signature::QuerySignature;
use crate::types::{DetailPayload, DetailRef, ResultPage};

/// Boxed future type returned by all async trait seams.
pub type FetchFuture<'a, T> = Pin<Box<dyn Future<Output = EngineResult<T>> + Send + 'a>>;

// ─── Page Fetcher ───────────────────────────────────────────────────────────

/// Supplies one page of viewport-scoped search results.
///
/// # Contract
///
/// - `fetch_page` is issued with a 1-based `page_number` and a caller-chosen
///   `page_size`; the returned [`ResultPage`] carries the server's pagination
///   metadata verbatim.
/// - Responses may complete out of order relative to issuance. The
///   consolidator stamps each request with its signature and drops responses
///   whose signature no longer matches the live query, so implementations do
///   not need cancellation for correctness (they may add it as an
///   optimization).
/// - Failure is a single error value; partial pages are not a thing.
pub trait PageFetcher: Send + Sync {
    /// Fetch one page of results for `signature`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::FetchFailed` when the page cannot be retrieved.
    fn fetch_page<'a>(
        &'a self,
        signature: &'a QuerySignature,
        page_number: u32,
        page_size: u32,
    ) -> FetchFuture<'a, ResultPage>;
}

// ─── Detail Source ──────────────────────────────────────────────────────────

/// Supplies one detail record by `(kind, id)` reference.
///
/// The `DetailResolver` coalesces concurrent fetches for the same reference,
/// so implementations see at most one in-flight request per ref.
pub trait DetailSource: Send + Sync {
    /// Fetch the full payload for a detail reference.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::DetailFetchFailed` when the record cannot be
    /// retrieved.
    fn fetch_detail<'a>(&'a self, detail: &'a DetailRef) -> FetchFuture<'a, DetailPayload>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::signature::{BoundingBox, QuerySignature};
    use crate::types::{DetailKind, PoiDetail};
    use futures::executor::block_on;
    use std::collections::HashMap;

    // Compile-time checks for trait object safety.
    #[test]
    fn page_fetcher_trait_is_object_safe() {
        fn _takes_dyn_fetcher(_: &dyn PageFetcher) {}
    }

    #[test]
    fn detail_source_trait_is_object_safe() {
        fn _takes_dyn_source(_: &dyn DetailSource) {}
    }

    struct SinglePoiSource;

    impl DetailSource for SinglePoiSource {
        fn fetch_detail<'a>(&'a self, detail: &'a DetailRef) -> FetchFuture<'a, DetailPayload> {
            Box::pin(async move {
                if detail.kind == DetailKind::Poi && detail.id == "p1" {
                    Ok(DetailPayload::Poi(PoiDetail {
                        name: "Fountain".to_string(),
                        lat: 47.37,
                        lon: 8.54,
                        category_id: None,
                        attributes: HashMap::new(),
                    }))
                } else {
                    Err(EngineError::DetailFetchFailed {
                        detail: detail.clone(),
                        reason: "not found".to_string(),
                    })
                }
            })
        }
    }

    #[test]
    fn boxed_future_seam_resolves_through_dyn_reference() {
        let source: &dyn DetailSource = &SinglePoiSource;
        let hit = block_on(source.fetch_detail(&DetailRef::new(DetailKind::Poi, "p1")));
        assert!(hit.is_ok());
        let miss = block_on(source.fetch_detail(&DetailRef::new(DetailKind::Poi, "p2")));
        assert!(matches!(miss, Err(EngineError::DetailFetchFailed { .. })));
    }

    struct EmptyFetcher;

    impl PageFetcher for EmptyFetcher {
        fn fetch_page<'a>(
            &'a self,
            _signature: &'a QuerySignature,
            _page_number: u32,
            _page_size: u32,
        ) -> FetchFuture<'a, ResultPage> {
            Box::pin(async { Ok(ResultPage::empty()) })
        }
    }

    #[test]
    fn page_fetcher_returns_server_metadata_verbatim() {
        let fetcher: &dyn PageFetcher = &EmptyFetcher;
        let signature =
            QuerySignature::keyword("cafe", BoundingBox::new(47.0, 48.0, 8.0, 9.0));
        let page = block_on(fetcher.fetch_page(&signature, 1, 20)).expect("fetch page");
        assert!(page.items.is_empty());
        assert!(!page.has_next_page);
    }
}
