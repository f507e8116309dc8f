use crate::signature::QuerySignature;
use crate::types::DetailRef;

/// Unified error type covering all failure modes of the geoscope state engine.
///
/// Every variant includes an actionable message guiding the consumer toward
/// resolution. Components degrade gracefully rather than discarding state:
/// a failed page fetch leaves the previously consolidated results visible
/// (stale-while-revalidate), and a failed detail fetch never disturbs the
/// result list. Errors are captured in component state, not thrown across the
/// orchestration boundary.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    /// A page fetch failed for the live query. Existing results are preserved;
    /// retry is a caller-initiated re-issue of the same request.
    #[error(
        "Page {page_number} fetch failed for {} query: {reason}. \
         Previously loaded results remain valid; re-issue the request to retry.",
        signature.mode
    )]
    FetchFailed {
        /// The signature the failed request was issued under.
        signature: Box<QuerySignature>,
        /// 1-based page number that was requested.
        page_number: u32,
        /// Transport- or service-level failure description.
        reason: String,
    },

    /// A detail fetch failed and the caller did not request silent degradation.
    #[error(
        "Detail fetch failed for {detail}: {reason}. \
         The result list is unaffected; retry the selection to re-fetch."
    )]
    DetailFetchFailed {
        /// The `(kind, id)` reference that could not be resolved.
        detail: DetailRef,
        /// Transport- or service-level failure description.
        reason: String,
    },

    /// A page response was applied while no query was active.
    ///
    /// Defensive only: unreachable through `ResultConsolidator::begin_page`,
    /// which always resets on a signature-identity change before issuing a
    /// request. Raised only when a caller bypasses the consolidator's entry
    /// point and applies a response directly.
    #[error(
        "Page {page_number} response applied with no active query. \
         Issue requests through ResultConsolidator::begin_page."
    )]
    InvalidSignatureTransition {
        /// 1-based page number of the orphaned response.
        page_number: u32,
    },
}

/// Convenience alias used across all geoscope crates.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::{BoundingBox, QuerySignature};
    use crate::types::DetailKind;

    fn bbox() -> BoundingBox {
        BoundingBox::new(47.0, 48.0, 8.0, 9.0)
    }

    #[test]
    fn fetch_failed_message_names_page_and_mode() {
        let err = EngineError::FetchFailed {
            signature: Box::new(QuerySignature::keyword("cafe", bbox())),
            page_number: 2,
            reason: "connection reset".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Page 2"), "message was: {msg}");
        assert!(msg.contains("keyword"), "message was: {msg}");
        assert!(msg.contains("connection reset"), "message was: {msg}");
    }

    #[test]
    fn detail_fetch_failed_message_names_ref() {
        let err = EngineError::DetailFetchFailed {
            detail: DetailRef::new(DetailKind::Poi, "p7"),
            reason: "timeout".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("poi/p7"), "message was: {msg}");
    }

    #[test]
    fn engine_error_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<EngineError>();
    }
}
