//! Result consolidation, detail resolution, and suggestion planning for the
//! geoscope search state engine.
//!
//! Three components live here, all built around the same staleness discipline
//! (stamp at request time, compare at write time, drop what is superseded):
//!
//! - [`ResultConsolidator`] — merges paged, viewport-scoped responses into one
//!   de-duplicated result set per query signature
//! - [`DetailResolver`] — caches detail records and coalesces concurrent
//!   fetches for the same reference
//! - [`SuggestEngine`] — plans as-you-type suggestion lookups
//!
//! [`StaticPageFetcher`] and [`StaticDetailSource`] provide in-memory
//! implementations of the fetch seams for tests, demos, and offline use.

pub mod consolidator;
pub mod detail;
pub mod memory;
pub mod suggest;

pub use consolidator::{
    ConsolidatorConfig, FetchState, PageOutcome, PageRequest, ResultConsolidator,
};
pub use detail::{DetailFetchOptions, DetailResolver};
pub use memory::{StaticDetailSource, StaticPageFetcher};
pub use suggest::{SuggestConfig, SuggestEngine, SuggestPlan, Suggestion};
