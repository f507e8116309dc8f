//! Detail record resolution with caching and in-flight coalescing.
//!
//! [`DetailResolver`] fetches a single detail record by `(kind, id)` reference
//! and caches it indefinitely — the UI owns invalidation. Concurrent fetches
//! for the same reference are coalesced: the second caller awaits the same
//! shared future instead of issuing a duplicate request, so the source sees at
//! most one in-flight fetch per ref and two completions can never race to
//! write the cache in an undefined order.
//!
//! # Thread model
//!
//! Internal state lives behind a `std::sync::Mutex` held only for O(1)
//! hash-table operations, never across await points. The shared handle is
//! cloned out under the lock and awaited after it is released.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::debug;

use geoscope_core::tracing_config::TARGET_PREFIX;
use geoscope_core::{DetailRecord, DetailRef, DetailSource, EngineError, EngineResult};

/// Outcome type shared between coalesced awaiters. The error is arced because
/// every awaiter receives a clone of the same completion.
type SharedOutcome = Result<DetailRecord, Arc<EngineError>>;

type SharedFetch = Shared<BoxFuture<'static, SharedOutcome>>;

// ─── Options ────────────────────────────────────────────────────────────────

/// Per-call options for [`DetailResolver::fetch`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DetailFetchOptions {
    /// Degrade failure to `Ok(None)` instead of surfacing an error. Used for
    /// speculative fetches (hover previews) where "no detail available" is an
    /// acceptable answer.
    pub silent: bool,
}

impl DetailFetchOptions {
    /// Options for a speculative fetch that must not surface errors.
    #[must_use]
    pub const fn silent() -> Self {
        Self { silent: true }
    }
}

// ─── Resolver ───────────────────────────────────────────────────────────────

struct ResolverState {
    cache: HashMap<DetailRef, DetailRecord>,
    in_flight: HashMap<DetailRef, SharedFetch>,
}

struct ResolverInner {
    source: Arc<dyn DetailSource>,
    state: Mutex<ResolverState>,
}

/// Caching, coalescing resolver for detail records.
///
/// Cheap to clone; clones share the cache and the in-flight table.
#[derive(Clone)]
pub struct DetailResolver {
    inner: Arc<ResolverInner>,
}

impl DetailResolver {
    /// Create a resolver over the given source.
    #[must_use]
    pub fn new(source: Arc<dyn DetailSource>) -> Self {
        Self {
            inner: Arc::new(ResolverInner {
                source,
                state: Mutex::new(ResolverState {
                    cache: HashMap::new(),
                    in_flight: HashMap::new(),
                }),
            }),
        }
    }

    /// Resolve a detail record, from cache when possible.
    ///
    /// Cache hits return immediately. On a miss, at most one fetch per ref is
    /// in flight: concurrent callers share the pending outcome. Success
    /// overwrites the cache entry.
    ///
    /// With `silent` set, failure degrades to `Ok(None)` and is logged at
    /// debug only.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DetailFetchFailed`] when the source fails and
    /// the caller did not request silent degradation.
    pub async fn fetch(
        &self,
        detail: &DetailRef,
        options: DetailFetchOptions,
    ) -> EngineResult<Option<DetailRecord>> {
        let pending = {
            let mut state = self.inner.state.lock().expect("resolver lock poisoned");
            if let Some(record) = state.cache.get(detail) {
                return Ok(Some(record.clone()));
            }
            match state.in_flight.get(detail) {
                Some(existing) => existing.clone(),
                None => {
                    let fetch = Self::spawn_fetch(&self.inner, detail.clone());
                    state.in_flight.insert(detail.clone(), fetch.clone());
                    fetch
                }
            }
        };

        match pending.await {
            Ok(record) => Ok(Some(record)),
            Err(error) => {
                if options.silent {
                    debug!(
                        target: TARGET_PREFIX,
                        detail_ref = %detail,
                        error = %error,
                        "silent detail fetch failed, degrading to no-detail"
                    );
                    Ok(None)
                } else {
                    Err(EngineError::DetailFetchFailed {
                        detail: detail.clone(),
                        reason: error.to_string(),
                    })
                }
            }
        }
    }

    /// The cached record for a ref, if any.
    #[must_use]
    pub fn cached(&self, detail: &DetailRef) -> Option<DetailRecord> {
        let state = self.inner.state.lock().expect("resolver lock poisoned");
        state.cache.get(detail).cloned()
    }

    /// Drop one cached record. The next fetch re-issues the request.
    pub fn invalidate(&self, detail: &DetailRef) {
        let mut state = self.inner.state.lock().expect("resolver lock poisoned");
        state.cache.remove(detail);
    }

    /// Drop the whole cache. In-flight fetches are unaffected and will still
    /// populate it on completion.
    pub fn invalidate_all(&self) {
        let mut state = self.inner.state.lock().expect("resolver lock poisoned");
        state.cache.clear();
    }

    /// Number of cached records.
    #[must_use]
    pub fn cache_len(&self) -> usize {
        let state = self.inner.state.lock().expect("resolver lock poisoned");
        state.cache.len()
    }

    fn spawn_fetch(inner: &Arc<ResolverInner>, detail: DetailRef) -> SharedFetch {
        let inner = Arc::clone(inner);
        async move {
            let outcome = inner.source.fetch_detail(&detail).await;
            let mut state = inner.state.lock().expect("resolver lock poisoned");
            state.in_flight.remove(&detail);
            match outcome {
                Ok(payload) => {
                    let record = DetailRecord {
                        detail: detail.clone(),
                        payload,
                        fetched_at: SystemTime::now(),
                    };
                    state.cache.insert(detail, record.clone());
                    Ok(record)
                }
                Err(error) => Err(Arc::new(error)),
            }
        }
        .boxed()
        .shared()
    }
}

impl std::fmt::Debug for DetailResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock().expect("resolver lock poisoned");
        f.debug_struct("DetailResolver")
            .field("cached", &state.cache.len())
            .field("in_flight", &state.in_flight.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures::future::join;
    use geoscope_core::types::{DetailKind, DetailPayload, PoiDetail};
    use geoscope_core::FetchFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn poi_payload(name: &str) -> DetailPayload {
        DetailPayload::Poi(PoiDetail {
            name: name.to_string(),
            lat: 47.37,
            lon: 8.54,
            category_id: None,
            attributes: HashMap::new(),
        })
    }

    /// Counts fetches; fails for ids starting with "bad".
    struct CountingSource {
        calls: AtomicUsize,
    }

    impl CountingSource {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl DetailSource for CountingSource {
        fn fetch_detail<'a>(&'a self, detail: &'a DetailRef) -> FetchFuture<'a, DetailPayload> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                if detail.id.starts_with("bad") {
                    Err(EngineError::DetailFetchFailed {
                        detail: detail.clone(),
                        reason: "synthetic failure".to_string(),
                    })
                } else {
                    Ok(poi_payload(&detail.id))
                }
            })
        }
    }

    #[test]
    fn fetch_populates_and_reuses_cache() {
        let source = CountingSource::new();
        let resolver = DetailResolver::new(source.clone());
        let detail = DetailRef::new(DetailKind::Poi, "p1");

        let first = block_on(resolver.fetch(&detail, DetailFetchOptions::default()))
            .expect("fetch")
            .expect("record");
        assert_eq!(first.detail, detail);

        let second = block_on(resolver.fetch(&detail, DetailFetchOptions::default()))
            .expect("fetch")
            .expect("record");
        assert_eq!(second.payload, first.payload);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_fetches_for_same_ref_coalesce_to_one_call() {
        let source = CountingSource::new();
        let resolver = DetailResolver::new(source.clone());
        let detail = DetailRef::new(DetailKind::Poi, "p1");

        let (a, b) = block_on(join(
            resolver.fetch(&detail, DetailFetchOptions::default()),
            resolver.fetch(&detail, DetailFetchOptions::default()),
        ));
        assert!(a.expect("first").is_some());
        assert!(b.expect("second").is_some());
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn silent_failure_degrades_to_none() {
        let resolver = DetailResolver::new(CountingSource::new());
        let detail = DetailRef::new(DetailKind::Poi, "bad-1");

        let outcome =
            block_on(resolver.fetch(&detail, DetailFetchOptions::silent())).expect("no error");
        assert!(outcome.is_none());
        assert_eq!(resolver.cache_len(), 0);
    }

    #[test]
    fn loud_failure_surfaces_detail_fetch_failed() {
        let resolver = DetailResolver::new(CountingSource::new());
        let detail = DetailRef::new(DetailKind::Poi, "bad-1");

        let err = block_on(resolver.fetch(&detail, DetailFetchOptions::default())).unwrap_err();
        match err {
            EngineError::DetailFetchFailed { detail: d, .. } => assert_eq!(d, detail),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn failures_are_not_cached_and_retry_refetches() {
        let source = CountingSource::new();
        let resolver = DetailResolver::new(source.clone());
        let detail = DetailRef::new(DetailKind::Poi, "bad-1");

        let _ = block_on(resolver.fetch(&detail, DetailFetchOptions::silent()));
        let _ = block_on(resolver.fetch(&detail, DetailFetchOptions::silent()));
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn invalidate_forces_refetch() {
        let source = CountingSource::new();
        let resolver = DetailResolver::new(source.clone());
        let detail = DetailRef::new(DetailKind::Poi, "p1");

        let _ = block_on(resolver.fetch(&detail, DetailFetchOptions::default()));
        resolver.invalidate(&detail);
        assert!(resolver.cached(&detail).is_none());
        let _ = block_on(resolver.fetch(&detail, DetailFetchOptions::default()));
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn refetch_after_invalidate_all_overwrites_by_key() {
        let source = CountingSource::new();
        let resolver = DetailResolver::new(source);
        let p1 = DetailRef::new(DetailKind::Poi, "p1");
        let p2 = DetailRef::new(DetailKind::Address, "p1");

        let _ = block_on(resolver.fetch(&p1, DetailFetchOptions::default()));
        let _ = block_on(resolver.fetch(&p2, DetailFetchOptions::default()));
        // Same id under different kinds are distinct cache keys.
        assert_eq!(resolver.cache_len(), 2);

        resolver.invalidate_all();
        assert_eq!(resolver.cache_len(), 0);
    }
}
