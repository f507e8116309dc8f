//! As-you-type suggestion planning for the search box.
//!
//! [`SuggestEngine`] is a synchronous state machine that decides whether a
//! suggestion lookup should run for the current input and discards lookup
//! responses that land after the input has moved on. It does NOT execute
//! lookups. The consumer:
//!
//! 1. Calls [`SuggestEngine::input_changed`] on every keystroke and examines
//!    the returned [`SuggestPlan`]
//! 2. Executes the lookup (when the plan says so) with its own infrastructure
//! 3. Calls [`SuggestEngine::apply`] with the query the response answers
//!
//! `apply` compares the answered query against the live input and drops stale
//! responses, mirroring the write-time staleness guard of the page
//! consolidator. This keeps the engine synchronous, framework-agnostic, and
//! testable without any async runtime.

use serde::{Deserialize, Serialize};
use tracing::debug;

use geoscope_core::tracing_config::TARGET_PREFIX;
use geoscope_core::types::DetailRef;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for as-you-type suggestions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestConfig {
    /// Minimum input length before any lookup runs. Default: 2.
    pub min_prefix_len: usize,
    /// Hint: how long (ms) after the last keystroke before the consumer
    /// should issue the lookup. The consumer tracks elapsed time. Default: 250.
    pub debounce_ms: u64,
    /// Maximum suggestions retained from a response. Default: 10.
    pub max_suggestions: usize,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            min_prefix_len: 2,
            debounce_ms: 250,
            max_suggestions: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// Suggestions and plans
// ---------------------------------------------------------------------------

/// One suggestion row: completion text plus an optional detail reference so a
/// click can open the record directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Completion text shown to the user.
    pub text: String,
    /// Record the suggestion resolves to, when the service provides one.
    pub detail: Option<DetailRef>,
}

impl Suggestion {
    /// A plain text completion.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            detail: None,
        }
    }

    /// A completion that resolves to a detail record.
    #[must_use]
    pub fn resolving(text: impl Into<String>, detail: DetailRef) -> Self {
        Self {
            text: text.into(),
            detail: Some(detail),
        }
    }
}

/// The recommended action for the current input.
#[derive(Debug, Clone, PartialEq)]
pub enum SuggestPlan {
    /// Input is below `min_prefix_len` — do not look anything up. Previously
    /// shown suggestions were cleared.
    Skip,
    /// Issue a lookup for `query` after the debounce window.
    Fetch {
        /// The input text the lookup should answer.
        query: String,
        /// Whether the current suggestions stem from a prefix of this input
        /// and remain useful as a display placeholder while the lookup runs.
        keep_showing_current: bool,
    },
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Synchronous state machine for as-you-type suggestion lookups.
///
/// See [module-level docs](self) for usage.
#[derive(Debug, Clone)]
pub struct SuggestEngine {
    config: SuggestConfig,
    live_input: String,
    answered_query: Option<String>,
    suggestions: Vec<Suggestion>,
}

impl SuggestEngine {
    /// Create an engine with the given config.
    #[must_use]
    pub fn new(config: SuggestConfig) -> Self {
        Self {
            config,
            live_input: String::new(),
            answered_query: None,
            suggestions: Vec::new(),
        }
    }

    /// Record a keystroke and plan the lookup for the new input.
    pub fn input_changed(&mut self, input: &str) -> SuggestPlan {
        self.live_input = input.to_owned();
        if input.chars().count() < self.config.min_prefix_len {
            self.answered_query = None;
            self.suggestions.clear();
            return SuggestPlan::Skip;
        }
        let keep_showing_current = self
            .answered_query
            .as_deref()
            .is_some_and(|answered| input.starts_with(answered) && !self.suggestions.is_empty());
        SuggestPlan::Fetch {
            query: input.to_owned(),
            keep_showing_current,
        }
    }

    /// Apply a lookup response.
    ///
    /// Returns `false` (and keeps current state) when the response answers a
    /// query that is no longer the live input — late responses are harmless.
    pub fn apply(&mut self, query: &str, mut suggestions: Vec<Suggestion>) -> bool {
        if query != self.live_input {
            debug!(
                target: TARGET_PREFIX,
                answered = query,
                live = %self.live_input,
                "dropping suggestion response for superseded input"
            );
            return false;
        }
        suggestions.truncate(self.config.max_suggestions);
        self.answered_query = Some(query.to_owned());
        self.suggestions = suggestions;
        true
    }

    /// Whether the consumer should issue the planned lookup yet.
    ///
    /// The consumer passes the time elapsed since the last keystroke.
    #[must_use]
    pub const fn debounce_elapsed(&self, elapsed: std::time::Duration) -> bool {
        #[allow(clippy::cast_possible_truncation)] // Duration > u64::MAX millis is unreachable
        let millis = elapsed.as_millis() as u64;
        millis >= self.config.debounce_ms
    }

    /// The suggestions currently answering the input.
    #[must_use]
    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    /// The query the current suggestions answer, if any.
    #[must_use]
    pub fn answered_query(&self) -> Option<&str> {
        self.answered_query.as_deref()
    }

    /// Clear all state (input, answered query, suggestions).
    pub fn reset(&mut self) {
        self.live_input.clear();
        self.answered_query = None;
        self.suggestions.clear();
    }

    /// Borrow the current config.
    #[must_use]
    pub const fn config(&self) -> &SuggestConfig {
        &self.config
    }
}

impl Default for SuggestEngine {
    fn default() -> Self {
        Self::new(SuggestConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoscope_core::types::DetailKind;
    use std::time::Duration;

    #[test]
    fn short_input_skips_and_clears() {
        let mut engine = SuggestEngine::default();
        assert_eq!(engine.input_changed("ca"), SuggestPlan::Fetch {
            query: "ca".to_string(),
            keep_showing_current: false,
        });
        assert!(engine.apply("ca", vec![Suggestion::text("cafe")]));

        assert_eq!(engine.input_changed("c"), SuggestPlan::Skip);
        assert!(engine.suggestions().is_empty());
        assert!(engine.answered_query().is_none());
    }

    #[test]
    fn stale_response_is_dropped() {
        let mut engine = SuggestEngine::default();
        let _ = engine.input_changed("caf");
        let _ = engine.input_changed("cafe");

        // The response for "caf" lands after the input became "cafe".
        assert!(!engine.apply("caf", vec![Suggestion::text("caffeine")]));
        assert!(engine.suggestions().is_empty());

        assert!(engine.apply("cafe", vec![Suggestion::text("cafe bar")]));
        assert_eq!(engine.answered_query(), Some("cafe"));
    }

    #[test]
    fn prefix_extension_keeps_current_suggestions_visible() {
        let mut engine = SuggestEngine::default();
        let _ = engine.input_changed("caf");
        assert!(engine.apply("caf", vec![Suggestion::text("cafe")]));

        match engine.input_changed("cafe") {
            SuggestPlan::Fetch {
                keep_showing_current,
                ..
            } => assert!(keep_showing_current),
            SuggestPlan::Skip => panic!("expected fetch plan"),
        }

        // Backspace below the answered query is not a prefix extension.
        match engine.input_changed("ca") {
            SuggestPlan::Fetch {
                keep_showing_current,
                ..
            } => assert!(!keep_showing_current),
            SuggestPlan::Skip => panic!("expected fetch plan"),
        }
    }

    #[test]
    fn responses_are_truncated_to_max_suggestions() {
        let mut engine = SuggestEngine::new(SuggestConfig {
            max_suggestions: 2,
            ..SuggestConfig::default()
        });
        let _ = engine.input_changed("zu");
        let rows = vec![
            Suggestion::text("zurich"),
            Suggestion::resolving("zurich hb", DetailRef::new(DetailKind::Poi, "hb")),
            Suggestion::text("zug"),
        ];
        assert!(engine.apply("zu", rows));
        assert_eq!(engine.suggestions().len(), 2);
    }

    #[test]
    fn debounce_threshold_is_inclusive() {
        let engine = SuggestEngine::default();
        assert!(!engine.debounce_elapsed(Duration::from_millis(249)));
        assert!(engine.debounce_elapsed(Duration::from_millis(250)));
    }

    #[test]
    fn reset_clears_everything() {
        let mut engine = SuggestEngine::default();
        let _ = engine.input_changed("cafe");
        assert!(engine.apply("cafe", vec![Suggestion::text("cafe bar")]));
        engine.reset();
        assert!(engine.suggestions().is_empty());
        assert!(engine.answered_query().is_none());
        assert_eq!(engine.input_changed("cafe"), SuggestPlan::Fetch {
            query: "cafe".to_string(),
            keep_showing_current: false,
        });
    }

    #[test]
    fn config_fills_missing_fields_with_defaults() {
        let config: SuggestConfig =
            serde_json::from_str(r#"{"min_prefix_len": 3}"#).expect("deserialize");
        assert_eq!(config.min_prefix_len, 3);
        assert_eq!(config.debounce_ms, 250);
        assert_eq!(config.max_suggestions, 10);
    }
}
