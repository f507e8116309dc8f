//! Optional tracing subscriber setup for geoscope.
//!
//! This module provides a convenience function for consumers who want
//! structured logging without configuring `tracing-subscriber` themselves. It
//! is entirely optional: consumers may bring their own subscriber.
//!
//! # Usage
//!
//! ```ignore
//! use geoscope_core::tracing_config::init_tracing;
//! use tracing::Level;
//!
//! init_tracing(Level::INFO);
//! // All geoscope spans and events are now captured.
//! ```

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Target prefix used by all geoscope tracing spans and events.
///
/// Consumers can use this to filter geoscope logs:
/// ```text
/// RUST_LOG=geoscope=debug
/// ```
pub const TARGET_PREFIX: &str = "geoscope";

/// Standard tracing span names used across the engine.
///
/// These constants ensure consistent span naming so that consumers can match
/// on them in subscribers, dashboards, and tests.
pub mod span_names {
    /// Root span for one page request (plan, fetch, apply).
    pub const PAGE_REQUEST: &str = "geoscope::page_request";
    /// Applying a fetched page to the consolidated set.
    pub const CONSOLIDATE: &str = "geoscope::consolidate";
    /// Detail record resolution (cache lookup + fetch).
    pub const DETAIL_FETCH: &str = "geoscope::detail_fetch";
    /// Panel navigation operation (push, back, forward, reset).
    pub const PANEL_NAV: &str = "geoscope::panel_nav";
    /// Suggestion planning for as-you-type input.
    pub const SUGGEST: &str = "geoscope::suggest";
}

/// Standard structured field names used in tracing events.
///
/// Using consistent field names enables structured log queries across the
/// entire engine.
pub mod field_names {
    pub const SIGNATURE: &str = "signature";
    pub const PAGE_NUMBER: &str = "page_number";
    pub const TICKET: &str = "ticket";
    pub const ITEM_COUNT: &str = "item_count";
    pub const APPENDED: &str = "appended";
    pub const UPDATED_IN_PLACE: &str = "updated_in_place";
    pub const DETAIL_REF: &str = "detail_ref";
    pub const PANEL_DEPTH: &str = "panel_depth";
    pub const CURSOR: &str = "cursor";
}

/// Parse a log level string (case-insensitive).
///
/// Recognized values: `trace`, `debug`, `info`, `warn`, `error`.
/// Returns `None` for unrecognized strings.
#[must_use]
pub fn parse_level(s: &str) -> Option<Level> {
    match s.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Returns the recommended `tracing::Level` for the given environment.
///
/// Checks `GEOSCOPE_LOG_LEVEL` first, then falls back to the provided default.
/// Recognized values: `trace`, `debug`, `info`, `warn`, `error`.
#[must_use]
pub fn level_from_env(default: Level) -> Level {
    std::env::var("GEOSCOPE_LOG_LEVEL")
        .ok()
        .and_then(|s| parse_level(&s))
        .unwrap_or(default)
}

/// Install a formatted subscriber capturing geoscope events at `level`.
///
/// `RUST_LOG` takes precedence when set. Safe to call more than once; later
/// calls are no-ops because a global default is already installed.
pub fn init_tracing(level: Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{TARGET_PREFIX}={level}")));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_prefix_is_geoscope() {
        assert_eq!(TARGET_PREFIX, "geoscope");
    }

    #[test]
    fn all_span_names_start_with_target_prefix() {
        let all_spans = [
            span_names::PAGE_REQUEST,
            span_names::CONSOLIDATE,
            span_names::DETAIL_FETCH,
            span_names::PANEL_NAV,
            span_names::SUGGEST,
        ];
        for span in all_spans {
            assert!(
                span.starts_with(&format!("{TARGET_PREFIX}::")),
                "span {span:?} must start with \"{TARGET_PREFIX}::\"",
            );
        }
    }

    #[test]
    fn parse_level_recognizes_valid_levels() {
        assert_eq!(parse_level("trace"), Some(Level::TRACE));
        assert_eq!(parse_level("debug"), Some(Level::DEBUG));
        assert_eq!(parse_level("info"), Some(Level::INFO));
        assert_eq!(parse_level("warn"), Some(Level::WARN));
        assert_eq!(parse_level("error"), Some(Level::ERROR));
    }

    #[test]
    fn parse_level_case_insensitive() {
        assert_eq!(parse_level("TRACE"), Some(Level::TRACE));
        assert_eq!(parse_level("Info"), Some(Level::INFO));
    }

    #[test]
    fn parse_level_returns_none_for_invalid() {
        assert_eq!(parse_level("nonsense"), None);
        assert_eq!(parse_level(""), None);
        assert_eq!(parse_level(" info"), None);
    }

    #[test]
    fn field_names_are_non_empty() {
        let all_fields = [
            field_names::SIGNATURE,
            field_names::PAGE_NUMBER,
            field_names::TICKET,
            field_names::ITEM_COUNT,
            field_names::APPENDED,
            field_names::UPDATED_IN_PLACE,
            field_names::DETAIL_REF,
            field_names::PANEL_DEPTH,
            field_names::CURSOR,
        ];
        for field in all_fields {
            assert!(!field.is_empty(), "field name must not be empty");
        }
    }
}
