//! Query signatures and the result-identity comparison rule.
//!
//! A [`QuerySignature`] captures "what is currently being searched": the query
//! mode (free-text keyword vs. category filter), the mode-relevant field, and
//! the viewport refinements (bounding box, map scale).
//!
//! Identity vs. refinement is the load-bearing distinction of this module:
//! switching mode, changing the keyword text, or changing the category id
//! changes *result identity* and forces the consolidator to discard its
//! accumulated set, while panning or zooming (bounding box / scale only)
//! refines the *same* logical query and extends the set. [`QuerySignature::same_results`]
//! encodes that rule; derived `PartialEq` remains full structural equality.

use std::fmt;

use serde::{Deserialize, Serialize};

// ─── Query Mode ─────────────────────────────────────────────────────────────

/// Which kind of filter produced the current result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    /// Free-text keyword search.
    Keyword,
    /// Category-id filter search.
    Category,
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyword => write!(f, "keyword"),
            Self::Category => write!(f, "category"),
        }
    }
}

// ─── Bounding Box ───────────────────────────────────────────────────────────

/// Geographic viewport in WGS84 degrees.
///
/// Latitudes grow northward, longitudes eastward. The box is inclusive on all
/// edges. No antimeridian handling: callers on the 180° meridian split their
/// viewport into two queries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Southern edge.
    pub min_lat: f64,
    /// Northern edge.
    pub max_lat: f64,
    /// Western edge.
    pub min_lon: f64,
    /// Eastern edge.
    pub max_lon: f64,
}

impl BoundingBox {
    /// Create a bounding box from its four edges.
    #[must_use]
    pub const fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// Whether a coordinate falls inside the box (edges inclusive).
    #[must_use]
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }

    /// Whether the edges are ordered and within WGS84 range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.min_lat <= self.max_lat
            && self.min_lon <= self.max_lon
            && self.min_lat >= -90.0
            && self.max_lat <= 90.0
            && self.min_lon >= -180.0
            && self.max_lon <= 180.0
    }
}

// ─── Query Signature ────────────────────────────────────────────────────────

/// Immutable value identifying what is currently being searched.
///
/// Constructed via [`QuerySignature::keyword`] or [`QuerySignature::category`];
/// viewport refinements are derived with [`with_bounding_box`](Self::with_bounding_box)
/// and [`with_scale`](Self::with_scale) so the mode-relevant fields stay
/// consistent with the mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySignature {
    /// Which filter kind this signature represents.
    pub mode: QueryMode,
    /// Free-text query. `Some` iff `mode == Keyword`.
    pub keyword: Option<String>,
    /// Category filter id. `Some` iff `mode == Category`.
    pub category_id: Option<u32>,
    /// Viewport the query is scoped to.
    pub bounding_box: BoundingBox,
    /// Optional map scale (denominator), a display refinement only.
    pub scale: Option<f64>,
}

impl QuerySignature {
    /// Build a keyword-mode signature.
    #[must_use]
    pub fn keyword(keyword: impl Into<String>, bounding_box: BoundingBox) -> Self {
        Self {
            mode: QueryMode::Keyword,
            keyword: Some(keyword.into()),
            category_id: None,
            bounding_box,
            scale: None,
        }
    }

    /// Build a category-mode signature.
    #[must_use]
    pub fn category(category_id: u32, bounding_box: BoundingBox) -> Self {
        Self {
            mode: QueryMode::Category,
            keyword: None,
            category_id: Some(category_id),
            bounding_box,
            scale: None,
        }
    }

    /// Same signature scoped to a different viewport.
    #[must_use]
    pub fn with_bounding_box(mut self, bounding_box: BoundingBox) -> Self {
        self.bounding_box = bounding_box;
        self
    }

    /// Same signature at a different map scale.
    #[must_use]
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Whether `other` identifies the same logical result set.
    ///
    /// True iff the mode and the mode-relevant field match: keyword text in
    /// `Keyword` mode, category id in `Category` mode. Bounding box and scale
    /// are refinements of the same query and never part of identity, so a
    /// pan/zoom extends the accumulated set while a filter change resets it.
    #[must_use]
    pub fn same_results(&self, other: &Self) -> bool {
        if self.mode != other.mode {
            return false;
        }
        match self.mode {
            QueryMode::Keyword => self.keyword == other.keyword,
            QueryMode::Category => self.category_id == other.category_id,
        }
    }
}

impl fmt::Display for QuerySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            QueryMode::Keyword => {
                write!(f, "keyword:{}", self.keyword.as_deref().unwrap_or(""))
            }
            QueryMode::Category => {
                write!(f, "category:{}", self.category_id.unwrap_or(0))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b1() -> BoundingBox {
        BoundingBox::new(47.0, 48.0, 8.0, 9.0)
    }

    fn b2() -> BoundingBox {
        BoundingBox::new(47.5, 48.5, 8.5, 9.5)
    }

    #[test]
    fn bbox_contains_is_edge_inclusive() {
        let b = b1();
        assert!(b.contains(47.0, 8.0));
        assert!(b.contains(48.0, 9.0));
        assert!(b.contains(47.5, 8.5));
        assert!(!b.contains(46.999, 8.5));
        assert!(!b.contains(47.5, 9.001));
    }

    #[test]
    fn bbox_validity_checks_ordering_and_range() {
        assert!(b1().is_valid());
        assert!(!BoundingBox::new(48.0, 47.0, 8.0, 9.0).is_valid());
        assert!(!BoundingBox::new(47.0, 91.0, 8.0, 9.0).is_valid());
        assert!(!BoundingBox::new(47.0, 48.0, 8.0, 181.0).is_valid());
    }

    #[test]
    fn bbox_and_scale_changes_keep_result_identity() {
        let a = QuerySignature::keyword("cafe", b1());
        let b = QuerySignature::keyword("cafe", b2()).with_scale(25_000.0);
        assert!(a.same_results(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn keyword_text_change_breaks_identity() {
        let a = QuerySignature::keyword("cafe", b1());
        let b = QuerySignature::keyword("restaurant", b1());
        assert!(!a.same_results(&b));
    }

    #[test]
    fn category_id_change_breaks_identity() {
        let a = QuerySignature::category(12, b1());
        let b = QuerySignature::category(13, b1());
        assert!(!a.same_results(&b));
    }

    #[test]
    fn mode_switch_breaks_identity() {
        let a = QuerySignature::keyword("cafe", b1());
        let b = QuerySignature::category(12, b1());
        assert!(!a.same_results(&b));
        assert!(!b.same_results(&a));
    }

    #[test]
    fn cross_mode_fields_do_not_leak_into_identity() {
        // Two category signatures with the same id match even though their
        // (unused) keyword fields differ structurally.
        let mut a = QuerySignature::category(5, b1());
        let b = QuerySignature::category(5, b2());
        a.keyword = Some("stray".to_string());
        assert!(a.same_results(&b));
    }

    #[test]
    fn display_names_mode_and_filter() {
        assert_eq!(
            QuerySignature::keyword("cafe", b1()).to_string(),
            "keyword:cafe"
        );
        assert_eq!(QuerySignature::category(7, b1()).to_string(), "category:7");
    }
}
