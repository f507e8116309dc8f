use std::collections::HashMap;
use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::signature::BoundingBox;

// ---------------------------------------------------------------------------
// Result items and pages
// ---------------------------------------------------------------------------

/// One search hit as returned by the remote service.
///
/// Within a consolidated [`ResultSet`], `id` is unique: re-arrival of an id
/// (overlapping pages after a viewport pan) overwrites the stored item in
/// place rather than duplicating it, and the later arrival's field values win.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    /// Service-assigned unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Latitude in WGS84 degrees.
    pub lat: f64,
    /// Longitude in WGS84 degrees.
    pub lon: f64,
    /// Category the item belongs to, when the service provides one.
    pub category_id: Option<u32>,
    /// Extensible key-value metadata carried through unmodified.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl ResultItem {
    /// Creates an item with the required fields.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lat,
            lon,
            category_id: None,
            metadata: HashMap::new(),
        }
    }

    /// Sets the category id.
    #[must_use]
    pub fn with_category(mut self, category_id: u32) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Adds a metadata key-value pair.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// One page of results plus pagination metadata, as produced by a
/// [`PageFetcher`](crate::traits::PageFetcher).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPage {
    /// Items in service order.
    pub items: Vec<ResultItem>,
    /// Whether the service reports a page after this one.
    pub has_next_page: bool,
    /// Whether the service reports a page before this one.
    pub has_previous_page: bool,
    /// Total matching items across all pages.
    pub total_count: u64,
    /// Total page count at the current page size.
    pub total_pages: u32,
}

impl ResultPage {
    /// A page with no items and no neighbours (terminal empty response).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            has_next_page: false,
            has_previous_page: false,
            total_count: 0,
            total_pages: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Consolidated result set
// ---------------------------------------------------------------------------

/// The consolidated, de-duplicated, append-only view over all pages fetched
/// under one query signature.
///
/// Owned and mutated by the `ResultConsolidator`; consumers read it as a
/// snapshot. Never partially rolled back: a failed page fetch leaves the set
/// untouched and only flips the error state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    /// Accumulated items in arrival order.
    pub items: Vec<ResultItem>,
    /// Highest page number whose items are present (1-based).
    pub page_number: u32,
    /// Latest server-reported has-next flag.
    pub has_next_page: bool,
    /// Latest server-reported has-previous flag.
    pub has_previous_page: bool,
    /// Latest server-reported total match count.
    pub total_count: u64,
    /// Latest server-reported total page count.
    pub total_pages: u32,
    /// Whether the most recent successful response was for page 1.
    pub is_first_page: bool,
}

impl ResultSet {
    /// The empty set a fresh query starts from.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            page_number: 1,
            has_next_page: false,
            has_previous_page: false,
            total_count: 0,
            total_pages: 0,
            is_first_page: true,
        }
    }

    /// Number of consolidated items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no items have been consolidated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Position of an item by id, if present.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }
}

impl Default for ResultSet {
    fn default() -> Self {
        Self::empty()
    }
}

// ---------------------------------------------------------------------------
// Detail references and records
// ---------------------------------------------------------------------------

/// What kind of record a [`DetailRef`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailKind {
    /// A point of interest.
    Poi,
    /// A geocoded address.
    Address,
    /// A named area (district, park, ...).
    Area,
}

impl DetailKind {
    /// Stable identifier for serialization and diagnostics.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Poi => "poi",
            Self::Address => "address",
            Self::Area => "area",
        }
    }
}

/// Reference to a detail record: kind plus service id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DetailRef {
    /// Record kind.
    pub kind: DetailKind,
    /// Service-assigned identifier within the kind's namespace.
    pub id: String,
}

impl DetailRef {
    /// Create a reference from kind and id.
    #[must_use]
    pub fn new(kind: DetailKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for DetailRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind.id(), self.id)
    }
}

/// Full detail payload for a point of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoiDetail {
    /// Display name.
    pub name: String,
    /// Latitude in WGS84 degrees.
    pub lat: f64,
    /// Longitude in WGS84 degrees.
    pub lon: f64,
    /// Category the POI belongs to.
    pub category_id: Option<u32>,
    /// Extensible attributes (opening hours, website, ...).
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

/// Full detail payload for a geocoded address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressDetail {
    /// Formatted address label.
    pub label: String,
    /// Latitude in WGS84 degrees.
    pub lat: f64,
    /// Longitude in WGS84 degrees.
    pub lon: f64,
    /// Extensible attributes (postal code, locality, ...).
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

/// Full detail payload for a named area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaDetail {
    /// Display name.
    pub name: String,
    /// Extent of the area.
    pub bounding_box: BoundingBox,
    /// Extensible attributes.
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

/// Detail payload, tagged by record kind.
///
/// Modelled as a tagged union over the known kinds rather than an open-ended
/// untyped bag, so panel consumers get compile-time safety on the payload
/// shape while the navigation stack stays generic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetailPayload {
    /// Point-of-interest detail.
    Poi(PoiDetail),
    /// Address detail.
    Address(AddressDetail),
    /// Area detail.
    Area(AreaDetail),
}

impl DetailPayload {
    /// The kind tag this payload carries.
    #[must_use]
    pub const fn kind(&self) -> DetailKind {
        match self {
            Self::Poi(_) => DetailKind::Poi,
            Self::Address(_) => DetailKind::Address,
            Self::Area(_) => DetailKind::Area,
        }
    }
}

/// A cached detail record: the reference it answers, the payload, and when it
/// was fetched.
///
/// Keyed by `(kind, id)` in the resolver cache, overwritten on re-fetch, never
/// auto-expired — the UI owns invalidation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRecord {
    /// The reference this record answers.
    pub detail: DetailRef,
    /// The resolved payload.
    pub payload: DetailPayload,
    /// Wall-clock fetch completion time.
    pub fetched_at: SystemTime,
}
