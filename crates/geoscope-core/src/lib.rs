//! Core types, error taxonomy, and trait seams for the geoscope search state engine.
//!
//! This crate defines the shared data model (query signatures, result items and
//! sets, detail records), the error type (`EngineError`), and the async trait
//! seams (`PageFetcher`, `DetailSource`) used across all geoscope crates.
//!
//! It has minimal external dependencies and is intended to be depended on by
//! every other crate in the workspace.

pub mod error;
pub mod signature;
pub mod tracing_config;
pub mod traits;
pub mod types;

pub use error::{EngineError, EngineResult};
pub use signature::{BoundingBox, QueryMode, QuerySignature};
pub use traits::{DetailSource, FetchFuture, PageFetcher};
pub use types::{
    AddressDetail, AreaDetail, DetailKind, DetailPayload, DetailRecord, DetailRef, PoiDetail,
    ResultItem, ResultPage, ResultSet,
};
