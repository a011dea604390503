//! Browser (`wasm32`) implementations of [`contact_host`] service contracts.
//!
//! This crate is the concrete browser-side host wiring layer for the PouchDB-backed contact
//! store, the `navigator.geolocation` sensor, and external URN opening.
//!
//! Bridge bindings are split by domain under `bridge/`:
//! - `bridge::store`
//! - `bridge::geolocation`
//! - `bridge::external_url`
//! - `bridge::interop` (shared wasm/non-wasm transport glue)

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

/// Compile-time host-strategy selection and concrete adapter factories for runtime wiring.
pub mod adapters;
mod bridge;
pub mod external_url;
pub mod geolocation;
pub mod storage;

pub use adapters::{
    build_host_services, document_store, external_urn_service, geolocation_service,
    host_capabilities, host_strategy_name, selected_host_strategy, DocumentStoreAdapter,
    ExternalUrnServiceAdapter, GeolocationServiceAdapter,
};
pub use external_url::WebExternalUrnService;
pub use geolocation::WebGeolocationService;
pub use storage::pouch_db::PouchDocumentStore;
