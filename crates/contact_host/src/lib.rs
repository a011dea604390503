//! Typed host-domain contracts shared by the contact runtime and its browser adapters.
//!
//! This crate is the API-first boundary between the UI-facing runtime and the platform. It
//! exposes the contact document model, the revision-tracked document store contract, the
//! geolocation sensor contract, the tagged command/event envelopes, and the host service
//! bundle. Concrete browser adapters live in `contact_host_web`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod external_url;
pub mod geolocation;
pub mod host;
pub mod protocol;
pub mod store;

pub use external_url::{
    ExternalUrnFuture, ExternalUrnService, MemoryExternalUrnService, NoopExternalUrnService,
};
pub use geolocation::service::{
    GeolocationFuture, GeolocationService, MemoryGeolocationService, NoopGeolocationService,
    PermissionStream, PositionStream,
};
pub use geolocation::types::{
    PermissionChange, PermissionState, PositionFix, PositionOptions, PositionReading,
    PositionSample, SensorError, SensorErrorCode, DEFAULT_POSITION_TIMEOUT,
};
pub use host::{CapabilityStatus, HostCapabilities, HostServices, HostStrategy};
pub use protocol::{EventSink, HostCommand, HostEvent, MemoryEventSink, NoopEventSink};
pub use store::document::{Attachment, ContactDocument, DocumentId, Revision, WriteReceipt};
pub use store::memory::MemoryDocumentStore;
pub use store::service::{
    DocumentStore, ListOptions, NoopDocumentStore, StoreError, StoreFuture,
};
