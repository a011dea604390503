use std::rc::Rc;

use contact_host::{
    CapabilityStatus, ContactDocument, DocumentId, DocumentStore, ExternalUrnFuture,
    ExternalUrnService, GeolocationFuture, GeolocationService, HostCapabilities, HostServices,
    HostStrategy, ListOptions, MemoryDocumentStore, NoopExternalUrnService,
    NoopGeolocationService, PermissionStream, PositionOptions, PositionReading, PositionStream,
    Revision, StoreError, StoreFuture, WriteReceipt,
};

use crate::{PouchDocumentStore, WebExternalUrnService, WebGeolocationService};

/// Returns the compile-time selected host strategy for the active build.
pub const fn selected_host_strategy() -> HostStrategy {
    #[cfg(feature = "host-stub")]
    {
        HostStrategy::Stub
    }

    #[cfg(not(feature = "host-stub"))]
    {
        HostStrategy::Browser
    }
}

/// Returns the selected host strategy as a stable string token.
pub fn host_strategy_name() -> &'static str {
    selected_host_strategy().as_str()
}

/// Adapter enum that erases the concrete document backend behind [`DocumentStore`].
#[derive(Debug, Clone)]
pub enum DocumentStoreAdapter {
    /// Browser-backed PouchDB persistence.
    Browser(PouchDocumentStore),
    /// Volatile in-memory store used by stub builds.
    Stub(MemoryDocumentStore),
}

impl DocumentStore for DocumentStoreAdapter {
    fn put<'a>(
        &'a self,
        doc: &'a ContactDocument,
        expected: Option<&'a Revision>,
    ) -> StoreFuture<'a, Result<WriteReceipt, StoreError>> {
        match self {
            Self::Browser(store) => store.put(doc, expected),
            Self::Stub(store) => store.put(doc, expected),
        }
    }

    fn get<'a>(&'a self, id: &'a DocumentId) -> StoreFuture<'a, Result<ContactDocument, StoreError>> {
        match self {
            Self::Browser(store) => store.get(id),
            Self::Stub(store) => store.get(id),
        }
    }

    fn remove<'a>(
        &'a self,
        id: &'a DocumentId,
        rev: &'a Revision,
    ) -> StoreFuture<'a, Result<WriteReceipt, StoreError>> {
        match self {
            Self::Browser(store) => store.remove(id, rev),
            Self::Stub(store) => store.remove(id, rev),
        }
    }

    fn list_all<'a>(
        &'a self,
        options: ListOptions,
    ) -> StoreFuture<'a, Result<Vec<ContactDocument>, StoreError>> {
        match self {
            Self::Browser(store) => store.list_all(options),
            Self::Stub(store) => store.list_all(options),
        }
    }
}

/// Adapter enum that erases the concrete sensor backend behind [`GeolocationService`].
#[derive(Debug, Clone, Copy)]
pub enum GeolocationServiceAdapter {
    /// Browser Permissions/Geolocation API sensor.
    Browser(WebGeolocationService),
    /// No-op fallback used by stub builds.
    Stub(NoopGeolocationService),
}

impl GeolocationService for GeolocationServiceAdapter {
    fn permission_states(&self) -> Option<PermissionStream> {
        match self {
            Self::Browser(sensor) => sensor.permission_states(),
            Self::Stub(sensor) => sensor.permission_states(),
        }
    }

    fn current_position<'a>(
        &'a self,
        options: PositionOptions,
    ) -> GeolocationFuture<'a, PositionReading> {
        match self {
            Self::Browser(sensor) => sensor.current_position(options),
            Self::Stub(sensor) => sensor.current_position(options),
        }
    }

    fn watch_position(&self, options: PositionOptions) -> PositionStream {
        match self {
            Self::Browser(sensor) => sensor.watch_position(options),
            Self::Stub(sensor) => sensor.watch_position(options),
        }
    }
}

/// Adapter enum that erases the concrete external URN backend behind [`ExternalUrnService`].
#[derive(Debug, Clone, Copy)]
pub enum ExternalUrnServiceAdapter {
    /// Browser-backed `window.open` URN handling.
    Browser(WebExternalUrnService),
    /// No-op fallback used by stub builds.
    Stub(NoopExternalUrnService),
}

impl ExternalUrnService for ExternalUrnServiceAdapter {
    fn open_urn<'a>(&'a self, urn: &'a str) -> ExternalUrnFuture<'a, Result<(), String>> {
        match self {
            Self::Browser(service) => service.open_urn(urn),
            Self::Stub(service) => service.open_urn(urn),
        }
    }
}

/// Builds the document-store adapter for the compile-time selected host strategy.
pub fn document_store(database_name: &str) -> DocumentStoreAdapter {
    match selected_host_strategy() {
        HostStrategy::Browser => {
            DocumentStoreAdapter::Browser(PouchDocumentStore::new(database_name))
        }
        HostStrategy::Stub => DocumentStoreAdapter::Stub(MemoryDocumentStore::default()),
    }
}

/// Builds the location-sensor adapter for the compile-time selected host strategy.
pub fn geolocation_service() -> GeolocationServiceAdapter {
    match selected_host_strategy() {
        HostStrategy::Browser => GeolocationServiceAdapter::Browser(WebGeolocationService),
        HostStrategy::Stub => GeolocationServiceAdapter::Stub(NoopGeolocationService),
    }
}

/// Builds the external-URN adapter for the compile-time selected host strategy.
pub fn external_urn_service() -> ExternalUrnServiceAdapter {
    match selected_host_strategy() {
        HostStrategy::Browser => ExternalUrnServiceAdapter::Browser(WebExternalUrnService),
        HostStrategy::Stub => ExternalUrnServiceAdapter::Stub(NoopExternalUrnService),
    }
}

/// Returns the capability snapshot for the selected strategy.
///
/// Browser builds start from [`HostCapabilities::browser`] and downgrade the location domains
/// the running page does not expose.
pub fn host_capabilities() -> HostCapabilities {
    match selected_host_strategy() {
        HostStrategy::Browser => {
            let mut capabilities = HostCapabilities::browser();
            if !WebGeolocationService::sensor_supported() {
                capabilities.geolocation = CapabilityStatus::Unavailable;
            }
            if !WebGeolocationService::permission_observation_supported() {
                capabilities.permission_observation = CapabilityStatus::Unavailable;
            }
            capabilities
        }
        HostStrategy::Stub => HostCapabilities::stub(),
    }
}

/// Builds the full host service bundle consumed by `contact_runtime`.
pub fn build_host_services(database_name: &str) -> HostServices {
    HostServices {
        store: Rc::new(document_store(database_name)),
        geolocation: Rc::new(geolocation_service()),
        external_urns: Rc::new(external_urn_service()),
        capabilities: host_capabilities(),
        host_strategy: selected_host_strategy(),
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;

    use super::*;

    #[cfg(not(feature = "host-stub"))]
    #[test]
    fn default_build_selects_browser_adapters() {
        assert_eq!(selected_host_strategy(), HostStrategy::Browser);
        assert_eq!(host_strategy_name(), "browser");

        match document_store("textlocation") {
            DocumentStoreAdapter::Browser(store) => {
                assert_eq!(store.database_name(), "textlocation")
            }
            other => panic!("unexpected store adapter: {other:?}"),
        }
        assert!(matches!(
            geolocation_service(),
            GeolocationServiceAdapter::Browser(_)
        ));
        assert!(matches!(
            external_urn_service(),
            ExternalUrnServiceAdapter::Browser(_)
        ));
    }

    #[cfg(all(not(feature = "host-stub"), not(target_arch = "wasm32")))]
    #[test]
    fn browser_capabilities_downgrade_missing_location_apis() {
        let capabilities = host_capabilities();
        assert_eq!(capabilities.document_store, CapabilityStatus::Available);
        assert_eq!(capabilities.geolocation, CapabilityStatus::Unavailable);
        assert_eq!(
            capabilities.permission_observation,
            CapabilityStatus::Unavailable
        );
        assert_eq!(capabilities.external_urns, CapabilityStatus::Available);
    }

    #[cfg(feature = "host-stub")]
    #[test]
    fn stub_build_selects_in_memory_adapters() {
        assert_eq!(selected_host_strategy(), HostStrategy::Stub);
        assert_eq!(host_strategy_name(), "stub");
        assert_eq!(host_capabilities(), HostCapabilities::stub());

        let services = build_host_services("textlocation");
        let doc = ContactDocument::default().with_field("name", "Ada");
        let receipt = block_on(services.store.put(&doc, None)).expect("stub put");
        let listed = block_on(services.store.list_all(ListOptions::default())).expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id.as_ref(), Some(&receipt.id));
    }

    #[test]
    fn built_bundle_reports_selected_strategy() {
        let services = build_host_services("textlocation");
        assert_eq!(services.host_strategy, selected_host_strategy());
        assert_eq!(services.capabilities, host_capabilities());
        assert!(block_on(services.store.get(&DocumentId::new("missing"))).is_err());
    }
}
