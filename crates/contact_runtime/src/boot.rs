//! Composition root: builds the bridge and the geolocation monitor once and starts them.

use std::rc::Rc;

use contact_host::{EventSink, HostCommand, HostServices};
use futures::task::LocalSpawn;
use serde_json::Value;

use crate::{
    bridge::ContactBridge, config::RuntimeConfig, failure::FailureJournal,
    geolocation::GeolocationMonitor,
};

/// Process-wide runtime owning the wired bridge and geolocation monitor.
pub struct HostRuntime {
    bridge: ContactBridge,
    geolocation: GeolocationMonitor,
    services: HostServices,
    config: RuntimeConfig,
}

impl HostRuntime {
    /// Wires the runtime from an injected host bundle and starts background work.
    ///
    /// Boot order:
    /// 1. construct the bridge and the geolocation monitor over the shared event sink
    /// 2. start permission observation
    /// 3. queue an initial contact re-sync when `config.sync_on_boot` is set
    pub fn boot(
        services: HostServices,
        events: Rc<dyn EventSink>,
        failures: Rc<dyn FailureJournal>,
        spawner: Rc<dyn LocalSpawn>,
        config: RuntimeConfig,
    ) -> Self {
        let caps = services.capabilities;
        tracing::info!(
            host_strategy = services.host_strategy.as_str(),
            document_store = caps.document_store.as_str(),
            geolocation = caps.geolocation.as_str(),
            permission_observation = caps.permission_observation.as_str(),
            external_urns = caps.external_urns.as_str(),
            "booting contact host runtime"
        );

        let bridge = ContactBridge::new(
            services.store.clone(),
            services.external_urns.clone(),
            events.clone(),
            failures,
            spawner.clone(),
            config.list_options(),
        );
        let geolocation = GeolocationMonitor::new(
            services.geolocation.clone(),
            events,
            spawner,
            config.position_options(),
        );

        geolocation.start();
        if config.sync_on_boot {
            bridge.submit(HostCommand::GetAllContacts);
        }

        Self {
            bridge,
            geolocation,
            services,
            config,
        }
    }

    /// Starts a decoded UI command.
    pub fn submit(&self, command: HostCommand) {
        self.bridge.submit(command);
    }

    /// Decodes and starts a raw UI envelope.
    pub fn submit_json(&self, envelope: Value) {
        self.bridge.submit_json(envelope);
    }

    /// Returns the command bridge.
    pub fn bridge(&self) -> &ContactBridge {
        &self.bridge
    }

    /// Returns the geolocation monitor.
    pub fn geolocation(&self) -> &GeolocationMonitor {
        &self.geolocation
    }

    /// Returns the injected host bundle.
    pub fn services(&self) -> &HostServices {
        &self.services
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use contact_host::{
        CapabilityStatus, HostCapabilities, HostEvent, HostStrategy, MemoryDocumentStore,
        MemoryEventSink, MemoryExternalUrnService, MemoryGeolocationService, PermissionState,
    };
    use futures::executor::LocalPool;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::failure::MemoryFailureJournal;

    fn services(sensor: MemoryGeolocationService) -> HostServices {
        HostServices {
            store: Rc::new(MemoryDocumentStore::default()),
            geolocation: Rc::new(sensor),
            external_urns: Rc::new(MemoryExternalUrnService::default()),
            capabilities: HostCapabilities {
                geolocation: CapabilityStatus::Available,
                ..HostCapabilities::browser()
            },
            host_strategy: HostStrategy::Stub,
        }
    }

    #[test]
    fn boot_announces_permission_and_initial_contacts() {
        let mut pool = LocalPool::new();
        let events = MemoryEventSink::default();
        let sensor = MemoryGeolocationService::with_permission(PermissionState::Denied);

        let runtime = HostRuntime::boot(
            services(sensor),
            Rc::new(events.clone()),
            Rc::new(MemoryFailureJournal::default()),
            Rc::new(pool.spawner()),
            RuntimeConfig::default(),
        );
        pool.run_until_stalled();

        let mut tags = events.events().iter().map(HostEvent::tag).collect::<Vec<_>>();
        tags.sort_unstable();
        assert_eq!(tags, vec!["ContactsChanged", "GeoLocationPermissionChanged"]);
        assert_eq!(
            runtime.geolocation().permission(),
            Some(PermissionState::Denied)
        );
        assert_eq!(runtime.services().host_strategy, HostStrategy::Stub);
    }

    #[test]
    fn boot_without_initial_sync_waits_for_ui_commands() {
        let mut pool = LocalPool::new();
        let events = MemoryEventSink::default();
        let config = RuntimeConfig {
            sync_on_boot: false,
            ..RuntimeConfig::default()
        };

        let runtime = HostRuntime::boot(
            HostServices::stub(),
            Rc::new(events.clone()),
            Rc::new(MemoryFailureJournal::default()),
            Rc::new(pool.spawner()),
            config,
        );
        pool.run_until_stalled();
        assert!(events.events().is_empty());
        assert!(!runtime.config().sync_on_boot);

        runtime.submit_json(json!({"tag": "CreateContact", "data": {"name": "A"}}));
        pool.run_until_stalled();

        match events.events().as_slice() {
            [HostEvent::ContactsChanged(contacts)] => {
                assert_eq!(contacts.len(), 1);
                assert_eq!(contacts[0].field("name"), Some(&json!("A")));
            }
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[test]
    fn stub_host_falls_back_and_reports_unavailable_sensor() {
        let mut pool = LocalPool::new();
        let events = MemoryEventSink::default();

        let runtime = HostRuntime::boot(
            HostServices::stub(),
            Rc::new(events.clone()),
            Rc::new(MemoryFailureJournal::default()),
            Rc::new(pool.spawner()),
            RuntimeConfig {
                sync_on_boot: false,
                ..RuntimeConfig::default()
            },
        );
        pool.run_until_stalled();

        let errors = events
            .events()
            .into_iter()
            .filter_map(|event| match event {
                HostEvent::PositionUpdated(sample) => sample.error,
                _ => None,
            })
            .map(|code| code.as_str())
            .collect::<Vec<_>>();
        assert_eq!(errors, vec!["position_unavailable"]);
        assert_eq!(runtime.geolocation().permission(), None);
        assert!(!runtime.geolocation().is_watching());
    }
}
