//! Shared host-bundle and capability models for browser and stub runtime composition.

use std::rc::Rc;

use crate::{DocumentStore, ExternalUrnService, GeolocationService};

/// Stable host strategy selected for the current build/runtime composition path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostStrategy {
    /// Browser-backed composition (PouchDB, `navigator.geolocation`).
    Browser,
    /// Composition with in-memory/no-op adapters.
    Stub,
}

impl HostStrategy {
    /// Returns a stable string token for diagnostics and runtime inspection.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::Stub => "stub",
        }
    }
}

/// Host availability state for one optional capability domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityStatus {
    /// Capability is available.
    Available,
    /// Capability is not implemented or not supported on the active host.
    Unavailable,
    /// Capability exists but the user must grant access first.
    RequiresUserActivation,
}

impl CapabilityStatus {
    /// Returns whether the capability can be used immediately.
    pub const fn is_available(self) -> bool {
        matches!(self, Self::Available)
    }

    /// Returns a stable string token for diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Unavailable => "unavailable",
            Self::RequiresUserActivation => "requires-user-activation",
        }
    }
}

/// Host capability snapshot exposed to runtime wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostCapabilities {
    /// Local document store availability.
    pub document_store: CapabilityStatus,
    /// Device location sensor availability.
    pub geolocation: CapabilityStatus,
    /// Permission-state query and change observation availability.
    pub permission_observation: CapabilityStatus,
    /// External URN opening availability.
    pub external_urns: CapabilityStatus,
}

impl HostCapabilities {
    /// Browser-default capability posture. Location access is gated by the user.
    pub const fn browser() -> Self {
        Self {
            document_store: CapabilityStatus::Available,
            geolocation: CapabilityStatus::RequiresUserActivation,
            permission_observation: CapabilityStatus::Available,
            external_urns: CapabilityStatus::Available,
        }
    }

    /// Stub capability posture.
    pub const fn stub() -> Self {
        Self {
            document_store: CapabilityStatus::Available,
            geolocation: CapabilityStatus::Unavailable,
            permission_observation: CapabilityStatus::Unavailable,
            external_urns: CapabilityStatus::Unavailable,
        }
    }
}

/// Runtime-selected host service bundle injected into the contact runtime.
///
/// All environment-specific service selection happens before this bundle crosses into
/// `contact_runtime`, which keeps the bridge and the geolocation monitor decoupled from
/// browser adapter details.
#[derive(Clone)]
pub struct HostServices {
    /// Revision-tracked contact document store.
    pub store: Rc<dyn DocumentStore>,
    /// Device location sensor.
    pub geolocation: Rc<dyn GeolocationService>,
    /// External URN opener.
    pub external_urns: Rc<dyn ExternalUrnService>,
    /// Host availability snapshot for optional capability domains.
    pub capabilities: HostCapabilities,
    /// Stable strategy identifier for diagnostics.
    pub host_strategy: HostStrategy,
}

impl HostServices {
    /// Builds the stub bundle: in-memory store, no-op sensor and URN opener.
    pub fn stub() -> Self {
        Self {
            store: Rc::new(crate::MemoryDocumentStore::default()),
            geolocation: Rc::new(crate::NoopGeolocationService),
            external_urns: Rc::new(crate::NoopExternalUrnService),
            capabilities: HostCapabilities::stub(),
            host_strategy: HostStrategy::Stub,
        }
    }
}
