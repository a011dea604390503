//! Tagged command/event envelopes exchanged between the UI and the host, plus event sinks.
//!
//! Both directions use the `{ "tag": ..., "data": ... }` envelope. Each direction is a closed
//! enum, so adding a tag is a compile-checked change for every dispatcher.

use std::{cell::RefCell, rc::Rc};

use serde::{
    de::{DeserializeOwned, Error as _},
    Deserialize, Deserializer, Serialize,
};
use serde_json::Value;

use crate::{
    geolocation::types::{PermissionChange, PermissionState, PositionSample},
    store::document::ContactDocument,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tag", content = "data")]
/// Command emitted by the UI.
///
/// Decoding is lenient about payloads the command does not use: `GetAllContacts` accepts any
/// `data` value, including none.
pub enum HostCommand {
    /// Inserts a new contact.
    CreateContact(ContactDocument),
    /// Replaces an existing contact body, addressed by `_id`.
    ModifyContact(ContactDocument),
    /// Tombstones an existing contact, addressed by `_id`.
    DeleteContact(ContactDocument),
    /// Requests a full contact re-sync without mutation.
    GetAllContacts,
    /// Opens an external resource identifier outside the application.
    #[serde(rename = "OpenURN")]
    OpenUrn(String),
}

impl HostCommand {
    /// Returns the wire tag for diagnostics.
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::CreateContact(_) => "CreateContact",
            Self::ModifyContact(_) => "ModifyContact",
            Self::DeleteContact(_) => "DeleteContact",
            Self::GetAllContacts => "GetAllContacts",
            Self::OpenUrn(_) => "OpenURN",
        }
    }

    /// Decodes a command envelope from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown tags or malformed payloads.
    pub fn from_json(value: Value) -> Result<Self, String> {
        serde_json::from_value(value).map_err(|e| e.to_string())
    }
}

const COMMAND_TAGS: &[&str] = &[
    "CreateContact",
    "ModifyContact",
    "DeleteContact",
    "GetAllContacts",
    "OpenURN",
];

#[derive(Deserialize)]
struct CommandEnvelope {
    tag: String,
    #[serde(default)]
    data: Value,
}

fn command_payload<T: DeserializeOwned, E: serde::de::Error>(data: Value) -> Result<T, E> {
    serde_json::from_value(data).map_err(E::custom)
}

impl<'de> Deserialize<'de> for HostCommand {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let CommandEnvelope { tag, data } = CommandEnvelope::deserialize(deserializer)?;
        match tag.as_str() {
            "CreateContact" => command_payload(data).map(Self::CreateContact),
            "ModifyContact" => command_payload(data).map(Self::ModifyContact),
            "DeleteContact" => command_payload(data).map(Self::DeleteContact),
            "GetAllContacts" => Ok(Self::GetAllContacts),
            "OpenURN" => command_payload(data).map(Self::OpenUrn),
            other => Err(D::Error::unknown_variant(other, COMMAND_TAGS)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tag", content = "data")]
/// Event emitted by the host. Every payload replaces the UI's copy of its slice of state.
pub enum HostEvent {
    /// The complete live contact collection.
    ContactsChanged(Vec<ContactDocument>),
    /// A position fix or a sensor error code.
    PositionUpdated(PositionSample),
    /// The geolocation permission state that was just entered.
    GeoLocationPermissionChanged(PermissionChange),
}

impl HostEvent {
    /// Builds a permission event.
    pub const fn permission_changed(permission: PermissionState) -> Self {
        Self::GeoLocationPermissionChanged(PermissionChange { permission })
    }

    /// Returns the wire tag for diagnostics.
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::ContactsChanged(_) => "ContactsChanged",
            Self::PositionUpdated(_) => "PositionUpdated",
            Self::GeoLocationPermissionChanged(_) => "GeoLocationPermissionChanged",
        }
    }
}

/// Outbound half of the UI port. Implementations deliver events to the UI in call order.
pub trait EventSink {
    /// Delivers one event.
    fn emit(&self, event: HostEvent);
}

#[derive(Debug, Clone, Copy, Default)]
/// Event sink that discards everything.
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn emit(&self, _event: HostEvent) {}
}

#[derive(Debug, Clone, Default)]
/// Event sink that records every event in emission order. Clones share the same log.
pub struct MemoryEventSink {
    inner: Rc<RefCell<Vec<HostEvent>>>,
}

impl MemoryEventSink {
    /// Returns a copy of every recorded event.
    pub fn events(&self) -> Vec<HostEvent> {
        self.inner.borrow().clone()
    }

    /// Removes and returns every recorded event.
    pub fn take(&self) -> Vec<HostEvent> {
        std::mem::take(&mut *self.inner.borrow_mut())
    }
}

impl EventSink for MemoryEventSink {
    fn emit(&self, event: HostEvent) {
        self.inner.borrow_mut().push(event);
    }
}
