//! Host runtime for the contact/location utility.
//!
//! The runtime sits between the UI port and the host services bundle:
//!
//! - [`bridge`] dispatches tagged UI commands to the document store or the URN opener and
//!   re-syncs the full contact collection after every mutation.
//! - [`geolocation`] runs the permission state machine and turns sensor readings into
//!   `PositionUpdated` events.
//! - [`failure`] is the single boundary where swallowed command failures are logged.
//! - [`boot`] is the composition root that wires everything once at startup.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod boot;
pub mod bridge;
pub mod config;
pub mod error;
pub mod failure;
pub mod geolocation;

pub use boot::HostRuntime;
pub use bridge::{CommandOutcome, ContactBridge};
pub use config::RuntimeConfig;
pub use error::CommandError;
pub use failure::{
    report_command_failure, CommandFailure, FailureJournal, MemoryFailureJournal,
    NoopFailureJournal,
};
pub use geolocation::{GeolocationMonitor, PermissionTracker, SensorAction};
