//! Shared transport interop for browser bridge domains.
//!
//! This module routes calls to target-specific implementations while preserving a uniform API
//! for higher-level bridge domain modules.

use contact_host::{ContactDocument, WriteReceipt};
use serde_json::Value;

use super::{PouchFailure, RawPositionReading};

#[cfg(not(target_arch = "wasm32"))]
mod non_wasm;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(not(target_arch = "wasm32"))]
use non_wasm as imp;
#[cfg(target_arch = "wasm32")]
use wasm as imp;

/// Callback receiving permission state tokens (`"granted"`, `"prompt"`, `"denied"`), or `None`
/// once when the permission query fails.
pub type PermissionCallback = Box<dyn FnMut(Option<String>)>;
/// Callback receiving watch readings.
pub type ReadingCallback = Box<dyn FnMut(RawPositionReading)>;

pub async fn store_put(database: &str, doc: Value) -> Result<WriteReceipt, PouchFailure> {
    imp::store_put(database, doc).await
}

pub async fn store_get(database: &str, id: &str) -> Result<ContactDocument, PouchFailure> {
    imp::store_get(database, id).await
}

pub async fn store_remove(
    database: &str,
    id: &str,
    rev: &str,
) -> Result<WriteReceipt, PouchFailure> {
    imp::store_remove(database, id, rev).await
}

pub async fn store_all_docs(
    database: &str,
    include_attachments: bool,
) -> Result<Vec<ContactDocument>, PouchFailure> {
    imp::store_all_docs(database, include_attachments).await
}

pub fn permissions_supported() -> bool {
    imp::permissions_supported()
}

pub fn geolocation_supported() -> bool {
    imp::geolocation_supported()
}

pub fn observe_permission(on_state: PermissionCallback) {
    imp::observe_permission(on_state)
}

pub async fn current_position(timeout_ms: u32) -> RawPositionReading {
    imp::current_position(timeout_ms).await
}

pub fn watch_position(timeout_ms: u32, on_reading: ReadingCallback) -> Option<i32> {
    imp::watch_position(timeout_ms, on_reading)
}

pub fn clear_watch(watch_id: i32) {
    imp::clear_watch(watch_id)
}

pub async fn open_external_urn(urn: &str) -> Result<(), String> {
    imp::open_external_urn(urn).await
}
