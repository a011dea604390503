//! Browser capability bridge implementations for `contact_host_web` service adapters.
//!
//! This module is organized by host domain (`store`, `geolocation`, `external_url`) and owns
//! the transport-level reply shapes shared by the wasm and non-wasm implementations.

mod external_url;
mod geolocation;
mod interop;
mod store;

use contact_host::{ContactDocument, PositionFix, PositionReading, SensorError, WriteReceipt};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
/// Failure reported by the PouchDB glue. `status` follows PouchDB's HTTP-style codes.
pub struct PouchFailure {
    #[serde(default)]
    pub status: Option<u16>,
    pub message: String,
}

impl PouchFailure {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
/// Position callback payload: coordinates on success, a platform error `code` on failure.
pub struct RawPositionReading {
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub accuracy: Option<f64>,
    #[serde(default)]
    pub code: Option<i32>,
}

impl RawPositionReading {
    pub fn failure(code: i32) -> Self {
        Self {
            code: Some(code),
            ..Self::default()
        }
    }

    pub fn into_reading(self) -> PositionReading {
        match (self.code, self.longitude, self.latitude, self.accuracy) {
            (None, Some(longitude), Some(latitude), Some(accuracy)) => Ok(PositionFix {
                longitude,
                latitude,
                accuracy,
            }),
            (Some(code), ..) => Err(SensorError::from_platform_code(code)),
            _ => Err(SensorError::SensorUnknown),
        }
    }
}

pub async fn store_put(database: &str, doc: Value) -> Result<WriteReceipt, PouchFailure> {
    store::store_put(database, doc).await
}

pub async fn store_get(database: &str, id: &str) -> Result<ContactDocument, PouchFailure> {
    store::store_get(database, id).await
}

pub async fn store_remove(
    database: &str,
    id: &str,
    rev: &str,
) -> Result<WriteReceipt, PouchFailure> {
    store::store_remove(database, id, rev).await
}

pub async fn store_all_docs(
    database: &str,
    include_attachments: bool,
) -> Result<Vec<ContactDocument>, PouchFailure> {
    store::store_all_docs(database, include_attachments).await
}

pub fn permissions_supported() -> bool {
    geolocation::permissions_supported()
}

pub fn geolocation_supported() -> bool {
    geolocation::geolocation_supported()
}

/// Registers `on_state` for permission changes. `None` is delivered once if the query fails.
pub fn observe_permission(on_state: impl FnMut(Option<String>) + 'static) -> bool {
    geolocation::observe_permission(on_state)
}

pub async fn current_position(timeout_ms: u32) -> RawPositionReading {
    geolocation::current_position(timeout_ms).await
}

/// Starts a platform watch. Returns the platform watch id when one was registered.
pub fn watch_position(
    timeout_ms: u32,
    on_reading: impl FnMut(RawPositionReading) + 'static,
) -> Option<i32> {
    geolocation::watch_position(timeout_ms, on_reading)
}

pub fn clear_watch(watch_id: i32) {
    geolocation::clear_watch(watch_id)
}

pub async fn open_external_urn(urn: &str) -> Result<(), String> {
    external_url::open_external_urn(urn).await
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn raw_reading_maps_coordinates_and_codes() {
        let ok: RawPositionReading =
            serde_json::from_value(json!({"longitude": 1.0, "latitude": 2.0, "accuracy": 3.0}))
                .expect("decode fix");
        assert_eq!(
            ok.into_reading(),
            Ok(PositionFix {
                longitude: 1.0,
                latitude: 2.0,
                accuracy: 3.0
            })
        );

        assert_eq!(
            RawPositionReading::failure(1).into_reading(),
            Err(SensorError::PermissionDenied)
        );
        assert_eq!(
            RawPositionReading::failure(17).into_reading(),
            Err(SensorError::SensorUnknown)
        );
        assert_eq!(
            RawPositionReading::default().into_reading(),
            Err(SensorError::SensorUnknown)
        );
    }

    #[test]
    fn pouch_failure_decodes_with_optional_status() {
        let failure: PouchFailure =
            serde_json::from_value(json!({"status": 409, "message": "Document update conflict"}))
                .expect("decode failure");
        assert_eq!(failure.status, Some(409));
        let bare: PouchFailure =
            serde_json::from_value(json!({"message": "boom"})).expect("decode bare");
        assert_eq!(bare, PouchFailure::transport("boom"));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn store_public_api_non_wasm_parity() {
        let expected = PouchFailure::transport(
            "Browser host APIs are only available when compiled for wasm32",
        );

        assert_eq!(
            block_on(store_put("db", json!({"name": "A"}))).expect_err("put should fail"),
            expected
        );
        assert_eq!(
            block_on(store_get("db", "1")).expect_err("get should fail"),
            expected
        );
        assert_eq!(
            block_on(store_remove("db", "1", "1-a")).expect_err("remove should fail"),
            expected
        );
        assert_eq!(
            block_on(store_all_docs("db", true)).expect_err("list should fail"),
            expected
        );
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn geolocation_public_api_non_wasm_parity() {
        assert!(!permissions_supported());
        assert!(!geolocation_supported());
        assert!(!observe_permission(|_| {}));
        assert_eq!(
            block_on(current_position(5_000)).into_reading(),
            Err(SensorError::SensorUnavailable)
        );

        let calls = std::rc::Rc::new(std::cell::Cell::new(0));
        let counter = calls.clone();
        assert_eq!(
            watch_position(5_000, move |_| counter.set(counter.get() + 1)),
            None
        );
        assert_eq!(calls.get(), 0);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn external_url_public_api_non_wasm_parity() {
        assert!(block_on(open_external_urn("tel:1")).is_err());
    }
}
