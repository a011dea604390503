use super::*;

/// `PositionError.POSITION_UNAVAILABLE`.
const POSITION_UNAVAILABLE: i32 = 2;

fn unsupported() -> String {
    "Browser host APIs are only available when compiled for wasm32".to_string()
}

pub async fn store_put(_database: &str, _doc: Value) -> Result<WriteReceipt, PouchFailure> {
    Err(PouchFailure::transport(unsupported()))
}

pub async fn store_get(_database: &str, _id: &str) -> Result<ContactDocument, PouchFailure> {
    Err(PouchFailure::transport(unsupported()))
}

pub async fn store_remove(
    _database: &str,
    _id: &str,
    _rev: &str,
) -> Result<WriteReceipt, PouchFailure> {
    Err(PouchFailure::transport(unsupported()))
}

pub async fn store_all_docs(
    _database: &str,
    _include_attachments: bool,
) -> Result<Vec<ContactDocument>, PouchFailure> {
    Err(PouchFailure::transport(unsupported()))
}

pub fn permissions_supported() -> bool {
    false
}

pub fn geolocation_supported() -> bool {
    false
}

pub fn observe_permission(_on_state: PermissionCallback) {}

pub async fn current_position(_timeout_ms: u32) -> RawPositionReading {
    RawPositionReading::failure(POSITION_UNAVAILABLE)
}

pub fn watch_position(_timeout_ms: u32, _on_reading: ReadingCallback) -> Option<i32> {
    None
}

pub fn clear_watch(_watch_id: i32) {}

pub async fn open_external_urn(_urn: &str) -> Result<(), String> {
    Err(unsupported())
}
