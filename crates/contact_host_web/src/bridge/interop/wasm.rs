use super::*;
use js_sys::Promise;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_wasm_bindgen::{from_value, Serializer};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

#[wasm_bindgen(inline_js = r#"
const databases = new Map();

function database(name) {
  if (typeof PouchDB === 'undefined') {
    throw { status: 503, message: 'PouchDB is not loaded' };
  }
  let handle = databases.get(name);
  if (!handle) {
    handle = new PouchDB(name);
    databases.set(name, handle);
  }
  return handle;
}

function failure(err) {
  const status = err && typeof err.status === 'number' ? err.status : null;
  const message = err && (err.message || err.reason) ? (err.message || err.reason) : String(err);
  return { error: { status, message: String(message) } };
}

export async function jsStorePut(name, doc) {
  try {
    const handle = database(name);
    const res = doc._id ? await handle.put(doc) : await handle.post(doc);
    return { ok: { id: res.id, rev: res.rev } };
  } catch (err) {
    return failure(err);
  }
}

export async function jsStoreGet(name, id) {
  try {
    return { ok: await database(name).get(id) };
  } catch (err) {
    return failure(err);
  }
}

export async function jsStoreRemove(name, id, rev) {
  try {
    const res = await database(name).remove(id, rev);
    return { ok: { id: res.id, rev: res.rev } };
  } catch (err) {
    return failure(err);
  }
}

export async function jsStoreAllDocs(name, attachments) {
  try {
    const result = await database(name).allDocs({ include_docs: true, attachments });
    return { ok: result.rows.map((row) => row.doc) };
  } catch (err) {
    return failure(err);
  }
}

export function jsPermissionsSupported() {
  return typeof navigator !== 'undefined'
    && !!navigator.permissions
    && typeof navigator.permissions.query === 'function';
}

export function jsGeolocationSupported() {
  return typeof navigator !== 'undefined' && !!navigator.geolocation;
}

export function jsObservePermission(callback) {
  navigator.permissions.query({ name: 'geolocation' }).then((status) => {
    callback(status.state);
    status.addEventListener('change', () => callback(status.state));
  }).catch((err) => {
    console.warn('geolocation permission query failed', err);
    callback(null);
  });
}

function readingFromPosition(position) {
  const coords = position.coords;
  return { longitude: coords.longitude, latitude: coords.latitude, accuracy: coords.accuracy };
}

function readingFromError(err) {
  return { code: err && typeof err.code === 'number' ? err.code : 0 };
}

export function jsCurrentPosition(timeoutMs) {
  return new Promise((resolve) => {
    if (!jsGeolocationSupported()) {
      resolve({ code: 2 });
      return;
    }
    navigator.geolocation.getCurrentPosition(
      (position) => resolve(readingFromPosition(position)),
      (err) => resolve(readingFromError(err)),
      { timeout: timeoutMs },
    );
  });
}

export function jsWatchPosition(timeoutMs, callback) {
  if (!jsGeolocationSupported()) {
    callback({ code: 2 });
    return null;
  }
  return navigator.geolocation.watchPosition(
    (position) => callback(readingFromPosition(position)),
    (err) => callback(readingFromError(err)),
    { timeout: timeoutMs },
  );
}

export function jsClearWatch(watchId) {
  if (jsGeolocationSupported()) {
    navigator.geolocation.clearWatch(watchId);
  }
}
"#)]
extern "C" {
    #[wasm_bindgen(js_name = jsStorePut)]
    fn js_store_put(name: &str, doc: JsValue) -> Promise;
    #[wasm_bindgen(js_name = jsStoreGet)]
    fn js_store_get(name: &str, id: &str) -> Promise;
    #[wasm_bindgen(js_name = jsStoreRemove)]
    fn js_store_remove(name: &str, id: &str, rev: &str) -> Promise;
    #[wasm_bindgen(js_name = jsStoreAllDocs)]
    fn js_store_all_docs(name: &str, attachments: bool) -> Promise;

    #[wasm_bindgen(js_name = jsPermissionsSupported)]
    fn js_permissions_supported() -> bool;
    #[wasm_bindgen(js_name = jsGeolocationSupported)]
    fn js_geolocation_supported() -> bool;
    #[wasm_bindgen(js_name = jsObservePermission)]
    fn js_observe_permission(callback: &js_sys::Function);
    #[wasm_bindgen(js_name = jsCurrentPosition)]
    fn js_current_position(timeout_ms: u32) -> Promise;
    #[wasm_bindgen(js_name = jsWatchPosition)]
    fn js_watch_position(timeout_ms: u32, callback: &js_sys::Function) -> Option<i32>;
    #[wasm_bindgen(js_name = jsClearWatch)]
    fn js_clear_watch(watch_id: i32);
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum PouchReply<T> {
    Ok(T),
    Error(PouchFailure),
}

async fn await_promise(promise: Promise) -> Result<JsValue, String> {
    JsFuture::from(promise).await.map_err(js_error_to_string)
}

fn js_error_to_string(err: JsValue) -> String {
    if let Some(text) = err.as_string() {
        return text;
    }
    if let Ok(message) = js_sys::Reflect::get(&err, &JsValue::from_str("message")) {
        if let Some(text) = message.as_string() {
            return text;
        }
    }
    format!("{err:?}")
}

async fn pouch_reply<T: DeserializeOwned>(promise: Promise) -> Result<T, PouchFailure> {
    let value = await_promise(promise)
        .await
        .map_err(PouchFailure::transport)?;
    let reply: PouchReply<T> =
        from_value(value).map_err(|e| PouchFailure::transport(e.to_string()))?;
    match reply {
        PouchReply::Ok(value) => Ok(value),
        PouchReply::Error(failure) => Err(failure),
    }
}

pub async fn store_put(database: &str, doc: Value) -> Result<WriteReceipt, PouchFailure> {
    let value = doc
        .serialize(&Serializer::json_compatible())
        .map_err(|e| PouchFailure::transport(e.to_string()))?;
    pouch_reply(js_store_put(database, value)).await
}

pub async fn store_get(database: &str, id: &str) -> Result<ContactDocument, PouchFailure> {
    pouch_reply(js_store_get(database, id)).await
}

pub async fn store_remove(
    database: &str,
    id: &str,
    rev: &str,
) -> Result<WriteReceipt, PouchFailure> {
    pouch_reply(js_store_remove(database, id, rev)).await
}

pub async fn store_all_docs(
    database: &str,
    include_attachments: bool,
) -> Result<Vec<ContactDocument>, PouchFailure> {
    pouch_reply(js_store_all_docs(database, include_attachments)).await
}

pub fn permissions_supported() -> bool {
    js_permissions_supported()
}

pub fn geolocation_supported() -> bool {
    js_geolocation_supported()
}

pub fn observe_permission(mut on_state: PermissionCallback) {
    let callback = Closure::<dyn FnMut(JsValue)>::new(move |state: JsValue| {
        on_state(state.as_string());
    });
    js_observe_permission(callback.as_ref().unchecked_ref());
    // The permission status object outlives this call and keeps invoking the callback.
    callback.forget();
}

fn decode_reading(value: JsValue) -> RawPositionReading {
    from_value(value).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "undecodable position reading");
        RawPositionReading::default()
    })
}

pub async fn current_position(timeout_ms: u32) -> RawPositionReading {
    match await_promise(js_current_position(timeout_ms)).await {
        Ok(value) => decode_reading(value),
        Err(err) => {
            tracing::warn!(error = %err, "current position request failed");
            RawPositionReading::default()
        }
    }
}

pub fn watch_position(timeout_ms: u32, mut on_reading: ReadingCallback) -> Option<i32> {
    let callback = Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
        on_reading(decode_reading(value));
    });
    let watch_id = js_watch_position(timeout_ms, callback.as_ref().unchecked_ref());
    callback.forget();
    watch_id
}

pub fn clear_watch(watch_id: i32) {
    js_clear_watch(watch_id);
}

pub async fn open_external_urn(urn: &str) -> Result<(), String> {
    let window = web_sys::window().ok_or_else(|| "window is unavailable".to_string())?;
    window
        .open_with_url_and_target(urn, "_blank")
        .map(|_| ())
        .map_err(js_error_to_string)
}
