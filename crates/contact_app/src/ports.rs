//! Outbound UI port and task spawner for the browser event loop.

use contact_host::{EventSink, HostEvent};
use futures::future::LocalFutureObj;
use futures::task::{LocalSpawn, SpawnError};
use serde::Serialize;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::JsValue;

/// Event sink that forwards each host event to the JS port callback as a plain object.
pub(crate) struct PortEventSink {
    send: js_sys::Function,
}

impl PortEventSink {
    pub(crate) fn new(send: js_sys::Function) -> Self {
        Self { send }
    }
}

impl EventSink for PortEventSink {
    fn emit(&self, event: HostEvent) {
        let tag = event.tag();
        let payload = match event.serialize(&Serializer::json_compatible()) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(event = tag, error = %err, "event encoding failed");
                return;
            }
        };
        if let Err(err) = self.send.call1(&JsValue::NULL, &payload) {
            tracing::warn!(event = tag, error = ?err, "event port rejected message");
        }
    }
}

/// Spawns runtime tasks onto the browser microtask queue.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct WasmSpawner;

impl LocalSpawn for WasmSpawner {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        wasm_bindgen_futures::spawn_local(future);
        Ok(())
    }
}
