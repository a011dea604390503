use std::rc::Rc;

use contact_runtime::{HostRuntime, NoopFailureJournal, RuntimeConfig};
use serde_json::Value;
use wasm_bindgen::prelude::*;

use crate::ports::{PortEventSink, WasmSpawner};

/// JS-facing handle owning the booted host runtime.
#[wasm_bindgen]
pub struct ContactHost {
    runtime: HostRuntime,
}

#[wasm_bindgen]
impl ContactHost {
    /// Boots the runtime. `send` receives every outbound `{ tag, data }` event.
    #[wasm_bindgen(constructor)]
    pub fn new(flags: JsValue, send: js_sys::Function) -> ContactHost {
        console_error_panic_hook::set_once();
        crate::console::init_tracing();

        let config = RuntimeConfig::from_flags(decode_flags(flags));
        let services = contact_host_web::build_host_services(&config.database_name);
        let runtime = HostRuntime::boot(
            services,
            Rc::new(PortEventSink::new(send)),
            Rc::new(NoopFailureJournal),
            Rc::new(WasmSpawner),
            config,
        );
        Self { runtime }
    }

    /// Forwards one `{ tag, data }` command from the UI.
    pub fn send(&self, command: JsValue) {
        // Undecodable values still go through the bridge so the failure is logged in one place.
        let envelope = serde_wasm_bindgen::from_value::<Value>(command).unwrap_or(Value::Null);
        self.runtime.submit_json(envelope);
    }

    /// Returns the compile-time selected host strategy token.
    #[wasm_bindgen(js_name = hostStrategy)]
    pub fn host_strategy(&self) -> String {
        self.runtime.services().host_strategy.as_str().to_string()
    }
}

fn decode_flags(flags: JsValue) -> Option<Value> {
    if flags.is_undefined() || flags.is_null() {
        return None;
    }
    match serde_wasm_bindgen::from_value(flags) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(error = %err, "ignoring unreadable host flags");
            None
        }
    }
}
