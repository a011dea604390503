//! Browser entry point for the contact/location utility.
//!
//! JS instantiates [`ContactHost`] with the flags object and the outbound port callback, then
//! forwards every UI command through `ContactHost::send`. Everything below the entry point is
//! wired by `contact_runtime::HostRuntime::boot`.

mod console;
#[cfg(target_arch = "wasm32")]
mod entry;
#[cfg(target_arch = "wasm32")]
mod ports;

#[cfg(target_arch = "wasm32")]
pub use entry::ContactHost;
