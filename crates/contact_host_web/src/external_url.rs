//! External URN host-service adapter (`tel:`, `sms:`, `https:` and similar).

use contact_host::{ExternalUrnFuture, ExternalUrnService};

use crate::bridge;

#[derive(Debug, Clone, Copy, Default)]
/// Browser external URN adapter backed by the bridge interop layer.
pub struct WebExternalUrnService;

impl ExternalUrnService for WebExternalUrnService {
    fn open_urn<'a>(&'a self, urn: &'a str) -> ExternalUrnFuture<'a, Result<(), String>> {
        Box::pin(async move { bridge::open_external_urn(urn).await })
    }
}
