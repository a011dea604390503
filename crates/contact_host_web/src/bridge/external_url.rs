pub(crate) async fn open_external_urn(urn: &str) -> Result<(), String> {
    super::interop::open_external_urn(urn).await
}
