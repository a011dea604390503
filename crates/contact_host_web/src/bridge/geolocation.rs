use super::RawPositionReading;

pub(crate) fn permissions_supported() -> bool {
    super::interop::permissions_supported()
}

pub(crate) fn geolocation_supported() -> bool {
    super::interop::geolocation_supported()
}

pub(crate) fn observe_permission(on_state: impl FnMut(Option<String>) + 'static) -> bool {
    if !permissions_supported() {
        return false;
    }
    super::interop::observe_permission(Box::new(on_state));
    true
}

pub(crate) async fn current_position(timeout_ms: u32) -> RawPositionReading {
    super::interop::current_position(timeout_ms).await
}

pub(crate) fn watch_position(
    timeout_ms: u32,
    on_reading: impl FnMut(RawPositionReading) + 'static,
) -> Option<i32> {
    super::interop::watch_position(timeout_ms, Box::new(on_reading))
}

pub(crate) fn clear_watch(watch_id: i32) {
    super::interop::clear_watch(watch_id);
}
