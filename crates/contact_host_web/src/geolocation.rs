//! `navigator.geolocation` sensor adapter.
//!
//! Permission changes and watch readings arrive through JS callbacks; each callback feeds an
//! unbounded channel whose receiving half is handed to the runtime as a stream. A failed
//! permission query closes its channel, and dropping a watch stream clears the platform watch.

use std::{
    pin::Pin,
    task::{Context, Poll},
};

use contact_host::{
    GeolocationFuture, GeolocationService, PermissionState, PermissionStream, PositionOptions,
    PositionReading, PositionStream,
};
use futures::{channel::mpsc, Stream, StreamExt};

use crate::bridge;

#[derive(Debug, Clone, Copy, Default)]
/// Browser location sensor backed by the Permissions and Geolocation APIs.
pub struct WebGeolocationService;

impl WebGeolocationService {
    /// Returns whether the page can observe the geolocation permission state.
    pub fn permission_observation_supported() -> bool {
        bridge::permissions_supported()
    }

    /// Returns whether `navigator.geolocation` exists.
    pub fn sensor_supported() -> bool {
        bridge::geolocation_supported()
    }
}

fn timeout_ms(options: PositionOptions) -> u32 {
    u32::try_from(options.timeout.as_millis()).unwrap_or(u32::MAX)
}

/// Forwards one permission callback. `None` means the query failed and ends the stream.
fn forward_permission(
    sender: &mut Option<mpsc::UnboundedSender<PermissionState>>,
    token: Option<String>,
) {
    let Some(token) = token else {
        tracing::warn!("geolocation permission query failed, closing permission stream");
        *sender = None;
        return;
    };
    match (PermissionState::parse(&token), sender.as_ref()) {
        (Some(state), Some(tx)) => {
            let _ = tx.unbounded_send(state);
        }
        (None, _) => tracing::warn!(token = %token, "unrecognized geolocation permission state"),
        (Some(_), None) => {}
    }
}

/// Watch readings that clear the platform watch when dropped.
struct WatchStream {
    readings: mpsc::UnboundedReceiver<PositionReading>,
    watch_id: Option<i32>,
}

impl Stream for WatchStream {
    type Item = PositionReading;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.readings.poll_next_unpin(cx)
    }
}

impl Drop for WatchStream {
    fn drop(&mut self) {
        if let Some(watch_id) = self.watch_id.take() {
            bridge::clear_watch(watch_id);
        }
    }
}

impl GeolocationService for WebGeolocationService {
    fn permission_states(&self) -> Option<PermissionStream> {
        let (tx, rx) = mpsc::unbounded();
        let mut sender = Some(tx);
        let observing =
            bridge::observe_permission(move |token| forward_permission(&mut sender, token));
        observing.then(|| rx.boxed_local())
    }

    fn current_position<'a>(
        &'a self,
        options: PositionOptions,
    ) -> GeolocationFuture<'a, PositionReading> {
        Box::pin(async move {
            bridge::current_position(timeout_ms(options))
                .await
                .into_reading()
        })
    }

    fn watch_position(&self, options: PositionOptions) -> PositionStream {
        let (tx, rx) = mpsc::unbounded();
        let watch_id = bridge::watch_position(timeout_ms(options), move |raw| {
            let _ = tx.unbounded_send(raw.into_reading());
        });
        WatchStream {
            readings: rx,
            watch_id,
        }
        .boxed_local()
    }
}
