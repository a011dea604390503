//! Geolocation permission state machine and sensor monitor.
//!
//! The monitor subscribes to permission observation once. Each newly entered state is announced
//! with `GeoLocationPermissionChanged` and then drives the sensor:
//!
//! | entered   | sensor action                  |
//! |-----------|--------------------------------|
//! | `granted` | start continuous observation   |
//! | `prompt`  | one one-shot request           |
//! | `denied`  | none                           |
//!
//! Entering `denied`, or a `permission_denied` reading, ends the live subscription because the
//! platform stops delivering callbacks to it; the next `granted` subscribes again.
//!
//! Hosts without permission observation, or whose permission query ends before reporting a
//! state, get one one-shot request and one continuous subscription, without any permission
//! event.

use std::{cell::RefCell, future::Future, rc::Rc};

use contact_host::{
    EventSink, GeolocationService, HostEvent, PermissionState, PositionOptions, PositionReading,
    PositionSample, SensorError,
};
use futures::{
    stream::{self, AbortHandle},
    task::{LocalSpawn, LocalSpawnExt},
    StreamExt,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Sensor action triggered by entering a permission state.
pub enum SensorAction {
    /// Begin continuous observation.
    StartWatch,
    /// Issue a single position request.
    RequestOnce,
    /// Leave the sensor alone.
    Idle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Permission state machine: `Unknown → {Prompt, Granted, Denied}`, any state to any other.
pub struct PermissionTracker {
    current: Option<PermissionState>,
}

impl PermissionTracker {
    /// Returns the current state, `None` while still unknown.
    pub const fn current(&self) -> Option<PermissionState> {
        self.current
    }

    /// Applies an observed state.
    ///
    /// Returns the action for a real transition and `None` when `next` is already current.
    pub fn enter(&mut self, next: PermissionState) -> Option<SensorAction> {
        if self.current == Some(next) {
            return None;
        }
        self.current = Some(next);
        Some(match next {
            PermissionState::Granted => SensorAction::StartWatch,
            PermissionState::Prompt => SensorAction::RequestOnce,
            PermissionState::Denied => SensorAction::Idle,
        })
    }
}

#[derive(Debug)]
struct LiveWatch {
    id: u64,
    abort: AbortHandle,
}

#[derive(Debug, Default)]
struct MonitorState {
    tracker: PermissionTracker,
    watch: Option<LiveWatch>,
    watches_started: u64,
}

#[derive(Clone)]
/// Drives the sensor from permission changes and publishes readings as events.
pub struct GeolocationMonitor {
    sensor: Rc<dyn GeolocationService>,
    events: Rc<dyn EventSink>,
    spawner: Rc<dyn LocalSpawn>,
    options: PositionOptions,
    state: Rc<RefCell<MonitorState>>,
}

impl GeolocationMonitor {
    /// Creates an idle monitor.
    pub fn new(
        sensor: Rc<dyn GeolocationService>,
        events: Rc<dyn EventSink>,
        spawner: Rc<dyn LocalSpawn>,
        options: PositionOptions,
    ) -> Self {
        Self {
            sensor,
            events,
            spawner,
            options,
            state: Rc::new(RefCell::new(MonitorState::default())),
        }
    }

    /// Spawns [`GeolocationMonitor::run`] on the local task spawner.
    pub fn start(&self) {
        let monitor = self.clone();
        self.spawn("permission observation", async move { monitor.run().await });
    }

    /// Observes permission changes for the lifetime of the platform subscription.
    pub async fn run(self) {
        let Some(mut states) = self.sensor.permission_states() else {
            tracing::info!("permission observation unavailable, requesting position unconditionally");
            self.request_unconditionally();
            return;
        };

        let mut observed = false;
        while let Some(state) = states.next().await {
            observed = true;
            self.on_permission(state);
        }
        if observed {
            tracing::debug!("permission observation ended");
        } else {
            tracing::warn!("permission query ended without a state, requesting position unconditionally");
            self.request_unconditionally();
        }
    }

    /// Returns the last permission state entered, `None` while unknown.
    pub fn permission(&self) -> Option<PermissionState> {
        self.state.borrow().tracker.current()
    }

    /// Returns whether a continuous subscription is currently delivering readings.
    pub fn is_watching(&self) -> bool {
        self.state.borrow().watch.is_some()
    }

    /// Applies one observed permission state.
    pub fn on_permission(&self, state: PermissionState) {
        let action = self.state.borrow_mut().tracker.enter(state);
        let Some(action) = action else {
            return;
        };

        tracing::info!(permission = state.as_str(), "geolocation permission changed");
        self.events.emit(HostEvent::permission_changed(state));
        match action {
            SensorAction::StartWatch => self.start_watch(),
            SensorAction::RequestOnce => self.request_once(),
            SensorAction::Idle => self.stop_watch(),
        }
    }

    /// Emits a `PositionUpdated` event for one reading.
    pub fn publish(&self, reading: PositionReading) {
        if let Err(err) = &reading {
            tracing::debug!(error_code = err.code().as_str(), "position request failed");
        }
        self.events
            .emit(HostEvent::PositionUpdated(PositionSample::from_reading(reading)));
    }

    fn request_unconditionally(&self) {
        self.request_once();
        self.start_watch();
    }

    fn request_once(&self) {
        let monitor = self.clone();
        self.spawn("one-shot position request", async move {
            let reading = monitor.sensor.current_position(monitor.options).await;
            monitor.publish(reading);
        });
    }

    fn start_watch(&self) {
        let (mut readings, id) = {
            let mut state = self.state.borrow_mut();
            if state.watch.is_some() {
                return;
            }
            state.watches_started += 1;
            let id = state.watches_started;
            let (readings, abort) = stream::abortable(self.sensor.watch_position(self.options));
            state.watch = Some(LiveWatch { id, abort });
            (readings, id)
        };

        let monitor = self.clone();
        self.spawn("position observation", async move {
            while let Some(reading) = readings.next().await {
                let denied = reading == Err(SensorError::PermissionDenied);
                monitor.publish(reading);
                if denied {
                    break;
                }
            }
            drop(readings);
            let mut state = monitor.state.borrow_mut();
            if state.watch.as_ref().is_some_and(|watch| watch.id == id) {
                state.watch = None;
            }
            tracing::debug!("position observation ended");
        });
    }

    fn stop_watch(&self) {
        let watch = self.state.borrow_mut().watch.take();
        if let Some(watch) = watch {
            watch.abort.abort();
        }
    }

    fn spawn(&self, task: &'static str, future: impl Future<Output = ()> + 'static) {
        if let Err(err) = self.spawner.spawn_local(future) {
            tracing::error!(task, error = %err, "failed to spawn geolocation task");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use contact_host::{
        MemoryEventSink, MemoryGeolocationService, PermissionChange, PositionFix, SensorError,
        SensorErrorCode,
    };
    use futures::executor::LocalPool;
    use pretty_assertions::assert_eq;

    use super::*;

    const FIX: PositionFix = PositionFix {
        longitude: 13.4,
        latitude: 52.5,
        accuracy: 12.0,
    };

    struct Harness {
        monitor: GeolocationMonitor,
        sensor: MemoryGeolocationService,
        events: MemoryEventSink,
        pool: LocalPool,
    }

    fn harness(sensor: MemoryGeolocationService) -> Harness {
        let events = MemoryEventSink::default();
        let pool = LocalPool::new();
        let monitor = GeolocationMonitor::new(
            Rc::new(sensor.clone()),
            Rc::new(events.clone()),
            Rc::new(pool.spawner()),
            PositionOptions::default(),
        );
        Harness {
            monitor,
            sensor,
            events,
            pool,
        }
    }

    fn permission_events(events: &[HostEvent]) -> Vec<PermissionState> {
        events
            .iter()
            .filter_map(|event| match event {
                HostEvent::GeoLocationPermissionChanged(PermissionChange { permission }) => {
                    Some(*permission)
                }
                _ => None,
            })
            .collect()
    }

    fn position_events(events: &[HostEvent]) -> Vec<PositionSample> {
        events
            .iter()
            .filter_map(|event| match event {
                HostEvent::PositionUpdated(sample) => Some(*sample),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn tracker_reports_action_per_state_and_ignores_repeats() {
        let mut tracker = PermissionTracker::default();
        assert_eq!(tracker.current(), None);
        assert_eq!(
            tracker.enter(PermissionState::Prompt),
            Some(SensorAction::RequestOnce)
        );
        assert_eq!(tracker.enter(PermissionState::Prompt), None);
        assert_eq!(
            tracker.enter(PermissionState::Granted),
            Some(SensorAction::StartWatch)
        );
        assert_eq!(tracker.enter(PermissionState::Denied), Some(SensorAction::Idle));
        assert_eq!(tracker.current(), Some(PermissionState::Denied));
    }

    #[test]
    fn granted_emits_one_event_then_subscribes() {
        let mut h = harness(MemoryGeolocationService::with_permission(
            PermissionState::Granted,
        ));
        h.monitor.start();
        h.pool.run_until_stalled();

        assert_eq!(
            h.events.events(),
            vec![HostEvent::permission_changed(PermissionState::Granted)]
        );
        assert_eq!(h.sensor.watch_requests(), vec![PositionOptions::default()]);
        assert!(h.sensor.one_shot_requests().is_empty());
        assert!(h.monitor.is_watching());

        h.sensor.push_watch_reading(Ok(FIX));
        h.pool.run_until_stalled();
        assert_eq!(
            position_events(&h.events.events()),
            vec![PositionSample::from_reading(Ok(FIX))]
        );
    }

    #[test]
    fn prompt_emits_one_event_then_requests_once() {
        let mut h = harness(MemoryGeolocationService::with_permission(
            PermissionState::Prompt,
        ));
        h.monitor.start();
        h.pool.run_until_stalled();

        assert_eq!(
            permission_events(&h.events.events()),
            vec![PermissionState::Prompt]
        );
        assert_eq!(h.sensor.one_shot_requests().len(), 1);
        assert!(h.sensor.watch_requests().is_empty());
    }

    #[test]
    fn denied_emits_one_event_and_touches_no_sensor() {
        let mut h = harness(MemoryGeolocationService::with_permission(
            PermissionState::Denied,
        ));
        h.monitor.start();
        h.pool.run_until_stalled();

        assert_eq!(
            h.events.events(),
            vec![HostEvent::permission_changed(PermissionState::Denied)]
        );
        assert!(h.sensor.one_shot_requests().is_empty());
        assert!(h.sensor.watch_requests().is_empty());
    }

    #[test]
    fn prompt_one_shot_timeout_surfaces_as_timeout_error() {
        let mut h = harness(MemoryGeolocationService::with_permission(
            PermissionState::Prompt,
        ));
        h.monitor.start();
        h.pool.run_until_stalled();

        assert_eq!(
            h.sensor.one_shot_requests(),
            vec![PositionOptions {
                timeout: Duration::from_secs(5)
            }]
        );
        h.sensor
            .resolve_pending_one_shots(Err(SensorError::SensorTimeout));
        h.pool.run_until_stalled();

        assert_eq!(
            position_events(&h.events.events()),
            vec![PositionSample {
                error: Some(SensorErrorCode::Timeout),
                ..PositionSample::default()
            }]
        );
    }

    #[test]
    fn prompt_dialog_outcome_advances_state_machine() {
        let mut h = harness(MemoryGeolocationService::with_permission(
            PermissionState::Prompt,
        ));
        h.monitor.start();
        h.pool.run_until_stalled();

        h.sensor.set_permission(PermissionState::Granted);
        h.sensor.resolve_pending_one_shots(Ok(FIX));
        h.pool.run_until_stalled();

        assert_eq!(
            permission_events(&h.events.events()),
            vec![PermissionState::Prompt, PermissionState::Granted]
        );
        assert_eq!(h.monitor.permission(), Some(PermissionState::Granted));
        assert_eq!(h.sensor.watch_requests().len(), 1);
        assert_eq!(position_events(&h.events.events()).len(), 1);
    }

    #[test]
    fn regrant_after_revocation_subscribes_again() {
        let mut h = harness(MemoryGeolocationService::with_permission(
            PermissionState::Granted,
        ));
        h.monitor.start();
        h.pool.run_until_stalled();

        h.sensor.set_permission(PermissionState::Denied);
        h.pool.run_until_stalled();
        assert!(!h.monitor.is_watching());
        h.sensor.push_watch_reading(Err(SensorError::PermissionDenied));
        h.sensor.set_permission(PermissionState::Granted);
        h.pool.run_until_stalled();

        assert_eq!(
            permission_events(&h.events.events()),
            vec![
                PermissionState::Granted,
                PermissionState::Denied,
                PermissionState::Granted
            ]
        );
        assert_eq!(h.sensor.watch_requests().len(), 2);
        assert!(h.monitor.is_watching());
        assert!(position_events(&h.events.events()).is_empty());

        h.sensor.push_watch_reading(Ok(FIX));
        h.pool.run_until_stalled();
        assert_eq!(
            position_events(&h.events.events()),
            vec![PositionSample::from_reading(Ok(FIX))]
        );
    }

    #[test]
    fn permission_denied_reading_ends_the_subscription() {
        let mut h = harness(MemoryGeolocationService::with_permission(
            PermissionState::Granted,
        ));
        h.monitor.start();
        h.pool.run_until_stalled();

        h.sensor.push_watch_reading(Err(SensorError::PermissionDenied));
        h.pool.run_until_stalled();
        assert!(!h.monitor.is_watching());
        assert_eq!(
            position_events(&h.events.events()),
            vec![PositionSample::from_reading(Err(SensorError::PermissionDenied))]
        );

        h.sensor.set_permission(PermissionState::Denied);
        h.sensor.set_permission(PermissionState::Granted);
        h.pool.run_until_stalled();
        assert_eq!(h.sensor.watch_requests().len(), 2);
        assert!(h.monitor.is_watching());
    }

    #[test]
    fn ended_subscription_is_restarted_on_next_grant() {
        let mut h = harness(MemoryGeolocationService::with_permission(
            PermissionState::Granted,
        ));
        h.monitor.start();
        h.pool.run_until_stalled();

        h.sensor.close_watches();
        h.pool.run_until_stalled();
        assert!(!h.monitor.is_watching());

        h.sensor.set_permission(PermissionState::Prompt);
        h.pool.run_until_stalled();
        assert_eq!(h.sensor.watch_requests().len(), 1);

        h.sensor.set_permission(PermissionState::Granted);
        h.pool.run_until_stalled();
        assert_eq!(h.sensor.watch_requests().len(), 2);
        assert!(h.monitor.is_watching());
    }

    #[test]
    fn repeated_state_reports_emit_nothing() {
        let mut h = harness(MemoryGeolocationService::with_permission(
            PermissionState::Denied,
        ));
        h.monitor.start();
        h.pool.run_until_stalled();
        h.sensor.set_permission(PermissionState::Denied);
        h.pool.run_until_stalled();

        assert_eq!(h.events.events().len(), 1);
    }

    #[test]
    fn watch_errors_are_surfaced_never_swallowed() {
        let mut h = harness(MemoryGeolocationService::with_permission(
            PermissionState::Granted,
        ));
        h.monitor.start();
        h.pool.run_until_stalled();

        h.sensor.push_watch_reading(Err(SensorError::PermissionDenied));
        h.sensor.push_watch_reading(Err(SensorError::SensorUnavailable));
        h.sensor.push_watch_reading(Err(SensorError::SensorUnknown));
        h.pool.run_until_stalled();

        let codes = position_events(&h.events.events())
            .into_iter()
            .map(|sample| sample.error)
            .collect::<Vec<_>>();
        assert_eq!(
            codes,
            vec![
                Some(SensorErrorCode::PermissionDenied),
                Some(SensorErrorCode::PositionUnavailable),
                Some(SensorErrorCode::Unknown),
            ]
        );
    }

    // The fallback's behavior on platforms that block unconditional position requests is not
    // established; this only pins the request pattern.
    #[test]
    fn missing_permission_observation_falls_back_to_unconditional_requests() {
        let mut h = harness(MemoryGeolocationService::default());
        h.monitor.start();
        h.pool.run_until_stalled();

        assert_eq!(h.sensor.one_shot_requests().len(), 1);
        assert_eq!(h.sensor.watch_requests().len(), 1);
        assert!(permission_events(&h.events.events()).is_empty());
        assert_eq!(h.monitor.permission(), None);

        h.sensor.resolve_pending_one_shots(Ok(FIX));
        h.pool.run_until_stalled();
        assert_eq!(position_events(&h.events.events()).len(), 1);
    }

    #[test]
    fn failed_permission_query_falls_back_to_unconditional_requests() {
        let mut h = harness(MemoryGeolocationService::with_failing_permission_query());
        h.monitor.start();
        h.pool.run_until_stalled();

        assert_eq!(h.sensor.one_shot_requests().len(), 1);
        assert_eq!(h.sensor.watch_requests().len(), 1);
        assert!(h.events.events().is_empty());
        assert_eq!(h.monitor.permission(), None);
        assert!(h.monitor.is_watching());
    }
}
