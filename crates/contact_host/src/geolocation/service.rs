//! Geolocation sensor service contract plus scriptable and no-op backends.

use std::{cell::RefCell, collections::VecDeque, future::Future, pin::Pin, rc::Rc};

use futures::{
    channel::{mpsc, oneshot},
    stream::{self, LocalBoxStream},
    StreamExt,
};

use super::types::{PermissionState, PositionOptions, PositionReading, SensorError};

/// Object-safe boxed future used by [`GeolocationService`] one-shot requests.
pub type GeolocationFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Long-lived stream of position readings from a continuous subscription.
pub type PositionStream = LocalBoxStream<'static, PositionReading>;

/// Stream of permission states: the current state first, then every external change.
pub type PermissionStream = LocalBoxStream<'static, PermissionState>;

/// Host sensor capability for device location.
pub trait GeolocationService {
    /// Subscribes to permission-state observation.
    ///
    /// Returns `None` when the platform cannot report permission state, in which case callers
    /// fall back to requesting positions without a pre-check.
    fn permission_states(&self) -> Option<PermissionStream>;

    /// Issues a single position request bounded by `options.timeout`.
    fn current_position<'a>(
        &'a self,
        options: PositionOptions,
    ) -> GeolocationFuture<'a, PositionReading>;

    /// Starts continuous observation. The stream ends only when the source stops.
    fn watch_position(&self, options: PositionOptions) -> PositionStream;
}

#[derive(Debug, Clone, Copy, Default)]
/// No-op sensor for hosts without location support.
pub struct NoopGeolocationService;

impl GeolocationService for NoopGeolocationService {
    fn permission_states(&self) -> Option<PermissionStream> {
        None
    }

    fn current_position<'a>(
        &'a self,
        _options: PositionOptions,
    ) -> GeolocationFuture<'a, PositionReading> {
        Box::pin(async { Err(SensorError::SensorUnavailable) })
    }

    fn watch_position(&self, _options: PositionOptions) -> PositionStream {
        stream::empty().boxed_local()
    }
}

#[derive(Debug, Default)]
struct MemoryGeolocationState {
    permission: Option<PermissionState>,
    permission_query_fails: bool,
    permission_subscribers: Vec<mpsc::UnboundedSender<PermissionState>>,
    scripted_one_shots: VecDeque<PositionReading>,
    pending_one_shots: Vec<oneshot::Sender<PositionReading>>,
    watchers: Vec<mpsc::UnboundedSender<PositionReading>>,
    one_shot_requests: Vec<PositionOptions>,
    watch_requests: Vec<PositionOptions>,
}

#[derive(Debug, Clone, Default)]
/// Scriptable in-memory sensor.
///
/// Tests drive permission changes with [`MemoryGeolocationService::set_permission`], script or
/// resolve one-shot replies, and push readings into live watch streams. Every request's options
/// are recorded for inspection. The default value has no permission observation capability.
pub struct MemoryGeolocationService {
    inner: Rc<RefCell<MemoryGeolocationState>>,
}

impl MemoryGeolocationService {
    /// Creates a sensor that supports permission observation, starting in `initial`.
    pub fn with_permission(initial: PermissionState) -> Self {
        let service = Self::default();
        service.inner.borrow_mut().permission = Some(initial);
        service
    }

    /// Creates a sensor whose permission observation exists but whose initial query fails: the
    /// returned stream ends without yielding a state.
    pub fn with_failing_permission_query() -> Self {
        let service = Self::default();
        service.inner.borrow_mut().permission_query_fails = true;
        service
    }

    /// Changes the platform permission state and notifies every observer.
    pub fn set_permission(&self, state: PermissionState) {
        let mut inner = self.inner.borrow_mut();
        inner.permission = Some(state);
        inner
            .permission_subscribers
            .retain(|tx| tx.unbounded_send(state).is_ok());
    }

    /// Queues a reply for the next one-shot request.
    pub fn script_one_shot(&self, reading: PositionReading) {
        self.inner.borrow_mut().scripted_one_shots.push_back(reading);
    }

    /// Resolves every one-shot request still waiting for a reply. Returns how many were resolved.
    pub fn resolve_pending_one_shots(&self, reading: PositionReading) -> usize {
        let pending = std::mem::take(&mut self.inner.borrow_mut().pending_one_shots);
        pending
            .into_iter()
            .filter(|tx| !tx.is_canceled())
            .map(|tx| tx.send(reading))
            .filter(Result::is_ok)
            .count()
    }

    /// Delivers a reading to every live watch stream.
    pub fn push_watch_reading(&self, reading: PositionReading) {
        self.inner
            .borrow_mut()
            .watchers
            .retain(|tx| tx.unbounded_send(reading).is_ok());
    }

    /// Ends every live watch stream, as a platform does when it stops delivering callbacks.
    pub fn close_watches(&self) {
        self.inner.borrow_mut().watchers.clear();
    }

    /// Options of every one-shot request issued so far.
    pub fn one_shot_requests(&self) -> Vec<PositionOptions> {
        self.inner.borrow().one_shot_requests.clone()
    }

    /// Options of every continuous subscription started so far.
    pub fn watch_requests(&self) -> Vec<PositionOptions> {
        self.inner.borrow().watch_requests.clone()
    }
}

impl GeolocationService for MemoryGeolocationService {
    fn permission_states(&self) -> Option<PermissionStream> {
        let mut inner = self.inner.borrow_mut();
        if inner.permission_query_fails {
            return Some(stream::empty().boxed_local());
        }
        let current = inner.permission?;
        let (tx, rx) = mpsc::unbounded();
        let _ = tx.unbounded_send(current);
        inner.permission_subscribers.push(tx);
        Some(rx.boxed_local())
    }

    fn current_position<'a>(
        &'a self,
        options: PositionOptions,
    ) -> GeolocationFuture<'a, PositionReading> {
        let mut inner = self.inner.borrow_mut();
        inner.one_shot_requests.push(options);
        if let Some(reading) = inner.scripted_one_shots.pop_front() {
            return Box::pin(async move { reading });
        }

        let (tx, rx) = oneshot::channel();
        inner.pending_one_shots.push(tx);
        Box::pin(async move { rx.await.unwrap_or(Err(SensorError::SensorUnknown)) })
    }

    fn watch_position(&self, options: PositionOptions) -> PositionStream {
        let mut inner = self.inner.borrow_mut();
        inner.watch_requests.push(options);
        let (tx, rx) = mpsc::unbounded();
        inner.watchers.push(tx);
        rx.boxed_local()
    }
}
