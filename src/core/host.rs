//! Host capabilities consumed by the widgets.
//!
//! The widgets never talk to a platform directly. They get a one-shot timer
//! service and a viewport-intersection service, and hold the returned handles
//! for as long as they need the subscription. Dropping a handle releases it.
//!
//! A handle must not be dropped from inside its own callback (browser hosts
//! keep the JS closure alive through the handle). Owners keep fired handles
//! until they are replaced or the widget is disposed.

use std::fmt;

/// Callback delivered by a host service at most once.
pub type Callback = Box<dyn FnOnce()>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// The platform has no intersection observation support.
    #[error("viewport intersection observation is unavailable")]
    ObserverUnavailable,
    /// The platform refused to schedule a timer.
    #[error("one-shot timers are unavailable")]
    TimerUnavailable,
}

/// One-shot timer service: `scheduleOnce(delayMs) -> cancel()`.
pub trait TimerService {
    fn schedule_once(&self, delay_ms: u32, callback: Callback) -> Result<TimerHandle, HostError>;
}

/// Viewport-intersection service: `observeVisibility(element, onFirstVisible) -> disconnect()`.
///
/// Implementations deliver `on_first_visible` on the first transition of
/// `target` into view and stop observing afterwards.
pub trait VisibilityService {
    type Target;

    fn observe(
        &self,
        target: &Self::Target,
        on_first_visible: Callback,
    ) -> Result<ObservationHandle, HostError>;
}

/// Releases a host resource exactly once, either explicitly or on drop.
struct Release(Option<Box<dyn FnOnce()>>);

impl Release {
    fn new(release: impl FnOnce() + 'static) -> Self {
        Self(Some(Box::new(release)))
    }

    fn noop() -> Self {
        Self(None)
    }

    fn run(&mut self) {
        if let Some(release) = self.0.take() {
            release();
        }
    }
}

impl Drop for Release {
    fn drop(&mut self) {
        self.run();
    }
}

/// Pending timer. Cancelling after the timer fired is a no-op.
pub struct TimerHandle(Release);

impl TimerHandle {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self(Release::new(cancel))
    }

    /// Handle for a timer that has nothing left to cancel.
    pub fn detached() -> Self {
        Self(Release::noop())
    }

    pub fn cancel(mut self) {
        self.0.run();
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("armed", &self.0 .0.is_some())
            .finish()
    }
}

/// Live viewport observation. Disconnecting twice is a no-op.
pub struct ObservationHandle(Release);

impl ObservationHandle {
    pub fn new(disconnect: impl FnOnce() + 'static) -> Self {
        Self(Release::new(disconnect))
    }

    pub fn detached() -> Self {
        Self(Release::noop())
    }

    pub fn disconnect(mut self) {
        self.0.run();
    }
}

impl fmt::Debug for ObservationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservationHandle")
            .field("connected", &self.0 .0.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn dropping_a_timer_handle_cancels_once() {
        let cancelled = Rc::new(Cell::new(0u32));
        let c = Rc::clone(&cancelled);
        let handle = TimerHandle::new(move || c.set(c.get() + 1));
        drop(handle);
        assert_eq!(cancelled.get(), 1);
    }

    #[test]
    fn explicit_disconnect_does_not_run_again_on_drop() {
        let disconnected = Rc::new(Cell::new(0u32));
        let d = Rc::clone(&disconnected);
        let handle = ObservationHandle::new(move || d.set(d.get() + 1));
        handle.disconnect();
        assert_eq!(disconnected.get(), 1);
    }

    #[test]
    fn detached_handles_release_nothing() {
        TimerHandle::detached().cancel();
        ObservationHandle::detached().disconnect();
    }
}
