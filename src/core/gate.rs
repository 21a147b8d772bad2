//! Delayed, visibility-gated content reveal.
//!
//! Content is revealed only once a delay has elapsed since mount *and* the
//! hosting element has been seen in the viewport. Both signals are monotone
//! latches, so the order in which they arrive does not matter.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::host::{ObservationHandle, TimerHandle, TimerService, VisibilityService};

/// Default reveal delay of the lazy content widget.
pub const DEFAULT_DELAY_MS: u32 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GateState {
    #[default]
    Waiting,
    TimeOnly,
    ViewOnly,
    Ready,
}

impl GateState {
    pub fn label(self) -> &'static str {
        match self {
            GateState::Waiting => "waiting",
            GateState::TimeOnly => "time-only",
            GateState::ViewOnly => "view-only",
            GateState::Ready => "ready",
        }
    }

    pub fn is_ready(self) -> bool {
        self == GateState::Ready
    }
}

/// The two-latch state machine, free of any host wiring.
#[derive(Debug, Clone, Default)]
pub struct VisibilityGate {
    elapsed_ready: bool,
    viewport_visible: bool,
    disposed: bool,
}

impl VisibilityGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GateState {
        match (self.elapsed_ready, self.viewport_visible) {
            (false, false) => GateState::Waiting,
            (true, false) => GateState::TimeOnly,
            (false, true) => GateState::ViewOnly,
            (true, true) => GateState::Ready,
        }
    }

    pub fn elapsed_ready(&self) -> bool {
        self.elapsed_ready
    }

    pub fn viewport_visible(&self) -> bool {
        self.viewport_visible
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Latch the timer signal. Returns true if the state changed.
    pub fn mark_elapsed(&mut self) -> bool {
        if self.disposed || self.elapsed_ready {
            return false;
        }
        self.elapsed_ready = true;
        true
    }

    /// Latch the viewport signal. Returns true if the state changed.
    pub fn mark_visible(&mut self) -> bool {
        if self.disposed || self.viewport_visible {
            return false;
        }
        self.viewport_visible = true;
        true
    }

    pub fn dispose(&mut self) {
        self.disposed = true;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoaderConfig {
    pub delay_ms: u32,
    pub content: String,
    pub show_placeholder: bool,
}

impl LoaderConfig {
    pub fn new(delay_ms: u32, content: impl Into<String>) -> Self {
        Self {
            delay_ms,
            content: content.into(),
            show_placeholder: true,
        }
    }

    pub fn without_placeholder(mut self) -> Self {
        self.show_placeholder = false;
        self
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY_MS, String::new())
    }
}

/// What the widget renders right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderView {
    Placeholder,
    Hidden,
    Content(String),
}

type StateListener = Box<dyn FnMut(GateState)>;

struct LoaderCell {
    gate: VisibilityGate,
    config: LoaderConfig,
    timer: Option<TimerHandle>,
    observation: Option<ObservationHandle>,
    listener: Option<StateListener>,
}

/// A mounted lazy-content widget.
///
/// Created by [`DelayedVisibilityLoader::initialize`]; released by
/// [`DelayedVisibilityLoader::dispose`] or on drop. Host callbacks only hold
/// weak references, so nothing fires into a released loader.
pub struct DelayedVisibilityLoader {
    cell: Rc<RefCell<LoaderCell>>,
}

impl DelayedVisibilityLoader {
    pub fn initialize<T, V>(config: LoaderConfig, timers: &T, viewport: &V, target: &V::Target) -> Self
    where
        T: TimerService,
        V: VisibilityService,
    {
        let delay_ms = config.delay_ms;
        let cell = Rc::new(RefCell::new(LoaderCell {
            gate: VisibilityGate::new(),
            config,
            timer: None,
            observation: None,
            listener: None,
        }));

        let weak = Rc::downgrade(&cell);
        match timers.schedule_once(delay_ms, Box::new(move || latch(&weak, Latch::Elapsed))) {
            Ok(handle) => cell.borrow_mut().timer = Some(handle),
            Err(e) => {
                warn!("lazy content: {e}; revealing without delay");
                cell.borrow_mut().gate.mark_elapsed();
            }
        }

        let weak = Rc::downgrade(&cell);
        match viewport.observe(target, Box::new(move || latch(&weak, Latch::Visible))) {
            Ok(handle) => cell.borrow_mut().observation = Some(handle),
            Err(e) => {
                warn!("lazy content: {e}; treating element as visible");
                cell.borrow_mut().gate.mark_visible();
            }
        }

        debug!(delay_ms, state = cell.borrow().gate.state().label(), "lazy content mounted");
        Self { cell }
    }

    pub fn state(&self) -> GateState {
        self.cell.borrow().gate.state()
    }

    pub fn is_disposed(&self) -> bool {
        self.cell.borrow().gate.is_disposed()
    }

    pub fn view(&self) -> LoaderView {
        let cell = self.cell.borrow();
        if cell.gate.state().is_ready() {
            LoaderView::Content(cell.config.content.clone())
        } else if cell.config.show_placeholder {
            LoaderView::Placeholder
        } else {
            LoaderView::Hidden
        }
    }

    /// Register the callback run after each state transition. Replaces any
    /// previous listener.
    pub fn on_change(&mut self, listener: impl FnMut(GateState) + 'static) {
        self.cell.borrow_mut().listener = Some(Box::new(listener));
    }

    /// Cancel the pending timer and disconnect the observer. Idempotent.
    pub fn dispose(&mut self) {
        let (timer, observation) = {
            let mut cell = self.cell.borrow_mut();
            if cell.gate.is_disposed() {
                return;
            }
            cell.gate.dispose();
            cell.listener = None;
            (cell.timer.take(), cell.observation.take())
        };
        if let Some(timer) = timer {
            timer.cancel();
        }
        if let Some(observation) = observation {
            observation.disconnect();
        }
        debug!("lazy content disposed");
    }
}

impl Drop for DelayedVisibilityLoader {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[derive(Clone, Copy)]
enum Latch {
    Elapsed,
    Visible,
}

fn latch(weak: &Weak<RefCell<LoaderCell>>, which: Latch) {
    let Some(cell) = weak.upgrade() else {
        return;
    };

    let (state, listener) = {
        let mut c = cell.borrow_mut();
        let changed = match which {
            Latch::Elapsed => c.gate.mark_elapsed(),
            Latch::Visible => c.gate.mark_visible(),
        };
        if !changed {
            return;
        }
        (c.gate.state(), c.listener.take())
    };

    debug!(state = state.label(), "lazy content transition");

    // The listener runs without the cell borrowed so it may read the loader.
    if let Some(mut listener) = listener {
        listener(state);
        let mut c = cell.borrow_mut();
        if c.listener.is_none() && !c.gate.is_disposed() {
            c.listener = Some(listener);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::VirtualHost;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn mount(host: &VirtualHost, delay_ms: u32) -> (DelayedVisibilityLoader, crate::sim::TargetId) {
        let target = host.element();
        let loader =
            DelayedVisibilityLoader::initialize(LoaderConfig::new(delay_ms, "X"), host, host, &target);
        (loader, target)
    }

    #[test]
    fn gate_transitions_follow_both_latches() {
        let mut g = VisibilityGate::new();
        assert_eq!(g.state(), GateState::Waiting);
        assert!(g.mark_elapsed());
        assert_eq!(g.state(), GateState::TimeOnly);
        assert!(!g.mark_elapsed());
        assert!(g.mark_visible());
        assert_eq!(g.state(), GateState::Ready);

        let mut g = VisibilityGate::new();
        assert!(g.mark_visible());
        assert_eq!(g.state(), GateState::ViewOnly);
        assert!(g.mark_elapsed());
        assert_eq!(g.state(), GateState::Ready);
    }

    #[test]
    fn disposed_gate_ignores_events() {
        let mut g = VisibilityGate::new();
        g.dispose();
        assert!(!g.mark_elapsed());
        assert!(!g.mark_visible());
        assert_eq!(g.state(), GateState::Waiting);
    }

    #[test]
    fn ready_regardless_of_event_order() {
        // timer first
        let host = VirtualHost::new();
        let (loader, target) = mount(&host, 500);
        host.advance(500);
        assert_eq!(loader.state(), GateState::TimeOnly);
        host.scroll_into_view(target);
        assert_eq!(loader.state(), GateState::Ready);

        // visibility first
        let host = VirtualHost::new();
        let (loader, target) = mount(&host, 500);
        host.scroll_into_view(target);
        assert_eq!(loader.state(), GateState::ViewOnly);
        host.advance(500);
        assert_eq!(loader.state(), GateState::Ready);

        // both at the same instant (already visible when mounted)
        let host = VirtualHost::new();
        let target = host.element();
        host.scroll_into_view(target);
        let loader =
            DelayedVisibilityLoader::initialize(LoaderConfig::new(0, "X"), &host, &host, &target);
        host.advance(0);
        assert_eq!(loader.state(), GateState::Ready);
    }

    #[test]
    fn lazy_scenario_reveals_content_at_three_seconds() {
        let host = VirtualHost::new();
        let (loader, target) = mount(&host, 3000);

        host.advance(2900);
        host.scroll_into_view(target);
        assert_eq!(loader.state(), GateState::ViewOnly);
        assert_eq!(loader.view(), LoaderView::Placeholder);

        host.advance(100);
        assert_eq!(loader.state(), GateState::Ready);
        assert_eq!(loader.view(), LoaderView::Content("X".to_string()));
    }

    #[test]
    fn observation_is_one_shot() {
        let host = VirtualHost::new();
        let (mut loader, target) = mount(&host, 100);
        let transitions = Rc::new(RefCell::new(Vec::new()));
        let t = Rc::clone(&transitions);
        loader.on_change(move |s| t.borrow_mut().push(s));

        host.scroll_into_view(target);
        host.scroll_out_of_view(target);
        host.scroll_into_view(target);
        host.advance(100);

        assert_eq!(*transitions.borrow(), vec![GateState::ViewOnly, GateState::Ready]);
        assert_eq!(host.active_observations(), 0);
    }

    #[test]
    fn nothing_fires_after_dispose() {
        for dispose_at in [0u64, 50, 99] {
            let host = VirtualHost::new();
            let (mut loader, target) = mount(&host, 100);
            let fired = Rc::new(RefCell::new(0u32));
            let f = Rc::clone(&fired);
            loader.on_change(move |_| *f.borrow_mut() += 1);

            host.advance(dispose_at);
            loader.dispose();
            assert_eq!(host.pending_timers(), 0);
            assert_eq!(host.active_observations(), 0);

            host.scroll_into_view(target);
            host.advance(1000);
            assert_eq!(*fired.borrow(), 0);
            assert_eq!(loader.state(), GateState::Waiting);
        }
    }

    #[test]
    fn dispose_after_the_timer_ignores_later_visibility() {
        for dispose_at in [100u64, 150] {
            let host = VirtualHost::new();
            let (mut loader, target) = mount(&host, 100);
            let seen = Rc::new(RefCell::new(Vec::new()));
            let s = Rc::clone(&seen);
            loader.on_change(move |state| s.borrow_mut().push(state));

            host.advance(dispose_at);
            assert_eq!(loader.state(), GateState::TimeOnly);
            loader.dispose();
            assert_eq!(host.active_observations(), 0);

            host.scroll_into_view(target);
            host.advance(1000);
            assert_eq!(*seen.borrow(), vec![GateState::TimeOnly]);
            assert_eq!(loader.state(), GateState::TimeOnly);
            assert_eq!(loader.view(), LoaderView::Placeholder);
        }
    }

    #[test]
    fn dispose_after_partial_progress_freezes_state() {
        let host = VirtualHost::new();
        let (mut loader, target) = mount(&host, 100);
        host.scroll_into_view(target);
        loader.dispose();
        host.advance(100);
        assert_eq!(loader.state(), GateState::ViewOnly);
        assert!(loader.is_disposed());
    }

    #[test]
    fn dropping_the_loader_releases_host_resources() {
        let host = VirtualHost::new();
        let (loader, _target) = mount(&host, 100);
        assert_eq!(host.pending_timers(), 1);
        assert_eq!(host.active_observations(), 1);
        drop(loader);
        assert_eq!(host.pending_timers(), 0);
        assert_eq!(host.active_observations(), 0);
    }

    #[test]
    fn missing_observer_falls_back_to_visible() {
        let host = VirtualHost::without_observer();
        let (loader, _target) = mount(&host, 200);
        assert_eq!(loader.state(), GateState::ViewOnly);
        host.advance(200);
        assert_eq!(loader.state(), GateState::Ready);
    }

    #[test]
    fn missing_timers_fall_back_to_elapsed() {
        let host = VirtualHost::without_timers();
        let (loader, target) = mount(&host, 200);
        assert_eq!(loader.state(), GateState::TimeOnly);
        host.scroll_into_view(target);
        assert_eq!(loader.state(), GateState::Ready);
    }

    #[test]
    fn placeholder_can_be_disabled() {
        let host = VirtualHost::new();
        let target = host.element();
        let loader = DelayedVisibilityLoader::initialize(
            LoaderConfig::new(10, "X").without_placeholder(),
            &host,
            &host,
            &target,
        );
        assert_eq!(loader.view(), LoaderView::Hidden);
    }
}
