//! Deterministic single-threaded host.
//!
//! `VirtualHost` implements both host services over a virtual clock and a
//! virtual viewport. Nothing happens until the caller advances time or
//! scrolls an element into view, which makes every interleaving of timer and
//! intersection events reproducible.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;
use std::rc::Rc;

use crate::host::{
    Callback, HostError, ObservationHandle, TimerHandle, TimerService, VisibilityService,
};

/// Virtual element handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetId(pub u64);

struct Observation {
    target: TargetId,
    callback: Callback,
}

struct HostInner {
    now_ms: u64,
    next_seq: u64,
    // Keyed by (due time, schedule order).
    timers: BTreeMap<(u64, u64), Callback>,
    observations: BTreeMap<u64, Observation>,
    visible: BTreeSet<TargetId>,
    // Observations made on already-visible targets, delivered on the next advance.
    initial: VecDeque<u64>,
    timers_supported: bool,
    observer_supported: bool,
}

impl HostInner {
    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}

#[derive(Clone)]
pub struct VirtualHost {
    inner: Rc<RefCell<HostInner>>,
}

impl VirtualHost {
    pub fn new() -> Self {
        Self::with_support(true, true)
    }

    /// Host whose platform lacks intersection observation.
    pub fn without_observer() -> Self {
        Self::with_support(true, false)
    }

    /// Host whose platform refuses to schedule timers.
    pub fn without_timers() -> Self {
        Self::with_support(false, true)
    }

    fn with_support(timers_supported: bool, observer_supported: bool) -> Self {
        Self {
            inner: Rc::new(RefCell::new(HostInner {
                now_ms: 0,
                next_seq: 0,
                timers: BTreeMap::new(),
                observations: BTreeMap::new(),
                visible: BTreeSet::new(),
                initial: VecDeque::new(),
                timers_supported,
                observer_supported,
            })),
        }
    }

    /// Allocate a new, initially off-screen element.
    pub fn element(&self) -> TargetId {
        TargetId(self.inner.borrow_mut().next_seq())
    }

    pub fn now_ms(&self) -> u64 {
        self.inner.borrow().now_ms
    }

    pub fn pending_timers(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    pub fn active_observations(&self) -> usize {
        self.inner.borrow().observations.len()
    }

    pub fn is_visible(&self, target: TargetId) -> bool {
        self.inner.borrow().visible.contains(&target)
    }

    /// Move the clock forward by `ms`, firing every timer that comes due in
    /// due-time order (ties in scheduling order).
    pub fn advance(&self, ms: u64) {
        let until = self.now_ms() + ms;
        self.deliver_initial();
        loop {
            let next = {
                let mut inner = self.inner.borrow_mut();
                let due = inner
                    .timers
                    .first_key_value()
                    .map(|(&key, _)| key)
                    .filter(|&(due, _)| due <= until);
                due.and_then(|key| {
                    inner.now_ms = key.0;
                    inner.timers.remove(&key)
                })
            };
            match next {
                Some(callback) => callback(),
                None => break,
            }
            self.deliver_initial();
        }
        self.inner.borrow_mut().now_ms = until;
    }

    /// Bring `target` into the viewport, notifying its observers once.
    pub fn scroll_into_view(&self, target: TargetId) {
        let ids: Vec<u64> = {
            let mut inner = self.inner.borrow_mut();
            if !inner.visible.insert(target) {
                return;
            }
            inner
                .observations
                .iter()
                .filter(|(_, o)| o.target == target)
                .map(|(&id, _)| id)
                .collect()
        };
        for id in ids {
            let observation = self.inner.borrow_mut().observations.remove(&id);
            if let Some(observation) = observation {
                (observation.callback)();
            }
        }
    }

    pub fn scroll_out_of_view(&self, target: TargetId) {
        self.inner.borrow_mut().visible.remove(&target);
    }

    fn deliver_initial(&self) {
        loop {
            let next = {
                let mut inner = self.inner.borrow_mut();
                let Some(id) = inner.initial.pop_front() else {
                    break;
                };
                let still_visible = inner
                    .observations
                    .get(&id)
                    .is_some_and(|o| inner.visible.contains(&o.target));
                if still_visible {
                    inner.observations.remove(&id)
                } else {
                    None
                }
            };
            if let Some(observation) = next {
                (observation.callback)();
            }
        }
    }
}

impl Default for VirtualHost {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for VirtualHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("VirtualHost")
            .field("now_ms", &inner.now_ms)
            .field("timers", &inner.timers.len())
            .field("observations", &inner.observations.len())
            .field("visible", &inner.visible)
            .finish()
    }
}

impl TimerService for VirtualHost {
    fn schedule_once(&self, delay_ms: u32, callback: Callback) -> Result<TimerHandle, HostError> {
        let key = {
            let mut inner = self.inner.borrow_mut();
            if !inner.timers_supported {
                return Err(HostError::TimerUnavailable);
            }
            let key = (inner.now_ms + u64::from(delay_ms), inner.next_seq());
            inner.timers.insert(key, callback);
            key
        };

        let weak = Rc::downgrade(&self.inner);
        Ok(TimerHandle::new(move || {
            if let Some(inner) = weak.upgrade() {
                let removed = inner.borrow_mut().timers.remove(&key);
                drop(removed);
            }
        }))
    }
}

impl VisibilityService for VirtualHost {
    type Target = TargetId;

    fn observe(
        &self,
        target: &TargetId,
        on_first_visible: Callback,
    ) -> Result<ObservationHandle, HostError> {
        let id = {
            let mut inner = self.inner.borrow_mut();
            if !inner.observer_supported {
                return Err(HostError::ObserverUnavailable);
            }
            let id = inner.next_seq();
            inner.observations.insert(
                id,
                Observation {
                    target: *target,
                    callback: on_first_visible,
                },
            );
            if inner.visible.contains(target) {
                inner.initial.push_back(id);
            }
            id
        };

        let weak = Rc::downgrade(&self.inner);
        Ok(ObservationHandle::new(move || {
            if let Some(inner) = weak.upgrade() {
                let removed = inner.borrow_mut().observations.remove(&id);
                drop(removed);
            }
        }))
    }
}
