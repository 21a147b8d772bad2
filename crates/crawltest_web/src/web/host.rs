use std::cell::RefCell;
use std::rc::Rc;

use crawltest::host::{
    Callback, HostError, ObservationHandle, TimerHandle, TimerService, VisibilityService,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// `setTimeout` / `clearTimeout`.
#[derive(Debug, Clone, Copy, Default)]
pub(super) struct BrowserTimers;

impl TimerService for BrowserTimers {
    fn schedule_once(&self, delay_ms: u32, callback: Callback) -> Result<TimerHandle, HostError> {
        let window = web_sys::window().ok_or(HostError::TimerUnavailable)?;

        let slot: Rc<RefCell<Option<Callback>>> = Rc::new(RefCell::new(Some(callback)));
        let fire = Rc::clone(&slot);
        let cb = Closure::wrap(Box::new(move || {
            let callback = fire.borrow_mut().take();
            if let Some(callback) = callback {
                callback();
            }
        }) as Box<dyn FnMut()>);

        let id = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                cb.as_ref().unchecked_ref(),
                i32::try_from(delay_ms).unwrap_or(i32::MAX),
            )
            .map_err(|_| HostError::TimerUnavailable)?;

        // The closure lives as long as the handle.
        Ok(TimerHandle::new(move || {
            if let Some(w) = web_sys::window() {
                w.clear_timeout_with_handle(id);
            }
            slot.borrow_mut().take();
            drop(cb);
        }))
    }
}

/// `IntersectionObserver`, disconnected after the first intersection.
#[derive(Debug, Clone, Copy, Default)]
pub(super) struct BrowserViewport;

impl VisibilityService for BrowserViewport {
    type Target = web_sys::Element;

    fn observe(
        &self,
        target: &web_sys::Element,
        on_first_visible: Callback,
    ) -> Result<ObservationHandle, HostError> {
        let slot: Rc<RefCell<Option<Callback>>> = Rc::new(RefCell::new(Some(on_first_visible)));
        let fire = Rc::clone(&slot);
        let cb = Closure::wrap(Box::new(
            move |entries: js_sys::Array, observer: web_sys::IntersectionObserver| {
                let entered = entries.iter().any(|e| {
                    e.dyn_into::<web_sys::IntersectionObserverEntry>()
                        .map(|e| e.is_intersecting())
                        .unwrap_or(false)
                });
                if !entered {
                    return;
                }
                observer.disconnect();
                let callback = fire.borrow_mut().take();
                if let Some(callback) = callback {
                    callback();
                }
            },
        )
            as Box<dyn FnMut(js_sys::Array, web_sys::IntersectionObserver)>);

        // Throws (ReferenceError) on platforms without the API.
        let observer = web_sys::IntersectionObserver::new(cb.as_ref().unchecked_ref())
            .map_err(|_| HostError::ObserverUnavailable)?;
        observer.observe(target);

        Ok(ObservationHandle::new(move || {
            observer.disconnect();
            slot.borrow_mut().take();
            drop(cb);
        }))
    }
}

/// Run `f` once after `delay_ms`, for islands that do not own a widget.
pub(super) fn schedule(delay_ms: u32, f: impl FnOnce() + 'static) -> Option<TimerHandle> {
    BrowserTimers.schedule_once(delay_ms, Box::new(f)).ok()
}

/// Repeating `setInterval`; cleared when the returned guard drops.
pub(super) struct Interval {
    id: i32,
    _cb: Closure<dyn FnMut()>,
}

impl Interval {
    pub(super) fn start(period_ms: u32, f: impl FnMut() + 'static) -> Option<Self> {
        let window = web_sys::window()?;
        let cb = Closure::wrap(Box::new(f) as Box<dyn FnMut()>);
        let id = window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                cb.as_ref().unchecked_ref(),
                i32::try_from(period_ms).unwrap_or(i32::MAX),
            )
            .ok()?;
        Some(Self { id, _cb: cb })
    }
}

impl Drop for Interval {
    fn drop(&mut self) {
        if let Some(w) = web_sys::window() {
            w.clear_interval_with_handle(self.id);
        }
    }
}

pub(super) fn local_time_string() -> String {
    String::from(js_sys::Date::new_0().to_locale_time_string("en-US"))
}

pub(super) fn local_date_time_string() -> String {
    String::from(js_sys::Date::new_0().to_locale_string("en-US", &JsValue::UNDEFINED))
}
