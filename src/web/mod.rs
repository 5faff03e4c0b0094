//! Browser layer: canvas widgets, timers and the wasm exports.
//!
//! Every widget owns its state behind an `Rc<RefCell<..>>`; JS callbacks hold
//! only `Weak` handles and borrow for the duration of a single event. Timers
//! and listeners are RAII values that unregister themselves on drop, so tearing
//! a widget down (or restarting it) cannot leave a callback behind.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, Window};

use crate::error::CardError;

pub mod card;
pub mod catch_game;
pub mod confetti;

// --- Globals access -----------------------------------------------------------

pub(crate) fn window() -> Result<Window, CardError> {
    web_sys::window().ok_or(CardError::NoWindow)
}

pub(crate) fn document() -> Result<Document, CardError> {
    window()?.document().ok_or(CardError::NoDocument)
}

pub(crate) fn body() -> Result<HtmlElement, CardError> {
    document()?.body().ok_or(CardError::NoBody)
}

/// `performance.now()`, or 0 outside a browser.
pub(crate) fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

/// Errors inside timer and input callbacks have nowhere to propagate to.
pub(crate) fn report(context: &str, err: &CardError) {
    web_sys::console::error_1(&JsValue::from_str(&format!("{context}: {err}")));
}

pub(crate) fn create_canvas(width: u32, height: u32) -> Result<(HtmlCanvasElement, CanvasRenderingContext2d), CardError> {
    let canvas: HtmlCanvasElement = document()?
        .create_element("canvas")?
        .dyn_into()
        .map_err(|_| CardError::Js("created element is not a canvas".into()))?;
    canvas.set_width(width);
    canvas.set_height(height);
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or(CardError::NoContext2d)?
        .dyn_into()
        .map_err(|_| CardError::NoContext2d)?;
    Ok((canvas, ctx))
}

// --- Animation frame loop -------------------------------------------------------

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// A `requestAnimationFrame` loop. `on_frame` returns false to stop scheduling.
pub(crate) struct AnimationLoop {
    callback: FrameCallback,
    handle: Rc<Cell<Option<i32>>>,
}

impl AnimationLoop {
    pub(crate) fn new(mut on_frame: impl FnMut(f64) -> bool + 'static) -> Self {
        let callback: FrameCallback = Rc::new(RefCell::new(None));
        let handle = Rc::new(Cell::new(None));
        let weak_cb = Rc::downgrade(&callback);
        let h = handle.clone();
        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
            h.set(None);
            if !on_frame(ts) {
                return;
            }
            if let Some(cb) = weak_cb.upgrade() {
                h.set(request_frame(&cb));
            }
        }) as Box<dyn FnMut(f64)>));
        Self { callback, handle }
    }

    /// Schedule the next frame unless one is already pending.
    pub(crate) fn start(&self) {
        if self.handle.get().is_none() {
            self.handle.set(request_frame(&self.callback));
        }
    }

    pub(crate) fn stop(&self) {
        if let Some(id) = self.handle.take() {
            if let Some(w) = web_sys::window() {
                let _ = w.cancel_animation_frame(id);
            }
        }
    }
}

impl Drop for AnimationLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn request_frame(cb: &FrameCallback) -> Option<i32> {
    let w = web_sys::window()?;
    let cb = cb.borrow();
    w.request_animation_frame(cb.as_ref()?.as_ref().unchecked_ref()).ok()
}

// --- Intervals ----------------------------------------------------------------------

/// A `setInterval` registration. `on_tick` returns false to cancel itself;
/// dropping the value cancels it too.
pub(crate) struct Interval {
    handle: Rc<Cell<Option<i32>>>,
    _closure: Closure<dyn FnMut()>,
}

impl Interval {
    pub(crate) fn start(period_ms: i32, mut on_tick: impl FnMut() -> bool + 'static) -> Result<Self, CardError> {
        let handle: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
        let h = handle.clone();
        let closure = Closure::wrap(Box::new(move || {
            if !on_tick() {
                clear_interval(&h);
            }
        }) as Box<dyn FnMut()>);
        let id = window()?
            .set_interval_with_callback_and_timeout_and_arguments_0(closure.as_ref().unchecked_ref(), period_ms)?;
        handle.set(Some(id));
        Ok(Self { handle, _closure: closure })
    }

    pub(crate) fn cancel(&self) {
        clear_interval(&self.handle);
    }
}

impl Drop for Interval {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn clear_interval(handle: &Cell<Option<i32>>) {
    if let Some(id) = handle.take() {
        if let Some(w) = web_sys::window() {
            w.clear_interval_with_handle(id);
        }
    }
}

/// Run `f` once after `delay_ms`. JS owns the closure and frees it after the call.
pub(crate) fn set_timeout(delay_ms: i32, f: impl FnOnce() + 'static) -> Result<i32, CardError> {
    let win = window()?;
    let js = Closure::once_into_js(f);
    Ok(win.set_timeout_with_callback_and_timeout_and_arguments_0(js.unchecked_ref(), delay_ms)?)
}

// --- Event listeners ------------------------------------------------------------------

/// An event listener that removes itself from its target on drop.
pub(crate) struct Listener {
    target: web_sys::EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(web_sys::Event)>,
}

impl Listener {
    pub(crate) fn new(
        target: &web_sys::EventTarget,
        kind: &'static str,
        f: impl FnMut(web_sys::Event) + 'static,
    ) -> Result<Self, CardError> {
        let closure = Closure::wrap(Box::new(f) as Box<dyn FnMut(web_sys::Event)>);
        target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
        Ok(Self { target: target.clone(), kind, closure })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
pub(crate) mod browser_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    pub(crate) async fn sleep(ms: i32) {
        let promise = js_sys::Promise::new(&mut |resolve, _| {
            window()
                .unwrap()
                .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
                .unwrap();
        });
        wasm_bindgen_futures::JsFuture::from(promise).await.unwrap();
    }

    #[wasm_bindgen_test]
    async fn test_dropped_interval_never_fires() {
        let ticks = Rc::new(Cell::new(0u32));
        let t = ticks.clone();
        let interval = Interval::start(20, move || {
            t.set(t.get() + 1);
            true
        })
        .unwrap();
        sleep(110).await;
        assert!(ticks.get() >= 1);
        drop(interval);
        let seen = ticks.get();
        sleep(110).await;
        assert_eq!(ticks.get(), seen);
    }

    #[wasm_bindgen_test]
    async fn test_interval_cancels_itself() {
        let ticks = Rc::new(Cell::new(0u32));
        let t = ticks.clone();
        let interval = Interval::start(10, move || {
            t.set(t.get() + 1);
            t.get() < 3
        })
        .unwrap();
        sleep(200).await;
        assert_eq!(ticks.get(), 3);
        assert_eq!(interval.handle.get(), None);
    }
}
