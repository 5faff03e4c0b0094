//! Canvas widget for the catch-the-heart game.
//!
//! Two periodic activities drive a running session: an animation-frame loop
//! (spawn gating, fall completion, drawing) and a one-second countdown
//! interval. Both are (re)created by `start_session` after the previous ones
//! are cancelled, and both stop as soon as the session leaves `Running`.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, TouchEvent};

use super::{AnimationLoop, Interval, Listener, create_canvas, document, now_ms, report};
use crate::error::CardError;
use crate::game::{COUNTDOWN_INTERVAL_MS, GameSession, GameState, GameTuning, Tick};
use crate::rng::{CardRng, entropy_rng};

const PLAY_W: u32 = 560;
const PLAY_H: u32 = 400;
const BUTTON_W: f64 = 200.0;
const BUTTON_H: f64 = 50.0;
const HEART_FONT: &str = "32px 'Segoe UI Symbol', sans-serif";
const ROSE: &str = "#f43f5e";

/// Where the Start / Play Again button sits for a given screen.
fn button_rect(state: GameState) -> (f64, f64, f64, f64) {
    let y = match state {
        GameState::Ended => 290.0,
        _ => 230.0,
    };
    ((PLAY_W as f64 - BUTTON_W) / 2.0, y, BUTTON_W, BUTTON_H)
}

fn in_rect((rx, ry, rw, rh): (f64, f64, f64, f64), x: f64, y: f64) -> bool {
    x >= rx && x <= rx + rw && y >= ry && y <= ry + rh
}

struct GameWidget {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    session: GameSession,
    rng: CardRng,
    frame: Option<AnimationLoop>,
    countdown: Option<Interval>,
    this: Weak<RefCell<GameWidget>>,
}

fn with_widget<T>(weak: &Weak<RefCell<GameWidget>>, f: impl FnOnce(&mut GameWidget) -> T) -> Option<T> {
    let rc = weak.upgrade()?;
    let mut w = rc.try_borrow_mut().ok()?;
    Some(f(&mut w))
}

impl GameWidget {
    fn start_session(&mut self) {
        // Cancel the previous countdown before anything else can tick.
        self.countdown = None;
        let now = now_ms();
        self.session.start(now);
        if let Some(frame) = &self.frame {
            frame.start();
        }
        let weak = self.this.clone();
        match Interval::start(COUNTDOWN_INTERVAL_MS, move || {
            with_widget(&weak, |w| w.on_countdown()).unwrap_or(false)
        }) {
            Ok(interval) => self.countdown = Some(interval),
            Err(err) => report("catch game countdown", &err),
        }
        self.render(now);
    }

    fn on_frame(&mut self, now: f64) -> bool {
        if !self.session.is_running() {
            self.render(now);
            return false;
        }
        self.session.advance(&mut self.rng, now);
        for id in self.session.landed(now) {
            self.session.expire(id);
        }
        self.render(now);
        true
    }

    fn on_countdown(&mut self) -> bool {
        match self.session.tick() {
            Tick::Counting(_) => true,
            Tick::Ended => {
                if let Some(frame) = &self.frame {
                    frame.stop();
                }
                self.render(now_ms());
                false
            }
            Tick::Inactive => false,
        }
    }

    fn on_pointer(&mut self, x: f64, y: f64) {
        let now = now_ms();
        if self.session.is_running() {
            if let Some(id) = self.session.heart_at(x, y, now, PLAY_W as f64, PLAY_H as f64) {
                self.session.catch(id);
            }
        } else if in_rect(button_rect(self.session.state()), x, y) {
            self.start_session();
        }
    }

    /// Canvas-space coordinates for a viewport point.
    fn to_canvas(&self, client_x: f64, client_y: f64) -> (f64, f64) {
        let rect = self.canvas.get_bounding_client_rect();
        let sx = if rect.width() > 0.0 { PLAY_W as f64 / rect.width() } else { 1.0 };
        let sy = if rect.height() > 0.0 { PLAY_H as f64 / rect.height() } else { 1.0 };
        ((client_x - rect.left()) * sx, (client_y - rect.top()) * sy)
    }

    fn teardown(&mut self) {
        if let Some(frame) = &self.frame {
            frame.stop();
        }
        self.countdown = None;
        self.canvas.remove();
    }

    // --- Rendering ------------------------------------------------------------

    fn render(&self, now: f64) {
        let (w, h) = (PLAY_W as f64, PLAY_H as f64);
        let ctx = &self.ctx;
        let bg = ctx.create_linear_gradient(0.0, 0.0, 0.0, h);
        bg.add_color_stop(0.0, "#fff1f2").ok();
        bg.add_color_stop(1.0, "#ffffff").ok();
        ctx.set_fill_style_canvas_gradient(&bg);
        ctx.fill_rect(0.0, 0.0, w, h);
        ctx.set_text_baseline("middle");

        match self.session.state() {
            GameState::Idle => {
                self.text("Catch My Love!", w / 2.0, 120.0, "bold 30px Georgia, serif", "#9f1239", "center");
                self.text(
                    "Catch as many falling hearts as you can in 30 seconds!",
                    w / 2.0,
                    175.0,
                    "16px sans-serif",
                    "#4b5563",
                    "center",
                );
                self.button("Start Game", GameState::Idle);
            }
            GameState::Running => {
                ctx.set_font(HEART_FONT);
                ctx.set_text_align("center");
                ctx.set_fill_style_str(ROSE);
                for heart in self.session.hearts() {
                    let (x, y) = heart.position(now, w, h);
                    ctx.fill_text("♥", x, y).ok();
                }
                self.text(&format!("Score: {}", self.session.score()), 16.0, 28.0, "bold 20px sans-serif", "#e11d48", "left");
                self.text(
                    &format!("Time: {}s", self.session.time_remaining()),
                    w - 16.0,
                    28.0,
                    "bold 20px sans-serif",
                    "#6b7280",
                    "right",
                );
            }
            GameState::Ended => {
                self.text("Time's Up!", w / 2.0, 100.0, "bold 26px sans-serif", "#e11d48", "center");
                self.text(&self.session.score().to_string(), w / 2.0, 160.0, "bold 44px sans-serif", "#1f2937", "center");
                self.text(
                    "\"That's how much I adore you! (Times infinity) 💗\"",
                    w / 2.0,
                    225.0,
                    "italic 16px sans-serif",
                    "#4b5563",
                    "center",
                );
                self.button("Play Again", GameState::Ended);
            }
        }
    }

    fn text(&self, s: &str, x: f64, y: f64, font: &str, color: &str, align: &str) {
        self.ctx.set_font(font);
        self.ctx.set_text_align(align);
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_text(s, x, y).ok();
    }

    fn button(&self, label: &str, state: GameState) {
        let (x, y, bw, bh) = button_rect(state);
        self.ctx.set_fill_style_str(ROSE);
        self.ctx.fill_rect(x, y, bw, bh);
        self.text(label, x + bw / 2.0, y + bh / 2.0, "bold 18px sans-serif", "#ffffff", "center");
    }
}

/// Catch-the-heart game mounted into a container element.
#[wasm_bindgen]
pub struct CatchGame {
    widget: Rc<RefCell<GameWidget>>,
    _listeners: Vec<Listener>,
}

#[wasm_bindgen]
impl CatchGame {
    /// Mount a new game (in the Idle screen) into `#container_id`.
    #[wasm_bindgen(constructor)]
    pub fn new(container_id: &str) -> Result<CatchGame, JsValue> {
        Ok(Self::mount(container_id, GameTuning::default())?)
    }

    /// Start or restart a play-through (same as the on-canvas button).
    pub fn start(&self) {
        if let Ok(mut w) = self.widget.try_borrow_mut() {
            w.start_session();
        }
    }

    pub fn score(&self) -> u32 {
        self.widget.borrow().session.score()
    }

    #[wasm_bindgen(js_name = timeRemaining)]
    pub fn time_remaining(&self) -> u32 {
        self.widget.borrow().session.time_remaining()
    }

    pub fn state(&self) -> String {
        match self.widget.borrow().session.state() {
            GameState::Idle => "idle",
            GameState::Running => "running",
            GameState::Ended => "ended",
        }
        .to_string()
    }

    /// Stop all timers and remove the canvas.
    pub fn unmount(self) {}
}

impl CatchGame {
    pub(crate) fn mount(container_id: &str, tuning: GameTuning) -> Result<Self, CardError> {
        let container = document()?
            .get_element_by_id(container_id)
            .ok_or_else(|| CardError::ElementNotFound(container_id.to_string()))?;
        let (canvas, ctx) = create_canvas(PLAY_W, PLAY_H)?;
        canvas.set_attribute(
            "style",
            "display:block; width:100%; max-width:560px; margin:0 auto; border:2px solid #fecdd3; border-radius:16px; cursor:crosshair; touch-action:none;",
        )?;
        container.append_child(&canvas)?;

        let widget = Rc::new_cyclic(|this| {
            RefCell::new(GameWidget {
                canvas: canvas.clone(),
                ctx,
                session: GameSession::new(tuning),
                rng: entropy_rng(now_ms().to_bits()),
                frame: None,
                countdown: None,
                this: this.clone(),
            })
        });

        let weak = Rc::downgrade(&widget);
        let frame = AnimationLoop::new(move |ts| with_widget(&weak, |w| w.on_frame(ts)).unwrap_or(false));
        widget.borrow_mut().frame = Some(frame);

        let mut listeners = Vec::new();
        {
            let weak = Rc::downgrade(&widget);
            listeners.push(Listener::new(&canvas, "mousedown", move |evt| {
                if let Some(m) = evt.dyn_ref::<MouseEvent>() {
                    let (cx, cy) = (m.client_x() as f64, m.client_y() as f64);
                    with_widget(&weak, |w| {
                        let (x, y) = w.to_canvas(cx, cy);
                        w.on_pointer(x, y);
                    });
                }
            })?);
        }
        {
            let weak = Rc::downgrade(&widget);
            listeners.push(Listener::new(&canvas, "touchstart", move |evt| {
                if let Some(t) = evt.dyn_ref::<TouchEvent>() {
                    // Keep the tap from scrolling the page.
                    t.prevent_default();
                    let touches = t.changed_touches();
                    for i in 0..touches.length() {
                        if let Some(touch) = touches.get(i) {
                            let (cx, cy) = (touch.client_x() as f64, touch.client_y() as f64);
                            with_widget(&weak, |w| {
                                let (x, y) = w.to_canvas(cx, cy);
                                w.on_pointer(x, y);
                            });
                        }
                    }
                }
            })?);
        }

        widget.borrow().render(now_ms());
        Ok(Self { widget, _listeners: listeners })
    }
}

impl Drop for CatchGame {
    fn drop(&mut self) {
        if let Ok(mut w) = self.widget.try_borrow_mut() {
            w.teardown();
        }
    }
}
