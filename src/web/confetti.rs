//! Full-viewport confetti overlay.
//!
//! Each `fireConfetti()` call gets its own transparent canvas over the page.
//! Expired particles are swept by a chain of timeouts set at each particle's
//! deadline and again before every drawn frame; the frame loop stops once the
//! field is empty. A timeout scheduled at the batch's last expiry owns the
//! layer and drops it, which removes the canvas even if frames stalled.

use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::{Rc, Weak};

use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::{AnimationLoop, body, create_canvas, now_ms, report, set_timeout, window};
use crate::burst::{BurstConfig, ParticleField, Shape};
use crate::error::CardError;
use crate::rng::entropy_rng;

struct ConfettiLayer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    field: ParticleField,
    width: f64,
    height: f64,
    frame: Option<AnimationLoop>,
}

impl ConfettiLayer {
    fn on_frame(&mut self, now: f64) -> bool {
        self.field.sweep(now);
        let ctx = &self.ctx;
        ctx.clear_rect(0.0, 0.0, self.width, self.height);
        for p in self.field.particles() {
            let pose = p.pose(now, self.width, self.height);
            let half = p.size_px / 2.0;
            ctx.save();
            ctx.set_global_alpha(pose.opacity);
            ctx.translate(pose.x + half, pose.y + half).ok();
            ctx.rotate(pose.rotation_deg.to_radians()).ok();
            ctx.set_fill_style_str(p.color);
            match p.shape {
                Shape::Circle => {
                    ctx.begin_path();
                    ctx.arc(0.0, 0.0, half, 0.0, TAU).ok();
                    ctx.fill();
                }
                Shape::Square => ctx.fill_rect(-half, -half, p.size_px, p.size_px),
            }
            ctx.restore();
        }
        !self.field.is_empty()
    }
}

impl Drop for ConfettiLayer {
    fn drop(&mut self) {
        if let Some(frame) = self.frame.take() {
            frame.stop();
        }
        self.canvas.remove();
    }
}

fn with_layer(weak: &Weak<RefCell<ConfettiLayer>>, now: f64) -> bool {
    let Some(rc) = weak.upgrade() else {
        return false;
    };
    let Ok(mut layer) = rc.try_borrow_mut() else {
        return true;
    };
    layer.on_frame(now)
}

/// Fire one confetti burst over the whole page. Never fails from the caller's
/// point of view; DOM problems are logged to the console.
#[wasm_bindgen(js_name = fireConfetti)]
pub fn fire_confetti() {
    if let Err(err) = launch(BurstConfig::default()) {
        report("confetti", &err);
    }
}

pub(crate) fn launch(cfg: BurstConfig) -> Result<(), CardError> {
    let win = window()?;
    let width = win.inner_width()?.as_f64().unwrap_or(800.0);
    let height = win.inner_height()?.as_f64().unwrap_or(600.0);
    let (canvas, ctx) = create_canvas(width as u32, height as u32)?;
    canvas.set_attribute(
        "style",
        "position:fixed; left:0; top:0; width:100vw; height:100vh; pointer-events:none; z-index:9999;",
    )?;

    let now = now_ms();
    let mut rng = entropy_rng(now.to_bits());
    let mut field = ParticleField::new(cfg);
    let done_at = field.fire(&mut rng, now);
    let first_expiry = field.next_expiry();

    let layer = Rc::new(RefCell::new(ConfettiLayer {
        canvas: canvas.clone(),
        ctx,
        field,
        width,
        height,
        frame: None,
    }));
    let weak = Rc::downgrade(&layer);
    layer.borrow_mut().frame = Some(AnimationLoop::new(move |ts| with_layer(&weak, ts)));

    // The teardown timeout holds the only long-lived strong reference and is
    // scheduled before the canvas is attached, so the overlay never outlives
    // the batch.
    let owner = layer.clone();
    set_timeout(delay_until(done_at, now), move || drop(owner))?;
    if let Some(at) = first_expiry {
        if let Err(err) = schedule_sweep(Rc::downgrade(&layer), at, now) {
            report("confetti sweep", &err);
        }
    }

    body()?.append_child(&canvas)?;
    if let Some(frame) = &layer.borrow().frame {
        frame.start();
    }
    Ok(())
}

fn delay_until(at: f64, now: f64) -> i32 {
    ((at - now).ceil() as i32).max(0) + 1
}

/// Sweep the field at each particle deadline, whether or not frames are running.
fn schedule_sweep(weak: Weak<RefCell<ConfettiLayer>>, at: f64, now: f64) -> Result<(), CardError> {
    set_timeout(delay_until(at, now), move || {
        let Some(rc) = weak.upgrade() else {
            return;
        };
        let now = now_ms();
        let next = match rc.try_borrow_mut() {
            Ok(mut layer) => {
                layer.field.sweep(now);
                layer.field.next_expiry()
            }
            // mid-frame; try again right after
            Err(_) => Some(now),
        };
        drop(rc);
        if let Some(at) = next {
            if let Err(err) = schedule_sweep(weak, at, now) {
                report("confetti sweep", &err);
            }
        }
    })?;
    Ok(())
}
