use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use crate::canvas;
use crate::constants::MAX_FRAME_DT_MS;
use crate::game::SharedGame;
use crate::surface::Surface;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Cancels the pending animation frame and stops the game.
#[derive(Clone)]
pub struct LoopHandle {
    game: SharedGame,
    raf_id: Rc<Cell<Option<i32>>>,
    callback: FrameCallback,
}

impl LoopHandle {
    pub fn stop(&self) {
        if let Some(id) = self.raf_id.take() {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(id);
            }
        }
        // A cancelled callback never runs again to drop itself
        self.callback.borrow_mut().take();
        self.game.borrow_mut().stop();
    }
}

/// Milliseconds since the previous frame, clamped; zero on the first frame.
pub fn frame_delta(last: Option<f64>, now: f64) -> f64 {
    match last {
        Some(last) => (now - last).clamp(0.0, MAX_FRAME_DT_MS),
        None => 0.0,
    }
}

pub fn start_game_loop(game: SharedGame, surface: impl Surface + 'static) -> LoopHandle {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();

    let raf_id = Rc::new(Cell::new(None));
    let handle = LoopHandle { game: game.clone(), raf_id: raf_id.clone(), callback: g.clone() };

    let last_time = Rc::new(Cell::new(None::<f64>));
    let mut surface = surface;

    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
        let dt = frame_delta(last_time.get(), timestamp);
        last_time.set(Some(timestamp));

        if game.borrow().is_stopped() {
            // Drop the closure to break the Rc cycle
            raf_id.set(None);
            f.borrow_mut().take();
            return;
        }

        game.borrow_mut().frame(dt, canvas::viewport(), &mut surface);

        // Request next frame
        let Some(window) = web_sys::window() else { return };
        if let Some(cb) = f.borrow().as_ref() {
            raf_id.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
        }
    }) as Box<dyn FnMut(f64)>));

    let window = web_sys::window().unwrap();
    if let Some(cb) = g.borrow().as_ref() {
        handle.raf_id.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
    }
    handle
}
