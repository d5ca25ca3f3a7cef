use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::KeyboardEvent;
use crate::constants::*;
use crate::game::{Game, KeyOutcome, SharedGame};
use crate::protocol::Action;

pub fn default_keymap() -> HashMap<u32, Action> {
    HashMap::from([
        (KEY_UP, Action::Up),
        (KEY_DOWN, Action::Down),
        (KEY_LEFT, Action::Left),
        (KEY_RIGHT, Action::Right),
        (KEY_SPACE, Action::Shoot),
        (KEY_SHIFT, Action::Sprint),
    ])
}

fn key_down(game: &Weak<RefCell<Game>>, key_code: u32) -> KeyOutcome {
    game.upgrade().map_or(KeyOutcome::Ignored, |g| g.borrow_mut().key_down(key_code))
}

fn key_up(game: &Weak<RefCell<Game>>, key_code: u32) -> KeyOutcome {
    game.upgrade().map_or(KeyOutcome::Ignored, |g| g.borrow_mut().key_up(key_code))
}

/// Window key listeners for one game. They hold the game weakly, so a
/// finished session is freed once `detach` has run.
pub struct InputListeners {
    keydown: Closure<dyn FnMut(KeyboardEvent)>,
    keyup: Closure<dyn FnMut(KeyboardEvent)>,
}

/// Forwards recognised keys to the game. Handled keydowns are kept from
/// scrolling the page; everything else passes through untouched.
pub fn setup_input(game: &SharedGame) -> Option<InputListeners> {
    let window = web_sys::window()?;

    // Key down
    let game_kd = Rc::downgrade(game);
    let keydown = Closure::wrap(Box::new(move |e: KeyboardEvent| {
        if key_down(&game_kd, e.key_code()) == KeyOutcome::Handled {
            e.prevent_default();
            e.stop_propagation();
        }
    }) as Box<dyn FnMut(KeyboardEvent)>);
    let _ = window.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref());

    // Key up
    let game_ku = Rc::downgrade(game);
    let keyup = Closure::wrap(Box::new(move |e: KeyboardEvent| {
        key_up(&game_ku, e.key_code());
    }) as Box<dyn FnMut(KeyboardEvent)>);
    let _ = window.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref());

    Some(InputListeners { keydown, keyup })
}

impl InputListeners {
    pub fn detach(self) {
        let Some(window) = web_sys::window() else { return };
        let _ = window.remove_event_listener_with_callback("keydown", self.keydown.as_ref().unchecked_ref());
        let _ = window.remove_event_listener_with_callback("keyup", self.keyup.as_ref().unchecked_ref());
    }
}
