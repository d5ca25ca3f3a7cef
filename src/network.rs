use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{WebSocket, MessageEvent, CloseEvent, ErrorEvent};
use crate::game::{Game, SharedGame, Transport};
use crate::protocol::{ClientMessage, ServerMessage};

pub struct Network {
    ws: Option<WebSocket>,
    next_rid: u64,
    // rid of the outstanding get_id request
    pending_id: Option<u64>,
    // Store closures to prevent them from being dropped
    _on_open: Option<Closure<dyn FnMut()>>,
    _on_message: Option<Closure<dyn FnMut(MessageEvent)>>,
    _on_close: Option<Closure<dyn FnMut(CloseEvent)>>,
    _on_error: Option<Closure<dyn FnMut(ErrorEvent)>>,
}

pub type SharedNetwork = Rc<RefCell<Network>>;

impl Network {
    pub fn new() -> SharedNetwork {
        Rc::new(RefCell::new(Network {
            ws: None,
            next_rid: 1,
            pending_id: None,
            _on_open: None,
            _on_message: None,
            _on_close: None,
            _on_error: None,
        }))
    }

    /// Opens the socket and routes decoded frames into `game`. `on_closed`
    /// runs after the game has been stopped because the server went away.
    pub fn connect(net: &SharedNetwork, url: &str, game: &SharedGame, on_closed: impl Fn() + 'static) {
        let ws = match WebSocket::new(url) {
            Ok(ws) => ws,
            Err(e) => {
                log::error!("could not open socket to {}: {:?}", url, e);
                game.borrow_mut().stop();
                on_closed();
                return;
            }
        };
        ws.set_binary_type(web_sys::BinaryType::Arraybuffer);

        // on open
        let url_owned = url.to_string();
        let on_open = Closure::wrap(Box::new(move || {
            log::info!("connected to {}", url_owned);
        }) as Box<dyn FnMut()>);

        // on message
        let game_weak = Rc::downgrade(game);
        let net_weak = Rc::downgrade(net);
        let on_message = Closure::wrap(Box::new(move |e: MessageEvent| {
            let data = e.data();
            let decoded = if let Some(ab) = data.dyn_ref::<js_sys::ArrayBuffer>() {
                let bytes = js_sys::Uint8Array::new(ab).to_vec();
                ServerMessage::decode_binary(&bytes)
            } else if let Some(text) = data.as_string() {
                ServerMessage::decode_text(&text)
            } else {
                return;
            };
            match decoded {
                Ok(msg) => dispatch(&net_weak, &game_weak, msg),
                Err(err) => log::warn!("dropping frame: {}", err),
            }
        }) as Box<dyn FnMut(MessageEvent)>);

        // on close
        let game_weak = Rc::downgrade(game);
        let on_close = Closure::wrap(Box::new(move |e: CloseEvent| {
            log::warn!("Server closed (code {}).", e.code());
            if let Some(game) = game_weak.upgrade() {
                game.borrow_mut().stop();
            }
            on_closed();
        }) as Box<dyn FnMut(CloseEvent)>);

        // on error
        let on_error = Closure::wrap(Box::new(move |e: ErrorEvent| {
            log::error!("WebSocket error: {:?}", e.message());
        }) as Box<dyn FnMut(ErrorEvent)>);

        ws.set_onopen(Some(on_open.as_ref().unchecked_ref()));
        ws.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
        ws.set_onclose(Some(on_close.as_ref().unchecked_ref()));
        ws.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        let mut net_mut = net.borrow_mut();
        net_mut.ws = Some(ws);
        net_mut._on_open = Some(on_open);
        net_mut._on_message = Some(on_message);
        net_mut._on_close = Some(on_close);
        net_mut._on_error = Some(on_error);
    }

    /// Detaches the handlers and closes the socket without reporting a close.
    pub fn close(net: &SharedNetwork) {
        let mut net_mut = net.borrow_mut();
        if let Some(ws) = net_mut.ws.take() {
            ws.set_onopen(None);
            ws.set_onmessage(None);
            ws.set_onclose(None);
            ws.set_onerror(None);
            let _ = ws.close();
        }
        net_mut._on_open = None;
        net_mut._on_message = None;
        net_mut._on_close = None;
        net_mut._on_error = None;
        net_mut.pending_id = None;
    }

    /// Accepts an id reply only for the request we are waiting on.
    fn accept_reply(&mut self, rid: Option<u64>) -> bool {
        match (self.pending_id, rid) {
            (Some(pending), Some(rid)) if pending == rid => {
                self.pending_id = None;
                true
            }
            // servers that do not echo request ids
            (Some(_), None) => {
                self.pending_id = None;
                true
            }
            _ => false,
        }
    }

    pub fn send(net: &SharedNetwork, msg: ClientMessage) {
        let mut net_mut = net.borrow_mut();
        let rid = match msg {
            ClientMessage::GetId { .. } => {
                let rid = net_mut.next_rid;
                net_mut.next_rid += 1;
                net_mut.pending_id = Some(rid);
                Some(rid)
            }
            _ => None,
        };

        let Some(ws) = &net_mut.ws else { return };
        if ws.ready_state() != WebSocket::OPEN {
            log::debug!("socket not open, dropping {:?}", msg);
            return;
        }
        match serde_json::to_string(&msg.to_envelope(rid)) {
            Ok(text) => {
                let _ = ws.send_with_str(&text);
            }
            Err(e) => log::error!("could not encode {:?}: {}", msg, e),
        }
    }
}

fn dispatch(net: &Weak<RefCell<Network>>, game: &Weak<RefCell<Game>>, msg: ServerMessage) {
    if let ServerMessage::AssignedId { rid, .. } = &msg {
        let accepted = net.upgrade().map(|n| n.borrow_mut().accept_reply(*rid)).unwrap_or(false);
        if !accepted {
            log::warn!("ignoring unexpected id reply {:?}", rid);
            return;
        }
    }
    if let Some(game) = game.upgrade() {
        game.borrow_mut().handle(msg);
    }
}

/// The game's outbound side, backed by the shared socket.
pub struct NetworkTransport(pub SharedNetwork);

impl Transport for NetworkTransport {
    fn send(&mut self, msg: ClientMessage) {
        Network::send(&self.0, msg);
    }
}
