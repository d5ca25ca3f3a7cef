use std::cell::RefCell;
use std::rc::Rc;
use leptos::prelude::*;
use crate::audio::WebAudio;
use crate::config::ClientConfig;
use crate::effects::Rng;
use crate::game::{Game, SharedGame};
use crate::game_loop::{self, LoopHandle};
use crate::input::{self, InputListeners};
use crate::network::{Network, NetworkTransport, SharedNetwork};
use crate::surface::CanvasSurface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Menu,
    Game,
    Lost,
}

impl View {
    fn class(self, current: View) -> &'static str {
        match (self, self == current) {
            (View::Menu, true) => "view menu current",
            (View::Menu, false) => "view menu",
            (View::Game, true) => "view game current",
            (View::Game, false) => "view game",
            (View::Lost, true) => "view lost current",
            (View::Lost, false) => "view lost",
        }
    }
}

/// One connected game: its frame loop, socket and key listeners.
struct Session {
    handle: LoopHandle,
    net: SharedNetwork,
    input: Option<InputListeners>,
}

impl Session {
    fn end(self) {
        self.handle.stop();
        Network::close(&self.net);
        if let Some(input) = self.input {
            input.detach();
        }
    }
}

fn start_session(
    server_url: &str,
    name: Option<String>,
    view: RwSignal<View>,
    status: RwSignal<Option<String>>,
) -> Option<Session> {
    let surface = CanvasSurface::from_element_id("canvas")?;
    let net = Network::new();
    let game: SharedGame = Rc::new(RefCell::new(Game::new(
        Box::new(NetworkTransport(net.clone())),
        Box::new(WebAudio::default()),
        name,
        Rng::from_entropy(),
    )));

    let loss_net = net.clone();
    game.borrow_mut().set_on_loss(move || {
        Network::close(&loss_net);
        view.set(View::Lost);
    });

    Network::connect(&net, server_url, &game, move || {
        status.set(Some("Server closed.".to_string()));
        view.set(View::Menu);
    });
    let input = input::setup_input(&game);

    let handle = game_loop::start_game_loop(game, surface);
    Some(Session { handle, net, input })
}

#[component]
pub fn App() -> impl IntoView {
    let config = ClientConfig::from_location();
    log::debug!("client config: {:?}", config);

    let view = RwSignal::new(View::Menu);
    let status = RwSignal::new(None::<String>);
    let name = RwSignal::new(config.name.clone().unwrap_or_default());
    let session = send_wrapper::SendWrapper::new(Rc::new(RefCell::new(None::<Session>)));
    let server_url = config.server_url.clone();

    let on_start = move |_: web_sys::MouseEvent| {
        if let Some(prev) = session.borrow_mut().take() {
            prev.end();
        }
        let player_name = Some(name.get_untracked());
        match start_session(&server_url, player_name, view, status) {
            Some(s) => {
                *session.borrow_mut() = Some(s);
                status.set(None);
                view.set(View::Game);
            }
            None => status.set(Some("Could not start the game.".to_string())),
        }
    };

    view! {
        <div class=move || View::Menu.class(view.get())>
            <input
                type="text"
                id="playerName"
                placeholder="Name"
                maxlength="16"
                prop:value=move || name.get()
                on:input=move |ev| name.set(event_target_value(&ev))
            />
            <button class="btn" id="startGameBtn" on:click=on_start>"Start"</button>
            {move || status.get().map(|s| view! { <p class="status">{s}</p> })}
        </div>
        <div class=move || View::Game.class(view.get())>
            <canvas id="canvas"></canvas>
        </div>
        <div class=move || View::Lost.class(view.get())>
            <p class="lost-text">"You were destroyed."</p>
            <button class="btn" on:click=move |_| view.set(View::Menu)>"Back"</button>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_current_view_is_marked() {
        assert_eq!(View::Game.class(View::Game), "view game current");
        assert_eq!(View::Menu.class(View::Game), "view menu");
        assert_eq!(View::Lost.class(View::Lost), "view lost current");
    }
}
