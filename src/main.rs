mod app;
mod constants;
mod config;
mod logging;
mod protocol;
mod vec2;
mod surface;
mod audio;
mod animation;
mod effects;
mod entity;
mod background;
mod game;
mod network;
mod canvas;
mod game_loop;
mod input;
#[cfg(test)]
mod testing;

fn main() {
    console_error_panic_hook::set_once();
    let config = config::ClientConfig::from_location();
    logging::init(config.log_level());
    leptos::mount::mount_to_body(app::App);
}
