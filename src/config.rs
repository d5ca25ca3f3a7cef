use crate::constants::SOCKET_PATH;

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub server_url: String,
    pub name: Option<String>,
    pub debug: bool,
}

impl ClientConfig {
    /// `server` and `name` are query overrides; without `server` the socket
    /// lives on the page's own host.
    pub fn resolve(protocol: &str, host: &str, server: Option<String>, name: Option<String>, debug: bool) -> Self {
        let server_url = match server.filter(|s| !s.is_empty()) {
            Some(url) => url,
            None => {
                let ws_proto = if protocol == "https:" { "wss:" } else { "ws:" };
                format!("{}//{}{}", ws_proto, host, SOCKET_PATH)
            }
        };
        let name = name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        Self { server_url, name, debug }
    }

    /// Reads `?server=`, `?name=` and `?debug` from the page URL.
    pub fn from_location() -> Self {
        let window = web_sys::window().unwrap();
        let location = window.location();
        let protocol = location.protocol().unwrap_or_default();
        let host = location.host().unwrap_or_default();
        let search = location.search().unwrap_or_default();
        match web_sys::UrlSearchParams::new_with_str(&search) {
            Ok(params) => Self::resolve(&protocol, &host, params.get("server"), params.get("name"), params.has("debug")),
            Err(_) => Self::resolve(&protocol, &host, None, None, false),
        }
    }

    pub fn log_level(&self) -> log::LevelFilter {
        if self.debug { log::LevelFilter::Debug } else { log::LevelFilter::Info }
    }
}
