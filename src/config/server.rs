use std::net::SocketAddr;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    /// Address the HTTP/WebSocket server binds to
    #[serde(default = "default_listen_addr")]
    pub listen_address: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    "127.0.0.1:8000".parse().expect("valid default listen address")
}
