use std::{
    env,
    net::{Ipv4Addr, SocketAddr},
};

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
}

impl Config {
    /// Reads `PORT` from the environment. Defaulting happens before the
    /// integer parse, so an absent, empty, or non-numeric value all fall
    /// back to 3000 rather than failing startup.
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        Self { port }
    }

    /// Listen on all interfaces.
    pub fn bind_socket(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}
