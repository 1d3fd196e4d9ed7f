use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server_port: String,
    /// Falls back to the repo's default sqlite file when unset.
    pub database_url: Option<String>,
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let server_port = env::var("SERVER_PORT").unwrap_or_else(|_| "3000".into());
        if server_port.parse::<u16>().is_err() {
            anyhow::bail!("SERVER_PORT must be a port number, got {server_port:?}");
        }
        let database_url = env::var("DATABASE_URL").ok().filter(|u| !u.is_empty());
        let log_filter = env::var("RUST_LOG").unwrap_or_else(|_| "debug".into());
        Ok(Self {
            server_port,
            database_url,
            log_filter,
        })
    }
}
