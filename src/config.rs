use std::net::SocketAddr;
use std::path::PathBuf;

use crate::ai::config::{DEFAULT_MODEL, DEFAULT_OLLAMA_URL};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 18620;

/// Process-wide settings read once at startup
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub default_destination: PathBuf,
    pub watch_dirs: Vec<PathBuf>,
    pub ollama_url: String,
    pub ai_model: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            db_path: home.join(".blackhole").join("history.db"),
            default_destination: home.join("Documents").join("BlackHole"),
            watch_dirs: Vec::new(),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            ai_model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl ServerConfig {
    /// Read `BLACKHOLE_*` variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(host) = var("BLACKHOLE_HOST") {
            config.host = host;
        }
        if let Some(port) = var("BLACKHOLE_PORT") {
            match port.parse() {
                Ok(port) => config.port = port,
                Err(_) => tracing::warn!(
                    "Invalid BLACKHOLE_PORT {:?}, using {}",
                    port,
                    DEFAULT_PORT
                ),
            }
        }
        if let Some(path) = var("BLACKHOLE_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }
        if let Some(path) = var("BLACKHOLE_DEFAULT_DESTINATION") {
            config.default_destination = PathBuf::from(path);
        }
        if let Some(dirs) = var("BLACKHOLE_WATCH_DIRS") {
            config.watch_dirs = dirs
                .split(',')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(PathBuf::from)
                .collect();
        }
        if let Some(url) = var("BLACKHOLE_OLLAMA_URL") {
            config.ollama_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = var("BLACKHOLE_AI_MODEL") {
            config.ai_model = model;
        }

        config
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parsed bind address, if the host is a literal IP
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        self.bind_addr().parse().ok()
    }
}
