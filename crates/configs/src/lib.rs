use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), worker_threads: Some(4) }
    }
}

/// Where the backing JSON document lives and how it is rewritten.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_db_file")]
    pub file: PathBuf,
    /// Write the document on one line instead of indented.
    #[serde(default)]
    pub minified: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { file: default_db_file(), minified: false }
    }
}

/// Optional admin listener for `/healthz` and `/metrics`. Disabled when `addr` is unset.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AdminConfig {
    #[serde(default)]
    pub addr: Option<String>,
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }
fn default_db_file() -> PathBuf { PathBuf::from("db.json") }

pub fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_default() -> Result<AppConfig> {
    load_from_file(&config_path())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

/// Defaults overlaid with `SERVER_HOST`, `SERVER_PORT`, `DB_FILE`, `DB_MINIFIED`,
/// `TOKIO_WORKER_THREADS` and `ADMIN_ADDR`; used when no config file is present.
pub fn from_env() -> AppConfig {
    let mut cfg = AppConfig::default();
    if let Ok(host) = std::env::var("SERVER_HOST") {
        cfg.server.host = host;
    }
    if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
        cfg.server.port = port;
    }
    if let Some(w) = std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse::<usize>().ok()) {
        cfg.server.worker_threads = Some(w);
    }
    if let Ok(file) = std::env::var("DB_FILE") {
        cfg.storage.file = PathBuf::from(file);
    }
    if let Ok(v) = std::env::var("DB_MINIFIED") {
        cfg.storage.minified = matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
    }
    if let Ok(addr) = std::env::var("ADMIN_ADDR") {
        cfg.admin.addr = Some(addr);
    }
    cfg
}

impl AppConfig {
    /// Load the config file if present, otherwise fall back to env vars.
    pub fn load_or_env() -> Self {
        load_default().unwrap_or_else(|_| from_env())
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.validate()?;
        self.admin.validate()?;
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.server.bind_addr()
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 { self.worker_threads = Some(4); }
        } else {
            self.worker_threads = Some(4);
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let host = if self.host == "localhost" { "127.0.0.1" } else { self.host.as_str() };
        format!("{}:{}", host, self.port)
            .parse()
            .map_err(|e| anyhow!("invalid bind address {}:{}: {e}", self.host, self.port))
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<()> {
        if self.file.as_os_str().is_empty() {
            return Err(anyhow!("storage.file is empty; pass --watch or set DB_FILE"));
        }
        Ok(())
    }
}

impl AdminConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(addr) = &self.addr {
            addr.parse::<SocketAddr>()
                .map_err(|e| anyhow!("admin.addr {addr} is not a socket address: {e}"))?;
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Option<SocketAddr> {
        self.addr.as_deref().and_then(|a| a.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cli_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.storage.file, PathBuf::from("db.json"));
        assert!(!cfg.storage.minified);
        assert!(cfg.admin.addr.is_none());
    }

    #[test]
    fn parses_partial_toml() -> Result<()> {
        let cfg = load_from_str(
            r#"
            [server]
            port = 3000

            [storage]
            file = "data/people.json"
            minified = true
            "#,
        )?;
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.storage.file, PathBuf::from("data/people.json"));
        assert!(cfg.storage.minified);
        Ok(())
    }

    #[test]
    fn zero_port_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.server.port = 0;
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn empty_document_path_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.storage.file = PathBuf::new();
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn blank_host_and_zero_workers_are_normalized() -> Result<()> {
        let mut cfg = AppConfig::default();
        cfg.server.host = "  ".into();
        cfg.server.worker_threads = Some(0);
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.worker_threads, Some(4));
        Ok(())
    }

    #[test]
    fn bind_addr_accepts_localhost() -> Result<()> {
        let mut cfg = AppConfig::default();
        cfg.server.host = "localhost".into();
        assert_eq!(cfg.bind_addr()?, "127.0.0.1:8080".parse::<SocketAddr>()?);
        Ok(())
    }

    #[test]
    fn bad_admin_addr_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.admin.addr = Some("not-an-addr".into());
        assert!(cfg.normalize_and_validate().is_err());
    }
}
