use std::path::PathBuf;

use clap::Parser;
use configs::AppConfig;
use dotenvy::dotenv;
use tracing::{error, info};
use uuid::Uuid;

/// Serve every collection of a JSON document as a REST API.
#[derive(Parser, Debug)]
#[command(name = "json-rest", version, about)]
struct Cli {
    /// Defines which file will represent the api database
    #[arg(long, value_name = "FILE")]
    watch: Option<PathBuf>,

    /// Defines the server port
    #[arg(short, long)]
    port: Option<u16>,

    /// Defines the interface to bind
    #[arg(long)]
    host: Option<String>,

    /// Write the json file on one line instead of indented
    #[arg(long)]
    minified: bool,

    /// TOML config file (defaults to $CONFIG_PATH or config.toml when present)
    #[arg(long, value_name = "FILE")]
    config: Option<String>,

    /// Serve /healthz and /metrics on this address
    #[arg(long, value_name = "ADDR")]
    admin_addr: Option<String>,

    /// Emit JSON structured logs
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    /// Config file (or env fallback) overlaid with whatever was passed on the command line.
    fn into_config(self) -> anyhow::Result<AppConfig> {
        let mut cfg = match &self.config {
            Some(path) => configs::load_from_file(path)
                .map_err(|e| anyhow::anyhow!("cannot load config {path}: {e}"))?,
            None => AppConfig::load_or_env(),
        };
        if let Some(file) = self.watch {
            cfg.storage.file = file;
        }
        if let Some(port) = self.port {
            cfg.server.port = port;
        }
        if let Some(host) = self.host {
            cfg.server.host = host;
        }
        if self.minified {
            cfg.storage.minified = true;
        }
        if let Some(addr) = self.admin_addr {
            cfg.admin.addr = Some(addr);
        }
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }
}

fn main() -> std::process::ExitCode {
    // load .env before reading RUST_LOG / config env vars
    dotenv().ok();
    let cli = Cli::parse();
    common::utils::logging::init_logging(cli.log_json);
    info!(service = "json-rest", event = "logger_init", "tracing subscriber initialized");

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "json-rest",
            event = "panic",
            %service_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    let cfg = match cli.into_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = "json-rest", event = "config_invalid", error = %e, "invalid configuration");
            return std::process::ExitCode::FAILURE;
        }
    };

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = cfg.server.worker_threads { builder.worker_threads(w); }

    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "json-rest", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(
        service = "json-rest",
        event = "start",
        %service_id,
        pid,
        version,
        threads = cfg.server.worker_threads.unwrap_or_default(),
        file = %cfg.storage.file.display(),
        "server starting"
    );

    rt.block_on(async move {
        match server::run(cfg).await {
            Ok(()) => {
                info!(service = "json-rest", event = "stop", %service_id, pid, "server stopped normally");
                std::process::ExitCode::SUCCESS
            }
            Err(e) => {
                error!(service = "json-rest", event = "run_failed", error = %e, "server::run returned error");
                std::process::ExitCode::FAILURE
            }
        }
    })
}
