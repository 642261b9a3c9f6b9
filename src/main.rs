use static_share::config::{AppState, Config};
use static_share::{logger, server};
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Config file path without extension; "config" picks up config.toml
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config".to_string());
    let cfg = Config::load_from(&config_path)?;
    cfg.validate()?;
    logger::init(&cfg)?;

    // Build the Tokio runtime, sizing the worker pool from config
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers.max(1));
    }
    let runtime = runtime_builder.build()?;

    let state = Arc::new(AppState::new(cfg)?);
    runtime.block_on(server::run(state))
}
