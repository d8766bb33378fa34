use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use rolling_logger::{fields, global, tracing_bridge, LoggerConfig};

fn main() -> Result<()> {
    // Optional TOML config path; defaults to JSON on stdout at debug level
    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => LoggerConfig::load(&path)?,
        None => LoggerConfig {
            style: "json".to_string(),
            ..LoggerConfig::default()
        },
    };

    let logger = global::try_init(&config)?;
    tracing_bridge::install(&logger)?;

    match logger.file_path() {
        Some(path) => tracing::info!("Logging to: {}", path.display()),
        None => tracing::info!("Logging to stdout only"),
    }

    global::debug_kv("not find", "consul", "192.168.1.2");
    global::debug("this is log out");
    global::info("this is info");
    rolling_logger::warnf!("this is warn:{}", "warning");
    global::error("this is error");
    global::error_fields("this is zap error", fields!());
    global::error_fields("this is zap error", fields!("user" => "us"));
    global::info_kv("request finished", "took", Duration::from_millis(1500));

    global::sync()?;
    Ok(())
}
