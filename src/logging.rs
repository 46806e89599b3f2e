use anyhow::Result;
use chrono::Local;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Initialize tracing to a log file under the platform cache directory.
///
/// The TUI owns the terminal, so logs never go to stdout; `RUST_LOG`
/// controls the filter (default `datagrid=info`). Returns the log path so
/// the app can surface it in the status line.
pub fn init_logging() -> Result<Option<PathBuf>> {
    let Some(dir) = dirs::cache_dir().map(|d| d.join("datagrid")) else {
        return Ok(None);
    };
    fs::create_dir_all(&dir)?;
    let path = dir.join("datagrid.log");

    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("datagrid=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Arc::new(file))
        .with_ansi(false)
        .init();

    tracing::info!("session started {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    Ok(Some(path))
}
