// File logging. The terminal is in raw mode, so nothing goes to stderr.

use anyhow::{Context, Result};
use chrono::Local;
use env_logger::{Builder, Target};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

pub fn init(log_path: &Path, level: &str) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    Builder::new()
        .parse_filters(level)
        .target(Target::Pipe(Box::new(file)))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{}] [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.module_path().unwrap_or("cravyn"),
                record.args()
            )
        })
        .try_init()
        .context("Failed to initialize logger")?;

    log::info!("Logging to {} at level {level}", log_path.display());
    Ok(())
}
