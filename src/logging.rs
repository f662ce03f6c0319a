use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter directive
pub const LOG_ENV: &str = "GUIDE_LOG";

fn filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default))
}

/// CLI logging: stderr, quiet unless `GUIDE_LOG` asks for more.
pub fn init_cli() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter("warn"))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Console logging: the terminal belongs to the UI, so entries go to
/// `log_path` at `level` (or whatever `GUIDE_LOG` says).
pub fn init_console(log_path: &Path, level: &str) -> std::io::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(level))
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}
