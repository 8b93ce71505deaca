//! JSON trace log of command dispatches (`tracing` events with action and outcome fields).

use anyhow::{Context, Result};
use std::env;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::fmt::time::UtcTime;

use crate::config::AppConfig;

const TRACE_LOG_ENV: &str = "DIAGNOSCOPE_VOICE_TRACE_LOG";
const TRACE_LOG_FILE: &str = "diagnoscope_voice_trace.jsonl";

/// Where dispatch traces go, or `None` when `--logs` is off (or `--no-logs` wins).
pub fn trace_log_path(config: &AppConfig) -> Option<PathBuf> {
    if !config.logs || config.no_logs {
        return None;
    }
    let path = env::var_os(TRACE_LOG_ENV)
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| env::temp_dir().join(TRACE_LOG_FILE));
    Some(path)
}

/// One flattened JSON object per event, UTC timestamps, INFO and above.
fn dispatch_subscriber(file: File) -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_span_list(false)
        .with_target(false)
        .with_max_level(Level::INFO)
        .with_timer(UtcTime::rfc_3339())
        .with_writer(file)
        .finish()
}

/// Install the trace subscriber writing to `path`.
///
/// Returns `Ok(false)` when another global subscriber is already installed.
pub fn init_tracing(path: &Path) -> Result<bool> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open trace log {}", path.display()))?;
    Ok(tracing::subscriber::set_global_default(dispatch_subscriber(file)).is_ok())
}
