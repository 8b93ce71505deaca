//! JSON-lines protocol used by `diagnoscope-voice --ipc`.

pub mod protocol;

pub use protocol::{IpcCommand, IpcEvent};

use std::io::{self, Write};

use crate::log_debug;

/// Serialize one event as a single JSON line and flush.
pub fn write_event<W: Write>(out: &mut W, event: &IpcEvent) -> io::Result<()> {
    let json = serde_json::to_string(event).map_err(io::Error::other)?;
    writeln!(out, "{json}")?;
    out.flush()
}

/// Write an event to stdout. Failures are logged, never raised.
pub fn send_event(event: &IpcEvent) {
    let mut stdout = io::stdout().lock();
    if let Err(err) = write_event(&mut stdout, event) {
        log_debug(&format!("ipc event sink write failed: {err}"));
    }
}

/// Parse one stdin line. `Ok(None)` for blank lines.
pub fn parse_command_line(line: &str) -> Result<Option<IpcCommand>, serde_json::Error> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(trimmed).map(Some)
}
