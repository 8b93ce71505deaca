//! Debug log for voice sessions, off unless `--logs` is passed.
//!
//! Lines are `[<unix millis>] <message>`. When the file passes its cap it is
//! moved to `<name>.1` (replacing the previous backup) and a fresh file is
//! started, so at most two generations exist on disk.
//!
//! Spoken content (transcripts, case numbers, replies) goes through
//! [`log_debug_content`], which redacts it unless `--log-content` is set.

use crate::config::AppConfig;
use std::{
    env, fs,
    io::Write,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, PoisonError,
    },
    time::{SystemTime, UNIX_EPOCH},
};

const LOG_MAX_BYTES: u64 = 2 * 1024 * 1024;
const LOG_PATH_ENV: &str = "DIAGNOSCOPE_VOICE_LOG";
const BACKUP_SUFFIX: &str = "1";

static ENABLED: AtomicBool = AtomicBool::new(false);
static SESSION_LOG: Mutex<SessionLog> = Mutex::new(SessionLog {
    file: None,
    reveal_content: false,
});

/// Debug log location; `DIAGNOSCOPE_VOICE_LOG` overrides the temp-dir default.
pub fn log_file_path() -> PathBuf {
    env::var(LOG_PATH_ENV)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| env::temp_dir().join("diagnoscope_voice.log"))
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// Append-only file that rolls over into a single backup generation.
struct RollingFile {
    path: PathBuf,
    file: fs::File,
    cap: u64,
    len: u64,
}

impl RollingFile {
    fn open(path: PathBuf, cap: u64) -> std::io::Result<Self> {
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        let len = file.metadata().map(|meta| meta.len()).unwrap_or(0);
        let mut rolling = Self {
            path,
            file,
            cap,
            len,
        };
        if rolling.len > cap {
            rolling.roll_over()?;
        }
        Ok(rolling)
    }

    fn roll_over(&mut self) -> std::io::Result<()> {
        fs::rename(&self.path, backup_path(&self.path))?;
        self.file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        self.len = 0;
        Ok(())
    }

    fn append(&mut self, line: &str) {
        let incoming = line.len() as u64;
        if self.len > 0 && self.len.saturating_add(incoming) > self.cap {
            if let Err(err) = self.roll_over() {
                let _ = writeln!(self.file, "[log] roll-over failed: {err}");
            }
        }
        if self.file.write_all(line.as_bytes()).is_ok() {
            self.len = self.len.saturating_add(incoming);
        }
    }
}

struct SessionLog {
    file: Option<RollingFile>,
    reveal_content: bool,
}

fn session_log() -> std::sync::MutexGuard<'static, SessionLog> {
    // The logger must not report its own poisoning through itself.
    SESSION_LOG.lock().unwrap_or_else(PoisonError::into_inner)
}

fn configure(enabled: bool, reveal_content: bool) {
    let mut log = session_log();
    log.reveal_content = enabled && reveal_content;
    log.file = if enabled {
        RollingFile::open(log_file_path(), LOG_MAX_BYTES).ok()
    } else {
        None
    };
    ENABLED.store(log.file.is_some(), Ordering::Relaxed);
}

/// Configure the debug log from CLI flags.
pub fn init_logging(config: &AppConfig) {
    configure(config.logs && !config.no_logs, config.log_content);
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

fn write_entry(log: &mut SessionLog, msg: &str) {
    if let Some(file) = log.file.as_mut() {
        file.append(&format!("[{}] {msg}\n", unix_millis()));
    }
}

/// Append one line to the debug log when logging is enabled.
pub fn log_debug(msg: &str) {
    if !ENABLED.load(Ordering::Relaxed) {
        return;
    }
    write_entry(&mut session_log(), msg);
}

/// Render spoken content for the log: quoted when revealed, otherwise only its size.
fn content_field(content: &str, reveal: bool) -> String {
    if reveal {
        format!("{content:?}")
    } else {
        format!("<redacted {} chars>", content.chars().count())
    }
}

/// Log `context` with spoken `content` (a transcript, case number or reply).
/// The content is redacted unless `--log-content` was given.
pub fn log_debug_content(context: &str, content: &str) {
    if !ENABLED.load(Ordering::Relaxed) {
        return;
    }
    let mut log = session_log();
    let field = content_field(content, log.reveal_content);
    write_entry(&mut log, &format!("{context}: {field}"));
}
