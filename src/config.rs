//! CLI flags plus persisted preferences (`~/.config/diagnoscope-voice/config.toml`).
//!
//! CLI flags always take precedence over persisted values; persisted values
//! take precedence over built-in defaults.

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::log_debug;

pub const DEFAULT_LANG: &str = "en-US";
pub const DEFAULT_SPEECH_RATE: f32 = 1.0;
pub const DEFAULT_SPEECH_PITCH: f32 = 1.0;
pub const MIN_SPEECH_RATE: f32 = 0.1;
pub const MAX_SPEECH_RATE: f32 = 10.0;
pub const MIN_SPEECH_PITCH: f32 = 0.0;
pub const MAX_SPEECH_PITCH: f32 = 2.0;

const CONFIG_FILE: &str = "config.toml";
const CONFIG_DIR_ENV: &str = "DIAGNOSCOPE_VOICE_CONFIG_DIR";
const CONFIG_DIR_NAME: &str = "diagnoscope-voice";

#[derive(Debug, Parser, Clone)]
#[command(
    name = "diagnoscope-voice",
    about = "DiagnoScope voice assistant: spoken commands for the imaging workflow",
    version
)]
pub struct AppConfig {
    /// Recognition and synthesis language tag
    #[arg(long = "lang", env = "DIAGNOSCOPE_VOICE_LANG")]
    pub lang: Option<String>,

    /// Spoken confirmation rate (0.1 - 10.0)
    #[arg(long = "speech-rate")]
    pub speech_rate: Option<f32>,

    /// Spoken confirmation pitch (0.0 - 2.0)
    #[arg(long = "speech-pitch")]
    pub speech_pitch: Option<f32>,

    /// External text-to-speech command; the utterance is appended as the last argument
    #[arg(long = "tts-program", env = "DIAGNOSCOPE_VOICE_TTS")]
    pub tts_program: Option<String>,

    /// Treat the platform as having no speech-to-text capability
    #[arg(long = "no-speech-input", default_value_t = false)]
    pub no_speech_input: bool,

    /// Treat the platform as having no speech-synthesis capability
    #[arg(long = "no-speech-output", default_value_t = false)]
    pub no_speech_output: bool,

    /// Open the assistant panel immediately
    #[arg(long = "start-open", default_value_t = false)]
    pub start_open: bool,

    /// Route the page host starts on
    #[arg(long = "initial-route", default_value = "/")]
    pub initial_route: String,

    /// Exchange newline-delimited JSON on stdin/stdout instead of plain text
    #[arg(long = "ipc", default_value_t = false)]
    pub ipc: bool,

    /// Enable the debug log file and JSON trace log
    #[arg(long = "logs", default_value_t = false)]
    pub logs: bool,

    /// Allow transcripts and case numbers in the debug log
    #[arg(long = "log-content", default_value_t = false)]
    pub log_content: bool,

    /// Force logging off even when other flags enable it
    #[arg(long = "no-logs", default_value_t = false)]
    pub no_logs: bool,
}

/// Persisted preferences. Unknown keys are ignored for forward compatibility.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub lang: Option<String>,
    pub speech_rate: Option<f32>,
    pub speech_pitch: Option<f32>,
    pub tts_program: Option<String>,
}

/// Effective speech settings after merging CLI flags, persisted config, and defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSettings {
    pub lang: String,
    pub rate: f32,
    pub pitch: f32,
    pub tts_command: Option<Vec<String>>,
    pub speech_input: bool,
    pub speech_output: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            lang: DEFAULT_LANG.to_string(),
            rate: DEFAULT_SPEECH_RATE,
            pitch: DEFAULT_SPEECH_PITCH,
            tts_command: None,
            speech_input: true,
            speech_output: true,
        }
    }
}

fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = env::var(CONFIG_DIR_ENV) {
        let trimmed = dir.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME))
}

/// Resolve the persisted config file path.
pub fn config_file_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE))
}

pub fn parse_user_config(contents: &str) -> Result<UserConfig> {
    toml::from_str(contents).context("invalid user config")
}

/// Load persisted preferences from `path`; a missing file yields defaults.
pub fn load_user_config_from(path: &Path) -> Result<UserConfig> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(UserConfig::default()),
        Err(err) => {
            return Err(err).with_context(|| format!("cannot read {}", path.display()));
        }
    };
    parse_user_config(&contents).with_context(|| format!("in {}", path.display()))
}

/// Load persisted preferences, falling back to defaults when the file is bad.
pub fn load_user_config() -> UserConfig {
    let Some(path) = config_file_path() else {
        return UserConfig::default();
    };
    match load_user_config_from(&path) {
        Ok(config) => config,
        Err(err) => {
            log_debug(&format!("user config ignored: {err:#}"));
            UserConfig::default()
        }
    }
}

fn parse_tts_command(raw: &str) -> Result<Option<Vec<String>>> {
    let words =
        shell_words::split(raw).with_context(|| format!("invalid --tts-program value: {raw}"))?;
    if words.is_empty() {
        return Ok(None);
    }
    Ok(Some(words))
}

fn finite_or(value: f32, default: f32, label: &str) -> f32 {
    if value.is_finite() {
        value
    } else {
        log_debug(&format!("{label} must be a finite number; using {default}"));
        default
    }
}

impl VoiceSettings {
    pub fn resolve(cli: &AppConfig, user: &UserConfig) -> Result<Self> {
        let lang = cli
            .lang
            .clone()
            .or_else(|| user.lang.clone())
            .map(|lang| lang.trim().to_string())
            .filter(|lang| !lang.is_empty())
            .unwrap_or_else(|| DEFAULT_LANG.to_string());
        let rate = finite_or(
            cli.speech_rate
                .or(user.speech_rate)
                .unwrap_or(DEFAULT_SPEECH_RATE),
            DEFAULT_SPEECH_RATE,
            "speech rate",
        )
        .clamp(MIN_SPEECH_RATE, MAX_SPEECH_RATE);
        let pitch = finite_or(
            cli.speech_pitch
                .or(user.speech_pitch)
                .unwrap_or(DEFAULT_SPEECH_PITCH),
            DEFAULT_SPEECH_PITCH,
            "speech pitch",
        )
        .clamp(MIN_SPEECH_PITCH, MAX_SPEECH_PITCH);
        let tts_command = match cli.tts_program.as_deref().or(user.tts_program.as_deref()) {
            Some(raw) => parse_tts_command(raw)?,
            None => None,
        };
        Ok(Self {
            lang,
            rate,
            pitch,
            tts_command,
            speech_input: !cli.no_speech_input,
            speech_output: !cli.no_speech_output,
        })
    }
}
