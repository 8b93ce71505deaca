//! DiagnoScope voice bridge entrypoint.
//!
//! Reads recognizer transcripts and control commands from stdin, runs them
//! through the assistant shell, and reports state, commands and navigation
//! on stdout.
//!
//! # Architecture
//!
//! - Input thread: reads stdin lines (plain text or JSON with `--ipc`)
//! - Line engine: turns transcript commands into recognizer events
//! - Event loop: applies both streams to the shell and page host in order

mod event_loop;
mod input;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::{bounded, never, unbounded};
use diagnoscope_voice::config::{load_user_config, AppConfig, VoiceSettings};
use diagnoscope_voice::ipc::IpcEvent;
use diagnoscope_voice::pages::PageHost;
use diagnoscope_voice::speech::{LineEngine, ProcessSynth, SpeechOutput};
use diagnoscope_voice::telemetry::{init_tracing, trace_log_path};
use diagnoscope_voice::{init_logging, log_debug, log_file_path, AssistantShell, CommandRouter};

use crate::event_loop::{run_event_loop, Runtime};
use crate::input::spawn_input_thread;
use crate::output::{Emitter, EventSynth};

const INPUT_CHANNEL_CAPACITY: usize = 256;

fn build_output(settings: &VoiceSettings, emitter: Emitter) -> SpeechOutput {
    if !settings.speech_output {
        return SpeechOutput::unsupported();
    }
    let synth = settings
        .tts_command
        .clone()
        .and_then(ProcessSynth::new);
    match synth {
        Some(synth) => {
            log_debug("speech output: external tts program");
            SpeechOutput::new(Box::new(synth), settings)
        }
        None => SpeechOutput::new(Box::new(EventSynth::new(emitter)), settings),
    }
}

fn main() -> Result<()> {
    let config = AppConfig::parse();
    init_logging(&config);
    log_debug("=== DiagnoScope voice bridge started ===");
    log_debug(&format!("Log file: {:?}", log_file_path()));
    if let Some(path) = trace_log_path(&config) {
        match init_tracing(&path) {
            Ok(true) => log_debug(&format!("Trace log: {path:?}")),
            Ok(false) => log_debug("trace log skipped: subscriber already installed"),
            Err(err) => log_debug(&format!("trace log disabled: {err:#}")),
        }
    }

    let user_config = load_user_config();
    let settings =
        VoiceSettings::resolve(&config, &user_config).context("failed to resolve voice settings")?;
    let emitter = Emitter::new(config.ipc);
    let output = build_output(&settings, emitter);

    let router = CommandRouter::new();
    let host = PageHost::new(router.clone(), &config.initial_route);

    let (engine, feed, engine_rx) = if settings.speech_input {
        let (engine_tx, engine_rx) = unbounded();
        let engine = LineEngine::new(engine_tx);
        let feed = engine.feed();
        (Some(engine), Some(feed), engine_rx)
    } else {
        (None, None, never())
    };
    let shell = AssistantShell::new(engine, output, router);

    emitter.emit(&IpcEvent::Ready {
        version: env!("CARGO_PKG_VERSION").to_string(),
        speech_input: settings.speech_input,
        speech_output: settings.speech_output,
        route: host.current_route().to_string(),
        state: shell.state(),
    });

    let mut runtime = Runtime::new(shell, host, feed, emitter);
    runtime.emit_state_if_changed();

    let (input_tx, input_rx) = bounded(INPUT_CHANNEL_CAPACITY);
    // Detached: a blocked stdin read must not hold up shutdown.
    let _input_handle = spawn_input_thread(input_tx, config.ipc);

    if config.start_open {
        runtime.open();
    }
    run_event_loop(&mut runtime, input_rx, engine_rx);
    log_debug("=== DiagnoScope voice bridge exiting ===");
    Ok(())
}
