//! Stdin reader thread: turns lines into bridge commands for the event loop.

use crossbeam_channel::Sender;
use diagnoscope_voice::ipc::{parse_command_line, IpcCommand};
use diagnoscope_voice::log_debug;
use std::io::{self, BufRead};
use std::thread;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum InputEvent {
    Command(IpcCommand),
    Invalid(String),
}

/// Parse a plain-mode line. Blank lines yield `None`.
///
/// `:`-prefixed lines are control commands, `~`-prefixed lines are interim
/// transcripts, and anything else is a final transcript.
pub(crate) fn parse_plain_line(line: &str) -> Option<InputEvent> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(interim) = trimmed.strip_prefix('~') {
        return Some(InputEvent::Command(IpcCommand::Transcript {
            text: interim.trim().to_string(),
            is_final: false,
        }));
    }
    let Some(control) = trimmed.strip_prefix(':') else {
        return Some(InputEvent::Command(IpcCommand::Transcript {
            text: trimmed.to_string(),
            is_final: true,
        }));
    };
    let (name, arg) = match control.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (control, ""),
    };
    let command = match name {
        "toggle" => IpcCommand::Toggle,
        "open" => IpcCommand::Open,
        "close" => IpcCommand::Close,
        "end" => IpcCommand::EngineEnd,
        "status" => IpcCommand::Status,
        "quit" => IpcCommand::Quit,
        "route" if !arg.is_empty() => IpcCommand::Navigate {
            route: arg.to_string(),
        },
        "route" => return Some(InputEvent::Invalid(":route needs a path".to_string())),
        other => return Some(InputEvent::Invalid(format!("unknown command :{other}"))),
    };
    Some(InputEvent::Command(command))
}

fn parse_ipc_line(line: &str) -> Option<InputEvent> {
    match parse_command_line(line) {
        Ok(command) => command.map(InputEvent::Command),
        Err(err) => Some(InputEvent::Invalid(format!("Invalid command: {err}"))),
    }
}

pub(crate) fn spawn_input_thread(tx: Sender<InputEvent>, ipc: bool) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    log_debug(&format!("stdin read error: {err}"));
                    break;
                }
            };
            let event = if ipc {
                parse_ipc_line(&line)
            } else {
                parse_plain_line(&line)
            };
            let Some(event) = event else {
                continue;
            };
            if tx.send(event).is_err() {
                break;
            }
        }
        log_debug("stdin reader thread exiting");
    })
}
