//! Event output for both modes: JSON lines under `--ipc`, readable lines otherwise.

use diagnoscope_voice::ipc::{send_event, IpcEvent};
use diagnoscope_voice::speech::{SpeechSynth, SynthError, Utterance};
use std::io::{self, Write};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use diagnoscope_voice::log_debug;

const TRANSCRIPT_PREVIEW_COLUMNS: usize = 48;

fn sanitize(text: &str) -> String {
    text.chars()
        .map(|ch| if ch.is_control() { ' ' } else { ch })
        .collect()
}

/// Clip `text` to `max_width` terminal columns, marking the cut with `…`.
pub(crate) fn truncate_display(text: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(text) <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let budget = max_width - 1;
    let mut result = String::new();
    let mut width = 0usize;
    for ch in text.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if width.saturating_add(ch_width) > budget {
            break;
        }
        result.push(ch);
        width = width.saturating_add(ch_width);
    }
    result.push('…');
    result
}

pub(crate) fn plain_line(event: &IpcEvent) -> String {
    match event {
        IpcEvent::Ready {
            version,
            speech_input,
            speech_output,
            route,
            state,
        } => format!(
            "diagnoscope-voice {version} ready: route={route} state={} input={speech_input} output={speech_output}",
            state.label()
        ),
        IpcEvent::State {
            state, feedback, ..
        } => format!("[{}] {}", state.label(), sanitize(feedback)),
        IpcEvent::Heard { text, recognized } => {
            let suffix = if *recognized { "" } else { " (no command)" };
            format!("heard: \"{}\"{suffix}", sanitize(text))
        }
        IpcEvent::Command {
            action,
            value,
            outcome,
        } => match value {
            Some(value) => format!("command: {action} {} -> {outcome:?}", sanitize(value)),
            None => format!("command: {action} -> {outcome:?}"),
        },
        IpcEvent::Navigate { route } => format!("navigate: {route}"),
        IpcEvent::Speak { text } => format!("speak: {}", sanitize(text)),
        IpcEvent::Status {
            route,
            state,
            open,
            transcript,
            restart_attempts,
            form,
            ..
        } => {
            let mut line = format!(
                "status: route={route} state={} open={open} restarts={restart_attempts} transcript=\"{}\"",
                state.label(),
                truncate_display(&sanitize(transcript), TRANSCRIPT_PREVIEW_COLUMNS)
            );
            if let Some(form) = form {
                line.push_str(&format!(
                    " case=\"{}\" report={} disease={} focus={:?} uploads={} analyses={}",
                    sanitize(&form.case_name),
                    form.report_type.map(|kind| kind.label()).unwrap_or("-"),
                    form.disease.map(|disease| disease.label()).unwrap_or("-"),
                    form.focus,
                    form.upload_dialog_requests,
                    form.analysis_requests
                ));
            }
            line
        }
        IpcEvent::Error { message, .. } => format!("error: {}", sanitize(message)),
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Emitter {
    ipc: bool,
}

impl Emitter {
    pub(crate) fn new(ipc: bool) -> Self {
        Self { ipc }
    }

    pub(crate) fn emit(&self, event: &IpcEvent) {
        if self.ipc {
            send_event(event);
            return;
        }
        let line = plain_line(event);
        let result = if matches!(event, IpcEvent::Error { .. }) {
            writeln!(io::stderr().lock(), "{line}")
        } else {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{line}").and_then(|()| stdout.flush())
        };
        if let Err(err) = result {
            log_debug(&format!("plain output write failed: {err}"));
        }
    }
}

/// Synthesizer used when no external TTS program is configured: replies are
/// reported to the host as `speak` events.
pub(crate) struct EventSynth {
    emitter: Emitter,
}

impl EventSynth {
    pub(crate) fn new(emitter: Emitter) -> Self {
        Self { emitter }
    }
}

impl SpeechSynth for EventSynth {
    fn speak(&mut self, utterance: &Utterance) -> Result<(), SynthError> {
        self.emitter.emit(&IpcEvent::Speak {
            text: utterance.text.clone(),
        });
        Ok(())
    }

    fn cancel(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use diagnoscope_voice::assistant::CommandOutcome;
    use diagnoscope_voice::{ActionKind, SessionState};

    #[test]
    fn truncate_display_respects_wide_chars() {
        assert_eq!(truncate_display("short", 10), "short");
        assert_eq!(truncate_display("abcdefgh", 5), "abcd…");
        assert_eq!(truncate_display("日本語テキスト", 5), "日本…");
        assert_eq!(truncate_display("abc", 0), "");
    }

    #[test]
    fn plain_lines_are_readable() {
        assert_eq!(
            plain_line(&IpcEvent::State {
                state: SessionState::Listening,
                open: true,
                feedback: "Listening...".to_string()
            }),
            "[listening] Listening..."
        );
        assert_eq!(
            plain_line(&IpcEvent::Command {
                action: ActionKind::Navigate,
                value: Some("/dashboard".to_string()),
                outcome: CommandOutcome::Navigated("/dashboard".to_string()),
            }),
            "command: NAVIGATE /dashboard -> Navigated(\"/dashboard\")"
        );
        assert_eq!(
            plain_line(&IpcEvent::Heard {
                text: "hello\tthere".to_string(),
                recognized: false
            }),
            "heard: \"hello there\" (no command)"
        );
    }
}
