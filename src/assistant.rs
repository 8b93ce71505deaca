//! Assistant shell: the always-present widget that ties capture, interpretation,
//! spoken replies and routing together.

use serde::Serialize;

use crate::command::{interpret, VoiceCommand};
use crate::log_debug;
use crate::router::{CommandRouter, DispatchOutcome, Navigator};
use crate::speech::{CaptureSession, EngineEvent, RecognitionEngine, SessionState, SpeechOutput};

pub const FEEDBACK_READY: &str = "Ready";
pub const FEEDBACK_LISTENING: &str = "Listening...";
pub const FEEDBACK_PAUSED: &str = "Paused";
pub const FEEDBACK_UNSUPPORTED: &str = "Voice Not Supported";

/// What happened to one final transcript segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandOutcome {
    Navigated(String),
    Delivered,
    /// Recognized, but no page handler was mounted.
    Dropped,
    Slept,
    /// A rule matched without a usable value; only the reply was spoken.
    Prompted,
    Unrecognized,
}

impl From<DispatchOutcome> for CommandOutcome {
    fn from(outcome: DispatchOutcome) -> Self {
        match outcome {
            DispatchOutcome::Navigate(route) => CommandOutcome::Navigated(route),
            DispatchOutcome::Delivered => CommandOutcome::Delivered,
            DispatchOutcome::Dropped => CommandOutcome::Dropped,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReport {
    pub heard: String,
    pub command: Option<VoiceCommand>,
    pub reply: Option<String>,
    pub outcome: CommandOutcome,
}

pub struct AssistantShell<E: RecognitionEngine> {
    session: CaptureSession<E>,
    router: CommandRouter,
    output: SpeechOutput,
    feedback: String,
    transcript: String,
    last_heard: Option<String>,
}

impl<E: RecognitionEngine> AssistantShell<E> {
    pub fn new(engine: Option<E>, output: SpeechOutput, router: CommandRouter) -> Self {
        let session = CaptureSession::new(engine, output.clone());
        let feedback = if session.is_supported() {
            FEEDBACK_READY
        } else {
            FEEDBACK_UNSUPPORTED
        };
        Self {
            session,
            router,
            output,
            feedback: feedback.to_string(),
            transcript: String::new(),
            last_heard: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.session.is_open()
    }

    pub fn is_listening(&self) -> bool {
        self.session.state() == SessionState::Listening
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn feedback(&self) -> &str {
        &self.feedback
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn last_heard(&self) -> Option<&str> {
        self.last_heard.as_deref()
    }

    pub fn restart_attempts(&self) -> u64 {
        self.session.restart_attempts()
    }

    pub fn toggle(&mut self) -> bool {
        if self.is_open() {
            self.close()
        } else {
            self.open()
        }
    }

    /// Returns `true` when capture actually started.
    pub fn open(&mut self) -> bool {
        if !self.session.is_supported() {
            self.feedback = FEEDBACK_UNSUPPORTED.to_string();
            return false;
        }
        match self.session.open() {
            Ok(opened) => {
                if opened {
                    self.transcript.clear();
                    self.feedback = FEEDBACK_LISTENING.to_string();
                }
                opened
            }
            Err(err) => {
                self.feedback = format!("Voice error: {err}");
                false
            }
        }
    }

    pub fn close(&mut self) -> bool {
        let closed = self.session.close();
        if closed {
            self.feedback = FEEDBACK_PAUSED.to_string();
        }
        closed
    }

    /// Release a spoken reply that finished on its own.
    pub fn reap_speech(&self) {
        self.output.reap();
    }

    /// Silence any reply still playing before the bridge exits.
    pub fn shutdown(&mut self) {
        log_debug("assistant shutting down; cancelling speech");
        self.output.cancel();
    }

    /// Apply an engine notification; finals are interpreted and dispatched in order.
    pub fn handle_engine_event(
        &mut self,
        event: EngineEvent,
        navigator: &mut dyn Navigator,
    ) -> Vec<CommandReport> {
        let lifecycle = match &event {
            EngineEvent::Started => Some(true),
            EngineEvent::Ended => Some(false),
            EngineEvent::Result(_) => None,
        };
        let batch = self.session.handle_event(event);
        if self.session.is_supported() {
            match lifecycle {
                Some(true) if self.is_open() => self.feedback = FEEDBACK_LISTENING.to_string(),
                Some(false) if !self.is_open() => self.feedback = FEEDBACK_PAUSED.to_string(),
                _ => {}
            }
        }
        if let Some(display) = batch.display {
            self.transcript = display;
        }
        let mut reports = Vec::with_capacity(batch.finals.len());
        for segment in batch.finals {
            let report = self.process_phrase(&segment, navigator);
            let slept = report.outcome == CommandOutcome::Slept;
            reports.push(report);
            if slept {
                break;
            }
        }
        reports
    }

    /// Interpret one final phrase and act on it.
    pub fn process_phrase(&mut self, phrase: &str, navigator: &mut dyn Navigator) -> CommandReport {
        self.feedback = format!("Heard: \"{phrase}\"");
        self.last_heard = Some(phrase.to_string());

        let Some(interpretation) = interpret(phrase) else {
            log_debug("voice phrase unrecognized");
            return CommandReport {
                heard: phrase.to_string(),
                command: None,
                reply: None,
                outcome: CommandOutcome::Unrecognized,
            };
        };
        if let Some(reply) = interpretation.reply.as_deref() {
            self.output.speak(reply);
        }
        let outcome = match &interpretation.command {
            None => CommandOutcome::Prompted,
            Some(command) => self.execute(command, navigator),
        };
        CommandReport {
            heard: phrase.to_string(),
            command: interpretation.command,
            reply: interpretation.reply,
            outcome,
        }
    }

    /// Act on a command issued by the host rather than heard. Nothing is spoken.
    pub fn run_command(
        &mut self,
        command: &VoiceCommand,
        navigator: &mut dyn Navigator,
    ) -> CommandOutcome {
        log_debug(&format!("host command: {}", command.action()));
        self.execute(command, navigator)
    }

    fn execute(&mut self, command: &VoiceCommand, navigator: &mut dyn Navigator) -> CommandOutcome {
        if *command == VoiceCommand::Sleep {
            self.close();
            return CommandOutcome::Slept;
        }
        let outcome = self.router.dispatch(command);
        if let DispatchOutcome::Navigate(route) = &outcome {
            navigator.navigate(route);
        }
        outcome.into()
    }
}
