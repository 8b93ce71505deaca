//! Single-threaded event loop: stdin commands and recognizer events are
//! applied to the assistant shell and page host in arrival order.

use crossbeam_channel::{select, Receiver};
use diagnoscope_voice::assistant::CommandReport;
use diagnoscope_voice::ipc::{IpcCommand, IpcEvent};
use diagnoscope_voice::pages::PageHost;
use diagnoscope_voice::router::Navigator;
use diagnoscope_voice::speech::{EngineEvent, LineEngine, LineFeed, SessionState};
use diagnoscope_voice::{log_debug, ActionKind, AssistantShell, VoiceCommand};

use crate::input::InputEvent;
use crate::output::Emitter;

pub(crate) struct Runtime {
    shell: AssistantShell<LineEngine>,
    host: PageHost,
    feed: Option<LineFeed>,
    emitter: Emitter,
    last_state: Option<(SessionState, bool, String)>,
}

/// Navigator wrapper that reports route changes as they happen.
struct ReportingHost<'a> {
    host: &'a mut PageHost,
    emitter: Emitter,
}

impl Navigator for ReportingHost<'_> {
    fn navigate(&mut self, route: &str) {
        let before = self.host.current_route().to_string();
        self.host.navigate(route);
        if self.host.current_route() != before {
            self.emitter.emit(&IpcEvent::Navigate {
                route: route.to_string(),
            });
        }
    }
}

impl Runtime {
    pub(crate) fn new(
        shell: AssistantShell<LineEngine>,
        host: PageHost,
        feed: Option<LineFeed>,
        emitter: Emitter,
    ) -> Self {
        Self {
            shell,
            host,
            feed,
            emitter,
            last_state: None,
        }
    }

    pub(crate) fn emit_state_if_changed(&mut self) {
        let snapshot = (
            self.shell.state(),
            self.shell.is_open(),
            self.shell.feedback().to_string(),
        );
        if self.last_state.as_ref() == Some(&snapshot) {
            return;
        }
        self.emitter.emit(&IpcEvent::State {
            state: snapshot.0,
            open: snapshot.1,
            feedback: snapshot.2.clone(),
        });
        self.last_state = Some(snapshot);
    }

    fn report(&self, report: &CommandReport) {
        self.emitter.emit(&IpcEvent::Heard {
            text: report.heard.clone(),
            recognized: report.reply.is_some() || report.command.is_some(),
        });
        if let Some(command) = &report.command {
            self.emitter.emit(&IpcEvent::Command {
                action: command.action(),
                value: command.value().map(str::to_string),
                outcome: report.outcome.clone(),
            });
        }
    }

    fn handle_engine_event(&mut self, event: EngineEvent) {
        let mut navigator = ReportingHost {
            host: &mut self.host,
            emitter: self.emitter,
        };
        let reports = self.shell.handle_engine_event(event, &mut navigator);
        for report in &reports {
            self.report(report);
        }
        self.emit_state_if_changed();
    }

    fn status(&self) -> IpcEvent {
        IpcEvent::Status {
            route: self.host.current_route().to_string(),
            state: self.shell.state(),
            open: self.shell.is_open(),
            feedback: self.shell.feedback().to_string(),
            transcript: self.shell.transcript().to_string(),
            restart_attempts: self.shell.restart_attempts(),
            form: self.host.detect_form(),
        }
    }

    fn error(&self, message: impl Into<String>) {
        self.emitter.emit(&IpcEvent::Error {
            message: message.into(),
            recoverable: true,
        });
    }

    /// Run a host-issued `(action, value)` command and report its outcome.
    fn run_host_command(&mut self, action: ActionKind, value: Option<&str>) {
        let Some(command) = VoiceCommand::from_parts(action, value) else {
            self.error(match value {
                Some(value) => format!("invalid value for {action}: {value}"),
                None => format!("{action} needs a value"),
            });
            return;
        };
        let mut navigator = ReportingHost {
            host: &mut self.host,
            emitter: self.emitter,
        };
        let outcome = self.shell.run_command(&command, &mut navigator);
        self.emitter.emit(&IpcEvent::Command {
            action,
            value: command.value().map(str::to_string),
            outcome,
        });
    }

    pub(crate) fn open(&mut self) {
        self.handle_command(IpcCommand::Open);
    }

    /// Apply one host command. Returns `false` when the loop should stop.
    fn handle_command(&mut self, command: IpcCommand) -> bool {
        match command {
            IpcCommand::Toggle => {
                self.shell.toggle();
            }
            IpcCommand::Open => {
                self.shell.open();
            }
            IpcCommand::Close => {
                self.shell.close();
            }
            IpcCommand::Transcript { text, is_final } => match &self.feed {
                Some(feed) => {
                    if !feed.transcript(&text, is_final) {
                        self.error("not listening; transcript ignored");
                    }
                }
                None => self.error("speech input unavailable"),
            },
            IpcCommand::EngineEnd => {
                if let Some(feed) = &self.feed {
                    if !feed.silence_timeout() {
                        log_debug("engine end ignored: not capturing");
                    }
                }
            }
            IpcCommand::Navigate { route } => {
                let mut navigator = ReportingHost {
                    host: &mut self.host,
                    emitter: self.emitter,
                };
                navigator.navigate(&route);
            }
            IpcCommand::Command { action, value } => {
                self.run_host_command(action, value.as_deref());
            }
            IpcCommand::Status => self.emitter.emit(&self.status()),
            IpcCommand::Quit => return false,
        }
        self.emit_state_if_changed();
        true
    }
}

fn drain_engine_events(runtime: &mut Runtime, engine_rx: &Receiver<EngineEvent>) {
    while let Ok(event) = engine_rx.try_recv() {
        runtime.handle_engine_event(event);
    }
}

pub(crate) fn run_event_loop(
    runtime: &mut Runtime,
    input_rx: Receiver<InputEvent>,
    engine_rx: Receiver<EngineEvent>,
) {
    // Events a command produced are applied before the next command is read.
    drain_engine_events(runtime, &engine_rx);
    let mut running = true;
    while running {
        select! {
            recv(input_rx) -> event => {
                match event {
                    Ok(InputEvent::Command(command)) => {
                        running = runtime.handle_command(command);
                        if running {
                            drain_engine_events(runtime, &engine_rx);
                        }
                    }
                    Ok(InputEvent::Invalid(message)) => runtime.error(message),
                    Err(_) => running = false,
                }
            }
            recv(engine_rx) -> event => {
                match event {
                    Ok(event) => runtime.handle_engine_event(event),
                    Err(_) => {
                        log_debug("engine event channel closed");
                        running = false;
                    }
                }
            }
        }
        runtime.shell.reap_speech();
    }
    runtime.shell.shutdown();
    log_debug("event loop exiting");
}
