//! Continuous capture session that restarts itself after engine timeouts.
//!
//! The engine ends capture on its own (silence, network hiccups). While the
//! session is logically open, every end notification triggers one restart
//! attempt. "Logically open" lives in a shared [`DesiredOpen`] cell that is
//! read at notification time, so an end event queued before `close()` can
//! never revive a closed session.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::engine::{EngineError, EngineEvent, RecognitionEngine, RecognitionEvent};
use super::output::SpeechOutput;
use crate::{log_debug, log_debug_content};

pub const ACTIVATED_REPLY: &str = "Voice assistant activated.";
pub const DEACTIVATED_REPLY: &str = "Voice assistant deactivated.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Listening,
    Paused,
    Unsupported,
}

impl SessionState {
    pub fn label(self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Listening => "listening",
            SessionState::Paused => "paused",
            SessionState::Unsupported => "unsupported",
        }
    }
}

/// Shared "should be capturing" flag written by `open`/`close`.
#[derive(Debug, Clone, Default)]
pub struct DesiredOpen(Arc<AtomicBool>);

impl DesiredOpen {
    pub fn get(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn set(&self, open: bool) -> bool {
        self.0.swap(open, Ordering::SeqCst)
    }
}

/// Transcript text produced by one result event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptBatch {
    /// Final segments, each to be interpreted exactly once.
    pub finals: Vec<String>,
    /// Live display text: interim text when present, otherwise the finals.
    pub display: Option<String>,
}

impl TranscriptBatch {
    fn from_event(event: &RecognitionEvent) -> Self {
        let mut finals = Vec::new();
        let mut interim = String::new();
        for result in event.fresh_results() {
            let Some(text) = result.top() else {
                continue;
            };
            if result.is_final {
                finals.push(text.to_string());
            } else {
                interim.push_str(text);
            }
        }
        let display = if !interim.is_empty() {
            Some(interim)
        } else if !finals.is_empty() {
            Some(finals.concat())
        } else {
            None
        };
        Self { finals, display }
    }
}

pub struct CaptureSession<E: RecognitionEngine> {
    engine: Option<E>,
    desired_open: DesiredOpen,
    state: SessionState,
    output: SpeechOutput,
    restart_attempts: u64,
}

impl<E: RecognitionEngine> CaptureSession<E> {
    /// `engine` is `None` when the platform has no speech-to-text support.
    pub fn new(engine: Option<E>, output: SpeechOutput) -> Self {
        let state = if engine.is_some() {
            SessionState::Idle
        } else {
            SessionState::Unsupported
        };
        Self {
            engine,
            desired_open: DesiredOpen::default(),
            state,
            output,
            restart_attempts: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_supported(&self) -> bool {
        self.engine.is_some()
    }

    pub fn is_open(&self) -> bool {
        self.desired_open.get()
    }

    pub fn desired_open(&self) -> DesiredOpen {
        self.desired_open.clone()
    }

    /// Self-restarts attempted after engine end notifications.
    pub fn restart_attempts(&self) -> u64 {
        self.restart_attempts
    }

    /// Begin capture. Returns `Ok(false)` when already open or unsupported.
    ///
    /// Start/stop races from the engine are swallowed; any other engine
    /// failure leaves the session closed and is returned.
    pub fn open(&mut self) -> Result<bool, EngineError> {
        let Some(engine) = self.engine.as_mut() else {
            return Ok(false);
        };
        if self.desired_open.set(true) {
            return Ok(false);
        }
        match engine.start() {
            Ok(()) => {
                log_debug("voice session opened");
                self.state = SessionState::Listening;
                self.output.speak(ACTIVATED_REPLY);
                Ok(true)
            }
            Err(err) if err.is_benign() => {
                log_debug(&format!("voice session open: {err}"));
                self.state = SessionState::Listening;
                Ok(true)
            }
            Err(err) => {
                log_debug(&format!("voice session failed to open: {err}"));
                self.desired_open.set(false);
                self.state = SessionState::Paused;
                Err(err)
            }
        }
    }

    /// Stop capture. Returns `false` when already closed or unsupported.
    pub fn close(&mut self) -> bool {
        let Some(engine) = self.engine.as_mut() else {
            return false;
        };
        if !self.desired_open.set(false) {
            return false;
        }
        if let Err(err) = engine.stop() {
            log_debug(&format!("voice session stop ignored: {err}"));
        }
        log_debug("voice session closed");
        self.state = SessionState::Paused;
        self.output.speak(DEACTIVATED_REPLY);
        true
    }

    /// Apply one asynchronous engine notification.
    pub fn handle_event(&mut self, event: EngineEvent) -> TranscriptBatch {
        let Some(engine) = self.engine.as_mut() else {
            return TranscriptBatch::default();
        };
        match event {
            EngineEvent::Started => {
                if self.desired_open.get() {
                    self.state = SessionState::Listening;
                } else {
                    log_debug("voice engine started after close; staying paused");
                }
                TranscriptBatch::default()
            }
            EngineEvent::Ended => {
                if self.desired_open.get() {
                    self.restart_attempts += 1;
                    log_debug("voice session ended while open; restarting");
                    if let Err(err) = engine.start() {
                        log_debug(&format!("voice session restart failed: {err}"));
                    }
                } else {
                    self.state = SessionState::Paused;
                }
                TranscriptBatch::default()
            }
            EngineEvent::Result(result) => {
                if !self.desired_open.get() {
                    log_debug("voice result dropped after close");
                    return TranscriptBatch::default();
                }
                let batch = TranscriptBatch::from_event(&result);
                for text in &batch.finals {
                    log_debug_content("final transcript", text);
                }
                batch
            }
        }
    }
}

impl<E: RecognitionEngine> Drop for CaptureSession<E> {
    fn drop(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            let _ = engine.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VoiceSettings;
    use crate::speech::engine::RecognitionResult;
    use crate::speech::test_support::{EngineCall, FakeEngine, RecordingSynth};

    fn session_with(engine: &FakeEngine) -> (CaptureSession<FakeEngine>, RecordingSynth) {
        let synth = RecordingSynth::default();
        let output = SpeechOutput::new(Box::new(synth.clone()), &VoiceSettings::default());
        (CaptureSession::new(Some(engine.clone()), output), synth)
    }

    #[test]
    fn open_starts_engine_and_confirms() {
        let engine = FakeEngine::default();
        let (mut session, synth) = session_with(&engine);

        assert_eq!(session.open(), Ok(true));
        assert_eq!(session.state(), SessionState::Listening);
        assert_eq!(engine.calls(), vec![EngineCall::Start]);
        assert_eq!(synth.spoken(), vec![ACTIVATED_REPLY.to_string()]);
    }

    #[test]
    fn second_open_is_noop() {
        let engine = FakeEngine::default();
        let (mut session, _synth) = session_with(&engine);
        session.open().expect("open");
        assert_eq!(session.open(), Ok(false));
        assert_eq!(engine.start_count(), 1);
    }

    #[test]
    fn already_started_error_is_swallowed_without_confirmation() {
        let engine = FakeEngine::default();
        engine.queue_start_result(Err(EngineError::AlreadyStarted));
        let (mut session, synth) = session_with(&engine);
        assert_eq!(session.open(), Ok(true));
        assert_eq!(session.state(), SessionState::Listening);
        assert!(synth.spoken().is_empty());
    }

    #[test]
    fn hard_start_failure_leaves_session_closed() {
        let engine = FakeEngine::default();
        engine.queue_start_result(Err(EngineError::Failed("mic denied".to_string())));
        let (mut session, _synth) = session_with(&engine);
        assert!(session.open().is_err());
        assert!(!session.is_open());
        assert_eq!(session.state(), SessionState::Paused);
    }

    #[test]
    fn close_stops_engine_and_confirms() {
        let engine = FakeEngine::default();
        let (mut session, synth) = session_with(&engine);
        session.open().expect("open");
        assert!(session.close());
        assert_eq!(session.state(), SessionState::Paused);
        assert_eq!(engine.calls(), vec![EngineCall::Start, EngineCall::Stop]);
        assert_eq!(synth.audible().as_deref(), Some(DEACTIVATED_REPLY));
        assert!(!session.close());
    }

    #[test]
    fn end_after_close_does_not_restart() {
        let engine = FakeEngine::default();
        let (mut session, _synth) = session_with(&engine);
        session.open().expect("open");
        session.close();
        session.handle_event(EngineEvent::Ended);
        assert_eq!(engine.start_count(), 1);
        assert_eq!(session.restart_attempts(), 0);
        assert_eq!(session.state(), SessionState::Paused);
    }

    #[test]
    fn started_after_close_stays_paused() {
        let engine = FakeEngine::default();
        let (mut session, _synth) = session_with(&engine);
        session.open().expect("open");
        session.close();
        session.handle_event(EngineEvent::Started);
        assert_eq!(session.state(), SessionState::Paused);
        assert!(!session.is_open());
    }

    #[test]
    fn end_while_open_restarts_exactly_once() {
        let engine = FakeEngine::default();
        let (mut session, _synth) = session_with(&engine);
        session.open().expect("open");
        session.handle_event(EngineEvent::Ended);
        assert_eq!(engine.start_count(), 2);
        assert_eq!(session.restart_attempts(), 1);
        assert_eq!(session.state(), SessionState::Listening);
    }

    #[test]
    fn failed_restart_waits_for_next_end_event() {
        let engine = FakeEngine::default();
        let (mut session, _synth) = session_with(&engine);
        session.open().expect("open");
        engine.queue_start_result(Err(EngineError::Failed("busy".to_string())));
        session.handle_event(EngineEvent::Ended);
        assert_eq!(engine.start_count(), 2);
        session.handle_event(EngineEvent::Ended);
        assert_eq!(engine.start_count(), 3);
        assert!(session.is_open());
    }

    #[test]
    fn restart_guard_reads_current_desired_state() {
        let engine = FakeEngine::default();
        let (mut session, _synth) = session_with(&engine);
        let cell = session.desired_open();
        session.open().expect("open");
        assert!(cell.get());
        session.close();
        assert!(!cell.get());
        session.handle_event(EngineEvent::Ended);
        assert_eq!(session.restart_attempts(), 0);
    }

    #[test]
    fn finals_are_dispatched_once_and_interims_only_displayed() {
        let engine = FakeEngine::default();
        let (mut session, _synth) = session_with(&engine);
        session.open().expect("open");

        let interim = session.handle_event(EngineEvent::Result(RecognitionEvent::single(
            RecognitionResult::interim("go to"),
        )));
        assert!(interim.finals.is_empty());
        assert_eq!(interim.display.as_deref(), Some("go to"));

        let batch = session.handle_event(EngineEvent::Result(RecognitionEvent {
            result_index: 1,
            results: vec![
                RecognitionResult::final_text("ignored earlier segment"),
                RecognitionResult::final_text("go to dashboard"),
                RecognitionResult::interim("conf"),
            ],
        }));
        assert_eq!(batch.finals, vec!["go to dashboard".to_string()]);
        assert_eq!(batch.display.as_deref(), Some("conf"));
    }

    #[test]
    fn top_alternative_only() {
        let engine = FakeEngine::default();
        let (mut session, _synth) = session_with(&engine);
        session.open().expect("open");
        let batch = session.handle_event(EngineEvent::Result(RecognitionEvent::single(
            RecognitionResult {
                is_final: true,
                alternatives: vec!["mri".to_string(), "marie".to_string()],
            },
        )));
        assert_eq!(batch.finals, vec!["mri".to_string()]);
        assert_eq!(batch.display.as_deref(), Some("mri"));
    }

    #[test]
    fn results_after_close_are_dropped() {
        let engine = FakeEngine::default();
        let (mut session, _synth) = session_with(&engine);
        session.open().expect("open");
        session.close();
        let batch = session.handle_event(EngineEvent::Result(RecognitionEvent::single(
            RecognitionResult::final_text("confirm"),
        )));
        assert_eq!(batch, TranscriptBatch::default());
    }

    #[test]
    fn unsupported_session_is_inert() {
        let synth = RecordingSynth::default();
        let output = SpeechOutput::new(Box::new(synth.clone()), &VoiceSettings::default());
        let mut session: CaptureSession<FakeEngine> = CaptureSession::new(None, output);
        assert_eq!(session.state(), SessionState::Unsupported);
        assert_eq!(session.open(), Ok(false));
        assert!(!session.close());
        session.handle_event(EngineEvent::Started);
        assert_eq!(session.state(), SessionState::Unsupported);
        assert!(synth.spoken().is_empty());
    }

    #[test]
    fn drop_aborts_engine() {
        let engine = FakeEngine::default();
        let (session, _synth) = session_with(&engine);
        drop(session);
        assert_eq!(engine.calls(), vec![EngineCall::Abort]);
    }
}
