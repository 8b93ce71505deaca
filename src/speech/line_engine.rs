//! Text-line recognition engine: stdin or IPC transcripts stand in for a microphone.
//!
//! The engine behaves like a browser recognizer. `start` while capturing
//! fails with `AlreadyStarted`, lifecycle changes arrive as events on a
//! channel, and transcripts fed while not capturing are discarded.

use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::engine::{EngineError, EngineEvent, RecognitionEngine, RecognitionEvent, RecognitionResult};
use crate::log_debug;

pub struct LineEngine {
    capturing: Arc<AtomicBool>,
    events: Sender<EngineEvent>,
}

/// Producer side handed to whatever reads transcript lines.
#[derive(Clone)]
pub struct LineFeed {
    capturing: Arc<AtomicBool>,
    events: Sender<EngineEvent>,
}

fn emit(events: &Sender<EngineEvent>, event: EngineEvent) {
    if events.send(event).is_err() {
        log_debug("line engine event dropped: receiver closed");
    }
}

impl LineEngine {
    pub fn new(events: Sender<EngineEvent>) -> Self {
        Self {
            capturing: Arc::new(AtomicBool::new(false)),
            events,
        }
    }

    pub fn feed(&self) -> LineFeed {
        LineFeed {
            capturing: Arc::clone(&self.capturing),
            events: self.events.clone(),
        }
    }

    #[cfg(test)]
    pub(crate) fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }
}

impl RecognitionEngine for LineEngine {
    fn start(&mut self) -> Result<(), EngineError> {
        if self.capturing.swap(true, Ordering::SeqCst) {
            return Err(EngineError::AlreadyStarted);
        }
        emit(&self.events, EngineEvent::Started);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), EngineError> {
        if !self.capturing.swap(false, Ordering::SeqCst) {
            return Err(EngineError::AlreadyStopped);
        }
        emit(&self.events, EngineEvent::Ended);
        Ok(())
    }

    fn abort(&mut self) -> Result<(), EngineError> {
        if self.capturing.swap(false, Ordering::SeqCst) {
            emit(&self.events, EngineEvent::Ended);
        }
        Ok(())
    }
}

impl LineFeed {
    /// Forward one transcript segment. Returns `false` when not capturing.
    pub fn transcript(&self, text: &str, is_final: bool) -> bool {
        if !self.capturing.load(Ordering::SeqCst) {
            return false;
        }
        let result = if is_final {
            RecognitionResult::final_text(text)
        } else {
            RecognitionResult::interim(text)
        };
        emit(
            &self.events,
            EngineEvent::Result(RecognitionEvent::single(result)),
        );
        true
    }

    /// Simulate the engine giving up after silence. Returns `false` when idle.
    pub fn silence_timeout(&self) -> bool {
        if !self.capturing.swap(false, Ordering::SeqCst) {
            return false;
        }
        emit(&self.events, EngineEvent::Ended);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn start_and_stop_emit_lifecycle_events() {
        let (tx, rx) = unbounded();
        let mut engine = LineEngine::new(tx);
        engine.start().expect("start");
        assert_eq!(engine.start(), Err(EngineError::AlreadyStarted));
        engine.stop().expect("stop");
        assert_eq!(engine.stop(), Err(EngineError::AlreadyStopped));
        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events, vec![EngineEvent::Started, EngineEvent::Ended]);
    }

    #[test]
    fn transcripts_only_flow_while_capturing() {
        let (tx, rx) = unbounded();
        let mut engine = LineEngine::new(tx);
        let feed = engine.feed();
        assert!(!feed.transcript("go to dashboard", true));
        engine.start().expect("start");
        assert!(feed.transcript("go to dashboard", true));
        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                EngineEvent::Started,
                EngineEvent::Result(RecognitionEvent::single(RecognitionResult::final_text(
                    "go to dashboard"
                ))),
            ]
        );
    }

    #[test]
    fn silence_timeout_ends_capture() {
        let (tx, rx) = unbounded();
        let mut engine = LineEngine::new(tx);
        let feed = engine.feed();
        engine.start().expect("start");
        assert!(feed.silence_timeout());
        assert!(!engine.is_capturing());
        assert!(!feed.silence_timeout());
        assert_eq!(rx.try_iter().last(), Some(EngineEvent::Ended));
    }

    #[test]
    fn abort_is_quiet_when_idle() {
        let (tx, rx) = unbounded();
        let mut engine = LineEngine::new(tx);
        engine.abort().expect("abort");
        assert!(rx.try_recv().is_err());
    }
}
