//! Fakes for the speech boundaries shared by unit tests.

use std::sync::{Arc, Mutex};

use super::engine::{EngineError, RecognitionEngine};
use super::output::{SpeechSynth, SynthError, Utterance};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EngineCall {
    Start,
    Stop,
    Abort,
}

#[derive(Default)]
struct EngineLog {
    calls: Vec<EngineCall>,
    start_results: Vec<Result<(), EngineError>>,
}

/// Engine fake that records calls and replays queued `start` results.
#[derive(Clone, Default)]
pub(crate) struct FakeEngine {
    log: Arc<Mutex<EngineLog>>,
}

impl FakeEngine {
    pub(crate) fn calls(&self) -> Vec<EngineCall> {
        self.log.lock().expect("engine log").calls.clone()
    }

    pub(crate) fn start_count(&self) -> usize {
        self.calls()
            .into_iter()
            .filter(|call| *call == EngineCall::Start)
            .count()
    }

    /// Queue results for upcoming `start` calls; unqueued starts succeed.
    pub(crate) fn queue_start_result(&self, result: Result<(), EngineError>) {
        self.log
            .lock()
            .expect("engine log")
            .start_results
            .push(result);
    }
}

impl RecognitionEngine for FakeEngine {
    fn start(&mut self) -> Result<(), EngineError> {
        let mut log = self.log.lock().expect("engine log");
        log.calls.push(EngineCall::Start);
        if log.start_results.is_empty() {
            Ok(())
        } else {
            log.start_results.remove(0)
        }
    }

    fn stop(&mut self) -> Result<(), EngineError> {
        self.log.lock().expect("engine log").calls.push(EngineCall::Stop);
        Ok(())
    }

    fn abort(&mut self) -> Result<(), EngineError> {
        self.log.lock().expect("engine log").calls.push(EngineCall::Abort);
        Ok(())
    }
}

#[derive(Default)]
struct SynthLog {
    spoken: Vec<String>,
    utterances: Vec<Utterance>,
    audible: Option<String>,
    max_concurrent: usize,
    reaps: usize,
    fail: bool,
}

/// Synth fake that tracks which utterance is currently audible.
#[derive(Clone, Default)]
pub(crate) struct RecordingSynth {
    log: Arc<Mutex<SynthLog>>,
}

impl RecordingSynth {
    pub(crate) fn failing() -> Self {
        let synth = Self::default();
        synth.log.lock().expect("synth log").fail = true;
        synth
    }

    pub(crate) fn spoken(&self) -> Vec<String> {
        self.log.lock().expect("synth log").spoken.clone()
    }

    pub(crate) fn audible(&self) -> Option<String> {
        self.log.lock().expect("synth log").audible.clone()
    }

    pub(crate) fn max_concurrent(&self) -> usize {
        self.log.lock().expect("synth log").max_concurrent
    }

    pub(crate) fn reaps(&self) -> usize {
        self.log.lock().expect("synth log").reaps
    }

    pub(crate) fn last_utterance(&self) -> Option<Utterance> {
        self.log.lock().expect("synth log").utterances.last().cloned()
    }
}

impl SpeechSynth for RecordingSynth {
    fn speak(&mut self, utterance: &Utterance) -> Result<(), SynthError> {
        let mut log = self.log.lock().expect("synth log");
        if log.fail {
            return Err(SynthError::Failed("synth offline".to_string()));
        }
        let concurrent = usize::from(log.audible.is_some()) + 1;
        log.max_concurrent = log.max_concurrent.max(concurrent);
        log.audible = Some(utterance.text.clone());
        log.spoken.push(utterance.text.clone());
        log.utterances.push(utterance.clone());
        Ok(())
    }

    fn cancel(&mut self) {
        self.log.lock().expect("synth log").audible = None;
    }

    fn reap(&mut self) {
        self.log.lock().expect("synth log").reaps += 1;
    }
}
