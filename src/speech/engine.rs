//! Recognition engine boundary: lifecycle calls in, start/end/result events out.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("recognition already started")]
    AlreadyStarted,
    #[error("recognition already stopped")]
    AlreadyStopped,
    #[error("recognition engine failure: {0}")]
    Failed(String),
}

impl EngineError {
    /// Start/stop races that callers treat as success.
    pub fn is_benign(&self) -> bool {
        matches!(self, EngineError::AlreadyStarted | EngineError::AlreadyStopped)
    }
}

/// Continuous speech-to-text engine. Calls return immediately; the engine
/// reports lifecycle changes asynchronously through [`EngineEvent`]s.
pub trait RecognitionEngine {
    fn start(&mut self) -> Result<(), EngineError>;
    fn stop(&mut self) -> Result<(), EngineError>;
    fn abort(&mut self) -> Result<(), EngineError>;
}

/// One recognition segment with its ranked alternatives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionResult {
    pub is_final: bool,
    pub alternatives: Vec<String>,
}

impl RecognitionResult {
    pub fn final_text(text: impl Into<String>) -> Self {
        Self {
            is_final: true,
            alternatives: vec![text.into()],
        }
    }

    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            is_final: false,
            alternatives: vec![text.into()],
        }
    }

    /// Highest-ranked alternative; the only one the session reads.
    pub fn top(&self) -> Option<&str> {
        self.alternatives.first().map(String::as_str)
    }
}

/// A result notification. Entries before `result_index` were already
/// delivered by earlier events and are skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionEvent {
    pub result_index: usize,
    pub results: Vec<RecognitionResult>,
}

impl RecognitionEvent {
    pub fn single(result: RecognitionResult) -> Self {
        Self {
            result_index: 0,
            results: vec![result],
        }
    }

    pub fn fresh_results(&self) -> &[RecognitionResult] {
        self.results.get(self.result_index..).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Started,
    /// Engine-initiated end of capture (silence timeout, `stop`, `abort`).
    Ended,
    Result(RecognitionEvent),
}
