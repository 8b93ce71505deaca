//! Speech capture and playback wrappers around platform engines.

pub mod engine;
pub mod line_engine;
pub mod output;
pub mod process_synth;
pub mod session;
#[cfg(test)]
pub(crate) mod test_support;

pub use engine::{EngineError, EngineEvent, RecognitionEngine, RecognitionEvent, RecognitionResult};
pub use line_engine::{LineEngine, LineFeed};
pub use output::{SpeechOutput, SpeechSynth, SynthError, Utterance};
pub use process_synth::ProcessSynth;
pub use session::{CaptureSession, DesiredOpen, SessionState, TranscriptBatch};
