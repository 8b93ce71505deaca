//! Spoken confirmations. At most one utterance is audible: each `speak`
//! cancels whatever is still playing.

use std::io;
use thiserror::Error;

use crate::config::VoiceSettings;
use crate::lock::Shared;
use crate::{log_debug, log_debug_content};

#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub rate: f32,
    pub pitch: f32,
    pub lang: String,
}

#[derive(Debug, Error)]
pub enum SynthError {
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("speech synthesis failed: {0}")]
    Failed(String),
}

/// Platform text-to-speech backend.
pub trait SpeechSynth: Send {
    fn speak(&mut self, utterance: &Utterance) -> Result<(), SynthError>;
    /// Silence the current utterance, if any. Never fails.
    fn cancel(&mut self);
    /// Release an utterance that already finished on its own.
    fn reap(&mut self) {}
}

struct OutputInner {
    synth: Box<dyn SpeechSynth>,
    rate: f32,
    pitch: f32,
    lang: String,
}

/// Cloneable handle to the shared synthesizer. A handle built with
/// [`SpeechOutput::unsupported`] ignores every call.
#[derive(Clone)]
pub struct SpeechOutput {
    inner: Option<Shared<OutputInner>>,
}

impl std::fmt::Debug for SpeechOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechOutput")
            .field("supported", &self.is_supported())
            .finish()
    }
}

impl SpeechOutput {
    pub fn new(synth: Box<dyn SpeechSynth>, settings: &VoiceSettings) -> Self {
        Self {
            inner: Some(Shared::new(
                "speech output",
                OutputInner {
                    synth,
                    rate: settings.rate,
                    pitch: settings.pitch,
                    lang: settings.lang.clone(),
                },
            )),
        }
    }

    pub fn unsupported() -> Self {
        Self { inner: None }
    }

    pub fn is_supported(&self) -> bool {
        self.inner.is_some()
    }

    /// Cancel any playing utterance and start `text`. Failures are logged and dropped.
    pub fn speak(&self, text: &str) {
        let Some(inner) = self.inner.as_ref() else {
            return;
        };
        let mut inner = inner.lock();
        inner.synth.cancel();
        let utterance = Utterance {
            text: text.to_string(),
            rate: inner.rate,
            pitch: inner.pitch,
            lang: inner.lang.clone(),
        };
        log_debug_content("speak", text);
        if let Err(err) = inner.synth.speak(&utterance) {
            log_debug(&format!("speech output failed: {err}"));
        }
    }

    pub fn cancel(&self) {
        if let Some(inner) = self.inner.as_ref() {
            inner.with(|inner| inner.synth.cancel());
        }
    }

    pub fn reap(&self) {
        if let Some(inner) = self.inner.as_ref() {
            inner.with(|inner| inner.synth.reap());
        }
    }
}
