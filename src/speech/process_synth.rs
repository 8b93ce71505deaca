//! Speech synthesis through an external program such as `espeak` or `say`.
//!
//! Arguments may carry `{text}`, `{rate}`, `{pitch}` and `{lang}`
//! placeholders. Without a `{text}` placeholder the utterance is appended as
//! the final argument.

use std::process::{Child, Command, Stdio};

use super::output::{SpeechSynth, SynthError, Utterance};
use crate::log_debug;

const TEXT_PLACEHOLDER: &str = "{text}";

pub struct ProcessSynth {
    program: String,
    args: Vec<String>,
    child: Option<Child>,
}

impl ProcessSynth {
    /// Build from a split command line; `None` when the command is empty.
    pub fn new(command: Vec<String>) -> Option<Self> {
        let mut words = command.into_iter();
        let program = words.next()?;
        Some(Self {
            program,
            args: words.collect(),
            child: None,
        })
    }

    fn render_args(&self, utterance: &Utterance) -> Vec<String> {
        let rate = format!("{:.2}", utterance.rate);
        let pitch = format!("{:.2}", utterance.pitch);
        let mut saw_text = false;
        let mut rendered: Vec<String> = self
            .args
            .iter()
            .map(|arg| {
                saw_text |= arg.contains(TEXT_PLACEHOLDER);
                arg.replace(TEXT_PLACEHOLDER, &utterance.text)
                    .replace("{rate}", &rate)
                    .replace("{pitch}", &pitch)
                    .replace("{lang}", &utterance.lang)
            })
            .collect();
        if !saw_text {
            rendered.push(utterance.text.clone());
        }
        rendered
    }

    #[cfg(test)]
    fn running_pid(&mut self) -> Option<u32> {
        let child = self.child.as_mut()?;
        match child.try_wait() {
            Ok(None) => Some(child.id()),
            _ => None,
        }
    }
}

impl SpeechSynth for ProcessSynth {
    fn speak(&mut self, utterance: &Utterance) -> Result<(), SynthError> {
        self.cancel();
        let child = Command::new(&self.program)
            .args(self.render_args(utterance))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| SynthError::Launch {
                program: self.program.clone(),
                source,
            })?;
        self.child = Some(child);
        Ok(())
    }

    fn cancel(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };
        match child.try_wait() {
            Ok(Some(_)) => {}
            Ok(None) => {
                if let Err(err) = child.kill() {
                    log_debug(&format!("tts kill failed: {err}"));
                }
                let _ = child.wait();
            }
            Err(err) => log_debug(&format!("tts status check failed: {err}")),
        }
    }

    fn reap(&mut self) {
        let Some(child) = self.child.as_mut() else {
            return;
        };
        match child.try_wait() {
            Ok(Some(status)) => {
                log_debug(&format!("tts finished: {status}"));
                self.child = None;
            }
            Ok(None) => {}
            Err(err) => log_debug(&format!("tts status check failed: {err}")),
        }
    }
}

impl Drop for ProcessSynth {
    fn drop(&mut self) {
        self.cancel();
    }
}
