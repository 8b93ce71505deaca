//! Voice-command bridge shared by the `diagnoscope-voice` binary and front-end hosts.
//!
//! Transcripts flow from a [`speech::CaptureSession`] through [`command::interpret`]
//! into a [`router::CommandRouter`], which either asks the host to navigate or
//! hands the command to whichever page is currently mounted.

pub mod assistant;
pub mod command;
pub mod config;
pub mod ipc;
mod lock;
mod logging;
pub mod pages;
pub mod router;
pub mod speech;
pub mod telemetry;

pub use assistant::AssistantShell;
pub use command::{interpret, ActionKind, Interpretation, ReportType, VoiceCommand};
pub use logging::{init_logging, log_debug, log_debug_content, log_file_path};
pub use router::{CommandRouter, DispatchOutcome, PageHandler, PageRegistration};
pub use speech::{CaptureSession, SessionState, SpeechOutput};
