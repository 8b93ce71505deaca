//! Typed JSON IPC protocol between the voice bridge and a hosting front end.
//!
//! Messages are newline-delimited JSON. Commands carry a `"cmd"` tag and
//! events carry an `"event"` tag.

use serde::{Deserialize, Serialize};

use crate::assistant::CommandOutcome;
use crate::command::ActionKind;
use crate::pages::DetectForm;
use crate::speech::SessionState;

// ============================================================================
// IPC Events (bridge → client)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event")]
pub enum IpcEvent {
    /// Sent once on startup.
    #[serde(rename = "ready")]
    Ready {
        version: String,
        speech_input: bool,
        speech_output: bool,
        route: String,
        state: SessionState,
    },

    /// Session state or feedback line changed.
    #[serde(rename = "state")]
    State {
        state: SessionState,
        open: bool,
        feedback: String,
    },

    /// A final transcript segment was heard.
    #[serde(rename = "heard")]
    Heard { text: String, recognized: bool },

    /// A recognized command was handled.
    #[serde(rename = "command")]
    Command {
        action: ActionKind,
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<String>,
        outcome: CommandOutcome,
    },

    /// The host moved to a new route.
    #[serde(rename = "navigate")]
    Navigate { route: String },

    /// Spoken reply, for hosts that render speech themselves.
    #[serde(rename = "speak")]
    Speak { text: String },

    /// Snapshot requested by a `status` command.
    #[serde(rename = "status")]
    Status {
        route: String,
        state: SessionState,
        open: bool,
        feedback: String,
        transcript: String,
        restart_attempts: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        form: Option<DetectForm>,
    },

    #[serde(rename = "error")]
    Error { message: String, recoverable: bool },
}

// ============================================================================
// IPC Commands (client → bridge)
// ============================================================================

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "cmd")]
pub enum IpcCommand {
    /// Flip the assistant between listening and paused.
    #[serde(rename = "toggle")]
    Toggle,

    #[serde(rename = "open")]
    Open,

    #[serde(rename = "close")]
    Close,

    /// Recognizer output; `is_final` defaults to true.
    #[serde(rename = "transcript")]
    Transcript {
        text: String,
        #[serde(default = "default_true")]
        is_final: bool,
    },

    /// The recognizer stopped on its own (silence timeout).
    #[serde(rename = "engine_end")]
    EngineEnd,

    /// Navigation performed outside the voice path (clicks, links).
    #[serde(rename = "navigate")]
    Navigate { route: String },

    /// Run a command in its `(action, value)` wire form without speaking it.
    #[serde(rename = "command")]
    Command {
        action: ActionKind,
        #[serde(default)]
        value: Option<String>,
    },

    #[serde(rename = "status")]
    Status,

    #[serde(rename = "quit")]
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn transcript_defaults_to_final() {
        let cmd: IpcCommand =
            serde_json::from_str(r#"{"cmd":"transcript","text":"confirm"}"#).expect("parse");
        assert_eq!(
            cmd,
            IpcCommand::Transcript {
                text: "confirm".to_string(),
                is_final: true
            }
        );
    }

    #[test]
    fn unit_commands_parse_by_tag() {
        let cmd: IpcCommand = serde_json::from_str(r#"{"cmd":"engine_end"}"#).expect("parse");
        assert_eq!(cmd, IpcCommand::EngineEnd);
        let cmd: IpcCommand =
            serde_json::from_str(r#"{"cmd":"navigate","route":"/detect"}"#).expect("parse");
        assert_eq!(
            cmd,
            IpcCommand::Navigate {
                route: "/detect".to_string()
            }
        );
    }

    #[test]
    fn command_carries_wire_action_and_optional_value() {
        let cmd: IpcCommand = serde_json::from_str(
            r#"{"cmd":"command","action":"SET_REPORT_TYPE","value":"Blindness Severity Scale Detection"}"#,
        )
        .expect("parse");
        assert_eq!(
            cmd,
            IpcCommand::Command {
                action: ActionKind::SetReportType,
                value: Some("Blindness Severity Scale Detection".to_string()),
            }
        );
        let cmd: IpcCommand =
            serde_json::from_str(r#"{"cmd":"command","action":"ANALYZE"}"#).expect("parse");
        assert_eq!(
            cmd,
            IpcCommand::Command {
                action: ActionKind::Analyze,
                value: None,
            }
        );
        let unknown = r#"{"cmd":"command","action":"DANCE"}"#;
        assert!(serde_json::from_str::<IpcCommand>(unknown).is_err());
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(serde_json::from_str::<IpcCommand>(r#"{"cmd":"dance"}"#).is_err());
    }

    #[test]
    fn command_event_uses_wire_action_names() {
        let event = IpcEvent::Command {
            action: ActionKind::SetReportType,
            value: Some("MRI".to_string()),
            outcome: CommandOutcome::Delivered,
        };
        assert_eq!(
            serde_json::to_value(&event).expect("serialize"),
            json!({
                "event": "command",
                "action": "SET_REPORT_TYPE",
                "value": "MRI",
                "outcome": "delivered"
            })
        );
    }

    #[test]
    fn navigated_outcome_carries_route() {
        let event = IpcEvent::Command {
            action: ActionKind::Navigate,
            value: Some("/about".to_string()),
            outcome: CommandOutcome::Navigated("/about".to_string()),
        };
        let value = serde_json::to_value(&event).expect("serialize");
        assert_eq!(value["outcome"], json!({"navigated": "/about"}));
    }

    #[test]
    fn state_event_serializes_snake_case_state() {
        let event = IpcEvent::State {
            state: SessionState::Listening,
            open: true,
            feedback: "Listening...".to_string(),
        };
        let value = serde_json::to_value(&event).expect("serialize");
        assert_eq!(value["event"], "state");
        assert_eq!(value["state"], "listening");
    }
}
