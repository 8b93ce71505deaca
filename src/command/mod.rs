//! Spoken-phrase interpretation so transcripts map onto a closed command vocabulary.
//!
//! | Order | Phrase contains | Command |
//! |-------|-----------------|---------|
//! | 1-5 | "go to dashboard", "go to detect", ... | `NAVIGATE <route>` |
//! | 6 | only digits, or exactly "case <digits>" | `INPUT_VALUE <digits>` |
//! | 7 | "case number" or "case <digits>" | `SET_CASE_NUMBER <digits>` |
//! | 8 | "confirm" / "next" / "enter" | `CONFIRM` |
//! | 9-11 | "x-ray" / "ct scan" / "mri" | `SET_REPORT_TYPE <type>` |
//! | 12 | "upload" / "image" | `TRIGGER_UPLOAD` |
//! | 13 | "analyze" / "run analysis" | `ANALYZE` |
//! | 14 | "stop listening" / "go to sleep" | `SLEEP` |
//!
//! The first matching rule wins; see [`rules`] for the exact predicates.

mod rules;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use rules::{interpret, rule_names};

/// Route constants the navigation rules produce.
pub mod routes {
    pub const HOME: &str = "/";
    pub const DASHBOARD: &str = "/dashboard";
    pub const DETECT: &str = "/detect";
    pub const SETTINGS: &str = "/settings";
    pub const ABOUT: &str = "/about";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    Navigate,
    InputValue,
    SetCaseNumber,
    Confirm,
    SetReportType,
    TriggerUpload,
    Analyze,
    /// Stop listening; closes the capture session.
    Sleep,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Navigate => "NAVIGATE",
            ActionKind::InputValue => "INPUT_VALUE",
            ActionKind::SetCaseNumber => "SET_CASE_NUMBER",
            ActionKind::Confirm => "CONFIRM",
            ActionKind::SetReportType => "SET_REPORT_TYPE",
            ActionKind::TriggerUpload => "TRIGGER_UPLOAD",
            ActionKind::Analyze => "ANALYZE",
            ActionKind::Sleep => "SLEEP",
        }
    }

    /// True for the actions whose command carries a value.
    pub fn requires_value(self) -> bool {
        matches!(
            self,
            ActionKind::Navigate
                | ActionKind::InputValue
                | ActionKind::SetCaseNumber
                | ActionKind::SetReportType
        )
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scan modality offered by the detection form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportType {
    XRay,
    CtScan,
    Mri,
    /// Retinal fundus images graded on the blindness severity scale.
    RetinalScan,
}

impl ReportType {
    pub fn label(self) -> &'static str {
        match self {
            ReportType::XRay => "X-Ray",
            ReportType::CtScan => "CT Scan",
            ReportType::Mri => "MRI",
            ReportType::RetinalScan => "Blindness Severity Scale Detection",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        [
            ReportType::XRay,
            ReportType::CtScan,
            ReportType::Mri,
            ReportType::RetinalScan,
        ]
        .into_iter()
        .find(|kind| kind.label() == label)
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An interpreted command. Payload-carrying actions hold their value inline,
/// so a value exists exactly when the action needs one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceCommand {
    Navigate(String),
    InputValue(String),
    SetCaseNumber(String),
    Confirm,
    SetReportType(ReportType),
    TriggerUpload,
    Analyze,
    Sleep,
}

impl VoiceCommand {
    pub fn action(&self) -> ActionKind {
        match self {
            VoiceCommand::Navigate(_) => ActionKind::Navigate,
            VoiceCommand::InputValue(_) => ActionKind::InputValue,
            VoiceCommand::SetCaseNumber(_) => ActionKind::SetCaseNumber,
            VoiceCommand::Confirm => ActionKind::Confirm,
            VoiceCommand::SetReportType(_) => ActionKind::SetReportType,
            VoiceCommand::TriggerUpload => ActionKind::TriggerUpload,
            VoiceCommand::Analyze => ActionKind::Analyze,
            VoiceCommand::Sleep => ActionKind::Sleep,
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            VoiceCommand::Navigate(value)
            | VoiceCommand::InputValue(value)
            | VoiceCommand::SetCaseNumber(value) => Some(value),
            VoiceCommand::SetReportType(kind) => Some(kind.label()),
            VoiceCommand::Confirm
            | VoiceCommand::TriggerUpload
            | VoiceCommand::Analyze
            | VoiceCommand::Sleep => None,
        }
    }

    /// Rebuild a command from its `(action, value)` wire form.
    ///
    /// Returns `None` when the value's presence does not match the action or
    /// a report-type label is unknown.
    pub fn from_parts(action: ActionKind, value: Option<&str>) -> Option<Self> {
        match (action, value) {
            (ActionKind::Navigate, Some(route)) => Some(VoiceCommand::Navigate(route.to_string())),
            (ActionKind::InputValue, Some(v)) => Some(VoiceCommand::InputValue(v.to_string())),
            (ActionKind::SetCaseNumber, Some(v)) => {
                Some(VoiceCommand::SetCaseNumber(v.to_string()))
            }
            (ActionKind::SetReportType, Some(label)) => {
                ReportType::from_label(label).map(VoiceCommand::SetReportType)
            }
            (ActionKind::Confirm, None) => Some(VoiceCommand::Confirm),
            (ActionKind::TriggerUpload, None) => Some(VoiceCommand::TriggerUpload),
            (ActionKind::Analyze, None) => Some(VoiceCommand::Analyze),
            (ActionKind::Sleep, None) => Some(VoiceCommand::Sleep),
            _ => None,
        }
    }
}

/// Result of a matched rule: an optional command plus the spoken confirmation.
///
/// `command` is `None` only for the case-number prompt, where the rule matched
/// but no digits were heard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpretation {
    pub rule: &'static str,
    pub command: Option<VoiceCommand>,
    pub reply: Option<String>,
}
