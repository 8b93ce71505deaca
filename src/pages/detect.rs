//! Detection-workflow page: voice fills the case form and walks focus through it.

use serde::Serialize;
use std::sync::Arc;

use crate::command::{ReportType, VoiceCommand};
use crate::router::PageHandler;
use crate::lock::Shared;
use crate::{log_debug, log_debug_content};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Disease {
    Fracture,
    Tumor,
    #[serde(rename = "Diabetic Retinopathy Scan")]
    DiabeticRetinopathy,
    Pneumonia,
}

impl Disease {
    pub fn label(self) -> &'static str {
        match self {
            Disease::Fracture => "Fracture",
            Disease::Tumor => "Tumor",
            Disease::DiabeticRetinopathy => "Diabetic Retinopathy Scan",
            Disease::Pneumonia => "Pneumonia",
        }
    }

    /// Disease implied by a report type; `None` means the user must pick one.
    pub fn implied_by(report_type: ReportType) -> Option<Self> {
        match report_type {
            ReportType::Mri => Some(Disease::Tumor),
            ReportType::XRay => Some(Disease::Fracture),
            ReportType::RetinalScan => Some(Disease::DiabeticRetinopathy),
            ReportType::CtScan => None,
        }
    }
}

/// Which form element currently holds focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "element", content = "option", rename_all = "snake_case")]
pub enum FormFocus {
    #[default]
    None,
    CaseInput,
    ReportTypeChoice(&'static str),
    DiseaseChoice(&'static str),
    UploadZone,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DetectForm {
    pub case_name: String,
    #[serde(serialize_with = "serialize_report_type")]
    pub report_type: Option<ReportType>,
    pub disease: Option<Disease>,
    pub focus: FormFocus,
    pub upload_dialog_requests: u32,
    pub analysis_requests: u32,
}

fn serialize_report_type<S>(value: &Option<ReportType>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match value {
        Some(kind) => serializer.serialize_some(kind.label()),
        None => serializer.serialize_none(),
    }
}

impl DetectForm {
    pub fn is_complete(&self) -> bool {
        !self.case_name.is_empty() && self.report_type.is_some() && self.disease.is_some()
    }

    fn set_report_type(&mut self, kind: ReportType) {
        self.report_type = Some(kind);
        self.disease = Disease::implied_by(kind);
    }

    fn advance_focus(&mut self) {
        if self.focus == FormFocus::CaseInput
            || (!self.case_name.is_empty() && self.report_type.is_none())
        {
            self.focus = FormFocus::ReportTypeChoice(ReportType::XRay.label());
            return;
        }
        let Some(kind) = self.report_type else {
            return;
        };
        if kind != ReportType::Mri && self.disease.is_none() {
            self.focus = FormFocus::DiseaseChoice(Disease::Pneumonia.label());
        } else {
            self.focus = FormFocus::UploadZone;
        }
    }

    pub fn apply(&mut self, command: &VoiceCommand) {
        match command {
            VoiceCommand::InputValue(value) | VoiceCommand::SetCaseNumber(value) => {
                log_debug_content("detect form case name set", value);
                self.case_name = value.clone();
                self.focus = FormFocus::CaseInput;
            }
            VoiceCommand::SetReportType(kind) => self.set_report_type(*kind),
            VoiceCommand::Confirm => self.advance_focus(),
            VoiceCommand::TriggerUpload => {
                self.upload_dialog_requests += 1;
                self.focus = FormFocus::UploadZone;
            }
            VoiceCommand::Analyze => {
                if self.is_complete() {
                    self.analysis_requests += 1;
                } else {
                    log_debug("detect form analysis ignored: form incomplete");
                }
            }
            VoiceCommand::Navigate(_) | VoiceCommand::Sleep => {}
        }
    }
}

/// Mounted detection page. Clones share the same form.
#[derive(Debug, Clone)]
pub struct DetectPage {
    form: Shared<DetectForm>,
}

impl Default for DetectPage {
    fn default() -> Self {
        Self {
            form: Shared::new("detect form", DetectForm::default()),
        }
    }
}

impl DetectPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn form(&self) -> DetectForm {
        self.form.lock().clone()
    }

    pub fn handler(&self) -> PageHandler {
        let form = self.form.clone();
        Arc::new(move |command: &VoiceCommand| form.with(|form| form.apply(command)))
    }
}
