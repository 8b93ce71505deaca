//! Ordered rule table. Rules 6 and 7 overlap on "case <digits>"; order decides.

use regex::Regex;
use std::sync::LazyLock;

use super::{routes, Interpretation, ReportType, VoiceCommand};
use crate::{log_debug, log_debug_content};

const CASE_NUMBER_PROMPT: &str = "Please say the number.";

static ALL_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("valid all-digits pattern"));
static EXACT_CASE_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^case [0-9]+$").expect("valid exact-case pattern"));
static CASE_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"case\s+[0-9]+").expect("valid case pattern"));
static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid digit pattern"));

type Built = (Option<VoiceCommand>, Option<String>);

struct CommandRule {
    name: &'static str,
    matches: fn(&str) -> bool,
    build: fn(&str) -> Built,
}

fn contains_any(phrase: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| phrase.contains(needle))
}

fn first_digits(phrase: &str) -> Option<&str> {
    DIGIT_RUN.find(phrase).map(|found| found.as_str())
}

fn navigate(route: &str, reply: &str) -> Built {
    (
        Some(VoiceCommand::Navigate(route.to_string())),
        Some(reply.to_string()),
    )
}

fn fixed(command: VoiceCommand, reply: &str) -> Built {
    (Some(command), Some(reply.to_string()))
}

fn report_type(kind: ReportType) -> Built {
    fixed(
        VoiceCommand::SetReportType(kind),
        &format!("Selected {}", kind.label()),
    )
}

static RULES: &[CommandRule] = &[
    CommandRule {
        name: "navigate_dashboard",
        matches: |phrase| contains_any(phrase, &["go to dashboard", "open dashboard"]),
        build: |_| navigate(routes::DASHBOARD, "Navigating to Dashboard"),
    },
    CommandRule {
        name: "navigate_detect",
        matches: |phrase| contains_any(phrase, &["go to detect", "open detection"]),
        build: |_| navigate(routes::DETECT, "Opening Detection Center"),
    },
    CommandRule {
        name: "navigate_settings",
        matches: |phrase| phrase.contains("go to settings"),
        build: |_| navigate(routes::SETTINGS, "Opening Settings"),
    },
    CommandRule {
        name: "navigate_about",
        matches: |phrase| contains_any(phrase, &["go to about", "open about"]),
        build: |_| navigate(routes::ABOUT, "Opening About Us"),
    },
    CommandRule {
        name: "navigate_home",
        matches: |phrase| phrase.contains("go to home"),
        build: |_| navigate(routes::HOME, "Going Home"),
    },
    CommandRule {
        name: "input_value",
        matches: |phrase| ALL_DIGITS.is_match(phrase) || EXACT_CASE_DIGITS.is_match(phrase),
        build: |phrase| match first_digits(phrase) {
            Some(digits) => (
                Some(VoiceCommand::InputValue(digits.to_string())),
                Some(format!("Inputting {digits}")),
            ),
            None => (None, None),
        },
    },
    CommandRule {
        name: "set_case_number",
        matches: |phrase| phrase.contains("case number") || CASE_DIGITS.is_match(phrase),
        build: |phrase| match first_digits(phrase) {
            Some(digits) => (
                Some(VoiceCommand::SetCaseNumber(digits.to_string())),
                Some(format!("Setting case number {digits}")),
            ),
            None => (None, Some(CASE_NUMBER_PROMPT.to_string())),
        },
    },
    CommandRule {
        name: "confirm",
        matches: |phrase| contains_any(phrase, &["confirm", "next", "enter"]),
        build: |_| fixed(VoiceCommand::Confirm, "Confirmed"),
    },
    CommandRule {
        name: "report_xray",
        matches: |phrase| contains_any(phrase, &["x-ray", "x ray"]),
        build: |_| report_type(ReportType::XRay),
    },
    CommandRule {
        name: "report_ct",
        matches: |phrase| phrase.contains("ct scan"),
        build: |_| report_type(ReportType::CtScan),
    },
    CommandRule {
        name: "report_mri",
        matches: |phrase| phrase.contains("mri"),
        build: |_| report_type(ReportType::Mri),
    },
    CommandRule {
        name: "trigger_upload",
        matches: |phrase| contains_any(phrase, &["upload", "image"]),
        build: |_| fixed(VoiceCommand::TriggerUpload, "Opening upload dialog"),
    },
    CommandRule {
        name: "analyze",
        matches: |phrase| contains_any(phrase, &["analyze", "run analysis"]),
        build: |_| fixed(VoiceCommand::Analyze, "Starting analysis"),
    },
    CommandRule {
        name: "sleep",
        matches: |phrase| contains_any(phrase, &["stop listening", "go to sleep"]),
        build: |_| (Some(VoiceCommand::Sleep), None),
    },
];

/// Rule names in evaluation order.
pub fn rule_names() -> impl Iterator<Item = &'static str> {
    RULES.iter().map(|rule| rule.name)
}

/// Map a heard phrase to the first matching rule's command and reply.
///
/// Returns `None` when no rule matches; callers only surface the phrase.
pub fn interpret(phrase: &str) -> Option<Interpretation> {
    let normalized = phrase.trim().to_lowercase();
    log_debug_content("voice command phrase", &normalized);
    let rule = RULES.iter().find(|rule| (rule.matches)(&normalized))?;
    let (command, reply) = (rule.build)(&normalized);
    log_debug(&format!("voice command matched rule {}", rule.name));
    Some(Interpretation {
        rule: rule.name,
        command,
        reply,
    })
}
