//! Integration tests that drive the bridge binary over piped stdin.

use serde_json::Value;
use std::io::Write;
use std::process::{Command, Output, Stdio};

fn run_bridge(args: &[&str], stdin: &str) -> Output {
    let bin = env!("CARGO_BIN_EXE_diagnoscope-voice");
    let config_dir = std::env::temp_dir().join(format!(
        "diagnoscope-voice-it-missing-{}",
        std::process::id()
    ));
    let mut child = Command::new(bin)
        .args(args)
        .env("DIAGNOSCOPE_VOICE_CONFIG_DIR", &config_dir)
        .env_remove("DIAGNOSCOPE_VOICE_TTS")
        .env_remove("DIAGNOSCOPE_VOICE_LANG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("run diagnoscope-voice");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(stdin.as_bytes())
        .expect("write stdin");
    child.wait_with_output().expect("wait diagnoscope-voice")
}

fn json_events(output: &Output) -> Vec<Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("json event line"))
        .collect()
}

fn events_named<'a>(events: &'a [Value], name: &str) -> Vec<&'a Value> {
    events.iter().filter(|event| event["event"] == name).collect()
}

#[test]
fn plain_mode_navigates_on_voice_command() {
    let output = run_bridge(&[], ":open\nGo to Dashboard\n:status\n:quit\n");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ready: route=/ state=idle"));
    assert!(stdout.contains("speak: Voice assistant activated."));
    assert!(stdout.contains("speak: Navigating to Dashboard"));
    assert!(stdout.contains("navigate: /dashboard"));
    assert!(stdout.contains("command: NAVIGATE /dashboard"));
    assert!(stdout.contains("status: route=/dashboard state=listening open=true"));
}

#[test]
fn plain_mode_rejects_transcripts_while_closed() {
    let output = run_bridge(&[], "confirm\n:quit\n");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: not listening"));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("command:"));
}

#[test]
fn ipc_mode_fills_detect_form() {
    let stdin = [
        r#"{"cmd":"navigate","route":"/detect"}"#,
        r#"{"cmd":"toggle"}"#,
        r#"{"cmd":"transcript","text":"case number 42"}"#,
        r#"{"cmd":"transcript","text":"next"}"#,
        r#"{"cmd":"transcript","text":"x-ray"}"#,
        r#"{"cmd":"transcript","text":"analyze"}"#,
        r#"{"cmd":"status"}"#,
        r#"{"cmd":"quit"}"#,
    ]
    .join("\n");
    let output = run_bridge(&["--ipc"], &stdin);
    assert!(output.status.success());
    let events = json_events(&output);

    assert_eq!(events[0]["event"], "ready");
    assert_eq!(events[0]["route"], "/");

    let commands = events_named(&events, "command");
    let actions: Vec<&str> = commands
        .iter()
        .filter_map(|event| event["action"].as_str())
        .collect();
    assert_eq!(
        actions,
        vec!["SET_CASE_NUMBER", "CONFIRM", "SET_REPORT_TYPE", "ANALYZE"]
    );
    assert!(commands.iter().all(|event| event["outcome"] == "delivered"));

    let status = events_named(&events, "status");
    let form = &status.last().expect("status event")["form"];
    assert_eq!(form["case_name"], "42");
    assert_eq!(form["report_type"], "X-Ray");
    assert_eq!(form["disease"], "Fracture");
    assert_eq!(form["analysis_requests"], 1);
}

#[test]
fn ipc_mode_restarts_after_silence_and_sleeps_on_request() {
    let stdin = [
        r#"{"cmd":"open"}"#,
        r#"{"cmd":"engine_end"}"#,
        r#"{"cmd":"transcript","text":"go to sleep"}"#,
        r#"{"cmd":"status"}"#,
    ]
    .join("\n");
    let output = run_bridge(&["--ipc"], &stdin);
    assert!(output.status.success());
    let events = json_events(&output);
    let status = events_named(&events, "status");
    let status = status.last().expect("status event");
    assert_eq!(status["restart_attempts"], 1);
    assert_eq!(status["open"], false);
    assert_eq!(status["state"], "paused");
    assert!(events_named(&events, "speak")
        .iter()
        .any(|event| event["text"] == "Voice assistant deactivated."));
}

#[test]
fn ipc_mode_reports_invalid_commands() {
    let output = run_bridge(&["--ipc"], "not json\n{\"cmd\":\"quit\"}\n");
    assert!(output.status.success());
    let events = json_events(&output);
    let errors = events_named(&events, "error");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["recoverable"], true);
}

#[test]
fn no_speech_input_reports_unsupported() {
    let output = run_bridge(&["--ipc", "--no-speech-input"], "{\"cmd\":\"toggle\"}\n");
    assert!(output.status.success());
    let events = json_events(&output);
    assert_eq!(events[0]["speech_input"], false);
    let states = events_named(&events, "state");
    let last = states.last().expect("state event");
    assert_eq!(last["state"], "unsupported");
    assert_eq!(last["feedback"], "Voice Not Supported");
}

#[test]
fn ipc_host_command_selects_retinal_scan() {
    let stdin = [
        r#"{"cmd":"navigate","route":"/detect"}"#,
        r#"{"cmd":"command","action":"SET_REPORT_TYPE","value":"Blindness Severity Scale Detection"}"#,
        r#"{"cmd":"command","action":"CONFIRM","value":"1"}"#,
        r#"{"cmd":"status"}"#,
        r#"{"cmd":"quit"}"#,
    ]
    .join("\n");
    let output = run_bridge(&["--ipc"], &stdin);
    assert!(output.status.success());
    let events = json_events(&output);

    let commands = events_named(&events, "command");
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0]["action"], "SET_REPORT_TYPE");
    assert_eq!(commands[0]["outcome"], "delivered");
    assert!(events_named(&events, "speak").is_empty());

    let errors = events_named(&events, "error");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["message"], "invalid value for CONFIRM: 1");

    let status = events_named(&events, "status");
    let form = &status.last().expect("status event")["form"];
    assert_eq!(form["report_type"], "Blindness Severity Scale Detection");
    assert_eq!(form["disease"], "Diabetic Retinopathy Scan");
}
