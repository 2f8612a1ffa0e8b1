//! Shared test helpers: output constructors and canned payloads.

#![allow(dead_code)]

use std::process::{ExitStatus, Output};

use agent_bootstrap::application::HttpResponse;

// ── Cross-platform ExitStatus construction ───────────────────────────────────

/// Build an `ExitStatus` from a logical exit code (0 = success, non-zero = failure).
///
/// On Unix the raw wait-status encodes the exit code in bits 8–15, so we shift.
#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    #[allow(clippy::cast_sign_loss)]
    ExitStatus::from_raw(code as u32)
}

// ── Output constructors ──────────────────────────────────────────────────────

pub fn ok_output(stdout: &[u8]) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.to_vec(),
        stderr: Vec::new(),
    }
}

pub fn err_output(code: i32, stderr: &[u8]) -> Output {
    Output {
        status: exit_status(code),
        stdout: Vec::new(),
        stderr: stderr.to_vec(),
    }
}

// ── HTTP responses ───────────────────────────────────────────────────────────

pub fn response(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        reason: String::new(),
        headers: Vec::new(),
        body: body.as_bytes().to_vec(),
    }
}

pub fn accepted(location: &str) -> HttpResponse {
    HttpResponse {
        status: 202,
        reason: "Accepted".to_string(),
        headers: vec![("location".to_string(), location.to_string())],
        body: Vec::new(),
    }
}

pub fn job(status: &str) -> HttpResponse {
    response(
        200,
        &serde_json::json!({"data": {"items": [{"status": status, "message": "working"}]}})
            .to_string(),
    )
}

pub fn succeeded_job() -> HttpResponse {
    let message = serde_json::json!({
        "activation_code": "CODE",
        "activation_id": "ID",
        "region": "us-east-1",
        "system_account": "acct",
    });
    response(
        200,
        &serde_json::json!({"data": {"items": [{"status": "SUCCEEDED", "message": message}]}})
            .to_string(),
    )
}

// ── Agent payloads ───────────────────────────────────────────────────────────

pub const INSTANCE_INFO: &[u8] = br#"{"instance-id":"mi-0123","region":"us-east-1"}"#;

pub const DIAGNOSTICS_OK: &[u8] =
    br#"{"DiagnosticsOutput":[{"Check":"Connectivity","Status":"Success","Note":""}]}"#;

pub const DIAGNOSTICS_WITH_FAILURE: &[u8] =
    br#"{"DiagnosticsOutput":[{"Check":"Connectivity","Status":"Failed","Note":"no route"}]}"#;
