// crates/wps-execute-cli/tests/cli_commands.rs
// ============================================================================
// Module: CLI Command Tests
// Description: Integration tests for the wps-execute binary.
// Purpose: Ensure requests, config validation, and fetching behave end to end.
// Dependencies: wps-execute-cli binary, tiny_http
// ============================================================================
//! ## Overview
//! Runs the compiled binary against temporary registry, request, and config
//! files. Each test runs in its own working directory with
//! `WPS_EXECUTE_CONFIG` removed so no ambient config file is picked up.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;
use std::thread;

use serde_json::Value;
use tempfile::TempDir;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Process registry used by every test.
const REGISTRY: &str = r#"[
    {
        "identifier": "Echo",
        "inputs": [
            {"identifier": "count", "min_occurs": 0, "kind": {"type": "literal", "data_type": "integer"}},
            {
                "identifier": "doc",
                "min_occurs": 0,
                "max_occurs": "unbounded",
                "kind": {"type": "complex", "formats": {"default": {"mime_type": "text/xml"}}}
            }
        ],
        "outputs": [
            {"identifier": "result", "kind": {"type": "literal"}}
        ]
    }
]"#;

fn wps_execute_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_wps-execute"))
}

/// Creates a working directory holding `processes.json`.
fn workspace() -> TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(dir.path().join("processes.json"), REGISTRY).expect("write registry");
    dir
}

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(wps_execute_bin())
        .args(args)
        .current_dir(dir)
        .env_remove("WPS_EXECUTE_CONFIG")
        .env_remove("WPS_EXECUTE_LOG")
        .output()
        .expect("run wps-execute")
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout json")
}

// ============================================================================
// SECTION: Request Commands
// ============================================================================

/// Verifies a compact request prints the normalized request.
#[test]
fn kvp_command_prints_request() {
    let dir = workspace();
    let output = run(
        dir.path(),
        &[
            "kvp",
            "--registry",
            "processes.json",
            "--query",
            "?service=WPS&request=Execute&Identifier=Echo&DataInputs=count=5",
        ],
    );
    let value = stdout_json(&output);
    assert_eq!(value["version"], "1.0.0");
    assert_eq!(value["process"]["identifier"]["code"], "Echo");
    assert_eq!(value["inputs"][0]["identifier"]["code"], "count");
}

/// Verifies validation failures exit non-zero with the exception code.
#[test]
fn kvp_command_reports_unknown_input() {
    let dir = workspace();
    let output = run(
        dir.path(),
        &["kvp", "--registry", "processes.json", "--query", "Identifier=Echo&DataInputs=bogus=1"],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("InvalidParameterValue"), "unexpected stderr: {stderr}");
    assert!(stderr.contains("bogus"), "unexpected stderr: {stderr}");
}

/// Verifies a request document prints the normalized request.
#[test]
fn document_command_prints_request() {
    let dir = workspace();
    let document = r#"{
        "identifier": "Echo",
        "data_inputs": [{"identifier": "count", "data": {"literal_data": {"value": "5"}}}],
        "response_form": {"raw_data_output": {"identifier": "result"}}
    }"#;
    fs::write(dir.path().join("request.json"), document).expect("write request");
    let output =
        run(dir.path(), &["document", "--registry", "processes.json", "--input", "request.json"]);
    let value = stdout_json(&output);
    assert_eq!(value["process"]["identifier"]["code"], "Echo");
    assert!(value.get("response_form").is_some());
}

/// Verifies a missing registry fails before any parsing.
#[test]
fn document_command_requires_registry() {
    let dir = workspace();
    fs::write(dir.path().join("request.json"), r#"{"identifier": "Echo"}"#).expect("write request");
    let output = run(dir.path(), &["document", "--input", "request.json"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no process registry"), "unexpected stderr: {stderr}");
}

/// Verifies the registry path and limits come from the config file.
#[test]
fn config_supplies_registry_and_limits() {
    let dir = workspace();
    fs::write(
        dir.path().join("wps-execute.toml"),
        "[limits]\nmax_data_inputs = 1\n\n[registry]\npath = \"processes.json\"\n",
    )
    .expect("write config");
    let ok = run(dir.path(), &["kvp", "--query", "Identifier=Echo&DataInputs=count=5"]);
    stdout_json(&ok);
    let limited = run(dir.path(), &["kvp", "--query", "Identifier=Echo&DataInputs=count=5;count=6"]);
    assert!(!limited.status.success());
    let stderr = String::from_utf8_lossy(&limited.stderr);
    assert!(stderr.contains("NoApplicableCode"), "unexpected stderr: {stderr}");
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Verifies `config validate` accepts a valid file.
#[test]
fn config_validate_accepts_valid_file() {
    let dir = workspace();
    fs::write(dir.path().join("custom.toml"), "[policy]\nallowed_values = \"enforce\"\n")
        .expect("write config");
    let output = run(dir.path(), &["--config", "custom.toml", "config", "validate"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Config valid."));
}

/// Verifies `config validate` rejects invalid settings.
#[test]
fn config_validate_rejects_invalid_file() {
    let dir = workspace();
    fs::write(dir.path().join("custom.toml"), "[references]\nallowed_schemes = []\n")
        .expect("write config");
    let output = run(dir.path(), &["--config", "custom.toml", "config", "validate"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("allowed_schemes"), "unexpected stderr: {stderr}");
}

/// Verifies `config validate` requires a config file to exist.
#[test]
fn config_validate_requires_file() {
    let dir = workspace();
    let output = run(dir.path(), &["config", "validate"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load config"), "unexpected stderr: {stderr}");
}

// ============================================================================
// SECTION: Fetching
// ============================================================================

/// Verifies `--fetch` dereferences referenced inputs.
#[test]
fn fetch_flag_dereferences_references() {
    let server = Server::http("127.0.0.1:0").expect("http server");
    let addr = server.server_addr().to_ip().expect("ip listener");
    let handle = thread::spawn(move || {
        if let Ok(request) = server.recv() {
            request
                .respond(
                    Response::from_data(b"<doc/>".to_vec())
                        .with_header(Header::from_bytes("Content-Type", "text/xml").unwrap()),
                )
                .expect("respond");
        }
    });

    let dir = workspace();
    let query = format!("Identifier=Echo&DataInputs=doc=@mimeType=text/xml@xlink:href=http://{addr}/doc.xml");
    let output = run(dir.path(), &["kvp", "--registry", "processes.json", "--fetch", "--query", &query]);
    let value = stdout_json(&output);
    assert_eq!(value["request"]["process"]["identifier"]["code"], "Echo");
    assert_eq!(value["fetched"][0]["identifier"]["code"], "doc");
    assert_eq!(value["fetched"][0]["bytes"], 6);
    assert_eq!(value["fetched"][0]["content_type"], "text/xml");

    handle.join().expect("server thread");
}
