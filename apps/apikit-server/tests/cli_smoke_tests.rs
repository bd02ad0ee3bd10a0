//! CLI smoke tests for the apikit-server binary.

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn demo_model() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/blog.yaml")
}

fn run_apikit_server(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_apikit-server"))
        .args(args)
        .env("HOME", home)
        .env("APPDATA", home)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("failed to execute apikit-server")
}

/// Config with a private home dir and console-only logging.
fn write_config(dir: &TempDir, modules: &str) -> PathBuf {
    let home = dir.path().join("home").to_string_lossy().replace('\\', "/");
    let path = dir.path().join("config.yaml");
    let yaml = format!(
        "server:\n  home_dir: \"{home}\"\n  host: 127.0.0.1\n  port: 8087\n\
         logging:\n  default:\n    console_level: warn\n    file: \"\"\n{modules}"
    );
    std::fs::write(&path, yaml).unwrap();
    path
}

#[test]
fn help_lists_commands() {
    let tmp = TempDir::new().unwrap();
    let output = run_apikit_server(tmp.path(), &["--help"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    for word in ["run", "check", "compile", "--config", "--schema"] {
        assert!(stdout.contains(word), "help should mention {word}");
    }
}

#[test]
fn version_is_printed() {
    let tmp = TempDir::new().unwrap();
    let output = run_apikit_server(tmp.path(), &["--version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("apikit-server 0.1.0"));
}

#[test]
fn invalid_command_fails() {
    let tmp = TempDir::new().unwrap();
    let output = run_apikit_server(tmp.path(), &["frobnicate"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("error"));
}

#[test]
fn missing_config_file_fails() {
    let tmp = TempDir::new().unwrap();
    let output = run_apikit_server(tmp.path(), &["--config", "/nonexistent/config.yaml", "check"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not found"));
}

#[test]
fn missing_model_is_reported() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(&tmp, "");
    let output = run_apikit_server(tmp.path(), &["--config", config.to_str().unwrap(), "check"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no resource model"));
}

#[test]
fn check_passes_for_the_demo_model() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(&tmp, "");
    let model = demo_model();
    let output = run_apikit_server(
        tmp.path(),
        &[
            "--config",
            config.to_str().unwrap(),
            "--schema",
            model.to_str().unwrap(),
            "check",
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Configuration check passed"));
    assert!(stdout.contains("10 operations"));
}

#[test]
fn compile_writes_the_document() {
    let tmp = TempDir::new().unwrap();
    let model = demo_model().to_string_lossy().replace('\\', "/");
    let modules = format!(
        "modules:\n  apikit:\n    schema_file: \"{model}\"\n    compile:\n      prefix: /v1\n      info: {{ title: Blog, version: 2.0.0 }}\n"
    );
    let config = write_config(&tmp, &modules);
    let out = tmp.path().join("openapi.json");

    let output = run_apikit_server(
        tmp.path(),
        &[
            "--config",
            config.to_str().unwrap(),
            "compile",
            "--output",
            out.to_str().unwrap(),
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(doc["openapi"], "3.0.0");
    assert_eq!(doc["info"]["title"], "Blog");
    assert!(doc["paths"]["/v1/messages/{id}"]["get"].is_object());
    assert!(doc["components"]["schemas"]["Error"].is_object());
}

#[test]
fn compile_to_stdout_is_pure_json() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(&tmp, "");
    let model = demo_model();
    let output = run_apikit_server(
        tmp.path(),
        &[
            "--config",
            config.to_str().unwrap(),
            "--schema",
            model.to_str().unwrap(),
            "compile",
        ],
    );
    assert!(output.status.success());
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(doc["x-admin"]["resources"]["/api/authors"].is_object());
}

#[test]
fn print_config_shows_overrides() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(&tmp, "");
    let output = run_apikit_server(
        tmp.path(),
        &["--config", config.to_str().unwrap(), "--port", "9191", "--print-config"],
    );
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("port: 9191"));
}
