mod common;

use assert_cmd::Command;
use common::{MockApi, Workspace, schema_json};
use predicates::prelude::*;
use std::fs;

#[test]
fn version_json() {
    let workspace = Workspace::new();
    let run = workspace.run(["version", "--json"]);
    assert!(run.status.success(), "{}", run.stderr);
    let report = run.stdout_json();
    assert_eq!(report["version"], env!("CARGO_PKG_VERSION"));
    assert!(report.get("latest").is_none());
}

#[test]
fn version_plain() {
    Command::new(assert_cmd::cargo::cargo_bin!("basic"))
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(format!(
            "basic-cli version {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn debug_reports_paths() {
    let workspace = Workspace::new();
    let run = workspace.run(["debug", "--json"]);
    assert!(run.status.success(), "{}", run.stderr);
    let report = run.stdout_json();
    let config_dir = workspace.home.join(".basic-cli");
    assert_eq!(report["config_dir"], config_dir.display().to_string());
    assert_eq!(report["token_present"], false);
    assert_eq!(report["api_url"], "http://127.0.0.1:1");

    let plain = workspace.run(["debug"]);
    assert!(plain.stdout.contains("Basic CLI config directory:"));
}

#[test]
fn api_url_flag_beats_environment() {
    let workspace = Workspace::new();
    let run = workspace.run(["debug", "--json", "--api-url", "http://localhost:4000"]);
    assert_eq!(run.stdout_json()["api_url"], "http://localhost:4000");
}

#[test]
fn completions_for_bash() {
    let workspace = Workspace::new();
    let run = workspace.run(["completions", "bash"]);
    assert!(run.status.success(), "{}", run.stderr);
    assert!(run.stdout.contains("_basic"));
    assert!(run.stdout.contains("pull"));
}

#[test]
fn completions_to_file() {
    let workspace = Workspace::new();
    let out = workspace.home.join("_basic");
    let run = workspace.run(["completions", "zsh", "-o", out.to_str().unwrap()]);
    assert!(run.status.success(), "{}", run.stderr);
    assert!(fs::read_to_string(&out).unwrap().contains("#compdef basic"));
}

#[test]
fn init_refuses_existing_config_before_login() {
    let workspace = Workspace::new();
    fs::write(workspace.project.join("basic.config.ts"), "export const schema = {}\n").unwrap();

    let run = workspace.run(["init", "--name", "Todo app"]);
    assert_eq!(run.code(), Some(1));
    assert_eq!(run.error_code(), "ALREADY_INITIALIZED");
}

#[test]
fn init_needs_a_target() {
    let workspace = Workspace::new();
    let run = workspace.run(["init"]);
    assert_eq!(run.code(), Some(1));
    assert_eq!(run.error_code(), "VALIDATION_FAILED");
}

#[test]
fn init_links_existing_project() {
    let api = MockApi::start(Some(schema_json("p1", 3)));
    let workspace = Workspace::with_api(&api.url);
    workspace.login();

    let run = workspace.run(["init", "--project-id", "p1", "--json"]);
    assert!(run.status.success(), "{}", run.stderr);
    let report = run.stdout_json();
    assert_eq!(report["project_id"], "p1");
    assert_eq!(report["linked"], true);

    let config = fs::read_to_string(workspace.project.join("basic.config.ts")).unwrap();
    assert!(config.contains("p1"));

    let status = workspace.run(["status", "--json"]);
    assert!(status.status.success(), "{}", status.stderr);
    assert_eq!(status.stdout_json()["local_version"], 3);
}

#[test]
fn unknown_project_id_is_rejected() {
    let api = MockApi::start(None);
    let workspace = Workspace::with_api(&api.url);
    workspace.login();

    let run = workspace.run(["init", "--project-id", "nope"]);
    assert_eq!(run.code(), Some(1));
    assert_eq!(run.error_code(), "VALIDATION_FAILED");
    assert!(!workspace.project.join("basic.config.ts").exists());
}
