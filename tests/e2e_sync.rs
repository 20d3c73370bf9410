mod common;

use common::{MockApi, Workspace, schema_json};
use serde_json::json;

fn setup(local: u64, remote: Option<u64>) -> (MockApi, Workspace) {
    let api = MockApi::start(remote.map(|version| schema_json("p1", version)));
    let workspace = Workspace::with_api(&api.url);
    workspace.login();
    workspace.write_schema("p1", local);
    (api, workspace)
}

#[test]
fn status_reports_each_relationship() {
    let cases = [
        (1, Some(2), "behind"),
        (3, Some(2), "ahead"),
        (2, Some(2), "current"),
        (1, None, "ahead"),
    ];
    for (local, remote, expected) in cases {
        let (_api, workspace) = setup(local, remote);
        let run = workspace.run(["status", "--json"]);
        assert!(run.status.success(), "{}", run.stderr);
        let report = run.stdout_json();
        assert_eq!(report["status"], expected, "local {local} remote {remote:?}");
        assert_eq!(report["local_version"], local);
    }
}

#[test]
fn status_without_config_is_no_schema() {
    let api = MockApi::start(None);
    let workspace = Workspace::with_api(&api.url);
    workspace.login();

    let run = workspace.run(["status", "--json"]);
    assert!(run.status.success(), "{}", run.stderr);
    let report = run.stdout_json();
    assert_eq!(report["status"], "no-schema");
    assert_eq!(report["suggested_actions"][0], "basic init");
    assert_eq!(api.count("GET /project/p1/schema"), 0);
}

#[test]
fn same_version_different_content_is_conflict() {
    let mut remote = schema_json("p1", 2);
    remote["tables"]["notes"] = json!({"type": "collection", "fields": {}});
    let api = MockApi::start(Some(remote));
    let workspace = Workspace::with_api(&api.url);
    workspace.login();
    workspace.write_schema("p1", 2);

    let run = workspace.run(["status", "--json"]);
    assert_eq!(run.stdout_json()["status"], "conflict");

    let push = workspace.run(["push", "--yes", "--json"]);
    assert!(push.status.success(), "{}", push.stderr);
    assert_eq!(push.stdout_json()["pushed"], false);
    assert_eq!(api.count("POST /project/p1/schema"), 0);
}

#[test]
fn version_zero_needs_a_bump() {
    let (api, workspace) = setup(0, None);

    let status = workspace.run(["status", "--json"]);
    let report = status.stdout_json();
    assert_eq!(report["status"], "ahead");
    assert_eq!(report["requires_version_bump"], true);

    let push = workspace.run(["push", "--yes", "--json"]);
    let report = push.stdout_json();
    assert_eq!(report["pushed"], false);
    assert!(report["reason"].as_str().unwrap().contains("bump version to 1"));
    assert!(api.remote().is_none());
}

#[test]
fn push_publishes_ahead_schema() {
    let (api, workspace) = setup(3, Some(2));

    let run = workspace.run(["push", "--yes", "--json"]);
    assert!(run.status.success(), "{}", run.stderr);
    let report = run.stdout_json();
    assert_eq!(report["pushed"], true);
    assert_eq!(report["previous_version"], 2);
    assert_eq!(report["new_version"], 3);
    assert_eq!(api.remote(), Some(schema_json("p1", 3)));

    let again = workspace.run(["status", "--json"]);
    assert_eq!(again.stdout_json()["status"], "current");
}

#[test]
fn push_to_project_without_schema() {
    let (api, workspace) = setup(1, None);
    let run = workspace.run(["push", "-y"]);
    assert!(run.status.success(), "{}", run.stderr);
    assert!(run.stdout.contains("Schema pushed: version 0"), "{}", run.stdout);
    assert_eq!(api.remote(), Some(schema_json("p1", 1)));
}

#[test]
fn push_when_behind_changes_nothing() {
    let (api, workspace) = setup(1, Some(2));

    let run = workspace.run(["push", "--yes"]);
    assert!(run.status.success(), "{}", run.stderr);
    assert!(run.stdout.contains("basic pull"), "{}", run.stdout);
    assert_eq!(api.count("POST /project/p1/schema"), 0);
    assert_eq!(api.remote(), Some(schema_json("p1", 2)));
}

#[test]
fn invalid_schema_push_fails_with_errors() {
    let (api, workspace) = setup(3, Some(2));
    api.set_validation_errors(vec![json!({
        "message": "must be string",
        "instancePath": "/tables/todos/fields/title/type"
    })]);

    let run = workspace.run(["push", "--yes", "--json"]);
    assert_eq!(run.code(), Some(1));
    let error = run.error_json();
    assert_eq!(error["error"]["code"], "SCHEMA_INVALID");
    assert_eq!(
        error["error"]["context"]["errors"][0]["path"],
        "/tables/todos/fields/title/type"
    );
    assert_eq!(api.count("POST /project/p1/schema"), 0);
}

#[test]
fn pull_overwrites_behind_schema() {
    let (_api, workspace) = setup(1, Some(4));

    let run = workspace.run(["pull", "--yes", "--json"]);
    assert!(run.status.success(), "{}", run.stderr);
    let report = run.stdout_json();
    assert_eq!(report["pulled"], true);
    assert_eq!(report["previous_version"], 1);
    assert_eq!(report["new_version"], 4);
    assert_eq!(workspace.read_schema(), schema_json("p1", 4));
}

#[test]
fn pull_when_ahead_suggests_push() {
    let (_api, workspace) = setup(3, Some(2));

    let run = workspace.run(["pull", "--yes"]);
    assert!(run.status.success(), "{}", run.stderr);
    assert!(run.stdout.contains("did you mean to push?"), "{}", run.stdout);
    assert_eq!(workspace.read_schema(), schema_json("p1", 3));
}

#[test]
fn pull_when_current_is_noop() {
    let (_api, workspace) = setup(2, Some(2));
    let run = workspace.run(["pull", "--json"]);
    assert!(run.status.success(), "{}", run.stderr);
    let report = run.stdout_json();
    assert_eq!(report["pulled"], false);
    assert_eq!(report["status"], "current");
}

#[test]
fn malformed_config_is_reported() {
    let (_api, workspace) = setup(1, Some(1));
    std::fs::write(
        workspace.project.join("basic.config.json"),
        r#"{"project_id": "p1", "tables": {}}"#,
    )
    .unwrap();

    let run = workspace.run(["status"]);
    assert_eq!(run.code(), Some(1));
    assert_eq!(run.error_code(), "SCHEMA_STRUCTURE");
}
