use assert_cmd::Command;
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[derive(Debug)]
pub struct BasicRun {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
}

impl BasicRun {
    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }

    /// The structured error printed on stderr. Log lines come first, so
    /// parse from the first line that opens a JSON object.
    pub fn error_json(&self) -> Value {
        let start = self
            .stderr
            .find("{\n")
            .unwrap_or_else(|| panic!("no JSON error on stderr:\n{}", self.stderr));
        serde_json::from_str(&self.stderr[start..])
            .unwrap_or_else(|e| panic!("stderr is not JSON ({e}):\n{}", self.stderr))
    }

    pub fn error_code(&self) -> String {
        self.error_json()["error"]["code"]
            .as_str()
            .unwrap_or_default()
            .to_string()
    }

    pub fn stdout_json(&self) -> Value {
        serde_json::from_str(&self.stdout)
            .unwrap_or_else(|e| panic!("stdout is not JSON ({e}):\n{}", self.stdout))
    }
}

/// An isolated `$HOME` plus a project directory inside it.
pub struct Workspace {
    pub temp_dir: TempDir,
    pub home: PathBuf,
    pub project: PathBuf,
    pub api_url: String,
}

impl Workspace {
    /// Points at a closed loopback port, which reads as offline.
    pub fn new() -> Self {
        Self::with_api("http://127.0.0.1:1")
    }

    pub fn with_api(api_url: impl Into<String>) -> Self {
        let temp_dir = TempDir::new().expect("temp dir");
        let home = temp_dir.path().to_path_buf();
        let project = home.join("app");
        fs::create_dir_all(&project).expect("project dir");
        Self {
            temp_dir,
            home,
            project,
            api_url: api_url.into(),
        }
    }

    pub fn token_path(&self) -> PathBuf {
        self.home.join(".basic-cli").join("token.json")
    }

    /// Store a token that stays valid for an hour.
    pub fn login(&self) {
        let path = self.token_path();
        fs::create_dir_all(path.parent().expect("token dir")).expect("create token dir");
        let token = json!({
            "access_token": "test-access",
            "refresh_token": "test-refresh",
            "token_type": "Bearer",
            "expires_at": (Utc::now() + Duration::hours(1)).to_rfc3339(),
        });
        fs::write(&path, token.to_string()).expect("write token");
    }

    /// Write `basic.config.json` holding a one-table schema.
    pub fn write_schema(&self, project_id: &str, version: u64) -> PathBuf {
        let path = self.project.join("basic.config.json");
        fs::write(&path, schema_json(project_id, version).to_string()).expect("write config");
        path
    }

    pub fn read_schema(&self) -> Value {
        let body =
            fs::read_to_string(self.project.join("basic.config.json")).expect("read config");
        serde_json::from_str(&body).expect("config is JSON")
    }

    pub fn run<I, S>(&self, args: I) -> BasicRun
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("basic"));
        cmd.current_dir(&self.project);
        cmd.args(args);
        cmd.env_remove("BASIC_CLI_DIR");
        cmd.env("HOME", &self.home);
        cmd.env("BASIC_API_URL", &self.api_url);
        cmd.env("NO_COLOR", "1");
        cmd.env("RUST_LOG", "basic_cli=warn");
        cmd.env("RUST_BACKTRACE", "1");

        let output = cmd.output().expect("run basic");
        BasicRun {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            status: output.status,
        }
    }
}

pub fn schema_json(project_id: &str, version: u64) -> Value {
    json!({
        "project_id": project_id,
        "version": version,
        "tables": {
            "todos": {
                "type": "collection",
                "fields": {
                    "title": {"type": "string", "required": true},
                    "done": {"type": "boolean"}
                }
            }
        }
    })
}
