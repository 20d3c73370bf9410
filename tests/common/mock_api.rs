//! A tiny in-process stand-in for the Basic API.
//!
//! One request per connection, answered with `Connection: close`.

use serde_json::{Value, json};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Default)]
pub struct ApiState {
    pub remote: Option<Value>,
    /// Errors returned by schema validation; empty means valid.
    pub validation_errors: Vec<Value>,
    /// Every request seen, as `METHOD /path`.
    pub requests: Vec<String>,
}

pub struct MockApi {
    pub url: String,
    pub state: Arc<Mutex<ApiState>>,
}

impl MockApi {
    pub fn start(remote: Option<Value>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock api");
        let url = format!("http://{}", listener.local_addr().expect("local addr"));
        let state = Arc::new(Mutex::new(ApiState {
            remote,
            ..ApiState::default()
        }));
        let shared = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                handle(stream, &shared);
            }
        });
        Self { url, state }
    }

    pub fn requests(&self) -> Vec<String> {
        self.state.lock().expect("state").requests.clone()
    }

    pub fn count(&self, request: &str) -> usize {
        self.requests().iter().filter(|r| *r == request).count()
    }

    pub fn remote(&self) -> Option<Value> {
        self.state.lock().expect("state").remote.clone()
    }

    pub fn set_validation_errors(&self, errors: Vec<Value>) {
        self.state.lock().expect("state").validation_errors = errors;
    }
}

fn handle(mut stream: TcpStream, state: &Mutex<ApiState>) {
    let Ok(read_half) = stream.try_clone() else {
        return;
    };
    let mut reader = BufReader::new(read_half);
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut content_length = 0;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 || line.trim().is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }
    let mut body = vec![0; content_length];
    if reader.read_exact(&mut body).is_err() {
        return;
    }
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    let (status, response) = route(&method, &path, &body, state);
    let payload = response.to_string();
    let reply = format!(
        "HTTP/1.1 {status} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{payload}",
        if status == 200 { "OK" } else { "Not Found" },
        payload.len()
    );
    let _ = stream.write_all(reply.as_bytes());
    let _ = stream.flush();
}

fn route(method: &str, path: &str, body: &Value, state: &Mutex<ApiState>) -> (u16, Value) {
    let mut state = state.lock().expect("state");
    state.requests.push(format!("{method} {path}"));

    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    match (method, segments.as_slice()) {
        ("GET", [""]) => (200, json!({"ok": true})),
        ("GET", ["project", _, "schema"]) => match &state.remote {
            Some(schema) => (200, json!({"data": [{"schema": schema}]})),
            None => (200, json!({"data": []})),
        },
        ("POST", ["project", _, "schema"]) => {
            state.remote = Some(body["schema"].clone());
            (200, json!({"data": "ok"}))
        }
        ("POST", ["utils", "schema", "verifyUpdateSchema"]) => (
            200,
            json!({
                "valid": state.validation_errors.is_empty(),
                "errors": state.validation_errors,
            }),
        ),
        ("POST", ["utils", "schema", "compareSchema"]) => {
            let same = state.remote.as_ref() == Some(&body["schema"]);
            (200, json!({"valid": same}))
        }
        ("GET", ["account", "projects"]) => (
            200,
            json!({"data": [{"id": "p1", "name": "Todo app", "slug": "todo-app"}]}),
        ),
        ("GET", ["auth", "userInfo"]) => (
            200,
            json!({"id": "u1", "email": "dev@example.com", "name": "Dev"}),
        ),
        _ => (404, json!({"error": "not found"})),
    }
}
