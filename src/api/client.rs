use super::{SchemaGateway, ValidationOutcome};
use crate::config::Settings;
use crate::error::{CliError, Result};
use crate::model::{Project, Schema, Token};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, trace};

/// Blocking HTTP client for the Basic API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    access_token: Option<String>,
    agent: ureq::Agent,
}

#[derive(Debug, Deserialize)]
struct SchemaRow {
    #[serde(default)]
    schema: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct CompareResponse {
    #[serde(default)]
    valid: bool,
}

impl ApiClient {
    #[must_use]
    pub fn new(settings: &Settings, token: Option<&Token>) -> Self {
        Self::with_base_url(&settings.api_url, token.map(|t| t.access_token.clone()))
    }

    #[must_use]
    pub fn with_base_url(base_url: &str, access_token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
            agent: ureq::AgentBuilder::new().build(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: ureq::Request) -> ureq::Request {
        match &self.access_token {
            Some(token) => request.set("Authorization", &format!("Bearer {token}")),
            None => request,
        }
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        debug!(%url, "GET");
        let request = self.authorize(self.agent.get(&url));
        let response = request.call().map_err(|e| map_ureq_error(&url, e))?;
        read_json(&url, response)
    }

    fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        let url = self.url(path);
        debug!(%url, "POST");
        trace!(body = %body, "Request body");
        let request = self
            .authorize(self.agent.post(&url))
            .set("Content-Type", "application/json");
        let response = request.send_json(body).map_err(|e| map_ureq_error(&url, e))?;
        read_json(&url, response)
    }

    /// Whether the API host answers at all. Any HTTP status counts.
    #[must_use]
    pub fn is_online(&self) -> bool {
        let url = self.url("/");
        match self.agent.get(&url).call() {
            Ok(_) | Err(ureq::Error::Status(..)) => true,
            Err(ureq::Error::Transport(transport)) => {
                debug!(%url, error = %transport, "Online probe failed");
                false
            }
        }
    }

    /// # Errors
    ///
    /// Returns `CliError::Offline` if the API host cannot be reached.
    pub fn ensure_online(&self) -> Result<()> {
        if self.is_online() {
            Ok(())
        } else {
            Err(CliError::Offline)
        }
    }

    /// Projects the logged-in account can see.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    pub fn list_projects(&self) -> Result<Vec<Project>> {
        let envelope: DataEnvelope<Vec<Project>> = self.get("/account/projects")?;
        Ok(envelope.data)
    }

    /// Create a project and return it.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or no project id comes back.
    pub fn create_project(&self, name: &str, slug: &str) -> Result<Project> {
        let body: Value = self.post("/project/new", &json!({"name": name, "slug": slug}))?;
        let data = body.get("data").unwrap_or(&body);
        let project: Project = serde_json::from_value(data.clone()).map_err(|e| {
            CliError::Remote {
                status: 200,
                body: format!("unexpected create-project response: {e}"),
            }
        })?;
        if project.id.is_empty() {
            return Err(CliError::Remote {
                status: 200,
                body: "create-project response has no id".to_string(),
            });
        }
        Ok(Project {
            name: if project.name.is_empty() {
                name.to_string()
            } else {
                project.name
            },
            slug: project.slug.or_else(|| Some(slug.to_string())),
            ..project
        })
    }

    /// Profile of the logged-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub fn user_info(&self) -> Result<Value> {
        self.get("/auth/userInfo")
    }
}

impl SchemaGateway for ApiClient {
    fn fetch_schema(&self, project_id: &str) -> Result<Option<Schema>> {
        let envelope: DataEnvelope<Vec<SchemaRow>> =
            self.get(&format!("/project/{project_id}/schema"))?;

        let Some(raw) = envelope.data.into_iter().next().and_then(|row| row.schema) else {
            debug!(project_id, "Remote has no schema");
            return Ok(None);
        };
        let schema: Schema = serde_json::from_value(raw)?;
        debug!(project_id, version = schema.version, "Fetched remote schema");
        Ok(Some(schema))
    }

    fn push_schema(&self, project_id: &str, schema: &Schema) -> Result<()> {
        let _: Value = self.post(
            &format!("/project/{project_id}/schema"),
            &json!({ "schema": schema.to_value()? }),
        )?;
        debug!(project_id, version = schema.version, "Pushed schema");
        Ok(())
    }

    fn validate_schema(&self, schema: &Schema) -> Result<ValidationOutcome> {
        let outcome: ValidationOutcome = self.post(
            "/utils/schema/verifyUpdateSchema",
            &json!({ "schema": schema.to_value()? }),
        )?;
        debug!(
            valid = outcome.valid,
            errors = outcome.errors.len(),
            "Validated schema"
        );
        Ok(outcome)
    }

    fn compare_schema(&self, schema: &Schema) -> Result<bool> {
        let response: CompareResponse =
            self.post("/utils/schema/compareSchema", &json!({ "schema": schema.to_value()? }))?;
        debug!(same = response.valid, "Compared schema");
        Ok(response.valid)
    }
}

fn read_json<T: DeserializeOwned>(url: &str, response: ureq::Response) -> Result<T> {
    let text = response.into_string().map_err(|e| CliError::Transport {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    trace!(%url, body = %text, "Response body");
    // Some endpoints answer 200 with an empty body.
    if text.trim().is_empty() {
        return Ok(serde_json::from_value(Value::Null)?);
    }
    Ok(serde_json::from_str(&text)?)
}

fn map_ureq_error(url: &str, err: ureq::Error) -> CliError {
    match err {
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            debug!(%url, status, %body, "Request rejected");
            CliError::Remote { status, body }
        }
        ureq::Error::Transport(transport) => CliError::Transport {
            url: url.to_string(),
            reason: transport.to_string(),
        },
    }
}
