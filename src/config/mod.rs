//! Configuration management for `basic_cli`.
//!
//! Configuration sources and precedence (highest wins):
//! 1. CLI overrides
//! 2. Environment variables (`BASIC_*`)
//! 3. User config (`~/.basic-cli/config.yaml`)
//! 4. Defaults
//!
//! The merged layer is resolved into a typed [`Settings`].

use crate::error::{CliError, OptionExt, Result};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Production API host.
pub const DEFAULT_API_URL: &str = "https://api.basic.tech";
/// OAuth client registered for the CLI.
pub const DEFAULT_CLIENT_ID: &str = "9c3f6704-87e7-4af9-8dd0-36dcb9b5c18c";
/// Loopback port the OAuth callback listens on.
pub const DEFAULT_REDIRECT_PORT: u16 = 8080;
/// Per-user state directory under `$HOME`.
pub const CONFIG_DIR_NAME: &str = ".basic-cli";

const USER_CONFIG_FILE: &str = "config.yaml";
const TOKEN_FILE: &str = "token.json";

/// Environment variables mapped onto config keys.
const ENV_KEYS: &[(&str, &str)] = &[
    ("BASIC_API_URL", "api-url"),
    ("BASIC_AUTH_URL", "auth-url"),
    ("BASIC_TOKEN_URL", "token-url"),
    ("BASIC_CLIENT_ID", "client-id"),
    ("BASIC_REDIRECT_PORT", "redirect-port"),
    ("BASIC_CLI_DIR", "cli-dir"),
];

/// A flat set of config key/values from one source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub values: HashMap<String, String>,
}

impl ConfigLayer {
    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Merge multiple layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    /// Build a layer from a YAML file path. Missing files return empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let value: serde_yaml::Value = serde_yaml::from_str(&contents)?;
        Ok(layer_from_yaml_value(&value))
    }

    /// Build a layer from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_pairs(env::vars())
    }

    /// Build a layer from arbitrary environment pairs.
    pub fn from_env_pairs<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut layer = Self::default();
        for (name, value) in vars {
            if value.trim().is_empty() {
                continue;
            }
            if let Some((_, key)) = ENV_KEYS.iter().find(|(env_name, _)| *env_name == name) {
                layer.insert(key, value);
            }
        }
        layer
    }

    /// Insert a value under its normalized key.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(normalize_key(key), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(&normalize_key(key))
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }
}

/// CLI overrides for config loading (optional).
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub api_url: Option<String>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();
        if let Some(api_url) = &self.api_url {
            layer.insert("api-url", api_url.clone());
        }
        layer
    }
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub auth_url: String,
    pub token_url: String,
    pub client_id: String,
    pub redirect_port: u16,
    pub config_dir: PathBuf,
}

impl Settings {
    /// Resolve settings from a merged layer.
    ///
    /// Auth and token URLs default to paths under the API URL, so pointing
    /// `api-url` at another host moves the whole OAuth flow with it.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Config` if the redirect port is not a valid port
    /// or no config directory can be determined.
    pub fn from_layer(layer: &ConfigLayer) -> Result<Self> {
        let api_url = layer
            .get("api-url")
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
            .to_string();

        let auth_url = layer
            .get("auth-url")
            .map_or_else(|| format!("{api_url}/auth/authorize"), str::to_string);
        let token_url = layer
            .get("token-url")
            .map_or_else(|| format!("{api_url}/auth/token"), str::to_string);
        let client_id = layer
            .get("client-id")
            .unwrap_or(DEFAULT_CLIENT_ID)
            .to_string();

        let redirect_port = match layer.get("redirect-port") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                CliError::Config(format!("redirect-port must be a port number, got '{raw}'"))
            })?,
            None => DEFAULT_REDIRECT_PORT,
        };

        let config_dir = match layer.get("cli-dir") {
            Some(dir) => PathBuf::from(dir),
            None => default_config_dir()?,
        };

        Ok(Self {
            api_url,
            auth_url,
            token_url,
            client_id,
            redirect_port,
            config_dir,
        })
    }

    /// Absolute URL for an API path such as `/account/projects`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    #[must_use]
    pub fn redirect_uri(&self) -> String {
        format!("http://localhost:{}/callback", self.redirect_port)
    }

    #[must_use]
    pub fn token_path(&self) -> PathBuf {
        self.config_dir.join(TOKEN_FILE)
    }

    #[must_use]
    pub fn user_config_path(&self) -> PathBuf {
        self.config_dir.join(USER_CONFIG_FILE)
    }
}

/// `$HOME/.basic-cli`.
///
/// # Errors
///
/// Returns `CliError::Config` when `HOME` is unset.
pub fn default_config_dir() -> Result<PathBuf> {
    let home = env::var("HOME")
        .ok()
        .filter(|home| !home.trim().is_empty())
        .ok_or_config("HOME is not set")?;
    Ok(Path::new(&home).join(CONFIG_DIR_NAME))
}

/// Default config layer (lowest precedence).
#[must_use]
pub fn default_config_layer() -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    layer.insert("api-url", DEFAULT_API_URL);
    layer.insert("client-id", DEFAULT_CLIENT_ID);
    layer.insert("redirect-port", DEFAULT_REDIRECT_PORT.to_string());
    layer
}

/// Load settings with the full precedence chain.
///
/// The config directory is settled from env and CLI first, because the
/// user config file lives inside it.
///
/// # Errors
///
/// Returns an error if the user config cannot be read or parsed, or the
/// merged values are invalid.
pub fn load_settings(cli: &CliOverrides) -> Result<Settings> {
    let env_layer = ConfigLayer::from_env();
    let cli_layer = cli.as_layer();
    let early = ConfigLayer::merge_layers(&[env_layer.clone(), cli_layer.clone()]);
    let config_dir = match early.get("cli-dir") {
        Some(dir) => PathBuf::from(dir),
        None => default_config_dir()?,
    };

    let user = ConfigLayer::from_yaml(&config_dir.join(USER_CONFIG_FILE))?;
    let mut merged =
        ConfigLayer::merge_layers(&[default_config_layer(), user, env_layer, cli_layer]);
    merged.insert("cli-dir", config_dir.to_string_lossy().to_string());

    let settings = Settings::from_layer(&merged)?;
    tracing::debug!(
        api_url = %settings.api_url,
        config_dir = %settings.config_dir.display(),
        "Resolved settings"
    );
    Ok(settings)
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('_', "-")
}

fn layer_from_yaml_value(value: &serde_yaml::Value) -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    let mut flat = HashMap::new();
    flatten_yaml(value, "", &mut flat);

    for (key, value) in flat {
        layer.insert(&key, value);
    }

    layer
}

fn flatten_yaml(value: &serde_yaml::Value, prefix: &str, out: &mut HashMap<String, String>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (key, value) in map {
                let Some(key_str) = key.as_str() else {
                    continue;
                };
                let next_prefix = if prefix.is_empty() {
                    key_str.to_string()
                } else {
                    format!("{prefix}.{key_str}")
                };
                flatten_yaml(value, &next_prefix, out);
            }
        }
        _ => {
            if let Some(value) = yaml_scalar_to_string(value) {
                out.insert(prefix.to_string(), value);
            }
        }
    }
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Bool(v) => Some(v.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Null
        | serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Mapping(_) => None,
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
    }
}
