//! Stored credentials.
//!
//! The token lives in `~/.basic-cli/token.json`, readable by the owner
//! only. [`TokenProvider`] hands out a usable token, refreshing and
//! re-saving it when it has expired.

pub mod oauth;

use crate::error::{CliError, Result, ResultExt};
use crate::model::Token;
use chrono::{DateTime, Utc};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Exchanges an expired token for a fresh one.
pub trait TokenRefresher {
    /// # Errors
    ///
    /// Returns `CliError::TokenRefresh` if the token endpoint refuses.
    fn refresh(&self, token: &Token) -> Result<Token>;
}

/// The token file on disk.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored token; `None` when there is no token file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<Option<Token>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let token = serde_json::from_str(&contents)
            .with_context(|| format!("Corrupt token file {}", self.path.display()))?;
        Ok(Some(token))
    }

    /// Write the token, creating the directory as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save(&self, token: &Token) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
            restrict_permissions(dir, 0o700)?;
        }
        let body = serde_json::to_string_pretty(token)?;
        write_private(&self.path, body.as_bytes())?;
        debug!(path = %self.path.display(), "Saved token");
        Ok(())
    }

    /// Remove the token file. Returns whether one existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn delete(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "Removed token");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(unix)]
fn write_private(path: &Path, body: &[u8]) -> Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(body)?;
    // `mode` only applies on create; tighten a file that already existed.
    restrict_permissions(path, 0o600)
}

#[cfg(not(unix))]
fn write_private(path: &Path, body: &[u8]) -> Result<()> {
    fs::write(path, body)?;
    Ok(())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

/// Hands out a valid token, refreshing it when expired.
pub struct TokenProvider<'a> {
    store: &'a TokenStore,
    refresher: &'a dyn TokenRefresher,
}

impl<'a> TokenProvider<'a> {
    #[must_use]
    pub fn new(store: &'a TokenStore, refresher: &'a dyn TokenRefresher) -> Self {
        Self { store, refresher }
    }

    /// Current token, or `None` when logged out.
    ///
    /// # Errors
    ///
    /// Returns an error if the token file is unreadable, or the token has
    /// expired and cannot be refreshed.
    pub fn get(&self) -> Result<Option<Token>> {
        self.get_at(Utc::now())
    }

    /// [`get`](Self::get) against an explicit clock.
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub fn get_at(&self, now: DateTime<Utc>) -> Result<Option<Token>> {
        let Some(token) = self.store.load()? else {
            return Ok(None);
        };
        if !token.is_expired(now) {
            return Ok(Some(token));
        }
        if !token.has_refresh_token() {
            return Err(CliError::TokenRefresh(
                "no refresh token is stored".to_string(),
            ));
        }

        debug!(expired_at = %token.expires_at, "Refreshing expired token");
        let fresh = self.refresher.refresh(&token)?;
        self.store.save(&fresh)?;
        info!("Refreshed access token");
        Ok(Some(fresh))
    }

    /// Current token; logged out is an error.
    ///
    /// # Errors
    ///
    /// Returns `CliError::NotLoggedIn` when no token is stored, or any
    /// error from [`get`](Self::get).
    pub fn require(&self) -> Result<Token> {
        self.get()?.ok_or(CliError::NotLoggedIn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::cell::Cell;
    use tempfile::TempDir;

    fn token(expires_at: DateTime<Utc>, refresh: &str) -> Token {
        Token {
            access_token: "access".to_string(),
            refresh_token: refresh.to_string(),
            token_type: "Bearer".to_string(),
            expires_at,
        }
    }

    struct CountingRefresher {
        calls: Cell<usize>,
        fail: bool,
    }

    impl TokenRefresher for CountingRefresher {
        fn refresh(&self, old: &Token) -> Result<Token> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(CliError::TokenRefresh("401".to_string()));
            }
            Ok(Token {
                access_token: "fresh".to_string(),
                expires_at: Utc::now() + Duration::hours(1),
                ..old.clone()
            })
        }
    }

    fn refresher(fail: bool) -> CountingRefresher {
        CountingRefresher {
            calls: Cell::new(0),
            fail,
        }
    }

    #[test]
    fn save_load_delete() {
        let temp = TempDir::new().unwrap();
        let store = TokenStore::new(temp.path().join(".basic-cli").join("token.json"));
        assert!(store.load().unwrap().is_none());

        let saved = token(Utc::now() + Duration::hours(1), "r");
        store.save(&saved).unwrap();
        assert_eq!(store.load().unwrap(), Some(saved));

        assert!(store.delete().unwrap());
        assert!(!store.delete().unwrap());
        assert!(store.load().unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn token_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".basic-cli");
        let store = TokenStore::new(dir.join("token.json"));
        store
            .save(&token(Utc::now() + Duration::hours(1), "r"))
            .unwrap();

        let file_mode = fs::metadata(store.path()).unwrap().permissions().mode();
        let dir_mode = fs::metadata(&dir).unwrap().permissions().mode();
        assert_eq!(file_mode & 0o777, 0o600);
        assert_eq!(dir_mode & 0o777, 0o700);
    }

    #[test]
    fn reads_legacy_expiry_field() {
        let temp = TempDir::new().unwrap();
        let store = TokenStore::new(temp.path().join("token.json"));
        fs::write(
            store.path(),
            r#"{"access_token":"a","token_type":"Bearer","refresh_token":"r","expiry":"2030-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.expires_at.to_rfc3339(), "2030-01-01T00:00:00+00:00");
    }

    #[test]
    fn corrupt_token_is_an_error() {
        let temp = TempDir::new().unwrap();
        let store = TokenStore::new(temp.path().join("token.json"));
        fs::write(store.path(), "not json").unwrap();
        assert!(store.load().is_err());
    }

    #[test]
    fn provider_returns_valid_token_without_refresh() {
        let temp = TempDir::new().unwrap();
        let store = TokenStore::new(temp.path().join("token.json"));
        store
            .save(&token(Utc::now() + Duration::hours(1), "r"))
            .unwrap();
        let refresher = refresher(false);

        let got = TokenProvider::new(&store, &refresher).get().unwrap().unwrap();
        assert_eq!(got.access_token, "access");
        assert_eq!(refresher.calls.get(), 0);
    }

    #[test]
    fn provider_refreshes_and_persists_expired_token() {
        let temp = TempDir::new().unwrap();
        let store = TokenStore::new(temp.path().join("token.json"));
        store
            .save(&token(Utc::now() - Duration::minutes(5), "r"))
            .unwrap();
        let refresher = refresher(false);

        let got = TokenProvider::new(&store, &refresher).get().unwrap().unwrap();
        assert_eq!(got.access_token, "fresh");
        assert_eq!(refresher.calls.get(), 1);
        assert_eq!(store.load().unwrap().unwrap().access_token, "fresh");
    }

    #[test]
    fn provider_surfaces_refresh_failure() {
        let temp = TempDir::new().unwrap();
        let store = TokenStore::new(temp.path().join("token.json"));
        store
            .save(&token(Utc::now() - Duration::minutes(5), "r"))
            .unwrap();
        let refresher = refresher(true);

        let err = TokenProvider::new(&store, &refresher).get().unwrap_err();
        assert!(matches!(err, CliError::TokenRefresh(_)));
    }

    #[test]
    fn require_without_token_is_not_logged_in() {
        let temp = TempDir::new().unwrap();
        let store = TokenStore::new(temp.path().join("token.json"));
        let refresher = refresher(false);
        let err = TokenProvider::new(&store, &refresher).require().unwrap_err();
        assert!(matches!(err, CliError::NotLoggedIn));
    }
}
