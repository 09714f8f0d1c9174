//! Where configuration snapshots come from and go back to.
//!
//! - [`ServerSource`]: a live Mattermost server via its REST API
//!   (`GET /api/v4/config`, `PUT /api/v4/config/patch`)
//! - [`FileSource`]: a local JSON snapshot, for offline edits
//!
//! Every operation fetches a fresh snapshot; nothing is cached between a
//! read and a later patch.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::http::{agent, map_error};
use crate::{Error, Result};

/// Header carrying the session token after a password login
const TOKEN_HEADER: &str = "Token";

/// Supplier and receiver of full configuration snapshots.
pub trait ConfigSource {
    /// Fetch the current configuration snapshot.
    fn fetch(&self) -> Result<Value>;

    /// Hand back a full, modified snapshot. Returns the configuration as
    /// stored after the patch.
    fn patch(&self, config: &Value) -> Result<Value>;

    /// Short description for logs and output.
    fn describe(&self) -> String;

    /// Account that changes are made as, for sources that authenticate.
    fn user(&self) -> Option<&str> {
        None
    }
}

/// How to authenticate against the server.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Personal access or session token, sent as a bearer token
    Token(String),
    /// Username/password login exchanged for a session token
    Password { username: String, password: String },
}

/// Authenticated user, as returned by `/users/me` and `/users/login`.
#[derive(Debug, Deserialize)]
pub struct ServerUser {
    pub username: String,
}

/// A live Mattermost server.
pub struct ServerSource {
    base_url: String,
    agent: ureq::Agent,
    token: String,
    user: ServerUser,
}

impl ServerSource {
    /// Authenticate and return a ready source.
    ///
    /// Token credentials are checked with `GET /api/v4/users/me`; password
    /// credentials go through `POST /api/v4/users/login`.
    pub fn connect(base_url: &str, credentials: Credentials, timeout_secs: u64) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let agent = agent(timeout_secs);

        let (token, user) = match credentials {
            Credentials::Token(token) => {
                let user: ServerUser = agent
                    .get(&format!("{}/api/v4/users/me", base_url))
                    .set("Authorization", &format!("Bearer {}", token))
                    .call()
                    .map_err(map_error)?
                    .into_json()?;
                (token, user)
            }
            Credentials::Password { username, password } => {
                let resp = agent
                    .post(&format!("{}/api/v4/users/login", base_url))
                    .send_json(json!({ "login_id": username, "password": password }))
                    .map_err(map_error)?;
                let token = resp
                    .header(TOKEN_HEADER)
                    .map(String::from)
                    .ok_or_else(|| {
                        Error::Unauthorized("Login response did not include a session token".to_string())
                    })?;
                let user: ServerUser = resp.into_json()?;
                (token, user)
            }
        };

        info!(server = %base_url, user = %user.username, "authenticated");
        Ok(Self {
            base_url,
            agent,
            token,
            user,
        })
    }

    fn authorization(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl ConfigSource for ServerSource {
    fn fetch(&self) -> Result<Value> {
        debug!(server = %self.base_url, "fetching config");
        let config = self
            .agent
            .get(&format!("{}/api/v4/config", self.base_url))
            .set("Authorization", &self.authorization())
            .call()
            .map_err(map_error)?
            .into_json()?;
        Ok(config)
    }

    fn patch(&self, config: &Value) -> Result<Value> {
        debug!(server = %self.base_url, "patching config");
        let updated = self
            .agent
            .put(&format!("{}/api/v4/config/patch", self.base_url))
            .set("Authorization", &self.authorization())
            .send_json(config)
            .map_err(map_error)?
            .into_json()?;
        Ok(updated)
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }

    fn user(&self) -> Option<&str> {
        Some(&self.user.username)
    }
}

/// A configuration snapshot stored as a JSON file.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for FileSource {
    fn fetch(&self) -> Result<Value> {
        if !self.path.exists() {
            return Err(Error::InvalidInput(format!(
                "Snapshot file does not exist: {}",
                self.path.display()
            )));
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn patch(&self, config: &Value) -> Result<Value> {
        let mut content = serde_json::to_string_pretty(config)?;
        content.push('\n');
        fs::write(&self.path, content)?;
        Ok(config.clone())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
