//! Precedence resolution for tool settings and credentials.
//!
//! ## Settings precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. Environment variables (`MMCONF_SERVER_URL`)
//! 3. config.kdl
//! 4. Built-in defaults
//!
//! ## Credentials
//!
//! Credentials are only ever read from the environment:
//! `MM_AUTHTOKEN` (server bearer token), `MM_PASSWORD` (password login) and
//! `OPENAI_APIKEY` (explainer).

use super::schema::{MmconfConfig, OutputFormat};
use crate::tree::DEFAULT_MAPPING_PATHS;

/// Environment variable overriding the server URL.
pub const SERVER_URL_ENV: &str = "MMCONF_SERVER_URL";
/// Environment variable holding a server personal access / session token.
pub const AUTH_TOKEN_ENV: &str = "MM_AUTHTOKEN";
/// Environment variable holding the password for `--user` logins.
pub const PASSWORD_ENV: &str = "MM_PASSWORD";
/// Environment variable holding the OpenAI API key.
pub const OPENAI_KEY_ENV: &str = "OPENAI_APIKEY";

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8065";
pub const DEFAULT_DOCS_URL: &str = "https://raw.githubusercontent.com/mattermost/docs/master/source/configure/site-configuration-settings.rst";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from environment variable
    EnvVar(String),
    /// Value from config.kdl
    ConfigFile,
    /// Value from CLI flag
    CliFlag,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::ConfigFile => write!(f, "config"),
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Fully resolved settings with source tracking.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub server_url: Resolved<String>,
    pub output_format: Resolved<OutputFormat>,
    pub docs_url: Resolved<String>,
    pub openai_model: Resolved<String>,
    pub timeout_secs: Resolved<u64>,
    pub mapping_paths: Resolved<Vec<String>>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            server_url: Resolved::new(DEFAULT_SERVER_URL.to_string(), ValueSource::Default),
            output_format: Resolved::new(OutputFormat::Json, ValueSource::Default),
            docs_url: Resolved::new(DEFAULT_DOCS_URL.to_string(), ValueSource::Default),
            openai_model: Resolved::new(DEFAULT_OPENAI_MODEL.to_string(), ValueSource::Default),
            timeout_secs: Resolved::new(DEFAULT_TIMEOUT_SECS, ValueSource::Default),
            mapping_paths: Resolved::new(
                DEFAULT_MAPPING_PATHS.iter().map(|p| p.to_string()).collect(),
                ValueSource::Default,
            ),
        }
    }
}

impl ResolvedConfig {
    pub fn server_url(&self) -> &str {
        &self.server_url.value
    }

    pub fn output_format(&self) -> &OutputFormat {
        &self.output_format.value
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs.value
    }
}

/// CLI overrides for settings resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Server URL override from `--server`
    pub server_url: Option<String>,
    /// Output format override from `-H`
    pub output_format: Option<OutputFormat>,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }
}

/// Resolve settings with the full precedence chain.
pub fn resolve_config(file: &MmconfConfig, overrides: &ConfigOverrides) -> ResolvedConfig {
    let mut result = ResolvedConfig::default();

    if let Some(ref url) = overrides.server_url {
        result.server_url = Resolved::new(url.clone(), ValueSource::CliFlag);
    } else if let Some(url) = non_empty_env(SERVER_URL_ENV) {
        result.server_url = Resolved::new(url, ValueSource::EnvVar(SERVER_URL_ENV.to_string()));
    } else if let Some(ref url) = file.server_url {
        result.server_url = Resolved::new(url.clone(), ValueSource::ConfigFile);
    }

    if let Some(ref format) = overrides.output_format {
        result.output_format = Resolved::new(format.clone(), ValueSource::CliFlag);
    } else if let Some(ref format) = file.output_format {
        result.output_format = Resolved::new(format.clone(), ValueSource::ConfigFile);
    }

    if let Some(ref url) = file.docs_url {
        result.docs_url = Resolved::new(url.clone(), ValueSource::ConfigFile);
    }
    if let Some(ref model) = file.openai_model {
        result.openai_model = Resolved::new(model.clone(), ValueSource::ConfigFile);
    }
    if let Some(timeout) = file.timeout_secs {
        result.timeout_secs = Resolved::new(timeout, ValueSource::ConfigFile);
    }
    if let Some(ref paths) = file.mapping_paths {
        result.mapping_paths = Resolved::new(paths.clone(), ValueSource::ConfigFile);
    }

    result
}

/// Credentials found in the environment.
#[derive(Debug, Clone, Default)]
pub struct ResolvedSecrets {
    /// Server bearer token
    pub auth_token: Option<Resolved<String>>,
    /// Password for username logins
    pub password: Option<Resolved<String>>,
    /// OpenAI API key
    pub openai_key: Option<Resolved<String>>,
}

impl ResolvedSecrets {
    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_ref().map(|r| r.value.as_str())
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_ref().map(|r| r.value.as_str())
    }

    pub fn openai_key(&self) -> Option<&str> {
        self.openai_key.as_ref().map(|r| r.value.as_str())
    }
}

/// Read credentials from the environment. Empty variables count as unset.
pub fn resolve_secrets() -> ResolvedSecrets {
    let from_env = |name: &str| {
        non_empty_env(name).map(|value| Resolved::new(value, ValueSource::EnvVar(name.to_string())))
    };

    ResolvedSecrets {
        auth_token: from_env(AUTH_TOKEN_ENV),
        password: from_env(PASSWORD_ENV),
        openai_key: from_env(OPENAI_KEY_ENV),
    }
}

/// Placeholder shown for secrets too short to reveal any part of.
pub const HIDDEN_SECRET: &str = "********";

/// Mask a secret for display, showing only the first and last 4 characters.
///
/// Secrets shorter than 20 characters are hidden entirely.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() < 20 {
        return HIDDEN_SECRET.to_string();
    }
    let prefix: String = chars[..4].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", prefix, suffix)
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}
