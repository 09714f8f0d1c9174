//! Command implementations for the mmconf CLI.
//!
//! Each command takes its collaborators (config source, docs index,
//! explainer) as trait objects and returns a result implementing [`Output`].
//! Wiring collaborators from settings and credentials happens in
//! [`open_source`] and [`open_explainer`].

use std::path::{Path as FsPath, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::{
    AUTH_TOKEN_ENV, HIDDEN_SECRET, OPENAI_KEY_ENV, PASSWORD_ENV, Resolved, ResolvedConfig,
    ResolvedSecrets, config_kdl_path, mask_secret, read_config, write_config,
};
use crate::docs::DocsIndex;
use crate::explain::{Explainer, OpenAiExplainer};
use crate::server::{ConfigSource, Credentials, FileSource, ServerSource};
use crate::tree::{
    ConfigNode, MappingPatterns, Path, RawValue, TreeError, from_json, leaf_to_display,
    resolve_read, resolve_write, to_json,
};
use crate::{Error, Result};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

const SEPARATOR_WIDTH: usize = 60;

// === Wiring ===

/// Pick the configuration source: a local snapshot when `file` is given,
/// otherwise the server from `config`, authenticated from the environment.
pub fn open_source(
    file: Option<&FsPath>,
    user: Option<&str>,
    config: &ResolvedConfig,
    secrets: &ResolvedSecrets,
) -> Result<Box<dyn ConfigSource>> {
    if let Some(path) = file {
        debug!(path = %path.display(), "using snapshot file");
        return Ok(Box::new(FileSource::new(path)));
    }

    let credentials = match user {
        Some(username) => Credentials::Password {
            username: username.to_string(),
            password: secrets
                .password()
                .ok_or_else(|| Error::MissingCredential {
                    name: PASSWORD_ENV.to_string(),
                })?
                .to_string(),
        },
        None => Credentials::Token(
            secrets
                .auth_token()
                .ok_or_else(|| Error::MissingCredential {
                    name: AUTH_TOKEN_ENV.to_string(),
                })?
                .to_string(),
        ),
    };

    let source = ServerSource::connect(config.server_url(), credentials, config.timeout_secs())?;
    Ok(Box::new(source))
}

/// Build the OpenAI explainer from settings and `OPENAI_APIKEY`.
pub fn open_explainer(config: &ResolvedConfig, secrets: &ResolvedSecrets) -> Result<OpenAiExplainer> {
    let key = secrets.openai_key().ok_or_else(|| Error::MissingCredential {
        name: OPENAI_KEY_ENV.to_string(),
    })?;
    Ok(OpenAiExplainer::new(
        key,
        config.openai_model.value.clone(),
        config.timeout_secs(),
    ))
}

/// Mapping patterns from resolved settings.
pub fn mapping_patterns(config: &ResolvedConfig) -> MappingPatterns {
    MappingPatterns::new(&config.mapping_paths.value)
}

fn load_tree(source: &dyn ConfigSource, patterns: &MappingPatterns) -> Result<ConfigNode> {
    let snapshot = source.fetch()?;
    Ok(from_json(&snapshot, patterns))
}

fn display_node(node: &ConfigNode) -> String {
    match node {
        ConfigNode::Leaf(leaf) => leaf_to_display(leaf),
        ConfigNode::Optional(None) => "(unset)".to_string(),
        ConfigNode::Optional(Some(inner)) => display_node(inner),
        _ => serde_json::to_string_pretty(&to_json(node)).unwrap_or_default(),
    }
}

// === Get ===

#[derive(Debug, Serialize)]
pub struct GetResult {
    pub path: String,
    #[serde(rename = "type")]
    pub value_type: String,
    pub value: Value,
    #[serde(skip)]
    display: String,
}

impl Output for GetResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        self.display.clone()
    }
}

/// Read the node at `path`.
pub fn get(source: &dyn ConfigSource, patterns: &MappingPatterns, path: &str) -> Result<GetResult> {
    let path = Path::parse(path)?;
    let tree = load_tree(source, patterns)?;
    let node = resolve_read(&path, &tree).ok_or_else(|| TreeError::invalid_path(&path))?;

    Ok(GetResult {
        path: path.to_string(),
        value_type: node.value_type().to_string(),
        value: to_json(node),
        display: display_node(node),
    })
}

// === Set ===

#[derive(Debug, Serialize)]
pub struct SetResult {
    pub path: String,
    pub old_value: Value,
    pub new_value: Value,
    pub applied: bool,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl Output for SetResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        let verb = if self.applied { "Updated" } else { "Would update" };
        let mut text = format!(
            "{} {}\n  old: {}\n  new: {}",
            verb, self.path, self.old_value, self.new_value
        );
        if let Some(ref user) = self.user {
            text.push_str(&format!("\n  as:  {}", user));
        }
        text
    }
}

/// Write `values` to `path` and hand the updated snapshot back to the
/// source. With `dry_run` the source is left alone.
pub fn set(
    source: &dyn ConfigSource,
    patterns: &MappingPatterns,
    path: &str,
    values: Vec<String>,
    force_list: bool,
    dry_run: bool,
) -> Result<SetResult> {
    let path = Path::parse(path)?;
    let mut tree = load_tree(source, patterns)?;

    let old_value = resolve_read(&path, &tree).map(to_json).unwrap_or(Value::Null);
    let raw = RawValue::from_args(values, force_list);
    resolve_write(&path, &mut tree, &raw)?;
    let new_value = resolve_read(&path, &tree).map(to_json).unwrap_or(Value::Null);

    if !dry_run {
        source.patch(&to_json(&tree))?;
        info!(
            path = %path,
            target = %source.describe(),
            user = source.user().unwrap_or("-"),
            "configuration updated"
        );
    }

    Ok(SetResult {
        path: path.to_string(),
        old_value,
        new_value,
        applied: !dry_run,
        target: source.describe(),
        user: source.user().map(String::from),
    })
}

// === Paths ===

#[derive(Debug, Serialize)]
pub struct PathEntry {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct PathsResult {
    pub count: usize,
    pub paths: Vec<PathEntry>,
}

impl Output for PathsResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        if self.paths.is_empty() {
            return "No configuration paths found.".to_string();
        }
        let mut lines: Vec<String> = self
            .paths
            .iter()
            .map(|entry| match (&entry.found, &entry.value) {
                (Some(true), Some(value)) => format!("{} = {}", entry.path, value),
                (Some(false), _) => format!("{} (not found)", entry.path),
                _ => entry.path.clone(),
            })
            .collect();
        lines.push(format!("{} path(s)", self.count));
        lines.join("\n")
    }
}

/// List documented paths, optionally filtered by a case-insensitive
/// substring and looked up in the current configuration.
pub fn paths(
    docs: &dyn DocsIndex,
    filter: Option<&str>,
    resolve_in: Option<(&dyn ConfigSource, &MappingPatterns)>,
) -> Result<PathsResult> {
    let filter = filter.map(str::to_lowercase);
    let documented: Vec<String> = docs
        .config_paths()?
        .into_iter()
        .filter(|p| {
            filter
                .as_deref()
                .is_none_or(|needle| p.to_lowercase().contains(needle))
        })
        .collect();

    let tree = match resolve_in {
        Some((source, patterns)) => Some(load_tree(source, patterns)?),
        None => None,
    };

    let paths: Vec<PathEntry> = documented
        .into_iter()
        .map(|text| {
            let Some(tree) = tree.as_ref() else {
                return PathEntry {
                    path: text,
                    found: None,
                    value: None,
                };
            };
            let value = Path::parse(&text)
                .ok()
                .and_then(|path| resolve_read(&path, tree).map(to_json));
            PathEntry {
                path: text,
                found: Some(value.is_some()),
                value,
            }
        })
        .collect();

    Ok(PathsResult {
        count: paths.len(),
        paths,
    })
}

// === Explain ===

#[derive(Debug, Serialize)]
pub struct ExplainResult {
    pub path: String,
    pub explanation: String,
}

impl Output for ExplainResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        let rule = "-".repeat(SEPARATOR_WIDTH);
        format!("{}\n{}\n{}\n{}", self.path, rule, self.explanation, rule)
    }
}

/// Ask the explainer what the setting at `path` does.
pub fn explain(explainer: &dyn Explainer, path: &str) -> Result<ExplainResult> {
    let path = Path::parse(path)?;
    let explanation = explainer.explain(&path.to_string())?;
    Ok(ExplainResult {
        path: path.to_string(),
        explanation,
    })
}

// === Config ===

#[derive(Debug, Serialize)]
pub struct SettingEntry {
    pub key: String,
    pub value: Value,
    pub source: String,
}

#[derive(Debug, Serialize)]
pub struct CredentialEntry {
    pub name: String,
    pub value: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConfigShowResult {
    pub config_path: Option<String>,
    pub settings: Vec<SettingEntry>,
    pub credentials: Vec<CredentialEntry>,
}

impl Output for ConfigShowResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        if let Some(ref path) = self.config_path {
            lines.push(format!("Config file: {}", path));
            lines.push(String::new());
        }
        for entry in &self.settings {
            let value = match &entry.value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            lines.push(format!("{} = {} ({})", entry.key, value, entry.source));
        }
        lines.push(String::new());
        for entry in &self.credentials {
            match (&entry.value, &entry.source) {
                (Some(value), Some(source)) => {
                    lines.push(format!("{} = {} ({})", entry.name, value, source))
                }
                _ => lines.push(format!("{} (not set)", entry.name)),
            }
        }
        lines.join("\n")
    }
}

/// Resolved settings with their sources. Credentials are masked.
pub fn config_show(config: &ResolvedConfig, secrets: &ResolvedSecrets) -> ConfigShowResult {
    let settings = vec![
        SettingEntry {
            key: "server-url".to_string(),
            value: Value::from(config.server_url.value.clone()),
            source: config.server_url.source.to_string(),
        },
        SettingEntry {
            key: "output-format".to_string(),
            value: Value::from(config.output_format.value.as_str()),
            source: config.output_format.source.to_string(),
        },
        SettingEntry {
            key: "docs-url".to_string(),
            value: Value::from(config.docs_url.value.clone()),
            source: config.docs_url.source.to_string(),
        },
        SettingEntry {
            key: "openai-model".to_string(),
            value: Value::from(config.openai_model.value.clone()),
            source: config.openai_model.source.to_string(),
        },
        SettingEntry {
            key: "timeout-secs".to_string(),
            value: Value::from(config.timeout_secs.value),
            source: config.timeout_secs.source.to_string(),
        },
        SettingEntry {
            key: "mapping-paths".to_string(),
            value: Value::from(config.mapping_paths.value.clone()),
            source: config.mapping_paths.source.to_string(),
        },
    ];

    let credential = |name: &str, resolved: &Option<Resolved<String>>, mask: fn(&str) -> String| {
        CredentialEntry {
            name: name.to_string(),
            value: resolved.as_ref().map(|r| mask(&r.value)),
            source: resolved.as_ref().map(|r| r.source.to_string()),
        }
    };
    // Passwords only report whether they are set
    let credentials = vec![
        credential(AUTH_TOKEN_ENV, &secrets.auth_token, mask_secret),
        credential(PASSWORD_ENV, &secrets.password, |_| HIDDEN_SECRET.to_string()),
        credential(OPENAI_KEY_ENV, &secrets.openai_key, mask_secret),
    ];

    ConfigShowResult {
        config_path: config_kdl_path().map(|p| p.display().to_string()),
        settings,
        credentials,
    }
}

#[derive(Debug, Serialize)]
pub struct ConfigSetResult {
    pub key: String,
    pub values: Vec<String>,
    pub path: String,
}

impl Output for ConfigSetResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        format!(
            "Set {} = {} in {}",
            self.key,
            self.values.join(" "),
            self.path
        )
    }
}

/// Set one key in config.kdl, validating the result before writing.
pub fn config_set(key: &str, values: Vec<String>) -> Result<ConfigSetResult> {
    let mut config = read_config()?;
    config.set_key(key, &values).map_err(Error::InvalidInput)?;
    let path = write_config(&config)?;
    info!(key, path = %path.display(), "config.kdl updated");

    Ok(ConfigSetResult {
        key: key.to_string(),
        values,
        path: path.display().to_string(),
    })
}

#[derive(Debug, Serialize)]
pub struct ConfigPathResult {
    pub path: String,
}

impl Output for ConfigPathResult {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn to_human(&self) -> String {
        self.path.clone()
    }
}

/// Location of config.kdl, whether or not it exists yet.
pub fn config_path() -> Result<ConfigPathResult> {
    let path: PathBuf = config_kdl_path()
        .ok_or_else(|| Error::Other("Could not determine config directory".to_string()))?;
    Ok(ConfigPathResult {
        path: path.display().to_string(),
    })
}
