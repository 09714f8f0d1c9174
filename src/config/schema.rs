//! KDL schema for config.kdl.
//!
//! This module provides:
//! - The Rust struct representing the KDL schema
//! - Serialization/deserialization to/from KDL format
//! - Validation and per-key editing for `mmconf config set`

use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use serde::{Deserialize, Serialize};

/// Output format preference for CLI commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output (default, machine-readable)
    #[default]
    Json,
    /// Human-readable output
    Human,
}

impl OutputFormat {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "human" => Some(OutputFormat::Human),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Human => "human",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Keys accepted in config.kdl, in the order they are written.
pub const CONFIG_KEYS: &[&str] = &[
    "server-url",
    "output-format",
    "docs-url",
    "openai-model",
    "timeout-secs",
    "mapping-paths",
];

/// Tool preferences stored in config.kdl.
///
/// No secrets live here: tokens and passwords come from the environment.
///
/// # KDL Schema
///
/// ```kdl
/// server-url "https://chat.example.com"
/// output-format "human"  // or "json"
/// docs-url "https://raw.githubusercontent.com/mattermost/docs/master/source/configure/site-configuration-settings.rst"
/// openai-model "gpt-3.5-turbo"
/// timeout-secs 30
/// mapping-paths "PluginSettings.Plugins" "PluginSettings.Plugins.*" "PluginSettings.PluginStates"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MmconfConfig {
    /// Base URL of the Mattermost server
    pub server_url: Option<String>,

    /// Default output format for CLI commands
    pub output_format: Option<OutputFormat>,

    /// Settings documentation file scanned for configuration paths
    pub docs_url: Option<String>,

    /// Chat model used by `mmconf explain`
    pub openai_model: Option<String>,

    /// Global timeout for HTTP requests, in seconds
    pub timeout_secs: Option<u64>,

    /// Snapshot key paths treated as key-value maps
    pub mapping_paths: Option<Vec<String>>,
}

impl MmconfConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config values.
    ///
    /// Returns an error message for the first invalid value.
    pub fn validate(&self) -> Result<(), String> {
        match self.problems().into_iter().next() {
            Some((_, message)) => Err(message),
            None => Ok(()),
        }
    }

    /// Clear every invalid value, returning one message per cleared key.
    pub fn drop_invalid(&mut self) -> Vec<String> {
        let problems = self.problems();
        for (key, _) in &problems {
            match *key {
                "server-url" => self.server_url = None,
                "docs-url" => self.docs_url = None,
                "timeout-secs" => self.timeout_secs = None,
                "mapping-paths" => self.mapping_paths = None,
                _ => {}
            }
        }
        problems.into_iter().map(|(_, message)| message).collect()
    }

    fn problems(&self) -> Vec<(&'static str, String)> {
        let mut problems = Vec::new();
        if let Some(ref url) = self.server_url {
            if let Err(e) = validate_url("server-url", url) {
                problems.push(("server-url", e));
            }
        }
        if let Some(ref url) = self.docs_url {
            if let Err(e) = validate_url("docs-url", url) {
                problems.push(("docs-url", e));
            }
        }
        if self.timeout_secs == Some(0) {
            problems.push(("timeout-secs", "timeout-secs must be greater than 0".to_string()));
        }
        if let Some(ref paths) = self.mapping_paths {
            if paths.iter().any(|p| p.is_empty()) {
                problems.push((
                    "mapping-paths",
                    "mapping-paths must not contain empty paths".to_string(),
                ));
            }
        }
        problems
    }

    /// Set a single key from its string form, as given to `mmconf config set`.
    pub fn set_key(&mut self, key: &str, values: &[String]) -> Result<(), String> {
        let single = || match values {
            [value] => Ok(value.clone()),
            _ => Err(format!("{} takes exactly one value", key)),
        };

        match key {
            "server-url" => self.server_url = Some(single()?),
            "output-format" => {
                let value = single()?;
                self.output_format = Some(
                    OutputFormat::parse(&value)
                        .ok_or_else(|| format!("output-format must be json or human, got {}", value))?,
                );
            }
            "docs-url" => self.docs_url = Some(single()?),
            "openai-model" => self.openai_model = Some(single()?),
            "timeout-secs" => {
                let value = single()?;
                self.timeout_secs = Some(
                    value
                        .parse()
                        .map_err(|_| format!("timeout-secs must be a number, got {}", value))?,
                );
            }
            "mapping-paths" => self.mapping_paths = Some(values.to_vec()),
            other => {
                return Err(format!(
                    "Unknown config key: {} (expected one of: {})",
                    other,
                    CONFIG_KEYS.join(", ")
                ));
            }
        }
        self.validate()
    }

    /// Parse config from a KDL document. Unknown or malformed nodes are ignored.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        let mut config = Self::new();

        config.server_url = first_string(doc, "server-url");
        config.output_format = first_string(doc, "output-format").and_then(|s| OutputFormat::parse(&s));
        config.docs_url = first_string(doc, "docs-url");
        config.openai_model = first_string(doc, "openai-model");

        if let Some(node) = doc.get("timeout-secs") {
            if let Some(entry) = node.entries().first() {
                if let Some(i) = entry.value().as_integer() {
                    if i > 0 {
                        config.timeout_secs = u64::try_from(i).ok();
                    }
                }
            }
        }

        if let Some(node) = doc.get("mapping-paths") {
            let paths: Vec<String> = node
                .entries()
                .iter()
                .filter_map(|entry| entry.value().as_string())
                .map(String::from)
                .collect();
            config.mapping_paths = Some(paths);
        }

        config
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        if let Some(ref url) = self.server_url {
            push_string(&mut doc, "server-url", url);
        }
        if let Some(ref format) = self.output_format {
            push_string(&mut doc, "output-format", format.as_str());
        }
        if let Some(ref url) = self.docs_url {
            push_string(&mut doc, "docs-url", url);
        }
        if let Some(ref model) = self.openai_model {
            push_string(&mut doc, "openai-model", model);
        }
        if let Some(timeout) = self.timeout_secs {
            let mut node = KdlNode::new("timeout-secs");
            node.push(KdlEntry::new(KdlValue::Integer(i128::from(timeout))));
            doc.nodes_mut().push(node);
        }
        if let Some(ref paths) = self.mapping_paths {
            let mut node = KdlNode::new("mapping-paths");
            for path in paths {
                node.push(KdlEntry::new(KdlValue::String(path.clone())));
            }
            doc.nodes_mut().push(node);
        }

        doc
    }
}

fn validate_url(key: &str, url: &str) -> Result<(), String> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(format!("{} must start with http:// or https://, got {}", key, url))
    }
}

fn first_string(doc: &KdlDocument, name: &str) -> Option<String> {
    let node = doc.get(name)?;
    let entry = node.entries().first()?;
    entry.value().as_string().map(String::from)
}

fn push_string(doc: &mut KdlDocument, name: &str, value: &str) {
    let mut node = KdlNode::new(name);
    node.push(KdlEntry::new(KdlValue::String(value.to_string())));
    doc.nodes_mut().push(node);
}
