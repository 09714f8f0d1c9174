//! Documentation index of configuration paths.
//!
//! The Mattermost settings documentation annotates every setting with a
//! `:configjson:` field naming its JSON path, e.g.
//!
//! ```text
//! | This feature's ``config.json`` setting is ``".ServiceSettings.SiteURL": ""``
//! :configjson: .ServiceSettings.SiteURL
//! ```
//!
//! [`parse_docs`] extracts those paths; [`RemoteDocs`] fetches the file and
//! [`FileDocs`] reads a local checkout of it.

use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::http::{agent, map_error};
use crate::{Error, Result};

const CONFIGJSON_PATTERN: &str = r":configjson:\s(.+)";

/// Value used in the docs for settings that have no config.json entry.
const NOT_APPLICABLE: &str = "N/A";

static CONFIGJSON_RE: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();

/// The `:configjson:` line matcher, compiled once per process.
fn configjson_regex() -> Result<&'static Regex> {
    CONFIGJSON_RE
        .get_or_init(|| Regex::new(CONFIGJSON_PATTERN))
        .as_ref()
        .map_err(|e| Error::Other(e.to_string()))
}

/// Source of candidate configuration paths.
pub trait DocsIndex {
    /// All documented configuration paths, in document order.
    fn config_paths(&self) -> Result<Vec<String>>;
}

/// Extract configuration paths from documentation text.
///
/// `N/A` entries are skipped, the leading `.` is stripped, and repeated
/// paths are reported once.
pub fn parse_docs(text: &str) -> Result<Vec<String>> {
    let re = configjson_regex()?;

    let mut paths: Vec<String> = Vec::new();
    for line in text.lines() {
        let Some(captures) = re.captures(line) else {
            continue;
        };
        let value = captures[1].trim();
        if value == NOT_APPLICABLE {
            continue;
        }
        let path = value.strip_prefix('.').unwrap_or(value);
        if path.is_empty() || paths.iter().any(|p| p == path) {
            continue;
        }
        paths.push(path.to_string());
    }
    Ok(paths)
}

/// Documentation file fetched over HTTP.
pub struct RemoteDocs {
    url: String,
    agent: ureq::Agent,
}

impl RemoteDocs {
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            url: url.into(),
            agent: agent(timeout_secs),
        }
    }
}

impl DocsIndex for RemoteDocs {
    fn config_paths(&self) -> Result<Vec<String>> {
        debug!(url = %self.url, "fetching settings documentation");
        let body = self
            .agent
            .get(&self.url)
            .call()
            .map_err(map_error)?
            .into_string()?;
        let paths = parse_docs(&body)?;
        debug!(count = paths.len(), "parsed configuration paths");
        Ok(paths)
    }
}

/// Documentation file on local disk.
pub struct FileDocs {
    path: PathBuf,
}

impl FileDocs {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DocsIndex for FileDocs {
    fn config_paths(&self) -> Result<Vec<String>> {
        debug!(path = %self.path.display(), "reading settings documentation");
        parse_docs(&fs::read_to_string(&self.path)?)
    }
}

/// Fixed list of paths, for callers that already have them.
impl DocsIndex for Vec<String> {
    fn config_paths(&self) -> Result<Vec<String>> {
        Ok(self.clone())
    }
}
