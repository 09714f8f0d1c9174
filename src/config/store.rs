//! Locating, reading and writing config.kdl.

use std::fs;
use std::path::PathBuf;

use kdl::KdlDocument;
use tracing::{debug, warn};

use super::schema::MmconfConfig;
use crate::{Error, Result};

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "MMCONF_CONFIG_DIR";

const CONFIG_FILE_NAME: &str = "config.kdl";

/// Directory holding config.kdl.
///
/// `MMCONF_CONFIG_DIR` wins; otherwise `~/.config/mmconf` (platform
/// equivalent via `dirs`).
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        if !dir.is_empty() {
            return Some(PathBuf::from(dir));
        }
    }
    dirs::config_dir().map(|dir| dir.join("mmconf"))
}

pub fn config_kdl_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// Read config.kdl. A missing file is an empty config.
///
/// Invalid values are dropped with a warning so that the remaining settings
/// still apply and `mmconf config set` can repair the file.
pub fn read_config() -> Result<MmconfConfig> {
    let Some(path) = config_kdl_path() else {
        return Ok(MmconfConfig::default());
    };
    if !path.exists() {
        debug!(path = %path.display(), "no config file");
        return Ok(MmconfConfig::default());
    }

    let content = fs::read_to_string(&path)?;
    let doc: KdlDocument = content.parse()?;
    let mut config = MmconfConfig::from_kdl(&doc);
    for problem in config.drop_invalid() {
        warn!(path = %path.display(), "ignoring invalid setting: {}", problem);
    }
    Ok(config)
}

/// Write config.kdl, creating the directory if needed. Returns the path written.
pub fn write_config(config: &MmconfConfig) -> Result<PathBuf> {
    let path = config_kdl_path()
        .ok_or_else(|| Error::Other("Could not determine config directory".to_string()))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, config.to_kdl().to_string())?;
    Ok(path)
}
