//! Settings for the mmconf tool itself.
//!
//! This is the tool's own configuration, not the Mattermost configuration it
//! edits (see [`crate::tree`] for that).
//!
//! ## config.kdl - User preferences
//!
//! Located at `~/.config/mmconf/config.kdl`, or in `$MMCONF_CONFIG_DIR`.
//!
//! Contains:
//! - `server-url` - Mattermost server to talk to
//! - `output-format` - "json" or "human"
//! - `docs-url` - settings documentation scanned by `mmconf paths`
//! - `openai-model` - chat model used by `mmconf explain`
//! - `timeout-secs` - HTTP timeout
//! - `mapping-paths` - snapshot key paths that are key-value maps
//!
//! ## Secrets
//!
//! Tokens and passwords are never stored; they are read from the
//! environment on every run.
//!
//! Use the [`resolver`] module for precedence resolution.

pub mod resolver;
pub mod schema;
pub mod store;

pub use resolver::{
    AUTH_TOKEN_ENV, ConfigOverrides, HIDDEN_SECRET, OPENAI_KEY_ENV, PASSWORD_ENV, Resolved, ResolvedConfig,
    ResolvedSecrets, SERVER_URL_ENV, ValueSource, mask_secret, resolve_config, resolve_secrets,
};
pub use schema::{CONFIG_KEYS, MmconfConfig, OutputFormat};
pub use store::{CONFIG_DIR_ENV, config_kdl_path, read_config, write_config};
