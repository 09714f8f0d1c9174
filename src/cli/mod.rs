//! CLI argument definitions for mmconf.

use clap::{Parser, Subcommand};

/// Version string shown by `--version`, with build metadata.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("MMCONF_GIT_COMMIT"),
    ", built ",
    env!("MMCONF_BUILD_TIMESTAMP"),
    ")"
);

/// mmconf - Read and edit Mattermost server configuration by dotted path.
///
/// Paths follow the config.json layout, e.g. `ServiceSettings.SiteURL`.
/// Plugin keys may contain dots themselves:
/// `PluginSettings.PluginStates.com.mattermost.nps.Enable`.
#[derive(Parser, Debug)]
#[command(name = "mmconf")]
#[command(author, version, long_version = LONG_VERSION, about = "Read and edit Mattermost server configuration by dotted path", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Enable debug logging on stderr (otherwise MMCONF_LOG, default "warn")
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Work on a local JSON snapshot instead of a live server.
    /// Can also be set via MMCONF_FILE environment variable.
    #[arg(short = 'f', long = "file", global = true, env = "MMCONF_FILE")]
    pub file: Option<std::path::PathBuf>,

    /// Mattermost server URL (overrides MMCONF_SERVER_URL and config.kdl)
    #[arg(long = "server", global = true)]
    pub server: Option<String>,

    /// Log in with this username; the password is read from MM_PASSWORD.
    /// Without it, MM_AUTHTOKEN is used as a bearer token.
    #[arg(short = 'u', long = "user", global = true)]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the value at a configuration path
    Get {
        /// Dotted configuration path (e.g., ServiceSettings.SiteURL)
        path: String,
    },

    /// Set the value at a configuration path
    ///
    /// The value is parsed according to the current type of the setting:
    /// integers, floats, booleans (true/false/t/f/1/0), strings, or string
    /// lists (several values, or one value with --list).
    Set {
        /// Dotted configuration path
        path: String,

        /// New value (several values form a string list)
        #[arg(required = true, num_args = 1.., allow_negative_numbers = true)]
        values: Vec<String>,

        /// Treat a single value as a one-element string list
        #[arg(long)]
        list: bool,

        /// Show the change without applying it
        #[arg(long)]
        dry_run: bool,
    },

    /// List configuration paths from the settings documentation
    Paths {
        /// Only show paths containing this text (case-insensitive)
        #[arg(long)]
        filter: Option<String>,

        /// Also look each path up in the current configuration
        #[arg(long)]
        resolve: bool,

        /// Read the settings documentation from a local file instead of docs-url
        #[arg(long, value_name = "FILE")]
        docs_file: Option<std::path::PathBuf>,
    },

    /// Explain what a setting does (requires OPENAI_APIKEY)
    Explain {
        /// Dotted configuration path
        path: String,
    },

    /// Manage mmconf's own settings (config.kdl)
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show resolved settings and where each value came from
    Show,

    /// Set a value in config.kdl
    Set {
        /// Setting key (server-url, output-format, docs-url, openai-model, timeout-secs, mapping-paths)
        key: String,
        /// Value (mapping-paths accepts several)
        #[arg(required = true, num_args = 1..)]
        values: Vec<String>,
    },

    /// Print the location of config.kdl
    Path,
}
