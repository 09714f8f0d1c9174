//! mmconf - Read and edit Mattermost server configuration by dotted path.
//!
//! This library provides the core functionality for the `mmconf` CLI tool:
//! the dynamic configuration tree and its path resolver ([`tree`]), the
//! sources snapshots are fetched from ([`server`]), the documentation index
//! of known paths ([`docs`]) and setting explanations ([`explain`]).

pub mod cli;
pub mod commands;
pub mod config;
pub mod docs;
pub mod explain;
pub mod http;
pub mod server;
pub mod tree;

/// Library-level error type for mmconf operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Kdl(#[from] kdl::KdlError),

    #[error(transparent)]
    Tree(#[from] tree::TreeError),

    #[error("Invalid path: {0}")]
    Path(#[from] tree::PathError),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Missing credential: set {name}")]
    MissingCredential { name: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for mmconf operations.
pub type Result<T> = std::result::Result<T, Error>;
