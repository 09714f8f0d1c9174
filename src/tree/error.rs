//! Errors raised while resolving or mutating the tree.

use thiserror::Error;

use super::node::ValueType;

/// Path string could not be turned into a [`super::Path`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("Path must not be empty")]
    Empty,
}

/// Failure of a read or write against a tree.
///
/// None of these are retryable: the caller has to supply a different path
/// or a correctly formatted value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// No node resolves for the path at some depth.
    #[error("Selected path is not valid: {path}")]
    InvalidPath { path: String },

    /// The terminal node's declared type rejected the raw value.
    #[error("Target value is of type {expected} and provided value is not ({found})")]
    TypeMismatch { expected: ValueType, found: String },

    /// The terminal node's kind has no coercion rule.
    #[error("Target value type is not supported: {kind}")]
    UnsupportedKind { kind: ValueType },
}

impl TreeError {
    pub fn invalid_path(path: impl std::fmt::Display) -> Self {
        TreeError::InvalidPath {
            path: path.to_string(),
        }
    }

    /// True for failures caused by the supplied value rather than the path.
    pub fn is_value_rejected(&self) -> bool {
        matches!(
            self,
            TreeError::TypeMismatch { .. } | TreeError::UnsupportedKind { .. }
        )
    }
}
