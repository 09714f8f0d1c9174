//! Shared HTTP plumbing for the blocking `ureq` clients.

use std::time::Duration;

use serde::Deserialize;

use crate::Error;

/// User-Agent sent with every request
pub const USER_AGENT: &str = "mmconf";

/// Build an agent with a global timeout.
pub fn agent(timeout_secs: u64) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(USER_AGENT)
        .build()
}

/// Error body shape shared by the Mattermost and OpenAI APIs (both put a
/// human-readable `message` somewhere in the body).
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<NestedError>,
}

#[derive(Debug, Deserialize)]
struct NestedError {
    message: Option<String>,
}

/// Pull a readable message out of an error response body, falling back to
/// the raw body.
pub(crate) fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            message: Some(message),
            ..
        }) => message,
        Ok(ErrorBody {
            error: Some(NestedError {
                message: Some(message),
            }),
            ..
        }) => message,
        _ => body.trim().to_string(),
    }
}

/// Map a `ureq` failure onto the crate error type.
pub(crate) fn map_error(err: ureq::Error) -> Error {
    match err {
        ureq::Error::Status(code @ (401 | 403), resp) => {
            let body = resp.into_string().unwrap_or_default();
            Error::Unauthorized(format!("HTTP {}: {}", code, error_message(&body)))
        }
        ureq::Error::Status(code, resp) => {
            let body = resp.into_string().unwrap_or_default();
            Error::Http(format!("HTTP {}: {}", code, error_message(&body)))
        }
        ureq::Error::Transport(transport) => Error::Http(transport.to_string()),
    }
}
