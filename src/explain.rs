//! Natural-language explanations of configuration settings.
//!
//! [`OpenAiExplainer`] asks an OpenAI chat model what a setting does.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http::{agent, map_error};
use crate::{Error, Result};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Produces a description of a configuration path.
pub trait Explainer {
    fn explain(&self, path: &str) -> Result<String>;
}

/// Question sent to the model for a configuration path.
pub fn question_for(path: &str) -> String {
    format!(
        "what is {} setting in mattermost server configuration?",
        path
    )
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl ChatResponse {
    fn into_content(self) -> Result<String> {
        self.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| Error::Http("Chat completion returned no choices".to_string()))
    }
}

/// Explainer backed by the OpenAI chat completions API.
pub struct OpenAiExplainer {
    agent: ureq::Agent,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiExplainer {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            agent: agent(timeout_secs),
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
        }
    }

    /// Point at an OpenAI-compatible endpoint other than api.openai.com.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

impl Explainer for OpenAiExplainer {
    fn explain(&self, path: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: question_for(path),
            }],
        };

        debug!(model = %self.model, path, "requesting explanation");
        let response: ChatResponse = self
            .agent
            .post(&format!("{}/chat/completions", self.base_url))
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(&request)
            .map_err(map_error)?
            .into_json()?;

        response.into_content()
    }
}
