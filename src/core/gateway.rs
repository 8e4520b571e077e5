//! The sole boundary to the remote reasoning/search service.
//!
//! One opaque asynchronous call per turn: prior turns plus the new user
//! parts go out, response text and grounding citations come back. No
//! streaming, no retry; any failure collapses into a single
//! [`GatewayError`] for the session to absorb.

use std::fmt;

use async_trait::async_trait;
use tracing::debug;

use crate::api::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
    ThinkingConfig, Tool,
};
use crate::core::attachment::Attachment;
use crate::core::constants::{
    EMPTY_RESPONSE_TEXT, SYSTEM_INSTRUCTION, THINKING_BUDGET,
};
use crate::core::conversation::HistoryTurn;
use crate::core::message::{Citation, Role};
use crate::utils::url::construct_api_url;

/// What a completed gateway call yields. `text` is never empty; an empty
/// service result is substituted with the fixed fallback string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayReply {
    pub text: String,
    pub citations: Vec<Citation>,
}

/// Undifferentiated remote failure: transport, status, or decode.
#[derive(Debug)]
pub enum GatewayError {
    Transport(reqwest::Error),
    Status(reqwest::StatusCode, String),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Transport(e) => write!(f, "gateway request failed: {e}"),
            GatewayError::Status(code, body) => {
                write!(f, "gateway returned {code}: {body}")
            }
        }
    }
}

impl std::error::Error for GatewayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GatewayError::Transport(e) => Some(e),
            GatewayError::Status(..) => None,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        GatewayError::Transport(e)
    }
}

/// A single-attempt call to the remote model. Implementations must have no
/// observable side effects beyond the returned value.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn send(
        &self,
        history: &[HistoryTurn],
        new_text: &str,
        attachments: &[Attachment],
    ) -> Result<GatewayReply, GatewayError>;
}

/// Gateway backed by the Gemini `generateContent` REST endpoint with the
/// `google_search` tool enabled.
pub struct GeminiGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiGateway {
    pub fn new(base_url: &str, api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.to_string(),
            api_key,
            model,
        }
    }

    fn endpoint(&self) -> String {
        construct_api_url(&self.base_url, &format!("models/{}:generateContent", self.model))
    }

    fn build_request(
        history: &[HistoryTurn],
        new_text: &str,
        attachments: &[Attachment],
    ) -> GenerateContentRequest {
        let mut contents: Vec<Content> = history
            .iter()
            .map(|turn| {
                let role = match turn.role {
                    Role::User => "user",
                    _ => "model",
                };
                Content::text(role, turn.text.clone())
            })
            .collect();

        let mut parts = vec![Part::text(new_text)];
        for attachment in attachments {
            parts.push(Part::inline_data(
                attachment.mime_type.clone(),
                attachment.data.clone(),
            ));
        }
        contents.push(Content {
            role: Some("user".to_string()),
            parts,
        });

        GenerateContentRequest {
            contents,
            system_instruction: Some(Content::system(SYSTEM_INSTRUCTION)),
            tools: Some(vec![Tool::google_search()]),
            generation_config: Some(GenerationConfig {
                thinking_config: Some(ThinkingConfig {
                    thinking_budget: THINKING_BUDGET,
                }),
            }),
        }
    }
}

#[async_trait]
impl ModelGateway for GeminiGateway {
    async fn send(
        &self,
        history: &[HistoryTurn],
        new_text: &str,
        attachments: &[Attachment],
    ) -> Result<GatewayReply, GatewayError> {
        let request = Self::build_request(history, new_text, attachments);
        debug!(
            turns = history.len(),
            attachments = attachments.len(),
            "dispatching generateContent request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status(status, body));
        }

        let decoded: GenerateContentResponse = response.json().await?;
        Ok(reply_from_response(&decoded))
    }
}

/// Map a decoded response to a reply, substituting the fixed fallback for an
/// empty body and dropping grounding chunks with no web source.
pub fn reply_from_response(response: &GenerateContentResponse) -> GatewayReply {
    let text = response.text();
    let text = if text.trim().is_empty() {
        EMPTY_RESPONSE_TEXT.to_string()
    } else {
        text
    };
    let citations = response
        .web_sources()
        .into_iter()
        .map(|source| Citation {
            uri: source.uri.clone(),
            title: source.title.clone(),
        })
        .collect();
    GatewayReply { text, citations }
}
