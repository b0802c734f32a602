use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::{ImagePayload, VisionError, VisionModel};
use crate::{config::ModelConfig, session::Credential};

const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: [ContentPart<'a>; 2],
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
    code: Option<String>,
}

/// Client for an OpenAI-compatible `chat/completions` endpoint with
/// image input. One request per call, no retries.
pub struct OpenAiVision {
    client: Client,
    config: ModelConfig,
}

impl OpenAiVision {
    pub fn new(config: ModelConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

fn classify_error(status: StatusCode, body: &str) -> VisionError {
    let parsed = serde_json::from_str::<ErrorResponse>(body).ok();
    let invalid_key = parsed
        .as_ref()
        .and_then(|e| e.error.code.as_deref())
        .is_some_and(|c| c == "invalid_api_key");

    if status == StatusCode::UNAUTHORIZED || invalid_key {
        return VisionError::CredentialRejected;
    }

    VisionError::Status {
        status: status.as_u16(),
        message: parsed
            .map(|e| e.error.message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string()),
    }
}

#[async_trait]
impl VisionModel for OpenAiVision {
    #[instrument(skip_all, fields(model = %self.config.model, image_bytes = image.byte_len))]
    async fn describe(
        &self,
        credential: &Credential,
        prompt: &str,
        image: &ImagePayload,
    ) -> Result<String, VisionError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: [ChatMessage {
                role: "user",
                content: [
                    ContentPart::Text { text: prompt },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image.data_url(),
                        },
                    },
                ],
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(self.url())
            .bearer_auth(credential.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, timeout = e.is_timeout(), "vision request failed");
                VisionError::Transport(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| VisionError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(classify_error(status, &body));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| VisionError::Transport(format!("unreadable provider reply: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(VisionError::EmptyReply)?;

        debug!(chars = content.len(), "vision reply received");
        Ok(content)
    }
}
